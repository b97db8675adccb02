use reheat_dom::{Document, NodeId, NodeKind};

use crate::error::{AtNode, InvalidArgument, ReconcileError};
use crate::options::ReconcileOptions;
use crate::patch::Patcher;
use crate::stats::PatchStats;
use crate::tracing_macros::debug;

/// Patches live containers to match rendered markup.
///
/// A `Reconciler` holds no per-pass state; one instance can serve any number
/// of documents and containers.
#[derive(Clone, Debug, Default)]
pub struct Reconciler {
    options: ReconcileOptions,
}

impl Reconciler {
    pub fn new(options: ReconcileOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Make the children of `container` match `markup`, reusing live nodes
    /// wherever their identity allows.
    ///
    /// The markup is parsed as a fragment with `container` as its context
    /// element, into the document's scratch container. Target nodes that are
    /// not matched by a live node are moved into the live tree; whatever is
    /// left in the scratch container is freed before returning.
    pub fn patch_dom(
        &self,
        doc: &mut Document,
        container: NodeId,
        markup: &str,
    ) -> Result<PatchStats, ReconcileError> {
        match doc.try_get(container) {
            Err(_) => return Err(InvalidArgument::StaleContainer(container).into()),
            Ok(data) if !matches!(data.kind, NodeKind::Element(_)) => {
                return Err(InvalidArgument::NotAnElement {
                    node: container,
                    kind: data.kind.name(),
                }
                .into());
            }
            Ok(_) => {}
        }

        let target = doc
            .parse_fragment(container, markup)
            .at(container)
            .map_err(|source| ReconcileError::PatchFailure { container, source })?;

        let mut patcher = Patcher::new(doc, &self.options);
        let result = if self.options.fast_path && patcher.doc.children_equal(container, target) {
            patcher.stats.fast_path = true;
            Ok(())
        } else {
            patcher.diff_children(container, target)
        };
        let stats = patcher.stats;

        doc.clear_children(target);
        result.map_err(|source| ReconcileError::PatchFailure { container, source })?;

        debug!(
            ?container,
            patched = stats.patched,
            inserted = stats.inserted,
            moved = stats.moved,
            removed = stats.removed,
            replaced = stats.replaced,
            fast_path = stats.fast_path,
            "patched container"
        );
        Ok(stats)
    }
}

/// Patch `container` to match `markup` with the default options.
///
/// ```rust
/// use reheat::patch_dom;
/// use reheat_dom::{parse, SerializeOptions};
///
/// let mut doc = parse("<html><body><p>old</p></body></html>");
/// let body = doc.body().unwrap();
/// let p = doc.children(body).next().unwrap();
///
/// patch_dom(&mut doc, body, "<p>new</p><p>more</p>").unwrap();
///
/// assert_eq!(
///     doc.to_html(body, &SerializeOptions::default()),
///     "<p>new</p><p>more</p>"
/// );
/// // the paragraph was patched, not recreated
/// assert_eq!(doc.children(body).next(), Some(p));
/// ```
pub fn patch_dom(
    doc: &mut Document,
    container: NodeId,
    markup: &str,
) -> Result<PatchStats, ReconcileError> {
    Reconciler::default().patch_dom(doc, container, markup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;
    use reheat_dom::{DomError, SerializeOptions, parse};

    fn page(body: &str) -> (Document, NodeId) {
        let doc = parse(&format!("<html><body>{body}</body></html>"));
        let body = doc.body().unwrap();
        (doc, body)
    }

    #[test]
    fn test_patch_body() {
        let (mut doc, body) = page("<h1>Title</h1><p>one</p>");
        let h1 = doc.children(body).next().unwrap();

        let stats = patch_dom(&mut doc, body, "<h1>Title</h1><p>two</p><p>three</p>").unwrap();
        assert_eq!(
            doc.to_html(body, &SerializeOptions::default()),
            "<h1>Title</h1><p>two</p><p>three</p>"
        );
        assert_eq!(doc.children(body).next(), Some(h1));
        assert_eq!(stats.texts_updated, 1);
        assert_eq!(stats.inserted, 1);
    }

    #[test]
    fn test_scratch_is_emptied_after_each_pass() {
        let (mut doc, body) = page("<p>a</p>");
        patch_dom(&mut doc, body, "<p>a</p><p>b</p>").unwrap();
        let count = doc.node_count();

        for _ in 0..5 {
            patch_dom(&mut doc, body, "<p>a</p><p>b</p>").unwrap();
        }
        assert_eq!(doc.node_count(), count);

        let scratch = doc.scratch_container();
        assert_eq!(doc.children(scratch).count(), 0);
    }

    #[test]
    fn test_stale_container_is_rejected() {
        let (mut doc, body) = page("<div></div>");
        let div = doc.children(body).next().unwrap();
        doc.remove(div);

        let err = patch_dom(&mut doc, div, "<p>x</p>").unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::InvalidArgument(InvalidArgument::StaleContainer(id)) if id == div
        ));
    }

    #[test]
    fn test_text_container_is_rejected() {
        let (mut doc, body) = page("text");
        let text = doc.children(body).next().unwrap();

        let err = patch_dom(&mut doc, text, "<p>x</p>").unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::InvalidArgument(InvalidArgument::NotAnElement { kind: "#text", .. })
        ));
        assert_eq!(doc.text(text), Some("text"));
    }

    #[test]
    fn test_fast_path_skips_identical_markup() {
        let (mut doc, body) = page(r#"<ul><li key="a">a</li></ul>"#);
        let reconciler = Reconciler::new(ReconcileOptions::new().fast_path());

        let stats = reconciler
            .patch_dom(&mut doc, body, r#"<ul><li key="a">a</li></ul>"#)
            .unwrap();
        assert!(stats.fast_path);
        assert_eq!(stats.patched, 0);

        let stats = reconciler
            .patch_dom(&mut doc, body, r#"<ul><li key="a">b</li></ul>"#)
            .unwrap();
        assert!(!stats.fast_path);
        assert_eq!(stats.texts_updated, 1);
    }

    #[test]
    fn test_container_freed_by_parsing_is_a_patch_failure() {
        let (mut doc, _) = page("");
        let scratch = doc.scratch_container();
        let div = doc.create_element("div", &[]);
        doc.append(scratch, div).unwrap();

        let err = patch_dom(&mut doc, div, "<p>x</p>").unwrap_err();
        let ReconcileError::PatchFailure { container, source } = &err else {
            panic!("expected a patch failure, got {err:?}");
        };
        assert_eq!(*container, div);
        assert_eq!(source.node, div);
        assert!(matches!(source.source, DomError::Removed(id) if id == div));
        assert!(std::error::Error::source(&err).is_some());
        assert!(!doc.contains(div));
        assert_eq!(doc.children(scratch).count(), 0);
    }

    #[test]
    fn test_owned_container_is_still_patched() {
        let (mut doc, body) = page("<section><p>a</p></section>");
        let section = doc.children(body).next().unwrap();
        doc.mark_owned(section);

        patch_dom(&mut doc, section, "<p>b</p>").unwrap();
        assert_eq!(doc.text_content(section), "b");
    }
}
