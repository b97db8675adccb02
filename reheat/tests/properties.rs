//! End-to-end reconciliation scenarios.

use facet_testhelpers::test;
use reheat::{PatchStats, ReconcileError, ReconcileOptions, Reconciler, patch_dom, patch_node};
use reheat_dom::{Document, NodeId, PropValue, SerializeOptions, parse};

fn page(body: &str) -> (Document, NodeId) {
    let doc = parse(&format!("<html><body>{body}</body></html>"));
    let body = doc.body().unwrap();
    (doc, body)
}

fn first_child(doc: &Document, node: NodeId) -> NodeId {
    doc.children(node).next().unwrap()
}

fn html(doc: &Document, node: NodeId) -> String {
    doc.to_html(node, &SerializeOptions::default())
}

fn keys(doc: &Document, parent: NodeId) -> Vec<String> {
    doc.children(parent)
        .map(|id| doc.attribute(id, "key").unwrap_or_default().to_owned())
        .collect()
}

#[test]
fn test_second_pass_with_same_markup_is_a_noop() {
    let markup = r#"<nav class="top" aria-label="Main"><a href="/">Home</a> <a href="/blog" data-active="true">Blog</a></nav><ul><li key="1">one</li><li key="2">two</li></ul><!-- end -->"#;
    let (mut doc, body) = page("<p>loading</p>");

    let first = patch_dom(&mut doc, body, markup).unwrap();
    assert!(!first.is_noop());

    let before: Vec<NodeId> = doc.children(body).collect();
    let before_html = html(&doc, body);

    let second = patch_dom(&mut doc, body, markup).unwrap();
    assert!(second.is_noop(), "{second:?}");
    assert_eq!(doc.children(body).collect::<Vec<_>>(), before);
    assert_eq!(html(&doc, body), before_html);
}

#[test]
fn test_serialization_matches_parsed_markup() {
    let markup = r#"<header><h1 id="t">Title</h1></header><main><p>Some <b>bold</b> text</p><table><tr><td>1</td></tr></table></main>"#;
    let (mut doc, body) = page(
        r#"<style data-e-style="app">h1{color:red}</style><header><h2>Old</h2></header><footer>bye</footer>"#,
    );

    patch_dom(&mut doc, body, markup).unwrap();

    let opts = ReconcileOptions::default().managed_serialize_options();
    let (fresh, fresh_body) = page(markup);
    assert_eq!(doc.to_html(body, &opts), fresh.to_html(fresh_body, &opts));
}

#[test]
fn test_keyed_children_keep_their_identity() {
    let (mut doc, body) = page(
        r#"<div><i key="1">A</i><i key="2">B</i><i key="3">C</i></div>"#,
    );
    let div = first_child(&doc, body);
    let originals: Vec<NodeId> = doc.children(div).collect();
    for (id, tag) in originals.iter().zip(["A", "B", "C"]) {
        doc.set_property(*id, "__marker", tag).unwrap();
    }

    patch_dom(
        &mut doc,
        div,
        r#"<i key="3">C</i><i key="1">A</i><i key="2">B</i>"#,
    )
    .unwrap();

    let after: Vec<NodeId> = doc.children(div).collect();
    assert_eq!(after, [originals[2], originals[0], originals[1]]);
    for (id, expected) in after.iter().zip(["C", "A", "B"]) {
        assert_eq!(
            doc.property(*id, "__marker").and_then(PropValue::as_str),
            Some(expected)
        );
    }
}

#[test]
fn test_owned_subtree_is_left_alone() {
    let (mut doc, body) = page(
        r#"<p>before</p><div class="child-root"><span>mounted</span><em>state</em></div><p>after</p>"#,
    );
    let child = doc.children(body).nth(1).unwrap();
    doc.mark_owned(child);
    let inner = doc.outer_html(child, &SerializeOptions::default());

    let stats = patch_dom(
        &mut doc,
        body,
        r#"<p>before!</p><div class="different"><b>placeholder</b></div><p>after!</p>"#,
    )
    .unwrap();

    assert_eq!(doc.outer_html(child, &SerializeOptions::default()), inner);
    assert!(doc.is_owned(child));
    assert_eq!(stats.skipped_owned, 1);
    assert_eq!(stats.texts_updated, 2);
}

#[test]
fn test_style_marker_survives_patch() {
    let (mut doc, body) = page(
        r#"<style data-e-style="x">.card{padding:1em}</style><div class="card">old</div>"#,
    );
    let style = first_child(&doc, body);

    let stats = patch_dom(&mut doc, body, r#"<section>new</section>"#).unwrap();

    assert!(doc.contains(style));
    assert_eq!(doc.parent(style), Some(body));
    assert_eq!(doc.text_content(style), ".card{padding:1em}");
    assert_eq!(stats.preserved, 1);
}

#[test]
fn test_side_table_style_marker_survives_patch() {
    let (mut doc, body) = page("<style>p{}</style><p>x</p>");
    let style = first_child(&doc, body);
    doc.mark_style(style);

    patch_dom(&mut doc, body, "").unwrap();
    assert_eq!(doc.children(body).collect::<Vec<_>>(), [style]);
}

#[test]
fn test_attributes_are_synced_exactly() {
    let (mut doc, body) = page(r#"<div a="1" b="2"></div>"#);
    let div = first_child(&doc, body);

    let stats = patch_dom(&mut doc, body, r#"<div a="1" c="3"></div>"#).unwrap();

    let attrs: Vec<(&str, &str)> = doc
        .element(div)
        .unwrap()
        .attrs
        .iter()
        .map(|(k, v)| (k.as_str(), &**v))
        .collect();
    assert_eq!(attrs, [("a", "1"), ("c", "3")]);
    assert_eq!(stats.attributes_set, 1);
    assert_eq!(stats.attributes_removed, 1);
}

#[test]
fn test_event_attributes_belong_to_the_binding_layer() {
    let (mut doc, body) = page(r#"<button @click="save" class="a">Save</button>"#);
    let button = first_child(&doc, body);

    patch_dom(&mut doc, body, r#"<button class="b">Save</button>"#).unwrap();
    assert_eq!(doc.attribute(button, "@click"), Some("save"));
    assert_eq!(doc.attribute(button, "class"), Some("b"));
}

#[test]
fn test_key_match_with_different_tag_is_replaced() {
    let (mut doc, body) = page(r#"<div key="x">Old</div>"#);
    let div = first_child(&doc, body);

    patch_dom(&mut doc, body, r#"<span key="x">New</span>"#).unwrap();

    let span = first_child(&doc, body);
    assert_ne!(span, div);
    assert!(!doc.contains(div));
    assert_eq!(doc.tag(span), Some("span"));
    assert_eq!(html(&doc, body), r#"<span key="x">New</span>"#);
}

#[test]
fn test_patch_node_replaces_on_tag_change() {
    let (mut doc, body) = page(r#"<div key="x">Old</div>"#);
    let div = first_child(&doc, body);
    let target = doc.parse_fragment(body, r#"<span key="x">New</span>"#).unwrap();
    let span = first_child(&doc, target);

    let stats = patch_node(&mut doc, div, span, &ReconcileOptions::default()).unwrap();
    assert_eq!(stats.replaced, 1);
    assert_eq!(first_child(&doc, body), span);
}

#[test]
fn test_checked_is_coerced_to_bool() {
    for (value, expected) in [("", true), ("checked", true), ("true", true), ("false", false)] {
        let (mut doc, body) = page(r#"<input type="checkbox">"#);
        let input = first_child(&doc, body);
        if !expected {
            doc.set_property(input, "checked", true).unwrap();
        }

        patch_dom(
            &mut doc,
            body,
            &format!(r#"<input type="checkbox" checked="{value}">"#),
        )
        .unwrap();

        assert_eq!(first_child(&doc, body), input);
        assert_eq!(
            doc.property(input, "checked").and_then(PropValue::as_bool),
            Some(expected),
            "checked={value:?}"
        );
    }
}

#[test]
fn test_removed_attributes_reset_properties() {
    let (mut doc, body) = page(r#"<input type="checkbox">"#);
    let input = first_child(&doc, body);

    patch_dom(
        &mut doc,
        body,
        r#"<input type="checkbox" checked disabled aria-label="x">"#,
    )
    .unwrap();
    assert_eq!(
        doc.property(input, "ariaLabel").and_then(PropValue::as_str),
        Some("x")
    );

    let stats = patch_dom(&mut doc, body, r#"<input type="checkbox">"#).unwrap();

    assert_eq!(first_child(&doc, body), input);
    assert_eq!(doc.property(input, "checked").and_then(PropValue::as_bool), Some(false));
    assert_eq!(doc.property(input, "disabled").and_then(PropValue::as_bool), Some(false));
    assert_eq!(doc.property(input, "ariaLabel"), None);
    assert_eq!(stats.attributes_removed, 3);
    assert_eq!(stats.properties_set, 3);
}

#[test]
fn test_keyed_list_end_to_end() {
    let (mut doc, body) = page(r#"<ul><li key="a">X</li><li key="b">Y</li></ul>"#);
    let ul = first_child(&doc, body);
    let a = doc.children(ul).next().unwrap();
    let b = doc.children(ul).nth(1).unwrap();

    let stats = patch_dom(
        &mut doc,
        body,
        r#"<ul><li key="b">Y2</li><li key="a">X</li><li key="c">Z</li></ul>"#,
    )
    .unwrap();

    assert_eq!(first_child(&doc, body), ul);
    assert_eq!(keys(&doc, ul), ["b", "a", "c"]);
    let items: Vec<NodeId> = doc.children(ul).collect();
    assert_eq!(items[0], b);
    assert_eq!(items[1], a);
    assert_ne!(items[2], a);
    assert_ne!(items[2], b);
    assert_eq!(doc.text_content(b), "Y2");
    assert_eq!(doc.text_content(items[2]), "Z");

    assert_eq!(stats.moved, 1);
    assert_eq!(stats.inserted, 1);
    assert_eq!(stats.texts_updated, 1);

    let json = facet_json::to_string(&stats).expect("serialization should work");
    let back: PatchStats = facet_json::from_str(&json).expect("deserialization should work");
    assert_eq!(back, stats);
}

#[test]
fn test_custom_conventions() {
    let reconciler = Reconciler::new(
        ReconcileOptions::new()
            .with_key_attribute("data-key")
            .with_event_prefix("on:")
            .with_style_marker("data-scoped"),
    );
    let (mut doc, body) = page(
        r#"<style data-scoped>p{}</style><p data-key="1" on:click="x">one</p><p data-key="2">two</p>"#,
    );
    let one = doc.children(body).nth(1).unwrap();
    let two = doc.children(body).nth(2).unwrap();

    reconciler
        .patch_dom(&mut doc, body, r#"<p data-key="2">two</p><p data-key="1">one</p>"#)
        .unwrap();

    assert_eq!(doc.children(body).collect::<Vec<_>>().len(), 3);
    assert_eq!(doc.children(body).nth(1), Some(two));
    assert_eq!(doc.children(body).nth(2), Some(one));
    assert_eq!(doc.attribute(one, "on:click"), Some("x"));
}

#[test]
fn test_invalid_container_leaves_document_untouched() {
    let (mut doc, body) = page("<p>x</p>");
    let p = first_child(&doc, body);
    let text = first_child(&doc, p);
    let count = doc.node_count();

    let err = patch_dom(&mut doc, text, "<b>y</b>").unwrap_err();
    assert!(matches!(err, ReconcileError::InvalidArgument(_)));
    assert_eq!(doc.node_count(), count);
    assert_eq!(html(&doc, body), "<p>x</p>");
}
