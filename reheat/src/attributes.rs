//! Attribute synchronization between a live element and its target.

use reheat_dom::{Document, DomError, NodeId, PropKind, PropValue, StrTendril};
use reheat_dom::{camel_case, dataset_key, reflected_attribute};

use crate::options::ReconcileOptions;
use crate::stats::PatchStats;
use crate::tracing_macros::trace;

/// Make the attributes of `old` equal to those of `new`, event attributes
/// aside, and mirror every write onto the matching property.
///
/// Attributes whose value is already right are not touched, so properties
/// that drifted through user interaction survive a render that does not
/// change the attribute.
pub fn update_attributes(
    doc: &mut Document,
    old: NodeId,
    new: NodeId,
    opts: &ReconcileOptions,
    stats: &mut PatchStats,
) -> Result<(), DomError> {
    let target: Vec<(String, StrTendril)> = doc
        .element(new)
        .ok_or(DomError::NotAnElement(new))?
        .attrs
        .iter()
        .filter(|(name, _)| !opts.is_event_attribute(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    for (name, value) in &target {
        let value: &str = value;
        if doc.attribute(old, name) == Some(value) {
            continue;
        }
        doc.set_attribute(old, name, value)?;
        stats.attributes_set += 1;
        if mirror_property(doc, old, name, value)? {
            stats.properties_set += 1;
        }
    }

    let stale: Vec<String> = {
        let current = doc.element(old).ok_or(DomError::NotAnElement(old))?;
        let wanted = doc.element(new).ok_or(DomError::NotAnElement(new))?;
        current
            .attrs
            .keys()
            .filter(|name| !opts.is_event_attribute(name) && !wanted.attrs.contains_key(*name))
            .cloned()
            .collect()
    };
    for name in stale {
        doc.remove_attribute(old, &name)?;
        stats.attributes_removed += 1;
        if clear_property(doc, old, &name)? {
            stats.properties_set += 1;
        }
    }

    Ok(())
}

/// Write the property counterpart of attribute `name`. Returns whether a
/// property was written.
fn mirror_property(
    doc: &mut Document,
    el: NodeId,
    name: &str,
    value: &str,
) -> Result<bool, DomError> {
    if name.starts_with("aria-") {
        doc.set_property(el, &camel_case(name), value)?;
        return Ok(true);
    }
    if let Some(key) = dataset_key(name) {
        doc.set_dataset(el, &key, value)?;
        return Ok(true);
    }

    let Some((prop, kind)) = doc.tag(el).and_then(|tag| reflected_attribute(tag, name)) else {
        return Ok(false);
    };
    let value = match kind {
        PropKind::Bool => PropValue::Bool(coerce_bool(prop, name, value)),
        PropKind::Str => PropValue::Str(value.to_owned()),
    };
    trace!(?el, %prop, ?value, "mirroring attribute onto property");
    doc.set_property(el, prop, value)?;
    Ok(true)
}

/// Reset the property counterpart of a removed attribute `name`: ARIA
/// properties are dropped, reflected booleans become `false` and reflected
/// strings become empty. Returns whether a property changed.
fn clear_property(doc: &mut Document, el: NodeId, name: &str) -> Result<bool, DomError> {
    if name.starts_with("aria-") {
        return doc.remove_property(el, &camel_case(name));
    }
    if dataset_key(name).is_some() {
        // the dataset entry goes with the attribute
        return Ok(true);
    }

    let Some((prop, kind)) = doc.tag(el).and_then(|tag| reflected_attribute(tag, name)) else {
        return Ok(false);
    };
    let value = match kind {
        PropKind::Bool => PropValue::Bool(false),
        PropKind::Str => PropValue::Str(String::new()),
    };
    trace!(?el, %prop, ?value, "resetting property of removed attribute");
    doc.set_property(el, prop, value)?;
    Ok(true)
}

/// Boolean reading of an attribute value: `"false"` is false, and the empty
/// string, the property or attribute name, and `"true"` are true.
pub(crate) fn coerce_bool(prop: &str, attr: &str, value: &str) -> bool {
    value != "false" && (value.is_empty() || value == prop || value == attr || value == "true")
}
