//! Reflected DOM properties.
//!
//! Some element state lives in properties that start out mirroring an
//! attribute but can drift from it afterwards (a checkbox the user clicked, an
//! input the user typed into). This module describes which properties exist on
//! which elements and how they are seeded from attributes at creation time.

use indexmap::IndexMap;
use tendril::StrTendril;

/// The runtime value of a DOM property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropValue {
    Bool(bool),
    Str(String),
}

impl PropValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            PropValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Bool(_) => None,
            PropValue::Str(s) => Some(s),
        }
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Str(s.to_owned())
    }
}

/// The runtime type of a reflected property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    Bool,
    Str,
}

/// `(property name, content attribute, kind)`
type Reflection = (&'static str, &'static str, PropKind);

use PropKind::{Bool, Str};

const GLOBAL: &[Reflection] = &[
    ("id", "id", Str),
    ("title", "title", Str),
    ("lang", "lang", Str),
    ("dir", "dir", Str),
    ("hidden", "hidden", Bool),
];

const INPUT: &[Reflection] = &[
    ("checked", "checked", Bool),
    ("value", "value", Str),
    ("disabled", "disabled", Bool),
    ("readOnly", "readonly", Bool),
    ("required", "required", Bool),
    ("multiple", "multiple", Bool),
    ("name", "name", Str),
    ("placeholder", "placeholder", Str),
];

const OPTION: &[Reflection] = &[
    ("selected", "selected", Bool),
    ("disabled", "disabled", Bool),
    ("value", "value", Str),
];

const SELECT: &[Reflection] = &[
    ("disabled", "disabled", Bool),
    ("multiple", "multiple", Bool),
    ("required", "required", Bool),
    ("name", "name", Str),
];

const TEXTAREA: &[Reflection] = &[
    ("value", "value", Str),
    ("disabled", "disabled", Bool),
    ("readOnly", "readonly", Bool),
    ("required", "required", Bool),
    ("name", "name", Str),
    ("placeholder", "placeholder", Str),
];

const BUTTON: &[Reflection] = &[
    ("disabled", "disabled", Bool),
    ("value", "value", Str),
    ("name", "name", Str),
];

const OPENABLE: &[Reflection] = &[("open", "open", Bool)];

const MEDIA: &[Reflection] = &[
    ("muted", "muted", Bool),
    ("controls", "controls", Bool),
    ("autoplay", "autoplay", Bool),
    ("loop", "loop", Bool),
    ("src", "src", Str),
];

const ANCHOR: &[Reflection] = &[("href", "href", Str), ("target", "target", Str)];

const IMG: &[Reflection] = &[("src", "src", Str), ("alt", "alt", Str)];

fn element_reflections(tag: &str) -> &'static [Reflection] {
    match tag {
        "input" => INPUT,
        "option" => OPTION,
        "select" => SELECT,
        "textarea" => TEXTAREA,
        "button" => BUTTON,
        "details" | "dialog" => OPENABLE,
        "audio" | "video" => MEDIA,
        "a" => ANCHOR,
        "img" => IMG,
        _ => &[],
    }
}

fn reflections(tag: &str) -> impl Iterator<Item = &'static Reflection> {
    GLOBAL.iter().chain(element_reflections(tag))
}

/// Look up a property by its (camelCased) name on an element with `tag`.
pub fn reflected_property(tag: &str, prop: &str) -> Option<PropKind> {
    reflections(tag)
        .find(|(name, _, _)| *name == prop)
        .map(|(_, _, kind)| *kind)
}

/// The property reflecting content attribute `attr` on an element with `tag`.
pub fn reflected_attribute(tag: &str, attr: &str) -> Option<(&'static str, PropKind)> {
    reflections(tag)
        .find(|(_, name, _)| *name == attr)
        .map(|(prop, _, kind)| (*prop, *kind))
}

/// Initial property values for a freshly created element.
pub(crate) fn seed_properties(
    tag: &str,
    attrs: &IndexMap<String, StrTendril>,
) -> IndexMap<String, PropValue> {
    reflections(tag)
        .map(|(prop, attr, kind)| {
            let value = match kind {
                PropKind::Bool => PropValue::Bool(attrs.contains_key(*attr)),
                PropKind::Str => PropValue::Str(
                    attrs
                        .get(*attr)
                        .map(|v| v.as_ref().to_owned())
                        .unwrap_or_default(),
                ),
            };
            ((*prop).to_owned(), value)
        })
        .collect()
}

/// Convert a hyphenated name to camelCase: `aria-checked` becomes
/// `ariaChecked`. Only a hyphen followed by a lowercase ASCII letter is
/// folded; anything else is kept verbatim.
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('-', Some(next)) if next.is_ascii_lowercase() => {
                out.push(next.to_ascii_uppercase());
                chars.next();
            }
            _ => out.push(c),
        }
    }
    out
}

/// The `dataset` key for a `data-*` attribute, or `None` for other names.
pub fn dataset_key(attr: &str) -> Option<String> {
    attr.strip_prefix("data-").map(camel_case)
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("aria-checked"), "ariaChecked");
        assert_eq!(camel_case("aria-describedby"), "ariaDescribedby");
        assert_eq!(camel_case("value"), "value");
        assert_eq!(camel_case("x-1"), "x-1");
        assert_eq!(camel_case("trailing-"), "trailing-");
    }

    #[test]
    fn test_dataset_key() {
        assert_eq!(dataset_key("data-user-id").as_deref(), Some("userId"));
        assert_eq!(dataset_key("data-x").as_deref(), Some("x"));
        assert_eq!(dataset_key("aria-label"), None);
    }

    #[test]
    fn test_reflected_property_lookup() {
        assert_eq!(reflected_property("input", "checked"), Some(PropKind::Bool));
        assert_eq!(reflected_property("input", "value"), Some(PropKind::Str));
        assert_eq!(reflected_property("div", "hidden"), Some(PropKind::Bool));
        assert_eq!(reflected_property("div", "checked"), None);
        // attribute spelling is not a property name
        assert_eq!(reflected_property("input", "readonly"), None);
    }

    #[test]
    fn test_reflected_attribute_lookup() {
        assert_eq!(
            reflected_attribute("input", "readonly"),
            Some(("readOnly", PropKind::Bool))
        );
        assert_eq!(reflected_attribute("a", "href"), Some(("href", PropKind::Str)));
        assert_eq!(reflected_attribute("div", "href"), None);
    }

    #[test]
    fn test_seed_from_attributes() {
        let mut attrs = IndexMap::new();
        attrs.insert("checked".to_string(), StrTendril::from(""));
        attrs.insert("value".to_string(), StrTendril::from("on"));
        let props = seed_properties("input", &attrs);
        assert_eq!(props.get("checked"), Some(&PropValue::Bool(true)));
        assert_eq!(props.get("disabled"), Some(&PropValue::Bool(false)));
        assert_eq!(props.get("value"), Some(&PropValue::Str("on".into())));
        assert_eq!(props.get("id"), Some(&PropValue::Str(String::new())));
    }
}
