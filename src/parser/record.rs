//! Record model
//!
//! [`HealthRecord`] is the typed, immutable view of one top-level element of
//! the export: its flattened attributes, resolved semantic type and derived
//! time window.

use serde::{Serialize, Serializer};
use std::collections::HashSet;

use super::attributes::{AttrValue, Attributes};
use super::error::{ParseError, ParseResult};
use super::timestamp::{parse_timestamp, Timestamp};

/// Metadata marker elements, merged into their parent as `key → value`
pub const METADATA_TAG: &str = "MetadataEntry";

/// Injected key holding the resolved element name
pub const TAG_KEY: &str = "_tag";

/// Injected key holding the resolved record type
pub const TYPE_KEY: &str = "_type";

const DEFAULT_TAG: &str = "Record";

/// A parsed XML element before flattening
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: add an attribute
    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Builder: add a child element
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Direct attribute lookup (no children). A repeated attribute resolves
    /// to its last occurrence, matching flattening.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Scalar value `key` will have after flattening, as far as direct
    /// attributes and direct metadata entries decide it. The last metadata
    /// entry for `key` wins over a direct attribute.
    pub(crate) fn flattened_get(&self, key: &str) -> Option<&str> {
        self.children
            .iter()
            .rev()
            .filter(|child| child.name == METADATA_TAG)
            .find_map(|child| match (child.get("key"), child.get("value")) {
                (Some(k), Some(value)) if k == key => Some(value),
                _ => None,
            })
            .or_else(|| self.get(key))
    }
}

/// Where a tag takes its record type from
enum TypeRule {
    /// Fixed to the tag itself
    Tag,
    /// The named attribute, falling back to the tag
    Attribute(&'static str),
}

fn type_rule(tag: &str) -> TypeRule {
    match tag {
        "Workout" => TypeRule::Attribute("workoutActivityType"),
        "ActivitySummary" | "Me" | "ExportDate" => TypeRule::Tag,
        // Correlation, Audiogram, ClinicalRecord and plain Record
        _ => TypeRule::Attribute("type"),
    }
}

/// Resolve the semantic record type of `tag` from its attributes
pub fn resolve_record_type(tag: &str, attrs: &Attributes) -> String {
    match type_rule(tag) {
        TypeRule::Tag => tag.to_string(),
        TypeRule::Attribute(key) => attrs
            .get_str(key)
            .filter(|v| !v.is_empty())
            .unwrap_or(tag)
            .to_string(),
    }
}

/// Resolve the record type of a fully read element without flattening it.
///
/// `None` when the type-deciding value is missing, in which case a nested
/// child of the same name could still matter and only the full filter decides.
pub(crate) fn resolve_element_type(element: &Element) -> Option<&str> {
    match type_rule(&element.name) {
        TypeRule::Tag => Some(&element.name),
        TypeRule::Attribute(key) => element.flattened_get(key).map(|v| {
            if v.is_empty() {
                element.name.as_str()
            } else {
                v
            }
        }),
    }
}

/// Combine start/creation/end into a window, clamping `end` to `start`
pub(crate) fn derive_window(
    s: Option<Timestamp>,
    c: Option<Timestamp>,
    e: Option<Timestamp>,
) -> (Option<Timestamp>, Option<Timestamp>) {
    let start = s.or(c).or(e);
    let end = match (start, e.or(s).or(c)) {
        (Some(start), Some(end)) if end < start => Some(start),
        (_, end) => end,
    };
    (start, end)
}

/// Inclusive window intersection.
///
/// With no bounds everything passes; with any bound, a record lacking a
/// start or end never does.
pub(crate) fn window_intersects(
    start: Option<Timestamp>,
    end: Option<Timestamp>,
    window_start: Option<Timestamp>,
    window_end: Option<Timestamp>,
) -> bool {
    if window_start.is_none() && window_end.is_none() {
        return true;
    }
    let (Some(start), Some(end)) = (start, end) else {
        return false;
    };
    if window_start.is_some_and(|ws| end < ws) {
        return false;
    }
    if window_end.is_some_and(|we| start > we) {
        return false;
    }
    true
}

fn time_attr(attrs: &Attributes, key: &str) -> Option<Timestamp> {
    attrs.get_str(key).and_then(parse_timestamp)
}

fn derive_time_window(attrs: &Attributes) -> (Option<Timestamp>, Option<Timestamp>) {
    derive_window(
        time_attr(attrs, "startDate"),
        time_attr(attrs, "creationDate"),
        time_attr(attrs, "endDate"),
    )
}

/// Flatten an element into an attribute mapping.
///
/// Direct attributes come first. Metadata entries are merged in document
/// order and replace any earlier value of the same key; other children are
/// grouped by element name.
fn flatten(element: Element) -> Attributes {
    let Element {
        name: _,
        attributes,
        children,
    } = element;

    let mut attrs = Attributes::with_capacity(attributes.len() + children.len());
    for (k, v) in attributes {
        attrs.insert(k, AttrValue::Scalar(v));
    }

    for child in children {
        if child.name == METADATA_TAG {
            if let (Some(key), Some(value)) = (child.get("key"), child.get("value")) {
                if !key.is_empty() {
                    attrs.insert(key, value);
                }
            }
            continue;
        }

        let name = child.name.clone();
        let mut nested = flatten(child);
        nested.insert_if_absent(TAG_KEY, name.as_str());
        if !attrs.push_nested(name.as_str(), nested) {
            tracing::debug!(element = %name, "Dropping child element shadowed by a scalar attribute");
        }
    }

    attrs
}

/// Immutable representation of a single Apple Health export element
#[derive(Debug, Clone, PartialEq)]
pub struct HealthRecord {
    tag: String,
    record_type: String,
    start: Option<Timestamp>,
    end: Option<Timestamp>,
    attributes: Attributes,
}

impl HealthRecord {
    /// Build a record from a parsed element, flattening all children
    pub fn from_element(element: Element) -> Self {
        let tag = element.name.clone();
        let mut attributes = flatten(element);
        attributes.insert(TAG_KEY, tag.as_str());
        let record_type = resolve_record_type(&tag, &attributes);
        attributes.insert(TYPE_KEY, record_type.as_str());
        let (start, end) = derive_time_window(&attributes);

        Self {
            tag,
            record_type,
            start,
            end,
            attributes,
        }
    }

    /// Rebuild a record from its external shape.
    ///
    /// `_tag` (or `tag`) and `_type` are honored when present; the time
    /// window is always re-derived.
    pub fn from_attributes(mut attributes: Attributes) -> Self {
        let tag = attributes
            .get_str(TAG_KEY)
            .filter(|t| !t.is_empty())
            .or_else(|| attributes.get_str("tag").filter(|t| !t.is_empty()))
            .unwrap_or(DEFAULT_TAG)
            .to_string();
        attributes.insert(TAG_KEY, tag.as_str());

        let record_type = match attributes.get_str(TYPE_KEY).filter(|t| !t.is_empty()) {
            Some(t) => t.to_string(),
            None => resolve_record_type(&tag, &attributes),
        };
        attributes.insert(TYPE_KEY, record_type.as_str());
        let (start, end) = derive_time_window(&attributes);

        Self {
            tag,
            record_type,
            start,
            end,
            attributes,
        }
    }

    /// Rebuild a record from a JSON object
    pub fn from_json(json: &str) -> ParseResult<Self> {
        let attributes: Attributes = serde_json::from_str(json)?;
        Ok(Self::from_attributes(attributes))
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    pub fn start(&self) -> Option<Timestamp> {
        self.start
    }

    pub fn end(&self) -> Option<Timestamp> {
        self.end
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Scalar attribute lookup
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get_str(key)
    }

    /// Copy of the external shape
    pub fn to_attributes(&self) -> Attributes {
        self.attributes.clone()
    }

    pub fn into_attributes(self) -> Attributes {
        self.attributes
    }

    /// Whether the record's window intersects `[window_start, window_end]`
    pub fn intersects(&self, window_start: Option<Timestamp>, window_end: Option<Timestamp>) -> bool {
        window_intersects(self.start, self.end, window_start, window_end)
    }

    /// Whether the record type or tag is accepted; `None` accepts everything
    pub fn is_any_of_types(&self, allowed: Option<&HashSet<String>>) -> bool {
        match allowed {
            None => true,
            Some(set) => set.contains(&self.record_type) || set.contains(&self.tag),
        }
    }
}

impl TryFrom<serde_json::Value> for HealthRecord {
    type Error = ParseError;

    fn try_from(value: serde_json::Value) -> ParseResult<Self> {
        if !value.is_object() {
            return Err(ParseError::InvalidAttributes(
                "expected an attribute object".to_string(),
            ));
        }
        let attributes: Attributes = serde_json::from_value(value)?;
        Ok(Self::from_attributes(attributes))
    }
}

impl Serialize for HealthRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attributes.serialize(serializer)
    }
}
