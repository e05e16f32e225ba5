use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::outline::OutlineNode;

/// Name given to the root part of a control's statement.
pub const STATEMENT: &str = "statement";

/// Name given to enumerated sub-parts.
pub const ITEM: &str = "item";

/// A name/value property attached to an OSCAL object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property name, e.g. `label` or `sort-id`.
    pub name: String,
    /// Property value.
    pub value: String,
}

impl Property {
    /// Creates a property.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Creates a `label` property.
    #[must_use]
    pub fn label(value: impl Into<String>) -> Self {
        Self::new("label", value)
    }
}

/// An OSCAL part: a labelled, possibly nested piece of control text.
///
/// Empty `props`, `prose` and `parts` are stored as `None` and left out when
/// serialized; OSCAL consumers never see `"parts": []`. Deserialization
/// applies the same rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    id: String,
    name: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_vec"
    )]
    props: Option<Vec<Property>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_string"
    )]
    prose: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "non_empty_vec"
    )]
    parts: Option<Vec<Part>>,
}

impl Part {
    /// Creates a part with no properties, prose or children.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            props: None,
            prose: None,
            parts: None,
        }
    }

    /// Sets the prose; empty text clears it.
    #[must_use]
    pub fn with_prose(mut self, prose: impl Into<String>) -> Self {
        let prose = prose.into();
        self.prose = (!prose.is_empty()).then_some(prose);
        self
    }

    /// Appends a property.
    #[must_use]
    pub fn with_prop(mut self, prop: Property) -> Self {
        self.props.get_or_insert_with(Vec::new).push(prop);
        self
    }

    /// Sets the children; an empty list clears them.
    #[must_use]
    pub fn with_parts(mut self, parts: Vec<Self>) -> Self {
        self.parts = (!parts.is_empty()).then_some(parts);
        self
    }

    /// The part id, e.g. `ac-2_smt.a.1`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The part name: `statement`, `item`, `guidance`, ...
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Properties, if any.
    #[must_use]
    pub fn props(&self) -> &[Property] {
        self.props.as_deref().unwrap_or_default()
    }

    /// Value of the `label` property, if present.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.props()
            .iter()
            .find(|prop| prop.name == "label")
            .map(|prop| prop.value.as_str())
    }

    /// Prose owned by this part, if any.
    #[must_use]
    pub fn prose(&self) -> Option<&str> {
        self.prose.as_deref()
    }

    /// Child parts, if any.
    #[must_use]
    pub fn parts(&self) -> Option<&[Self]> {
        self.parts.as_deref()
    }

    /// Finds a direct child by label.
    #[must_use]
    pub fn child(&self, label: &str) -> Option<&Self> {
        self.parts()?
            .iter()
            .find(|part| part.label() == Some(label))
    }

    /// Number of levels of parts below this one.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.parts()
            .unwrap_or_default()
            .iter()
            .map(|part| part.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Flattens the part tree to indented markdown-ish text.
    ///
    /// Each item is rendered as `label. prose`, indented two spaces per
    /// level; the root renders only its prose.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();
        self.collect_text(0, &mut lines);
        lines.join("\n")
    }

    fn collect_text(&self, depth: usize, lines: &mut Vec<String>) {
        let prose = self.prose().unwrap_or_default();
        match self.label() {
            Some(label) if depth > 0 => {
                let indent = "  ".repeat(depth - 1);
                lines.push(format!("{indent}{label}. {prose}").trim_end().to_string());
            }
            _ if !prose.is_empty() => lines.push(prose.to_string()),
            _ => {}
        }
        for part in self.parts().unwrap_or_default() {
            part.collect_text(depth + 1, lines);
        }
    }
}

fn non_empty_vec<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(items.filter(|items| !items.is_empty()))
}

fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = Option::<String>::deserialize(deserializer)?;
    Ok(text.filter(|text| !text.is_empty()))
}

/// Converts a parsed outline into a statement part tree.
///
/// The root becomes a `statement` part whose id is the outline's root label
/// (the statement id). Every descendant becomes an `item` part with id
/// `<parent id>.<label>` and a `label` property. Child order is preserved.
///
/// # Examples
///
/// ```
/// use compliance_io::{build, parse};
///
/// let part = build(parse("(a) Do X.\n(b) Do Y.", "ac-1_smt"));
/// assert_eq!(part.id(), "ac-1_smt");
/// let ids: Vec<_> = part.parts().unwrap().iter().map(|p| p.id()).collect();
/// assert_eq!(ids, ["ac-1_smt.a", "ac-1_smt.b"]);
/// ```
#[must_use]
pub fn build(outline: OutlineNode) -> Part {
    let (id, prose, children) = outline.into_parts();
    let parts = children
        .into_iter()
        .map(|child| build_item(&id, child))
        .collect();

    Part::new(id, STATEMENT)
        .with_prose(prose)
        .with_parts(parts)
}

fn build_item(parent_id: &str, node: OutlineNode) -> Part {
    let (label, prose, children) = node.into_parts();
    let id = format!("{parent_id}.{label}");
    let parts = children
        .into_iter()
        .map(|child| build_item(&id, child))
        .collect();

    Part::new(id, ITEM)
        .with_prop(Property::label(label))
        .with_prose(prose)
        .with_parts(parts)
}
