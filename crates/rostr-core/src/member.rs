//! Member data model for rostr
//!
//! A member is not a fixed struct: beyond the reserved `id`, `short_id` and
//! `category` keys, its fields are whatever the active schema declares. The
//! schema itself is user-editable, so the remainder of a member is kept as an
//! ordered JSON map.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Category assigned to members whose own category was deleted.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A single member record.
///
/// Reserved keys are typed; every schema-driven field lives in `fields` and
/// round-trips through `members.json` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Member {
    /// Unique identifier (UUID v4, assigned on first save when empty)
    #[serde(default)]
    pub id: String,

    /// Display identifier (e.g. MEM-042), assigned by the UI shell
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,

    /// Category name; absent means uncategorized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Schema-driven fields, keyed by field id
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Member {
    /// Create an empty member with the given id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Whether the member carries a non-empty identifier
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    /// Assign a fresh identifier when the member lacks one.
    ///
    /// Returns true when an id was assigned.
    pub fn ensure_id(&mut self) -> bool {
        if self.has_id() {
            return false;
        }
        self.id = crate::id::generate_id();
        true
    }

    /// Get a schema-driven field value
    pub fn field(&self, field_id: &str) -> Option<&Value> {
        self.fields.get(field_id)
    }

    /// Set a schema-driven field value
    pub fn set_field(&mut self, field_id: impl Into<String>, value: Value) {
        self.fields.insert(field_id.into(), value);
    }

    /// Render one export cell for the named column.
    ///
    /// Missing fields render as the empty string; non-string values render via
    /// their JSON representation.
    pub fn export_cell(&self, column: &str) -> String {
        match column {
            "id" => self.id.clone(),
            "short_id" => self.short_id.clone().unwrap_or_default(),
            "category" => self.category.clone().unwrap_or_default(),
            _ => match self.fields.get(column) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            },
        }
    }
}

/// Rendering/validation type of a schema field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    #[default]
    Text,
    Textarea,
    Number,
    Date,
    Email,
    Tel,
    Url,
    Select,
    Checkbox,
}

impl std::str::FromStr for FieldType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(FieldType::Text),
            "textarea" => Ok(FieldType::Textarea),
            "number" => Ok(FieldType::Number),
            "date" => Ok(FieldType::Date),
            "email" => Ok(FieldType::Email),
            "tel" | "phone" => Ok(FieldType::Tel),
            "url" => Ok(FieldType::Url),
            "select" => Ok(FieldType::Select),
            "checkbox" => Ok(FieldType::Checkbox),
            _ => Err(crate::Error::InvalidPayload(format!(
                "unknown field type: {s}"
            ))),
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::Text => write!(f, "text"),
            FieldType::Textarea => write!(f, "textarea"),
            FieldType::Number => write!(f, "number"),
            FieldType::Date => write!(f, "date"),
            FieldType::Email => write!(f, "email"),
            FieldType::Tel => write!(f, "tel"),
            FieldType::Url => write!(f, "url"),
            FieldType::Select => write!(f, "select"),
            FieldType::Checkbox => write!(f, "checkbox"),
        }
    }
}

/// One schema entry declaring a member attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field id, used as the member key and the CSV column name
    pub id: String,

    /// Human-readable label
    pub label: String,

    /// Rendering/validation type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Comma-separated choices for select fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,

    /// Whether the UI should require a value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl FieldDef {
    pub fn new(id: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            field_type,
            options: None,
            required: None,
        }
    }
}

/// The two-field schema written to a fresh data directory
pub fn starter_schema() -> Vec<FieldDef> {
    vec![
        FieldDef::new("name", "Name", FieldType::Text),
        FieldDef::new("dob", "Date of Birth", FieldType::Date),
    ]
}

/// Application preferences, persisted to settings.json
///
/// The three known keys are typed with defaults; anything else the UI shell
/// stores survives in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: String,
    pub default_category: String,
    pub date_format: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            default_category: "General".to_string(),
            date_format: "YYYY-MM-DD".to_string(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn member_round_trips_schema_fields() {
        let raw = json!({
            "id": "abc",
            "short_id": "MEM-001",
            "category": "General",
            "name": "Ada",
            "dob": "1815-12-10"
        });
        let member: Member = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(member.id, "abc");
        assert_eq!(member.field("name"), Some(&json!("Ada")));

        let back = serde_json::to_value(&member).unwrap();
        assert_eq!(back, raw);
    }

    #[test]
    fn member_without_id_deserializes_empty() {
        let member: Member = serde_json::from_value(json!({"name": "Ada"})).unwrap();
        assert!(!member.has_id());
        assert!(member.category.is_none());
    }

    #[test]
    fn ensure_id_assigns_once() {
        let mut member = Member::default();
        assert!(member.ensure_id());
        let assigned = member.id.clone();
        assert!(!assigned.is_empty());
        assert!(!member.ensure_id());
        assert_eq!(member.id, assigned);
    }

    #[test]
    fn export_cell_handles_missing_and_non_string() {
        let mut member = Member::new("x");
        member.set_field("age", json!(42));
        assert_eq!(member.export_cell("age"), "42");
        assert_eq!(member.export_cell("missing"), "");
        assert_eq!(member.export_cell("short_id"), "");
    }

    #[test]
    fn field_type_parse_and_display() {
        let t: FieldType = "tel".parse().unwrap();
        assert_eq!(t, FieldType::Tel);
        assert_eq!(t.to_string(), "tel");
        assert!("blob".parse::<FieldType>().is_err());
    }

    #[test]
    fn settings_defaults_and_extra_keys() {
        let settings = Settings::default();
        assert_eq!(settings.theme, "dark");
        assert_eq!(settings.default_category, "General");

        let parsed: Settings =
            serde_json::from_value(json!({"theme": "light", "sidebar": true})).unwrap();
        assert_eq!(parsed.theme, "light");
        assert_eq!(parsed.extra.get("sidebar"), Some(&json!(true)));
    }
}
