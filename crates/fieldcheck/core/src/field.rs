//! Field references and validation identities

use std::fmt;

use serde::{Deserialize, Serialize};

/// The attributes of a form field the controller identifies it by
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl FieldRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: Some(name.into()),
        }
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            name: None,
        }
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
        }
    }

    /// Human-readable label for logs and errors
    pub fn label(&self) -> String {
        match (&self.id, &self.name) {
            (Some(id), _) => format!("#{}", id),
            (None, Some(name)) => format!("[name={}]", name),
            (None, None) => "<anonymous field>".to_string(),
        }
    }
}

/// Identity of one validator applied to one field
///
/// The same validator applied to two fields gets two keys, so a REQUIRE on
/// `name` and a REQUIRE on `email` are tracked independently. Applying it to
/// the same field again yields the same key and overwrites the stored result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldKey {
    pub validator: String,
    pub field_id: Option<String>,
    pub field_name: Option<String>,
}

impl FieldKey {
    pub fn new(validator: impl Into<String>, field: &FieldRef) -> Self {
        Self {
            validator: validator.into(),
            field_id: field.id.clone(),
            field_name: field.name.clone(),
        }
    }

    /// Delimiter-less concatenation of validator, id and name
    ///
    /// Absent attributes render as `undefined`. Distinct keys can produce the
    /// same string here (`id="ab" name="c"` vs `id="a" name="bc"`), so it is
    /// only for interop with markup that expects this form; results are never
    /// stored under it.
    pub fn legacy_id(&self) -> String {
        format!(
            "{}{}{}",
            self.validator,
            self.field_id.as_deref().unwrap_or("undefined"),
            self.field_name.as_deref().unwrap_or("undefined"),
        )
    }

    pub fn field(&self) -> FieldRef {
        FieldRef {
            id: self.field_id.clone(),
            name: self.field_name.clone(),
        }
    }
}

/// Delimited token, safe to use as an attribute value
///
/// An absent attribute renders as `-`, so it never matches an empty one.
impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            escape(&self.validator),
            escape_optional(self.field_id.as_deref()),
            escape_optional(self.field_name.as_deref()),
        )
    }
}

const ABSENT: &str = "-";

fn escape(part: &str) -> String {
    part.replace('%', "%25")
        .replace(':', "%3A")
        .replace('-', "%2D")
}

fn escape_optional(part: Option<&str>) -> String {
    part.map(escape).unwrap_or_else(|| ABSENT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_same_field_same_key() {
        let field = FieldRef::new("email", "email");
        assert_eq!(FieldKey::new("REQUIRE", &field), FieldKey::new("REQUIRE", &field));
        assert_ne!(FieldKey::new("REQUIRE", &field), FieldKey::new("EMAIL", &field));
    }

    #[test]
    fn test_legacy_id_collides_where_key_does_not() {
        let a = FieldKey::new("REQUIRE", &FieldRef::new("ab", "c"));
        let b = FieldKey::new("REQUIRE", &FieldRef::new("a", "bc"));

        assert_eq!(a.legacy_id(), b.legacy_id());
        assert_ne!(a, b);
        assert_ne!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_legacy_id_renders_missing_attributes() {
        let key = FieldKey::new("REQUIRE", &FieldRef::with_name("phone"));
        assert_eq!(key.legacy_id(), "REQUIREundefinedphone");
    }

    #[test]
    fn test_display_escapes_separator() {
        let key = FieldKey::new("EQUAL", &FieldRef::new("a:b", "c"));
        assert_eq!(key.to_string(), "EQUAL:a%3Ab:c");

        let anonymous = FieldKey::new("REQUIRE", &FieldRef::default());
        assert_eq!(anonymous.to_string(), "REQUIRE:-:-");

        let dashed = FieldKey::new("REQUIRE", &FieldRef::new("-", "first-name"));
        assert_eq!(dashed.to_string(), "REQUIRE:%2D:first%2Dname");
    }

    #[test]
    fn test_absent_and_empty_attributes_render_differently() {
        let absent = FieldKey::new("REQUIRE", &FieldRef::with_name("n"));
        let empty = FieldKey::new("REQUIRE", &FieldRef::new("", "n"));
        let dash = FieldKey::new("REQUIRE", &FieldRef::new("-", "n"));

        assert_ne!(absent, empty);
        assert_eq!(absent.to_string(), "REQUIRE:-:n");
        assert_eq!(empty.to_string(), "REQUIRE::n");
        assert_ne!(absent.to_string(), dash.to_string());
    }

    #[test]
    fn test_label() {
        assert_eq!(FieldRef::new("email", "mail").label(), "#email");
        assert_eq!(FieldRef::with_name("mail").label(), "[name=mail]");
    }
}
