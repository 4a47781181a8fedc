//! Row type: ordered list of named, typed fields per plan node

use crate::types::SqlType;
use serde::{Deserialize, Serialize};

/// A single output field of a relational node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowField {
    /// Field name, unique within its row type
    pub name: String,
    /// Declared SQL type
    #[serde(rename = "type")]
    pub ty: SqlType,
}

impl RowField {
    /// Create a field
    pub fn new(name: impl Into<String>, ty: SqlType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Row type of a relational node's output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowType {
    /// Ordered list of output fields
    pub fields: Vec<RowField>,
}

impl RowType {
    /// Create an empty row type
    pub fn empty() -> Self {
        Self { fields: Vec::new() }
    }

    /// Create a row type from a list of fields
    pub fn new(fields: Vec<RowField>) -> Self {
        Self { fields }
    }

    /// Build a row type from `(name, type)` pairs
    pub fn of<S: Into<String>>(pairs: impl IntoIterator<Item = (S, SqlType)>) -> Self {
        Self {
            fields: pairs
                .into_iter()
                .map(|(name, ty)| RowField::new(name, ty))
                .collect(),
        }
    }

    /// Field at a position
    pub fn field(&self, index: usize) -> Option<&RowField> {
        self.fields.get(index)
    }

    /// Find a field by exact name
    pub fn find(&self, name: &str) -> Option<&RowField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Position of a field by exact name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Concatenate two row types (join output before renaming)
    pub fn concat(left: &RowType, right: &RowType) -> Self {
        let mut fields = left.fields.clone();
        fields.extend(right.fields.iter().cloned());
        Self { fields }
    }

    /// Concatenate two row types, suffixing right-side names that collide
    /// with an earlier name (`id`, `id0`, `id1`, ...)
    pub fn join_of(left: &RowType, right: &RowType) -> Self {
        let mut fields = left.fields.clone();
        for field in &right.fields {
            let mut name = field.name.clone();
            let mut suffix = 0;
            while fields.iter().any(|f| f.name == name) {
                name = format!("{}{}", field.name, suffix);
                suffix += 1;
            }
            fields.push(RowField::new(name, field.ty.clone()));
        }
        Self { fields }
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row type has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in order
    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// First name that appears more than once, if any
    pub fn duplicate_name(&self) -> Option<&str> {
        self.fields.iter().enumerate().find_map(|(i, f)| {
            self.fields[..i]
                .iter()
                .any(|earlier| earlier.name == f.name)
                .then_some(f.name.as_str())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_and_index() {
        let row = RowType::of([("id", SqlType::integer()), ("name", SqlType::varchar())]);
        assert_eq!(row.index_of("name"), Some(1));
        assert!(row.find("id").is_some());
        assert!(row.find("ID").is_none());
        assert_eq!(row.field(1).map(|f| f.name.as_str()), Some("name"));
        assert!(row.field(2).is_none());
    }

    #[test]
    fn test_join_of_suffixes_collisions() {
        let left = RowType::of([("id", SqlType::integer()), ("v", SqlType::varchar())]);
        let right = RowType::of([("id", SqlType::integer()), ("id0", SqlType::integer())]);
        let joined = RowType::join_of(&left, &right);
        assert_eq!(joined.names(), vec!["id", "v", "id0", "id00"]);
        assert!(joined.duplicate_name().is_none());
    }

    #[test]
    fn test_duplicate_name() {
        let row = RowType::concat(
            &RowType::of([("a", SqlType::integer())]),
            &RowType::of([("a", SqlType::integer())]),
        );
        assert_eq!(row.duplicate_name(), Some("a"));
    }
}
