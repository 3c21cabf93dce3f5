//! Records that can be paginated.

use chrono::{DateTime, Utc};

use crate::error::{StorageError, StorageResult};

use super::query::Predicate;

/// A typed field value, as seen by predicates and adapters.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Int(i64),
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Int(_) => "integer",
            FieldValue::Text(_) => "text",
            FieldValue::Bool(_) => "boolean",
            FieldValue::Timestamp(_) => "timestamp",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

/// A record the paginator can page over.
///
/// The record must carry a unique, strictly increasing integer key
/// ([`Node::KEY_FIELD`]). A filter extension may pick another integer field
/// as the ordering key; uniqueness of that field is the caller's concern.
pub trait Node: Clone + Send + Sync + 'static {
    /// Default ordering key.
    const KEY_FIELD: &'static str = "id";

    /// Every field name predicates may refer to.
    const FIELDS: &'static [&'static str];

    /// Value of a field, or `None` when the record has no such field.
    fn field(&self, name: &str) -> Option<FieldValue>;

    /// Predicate every selection of this record type starts from.
    fn base_predicate() -> Option<Predicate> {
        None
    }

    /// Ordering key of this record under the given key field.
    fn ordering_key(&self, key_field: &str) -> StorageResult<i64> {
        match self.field(key_field) {
            Some(FieldValue::Int(key)) => Ok(key),
            Some(other) => Err(StorageError::SerializationError(format!(
                "ordering key {} must be an integer, got {}",
                key_field,
                other.type_name()
            ))),
            None => Err(StorageError::SerializationError(format!(
                "record has no ordering key field {}",
                key_field
            ))),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Minimal record used by the engine tests.
    #[derive(Debug, Clone, PartialEq)]
    pub struct Item {
        pub id: i64,
        pub rank: i64,
        pub label: String,
        pub even: bool,
        pub note: Option<String>,
    }

    impl Item {
        pub fn new(id: i64) -> Self {
            Self {
                id,
                rank: id * 10,
                label: format!("item-{}", id),
                even: id % 2 == 0,
                note: (id % 3 == 0).then(|| "fizz".to_string()),
            }
        }
    }

    impl Node for Item {
        const FIELDS: &'static [&'static str] = &["id", "rank", "label", "even", "note"];

        fn field(&self, name: &str) -> Option<FieldValue> {
            Some(match name {
                "id" => self.id.into(),
                "rank" => self.rank.into(),
                "label" => self.label.clone().into(),
                "even" => self.even.into(),
                "note" => self.note.clone().into(),
                _ => return None,
            })
        }
    }

    pub fn items(n: i64) -> Vec<Item> {
        (1..=n).map(Item::new).collect()
    }
}
