//! Store-agnostic query model.
//!
//! A [`Selection`] says which records take part in pagination: the AND of a
//! list of [`Predicate`]s plus the ordering key field. A [`KeysetQuery`] adds
//! the exclusive key bounds, the direction and the row limit. Adapters
//! (in-memory, PostgreSQL) execute `KeysetQuery` and count `Selection`.

use std::cmp::Ordering;

use crate::error::{ExtensionError, StorageError, StorageResult};

use super::connection::OrderDirection;
use super::node::{FieldValue, Node};

// =============================================================================
// Predicates
// =============================================================================

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// Filter expression over record fields.
///
/// Evaluation follows SQL three-valued logic: a comparison against NULL is
/// unknown, and only rows where the whole expression is true match.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `field <op> value`
    Compare {
        field: String,
        op: CompareOp,
        value: FieldValue,
    },
    /// Case-insensitive substring match on a text field.
    Contains { field: String, needle: String },
    /// `field IS NULL`
    IsNull(String),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<FieldValue>) -> Self {
        Predicate::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Predicate::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Predicate::IsNull(field.into())
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Visit every field name this predicate refers to.
    pub fn for_each_field<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            Predicate::Compare { field, .. }
            | Predicate::Contains { field, .. }
            | Predicate::IsNull(field) => f(field.as_str()),
            Predicate::And(parts) | Predicate::Or(parts) => {
                for part in parts {
                    part.for_each_field(f);
                }
            }
            Predicate::Not(inner) => inner.for_each_field(f),
        }
    }

    /// Evaluate against a record. `None` means unknown (NULL involved).
    pub fn eval<N: Node>(&self, node: &N) -> StorageResult<Option<bool>> {
        match self {
            Predicate::Compare { field, op, value } => {
                let actual = read_field(node, field)?;
                Ok(compare_values(field, &actual, value)?.map(|o| op.holds(o)))
            }
            Predicate::Contains { field, needle } => match read_field(node, field)? {
                FieldValue::Null => Ok(None),
                FieldValue::Text(text) => Ok(Some(
                    text.to_lowercase().contains(&needle.to_lowercase()),
                )),
                other => Err(type_mismatch(field, "text", &other)),
            },
            Predicate::IsNull(field) => Ok(Some(read_field(node, field)?.is_null())),
            Predicate::And(parts) => {
                let mut unknown = false;
                for part in parts {
                    match part.eval(node)? {
                        Some(false) => return Ok(Some(false)),
                        None => unknown = true,
                        Some(true) => {}
                    }
                }
                Ok(if unknown { None } else { Some(true) })
            }
            Predicate::Or(parts) => {
                let mut unknown = false;
                for part in parts {
                    match part.eval(node)? {
                        Some(true) => return Ok(Some(true)),
                        None => unknown = true,
                        Some(false) => {}
                    }
                }
                Ok(if unknown { None } else { Some(false) })
            }
            Predicate::Not(inner) => Ok(inner.eval(node)?.map(|b| !b)),
        }
    }
}

fn read_field<N: Node>(node: &N, field: &str) -> StorageResult<FieldValue> {
    node.field(field)
        .ok_or_else(|| StorageError::QueryError(format!("unknown field: {}", field)))
}

fn compare_values(
    field: &str,
    actual: &FieldValue,
    expected: &FieldValue,
) -> StorageResult<Option<Ordering>> {
    Ok(match (actual, expected) {
        (FieldValue::Null, _) | (_, FieldValue::Null) => None,
        (FieldValue::Int(a), FieldValue::Int(b)) => Some(a.cmp(b)),
        (FieldValue::Text(a), FieldValue::Text(b)) => Some(a.cmp(b)),
        (FieldValue::Bool(a), FieldValue::Bool(b)) => Some(a.cmp(b)),
        (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => Some(a.cmp(b)),
        (a, b) => return Err(type_mismatch(field, b.type_name(), a)),
    })
}

fn type_mismatch(field: &str, expected: &str, actual: &FieldValue) -> StorageError {
    StorageError::QueryError(format!(
        "type mismatch on {}: expected {}, found {}",
        field,
        expected,
        actual.type_name()
    ))
}

// =============================================================================
// Selection & filter extension
// =============================================================================

/// The filtered, unbounded set of records a page is cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    predicates: Vec<Predicate>,
    key_field: String,
}

impl Selection {
    /// Empty selection ordered by `key_field`.
    pub fn new(key_field: impl Into<String>) -> Self {
        Self {
            predicates: Vec::new(),
            key_field: key_field.into(),
        }
    }

    /// Base selection of a record type: its key field and base predicate.
    pub fn for_node<N: Node>() -> Self {
        Self {
            predicates: N::base_predicate().into_iter().collect(),
            key_field: N::KEY_FIELD.to_string(),
        }
    }

    /// Add a predicate (AND-ed with the existing ones).
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Order by another unique, monotonic integer field.
    pub fn order_by_key(mut self, field: impl Into<String>) -> Self {
        self.key_field = field.into();
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    /// Whether a record belongs to this selection.
    pub fn matches<N: Node>(&self, node: &N) -> StorageResult<bool> {
        for predicate in &self.predicates {
            if predicate.eval(node)? != Some(true) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Check that every referenced field exists on the record type.
    pub fn check_fields<N: Node>(&self) -> Result<(), ExtensionError> {
        let mut unknown = None;
        let mut visit = |field: &str| {
            if unknown.is_none() && !N::FIELDS.contains(&field) {
                unknown = Some(field.to_string());
            }
        };
        visit(self.key_field.as_str());
        for predicate in &self.predicates {
            predicate.for_each_field(&mut visit);
        }
        match unknown {
            Some(field) => Err(ExtensionError::new(format!("unknown field: {}", field))),
            None => Ok(()),
        }
    }
}

/// Caller-supplied hook that augments a selection before paging bounds are
/// applied.
///
/// Implementations may add predicates and switch the ordering key. They
/// must keep a single deterministic total order over the result.
pub trait FilterExtension: Send + Sync {
    fn extend(&self, selection: Selection) -> Result<Selection, ExtensionError>;
}

impl<F> FilterExtension for F
where
    F: Fn(Selection) -> Result<Selection, ExtensionError> + Send + Sync,
{
    fn extend(&self, selection: Selection) -> Result<Selection, ExtensionError> {
        self(selection)
    }
}

// =============================================================================
// Keyset query
// =============================================================================

/// One bounded, ordered read against a selection.
#[derive(Debug, Clone, PartialEq)]
pub struct KeysetQuery {
    pub selection: Selection,
    /// Exclusive lower bound on the key.
    pub after: Option<i64>,
    /// Exclusive upper bound on the key.
    pub before: Option<i64>,
    pub direction: OrderDirection,
    pub limit: Option<u32>,
}

impl KeysetQuery {
    /// Unbounded, unlimited ascending scan of a selection.
    pub fn scan(selection: Selection) -> Self {
        Self {
            selection,
            after: None,
            before: None,
            direction: OrderDirection::Asc,
            limit: None,
        }
    }

    /// "Is there any record with key < `key`?"
    pub fn probe_before(selection: Selection, key: i64) -> Self {
        Self {
            before: Some(key),
            direction: OrderDirection::Desc,
            limit: Some(1),
            ..Self::scan(selection)
        }
    }

    /// "Is there any record with key > `key`?"
    pub fn probe_after(selection: Selection, key: i64) -> Self {
        Self {
            after: Some(key),
            limit: Some(1),
            ..Self::scan(selection)
        }
    }

    pub fn key_field(&self) -> &str {
        self.selection.key_field()
    }

    /// Whether a key falls inside the exclusive bounds.
    pub fn admits(&self, key: i64) -> bool {
        self.after.is_none_or(|after| key > after) && self.before.is_none_or(|before| key < before)
    }
}

#[cfg(test)]
mod tests {
    use super::super::node::test_support::Item;
    use super::*;

    #[test]
    fn test_compare_predicates() {
        let item = Item::new(6);
        assert_eq!(Predicate::eq("even", true).eval(&item).unwrap(), Some(true));
        assert_eq!(
            Predicate::compare("rank", CompareOp::Lt, 60_i64).eval(&item).unwrap(),
            Some(false)
        );
        assert_eq!(
            Predicate::compare("rank", CompareOp::Le, 60_i64).eval(&item).unwrap(),
            Some(true)
        );
    }

    #[test]
    fn test_null_comparison_is_unknown() {
        let item = Item::new(1);
        assert_eq!(item.note, None);
        assert_eq!(Predicate::eq("note", "fizz").eval(&item).unwrap(), None);
        assert_eq!(
            Predicate::eq("note", "fizz").negate().eval(&item).unwrap(),
            None
        );
        assert_eq!(Predicate::is_null("note").eval(&item).unwrap(), Some(true));

        let selection = Selection::new("id").filter(Predicate::eq("note", "fizz").negate());
        assert!(!selection.matches(&item).unwrap());
    }

    #[test]
    fn test_and_or_three_valued() {
        let item = Item::new(1);
        let unknown = Predicate::eq("note", "x");
        let yes = Predicate::eq("id", 1_i64);
        let no = Predicate::eq("id", 2_i64);

        assert_eq!(
            Predicate::Or(vec![unknown.clone(), yes.clone()]).eval(&item).unwrap(),
            Some(true)
        );
        assert_eq!(
            Predicate::And(vec![unknown.clone(), no.clone()]).eval(&item).unwrap(),
            Some(false)
        );
        assert_eq!(Predicate::And(vec![unknown, yes]).eval(&item).unwrap(), None);
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let item = Item::new(12);
        assert_eq!(
            Predicate::contains("label", "ITEM-1").eval(&item).unwrap(),
            Some(true)
        );
        assert!(Predicate::contains("id", "1").eval(&item).is_err());
    }

    #[test]
    fn test_type_mismatch_is_query_error() {
        let err = Predicate::eq("id", "one").eval(&Item::new(1)).unwrap_err();
        assert!(err.to_string().contains("type mismatch on id"));
    }

    #[test]
    fn test_check_fields_reports_unknown_field() {
        let ok = Selection::for_node::<Item>().filter(Predicate::eq("even", true));
        assert!(ok.check_fields::<Item>().is_ok());

        let bad = Selection::for_node::<Item>()
            .filter(Predicate::Or(vec![Predicate::is_null("nope")]));
        assert_eq!(
            bad.check_fields::<Item>().unwrap_err(),
            ExtensionError::new("unknown field: nope")
        );

        let bad_key = Selection::for_node::<Item>().order_by_key("missing");
        assert!(bad_key.check_fields::<Item>().is_err());
    }

    #[test]
    fn test_probe_shapes() {
        let sel = Selection::new("id");
        let prev = KeysetQuery::probe_before(sel.clone(), 10);
        assert_eq!(prev.before, Some(10));
        assert_eq!(prev.limit, Some(1));
        assert!(prev.admits(9) && !prev.admits(10));

        let next = KeysetQuery::probe_after(sel, 10);
        assert_eq!(next.direction, OrderDirection::Asc);
        assert!(next.admits(11) && !next.admits(10));
    }
}
