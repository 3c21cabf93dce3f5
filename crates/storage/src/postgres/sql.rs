//! Rendering of keyset queries to PostgreSQL.
//!
//! Every identifier is looked up in a [`TableDef`] whitelist and the
//! whitelisted `&'static str` is what gets pushed, never the caller's
//! string. Every value goes through `push_bind`.

use sqlx::{Postgres, QueryBuilder};

use tasklist_core::error::{StorageError, StorageResult};
use tasklist_core::pagination::{FieldValue, KeysetQuery, Predicate, Selection};

use super::helpers::escape_like;

/// Table name plus the columns queries may reference.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    /// Columns selected and allowed in predicates.
    pub columns: &'static [&'static str],
    /// Unique integer columns allowed as ordering key.
    pub key_columns: &'static [&'static str],
}

pub const TASKS: TableDef = TableDef {
    name: "tasks",
    columns: &["id", "name", "description", "due_date", "done", "created_at"],
    key_columns: &["id"],
};

impl TableDef {
    fn column(&self, name: &str) -> StorageResult<&'static str> {
        self.columns
            .iter()
            .copied()
            .find(|c| *c == name)
            .ok_or_else(|| StorageError::QueryError(format!("unknown column: {}", name)))
    }

    fn key_column(&self, name: &str) -> StorageResult<&'static str> {
        self.key_columns
            .iter()
            .copied()
            .find(|c| *c == name)
            .ok_or_else(|| {
                StorageError::QueryError(format!("column {} cannot be an ordering key", name))
            })
    }
}

// =============================================================================
// Statements
// =============================================================================

/// `SELECT <columns> FROM t WHERE ... ORDER BY key <dir> [LIMIT n]`
pub fn select_page(
    table: &TableDef,
    query: &KeysetQuery,
) -> StorageResult<QueryBuilder<'static, Postgres>> {
    let key = table.key_column(query.key_field())?;
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(table.columns.join(", "));
    qb.push(" FROM ");
    qb.push(table.name);
    push_where(
        &mut qb,
        table,
        query.selection.predicates(),
        key,
        query.after,
        query.before,
    )?;
    qb.push(" ORDER BY ");
    qb.push(key);
    qb.push(" ");
    qb.push(query.direction.as_sql());
    if let Some(limit) = query.limit {
        qb.push(" LIMIT ");
        qb.push_bind(i64::from(limit));
    }
    Ok(qb)
}

/// `SELECT 1 FROM t WHERE ... LIMIT 1`
pub fn select_exists(
    table: &TableDef,
    query: &KeysetQuery,
) -> StorageResult<QueryBuilder<'static, Postgres>> {
    let key = table.key_column(query.key_field())?;
    let mut qb = QueryBuilder::new("SELECT 1 FROM ");
    qb.push(table.name);
    push_where(
        &mut qb,
        table,
        query.selection.predicates(),
        key,
        query.after,
        query.before,
    )?;
    qb.push(" LIMIT 1");
    Ok(qb)
}

/// `SELECT COUNT(*) FROM t WHERE <predicates>`; no key bounds.
pub fn select_count(
    table: &TableDef,
    selection: &Selection,
) -> StorageResult<QueryBuilder<'static, Postgres>> {
    table.key_column(selection.key_field())?;
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM ");
    qb.push(table.name);
    push_where(&mut qb, table, selection.predicates(), "", None, None)?;
    Ok(qb)
}

// =============================================================================
// Clauses
// =============================================================================

fn push_where(
    qb: &mut QueryBuilder<'static, Postgres>,
    table: &TableDef,
    predicates: &[Predicate],
    key: &'static str,
    after: Option<i64>,
    before: Option<i64>,
) -> StorageResult<()> {
    let mut clauses = 0;
    for predicate in predicates {
        push_clause(qb, &mut clauses);
        push_predicate(qb, table, predicate)?;
    }
    if let Some(after) = after {
        push_clause(qb, &mut clauses);
        qb.push(key);
        qb.push(" > ");
        qb.push_bind(after);
    }
    if let Some(before) = before {
        push_clause(qb, &mut clauses);
        qb.push(key);
        qb.push(" < ");
        qb.push_bind(before);
    }
    Ok(())
}

fn push_clause(qb: &mut QueryBuilder<'static, Postgres>, clauses: &mut usize) {
    qb.push(if *clauses == 0 { " WHERE " } else { " AND " });
    *clauses += 1;
}

fn push_predicate(
    qb: &mut QueryBuilder<'static, Postgres>,
    table: &TableDef,
    predicate: &Predicate,
) -> StorageResult<()> {
    match predicate {
        Predicate::Compare { field, op, value } => {
            qb.push(table.column(field)?);
            qb.push(" ");
            qb.push(op.as_sql());
            qb.push(" ");
            push_value(qb, value);
        }
        Predicate::Contains { field, needle } => {
            qb.push(table.column(field)?);
            qb.push(" ILIKE ");
            qb.push_bind(format!("%{}%", escape_like(needle)));
        }
        Predicate::IsNull(field) => {
            qb.push(table.column(field)?);
            qb.push(" IS NULL");
        }
        Predicate::And(parts) => push_group(qb, table, parts, " AND ", "TRUE")?,
        Predicate::Or(parts) => push_group(qb, table, parts, " OR ", "FALSE")?,
        Predicate::Not(inner) => {
            qb.push("NOT (");
            push_predicate(qb, table, inner)?;
            qb.push(")");
        }
    }
    Ok(())
}

fn push_group(
    qb: &mut QueryBuilder<'static, Postgres>,
    table: &TableDef,
    parts: &[Predicate],
    joiner: &'static str,
    empty: &'static str,
) -> StorageResult<()> {
    if parts.is_empty() {
        qb.push(empty);
        return Ok(());
    }
    qb.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            qb.push(joiner);
        }
        push_predicate(qb, table, part)?;
    }
    qb.push(")");
    Ok(())
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, value: &FieldValue) {
    match value {
        // Comparison with NULL is unknown, same as in-memory evaluation.
        FieldValue::Null => {
            qb.push("NULL");
        }
        FieldValue::Int(v) => {
            qb.push_bind(*v);
        }
        FieldValue::Text(v) => {
            qb.push_bind(v.clone());
        }
        FieldValue::Bool(v) => {
            qb.push_bind(*v);
        }
        FieldValue::Timestamp(v) => {
            qb.push_bind(*v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklist_core::pagination::{CompareOp, OrderDirection};

    const COLUMNS: &str = "id, name, description, due_date, done, created_at";

    fn selection() -> Selection {
        Selection::new("id")
    }

    #[test]
    fn test_forward_page() {
        let query = KeysetQuery {
            after: Some(15),
            limit: Some(15),
            ..KeysetQuery::scan(selection())
        };
        let qb = select_page(&TASKS, &query).unwrap();
        assert_eq!(
            qb.sql(),
            format!("SELECT {} FROM tasks WHERE id > $1 ORDER BY id ASC LIMIT $2", COLUMNS)
        );
    }

    #[test]
    fn test_tail_page_reads_descending() {
        let query = KeysetQuery {
            before: Some(9986),
            direction: OrderDirection::Desc,
            limit: Some(15),
            ..KeysetQuery::scan(selection().filter(Predicate::eq("done", false)))
        };
        let qb = select_page(&TASKS, &query).unwrap();
        assert_eq!(
            qb.sql(),
            format!(
                "SELECT {} FROM tasks WHERE done = $1 AND id < $2 ORDER BY id DESC LIMIT $3",
                COLUMNS
            )
        );
    }

    #[test]
    fn test_probe_is_limit_one() {
        let probe = KeysetQuery::probe_before(selection(), 16);
        let qb = select_exists(&TASKS, &probe).unwrap();
        assert_eq!(qb.sql(), "SELECT 1 FROM tasks WHERE id < $1 LIMIT 1");
    }

    // Test critique: le COUNT ignore les bornes du curseur
    #[test]
    fn test_count_keeps_filter_only() {
        let sel = selection().filter(Predicate::contains("name", "milk"));
        let qb = select_count(&TASKS, &sel).unwrap();
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM tasks WHERE name ILIKE $1");

        let qb = select_count(&TASKS, &selection()).unwrap();
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM tasks");
    }

    #[test]
    fn test_nested_predicates() {
        let sel = selection().filter(Predicate::Or(vec![
            Predicate::is_null("due_date"),
            Predicate::compare("id", CompareOp::Ge, 10_i64).negate(),
            Predicate::And(vec![]),
        ]));
        let qb = select_count(&TASKS, &sel).unwrap();
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM tasks WHERE (due_date IS NULL OR NOT (id >= $1) OR TRUE)"
        );
    }

    // Test critique: aucun identifiant hors liste blanche n'atteint le SQL
    #[test]
    fn test_rejects_unknown_identifiers() {
        let sel = selection().filter(Predicate::eq("name; DROP TABLE tasks", "x"));
        assert!(matches!(
            select_count(&TASKS, &sel),
            Err(StorageError::QueryError(_))
        ));

        let by_name = KeysetQuery::scan(selection().order_by_key("name"));
        assert!(select_page(&TASKS, &by_name).is_err());
    }

    #[test]
    fn test_null_comparison_is_inlined() {
        let sel = selection().filter(Predicate::eq("description", FieldValue::Null));
        let qb = select_count(&TASKS, &sel).unwrap();
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM tasks WHERE description = NULL");
    }
}
