//! Statement planning for CRUD operations
//!
//! Blank fields (zero values) are treated as unset: they are left out of
//! inserts and updates and never become filters. Ignored fields never appear
//! in generated SQL.

use crate::core::statement::{Query, Statement};
use crate::model::{Model, Schema};

/// Select over all non-ignored columns; every non-blank field is an equality filter
pub fn select_query<M: Model>(schema: &Schema<M>, model: &M) -> Query {
    let mut query = Query::new();
    let mut columns = Vec::new();

    for field in schema.fields().iter().filter(|f| !f.is_ignore()) {
        columns.push(field.column_name());

        if field.is_blank(model) {
            continue;
        }

        query = query.and_where(
            format!("{} = ?", field.column_name()),
            vec![field.value(model)],
        );
    }

    query.prepare(
        format!("select {} from {}", columns.join(", "), M::table_name()),
        vec![],
    )
}

/// Insert over all non-blank, non-ignored columns
pub fn insert_statement<M: Model>(schema: &Schema<M>, model: &M) -> Statement {
    let mut columns = Vec::new();
    let mut values = Vec::new();

    for field in schema.fields() {
        if field.is_ignore() || field.is_blank(model) {
            continue;
        }

        columns.push(field.column_name());
        values.push(field.value(model));
    }

    let placeholders = vec!["?"; values.len()];
    Statement::new().prepare(
        format!(
            "insert into {} ({}) values ({})",
            M::table_name(),
            columns.join(", "),
            placeholders.join(", ")
        ),
        values,
    )
}

/// Update: non-key fields become assignments, the primary key becomes the filter
pub fn update_statement<M: Model>(schema: &Schema<M>, model: &M) -> Statement {
    let mut stmt = Statement::new();
    let mut assignments = Vec::new();
    let mut values = Vec::new();

    for field in schema.fields() {
        if field.is_ignore() || field.is_blank(model) {
            continue;
        }

        if field.is_primary_key() {
            stmt = stmt.and_where(
                format!("{} = ?", field.column_name()),
                vec![field.value(model)],
            );
        } else {
            assignments.push(format!("{} = ?", field.column_name()));
            values.push(field.value(model));
        }
    }

    stmt.prepare(
        format!("update {} set {}", M::table_name(), assignments.join(", ")),
        values,
    )
}

/// Delete filtered on every non-blank, non-ignored field
pub fn delete_statement<M: Model>(schema: &Schema<M>, model: &M) -> Statement {
    let mut stmt = Statement::new();

    for field in schema.fields() {
        if field.is_ignore() || field.is_blank(model) {
            continue;
        }

        stmt = stmt.and_where(
            format!("{} = ?", field.column_name()),
            vec![field.value(model)],
        );
    }

    stmt.prepare(format!("delete from {}", M::table_name()), vec![])
}
