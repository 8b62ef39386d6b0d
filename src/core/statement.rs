//! SQL statement context
//!
//! Accumulates a base statement, `WHERE` fragments and the two argument groups
//! that go with them. Rendered arguments are always the statement-body
//! arguments followed by the condition arguments, which is the order the
//! placeholders appear in the rendered text.

use super::value::DatabaseValue;

/// Fixed row cap appended to every generated select
pub const ROW_LIMIT: usize = 20;

/// Base statement plus conjunctive `WHERE` conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    text: String,
    conditions: Vec<String>,
    body_args: Vec<DatabaseValue>,
    condition_args: Vec<DatabaseValue>,
}

impl Statement {
    /// Create an empty statement
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base statement text and append its body arguments
    ///
    /// # Example
    ///
    /// ```
    /// use swallow::core::statement::Statement;
    ///
    /// let stmt = Statement::new()
    ///     .prepare("update user set name = ?", vec!["bob".into()])
    ///     .and_where("id = ?", vec![5i64.into()]);
    ///
    /// assert_eq!(stmt.sql(), "update user set name = ? where id = ?");
    /// ```
    #[must_use]
    pub fn prepare(mut self, text: impl Into<String>, args: Vec<DatabaseValue>) -> Self {
        self.text = text.into();
        self.body_args.extend(args);
        self
    }

    /// Add a `WHERE` fragment and its arguments
    #[must_use]
    pub fn and_where(mut self, condition: impl Into<String>, args: Vec<DatabaseValue>) -> Self {
        self.conditions.push(condition.into());
        self.condition_args.extend(args);
        self
    }

    /// Check if any `WHERE` condition was added
    pub fn has_conditions(&self) -> bool {
        !self.conditions.is_empty()
    }

    /// Build the SQL text
    pub fn sql(&self) -> String {
        let mut sql = self.text.clone();

        if !self.conditions.is_empty() {
            sql.push_str(" where ");
            sql.push_str(&self.conditions.join(" AND "));
        }

        sql
    }

    /// Get the parameter values (body arguments followed by condition arguments)
    pub fn args(&self) -> Vec<DatabaseValue> {
        let mut args = self.body_args.clone();
        args.extend(self.condition_args.iter().cloned());
        args
    }
}

/// Read statement: a [`Statement`] rendered with the fixed [`ROW_LIMIT`]
///
/// Result sets beyond the limit are silently truncated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    statement: Statement,
}

impl Query {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base select text and append its body arguments
    #[must_use]
    pub fn prepare(mut self, text: impl Into<String>, args: Vec<DatabaseValue>) -> Self {
        self.statement = self.statement.prepare(text, args);
        self
    }

    /// Add a `WHERE` fragment and its arguments
    #[must_use]
    pub fn and_where(mut self, condition: impl Into<String>, args: Vec<DatabaseValue>) -> Self {
        self.statement = self.statement.and_where(condition, args);
        self
    }

    /// Check if any `WHERE` condition was added
    pub fn has_conditions(&self) -> bool {
        self.statement.has_conditions()
    }

    /// Build the SQL text, including the row limit
    pub fn sql(&self) -> String {
        format!("{} limit {}", self.statement.sql(), ROW_LIMIT)
    }

    /// Get the parameter values
    pub fn args(&self) -> Vec<DatabaseValue> {
        self.statement.args()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_without_conditions() {
        let stmt = Statement::new().prepare("delete from user", vec![]);
        assert_eq!(stmt.sql(), "delete from user");
        assert!(stmt.args().is_empty());
        assert!(!stmt.has_conditions());
    }

    #[test]
    fn test_statement_conditions_joined_with_and() {
        let stmt = Statement::new()
            .prepare("delete from user", vec![])
            .and_where("id = ?", vec![DatabaseValue::Long(1)])
            .and_where("name = ?", vec![DatabaseValue::from("a")]);

        assert_eq!(stmt.sql(), "delete from user where id = ? AND name = ?");
        assert_eq!(
            stmt.args(),
            vec![DatabaseValue::Long(1), DatabaseValue::from("a")]
        );
    }

    #[test]
    fn test_body_args_precede_condition_args() {
        // conditions added first still render after the body
        let stmt = Statement::new()
            .and_where("id = ?", vec![DatabaseValue::Long(5)])
            .prepare("update user set name = ?", vec![DatabaseValue::from("b")]);

        assert_eq!(stmt.sql(), "update user set name = ? where id = ?");
        assert_eq!(
            stmt.args(),
            vec![DatabaseValue::from("b"), DatabaseValue::Long(5)]
        );
    }

    #[test]
    fn test_prepare_replaces_text_but_keeps_args() {
        let stmt = Statement::new()
            .prepare("first", vec![DatabaseValue::Int(1)])
            .prepare("second", vec![DatabaseValue::Int(2)]);

        assert_eq!(stmt.sql(), "second");
        assert_eq!(stmt.args(), vec![DatabaseValue::Int(1), DatabaseValue::Int(2)]);
    }

    #[test]
    fn test_query_appends_limit() {
        let query = Query::new().prepare("select id, name from user", vec![]);
        assert_eq!(query.sql(), "select id, name from user limit 20");

        let query = query.and_where("name = ?", vec![DatabaseValue::from("a")]);
        assert_eq!(query.sql(), "select id, name from user where name = ? limit 20");
        assert_eq!(query.args().len(), 1);
    }
}
