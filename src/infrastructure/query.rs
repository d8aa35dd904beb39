//! Conjunctive predicate assembly
//!
//! Filters arrive as optional values and must become SQL predicates in a
//! fixed order with positional placeholders. Instead of string concatenation
//! with a hand-maintained parameter index, predicates are appended as
//! (template, bound value) pairs and `sqlx::QueryBuilder` renders the
//! placeholders when the statement is built.

use sqlx::postgres::Postgres;
use sqlx::{Encode, QueryBuilder, Type};

/// Builds `base [WHERE p1 [AND p2 ...]] [suffix]` statements.
///
/// The first predicate emits ` WHERE `, every following one ` AND `, so an
/// empty filter set leaves the base statement untouched rather than
/// producing a degenerate `WHERE 1=1`.
pub struct PredicateBuilder<'args> {
    builder: QueryBuilder<'args, Postgres>,
    has_predicate: bool,
}

impl<'args> PredicateBuilder<'args> {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            builder: QueryBuilder::new(base),
            has_predicate: false,
        }
    }

    /// Append one conjunctive predicate with a single bound value.
    ///
    /// The bound value lands between `before` and `after`, e.g.
    /// `predicate("(end_date IS NULL OR end_date >= ", date, ")")`.
    pub fn predicate<T>(&mut self, before: &str, value: T, after: &str) -> &mut Self
    where
        T: 'args + Encode<'args, Postgres> + Type<Postgres>,
    {
        self.push_separator();
        self.builder.push(before);
        self.builder.push_bind(value);
        self.builder.push(after);
        self
    }

    /// Append raw SQL outside the predicate list (ORDER BY etc.).
    pub fn raw(&mut self, sql: &str) -> &mut Self {
        self.builder.push(sql);
        self
    }

    /// The statement text rendered so far, with positional placeholders.
    pub fn sql(&self) -> &str {
        self.builder.sql()
    }

    pub fn builder(&mut self) -> &mut QueryBuilder<'args, Postgres> {
        &mut self.builder
    }

    fn push_separator(&mut self) {
        if self.has_predicate {
            self.builder.push(" AND ");
        } else {
            self.builder.push(" WHERE ");
            self.has_predicate = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn no_predicates_leaves_base_untouched() {
        let builder = PredicateBuilder::new("SELECT * FROM subscriptions");
        assert_eq!(builder.sql(), "SELECT * FROM subscriptions");
    }

    #[test]
    fn first_predicate_emits_where() {
        let mut builder = PredicateBuilder::new("SELECT * FROM subscriptions");
        builder.predicate("user_id = ", Uuid::nil(), "");
        assert_eq!(
            builder.sql(),
            "SELECT * FROM subscriptions WHERE user_id = $1"
        );
    }

    #[test]
    fn later_predicates_emit_and_with_sequential_placeholders() {
        let mut builder = PredicateBuilder::new("SELECT * FROM subscriptions");
        builder.predicate("user_id = ", Uuid::nil(), "");
        builder.predicate("service_name = ", "Netflix".to_string(), "");
        assert_eq!(
            builder.sql(),
            "SELECT * FROM subscriptions WHERE user_id = $1 AND service_name = $2"
        );
    }

    #[test]
    fn raw_sql_does_not_affect_predicate_state() {
        let mut builder = PredicateBuilder::new("SELECT * FROM subscriptions");
        builder.predicate("service_name = ", "Spotify".to_string(), "");
        builder.raw(" ORDER BY created_at DESC");
        assert_eq!(
            builder.sql(),
            "SELECT * FROM subscriptions WHERE service_name = $1 ORDER BY created_at DESC"
        );
    }

    #[test]
    fn value_can_sit_inside_a_compound_template() {
        let mut builder = PredicateBuilder::new("SELECT 1 FROM subscriptions");
        builder.predicate(
            "(end_date IS NULL OR end_date >= ",
            "2024-01-01".to_string(),
            ")",
        );
        assert_eq!(
            builder.sql(),
            "SELECT 1 FROM subscriptions WHERE (end_date IS NULL OR end_date >= $1)"
        );
    }
}
