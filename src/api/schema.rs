//! Embedded database schema, applied once at startup.
//!
//! Every statement in `sql/schema.sql` must stay idempotent
//! (`CREATE TABLE IF NOT EXISTS` and friends) so restarting the server against
//! an existing database is a no-op.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::Instrument;

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

/// Apply the embedded schema statement by statement.
///
/// # Errors
/// Returns an error if any statement fails to execute.
pub(crate) async fn apply(pool: &PgPool) -> Result<()> {
    for (index, statement) in split_sql_statements(SCHEMA_SQL).iter().enumerate() {
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DDL"
        );
        sqlx::query(statement)
            .execute(pool)
            .instrument(span)
            .await
            .with_context(|| format!("failed to execute schema statement {}", index + 1))?;
    }

    Ok(())
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::{split_sql_statements, SCHEMA_SQL};

    #[test]
    fn schema_splits_into_create_statements() {
        let statements = split_sql_statements(SCHEMA_SQL);
        assert!(!statements.is_empty());
        assert!(statements.iter().all(|statement| statement.contains("CREATE")));
        assert!(statements
            .iter()
            .any(|statement| statement.contains("CREATE TABLE IF NOT EXISTS users")));
    }

    #[test]
    fn split_skips_comments_and_keeps_multiline_statements() {
        let sql = "-- comment\nCREATE TABLE a (\n    id BIGINT\n);\nCREATE INDEX b ON a (id);\n";
        let statements = split_sql_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE a"));
        assert!(statements[0].ends_with(';'));
        assert_eq!(statements[1], "CREATE INDEX b ON a (id);");
    }

    #[test]
    fn split_collects_trailing_statement_without_semicolon() {
        let statements = split_sql_statements("CREATE TABLE a (id BIGINT)");
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0], "CREATE TABLE a (id BIGINT)");
    }
}
