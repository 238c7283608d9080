//! Database helpers for account records.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;

/// Account row as stored, including the password hash.
#[derive(Debug)]
pub(crate) struct AccountRecord {
    pub(crate) id: i64,
    pub(crate) email: String,
    pub(crate) name: String,
    pub(crate) address: Option<String>,
    pub(crate) shipping_info: Option<String>,
    pub(crate) is_admin: bool,
    pub(crate) hashed_password: String,
}

/// Input for account creation. The hash comes from `password::hash` only;
/// nothing else ever writes the `hashed_password` column.
pub(crate) struct NewAccount<'a> {
    pub(crate) email: &'a str,
    pub(crate) name: &'a str,
    pub(crate) address: Option<&'a str>,
    pub(crate) shipping_info: Option<&'a str>,
    pub(crate) is_admin: bool,
    pub(crate) hashed_password: &'a str,
}

/// Outcome when attempting to create a new account.
#[derive(Debug)]
pub(crate) enum SignupOutcome {
    Created(i64),
    Conflict,
}

/// Look up an account by email (used by login and the request guards).
pub(crate) async fn fetch_account_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<AccountRecord>> {
    let query = r"
        SELECT id, email, name, address, shipping_info, is_admin, hashed_password
        FROM users
        WHERE email = $1
        LIMIT 1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup account")?;

    Ok(row.map(|row| AccountRecord {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        address: row.get("address"),
        shipping_info: row.get("shipping_info"),
        is_admin: row.get("is_admin"),
        hashed_password: row.get("hashed_password"),
    }))
}

/// Insert a new account; the unique constraint on email resolves concurrent
/// duplicate registrations to exactly one `Created`.
pub(crate) async fn insert_account(
    pool: &PgPool,
    account: &NewAccount<'_>,
) -> Result<SignupOutcome> {
    let query = r"
        INSERT INTO users (email, name, address, shipping_info, is_admin, hashed_password)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(account.email)
        .bind(account.name)
        .bind(account.address)
        .bind(account.shipping_info)
        .bind(account.is_admin)
        .bind(account.hashed_password)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(SignupOutcome::Created(row.get("id"))),
        Err(err) if is_unique_violation(&err) => Ok(SignupOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert account"),
    }
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_unique_violation, SignupOutcome};
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[test]
    fn signup_outcome_debug_names() {
        assert_eq!(format!("{:?}", SignupOutcome::Created(7)), "Created(7)");
        assert_eq!(format!("{:?}", SignupOutcome::Conflict), "Conflict");
    }

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }
}
