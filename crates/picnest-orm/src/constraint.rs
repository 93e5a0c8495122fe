/// Extension trait for detecting constraint violations in database errors.
pub trait ConstraintViolation {
    /// Returns `true` if the error is a unique constraint violation.
    fn is_unique_violation(&self) -> bool;

    /// Returns `true` if the error violates the unique constraint on the column,
    /// given as `table.column`.
    fn violates_unique(&self, column: &str) -> bool;

    /// Returns `true` if the error is a check constraint violation.
    fn is_check_violation(&self) -> bool;
}

impl ConstraintViolation for sqlx::Error {
    fn is_unique_violation(&self) -> bool {
        self.as_database_error()
            .is_some_and(|err| err.is_unique_violation())
    }

    fn violates_unique(&self, column: &str) -> bool {
        // SQLite reports the columns as `UNIQUE constraint failed: table.a, table.b`.
        self.as_database_error().is_some_and(|err| {
            err.is_unique_violation()
                && err
                    .message()
                    .rsplit_once(": ")
                    .is_some_and(|(_, columns)| columns.split(", ").any(|c| c == column))
        })
    }

    fn is_check_violation(&self) -> bool {
        self.as_database_error()
            .is_some_and(|err| err.is_check_violation())
    }
}

#[cfg(test)]
mod tests {
    use super::ConstraintViolation;
    use crate::{ConnectionPool, migrate};

    #[tokio::test]
    async fn it_detects_unique_violations() {
        let pool = ConnectionPool::connect_memory().await.unwrap();
        migrate(&pool).await.unwrap();

        sqlx::query("INSERT INTO tags (name) VALUES ('sunset')")
            .execute(pool.pool())
            .await
            .unwrap();
        let err = sqlx::query("INSERT INTO tags (name) VALUES ('sunset')")
            .execute(pool.pool())
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
        assert!(err.violates_unique("tags.name"));
        assert!(!err.violates_unique("users.email"));
        assert!(!err.is_check_violation());
    }
}
