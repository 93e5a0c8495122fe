use super::{ConnectionPool, DatabaseConnection};
use picnest_core::{BoxFuture, error::Error};

impl ConnectionPool {
    /// Executes the specific operations inside of a transaction.
    /// If the operations return an error, the transaction will be rolled back;
    /// if not, the transaction will be committed.
    pub async fn transaction<F, T, E>(&self, tx: F) -> Result<T, E>
    where
        F: for<'t> FnOnce(&'t mut DatabaseConnection) -> BoxFuture<'t, Result<T, E>>,
        E: From<Error>,
    {
        let mut transaction = self.begin_immediate().await?;
        match tx(&mut *transaction).await {
            Ok(data) => {
                transaction.commit().await.map_err(Error::from)?;
                Ok(data)
            }
            Err(err) => {
                if let Err(rollback_err) = transaction.rollback().await {
                    tracing::error!("fail to roll back the transaction: {rollback_err}");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{ConnectionPool, migrate};
    use picnest_core::error::Error;

    #[tokio::test]
    async fn it_rolls_back_on_error() {
        let pool = ConnectionPool::connect_memory().await.unwrap();
        migrate(&pool).await.unwrap();

        let result: Result<(), Error> = pool
            .transaction(|conn| {
                Box::pin(async move {
                    sqlx::query("INSERT INTO tags (name) VALUES ('harbor')")
                        .execute(&mut *conn)
                        .await?;
                    Err(Error::new("abort"))
                })
            })
            .await;
        assert!(result.is_err());

        let inserted: u64 = pool
            .transaction(|conn| {
                Box::pin(async move {
                    let result = sqlx::query("INSERT INTO tags (name) VALUES ('forest')")
                        .execute(&mut *conn)
                        .await?;
                    Ok::<_, Error>(result.rows_affected())
                })
            })
            .await
            .unwrap();
        assert_eq!(inserted, 1);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tags")
            .fetch_one(pool.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
