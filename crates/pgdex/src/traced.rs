//! Traced statement execution.
//!
//! Every DDL statement issued by the Postgres store goes through here so it
//! shows up in tracing output.

use tokio_postgres::{Error, Transaction};
use tracing::Instrument;

use crate::model::ModelDef;

/// A transaction that logs every statement via tracing.
pub struct TracedTx<'a> {
    tx: Transaction<'a>,
}

impl<'a> TracedTx<'a> {
    pub fn new(tx: Transaction<'a>) -> Self {
        Self { tx }
    }

    /// Execute a parameterless statement, returning the number of rows affected.
    pub async fn execute(&self, model: &ModelDef, sql: &str) -> Result<u64, Error> {
        let span = tracing::debug_span!(
            "db.execute",
            sql = %sql,
            model = %model,
            affected = tracing::field::Empty,
        );
        let affected = self.tx.execute(sql, &[]).instrument(span.clone()).await?;
        span.record("affected", affected);
        Ok(affected)
    }

    pub async fn commit(self) -> Result<(), Error> {
        self.tx
            .commit()
            .instrument(tracing::debug_span!("db.commit"))
            .await
    }

    pub async fn rollback(self) -> Result<(), Error> {
        self.tx
            .rollback()
            .instrument(tracing::debug_span!("db.rollback"))
            .await
    }
}
