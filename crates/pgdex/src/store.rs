//! Storage seams.
//!
//! The migrator only talks to the database through these traits: a
//! [`Database`] opens a [`UnitOfWork`], which is a [`SchemaStore`] that can be
//! committed or rolled back. The Postgres implementation lives here too; tests
//! and other backends can provide their own.
//!
//! Any backend must keep `CREATE INDEX IF NOT EXISTS` semantics: running the
//! same index statement twice must neither fail nor create a second index.

#![allow(async_fn_in_trait)]

use std::ops::DerefMut;

use tracing::debug;

use crate::ddl::create_table_sql;
use crate::model::ModelDef;
use crate::options::TableOptions;
use crate::traced::TracedTx;
use crate::{Error, Result};

/// Schema operations available inside a unit of work.
pub trait SchemaStore {
    /// Create the table backing `model`.
    async fn create_table(
        &mut self,
        model: &'static ModelDef,
        options: &TableOptions,
    ) -> Result<()>;

    /// Resolve the physical table name of `model`.
    async fn table_name(&mut self, model: &'static ModelDef) -> Result<String>;

    /// Execute a raw statement on behalf of `model`.
    async fn execute(&mut self, model: &'static ModelDef, sql: &str) -> Result<()>;
}

/// An atomic unit of work: everything executed through it is kept or
/// discarded as a whole.
pub trait UnitOfWork: SchemaStore + Sized {
    async fn commit(self) -> Result<()>;
    async fn rollback(self) -> Result<()>;
}

/// Something that can open a unit of work.
pub trait Database {
    type Unit<'a>: UnitOfWork
    where
        Self: 'a;

    async fn begin(&mut self) -> Result<Self::Unit<'_>>;
}

/// A Postgres transaction used as a unit of work.
pub struct PgUnit<'a> {
    tx: TracedTx<'a>,
}

impl SchemaStore for PgUnit<'_> {
    async fn create_table(
        &mut self,
        model: &'static ModelDef,
        options: &TableOptions,
    ) -> Result<()> {
        let sql = create_table_sql(model, options)?;
        self.tx.execute(model, &sql).await?;
        debug!(model = %model, "table ensured");
        Ok(())
    }

    async fn table_name(&mut self, model: &'static ModelDef) -> Result<String> {
        model
            .table_name()
            .ok_or(Error::NoTable { model: model.name })
    }

    async fn execute(&mut self, model: &'static ModelDef, sql: &str) -> Result<()> {
        self.tx.execute(model, sql).await?;
        Ok(())
    }
}

impl UnitOfWork for PgUnit<'_> {
    async fn commit(self) -> Result<()> {
        Ok(self.tx.commit().await?)
    }

    async fn rollback(self) -> Result<()> {
        Ok(self.tx.rollback().await?)
    }
}

impl Database for tokio_postgres::Client {
    type Unit<'a> = PgUnit<'a>;

    async fn begin(&mut self) -> Result<PgUnit<'_>> {
        let tx = self.transaction().await?;
        Ok(PgUnit {
            tx: TracedTx::new(tx),
        })
    }
}

impl Database for deadpool_postgres::Object {
    type Unit<'a> = PgUnit<'a>;

    async fn begin(&mut self) -> Result<PgUnit<'_>> {
        let client: &mut tokio_postgres::Client = self.deref_mut();
        client.begin().await
    }
}
