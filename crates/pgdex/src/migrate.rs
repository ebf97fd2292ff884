//! Schema creation.
//!
//! ```ignore
//! let (mut client, connection) = tokio_postgres::connect(url, NoTls).await?;
//! tokio::spawn(connection);
//!
//! let report = pgdex::create_schema(&mut client, &[Person::model(), Order::model()]).await?;
//! ```

use tracing::{debug, info, warn};

use crate::Result;
use crate::index::EnsuredIndex;
use crate::model::ModelDef;
use crate::options::TableOptions;
use crate::store::{Database, SchemaStore, UnitOfWork};
use crate::walk;

/// What a migration ensured exists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Tables, in the order they were created
    pub tables: Vec<String>,
    /// Indexes, in the order they were created
    pub indexes: Vec<EnsuredIndex>,
}

/// Create tables and indexes for `models` with the default [`TableOptions`].
///
/// See [`Migrator::create_schema`].
pub async fn create_schema<D: Database>(
    db: &mut D,
    models: &[&'static ModelDef],
) -> Result<MigrationReport> {
    Migrator::new(db).create_schema(models).await
}

/// Create tables and indexes for `models` on a connection taken from `pool`.
pub async fn create_schema_pooled(
    pool: &deadpool_postgres::Pool,
    models: &[&'static ModelDef],
) -> Result<MigrationReport> {
    let mut conn = pool.get().await?;
    create_schema(&mut conn, models).await
}

/// Creates tables and their indexes inside a single unit of work.
pub struct Migrator<'a, D: Database> {
    db: &'a mut D,
    options: TableOptions,
}

impl<'a, D: Database> Migrator<'a, D> {
    pub fn new(db: &'a mut D) -> Self {
        Self {
            db,
            options: TableOptions::default(),
        }
    }

    /// Set the options passed through to table creation.
    pub fn table_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// Create the table of every model, in order, each followed by the
    /// indexes declared on it and on the models it embeds.
    ///
    /// Either everything is committed, or the unit of work is rolled back
    /// and the first error is returned. An empty list does nothing.
    pub async fn create_schema(self, models: &[&'static ModelDef]) -> Result<MigrationReport> {
        if models.is_empty() {
            return Ok(MigrationReport::default());
        }

        let mut unit = self.db.begin().await?;
        match run(&mut unit, models, &self.options).await {
            Ok(report) => {
                unit.commit().await?;
                info!(
                    tables = report.tables.len(),
                    indexes = report.indexes.len(),
                    "schema created"
                );
                Ok(report)
            }
            Err(err) => {
                if let Err(rollback_err) = unit.rollback().await {
                    warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

async fn run<S: SchemaStore>(
    store: &mut S,
    models: &[&'static ModelDef],
    options: &TableOptions,
) -> Result<MigrationReport> {
    let mut report = MigrationReport::default();

    for &model in models {
        store.create_table(model, options).await?;
        let table = store.table_name(model).await?;
        debug!(model = %model, table = %table, "creating indexes");
        report.tables.push(table);

        report
            .indexes
            .extend(walk::create_indexes(store, model).await?);
    }

    Ok(report)
}
