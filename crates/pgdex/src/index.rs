//! Secondary index creation.

use tracing::debug;

use crate::Result;
use crate::ddl::quote_ident;
use crate::model::ModelDef;
use crate::store::SchemaStore;

/// An index that exists after a migration, whether it was just created or
/// was already there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsuredIndex {
    pub name: String,
    pub table: String,
    pub column: String,
    pub method: &'static str,
}

/// Generate the index name for a single-column index.
///
/// Uses the convention `{table}_{column}_idx`.
///
/// ```
/// assert_eq!(pgdex::index_name("person", "email"), "person_email_idx");
/// ```
pub fn index_name(table: &str, column: &str) -> String {
    format!("{}_{}_idx", table, column)
}

/// Generate an idempotent `CREATE INDEX` statement.
///
/// The method is written verbatim; an unknown method is reported by Postgres.
pub fn create_index_sql(table: &str, column: &str, method: &str) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} USING {} ({})",
        quote_ident(&index_name(table, column)),
        quote_ident(table),
        method,
        quote_ident(column)
    )
}

/// Ensure an index on `column` exists on the table of `root`.
///
/// The table name is resolved through the store on every call. Errors from
/// resolution or execution are returned unchanged.
pub async fn materialize<S: SchemaStore>(
    store: &mut S,
    root: &'static ModelDef,
    method: &'static str,
    column: &str,
) -> Result<EnsuredIndex> {
    let table = store.table_name(root).await?;
    let sql = create_index_sql(&table, column, method);
    store.execute(root, &sql).await?;

    let name = index_name(&table, column);
    debug!(index = %name, table = %table, method, "index ensured");

    Ok(EnsuredIndex {
        name,
        table,
        column: column.to_string(),
        method,
    })
}
