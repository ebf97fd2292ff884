//! Postgres tables and secondary indexes from Rust model descriptors.
//!
//! Models describe themselves through [`Model`], usually derived:
//!
//! ```ignore
//! use pgdex::Model;
//!
//! #[derive(Model)]
//! pub struct Person {
//!     pub id: i64,
//!     pub name: String,
//!     #[pgdex(index = "hash")]
//!     pub email: String,
//! }
//!
//! pgdex::create_schema(&mut client, &[Person::model()]).await?;
//! ```
//!
//! This runs, inside one transaction:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS "person" ("id" BIGINT PRIMARY KEY, "name" TEXT NOT NULL, "email" TEXT NOT NULL);
//! CREATE INDEX IF NOT EXISTS "person_email_idx" ON "person" USING hash ("email");
//! ```
//!
//! # Naming Convention
//!
//! Table and column names are the underscored form of the Rust identifiers
//! (see [`underscore`]); tables are singular (`Person` maps to `person`).
//! Index names are `{table}_{column}_idx`.
//!
//! # Embedding
//!
//! A field marked `#[pgdex(embed)]` inlines the fields of another model.
//! Indexes declared inside an embedded model are created on the table of the
//! outermost model.

mod ddl;
mod error;
pub mod index;
pub mod migrate;
pub mod model;
mod naming;
mod options;
pub mod store;
mod traced;
pub mod walk;

pub use ddl::{Ident, create_table_sql, quote_ident};
pub use error::Error;
pub use index::{EnsuredIndex, create_index_sql, index_name};
pub use migrate::{MigrationReport, Migrator, create_schema, create_schema_pooled};
pub use model::{
    Annotation, ColumnDef, ColumnType, FieldDef, FieldKind, Mapping, Model, ModelDef, PgType,
    Reference,
};
pub use naming::underscore;
pub use options::TableOptions;
pub use store::{Database, PgUnit, SchemaStore, UnitOfWork};

// Re-export the derive macro
pub use pgdex_macros::Model;

/// Result type for pgdex operations.
pub type Result<T> = std::result::Result<T, Error>;
