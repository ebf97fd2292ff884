//! Proc macros for pgdex.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod parsed;

use parsed::ParsedModel;

/// Derive `pgdex::Model` for a struct with named fields.
///
/// Container attributes:
/// - `#[pgdex(table = "name")]` - explicit table name (default: underscored type name)
/// - `#[pgdex(embedded)]` - no table of its own, only usable through `#[pgdex(embed)]`
///
/// Field attributes:
/// - `#[pgdex(index = "method")]` - secondary index built with `method` (`btree`, `hash`, ...)
/// - `#[pgdex(tag = "index:method")]` - the same, as a colon-delimited tag; other tag kinds are ignored
/// - `#[pgdex(embed)]` - inline the fields of another `Model`
/// - `#[pgdex(pk)]` - primary key column
/// - `#[pgdex(fk = "table.column")]` - foreign key reference
/// - `#[pgdex(sql_type = "TYPE")]` - column type, for types that don't implement `ColumnType`
/// - `#[pgdex(skip)]` - not stored
#[proc_macro_derive(Model, attributes(pgdex))]
pub fn derive_model(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedModel::from_input(&input) {
        Ok(parsed) => parsed.emit().into(),
        Err(err) => err.to_compile_error().into(),
    }
}
