//! Table DDL.

use std::collections::HashSet;

use crate::model::ModelDef;
use crate::options::TableOptions;
use crate::walk;
use crate::{Error, Result};

/// A PostgreSQL identifier wrapper.
///
/// Display writes the value escaped and quoted with double quotes.
///
/// # Example
/// ```
/// use pgdex::Ident;
/// assert_eq!(format!("{}", Ident("user")), "\"user\"");
/// assert_eq!(format!("{}", Ident("bla\"h")), "\"bla\"\"h\"");
/// ```
pub struct Ident<T: AsRef<str>>(pub T);

impl<T: AsRef<str>> std::fmt::Display for Ident<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"")?;
        for c in self.0.as_ref().chars() {
            if c == '"' {
                write!(f, "\"\"")?;
            } else {
                write!(f, "{}", c)?;
            }
        }
        write!(f, "\"")
    }
}

/// Quote a PostgreSQL identifier.
///
/// Always quotes identifiers to avoid issues with reserved keywords like
/// `user`, `order`, `table`, `group`, etc. Doubles any embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("{}", Ident(name))
}

/// Generate the `CREATE TABLE` statement for a model.
///
/// Columns of embedded models are inlined where they are declared. Primary
/// key columns are the ones marked `pk`; when there are none, a column named
/// `id` is the primary key.
pub fn create_table_sql(model: &'static ModelDef, options: &TableOptions) -> Result<String> {
    let table = model
        .table_name()
        .ok_or(Error::NoTable { model: model.name })?;

    let columns = walk::columns(model)?;
    if columns.is_empty() {
        return Err(Error::InvalidTable {
            model: model.name,
            reason: "it has no columns".to_string(),
        });
    }

    let names: Vec<String> = columns.iter().map(|c| c.field.column_name()).collect();
    let mut seen = HashSet::new();
    for name in &names {
        if !seen.insert(name.as_str()) {
            return Err(Error::InvalidTable {
                model: model.name,
                reason: format!("column `{}` is declared more than once", name),
            });
        }
    }

    let mut pk_columns: Vec<&str> = columns
        .iter()
        .zip(&names)
        .filter(|(c, _)| c.column.primary_key)
        .map(|(_, name)| name.as_str())
        .collect();
    if pk_columns.is_empty() && names.iter().any(|n| n == "id") {
        pk_columns.push("id");
    }

    // More than one PK column needs a table constraint
    let use_table_pk_constraint = pk_columns.len() > 1;

    let mut parts: Vec<String> = columns
        .iter()
        .zip(&names)
        .map(|(col, name)| {
            let column = col.column;
            let mut def = format!("    {} {}", quote_ident(name), column.pg_type);
            let primary_key = pk_columns.contains(&name.as_str());

            if primary_key && !use_table_pk_constraint {
                def.push_str(" PRIMARY KEY");
            }

            // PK columns are implicitly NOT NULL, except inside a table constraint
            if !column.nullable && (!primary_key || use_table_pk_constraint) {
                def.push_str(" NOT NULL");
            }

            if options.fk_constraints
                && let Some(reference) = column.references
            {
                def.push_str(&format!(
                    " REFERENCES {} ({})",
                    quote_ident(reference.table),
                    quote_ident(reference.column)
                ));
            }

            def
        })
        .collect();

    if use_table_pk_constraint {
        let quoted: Vec<_> = pk_columns.iter().map(|c| quote_ident(c)).collect();
        parts.push(format!("    PRIMARY KEY ({})", quoted.join(", ")));
    }

    let if_not_exists = if options.if_not_exists {
        "IF NOT EXISTS "
    } else {
        ""
    };

    Ok(format!(
        "CREATE TABLE {}{} (\n{}\n)",
        if_not_exists,
        quote_ident(&table),
        parts.join(",\n")
    ))
}
