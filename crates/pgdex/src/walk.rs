//! Descriptor walking.
//!
//! Embedded models have no table of their own: their fields are inlined into
//! the model that embeds them, recursively, and everything they declare ends
//! up on the root model's table.

use tracing::debug;

use crate::index::{self, EnsuredIndex};
use crate::model::{Annotation, ColumnDef, FieldDef, FieldKind, ModelDef};
use crate::store::SchemaStore;
use crate::{Error, Result};

/// A column reached while walking a model.
#[derive(Debug, Clone, Copy)]
pub struct ColumnField {
    /// The model that declares the field (the root, or an embedded model)
    pub owner: &'static ModelDef,
    pub field: &'static FieldDef,
    pub column: &'static ColumnDef,
}

/// Collect every column of `root` in declaration order, inlining embedded
/// models where they are declared.
///
/// Fails with [`Error::EmbedCycle`] if a model embeds itself, directly or
/// through other models. Embedding the same model through two different
/// fields is not a cycle: its columns are listed twice, so
/// [`create_table_sql`](crate::create_table_sql) rejects the table unless the
/// shared model has no columns.
pub fn columns(root: &'static ModelDef) -> Result<Vec<ColumnField>> {
    let mut out = Vec::new();
    let mut chain = Vec::new();
    collect(root, &mut chain, &mut out)?;
    Ok(out)
}

fn collect(
    model: &'static ModelDef,
    chain: &mut Vec<&'static ModelDef>,
    out: &mut Vec<ColumnField>,
) -> Result<()> {
    if chain.iter().any(|m| m.is(model)) {
        let mut names: Vec<&'static str> = chain.iter().map(|m| m.name).collect();
        names.push(model.name);
        return Err(Error::EmbedCycle { chain: names });
    }

    chain.push(model);
    for field in model.fields {
        match &field.kind {
            FieldKind::Column(column) => out.push(ColumnField {
                owner: model,
                field,
                column,
            }),
            FieldKind::Embedded(resolve) => collect(resolve(), chain, out)?,
        }
    }
    chain.pop();

    Ok(())
}

/// Create every index declared on `root` or on any model it embeds.
///
/// Indexes always target the root's table. Stops at the first failure.
pub async fn create_indexes<S: SchemaStore>(
    store: &mut S,
    root: &'static ModelDef,
) -> Result<Vec<EnsuredIndex>> {
    let mut ensured = Vec::new();

    for col in columns(root)? {
        let Annotation::Index { method } = col.column.annotation else {
            continue;
        };
        if let Err(reason) = check_method(method) {
            return Err(Error::InvalidAnnotation {
                model: col.owner.name,
                field: col.field.name,
                reason,
            });
        }

        debug!(model = %root, field = col.field.name, method, "found index annotation");
        let column = col.field.column_name();
        ensured.push(index::materialize(store, root, method, &column).await?);
    }

    Ok(ensured)
}

/// Index methods are written verbatim into DDL, so only plain identifiers
/// are accepted.
fn check_method(method: &str) -> std::result::Result<(), &'static str> {
    if method.is_empty() {
        return Err("index method is empty");
    }
    if !method.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("index method is not a plain identifier");
    }
    Ok(())
}
