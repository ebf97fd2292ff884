//! Model descriptors.
//!
//! A model is described by a static [`ModelDef`], usually generated by
//! `#[derive(pgdex::Model)]`:
//!
//! ```ignore
//! #[derive(pgdex::Model)]
//! pub struct Audit {
//!     #[pgdex(index = "brin")]
//!     pub created_at: i64,
//! }
//!
//! #[derive(pgdex::Model)]
//! pub struct Person {
//!     #[pgdex(pk)]
//!     pub id: i64,
//!     pub name: String,
//!     #[pgdex(index = "hash")]
//!     pub email: String,
//!     #[pgdex(embed)]
//!     pub audit: Audit,
//! }
//! ```
//!
//! `Person` maps to the `person` table. `Audit` is embedded: its columns are
//! inlined into `person`, and its `created_at` index is created on `person`.

use std::fmt;

use crate::naming::underscore;

/// A type that carries a static descriptor of its fields.
pub trait Model {
    /// Returns the descriptor for this type.
    fn model() -> &'static ModelDef;
}

/// Static description of a model.
#[derive(Debug)]
pub struct ModelDef {
    /// Rust type name (e.g. `Person`)
    pub name: &'static str,
    /// How the model maps to a table
    pub mapping: Mapping,
    /// Fields in declaration order
    pub fields: &'static [FieldDef],
}

impl ModelDef {
    /// Name of the table this model maps to, if it has one.
    pub fn table_name(&self) -> Option<String> {
        match self.mapping {
            Mapping::Table => Some(underscore(self.name)),
            Mapping::Named(name) => Some(name.to_string()),
            Mapping::Embedded => None,
        }
    }

    /// Returns `true` if this is the same descriptor as `other`.
    ///
    /// Descriptors are statics, so identity is address identity.
    pub fn is(&self, other: &ModelDef) -> bool {
        std::ptr::eq(self, other)
    }
}

impl fmt::Display for ModelDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// How a model maps to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapping {
    /// Table named after the model (`UserProfile` maps to `user_profile`).
    Table,
    /// Table with an explicit name, from `#[pgdex(table = "...")]`.
    Named(&'static str),
    /// No table of its own; only usable embedded in another model.
    Embedded,
}

/// A single field of a model.
#[derive(Debug)]
pub struct FieldDef {
    /// Field identifier as declared
    pub name: &'static str,
    /// What the field contributes to the table
    pub kind: FieldKind,
}

impl FieldDef {
    /// Storage name of the column backing this field.
    pub fn column_name(&self) -> String {
        underscore(self.name)
    }
}

/// What a field contributes to its root table.
#[derive(Debug)]
pub enum FieldKind {
    /// A column of the table.
    Column(ColumnDef),
    /// Another model whose fields are inlined into this one.
    ///
    /// Resolved lazily, so composed descriptors are only ever read.
    Embedded(fn() -> &'static ModelDef),
}

/// A column-backed field.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    /// Postgres type
    pub pg_type: PgType,
    /// Whether the column allows NULL
    pub nullable: bool,
    /// Whether this is (part of) the primary key
    pub primary_key: bool,
    /// Foreign key target, if any
    pub references: Option<Reference>,
    /// Index declaration
    pub annotation: Annotation,
}

/// Per-field index declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Annotation {
    /// The field is not indexed.
    #[default]
    NoIndex,
    /// The field gets a secondary index built with `method` (`btree`, `hash`, ...).
    Index { method: &'static str },
}

/// Target of a foreign key: `table.column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub table: &'static str,
    pub column: &'static str,
}

/// Postgres column types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PgType {
    /// SMALLINT (2 bytes)
    SmallInt,
    /// INTEGER (4 bytes)
    Integer,
    /// BIGINT (8 bytes)
    BigInt,
    /// REAL (4 bytes floating point)
    Real,
    /// DOUBLE PRECISION (8 bytes floating point)
    DoublePrecision,
    /// BOOLEAN
    Boolean,
    /// TEXT
    Text,
    /// BYTEA (binary)
    Bytea,
    /// TEXT[] (array of text)
    TextArray,
    /// BIGINT[] (array of bigint)
    BigIntArray,
    /// INTEGER[] (array of integer)
    IntegerArray,
    /// Any other type, spelled out verbatim (`#[pgdex(sql_type = "...")]`).
    Custom(&'static str),
}

impl fmt::Display for PgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PgType::SmallInt => write!(f, "SMALLINT"),
            PgType::Integer => write!(f, "INTEGER"),
            PgType::BigInt => write!(f, "BIGINT"),
            PgType::Real => write!(f, "REAL"),
            PgType::DoublePrecision => write!(f, "DOUBLE PRECISION"),
            PgType::Boolean => write!(f, "BOOLEAN"),
            PgType::Text => write!(f, "TEXT"),
            PgType::Bytea => write!(f, "BYTEA"),
            PgType::TextArray => write!(f, "TEXT[]"),
            PgType::BigIntArray => write!(f, "BIGINT[]"),
            PgType::IntegerArray => write!(f, "INTEGER[]"),
            PgType::Custom(ty) => f.write_str(ty),
        }
    }
}

/// Rust types that can back a column.
///
/// Implement this for your own types to use them as model fields without
/// spelling out `#[pgdex(sql_type = "...")]` on every field.
pub trait ColumnType {
    /// Postgres type of the column.
    const PG_TYPE: PgType;
    /// Whether the column allows NULL.
    const NULLABLE: bool = false;
}

macro_rules! column_types {
    ($($ty:ty => $pg:expr),* $(,)?) => {
        $(
            impl ColumnType for $ty {
                const PG_TYPE: PgType = $pg;
            }
        )*
    };
}

column_types! {
    i8 => PgType::SmallInt,
    u8 => PgType::SmallInt,
    i16 => PgType::SmallInt,
    u16 => PgType::Integer,
    i32 => PgType::Integer,
    u32 => PgType::BigInt,
    i64 => PgType::BigInt,
    u64 => PgType::BigInt,
    f32 => PgType::Real,
    f64 => PgType::DoublePrecision,
    bool => PgType::Boolean,
    String => PgType::Text,
    Vec<u8> => PgType::Bytea,
    Vec<String> => PgType::TextArray,
    Vec<i64> => PgType::BigIntArray,
    Vec<i32> => PgType::IntegerArray,
}

impl<T: ColumnType> ColumnType for Option<T> {
    const PG_TYPE: PgType = T::PG_TYPE;
    const NULLABLE: bool = true;
}
