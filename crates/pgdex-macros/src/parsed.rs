use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;
use syn::{Data, DeriveInput, Error, Field, Fields, Ident, LitStr, Result, Token, Type};

pub(crate) struct ParsedModel {
    ident: Ident,
    mapping: Mapping,
    fields: Vec<ParsedField>,
}

enum Mapping {
    Table,
    Named(String),
    Embedded,
}

struct ParsedField {
    name: String,
    ty: Type,
    kind: ParsedKind,
}

enum ParsedKind {
    Column(ParsedColumn),
    Embedded,
}

#[derive(Default)]
struct ParsedColumn {
    primary_key: bool,
    sql_type: Option<String>,
    references: Option<(String, String)>,
    index: Option<String>,
}

/// Field attributes as written, before they are checked against each other.
#[derive(Default)]
struct FieldAttrs {
    embed: bool,
    skip: bool,
    pk: bool,
    sql_type: Option<LitStr>,
    fk: Option<LitStr>,
    index: Option<LitStr>,
    tag: Option<LitStr>,
}

impl ParsedModel {
    pub(crate) fn from_input(input: &DeriveInput) -> Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(Error::new(
                input.generics.span(),
                "pgdex::Model cannot be derived for generic types",
            ));
        }

        let mut mapping = Mapping::Table;
        for attr in &input.attrs {
            if !attr.path().is_ident("pgdex") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("table") {
                    let lit: LitStr = meta.value()?.parse()?;
                    if lit.value().is_empty() {
                        return Err(Error::new(lit.span(), "table name cannot be empty"));
                    }
                    mapping = Mapping::Named(lit.value());
                    Ok(())
                } else if meta.path.is_ident("embedded") {
                    mapping = Mapping::Embedded;
                    Ok(())
                } else {
                    Err(meta.error(
                        "unknown pgdex container attribute, expected `table` or `embedded`",
                    ))
                }
            })?;
        }

        let named = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => &named.named,
                _ => {
                    return Err(Error::new(
                        input.ident.span(),
                        "pgdex::Model requires named fields",
                    ));
                }
            },
            _ => {
                return Err(Error::new(
                    input.ident.span(),
                    "pgdex::Model can only be derived for structs",
                ));
            }
        };

        let mut fields = Vec::new();
        for field in named {
            if let Some(parsed) = ParsedField::from_field(field)? {
                fields.push(parsed);
            }
        }

        Ok(Self {
            ident: input.ident.clone(),
            mapping,
            fields,
        })
    }

    pub(crate) fn emit(&self) -> TokenStream2 {
        let ident = &self.ident;
        let name = ident.to_string();
        let mapping = match &self.mapping {
            Mapping::Table => quote! { ::pgdex::Mapping::Table },
            Mapping::Named(table) => quote! { ::pgdex::Mapping::Named(#table) },
            Mapping::Embedded => quote! { ::pgdex::Mapping::Embedded },
        };
        let fields = self.fields.iter().map(ParsedField::emit);

        quote! {
            impl ::pgdex::Model for #ident {
                fn model() -> &'static ::pgdex::ModelDef {
                    static MODEL: ::pgdex::ModelDef = ::pgdex::ModelDef {
                        name: #name,
                        mapping: #mapping,
                        fields: &[#(#fields),*],
                    };
                    &MODEL
                }
            }
        }
    }
}

impl ParsedField {
    fn from_field(field: &Field) -> Result<Option<Self>> {
        let Some(ident) = &field.ident else {
            return Err(Error::new(field.span(), "pgdex::Model requires named fields"));
        };

        let mut attrs = FieldAttrs::default();
        for attr in &field.attrs {
            if attr.path().is_ident("pgdex") {
                attrs.parse(attr)?;
            }
        }

        if attrs.skip {
            return Ok(None);
        }

        let name = ident.to_string();
        let name = name.strip_prefix("r#").unwrap_or(&name).to_string();

        let kind = if attrs.embed {
            if attrs.pk
                || attrs.sql_type.is_some()
                || attrs.fk.is_some()
                || attrs.index.is_some()
                || attrs.tag.is_some()
            {
                return Err(Error::new(
                    ident.span(),
                    "an embedded field cannot carry column attributes",
                ));
            }
            ParsedKind::Embedded
        } else {
            ParsedKind::Column(attrs.into_column(ident)?)
        };

        Ok(Some(Self {
            name,
            ty: field.ty.clone(),
            kind,
        }))
    }

    fn emit(&self) -> TokenStream2 {
        let name = &self.name;
        let ty = &self.ty;

        let kind = match &self.kind {
            ParsedKind::Embedded => quote! {
                ::pgdex::FieldKind::Embedded(<#ty as ::pgdex::Model>::model)
            },
            ParsedKind::Column(column) => {
                let (pg_type, nullable) = match &column.sql_type {
                    Some(sql_type) => {
                        let nullable = is_option(ty);
                        (quote! { ::pgdex::PgType::Custom(#sql_type) }, quote! { #nullable })
                    }
                    None => (
                        quote! { <#ty as ::pgdex::ColumnType>::PG_TYPE },
                        quote! { <#ty as ::pgdex::ColumnType>::NULLABLE },
                    ),
                };
                let primary_key = column.primary_key;
                let references = match &column.references {
                    Some((table, col)) => quote! {
                        ::core::option::Option::Some(::pgdex::Reference { table: #table, column: #col })
                    },
                    None => quote! { ::core::option::Option::None },
                };
                let annotation = match &column.index {
                    Some(method) => quote! { ::pgdex::Annotation::Index { method: #method } },
                    None => quote! { ::pgdex::Annotation::NoIndex },
                };

                quote! {
                    ::pgdex::FieldKind::Column(::pgdex::ColumnDef {
                        pg_type: #pg_type,
                        nullable: #nullable,
                        primary_key: #primary_key,
                        references: #references,
                        annotation: #annotation,
                    })
                }
            }
        };

        quote! {
            ::pgdex::FieldDef {
                name: #name,
                kind: #kind,
            }
        }
    }
}

impl FieldAttrs {
    fn parse(&mut self, attr: &syn::Attribute) -> Result<()> {
        attr.parse_nested_meta(|meta| {
            let path = &meta.path;
            if path.is_ident("embed") {
                self.embed = true;
            } else if path.is_ident("skip") {
                self.skip = true;
            } else if path.is_ident("pk") {
                self.pk = true;
            } else if path.is_ident("index") {
                if !meta.input.peek(Token![=]) {
                    return Err(meta.error(
                        "expected `index = \"<method>\"`, e.g. `index = \"btree\"`",
                    ));
                }
                self.index = Some(meta.value()?.parse()?);
            } else if path.is_ident("tag") {
                self.tag = Some(meta.value()?.parse()?);
            } else if path.is_ident("fk") {
                self.fk = Some(meta.value()?.parse()?);
            } else if path.is_ident("sql_type") {
                self.sql_type = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error("unknown pgdex field attribute"));
            }
            Ok(())
        })
    }

    fn into_column(self, ident: &Ident) -> Result<ParsedColumn> {
        let mut column = ParsedColumn {
            primary_key: self.pk,
            ..Default::default()
        };

        if let Some(sql_type) = self.sql_type {
            if sql_type.value().trim().is_empty() {
                return Err(Error::new(sql_type.span(), "sql_type cannot be empty"));
            }
            column.sql_type = Some(sql_type.value());
        }

        if let Some(fk) = self.fk {
            let value = fk.value();
            let Some((table, col)) = parse_fk_reference(&value) else {
                return Err(Error::new(
                    fk.span(),
                    "invalid foreign key, expected `table.column` or `table(column)`",
                ));
            };
            column.references = Some((table.to_string(), col.to_string()));
        }

        if let Some(index) = &self.index {
            let method = parse_method(&index.value()).map_err(|msg| Error::new(index.span(), msg))?;
            column.index = Some(method);
        }

        if let Some(tag) = &self.tag {
            if self.index.is_some() {
                return Err(Error::new(
                    ident.span(),
                    "use either `index` or `tag`, not both",
                ));
            }
            column.index = parse_tag(&tag.value()).map_err(|msg| Error::new(tag.span(), msg))?;
        }

        Ok(column)
    }
}

/// Check an index method name.
fn parse_method(method: &str) -> std::result::Result<String, String> {
    let method = method.trim();
    if method.is_empty() {
        return Err("invalid index annotation: the index method is empty".to_string());
    }
    if !method.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(format!(
            "invalid index annotation: `{}` is not a valid index method name",
            method
        ));
    }
    Ok(method.to_string())
}

/// Parse a colon-delimited tag like `index:hash`.
///
/// Only the `index` kind means anything; other kinds are ignored.
fn parse_tag(tag: &str) -> std::result::Result<Option<String>, String> {
    let mut segments = tag.split(':');
    if segments.next() != Some("index") {
        return Ok(None);
    }
    match segments.next() {
        Some(method) => parse_method(method).map(Some),
        None => Err(format!(
            "invalid index annotation `{}`: expected `index:<method>`",
            tag
        )),
    }
}

/// Parse a foreign key reference string.
///
/// Supports two formats:
/// - `table.column` (dot-separated)
/// - `table(column)` (parentheses)
///
/// Returns `Some((table, column))` on success, `None` on parse failure.
fn parse_fk_reference(fk_ref: &str) -> Option<(&str, &str)> {
    if let Some((table, col)) = fk_ref.split_once('.')
        && !table.is_empty()
        && !col.is_empty()
    {
        return Some((table, col));
    }

    if let Some(paren_idx) = fk_ref.find('(')
        && fk_ref.ends_with(')')
    {
        let table = &fk_ref[..paren_idx];
        let col = &fk_ref[paren_idx + 1..fk_ref.len() - 1];
        if !table.is_empty() && !col.is_empty() {
            return Some((table, col));
        }
    }

    None
}

fn is_option(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|seg| seg.ident == "Option"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag() {
        assert_eq!(parse_tag("index:hash"), Ok(Some("hash".to_string())));
        assert_eq!(parse_tag("index:btree:extra"), Ok(Some("btree".to_string())));
        assert_eq!(parse_tag("unique:whatever"), Ok(None));
        assert_eq!(parse_tag(""), Ok(None));
    }

    #[test]
    fn test_parse_tag_rejects_malformed_index() {
        assert!(parse_tag("index").is_err());
        assert!(parse_tag("index:").is_err());
        assert!(parse_tag("index: ").is_err());
        assert!(parse_tag("index:gin (x)").is_err());
    }

    #[test]
    fn test_parse_fk_reference_dot_format() {
        assert_eq!(parse_fk_reference("person.id"), Some(("person", "id")));
        assert_eq!(
            parse_fk_reference("category.parent_id"),
            Some(("category", "parent_id"))
        );
    }

    #[test]
    fn test_parse_fk_reference_paren_format() {
        assert_eq!(parse_fk_reference("person(id)"), Some(("person", "id")));
    }

    #[test]
    fn test_parse_fk_reference_invalid() {
        assert_eq!(parse_fk_reference(""), None);
        assert_eq!(parse_fk_reference("person"), None);
        assert_eq!(parse_fk_reference(".id"), None);
        assert_eq!(parse_fk_reference("person."), None);
        assert_eq!(parse_fk_reference("(id)"), None);
        assert_eq!(parse_fk_reference("person()"), None);
    }

    #[test]
    fn test_derive_emits_model_impl() {
        let input: DeriveInput = syn::parse_quote! {
            #[pgdex(table = "people")]
            struct Person {
                #[pgdex(pk)]
                id: i64,
                #[pgdex(index = "hash")]
                email: String,
                #[pgdex(embed)]
                audit: Audit,
                #[pgdex(skip)]
                cache: Vec<u8>,
            }
        };
        let parsed = ParsedModel::from_input(&input).unwrap();
        assert_eq!(parsed.fields.len(), 3);

        let out = parsed.emit().to_string();
        assert!(out.contains("impl :: pgdex :: Model for Person"));
        assert!(out.contains(":: pgdex :: Mapping :: Named (\"people\")"));
        assert!(out.contains("method : \"hash\""));
        assert!(out.contains("< Audit as :: pgdex :: Model > :: model"));
    }

    #[test]
    fn test_derive_rejects_bare_index() {
        let input: DeriveInput = syn::parse_quote! {
            struct Person {
                #[pgdex(index)]
                email: String,
            }
        };
        assert!(ParsedModel::from_input(&input).is_err());
    }

    #[test]
    fn test_derive_rejects_column_attrs_on_embed() {
        let input: DeriveInput = syn::parse_quote! {
            struct Person {
                #[pgdex(embed, index = "btree")]
                audit: Audit,
            }
        };
        assert!(ParsedModel::from_input(&input).is_err());
    }

    #[test]
    fn test_derive_rejects_tuple_struct() {
        let input: DeriveInput = syn::parse_quote! {
            struct Person(i64, String);
        };
        assert!(ParsedModel::from_input(&input).is_err());
    }
}
