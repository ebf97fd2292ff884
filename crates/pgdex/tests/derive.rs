use pgdex::{Annotation, ColumnDef, FieldKind, Mapping, Model, ModelDef, PgType, Reference};

#[derive(Model)]
#[allow(dead_code)]
struct UserAccount {
    #[pgdex(pk)]
    id: i64,
    #[pgdex(index = "hash")]
    email: String,
    bio: Option<String>,
    #[pgdex(fk = "tenant.id")]
    tenant_id: i32,
    #[pgdex(sql_type = "TIMESTAMPTZ")]
    last_seen: Option<std::time::SystemTime>,
    #[pgdex(embed)]
    address: Address,
    #[pgdex(skip)]
    session: Vec<u8>,
    r#type: String,
}

#[derive(Model)]
#[pgdex(embedded)]
#[allow(dead_code, non_snake_case)]
struct Address {
    street: String,
    #[pgdex(tag = "index:gin")]
    zipCode: String,
}

#[derive(Model)]
#[pgdex(table = "people")]
#[allow(dead_code)]
struct Person {
    id: i64,
}

fn column<'a>(model: &'a ModelDef, name: &str) -> &'a ColumnDef {
    let field = model
        .fields
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("no field {name}"));
    match &field.kind {
        FieldKind::Column(column) => column,
        FieldKind::Embedded(_) => panic!("{name} is embedded"),
    }
}

#[test]
fn test_model_name_and_mapping() {
    let model = UserAccount::model();
    assert_eq!(model.name, "UserAccount");
    assert_eq!(model.mapping, Mapping::Table);
    assert_eq!(model.table_name().as_deref(), Some("user_account"));

    assert_eq!(Person::model().mapping, Mapping::Named("people"));
    assert_eq!(Address::model().mapping, Mapping::Embedded);
    assert_eq!(Address::model().table_name(), None);
}

#[test]
fn test_descriptor_is_static() {
    assert!(UserAccount::model().is(UserAccount::model()));
    assert!(!UserAccount::model().is(Person::model()));
}

#[test]
fn test_fields_in_declaration_order() {
    let names: Vec<_> = UserAccount::model().fields.iter().map(|f| f.name).collect();
    assert_eq!(
        names,
        ["id", "email", "bio", "tenant_id", "last_seen", "address", "type"]
    );
}

#[test]
fn test_column_types() {
    let model = UserAccount::model();

    let id = column(model, "id");
    assert_eq!(id.pg_type, PgType::BigInt);
    assert!(id.primary_key);
    assert!(!id.nullable);

    let bio = column(model, "bio");
    assert_eq!(bio.pg_type, PgType::Text);
    assert!(bio.nullable);

    let last_seen = column(model, "last_seen");
    assert_eq!(last_seen.pg_type, PgType::Custom("TIMESTAMPTZ"));
    assert!(last_seen.nullable);

    assert_eq!(column(model, "tenant_id").pg_type, PgType::Integer);
}

#[test]
fn test_annotations() {
    let model = UserAccount::model();
    assert_eq!(
        column(model, "email").annotation,
        Annotation::Index { method: "hash" }
    );
    assert_eq!(column(model, "bio").annotation, Annotation::NoIndex);
    assert_eq!(
        column(Address::model(), "zipCode").annotation,
        Annotation::Index { method: "gin" }
    );
}

#[test]
fn test_foreign_key() {
    assert_eq!(
        column(UserAccount::model(), "tenant_id").references,
        Some(Reference {
            table: "tenant",
            column: "id",
        })
    );
}

#[test]
fn test_embedded_field_resolves_descriptor() {
    let field = UserAccount::model()
        .fields
        .iter()
        .find(|f| f.name == "address")
        .unwrap();
    match &field.kind {
        FieldKind::Embedded(resolve) => assert!(resolve().is(Address::model())),
        FieldKind::Column(_) => panic!("address should be embedded"),
    }
}

#[test]
fn test_column_names_are_underscored() {
    let walked: Vec<_> = pgdex::walk::columns(UserAccount::model())
        .unwrap()
        .iter()
        .map(|c| c.field.column_name())
        .collect();
    assert_eq!(
        walked,
        ["id", "email", "bio", "tenant_id", "last_seen", "street", "zip_code", "type"]
    );
}
