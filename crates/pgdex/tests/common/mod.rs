//! In-memory database used to observe what the migrator asks the store to do.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use pgdex::{Database, Error, ModelDef, Result, SchemaStore, TableOptions, UnitOfWork};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Begin,
    CreateTable { model: &'static str, options: TableOptions },
    TableName { model: &'static str },
    Execute { model: &'static str, sql: String },
    Commit,
    Rollback,
}

/// Committed schema state plus a log of every call.
#[derive(Debug, Default)]
pub struct MemoryDb {
    pub tables: BTreeSet<String>,
    /// index name -> table name
    pub indexes: BTreeMap<String, String>,
    pub calls: Vec<Call>,
    /// Fail any statement containing this text
    pub fail_on: Option<String>,
    /// Fail every table name lookup
    pub fail_table_name: bool,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(text: &str) -> Self {
        Self {
            fail_on: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn failing_table_name() -> Self {
        Self {
            fail_table_name: true,
            ..Self::default()
        }
    }

    pub fn statements(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Execute { sql, .. } => Some(sql.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }
}

/// Staged changes, applied to the [`MemoryDb`] on commit.
pub struct MemoryUnit<'a> {
    db: &'a mut MemoryDb,
    tables: BTreeSet<String>,
    indexes: BTreeMap<String, String>,
}

fn store_error(msg: String) -> Error {
    Error::Store(Box::new(std::io::Error::other(msg)))
}

/// Extract the double-quoted identifiers of a statement, in order.
fn quoted_idents(sql: &str) -> Vec<String> {
    sql.split('"')
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, s)| s.to_string())
        .collect()
}

impl SchemaStore for MemoryUnit<'_> {
    async fn create_table(
        &mut self,
        model: &'static ModelDef,
        options: &TableOptions,
    ) -> Result<()> {
        self.db.calls.push(Call::CreateTable {
            model: model.name,
            options: *options,
        });
        let table = model.table_name().ok_or(Error::NoTable { model: model.name })?;
        if let Some(fail_on) = &self.db.fail_on
            && table.contains(fail_on.as_str())
        {
            return Err(store_error(format!("cannot create table {table}")));
        }
        if !self.tables.insert(table.clone()) && !options.if_not_exists {
            return Err(store_error(format!("relation \"{table}\" already exists")));
        }
        Ok(())
    }

    async fn table_name(&mut self, model: &'static ModelDef) -> Result<String> {
        self.db.calls.push(Call::TableName { model: model.name });
        if self.db.fail_table_name {
            return Err(store_error(format!("no table name for {}", model.name)));
        }
        model.table_name().ok_or(Error::NoTable { model: model.name })
    }

    async fn execute(&mut self, model: &'static ModelDef, sql: &str) -> Result<()> {
        self.db.calls.push(Call::Execute {
            model: model.name,
            sql: sql.to_string(),
        });
        if let Some(fail_on) = &self.db.fail_on
            && sql.contains(fail_on.as_str())
        {
            return Err(store_error(format!("statement failed: {sql}")));
        }

        if sql.starts_with("CREATE INDEX") {
            let idents = quoted_idents(sql);
            let (name, table) = (idents[0].clone(), idents[1].clone());
            if !self.tables.contains(&table) {
                return Err(store_error(format!("relation \"{table}\" does not exist")));
            }
            if self.indexes.contains_key(&name) {
                if sql.contains("IF NOT EXISTS") {
                    return Ok(());
                }
                return Err(store_error(format!("relation \"{name}\" already exists")));
            }
            self.indexes.insert(name, table);
        }
        Ok(())
    }
}

impl UnitOfWork for MemoryUnit<'_> {
    async fn commit(self) -> Result<()> {
        self.db.calls.push(Call::Commit);
        self.db.tables = self.tables;
        self.db.indexes = self.indexes;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.db.calls.push(Call::Rollback);
        Ok(())
    }
}

impl Database for MemoryDb {
    type Unit<'a> = MemoryUnit<'a>;

    async fn begin(&mut self) -> Result<MemoryUnit<'_>> {
        self.calls.push(Call::Begin);
        let tables = self.tables.clone();
        let indexes = self.indexes.clone();
        Ok(MemoryUnit {
            db: self,
            tables,
            indexes,
        })
    }
}
