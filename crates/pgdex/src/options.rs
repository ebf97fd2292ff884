/// Options passed through to table creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableOptions {
    /// Skip tables that already exist (`CREATE TABLE IF NOT EXISTS`).
    pub if_not_exists: bool,
    /// Emit `REFERENCES` constraints for fields declared with `#[pgdex(fk = "...")]`.
    pub fk_constraints: bool,
}

impl TableOptions {
    pub fn if_not_exists(mut self, yes: bool) -> Self {
        self.if_not_exists = yes;
        self
    }

    pub fn fk_constraints(mut self, yes: bool) -> Self {
        self.fk_constraints = yes;
        self
    }
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            if_not_exists: true,
            fk_constraints: true,
        }
    }
}
