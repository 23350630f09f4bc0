//! Table and index definitions, plus the structural invariants.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::column::ColumnDef;
use crate::error::{Result, SchemaError};

/// Derives the deterministic index name for a table and ordered column list:
/// `idx_<table>_<col1>[_<col2>...]`.
pub fn index_name(table: &str, columns: &[impl AsRef<str>]) -> String {
    let mut name = format!("idx_{table}");
    for column in columns {
        name.push('_');
        name.push_str(column.as_ref());
    }
    name
}

/// A named index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IndexDef {
    pub name: String,
    /// Ordered, non-empty column list. Order is preserved in emitted SQL.
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
}

impl IndexDef {
    /// Creates an index with the derived `idx_<table>_<cols>` name.
    pub fn derived(table: &str, columns: &[impl AsRef<str>], unique: bool) -> Self {
        Self {
            name: index_name(table, columns),
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            unique,
        }
    }
}

/// Helper for `skip_serializing_if` on `bool` fields.
fn is_false(b: &bool) -> bool {
    !b
}

/// A dialect-neutral table definition.
///
/// Column insertion order is preserved and observable; indexes are keyed by
/// name. The junction flag is only ever set explicitly by the builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Table {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub indexes: BTreeMap<String, IndexDef>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_junction: bool,
}

impl Table {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: BTreeMap::new(),
            is_junction: false,
        }
    }

    // -- Lookups -------------------------------------------------------------

    /// Returns the column with the given name, if present.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns a mutable handle to the column with the given name.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut ColumnDef> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Returns `true` if a column with the given name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Returns the columns flagged as primary key, in insertion order.
    pub fn primary_key_columns(&self) -> Vec<&ColumnDef> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    /// Returns how many columns carry a foreign reference.
    pub fn reference_count(&self) -> usize {
        self.columns.iter().filter(|c| c.references.is_some()).count()
    }

    // -- Invariants ----------------------------------------------------------

    /// Checks the structural invariants:
    /// column names unique, indexes over existing columns and non-empty,
    /// junction tables with exactly two reference columns.
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::duplicate_column(&self.name, &column.name));
            }
        }

        for index in self.indexes.values() {
            if index.columns.is_empty() {
                return Err(SchemaError::EmptyIndex {
                    table: self.name.clone(),
                    index: index.name.clone(),
                });
            }
            for column in &index.columns {
                if !self.has_column(column) {
                    return Err(SchemaError::IndexColumnMissing {
                        table: self.name.clone(),
                        index: index.name.clone(),
                        column: column.clone(),
                    });
                }
            }
        }

        if self.is_junction {
            let found = self.reference_count();
            if found != 2 {
                return Err(SchemaError::JunctionReferenceCount {
                    table: self.name.clone(),
                    found,
                });
            }
        }

        Ok(())
    }

    // -- Index derivation ----------------------------------------------------

    /// Returns every index this table carries at emission time:
    /// flag-derived single-column indexes (`unique` and `indexed` columns, in
    /// column order) followed by the explicit indexes (in name order),
    /// deduplicated by name.
    pub fn effective_indexes(&self) -> Vec<IndexDef> {
        let mut out: Vec<IndexDef> = Vec::new();
        let mut names = BTreeSet::new();

        for column in &self.columns {
            if !column.unique && !column.indexed {
                continue;
            }
            let index = IndexDef::derived(&self.name, &[&column.name], column.unique);
            if names.insert(index.name.clone()) {
                out.push(index);
            }
        }

        for index in self.indexes.values() {
            if names.insert(index.name.clone()) {
                out.push(index.clone());
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{ColumnType, TableRef};
    use pretty_assertions::assert_eq;

    fn column(name: &str, ty: ColumnType) -> ColumnDef {
        ColumnDef::new(name, ty)
    }

    #[test]
    fn index_name_derivation() {
        assert_eq!(index_name("pets", &["name"]), "idx_pets_name");
        assert_eq!(
            index_name("pets", &["owner_id", "name"]),
            "idx_pets_owner_id_name"
        );
    }

    #[test]
    fn duplicate_column_rejected() {
        let mut table = Table::new("pets");
        table.columns.push(column("name", ColumnType::String));
        table.columns.push(column("name", ColumnType::Text));
        let err = table.validate().unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn { .. }));
    }

    #[test]
    fn index_over_missing_column_rejected() {
        let mut table = Table::new("pets");
        table.columns.push(column("name", ColumnType::String));
        let index = IndexDef::derived("pets", &["nope"], false);
        table.indexes.insert(index.name.clone(), index);
        let err = table.validate().unwrap_err();
        assert!(matches!(err, SchemaError::IndexColumnMissing { .. }));
    }

    #[test]
    fn junction_requires_two_references() {
        let mut table = Table::new("pet_tags");
        table.is_junction = true;
        let mut pet_id = column("pet_id", ColumnType::BigInt);
        pet_id.references(TableRef::new("pets"));
        table.columns.push(pet_id);
        table.columns.push(column("tag_id", ColumnType::BigInt));

        let err = table.validate().unwrap_err();
        assert!(matches!(
            err,
            SchemaError::JunctionReferenceCount { found: 1, .. }
        ));

        table
            .column_mut("tag_id")
            .unwrap()
            .references(TableRef::new("tags"));
        table.validate().unwrap();
    }

    #[test]
    fn effective_indexes_dedup_by_name() {
        let mut table = Table::new("users");
        let mut public_id = column("public_id", ColumnType::String);
        public_id.unique();
        table.columns.push(public_id);
        // Explicit duplicate of the flag-derived index.
        let explicit = IndexDef::derived("users", &["public_id"], true);
        table.indexes.insert(explicit.name.clone(), explicit);

        let indexes = table.effective_indexes();
        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].name, "idx_users_public_id");
        assert!(indexes[0].unique);
    }

    #[test]
    fn effective_indexes_preserve_flag_order() {
        let mut table = Table::new("t");
        let mut a = column("a", ColumnType::String);
        a.indexed();
        let mut b = column("b", ColumnType::String);
        b.unique();
        table.columns.push(a);
        table.columns.push(b);

        let names: Vec<_> = table
            .effective_indexes()
            .into_iter()
            .map(|i| (i.name, i.unique))
            .collect();
        assert_eq!(
            names,
            vec![
                ("idx_t_a".to_string(), false),
                ("idx_t_b".to_string(), true)
            ]
        );
    }
}
