//! Insertion-ordered dependency table.
//!
//! Output order is part of the file format: entries are written in the
//! order they were inserted and read back in file order. Equality compares
//! content only, so two tables holding the same entries in a different order
//! are equal while still encoding to different text.

use indexmap::map::{IntoIter, Iter, Keys, Values};
use indexmap::IndexMap;
use toml_edit::{Item, Table};

use crate::core::dependency::{Dependency, RecordStyle};

/// Dependencies keyed by their table key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyTable {
    deps: IndexMap<String, Dependency>,
}

impl DependencyTable {
    pub fn new() -> Self {
        DependencyTable::default()
    }

    /// Insert or replace an entry. A replaced entry keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, dep: Dependency) -> Option<Dependency> {
        self.deps.insert(key.into(), dep)
    }

    pub fn get(&self, key: &str) -> Option<&Dependency> {
        self.deps.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Dependency> {
        self.deps.get_mut(key)
    }

    /// Remove an entry, keeping the order of the remaining ones.
    pub fn remove(&mut self, key: &str) -> Option<Dependency> {
        self.deps.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.deps.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.deps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deps.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, Dependency> {
        self.deps.iter()
    }

    pub fn keys(&self) -> Keys<'_, String, Dependency> {
        self.deps.keys()
    }

    pub fn values(&self) -> Values<'_, String, Dependency> {
        self.deps.values()
    }

    /// Equal content in the same order.
    pub fn same_order(&self, other: &DependencyTable) -> bool {
        self == other && self.keys().eq(other.keys())
    }

    /// Encode as a `[dependencies]` table with one sub-table per entry.
    pub(crate) fn to_toml_table(&self, style: RecordStyle) -> Table {
        let mut table = Table::new();
        for (key, dep) in &self.deps {
            table.insert(key, Item::Table(dep.to_table_fragment(key, style)));
        }
        table
    }
}

impl FromIterator<(String, Dependency)> for DependencyTable {
    fn from_iter<I: IntoIterator<Item = (String, Dependency)>>(iter: I) -> Self {
        DependencyTable {
            deps: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for DependencyTable {
    type Item = (String, Dependency);
    type IntoIter = IntoIter<String, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.deps.into_iter()
    }
}

impl<'a> IntoIterator for &'a DependencyTable {
    type Item = (&'a String, &'a Dependency);
    type IntoIter = Iter<'a, String, Dependency>;

    fn into_iter(self) -> Self::IntoIter {
        self.deps.iter()
    }
}
