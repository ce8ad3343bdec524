//! Insertion-ordered symbol table.
//!
//! Lookups go through an `FxHashMap`; iteration follows insertion order so
//! that everything emitted from a table is deterministic.

use rustc_hash::FxHashMap;

#[derive(Clone, PartialEq, Debug)]
pub struct SymbolTable<T> {
    entries: Vec<(String, T)>,
    index: FxHashMap<String, usize>,
}

impl<T> Default for SymbolTable<T> {
    fn default() -> Self {
        SymbolTable {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<T> SymbolTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new symbol.
    ///
    /// Returns the rejected value if the name is already present; the
    /// existing entry is left untouched.
    pub fn insert(&mut self, name: impl Into<String>, value: T) -> Result<(), T> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(value);
        }
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, value));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        self.index.get(name).map(|&i| &mut self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut T)> + '_ {
        self.entries
            .iter_mut()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
