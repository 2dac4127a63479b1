//! String interning for function and module names.
//!
//! A capture repeats the same few thousand names across millions of frames.
//! Names are stored once here and referenced everywhere else by `StrId`.

use std::collections::HashMap;
use std::sync::Arc;

/// Index of a string in a `StringTable`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrId(u32);

impl StrId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Append-only table of unique strings
#[derive(Debug, Clone, Default)]
pub struct StringTable {
    strings: Vec<Arc<str>>,
    lookup: HashMap<Arc<str>, StrId>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id of `value`, adding it if it has not been seen yet
    pub fn intern(&mut self, value: &str) -> StrId {
        if let Some(&id) = self.lookup.get(value) {
            return id;
        }

        let id = StrId(self.strings.len() as u32);
        let shared: Arc<str> = Arc::from(value);
        self.strings.push(Arc::clone(&shared));
        self.lookup.insert(shared, id);
        id
    }

    /// Look up an already interned string without adding it
    pub fn get(&self, value: &str) -> Option<StrId> {
        self.lookup.get(value).copied()
    }

    /// Resolve an id produced by this table
    ///
    /// Ids from another table resolve to an empty string rather than panicking.
    pub fn resolve(&self, id: StrId) -> &str {
        self.strings.get(id.index()).map(|s| s.as_ref()).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}
