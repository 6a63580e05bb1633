//! Ordered, deduplicated string registries
//!
//! Products and salespersons are simple append-mostly name lists persisted
//! independently of the store and visit collections.

use serde::{Deserialize, Serialize};

/// An ordered list of unique names
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Registry {
    entries: Vec<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from raw entries, trimming whitespace, dropping
    /// empties, and keeping the first occurrence of each name
    /// (case-sensitive).
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for entry in entries {
            registry.add(entry.as_ref());
        }
        registry
    }

    /// Append a name if not already present. Returns true when added.
    pub fn add(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.entries.iter().any(|e| e == name) {
            return false;
        }
        self.entries.push(name.to_string());
        true
    }

    /// Remove a name. Returns true when it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e != name.trim());
        self.entries.len() != before
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e == name.trim())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Default product list seeded on `init`
pub fn default_products() -> Registry {
    Registry::from_entries(["EVFA PRO", "EVFA PRO KatzE", "EVFA Cap", "EVFA PRO PLUS"])
}

/// Default salesperson list seeded on `init`
pub fn default_salespersons() -> Registry {
    Registry::from_entries([
        "John Smith",
        "Sarah Johnson",
        "Mike Chen",
        "Lisa Wong",
        "David Brown",
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_dedups_and_preserves_order() {
        let mut reg = Registry::new();
        assert!(reg.add("EVFA PRO"));
        assert!(reg.add("EVFA Cap"));
        assert!(!reg.add("EVFA PRO"));
        assert!(!reg.add("  EVFA Cap  "));
        assert_eq!(reg.iter().collect::<Vec<_>>(), vec!["EVFA PRO", "EVFA Cap"]);
    }

    #[test]
    fn test_add_rejects_empty() {
        let mut reg = Registry::new();
        assert!(!reg.add(""));
        assert!(!reg.add("   "));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut reg = Registry::from_entries(["a", "b", "c"]);
        assert!(reg.remove("b"));
        assert!(!reg.remove("b"));
        assert_eq!(reg.iter().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn test_yaml_is_plain_list() {
        let reg = Registry::from_entries(["John Smith", "Lisa Wong"]);
        let yaml = serde_yml::to_string(&reg).unwrap();
        let back: Registry = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(back, reg);
    }
}
