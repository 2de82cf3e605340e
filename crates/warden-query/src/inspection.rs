//! # Inspection Reports
//!
//! Every query records, per concrete path it touched, whether the path was
//! a hit, undefined, or a soft type mismatch. Entries keep the order in
//! which they were first recorded; recording the same concrete path again
//! overwrites its status in place.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Outcome for one concrete path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathStatus {
    /// The path resolved to a defined value (null counts as defined).
    Hit,
    /// A key was absent, or the parent was not a map.
    Undefined,
    /// An object-list segment found something other than a gap-free list.
    TypeMismatch,
}

impl PathStatus {
    /// Stable string form used in reports.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "hit",
            Self::Undefined => "undefined",
            Self::TypeMismatch => "wrong_type",
        }
    }

    /// Returns true for [`PathStatus::Hit`].
    pub fn is_hit(self) -> bool {
        matches!(self, Self::Hit)
    }
}

impl std::fmt::Display for PathStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PathStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Ordered map from concrete path to [`PathStatus`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inspection {
    entries: Vec<(String, PathStatus)>,
    index: HashMap<String, usize>,
}

impl Inspection {
    /// Record a status, overwriting any earlier status for the same path.
    pub fn record(&mut self, path: impl Into<String>, status: PathStatus) {
        let path = path.into();
        match self.index.get(&path) {
            Some(&i) => self.entries[i].1 = status,
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push((path, status));
            }
        }
    }

    /// Status recorded for a concrete path.
    pub fn get(&self, path: &str) -> Option<PathStatus> {
        self.index.get(path).map(|&i| self.entries[i].1)
    }

    /// Entries in first-recorded order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, PathStatus)> {
        self.entries.iter().map(|(p, s)| (p.as_str(), *s))
    }

    /// Number of recorded paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Inspection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, status) in &self.entries {
            map.serialize_entry(path, status)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_keeps_first_position_and_overwrites() {
        let mut inspection = Inspection::default();
        inspection.record("a", PathStatus::Undefined);
        inspection.record("b", PathStatus::Hit);
        inspection.record("a", PathStatus::Hit);

        let entries: Vec<_> = inspection.iter().collect();
        assert_eq!(entries, vec![("a", PathStatus::Hit), ("b", PathStatus::Hit)]);
        assert_eq!(inspection.len(), 2);
    }

    #[test]
    fn get_unknown_path_is_none() {
        let inspection = Inspection::default();
        assert!(inspection.is_empty());
        assert_eq!(inspection.get("a"), None);
    }

    #[test]
    fn serializes_as_ordered_object() {
        let mut inspection = Inspection::default();
        inspection.record("z", PathStatus::Hit);
        inspection.record("a[].", PathStatus::TypeMismatch);
        let json = serde_json::to_string(&inspection).unwrap();
        assert_eq!(json, r#"{"z":"hit","a[].":"wrong_type"}"#);
    }
}
