use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Drift outcome for one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnDrift {
    pub p_value: f64,
    pub drift_status: bool,
}

/// Per-column drift results, kept in base-table column order.
///
/// Serializes as a mapping `column -> {p_value, drift_status}` whose key order
/// is the insertion order, so identical inputs give byte-identical reports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriftReport {
    entries: Vec<(String, ColumnDrift)>,
}

impl DriftReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column result. A repeated column name replaces the earlier entry in place.
    pub fn push(&mut self, column: impl Into<String>, drift: ColumnDrift) {
        let column = column.into();
        if let Some(slot) = self.entries.iter_mut().find(|(name, _)| *name == column) {
            slot.1 = drift;
        } else {
            self.entries.push((column, drift));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, column: &str) -> Option<&ColumnDrift> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, drift)| drift)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnDrift)> {
        self.entries
            .iter()
            .map(|(name, drift)| (name.as_str(), drift))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn drifted_columns(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, drift)| drift.drift_status)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// True when at least one column drifted.
    pub fn has_drift(&self) -> bool {
        self.entries.iter().any(|(_, drift)| drift.drift_status)
    }

    pub fn to_yaml_string(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}

impl Serialize for DriftReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, drift) in &self.entries {
            map.serialize_entry(name, drift)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DriftReport {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ReportVisitor;

        impl<'de> Visitor<'de> for ReportVisitor {
            type Value = DriftReport;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of column name to drift result")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(DriftReport::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut report = DriftReport::new();
                while let Some((name, drift)) = access.next_entry::<String, ColumnDrift>()? {
                    if report.get(&name).is_some() {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate column `{name}` in drift report"
                        )));
                    }
                    report.entries.push((name, drift));
                }
                Ok(report)
            }
        }

        deserializer.deserialize_map(ReportVisitor)
    }
}
