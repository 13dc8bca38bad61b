use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub id: Option<u64>,
    pub username: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    pub id: u64,
    pub equipment_name: String,
    pub equipment_type: String,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

/// Equipment type to count, in the order the backend listed them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Distribution(Vec<(String, u64)>);

impl Distribution {
    pub fn entries(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, count)| count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, u64)> for Distribution {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for Distribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, count) in &self.0 {
            map.serialize_entry(name, count)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Distribution {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DistributionVisitor;

        impl<'de> Visitor<'de> for DistributionVisitor {
            type Value = Distribution;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of equipment type to count")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, count)) = access.next_entry::<String, u64>()? {
                    entries.push((name, count));
                }
                Ok(Distribution(entries))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Distribution::default())
            }
        }

        deserializer.deserialize_any(DistributionVisitor)
    }
}

/// A dataset as returned by the API. History listings omit `records`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: u64,
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub uploaded_by: Option<Identity>,
    pub total_count: u64,
    pub avg_flowrate: f64,
    pub avg_pressure: f64,
    pub avg_temperature: f64,
    #[serde(default)]
    pub equipment_distribution: Distribution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<EquipmentRecord>>,
}

impl Dataset {
    pub fn records(&self) -> &[EquipmentRecord] {
        self.records.as_deref().unwrap_or_default()
    }

    pub fn is_full(&self) -> bool {
        self.records.is_some()
    }

    pub fn distribution_matches_total(&self) -> bool {
        self.equipment_distribution.total() == self.total_count
    }

    pub fn report_filename(&self) -> String {
        format!("{}_report.pdf", self.filename)
    }
}

fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::TimeZone;

    use super::*;

    pub fn record(
        id: u64,
        equipment_type: &str,
        flowrate: f64,
        pressure: f64,
        temperature: f64,
    ) -> EquipmentRecord {
        EquipmentRecord {
            id,
            equipment_name: format!("{equipment_type}-{id}"),
            equipment_type: equipment_type.to_string(),
            flowrate,
            pressure,
            temperature,
        }
    }

    pub fn summary(id: u64, distribution: &[(&str, u64)]) -> Dataset {
        let distribution = distribution
            .iter()
            .map(|(name, count)| ((*name).to_string(), *count))
            .collect::<Distribution>();

        Dataset {
            id,
            filename: format!("dataset-{id}.csv"),
            uploaded_at: Utc.with_ymd_and_hms(2026, 1, 5, 10, 20, 0).unwrap(),
            uploaded_by: None,
            total_count: distribution.total(),
            avg_flowrate: 0.0,
            avg_pressure: 0.0,
            avg_temperature: 0.0,
            equipment_distribution: distribution,
            records: None,
        }
    }

    pub fn full(id: u64, records: Vec<EquipmentRecord>) -> Dataset {
        let mut distribution: Vec<(String, u64)> = Vec::new();
        for record in &records {
            match distribution
                .iter_mut()
                .find(|(name, _)| *name == record.equipment_type)
            {
                Some((_, count)) => *count += 1,
                None => distribution.push((record.equipment_type.clone(), 1)),
            }
        }

        Dataset {
            total_count: records.len() as u64,
            equipment_distribution: distribution.into_iter().collect(),
            records: Some(records),
            ..summary(id, &[])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_DATASET: &str = r#"{
        "id": 7,
        "uploaded_by": {"id": 1, "username": "alice", "email": "", "first_name": "", "last_name": ""},
        "uploaded_at": "2026-01-05T10:20:30.123456Z",
        "filename": "plant.csv",
        "total_count": 3,
        "avg_flowrate": 120.5,
        "avg_pressure": 5.25,
        "avg_temperature": 110.0,
        "equipment_distribution": {"Valve": 1, "Pump": 2},
        "records": [
            {"id": 1, "equipment_name": "P-1", "equipment_type": "Pump", "flowrate": 100.0, "pressure": 5.0, "temperature": 100.0},
            {"id": 2, "equipment_name": "V-1", "equipment_type": "Valve", "flowrate": 60.0, "pressure": 4.0, "temperature": 90.0},
            {"id": 3, "equipment_name": "P-2", "equipment_type": "Pump", "flowrate": 201.5, "pressure": 6.75, "temperature": 140.0}
        ]
    }"#;

    #[test]
    fn full_dataset_deserializes_with_records() {
        let dataset: Dataset = serde_json::from_str(FULL_DATASET).unwrap();

        assert!(dataset.is_full());
        assert_eq!(dataset.records().len(), 3);
        assert_eq!(dataset.uploaded_by.as_ref().map(|user| user.username.as_str()), Some("alice"));
        assert_eq!(
            dataset.uploaded_by.as_ref().and_then(|user| user.email.as_ref()),
            None
        );
        assert!(dataset.distribution_matches_total());
    }

    #[test]
    fn distribution_keeps_backend_order() {
        let dataset: Dataset = serde_json::from_str(FULL_DATASET).unwrap();
        let types = dataset.equipment_distribution.types().collect::<Vec<_>>();

        assert_eq!(types, vec!["Valve", "Pump"]);
    }

    #[test]
    fn summary_dataset_has_no_records() {
        let json = r#"{
            "id": 3,
            "uploaded_by": null,
            "uploaded_at": "2026-01-04T08:00:00Z",
            "filename": "old.csv",
            "total_count": 0,
            "avg_flowrate": 0.0,
            "avg_pressure": 0.0,
            "avg_temperature": 0.0,
            "equipment_distribution": {}
        }"#;
        let dataset: Dataset = serde_json::from_str(json).unwrap();

        assert!(!dataset.is_full());
        assert!(dataset.records().is_empty());
        assert!(dataset.equipment_distribution.is_empty());
    }

    #[test]
    fn report_filename_appends_suffix() {
        let dataset = fixtures::summary(1, &[]);

        assert_eq!(dataset.report_filename(), "dataset-1.csv_report.pdf");
    }
}
