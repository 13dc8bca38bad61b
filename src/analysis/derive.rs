use crate::types::{Distribution, EquipmentRecord};

#[derive(Debug, Clone, PartialEq)]
pub struct DistributionSlice {
    pub equipment_type: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAverages {
    pub equipment_type: String,
    pub records: usize,
    pub flowrate: f64,
    pub pressure: f64,
    pub temperature: f64,
}

/// Per-type averages laid out as aligned chart series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSeries {
    pub labels: Vec<String>,
    pub flowrate: Vec<f64>,
    pub pressure: Vec<f64>,
    pub temperature: Vec<f64>,
}

impl ParameterSeries {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Default)]
struct Group<'a> {
    equipment_type: &'a str,
    flowrate: Vec<f64>,
    pressure: Vec<f64>,
    temperature: Vec<f64>,
}

#[expect(clippy::cast_precision_loss)]
pub fn percentage(count: u64, total_count: u64) -> f64 {
    if total_count == 0 {
        return 0.0;
    }

    count as f64 / total_count as f64 * 100.0
}

pub fn distribution_series(distribution: &Distribution, total_count: u64) -> Vec<DistributionSlice> {
    distribution
        .entries()
        .map(|(equipment_type, count)| DistributionSlice {
            equipment_type: equipment_type.to_string(),
            count,
            percentage: percentage(count, total_count),
        })
        .collect()
}

/// Groups records by type, in order of first appearance, and averages each
/// parameter. Types without records never get a group.
pub fn derive_averages(records: &[EquipmentRecord]) -> Vec<TypeAverages> {
    let mut groups: Vec<Group<'_>> = Vec::new();

    for record in records {
        let index = match groups
            .iter()
            .position(|group| group.equipment_type == record.equipment_type)
        {
            Some(index) => index,
            None => {
                groups.push(Group {
                    equipment_type: &record.equipment_type,
                    ..Group::default()
                });
                groups.len() - 1
            }
        };

        let group = &mut groups[index];
        group.flowrate.push(record.flowrate);
        group.pressure.push(record.pressure);
        group.temperature.push(record.temperature);
    }

    groups
        .into_iter()
        .filter_map(|group| {
            Some(TypeAverages {
                equipment_type: group.equipment_type.to_string(),
                records: group.flowrate.len(),
                flowrate: mean(&group.flowrate)?,
                pressure: mean(&group.pressure)?,
                temperature: mean(&group.temperature)?,
            })
        })
        .collect()
}

pub fn parameter_series(records: &[EquipmentRecord]) -> ParameterSeries {
    derive_averages(records).into_iter().fold(
        ParameterSeries::default(),
        |mut series, averages| {
            series.labels.push(averages.equipment_type);
            series.flowrate.push(averages.flowrate);
            series.pressure.push(averages.pressure);
            series.temperature.push(averages.temperature);
            series
        },
    )
}

#[expect(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use crate::types::fixtures::{record, summary};

    use super::*;

    #[test]
    fn averages_per_type() {
        let records = vec![
            record(1, "Pump", 10.0, 2.0, 30.0),
            record(2, "Pump", 20.0, 4.0, 50.0),
        ];

        let averages = derive_averages(&records);

        assert_eq!(
            averages,
            vec![TypeAverages {
                equipment_type: "Pump".to_string(),
                records: 2,
                flowrate: 15.0,
                pressure: 3.0,
                temperature: 40.0,
            }]
        );
    }

    #[test]
    fn series_follow_first_appearance() {
        let records = vec![
            record(1, "Valve", 50.0, 3.0, 80.0),
            record(2, "Pump", 100.0, 5.0, 100.0),
            record(3, "Valve", 70.0, 5.0, 90.0),
            record(4, "Reactor", 10.0, 12.0, 300.0),
        ];

        let series = parameter_series(&records);

        assert_eq!(series.labels, vec!["Valve", "Pump", "Reactor"]);
        assert_eq!(series.flowrate, vec![60.0, 100.0, 10.0]);
        assert_eq!(series.pressure, vec![4.0, 5.0, 12.0]);
        assert_eq!(series.temperature, vec![85.0, 100.0, 300.0]);
    }

    #[test]
    fn empty_records_give_empty_series() {
        assert!(derive_averages(&[]).is_empty());
        assert!(parameter_series(&[]).is_empty());
    }

    #[test]
    fn derivation_is_repeatable() {
        let records = vec![
            record(1, "Pump", 10.0, 2.0, 30.0),
            record(2, "Valve", 1.5, 0.5, 20.0),
        ];

        assert_eq!(parameter_series(&records), parameter_series(&records));
    }

    #[test]
    fn types_missing_from_records_are_omitted() {
        let dataset = summary(1, &[("Pump", 1), ("Compressor", 2)]);
        let records = vec![record(1, "Pump", 10.0, 2.0, 30.0)];

        let series = parameter_series(&records);

        assert_eq!(dataset.equipment_distribution.types().count(), 2);
        assert_eq!(series.labels, vec!["Pump"]);
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let dataset = summary(1, &[("Pump", 4), ("Valve", 3), ("Heat Exchanger", 2)]);

        let slices = distribution_series(&dataset.equipment_distribution, dataset.total_count);
        let total = slices.iter().map(|slice| slice.percentage).sum::<f64>();

        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(slices[0].equipment_type, "Pump");
        assert_eq!(format!("{:.1}", slices[2].percentage), "22.2");
    }

    #[test]
    fn zero_total_gives_zero_percent() {
        assert!(percentage(3, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn mean_of_nothing_is_undefined() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }
}
