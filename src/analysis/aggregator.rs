//! Capacity aggregation.
//!
//! Turns raw plant records into sorted summary tables of summed
//! electrical capacity by canton, energy source, or both. Every function
//! here is pure: records are borrowed and never modified.

use crate::models::{AggregatedRow, Dimension, Filter, PlantRecord, SourceLevel};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Restrict `records` by `filter`, group by `dimension` and sum capacity.
///
/// Rows come back sorted by capacity (largest first), ties broken by the
/// primary key and then the energy source in ascending order. An empty
/// input, or a filter value that matches nothing, yields an empty table.
/// `level` picks the energy source column used for both filtering and
/// grouping.
pub fn aggregate(
    records: &[PlantRecord],
    dimension: Dimension,
    filter: &Filter,
    level: SourceLevel,
) -> Vec<AggregatedRow> {
    let mut groups: HashMap<(Option<String>, Option<String>), f64> = HashMap::new();

    for record in records.iter().filter(|r| filter.matches(r, level)) {
        let key = group_key(record, dimension, level);
        *groups.entry(key).or_insert(0.0) += record.capacity();
    }

    let mut rows: Vec<AggregatedRow> = groups
        .into_iter()
        .map(|((canton, energy_source), capacity)| AggregatedRow {
            canton,
            energy_source,
            capacity,
        })
        .collect();

    sort_rows(&mut rows);
    rows
}

fn group_key(
    record: &PlantRecord,
    dimension: Dimension,
    level: SourceLevel,
) -> (Option<String>, Option<String>) {
    match dimension {
        Dimension::Canton => (Some(record.canton_name().to_string()), None),
        Dimension::EnergySource => (None, Some(record.source(level).to_string())),
        Dimension::CantonAndSource => (
            Some(record.canton_name().to_string()),
            Some(record.source(level).to_string()),
        ),
    }
}

/// Sort rows by capacity descending with a deterministic tie-break.
pub fn sort_rows(rows: &mut [AggregatedRow]) {
    rows.sort_by(|a, b| {
        b.capacity
            .total_cmp(&a.capacity)
            .then_with(|| a.primary_key().cmp(b.primary_key()))
            .then_with(|| a.energy_source.cmp(&b.energy_source))
    });
}

/// Sum of capacity over the records that pass `filter`.
pub fn total_capacity(records: &[PlantRecord], filter: &Filter, level: SourceLevel) -> f64 {
    records
        .iter()
        .filter(|r| filter.matches(r, level))
        .map(PlantRecord::capacity)
        .sum()
}

/// Distinct energy sources, sorted.
pub fn distinct_sources(records: &[PlantRecord], level: SourceLevel) -> Vec<String> {
    records
        .iter()
        .map(|r| r.source(level).to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct canton display names (unmapped markers included), sorted.
pub fn distinct_cantons(records: &[PlantRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.canton_name().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Record counts per canton code that is missing from the lookup table.
pub fn unmapped_codes(records: &[PlantRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();

    for record in records.iter().filter(|r| !r.canton_name().is_mapped()) {
        *counts
            .entry(record.canton_code.trim().to_string())
            .or_insert(0) += 1;
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn plant(canton: &str, source: &str, capacity: f64) -> PlantRecord {
        PlantRecord {
            canton_code: canton.to_string(),
            energy_source: source.to_string(),
            energy_source_detail: None,
            electrical_capacity: Some(capacity),
            latitude: None,
            longitude: None,
            project_name: String::new(),
        }
    }

    fn sample() -> Vec<PlantRecord> {
        vec![
            plant("ZH", "Wind", 10.0),
            plant("ZH", "Solar", 5.0),
            plant("BE", "Wind", 20.0),
        ]
    }

    fn row(canton: Option<&str>, source: Option<&str>, capacity: f64) -> AggregatedRow {
        AggregatedRow {
            canton: canton.map(String::from),
            energy_source: source.map(String::from),
            capacity,
        }
    }

    #[test]
    fn test_by_canton_all_sources() {
        let rows = aggregate(
            &sample(),
            Dimension::Canton,
            &Filter::All,
            SourceLevel::Broad,
        );

        assert_eq!(
            rows,
            vec![
                row(Some("Bern"), None, 20.0),
                row(Some("Zürich"), None, 15.0),
            ]
        );
    }

    #[test]
    fn test_by_canton_and_source_filtered() {
        let rows = aggregate(
            &sample(),
            Dimension::CantonAndSource,
            &Filter::source("Wind"),
            SourceLevel::Broad,
        );

        assert_eq!(
            rows,
            vec![
                row(Some("Bern"), Some("Wind"), 20.0),
                row(Some("Zürich"), Some("Wind"), 10.0),
            ]
        );
    }

    #[test]
    fn test_by_source_for_one_canton() {
        let rows = aggregate(
            &sample(),
            Dimension::EnergySource,
            &Filter::canton("Zürich"),
            SourceLevel::Broad,
        );

        assert_eq!(
            rows,
            vec![row(None, Some("Wind"), 10.0), row(None, Some("Solar"), 5.0)]
        );
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let rows = aggregate(&[], Dimension::Canton, &Filter::All, SourceLevel::Broad);
        assert!(rows.is_empty());
    }

    #[test]
    fn test_unknown_category_yields_empty_output() {
        let rows = aggregate(
            &sample(),
            Dimension::Canton,
            &Filter::source("Geothermal"),
            SourceLevel::Broad,
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn test_missing_capacity_counts_as_zero() {
        let mut records = sample();
        records.push(PlantRecord {
            electrical_capacity: None,
            ..plant("BE", "Wind", 0.0)
        });
        records.push(plant("BE", "Wind", f64::NAN));

        let rows = aggregate(
            &records,
            Dimension::Canton,
            &Filter::All,
            SourceLevel::Broad,
        );
        assert_eq!(rows[0], row(Some("Bern"), None, 20.0));
    }

    #[test]
    fn test_ties_broken_by_primary_key() {
        let records = vec![
            plant("ZH", "Wind", 5.0),
            plant("AG", "Wind", 5.0),
            plant("BE", "Wind", 5.0),
        ];

        let rows = aggregate(
            &records,
            Dimension::Canton,
            &Filter::All,
            SourceLevel::Broad,
        );
        let names: Vec<_> = rows.iter().map(|r| r.primary_key()).collect();
        assert_eq!(names, vec!["Aargau", "Bern", "Zürich"]);
    }

    #[test]
    fn test_unmapped_codes_pass_through() {
        let mut records = sample();
        records.push(plant("XX", "Hydro", 99.0));

        let rows = aggregate(
            &records,
            Dimension::Canton,
            &Filter::All,
            SourceLevel::Broad,
        );
        assert_eq!(rows[0], row(Some("Unmapped (XX)"), None, 99.0));

        let unmapped = unmapped_codes(&records);
        assert_eq!(unmapped.get("XX"), Some(&1));
        assert_eq!(unmapped.len(), 1);
    }

    #[test]
    fn test_detailed_level_groups_subtypes() {
        let mut records = sample();
        records.push(PlantRecord {
            energy_source_detail: Some("Biomass and biogas".to_string()),
            ..plant("BE", "Bioenergy", 3.0)
        });

        let rows = aggregate(
            &records,
            Dimension::EnergySource,
            &Filter::source("Biomass and biogas"),
            SourceLevel::Detailed,
        );
        assert_eq!(rows, vec![row(None, Some("Biomass and biogas"), 3.0)]);
    }

    #[test]
    fn test_full_grid_yields_every_pair() {
        let records = vec![
            plant("ZH", "Wind", 1.0),
            plant("ZH", "Solar", 2.0),
            plant("BE", "Wind", 3.0),
            plant("BE", "Solar", 4.0),
        ];
        let rows = aggregate(
            &records,
            Dimension::CantonAndSource,
            &Filter::All,
            SourceLevel::Broad,
        );
        assert_eq!(rows.len(), 4);

        let sparse = &records[..3];
        let rows = aggregate(
            sparse,
            Dimension::CantonAndSource,
            &Filter::All,
            SourceLevel::Broad,
        );
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_distinct_values_sorted() {
        let records = sample();
        assert_eq!(
            distinct_sources(&records, SourceLevel::Broad),
            vec!["Solar", "Wind"]
        );
        assert_eq!(distinct_cantons(&records), vec!["Bern", "Zürich"]);
    }

    const CODES: [&str; 6] = ["ZH", "BE", "VS", "GR", "TI", "XX"];
    const SOURCES: [&str; 4] = ["Hydro", "Wind", "Solar", "Bioenergy"];

    fn records_strategy() -> impl Strategy<Value = Vec<PlantRecord>> {
        let row = (0..CODES.len(), 0..SOURCES.len(), 0.0..1000.0f64);
        prop::collection::vec(row, 0..60).prop_map(|rows| {
            rows.into_iter()
                .map(|(c, s, cap)| plant(CODES[c], SOURCES[s], cap))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_total_is_conserved(records in records_strategy()) {
            let rows = aggregate(
                &records,
                Dimension::Canton,
                &Filter::All,
                SourceLevel::Broad,
            );
            let expected: f64 = records.iter().map(|r| r.capacity()).sum();
            let actual: f64 = rows.iter().map(|r| r.capacity).sum();
            assert_relative_eq!(actual, expected, epsilon = 1e-6, max_relative = 1e-9);
        }

        #[test]
        fn prop_rows_sorted_descending(records in records_strategy()) {
            let dimensions = [
                Dimension::Canton,
                Dimension::EnergySource,
                Dimension::CantonAndSource,
            ];
            for dimension in dimensions {
                let rows = aggregate(&records, dimension, &Filter::All, SourceLevel::Broad);
                for pair in rows.windows(2) {
                    prop_assert!(pair[0].capacity >= pair[1].capacity);
                }
            }
        }

        #[test]
        fn prop_filtered_total_matches(records in records_strategy(), s in 0..SOURCES.len()) {
            let filter = Filter::source(SOURCES[s]);
            let rows = aggregate(&records, Dimension::Canton, &filter, SourceLevel::Broad);
            let expected: f64 = records
                .iter()
                .filter(|r| r.energy_source == SOURCES[s])
                .map(|r| r.capacity())
                .sum();
            let actual: f64 = rows.iter().map(|r| r.capacity).sum();
            assert_relative_eq!(actual, expected, epsilon = 1e-6, max_relative = 1e-9);
            assert_relative_eq!(
                total_capacity(&records, &filter, SourceLevel::Broad),
                expected,
                epsilon = 1e-6,
                max_relative = 1e-9
            );
        }

        #[test]
        fn prop_pair_count_matches_populated_pairs(records in records_strategy()) {
            let rows = aggregate(
                &records,
                Dimension::CantonAndSource,
                &Filter::All,
                SourceLevel::Broad,
            );
            let cantons = distinct_cantons(&records).len();
            let sources = distinct_sources(&records, SourceLevel::Broad).len();
            prop_assert!(rows.len() <= cantons * sources);

            let pairs: BTreeSet<(String, String)> = records
                .iter()
                .map(|r| (r.canton_name().to_string(), r.energy_source.clone()))
                .collect();
            prop_assert_eq!(rows.len(), pairs.len());
        }
    }
}
