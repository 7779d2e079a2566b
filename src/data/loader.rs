//! Observation Table Loader
//! Builds the prepared table from an indicator source and memoizes it for the
//! lifetime of the process.

use crate::data::processor::{DataProcessor, ProcessorError, COUNTRY, YEAR};
use crate::data::source::{IndicatorSource, RawObservation, SourceError};
use crate::data::Indicator;
use once_cell::sync::OnceCell;
use polars::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to fetch indicator data: {0}")]
    Source(#[from] SourceError),
    #[error("Failed to prepare data: {0}")]
    Processor(#[from] ProcessorError),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Indicator source returned no observations")]
    EmptySource,
    #[error("No observations fall inside the configured year range")]
    EmptyRange,
}

/// One row of the table projected onto a single indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRecord {
    pub country: String,
    pub year: i32,
    pub value: Option<f64>,
}

/// Prepared, immutable observation table.
#[derive(Debug, Clone)]
pub struct ObservationTable {
    df: DataFrame,
}

impl ObservationTable {
    pub fn from_observations(observations: &[RawObservation]) -> Result<Self, LoaderError> {
        let merged = DataProcessor::merge_observations(observations)?;
        let df = DataProcessor::prepare_table(merged)?;
        Ok(Self { df })
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Distinct country names, sorted.
    pub fn countries(&self) -> Vec<String> {
        self.df
            .column(COUNTRY)
            .ok()
            .and_then(|col| col.str().ok())
            .map(|ca| {
                ca.into_iter()
                    .flatten()
                    .map(str::to_string)
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Distinct years, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .df
            .column(YEAR)
            .ok()
            .and_then(|col| col.i32().ok())
            .map(|ca| ca.into_iter().flatten().collect())
            .unwrap_or_default();
        years.dedup();
        years
    }

    /// Rows in table order with the indicator's value.
    pub fn records(&self, indicator: Indicator) -> Result<Vec<IndicatorRecord>, LoaderError> {
        Self::records_of(&self.df, indicator)
    }

    /// Rows for the selected countries only, in table order.
    pub fn records_for(
        &self,
        indicator: Indicator,
        selected: &[String],
    ) -> Result<Vec<IndicatorRecord>, LoaderError> {
        let filtered = DataProcessor::filter_countries(&self.df, selected)?;
        Self::records_of(&filtered, indicator)
    }

    /// Min and max of the indicator over the whole table.
    pub fn value_range(&self, indicator: Indicator) -> Option<(f64, f64)> {
        let values = self.df.column(indicator.field()).ok()?.f64().ok()?;
        Some((values.min()?, values.max()?))
    }

    fn records_of(df: &DataFrame, indicator: Indicator) -> Result<Vec<IndicatorRecord>, LoaderError> {
        let countries = df.column(COUNTRY)?.str()?;
        let years = df.column(YEAR)?.i32()?;
        let values = df.column(indicator.field())?.f64()?;

        Ok(countries
            .into_iter()
            .zip(years)
            .zip(values)
            .filter_map(|((country, year), value)| {
                Some(IndicatorRecord {
                    country: country?.to_string(),
                    year: year?,
                    value,
                })
            })
            .collect())
    }
}

/// Fetch all indicator series and prepare the table.
pub fn load_table(source: &dyn IndicatorSource) -> Result<ObservationTable, LoaderError> {
    info!("Loading indicator data...");

    let mut raw = Vec::new();
    for indicator in Indicator::SOURCE_ORDER {
        raw.extend(source.fetch(indicator)?);
    }
    if raw.is_empty() {
        return Err(LoaderError::EmptySource);
    }

    let table = ObservationTable::from_observations(&raw)?;
    if table.height() == 0 {
        return Err(LoaderError::EmptyRange);
    }

    info!(
        rows = table.height(),
        countries = table.countries().len(),
        "observation table ready"
    );
    Ok(table)
}

/// Compute-once holder for the observation table. A failed load leaves it
/// empty so the next call tries again.
#[derive(Default)]
pub struct TableCache {
    cell: OnceCell<Arc<ObservationTable>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load(
        &self,
        source: &dyn IndicatorSource,
    ) -> Result<Arc<ObservationTable>, LoaderError> {
        self.cell
            .get_or_try_init(|| load_table(source).map(Arc::new))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn obs(indicator: Indicator, country: &str, date: &str, value: Option<f64>) -> RawObservation {
        RawObservation {
            indicator,
            country: country.to_string(),
            date: date.to_string(),
            value,
        }
    }

    struct FixtureSource {
        calls: AtomicUsize,
        rows: Vec<RawObservation>,
    }

    impl FixtureSource {
        fn new(rows: Vec<RawObservation>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                rows,
            }
        }
    }

    impl IndicatorSource for FixtureSource {
        fn fetch(&self, indicator: Indicator) -> Result<Vec<RawObservation>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .rows
                .iter()
                .filter(|r| r.indicator == indicator)
                .cloned()
                .collect())
        }
    }

    struct FailingSource;

    impl IndicatorSource for FailingSource {
        fn fetch(&self, indicator: Indicator) -> Result<Vec<RawObservation>, SourceError> {
            Err(SourceError::Status {
                status: 503,
                url: indicator.code().to_string(),
            })
        }
    }

    fn fixture() -> FixtureSource {
        FixtureSource::new(vec![
            obs(Indicator::TotalPopulation, "A", "2000", Some(10.0)),
            obs(Indicator::TotalPopulation, "A", "1959", Some(9.0)),
            obs(Indicator::TotalPopulation, "B", "2000", Some(20.0)),
            obs(Indicator::TotalPopulation, "B", "1960", Some(15.0)),
            obs(Indicator::Gdp, "A", "2000", Some(500.0)),
            obs(Indicator::Gdp, "C", "2023", None),
            obs(Indicator::NetMigration, "B", "2024", Some(3.0)),
        ])
    }

    #[test]
    fn prepared_table_is_bounded_and_sorted() {
        let table = load_table(&fixture()).unwrap();
        let years: Vec<i32> = table
            .df
            .column(YEAR)
            .unwrap()
            .i32()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();

        assert_eq!(years, vec![1960, 2000, 2000, 2023]);
        assert!(years.iter().all(|y| (1960..=2023).contains(y)));
        assert!(years.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prepared_table_has_exact_columns() {
        let table = load_table(&fixture()).unwrap();
        let names: Vec<String> = table
            .df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            names,
            ["Country", "Year", "total_population", "gdp_per_capita", "net_migration"]
        );
    }

    #[test]
    fn equal_years_keep_merge_order_and_missing_values_stay_null() {
        let table = load_table(&fixture()).unwrap();
        let gdp = table.records(Indicator::Gdp).unwrap();

        let order: Vec<(&str, i32)> = gdp.iter().map(|r| (r.country.as_str(), r.year)).collect();
        assert_eq!(order, vec![("B", 1960), ("A", 2000), ("B", 2000), ("C", 2023)]);
        assert_eq!(gdp[1].value, Some(500.0));
        assert_eq!(gdp[2].value, None);
        assert_eq!(gdp[3].value, None);
    }

    #[test]
    fn accessors_report_distinct_values() {
        let table = load_table(&fixture()).unwrap();
        assert_eq!(table.countries(), vec!["A", "B", "C"]);
        assert_eq!(table.years(), vec![1960, 2000, 2023]);
        assert_eq!(table.value_range(Indicator::TotalPopulation), Some((10.0, 20.0)));
        assert_eq!(table.value_range(Indicator::NetMigration), None);
    }

    #[test]
    fn records_for_selection_only() {
        let table = load_table(&fixture()).unwrap();
        let rows = table
            .records_for(Indicator::TotalPopulation, &["B".to_string()])
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.country == "B"));
    }

    #[test]
    fn cache_reuses_the_first_table() {
        let source = fixture();
        let cache = TableCache::new();

        let first = cache.get_or_load(&source).unwrap();
        let second = cache.get_or_load(&source).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.df.equals_missing(&second.df));
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let cache = TableCache::new();
        assert!(matches!(
            cache.get_or_load(&FailingSource),
            Err(LoaderError::Source(_))
        ));
        assert!(cache.cell.get().is_none());
        assert!(cache.get_or_load(&fixture()).is_ok());
    }

    #[test]
    fn empty_source_is_fatal() {
        let err = load_table(&FixtureSource::new(Vec::new())).unwrap_err();
        assert!(matches!(err, LoaderError::EmptySource));
    }

    #[test]
    fn nothing_in_range_is_fatal() {
        let source = FixtureSource::new(vec![obs(Indicator::Gdp, "A", "1900", Some(1.0))]);
        assert!(matches!(load_table(&source), Err(LoaderError::EmptyRange)));
    }
}
