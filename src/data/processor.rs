//! Data Processor Module
//! Reshapes raw indicator observations into the observation table.

use crate::data::source::RawObservation;
use crate::data::{Indicator, FIRST_YEAR, LAST_YEAR};
use polars::prelude::*;
use std::collections::HashMap;
use thiserror::Error;

/// Country column of the prepared table.
pub const COUNTRY: &str = "Country";
/// Year column of the prepared table.
pub const YEAR: &str = "Year";

// Names used by the source before preparation.
const SOURCE_COUNTRY: &str = "country";
const SOURCE_DATE: &str = "date";

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Handles merge, cleaning and filtering of indicator data.
pub struct DataProcessor;

impl DataProcessor {
    /// Outer-join the per-indicator series on (country, date).
    ///
    /// Output columns: ["country", "date", total_population, gdp_per_capita, net_migration]
    pub fn merge_observations(observations: &[RawObservation]) -> Result<DataFrame, ProcessorError> {
        let mut index: HashMap<(&str, &str), usize> = HashMap::new();
        let mut countries: Vec<String> = Vec::new();
        let mut dates: Vec<String> = Vec::new();
        let mut values: [Vec<Option<f64>>; 3] = Default::default();

        for obs in observations {
            let row = *index
                .entry((obs.country.as_str(), obs.date.as_str()))
                .or_insert_with(|| {
                    countries.push(obs.country.clone());
                    dates.push(obs.date.clone());
                    for column in values.iter_mut() {
                        column.push(None);
                    }
                    countries.len() - 1
                });

            if let Some(slot) = Indicator::SOURCE_ORDER
                .iter()
                .position(|i| *i == obs.indicator)
            {
                values[slot][row] = obs.value;
            }
        }

        let mut columns = vec![
            Column::new(SOURCE_COUNTRY.into(), countries),
            Column::new(SOURCE_DATE.into(), dates),
        ];
        for (indicator, column) in Indicator::SOURCE_ORDER.iter().zip(values) {
            columns.push(Column::new(indicator.field().into(), column));
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Rename to Country/Year, make Year numeric, keep the fixed year range
    /// and sort ascending by Year. Rows sharing a year keep their order.
    pub fn prepare_table(mut df: DataFrame) -> Result<DataFrame, ProcessorError> {
        df.rename(SOURCE_COUNTRY, COUNTRY.into())?;
        df.rename(SOURCE_DATE, YEAR.into())?;

        let prepared = df
            .lazy()
            .with_column(col(YEAR).strict_cast(DataType::Int32))
            .filter(
                col(YEAR)
                    .gt_eq(lit(FIRST_YEAR))
                    .and(col(YEAR).lt_eq(lit(LAST_YEAR))),
            )
            .sort([YEAR], SortMultipleOptions::default().with_maintain_order(true))
            .collect()?;

        Ok(prepared)
    }

    /// Keep rows whose Country is in `selected`.
    pub fn filter_countries(df: &DataFrame, selected: &[String]) -> Result<DataFrame, ProcessorError> {
        let countries = df.column(COUNTRY)?.str()?;
        let mask: BooleanChunked = countries
            .into_iter()
            .map(|c| c.is_some_and(|c| selected.iter().any(|s| s == c)))
            .collect();

        Ok(df.filter(&mask)?)
    }
}
