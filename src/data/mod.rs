//! Data module - indicator fetching, caching and table preparation

mod disk_cache;
mod indicator;
mod loader;
mod processor;
mod source;

pub use disk_cache::{CachedSource, ResponseCache};
pub use indicator::{Indicator, FIRST_YEAR, LAST_YEAR};
pub use loader::{IndicatorRecord, LoaderError, ObservationTable, TableCache};
pub use source::{IndicatorSource, WorldBankClient};

#[cfg(test)]
pub use source::RawObservation;
