//! Tracked Indicators
//! The three World Bank series and the fixed text attached to each.

use serde::{Deserialize, Serialize};

/// First year kept in the prepared table.
pub const FIRST_YEAR: i32 = 1960;
/// Last year kept in the prepared table.
pub const LAST_YEAR: i32 = 2023;

/// One of the tracked numeric series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Indicator {
    #[default]
    Gdp,
    TotalPopulation,
    NetMigration,
}

impl Indicator {
    /// Order in which series are requested and laid out as table columns.
    pub const SOURCE_ORDER: [Indicator; 3] = [
        Indicator::TotalPopulation,
        Indicator::Gdp,
        Indicator::NetMigration,
    ];

    /// Order shown in the map selector.
    pub const DISPLAY_ORDER: [Indicator; 3] = [
        Indicator::Gdp,
        Indicator::TotalPopulation,
        Indicator::NetMigration,
    ];

    /// World Bank indicator code.
    pub fn code(self) -> &'static str {
        match self {
            Indicator::Gdp => "NY.GDP.PCAP.CD",
            Indicator::TotalPopulation => "SP.POP.TOTL",
            Indicator::NetMigration => "SM.POP.NETM",
        }
    }

    /// Column name in the observation table.
    pub fn field(self) -> &'static str {
        match self {
            Indicator::Gdp => "gdp_per_capita",
            Indicator::TotalPopulation => "total_population",
            Indicator::NetMigration => "net_migration",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Indicator::Gdp => "GDP",
            Indicator::TotalPopulation => "Total Population",
            Indicator::NetMigration => "Net Migration",
        }
    }

    pub fn map_title(self) -> &'static str {
        match self {
            Indicator::Gdp => "GDP from 1960 to 2023",
            Indicator::TotalPopulation => "Total Population from 1960 to 2023",
            Indicator::NetMigration => "Net Migration from 1960 to 2023",
        }
    }

    /// Color bar title on the map.
    pub fn legend_label(self) -> &'static str {
        match self {
            Indicator::Gdp => "GDP Per Capita US$",
            Indicator::TotalPopulation => "Total Population",
            Indicator::NetMigration => "Net Migration",
        }
    }
}
