// College Town Recession Study - Core Library
// Every pipeline stage lives here; the binary only adds CLI + logging

pub mod error;
pub mod quarter;
pub mod states;
pub mod towns;     // TownListParser
pub mod gdp;
pub mod recession; // RecessionWindowFinder
pub mod housing;   // HousingQuarterAggregator
pub mod join;      // PriceRatioJoiner
pub mod hypothesis; // HypothesisTester
pub mod config;
pub mod pipeline;

// Re-export commonly used types
pub use error::{PipelineError, Result};
pub use quarter::{parse_month_column, Quarter};
pub use states::{StateNames, STATE_ABBREVIATIONS};
pub use towns::{load_town_list, parse_town_lines, TownRecord, STATE_HEADER_MARKER};
pub use gdp::{anchor_series, load_gdp_series, GdpSheetLayout, GdpSource, QuarterlyGdpPoint};
pub use recession::{
    find_recession_bottom, find_recession_end, find_recession_start, find_recession_window,
    RecessionWindow, TrendPattern, RECESSION_START, RECESSION_TROUGH,
};
pub use housing::{
    aggregate_quarters, load_monthly_prices,
    HousingRecord, HousingTable, MonthlyPriceRow, MonthlyPriceTable,
};
pub use join::{
    join_price_ratios, price_ratio,
    JoinedGroups, JoinedRecord, ReferenceQuarters, TownGroup,
};
pub use hypothesis::{run_ttest, ttest_ind, TestResult, TwoSampleTTest, SIGNIFICANCE_LEVEL};
pub use config::{PipelineConfig, ReferenceMode};
pub use pipeline::{analyze, run_pipeline, PipelineReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
