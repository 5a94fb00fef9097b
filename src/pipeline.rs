// 🚦 Pipeline Orchestrator
//
//   towns ───────────────┐
//   housing → quarters ──┴→ join → t-test
//   GDP → recession window ──┘ (reference quarters in Recession mode)

use crate::config::{PipelineConfig, ReferenceMode};
use crate::error::Result;
use crate::gdp::{anchor_series, load_gdp_series, QuarterlyGdpPoint};
use crate::housing::{aggregate_quarters, load_monthly_prices, MonthlyPriceTable};
use crate::hypothesis::{run_ttest, TestResult};
use crate::join::{join_price_ratios, ReferenceQuarters};
use crate::recession::{find_recession_window, RecessionWindow};
use crate::states::StateNames;
use crate::towns::{load_town_list, TownRecord};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    pub recession: RecessionWindow,
    pub reference_quarters: ReferenceQuarters,
    pub town_count: usize,
    pub region_count: usize,
    pub quarter_count: usize,
    pub college_town_count: usize,
    pub non_college_town_count: usize,
    pub result: TestResult,
}

impl PipelineReport {
    pub fn summary(&self) -> String {
        format!(
            "Recession {} → {} (bottom {}), {} vs {} towns: {}",
            self.recession.start,
            self.recession.end,
            self.recession.bottom,
            self.college_town_count,
            self.non_college_town_count,
            self.result.summary()
        )
    }
}

/// Load the three input files named by `config` and run the analysis
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    config.validate()?;

    let towns = load_town_list(&config.town_list_path)?;
    let gdp = load_gdp_series(&config.gdp_path, &config.gdp_layout)?;
    let monthly = load_monthly_prices(&config.housing_path, config.first_housing_quarter)?;

    analyze(&towns, &gdp, &monthly, config)
}

/// In-memory composition of every stage
pub fn analyze(
    towns: &[TownRecord],
    gdp: &[QuarterlyGdpPoint],
    monthly: &MonthlyPriceTable,
    config: &PipelineConfig,
) -> Result<PipelineReport> {
    let series = anchor_series(gdp, config.anchor_quarter, config.anchor_lookback)?;
    let recession = find_recession_window(series)?;

    let housing = aggregate_quarters(monthly, &StateNames::us_states());

    let reference_quarters = match config.reference_mode {
        ReferenceMode::Fixed => config.reference_quarters,
        ReferenceMode::Recession => ReferenceQuarters::from_recession(&recession),
    };

    let groups = join_price_ratios(towns, &housing, &reference_quarters);
    let result = run_ttest(&groups, config.significance_level)?;

    Ok(PipelineReport {
        recession,
        reference_quarters,
        town_count: towns.len(),
        region_count: housing.len(),
        quarter_count: housing.quarters.len(),
        college_town_count: groups.college_towns.len(),
        non_college_town_count: groups.non_college_towns.len(),
        result,
    })
}
