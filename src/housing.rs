// 🏠 Housing Quarter Aggregator
//
// City-level home values come as one column per month. They are folded into
// calendar quarters (mean of the months present) and keyed by full state
// name + region so they can be joined with the college town list.

use crate::error::{PipelineError, Result};
use crate::quarter::{parse_month_column, Quarter};
use crate::states::StateNames;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

pub const REGION_COLUMN: &str = "RegionName";
pub const STATE_COLUMN: &str = "State";

// ============================================================================
// MONTHLY INPUT
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPriceRow {
    pub region: String,
    /// Two-letter code as it appears in the source
    pub state: String,
    /// Aligned with `MonthlyPriceTable::months`
    pub prices: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MonthlyPriceTable {
    pub months: Vec<NaiveDate>,
    pub rows: Vec<MonthlyPriceRow>,
}

/// Load the monthly file, keeping month columns from `first_quarter` onward
pub fn load_monthly_prices(path: &Path, first_quarter: Quarter) -> Result<MonthlyPriceTable> {
    let file = File::open(path).map_err(|e| PipelineError::from_io(path, e))?;

    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::from_csv(path, e))?
        .clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| PipelineError::malformed(path, 1, format!("missing {} column", name)))
    };
    let region_idx = column(REGION_COLUMN)?;
    let state_idx = column(STATE_COLUMN)?;

    let (month_indices, months): (Vec<usize>, Vec<NaiveDate>) = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, header)| parse_month_column(header).map(|month| (idx, month)))
        .filter(|(_, month)| Quarter::from_date(*month) >= first_quarter)
        .unzip();

    let mut rows = Vec::new();

    for (row_num, result) in reader.records().enumerate() {
        let line = row_num + 2; // 1-indexed + header row
        let record = result.map_err(|e| PipelineError::from_csv(path, e))?;

        let mut prices = Vec::with_capacity(month_indices.len());
        for (&idx, month) in month_indices.iter().zip(&months) {
            let raw = record.get(idx).unwrap_or("").trim();
            let price = if raw.is_empty() {
                None
            } else {
                Some(raw.parse::<f64>().map_err(|_| {
                    PipelineError::malformed(
                        path,
                        line,
                        format!("bad price {:?} for {}", raw, month.format("%Y-%m")),
                    )
                })?)
            };
            prices.push(price);
        }

        rows.push(MonthlyPriceRow {
            region: record.get(region_idx).unwrap_or("").trim().to_string(),
            state: record.get(state_idx).unwrap_or("").trim().to_string(),
            prices,
        });
    }

    tracing::debug!(
        path = %path.display(),
        rows = rows.len(),
        months = months.len(),
        "loaded monthly housing prices"
    );

    Ok(MonthlyPriceTable { months, rows })
}

// ============================================================================
// QUARTERLY OUTPUT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HousingRecord {
    pub state: String,
    pub region: String,
    /// Quarters where every month was missing are absent
    pub prices: BTreeMap<Quarter, f64>,
}

impl HousingRecord {
    pub fn price_at(&self, quarter: Quarter) -> Option<f64> {
        self.prices.get(&quarter).copied()
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.state, &self.region)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct HousingTable {
    /// Every quarter covered by the month columns, chronological
    pub quarters: Vec<Quarter>,
    /// Sorted by (state, region), one record per pair
    pub records: Vec<HousingRecord>,
}

impl HousingTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, state: &str, region: &str) -> Option<&HousingRecord> {
        self.records
            .binary_search_by(|r| r.key().cmp(&(state, region)))
            .ok()
            .map(|i| &self.records[i])
    }
}

/// Fold monthly prices into quarterly means with full state names
pub fn aggregate_quarters(monthly: &MonthlyPriceTable, states: &StateNames) -> HousingTable {
    let mut quarter_months: BTreeMap<Quarter, Vec<usize>> = BTreeMap::new();
    for (idx, month) in monthly.months.iter().enumerate() {
        quarter_months
            .entry(Quarter::from_date(*month))
            .or_default()
            .push(idx);
    }

    let mut by_key: BTreeMap<(String, String), HousingRecord> = BTreeMap::new();

    for row in &monthly.rows {
        let state = states.full_name(&row.state).to_string();

        let prices = quarter_months
            .iter()
            .filter_map(|(quarter, indices)| {
                let present: Vec<f64> = indices
                    .iter()
                    .filter_map(|&i| row.prices.get(i).copied().flatten())
                    .collect();
                quarter_mean(&present).map(|m| (*quarter, m))
            })
            .collect();

        match by_key.entry((state.clone(), row.region.clone())) {
            Entry::Vacant(slot) => {
                slot.insert(HousingRecord {
                    state,
                    region: row.region.clone(),
                    prices,
                });
            }
            Entry::Occupied(_) => {
                tracing::warn!(
                    state = %state,
                    region = %row.region,
                    "duplicate housing row, keeping first occurrence"
                );
            }
        }
    }

    let table = HousingTable {
        quarters: quarter_months.into_keys().collect(),
        records: by_key.into_values().collect(),
    };

    tracing::info!(
        regions = table.records.len(),
        quarters = table.quarters.len(),
        "housing data aggregated to quarters"
    );

    table
}

/// None when every month of the quarter is missing
fn quarter_mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.mean())
    }
}
