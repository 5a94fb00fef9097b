// 📉 Recession Window Finder
//
// Start  = first quarter with two consecutive declines around it
// End    = first trough: two declines into it, two rises out of it
// Bottom = lowest-GDP quarter among all troughs
//
// All three scans are the same sliding-window search with a different
// window shape and predicate.

use crate::error::{PipelineError, Result};
use crate::gdp::QuarterlyGdpPoint;
use crate::quarter::Quarter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A monotonic shape over `before + 1 + after` consecutive values, reported
/// at the centre position
#[derive(Clone, Copy)]
pub struct TrendPattern {
    pub name: &'static str,
    pub before: usize,
    pub after: usize,
    predicate: fn(&[f64]) -> bool,
}

pub const RECESSION_START: TrendPattern = TrendPattern {
    name: "recession start",
    before: 1,
    after: 1,
    predicate: two_declines,
};

pub const RECESSION_TROUGH: TrendPattern = TrendPattern {
    name: "recession trough",
    before: 2,
    after: 2,
    predicate: trough,
};

fn two_declines(w: &[f64]) -> bool {
    w[2] < w[1] && w[1] < w[0]
}

fn trough(w: &[f64]) -> bool {
    w[0] > w[1] && w[1] > w[2] && w[2] < w[3] && w[3] < w[4]
}

impl fmt::Debug for TrendPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrendPattern")
            .field("name", &self.name)
            .field("before", &self.before)
            .field("after", &self.after)
            .finish_non_exhaustive()
    }
}

impl TrendPattern {
    pub fn window_len(&self) -> usize {
        self.before + 1 + self.after
    }

    /// Centre indices of every matching window, in chronological order
    pub fn matches(&self, values: &[f64]) -> Vec<usize> {
        values
            .windows(self.window_len())
            .enumerate()
            .filter(|(_, window)| (self.predicate)(window))
            .map(|(start, _)| start + self.before)
            .collect()
    }

    pub fn first_match(&self, values: &[f64]) -> Option<usize> {
        values
            .windows(self.window_len())
            .position(|window| (self.predicate)(window))
            .map(|start| start + self.before)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecessionWindow {
    pub start: Quarter,
    pub end: Quarter,
    pub bottom: Quarter,
}

fn gdp_values(series: &[QuarterlyGdpPoint]) -> Vec<f64> {
    series.iter().map(|p| p.gdp).collect()
}

fn not_found(pattern: &TrendPattern) -> PipelineError {
    PipelineError::PatternNotFound {
        pattern: pattern.name,
    }
}

pub fn find_recession_start(series: &[QuarterlyGdpPoint]) -> Result<Quarter> {
    RECESSION_START
        .first_match(&gdp_values(series))
        .map(|i| series[i].quarter)
        .ok_or_else(|| not_found(&RECESSION_START))
}

/// First trough quarter; the recession is reported as ending at the trough
/// itself, not at the quarter where recovery is confirmed
pub fn find_recession_end(series: &[QuarterlyGdpPoint]) -> Result<Quarter> {
    RECESSION_TROUGH
        .first_match(&gdp_values(series))
        .map(|i| series[i].quarter)
        .ok_or_else(|| not_found(&RECESSION_TROUGH))
}

/// Lowest-valued trough. Equal minima resolve to the earliest quarter.
pub fn find_recession_bottom(series: &[QuarterlyGdpPoint]) -> Result<Quarter> {
    RECESSION_TROUGH
        .matches(&gdp_values(series))
        .into_iter()
        .map(|i| &series[i])
        // min_by keeps the first of several equal elements
        .min_by(|a, b| a.gdp.total_cmp(&b.gdp))
        .map(|p| p.quarter)
        .ok_or_else(|| not_found(&RECESSION_TROUGH))
}

pub fn find_recession_window(series: &[QuarterlyGdpPoint]) -> Result<RecessionWindow> {
    let window = RecessionWindow {
        start: find_recession_start(series)?,
        end: find_recession_end(series)?,
        bottom: find_recession_bottom(series)?,
    };

    tracing::info!(
        start = %window.start,
        end = %window.end,
        bottom = %window.bottom,
        "recession window located"
    );

    Ok(window)
}
