// 🧪 Hypothesis Tester
//
// H0: college towns and other towns saw the same mean price ratio across the
// recession. Student's two-sample t-test (pooled variance), two-tailed.

use crate::error::{PipelineError, Result};
use crate::join::{JoinedGroups, TownGroup};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use statrs::statistics::Statistics;

/// Reject H0 when p falls below this
pub const SIGNIFICANCE_LEVEL: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoSampleTTest {
    pub statistic: f64,
    pub p_value: f64,
    pub df: f64,
}

/// Independent two-sample t-test assuming equal variances.
///
/// Degenerate input (fewer than one degree of freedom, or zero spread with
/// equal means) yields NaN statistic and p-value instead of an error.
pub fn ttest_ind(a: &[f64], b: &[f64]) -> TwoSampleTTest {
    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let df = n1 + n2 - 2.0;

    if a.is_empty() || b.is_empty() || df <= 0.0 {
        return TwoSampleTTest {
            statistic: f64::NAN,
            p_value: f64::NAN,
            df,
        };
    }

    let mean1 = a.mean();
    let mean2 = b.mean();

    let pooled_variance = (sum_of_squares(a) + sum_of_squares(b)) / df;
    let standard_error = (pooled_variance * (1.0 / n1 + 1.0 / n2)).sqrt();
    let statistic = (mean1 - mean2) / standard_error;

    let p_value = if statistic.is_nan() {
        f64::NAN
    } else if statistic.is_infinite() {
        0.0
    } else {
        StudentsT::new(0.0, 1.0, df)
            .map(|dist| 2.0 * dist.sf(statistic.abs()))
            .unwrap_or(f64::NAN)
    };

    TwoSampleTTest {
        statistic,
        p_value,
        df,
    }
}

/// (n - 1) * sample variance; a single observation contributes nothing
fn sum_of_squares(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    (values.len() - 1) as f64 * values.variance()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub is_significant: bool,
    /// Raw two-tailed p-value
    pub p_value: f64,
    /// Group with the lower mean price ratio (smaller drop)
    pub better_group: TownGroup,
    pub t_statistic: f64,
    pub degrees_of_freedom: f64,
    pub college_town_mean: f64,
    pub non_college_town_mean: f64,
    pub college_town_count: usize,
    pub non_college_town_count: usize,
}

impl TestResult {
    pub fn summary(&self) -> String {
        format!(
            "different={}, p={:.6e}, better={}",
            self.is_significant, self.p_value, self.better_group
        )
    }
}

/// Compare college town ratios against the rest; missing ratios are dropped
/// from each sample independently
pub fn run_ttest(groups: &JoinedGroups, significance_level: f64) -> Result<TestResult> {
    let college = groups.ratios(TownGroup::CollegeTown);
    let others = groups.ratios(TownGroup::NonCollegeTown);

    if college.is_empty() {
        return Err(PipelineError::EmptyJoinResult {
            group: TownGroup::CollegeTown,
        });
    }
    if others.is_empty() {
        return Err(PipelineError::EmptyJoinResult {
            group: TownGroup::NonCollegeTown,
        });
    }

    let test = ttest_ind(&college, &others);
    let college_mean = college.as_slice().mean();
    let others_mean = others.as_slice().mean();

    let better_group = if college_mean < others_mean {
        TownGroup::CollegeTown
    } else {
        TownGroup::NonCollegeTown
    };

    if test.p_value.is_nan() {
        tracing::warn!(
            college_towns = college.len(),
            non_college_towns = others.len(),
            "t-test is degenerate, p-value is NaN"
        );
    }

    let result = TestResult {
        // NaN never compares below the threshold
        is_significant: test.p_value < significance_level,
        p_value: test.p_value,
        better_group,
        t_statistic: test.statistic,
        degrees_of_freedom: test.df,
        college_town_mean: college_mean,
        non_college_town_mean: others_mean,
        college_town_count: college.len(),
        non_college_town_count: others.len(),
    };

    tracing::info!(
        p_value = result.p_value,
        t = result.t_statistic,
        better = %result.better_group,
        "t-test complete"
    );

    Ok(result)
}
