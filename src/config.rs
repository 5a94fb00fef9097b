// ⚙️ Pipeline Configuration
// Defaults reproduce the classic run: files in the working directory,
// 2000q1 anchor, 2008q2 / 2009q2 comparison, p < 0.01.

use crate::error::{PipelineError, Result};
use crate::gdp::GdpSheetLayout;
use crate::hypothesis::SIGNIFICANCE_LEVEL;
use crate::join::ReferenceQuarters;
use crate::quarter::Quarter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the two comparison quarters are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceMode {
    /// Use `PipelineConfig::reference_quarters` as given
    #[default]
    Fixed,
    /// Quarter before recession start vs. recession bottom
    Recession,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub town_list_path: PathBuf,
    pub gdp_path: PathBuf,
    pub housing_path: PathBuf,

    pub gdp_layout: GdpSheetLayout,
    /// GDP scanning starts `anchor_lookback` rows before this quarter
    pub anchor_quarter: Quarter,
    pub anchor_lookback: usize,

    /// Earliest housing quarter kept
    pub first_housing_quarter: Quarter,

    pub reference_mode: ReferenceMode,
    pub reference_quarters: ReferenceQuarters,

    pub significance_level: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            town_list_path: PathBuf::from("university_towns.txt"),
            gdp_path: PathBuf::from("gdplev.xls"),
            housing_path: PathBuf::from("City_Zhvi_AllHomes.csv"),
            gdp_layout: GdpSheetLayout::default(),
            anchor_quarter: Quarter::at(2000, 1),
            anchor_lookback: 2,
            first_housing_quarter: Quarter::at(2000, 1),
            reference_mode: ReferenceMode::Fixed,
            reference_quarters: ReferenceQuarters::default(),
            significance_level: SIGNIFICANCE_LEVEL,
        }
    }
}

impl PipelineConfig {
    /// Load from JSON; fields left out keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::from_io(path, e))?;

        let config: PipelineConfig = serde_json::from_str(&content)
            .map_err(|e| PipelineError::InvalidConfig(format!("{}: {}", path.display(), e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            )));
        }

        if self.reference_quarters.before == self.reference_quarters.after {
            return Err(PipelineError::InvalidConfig(format!(
                "reference quarters must differ, both are {}",
                self.reference_quarters.before
            )));
        }

        Ok(())
    }
}
