// 🏫 College Town List Parser
//
// Input is a flat listing where state headers carry an "[edit]" marker and
// every following line is a town in that state:
//
//   Michigan[edit]
//   Ann Arbor (University of Michigan)[9]
//   Ypsilanti (Eastern Michigan University)[9]
//
// A single forward pass carries the current state down to each region line.

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Marker identifying a state header line
pub const STATE_HEADER_MARKER: &str = "[edit]";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TownRecord {
    /// Full state name; None when the line came before any state header
    pub state: Option<String>,
    pub region: String,
}

impl TownRecord {
    /// (state, region) join key, if the record has a state
    pub fn key(&self) -> Option<(&str, &str)> {
        self.state
            .as_deref()
            .map(|state| (state, self.region.as_str()))
    }
}

/// Parse raw listing lines into town records
pub fn parse_town_lines<I, S>(lines: I) -> Vec<TownRecord>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut current_state: Option<String> = None;
    let mut records = Vec::new();

    for line in lines {
        let line = line.as_ref().trim_end_matches(|c| c == '\r' || c == '\n');
        if line.trim().is_empty() {
            continue;
        }

        if let Some(marker_pos) = line.find(STATE_HEADER_MARKER) {
            current_state = Some(line[..marker_pos].trim().to_string());
            continue;
        }

        if current_state.is_none() {
            tracing::warn!(region = line, "region listed before any state header");
        }

        records.push(TownRecord {
            state: current_state.clone(),
            region: strip_annotation(line).to_string(),
        });
    }

    records
}

/// Drop a trailing parenthetical such as " (University of Michigan)[9]".
/// Trailing whitespace goes too, even on lines with no parenthetical.
pub fn strip_annotation(line: &str) -> &str {
    if let Some(pos) = line.find(" (") {
        return line[..pos].trim_end();
    }
    if let Some(pos) = line.find('(') {
        return line[..pos].trim_end();
    }
    line.trim_end()
}

/// Read and parse the college town listing
pub fn load_town_list(path: &Path) -> Result<Vec<TownRecord>> {
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::from_io(path, e))?;
    let records = parse_town_lines(content.lines());

    tracing::debug!(
        path = %path.display(),
        towns = records.len(),
        "parsed college town list"
    );

    Ok(records)
}
