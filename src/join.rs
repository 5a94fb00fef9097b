// 🔗 Price Ratio Joiner
//
// Every housing region lands in exactly one group: college towns (key found
// in the town list) or everyone else. Each region gets
//
//   price_ratio = price(before) / price(after)
//
// so a ratio above 1.0 means prices fell across the recession.

use crate::housing::{HousingRecord, HousingTable};
use crate::quarter::Quarter;
use crate::recession::RecessionWindow;
use crate::towns::TownRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TownGroup {
    CollegeTown,
    NonCollegeTown,
}

impl TownGroup {
    pub fn label(&self) -> &'static str {
        match self {
            TownGroup::CollegeTown => "college town",
            TownGroup::NonCollegeTown => "non-college town",
        }
    }
}

impl fmt::Display for TownGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The two quarters whose prices form the ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceQuarters {
    /// Last quarter before the recession (numerator)
    pub before: Quarter,
    /// Recession bottom (denominator)
    pub after: Quarter,
}

impl Default for ReferenceQuarters {
    fn default() -> Self {
        ReferenceQuarters {
            before: Quarter::at(2008, 2),
            after: Quarter::at(2009, 2),
        }
    }
}

impl ReferenceQuarters {
    /// Quarter preceding the recession start vs. the recession bottom
    pub fn from_recession(window: &RecessionWindow) -> Self {
        ReferenceQuarters {
            before: window.start.previous(),
            after: window.bottom,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinedRecord {
    pub state: String,
    pub region: String,
    /// None when either reference price is missing
    pub price_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct JoinedGroups {
    pub college_towns: Vec<JoinedRecord>,
    pub non_college_towns: Vec<JoinedRecord>,
}

impl JoinedGroups {
    pub fn group(&self, group: TownGroup) -> &[JoinedRecord] {
        match group {
            TownGroup::CollegeTown => &self.college_towns,
            TownGroup::NonCollegeTown => &self.non_college_towns,
        }
    }

    /// Non-missing ratios of one group
    pub fn ratios(&self, group: TownGroup) -> Vec<f64> {
        self.group(group)
            .iter()
            .filter_map(|r| r.price_ratio)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.college_towns.len() + self.non_college_towns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn price_ratio(record: &HousingRecord, refs: &ReferenceQuarters) -> Option<f64> {
    let before = record.price_at(refs.before)?;
    let after = record.price_at(refs.after)?;
    let ratio = before / after;
    ratio.is_finite().then_some(ratio)
}

/// Partition `housing` into college towns and the rest
pub fn join_price_ratios(
    towns: &[TownRecord],
    housing: &HousingTable,
    refs: &ReferenceQuarters,
) -> JoinedGroups {
    let town_keys: HashSet<(&str, &str)> = towns.iter().filter_map(TownRecord::key).collect();

    let mut groups = JoinedGroups::default();

    for record in &housing.records {
        let joined = JoinedRecord {
            state: record.state.clone(),
            region: record.region.clone(),
            price_ratio: price_ratio(record, refs),
        };

        if town_keys.contains(&record.key()) {
            groups.college_towns.push(joined);
        } else {
            groups.non_college_towns.push(joined);
        }
    }

    // Listed towns the housing file has no row for
    let unmatched = town_keys
        .iter()
        .filter(|(state, region)| housing.get(state, region).is_none())
        .count();

    tracing::info!(
        college_towns = groups.college_towns.len(),
        non_college_towns = groups.non_college_towns.len(),
        unmatched_towns = unmatched,
        before = %refs.before,
        after = %refs.after,
        "joined town list with housing data"
    );

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn housing(state: &str, region: &str, prices: &[(Quarter, f64)]) -> HousingRecord {
        HousingRecord {
            state: state.to_string(),
            region: region.to_string(),
            prices: prices.iter().copied().collect::<BTreeMap<_, _>>(),
        }
    }

    fn town(state: Option<&str>, region: &str) -> TownRecord {
        TownRecord {
            state: state.map(str::to_string),
            region: region.to_string(),
        }
    }

    fn q(label: &str) -> Quarter {
        label.parse().unwrap()
    }

    fn table(records: Vec<HousingRecord>) -> HousingTable {
        HousingTable {
            quarters: vec![q("2008q2"), q("2009q2")],
            records,
        }
    }

    #[test]
    fn test_ratio_literal_pair() {
        let record = housing("Ohio", "Oxford", &[(q("2008q2"), 200.0), (q("2009q2"), 100.0)]);
        assert_eq!(price_ratio(&record, &ReferenceQuarters::default()), Some(2.0));
    }

    #[test]
    fn test_ratio_missing_when_price_absent() {
        let record = housing("Ohio", "Oxford", &[(q("2008q2"), 200.0)]);
        assert_eq!(price_ratio(&record, &ReferenceQuarters::default()), None);
    }

    #[test]
    fn test_ratio_missing_when_denominator_zero() {
        let record = housing("Ohio", "Oxford", &[(q("2008q2"), 200.0), (q("2009q2"), 0.0)]);
        assert_eq!(price_ratio(&record, &ReferenceQuarters::default()), None);
    }

    #[test]
    fn test_join_partitions_housing_exactly() {
        let housing_table = table(vec![
            housing("Iowa", "Ames", &[(q("2008q2"), 1.0), (q("2009q2"), 1.0)]),
            housing("Iowa", "Des Moines", &[(q("2008q2"), 1.0), (q("2009q2"), 1.0)]),
            housing("Michigan", "Ann Arbor", &[(q("2008q2"), 1.0)]),
            housing("Texas", "Austin", &[]),
        ]);
        let towns = vec![
            town(Some("Iowa"), "Ames"),
            town(Some("Iowa"), "Ames"), // duplicate listing
            town(Some("Michigan"), "Ann Arbor"),
            town(Some("Vermont"), "Burlington"), // no housing data
            town(None, "Austin"),                // headless line never matches
        ];

        let groups = join_price_ratios(&towns, &housing_table, &ReferenceQuarters::default());

        assert_eq!(groups.len(), housing_table.len());
        let college: Vec<_> = groups.college_towns.iter().map(|r| r.region.as_str()).collect();
        let others: Vec<_> = groups.non_college_towns.iter().map(|r| r.region.as_str()).collect();
        assert_eq!(college, vec!["Ames", "Ann Arbor"]);
        assert_eq!(others, vec!["Des Moines", "Austin"]);
    }

    #[test]
    fn test_join_is_case_sensitive() {
        let housing_table = table(vec![housing("Iowa", "Ames", &[])]);
        let towns = vec![town(Some("iowa"), "ames")];

        let groups = join_price_ratios(&towns, &housing_table, &ReferenceQuarters::default());

        assert!(groups.college_towns.is_empty());
        assert_eq!(groups.non_college_towns.len(), 1);
    }

    #[test]
    fn test_ratios_skip_missing() {
        let housing_table = table(vec![
            housing("Iowa", "Ames", &[(q("2008q2"), 3.0), (q("2009q2"), 2.0)]),
            housing("Iowa", "Boone", &[]),
        ]);

        let groups = join_price_ratios(&[], &housing_table, &ReferenceQuarters::default());

        assert_eq!(groups.ratios(TownGroup::NonCollegeTown), vec![1.5]);
        assert!(groups.ratios(TownGroup::CollegeTown).is_empty());
    }

    #[test]
    fn test_reference_quarters_from_recession() {
        let window = RecessionWindow {
            start: q("2008q3"),
            end: q("2009q4"),
            bottom: q("2009q2"),
        };

        assert_eq!(
            ReferenceQuarters::from_recession(&window),
            ReferenceQuarters::default()
        );
    }

    #[test]
    fn test_group_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TownGroup::NonCollegeTown).unwrap(),
            "\"non_college_town\""
        );
    }
}
