// 🗺️ State Names - abbreviation → full name
//
// The housing file carries two-letter codes, the college town list carries
// full names. The table is passed explicitly to the aggregator instead of
// living as module state.

use std::collections::HashMap;

/// 50 states, DC, the territories, and Zillow's "NA" national rollup
pub const STATE_ABBREVIATIONS: &[(&str, &str)] = &[
    ("OH", "Ohio"),
    ("KY", "Kentucky"),
    ("AS", "American Samoa"),
    ("NV", "Nevada"),
    ("WY", "Wyoming"),
    ("NA", "National"),
    ("AL", "Alabama"),
    ("MD", "Maryland"),
    ("AK", "Alaska"),
    ("UT", "Utah"),
    ("OR", "Oregon"),
    ("MT", "Montana"),
    ("IL", "Illinois"),
    ("TN", "Tennessee"),
    ("DC", "District of Columbia"),
    ("VT", "Vermont"),
    ("ID", "Idaho"),
    ("AR", "Arkansas"),
    ("ME", "Maine"),
    ("WA", "Washington"),
    ("HI", "Hawaii"),
    ("WI", "Wisconsin"),
    ("MI", "Michigan"),
    ("IN", "Indiana"),
    ("NJ", "New Jersey"),
    ("AZ", "Arizona"),
    ("GU", "Guam"),
    ("MS", "Mississippi"),
    ("PR", "Puerto Rico"),
    ("NC", "North Carolina"),
    ("TX", "Texas"),
    ("SD", "South Dakota"),
    ("MP", "Northern Mariana Islands"),
    ("IA", "Iowa"),
    ("MO", "Missouri"),
    ("CT", "Connecticut"),
    ("WV", "West Virginia"),
    ("SC", "South Carolina"),
    ("LA", "Louisiana"),
    ("KS", "Kansas"),
    ("NY", "New York"),
    ("NE", "Nebraska"),
    ("OK", "Oklahoma"),
    ("FL", "Florida"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("PA", "Pennsylvania"),
    ("DE", "Delaware"),
    ("NM", "New Mexico"),
    ("RI", "Rhode Island"),
    ("MN", "Minnesota"),
    ("VI", "Virgin Islands"),
    ("NH", "New Hampshire"),
    ("MA", "Massachusetts"),
    ("GA", "Georgia"),
    ("ND", "North Dakota"),
    ("VA", "Virginia"),
];

#[derive(Debug, Clone)]
pub struct StateNames {
    names: HashMap<String, String>,
}

impl StateNames {
    /// Mapping built from `STATE_ABBREVIATIONS`
    pub fn us_states() -> Self {
        Self::from_pairs(STATE_ABBREVIATIONS.iter().copied())
    }

    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        StateNames {
            names: pairs
                .into_iter()
                .map(|(abbr, name)| (abbr.to_string(), name.to_string()))
                .collect(),
        }
    }

    pub fn lookup(&self, abbreviation: &str) -> Option<&str> {
        self.names.get(abbreviation).map(String::as_str)
    }

    /// Full name for `abbreviation`; unknown codes come back unchanged
    pub fn full_name<'a>(&'a self, abbreviation: &'a str) -> &'a str {
        self.lookup(abbreviation).unwrap_or(abbreviation)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for StateNames {
    fn default() -> Self {
        Self::us_states()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_has_every_entry_once() {
        let names = StateNames::us_states();
        assert_eq!(names.len(), STATE_ABBREVIATIONS.len());
        assert_eq!(names.len(), 57);
    }

    #[test]
    fn test_full_name_known_codes() {
        let names = StateNames::us_states();
        assert_eq!(names.full_name("MI"), "Michigan");
        assert_eq!(names.full_name("DC"), "District of Columbia");
        assert_eq!(names.full_name("NA"), "National");
    }

    #[test]
    fn test_unknown_code_passes_through() {
        let names = StateNames::us_states();
        assert_eq!(names.full_name("ZZ"), "ZZ");
        assert_eq!(names.lookup("ZZ"), None);
    }

    #[test]
    fn test_custom_mapping() {
        let names = StateNames::from_pairs([("XX", "Example")]);
        assert_eq!(names.full_name("XX"), "Example");
        assert_eq!(names.full_name("MI"), "MI");
    }
}
