use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::null_as_default;
use crate::utils::error::{AppError, AppResult};

/// Prefix the dashboard puts in front of AS numbers
pub const ASN_DISPLAY_PREFIX: &str = "AS";

/// Aggregated counts for the active filter.
///
/// ASN keys are composite (`"<number>-<organization>"`), the other two are plain values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacetCounts {
    #[serde(default, deserialize_with = "null_as_default")]
    pub countries: BTreeMap<String, u64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub asns: BTreeMap<String, u64>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub services: BTreeMap<String, u64>,
}

impl FacetCounts {
    pub fn country_count(&self, country: &str) -> u64 {
        self.countries.get(country).copied().unwrap_or(0)
    }

    pub fn service_count(&self, protocol: &str) -> u64 {
        self.services.get(protocol).copied().unwrap_or(0)
    }

    /// Count for an `"AS<number>"` display value.
    ///
    /// The organization suffix of the key is not known here, so the first key
    /// starting with `"<number>-"` wins. Missing or malformed values count as zero.
    pub fn asn_count(&self, display: &str) -> u64 {
        let number = match parse_asn_display(display) {
            Ok(number) => number,
            Err(_) => return 0,
        };
        let prefix = format!("{}-", number);
        self.asns
            .iter()
            .find(|(key, _)| key.starts_with(&prefix))
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Country options, sorted
    pub fn country_options(&self) -> Vec<String> {
        self.countries.keys().cloned().collect()
    }

    /// Service protocol options, sorted
    pub fn service_options(&self) -> Vec<String> {
        self.services.keys().cloned().collect()
    }

    /// `"AS<number>"` options recovered from the composite keys, numerically sorted
    pub fn asn_options(&self) -> Vec<String> {
        let mut numbers: Vec<u32> = self
            .asns
            .keys()
            .filter_map(|key| key.split('-').next())
            .filter_map(|number| number.parse().ok())
            .collect();
        numbers.sort_unstable();
        numbers.dedup();
        numbers.into_iter().map(format_asn_display).collect()
    }
}

/// Turn `"AS3320"` (or a bare `"3320"`) into `3320`.
///
/// The suffix must be all ASCII digits; anything else is rejected so it never
/// reaches the API as a bogus number.
pub fn parse_asn_display(display: &str) -> AppResult<u32> {
    let trimmed = display.trim();
    let digits = trimmed.strip_prefix(ASN_DISPLAY_PREFIX).unwrap_or(trimmed);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(AppError::ParseError(format!("invalid ASN selection '{}'", display)));
    }

    digits
        .parse::<u32>()
        .map_err(|e| AppError::ParseError(format!("invalid ASN selection '{}': {}", display, e)))
}

pub fn format_asn_display(number: u32) -> String {
    format!("{}{}", ASN_DISPLAY_PREFIX, number)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts() -> FacetCounts {
        let mut facets = FacetCounts::default();
        facets.asns.insert("3320-Deutsche Telekom AG".to_string(), 5);
        facets.asns.insert("15169-Google LLC".to_string(), 7);
        facets.asns.insert("332-".to_string(), 1);
        facets.countries.insert("Germany".to_string(), 5);
        facets.services.insert("ssh".to_string(), 3);
        facets
    }

    #[test]
    fn asn_count_matches_on_number_prefix() {
        let facets = counts();
        assert_eq!(facets.asn_count("AS3320"), 5);
        assert_eq!(facets.asn_count("AS332"), 1);
        assert_eq!(facets.asn_count("AS9999"), 0);
        assert_eq!(facets.asn_count("ASxyz"), 0);
    }

    #[test]
    fn plain_counts_default_to_zero() {
        let facets = counts();
        assert_eq!(facets.country_count("Germany"), 5);
        assert_eq!(facets.country_count("France"), 0);
        assert_eq!(facets.service_count("ssh"), 3);
        assert_eq!(facets.service_count("rdp"), 0);
    }

    #[test]
    fn asn_options_are_numeric_and_deduplicated() {
        let mut facets = counts();
        facets.asns.insert("3320-Other name".to_string(), 2);
        assert_eq!(facets.asn_options(), vec!["AS332", "AS3320", "AS15169"]);
    }

    #[test]
    fn parses_asn_display_values() {
        assert_eq!(parse_asn_display("AS3320").unwrap(), 3320);
        assert_eq!(parse_asn_display("AS0").unwrap(), 0);
        assert_eq!(parse_asn_display("64512").unwrap(), 64512);
        assert!(parse_asn_display("ASfoo").is_err());
        assert!(parse_asn_display("AS").is_err());
        assert!(parse_asn_display("AS+12").is_err());
        assert!(parse_asn_display("AS99999999999").is_err());
    }

    #[test]
    fn missing_categories_decode_as_empty() {
        let facets: FacetCounts = serde_json::from_str(r#"{"countries":{"Germany":2}}"#).unwrap();
        assert!(facets.asns.is_empty());
        assert!(facets.services.is_empty());
    }
}
