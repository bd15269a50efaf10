use log::{debug, warn};

use crate::models::facets::parse_asn_display;
use crate::models::filter::Filter;
use crate::models::navigation::{FacetSelections, NavigableQuery};
use crate::utils::error::{AppError, AppResult};

/// Filter field for each facet category
pub const COUNTRY_FIELD: &str = "asn.country";
pub const ASN_FIELD: &str = "asn.number";
pub const SERVICE_FIELD: &str = "services.protocol";

/// Composes the final filter from facet selections and query fragments.
///
/// Facets go in first, fragments are merged on top in order, so a fragment
/// naming the same field replaces the facet clause.
#[derive(Debug, Default)]
pub struct FilterBuilder {
    filter: Filter,
    skipped: usize,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add in-set clauses for every non-empty facet category.
    ///
    /// ASN selections are validated up front; one bad value fails the whole build.
    pub fn selections(mut self, selections: &FacetSelections) -> AppResult<Self> {
        if !selections.countries.is_empty() {
            self.filter.insert_in(COUNTRY_FIELD, selections.countries.clone());
        }

        if !selections.asns.is_empty() {
            let numbers = selections
                .asns
                .iter()
                .map(|asn| parse_asn_display(asn))
                .collect::<AppResult<Vec<u32>>>()?;
            self.filter.insert_in(ASN_FIELD, numbers);
        }

        if !selections.services.is_empty() {
            self.filter.insert_in(SERVICE_FIELD, selections.services.clone());
        }

        Ok(self)
    }

    /// Merge one serialized fragment; malformed fragments are dropped
    pub fn fragment(mut self, raw: &str) -> Self {
        match decode_fragment(raw) {
            Ok(fragment) => {
                debug!("Merging filter fragment {}", raw);
                self.filter.merge(fragment);
            }
            Err(e) => {
                warn!("Skipping filter fragment {:?}: {}", raw, e);
                self.skipped += 1;
            }
        }
        self
    }

    pub fn fragments<'a>(self, raws: impl IntoIterator<Item = &'a String>) -> Self {
        raws.into_iter().fold(self, |builder, raw| builder.fragment(raw))
    }

    /// Number of fragments dropped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn build(self) -> Filter {
        self.filter
    }
}

/// Build the filter for a navigable dashboard state
pub fn build_filter(nav: &NavigableQuery) -> AppResult<Filter> {
    Ok(FilterBuilder::new()
        .selections(&nav.selections)?
        .fragments(&nav.filters)
        .build())
}

fn decode_fragment(raw: &str) -> AppResult<Filter> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        return Err(AppError::ParseError("filter fragment is not a JSON object".to_string()));
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::filter::Clause;
    use serde_json::json;

    fn selections(countries: &[&str], asns: &[&str], services: &[&str]) -> FacetSelections {
        let owned = |v: &[&str]| v.iter().map(|s| s.to_string()).collect();
        FacetSelections {
            countries: owned(countries),
            asns: owned(asns),
            services: owned(services),
        }
    }

    #[test]
    fn no_input_builds_empty_filter() {
        let filter = build_filter(&NavigableQuery::default()).unwrap();
        assert!(filter.is_empty());
    }

    #[test]
    fn facets_become_in_set_clauses() {
        let filter = FilterBuilder::new()
            .selections(&selections(&["Germany", "France"], &["AS3320", "AS0"], &["ssh"]))
            .unwrap()
            .build();

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({
                "asn.country": { "$in": ["Germany", "France"] },
                "asn.number": { "$in": [3320, 0] },
                "services.protocol": { "$in": ["ssh"] },
            })
        );
    }

    #[test]
    fn empty_categories_add_no_clause() {
        let filter = FilterBuilder::new()
            .selections(&selections(&[], &[], &["http"]))
            .unwrap()
            .build();
        assert_eq!(filter.fields().collect::<Vec<_>>(), vec![SERVICE_FIELD]);
    }

    #[test]
    fn malformed_asn_is_rejected() {
        let err = FilterBuilder::new()
            .selections(&selections(&[], &["AS3320", "ASnope"], &[]))
            .unwrap_err();
        assert!(matches!(err, AppError::ParseError(_)));
    }

    #[test]
    fn query_fragment_overrides_facet_clause() {
        let nav = NavigableQuery {
            selections: selections(&["Germany"], &[], &[]),
            filters: vec![r#"{"asn.country": "France"}"#.to_string()],
            query: None,
        };
        let filter = build_filter(&nav).unwrap();
        assert_eq!(filter.get(COUNTRY_FIELD), Some(&Clause::Eq(json!("France"))));
    }

    #[test]
    fn later_fragment_wins_and_malformed_ones_are_skipped() {
        let builder = FilterBuilder::new()
            .fragment(r#"{"services.protocol":"ssh","services.port":"22"}"#)
            .fragment("{not json")
            .fragment(r#"["services.protocol"]"#)
            .fragment(r#"{"services.protocol":"http"}"#);
        assert_eq!(builder.skipped(), 2);

        let filter = builder.build();
        assert_eq!(filter.get(SERVICE_FIELD), Some(&Clause::Eq(json!("http"))));
        assert_eq!(filter.get("services.port"), Some(&Clause::Eq(json!("22"))));
    }
}
