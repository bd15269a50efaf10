use serde::{Deserialize, Serialize};
use url::form_urlencoded;

/// Facet categories shown in the sidebar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacetCategory {
    Countries,
    Asns,
    Services,
}

impl FacetCategory {
    pub const ALL: [FacetCategory; 3] = [FacetCategory::Countries, FacetCategory::Asns, FacetCategory::Services];

    /// Name of the navigable query parameter holding this category
    pub fn param(&self) -> &'static str {
        match self {
            FacetCategory::Countries => "countries",
            FacetCategory::Asns => "asns",
            FacetCategory::Services => "services",
        }
    }
}

/// Selected values per facet category, in selection order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetSelections {
    #[serde(default)]
    pub countries: Vec<String>,

    /// `"AS<number>"` display values
    #[serde(default)]
    pub asns: Vec<String>,

    #[serde(default)]
    pub services: Vec<String>,
}

impl FacetSelections {
    pub fn get(&self, category: FacetCategory) -> &[String] {
        match category {
            FacetCategory::Countries => &self.countries,
            FacetCategory::Asns => &self.asns,
            FacetCategory::Services => &self.services,
        }
    }

    pub fn get_mut(&mut self, category: FacetCategory) -> &mut Vec<String> {
        match category {
            FacetCategory::Countries => &mut self.countries,
            FacetCategory::Asns => &mut self.asns,
            FacetCategory::Services => &mut self.services,
        }
    }

    pub fn is_empty(&self) -> bool {
        FacetCategory::ALL.iter().all(|c| self.get(*c).is_empty())
    }
}

/// The dashboard state that lives in the URL.
///
/// `filter` holds zero or more JSON encoded fragments; `query` is only used to
/// repopulate the search box and is never sent to the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigableQuery {
    #[serde(flatten)]
    pub selections: FacetSelections,

    #[serde(default)]
    pub filters: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
}

impl NavigableQuery {
    /// Parse a raw query string (with or without the leading `?`).
    ///
    /// Facet parameters are comma joined lists and may repeat; `filter` may repeat.
    /// Unknown parameters are ignored.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut nav = NavigableQuery::default();

        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "countries" => push_list(&mut nav.selections.countries, &value),
                "asns" => push_list(&mut nav.selections.asns, &value),
                "services" => push_list(&mut nav.selections.services, &value),
                "filter" => {
                    if !value.trim().is_empty() {
                        nav.filters.push(value.into_owned());
                    }
                }
                "query" => {
                    if !value.is_empty() {
                        nav.query = Some(value.into_owned());
                    }
                }
                _ => {}
            }
        }

        nav
    }

    /// Encode back into a query string, without the leading `?`
    pub fn to_query_string(&self) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());

        for category in FacetCategory::ALL {
            let values = self.selections.get(category);
            if !values.is_empty() {
                out.append_pair(category.param(), &values.join(","));
            }
        }
        for fragment in &self.filters {
            out.append_pair("filter", fragment);
        }
        if let Some(query) = &self.query {
            out.append_pair("query", query);
        }

        out.finish()
    }

    /// Link for this state, as used by the front end router
    pub fn href(&self) -> String {
        format!("?{}", self.to_query_string())
    }
}

fn push_list(target: &mut Vec<String>, joined: &str) {
    target.extend(
        joined
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lists_and_repeated_filters() {
        let nav = NavigableQuery::parse(
            "?countries=Germany,United%20States&asns=AS3320&services=ssh&services=http\
             &filter=%7B%22a%22%3A%221%22%7D&filter=%7B%22b%22%3A%222%22%7D&query=a%3A+1&page=2",
        );
        assert_eq!(nav.selections.countries, vec!["Germany", "United States"]);
        assert_eq!(nav.selections.asns, vec!["AS3320"]);
        assert_eq!(nav.selections.services, vec!["ssh", "http"]);
        assert_eq!(nav.filters, vec![r#"{"a":"1"}"#, r#"{"b":"2"}"#]);
        assert_eq!(nav.query.as_deref(), Some("a: 1"));
    }

    #[test]
    fn empty_values_are_dropped() {
        let nav = NavigableQuery::parse("countries=&asns=,,&filter=&query=");
        assert!(nav.selections.is_empty());
        assert!(nav.filters.is_empty());
        assert!(nav.query.is_none());
    }

    #[test]
    fn query_string_survives_a_reparse() {
        let mut nav = NavigableQuery::default();
        nav.selections.countries = vec!["Côte d'Ivoire".to_string(), "Germany".to_string()];
        nav.filters.push(r#"{"services.protocol":"ssh"}"#.to_string());
        nav.query = Some("services.protocol: ssh".to_string());

        assert_eq!(NavigableQuery::parse(&nav.href()), nav);
    }

    #[test]
    fn empty_state_has_empty_query_string() {
        assert_eq!(NavigableQuery::default().to_query_string(), "");
    }
}
