use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

lazy_static! {
    // <segment>(.<segment>)* : <value>, whitespace around the colon optional
    static ref FIELD_QUERY: Regex = Regex::new(r"^\s*(\w+(?:\.\w+)*)\s*:\s*(\S.*?)\s*$")
        .expect("field query pattern is valid");
}

/// A single `field: value` clause typed into the search box
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryFragment {
    pub field: String,
    pub value: String,
}

impl QueryFragment {
    /// JSON object `{ field: value }` attached as one `filter` parameter
    pub fn to_filter_param(&self) -> String {
        let mut object = Map::new();
        object.insert(self.field.clone(), Value::String(self.value.clone()));
        Value::Object(object).to_string()
    }
}

/// Recognize `<field-path>: <value>` in free text.
///
/// Only the first colon splits; anything after it belongs to the value. Text
/// without that shape yields nothing, it is never used as a full-text search.
pub fn parse_query(input: &str) -> Option<QueryFragment> {
    let captures = FIELD_QUERY.captures(input)?;
    Some(QueryFragment {
        field: captures[1].to_string(),
        value: captures[2].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(input: &str) -> Option<(String, String)> {
        parse_query(input).map(|f| (f.field, f.value))
    }

    #[test]
    fn recognizes_dotted_field_paths() {
        assert_eq!(
            parsed("services.protocol: ssh"),
            Some(("services.protocol".into(), "ssh".into()))
        );
        assert_eq!(parsed("asn.number:3320"), Some(("asn.number".into(), "3320".into())));
        assert_eq!(
            parsed("  location.city   :   New York  "),
            Some(("location.city".into(), "New York".into()))
        );
    }

    #[test]
    fn first_colon_splits_and_rest_is_value() {
        assert_eq!(
            parsed("services.https.status: 200 OK: cached"),
            Some(("services.https.status".into(), "200 OK: cached".into()))
        );
        assert_eq!(parsed("ip: ::1"), Some(("ip".into(), "::1".into())));
    }

    #[test]
    fn text_without_field_shape_yields_nothing() {
        assert_eq!(parsed("just text"), None);
        assert_eq!(parsed(""), None);
        assert_eq!(parsed(": ssh"), None);
        assert_eq!(parsed("services..protocol: ssh"), None);
        assert_eq!(parsed(".protocol: ssh"), None);
        assert_eq!(parsed("services protocol: ssh"), None);
        assert_eq!(parsed("services.protocol:   "), None);
    }

    #[test]
    fn whitespace_only_value_yields_nothing() {
        assert_eq!(parsed("x:  "), None);
        assert_eq!(parsed("asn.country:\t "), None);
        assert_eq!(parsed("x: y"), Some(("x".into(), "y".into())));
    }

    #[test]
    fn fragment_encodes_as_single_entry_object() {
        let fragment = parse_query("services.protocol: ssh").unwrap();
        assert_eq!(fragment.to_filter_param(), r#"{"services.protocol":"ssh"}"#);
    }
}
