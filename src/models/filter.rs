use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One constraint on a dotted field path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Clause {
    /// Field must equal one of the values, encoded as `{"$in": [...]}`
    In(InSet),

    /// Literal match (or any other operator object the API understands)
    Eq(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InSet {
    #[serde(rename = "$in")]
    pub values: Vec<Value>,
}

impl Clause {
    pub fn in_set(values: Vec<Value>) -> Self {
        Clause::In(InSet { values })
    }
}

/// Structured filter sent to the search and facets endpoints.
///
/// Keys are dotted field paths (`"asn.country"`, `"services.protocol"`); all
/// clauses must hold. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter {
    clauses: BTreeMap<String, Clause>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn get(&self, field: &str) -> Option<&Clause> {
        self.clauses.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.clauses.keys().map(String::as_str)
    }

    /// Set a clause, replacing any previous one on the same field
    pub fn insert(&mut self, field: impl Into<String>, clause: Clause) {
        self.clauses.insert(field.into(), clause);
    }

    pub fn insert_in<V: Into<Value>>(&mut self, field: impl Into<String>, values: Vec<V>) {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(field, Clause::in_set(values));
    }

    pub fn insert_eq(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.insert(field, Clause::Eq(value.into()));
    }

    /// Shallow merge: every field of `other` overwrites the same field here
    pub fn merge(&mut self, other: Filter) {
        self.clauses.extend(other.clauses);
    }

    /// Compact JSON used for the `filter` request parameter
    pub fn to_param(&self) -> String {
        serde_json::to_string(&self.clauses).unwrap_or_else(|_| "{}".to_string())
    }
}
