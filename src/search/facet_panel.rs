use serde::Serialize;

use crate::models::facets::FacetCounts;
use crate::models::navigation::{FacetCategory, FacetSelections, NavigableQuery};

/// One checkbox in the facet sidebar
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub value: String,
    pub count: u64,
    pub selected: bool,
}

/// Sidebar content sent to the front end
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetPanelView {
    pub countries: Vec<FacetOption>,
    pub asns: Vec<FacetOption>,
    pub services: Vec<FacetOption>,
    pub pending_changes: bool,
}

/// Facet selections with deferred commit.
///
/// Toggles only touch the staged copy; nothing reaches the search until
/// [`FacetPanel::apply`] copies staged into committed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetPanel {
    committed: FacetSelections,
    staged: FacetSelections,
}

impl FacetPanel {
    pub fn new(committed: FacetSelections) -> Self {
        Self {
            staged: committed.clone(),
            committed,
        }
    }

    pub fn committed(&self) -> &FacetSelections {
        &self.committed
    }

    pub fn staged(&self) -> &FacetSelections {
        &self.staged
    }

    /// Flip membership of `value` in the staged selection of `category`
    pub fn toggle(&mut self, category: FacetCategory, value: &str) {
        let values = self.staged.get_mut(category);
        match values.iter().position(|v| v == value) {
            Some(index) => {
                values.remove(index);
            }
            None => values.push(value.to_string()),
        }
    }

    /// True as soon as any category's staged list differs from the committed one
    pub fn has_pending_changes(&self) -> bool {
        FacetCategory::ALL
            .iter()
            .any(|c| self.staged.get(*c) != self.committed.get(*c))
    }

    /// Drop staged edits
    pub fn discard(&mut self) {
        self.staged = self.committed.clone();
    }

    /// Adopt selections that arrived from navigation, discarding staged edits
    pub fn reset_committed(&mut self, committed: FacetSelections) {
        self.staged = committed.clone();
        self.committed = committed;
    }

    /// Commit staged selections into the navigable state.
    ///
    /// Returns true when the committed selections actually changed, which is the
    /// caller's cue to run a new search.
    pub fn apply(&mut self, nav: &mut NavigableQuery) -> bool {
        let changed = self.has_pending_changes() || nav.selections != self.staged;
        self.committed = self.staged.clone();
        nav.selections = self.committed.clone();
        changed
    }

    pub fn view(&self, facets: &FacetCounts) -> FacetPanelView {
        FacetPanelView {
            countries: self.options(FacetCategory::Countries, facets.country_options(), |v| {
                facets.country_count(v)
            }),
            asns: self.options(FacetCategory::Asns, facets.asn_options(), |v| facets.asn_count(v)),
            services: self.options(FacetCategory::Services, facets.service_options(), |v| {
                facets.service_count(v)
            }),
            pending_changes: self.has_pending_changes(),
        }
    }

    fn options(
        &self,
        category: FacetCategory,
        values: Vec<String>,
        count: impl Fn(&str) -> u64,
    ) -> Vec<FacetOption> {
        let staged = self.staged.get(category);
        let mut options: Vec<FacetOption> = values
            .into_iter()
            .map(|value| FacetOption {
                count: count(&value),
                selected: staged.contains(&value),
                value,
            })
            .collect();

        // Keep selected values visible even when the active filter zeroed them out
        for value in staged {
            if !options.iter().any(|o| &o.value == value) {
                options.push(FacetOption {
                    value: value.clone(),
                    count: 0,
                    selected: true,
                });
            }
        }

        options
    }
}
