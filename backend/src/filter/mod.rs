//! Search filtering over the in-memory directory.
//!
//! Pure and order-preserving. A record is visible when every non-empty
//! criterion matches; matching is a case-insensitive substring test.

use crate::models::{FilterCriteria, Record};

/// Case-insensitive substring test for one per-attribute criterion.
///
/// An empty criterion always matches. The criterion is trimmed.
pub fn field_matches(value: &str, criterion: &str) -> bool {
    if criterion.is_empty() {
        return true;
    }
    value.to_lowercase().contains(criterion.to_lowercase().trim())
}

/// General query: family name + given name, or city.
///
/// Unlike per-attribute criteria, the query is not trimmed.
pub fn query_matches(record: &Record, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    record.relay_name().to_lowercase().contains(&needle) || record.ville.to_lowercase().contains(&needle)
}

/// Whether a record satisfies all active criteria.
pub fn matches(record: &Record, criteria: &FilterCriteria) -> bool {
    query_matches(record, &criteria.query)
        && criteria
            .field_criteria()
            .iter()
            .all(|(field, criterion)| field_matches(record.get(*field), criterion))
}

/// Visible subset of `records`, in dataset order.
pub fn filter_records<'a>(records: &'a [Record], criteria: &FilterCriteria) -> Vec<&'a Record> {
    records.iter().filter(|r| matches(r, criteria)).collect()
}

/// Loaded records plus the current criteria.
///
/// Both are replaced as whole values; [`Directory::visible`] always reflects
/// the latest of each.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    records: Vec<Record>,
    criteria: FilterCriteria,
}

impl Directory {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            criteria: FilterCriteria::default(),
        }
    }

    /// Swap in a freshly fetched record set.
    pub fn replace_records(&mut self, records: Vec<Record>) {
        self.records = records;
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn visible(&self) -> Vec<&Record> {
        filter_records(&self.records, &self.criteria)
    }

    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }
}
