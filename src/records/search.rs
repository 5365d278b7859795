//! Term search over record names and status names.
//!
//! A field matches a term when the lower-cased field equals the term, or when
//! the field has at least [`MATCH_WINDOW`] characters and its lower-cased
//! leading window contains the term. Only the window is searched, so
//! `"mmer"` does not match `"Hammer"` while `"hamm"` does.

use crate::error::{Result, TrackerError};
use crate::store::Store;
use crate::types::{Equipment, EquipmentId};
use tracing::debug;

/// Number of leading characters examined for substring containment.
pub const MATCH_WINDOW: usize = 5;

/// Ids of all records matching `term`, in insertion order.
///
/// The term is lower-cased but not trimmed; a whitespace-only term is
/// rejected with `EmptySearchTerm`.
pub fn search(store: &Store, term: &str) -> Result<Vec<EquipmentId>> {
    if term.trim().is_empty() {
        return Err(TrackerError::EmptySearchTerm);
    }

    let term = term.to_lowercase();
    let ids: Vec<_> = store
        .records()
        .iter()
        .filter(|r| matches_term(r, &term))
        .map(|r| r.id)
        .collect();

    debug!(term = %term, hits = ids.len(), "search");
    Ok(ids)
}

/// Whether a record matches an already lower-cased term.
pub fn matches_term(record: &Equipment, term: &str) -> bool {
    field_matches(&record.name, term) || field_matches(record.status.as_str(), term)
}

fn field_matches(field: &str, term: &str) -> bool {
    if field.to_lowercase() == term {
        return true;
    }

    if field.chars().count() < MATCH_WINDOW {
        return false;
    }
    let window: String = field.chars().take(MATCH_WINDOW).collect();
    window.to_lowercase().contains(term)
}
