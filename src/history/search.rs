//! Search functionality for request history.
//!
//! This module provides search and filtering over history entries, allowing
//! users to quickly find past requests by URL, method or status.

use super::models::HistoryEntry;
use crate::models::FailureKind;

/// Searches history entries using case-insensitive substring matching.
///
/// Matches against the URL and the HTTP method. An empty query matches
/// everything.
///
/// # Arguments
///
/// * `query` - The search term to match against
/// * `entries` - The history entries to search through
///
/// # Returns
///
/// A vector of history entries that match the query, in their original order.
pub fn search_history(query: &str, entries: &[HistoryEntry]) -> Vec<HistoryEntry> {
    let query = query.trim();
    if query.is_empty() {
        return entries.to_vec();
    }

    let query_lower = query.to_lowercase();

    entries
        .iter()
        .filter(|entry| matches_query(entry, &query_lower))
        .cloned()
        .collect()
}

fn matches_query(entry: &HistoryEntry, query_lower: &str) -> bool {
    entry.url.to_lowercase().contains(query_lower)
        || entry.method.as_str().to_lowercase().contains(query_lower)
}

/// Filters history entries by HTTP method (case-insensitive).
pub fn filter_by_method(method: &str, entries: &[HistoryEntry]) -> Vec<HistoryEntry> {
    let method_upper = method.trim().to_uppercase();
    entries
        .iter()
        .filter(|entry| entry.method.as_str() == method_upper)
        .cloned()
        .collect()
}

/// Filters history entries by status code.
///
/// Transport failures have no status and never match.
pub fn filter_by_status(status_code: u16, entries: &[HistoryEntry]) -> Vec<HistoryEntry> {
    entries
        .iter()
        .filter(|entry| entry.status == Some(status_code))
        .cloned()
        .collect()
}

/// Keeps only dispatches that produced no HTTP response.
pub fn filter_failures(entries: &[HistoryEntry]) -> Vec<HistoryEntry> {
    entries
        .iter()
        .filter(|entry| entry.is_failure())
        .cloned()
        .collect()
}

/// Keeps only failures of the given kind.
pub fn filter_by_failure_kind(kind: FailureKind, entries: &[HistoryEntry]) -> Vec<HistoryEntry> {
    entries
        .iter()
        .filter(|entry| entry.failure == Some(kind))
        .cloned()
        .collect()
}

/// Keeps only responses with a 4xx or 5xx status.
pub fn filter_errors(entries: &[HistoryEntry]) -> Vec<HistoryEntry> {
    entries
        .iter()
        .filter(|entry| matches!(entry.status, Some(400..=599)))
        .cloned()
        .collect()
}

/// Keeps only responses with a 2xx status.
pub fn filter_successful(entries: &[HistoryEntry]) -> Vec<HistoryEntry> {
    entries
        .iter()
        .filter(|entry| entry.is_success())
        .cloned()
        .collect()
}

/// Sorts history entries by timestamp, newest first.
pub fn sort_by_timestamp_desc(entries: &[HistoryEntry]) -> Vec<HistoryEntry> {
    let mut sorted = entries.to_vec();
    sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    sorted
}
