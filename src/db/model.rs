//! Write payloads and query filters used by the link repository.
//!
//! Keep these structs focused on what the SQL needs. Business logic lives in
//! `crate::inbox`.

/// Page-derived fields written when a link is saved. Re-saving an existing URL
/// overwrites these and leaves read state and ranks alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkMetadata {
    pub url: String,
    pub domain: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub read_time_minutes: Option<i64>,
}

/// Filters for `list_links`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub is_read: Option<bool>,
    /// Restrict to the Long Reads list, ordered by its rank instead of recency.
    pub long_reads_only: bool,
    /// Case-insensitive substring match on title or url.
    pub query: Option<String>,
}
