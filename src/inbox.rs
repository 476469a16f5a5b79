//! Glue between page metadata, the link store and the reading document.
use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::cache::TtlCache;
use crate::config::Google;
use crate::db::{self, LinkMetadata, Pool};
use crate::docs::append::{build_append_operations, AppendBlock, BulletPreset};
use crate::docs::count::count_checked_titles;
use crate::docs::{DocsError, DocsService};
use crate::metadata::{clean_title, normalize_url, MetadataSource, PageMetadata};
use crate::model::LinkRecord;
use crate::read_time::estimate_read_time_minutes;
use crate::summary::{summarize, truncate_summary};

const MAX_STORED_DESCRIPTION: usize = 500;

static LEADING_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[a-z][a-z0-9+.\-]*://").expect("valid regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InboxError {
    #[error("url is required")]
    MissingUrl,
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Normalize user input into an `http(s)` URL.
pub fn validate_url(raw: &str) -> Result<String, InboxError> {
    let url = normalize_url(raw);
    if url.is_empty() {
        return Err(InboxError::MissingUrl);
    }
    // "ftp://x" would otherwise normalize to "https://ftp://x"
    let trimmed = raw.trim();
    if LEADING_SCHEME.is_match(trimmed) && url != trimmed {
        return Err(InboxError::InvalidUrl(trimmed.to_string()));
    }
    let has_host = Url::parse(&url)
        .ok()
        .is_some_and(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some());
    if !has_host {
        return Err(InboxError::InvalidUrl(url));
    }
    Ok(url)
}

/// Stored record fields derived from fetched page metadata.
pub fn link_metadata(url: &str, page: &PageMetadata) -> LinkMetadata {
    let title = clean_title(&page.title, &page.hostname);
    let description: String = page.description.chars().take(MAX_STORED_DESCRIPTION).collect();
    LinkMetadata {
        url: url.to_string(),
        domain: Some(page.hostname.clone()).filter(|h| !h.is_empty()),
        title: Some(title),
        summary: Some(summarize(&page.description)),
        description: Some(description).filter(|d| !d.is_empty()),
        read_time_minutes: Some(page.html.as_deref().map_or(1, estimate_read_time_minutes)),
    }
}

/// Fetch metadata for `raw_url` and insert or refresh its record.
#[instrument(skip_all)]
pub async fn save_link(
    pool: &Pool,
    source: &dyn MetadataSource,
    raw_url: &str,
) -> Result<LinkRecord> {
    let url = validate_url(raw_url)?;
    let page = source.fetch_metadata(&url).await;
    let link = db::upsert_link(pool, &link_metadata(&url, &page)).await?;
    info!(id = %link.id, url = %link.url, "saved link");
    Ok(link)
}

/// Build the entry appended to the document. Explicit title/summary win over
/// fetched metadata.
pub async fn append_block(
    source: &dyn MetadataSource,
    raw_url: &str,
    title: Option<&str>,
    summary: Option<&str>,
) -> Result<AppendBlock> {
    let url = validate_url(raw_url)?;
    let title = title.map(str::trim).filter(|t| !t.is_empty());
    let summary = summary.map(str::trim).filter(|s| !s.is_empty());

    let page = if title.is_some() && summary.is_some() {
        None
    } else {
        Some(source.fetch_metadata(&url).await)
    };
    let title = match (title, &page) {
        (Some(t), _) => t.to_string(),
        (None, Some(p)) => clean_title(&p.title, &p.hostname),
        (None, None) => url.clone(),
    };
    let summary = match (summary, &page) {
        (Some(s), _) => truncate_summary(s),
        (None, Some(p)) => summarize(&p.description),
        (None, None) => summarize(""),
    };
    Ok(AppendBlock {
        title,
        summary,
        url,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    pub insertion_index: usize,
    pub inserted_length: usize,
    pub preset: BulletPreset,
}

/// Append `block` at the end of the configured document. When the backend
/// rejects the configured bullet preset the batch is resubmitted once with the
/// alternate preset.
#[instrument(skip_all, fields(document_id = %google.document_id))]
pub async fn append_to_doc(
    docs: &dyn DocsService,
    google: &Google,
    block: &AppendBlock,
) -> Result<AppendOutcome> {
    let document = docs.get_document(&google.document_id).await?;
    let insertion_index = document.append_index();

    let mut preset = google.bullet_preset;
    let mut plan = build_append_operations(insertion_index, block, google.layout, preset);
    if let Err(err) = docs
        .batch_update(&google.document_id, plan.requests())
        .await
    {
        let retry = err
            .downcast_ref::<DocsError>()
            .is_some_and(DocsError::is_bullet_preset_rejection);
        if !retry {
            return Err(err);
        }
        warn!(rejected = preset.as_str(), "bullet preset rejected; retrying with alternate");
        preset = preset.alternate();
        plan = build_append_operations(insertion_index, block, google.layout, preset);
        docs.batch_update(&google.document_id, plan.requests())
            .await?;
    }

    info!(
        insertion_index,
        inserted_length = plan.inserted_length,
        preset = preset.as_str(),
        "appended entry"
    );
    Ok(AppendOutcome {
        insertion_index,
        inserted_length: plan.inserted_length,
        preset,
    })
}

/// Checked-entry counter with a short-lived cache keyed by document id.
#[derive(Debug)]
pub struct ReadCounter {
    cache: TtlCache<String, usize>,
}

impl ReadCounter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: TtlCache::new(ttl),
        }
    }

    pub fn from_config(google: &Google) -> Self {
        Self::new(Duration::from_millis(google.read_count_ttl_ms))
    }

    #[instrument(skip_all)]
    pub async fn read_count(&self, docs: &dyn DocsService, document_id: &str) -> Result<usize> {
        let key = document_id.to_string();
        if let Some(count) = self.cache.get(&key) {
            return Ok(count);
        }
        let document = docs.get_document(document_id).await?;
        let count = count_checked_titles(document.content());
        self.cache.set(key, count);
        info!(document_id, count, "counted checked entries");
        Ok(count)
    }

    /// Drop the cached count, e.g. after appending.
    pub fn invalidate(&self) {
        self.cache.invalidate();
    }
}
