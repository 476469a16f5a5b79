//! Page metadata extraction: title and description from a fetched HTML page.
//!
//! Title preference is `og:title`, then `<title>`, then the hostname. Description
//! preference is `og:description`, then `<meta name="description">`, then empty.
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Fetch;

static TITLE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));
static INNER_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static HTTP_SCHEME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^https?://").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub hostname: String,
    /// Raw page body, present only when the fetch succeeded.
    pub html: Option<String>,
}

impl PageMetadata {
    /// Metadata used when the page cannot be fetched.
    pub fn fallback(hostname: &str) -> Self {
        Self {
            title: hostname.to_string(),
            description: String::new(),
            hostname: hostname.to_string(),
            html: None,
        }
    }
}

#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Never fails: unreachable pages yield [`PageMetadata::fallback`].
    async fn fetch_metadata(&self, url: &str) -> PageMetadata;
}

/// Trim and add `https://` when the input carries no http(s) scheme.
pub fn normalize_url(input: &str) -> String {
    let u = input.trim();
    if u.is_empty() || HTTP_SCHEME.is_match(u) {
        return u.to_string();
    }
    format!("https://{}", u)
}

pub fn hostname_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

/// `content` of the first `<meta {attr}="{value}">` tag, in either attribute order.
fn meta_content(html: &str, attr: &str, value: &str) -> Option<String> {
    let value = regex::escape(value);
    let forward = format!(
        r#"(?i)<meta[^>]+{attr}=["']{value}["'][^>]+content=["']([^"']*)["']"#
    );
    let reverse = format!(
        r#"(?i)<meta[^>]+content=["']([^"']*)["'][^>]+{attr}=["']{value}["']"#
    );
    [forward, reverse].iter().find_map(|pattern| {
        Regex::new(pattern)
            .ok()?
            .captures(html)
            .map(|c| c[1].trim().to_string())
    })
}

fn title_tag(html: &str) -> Option<String> {
    let caps = TITLE_TAG.captures(html)?;
    Some(INNER_TAG.replace_all(&caps[1], "").trim().to_string())
}

/// Extract title and description from `html` served by `hostname`.
pub fn extract_metadata(html: &str, hostname: &str) -> PageMetadata {
    let title = meta_content(html, "property", "og:title")
        .filter(|t| !t.is_empty())
        .or_else(|| title_tag(html).filter(|t| !t.is_empty()))
        .unwrap_or_else(|| hostname.to_string());
    let description = meta_content(html, "property", "og:description")
        .filter(|d| !d.is_empty())
        .or_else(|| meta_content(html, "name", "description"))
        .unwrap_or_default();

    PageMetadata {
        title,
        description,
        hostname: hostname.to_string(),
        html: Some(html.to_string()),
    }
}

/// Trim and drop a trailing ` | Site` / ` - Site` style suffix, where Site is
/// the hostname's first label (without `www.`) or the full hostname.
pub fn clean_title(title: &str, hostname: &str) -> String {
    let mut t = title.trim().to_string();
    if t.is_empty() {
        return t;
    }
    let host = hostname.strip_prefix("www.").unwrap_or(hostname);
    let site_name = host.split('.').next().unwrap_or_default();
    if site_name.is_empty() {
        return t;
    }

    for name in [site_name, hostname] {
        let pattern = format!(r"(?i)\s*[|\-–—]\s*{}\s*$", regex::escape(name));
        if let Ok(re) = Regex::new(&pattern) {
            t = re.replace(&t, "").trim().to_string();
        }
    }
    t
}

#[derive(Debug, Clone)]
pub struct PageFetcher {
    http: Client,
}

impl PageFetcher {
    pub fn from_config(fetch: &Fetch) -> Result<Self> {
        let http = Client::builder()
            .user_agent(fetch.user_agent.clone())
            .timeout(Duration::from_millis(fetch.timeout_ms))
            .build()
            .context("failed to build reqwest client")?;
        Ok(Self { http })
    }

    async fn fetch_html(&self, url: &str) -> Result<String> {
        let res = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed to fetch {}", url))?;
        if !res.status().is_success() {
            return Err(anyhow!("HTTP {} for {}", res.status(), url));
        }
        res.text().await.context("failed to read page body")
    }
}

#[async_trait]
impl MetadataSource for PageFetcher {
    async fn fetch_metadata(&self, url: &str) -> PageMetadata {
        let hostname = hostname_of(url);
        match self.fetch_html(url).await {
            Ok(html) => {
                debug!(url, bytes = html.len(), "fetched page");
                extract_metadata(&html, &hostname)
            }
            Err(err) => {
                warn!(?err, url, "metadata fetch failed; using hostname");
                PageMetadata::fallback(&hostname)
            }
        }
    }
}
