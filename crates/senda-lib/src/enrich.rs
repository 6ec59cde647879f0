//! Detail enrichment pipeline
//!
//! On selection, two independent lookups run concurrently against the
//! page-fetch service: the trail's external detail page and a best-effort
//! representative image from a web image search. Each lookup swallows its own
//! network or parse failure and settles to `None`; the pipeline commits only
//! after both have settled. The caller compares the outcome's
//! [`SelectionId`](crate::SelectionId) against the current selection before
//! any UI mutation, so a slow stale fetch can never overwrite a newer
//! selection's panel.

use crate::selection::SelectionId;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

/// CSS selectors of the two content regions extracted from detail pages
const DETAIL_BLOCK_SELECTORS: [&str; 2] = [".blocInfo1.blocInfo", ".blocInfo2.blocInfo"];

/// Fixed suffix disambiguating the image search toward Spanish hiking routes
const IMAGE_SEARCH_SUFFIX: &str = "sendero ruta senderismo España";

/// Minimum plausible image URL length; a weak heuristic against tiny
/// placeholder thumbnails
const MIN_IMAGE_URL_LEN: usize = 50;

/// Substrings flagging a result image as a logo/icon/avatar
const IMAGE_URL_BLOCKLIST: [&str; 3] = ["logo", "icon", "avatar"];

static IMG_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<img\b[^>]*>").unwrap());
static HEADING_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<(h[1-4])\b[^>]*>").unwrap());

/// Page-fetch service failure
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("page-fetch service error: {0}")]
    Service(String),
}

/// Page-fetch service seam: retrieve a remote page's raw markup.
///
/// Implementations must tolerate arbitrary URLs; callers must tolerate
/// non-HTML, empty or malformed bodies without raising.
pub trait PageFetcher: Send + Sync {
    fn fetch_page(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<String, FetchError>> + Send;
}

/// Work order handed from the selection state machine to the pipeline
#[derive(Clone, Debug)]
pub struct EnrichmentRequest {
    pub selection_id: SelectionId,
    pub info_url: String,
    /// Route code used to build the image search query
    pub route_name: String,
}

/// What the two lookups produced; either part may be absent
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnrichmentResult {
    /// Sanitized detail fragment: named content regions with images stripped
    /// and headings normalized
    pub detail_html: Option<String>,
    pub image_url: Option<String>,
}

/// A settled pipeline run, tagged with the selection it belongs to
#[derive(Clone, Debug)]
pub struct EnrichmentOutcome {
    pub selection_id: SelectionId,
    pub result: EnrichmentResult,
}

/// Run both lookups concurrently and join them.
///
/// The lookups are issued back-to-back without waiting on each other; their
/// settlement order does not matter, only joint completion does. Failures are
/// logged and degrade that lookup to `None` without aborting the sibling.
pub async fn enrich<F: PageFetcher>(fetcher: &F, request: EnrichmentRequest) -> EnrichmentOutcome {
    let (detail_html, image_url) = tokio::join!(
        load_route_details(fetcher, &request.info_url),
        search_route_image(fetcher, &request.route_name),
    );

    tracing::debug!(
        selection = %request.selection_id,
        has_detail = detail_html.is_some(),
        has_image = image_url.is_some(),
        "enrichment settled"
    );

    EnrichmentOutcome {
        selection_id: request.selection_id,
        result: EnrichmentResult {
            detail_html,
            image_url,
        },
    }
}

/// Fetch the detail page and extract its known content regions
async fn load_route_details<F: PageFetcher>(fetcher: &F, info_url: &str) -> Option<String> {
    match fetcher.fetch_page(info_url).await {
        Ok(markup) => extract_detail_blocks(&markup),
        Err(err) => {
            tracing::warn!(url = info_url, error = %err, "detail page lookup failed");
            None
        }
    }
}

/// Fetch an image search results page and scan it for the first plausible
/// photo. Known-fragile best effort; never an error.
async fn search_route_image<F: PageFetcher>(fetcher: &F, route_name: &str) -> Option<String> {
    let search_url = match image_search_url(route_name) {
        Ok(url) => url,
        Err(err) => {
            tracing::warn!(route_name, error = %err, "cannot build image search URL");
            return None;
        }
    };

    match fetcher.fetch_page(&search_url).await {
        Ok(markup) => extract_image_url(&markup),
        Err(err) => {
            tracing::warn!(route_name, error = %err, "image lookup failed");
            None
        }
    }
}

/// Image search results URL for a route name (`.`/`-` become spaces)
fn image_search_url(route_name: &str) -> Result<String, FetchError> {
    let clean = route_name.replace(['.', '-'], " ");
    let query = format!("{} {}", clean.trim(), IMAGE_SEARCH_SUFFIX);
    let url = reqwest::Url::parse_with_params(
        "https://www.google.com/search",
        &[("q", query.as_str()), ("tbm", "isch"), ("tbs", "isz:m")],
    )
    .map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
    Ok(url.to_string())
}

/// Extract and sanitize the two named content regions of a detail page.
///
/// Returns `None` when neither region is present (including non-HTML or empty
/// bodies, which simply parse to documents without those regions).
fn extract_detail_blocks(markup: &str) -> Option<String> {
    let document = Html::parse_document(markup);
    let mut combined = String::new();

    for css in DETAIL_BLOCK_SELECTORS {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        if let Some(block) = document.select(&selector).next() {
            combined.push_str(&block.html());
        }
    }

    if combined.is_empty() {
        return None;
    }
    Some(sanitize_detail_fragment(&combined))
}

/// Strip embedded images and normalize heading sizing to a uniform small size
fn sanitize_detail_fragment(fragment: &str) -> String {
    let without_images = IMG_TAG_RE.replace_all(fragment, "");
    HEADING_OPEN_RE
        .replace_all(
            &without_images,
            "<$1 style=\"font-size:14px;font-weight:bold\">",
        )
        .into_owned()
}

/// Scan result markup for the first qualifying image reference
fn extract_image_url(markup: &str) -> Option<String> {
    let document = Html::parse_document(markup);
    let selector = Selector::parse("img[src]").ok()?;
    document
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .find(|src| is_acceptable_image_src(src))
        .map(|src| src.to_string())
}

/// Filter for image candidates: protocol-qualified, not flagged as a
/// logo/icon/avatar, and long enough to not be a placeholder thumbnail
fn is_acceptable_image_src(src: &str) -> bool {
    src.contains("http")
        && !IMAGE_URL_BLOCKLIST.iter().any(|flag| src.contains(flag))
        && src.len() > MIN_IMAGE_URL_LEN
}
