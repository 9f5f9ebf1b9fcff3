//! Detail-page emblem enrichment
//!
//! Team emblems are only published on each match's detail page, so every
//! record with a detail link gets one extra page render. Enrichment is
//! best-effort: any failure yields `(None, None)` and the record ships
//! without emblems.

use std::time::Duration;

use tracing::warn;

use crate::dom::DomDocument;
use crate::render::{RenderBrowser, RenderSession};
use crate::utils::url::absolutize;

const PRIMARY_EMBLEMS: &str = "div.box_time img[alt], div.box_time img[title]";
const FALLBACK_EMBLEMS: &str =
    ".all-scores-widget-team-container img, .team img, .team-logo img, img.team-logo";

// Lazy-loaded emblems need a beat after navigation.
const DETAIL_SETTLE: Duration = Duration::from_millis(1500);

/// Render a detail page and pull the (home, away) emblem URLs out of it.
pub async fn fetch_emblems<B: RenderBrowser>(
    browser: &B,
    detail_url: &str,
    base_url: &str,
) -> (Option<String>, Option<String>) {
    let session = match browser.new_session().await {
        Ok(session) => session,
        Err(e) => {
            warn!("Could not open detail page session for {}: {}", detail_url, e);
            return (None, None);
        }
    };

    let html = match render_detail(&session, detail_url).await {
        Ok(html) => Some(html),
        Err(e) => {
            warn!("Detail page render failed for {}: {}", detail_url, e);
            None
        }
    };
    session.close().await;

    match html {
        Some(html) => extract_emblem_urls(&html, base_url),
        None => (None, None),
    }
}

async fn render_detail<S: RenderSession>(
    session: &S,
    detail_url: &str,
) -> crate::errors::AppResult<String> {
    session.navigate(detail_url).await?;
    tokio::time::sleep(DETAIL_SETTLE).await;
    session.content().await
}

/// Pure extraction half: first two emblem images, primary selector strategy
/// with one fallback when the primary finds fewer than two.
pub fn extract_emblem_urls(html: &str, base_url: &str) -> (Option<String>, Option<String>) {
    let doc = DomDocument::parse(html);

    let mut urls = collect_image_urls(&doc, PRIMARY_EMBLEMS, base_url);
    if urls.len() < 2 {
        urls = collect_image_urls(&doc, FALLBACK_EMBLEMS, base_url);
    }

    let mut urls = urls.into_iter();
    (urls.next(), urls.next())
}

fn collect_image_urls(doc: &DomDocument, selector: &str, base_url: &str) -> Vec<String> {
    doc.select_all(selector)
        .iter()
        .filter_map(|img| img.attr("data-src").or_else(|| img.attr("src")))
        .filter_map(|src| absolutize(base_url, src))
        .collect()
}
