//! Listing-page extraction
//!
//! Parses the fully rendered listing page into raw match records, one per
//! game card, preserving document order (the source lists matches in kickoff
//! order). This is a single-source scraper: the selectors encode one page
//! layout and make no attempt to survive a redesign.

use tracing::debug;

use crate::dom::{DomDocument, DomNode};
use crate::models::{Channel, Competition, MatchRecord, RawMatch, SCHEDULED_STATUS, TeamSide};
use crate::utils::url::absolutize;

const CARD: &str = "div.gamecard";
const COMPETITION_NAME: &str =
    "div.all-scores-widget-competition-header-container-hora div.col-sm-8";
const COMPETITION_EMBLEM: &str = "div.all-scores-widget-competition-header-container-hora img";
const TEAM_ROW: &str = "div.d-flex.justify-content-between";
const LIVE_CLOCK: &str = "div.cardtime.badge.live";
const SCHEDULE_BOX: &str = "div.box_time";
const CHANNEL_ENTRY: &str = "div.bcmact";
// Checked in priority order; the first hit wins.
const DETAIL_LINK_CANDIDATES: [&str; 3] = [
    r#"a[href*="/jogo/"]"#,
    r#"a[href*="/partida/"]"#,
    "a[href]",
];

/// Extract every game card from rendered listing HTML.
///
/// Cards missing either team name are dropped; everything else is
/// best-effort per field.
pub fn extract_listing(html: &str, base_url: &str) -> Vec<RawMatch> {
    let doc = DomDocument::parse(html);
    let mut matches = Vec::new();

    for card in doc.select_all(CARD) {
        if let Some(record) = extract_card(&card, base_url) {
            matches.push(record);
        }
    }

    debug!("Extracted {} cards from listing", matches.len());
    matches
}

fn extract_card(card: &DomNode<'_>, base_url: &str) -> Option<RawMatch> {
    let competition_name = card
        .select_first(COMPETITION_NAME)
        .map(|n| n.text())
        .unwrap_or_default();
    let competition_emblem = card
        .select_first(COMPETITION_EMBLEM)
        .and_then(|img| img.attr("src"))
        .and_then(|src| absolutize(base_url, src));

    let rows = card.select_all(TEAM_ROW);
    let home_row = rows.first()?;
    let away_row = rows.last()?;

    let home_name = first_span_own_text(home_row);
    let away_name = first_span_own_text(away_row);
    if home_name.is_empty() || away_name.is_empty() {
        return None;
    }

    let schedule = card
        .select_first(SCHEDULE_BOX)
        .map(|n| n.text())
        .unwrap_or_default();

    let clock = card
        .select_first(LIVE_CLOCK)
        .map(|n| n.text())
        .unwrap_or_default();
    let (status, home_score, away_score) = if is_live_clock(&clock) {
        (clock, last_span_text(home_row), last_span_text(away_row))
    } else {
        (SCHEDULED_STATUS.to_string(), String::new(), String::new())
    };

    let mut channels = Vec::new();
    for entry in card.select_all(CHANNEL_ENTRY) {
        let Some(img) = entry.select_first("img") else {
            continue;
        };
        let name = img.attr("alt").map(str::trim).unwrap_or_default();
        let icon = img.attr("src").and_then(|src| absolutize(base_url, src));
        if name.is_empty() || icon.is_none() {
            continue;
        }
        channels.push(Channel {
            channel_name: name.to_string(),
            icon_url: icon,
        });
    }

    let detail_url = DETAIL_LINK_CANDIDATES.iter().find_map(|selector| {
        card.select_first(selector)
            .and_then(|a| a.attr("href"))
            .and_then(|href| absolutize(base_url, href))
    });

    Some(RawMatch {
        record: MatchRecord {
            competition: Competition {
                name: competition_name,
                emblem_url: competition_emblem,
            },
            schedule,
            status,
            home: TeamSide {
                team_name: home_name,
                emblem_url: None,
                score: home_score,
            },
            away: TeamSide {
                team_name: away_name,
                emblem_url: None,
                score: away_score,
            },
            channels,
        },
        detail_url,
    })
}

/// A clock label marks a live match when it carries a minute marker
/// apostrophe or reads as halftime. A literal apostrophe anywhere in the
/// label also trips this check; inherited source behavior.
fn is_live_clock(label: &str) -> bool {
    !label.is_empty() && (label.contains('\'') || label.to_lowercase().contains("halftime"))
}

fn first_span_own_text(row: &DomNode<'_>) -> String {
    row.select_first("span")
        .map(|span| span.own_text())
        .unwrap_or_default()
}

fn last_span_text(row: &DomNode<'_>) -> String {
    row.select_all("span")
        .last()
        .map(|span| span.text())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://listing.example";

    fn card(
        competition: &str,
        home: &str,
        away: &str,
        clock: &str,
        home_tail: &str,
        away_tail: &str,
        extra: &str,
    ) -> String {
        format!(
            r#"<div class="gamecard">
                 <div class="all-scores-widget-competition-header-container-hora">
                   <img src="/img/comp.png">
                   <div class="col-sm-8"> {competition} </div>
                 </div>
                 <div class="box_time">21:30</div>
                 <div class="cardtime badge live">{clock}</div>
                 <div class="d-flex justify-content-between">
                   <span>{home}<img src="/b.png"></span><span>{home_tail}</span>
                 </div>
                 <div class="d-flex justify-content-between">
                   <span>{away}<img src="/b.png"></span><span>{away_tail}</span>
                 </div>
                 {extra}
               </div>"#
        )
    }

    #[test]
    fn live_card_takes_clock_and_scores() {
        let html = card("Serie A", "Santos", "Gremio", "45'", "1", "0", "");
        let matches = extract_listing(&html, BASE);

        assert_eq!(matches.len(), 1);
        let record = &matches[0].record;
        assert_eq!(record.status, "45'");
        assert_eq!(record.home.score, "1");
        assert_eq!(record.away.score, "0");
        assert_eq!(record.schedule, "21:30");
        assert_eq!(record.home.team_name, "Santos");
        assert_eq!(record.away.team_name, "Gremio");
    }

    #[test]
    fn card_without_clock_is_scheduled_with_empty_scores() {
        let html = card("Serie A", "Santos", "Gremio", "", "", "", "");
        let matches = extract_listing(&html, BASE);

        let record = &matches[0].record;
        assert_eq!(record.status, SCHEDULED_STATUS);
        assert_eq!(record.home.score, "");
        assert_eq!(record.away.score, "");
    }

    #[test]
    fn halftime_label_is_live_regardless_of_case() {
        let html = card("Serie A", "Santos", "Gremio", "HALFTIME", "2", "2", "");
        let record = &extract_listing(&html, BASE)[0].record;
        assert_eq!(record.status, "HALFTIME");
        assert_eq!(record.home.score, "2");
    }

    #[test]
    fn clock_without_marker_is_not_live() {
        // A bare "LIVE" badge without a minute marker stays scheduled.
        let html = card("Serie A", "Santos", "Gremio", "LIVE", "2", "2", "");
        let record = &extract_listing(&html, BASE)[0].record;
        assert_eq!(record.status, SCHEDULED_STATUS);
        assert_eq!(record.home.score, "");
    }

    #[test]
    fn empty_team_name_drops_the_card() {
        let html = format!(
            "{}{}",
            card("Serie A", "", "Gremio", "", "", "", ""),
            card("Serie A", "Santos", "Vasco", "", "", "", "")
        );
        let matches = extract_listing(&html, BASE);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].record.home.team_name, "Santos");
    }

    #[test]
    fn nested_markup_does_not_leak_into_team_names() {
        let html = card("Serie A", "Santos <b>9</b>", "Gremio", "", "", "", "");
        let record = &extract_listing(&html, BASE)[0].record;
        assert_eq!(record.home.team_name, "Santos");
    }

    #[test]
    fn channels_keep_order_and_drop_incomplete_entries() {
        let extra = r#"
            <div class="bcmact"><img alt="Globo" src="/ch/globo.png"></div>
            <div class="bcmact"><img src="/ch/anon.png"></div>
            <div class="bcmact"><img alt="SporTV" src="/ch/sportv.png"></div>
        "#;
        let html = card("Serie A", "Santos", "Gremio", "", "", "", extra);
        let record = &extract_listing(&html, BASE)[0].record;

        let names: Vec<_> = record
            .channels
            .iter()
            .map(|c| c.channel_name.as_str())
            .collect();
        assert_eq!(names, ["Globo", "SporTV"]);
        assert_eq!(
            record.channels[0].icon_url.as_deref(),
            Some("https://listing.example/ch/globo.png")
        );
    }

    #[test]
    fn detail_link_prefers_match_paths_over_any_anchor() {
        let extra = r#"
            <a href="/outra-coisa">elsewhere</a>
            <a href="/jogo/123/santos-gremio">detail</a>
        "#;
        let html = card("Serie A", "Santos", "Gremio", "", "", "", extra);
        let raw = &extract_listing(&html, BASE)[0];
        assert_eq!(
            raw.detail_url.as_deref(),
            Some("https://listing.example/jogo/123/santos-gremio")
        );
    }

    #[test]
    fn any_anchor_is_the_last_resort_detail_link() {
        let extra = r#"<a href="/outra-coisa">elsewhere</a>"#;
        let html = card("Serie A", "Santos", "Gremio", "", "", "", extra);
        let raw = &extract_listing(&html, BASE)[0];
        assert_eq!(
            raw.detail_url.as_deref(),
            Some("https://listing.example/outra-coisa")
        );
    }

    #[test]
    fn card_without_anchor_has_no_detail_url() {
        let html = card("Serie A", "Santos", "Gremio", "", "", "", "");
        let raw = &extract_listing(&html, BASE)[0];
        assert!(raw.detail_url.is_none());
    }

    #[test]
    fn cards_come_out_in_document_order() {
        let html = format!(
            "{}{}{}",
            card("A", "T1", "T2", "", "", "", ""),
            card("B", "T3", "T4", "", "", "", ""),
            card("C", "T5", "T6", "", "", "", "")
        );
        let names: Vec<_> = extract_listing(&html, BASE)
            .iter()
            .map(|m| m.record.competition.name.clone())
            .collect();
        assert_eq!(names, ["A", "B", "C"]);
    }
}
