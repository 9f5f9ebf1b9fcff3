//! Domain models for match listings
//!
//! The JSON shape of [`MatchRecord`] is the public API contract; field names
//! are serialized in camelCase and must stay stable across refreshes.

use serde::{Deserialize, Serialize};

/// Status label for a match that has not kicked off yet.
///
/// Live matches carry the source's clock label verbatim (e.g. `45'`,
/// `90+2'`, `Halftime`) instead, so status is an open string, not an enum.
pub const SCHEDULED_STATUS: &str = "Scheduled";

/// A single published match entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    pub competition: Competition,
    /// Kickoff time or live status text as rendered by the source
    pub schedule: String,
    /// `Scheduled` or the live clock label verbatim
    pub status: String,
    pub home: TeamSide,
    pub away: TeamSide,
    /// Broadcast channels in source order
    pub channels: Vec<Channel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    pub name: String,
    pub emblem_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSide {
    pub team_name: String,
    pub emblem_url: Option<String>,
    /// Empty string until the match starts
    pub score: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub channel_name: String,
    pub icon_url: Option<String>,
}

/// Extraction-stage record: a [`MatchRecord`] plus the detail-page link used
/// for emblem enrichment. The link never reaches the published output because
/// the public type simply has no field for it.
#[derive(Debug, Clone)]
pub struct RawMatch {
    pub record: MatchRecord,
    pub detail_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_record_serializes_camel_case() {
        let record = MatchRecord {
            competition: Competition {
                name: "Serie A".to_string(),
                emblem_url: None,
            },
            schedule: "21:30".to_string(),
            status: SCHEDULED_STATUS.to_string(),
            home: TeamSide {
                team_name: "Flamengo".to_string(),
                emblem_url: None,
                score: String::new(),
            },
            away: TeamSide {
                team_name: "Palmeiras".to_string(),
                emblem_url: Some("/public/teams/pal.png".to_string()),
                score: String::new(),
            },
            channels: vec![Channel {
                channel_name: "Premiere".to_string(),
                icon_url: None,
            }],
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["home"]["teamName"], "Flamengo");
        assert_eq!(json["away"]["emblemUrl"], "/public/teams/pal.png");
        assert_eq!(json["competition"]["emblemUrl"], serde_json::Value::Null);
        assert_eq!(json["channels"][0]["channelName"], "Premiere");
        assert_eq!(json["home"]["score"], "");
    }
}
