use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_STATS_ENDPOINT: &str = "https://pub.dev/api/packages/ai_adaptive_ui";
pub const FALLBACK_DOWNLOADS: u64 = 153;
pub const FALLBACK_LIKES: u64 = 1;
pub const DOWNLOADS_NODE_ID: &str = "downloads-count";
pub const LIKES_NODE_ID: &str = "likes-count";

/// The subset of the registry's package document the badge cares about.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<PackageScore>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageScore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granted_points: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub like_count: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StatsError {
    Network,
    Status(u16),
    Decode,
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "stats request failed"),
            Self::Status(status) => write!(f, "stats endpoint answered {status}"),
            Self::Decode => write!(f, "stats body could not be decoded"),
        }
    }
}

impl std::error::Error for StatsError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsLine {
    pub downloads: String,
    pub likes: String,
}

impl StatsLine {
    pub fn from_info(info: &PackageInfo) -> Self {
        let score = info.score.clone().unwrap_or_default();
        Self::from_counts(
            score.granted_points.unwrap_or(FALLBACK_DOWNLOADS),
            score.like_count.unwrap_or(FALLBACK_LIKES),
        )
    }

    pub fn fallback() -> Self {
        Self::from_counts(FALLBACK_DOWNLOADS, FALLBACK_LIKES)
    }

    pub fn from_result(result: Result<PackageInfo, StatsError>) -> Self {
        match result {
            Ok(info) => Self::from_info(&info),
            Err(_) => Self::fallback(),
        }
    }

    /// Display node id and text for each half of the line.
    pub fn targets(&self) -> [(&'static str, &str); 2] {
        [
            (DOWNLOADS_NODE_ID, self.downloads.as_str()),
            (LIKES_NODE_ID, self.likes.as_str()),
        ]
    }

    fn from_counts(downloads: u64, likes: u64) -> Self {
        let plural = if likes == 1 { "" } else { "s" };
        Self {
            downloads: format!("⬇️ {downloads} downloads"),
            likes: format!("👍 {likes} like{plural}"),
        }
    }
}

pub fn decode_package_info(body: &str) -> Result<PackageInfo, StatsError> {
    serde_json::from_str(body).map_err(|_| StatsError::Decode)
}
