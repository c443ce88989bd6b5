use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// 服务端只保留每个用户最近5条阅读记录
pub const RECENT_HISTORY_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingHistoryEntry {
    pub story_id: String,
    #[serde(default)]
    pub story_title: Option<String>,
    #[serde(default)]
    pub story_slug: Option<String>,
    #[serde(default)]
    pub story_cover: Option<String>,
    pub chapter_number: u32,
    #[serde(default)]
    pub scroll_position: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveProgressRequest {
    pub story_id: String,
    pub chapter_number: u32,
    pub scroll_position: f64,
}
