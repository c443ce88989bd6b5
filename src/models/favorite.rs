use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use super::story::StorySummary;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub story: StorySummary,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FavoriteCheck {
    pub is_favorite: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FavoriteCount {
    pub count: u64,
}
