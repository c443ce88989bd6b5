use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(default)]
    pub story_id: Option<String>,
    #[serde(default)]
    pub story_slug: Option<String>,
    #[serde(default)]
    pub chapter_number: Option<u32>,
    #[serde(default)]
    pub comment_id: Option<String>,
    #[serde(default)]
    pub contact_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewChapter,
    Mention,
    Reply,
    ContactReply,
    #[serde(other)]
    Other,
}

impl NotificationType {
    /// 评论类通知（可定位到具体评论）
    pub fn is_comment_related(&self) -> bool {
        matches!(self, NotificationType::Mention | NotificationType::Reply)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnreadCount {
    pub count: u64,
}
