use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::notification::Notification;

/// 推送通道上的帧：`{ "event": ..., "data": ... }`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushFrame {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

pub const EVENT_JOIN: &str = "join";
pub const EVENT_NOTIFICATION: &str = "notification";

#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    Notification(Notification),
    /// 未处理的事件，原样保留事件名
    Other(String),
}

impl PushFrame {
    pub fn join(user_id: &str) -> Self {
        Self {
            event: EVENT_JOIN.to_string(),
            data: Value::String(user_id.to_string()),
        }
    }

    pub fn into_event(self) -> serde_json::Result<PushEvent> {
        match self.event.as_str() {
            EVENT_NOTIFICATION => Ok(PushEvent::Notification(serde_json::from_value(self.data)?)),
            _ => Ok(PushEvent::Other(self.event)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::NotificationType;

    #[test]
    fn test_notification_frame_decoding() {
        let frame: PushFrame = serde_json::from_str(
            r#"{"event":"notification","data":{"_id":"n1","message":"New chapter","type":"new_chapter","created_at":"2024-05-01T10:00:00Z","story_slug":"dragon-road"}}"#,
        )
        .unwrap();

        match frame.into_event().unwrap() {
            PushEvent::Notification(n) => {
                assert_eq!(n.id, "n1");
                assert!(!n.read);
                assert_eq!(n.notification_type, NotificationType::NewChapter);
                assert_eq!(n.story_slug.as_deref(), Some("dragon-road"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_event_and_type() {
        let frame: PushFrame = serde_json::from_str(r#"{"event":"typing"}"#).unwrap();
        assert_eq!(frame.into_event().unwrap(), PushEvent::Other("typing".to_string()));

        let n: Notification = serde_json::from_value(serde_json::json!({
            "id": "n2",
            "message": "hi",
            "type": "system_announcement",
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(n.notification_type, NotificationType::Other);
    }

    #[test]
    fn test_join_frame() {
        let json = serde_json::to_value(PushFrame::join("u42")).unwrap();
        assert_eq!(json, serde_json::json!({"event": "join", "data": "u42"}));
    }
}
