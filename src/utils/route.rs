use crate::models::notification::{Notification, NotificationType};

/// 故事详情页路由
pub fn story_route(slug: &str) -> String {
    format!("/story/{}", urlencoding::encode(slug))
}

/// 定位到具体评论的路由
pub fn comment_route(slug: &str, comment_id: &str) -> String {
    format!("{}#comment-{}", story_route(slug), urlencoding::encode(comment_id))
}

/// 只有故事ID时使用的路由
pub fn story_id_route(story_id: &str) -> String {
    format!("/story/id/{}", urlencoding::encode(story_id))
}

/// 计算点击通知后跳转的目标
///
/// 优先级：新章节 → slug 路由；提及/回复且同时有评论和 slug → 评论锚点路由；
/// 其余情况依次尝试 slug 路由、ID 路由，都没有时不跳转。
pub fn notification_target(notification: &Notification) -> Option<String> {
    let slug = non_empty(&notification.story_slug);
    let comment_id = non_empty(&notification.comment_id);
    let story_id = non_empty(&notification.story_id);

    if notification.notification_type == NotificationType::NewChapter {
        if let Some(slug) = slug {
            return Some(story_route(slug));
        }
    }

    if notification.notification_type.is_comment_related() {
        if let (Some(slug), Some(comment_id)) = (slug, comment_id) {
            return Some(comment_route(slug, comment_id));
        }
    }

    slug.map(story_route).or_else(|| story_id.map(story_id_route))
}

/// 当前路由是否在排除列表中（按前缀匹配）
pub fn is_excluded_route(route: &str, excluded_prefixes: &[String]) -> bool {
    excluded_prefixes
        .iter()
        .any(|prefix| route.starts_with(prefix.as_str()))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn notification(kind: NotificationType) -> Notification {
        Notification {
            id: "n1".to_string(),
            message: "something happened".to_string(),
            read: false,
            created_at: Utc::now(),
            notification_type: kind,
            story_id: None,
            story_slug: None,
            chapter_number: None,
            comment_id: None,
            contact_id: None,
        }
    }

    #[test]
    fn test_new_chapter_goes_to_story() {
        let mut n = notification(NotificationType::NewChapter);
        n.story_slug = Some("dragon-road".to_string());
        n.comment_id = Some("c9".to_string());
        n.chapter_number = Some(12);
        assert_eq!(notification_target(&n).as_deref(), Some("/story/dragon-road"));
    }

    #[test]
    fn test_reply_with_comment_is_anchored() {
        let mut n = notification(NotificationType::Reply);
        n.story_slug = Some("dragon-road".to_string());
        n.comment_id = Some("c9".to_string());
        assert_eq!(
            notification_target(&n).as_deref(),
            Some("/story/dragon-road#comment-c9")
        );

        let mut n = notification(NotificationType::Mention);
        n.story_slug = Some("dragon-road".to_string());
        assert_eq!(notification_target(&n).as_deref(), Some("/story/dragon-road"));
    }

    #[test]
    fn test_falls_back_to_story_id_then_nothing() {
        let mut n = notification(NotificationType::Mention);
        n.comment_id = Some("c9".to_string());
        n.story_id = Some("s1".to_string());
        assert_eq!(notification_target(&n).as_deref(), Some("/story/id/s1"));

        let mut n = notification(NotificationType::NewChapter);
        n.story_slug = Some(String::new());
        assert_eq!(notification_target(&n), None);
    }

    #[test]
    fn test_excluded_route_prefixes() {
        let excluded = vec!["/manager".to_string(), "/login".to_string()];
        assert!(is_excluded_route("/manager/stories", &excluded));
        assert!(is_excluded_route("/login", &excluded));
        assert!(!is_excluded_route("/story/dragon-road", &excluded));
    }
}
