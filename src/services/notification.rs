use crate::{
    error::Result,
    models::{
        contact::ContactMessage,
        notification::{Notification, UnreadCount},
    },
    services::{
        api::{ApiClient, AuthScope},
        contact::ContactService,
    },
    utils::validation::validate_path_segment,
};
use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

/// 通知同步所依赖的后端操作
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationApi: Send + Sync {
    async fn list_notifications(&self) -> Result<Vec<Notification>>;
    async fn unread_count(&self) -> Result<u64>;
    async fn mark_read(&self, id: &str) -> Result<()>;
    async fn mark_all_read(&self) -> Result<()>;
    async fn delete_notification(&self, id: &str) -> Result<()>;
    async fn contact_detail(&self, contact_id: &str) -> Result<ContactMessage>;
}

#[derive(Clone)]
pub struct NotificationService {
    api: ApiClient,
    contact_service: ContactService,
}

impl NotificationService {
    pub fn new(api: ApiClient, contact_service: ContactService) -> Self {
        Self {
            api,
            contact_service,
        }
    }
}

#[async_trait]
impl NotificationApi for NotificationService {
    async fn list_notifications(&self) -> Result<Vec<Notification>> {
        self.api.get("/notifications", AuthScope::User).await
    }

    async fn unread_count(&self) -> Result<u64> {
        let count: UnreadCount = self
            .api
            .get("/notifications/unread-count", AuthScope::User)
            .await?;
        Ok(count.count)
    }

    async fn mark_read(&self, id: &str) -> Result<()> {
        validate_path_segment("notification id", id)?;
        debug!("Marking notification {} as read", id);
        self.api
            .execute(Method::PUT, &format!("/notifications/{}/read", id), AuthScope::User)
            .await
    }

    async fn mark_all_read(&self) -> Result<()> {
        debug!("Marking all notifications as read");
        self.api
            .execute(Method::PUT, "/notifications/read-all", AuthScope::User)
            .await
    }

    async fn delete_notification(&self, id: &str) -> Result<()> {
        validate_path_segment("notification id", id)?;
        self.api
            .execute(Method::DELETE, &format!("/notifications/{}", id), AuthScope::User)
            .await
    }

    async fn contact_detail(&self, contact_id: &str) -> Result<ContactMessage> {
        self.contact_service.get_by_id(contact_id).await
    }
}
