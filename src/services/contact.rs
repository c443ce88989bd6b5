use crate::{
    error::Result,
    models::contact::{ContactMessage, ContactRequest},
    services::api::{ApiClient, AuthScope},
    utils::validation::{validate_email_format, validate_path_segment},
};
use tracing::info;
use validator::Validate;

#[derive(Clone)]
pub struct ContactService {
    api: ApiClient,
}

impl ContactService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// 提交联系表单；已登录时附带用户令牌，便于回复以通知形式送达
    pub async fn submit(&self, request: ContactRequest) -> Result<ContactMessage> {
        request.validate()?;
        validate_email_format(&request.email)?;

        let scope = if self.api.session().token().is_some() {
            AuthScope::User
        } else {
            AuthScope::Anonymous
        };

        let message: ContactMessage = self.api.post("/contact", &request, scope).await?;
        info!("Submitted contact message {}", message.id);
        Ok(message)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<ContactMessage> {
        validate_path_segment("contact id", id)?;
        self.api.get(&format!("/contact/{}", id), AuthScope::User).await
    }
}
