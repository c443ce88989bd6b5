use crate::{
    config::Config,
    error::Result,
    services::{
        api::ApiClient,
        auth::AuthService,
        contact::ContactService,
        favorite::FavoriteService,
        manager_settings::ManagerSettings,
        notification::NotificationService,
        notification_sync::{NotificationSyncController, SyncOptions},
        reading_history::{ReadingHistoryService, ReadingHistoryView},
        session::SessionStore,
        story::StoryService,
    },
};
use std::sync::Arc;

/// 客户端的共享状态
/// 包含所有服务和配置的引用
#[derive(Clone)]
pub struct ClientState {
    /// 应用配置
    pub config: Config,

    /// 持久化会话
    pub session: SessionStore,

    /// REST客户端
    pub api: ApiClient,

    /// 认证服务
    pub auth_service: AuthService,

    /// 收藏服务
    pub favorite_service: FavoriteService,

    /// 阅读记录服务
    pub reading_history_service: ReadingHistoryService,

    /// 通知服务
    pub notification_service: NotificationService,

    /// 联系我们
    pub contact_service: ContactService,

    /// 故事与章节
    pub story_service: StoryService,

    /// 后台设置
    pub manager_settings: ManagerSettings,
}

impl ClientState {
    /// 打开配置中的会话文件并构建所有服务
    pub fn new(config: Config) -> Result<Self> {
        let session = SessionStore::open(&config.session_file)?;
        Self::with_session(config, session)
    }

    pub fn with_session(config: Config, session: SessionStore) -> Result<Self> {
        let api = ApiClient::new(&config, session.clone())?;
        let contact_service = ContactService::new(api.clone());

        Ok(Self {
            auth_service: AuthService::new(api.clone()),
            favorite_service: FavoriteService::new(api.clone()),
            reading_history_service: ReadingHistoryService::new(api.clone()),
            notification_service: NotificationService::new(api.clone(), contact_service.clone()),
            story_service: StoryService::new(api.clone()),
            manager_settings: ManagerSettings::new(session.clone()),
            contact_service,
            config,
            session,
            api,
        })
    }

    /// 为当前会话创建通知同步控制器
    pub fn notification_controller(&self) -> NotificationSyncController {
        NotificationSyncController::new(
            Arc::new(self.notification_service.clone()),
            SyncOptions::from_config(&self.config),
        )
    }

    pub fn reading_history_view(&self) -> ReadingHistoryView {
        ReadingHistoryView::new(self.reading_history_service.clone())
    }
}
