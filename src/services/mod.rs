pub mod api;
pub mod auth;
pub mod contact;
pub mod favorite;
pub mod manager_settings;
pub mod notification;
pub mod notification_sync;
pub mod push;
pub mod reading_history;
pub mod session;
pub mod story;

// 重新导出常用类型
pub use api::{ApiClient, AuthScope};
pub use auth::AuthService;
pub use contact::ContactService;
pub use favorite::FavoriteService;
pub use manager_settings::ManagerSettings;
pub use notification::{NotificationApi, NotificationService};
pub use notification_sync::{ClickAction, ConnectionState, NotificationSyncController, SyncOptions};
pub use push::{PushConnection, PushTransport};
pub use reading_history::{ReadingHistoryService, ReadingHistoryView};
pub use session::{Session, SessionStore, TokenScope};
pub use story::StoryService;
