use crate::{
    config::Config,
    error::Result,
    models::{contact::ContactMessage, notification::{Notification, NotificationType}, push::PushEvent},
    services::{
        notification::NotificationApi,
        push::{PushConnection, PushTransport},
        session::{Session, SessionStore, TokenScope},
    },
    utils::route::{is_excluded_route, notification_target},
};
use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use tokio::{sync::watch, task::JoinHandle, time::sleep};
use tracing::{debug, error, info, warn};

/// 推送通道连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// 点击通知后的动作
#[derive(Debug, Clone, PartialEq)]
pub enum ClickAction {
    /// 打开联系回复弹窗，不跳转
    OpenContact(ContactMessage),
    Navigate(String),
    Nothing,
}

#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// 标记已读后延迟移除的时间
    pub removal_delay: Duration,
    pub reconnect_delay: Duration,
    pub reconnect_max_delay: Duration,
    pub reconnect_attempts: u32,
    pub excluded_routes: Vec<String>,
}

impl SyncOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            removal_delay: config.notification_removal_delay(),
            reconnect_delay: config.reconnect_delay(),
            reconnect_max_delay: config.reconnect_max_delay(),
            reconnect_attempts: config.reconnect_attempts,
            excluded_routes: config.excluded_routes(),
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[derive(Debug)]
struct SyncState {
    notifications: Vec<Notification>,
    unread_count: u64,
    connection: ConnectionState,
    loaded: bool,
}

impl Default for SyncState {
    fn default() -> Self {
        Self {
            notifications: Vec::new(),
            unread_count: 0,
            connection: ConnectionState::Disconnected,
            loaded: false,
        }
    }
}

/// 通知同步控制器
///
/// 维护本地通知列表和未读数，数据来自两处：按需的REST拉取和推送通道。
/// 首次连接成功时拉取一次列表和未读数，之后的重连不再重复拉取。
/// 标记已读后条目会在 `removal_delay` 之后从本地列表移除。
pub struct NotificationSyncController {
    api: Arc<dyn NotificationApi>,
    options: SyncOptions,
    state: Arc<Mutex<SyncState>>,
    timers: Mutex<Vec<JoinHandle<()>>>,
    shutdown_tx: watch::Sender<bool>,
}

impl NotificationSyncController {
    pub fn new(api: Arc<dyn NotificationApi>, options: SyncOptions) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            api,
            options,
            state: Arc::new(Mutex::new(SyncState::default())),
            timers: Mutex::new(Vec::new()),
            shutdown_tx,
        }
    }

    /// 没有会话、处于排除路由、或令牌属于后台管理员时不启用
    pub fn should_activate(&self, store: &SessionStore, route: &str) -> bool {
        let Some(session) = store.session() else {
            return false;
        };
        if is_excluded_route(route, &self.options.excluded_routes) {
            return false;
        }
        store.token_scope(&session.token) == TokenScope::User
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.lock().notifications.clone()
    }

    pub fn unread_count(&self) -> u64 {
        self.state.lock().unread_count
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state.lock().connection
    }

    pub fn is_loaded(&self) -> bool {
        self.state.lock().loaded
    }

    /// 拉取通知列表替换本地列表；失败时清空
    pub async fn load_notifications(&self) {
        match self.api.list_notifications().await {
            Ok(notifications) => {
                debug!("Loaded {} notifications", notifications.len());
                self.state.lock().notifications = notifications;
            }
            Err(e) => {
                error!("Failed to load notifications: {}", e);
                self.state.lock().notifications.clear();
            }
        }
    }

    /// 拉取未读数替换本地计数；失败时归零
    pub async fn load_unread_count(&self) {
        let count = match self.api.unread_count().await {
            Ok(count) => count,
            Err(e) => {
                error!("Failed to load unread notification count: {}", e);
                0
            }
        };
        self.state.lock().unread_count = count;
    }

    pub async fn mark_as_read(&self, id: &str) {
        let flipped = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            match state.notifications.iter_mut().find(|n| n.id == id) {
                Some(notification) if !notification.read => {
                    notification.read = true;
                    state.unread_count = state.unread_count.saturating_sub(1);
                    true
                }
                _ => false,
            }
        };

        if !flipped {
            debug!("Notification {} already read or not present", id);
            return;
        }

        if let Err(e) = self.api.mark_read(id).await {
            error!("Failed to mark notification {} as read: {}", id, e);
        }

        self.schedule_removal(Some(id.to_string()));
        self.load_unread_count().await;
    }

    pub async fn mark_all_as_read(&self) {
        {
            let mut state = self.state.lock();
            for notification in state.notifications.iter_mut() {
                notification.read = true;
            }
            state.unread_count = 0;
        }

        if let Err(e) = self.api.mark_all_read().await {
            error!("Failed to mark all notifications as read: {}", e);
        }

        self.schedule_removal(None);
        self.load_unread_count().await;
    }

    /// 先请求删除，成功后再移除本地条目
    pub async fn delete(&self, id: &str) {
        if let Err(e) = self.api.delete_notification(id).await {
            error!("Failed to delete notification {}: {}", id, e);
            return;
        }

        self.state.lock().notifications.retain(|n| n.id != id);
        self.load_unread_count().await;
    }

    pub async fn handle_click(&self, notification: &Notification) -> ClickAction {
        if !notification.read {
            self.mark_as_read(&notification.id).await;
        }

        if notification.notification_type == NotificationType::ContactReply {
            let contact_id = notification.contact_id.as_deref().filter(|id| !id.is_empty());
            if let Some(contact_id) = contact_id {
                match self.api.contact_detail(contact_id).await {
                    Ok(contact) => return ClickAction::OpenContact(contact),
                    Err(e) => error!("Failed to load contact message {}: {}", contact_id, e),
                }
            }
        }

        match notification_target(notification) {
            Some(route) => ClickAction::Navigate(route),
            None => ClickAction::Nothing,
        }
    }

    /// 处理推送来的通知：已存在的ID忽略，否则插入列表头部
    pub fn receive_push(&self, notification: Notification) -> bool {
        let mut state = self.state.lock();
        if state.notifications.iter().any(|n| n.id == notification.id) {
            debug!("Ignoring duplicate notification {}", notification.id);
            return false;
        }

        info!("New notification: {}", notification.message);
        if !notification.read {
            state.unread_count += 1;
        }
        state.notifications.insert(0, notification);
        true
    }

    /// 维持推送连接直到 `shutdown` 或重试次数用尽
    ///
    /// 连续失败（连接失败或断开）超过 `reconnect_attempts` 次后放弃；
    /// 每次连接成功都会重置计数。
    pub async fn run(&self, transport: &dyn PushTransport, session: &Session) {
        let mut shutdown = self.shutdown_tx.subscribe();
        let mut failures: u32 = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.set_connection(ConnectionState::Connecting);
            let connected = tokio::select! {
                result = self.connect_and_join(transport, session) => result,
                _ = shutdown.changed() => break,
            };

            match connected {
                Ok(mut connection) => {
                    failures = 0;
                    self.set_connection(ConnectionState::Connected);
                    info!("Push channel joined for user {}", session.user.id);

                    self.initial_load().await;

                    let stopped = self.pump(connection.as_mut(), &mut shutdown).await;
                    connection.close().await;
                    self.set_connection(ConnectionState::Disconnected);

                    if stopped {
                        break;
                    }
                    warn!("Push channel disconnected");
                }
                Err(e) => {
                    self.set_connection(ConnectionState::Disconnected);
                    warn!("Push channel connection failed: {}", e);
                }
            }

            failures += 1;
            if failures > self.options.reconnect_attempts {
                error!("Giving up on push channel after {} failed attempts", failures);
                break;
            }

            let delay = self.backoff(failures);
            debug!("Reconnecting push channel in {:?}", delay);
            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
        }

        self.set_connection(ConnectionState::Disconnected);
    }

    /// 卸载：停止运行循环并取消待执行的延迟移除
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
        for timer in self.timers.lock().drain(..) {
            timer.abort();
        }
    }

    /// 切换会话时清空本地状态，下次连接会重新拉取
    ///
    /// 同时撤销之前的 `shutdown`，使控制器可以再次 `run`。
    pub fn reset(&self) {
        // 仅在之前已 shutdown 时通知，避免打断正在运行的循环
        self.shutdown_tx.send_if_modified(|stopped| std::mem::replace(stopped, false));
        for timer in self.timers.lock().drain(..) {
            timer.abort();
        }
        let mut state = self.state.lock();
        state.notifications.clear();
        state.unread_count = 0;
        state.loaded = false;
    }

    async fn connect_and_join(
        &self,
        transport: &dyn PushTransport,
        session: &Session,
    ) -> Result<Box<dyn PushConnection>> {
        let mut connection = transport.connect(&session.token).await?;
        connection.join(&session.user.id).await?;
        Ok(connection)
    }

    async fn initial_load(&self) {
        let first = {
            let mut state = self.state.lock();
            !std::mem::replace(&mut state.loaded, true)
        };

        if first {
            self.load_notifications().await;
            self.load_unread_count().await;
        }
    }

    /// 返回 true 表示因 shutdown 而停止，false 表示连接断开
    async fn pump(
        &self,
        connection: &mut dyn PushConnection,
        shutdown: &mut watch::Receiver<bool>,
    ) -> bool {
        loop {
            tokio::select! {
                event = connection.next_event() => match event {
                    Some(Ok(PushEvent::Notification(notification))) => {
                        self.receive_push(notification);
                    }
                    Some(Ok(PushEvent::Other(name))) => debug!("Ignoring push event '{}'", name),
                    Some(Err(e)) => warn!("Malformed push event: {}", e),
                    None => return false,
                },
                _ = shutdown.changed() => return true,
            }
        }
    }

    fn schedule_removal(&self, id: Option<String>) {
        let state = Arc::clone(&self.state);
        let delay = self.options.removal_delay;

        let handle = tokio::spawn(async move {
            sleep(delay).await;
            let mut state = state.lock();
            match id {
                Some(id) => state.notifications.retain(|n| n.id != id),
                // 延迟期间新推送的未读通知保留
                None => state.notifications.retain(|n| !n.read),
            }
        });

        let mut timers = self.timers.lock();
        timers.retain(|timer| !timer.is_finished());
        timers.push(handle);
    }

    fn set_connection(&self, connection: ConnectionState) {
        self.state.lock().connection = connection;
    }

    fn backoff(&self, failures: u32) -> Duration {
        let factor = 2u32.saturating_pow(failures.saturating_sub(1));
        self.options
            .reconnect_delay
            .saturating_mul(factor)
            .min(self.options.reconnect_max_delay)
    }
}

impl Drop for NotificationSyncController {
    fn drop(&mut self) {
        for timer in self.timers.get_mut().drain(..) {
            timer.abort();
        }
    }
}
