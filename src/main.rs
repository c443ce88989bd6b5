use fiction_reader::{
    config::Config,
    models::user::LoginRequest,
    services::Session,
    state::ClientState,
};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "websocket")]
use fiction_reader::services::push::WebSocketTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.log_level))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting fiction-reader notification watcher ({})...",
        config.environment
    );

    let state = ClientState::new(config.clone())?;

    let session = match restore_session(&state).await {
        Some(session) => session,
        None => {
            warn!("No session available; set LOGIN_EMAIL and LOGIN_PASSWORD or log in first");
            return Ok(());
        }
    };

    let controller = state.notification_controller();
    if !controller.should_activate(&state.session, &config.current_route) {
        info!("Notifications are disabled for route {}", config.current_route);
        return Ok(());
    }

    #[cfg(feature = "websocket")]
    {
        let transport = WebSocketTransport::new(config.socket_url.clone());

        tokio::select! {
            _ = controller.run(&transport, &session) => {
                warn!("Push channel stopped");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                controller.shutdown();
            }
        }
    }

    #[cfg(not(feature = "websocket"))]
    {
        warn!("Built without the websocket feature; fetching notifications once");
        controller.load_notifications().await;
        controller.load_unread_count().await;
    }

    info!(
        "{} notifications, {} unread",
        controller.notifications().len(),
        controller.unread_count()
    );

    Ok(())
}

/// 使用已保存的会话，或在配置了账号时登录
async fn restore_session(state: &ClientState) -> Option<Session> {
    if let Some(session) = state.session.session() {
        match state.auth_service.get_profile().await {
            Ok(user) => {
                info!("Restored session for {}", user.name());
                return Some(Session { user, ..session });
            }
            Err(e) if e.is_unauthorized() => {
                warn!("Stored session is no longer valid: {}", e);
                if let Err(e) = state.auth_service.logout() {
                    error!("Failed to clear stale session: {}", e);
                }
            }
            Err(e) => {
                warn!("Could not refresh profile, using stored user: {}", e);
                return Some(session);
            }
        }
    }

    let (email, password) = match (&state.config.login_email, &state.config.login_password) {
        (Some(email), Some(password)) => (email.clone(), password.clone()),
        _ => return None,
    };

    match state.auth_service.login(LoginRequest { email, password }).await {
        Ok(auth) => Some(Session {
            token: auth.token,
            user: auth.user,
        }),
        Err(e) => {
            error!("Login failed: {}", e.user_message());
            None
        }
    }
}
