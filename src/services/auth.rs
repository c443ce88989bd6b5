use crate::{
    error::Result,
    models::{
        response::MessageResponse,
        user::{
            AuthResponse, ChangePasswordRequest, LoginRequest, ManagerAuthResponse,
            ManagerLoginRequest, RegisterRequest, UpdateProfileRequest, User,
        },
    },
    services::{
        api::{ApiClient, AuthScope},
        session::SessionStore,
    },
    utils::validation::{validate_email_format, validate_username},
};
use tracing::{debug, info, warn};
use validator::Validate;

#[derive(Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn session(&self) -> &SessionStore {
        self.api.session()
    }

    /// 注册成功后直接保存会话
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse> {
        request.validate()?;
        validate_username(&request.username)?;
        validate_email_format(&request.email)?;

        debug!("Registering user: {}", request.username);

        let auth: AuthResponse = self
            .api
            .post("/auth/register", &request, AuthScope::Anonymous)
            .await?;

        self.session().save_session(&auth)?;
        info!("Registered and logged in as {}", auth.user.username);
        Ok(auth)
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        request.validate()?;

        debug!("Logging in: {}", request.email);

        let auth: AuthResponse = self
            .api
            .post("/auth/login", &request, AuthScope::Anonymous)
            .await?;

        self.session().save_session(&auth)?;
        info!("Logged in as {}", auth.user.username);
        Ok(auth)
    }

    /// 登出只清除本地会话，不通知服务端
    pub fn logout(&self) -> Result<()> {
        self.session().clear_session()?;
        info!("Logged out");
        Ok(())
    }

    pub async fn change_password(&self, request: ChangePasswordRequest) -> Result<String> {
        request.validate()?;

        let response: MessageResponse = self
            .api
            .put("/auth/change-password", &request, AuthScope::User)
            .await?;

        Ok(response.message)
    }

    /// 获取最新资料并刷新本地保存的用户对象
    pub async fn get_profile(&self) -> Result<User> {
        let user: User = self.api.get("/auth/profile", AuthScope::User).await?;

        if let Err(e) = self.session().update_user(&user) {
            warn!("Failed to refresh stored user: {}", e);
        }

        Ok(user)
    }

    pub async fn update_profile(&self, request: UpdateProfileRequest) -> Result<User> {
        request.validate()?;

        let user: User = self
            .api
            .put("/auth/profile", &request, AuthScope::User)
            .await?;

        self.session().update_user(&user)?;
        Ok(user)
    }

    pub fn current_user(&self) -> Option<User> {
        self.session().user()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session().session().is_some()
    }

    /// 后台管理员登录，令牌保存在独立的命名空间
    pub async fn manager_login(&self, request: ManagerLoginRequest) -> Result<()> {
        request.validate()?;

        let auth: ManagerAuthResponse = self
            .api
            .post("/manager/login", &request, AuthScope::Anonymous)
            .await?;

        self.session().set_manager_token(&auth.token)?;
        info!("Manager {} logged in", request.username);
        Ok(())
    }

    pub fn manager_logout(&self) -> Result<()> {
        self.session().clear_manager_token()
    }

    pub fn is_manager_logged_in(&self) -> bool {
        self.session().manager_token().is_some()
    }
}
