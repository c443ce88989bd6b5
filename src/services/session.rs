use crate::{
    error::{AppError, Result},
    models::user::{AuthResponse, User},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::{debug, warn};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";
pub const MANAGER_TOKEN_KEY: &str = "managerToken";

/// 已登录的身份：令牌 + 用户对象
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// 令牌所属的认证体系
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenScope {
    User,
    Manager,
}

#[derive(Debug, Default, Deserialize)]
struct ScopeClaims {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    is_manager: Option<bool>,
}

/// 持久化的键值存储，保存会话令牌、用户信息以及后台设置
///
/// 所有值以字符串形式保存，写入后立即落盘。
#[derive(Clone, Debug)]
pub struct SessionStore {
    path: Option<PathBuf>,
    items: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionStore {
    /// 打开（或创建）位于 `path` 的存储文件
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let items = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(items) => items,
                Err(e) => {
                    warn!("Session file {} is corrupt, starting empty: {}", path.display(), e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        debug!("Opened session store at {} ({} keys)", path.display(), items.len());

        Ok(Self {
            path: Some(path),
            items: Arc::new(RwLock::new(items)),
        })
    }

    /// 仅驻留内存的存储
    pub fn in_memory() -> Self {
        Self {
            path: None,
            items: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.items.read().get(key).cloned()
    }

    pub fn set_item(&self, key: &str, value: impl Into<String>) -> Result<()> {
        self.items.write().insert(key.to_string(), value.into());
        self.persist()
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        let removed = self.items.write().remove(key).is_some();
        if removed {
            self.persist()?;
        }
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        self.items.write().clear();
        self.persist()
    }

    /// 读取JSON值；无法解析时视为不存在
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_item(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Stored value for '{}' is not valid JSON: {}", key, e);
                None
            }
        }
    }

    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set_item(key, raw)
    }

    pub fn token(&self) -> Option<String> {
        self.get_item(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn manager_token(&self) -> Option<String> {
        self.get_item(MANAGER_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn user(&self) -> Option<User> {
        self.get_json(USER_KEY)
    }

    /// 令牌和用户都存在时才视为已登录
    pub fn session(&self) -> Option<Session> {
        Some(Session {
            token: self.token()?,
            user: self.user()?,
        })
    }

    pub fn save_session(&self, auth: &AuthResponse) -> Result<()> {
        {
            let mut items = self.items.write();
            items.insert(TOKEN_KEY.to_string(), auth.token.clone());
            items.insert(USER_KEY.to_string(), serde_json::to_string(&auth.user)?);
        }
        self.persist()
    }

    pub fn update_user(&self, user: &User) -> Result<()> {
        self.set_json(USER_KEY, user)
    }

    pub fn clear_session(&self) -> Result<()> {
        {
            let mut items = self.items.write();
            items.remove(TOKEN_KEY);
            items.remove(USER_KEY);
        }
        self.persist()
    }

    pub fn set_manager_token(&self, token: &str) -> Result<()> {
        self.set_item(MANAGER_TOKEN_KEY, token)
    }

    pub fn clear_manager_token(&self) -> Result<()> {
        self.remove_item(MANAGER_TOKEN_KEY)
    }

    /// 判断当前用户令牌属于哪个认证体系
    pub fn token_scope(&self, token: &str) -> TokenScope {
        if self.manager_token().as_deref() == Some(token) {
            return TokenScope::Manager;
        }
        scope_from_claims(token)
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let raw = serde_json::to_string_pretty(&*self.items.read())?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = path.with_extension("tmp");
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, path).map_err(|e| {
            AppError::Storage(format!("Failed to persist session to {}: {}", path.display(), e))
        })
    }
}

/// 只读取令牌声明，不校验签名（签名由服务端校验）
fn scope_from_claims(token: &str) -> TokenScope {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims = HashSet::new();

    match decode::<ScopeClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => {
            let claims = data.claims;
            if claims.is_manager == Some(true) || claims.role.as_deref() == Some("manager") {
                TokenScope::Manager
            } else {
                TokenScope::User
            }
        }
        Err(e) => {
            // 非JWT格式的不透明令牌按普通用户处理
            debug!("Token claims not readable, assuming user scope: {}", e);
            TokenScope::User
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRole;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn sample_auth() -> AuthResponse {
        AuthResponse {
            token: "opaque-token".to_string(),
            user: User {
                id: "u1".to_string(),
                username: "reader".to_string(),
                display_name: Some("Avid Reader".to_string()),
                email: "reader@example.com".to_string(),
                role: UserRole::User,
                avatar: None,
                membership_points: 120,
            },
        }
    }

    fn token_with(claims: serde_json::Value) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(b"server-secret")).unwrap()
    }

    #[test]
    fn test_session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = SessionStore::open(&path).unwrap();
        store.save_session(&sample_auth()).unwrap();

        let reopened = SessionStore::open(&path).unwrap();
        let session = reopened.session().unwrap();
        assert_eq!(session.token, "opaque-token");
        assert_eq!(session.user.membership_points, 120);
    }

    #[test]
    fn test_clear_session_keeps_manager_token() {
        let store = SessionStore::in_memory();
        store.save_session(&sample_auth()).unwrap();
        store.set_manager_token("mgr").unwrap();

        store.clear_session().unwrap();

        assert!(store.session().is_none());
        assert_eq!(store.manager_token().as_deref(), Some("mgr"));
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let store = SessionStore::open(&path).unwrap();
        assert!(store.token().is_none());
    }

    #[test]
    fn test_session_requires_valid_user() {
        let store = SessionStore::in_memory();
        store.set_item(TOKEN_KEY, "t").unwrap();
        store.set_item(USER_KEY, "garbage").unwrap();
        assert!(store.session().is_none());
    }

    #[test]
    fn test_token_scope_detection() {
        let store = SessionStore::in_memory();

        let manager = token_with(serde_json::json!({"sub": "m1", "role": "manager"}));
        assert_eq!(store.token_scope(&manager), TokenScope::Manager);

        let flagged = token_with(serde_json::json!({"sub": "m2", "is_manager": true}));
        assert_eq!(store.token_scope(&flagged), TokenScope::Manager);

        let user = token_with(serde_json::json!({"sub": "u1", "role": "admin"}));
        assert_eq!(store.token_scope(&user), TokenScope::User);

        assert_eq!(store.token_scope("opaque"), TokenScope::User);

        store.set_manager_token("opaque").unwrap();
        assert_eq!(store.token_scope("opaque"), TokenScope::Manager);
    }
}
