use crate::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());

// 拼接进URL路径的标识符：slug、ObjectId 等
static PATH_SEGMENT_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());

/// 验证邮箱并返回详细错误信息
pub fn validate_email_format(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(AppError::Validation("Email is required".to_string()));
    }

    if email.len() > 254 {
        return Err(AppError::Validation("Email address is too long".to_string()));
    }

    if !validator::validate_email(email) {
        return Err(AppError::Validation("Email address is not valid".to_string()));
    }

    Ok(())
}

pub fn validate_username(username: &str) -> Result<()> {
    if username.trim().is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }

    if username.len() < 3 || username.len() > 30 {
        return Err(AppError::Validation(
            "Username must be between 3 and 30 characters".to_string(),
        ));
    }

    if !USERNAME_REGEX.is_match(username) {
        return Err(AppError::Validation(
            "Username may only contain letters, digits, '_' and '-'".to_string(),
        ));
    }

    Ok(())
}

/// 验证将要拼接到请求路径中的标识符
pub fn validate_path_segment(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() || value.len() > 128 || !PATH_SEGMENT_REGEX.is_match(value) {
        return Err(AppError::Validation(format!("Invalid {}: '{}'", kind, value)));
    }
    Ok(())
}
