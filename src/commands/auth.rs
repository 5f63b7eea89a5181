// 登录页命令
// 注册、登录、退出与当前用户查询

use super::AppState;
use crate::models::UserIdentity;
use serde::{Deserialize, Serialize};

pub const SIGNUP_SUCCESS_MESSAGE: &str = "Signup successful. Switch to Log in.";

/// 登录页模式，默认是注册
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuthMode {
    #[default]
    SignUp,
    LogIn,
}

impl AuthMode {
    pub fn toggle(self) -> Self {
        match self {
            AuthMode::SignUp => AuthMode::LogIn,
            AuthMode::LogIn => AuthMode::SignUp,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AuthMode::SignUp => "Create account",
            AuthMode::LogIn => "Log in",
        }
    }
}

/// 用户传输对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDto {
    pub id: String,
    pub email: String,
}

impl From<UserIdentity> for UserDto {
    fn from(user: UserIdentity) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// 表单提交结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuthOutcome {
    /// 注册成功，提示切换到登录
    SignedUp(String),
    /// 登录成功，跳转仪表盘
    SignedIn(UserDto),
}

/// 注册
pub async fn sign_up(email: String, password: String, state: &AppState) -> Result<String, String> {
    state
        .identity
        .sign_up(&email, &password)
        .await
        .map_err(|e| e.to_string())?;

    Ok(SIGNUP_SUCCESS_MESSAGE.to_string())
}

/// 登录
pub async fn sign_in(email: String, password: String, state: &AppState) -> Result<UserDto, String> {
    let user = state
        .identity
        .sign_in(&email, &password)
        .await
        .map_err(|e| e.to_string())?;

    Ok(user.into())
}

/// 退出登录
pub async fn sign_out(state: &AppState) -> Result<(), String> {
    state.identity.sign_out().await.map_err(|e| e.to_string())
}

/// 当前登录用户
pub async fn current_user(state: &AppState) -> Result<Option<UserDto>, String> {
    let user = state
        .identity
        .current_user()
        .await
        .map_err(|e| e.to_string())?;

    Ok(user.map(UserDto::from))
}

/// 按当前模式提交登录页表单
pub async fn submit_credentials(
    mode: AuthMode,
    email: String,
    password: String,
    state: &AppState,
) -> Result<AuthOutcome, String> {
    match mode {
        AuthMode::SignUp => sign_up(email, password, state)
            .await
            .map(AuthOutcome::SignedUp),
        AuthMode::LogIn => sign_in(email, password, state)
            .await
            .map(AuthOutcome::SignedIn),
    }
}

/// 需要登录的页面先取当前用户，未登录时返回 "Not logged in"
pub(crate) async fn require_user(state: &AppState) -> Result<UserIdentity, String> {
    match state.identity.current_user().await {
        Ok(Some(user)) => Ok(user),
        Ok(None) => Err(crate::error::AppError::NotAuthenticated.to_string()),
        Err(e) => Err(e.to_string()),
    }
}
