// 命令模块
// 对应三个页面（登录、记录解题、仪表盘）的状态与操作，错误统一转成可直接展示的字符串

pub mod auth;
pub mod dashboard;
pub mod record;

#[cfg(test)]
pub(crate) mod test_support;

use crate::config::{Backend, Config};
use crate::error::Result;
use crate::services::database::{DatabaseService, LocalIdentity};
use crate::services::session::SessionStore;
use crate::services::store::{IdentityProvider, SolveStore};
use crate::services::supabase::SupabaseClient;
use crate::utils::session_path;
use std::sync::Arc;

pub use auth::{
    current_user, sign_in, sign_out, sign_up, submit_credentials, AuthMode, AuthOutcome, UserDto,
    SIGNUP_SUCCESS_MESSAGE,
};
pub use dashboard::{load_dashboard, DashboardDto, DashboardView, SolveRecordDto, StatCardDto};
pub use record::{log_solve, SolveForm, SAVED_MESSAGE};

/// 应用状态
pub struct AppState {
    pub solves: Arc<dyn SolveStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub recent_limit: usize,
}

impl AppState {
    pub fn new(
        solves: Arc<dyn SolveStore>,
        identity: Arc<dyn IdentityProvider>,
        recent_limit: usize,
    ) -> Self {
        Self {
            solves,
            identity,
            recent_limit,
        }
    }

    /// 按配置选择存储后端
    pub fn from_config(config: &Config) -> Result<Self> {
        let limit = config.dashboard.recent_limit;

        match config.backend {
            Backend::Supabase => {
                let (url, anon_key) = config.supabase_credentials()?;
                let client = Arc::new(SupabaseClient::new(
                    url,
                    anon_key,
                    SessionStore::new(session_path()),
                ));
                log::debug!("Using Supabase backend at {}", url);
                Ok(Self::new(client.clone(), client, limit))
            }
            Backend::Local => {
                let db = DatabaseService::open(&config.database_path())?;
                let identity = LocalIdentity::new(&config.local.email);
                Ok(Self::new(Arc::new(db), Arc::new(identity), limit))
            }
        }
    }
}
