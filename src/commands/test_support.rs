// 命令层测试用的假身份与假存储

use super::AppState;
use crate::error::{AppError, Result};
use crate::models::{NewSolveRecord, SolveRecord, UserIdentity};
use crate::services::database::DatabaseService;
use crate::services::store::{IdentityProvider, SolveStore};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// 内存中的身份提供方，密码固定为 "secret"
#[derive(Default)]
pub struct FakeIdentity {
    pub current: Mutex<Option<UserIdentity>>,
}

impl FakeIdentity {
    pub fn signed_in(email: &str) -> Self {
        Self {
            current: Mutex::new(Some(user(email))),
        }
    }
}

pub fn user(email: &str) -> UserIdentity {
    UserIdentity {
        id: format!("id-{}", email),
        email: email.to_string(),
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn current_user(&self) -> Result<Option<UserIdentity>> {
        Ok(self.current.lock().unwrap().clone())
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<()> {
        if email.contains('@') {
            Ok(())
        } else {
            Err(AppError::Api {
                status: 400,
                message: "Unable to validate email address: invalid format".to_string(),
            })
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity> {
        if password != "secret" {
            return Err(AppError::Api {
                status: 400,
                message: "Invalid login credentials".to_string(),
            });
        }
        let signed_in = user(email);
        *self.current.lock().unwrap() = Some(signed_in.clone());
        Ok(signed_in)
    }

    async fn sign_out(&self) -> Result<()> {
        *self.current.lock().unwrap() = None;
        Ok(())
    }
}

/// 所有操作都失败的存储，模拟网络故障
pub struct FailingStore;

#[async_trait]
impl SolveStore for FailingStore {
    async fn fetch_recent_solves(&self, _: &UserIdentity, _: usize) -> Result<Vec<SolveRecord>> {
        Err(unavailable())
    }

    async fn insert_solve(&self, _: &UserIdentity, _: NewSolveRecord) -> Result<SolveRecord> {
        Err(unavailable())
    }

    async fn delete_solve(&self, _: &UserIdentity, _: &str) -> Result<()> {
        Err(unavailable())
    }
}

fn unavailable() -> AppError {
    AppError::Api {
        status: 503,
        message: "Service unavailable".to_string(),
    }
}

pub fn local_state(identity: FakeIdentity) -> (AppState, DatabaseService) {
    let db = DatabaseService::open_in_memory().unwrap();
    let state = AppState::new(Arc::new(db.clone()), Arc::new(identity), 25);
    (state, db)
}
