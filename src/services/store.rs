// 外部协作方接口
// 解题记录存储与身份认证都由外部提供，这里只定义调用约定

use crate::error::Result;
use crate::models::{NewSolveRecord, SolveRecord, UserIdentity};
use async_trait::async_trait;

/// 仪表盘默认展示的最近记录条数
pub const DEFAULT_RECENT_LIMIT: usize = 25;

/// 解题记录存储
///
/// 所有操作都限定在 `user` 名下，实现方负责访问隔离。
#[async_trait]
pub trait SolveStore: Send + Sync {
    /// 按 solved_date 倒序返回最多 `limit` 条记录
    async fn fetch_recent_solves(
        &self,
        user: &UserIdentity,
        limit: usize,
    ) -> Result<Vec<SolveRecord>>;

    async fn insert_solve(&self, user: &UserIdentity, record: NewSolveRecord)
        -> Result<SolveRecord>;

    /// 记录不存在（或不属于该用户）时返回 `AppError::NotFound`
    async fn delete_solve(&self, user: &UserIdentity, id: &str) -> Result<()>;
}

/// 身份认证
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Result<Option<UserIdentity>>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<()>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity>;

    async fn sign_out(&self) -> Result<()>;
}
