// 服务模块
// 统计引擎与外部协作方（存储、认证）的实现

pub mod database;
pub mod session;
pub mod statistics;
pub mod store;
pub mod supabase;
pub mod validation;

pub use database::{DatabaseService, LocalIdentity};
pub use session::SessionStore;
pub use statistics::{compute_statistics, Statistics};
pub use store::{IdentityProvider, SolveStore, DEFAULT_RECENT_LIMIT};
pub use supabase::SupabaseClient;
