// 数据库服务模块
// 本地 SQLite 存储，离线模式下代替托管后端保存解题记录

use crate::error::{AppError, Result};
use crate::models::{Difficulty, NewSolveRecord, SolveRecord, UserIdentity};
use crate::services::store::{IdentityProvider, SolveStore};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OpenFlags, Row};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// 数据库服务
#[derive(Clone)]
pub struct DatabaseService {
    pool: Arc<Mutex<Connection>>,
    db_path: Option<PathBuf>,
}

impl DatabaseService {
    /// 打开（必要时创建）数据库文件
    pub fn open(db_path: &Path) -> Result<Self> {
        // 确保数据目录存在
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        let service = Self {
            pool: Arc::new(Mutex::new(conn)),
            db_path: Some(db_path.to_path_buf()),
        };
        service.initialize()?;

        log::info!("Opened local solve database at {}", db_path.display());
        Ok(service)
    }

    /// 内存数据库，测试用
    pub fn open_in_memory() -> Result<Self> {
        let service = Self {
            pool: Arc::new(Mutex::new(Connection::open_in_memory()?)),
            db_path: None,
        };
        service.initialize()?;
        Ok(service)
    }

    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.pool.lock().map_err(|_| AppError::LockPoisoned)
    }

    /// 初始化数据库表结构
    pub fn initialize(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS solves (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                problem_slug TEXT NOT NULL CHECK(length(problem_slug) > 0),
                difficulty TEXT NOT NULL,
                minutes_spent INTEGER NOT NULL DEFAULT 0 CHECK(minutes_spent >= 0),
                solved_date TEXT NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_solves_user_date ON solves(user_id, solved_date);
        ",
        )?;

        Ok(())
    }

    /// 获取最近的解题记录
    pub fn recent_solves(&self, user_id: &str, limit: usize) -> Result<Vec<SolveRecord>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, problem_slug, difficulty, minutes_spent, solved_date, notes, created_at
             FROM solves WHERE user_id = ?
             ORDER BY solved_date DESC, created_at DESC LIMIT ?",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(rusqlite::params![user_id, limit], |row| {
            Self::row_to_solve(row)
        })?;

        let mut solves = Vec::new();
        for row in rows {
            solves.push(row?);
        }

        Ok(solves)
    }

    /// 添加解题记录
    pub fn add_solve(&self, user_id: &str, record: &NewSolveRecord) -> Result<SolveRecord> {
        let conn = self.conn()?;
        let solve = SolveRecord {
            id: Uuid::new_v4().to_string(),
            problem_slug: record.problem_slug.clone(),
            difficulty: record.difficulty.clone(),
            minutes_spent: record.minutes_spent,
            solved_date: record.solved_date,
            notes: record.notes.clone(),
            created_at: Utc::now(),
        };

        conn.execute(
            "INSERT INTO solves
             (id, user_id, problem_slug, difficulty, minutes_spent, solved_date, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            rusqlite::params![
                solve.id,
                user_id,
                solve.problem_slug,
                solve.difficulty.as_str(),
                solve.minutes_spent,
                solve.solved_date.format(DATE_FORMAT).to_string(),
                solve.notes,
                solve.created_at.to_rfc3339(),
            ],
        )?;

        log::debug!("Inserted solve {} ({})", solve.id, solve.problem_slug);
        Ok(solve)
    }

    /// 删除解题记录
    pub fn remove_solve(&self, user_id: &str, id: &str) -> Result<()> {
        let conn = self.conn()?;

        let affected = conn.execute(
            "DELETE FROM solves WHERE id = ? AND user_id = ?",
            rusqlite::params![id, user_id],
        )?;

        if affected == 0 {
            return Err(AppError::NotFound(id.to_string()));
        }

        log::debug!("Deleted solve {}", id);
        Ok(())
    }

    /// 从数据库行转换为 SolveRecord
    fn row_to_solve(row: &Row) -> rusqlite::Result<SolveRecord> {
        let solved_date: String = row.get(4)?;
        let created_at: String = row.get(6)?;

        Ok(SolveRecord {
            id: row.get(0)?,
            problem_slug: row.get(1)?,
            difficulty: Difficulty::from(row.get::<_, String>(2)?),
            minutes_spent: row.get::<_, Option<u32>>(3)?.unwrap_or(0),
            solved_date: NaiveDate::parse_from_str(&solved_date, DATE_FORMAT)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
            notes: row.get(5)?,
            created_at: DateTime::parse_from_rfc3339(&created_at)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?,
        })
    }
}

#[async_trait]
impl SolveStore for DatabaseService {
    async fn fetch_recent_solves(
        &self,
        user: &UserIdentity,
        limit: usize,
    ) -> Result<Vec<SolveRecord>> {
        self.recent_solves(&user.id, limit)
    }

    async fn insert_solve(
        &self,
        user: &UserIdentity,
        record: NewSolveRecord,
    ) -> Result<SolveRecord> {
        self.add_solve(&user.id, &record)
    }

    async fn delete_solve(&self, user: &UserIdentity, id: &str) -> Result<()> {
        self.remove_solve(&user.id, id)
    }
}

/// 本地模式下的固定单用户
#[derive(Debug, Clone)]
pub struct LocalIdentity {
    user: UserIdentity,
}

impl LocalIdentity {
    pub fn new(email: &str) -> Self {
        Self {
            user: UserIdentity {
                id: "local".to_string(),
                email: email.to_string(),
            },
        }
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn current_user(&self) -> Result<Option<UserIdentity>> {
        Ok(Some(self.user.clone()))
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<()> {
        Err(AppError::Unsupported(
            "Sign up is not available with the local backend".to_string(),
        ))
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<UserIdentity> {
        Err(AppError::Unsupported(
            "The local backend has a single user; no login needed".to_string(),
        ))
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_solve(slug: &str, date: &str, minutes: u32) -> NewSolveRecord {
        NewSolveRecord {
            problem_slug: slug.to_string(),
            difficulty: Difficulty::Medium,
            minutes_spent: minutes,
            solved_date: NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap(),
            notes: Some("hash map".to_string()),
        }
    }

    #[test]
    fn test_insert_and_fetch_round_trip() {
        let db = DatabaseService::open_in_memory().unwrap();
        let saved = db.add_solve("u1", &new_solve("two-sum", "2024-01-03", 15)).unwrap();

        let rows = db.recent_solves("u1", 25).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, saved.id);
        assert_eq!(rows[0].problem_slug, "two-sum");
        assert_eq!(rows[0].difficulty, Difficulty::Medium);
        assert_eq!(rows[0].minutes_spent, 15);
        assert_eq!(rows[0].notes.as_deref(), Some("hash map"));
    }

    #[test]
    fn test_recent_solves_ordered_and_limited() {
        let db = DatabaseService::open_in_memory().unwrap();
        db.add_solve("u1", &new_solve("a", "2024-01-01", 1)).unwrap();
        db.add_solve("u1", &new_solve("c", "2024-01-03", 1)).unwrap();
        db.add_solve("u1", &new_solve("b", "2024-01-02", 1)).unwrap();

        let rows = db.recent_solves("u1", 2).unwrap();
        let slugs: Vec<_> = rows.iter().map(|r| r.problem_slug.as_str()).collect();
        assert_eq!(slugs, vec!["c", "b"]);
    }

    #[test]
    fn test_solves_scoped_to_user() {
        let db = DatabaseService::open_in_memory().unwrap();
        let theirs = db.add_solve("u2", &new_solve("lru-cache", "2024-01-03", 40)).unwrap();

        assert!(db.recent_solves("u1", 25).unwrap().is_empty());
        assert!(matches!(
            db.remove_solve("u1", &theirs.id),
            Err(AppError::NotFound(_))
        ));
        assert_eq!(db.recent_solves("u2", 25).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_missing_is_not_found() {
        let db = DatabaseService::open_in_memory().unwrap();
        assert!(matches!(
            db.remove_solve("u1", "nope"),
            Err(AppError::NotFound(id)) if id == "nope"
        ));
    }

    #[test]
    fn test_empty_slug_rejected_by_schema() {
        let db = DatabaseService::open_in_memory().unwrap();
        let result = db.add_solve("u1", &new_solve("", "2024-01-03", 1));
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[test]
    fn test_open_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("shuati.db");
        let db = DatabaseService::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(db.db_path(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_local_identity_single_user() {
        let identity = LocalIdentity::new("me@localhost");
        let user = identity.current_user().await.unwrap().unwrap();
        assert_eq!(user.email, "me@localhost");
        assert!(identity.sign_out().await.is_ok());
        assert!(matches!(
            identity.sign_in("a@b.c", "pw").await,
            Err(AppError::Unsupported(_))
        ));
    }
}
