//! 托管后端客户端
//! 通过 Supabase 的 Auth (GoTrue) 与 REST (PostgREST) 接口完成登录和解题记录的增删查。
//! 行级权限由后端负责，这里只携带当前会话的 token。

use crate::error::{AppError, Result};
use crate::models::{Difficulty, NewSolveRecord, Session, SolveRecord, UserIdentity};
use crate::services::session::SessionStore;
use crate::services::store::{IdentityProvider, SolveStore};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Deserializer, Serialize};

const SUBMISSIONS_TABLE: &str = "submissions";
const SUBMISSION_COLUMNS: &str =
    "id,leetcode_slug,difficulty,minutes_spent,solved_at,notes,created_at";

/// 登录请求体
#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// 密码登录响应
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    user: AuthUser,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

impl From<AuthUser> for UserIdentity {
    fn from(user: AuthUser) -> Self {
        UserIdentity {
            id: user.id,
            email: user.email.unwrap_or_default(),
        }
    }
}

/// submissions 表的一行
#[derive(Debug, Deserialize)]
struct SubmissionRow {
    id: String,
    leetcode_slug: String,
    difficulty: Difficulty,
    #[serde(default, deserialize_with = "null_as_zero")]
    minutes_spent: u32,
    solved_at: NaiveDate,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<SubmissionRow> for SolveRecord {
    fn from(row: SubmissionRow) -> Self {
        SolveRecord {
            id: row.id,
            problem_slug: row.leetcode_slug,
            difficulty: row.difficulty,
            minutes_spent: row.minutes_spent,
            solved_date: row.solved_at,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}

/// 插入请求体
#[derive(Debug, Serialize)]
struct SubmissionInsert<'a> {
    user_id: &'a str,
    leetcode_slug: &'a str,
    difficulty: &'a str,
    minutes_spent: u32,
    solved_at: NaiveDate,
    notes: Option<&'a str>,
}

fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(0))
}

/// 从错误响应体中取出后端给出的提示信息
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["msg", "error_description", "message", "error"] {
            if let Some(message) = value.get(key).and_then(|m| m.as_str()) {
                return message.to_string();
            }
        }
    }

    let body = body.trim();
    if body.is_empty() {
        format!("Request failed with status {}", status)
    } else {
        body.to_string()
    }
}

/// Supabase 客户端
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    http_client: reqwest::Client,
    sessions: SessionStore,
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str, sessions: SessionStore) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            http_client: reqwest::Client::new(),
            sessions,
        }
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, endpoint)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn with_api_key(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.anon_key)
    }

    /// 当前会话的 token，未登录时报错
    fn access_token(&self) -> Result<String> {
        self.sessions
            .load()
            .map(|s| s.access_token)
            .ok_or(AppError::NotAuthenticated)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(status, &body);
        log::warn!("Supabase request failed ({}): {}", status, message);
        Err(AppError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl IdentityProvider for SupabaseClient {
    async fn current_user(&self) -> Result<Option<UserIdentity>> {
        let Some(session) = self.sessions.load() else {
            return Ok(None);
        };

        let response = self
            .with_api_key(self.http_client.get(self.auth_url("user")))
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            log::info!("Stored session is no longer valid, clearing it");
            self.sessions.clear()?;
            return Ok(None);
        }

        let user: AuthUser = Self::check(response).await?.json().await?;
        Ok(Some(user.into()))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let response = self
            .with_api_key(self.http_client.post(self.auth_url("signup")))
            .json(&Credentials { email, password })
            .send()
            .await?;

        Self::check(response).await?;
        log::info!("Signed up {}", email);
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<UserIdentity> {
        let response = self
            .with_api_key(self.http_client.post(self.auth_url("token")))
            .query(&[("grant_type", "password")])
            .json(&Credentials { email, password })
            .send()
            .await?;

        let token: TokenResponse = Self::check(response).await?.json().await?;
        let user = UserIdentity::from(token.user);

        self.sessions.save(&Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            user: user.clone(),
        })?;

        log::debug!("Session saved to {}", self.sessions.path().display());
        log::info!("Signed in as {}", user.email);
        Ok(user)
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(session) = self.sessions.load() {
            let result = self
                .with_api_key(self.http_client.post(self.auth_url("logout")))
                .bearer_auth(&session.access_token)
                .send()
                .await;

            // 远端注销失败不影响本地退出
            match result {
                Ok(response) if !response.status().is_success() => {
                    log::warn!("Remote logout returned {}", response.status());
                }
                Err(e) => log::warn!("Remote logout failed: {}", e),
                Ok(_) => {}
            }
        }

        self.sessions.clear()
    }
}

#[async_trait]
impl SolveStore for SupabaseClient {
    async fn fetch_recent_solves(
        &self,
        user: &UserIdentity,
        limit: usize,
    ) -> Result<Vec<SolveRecord>> {
        let token = self.access_token()?;

        let response = self
            .with_api_key(self.http_client.get(self.rest_url(SUBMISSIONS_TABLE)))
            .bearer_auth(token)
            .query(&[
                ("select", SUBMISSION_COLUMNS.to_string()),
                ("user_id", format!("eq.{}", user.id)),
                ("order", "solved_at.desc,created_at.desc".to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        let rows: Vec<SubmissionRow> = Self::check(response).await?.json().await?;
        log::debug!("Fetched {} submissions", rows.len());
        Ok(rows.into_iter().map(SolveRecord::from).collect())
    }

    async fn insert_solve(
        &self,
        user: &UserIdentity,
        record: NewSolveRecord,
    ) -> Result<SolveRecord> {
        let token = self.access_token()?;
        let payload = SubmissionInsert {
            user_id: &user.id,
            leetcode_slug: &record.problem_slug,
            difficulty: record.difficulty.as_str(),
            minutes_spent: record.minutes_spent,
            solved_at: record.solved_date,
            notes: record.notes.as_deref(),
        };

        let response = self
            .with_api_key(self.http_client.post(self.rest_url(SUBMISSIONS_TABLE)))
            .bearer_auth(token)
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await?;

        let mut rows: Vec<SubmissionRow> = Self::check(response).await?.json().await?;
        if rows.is_empty() {
            return Err(AppError::Api {
                status: StatusCode::OK.as_u16(),
                message: "Insert returned no rows".to_string(),
            });
        }

        let saved = SolveRecord::from(rows.swap_remove(0));
        log::info!("Logged {} on {}", saved.problem_slug, saved.solved_date);
        Ok(saved)
    }

    async fn delete_solve(&self, _user: &UserIdentity, id: &str) -> Result<()> {
        let token = self.access_token()?;

        let response = self
            .with_api_key(self.http_client.delete(self.rest_url(SUBMISSIONS_TABLE)))
            .bearer_auth(token)
            .header("Prefer", "return=representation")
            .query(&[("id", format!("eq.{}", id))])
            .send()
            .await?;

        // RLS 会把别人的记录过滤掉，返回空数组
        let deleted: Vec<serde_json::Value> = Self::check(response).await?.json().await?;
        if deleted.is_empty() {
            return Err(AppError::NotFound(id.to_string()));
        }

        log::info!("Deleted submission {}", id);
        Ok(())
    }
}
