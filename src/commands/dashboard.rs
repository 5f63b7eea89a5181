// 仪表盘命令
// 拉取最近的解题记录，计算统计卡片，支持逐条删除

use super::auth::require_user;
use super::AppState;
use crate::models::SolveRecord;
use crate::services::statistics::{compute_statistics, Statistics};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 解题记录传输对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRecordDto {
    pub id: String,
    pub problem_slug: String,
    pub difficulty: String,
    pub minutes_spent: u32,
    pub solved_date: String,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<SolveRecord> for SolveRecordDto {
    fn from(r: SolveRecord) -> Self {
        Self {
            id: r.id,
            problem_slug: r.problem_slug,
            difficulty: r.difficulty.to_string(),
            minutes_spent: r.minutes_spent,
            solved_date: r.solved_date.format("%Y-%m-%d").to_string(),
            notes: r.notes,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// 统计卡片
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatCardDto {
    pub label: String,
    pub value: String,
}

/// 仪表盘传输对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardDto {
    pub email: String,
    pub stats: Statistics,
    pub cards: Vec<StatCardDto>,
    pub entries: Vec<SolveRecordDto>,
    pub message: Option<String>,
}

/// 仪表盘页面状态
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub email: String,
    pub items: Vec<SolveRecord>,
    pub message: Option<String>,
    pub limit: usize,
}

impl DashboardView {
    pub fn stats(&self, as_of: NaiveDate) -> Statistics {
        compute_statistics(&self.items, as_of)
    }

    pub fn cards(&self, as_of: NaiveDate) -> Vec<StatCardDto> {
        let stats = self.stats(as_of);
        let card = |label: String, value: String| StatCardDto { label, value };

        vec![
            card("Total solves".to_string(), stats.total.to_string()),
            card("Streak (days)".to_string(), stats.streak_days.to_string()),
            card("Minutes logged".to_string(), stats.total_minutes.to_string()),
            card("Easy / Medium / Hard".to_string(), stats.difficulty_breakdown()),
            card(format!("Last {} entries", self.limit), self.items.len().to_string()),
        ]
    }

    pub fn to_dto(&self, as_of: NaiveDate) -> DashboardDto {
        DashboardDto {
            email: self.email.clone(),
            stats: self.stats(as_of),
            cards: self.cards(as_of),
            entries: self.items.iter().cloned().map(SolveRecordDto::from).collect(),
            message: self.message.clone(),
        }
    }

    /// 删除一条记录
    ///
    /// 只有后端删除成功才从列表移除；失败时把错误写入 message，列表不变。
    pub async fn delete_row(&mut self, id: &str, state: &AppState) -> Result<(), String> {
        self.message = None;

        let result = match require_user(state).await {
            Ok(user) => state
                .solves
                .delete_solve(&user, id)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                self.items.retain(|item| item.id != id);
                Ok(())
            }
            Err(message) => {
                log::warn!("Delete of {} failed: {}", id, message);
                self.message = Some(message.clone());
                Err(message)
            }
        }
    }
}

/// 加载仪表盘
///
/// 未登录返回错误（调用方跳转登录）；拉取失败时返回空列表并带上错误信息。
pub async fn load_dashboard(state: &AppState) -> Result<DashboardView, String> {
    let user = require_user(state).await?;

    let (items, message) = match state
        .solves
        .fetch_recent_solves(&user, state.recent_limit)
        .await
    {
        Ok(items) => (items, None),
        Err(e) => {
            log::warn!("Failed to load recent solves: {}", e);
            (Vec::new(), Some(e.to_string()))
        }
    };

    Ok(DashboardView {
        email: user.email,
        items,
        message,
        limit: state.recent_limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{local_state, user, FailingStore, FakeIdentity};
    use crate::models::{Difficulty, NewSolveRecord};
    use std::sync::Arc;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn new_solve(slug: &str, solved: &str, difficulty: Difficulty, minutes: u32) -> NewSolveRecord {
        NewSolveRecord {
            problem_slug: slug.to_string(),
            difficulty,
            minutes_spent: minutes,
            solved_date: date(solved),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_load_dashboard_with_stats() {
        let (state, db) = local_state(FakeIdentity::signed_in("coder@example.com"));
        let owner = user("coder@example.com");
        db.add_solve(&owner.id, &new_solve("two-sum", "2024-01-03", Difficulty::Easy, 15))
            .unwrap();
        db.add_solve(&owner.id, &new_solve("add-two-numbers", "2024-01-02", Difficulty::Medium, 30))
            .unwrap();

        let view = load_dashboard(&state).await.unwrap();
        let dto = view.to_dto(date("2024-01-03"));

        assert_eq!(dto.email, "coder@example.com");
        assert_eq!(dto.entries.len(), 2);
        assert_eq!(dto.entries[0].problem_slug, "two-sum");
        assert_eq!(dto.stats.total, 2);
        assert_eq!(dto.stats.total_minutes, 45);
        assert_eq!(dto.stats.streak_days, 2);
        assert_eq!(dto.cards[3].value, "1 / 1 / 0");
        assert_eq!(dto.cards[4].label, "Last 25 entries");
        assert_eq!(dto.message, None);
    }

    #[tokio::test]
    async fn test_load_dashboard_requires_login() {
        let (state, _db) = local_state(FakeIdentity::default());
        assert_eq!(load_dashboard(&state).await.unwrap_err(), "Not logged in");
    }

    #[tokio::test]
    async fn test_fetch_failure_becomes_message() {
        let state = AppState::new(
            Arc::new(FailingStore),
            Arc::new(FakeIdentity::signed_in("coder@example.com")),
            25,
        );

        let view = load_dashboard(&state).await.unwrap();
        assert!(view.items.is_empty());
        assert_eq!(view.message.as_deref(), Some("Service unavailable"));
        assert_eq!(view.stats(date("2024-01-03")), Statistics::default());
    }

    #[tokio::test]
    async fn test_delete_row_updates_stats() {
        let (state, db) = local_state(FakeIdentity::signed_in("coder@example.com"));
        let owner = user("coder@example.com");
        let saved = db
            .add_solve(&owner.id, &new_solve("two-sum", "2024-01-03", Difficulty::Hard, 50))
            .unwrap();

        let mut view = load_dashboard(&state).await.unwrap();
        view.delete_row(&saved.id, &state).await.unwrap();

        assert!(view.items.is_empty());
        assert_eq!(view.stats(date("2024-01-03")).streak_days, 0);
        assert!(db.recent_solves(&owner.id, 25).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_row() {
        let (state, db) = local_state(FakeIdentity::signed_in("coder@example.com"));
        let owner = user("coder@example.com");
        db.add_solve(&owner.id, &new_solve("two-sum", "2024-01-03", Difficulty::Easy, 10))
            .unwrap();

        let mut view = load_dashboard(&state).await.unwrap();
        let err = view.delete_row("missing-id", &state).await.unwrap_err();

        assert_eq!(err, "Solve not found: missing-id");
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.message.as_deref(), Some("Solve not found: missing-id"));

        // 下一次操作先清掉旧消息
        let id = view.items[0].id.clone();
        view.delete_row(&id, &state).await.unwrap();
        assert_eq!(view.message, None);
    }
}
