// 记录解题页命令

use super::auth::require_user;
use super::dashboard::SolveRecordDto;
use super::AppState;
use crate::models::Difficulty;
use crate::services::validation::build_new_solve;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const SAVED_MESSAGE: &str = "Saved ✅";

const DEFAULT_MINUTES: i64 = 20;

/// 记录解题表单
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveForm {
    pub slug: String,
    pub difficulty: Difficulty,
    pub minutes_spent: i64,
    pub solved_date: String,
    pub notes: String,
}

impl SolveForm {
    /// 空表单：难度 Easy，用时 20 分钟，日期为今天
    pub fn new(today: NaiveDate) -> Self {
        Self {
            slug: String::new(),
            difficulty: Difficulty::Easy,
            minutes_spent: DEFAULT_MINUTES,
            solved_date: today.format("%Y-%m-%d").to_string(),
            notes: String::new(),
        }
    }
}

/// 提交表单
///
/// 成功后只清空题目和备注，难度、用时、日期保留；失败时表单保持原样。
pub async fn log_solve(form: &mut SolveForm, state: &AppState) -> Result<SolveRecordDto, String> {
    let user = require_user(state).await?;

    let record = build_new_solve(
        &form.slug,
        &form.difficulty,
        form.minutes_spent,
        &form.solved_date,
        &form.notes,
    )
    .map_err(|e| e.to_string())?;

    let saved = state
        .solves
        .insert_solve(&user, record)
        .await
        .map_err(|e| e.to_string())?;

    form.slug.clear();
    form.notes.clear();

    Ok(saved.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{local_state, user, FailingStore, FakeIdentity};
    use std::sync::Arc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()
    }

    #[test]
    fn test_form_defaults() {
        let form = SolveForm::new(today());
        assert_eq!(form.difficulty, Difficulty::Easy);
        assert_eq!(form.minutes_spent, 20);
        assert_eq!(form.solved_date, "2024-01-03");
        assert!(form.slug.is_empty());
    }

    #[tokio::test]
    async fn test_submit_saves_and_clears_slug_and_notes() {
        let (state, db) = local_state(FakeIdentity::signed_in("coder@example.com"));
        let mut form = SolveForm::new(today());
        form.slug = " two-sum ".to_string();
        form.difficulty = Difficulty::Medium;
        form.minutes_spent = 35;
        form.notes = "hash map".to_string();

        let saved = log_solve(&mut form, &state).await.unwrap();

        assert_eq!(saved.problem_slug, "two-sum");
        assert_eq!(saved.difficulty, "Medium");
        assert_eq!(saved.solved_date, "2024-01-03");
        assert!(form.slug.is_empty());
        assert!(form.notes.is_empty());
        assert_eq!(form.difficulty, Difficulty::Medium);
        assert_eq!(form.minutes_spent, 35);

        let stored = db.recent_solves(&user("coder@example.com").id, 25).unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].notes.as_deref(), Some("hash map"));
    }

    #[tokio::test]
    async fn test_empty_slug_keeps_form() {
        let (state, db) = local_state(FakeIdentity::signed_in("coder@example.com"));
        let mut form = SolveForm::new(today());
        form.slug = "   ".to_string();
        form.notes = "draft".to_string();
        let before = form.clone();

        let err = log_solve(&mut form, &state).await.unwrap_err();

        assert_eq!(err, "Enter a LeetCode slug (e.g., two-sum).");
        assert_eq!(form, before);
        assert!(db.recent_solves(&user("coder@example.com").id, 25).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_requires_login() {
        let (state, _db) = local_state(FakeIdentity::default());
        let mut form = SolveForm::new(today());
        form.slug = "two-sum".to_string();

        assert_eq!(log_solve(&mut form, &state).await.unwrap_err(), "Not logged in");
        assert_eq!(form.slug, "two-sum");
    }

    #[tokio::test]
    async fn test_store_failure_keeps_form() {
        let state = AppState::new(
            Arc::new(FailingStore),
            Arc::new(FakeIdentity::signed_in("coder@example.com")),
            25,
        );
        let mut form = SolveForm::new(today());
        form.slug = "two-sum".to_string();

        assert_eq!(log_solve(&mut form, &state).await.unwrap_err(), "Service unavailable");
        assert_eq!(form.slug, "two-sum");
    }
}
