// 表单校验
// 在写入存储之前把用户输入整理成 NewSolveRecord，统计引擎只接收校验过的数据

use crate::error::{AppError, Result};
use crate::models::{Difficulty, NewSolveRecord};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

pub const EMPTY_SLUG_MESSAGE: &str = "Enter a LeetCode slug (e.g., two-sum).";

fn problem_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:https?://)?(?:www\.)?leetcode\.(?:com|cn)/problems/([A-Za-z0-9-]+)")
            .unwrap()
    })
}

/// 题目标识：去除首尾空白，粘贴完整题目链接时取出其中的 slug
pub fn normalize_slug(raw: &str) -> Result<String> {
    let trimmed = raw.trim();

    let slug = problem_url_pattern()
        .captures(trimmed)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(trimmed);

    if slug.is_empty() {
        return Err(AppError::Validation(EMPTY_SLUG_MESSAGE.to_string()));
    }

    Ok(slug.to_string())
}

pub fn validate_difficulty(difficulty: &Difficulty) -> Result<Difficulty> {
    if difficulty.is_recognized() {
        Ok(difficulty.clone())
    } else {
        Err(AppError::Validation(format!(
            "Unknown difficulty '{}', expected Easy, Medium or Hard",
            difficulty
        )))
    }
}

pub fn validate_minutes(minutes: i64) -> Result<u32> {
    u32::try_from(minutes).map_err(|_| {
        AppError::Validation(format!(
            "Minutes spent must be a non-negative number, got {}",
            minutes
        ))
    })
}

pub fn parse_solved_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw.trim()))
    })
}

/// 备注为空白时存为 NULL
pub fn normalize_notes(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 组装待插入记录
pub fn build_new_solve(
    slug: &str,
    difficulty: &Difficulty,
    minutes: i64,
    solved_date: &str,
    notes: &str,
) -> Result<NewSolveRecord> {
    Ok(NewSolveRecord {
        problem_slug: normalize_slug(slug)?,
        difficulty: validate_difficulty(difficulty)?,
        minutes_spent: validate_minutes(minutes)?,
        solved_date: parse_solved_date(solved_date)?,
        notes: normalize_notes(notes),
    })
}
