//! 刷题统计引擎
//! 对一批解题记录计算总数、难度分布、累计用时以及连续打卡天数。
//!
//! 纯函数：不做 I/O，不读系统时钟，"今天" 由调用方通过 `as_of` 传入。

use crate::models::{Difficulty, SolveRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 统计结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
    pub total_minutes: u64,
    pub streak_days: u32,
}

impl Statistics {
    /// 仪表盘上的 "Easy / Medium / Hard" 展示
    pub fn difficulty_breakdown(&self) -> String {
        format!("{} / {} / {}", self.easy, self.medium, self.hard)
    }
}

/// 计算统计数据
pub fn compute_statistics(records: &[SolveRecord], as_of: NaiveDate) -> Statistics {
    let mut stats = Statistics {
        total: records.len(),
        ..Statistics::default()
    };

    for record in records {
        match record.difficulty {
            Difficulty::Easy => stats.easy += 1,
            Difficulty::Medium => stats.medium += 1,
            Difficulty::Hard => stats.hard += 1,
            Difficulty::Unrecognized(_) => {}
        }
        stats.total_minutes += u64::from(record.minutes_spent);
    }

    let days: HashSet<NaiveDate> = records.iter().map(|r| r.solved_date).collect();
    stats.streak_days = streak_ending_at(&days, as_of);

    stats
}

/// 从 `as_of` 往前逐日检查，遇到第一个没有记录的日子停止
fn streak_ending_at(days: &HashSet<NaiveDate>, as_of: NaiveDate) -> u32 {
    let mut streak = 0u32;
    let mut day = as_of;

    // 连续天数不可能超过不同日期的数量，空集合直接返回 0
    while (streak as usize) < days.len() && days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }

    streak
}
