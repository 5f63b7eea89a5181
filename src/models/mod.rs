use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 题目难度
///
/// 只有 `Easy` / `Medium` / `Hard` 三种合法取值。后端读回的其他字符串保留在
/// `Unrecognized` 中，统计时直接忽略。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Unrecognized(String),
}

impl Difficulty {
    pub fn as_str(&self) -> &str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Unrecognized(raw) => raw,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Difficulty::Unrecognized(_))
    }
}

impl From<String> for Difficulty {
    // 精确匹配，不做大小写归一化
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Easy" => Difficulty::Easy,
            "Medium" => Difficulty::Medium,
            "Hard" => Difficulty::Hard,
            _ => Difficulty::Unrecognized(raw),
        }
    }
}

impl From<Difficulty> for String {
    fn from(d: Difficulty) -> Self {
        match d {
            Difficulty::Unrecognized(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    /// 严格解析，仅接受三种合法难度
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Difficulty::from(s.to_string()) {
            Difficulty::Unrecognized(raw) => Err(format!(
                "Unknown difficulty '{}', expected Easy, Medium or Hard",
                raw
            )),
            d => Ok(d),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 一条解题记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveRecord {
    pub id: String,
    pub problem_slug: String,
    pub difficulty: Difficulty,
    pub minutes_spent: u32,
    pub solved_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 待插入的解题记录（id 与 created_at 由存储层生成）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSolveRecord {
    pub problem_slug: String,
    pub difficulty: Difficulty,
    pub minutes_spent: u32,
    pub solved_date: NaiveDate,
    pub notes: Option<String>,
}

/// 已登录用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    #[serde(default)]
    pub email: String,
}

/// 登录会话，持久化到本地
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user: UserIdentity,
}
