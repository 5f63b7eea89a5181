// 应用配置
// 从 TOML 文件读取，环境变量可覆盖；所有字段都有默认值

use crate::error::{AppError, Result};
use crate::services::store::DEFAULT_RECENT_LIMIT;
use crate::utils::app_data_dir;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Supabase,
    Local,
}

impl std::str::FromStr for Backend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "supabase" => Ok(Backend::Supabase),
            "local" => Ok(Backend::Local),
            other => Err(AppError::Config(format!(
                "unknown backend '{}', expected 'supabase' or 'local'",
                other
            ))),
        }
    }
}

/// 托管后端连接信息
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub anon_key: Option<String>,
}

/// 本地 SQLite 后端
#[derive(Debug, Clone, Deserialize)]
pub struct LocalConfig {
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default = "default_local_email")]
    pub email: String,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            email: default_local_email(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            log_level: default_log_level(),
            supabase: SupabaseConfig::default(),
            local: LocalConfig::default(),
            dashboard: DashboardConfig::default(),
        }
    }
}

fn default_local_email() -> String {
    "me@localhost".to_string()
}

fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// 默认配置文件路径：<config_dir>/shuati-tracker/config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(crate::utils::APP_DIR).join("config.toml"))
    }

    /// 读取配置
    ///
    /// 显式指定的文件必须存在；默认路径下没有文件时使用默认配置。
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if explicit {
                return Err(AppError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            log::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// 环境变量覆盖：SUPABASE_URL / SUPABASE_ANON_KEY / SHUATI_BACKEND / SHUATI_LOG
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("SUPABASE_URL") {
            self.supabase.url = Some(url);
        }
        if let Some(key) = lookup("SUPABASE_ANON_KEY") {
            self.supabase.anon_key = Some(key);
        }
        if let Some(backend) = lookup("SHUATI_BACKEND") {
            self.backend = backend.parse()?;
        }
        if let Some(level) = lookup("SHUATI_LOG") {
            self.log_level = level;
        }
        Ok(())
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    /// Supabase 的 url 与 anon key，缺一不可
    pub fn supabase_credentials(&self) -> Result<(&str, &str)> {
        let url = self
            .supabase
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| AppError::Config("supabase.url (or SUPABASE_URL) is not set".to_string()))?;
        let key = self
            .supabase
            .anon_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AppError::Config("supabase.anon_key (or SUPABASE_ANON_KEY) is not set".to_string())
            })?;
        Ok((url, key))
    }

    pub fn database_path(&self) -> PathBuf {
        self.local
            .database_path
            .clone()
            .unwrap_or_else(|| app_data_dir().join("shuati.db"))
    }
}
