use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::settings::MAX_REFRESH_INTERVAL;

/// 服务配置，从环境变量 (以及 .env) 读取
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 扫描后端的基础 URL
    pub api_url: String,
    pub bind_address: String,
    pub db_path: PathBuf,
    /// 用户保存自己的轮询间隔之前使用
    pub poll_interval: Duration,
    pub max_wait: Option<Duration>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            bind_address: "0.0.0.0:8080".to_string(),
            db_path: PathBuf::from("sentinelle.db"),
            poll_interval: Duration::from_secs(3),
            max_wait: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let db_path = match lookup("SENTINELLE_DB") {
            Some(path) => PathBuf::from(path),
            None => std::env::current_dir()?.join(defaults.db_path),
        };

        let poll_interval = match lookup("SENTINELLE_POLL_SECS") {
            Some(raw) => Duration::from_secs(
                parse_secs("SENTINELLE_POLL_SECS", &raw)?.clamp(1, MAX_REFRESH_INTERVAL),
            ),
            None => defaults.poll_interval,
        };

        let max_wait = match lookup("SENTINELLE_MAX_WAIT_SECS") {
            // 0 表示不限时
            Some(raw) => match parse_secs("SENTINELLE_MAX_WAIT_SECS", &raw)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
            None => defaults.max_wait,
        };

        Ok(Self {
            api_url: lookup("SENTINELLE_API_URL").unwrap_or(defaults.api_url),
            bind_address: lookup("SENTINELLE_BIND").unwrap_or(defaults.bind_address),
            db_path,
            poll_interval,
            max_wait,
        })
    }
}

fn parse_secs(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .with_context(|| format!("{} must be a number of seconds, got {:?}", key, raw))
}
