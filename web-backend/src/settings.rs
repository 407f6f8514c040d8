use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

const DARK_MODE: &str = "dark_mode";
const REFRESH_INTERVAL: &str = "refresh_interval";

/// 轮询间隔上限 (秒)
pub const MAX_REFRESH_INTERVAL: u64 = 3600;

/// 客户端设置：深色模式和轮询间隔 (秒)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub dark_mode: bool,
    pub refresh_interval: u64,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval == 0 {
            return Err(anyhow!("refresh_interval must be at least 1 second"));
        }
        if self.refresh_interval > MAX_REFRESH_INTERVAL {
            return Err(anyhow!(
                "refresh_interval must be at most {} seconds",
                MAX_REFRESH_INTERVAL
            ));
        }
        Ok(())
    }
}

/// SQLite 中的键值设置表
#[derive(Clone)]
pub struct SettingsStore {
    db: Pool<Sqlite>,
}

impl SettingsStore {
    pub async fn open(db_path: &Path) -> Result<Self> {
        tracing::info!("Settings database: {}", db_path.display());

        // 使用 SqliteConnectOptions 来确保数据库文件可以被创建
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
            .create_if_missing(true);

        let db = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| anyhow!("Failed to connect to database: {}", e))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&db)
        .await
        .map_err(|e| anyhow!("Failed to create tables: {}", e))?;

        Ok(Self { db })
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;
        Ok(value)
    }

    async fn put(&self, tx: &mut sqlx::Transaction<'_, Sqlite>, key: &str, value: String) -> Result<()> {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// 读取已保存的设置，缺失或无法解析的键使用 `defaults`
    pub async fn load(&self, defaults: Settings) -> Result<Settings> {
        let dark_mode = match self.get(DARK_MODE).await? {
            Some(raw) => raw == "true",
            None => defaults.dark_mode,
        };
        let refresh_interval = match self.get(REFRESH_INTERVAL).await? {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if (1..=MAX_REFRESH_INTERVAL).contains(&secs) => secs,
                _ => {
                    tracing::warn!("Ignoring stored refresh interval {:?}", raw);
                    defaults.refresh_interval
                }
            },
            None => defaults.refresh_interval,
        };
        Ok(Settings {
            dark_mode,
            refresh_interval,
        })
    }

    pub async fn save(&self, settings: &Settings) -> Result<()> {
        settings.validate()?;

        let mut tx = self.db.begin().await?;
        self.put(&mut tx, DARK_MODE, settings.dark_mode.to_string()).await?;
        self.put(&mut tx, REFRESH_INTERVAL, settings.refresh_interval.to_string())
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULTS: Settings = Settings {
        dark_mode: false,
        refresh_interval: 3,
    };

    #[tokio::test]
    async fn fresh_store_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(&dir.path().join("settings.db")).await.unwrap();
        assert_eq!(store.load(DEFAULTS).await.unwrap(), DEFAULTS);
    }

    #[tokio::test]
    async fn saved_settings_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.db");

        let store = SettingsStore::open(&path).await.unwrap();
        let wanted = Settings {
            dark_mode: true,
            refresh_interval: 10,
        };
        store.save(&wanted).await.unwrap();
        store
            .save(&Settings {
                dark_mode: true,
                refresh_interval: 7,
            })
            .await
            .unwrap();
        drop(store);

        let reopened = SettingsStore::open(&path).await.unwrap();
        let loaded = reopened.load(DEFAULTS).await.unwrap();
        assert!(loaded.dark_mode);
        assert_eq!(loaded.refresh_interval, 7);
    }

    #[tokio::test]
    async fn zero_interval_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::open(&dir.path().join("settings.db")).await.unwrap();
        let result = store
            .save(&Settings {
                dark_mode: false,
                refresh_interval: 0,
            })
            .await;
        assert!(result.is_err());
        assert_eq!(store.load(DEFAULTS).await.unwrap(), DEFAULTS);
    }

    #[test]
    fn interval_bounds() {
        let at = |secs| Settings {
            dark_mode: false,
            refresh_interval: secs,
        };
        assert!(at(1).validate().is_ok());
        assert!(at(MAX_REFRESH_INTERVAL).validate().is_ok());
        assert!(at(MAX_REFRESH_INTERVAL + 1).validate().is_err());
        assert!(at(18_446_744_073_709_552).validate().is_err());
    }
}
