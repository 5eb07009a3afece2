// ==========================================
// 产品参数配置引擎 - 配置管理器
// ==========================================
// 职责: 从 config_kv 表加载引擎配置，缺省回退默认值
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::engine_config::EngineConfig;
use crate::domain::types::Locale;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value, updated_at) VALUES ('global', ?1, ?2, datetime('now'))
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt = conn.prepare(
            "SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key"
        )?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
            ))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    /// 加载引擎配置
    ///
    /// # 说明
    /// - 未配置的键使用 EngineConfig::default()
    /// - 格式错误的值记录 warn 并回退默认值，不阻断调用
    pub fn load_engine_config(&self) -> Result<EngineConfig, Box<dyn Error>> {
        let mut config = EngineConfig::default();

        if let Some(v) = self.get_config_value(config_keys::DESCRIPTION_SEPARATOR)? {
            if !v.is_empty() {
                config.description_separator = v;
            }
        }

        if let Some(v) = self.get_config_value(config_keys::DIMENSION_JOINER)? {
            if !v.is_empty() {
                config.dimension_joiner = v;
            }
        }

        if let Some(v) = self.get_config_value(config_keys::AREA_DECIMALS)? {
            match v.trim().parse::<usize>() {
                Ok(n) if n <= 6 => config.area_decimals = n,
                _ => tracing::warn!("配置值格式错误 key={} value={}，使用默认值", config_keys::AREA_DECIMALS, v),
            }
        }

        if let Some(v) = self.get_config_value(config_keys::ENFORCE_OVERRIDE_NARROWING)? {
            match parse_flag(&v) {
                Some(flag) => config.enforce_override_narrowing = flag,
                None => tracing::warn!(
                    "配置值格式错误 key={} value={}，使用默认值",
                    config_keys::ENFORCE_OVERRIDE_NARROWING,
                    v
                ),
            }
        }

        if let Some(v) = self.get_config_value(config_keys::DEFAULT_LOCALE)? {
            match v.parse::<Locale>() {
                Ok(locale) => config.default_locale = locale,
                Err(e) => tracing::warn!("{}，使用默认语言", e),
            }
        }

        Ok(config)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    pub const DESCRIPTION_SEPARATOR: &str = "description/separator";
    pub const DIMENSION_JOINER: &str = "description/dimension_joiner";
    pub const AREA_DECIMALS: &str = "description/area_decimals";
    pub const ENFORCE_OVERRIDE_NARROWING: &str = "supplier_override/enforce_narrowing";
    pub const DEFAULT_LOCALE: &str = "locale/default";
}
