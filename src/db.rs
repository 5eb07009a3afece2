// ==========================================
// 产品参数配置引擎 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 统一建表入口，测试与应用共用同一份 schema
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 打开内存库并建表（单元测试 / 临时计算用）
pub fn open_in_memory() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    configure_sqlite_connection(&conn)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// 建表（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS category (
            category_id TEXT PRIMARY KEY,
            name_ru TEXT NOT NULL,
            name_it TEXT NOT NULL,
            dimension_unit TEXT
        );

        CREATE TABLE IF NOT EXISTS supplier (
            supplier_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            short_name TEXT
        );

        CREATE TABLE IF NOT EXISTS parameter (
            parameter_id TEXT PRIMARY KEY,
            name_ru TEXT NOT NULL,
            name_it TEXT NOT NULL,
            kind TEXT NOT NULL,
            unit TEXT,
            min_value REAL,
            max_value REAL,
            step_value REAL,
            is_system INTEGER NOT NULL DEFAULT 0,
            system_role TEXT,
            is_global INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS parameter_value (
            value_id TEXT PRIMARY KEY,
            parameter_id TEXT NOT NULL REFERENCES parameter(parameter_id) ON DELETE CASCADE,
            raw_value TEXT NOT NULL,
            normalized_value TEXT NOT NULL,
            text_ru TEXT NOT NULL,
            text_it TEXT NOT NULL,
            display_name TEXT,
            color_hex TEXT,
            color_code TEXT,
            sort_order INTEGER NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        );

        -- 启用值按规范化文本唯一；停用值不参与
        CREATE UNIQUE INDEX IF NOT EXISTS uq_parameter_value_active
            ON parameter_value(parameter_id, normalized_value) WHERE is_active = 1;
        CREATE INDEX IF NOT EXISTS idx_parameter_value_parameter
            ON parameter_value(parameter_id, sort_order);

        -- 类目删除不级联，避免绕过 is_global 重算
        CREATE TABLE IF NOT EXISTS category_binding (
            category_id TEXT NOT NULL REFERENCES category(category_id),
            parameter_id TEXT NOT NULL REFERENCES parameter(parameter_id),
            is_required INTEGER NOT NULL DEFAULT 0,
            is_visible INTEGER NOT NULL DEFAULT 1,
            sort_order INTEGER NOT NULL DEFAULT 0,
            display_name_ru TEXT,
            display_name_it TEXT,
            default_value TEXT,
            help_text TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (category_id, parameter_id)
        );
        CREATE INDEX IF NOT EXISTS idx_category_binding_parameter
            ON category_binding(parameter_id);

        CREATE TABLE IF NOT EXISTS supplier_override (
            supplier_id TEXT NOT NULL REFERENCES supplier(supplier_id),
            parameter_id TEXT NOT NULL REFERENCES parameter(parameter_id) ON DELETE CASCADE,
            custom_values_json TEXT,
            min_value REAL,
            max_value REAL,
            is_available INTEGER NOT NULL DEFAULT 1,
            updated_at TEXT NOT NULL,
            PRIMARY KEY (supplier_id, parameter_id)
        );

        -- 配置对类目/供应商/参数均为弱引用
        CREATE TABLE IF NOT EXISTS configuration (
            configuration_id TEXT PRIMARY KEY,
            category_id TEXT,
            supplier_id TEXT,
            status TEXT NOT NULL,
            snapshot_json TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            issued_at TEXT
        );

        CREATE TABLE IF NOT EXISTS configuration_value (
            configuration_id TEXT NOT NULL REFERENCES configuration(configuration_id) ON DELETE CASCADE,
            parameter_id TEXT NOT NULL,
            value_json TEXT NOT NULL,
            PRIMARY KEY (configuration_id, parameter_id)
        );
        CREATE INDEX IF NOT EXISTS idx_configuration_value_parameter
            ON configuration_value(parameter_id);
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}
