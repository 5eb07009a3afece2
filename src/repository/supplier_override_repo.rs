// ==========================================
// 产品参数配置引擎 - 供应商覆写仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: (supplier_id, parameter_id) 至多一条，写入使用 UPSERT
// ==========================================

use crate::domain::supplier_override::SupplierOverride;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const OVERRIDE_COLUMNS: &str = r#"
    supplier_id, parameter_id, custom_values_json,
    min_value, max_value, is_available, updated_at
"#;

pub struct SupplierOverrideRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SupplierOverrideRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入或替换覆写
    pub fn upsert(&self, record: &SupplierOverride) -> RepositoryResult<()> {
        let custom_values_json = match &record.custom_values {
            Some(values) => Some(serde_json::to_string(values)?),
            None => None,
        };

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO supplier_override (
                supplier_id, parameter_id, custom_values_json,
                min_value, max_value, is_available, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(supplier_id, parameter_id) DO UPDATE SET
                custom_values_json = excluded.custom_values_json,
                min_value = excluded.min_value,
                max_value = excluded.max_value,
                is_available = excluded.is_available,
                updated_at = excluded.updated_at
            "#,
            params![
                record.supplier_id,
                record.parameter_id,
                custom_values_json,
                record.min_value,
                record.max_value,
                record.is_available,
                record.updated_at,
            ],
        )?;
        Ok(())
    }

    pub fn delete(&self, supplier_id: &str, parameter_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "DELETE FROM supplier_override WHERE supplier_id = ?1 AND parameter_id = ?2",
            params![supplier_id, parameter_id],
        )?;
        Ok(changed)
    }

    pub fn find(&self, supplier_id: &str, parameter_id: &str) -> RepositoryResult<Option<SupplierOverride>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM supplier_override WHERE supplier_id = ?1 AND parameter_id = ?2",
            OVERRIDE_COLUMNS
        );
        let raw = conn
            .query_row(&sql, params![supplier_id, parameter_id], map_override_row)
            .optional()?;
        raw.map(RawOverride::into_domain).transpose()
    }

    /// 查询供应商的全部覆写
    pub fn list_by_supplier(&self, supplier_id: &str) -> RepositoryResult<Vec<SupplierOverride>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM supplier_override WHERE supplier_id = ?1 ORDER BY parameter_id ASC",
            OVERRIDE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![supplier_id], map_override_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(RawOverride::into_domain).collect()
    }
}

/// 行映射中间结构（custom_values 以 JSON 文本存储）
struct RawOverride {
    record: SupplierOverride,
    custom_values_json: Option<String>,
}

impl RawOverride {
    fn into_domain(self) -> RepositoryResult<SupplierOverride> {
        let mut record = self.record;
        record.custom_values = match self.custom_values_json {
            Some(json) => Some(serde_json::from_str::<Vec<String>>(&json)?),
            None => None,
        };
        Ok(record)
    }
}

fn map_override_row(row: &Row<'_>) -> rusqlite::Result<RawOverride> {
    Ok(RawOverride {
        record: SupplierOverride {
            supplier_id: row.get(0)?,
            parameter_id: row.get(1)?,
            custom_values: None,
            min_value: row.get(3)?,
            max_value: row.get(4)?,
            is_available: row.get(5)?,
            updated_at: row.get(6)?,
        },
        custom_values_json: row.get(2)?,
    })
}
