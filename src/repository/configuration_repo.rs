// ==========================================
// 产品参数配置引擎 - 配置仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 红线: ISSUED 配置不可改写（SQL 层以 status 条件兜底）
// ==========================================
// 存储:
// - configuration: 头信息 + 签发快照 (snapshot_json)
// - configuration_value: 每个参数一行，取值以 JSON 文本存储
// ==========================================

use crate::domain::configuration::{Configuration, ConfigurationValues, ParameterSnapshot};
use crate::domain::types::ConfigurationStatus;
use crate::repository::error::{invalid_enum, lift_row_error, RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::sync::{Arc, Mutex};

pub struct ConfigurationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigurationRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 保存草稿（新建或整体替换取值与最近快照，单事务）
    ///
    /// # 错误
    /// - ImmutableRecord: 该配置已签发
    pub fn save_draft(&self, configuration: &Configuration) -> RepositoryResult<()> {
        let snapshot_json = if configuration.snapshot.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&configuration.snapshot)?)
        };

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            r#"
            INSERT INTO configuration (
                configuration_id, category_id, supplier_id, status,
                snapshot_json, created_at, updated_at, issued_at
            ) VALUES (?1, ?2, ?3, 'DRAFT', ?4, ?5, ?6, NULL)
            ON CONFLICT(configuration_id) DO UPDATE SET
                category_id = excluded.category_id,
                supplier_id = excluded.supplier_id,
                snapshot_json = excluded.snapshot_json,
                updated_at = excluded.updated_at
            WHERE configuration.status = 'DRAFT'
            "#,
            params![
                configuration.configuration_id,
                configuration.category_id,
                configuration.supplier_id,
                snapshot_json,
                configuration.created_at,
                configuration.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::ImmutableRecord {
                entity: "Configuration".to_string(),
                id: configuration.configuration_id.clone(),
            });
        }

        replace_values(&tx, &configuration.configuration_id, &configuration.values)?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 签发: 写入快照并置为 ISSUED（单事务）
    pub fn mark_issued(
        &self,
        configuration_id: &str,
        snapshot: &[ParameterSnapshot],
        issued_at: NaiveDateTime,
    ) -> RepositoryResult<()> {
        let snapshot_json = serde_json::to_string(snapshot)?;

        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let status: Option<String> = tx
            .query_row(
                "SELECT status FROM configuration WHERE configuration_id = ?1",
                params![configuration_id],
                |row| row.get(0),
            )
            .optional()?;
        match status.as_deref() {
            None => {
                return Err(RepositoryError::NotFound {
                    entity: "Configuration".to_string(),
                    id: configuration_id.to_string(),
                })
            }
            Some("DRAFT") => {}
            Some(_) => {
                return Err(RepositoryError::ImmutableRecord {
                    entity: "Configuration".to_string(),
                    id: configuration_id.to_string(),
                })
            }
        }

        tx.execute(
            r#"
            UPDATE configuration
            SET status = 'ISSUED', snapshot_json = ?2, issued_at = ?3, updated_at = ?3
            WHERE configuration_id = ?1 AND status = 'DRAFT'
            "#,
            params![configuration_id, snapshot_json, issued_at],
        )?;
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    /// 按主键查询（含取值与快照）
    pub fn find_by_id(&self, configuration_id: &str) -> RepositoryResult<Option<Configuration>> {
        let conn = self.get_conn()?;

        let header = conn
            .query_row(
                r#"
                SELECT configuration_id, category_id, supplier_id, status,
                       snapshot_json, created_at, updated_at, issued_at
                FROM configuration WHERE configuration_id = ?1
                "#,
                params![configuration_id],
                |row| {
                    let status_raw: String = row.get(3)?;
                    let status = ConfigurationStatus::from_db_str(&status_raw)
                        .ok_or_else(|| invalid_enum(3, &status_raw))?;
                    Ok((
                        Configuration {
                            configuration_id: row.get(0)?,
                            category_id: row.get(1)?,
                            supplier_id: row.get(2)?,
                            values: ConfigurationValues::new(),
                            status,
                            snapshot: Vec::new(),
                            created_at: row.get(5)?,
                            updated_at: row.get(6)?,
                            issued_at: row.get(7)?,
                        },
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()
            .map_err(lift_row_error)?;

        let (mut configuration, snapshot_json) = match header {
            Some(h) => h,
            None => return Ok(None),
        };

        if let Some(json) = snapshot_json {
            configuration.snapshot = serde_json::from_str(&json)?;
        }

        let mut stmt = conn.prepare(
            "SELECT parameter_id, value_json FROM configuration_value WHERE configuration_id = ?1",
        )?;
        let rows = stmt
            .query_map(params![configuration_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        for (parameter_id, value_json) in rows {
            let value: serde_json::Value = serde_json::from_str(&value_json)?;
            configuration.values.insert(parameter_id, value);
        }

        Ok(Some(configuration))
    }

    /// 统计历史上使用过该参数的配置数
    pub fn count_usage_of_parameter(&self, parameter_id: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM configuration_value WHERE parameter_id = ?1",
            params![parameter_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn replace_values(
    tx: &Transaction<'_>,
    configuration_id: &str,
    values: &ConfigurationValues,
) -> RepositoryResult<()> {
    tx.execute(
        "DELETE FROM configuration_value WHERE configuration_id = ?1",
        params![configuration_id],
    )?;
    let mut stmt = tx.prepare(
        "INSERT INTO configuration_value (configuration_id, parameter_id, value_json) VALUES (?1, ?2, ?3)",
    )?;
    for (parameter_id, value) in values {
        let value_json = serde_json::to_string(value)?;
        stmt.execute(params![configuration_id, parameter_id, value_json])?;
    }
    Ok(())
}
