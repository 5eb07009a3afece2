// ==========================================
// 产品参数配置引擎 - 参数目录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: parameter / parameter_value 表的 CRUD
// 说明: is_global 由 CategoryBindingRepository 在绑定事务中维护，
//       本仓储只在新建时写入初始值 1
// ==========================================

use crate::domain::parameter::{ColorMeta, LocalizedText, Parameter, ParameterValue};
use crate::domain::types::{ParameterKind, SystemRole};
use crate::repository::error::{invalid_enum, lift_row_error, RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const PARAMETER_COLUMNS: &str = r#"
    parameter_id, name_ru, name_it, kind, unit,
    min_value, max_value, step_value,
    is_system, system_role, is_global,
    created_at, updated_at
"#;

const VALUE_COLUMNS: &str = r#"
    value_id, parameter_id, raw_value, text_ru, text_it,
    display_name, color_hex, color_code, sort_order, is_active, created_at
"#;

// ==========================================
// ParameterRepository - 参数目录仓储
// ==========================================
pub struct ParameterRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ParameterRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 参数
    // ==========================================

    /// 新建参数（is_global 初始为 1，可选值另行写入）
    pub fn insert(&self, parameter: &Parameter) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO parameter (
                parameter_id, name_ru, name_it, kind, unit,
                min_value, max_value, step_value,
                is_system, system_role, is_global,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1, ?11, ?12)
            "#,
            params![
                parameter.parameter_id,
                parameter.name.ru,
                parameter.name.it,
                parameter.kind.to_db_str(),
                parameter.unit,
                parameter.min_value,
                parameter.max_value,
                parameter.step_value,
                parameter.is_system,
                parameter.system_role.map(|r| r.to_db_str()),
                parameter.created_at,
                parameter.updated_at,
            ],
        )?;
        Ok(())
    }

    /// 更新参数的定义字段（不触碰 is_global / is_system）
    pub fn update(&self, parameter: &Parameter) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            r#"
            UPDATE parameter SET
                name_ru = ?2, name_it = ?3, kind = ?4, unit = ?5,
                min_value = ?6, max_value = ?7, step_value = ?8,
                updated_at = ?9
            WHERE parameter_id = ?1
            "#,
            params![
                parameter.parameter_id,
                parameter.name.ru,
                parameter.name.it,
                parameter.kind.to_db_str(),
                parameter.unit,
                parameter.min_value,
                parameter.max_value,
                parameter.step_value,
                parameter.updated_at,
            ],
        )?;
        if changed == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Parameter".to_string(),
                id: parameter.parameter_id.clone(),
            });
        }
        Ok(())
    }

    /// 按主键查询（含全部可选值）
    pub fn find_by_id(&self, parameter_id: &str) -> RepositoryResult<Option<Parameter>> {
        let conn = self.get_conn()?;
        load_parameter(&conn, parameter_id)
    }

    /// 查询全部参数（按创建时间、id 排序，含可选值）
    pub fn list_all(&self) -> RepositoryResult<Vec<Parameter>> {
        let conn = self.get_conn()?;
        load_parameters(&conn, "1 = 1", &[])
    }

    /// 查询全局参数（无任何类目绑定）
    pub fn list_global(&self) -> RepositoryResult<Vec<Parameter>> {
        let conn = self.get_conn()?;
        load_parameters(&conn, "is_global = 1", &[])
    }

    /// 查询全部参数的双语名称（名称唯一性检查用）
    pub fn list_names(&self) -> RepositoryResult<Vec<(String, LocalizedText)>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT parameter_id, name_ru, name_it FROM parameter")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    LocalizedText::new(row.get::<_, String>(1)?, row.get::<_, String>(2)?),
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// 删除参数（可选值、供应商覆写级联删除）
    pub fn delete(&self, parameter_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "DELETE FROM parameter WHERE parameter_id = ?1",
            params![parameter_id],
        )?;
        Ok(changed)
    }

    // ==========================================
    // 可选值
    // ==========================================

    /// 写入可选值
    ///
    /// # 参数
    /// - value: 可选值（sort_order 字段被忽略，由本方法决定）
    /// - normalized: 规范化文本（唯一索引列）
    /// - position: 显式位置；Some 时将 >= position 的值整体后移一位
    ///
    /// # 返回
    /// - Ok(i32): 最终 sort_order
    pub fn insert_value(
        &self,
        value: &ParameterValue,
        normalized: &str,
        position: Option<i32>,
    ) -> RepositoryResult<i32> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let max: Option<i32> = tx.query_row(
            "SELECT MAX(sort_order) FROM parameter_value WHERE parameter_id = ?1",
            params![value.parameter_id],
            |row| row.get(0),
        )?;
        let next = max.map(|m| m + 1).unwrap_or(0);

        // 超出末尾的位置按追加处理，不留空洞
        let sort_order = match position {
            Some(pos) if pos < next => {
                tx.execute(
                    r#"
                    UPDATE parameter_value SET sort_order = sort_order + 1
                    WHERE parameter_id = ?1 AND sort_order >= ?2
                    "#,
                    params![value.parameter_id, pos],
                )?;
                pos
            }
            _ => next,
        };

        tx.execute(
            r#"
            INSERT INTO parameter_value (
                value_id, parameter_id, raw_value, normalized_value,
                text_ru, text_it, display_name, color_hex, color_code,
                sort_order, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
            params![
                value.value_id,
                value.parameter_id,
                value.raw_value,
                normalized,
                value.text.ru,
                value.text.it,
                value.display_name,
                value.color.as_ref().map(|c| c.hex.as_str()),
                value.color.as_ref().and_then(|c| c.standard_code.as_deref()),
                sort_order,
                value.is_active,
                value.created_at,
            ],
        )?;

        tx.commit()?;
        Ok(sort_order)
    }

    /// 按主键查询可选值
    pub fn find_value(&self, value_id: &str) -> RepositoryResult<Option<ParameterValue>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM parameter_value WHERE value_id = ?1", VALUE_COLUMNS);
        let value = conn
            .query_row(&sql, params![value_id], map_value_row)
            .optional()?;
        Ok(value)
    }

    /// 查找规范化文本相同的启用值
    pub fn find_active_value_by_normalized(
        &self,
        parameter_id: &str,
        normalized: &str,
    ) -> RepositoryResult<Option<ParameterValue>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM parameter_value WHERE parameter_id = ?1 AND normalized_value = ?2 AND is_active = 1",
            VALUE_COLUMNS
        );
        let value = conn
            .query_row(&sql, params![parameter_id, normalized], map_value_row)
            .optional()?;
        Ok(value)
    }

    /// 读取可选值的规范化文本
    pub fn value_normalized(&self, value_id: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let normalized = conn
            .query_row(
                "SELECT normalized_value FROM parameter_value WHERE value_id = ?1",
                params![value_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(normalized)
    }

    /// 设置可选值启用状态（软删除 / 恢复，单行更新）
    pub fn set_value_active(&self, value_id: &str, active: bool) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let changed = conn.execute(
            "UPDATE parameter_value SET is_active = ?2 WHERE value_id = ?1",
            params![value_id, active],
        )?;
        Ok(changed)
    }

    /// 参数是否存在任意可选值（含停用值）
    pub fn has_values(&self, parameter_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM parameter_value WHERE parameter_id = ?1",
            params![parameter_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// 按给定顺序重写可选值 sort_order（0..n，单事务）
    pub fn reorder_values(&self, parameter_id: &str, ordered_value_ids: &[String]) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for (idx, value_id) in ordered_value_ids.iter().enumerate() {
            let changed = tx.execute(
                "UPDATE parameter_value SET sort_order = ?3 WHERE parameter_id = ?1 AND value_id = ?2",
                params![parameter_id, value_id, idx as i32],
            )?;
            if changed == 0 {
                return Err(RepositoryError::NotFound {
                    entity: "ParameterValue".to_string(),
                    id: value_id.clone(),
                });
            }
        }
        tx.commit()?;
        Ok(())
    }
}

// ==========================================
// 行映射（供其他仓储在同一连接/事务内复用）
// ==========================================

pub(crate) fn load_parameter(conn: &Connection, parameter_id: &str) -> RepositoryResult<Option<Parameter>> {
    let sql = format!("SELECT {} FROM parameter WHERE parameter_id = ?1", PARAMETER_COLUMNS);
    let parameter = conn
        .query_row(&sql, params![parameter_id], map_parameter_row)
        .optional()
        .map_err(lift_row_error)?;

    match parameter {
        Some(mut p) => {
            p.values = load_values(conn, &p.parameter_id)?;
            Ok(Some(p))
        }
        None => Ok(None),
    }
}

pub(crate) fn load_parameters(
    conn: &Connection,
    where_clause: &str,
    args: &[&dyn rusqlite::ToSql],
) -> RepositoryResult<Vec<Parameter>> {
    let sql = format!(
        "SELECT {} FROM parameter WHERE {} ORDER BY created_at ASC, parameter_id ASC",
        PARAMETER_COLUMNS, where_clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut parameters = stmt
        .query_map(args, map_parameter_row)?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(lift_row_error)?;

    for p in parameters.iter_mut() {
        p.values = load_values(conn, &p.parameter_id)?;
    }
    Ok(parameters)
}

fn load_values(conn: &Connection, parameter_id: &str) -> RepositoryResult<Vec<ParameterValue>> {
    let sql = format!(
        "SELECT {} FROM parameter_value WHERE parameter_id = ?1 ORDER BY sort_order ASC, created_at ASC",
        VALUE_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let values = stmt
        .query_map(params![parameter_id], map_value_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(values)
}

fn map_parameter_row(row: &Row<'_>) -> rusqlite::Result<Parameter> {
    let kind_raw: String = row.get(3)?;
    let kind = ParameterKind::from_db_str(&kind_raw).ok_or_else(|| invalid_enum(3, &kind_raw))?;

    let role_raw: Option<String> = row.get(9)?;
    let system_role = match role_raw {
        Some(raw) => Some(SystemRole::from_db_str(&raw).ok_or_else(|| invalid_enum(9, &raw))?),
        None => None,
    };

    Ok(Parameter {
        parameter_id: row.get(0)?,
        name: LocalizedText::new(row.get::<_, String>(1)?, row.get::<_, String>(2)?),
        kind,
        unit: row.get(4)?,
        min_value: row.get(5)?,
        max_value: row.get(6)?,
        step_value: row.get(7)?,
        is_system: row.get(8)?,
        system_role,
        is_global: row.get(10)?,
        values: Vec::new(),
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn map_value_row(row: &Row<'_>) -> rusqlite::Result<ParameterValue> {
    let color_hex: Option<String> = row.get(6)?;
    let color_code: Option<String> = row.get(7)?;
    Ok(ParameterValue {
        value_id: row.get(0)?,
        parameter_id: row.get(1)?,
        raw_value: row.get(2)?,
        text: LocalizedText::new(row.get::<_, String>(3)?, row.get::<_, String>(4)?),
        display_name: row.get(5)?,
        color: color_hex.map(|hex| ColorMeta {
            hex,
            standard_code: color_code,
        }),
        sort_order: row.get(8)?,
        is_active: row.get(9)?,
        created_at: row.get(10)?,
    })
}
