// ==========================================
// 产品参数配置引擎 - 类目/供应商目录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 说明: 类目与供应商为外部主数据，这里只保存引擎需要的标签投影
// ==========================================

use crate::domain::directory::{CategoryRecord, SupplierRecord};
use crate::domain::parameter::LocalizedText;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct DirectoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DirectoryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入或更新类目
    pub fn upsert_category(&self, category: &CategoryRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO category (category_id, name_ru, name_it, dimension_unit)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(category_id) DO UPDATE SET
                name_ru = excluded.name_ru,
                name_it = excluded.name_it,
                dimension_unit = excluded.dimension_unit
            "#,
            params![
                category.category_id,
                category.name.ru,
                category.name.it,
                category.dimension_unit,
            ],
        )?;
        Ok(())
    }

    pub fn find_category(&self, category_id: &str) -> RepositoryResult<Option<CategoryRecord>> {
        let conn = self.get_conn()?;
        let category = conn
            .query_row(
                "SELECT category_id, name_ru, name_it, dimension_unit FROM category WHERE category_id = ?1",
                params![category_id],
                |row| {
                    Ok(CategoryRecord {
                        category_id: row.get(0)?,
                        name: LocalizedText::new(row.get::<_, String>(1)?, row.get::<_, String>(2)?),
                        dimension_unit: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(category)
    }

    /// 写入或更新供应商
    pub fn upsert_supplier(&self, supplier: &SupplierRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO supplier (supplier_id, name, short_name)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(supplier_id) DO UPDATE SET
                name = excluded.name,
                short_name = excluded.short_name
            "#,
            params![supplier.supplier_id, supplier.name, supplier.short_name],
        )?;
        Ok(())
    }

    pub fn find_supplier(&self, supplier_id: &str) -> RepositoryResult<Option<SupplierRecord>> {
        let conn = self.get_conn()?;
        let supplier = conn
            .query_row(
                "SELECT supplier_id, name, short_name FROM supplier WHERE supplier_id = ?1",
                params![supplier_id],
                |row| {
                    Ok(SupplierRecord {
                        supplier_id: row.get(0)?,
                        name: row.get(1)?,
                        short_name: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(supplier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_and_find() {
        let conn = crate::db::open_in_memory().unwrap();
        let repo = DirectoryRepository::new(Arc::new(Mutex::new(conn)));

        repo.upsert_category(&CategoryRecord {
            category_id: "windows".to_string(),
            name: LocalizedText::new("Окна", "Finestre"),
            dimension_unit: Some("mm".to_string()),
        })
        .unwrap();
        repo.upsert_supplier(&SupplierRecord {
            supplier_id: "S".to_string(),
            name: "Serramenti Rossi".to_string(),
            short_name: None,
        })
        .unwrap();

        let category = repo.find_category("windows").unwrap().unwrap();
        assert_eq!(category.name.it, "Finestre");
        assert_eq!(category.dimension_unit.as_deref(), Some("mm"));
        assert_eq!(repo.find_supplier("S").unwrap().unwrap().label(), "Serramenti Rossi");
        assert!(repo.find_category("doors").unwrap().is_none());
    }
}
