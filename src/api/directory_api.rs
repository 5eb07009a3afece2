// ==========================================
// 产品参数配置引擎 - 类目/供应商目录 API
// ==========================================
// 职责: 登记外部主数据的标签投影，供 NotFound 判定与描述渲染使用
// ==========================================

use std::sync::Arc;

use tracing::debug;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::directory::{CategoryRecord, SupplierRecord};
use crate::domain::validation::ValidationIssue;
use crate::i18n::localized;
use crate::repository::directory_repo::DirectoryRepository;

pub struct DirectoryApi {
    directory_repo: Arc<DirectoryRepository>,
}

impl DirectoryApi {
    pub fn new(directory_repo: Arc<DirectoryRepository>) -> Self {
        Self { directory_repo }
    }

    /// 登记/更新类目
    pub fn upsert_category(&self, category: CategoryRecord) -> ApiResult<CategoryRecord> {
        if category.category_id.trim().is_empty()
            || category.name.ru.trim().is_empty()
            || category.name.it.trim().is_empty()
        {
            return Err(name_required());
        }
        self.directory_repo.upsert_category(&category)?;
        debug!(category_id = %category.category_id, "类目已登记");
        Ok(category)
    }

    pub fn get_category(&self, category_id: &str) -> ApiResult<CategoryRecord> {
        self.directory_repo
            .find_category(category_id)?
            .ok_or_else(|| ApiError::NotFound(format!("类目(id={})不存在", category_id)))
    }

    /// 登记/更新供应商
    pub fn upsert_supplier(&self, supplier: SupplierRecord) -> ApiResult<SupplierRecord> {
        if supplier.supplier_id.trim().is_empty() || supplier.name.trim().is_empty() {
            return Err(name_required());
        }
        self.directory_repo.upsert_supplier(&supplier)?;
        debug!(supplier_id = %supplier.supplier_id, "供应商已登记");
        Ok(supplier)
    }

    pub fn get_supplier(&self, supplier_id: &str) -> ApiResult<SupplierRecord> {
        self.directory_repo
            .find_supplier(supplier_id)?
            .ok_or_else(|| ApiError::NotFound(format!("供应商(id={})不存在", supplier_id)))
    }
}

fn name_required() -> ApiError {
    ApiError::validation(vec![ValidationIssue {
        field: "name".to_string(),
        code: "name_required".to_string(),
        message: localized("catalog.name_required", &[]),
    }])
}
