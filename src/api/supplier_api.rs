// ==========================================
// 产品参数配置引擎 - 供应商覆写 API
// ==========================================
// 职责: 维护供应商覆写，计算单个参数的有效约束
// 规则: 自定义值仅限 SELECT/COLOR；范围仅限 NUMBER；min ≤ max
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator;
use crate::config::EngineConfig;
use crate::domain::parameter::Parameter;
use crate::domain::supplier_override::{EffectiveConstraints, SupplierOverride, SupplierOverrideInput};
use crate::engine::override_resolver::SupplierOverrideResolver;
use crate::repository::directory_repo::DirectoryRepository;
use crate::repository::parameter_repo::ParameterRepository;
use crate::repository::supplier_override_repo::SupplierOverrideRepository;

// ==========================================
// SupplierApi - 供应商覆写 API
// ==========================================
pub struct SupplierApi {
    override_repo: Arc<SupplierOverrideRepository>,
    parameter_repo: Arc<ParameterRepository>,
    directory_repo: Arc<DirectoryRepository>,
    resolver: SupplierOverrideResolver,
}

impl SupplierApi {
    pub fn new(
        override_repo: Arc<SupplierOverrideRepository>,
        parameter_repo: Arc<ParameterRepository>,
        directory_repo: Arc<DirectoryRepository>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            override_repo,
            parameter_repo,
            directory_repo,
            resolver: SupplierOverrideResolver::new(config),
        }
    }

    /// 设置覆写（每个 供应商×参数 至多一条，重复设置即替换）
    pub fn set_override(
        &self,
        supplier_id: &str,
        parameter_id: &str,
        input: SupplierOverrideInput,
    ) -> ApiResult<SupplierOverride> {
        self.ensure_supplier(supplier_id)?;
        let parameter = self.load_parameter(parameter_id)?;
        validator::into_result(validator::check_override(parameter.kind, &input))?;

        let custom_values = input.custom_values.map(|values| {
            values
                .into_iter()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
        });

        let record = SupplierOverride {
            supplier_id: supplier_id.to_string(),
            parameter_id: parameter_id.to_string(),
            custom_values,
            min_value: input.min_value,
            max_value: input.max_value,
            is_available: input.is_available,
            updated_at: Utc::now().naive_utc(),
        };
        self.override_repo.upsert(&record)?;
        info!(
            supplier_id = %supplier_id,
            parameter_id = %parameter_id,
            is_available = record.is_available,
            "供应商覆写已保存"
        );
        Ok(record)
    }

    pub fn remove_override(&self, supplier_id: &str, parameter_id: &str) -> ApiResult<()> {
        let changed = self.override_repo.delete(supplier_id, parameter_id)?;
        if changed == 0 {
            return Err(ApiError::NotFound(format!(
                "供应商覆写(supplier_id={}, parameter_id={})不存在",
                supplier_id, parameter_id
            )));
        }
        info!(supplier_id = %supplier_id, parameter_id = %parameter_id, "供应商覆写已删除");
        Ok(())
    }

    pub fn list_overrides_for_supplier(&self, supplier_id: &str) -> ApiResult<Vec<SupplierOverride>> {
        Ok(self.override_repo.list_by_supplier(supplier_id)?)
    }

    /// 有效约束（基础定义 + 可选覆写）
    pub fn effective_constraints(&self, supplier_id: &str, parameter_id: &str) -> ApiResult<EffectiveConstraints> {
        self.ensure_supplier(supplier_id)?;
        let parameter = self.load_parameter(parameter_id)?;
        let supplier_override = self.override_repo.find(supplier_id, parameter_id)?;
        Ok(self.resolver.resolve(&parameter, supplier_override.as_ref()))
    }

    fn ensure_supplier(&self, supplier_id: &str) -> ApiResult<()> {
        match self.directory_repo.find_supplier(supplier_id)? {
            Some(_) => Ok(()),
            None => Err(ApiError::NotFound(format!("供应商(id={})不存在", supplier_id))),
        }
    }

    fn load_parameter(&self, parameter_id: &str) -> ApiResult<Parameter> {
        self.parameter_repo
            .find_by_id(parameter_id)?
            .ok_or_else(|| ApiError::NotFound(format!("参数(id={})不存在", parameter_id)))
    }
}
