// ==========================================
// 产品参数配置引擎 - 类目绑定 API
// ==========================================
// 职责: 绑定/解绑/更新绑定，计算类目有效参数集
// 红线: 绑定写入与 is_global 重算在仓储层同一事务内完成
// ==========================================

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator;
use crate::domain::binding::{BindingOverrides, BindingPatch, CategoryBinding, EffectiveParameter};
use crate::domain::parameter::Parameter;
use crate::engine::effective_set::build_effective_parameters;
use crate::repository::binding_repo::CategoryBindingRepository;
use crate::repository::directory_repo::DirectoryRepository;
use crate::repository::parameter_repo::ParameterRepository;

// ==========================================
// BindingApi - 类目绑定 API
// ==========================================
pub struct BindingApi {
    binding_repo: Arc<CategoryBindingRepository>,
    parameter_repo: Arc<ParameterRepository>,
    directory_repo: Arc<DirectoryRepository>,
}

impl BindingApi {
    pub fn new(
        binding_repo: Arc<CategoryBindingRepository>,
        parameter_repo: Arc<ParameterRepository>,
        directory_repo: Arc<DirectoryRepository>,
    ) -> Self {
        Self {
            binding_repo,
            parameter_repo,
            directory_repo,
        }
    }

    /// 绑定参数到类目
    ///
    /// # 错误
    /// - NotFound: 类目或参数不存在
    /// - Conflict: 已绑定（请使用 update_binding）
    /// - ValidationFailed: 列表型参数的默认值不是启用值
    pub fn bind(
        &self,
        category_id: &str,
        parameter_id: &str,
        overrides: BindingOverrides,
    ) -> ApiResult<CategoryBinding> {
        self.ensure_category(category_id)?;
        let parameter = self.load_parameter(parameter_id)?;

        if self.binding_repo.find(category_id, parameter_id)?.is_some() {
            return Err(ApiError::Conflict(format!(
                "参数(id={})已绑定到类目(id={})",
                parameter_id, category_id
            )));
        }
        validator::into_result(validator::check_binding_default(
            &parameter,
            overrides.default_value.as_deref(),
        ))?;

        let now = Utc::now().naive_utc();
        let mut binding = CategoryBinding {
            category_id: category_id.to_string(),
            parameter_id: parameter_id.to_string(),
            is_required: overrides.is_required,
            is_visible: overrides.is_visible,
            sort_order: 0,
            display_name_ru: overrides.display_name_ru,
            display_name_it: overrides.display_name_it,
            default_value: overrides.default_value,
            help_text: overrides.help_text,
            created_at: now,
            updated_at: now,
        };

        let outcome = self.binding_repo.insert(&binding, overrides.sort_order)?;
        binding.sort_order = outcome.sort_order;
        info!(
            category_id = %category_id,
            parameter_id = %parameter_id,
            sort_order = outcome.sort_order,
            is_global = outcome.is_global,
            "参数已绑定"
        );
        Ok(binding)
    }

    /// 解绑
    ///
    /// # 返回
    /// - Ok(bool): 解绑后参数的 is_global（最后一个绑定被移除时为 true）
    pub fn unbind(&self, category_id: &str, parameter_id: &str) -> ApiResult<bool> {
        match self.binding_repo.delete(category_id, parameter_id)? {
            Some(is_global) => {
                info!(
                    category_id = %category_id,
                    parameter_id = %parameter_id,
                    is_global,
                    "参数已解绑"
                );
                Ok(is_global)
            }
            None => Err(ApiError::NotFound(format!(
                "绑定(category_id={}, parameter_id={})不存在",
                category_id, parameter_id
            ))),
        }
    }

    /// 更新绑定覆写字段
    pub fn update_binding(
        &self,
        category_id: &str,
        parameter_id: &str,
        patch: BindingPatch,
    ) -> ApiResult<CategoryBinding> {
        let mut binding = self
            .binding_repo
            .find(category_id, parameter_id)?
            .ok_or_else(|| {
                ApiError::NotFound(format!(
                    "绑定(category_id={}, parameter_id={})不存在",
                    category_id, parameter_id
                ))
            })?;

        if let Some(required) = patch.is_required {
            binding.is_required = required;
        }
        if let Some(visible) = patch.is_visible {
            binding.is_visible = visible;
        }
        if let Some(order) = patch.sort_order {
            binding.sort_order = order;
        }
        if let Some(name) = patch.display_name_ru {
            binding.display_name_ru = name;
        }
        if let Some(name) = patch.display_name_it {
            binding.display_name_it = name;
        }
        if let Some(default) = patch.default_value {
            binding.default_value = default;
        }
        if let Some(help) = patch.help_text {
            binding.help_text = help;
        }
        binding.updated_at = Utc::now().naive_utc();

        let parameter = self.load_parameter(parameter_id)?;
        validator::into_result(validator::check_binding_default(
            &parameter,
            binding.default_value.as_deref(),
        ))?;

        self.binding_repo.update(&binding)?;
        debug!(category_id = %category_id, parameter_id = %parameter_id, "绑定已更新");
        Ok(binding)
    }

    pub fn list_bindings_for_category(&self, category_id: &str) -> ApiResult<Vec<CategoryBinding>> {
        Ok(self.binding_repo.list_by_category(category_id)?)
    }

    pub fn list_bindings_for_parameter(&self, parameter_id: &str) -> ApiResult<Vec<CategoryBinding>> {
        Ok(self.binding_repo.list_by_parameter(parameter_id)?)
    }

    /// 类目有效参数集（全局参数 ∪ 绑定参数，有序）
    pub fn effective_parameters_for(&self, category_id: &str) -> ApiResult<Vec<EffectiveParameter>> {
        self.ensure_category(category_id)?;
        let view = self.binding_repo.load_category_view(category_id)?;
        Ok(build_effective_parameters(&view))
    }

    fn ensure_category(&self, category_id: &str) -> ApiResult<()> {
        match self.directory_repo.find_category(category_id)? {
            Some(_) => Ok(()),
            None => Err(ApiError::NotFound(format!("类目(id={})不存在", category_id))),
        }
    }

    fn load_parameter(&self, parameter_id: &str) -> ApiResult<Parameter> {
        self.parameter_repo
            .find_by_id(parameter_id)?
            .ok_or_else(|| ApiError::NotFound(format!("参数(id={})不存在", parameter_id)))
    }
}
