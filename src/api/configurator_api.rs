// ==========================================
// 产品参数配置引擎 - 配置 API
// ==========================================
// 职责: 配置校验、描述渲染、草稿保存与签发
// 流程: 目录定义 → 有效约束 → 校验 → 渲染（单向）
// 红线: 已签发配置不可修改；签发时捕获参数快照
// 红线: 已签发配置按快照渲染；草稿按当前目录渲染，缺失参数回退到快照
// ==========================================

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::config::EngineConfig;
use crate::domain::binding::EffectiveParameter;
use crate::domain::configuration::{Configuration, ConfigurationDraft, ConfigurationValues, ParameterSnapshot};
use crate::domain::supplier_override::SupplierOverride;
use crate::domain::types::{ConfigurationStatus, Locale};
use crate::domain::validation::ValidationResult;
use crate::engine::config_validator::{ConfigurationValidator, ConstrainedParameter};
use crate::engine::description::{DescriptionGenerator, DescriptionLabels};
use crate::engine::effective_set::build_effective_parameters;
use crate::engine::normalize::is_empty_value;
use crate::engine::override_resolver::SupplierOverrideResolver;
use crate::engine::snapshot::{capture_snapshot, restore_all, restore_effective};
use crate::repository::binding_repo::CategoryBindingRepository;
use crate::repository::configuration_repo::ConfigurationRepository;
use crate::repository::directory_repo::DirectoryRepository;
use crate::repository::supplier_override_repo::SupplierOverrideRepository;

// ==========================================
// ConfiguratorApi - 配置 API
// ==========================================
pub struct ConfiguratorApi {
    binding_repo: Arc<CategoryBindingRepository>,
    override_repo: Arc<SupplierOverrideRepository>,
    configuration_repo: Arc<ConfigurationRepository>,
    directory_repo: Arc<DirectoryRepository>,
    resolver: SupplierOverrideResolver,
    generator: DescriptionGenerator,
}

impl ConfiguratorApi {
    pub fn new(
        binding_repo: Arc<CategoryBindingRepository>,
        override_repo: Arc<SupplierOverrideRepository>,
        configuration_repo: Arc<ConfigurationRepository>,
        directory_repo: Arc<DirectoryRepository>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            binding_repo,
            override_repo,
            configuration_repo,
            directory_repo,
            resolver: SupplierOverrideResolver::new(config),
            generator: DescriptionGenerator::new(config),
        }
    }

    // ==========================================
    // 校验
    // ==========================================

    /// 校验一组取值
    ///
    /// # 返回
    /// - Ok(ValidationResult): 累积的全部问题（未选类目/供应商时仅含选择问题）
    ///
    /// # 错误
    /// - NotFound: 类目或供应商不存在
    pub fn validate(
        &self,
        values: &ConfigurationValues,
        category_id: Option<&str>,
        supplier_id: Option<&str>,
    ) -> ApiResult<ValidationResult> {
        let selection = ConfigurationValidator::check_selection(category_id, supplier_id);
        let (Some(category_id), Some(supplier_id), true) = (category_id, supplier_id, selection.is_empty()) else {
            return Ok(ValidationResult::from_issues(selection));
        };

        if self.directory_repo.find_category(category_id)?.is_none() {
            return Err(ApiError::NotFound(format!("类目(id={})不存在", category_id)));
        }
        if self.directory_repo.find_supplier(supplier_id)?.is_none() {
            return Err(ApiError::NotFound(format!("供应商(id={})不存在", supplier_id)));
        }

        let parameters = self.constrained_parameters(category_id, supplier_id)?;
        let result = ConfigurationValidator::validate(values, Some(category_id), Some(supplier_id), &parameters);
        debug!(
            category_id = %category_id,
            supplier_id = %supplier_id,
            errors = result.errors.len(),
            "配置校验完成"
        );
        Ok(result)
    }

    pub fn validate_configuration(&self, configuration: &Configuration) -> ApiResult<ValidationResult> {
        self.validate(
            &configuration.values,
            configuration.category_id.as_deref(),
            configuration.supplier_id.as_deref(),
        )
    }

    /// 有效参数 + 该供应商下的有效约束
    pub fn constrained_parameters(
        &self,
        category_id: &str,
        supplier_id: &str,
    ) -> ApiResult<Vec<ConstrainedParameter>> {
        let effective = self.live_effective(Some(category_id))?;
        let overrides: HashMap<String, SupplierOverride> = self
            .override_repo
            .list_by_supplier(supplier_id)?
            .into_iter()
            .map(|o| (o.parameter_id.clone(), o))
            .collect();

        Ok(effective
            .into_iter()
            .map(|item| {
                let constraints = self
                    .resolver
                    .resolve(&item.parameter, overrides.get(item.parameter_id()));
                ConstrainedParameter {
                    effective: item,
                    constraints,
                }
            })
            .collect())
    }

    // ==========================================
    // 渲染
    // ==========================================

    /// 按当前目录渲染一组取值（不校验）
    pub fn describe(
        &self,
        values: &ConfigurationValues,
        category_id: Option<&str>,
        supplier_id: Option<&str>,
        locale: Locale,
    ) -> ApiResult<String> {
        let labels = self.labels(category_id, supplier_id)?;
        let effective = self.live_effective(category_id)?;
        Ok(self.generator.describe(values, &labels, &effective, locale))
    }

    /// 渲染已保存的配置
    pub fn describe_configuration(&self, configuration_id: &str, locale: Locale) -> ApiResult<String> {
        let configuration = self.get_configuration(configuration_id)?;
        let labels = self.labels(
            configuration.category_id.as_deref(),
            configuration.supplier_id.as_deref(),
        )?;

        let effective = if configuration.is_issued() {
            restore_all(&configuration.snapshot, &configuration.values, configuration.created_at)
        } else {
            let mut live = self.live_effective(configuration.category_id.as_deref())?;
            let present: HashSet<String> = live.iter().map(|e| e.parameter_id().to_string()).collect();
            for snapshot in &configuration.snapshot {
                let filled = !is_empty_value(configuration.values.get(snapshot.parameter_id.as_str()));
                if filled && !present.contains(&snapshot.parameter_id) {
                    warn!(
                        configuration_id = %configuration_id,
                        parameter_id = %snapshot.parameter_id,
                        "参数已不在目录中，使用快照渲染"
                    );
                    live.push(restore_effective(snapshot, &configuration.values, configuration.updated_at));
                }
            }
            live
        };

        Ok(self
            .generator
            .describe(&configuration.values, &labels, &effective, locale))
    }

    // ==========================================
    // 生命周期
    // ==========================================

    /// 保存草稿（新建或整体替换）
    ///
    /// 草稿可以不完整，保存时不校验；同时刷新参数快照，
    /// 保留目录中已不存在但仍有取值的旧快照条目
    ///
    /// # 错误
    /// - Conflict: 配置已签发
    pub fn save_draft(&self, draft: ConfigurationDraft) -> ApiResult<Configuration> {
        let configuration_id = draft
            .configuration_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let existing = self.configuration_repo.find_by_id(&configuration_id)?;
        if let Some(existing) = &existing {
            if existing.is_issued() {
                return Err(ApiError::Conflict(format!(
                    "配置(id={})已签发，不可修改",
                    configuration_id
                )));
            }
        }

        let now = Utc::now().naive_utc();
        let effective = self.live_effective(draft.category_id.as_deref())?;
        let mut snapshot = capture_snapshot(&effective, &draft.values);
        if let Some(existing) = &existing {
            snapshot.extend(carry_over_snapshot(&existing.snapshot, &snapshot, &draft.values));
        }

        let configuration = Configuration {
            configuration_id: configuration_id.clone(),
            category_id: draft.category_id,
            supplier_id: draft.supplier_id,
            values: draft.values,
            status: ConfigurationStatus::Draft,
            snapshot,
            created_at: existing.as_ref().map(|c| c.created_at).unwrap_or(now),
            updated_at: now,
            issued_at: None,
        };
        self.configuration_repo.save_draft(&configuration)?;
        debug!(configuration_id = %configuration_id, values = configuration.values.len(), "草稿已保存");
        Ok(configuration)
    }

    /// 签发配置: 校验通过后捕获快照并置为 ISSUED
    ///
    /// # 错误
    /// - NotFound: 配置不存在
    /// - Conflict: 已签发
    /// - ValidationFailed: 校验未通过
    pub fn issue(&self, configuration_id: &str) -> ApiResult<Configuration> {
        let configuration = self.get_configuration(configuration_id)?;
        if configuration.is_issued() {
            return Err(ApiError::Conflict(format!(
                "配置(id={})已签发",
                configuration_id
            )));
        }

        let result = self.validate_configuration(&configuration)?;
        if !result.valid {
            return Err(ApiError::validation(result.errors));
        }

        let effective = self.live_effective(configuration.category_id.as_deref())?;
        let snapshot = capture_snapshot(&effective, &configuration.values);
        self.configuration_repo
            .mark_issued(configuration_id, &snapshot, Utc::now().naive_utc())?;
        info!(
            configuration_id = %configuration_id,
            parameters = snapshot.len(),
            "配置已签发"
        );
        self.get_configuration(configuration_id)
    }

    pub fn get_configuration(&self, configuration_id: &str) -> ApiResult<Configuration> {
        self.configuration_repo
            .find_by_id(configuration_id)?
            .ok_or_else(|| ApiError::NotFound(format!("配置(id={})不存在", configuration_id)))
    }

    // ==========================================
    // 内部
    // ==========================================

    /// 当前目录下的有效参数集；未选类目时仅含全局参数
    fn live_effective(&self, category_id: Option<&str>) -> ApiResult<Vec<EffectiveParameter>> {
        let view = self.binding_repo.load_category_view(category_id.unwrap_or(""))?;
        Ok(build_effective_parameters(&view))
    }

    /// 描述头部标签；未知的类目/供应商不报错，只是不输出
    fn labels(&self, category_id: Option<&str>, supplier_id: Option<&str>) -> ApiResult<DescriptionLabels> {
        let category = match category_id {
            Some(id) => self.directory_repo.find_category(id)?,
            None => None,
        };
        let supplier = match supplier_id {
            Some(id) => self.directory_repo.find_supplier(id)?,
            None => None,
        };
        Ok(DescriptionLabels::from_records(category.as_ref(), supplier.as_ref()))
    }
}

/// 旧快照中仍有取值、但当前快照已不包含的条目
fn carry_over_snapshot(
    previous: &[ParameterSnapshot],
    current: &[ParameterSnapshot],
    values: &ConfigurationValues,
) -> Vec<ParameterSnapshot> {
    let present: HashSet<&str> = current.iter().map(|s| s.parameter_id.as_str()).collect();
    previous
        .iter()
        .filter(|s| !present.contains(s.parameter_id.as_str()))
        .filter(|s| !is_empty_value(values.get(s.parameter_id.as_str())))
        .cloned()
        .collect()
}
