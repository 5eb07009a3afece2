// ==========================================
// 产品参数配置引擎 - 供应商覆写解析
// ==========================================
// 职责: 基础参数定义 + 可选的供应商覆写 → EffectiveConstraints
// 规则:
//   - 覆写 custom_values 存在时整体替换基础可选值
//   - 覆写 min/max 存在时取覆写值（严格收窄模式下与基础范围取交集）
//   - is_available = false 时参数对该供应商不可用
// ==========================================

use crate::config::EngineConfig;
use crate::domain::parameter::Parameter;
use crate::domain::supplier_override::{EffectiveConstraints, SupplierOverride};
use crate::domain::types::{ConstraintSource, ParameterKind};

// ==========================================
// SupplierOverrideResolver - 覆写解析器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct SupplierOverrideResolver {
    enforce_narrowing: bool,
}

impl SupplierOverrideResolver {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            enforce_narrowing: config.enforce_override_narrowing,
        }
    }

    /// 计算单个参数的有效约束
    pub fn resolve(
        &self,
        parameter: &Parameter,
        supplier_override: Option<&SupplierOverride>,
    ) -> EffectiveConstraints {
        let base_values: Vec<String> = parameter
            .active_values()
            .map(|v| v.raw_value.clone())
            .collect();

        let Some(ov) = supplier_override else {
            return EffectiveConstraints {
                parameter_id: parameter.parameter_id.clone(),
                kind: parameter.kind,
                is_available: true,
                allowed_values: match parameter.kind {
                    ParameterKind::Select | ParameterKind::Color => base_values,
                    ParameterKind::Number | ParameterKind::Text | ParameterKind::Boolean => Vec::new(),
                },
                min_value: parameter.min_value,
                max_value: parameter.max_value,
                source: ConstraintSource::Base,
            };
        };

        let (allowed_values, min_value, max_value) = match parameter.kind {
            ParameterKind::Select | ParameterKind::Color => {
                let allowed = ov.custom_values.clone().unwrap_or(base_values);
                (allowed, parameter.min_value, parameter.max_value)
            }
            ParameterKind::Number => {
                let (min, max) = self.merge_range(parameter, ov);
                (Vec::new(), min, max)
            }
            ParameterKind::Text | ParameterKind::Boolean => {
                (Vec::new(), parameter.min_value, parameter.max_value)
            }
        };

        EffectiveConstraints {
            parameter_id: parameter.parameter_id.clone(),
            kind: parameter.kind,
            is_available: ov.is_available,
            allowed_values,
            min_value,
            max_value,
            source: ConstraintSource::Supplier,
        }
    }

    fn merge_range(&self, parameter: &Parameter, ov: &SupplierOverride) -> (Option<f64>, Option<f64>) {
        if !self.enforce_narrowing {
            return (
                ov.min_value.or(parameter.min_value),
                ov.max_value.or(parameter.max_value),
            );
        }

        let min = match (parameter.min_value, ov.min_value) {
            (Some(base), Some(custom)) => Some(base.max(custom)),
            (base, custom) => custom.or(base),
        };
        let max = match (parameter.max_value, ov.max_value) {
            (Some(base), Some(custom)) => Some(base.min(custom)),
            (base, custom) => custom.or(base),
        };
        (min, max)
    }
}
