// ==========================================
// 产品参数配置引擎 - 管理端输入校验器
// ==========================================
// 职责: 目录管理操作的输入检查（参数定义、可选值、绑定默认值、供应商覆写）
// 输出: 字段级问题列表，由调用方包装为 ApiError::ValidationFailed
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::parameter::{NewValue, Parameter};
use crate::domain::supplier_override::SupplierOverrideInput;
use crate::domain::types::{ParameterKind, SystemRole};
use crate::domain::validation::ValidationIssue;
use crate::engine::color::is_valid_hex;
use crate::engine::normalize::format_number;
use crate::i18n::localized;

fn issue(field: &str, code: &str, key: &str, args: &[(&str, &str)]) -> ValidationIssue {
    ValidationIssue {
        field: field.to_string(),
        code: code.to_string(),
        message: localized(key, args),
    }
}

/// 问题列表为空则通过
pub fn into_result(issues: Vec<ValidationIssue>) -> ApiResult<()> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ApiError::validation(issues))
    }
}

/// 参数定义检查（新建与更新共用）
pub fn check_parameter_definition(parameter: &Parameter) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if parameter.name.ru.trim().is_empty() || parameter.name.it.trim().is_empty() {
        issues.push(issue("name", "name_required", "catalog.name_required", &[]));
    }

    let has_range = parameter.min_value.is_some() || parameter.max_value.is_some();
    if has_range && !parameter.kind.has_range() {
        issues.push(issue("min_value", "range_not_supported", "catalog.range_not_supported", &[]));
    }
    if let (Some(min), Some(max)) = (parameter.min_value, parameter.max_value) {
        if min > max {
            let (min, max) = (format_number(min), format_number(max));
            issues.push(issue(
                "min_value",
                "range_invalid",
                "catalog.range_invalid",
                &[("min", &min), ("max", &max)],
            ));
        }
    }
    if let Some(step) = parameter.step_value {
        if !(step > 0.0) || !step.is_finite() {
            issues.push(issue("step_value", "step_invalid", "catalog.step_invalid", &[]));
        }
    }

    let is_dimension = matches!(
        parameter.system_role,
        Some(SystemRole::Width) | Some(SystemRole::Height)
    );
    if is_dimension && parameter.kind != ParameterKind::Number {
        issues.push(issue(
            "system_role",
            "dimension_requires_number",
            "catalog.dimension_requires_number",
            &[],
        ));
    }

    issues
}

/// 新增可选值检查
pub fn check_new_value(kind: ParameterKind, value: &NewValue) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if !kind.has_values() {
        issues.push(issue(
            "kind",
            "values_not_supported",
            "catalog.values_not_supported",
            &[("kind", kind.to_db_str())],
        ));
        return issues;
    }

    if value.raw_value.trim().is_empty() {
        issues.push(issue("raw_value", "value_required", "catalog.value_required", &[]));
    }

    if let Some(position) = value.position.filter(|p| *p < 0) {
        issues.push(issue(
            "position",
            "invalid_position",
            "catalog.invalid_position",
            &[("value", position.to_string().as_str())],
        ));
    }

    if let Some(hex) = value.color_hex.as_deref().map(str::trim) {
        if !hex.is_empty() && !is_valid_hex(hex) {
            issues.push(issue(
                "color_hex",
                "invalid_hex",
                "catalog.invalid_hex",
                &[("value", hex)],
            ));
        }
    }

    issues
}

/// 绑定默认值检查: 列表型参数的默认值必须是启用值
pub fn check_binding_default(parameter: &Parameter, default_value: Option<&str>) -> Vec<ValidationIssue> {
    let Some(default) = default_value.map(str::trim).filter(|d| !d.is_empty()) else {
        return Vec::new();
    };
    if !parameter.kind.has_values() {
        return Vec::new();
    }
    if parameter.active_values().any(|v| v.raw_value == default) {
        return Vec::new();
    }
    vec![issue(
        "default_value",
        "default_not_allowed",
        "catalog.default_not_allowed",
        &[("value", default)],
    )]
}

/// 供应商覆写检查
pub fn check_override(kind: ParameterKind, input: &SupplierOverrideInput) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if input.custom_values.is_some() && !kind.has_values() {
        issues.push(issue(
            "custom_values",
            "custom_values_not_supported",
            "catalog.custom_values_not_supported",
            &[],
        ));
    }

    let has_range = input.min_value.is_some() || input.max_value.is_some();
    if has_range && !kind.has_range() {
        issues.push(issue("min_value", "range_not_supported", "catalog.range_not_supported", &[]));
    }
    if let (Some(min), Some(max)) = (input.min_value, input.max_value) {
        if min > max {
            let (min, max) = (format_number(min), format_number(max));
            issues.push(issue(
                "min_value",
                "range_invalid",
                "catalog.range_invalid",
                &[("min", &min), ("max", &max)],
            ));
        }
    }

    issues
}

/// 重排列表必须恰好覆盖参数的全部可选值
pub fn check_value_order(parameter: &Parameter, ordered_value_ids: &[String]) -> Vec<ValidationIssue> {
    let mut expected: Vec<&str> = parameter.values.iter().map(|v| v.value_id.as_str()).collect();
    let mut given: Vec<&str> = ordered_value_ids.iter().map(String::as_str).collect();
    expected.sort_unstable();
    given.sort_unstable();
    if expected == given {
        Vec::new()
    } else {
        vec![issue("value_ids", "order_mismatch", "catalog.order_mismatch", &[])]
    }
}
