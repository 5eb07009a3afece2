// ==========================================
// 产品参数配置引擎 - 配置校验器
// ==========================================
// 职责: 按有效参数集 + 有效约束 校验一份配置取值
// 规则:
//   - 未选类目/供应商 → 报错并跳过参数级校验
//   - 必填参数无值 → required
//   - 有值时按类型校验（NUMBER 范围 / SELECT、COLOR 允许值 / BOOLEAN 可转换）
//   - 不属于有效参数集的取值忽略
// 红线: 累积全部问题，不在首个错误处停止
// ==========================================

use crate::domain::binding::EffectiveParameter;
use crate::domain::configuration::ConfigurationValues;
use crate::domain::supplier_override::EffectiveConstraints;
use crate::domain::types::{Locale, ParameterKind};
use crate::domain::validation::{LocalizedMessage, ValidationIssue, ValidationResult};
use crate::engine::color::{is_valid_hex, looks_like_hex};
use crate::engine::normalize::{
    coerce_bool, format_number, is_empty_value, parse_number, value_as_text, value_for_message,
};
use crate::i18n::localized_with;
use serde_json::Value;

pub const FIELD_CATEGORY: &str = "category_id";
pub const FIELD_SUPPLIER: &str = "supplier_id";

/// 参数 + 其有效约束
#[derive(Debug, Clone)]
pub struct ConstrainedParameter {
    pub effective: EffectiveParameter,
    pub constraints: EffectiveConstraints,
}

// ==========================================
// ConfigurationValidator - 配置校验器
// ==========================================
pub struct ConfigurationValidator;

impl ConfigurationValidator {
    /// 完整校验
    pub fn validate(
        values: &ConfigurationValues,
        category_id: Option<&str>,
        supplier_id: Option<&str>,
        parameters: &[ConstrainedParameter],
    ) -> ValidationResult {
        let mut issues = Self::check_selection(category_id, supplier_id);
        if !issues.is_empty() {
            return ValidationResult::from_issues(issues);
        }

        for item in parameters {
            issues.extend(Self::check_parameter(values, item));
        }
        ValidationResult::from_issues(issues)
    }

    /// 类目与供应商是否已选择
    pub fn check_selection(category_id: Option<&str>, supplier_id: Option<&str>) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();
        if category_id.map(str::trim).unwrap_or("").is_empty() {
            issues.push(issue(FIELD_CATEGORY, "category_required", localized_with(
                "validation.category_required",
                |_| Vec::new(),
            )));
        }
        if supplier_id.map(str::trim).unwrap_or("").is_empty() {
            issues.push(issue(FIELD_SUPPLIER, "supplier_required", localized_with(
                "validation.supplier_required",
                |_| Vec::new(),
            )));
        }
        issues
    }

    /// 单个参数校验
    pub fn check_parameter(values: &ConfigurationValues, item: &ConstrainedParameter) -> Vec<ValidationIssue> {
        let effective = &item.effective;
        let constraints = &item.constraints;
        let field = effective.parameter_id();
        let raw = values.get(field);

        if !constraints.is_available {
            if is_empty_value(raw) {
                return Vec::new();
            }
            return vec![param_issue(effective, "supplier_unavailable", "validation.supplier_unavailable", None)];
        }

        let Some(value) = raw.filter(|v| !is_empty_value(Some(*v))) else {
            if effective.is_required {
                return vec![param_issue(effective, "required", "validation.required", None)];
            }
            return Vec::new();
        };

        match effective.parameter.kind {
            ParameterKind::Number => check_number(effective, constraints, value),
            ParameterKind::Select => check_listed(effective, constraints, value, false),
            ParameterKind::Color => check_listed(effective, constraints, value, true),
            ParameterKind::Text => match value {
                Value::Array(_) | Value::Object(_) | Value::Bool(_) => {
                    vec![param_issue(effective, "invalid_type", "validation.invalid_type", None)]
                }
                _ => Vec::new(),
            },
            ParameterKind::Boolean => match coerce_bool(value) {
                Some(_) => Vec::new(),
                None => vec![param_issue(
                    effective,
                    "not_boolean",
                    "validation.not_boolean",
                    Some(vec![("value", value_for_message(value))]),
                )],
            },
        }
    }
}

fn check_number(
    effective: &EffectiveParameter,
    constraints: &EffectiveConstraints,
    value: &Value,
) -> Vec<ValidationIssue> {
    let Some(n) = parse_number(value) else {
        return vec![param_issue(
            effective,
            "not_a_number",
            "validation.not_a_number",
            Some(vec![("value", value_for_message(value))]),
        )];
    };

    let mut issues = Vec::new();
    if let Some(min) = constraints.min_value {
        if n < min {
            issues.push(param_issue(
                effective,
                "below_min",
                "validation.below_min",
                Some(vec![("value", format_number(n)), ("min", format_number(min))]),
            ));
        }
    }
    if let Some(max) = constraints.max_value {
        if n > max {
            issues.push(param_issue(
                effective,
                "above_max",
                "validation.above_max",
                Some(vec![("value", format_number(n)), ("max", format_number(max))]),
            ));
        }
    }
    issues
}

/// SELECT / COLOR: 必须精确匹配允许值（区分大小写）
fn check_listed(
    effective: &EffectiveParameter,
    constraints: &EffectiveConstraints,
    value: &Value,
    is_color: bool,
) -> Vec<ValidationIssue> {
    let Some(text) = value_as_text(value) else {
        return vec![param_issue(effective, "invalid_type", "validation.invalid_type", None)];
    };

    let mut issues = Vec::new();
    if is_color && looks_like_hex(&text) && !is_valid_hex(text.trim()) {
        issues.push(param_issue(
            effective,
            "invalid_hex",
            "validation.invalid_hex",
            Some(vec![("value", text.clone())]),
        ));
    }
    if !constraints.allows(&text) {
        issues.push(param_issue(
            effective,
            "not_allowed",
            "validation.not_allowed",
            Some(vec![("value", text)]),
        ));
    }
    issues
}

fn issue(field: &str, code: &str, message: LocalizedMessage) -> ValidationIssue {
    ValidationIssue {
        field: field.to_string(),
        code: code.to_string(),
        message,
    }
}

/// 参数级问题: 消息中的参数名按语言取有效显示名
fn param_issue(
    effective: &EffectiveParameter,
    code: &str,
    key: &str,
    extra: Option<Vec<(&'static str, String)>>,
) -> ValidationIssue {
    let extra = extra.unwrap_or_default();
    let message = localized_with(key, |locale: Locale| {
        let mut args = vec![("name", effective.name(locale).to_string())];
        args.extend(extra.iter().cloned());
        args
    });
    issue(effective.parameter_id(), code, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parameter::{LocalizedText, Parameter};
    use crate::domain::types::ConstraintSource;
    use chrono::NaiveDate;
    use serde_json::json;

    fn constrained(id: &str, kind: ParameterKind, required: bool) -> ConstrainedParameter {
        let ts = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let parameter = Parameter {
            parameter_id: id.to_string(),
            name: LocalizedText::new(format!("{}-ru", id), format!("{}-it", id)),
            kind,
            unit: None,
            min_value: None,
            max_value: None,
            step_value: None,
            is_system: false,
            system_role: None,
            is_global: true,
            values: vec![],
            created_at: ts,
            updated_at: ts,
        };
        ConstrainedParameter {
            effective: EffectiveParameter {
                display_name: parameter.name.clone(),
                parameter,
                binding: None,
                is_required: required,
                is_visible: true,
                order: None,
                default_value: None,
                help_text: None,
            },
            constraints: EffectiveConstraints {
                parameter_id: id.to_string(),
                kind,
                is_available: true,
                allowed_values: vec![],
                min_value: None,
                max_value: None,
                source: ConstraintSource::Base,
            },
        }
    }

    fn values(pairs: &[(&str, Value)]) -> ConfigurationValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_missing_selection_short_circuits() {
        let params = vec![constrained("w", ParameterKind::Number, true)];
        let result = ConfigurationValidator::validate(&values(&[]), None, Some("  "), &params);
        assert!(!result.valid);
        assert!(result.has_error(FIELD_CATEGORY, "category_required"));
        assert!(result.has_error(FIELD_SUPPLIER, "supplier_required"));
        assert_eq!(result.errors.len(), 2);
    }

    #[test]
    fn test_required_missing_and_blank() {
        let params = vec![
            constrained("a", ParameterKind::Text, true),
            constrained("b", ParameterKind::Text, true),
            constrained("c", ParameterKind::Text, false),
        ];
        let v = values(&[("b", json!("   "))]);
        let result = ConfigurationValidator::validate(&v, Some("cat"), Some("sup"), &params);
        assert!(result.has_error("a", "required"));
        assert!(result.has_error("b", "required"));
        assert_eq!(result.errors_for("c").count(), 0);
        assert!(result.errors[0].message.ru.contains("a-ru"));
        assert!(result.errors[0].message.it.contains("a-it"));
    }

    #[test]
    fn test_number_range_and_parse() {
        let mut p = constrained("w", ParameterKind::Number, false);
        p.constraints.min_value = Some(300.0);
        p.constraints.max_value = Some(3000.0);
        let params = vec![p];

        let low = ConfigurationValidator::validate(&values(&[("w", json!(100))]), Some("c"), Some("s"), &params);
        assert!(low.has_error("w", "below_min"));

        let high = ConfigurationValidator::validate(&values(&[("w", json!("3500"))]), Some("c"), Some("s"), &params);
        assert!(high.has_error("w", "above_max"));

        let comma = ConfigurationValidator::validate(&values(&[("w", json!("1200,5"))]), Some("c"), Some("s"), &params);
        assert!(comma.valid);

        let bad = ConfigurationValidator::validate(&values(&[("w", json!("wide"))]), Some("c"), Some("s"), &params);
        assert!(bad.has_error("w", "not_a_number"));
    }

    #[test]
    fn test_select_match_is_case_sensitive() {
        let mut p = constrained("m", ParameterKind::Select, false);
        p.constraints.allowed_values = vec!["White".to_string()];
        let params = vec![p];

        let ok = ConfigurationValidator::validate(&values(&[("m", json!("White"))]), Some("c"), Some("s"), &params);
        assert!(ok.valid);

        let lower = ConfigurationValidator::validate(&values(&[("m", json!("white"))]), Some("c"), Some("s"), &params);
        assert!(lower.has_error("m", "not_allowed"));
    }

    #[test]
    fn test_color_reports_hex_format_and_membership() {
        let mut p = constrained("col", ParameterKind::Color, false);
        p.constraints.allowed_values = vec!["#FFFFFF".to_string()];
        let params = vec![p];

        let result = ConfigurationValidator::validate(&values(&[("col", json!("#FFFF"))]), Some("c"), Some("s"), &params);
        assert!(result.has_error("col", "invalid_hex"));
        assert!(result.has_error("col", "not_allowed"));

        let listed = ConfigurationValidator::validate(&values(&[("col", json!("#FFFFFF"))]), Some("c"), Some("s"), &params);
        assert!(listed.valid);
    }

    #[test]
    fn test_boolean_coercion() {
        let params = vec![constrained("b", ParameterKind::Boolean, true)];
        let ok = ConfigurationValidator::validate(&values(&[("b", json!(false))]), Some("c"), Some("s"), &params);
        assert!(ok.valid);
        let bad = ConfigurationValidator::validate(&values(&[("b", json!("perhaps"))]), Some("c"), Some("s"), &params);
        assert!(bad.has_error("b", "not_boolean"));
    }

    #[test]
    fn test_unavailable_parameter() {
        let mut p = constrained("u", ParameterKind::Text, true);
        p.constraints.is_available = false;
        let params = vec![p];

        let empty = ConfigurationValidator::validate(&values(&[]), Some("c"), Some("s"), &params);
        assert!(empty.valid);

        let given = ConfigurationValidator::validate(&values(&[("u", json!("x"))]), Some("c"), Some("s"), &params);
        assert!(given.has_error("u", "supplier_unavailable"));
    }

    #[test]
    fn test_unknown_parameter_values_are_ignored() {
        let params = vec![constrained("a", ParameterKind::Text, false)];
        let v = values(&[("ghost", json!({"x": 1}))]);
        let result = ConfigurationValidator::validate(&v, Some("c"), Some("s"), &params);
        assert!(result.valid);
    }

    #[test]
    fn test_collects_all_errors() {
        let mut n = constrained("n", ParameterKind::Number, false);
        n.constraints.max_value = Some(10.0);
        let params = vec![constrained("r", ParameterKind::Text, true), n];
        let v = values(&[("n", json!(11))]);
        let result = ConfigurationValidator::validate(&v, Some("c"), Some("s"), &params);
        assert_eq!(result.errors.len(), 2);
    }
}
