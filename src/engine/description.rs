// ==========================================
// 产品参数配置引擎 - 描述生成器
// ==========================================
// 职责: 将配置取值渲染为有序、本地化的描述字符串（销售单据用）
// 段落顺序（以分隔符连接）:
//   1. 类目名称
//   2. 供应商（优先简称）
//   3. 型号参数
//   4. 尺寸: 宽×高×深 + 共同单位；恰好两个尺寸且为长度单位时追加面积
//   5. 第一个颜色参数
//   6. 其余已填写参数，按绑定顺序
// 红线: 不校验、不报错；缺失项静默跳过
// ==========================================

use crate::config::EngineConfig;
use crate::domain::binding::EffectiveParameter;
use crate::domain::configuration::ConfigurationValues;
use crate::domain::directory::{CategoryRecord, SupplierRecord};
use crate::domain::parameter::{LocalizedText, Parameter};
use crate::domain::types::{DimensionAxis, Locale, ParameterKind, SystemRole};
use crate::engine::normalize::{coerce_bool, format_number, is_empty_value, parse_number, value_as_text};
use crate::i18n::{t, t_with_args};
use serde_json::Value;
use std::collections::HashSet;

/// 尺寸关键字（名称或单位中出现即视为该轴）
const AXIS_KEYWORDS: &[(DimensionAxis, &[&str])] = &[
    (DimensionAxis::Width, &["width", "ширина", "larghezza"]),
    (DimensionAxis::Height, &["height", "высота", "altezza"]),
    (DimensionAxis::Depth, &["depth", "глубина", "profondità", "profondita"]),
];

/// 描述头部标签
#[derive(Debug, Clone, Default)]
pub struct DescriptionLabels {
    pub category: Option<LocalizedText>,
    pub supplier: Option<String>,
    /// 尺寸参数未设置单位时使用的类目单位
    pub dimension_unit: Option<String>,
}

impl DescriptionLabels {
    pub fn from_records(category: Option<&CategoryRecord>, supplier: Option<&SupplierRecord>) -> Self {
        Self {
            category: category.map(|c| c.name.clone()),
            supplier: supplier.map(|s| s.label().to_string()),
            dimension_unit: category.and_then(|c| c.dimension_unit.clone()),
        }
    }
}

struct DimensionPart {
    axis: DimensionAxis,
    value: f64,
    unit: Option<String>,
}

// ==========================================
// DescriptionGenerator - 描述生成器
// ==========================================
#[derive(Debug, Clone)]
pub struct DescriptionGenerator {
    config: EngineConfig,
}

impl DescriptionGenerator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// 渲染描述
    pub fn describe(
        &self,
        values: &ConfigurationValues,
        labels: &DescriptionLabels,
        effective: &[EffectiveParameter],
        locale: Locale,
    ) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut consumed: HashSet<&str> = HashSet::new();

        if let Some(category) = &labels.category {
            push_non_empty(&mut parts, category.get_or_fallback(locale));
        }
        if let Some(supplier) = &labels.supplier {
            push_non_empty(&mut parts, supplier);
        }

        // 型号
        if let Some(model) = effective.iter().find(|e| e.parameter.is_model()) {
            consumed.insert(model.parameter_id());
            if let Some(text) = lookup(values, model).and_then(|v| render_value(model, v, locale)) {
                parts.push(text);
            }
        }

        // 尺寸: 每个轴只取一个已填写参数；系统角色参数独占其轴
        // 未入选的同轴参数留给“其余参数”段落
        let system_axes: Vec<DimensionAxis> = effective
            .iter()
            .filter_map(|e| system_axis(&e.parameter))
            .collect();
        let mut dimensions: Vec<DimensionPart> = Vec::new();
        for item in effective {
            if consumed.contains(item.parameter_id()) {
                continue;
            }
            let Some(axis) = dimension_axis(item) else {
                continue;
            };
            let by_role = system_axis(&item.parameter).is_some();
            if (!by_role && system_axes.contains(&axis)) || dimensions.iter().any(|d| d.axis == axis) {
                continue;
            }
            let Some(n) = lookup(values, item).and_then(parse_number) else {
                continue;
            };
            consumed.insert(item.parameter_id());
            dimensions.push(DimensionPart {
                axis,
                value: n,
                unit: non_empty(item.parameter.unit.as_deref())
                    .or_else(|| non_empty(labels.dimension_unit.as_deref())),
            });
        }
        dimensions.sort_by_key(|d| d.axis);
        if !dimensions.is_empty() {
            parts.push(self.render_dimensions(&dimensions));
            if let Some(area) = self.render_area(&dimensions, locale) {
                parts.push(area);
            }
        }

        // 颜色（仅第一个已填写的）
        if let Some(color) = effective.iter().find(|e| {
            e.parameter.kind == ParameterKind::Color
                && !consumed.contains(e.parameter_id())
                && lookup(values, e).is_some()
        }) {
            consumed.insert(color.parameter_id());
            if let Some(text) = lookup(values, color).and_then(|v| render_value(color, v, locale)) {
                parts.push(text);
            }
        }

        // 其余参数
        let mut remaining: Vec<&EffectiveParameter> = effective
            .iter()
            .filter(|e| !consumed.contains(e.parameter_id()))
            .collect();
        remaining.sort_by_key(|e| e.order.unwrap_or(i32::MAX));
        for item in remaining {
            if let Some(text) = lookup(values, item).and_then(|v| render_value(item, v, locale)) {
                parts.push(text);
            }
        }

        parts.join(&self.config.description_separator)
    }

    fn render_dimensions(&self, dimensions: &[DimensionPart]) -> String {
        let joiner = self.config.dimension_joiner.as_str();
        let first_unit = dimensions[0].unit.as_deref();
        let shared = dimensions
            .iter()
            .all(|d| same_unit(d.unit.as_deref(), first_unit));

        if shared {
            let numbers: Vec<String> = dimensions.iter().map(|d| format_number(d.value)).collect();
            match first_unit {
                Some(unit) => format!("{} {}", numbers.join(joiner), unit),
                None => numbers.join(joiner),
            }
        } else {
            dimensions
                .iter()
                .map(|d| match d.unit.as_deref() {
                    Some(unit) => format!("{} {}", format_number(d.value), unit),
                    None => format_number(d.value),
                })
                .collect::<Vec<_>>()
                .join(joiner)
        }
    }

    /// 恰好两个尺寸且均为长度单位时计算面积（平方米）
    fn render_area(&self, dimensions: &[DimensionPart], locale: Locale) -> Option<String> {
        if dimensions.len() != 2 {
            return None;
        }
        let a = dimensions[0].value * meters_per_unit(dimensions[0].unit.as_deref()?)?;
        let b = dimensions[1].value * meters_per_unit(dimensions[1].unit.as_deref()?)?;
        let area = format!("{:.*}", self.config.area_decimals, a * b);
        Some(t_with_args("description.area", locale, &[("value", area.as_str())]))
    }
}

fn push_non_empty(parts: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        parts.push(trimmed.to_string());
    }
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn same_unit(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x.to_lowercase() == y.to_lowercase(),
        (None, None) => true,
        _ => false,
    }
}

/// 已填写的取值；空值视为未填写
fn lookup<'a>(values: &'a ConfigurationValues, item: &EffectiveParameter) -> Option<&'a Value> {
    let value = values.get(item.parameter_id());
    if is_empty_value(value) {
        None
    } else {
        value
    }
}

/// 尺寸轴识别: 系统角色优先，其次名称/单位关键字（仅 NUMBER）
fn dimension_axis(item: &EffectiveParameter) -> Option<DimensionAxis> {
    let parameter = &item.parameter;
    if parameter.kind != ParameterKind::Number {
        return None;
    }
    if let Some(axis) = system_axis(parameter) {
        return Some(axis);
    }

    let unit = parameter.unit.as_deref().unwrap_or("").to_lowercase();
    AXIS_KEYWORDS
        .iter()
        .find(|(_, keywords)| {
            keywords.iter().any(|k| {
                parameter.name.any_contains(k) || item.display_name.any_contains(k) || unit.contains(k)
            })
        })
        .map(|(axis, _)| *axis)
}

fn system_axis(parameter: &Parameter) -> Option<DimensionAxis> {
    if parameter.kind != ParameterKind::Number {
        return None;
    }
    match parameter.system_role {
        Some(SystemRole::Width) => Some(DimensionAxis::Width),
        Some(SystemRole::Height) => Some(DimensionAxis::Height),
        _ => None,
    }
}

fn meters_per_unit(unit: &str) -> Option<f64> {
    match unit.trim().trim_end_matches('.').to_lowercase().as_str() {
        "mm" | "мм" => Some(0.001),
        "cm" | "см" => Some(0.01),
        "m" | "м" => Some(1.0),
        _ => None,
    }
}

/// 单个参数的显示文本
fn render_value(item: &EffectiveParameter, value: &Value, locale: Locale) -> Option<String> {
    let parameter = &item.parameter;
    match parameter.kind {
        ParameterKind::Boolean => {
            let key = if coerce_bool(value)? {
                "description.bool_true"
            } else {
                "description.bool_false"
            };
            Some(format!("{}: {}", item.name(locale), t(key, locale)))
        }
        ParameterKind::Number => match parse_number(value) {
            Some(n) => Some(with_unit(format_number(n), parameter)),
            None => value_as_text(value).map(|s| s.trim().to_string()),
        },
        ParameterKind::Select | ParameterKind::Color => {
            let raw = value_as_text(value)?;
            Some(
                parameter
                    .find_value(&raw)
                    .map(|v| v.display(locale))
                    .unwrap_or_else(|| raw.trim().to_string()),
            )
        }
        ParameterKind::Text => value_as_text(value).map(|s| s.trim().to_string()),
    }
}

fn with_unit(number: String, parameter: &Parameter) -> String {
    match non_empty(parameter.unit.as_deref()) {
        Some(unit) => format!("{} {}", number, unit),
        None => number,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::parameter::ParameterValue;
    use chrono::{NaiveDate, NaiveDateTime};
    use serde_json::json;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn effective(id: &str, name: LocalizedText, kind: ParameterKind, order: Option<i32>) -> EffectiveParameter {
        let parameter = Parameter {
            parameter_id: id.to_string(),
            name: name.clone(),
            kind,
            unit: None,
            min_value: None,
            max_value: None,
            step_value: None,
            is_system: false,
            system_role: None,
            is_global: order.is_none(),
            values: vec![],
            created_at: ts(),
            updated_at: ts(),
        };
        EffectiveParameter {
            parameter,
            binding: None,
            is_required: false,
            is_visible: true,
            order,
            display_name: name,
            default_value: None,
            help_text: None,
        }
    }

    fn with_role(mut e: EffectiveParameter, role: SystemRole, unit: Option<&str>) -> EffectiveParameter {
        e.parameter.is_system = true;
        e.parameter.system_role = Some(role);
        e.parameter.unit = unit.map(String::from);
        e
    }

    fn value(parameter_id: &str, raw: &str, ru: &str, it: &str) -> ParameterValue {
        ParameterValue {
            value_id: format!("{}-{}", parameter_id, raw),
            parameter_id: parameter_id.to_string(),
            raw_value: raw.to_string(),
            text: LocalizedText::new(ru, it),
            display_name: None,
            color: None,
            sort_order: 0,
            is_active: true,
            created_at: ts(),
        }
    }

    fn labels() -> DescriptionLabels {
        DescriptionLabels {
            category: Some(LocalizedText::new("Окна", "Finestre")),
            supplier: Some("ACME".to_string()),
            dimension_unit: Some("mm".to_string()),
        }
    }

    fn values(pairs: &[(&str, Value)]) -> ConfigurationValues {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_width_height_with_area() {
        let width = with_role(
            effective("w", LocalizedText::new("Ширина", "Larghezza"), ParameterKind::Number, None),
            SystemRole::Width,
            Some("mm"),
        );
        let height = with_role(
            effective("h", LocalizedText::new("Высота", "Altezza"), ParameterKind::Number, None),
            SystemRole::Height,
            Some("mm"),
        );
        let generator = DescriptionGenerator::new(&EngineConfig::default());
        let v = values(&[("w", json!(1000)), ("h", json!(2000))]);

        let ru = generator.describe(&v, &labels(), &[height.clone(), width.clone()], Locale::Ru);
        assert_eq!(ru, "Окна | ACME | 1000×2000 mm | 2.00 м²");

        let it = generator.describe(&v, &labels(), &[width, height], Locale::It);
        assert_eq!(it, "Finestre | ACME | 1000×2000 mm | 2.00 m²");
    }

    #[test]
    fn test_extra_same_axis_parameter_renders_as_remaining() {
        let width = with_role(
            effective("w", LocalizedText::new("Ширина", "Larghezza"), ParameterKind::Number, None),
            SystemRole::Width,
            Some("mm"),
        );
        let height = with_role(
            effective("h", LocalizedText::new("Высота", "Altezza"), ParameterKind::Number, None),
            SystemRole::Height,
            Some("mm"),
        );
        let mut handle_height = effective(
            "hh",
            LocalizedText::new("Высота ручки", "Altezza maniglia"),
            ParameterKind::Number,
            Some(3),
        );
        handle_height.parameter.unit = Some("mm".to_string());
        let generator = DescriptionGenerator::new(&EngineConfig::default());
        let all = [handle_height, width, height];

        let v = values(&[("w", json!(1000)), ("h", json!(2000)), ("hh", json!(1050))]);
        let text = generator.describe(&v, &labels(), &all, Locale::Ru);
        assert_eq!(text, "Окна | ACME | 1000×2000 mm | 2.00 м² | 1050 mm");

        // 系统高度未填写时，同轴的其他参数不得顶替
        let v = values(&[("w", json!(1000)), ("hh", json!(1050))]);
        let text = generator.describe(&v, &labels(), &all, Locale::Ru);
        assert_eq!(text, "Окна | ACME | 1000 mm | 1050 mm");
    }

    #[test]
    fn test_dimension_detected_by_name_and_category_unit() {
        let depth = effective("d", LocalizedText::new("Глубина", "Profondità"), ParameterKind::Number, Some(1));
        let width = effective("w", LocalizedText::new("Ширина", "Larghezza"), ParameterKind::Number, Some(2));
        let generator = DescriptionGenerator::new(&EngineConfig::default());
        let v = values(&[("d", json!(60)), ("w", json!("800"))]);

        let text = generator.describe(&v, &DescriptionLabels::default(), &[depth, width], Locale::Ru);
        assert_eq!(text, "800×60");
    }

    #[test]
    fn test_three_dimensions_have_no_area() {
        let w = effective("w", LocalizedText::new("Ширина", "Larghezza"), ParameterKind::Number, Some(1));
        let h = effective("h", LocalizedText::new("Высота", "Altezza"), ParameterKind::Number, Some(2));
        let d = effective("d", LocalizedText::new("Глубина", "Profondità"), ParameterKind::Number, Some(3));
        let generator = DescriptionGenerator::new(&EngineConfig::default());
        let v = values(&[("w", json!(1000)), ("h", json!(2000)), ("d", json!(70))]);

        let text = generator.describe(&v, &labels(), &[w, h, d], Locale::Ru);
        assert_eq!(text, "Окна | ACME | 1000×2000×70 mm");
    }

    #[test]
    fn test_model_color_and_remaining_order() {
        let mut model = with_role(
            effective("m", LocalizedText::new("Модель", "Modello"), ParameterKind::Select, None),
            SystemRole::Model,
            None,
        );
        model.parameter.values = vec![value("m", "K-100", "Классика", "Classica")];
        let mut color = effective("c", LocalizedText::new("Цвет", "Colore"), ParameterKind::Color, Some(1));
        color.parameter.values = vec![value("c", "#FFFFFF", "Белый", "Bianco")];
        let glass = effective("g", LocalizedText::new("Стекло", "Vetro"), ParameterKind::Text, Some(3));
        let handle = effective("b", LocalizedText::new("Ручка", "Maniglia"), ParameterKind::Boolean, Some(2));

        let generator = DescriptionGenerator::new(&EngineConfig::default());
        let v = values(&[
            ("m", json!("K-100")),
            ("c", json!("#FFFFFF")),
            ("g", json!(" триплекс ")),
            ("b", json!(true)),
        ]);

        let ru = generator.describe(&v, &labels(), &[model.clone(), color.clone(), glass.clone(), handle.clone()], Locale::Ru);
        assert_eq!(ru, "Окна | ACME | Классика | Белый | Ручка: Да | триплекс");

        let it = generator.describe(&v, &labels(), &[model, color, glass, handle], Locale::It);
        assert_eq!(it, "Finestre | ACME | Classica | Bianco | Maniglia: Sì | триплекс");
    }

    #[test]
    fn test_model_only_configuration() {
        let model = with_role(
            effective("m", LocalizedText::new("Модель", "Modello"), ParameterKind::Text, None),
            SystemRole::Model,
            None,
        );
        let width = with_role(
            effective("w", LocalizedText::new("Ширина", "Larghezza"), ParameterKind::Number, None),
            SystemRole::Width,
            Some("mm"),
        );
        let generator = DescriptionGenerator::new(&EngineConfig::default());
        let v = values(&[("m", json!("X1")), ("w", json!(""))]);

        let text = generator.describe(&v, &labels(), &[width, model], Locale::Ru);
        assert_eq!(text, "Окна | ACME | X1");
    }

    #[test]
    fn test_unknown_select_value_renders_raw() {
        let mut sel = effective("s", LocalizedText::same("Open"), ParameterKind::Select, Some(1));
        sel.parameter.values = vec![value("s", "left", "Левое", "Sinistra")];
        let generator = DescriptionGenerator::new(&EngineConfig::default());
        let v = values(&[("s", json!("tilt"))]);

        let text = generator.describe(&v, &DescriptionLabels::default(), &[sel], Locale::Ru);
        assert_eq!(text, "tilt");
    }

    #[test]
    fn test_custom_separator() {
        let config = EngineConfig {
            description_separator: ", ".to_string(),
            ..EngineConfig::default()
        };
        let generator = DescriptionGenerator::new(&config);
        let text = generator.describe(&ConfigurationValues::new(), &labels(), &[], Locale::Ru);
        assert_eq!(text, "Окна, ACME");
    }
}
