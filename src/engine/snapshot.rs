// ==========================================
// 产品参数配置引擎 - 参数快照
// ==========================================
// 职责: 签发时捕获参数元数据；渲染时由快照还原 EffectiveParameter
// 场景: 参数被删除/改名/取值停用后，历史配置仍按签发时的样子渲染
// ==========================================

use crate::domain::binding::EffectiveParameter;
use crate::domain::configuration::{ConfigurationValues, ParameterSnapshot};
use crate::domain::parameter::{LocalizedText, Parameter, ParameterValue};
use crate::domain::types::Locale;
use crate::engine::normalize::value_as_text;
use chrono::NaiveDateTime;

/// 按有效参数集顺序捕获快照
pub fn capture_snapshot(
    effective: &[EffectiveParameter],
    values: &ConfigurationValues,
) -> Vec<ParameterSnapshot> {
    effective
        .iter()
        .map(|item| {
            let parameter = &item.parameter;
            let value_text = if parameter.kind.has_values() {
                values
                    .get(parameter.parameter_id.as_str())
                    .and_then(value_as_text)
                    .and_then(|raw| parameter.find_value(&raw))
                    .map(|v| LocalizedText::new(v.display(Locale::Ru), v.display(Locale::It)))
            } else {
                None
            };

            ParameterSnapshot {
                parameter_id: parameter.parameter_id.clone(),
                name: item.display_name.clone(),
                kind: parameter.kind,
                unit: parameter.unit.clone(),
                system_role: parameter.system_role,
                is_system: parameter.is_system,
                order: item.order,
                value_text,
            }
        })
        .collect()
}

/// 由快照还原一个可渲染的有效参数
///
/// 若快照记录了取值文本，则合成一个对应当前原始值的 ParameterValue
pub fn restore_effective(
    snapshot: &ParameterSnapshot,
    values: &ConfigurationValues,
    at: NaiveDateTime,
) -> EffectiveParameter {
    let raw = values
        .get(snapshot.parameter_id.as_str())
        .and_then(value_as_text);

    let synthetic_values = match (raw, &snapshot.value_text) {
        (Some(raw_value), Some(text)) => vec![ParameterValue {
            value_id: format!("snapshot:{}", snapshot.parameter_id),
            parameter_id: snapshot.parameter_id.clone(),
            raw_value,
            text: text.clone(),
            display_name: None,
            color: None,
            sort_order: 0,
            is_active: false,
            created_at: at,
        }],
        _ => Vec::new(),
    };

    let parameter = Parameter {
        parameter_id: snapshot.parameter_id.clone(),
        name: snapshot.name.clone(),
        kind: snapshot.kind,
        unit: snapshot.unit.clone(),
        min_value: None,
        max_value: None,
        step_value: None,
        is_system: snapshot.is_system,
        system_role: snapshot.system_role,
        is_global: false,
        values: synthetic_values,
        created_at: at,
        updated_at: at,
    };

    EffectiveParameter {
        is_required: parameter.is_forced_required(),
        parameter,
        binding: None,
        is_visible: true,
        order: snapshot.order,
        display_name: snapshot.name.clone(),
        default_value: None,
        help_text: None,
    }
}

/// 整份快照还原（保持签发时顺序）
pub fn restore_all(
    snapshots: &[ParameterSnapshot],
    values: &ConfigurationValues,
    at: NaiveDateTime,
) -> Vec<EffectiveParameter> {
    snapshots
        .iter()
        .map(|s| restore_effective(s, values, at))
        .collect()
}
