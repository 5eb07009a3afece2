// ==========================================
// 产品参数配置引擎 - 类目有效参数集
// ==========================================
// 职责: 全局参数 ∪ 类目绑定参数 → 有序 EffectiveParameter 列表
// 排序: 系统参数优先（宽 → 高 → 型号 → 其他系统参数）
//       → 绑定参数按绑定顺序（同序按 parameter_id）
//       → 其余全局参数按创建顺序
// 红线: 纯函数，同一输入多次调用结果一致
// ==========================================

use crate::domain::binding::{CategoryBinding, EffectiveParameter};
use crate::domain::parameter::{LocalizedText, Parameter};
use crate::repository::binding_repo::CategoryParameterView;
use std::collections::HashSet;

/// 系统参数中无角色者排在有角色者之后
const NO_ROLE_RANK: u8 = 3;

/// 由类目视图构建有效参数列表
pub fn build_effective_parameters(view: &CategoryParameterView) -> Vec<EffectiveParameter> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut entries: Vec<(SortKey, EffectiveParameter)> = Vec::new();

    for (binding, parameter) in &view.bound {
        if !seen.insert(parameter.parameter_id.as_str()) {
            continue;
        }
        let effective = from_binding(binding, parameter);
        let key = SortKey::for_parameter(&effective, entries.len());
        entries.push((key, effective));
    }

    for parameter in &view.global_parameters {
        if !seen.insert(parameter.parameter_id.as_str()) {
            continue;
        }
        let effective = from_global(parameter);
        let key = SortKey::for_parameter(&effective, entries.len());
        entries.push((key, effective));
    }

    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    entries.into_iter().map(|(_, effective)| effective).collect()
}

/// 绑定参数: 合并绑定覆写
fn from_binding(binding: &CategoryBinding, parameter: &Parameter) -> EffectiveParameter {
    EffectiveParameter {
        parameter: parameter.clone(),
        binding: Some(binding.clone()),
        is_required: binding.is_required || parameter.is_forced_required(),
        is_visible: binding.is_visible,
        order: Some(binding.sort_order),
        display_name: LocalizedText {
            ru: override_or(&binding.display_name_ru, &parameter.name.ru),
            it: override_or(&binding.display_name_it, &parameter.name.it),
        },
        default_value: binding.default_value.clone(),
        help_text: binding.help_text.clone(),
    }
}

/// 全局参数: 无绑定覆写，仅系统/型号参数强制必填
fn from_global(parameter: &Parameter) -> EffectiveParameter {
    EffectiveParameter {
        parameter: parameter.clone(),
        binding: None,
        is_required: parameter.is_forced_required(),
        is_visible: true,
        order: None,
        display_name: parameter.name.clone(),
        default_value: None,
        help_text: None,
    }
}

fn override_or(custom: &Option<String>, base: &str) -> String {
    match custom.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => base.to_string(),
    }
}

/// 排序键: (分组, 角色序, 绑定序, 输入序)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    group: u8,
    role_rank: u8,
    order: i32,
    position: usize,
}

impl SortKey {
    fn for_parameter(effective: &EffectiveParameter, position: usize) -> Self {
        let parameter = &effective.parameter;
        let group = if parameter.is_system || parameter.system_role.is_some() {
            0
        } else if effective.binding.is_some() {
            1
        } else {
            2
        };
        let role_rank = parameter
            .system_role
            .map(|role| role.sort_rank())
            .unwrap_or(NO_ROLE_RANK);
        Self {
            group,
            role_rank,
            order: effective.order.unwrap_or(i32::MAX),
            position,
        }
    }
}
