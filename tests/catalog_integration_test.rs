// ==========================================
// 参数目录集成测试
// ==========================================
// 测试范围:
// 1. 参数创建: 名称唯一、初始 is_global
// 2. 可选值: 规范化去重、追加顺序、停用/恢复、重排
// 3. 删除保护: 系统参数、存在绑定、曾被配置使用
// ==========================================

mod test_helpers;

use catalog_params::domain::{
    BindingOverrides, ConfigurationDraft, LocalizedText, NewParameter, NewValue, ParameterKind,
    ParameterPatch,
};
use catalog_params::ApiError;
use serde_json::json;
use test_helpers::*;

// ==========================================
// 参数创建
// ==========================================

#[test]
fn test_new_parameter_starts_global() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let p = env
        .create_simple(ParameterKind::Text, "Примечание", "Nota")
        .expect("创建失败");
    assert!(p.is_global);
    assert!(!p.is_system);
}

#[test]
fn test_duplicate_name_case_insensitive_conflict() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.create_simple(ParameterKind::Text, "Примечание", "Nota").unwrap();

    let err = env
        .state
        .catalog_api
        .create_parameter(NewParameter::new(
            LocalizedText::new("примечание", "Altro"),
            ParameterKind::Text,
        ))
        .unwrap_err();
    assert!(err.is_conflict(), "大小写不同的同名参数应冲突: {:?}", err);
}

#[test]
fn test_range_on_select_is_validation_failure() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let mut definition = NewParameter::new(LocalizedText::new("Стекло", "Vetro"), ParameterKind::Select);
    definition.min_value = Some(1.0);

    let err = env.state.catalog_api.create_parameter(definition).unwrap_err();
    match err {
        ApiError::ValidationFailed { issues } => {
            assert!(issues.iter().any(|i| i.code == "range_not_supported"));
        }
        other => panic!("应为 ValidationFailed: {:?}", other),
    }
}

#[test]
fn test_rename_keeps_identity() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let p = env.create_simple(ParameterKind::Text, "Примечание", "Nota").unwrap();

    let patch = ParameterPatch {
        name: Some(LocalizedText::new("Комментарий", "Commento")),
        ..Default::default()
    };
    let updated = env.state.catalog_api.update_parameter(&p.parameter_id, patch).unwrap();
    assert_eq!(updated.parameter_id, p.parameter_id);
    assert_eq!(updated.name.it, "Commento");
}

// ==========================================
// 可选值
// ==========================================

#[test]
fn test_value_with_trailing_space_is_duplicate() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let color = env
        .create_listed(ParameterKind::Select, "Цвет рамы", "Colore telaio", &[("White", "Белый", "Bianco")])
        .unwrap();

    let err = env
        .state
        .catalog_api
        .add_value(&color.parameter_id, NewValue::new("White "))
        .unwrap_err();
    assert!(err.is_conflict(), "规范化后重复应冲突: {:?}", err);

    let err = env
        .state
        .catalog_api
        .add_value(&color.parameter_id, NewValue::new("white"))
        .unwrap_err();
    assert!(err.is_conflict());
}

#[test]
fn test_values_append_and_explicit_position() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let glass = env
        .create_listed(
            ParameterKind::Select,
            "Стеклопакет",
            "Vetrocamera",
            &[("single", "Однокамерный", "Singolo"), ("double", "Двухкамерный", "Doppio")],
        )
        .unwrap();
    let orders: Vec<i32> = glass.values.iter().map(|v| v.sort_order).collect();
    assert_eq!(orders, vec![0, 1]);

    let mut first = NewValue::new("none").with_text("Без стекла", "Senza vetro");
    first.position = Some(0);
    env.state.catalog_api.add_value(&glass.parameter_id, first).unwrap();

    let reloaded = env.state.catalog_api.get_parameter(&glass.parameter_id).unwrap();
    let raws: Vec<&str> = reloaded.values.iter().map(|v| v.raw_value.as_str()).collect();
    assert_eq!(raws, vec!["none", "single", "double"]);
}

#[test]
fn test_deactivated_value_frees_normalized_text() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let glass = env
        .create_listed(ParameterKind::Select, "Стекло", "Vetro", &[("clear", "Прозрачное", "Trasparente")])
        .unwrap();
    let old = glass.values[0].value_id.clone();

    env.state.catalog_api.deactivate_value(&old).unwrap();
    let replacement = env
        .state
        .catalog_api
        .add_value(&glass.parameter_id, NewValue::new("Clear"))
        .expect("停用后可重新添加");

    // 旧值仍保留（软删除），但无法在冲突时恢复
    let reloaded = env.state.catalog_api.get_parameter(&glass.parameter_id).unwrap();
    assert_eq!(reloaded.values.len(), 2);
    assert!(env.state.catalog_api.reactivate_value(&old).unwrap_err().is_conflict());

    env.state.catalog_api.deactivate_value(&replacement.value_id).unwrap();
    env.state.catalog_api.reactivate_value(&old).unwrap();
}

#[test]
fn test_reorder_requires_full_permutation() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let glass = env
        .create_listed(
            ParameterKind::Select,
            "Стекло",
            "Vetro",
            &[("a", "А", "A"), ("b", "Б", "B"), ("c", "В", "C")],
        )
        .unwrap();
    let ids: Vec<String> = glass.values.iter().map(|v| v.value_id.clone()).collect();

    let partial = vec![ids[2].clone(), ids[0].clone()];
    let err = env.state.catalog_api.reorder_values(&glass.parameter_id, &partial).unwrap_err();
    assert!(matches!(err, ApiError::ValidationFailed { .. }));

    let reversed: Vec<String> = ids.iter().rev().cloned().collect();
    env.state.catalog_api.reorder_values(&glass.parameter_id, &reversed).unwrap();
    let reloaded = env.state.catalog_api.get_parameter(&glass.parameter_id).unwrap();
    let raws: Vec<&str> = reloaded.values.iter().map(|v| v.raw_value.as_str()).collect();
    assert_eq!(raws, vec!["c", "b", "a"]);
}

#[test]
fn test_hex_color_value_gets_standard_code() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let color = env.create_simple(ParameterKind::Color, "Цвет", "Colore").unwrap();
    let value = env
        .state
        .catalog_api
        .add_value(&color.parameter_id, NewValue::new("#fff"))
        .unwrap();
    let meta = value.color.expect("HEX 原始值应生成颜色元数据");
    assert_eq!(meta.hex, "#FFFFFF");
    assert_eq!(meta.standard_code.as_deref(), Some("RAL 9010"));
}

// ==========================================
// 删除保护
// ==========================================

#[test]
fn test_system_parameter_never_deletable() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.seed_directory().unwrap();
    let width = env.create_width().unwrap();

    // 无绑定
    assert!(env.state.catalog_api.delete_parameter(&width.parameter_id).unwrap_err().is_conflict());

    // 有绑定
    env.state
        .binding_api
        .bind(WINDOWS, &width.parameter_id, BindingOverrides::default())
        .unwrap();
    assert!(env.state.catalog_api.delete_parameter(&width.parameter_id).unwrap_err().is_conflict());

    // 解绑后
    env.state.binding_api.unbind(WINDOWS, &width.parameter_id).unwrap();
    assert!(env.state.catalog_api.delete_parameter(&width.parameter_id).unwrap_err().is_conflict());
}

#[test]
fn test_bound_parameter_not_deletable() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.seed_directory().unwrap();
    let p = env.create_simple(ParameterKind::Boolean, "Москитная сетка", "Zanzariera").unwrap();
    env.state
        .binding_api
        .bind(DOORS, &p.parameter_id, BindingOverrides::default())
        .unwrap();

    assert!(env.state.catalog_api.delete_parameter(&p.parameter_id).unwrap_err().is_conflict());

    env.state.binding_api.unbind(DOORS, &p.parameter_id).unwrap();
    env.state.catalog_api.delete_parameter(&p.parameter_id).unwrap();
    assert!(env.state.catalog_api.get_parameter(&p.parameter_id).unwrap_err().is_not_found());
}

#[test]
fn test_used_parameter_not_deletable() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.seed_directory().unwrap();
    let p = env.create_simple(ParameterKind::Text, "Примечание", "Nota").unwrap();

    env.state
        .configurator_api
        .save_draft(ConfigurationDraft::new(WINDOWS, ACME).set(&p.parameter_id, json!("срочно")))
        .unwrap();

    let err = env.state.catalog_api.delete_parameter(&p.parameter_id).unwrap_err();
    assert!(err.is_conflict(), "曾被配置使用的参数不可删除: {:?}", err);
}

#[test]
fn test_kind_change_blocked_when_values_exist() {
    let env = TestEnv::new().expect("无法创建测试环境");
    let glass = env
        .create_listed(ParameterKind::Select, "Стекло", "Vetro", &[("a", "А", "A")])
        .unwrap();
    let patch = ParameterPatch {
        kind: Some(ParameterKind::Text),
        ..Default::default()
    };
    assert!(env
        .state
        .catalog_api
        .update_parameter(&glass.parameter_id, patch)
        .unwrap_err()
        .is_conflict());
}
