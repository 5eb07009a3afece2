// ==========================================
// 类目绑定集成测试
// ==========================================
// 测试范围:
// 1. is_global == (绑定数 == 0)，含反复 绑定→解绑→绑定
// 2. 多线程并发绑定/解绑后不变量仍成立
// 3. 有效参数集: 全局 ∪ 绑定、系统参数在前（宽在高前）、强制必填、幂等
// ==========================================

mod test_helpers;

use std::sync::Arc;
use std::thread;

use catalog_params::domain::{BindingOverrides, BindingPatch, CategoryRecord, LocalizedText, ParameterKind};
use test_helpers::*;

fn assert_invariant(env: &TestEnv, parameter_id: &str) {
    let parameter = env.state.catalog_api.get_parameter(parameter_id).unwrap();
    let bindings = env.state.binding_api.list_bindings_for_parameter(parameter_id).unwrap();
    assert_eq!(
        parameter.is_global,
        bindings.is_empty(),
        "is_global 与绑定数不一致: is_global={}, bindings={}",
        parameter.is_global,
        bindings.len()
    );
}

// ==========================================
// is_global 不变量
// ==========================================

#[test]
fn test_bind_two_categories_then_unbind_both() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.seed_directory().unwrap();
    let p = env.create_simple(ParameterKind::Text, "Ручка", "Maniglia").unwrap();
    let id = p.parameter_id.as_str();

    env.state.binding_api.bind(WINDOWS, id, BindingOverrides::default()).unwrap();
    assert!(!env.state.catalog_api.get_parameter(id).unwrap().is_global);

    env.state.binding_api.bind(DOORS, id, BindingOverrides::default()).unwrap();
    assert!(!env.state.catalog_api.get_parameter(id).unwrap().is_global);

    let after_doors = env.state.binding_api.unbind(DOORS, id).unwrap();
    assert!(!after_doors, "仍绑定 windows，应保持非全局");
    assert!(!env.state.catalog_api.get_parameter(id).unwrap().is_global);

    let after_windows = env.state.binding_api.unbind(WINDOWS, id).unwrap();
    assert!(after_windows);
    let reloaded = env.state.catalog_api.get_parameter(id).unwrap();
    assert!(reloaded.is_global, "最后一个绑定移除后回到全局");
}

#[test]
fn test_repeated_bind_unbind_cycles() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.seed_directory().unwrap();
    let p = env.create_simple(ParameterKind::Text, "Ручка", "Maniglia").unwrap();
    let id = p.parameter_id.as_str();

    for _ in 0..5 {
        env.state.binding_api.bind(WINDOWS, id, BindingOverrides::default()).unwrap();
        assert_invariant(&env, id);
        env.state.binding_api.unbind(WINDOWS, id).unwrap();
        assert_invariant(&env, id);
    }
    assert!(env.state.catalog_api.get_parameter(id).unwrap().is_global);
}

#[test]
fn test_concurrent_binds_keep_invariant() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.seed_directory().unwrap();
    let p = env.create_simple(ParameterKind::Text, "Ручка", "Maniglia").unwrap();

    let categories: Vec<String> = (0..8).map(|i| format!("cat-{}", i)).collect();
    for category_id in &categories {
        env.state
            .directory_api
            .upsert_category(CategoryRecord {
                category_id: category_id.clone(),
                name: LocalizedText::same(category_id.as_str()),
                dimension_unit: None,
            })
            .unwrap();
    }

    let handles: Vec<_> = categories
        .iter()
        .enumerate()
        .map(|(i, category_id)| {
            let api = Arc::clone(&env.state.binding_api);
            let category_id = category_id.clone();
            let parameter_id = p.parameter_id.clone();
            thread::spawn(move || {
                api.bind(&category_id, &parameter_id, BindingOverrides::default())
                    .expect("绑定失败");
                // 奇数线程立即解绑
                if i % 2 == 1 {
                    api.unbind(&category_id, &parameter_id).expect("解绑失败");
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("线程 panic");
    }

    assert_invariant(&env, &p.parameter_id);
    let bindings = env.state.binding_api.list_bindings_for_parameter(&p.parameter_id).unwrap();
    assert_eq!(bindings.len(), 4);

    // 全部解绑
    for binding in bindings {
        env.state.binding_api.unbind(&binding.category_id, &p.parameter_id).unwrap();
    }
    assert_invariant(&env, &p.parameter_id);
    assert!(env.state.catalog_api.get_parameter(&p.parameter_id).unwrap().is_global);
}

// ==========================================
// 有效参数集
// ==========================================

#[test]
fn test_effective_set_order_and_forced_required() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.seed_directory().unwrap();

    // 创建顺序故意打乱: 高 → 全局备注 → 宽 → 玻璃 → 仅门类
    let height = env.create_height().unwrap();
    let note = env.create_simple(ParameterKind::Text, "Примечание", "Nota").unwrap();
    let width = env.create_width().unwrap();
    let glass = env
        .create_listed(ParameterKind::Select, "Стекло", "Vetro", &[("clear", "Прозрачное", "Trasparente")])
        .unwrap();
    let threshold = env.create_simple(ParameterKind::Boolean, "Порог", "Soglia").unwrap();

    let bind = |category: &str, id: &str, overrides: BindingOverrides| {
        env.state.binding_api.bind(category, id, overrides).unwrap();
    };
    bind(WINDOWS, &glass.parameter_id, BindingOverrides::default());
    bind(WINDOWS, &height.parameter_id, BindingOverrides::default());
    bind(WINDOWS, &width.parameter_id, BindingOverrides::default());
    bind(DOORS, &threshold.parameter_id, BindingOverrides::default());

    let effective = env.state.binding_api.effective_parameters_for(WINDOWS).unwrap();
    let ids: Vec<&str> = effective.iter().map(|e| e.parameter_id()).collect();
    assert_eq!(
        ids,
        vec![
            width.parameter_id.as_str(),
            height.parameter_id.as_str(),
            glass.parameter_id.as_str(),
            note.parameter_id.as_str(),
        ],
        "系统参数在前（宽在高前），随后绑定参数，最后全局参数；其他类目的绑定参数不出现"
    );

    // 系统参数绑定时未设必填，读取时强制必填
    assert!(effective[0].is_required);
    assert!(effective[1].is_required);
    assert!(!effective[2].is_required);
    assert!(effective[3].order.is_none());
}

#[test]
fn test_effective_set_is_idempotent() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.seed_directory().unwrap();
    let width = env.create_width().unwrap();
    env.create_height().unwrap();
    env.create_simple(ParameterKind::Text, "Примечание", "Nota").unwrap();
    env.state
        .binding_api
        .bind(WINDOWS, &width.parameter_id, BindingOverrides::default())
        .unwrap();

    let first = env.state.binding_api.effective_parameters_for(WINDOWS).unwrap();
    let second = env.state.binding_api.effective_parameters_for(WINDOWS).unwrap();
    let key = |items: &[catalog_params::EffectiveParameter]| -> Vec<(String, bool, Option<i32>)> {
        items
            .iter()
            .map(|e| (e.parameter_id().to_string(), e.is_required, e.order))
            .collect()
    };
    assert_eq!(key(&first), key(&second));
}

#[test]
fn test_binding_overrides_visible_in_effective_set() {
    let env = TestEnv::new().expect("无法创建测试环境");
    env.seed_directory().unwrap();
    let glass = env
        .create_listed(ParameterKind::Select, "Стекло", "Vetro", &[("clear", "Прозрачное", "Trasparente")])
        .unwrap();
    let overrides = BindingOverrides {
        is_required: true,
        display_name_ru: Some("Тип стекла".to_string()),
        default_value: Some("clear".to_string()),
        ..Default::default()
    };
    env.state.binding_api.bind(WINDOWS, &glass.parameter_id, overrides).unwrap();

    let effective = env.state.binding_api.effective_parameters_for(WINDOWS).unwrap();
    let item = effective.iter().find(|e| e.parameter_id() == glass.parameter_id).unwrap();
    assert!(item.is_required);
    assert_eq!(item.display_name.ru, "Тип стекла");
    assert_eq!(item.display_name.it, "Vetro");
    assert_eq!(item.default_value.as_deref(), Some("clear"));

    // 清空覆写名称后回退到参数名称
    let patch = BindingPatch {
        display_name_ru: Some(None),
        ..Default::default()
    };
    env.state.binding_api.update_binding(WINDOWS, &glass.parameter_id, patch).unwrap();
    let effective = env.state.binding_api.effective_parameters_for(WINDOWS).unwrap();
    let item = effective.iter().find(|e| e.parameter_id() == glass.parameter_id).unwrap();
    assert_eq!(item.display_name.ru, "Стекло");
}

#[test]
fn test_effective_set_unknown_category() {
    let env = TestEnv::new().expect("无法创建测试环境");
    assert!(env
        .state
        .binding_api
        .effective_parameters_for("sheds")
        .unwrap_err()
        .is_not_found());
}
