// ==========================================
// 产品参数配置引擎 - 参数目录 API
// ==========================================
// 职责: 参数与可选值的生命周期管理
// 规则:
//   - 参数名称按语言在整个目录内唯一（忽略大小写）
//   - 新建参数一律 is_global = true
//   - 系统参数、被绑定参数、被配置使用过的参数不可删除
//   - 可选值只做软删除；启用值按规范化文本唯一
// ==========================================

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator;
use crate::domain::parameter::{
    ColorMeta, LocalizedText, NewParameter, NewValue, Parameter, ParameterPatch, ParameterValue,
};
use crate::domain::types::ParameterKind;
use crate::engine::color::{looks_like_hex, nearest_standard_color, normalize_hex};
use crate::engine::normalize::normalize_text;
use crate::repository::binding_repo::CategoryBindingRepository;
use crate::repository::configuration_repo::ConfigurationRepository;
use crate::repository::parameter_repo::ParameterRepository;

// ==========================================
// CatalogApi - 参数目录 API
// ==========================================
pub struct CatalogApi {
    parameter_repo: Arc<ParameterRepository>,
    binding_repo: Arc<CategoryBindingRepository>,
    configuration_repo: Arc<ConfigurationRepository>,
}

impl CatalogApi {
    pub fn new(
        parameter_repo: Arc<ParameterRepository>,
        binding_repo: Arc<CategoryBindingRepository>,
        configuration_repo: Arc<ConfigurationRepository>,
    ) -> Self {
        Self {
            parameter_repo,
            binding_repo,
            configuration_repo,
        }
    }

    // ==========================================
    // 参数
    // ==========================================

    /// 新建参数
    ///
    /// # 错误
    /// - ValidationFailed: 名称为空、范围非法、类型与范围不匹配
    /// - Conflict: 任一语言的名称与已有参数重复（忽略大小写）
    pub fn create_parameter(&self, definition: NewParameter) -> ApiResult<Parameter> {
        let now = Utc::now().naive_utc();
        let parameter = Parameter {
            parameter_id: Uuid::new_v4().to_string(),
            name: LocalizedText::new(definition.name.ru.trim(), definition.name.it.trim()),
            kind: definition.kind,
            unit: trimmed(definition.unit),
            min_value: definition.min_value,
            max_value: definition.max_value,
            step_value: definition.step_value,
            is_system: definition.is_system || definition.system_role.is_some(),
            system_role: definition.system_role,
            is_global: true,
            values: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        validator::into_result(validator::check_parameter_definition(&parameter))?;
        self.ensure_unique_name(&parameter.name, None)?;

        self.parameter_repo.insert(&parameter)?;
        info!(
            parameter_id = %parameter.parameter_id,
            kind = %parameter.kind,
            is_system = parameter.is_system,
            "参数已创建"
        );
        Ok(parameter)
    }

    /// 更新参数定义
    ///
    /// # 错误
    /// - NotFound: 参数不存在
    /// - Conflict: 名称重复；已有可选值或已被配置使用时修改类型
    pub fn update_parameter(&self, parameter_id: &str, patch: ParameterPatch) -> ApiResult<Parameter> {
        let mut parameter = self.get_parameter(parameter_id)?;

        if let Some(kind) = patch.kind {
            if kind != parameter.kind {
                if self.parameter_repo.has_values(parameter_id)? {
                    return Err(ApiError::Conflict(format!(
                        "参数(id={})已有可选值，不能修改类型",
                        parameter_id
                    )));
                }
                if self.configuration_repo.count_usage_of_parameter(parameter_id)? > 0 {
                    return Err(ApiError::Conflict(format!(
                        "参数(id={})已被配置使用，不能修改类型",
                        parameter_id
                    )));
                }
                parameter.kind = kind;
            }
        }
        if let Some(name) = patch.name {
            parameter.name = LocalizedText::new(name.ru.trim(), name.it.trim());
        }
        if let Some(unit) = patch.unit {
            parameter.unit = trimmed(unit);
        }
        if let Some(min) = patch.min_value {
            parameter.min_value = min;
        }
        if let Some(max) = patch.max_value {
            parameter.max_value = max;
        }
        if let Some(step) = patch.step_value {
            parameter.step_value = step;
        }
        parameter.updated_at = Utc::now().naive_utc();

        validator::into_result(validator::check_parameter_definition(&parameter))?;
        self.ensure_unique_name(&parameter.name, Some(parameter_id))?;

        self.parameter_repo.update(&parameter)?;
        info!(parameter_id = %parameter_id, "参数已更新");
        self.get_parameter(parameter_id)
    }

    /// 查询参数（含 is_global 与全部可选值）
    pub fn get_parameter(&self, parameter_id: &str) -> ApiResult<Parameter> {
        self.parameter_repo
            .find_by_id(parameter_id)?
            .ok_or_else(|| ApiError::NotFound(format!("参数(id={})不存在", parameter_id)))
    }

    /// 查询全部参数（按创建顺序）
    pub fn list_parameters(&self) -> ApiResult<Vec<Parameter>> {
        Ok(self.parameter_repo.list_all()?)
    }

    /// 删除参数
    ///
    /// # 错误
    /// - NotFound: 参数不存在
    /// - Conflict: 系统参数 / 存在类目绑定 / 曾被配置使用
    pub fn delete_parameter(&self, parameter_id: &str) -> ApiResult<()> {
        let parameter = self.get_parameter(parameter_id)?;

        if parameter.is_system {
            return Err(ApiError::Conflict(format!(
                "系统参数(id={})不可删除",
                parameter_id
            )));
        }
        let bindings = self.binding_repo.count_by_parameter(parameter_id)?;
        if bindings > 0 {
            return Err(ApiError::Conflict(format!(
                "参数(id={})仍被 {} 个类目绑定",
                parameter_id, bindings
            )));
        }
        let usage = self.configuration_repo.count_usage_of_parameter(parameter_id)?;
        if usage > 0 {
            return Err(ApiError::Conflict(format!(
                "参数(id={})已被 {} 个配置使用",
                parameter_id, usage
            )));
        }

        self.parameter_repo.delete(parameter_id)?;
        info!(parameter_id = %parameter_id, "参数已删除");
        Ok(())
    }

    // ==========================================
    // 可选值
    // ==========================================

    /// 新增可选值
    ///
    /// # 规则
    /// - 原始值去首尾空白后保存
    /// - 规范化文本（去空白 + 小写）在启用值中唯一，重复则 Conflict
    /// - COLOR: color_hex 缺省时若原始值本身是 HEX 则用作颜色
    pub fn add_value(&self, parameter_id: &str, value: NewValue) -> ApiResult<ParameterValue> {
        let parameter = self.get_parameter(parameter_id)?;
        validator::into_result(validator::check_new_value(parameter.kind, &value))?;

        let raw_value = value.raw_value.trim().to_string();
        let normalized = normalize_text(&raw_value);
        if let Some(existing) = self
            .parameter_repo
            .find_active_value_by_normalized(parameter_id, &normalized)?
        {
            return Err(ApiError::Conflict(format!(
                "参数(id={})已存在相同的启用值: {}",
                parameter_id, existing.raw_value
            )));
        }

        let color = if parameter.kind == ParameterKind::Color {
            color_meta(value.color_hex.as_deref(), &raw_value)
        } else {
            None
        };

        let text_ru = trimmed(value.text_ru).unwrap_or_else(|| raw_value.clone());
        let text_it = trimmed(value.text_it).unwrap_or_else(|| raw_value.clone());
        let mut record = ParameterValue {
            value_id: Uuid::new_v4().to_string(),
            parameter_id: parameter_id.to_string(),
            raw_value,
            text: LocalizedText::new(text_ru, text_it),
            display_name: trimmed(value.display_name),
            color,
            sort_order: 0,
            is_active: true,
            created_at: Utc::now().naive_utc(),
        };

        record.sort_order = self
            .parameter_repo
            .insert_value(&record, &normalized, value.position)?;
        debug!(
            parameter_id = %parameter_id,
            value_id = %record.value_id,
            sort_order = record.sort_order,
            "可选值已添加"
        );
        Ok(record)
    }

    /// 停用可选值（软删除）
    pub fn deactivate_value(&self, value_id: &str) -> ApiResult<()> {
        let changed = self.parameter_repo.set_value_active(value_id, false)?;
        if changed == 0 {
            return Err(ApiError::NotFound(format!("可选值(id={})不存在", value_id)));
        }
        info!(value_id = %value_id, "可选值已停用");
        Ok(())
    }

    /// 恢复可选值
    ///
    /// # 错误
    /// - Conflict: 已有规范化文本相同的启用值
    pub fn reactivate_value(&self, value_id: &str) -> ApiResult<()> {
        let value = self
            .parameter_repo
            .find_value(value_id)?
            .ok_or_else(|| ApiError::NotFound(format!("可选值(id={})不存在", value_id)))?;
        if value.is_active {
            return Ok(());
        }

        let normalized = self
            .parameter_repo
            .value_normalized(value_id)?
            .unwrap_or_else(|| normalize_text(&value.raw_value));
        if self
            .parameter_repo
            .find_active_value_by_normalized(&value.parameter_id, &normalized)?
            .is_some()
        {
            return Err(ApiError::Conflict(format!(
                "参数(id={})已存在相同的启用值: {}",
                value.parameter_id, value.raw_value
            )));
        }

        self.parameter_repo.set_value_active(value_id, true)?;
        info!(value_id = %value_id, "可选值已恢复");
        Ok(())
    }

    /// 按给定顺序重排全部可选值（0..n）
    pub fn reorder_values(&self, parameter_id: &str, ordered_value_ids: &[String]) -> ApiResult<()> {
        let parameter = self.get_parameter(parameter_id)?;
        validator::into_result(validator::check_value_order(&parameter, ordered_value_ids))?;
        self.parameter_repo.reorder_values(parameter_id, ordered_value_ids)?;
        debug!(parameter_id = %parameter_id, count = ordered_value_ids.len(), "可选值已重排");
        Ok(())
    }

    /// 名称唯一性（按语言，忽略大小写；exclude 为更新时的自身 id）
    fn ensure_unique_name(&self, name: &LocalizedText, exclude: Option<&str>) -> ApiResult<()> {
        let ru = normalize_text(&name.ru);
        let it = normalize_text(&name.it);

        let mut taken_ru: HashSet<String> = HashSet::new();
        let mut taken_it: HashSet<String> = HashSet::new();
        for (id, existing) in self.parameter_repo.list_names()? {
            if Some(id.as_str()) == exclude {
                continue;
            }
            taken_ru.insert(normalize_text(&existing.ru));
            taken_it.insert(normalize_text(&existing.it));
        }

        if taken_ru.contains(&ru) {
            return Err(ApiError::Conflict(format!("参数名称重复 (ru): {}", name.ru)));
        }
        if taken_it.contains(&it) {
            return Err(ApiError::Conflict(format!("参数名称重复 (it): {}", name.it)));
        }
        Ok(())
    }
}

fn trimmed(text: Option<String>) -> Option<String> {
    text.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// 颜色元数据: 显式 HEX 优先，其次原始值本身
fn color_meta(color_hex: Option<&str>, raw_value: &str) -> Option<ColorMeta> {
    let source = match color_hex.map(str::trim).filter(|h| !h.is_empty()) {
        Some(hex) => hex,
        None if looks_like_hex(raw_value) => raw_value,
        None => return None,
    };
    let hex = normalize_hex(source)?;
    let standard_code = nearest_standard_color(&hex).map(str::to_string);
    Some(ColorMeta { hex, standard_code })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::SystemRole;
    use std::sync::Mutex;

    fn setup() -> CatalogApi {
        let conn = Arc::new(Mutex::new(crate::db::open_in_memory().unwrap()));
        CatalogApi::new(
            Arc::new(ParameterRepository::new(conn.clone())),
            Arc::new(CategoryBindingRepository::new(conn.clone())),
            Arc::new(ConfigurationRepository::new(conn)),
        )
    }

    fn select(api: &CatalogApi, ru: &str, it: &str) -> Parameter {
        api.create_parameter(NewParameter::new(LocalizedText::new(ru, it), ParameterKind::Select))
            .unwrap()
    }

    #[test]
    fn test_new_parameter_is_global() {
        let api = setup();
        let p = select(&api, "Цвет", "Colore");
        assert!(p.is_global);
        assert!(api.get_parameter(&p.parameter_id).unwrap().is_global);
    }

    #[test]
    fn test_duplicate_name_is_conflict_case_insensitive() {
        let api = setup();
        select(&api, "Цвет", "Colore");
        let err = api
            .create_parameter(NewParameter::new(
                LocalizedText::new("Другое", "COLORE "),
                ParameterKind::Text,
            ))
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_system_role_implies_system() {
        let api = setup();
        let mut def = NewParameter::new(LocalizedText::new("Ширина", "Larghezza"), ParameterKind::Number);
        def.system_role = Some(SystemRole::Width);
        let p = api.create_parameter(def).unwrap();
        assert!(p.is_system);

        let err = api.delete_parameter(&p.parameter_id).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_invalid_range_is_validation_failure() {
        let api = setup();
        let mut def = NewParameter::new(LocalizedText::new("Вес", "Peso"), ParameterKind::Number);
        def.min_value = Some(10.0);
        def.max_value = Some(1.0);
        match api.create_parameter(def) {
            Err(ApiError::ValidationFailed { issues }) => assert_eq!(issues[0].code, "range_invalid"),
            other => panic!("Expected ValidationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_value_after_normalization() {
        let api = setup();
        let p = select(&api, "Цвет", "Colore");
        api.add_value(&p.parameter_id, NewValue::new("White")).unwrap();

        let err = api.add_value(&p.parameter_id, NewValue::new("White ")).unwrap_err();
        assert!(err.is_conflict());
        let err = api.add_value(&p.parameter_id, NewValue::new("white")).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_values_append_and_insert_at_position() {
        let api = setup();
        let p = select(&api, "Открывание", "Apertura");
        let a = api.add_value(&p.parameter_id, NewValue::new("left")).unwrap();
        let b = api.add_value(&p.parameter_id, NewValue::new("right")).unwrap();
        assert_eq!((a.sort_order, b.sort_order), (0, 1));

        let mut first = NewValue::new("tilt");
        first.position = Some(0);
        api.add_value(&p.parameter_id, first).unwrap();

        let raws: Vec<String> = api
            .get_parameter(&p.parameter_id)
            .unwrap()
            .values
            .into_iter()
            .map(|v| v.raw_value)
            .collect();
        assert_eq!(raws, vec!["tilt", "left", "right"]);
    }

    #[test]
    fn test_value_position_negative_rejected_and_past_end_appended() {
        let api = setup();
        let p = select(&api, "Открывание", "Apertura");
        api.add_value(&p.parameter_id, NewValue::new("left")).unwrap();

        let mut negative = NewValue::new("tilt");
        negative.position = Some(-1);
        let err = api.add_value(&p.parameter_id, negative).unwrap_err();
        match err {
            ApiError::ValidationFailed { issues } => assert_eq!(issues[0].code, "invalid_position"),
            other => panic!("unexpected error: {:?}", other),
        }

        let mut far = NewValue::new("right");
        far.position = Some(50);
        let right = api.add_value(&p.parameter_id, far).unwrap();
        assert_eq!(right.sort_order, 1);

        let orders: Vec<i32> = api
            .get_parameter(&p.parameter_id)
            .unwrap()
            .values
            .iter()
            .map(|v| v.sort_order)
            .collect();
        assert_eq!(orders, vec![0, 1]);
    }

    #[test]
    fn test_deactivate_then_readd_then_reactivate_conflicts() {
        let api = setup();
        let p = select(&api, "Стекло", "Vetro");
        let v = api.add_value(&p.parameter_id, NewValue::new("Matt")).unwrap();
        api.deactivate_value(&v.value_id).unwrap();

        // 停用值不参与唯一性
        api.add_value(&p.parameter_id, NewValue::new("matt")).unwrap();

        let err = api.reactivate_value(&v.value_id).unwrap_err();
        assert!(err.is_conflict());
    }

    #[test]
    fn test_color_value_gets_hex_and_standard_code() {
        let api = setup();
        let p = api
            .create_parameter(NewParameter::new(LocalizedText::new("Цвет", "Colore"), ParameterKind::Color))
            .unwrap();
        let v = api.add_value(&p.parameter_id, NewValue::new("#fff")).unwrap();
        let color = v.color.unwrap();
        assert_eq!(color.hex, "#FFFFFF");
        assert_eq!(color.standard_code.as_deref(), Some("RAL 9010"));
    }

    #[test]
    fn test_values_not_supported_for_text() {
        let api = setup();
        let p = api
            .create_parameter(NewParameter::new(LocalizedText::new("Заметка", "Nota"), ParameterKind::Text))
            .unwrap();
        let err = api.add_value(&p.parameter_id, NewValue::new("x")).unwrap_err();
        assert!(matches!(err, ApiError::ValidationFailed { .. }));
    }

    #[test]
    fn test_kind_change_blocked_once_values_exist() {
        let api = setup();
        let p = select(&api, "Ручка", "Maniglia");
        api.add_value(&p.parameter_id, NewValue::new("steel")).unwrap();
        let patch = ParameterPatch {
            kind: Some(ParameterKind::Text),
            ..Default::default()
        };
        assert!(api.update_parameter(&p.parameter_id, patch).unwrap_err().is_conflict());
    }

    #[test]
    fn test_update_keeps_own_name() {
        let api = setup();
        let p = select(&api, "Ручка", "Maniglia");
        let patch = ParameterPatch {
            name: Some(LocalizedText::new("ручка", "Maniglia")),
            ..Default::default()
        };
        let updated = api.update_parameter(&p.parameter_id, patch).unwrap();
        assert_eq!(updated.name.ru, "ручка");
    }

    #[test]
    fn test_reorder_requires_full_permutation() {
        let api = setup();
        let p = select(&api, "Профиль", "Profilo");
        let a = api.add_value(&p.parameter_id, NewValue::new("a")).unwrap();
        let b = api.add_value(&p.parameter_id, NewValue::new("b")).unwrap();

        let err = api
            .reorder_values(&p.parameter_id, &[b.value_id.clone()])
            .unwrap_err();
        assert!(matches!(err, ApiError::ValidationFailed { .. }));

        api.reorder_values(&p.parameter_id, &[b.value_id.clone(), a.value_id.clone()])
            .unwrap();
        let values = api.get_parameter(&p.parameter_id).unwrap().values;
        assert_eq!(values[0].value_id, b.value_id);
    }
}
