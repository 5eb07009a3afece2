// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库上的完整 AppState + 常用目录数据
// ==========================================

#![allow(dead_code)]

use catalog_params::app::AppState;
use catalog_params::logging;
use catalog_params::domain::{
    CategoryRecord, LocalizedText, NewParameter, NewValue, Parameter, ParameterKind,
    SupplierRecord, SystemRole,
};
use std::error::Error;
use tempfile::NamedTempFile;

pub const WINDOWS: &str = "windows";
pub const DOORS: &str = "doors";
pub const ACME: &str = "acme";
pub const OTHER_SUPPLIER: &str = "nord";

/// 测试环境（临时文件需随环境存活）
pub struct TestEnv {
    _temp_file: NamedTempFile,
    pub db_path: String,
    pub state: AppState,
}

impl TestEnv {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        Self::with_config(&[])
    }

    /// 先写入 config_kv 再装配 AppState
    pub fn with_config(entries: &[(&str, &str)]) -> Result<Self, Box<dyn Error>> {
        logging::init_test();
        let temp_file = NamedTempFile::new()?;
        let db_path = temp_file.path().to_string_lossy().to_string();

        if !entries.is_empty() {
            // 建表由 AppState 完成，先装配一次
            let bootstrap = AppState::new(db_path.clone())?;
            for (key, value) in entries {
                bootstrap.config_manager.set_global_config_value(key, value)?;
            }
        }

        let state = AppState::new(db_path.clone())?;
        Ok(Self {
            _temp_file: temp_file,
            db_path,
            state,
        })
    }

    /// 两个类目（门窗，单位 mm）+ 两个供应商
    pub fn seed_directory(&self) -> Result<(), Box<dyn Error>> {
        let directory = &self.state.directory_api;
        directory.upsert_category(CategoryRecord {
            category_id: WINDOWS.to_string(),
            name: LocalizedText::new("Окна", "Finestre"),
            dimension_unit: Some("mm".to_string()),
        })?;
        directory.upsert_category(CategoryRecord {
            category_id: DOORS.to_string(),
            name: LocalizedText::new("Двери", "Porte"),
            dimension_unit: Some("mm".to_string()),
        })?;
        directory.upsert_supplier(SupplierRecord {
            supplier_id: ACME.to_string(),
            name: "ACME Serramenti S.r.l.".to_string(),
            short_name: Some("ACME".to_string()),
        })?;
        directory.upsert_supplier(SupplierRecord {
            supplier_id: OTHER_SUPPLIER.to_string(),
            name: "Nord Okna".to_string(),
            short_name: None,
        })?;
        Ok(())
    }

    pub fn create_dimension(
        &self,
        role: SystemRole,
        ru: &str,
        it: &str,
        min: Option<f64>,
        max: Option<f64>,
    ) -> Result<Parameter, Box<dyn Error>> {
        let mut definition = NewParameter::new(LocalizedText::new(ru, it), ParameterKind::Number);
        definition.unit = Some("mm".to_string());
        definition.is_system = true;
        definition.system_role = Some(role);
        definition.min_value = min;
        definition.max_value = max;
        Ok(self.state.catalog_api.create_parameter(definition)?)
    }

    pub fn create_width(&self) -> Result<Parameter, Box<dyn Error>> {
        self.create_dimension(SystemRole::Width, "Ширина", "Larghezza", Some(300.0), Some(3000.0))
    }

    pub fn create_height(&self) -> Result<Parameter, Box<dyn Error>> {
        self.create_dimension(SystemRole::Height, "Высота", "Altezza", Some(300.0), Some(3000.0))
    }

    pub fn create_model(&self) -> Result<Parameter, Box<dyn Error>> {
        let mut definition =
            NewParameter::new(LocalizedText::new("Модель", "Modello"), ParameterKind::Text);
        definition.system_role = Some(SystemRole::Model);
        Ok(self.state.catalog_api.create_parameter(definition)?)
    }

    /// 列表型参数 + 可选值（原始值, 俄语, 意大利语）
    pub fn create_listed(
        &self,
        kind: ParameterKind,
        ru: &str,
        it: &str,
        values: &[(&str, &str, &str)],
    ) -> Result<Parameter, Box<dyn Error>> {
        let parameter = self
            .state
            .catalog_api
            .create_parameter(NewParameter::new(LocalizedText::new(ru, it), kind))?;
        for (raw, text_ru, text_it) in values {
            self.state
                .catalog_api
                .add_value(&parameter.parameter_id, NewValue::new(*raw).with_text(*text_ru, *text_it))?;
        }
        Ok(self.state.catalog_api.get_parameter(&parameter.parameter_id)?)
    }

    pub fn create_simple(&self, kind: ParameterKind, ru: &str, it: &str) -> Result<Parameter, Box<dyn Error>> {
        Ok(self
            .state
            .catalog_api
            .create_parameter(NewParameter::new(LocalizedText::new(ru, it), kind))?)
    }
}
