// ==========================================
// 产品参数配置引擎 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{BindingApi, CatalogApi, ConfiguratorApi, DirectoryApi, SupplierApi};
use crate::config::{ConfigManager, EngineConfig};
use crate::db::{init_schema, open_sqlite_connection};
use crate::repository::{
    CategoryBindingRepository, ConfigurationRepository, DirectoryRepository, ParameterRepository,
    SupplierOverrideRepository,
};

/// 应用状态
///
/// 包含所有API实例和共享资源，所有仓储共用同一连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 加载时生效的引擎配置
    pub engine_config: EngineConfig,

    /// 参数目录API
    pub catalog_api: Arc<CatalogApi>,

    /// 类目绑定API
    pub binding_api: Arc<BindingApi>,

    /// 供应商覆写API
    pub supplier_api: Arc<SupplierApi>,

    /// 类目/供应商目录API
    pub directory_api: Arc<DirectoryApi>,

    /// 配置校验与描述API
    pub configurator_api: Arc<ConfiguratorApi>,

    /// 配置管理器（config_kv）
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开数据库并建表（幂等）
    /// 2. 从 config_kv 加载引擎配置
    /// 3. 创建所有Repository与API实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("建表失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let engine_config = config_manager
            .load_engine_config()
            .map_err(|e| format!("引擎配置加载失败: {}", e))?;

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let parameter_repo = Arc::new(ParameterRepository::new(conn.clone()));
        let binding_repo = Arc::new(CategoryBindingRepository::new(conn.clone()));
        let override_repo = Arc::new(SupplierOverrideRepository::new(conn.clone()));
        let configuration_repo = Arc::new(ConfigurationRepository::new(conn.clone()));
        let directory_repo = Arc::new(DirectoryRepository::new(conn));

        // ==========================================
        // 初始化API层
        // ==========================================
        let catalog_api = Arc::new(CatalogApi::new(
            parameter_repo.clone(),
            binding_repo.clone(),
            configuration_repo.clone(),
        ));
        let binding_api = Arc::new(BindingApi::new(
            binding_repo.clone(),
            parameter_repo.clone(),
            directory_repo.clone(),
        ));
        let supplier_api = Arc::new(SupplierApi::new(
            override_repo.clone(),
            parameter_repo,
            directory_repo.clone(),
            &engine_config,
        ));
        let directory_api = Arc::new(DirectoryApi::new(directory_repo.clone()));
        let configurator_api = Arc::new(ConfiguratorApi::new(
            binding_repo,
            override_repo,
            configuration_repo,
            directory_repo,
            &engine_config,
        ));

        tracing::info!(
            locale = engine_config.default_locale.code(),
            "AppState初始化完成"
        );

        Ok(Self {
            db_path,
            engine_config,
            catalog_api,
            binding_api,
            supplier_api,
            directory_api,
            configurator_api,
            config_manager,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 CATALOG_PARAMS_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("CATALOG_PARAMS_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./catalog_params.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("catalog-params");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("catalog_params.db");
        }
    }

    path.to_string_lossy().to_string()
}
