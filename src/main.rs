// ==========================================
// 产品参数配置引擎 - 命令行入口
// ==========================================
// 用法:
//   catalog-params [--db PATH] init
//   catalog-params [--db PATH] validate <configuration_id>
//   catalog-params [--db PATH] describe <configuration_id> [ru|it]
//   catalog-params [--db PATH] issue <configuration_id>
//   catalog-params [--db PATH] import-values <parameter_id> <file.csv>
//   catalog-params [--db PATH] config [set KEY VALUE]
// ==========================================

use std::path::Path;
use std::process::ExitCode;

use catalog_params::app::{get_default_db_path, AppState};
use catalog_params::domain::types::Locale;
use catalog_params::importer::import_values_file;
use catalog_params::logging;

const USAGE: &str = "用法: catalog-params [--db PATH] <init|validate ID|describe ID [ru|it]|issue ID|import-values PARAM_ID FILE|config [set KEY VALUE]>";

fn main() -> ExitCode {
    logging::init();

    match run(std::env::args().skip(1).collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(mut args: Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = match args.iter().position(|a| a == "--db") {
        Some(idx) if idx + 1 < args.len() => {
            let path = args.remove(idx + 1);
            args.remove(idx);
            path
        }
        Some(_) => return Err("--db 需要路径参数".into()),
        None => get_default_db_path(),
    };

    tracing::info!("{} v{}，数据库: {}", catalog_params::APP_NAME, catalog_params::VERSION, db_path);
    let state = AppState::new(db_path)?;

    let mut args = args.into_iter();
    let command = args.next().ok_or(USAGE)?;
    match command.as_str() {
        "init" => {
            println!("ok: {}", state.db_path);
        }
        "validate" => {
            let id = args.next().ok_or(USAGE)?;
            let configuration = state.configurator_api.get_configuration(&id)?;
            let result = state.configurator_api.validate_configuration(&configuration)?;
            let locale = state.engine_config.default_locale;
            if result.valid {
                println!("valid");
            } else {
                for issue in &result.errors {
                    println!("{}\t{}\t{}", issue.field, issue.code, issue.message.get(locale));
                }
                return Err(format!("{} 个问题", result.errors.len()).into());
            }
        }
        "describe" => {
            let id = args.next().ok_or(USAGE)?;
            let locale = match args.next() {
                Some(code) => code.parse::<Locale>()?,
                None => state.engine_config.default_locale,
            };
            println!("{}", state.configurator_api.describe_configuration(&id, locale)?);
        }
        "issue" => {
            let id = args.next().ok_or(USAGE)?;
            let issued = state.configurator_api.issue(&id)?;
            println!("{}\t{}", issued.configuration_id, issued.status.to_db_str());
        }
        "import-values" => {
            let parameter_id = args.next().ok_or(USAGE)?;
            let file = args.next().ok_or(USAGE)?;
            let summary = import_values_file(&state.catalog_api, &parameter_id, Path::new(&file))?;
            println!("imported={} rejected={}", summary.imported, summary.rejected.len());
            for row in &summary.rejected {
                println!("{}\t{}\t{}", row.row, row.raw_value, row.reason);
            }
        }
        "config" => match args.next().as_deref() {
            Some("set") => {
                let key = args.next().ok_or(USAGE)?;
                let value = args.next().ok_or(USAGE)?;
                state.config_manager.set_global_config_value(&key, &value)?;
                println!("{}", state.config_manager.get_config_snapshot()?);
            }
            Some(_) => return Err(USAGE.into()),
            None => {
                println!("{}", serde_json::to_string_pretty(&state.engine_config)?);
            }
        },
        _ => return Err(USAGE.into()),
    }
    Ok(())
}
