// ==========================================
// 产品参数配置引擎 - 可选值 CSV 导入
// ==========================================
// 列: raw_value（必需）, text_ru, text_it, display_name, color_hex
// 规则: 逐行走 CatalogApi::add_value，与手工新增同一套校验
// 规则: 单行的冲突/校验失败记入拒绝清单，不中断整批；存储错误中断
// ==========================================

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Serialize;
use tracing::{info, warn};

use crate::api::{ApiError, CatalogApi};
use crate::domain::parameter::NewValue;
use crate::domain::types::Locale;
use crate::importer::error::{ImportError, ImportResult};

const COL_RAW_VALUE: &str = "raw_value";

/// 导入结果汇总
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub value_ids: Vec<String>,
    pub rejected: Vec<RejectedRow>,
}

/// 被拒绝的行（row 为文件行号，表头为第 1 行）
#[derive(Debug, Clone, Serialize)]
pub struct RejectedRow {
    pub row: usize,
    pub raw_value: String,
    pub reason: String,
}

pub fn import_values_file(
    catalog: &CatalogApi,
    parameter_id: &str,
    path: &Path,
) -> ImportResult<ImportSummary> {
    let file = File::open(path)?;
    import_values_csv(catalog, parameter_id, file)
}

/// 从 CSV 读取并逐行新增可选值
pub fn import_values_csv<R: Read>(
    catalog: &CatalogApi,
    parameter_id: &str,
    reader: R,
) -> ImportResult<ImportSummary> {
    // 参数不存在则整批失败
    catalog.get_parameter(parameter_id)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 允许行长度不一致
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    if !headers.iter().any(|h| h == COL_RAW_VALUE) {
        return Err(ImportError::MissingColumn(COL_RAW_VALUE.to_string()));
    }

    let mut summary = ImportSummary::default();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        // 以文件行号报告（表头为第 1 行）；csv 会跳过空行，不能按记录序号推算
        let row_number = record
            .position()
            .map(|pos| pos.line() as usize)
            .unwrap_or(idx + 2);

        let mut row: HashMap<&str, String> = HashMap::new();
        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row.insert(header.as_str(), value.trim().to_string());
            }
        }

        // 跳过完全空白的行
        if row.values().all(|v| v.is_empty()) {
            continue;
        }

        let value = row_to_new_value(&row);
        let raw_value = value.raw_value.clone();
        match catalog.add_value(parameter_id, value) {
            Ok(created) => {
                summary.imported += 1;
                summary.value_ids.push(created.value_id);
            }
            Err(err @ (ApiError::Conflict(_) | ApiError::ValidationFailed { .. })) => {
                let reason = rejection_reason(&err);
                warn!(row = row_number, raw_value = %raw_value, reason = %reason, "可选值行被拒绝");
                summary.rejected.push(RejectedRow {
                    row: row_number,
                    raw_value,
                    reason,
                });
            }
            Err(err) => return Err(err.into()),
        }
    }

    info!(
        parameter_id = %parameter_id,
        imported = summary.imported,
        rejected = summary.rejected.len(),
        "可选值导入完成"
    );
    Ok(summary)
}

fn row_to_new_value(row: &HashMap<&str, String>) -> NewValue {
    let optional = |key: &str| row.get(key).filter(|v| !v.is_empty()).cloned();
    NewValue {
        raw_value: row.get(COL_RAW_VALUE).cloned().unwrap_or_default(),
        text_ru: optional("text_ru"),
        text_it: optional("text_it"),
        display_name: optional("display_name"),
        color_hex: optional("color_hex"),
        position: None,
    }
}

fn rejection_reason(err: &ApiError) -> String {
    let messages = err.messages(Locale::Ru);
    if messages.is_empty() {
        err.to_string()
    } else {
        messages.join("; ")
    }
}
