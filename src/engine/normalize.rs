// ==========================================
// 产品参数配置引擎 - 取值规范化纯函数
// ==========================================
// 职责: 文本规范化、空值判定、数值/布尔强制转换、数值格式化
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use serde_json::Value;

/// 唯一性比较用的规范化文本: 去首尾空白 + 小写
pub fn normalize_text(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// 未设置 / null / 空字符串（含纯空白）均视为“无值”
pub fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// 标量转文本；对象/数组/布尔不视为文本
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// 取值的可读形式（错误消息用）
pub fn value_for_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// 解析为有限数值
///
/// # 规则
/// - JSON 数值直接使用
/// - 字符串去空白后解析，小数逗号视为小数点（"12,5" → 12.5）
/// - NaN / 无穷大 视为非法
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let cleaned = s.trim().replace(',', ".");
            if cleaned.is_empty() {
                return None;
            }
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };
    if n.is_finite() {
        Some(n)
    } else {
        None
    }
}

/// 强制转换为布尔
///
/// 接受: JSON 布尔、0/1、以及俄/意/英常用的是否文本
pub fn coerce_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(x) if x == 1.0 => Some(true),
            Some(x) if x == 0.0 => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "y" | "on" | "да" | "sì" | "si" => Some(true),
            "false" | "0" | "no" | "n" | "off" | "нет" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// 数值格式化: 整数不带小数，其余最多保留 6 位并去掉末尾 0
pub fn format_number(n: f64) -> String {
    let rounded = (n * 1_000_000.0).round() / 1_000_000.0;
    format!("{}", rounded)
}
