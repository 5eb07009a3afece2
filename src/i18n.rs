// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持俄语（默认）和意大利语
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 红线: 语言始终由调用方显式传入，本模块不设置全局 locale
// ==========================================

use crate::domain::types::Locale;
use crate::domain::validation::LocalizedMessage;

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use catalog_params::domain::Locale;
/// use catalog_params::i18n::t;
/// let yes = t("description.bool_true", Locale::It);
/// ```
pub fn t(key: &str, locale: Locale) -> String {
    rust_i18n::t!(key, locale = locale.code()).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use catalog_params::domain::Locale;
/// use catalog_params::i18n::t_with_args;
/// let msg = t_with_args("validation.required", Locale::Ru, &[("name", "Ширина")]);
/// ```
pub fn t_with_args(key: &str, locale: Locale, args: &[(&str, &str)]) -> String {
    let mut result = t(key, locale);
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 同时生成所有语言的消息
pub fn localized(key: &str, args: &[(&str, &str)]) -> LocalizedMessage {
    LocalizedMessage {
        ru: t_with_args(key, Locale::Ru, args),
        it: t_with_args(key, Locale::It, args),
    }
}

/// 按语言分别代入参数（如参数名在各语言下不同）
pub fn localized_with<F>(key: &str, args_for: F) -> LocalizedMessage
where
    F: Fn(Locale) -> Vec<(&'static str, String)>,
{
    let render = |locale: Locale| {
        let owned = args_for(locale);
        let args: Vec<(&str, &str)> = owned.iter().map(|(k, v)| (*k, v.as_str())).collect();
        t_with_args(key, locale, &args)
    };
    LocalizedMessage {
        ru: render(Locale::Ru),
        it: render(Locale::It),
    }
}
