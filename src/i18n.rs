// ==========================================
// 课堂座位编排系统 - 界面语言
// ==========================================
// 职责: 提示文本翻译 (编排原因码 / 撤销重做边界)
// 规则:
// 1) 只接受 SUPPORTED_LOCALES 中的语言, 其他值保持当前语言
// 2) 全局配置中保存的语言在打开班级时生效, 未保存时不改动
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::config::config_manager::{config_keys, ConfigManager, GLOBAL_SCOPE};
use std::error::Error;

/// 可选界面语言 (首项为默认)
pub const SUPPORTED_LOCALES: &[&str] = &["zh-CN", "en"];

pub fn is_supported(locale: &str) -> bool {
    SUPPORTED_LOCALES.contains(&locale)
}

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 切换语言
///
/// # 返回
/// - true: 已切换
/// - false: 不支持的语言, 保持原样
pub fn set_locale(locale: &str) -> bool {
    if !is_supported(locale) {
        tracing::warn!(locale, "不支持的界面语言，已忽略");
        return false;
    }
    rust_i18n::set_locale(locale);
    true
}

/// 应用全局配置中保存的界面语言
///
/// # 返回
/// - Some(locale): 已切换到该语言
/// - None: 未保存、不支持或与当前语言相同
pub fn apply_saved_locale(manager: &ConfigManager) -> Result<Option<String>, Box<dyn Error>> {
    let Some(saved) = manager.get_config_value(GLOBAL_SCOPE, config_keys::LOCALE)? else {
        return Ok(None);
    };
    if saved == current_locale() || !set_locale(&saved) {
        return Ok(None);
    }
    tracing::debug!(locale = %saved, "已应用保存的界面语言");
    Ok(Some(saved))
}

/// 翻译消息（无参数）
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// 占位符写作 `%{name}`
///
/// # 示例
/// ```no_run
/// use seat_arrange::i18n::t_with_args;
/// let msg = t_with_args("notice.more_students_than_seats", &[("count", "3")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    args.iter().fold(t(key), |text, (k, v)| {
        text.replace(&format!("%{{{}}}", k), v)
    })
}
