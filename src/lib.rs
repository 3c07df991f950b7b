//! # testman Library / testman 库
//!
//! This library provides the core functionality for the testman tool, which
//! runs every test of a Go project on its own: it lists the packages that have
//! tests, lists their test and example names, compiles one test binary per
//! package, and runs each test separately with optional retries and a global
//! timeout.
//!
//! 此库为 testman 工具提供核心功能：逐个运行 Go 项目中的每个测试。
//! 它列出包含测试的包及其测试和示例名称，为每个包编译一个测试二进制文件，
//! 并单独运行每个测试，支持可选的重试和全局超时。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, options, toolchain access, discovery and execution
//! - `infra` - Subprocess capture and the temporary work directory
//! - `reporting` - Console output
//! - `cli` - Command-line interface and commands
//! - `error` - Error types
//!
//! - `core` - 数据模型、选项、工具链访问、发现与执行
//! - `infra` - 子进程输出捕获和临时工作目录
//! - `reporting` - 控制台输出
//! - `cli` - 命令行接口和命令
//! - `error` - 错误类型

pub mod cli;
pub mod core;
pub mod error;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use core::config;
pub use core::execution;
pub use core::models;

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// This function detects the user's system locale and sets the appropriate
/// language for the application's user interface. It attempts to match the full
/// locale (e.g., "zh-CN"), then just the language code (e.g., "en"), and
/// finally falls back to the default language ("en").
pub fn init() {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    set_language(&locale);
}

/// Sets the UI language, falling back from `zh-CN` to `zh` to `en`.
pub fn set_language(locale: &str) {
    let available_locales = rust_i18n::available_locales!();

    let lang = if available_locales.contains(&locale) {
        locale
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
