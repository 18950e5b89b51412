use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/**
 * 应用错误类型 - 使用 miette 提供用户友好的错误诊断
 *
 * 编码解析本身永不失败；这里只覆盖文件读取、配置加载、编码名称解析和命令行参数等边界
 */
#[derive(Error, Debug, Diagnostic)]
pub enum AppError {
    #[error("IO error: {0}")]
    #[diagnostic(code(char_viewer::io_error))]
    Io(#[from] std::io::Error),

    #[error("IO error: {message}")]
    #[diagnostic(
        code(char_viewer::io_error_detailed),
        help("Ensure the path is valid and accessible")
    )]
    IoDetailed {
        message: String,
        path: Option<PathBuf>,
    },

    #[error("Unknown encoding: {0}")]
    #[diagnostic(
        code(char_viewer::encoding_error),
        help("Use one of: auto, utf-8, utf-8-sig, gbk, gb18030, cp936, big5, shift_jis, cp949, utf-16, utf-16-le, utf-16-be, latin1")
    )]
    Encoding(String),

    #[error("Validation error: {0}")]
    #[diagnostic(
        code(char_viewer::validation_error),
        help("Check that your input meets the required format and constraints")
    )]
    Validation(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(char_viewer::config_error))]
    Config(String),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(char_viewer::serialization_error))]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /**
     * 创建详细的IO错误
     */
    pub fn io_error(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        AppError::IoDetailed {
            message: message.into(),
            path,
        }
    }

    /**
     * 创建验证错误
     */
    pub fn validation_error(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /**
     * 为错误添加上下文信息
     */
    pub fn with_context(self, context: impl Into<String>) -> Self {
        let context = context.into();
        match self {
            AppError::IoDetailed { message, path } => AppError::IoDetailed {
                message: format!("{}: {}", context, message),
                path,
            },
            AppError::Config(message) => AppError::Config(format!("{}: {}", context, message)),
            other => other,
        }
    }
}

impl From<::config::ConfigError> for AppError {
    fn from(error: ::config::ConfigError) -> Self {
        AppError::Config(error.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Config(errors.to_string())
    }
}

/**
 * 统一结果类型
 */
pub type Result<T> = std::result::Result<T, AppError>;
