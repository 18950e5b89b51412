//! 查看器配置
//!
//! 加载顺序（后者覆盖前者）：
//! 1. 内置默认值
//! 2. TOML 配置文件（可选）
//! 3. `CHAR_VIEWER_` 前缀的环境变量，例如 `CHAR_VIEWER_SAMPLE_SIZE=8192`

use crate::encoding::{ChardetngDetector, DetectorChain, EncodingChoice, EncodingResolver};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use validator::{Validate, ValidationError};

/// 环境变量前缀
pub const ENV_PREFIX: &str = "CHAR_VIEWER";

/// 查看器配置
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ViewerConfig {
    /// 统计检测采样大小（字节）
    #[validate(range(min = 64, max = 1048576))]
    pub sample_size: usize,

    /// 跟随模式轮询间隔（毫秒）
    #[validate(range(min = 100, max = 60000))]
    pub poll_interval_ms: u64,

    /// 默认编码选择（`auto` 或具体编码名称）
    #[validate(custom(function = "validate_encoding_choice"))]
    pub default_encoding: String,

    /// 未设置 `RUST_LOG` 时使用的日志级别
    #[validate(length(min = 1, max = 100))]
    pub log_level: String,

    /// 是否启用 chardetng 统计检测
    pub statistical_detection: bool,

    /// chardetng 的顶级域名提示（如 `cn`），为空表示不提示
    #[validate(length(max = 16))]
    pub detector_tld: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            sample_size: crate::encoding::DEFAULT_SAMPLE_SIZE,
            poll_interval_ms: 1000,
            default_encoding: "auto".to_string(),
            log_level: "warn".to_string(),
            statistical_detection: true,
            detector_tld: None,
        }
    }
}

fn validate_encoding_choice(value: &str) -> std::result::Result<(), ValidationError> {
    value
        .parse::<EncodingChoice>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("unknown_encoding"))
}

impl ViewerConfig {
    /// 加载配置：默认值 → 配置文件 → 环境变量，并校验
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(::config::File::from(path).required(true));
        }
        builder = builder.add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true));

        let config: ViewerConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 默认编码选择
    pub fn default_choice(&self) -> Result<EncodingChoice> {
        self.default_encoding.parse()
    }

    /// 按配置构造编码解析器
    pub fn build_resolver(&self) -> EncodingResolver {
        let mut detectors = DetectorChain::empty();
        if self.statistical_detection {
            let detector = match self.detector_tld.as_deref().map(str::trim) {
                Some(tld) if !tld.is_empty() => {
                    ChardetngDetector::with_tld(tld.to_ascii_lowercase().into_bytes())
                }
                _ => ChardetngDetector::new(),
            };
            detectors.push(Box::new(detector));
        }
        EncodingResolver::new(detectors, self.sample_size)
    }
}
