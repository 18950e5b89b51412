//! 通用字符浏览器核心
//!
//! 对任意字节序列自动识别文本编码（偏向中文日志与文本文件），并支持 tail -f 风格的跟随读取。
//! 界面层只需要调用 [`EncodingResolver::resolve`] 或 [`FollowSession`]，再把
//! [`EncodingStatus`] 显示在状态栏上。

pub mod config;
pub mod encoding;
pub mod error;
pub mod follow;
pub mod status;

pub use config::ViewerConfig;
pub use encoding::{
    CharsetDetector, ChardetngDetector, Detection, DetectorChain, EncodingChoice, EncodingResolver,
    ResolutionMethod, ResolutionResult, TextEncoding,
};
pub use error::{AppError, Result};
pub use follow::FollowSession;
pub use status::EncodingStatus;
