//! 状态栏文本
//!
//! 向显示层说明当前生效的编码，以及是否修正了检测器的判断：
//! - `编码: gbk (由 cp949 自动修正)`：检测器报告 cp949 / utf-16，最终采用 GBK 系列
//! - `编码: big5 (检测: shift_jis)`：其它不一致情况
//! - `编码: utf-8`：检测结果与实际一致或未检测

use crate::encoding::{ResolutionResult, TextEncoding};
use serde::Serialize;
use std::fmt;

/// 状态栏类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncodingStatus {
    /// 未打开文件
    NoFile,
    Plain {
        used: TextEncoding,
    },
    /// 检测器的 cp949 / utf-16 判断被纠正为 GBK 系列
    Corrected {
        used: TextEncoding,
        detected: TextEncoding,
    },
    Detected {
        used: TextEncoding,
        detected: TextEncoding,
    },
}

impl EncodingStatus {
    pub fn from_resolution(result: &ResolutionResult) -> Self {
        Self::new(result.used_encoding, result.detected_encoding)
    }

    pub fn new(used: TextEncoding, detected: Option<TextEncoding>) -> Self {
        match detected {
            Some(detected) if detected == used => EncodingStatus::Plain { used },
            Some(detected)
                if used.is_gb_family()
                    && (detected == TextEncoding::Cp949 || detected.is_utf16()) =>
            {
                EncodingStatus::Corrected { used, detected }
            }
            Some(detected) => EncodingStatus::Detected { used, detected },
            None => EncodingStatus::Plain { used },
        }
    }
}

impl From<&ResolutionResult> for EncodingStatus {
    fn from(result: &ResolutionResult) -> Self {
        Self::from_resolution(result)
    }
}

impl fmt::Display for EncodingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingStatus::NoFile => write!(f, "未打开文件"),
            EncodingStatus::Plain { used } => write!(f, "编码: {}", used),
            EncodingStatus::Corrected { used, detected } => {
                write!(f, "编码: {} (由 {} 自动修正)", used, detected)
            }
            EncodingStatus::Detected { used, detected } => {
                write!(f, "编码: {} (检测: {})", used, detected)
            }
        }
    }
}
