//! 候选编码评分
//!
//! 简单启发式：
//! - `printable_ratio`：非替换字符、非控制字符的比例
//! - `chinese_ratio`：CJK 统一表意文字（U+4E00..=U+9FFF）的比例
//! - `score = printable_ratio + 0.5 * chinese_ratio`，再叠加对 GBK 系列的加权
//!
//! 以下阈值均为人工调校的经验值，没有对应的标注语料。

use super::label::{TextEncoding, REPLACEMENT_CHARACTER};
use serde::Serialize;

/// 基础分中汉字比例的权重
pub const CHINESE_WEIGHT: f64 = 0.5;

/// GBK 系列候选出现汉字的最低比例，超过后才加权
pub const GB_BONUS_MIN_CHINESE_RATIO: f64 = 0.01;

/// GBK 系列加权的固定部分：`score += GB_BONUS_BASE + chinese_ratio`
pub const GB_BONUS_BASE: f64 = 0.2;

/// 检测器报告 cp949 时 GBK 系列的额外加权：`score += CP949_CORRECTION_WEIGHT * chinese_ratio`
///
/// 检测器常把 GBK 编码的中文误判为韩文。
pub const CP949_CORRECTION_WEIGHT: f64 = 0.5;

/// UTF-16 误判修正：GBK 汉字比例下限
pub const UTF16_OVERRIDE_MIN_CHINESE_RATIO: f64 = 0.15;

/// UTF-16 误判修正：GBK 可打印比例下限
pub const UTF16_OVERRIDE_MIN_PRINTABLE_RATIO: f64 = 0.6;

/// 单个候选编码的解码结果与评分
#[derive(Debug, Clone, Serialize)]
pub struct CandidateScore {
    pub encoding: TextEncoding,
    pub score: f64,
    pub printable_ratio: f64,
    pub chinese_ratio: f64,
    #[serde(skip)]
    pub text: String,
}

/// 文本的可读性统计
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextStats {
    pub printable_ratio: f64,
    pub chinese_ratio: f64,
}

impl TextStats {
    /// 统计解码后的文本；空文本的两个比例均为 0
    pub fn measure(text: &str) -> Self {
        let mut total = 0usize;
        let mut unprintable = 0usize;
        let mut han = 0usize;

        for c in text.chars() {
            total += 1;
            if c == REPLACEMENT_CHARACTER || is_penalized_control(c) {
                unprintable += 1;
            }
            if is_cjk_unified(c) {
                han += 1;
            }
        }

        if total == 0 {
            return Self::default();
        }

        Self {
            printable_ratio: (total - unprintable) as f64 / total as f64,
            chinese_ratio: han as f64 / total as f64,
        }
    }

    /// 基础分
    pub fn base_score(&self) -> f64 {
        self.printable_ratio + CHINESE_WEIGHT * self.chinese_ratio
    }
}

/// C0 控制字符（制表符、换行、回车除外）
fn is_penalized_control(c: char) -> bool {
    c < '\u{20}' && !matches!(c, '\t' | '\n' | '\r')
}

fn is_cjk_unified(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

impl CandidateScore {
    /// 用候选编码容错解码并评分
    ///
    /// `detected` 为统计检测器的猜测，用于 cp949 误判修正。
    pub fn evaluate(encoding: TextEncoding, bytes: &[u8], detected: Option<TextEncoding>) -> Self {
        let text = encoding.decode_lossy(bytes);
        let stats = TextStats::measure(&text);
        let mut score = stats.base_score();

        if encoding.is_gb_family() && stats.chinese_ratio > GB_BONUS_MIN_CHINESE_RATIO {
            score += GB_BONUS_BASE + stats.chinese_ratio;
        }
        if detected == Some(TextEncoding::Cp949) && encoding.is_gb_family() {
            score += CP949_CORRECTION_WEIGHT * stats.chinese_ratio;
        }

        Self {
            encoding,
            score,
            printable_ratio: stats.printable_ratio,
            chinese_ratio: stats.chinese_ratio,
            text,
        }
    }

    /// GBK 是否足以推翻检测器的 UTF-16 判断
    pub fn beats_utf16_guess(&self, utf16_score: f64) -> bool {
        self.score > utf16_score
            && self.chinese_ratio > UTF16_OVERRIDE_MIN_CHINESE_RATIO
            && self.printable_ratio > UTF16_OVERRIDE_MIN_PRINTABLE_RATIO
    }
}
