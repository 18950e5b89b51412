//! 编码解析器
//!
//! 给定任意字节序列和用户的编码选择，决定用哪种编码解码，返回解码文本、实际使用的编码
//! 以及检测器最初的猜测（仅当与实际编码不同时，用于诊断显示）。
//!
//! 判定顺序：
//! 1. 空输入 → `utf-8`
//! 2. BOM → 严格解码，成功即返回；UTF-8 BOM 即使后续内容无效也按 utf-8-sig 解码
//! 3. 用户手动指定编码 → 容错解码
//! 4. 严格 UTF-8 / UTF-8-SIG 快速路径
//! 5. 统计检测（只看前 `sample_size` 字节）
//! 6. 候选编码逐一容错解码并评分，偏向中文友好编码
//! 7. 检测器报告 UTF-16 但 GBK 明显更可读时改用 GBK
//! 8. 兜底：UTF-8 容错解码
//!
//! 任何输入都不会导致失败：无效字节一律替换为 U+FFFD。

use super::bom::bom_candidates;
use super::detector::{ChardetngDetector, DetectorChain, Detection};
use super::label::{EncodingChoice, TextEncoding};
use super::scoring::CandidateScore;
use serde::Serialize;
use tracing::{debug, info};

/// 默认统计检测采样大小（字节）
pub const DEFAULT_SAMPLE_SIZE: usize = 4096;

/// 优先尝试的中文友好编码
const PREFERRED_CANDIDATES: [TextEncoding; 5] = [
    TextEncoding::Utf8,
    TextEncoding::Utf8Sig,
    TextEncoding::Gbk,
    TextEncoding::Gb18030,
    TextEncoding::Cp936,
];

/// 排在检测结果之后的其它常见编码
const OTHER_CANDIDATES: [TextEncoding; 7] = [
    TextEncoding::Big5,
    TextEncoding::ShiftJis,
    TextEncoding::Cp949,
    TextEncoding::Utf16,
    TextEncoding::Utf16Le,
    TextEncoding::Utf16Be,
    TextEncoding::Latin1,
];

/// 做出最终判定的步骤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionMethod {
    Empty,
    ByteOrderMark,
    Override,
    Utf8FastPath,
    Scored,
    Utf16Correction,
    Fallback,
}

/// 解析结果
#[derive(Debug, Clone, Serialize)]
pub struct ResolutionResult {
    #[serde(skip)]
    pub text: String,
    /// 实际用于解码的编码
    pub used_encoding: TextEncoding,
    /// 检测器最初的猜测，仅在与 `used_encoding` 不同时存在
    pub detected_encoding: Option<TextEncoding>,
    pub method: ResolutionMethod,
    /// 统计检测的置信度（未运行检测或无结果时为空）
    pub confidence: Option<f32>,
}

impl ResolutionResult {
    fn new(
        text: String,
        used_encoding: TextEncoding,
        detected_encoding: Option<TextEncoding>,
        method: ResolutionMethod,
    ) -> Self {
        Self {
            text,
            used_encoding,
            detected_encoding: detected_encoding.filter(|detected| *detected != used_encoding),
            method,
            confidence: None,
        }
    }

    fn with_confidence(mut self, detection: Option<Detection>) -> Self {
        self.confidence = detection.map(|d| d.confidence);
        self
    }
}

/// 编码解析器
///
/// 不持有可变状态，可在多个线程间共享。
#[derive(Debug)]
pub struct EncodingResolver {
    detectors: DetectorChain,
    sample_size: usize,
}

impl Default for EncodingResolver {
    fn default() -> Self {
        Self::new(
            DetectorChain::empty().with(ChardetngDetector::new()),
            DEFAULT_SAMPLE_SIZE,
        )
    }
}

impl EncodingResolver {
    pub fn new(detectors: DetectorChain, sample_size: usize) -> Self {
        Self {
            detectors,
            sample_size: sample_size.max(1),
        }
    }

    /// 不使用统计检测器，仅依赖固定候选列表
    pub fn without_detection() -> Self {
        Self::new(DetectorChain::empty(), DEFAULT_SAMPLE_SIZE)
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// 解析字节序列的编码并解码
    pub fn resolve(&self, bytes: &[u8], choice: EncodingChoice) -> ResolutionResult {
        if bytes.is_empty() {
            return ResolutionResult::new(
                String::new(),
                TextEncoding::Utf8,
                None,
                ResolutionMethod::Empty,
            );
        }

        for encoding in bom_candidates(bytes) {
            if let Some(text) = encoding.decode_strict(bytes) {
                debug!(encoding = encoding.name(), "Byte order mark found");
                return ResolutionResult::new(text, encoding, None, ResolutionMethod::ByteOrderMark);
            }
            // UTF-8 BOM 之后的无效字节不推翻 BOM，按 utf-8-sig 容错解码
            if encoding == TextEncoding::Utf8Sig {
                debug!("UTF-8 byte order mark with invalid content, decoding with replacement");
                return ResolutionResult::new(
                    encoding.decode_lossy(bytes),
                    encoding,
                    None,
                    ResolutionMethod::ByteOrderMark,
                );
            }
            debug!(
                encoding = encoding.name(),
                "Byte order mark present but strict decode failed"
            );
        }

        if let EncodingChoice::Fixed(encoding) = choice {
            return ResolutionResult::new(
                encoding.decode_lossy(bytes),
                encoding,
                None,
                ResolutionMethod::Override,
            );
        }

        for encoding in [TextEncoding::Utf8, TextEncoding::Utf8Sig] {
            if let Some(text) = encoding.decode_strict(bytes) {
                return ResolutionResult::new(text, encoding, None, ResolutionMethod::Utf8FastPath);
            }
        }

        let sample = &bytes[..bytes.len().min(self.sample_size)];
        let detection = self.detectors.detect(sample);
        let detected = detection.map(|d| d.encoding);

        self.resolve_by_score(bytes, detected)
            .with_confidence(detection)
    }

    /// 候选评分与 UTF-16 误判修正
    fn resolve_by_score(&self, bytes: &[u8], detected: Option<TextEncoding>) -> ResolutionResult {
        let mut scores: Vec<CandidateScore> = candidate_list(detected)
            .into_iter()
            .map(|encoding| CandidateScore::evaluate(encoding, bytes, detected))
            .collect();

        let mut best: Option<usize> = None;
        for (index, candidate) in scores.iter().enumerate() {
            debug!(
                encoding = candidate.encoding.name(),
                score = candidate.score,
                printable_ratio = candidate.printable_ratio,
                chinese_ratio = candidate.chinese_ratio,
                "Scored candidate"
            );
            if best.map_or(true, |b| candidate.score > scores[b].score) {
                best = Some(index);
            }
        }

        if let Some(guess) = detected.filter(TextEncoding::is_utf16) {
            let utf16_score = scores
                .iter()
                .find(|candidate| candidate.encoding == guess)
                .map_or(-1.0, |candidate| candidate.score);
            let gbk = scores
                .iter()
                .position(|candidate| candidate.encoding == TextEncoding::Gbk)
                .filter(|&index| scores[index].beats_utf16_guess(utf16_score));

            if let Some(index) = gbk {
                let gbk = scores.swap_remove(index);
                info!(
                    detected = guess.name(),
                    gbk_score = gbk.score,
                    utf16_score,
                    "Overriding UTF-16 detection with GBK"
                );
                return ResolutionResult::new(
                    gbk.text,
                    TextEncoding::Gbk,
                    Some(guess),
                    ResolutionMethod::Utf16Correction,
                );
            }
        }

        match best {
            Some(index) => {
                let chosen = scores.swap_remove(index);
                if detected.is_some_and(|d| d != chosen.encoding) {
                    info!(
                        detected = detected.map(|d| d.name()),
                        used = chosen.encoding.name(),
                        score = chosen.score,
                        "Scoring overrode detector guess"
                    );
                }
                ResolutionResult::new(
                    chosen.text,
                    chosen.encoding,
                    detected,
                    ResolutionMethod::Scored,
                )
            }
            None => ResolutionResult::new(
                TextEncoding::Utf8.decode_lossy(bytes),
                TextEncoding::Utf8,
                detected,
                ResolutionMethod::Fallback,
            ),
        }
    }
}

/// 构造候选编码列表：中文友好编码 → 检测结果 → 其它常见编码，去重并保持顺序
fn candidate_list(detected: Option<TextEncoding>) -> Vec<TextEncoding> {
    let mut candidates: Vec<TextEncoding> =
        Vec::with_capacity(PREFERRED_CANDIDATES.len() + OTHER_CANDIDATES.len() + 1);

    let ordered = PREFERRED_CANDIDATES
        .into_iter()
        .chain(detected)
        .chain(OTHER_CANDIDATES);
    for encoding in ordered {
        if !candidates.contains(&encoding) {
            candidates.push(encoding);
        }
    }
    candidates
}
