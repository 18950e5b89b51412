//! 统计编码检测器
//!
//! 检测器只是"种子"：它的猜测会被加入候选列表，但最终编码由评分决定。
//! 检测器可以有零个、一个或多个，按优先级依次尝试；全部缺席时解析照常进行。

use super::label::TextEncoding;
use serde::Serialize;
use tracing::debug;

/// 检测结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    pub encoding: TextEncoding,
    /// 置信度，取值 [0, 1]
    pub confidence: f32,
}

/// 统计编码检测能力
pub trait CharsetDetector: Send + Sync {
    /// 检测器名称（用于日志）
    fn name(&self) -> &'static str;

    /// 对字节前缀给出编码猜测；无法判断时返回 `None`
    fn detect(&self, sample: &[u8]) -> Option<Detection>;
}

/// 基于 chardetng 的检测器
///
/// chardetng 不提供概率值：猜测的编码能无错解码样本时置信度记为
/// [`ChardetngDetector::CLEAN_CONFIDENCE`]，否则记为 [`ChardetngDetector::LOSSY_CONFIDENCE`]。
#[derive(Debug, Clone, Default)]
pub struct ChardetngDetector {
    /// 顶级域名提示（如 `b"cn"`），为空表示不提示
    tld: Option<Vec<u8>>,
}

impl ChardetngDetector {
    pub const CLEAN_CONFIDENCE: f32 = 0.9;
    pub const LOSSY_CONFIDENCE: f32 = 0.5;

    pub fn new() -> Self {
        Self::default()
    }

    /// 使用顶级域名提示，chardetng 会据此调整地区编码的先验
    pub fn with_tld(tld: impl Into<Vec<u8>>) -> Self {
        Self {
            tld: Some(tld.into()),
        }
    }
}

impl CharsetDetector for ChardetngDetector {
    fn name(&self) -> &'static str {
        "chardetng"
    }

    fn detect(&self, sample: &[u8]) -> Option<Detection> {
        if sample.is_empty() {
            return None;
        }

        let mut detector = chardetng::EncodingDetector::new();
        detector.feed(sample, true);
        let guessed = detector.guess(self.tld.as_deref(), true);

        let (_, _, had_errors) = guessed.decode(sample);
        let confidence = if had_errors {
            Self::LOSSY_CONFIDENCE
        } else {
            Self::CLEAN_CONFIDENCE
        };

        TextEncoding::from_encoding(guessed).map(|encoding| Detection {
            encoding,
            confidence,
        })
    }
}

/// 按优先级排列的检测器链，取第一个给出结果的检测器
#[derive(Default)]
pub struct DetectorChain {
    detectors: Vec<Box<dyn CharsetDetector>>,
}

impl DetectorChain {
    /// 空链：不做统计检测
    pub fn empty() -> Self {
        Self::default()
    }

    /// 追加一个优先级更低的检测器
    pub fn with(mut self, detector: impl CharsetDetector + 'static) -> Self {
        self.detectors.push(Box::new(detector));
        self
    }

    pub fn push(&mut self, detector: Box<dyn CharsetDetector>) {
        self.detectors.push(detector);
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn detect(&self, sample: &[u8]) -> Option<Detection> {
        self.detectors.iter().find_map(|detector| {
            let detection = detector.detect(sample);
            debug!(
                detector = detector.name(),
                encoding = detection.map(|d| d.encoding.name()),
                confidence = detection.map(|d| d.confidence),
                "Statistical detection"
            );
            detection
        })
    }
}

impl std::fmt::Debug for DetectorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.detectors.iter().map(|detector| detector.name()))
            .finish()
    }
}
