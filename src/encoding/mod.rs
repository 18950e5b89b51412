//! 字符编码自动识别
//!
//! 提供 BOM 识别、统计检测器接入、候选编码评分和最终的编码解析。

pub mod bom;
pub mod detector;
pub mod label;
pub mod resolver;
pub mod scoring;


pub use bom::{bom_candidates, sniff_bom};
pub use detector::{ChardetngDetector, CharsetDetector, Detection, DetectorChain};
pub use label::{EncodingChoice, TextEncoding, REPLACEMENT_CHARACTER, SELECTABLE_ENCODINGS};
pub use resolver::{EncodingResolver, ResolutionMethod, ResolutionResult, DEFAULT_SAMPLE_SIZE};
pub use scoring::{CandidateScore, TextStats};
