//! 编码名称与编解码
//!
//! 将用户可选的编码名称（下拉框中的 `gbk`、`cp949`、`utf-16-le` 等）映射到具体的解码实现：
//! - 大部分编码委托给 encoding_rs（WHATWG 编码集）
//! - UTF-32 不在 WHATWG 编码集中，在本模块内直接实现
//! - 真正的 ISO-8859-1 使用 `encoding_rs::mem` 的 latin1 转换（WHATWG 把 `latin1` 标签映射到 windows-1252）
//!
//! 所有解码都不做 BOM 嗅探：BOM 只在 `utf-8-sig` / `utf-16` / `utf-32` 这类名称上被识别并去除。

use crate::error::AppError;
use encoding_rs::Encoding;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Unicode 替换字符（�）
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// 具名文本编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Utf8,
    /// 带 BOM 的 UTF-8，解码时去除开头的 `EF BB BF`
    Utf8Sig,
    Gbk,
    Gb18030,
    /// Windows 代码页 936，与 GBK 同一码表
    Cp936,
    Big5,
    ShiftJis,
    /// Windows 代码页 949（韩文），映射到 encoding_rs 的 EUC-KR
    Cp949,
    /// 根据 BOM 判断字节序，无 BOM 时按小端
    Utf16,
    Utf16Le,
    Utf16Be,
    /// 根据 BOM 判断字节序，无 BOM 时按小端
    Utf32,
    Utf32Le,
    Utf32Be,
    /// ISO-8859-1：每个字节直接映射到 U+0000..=U+00FF
    Latin1,
    /// 检测器报告的其它 WHATWG 编码（windows-1251、EUC-JP 等）
    Legacy(&'static Encoding),
}

/// 下拉框中可手动选择的编码（不含"自动检测"）
pub const SELECTABLE_ENCODINGS: [TextEncoding; 12] = [
    TextEncoding::Utf8,
    TextEncoding::Utf8Sig,
    TextEncoding::Gbk,
    TextEncoding::Gb18030,
    TextEncoding::Cp936,
    TextEncoding::Big5,
    TextEncoding::ShiftJis,
    TextEncoding::Cp949,
    TextEncoding::Utf16,
    TextEncoding::Utf16Le,
    TextEncoding::Utf16Be,
    TextEncoding::Latin1,
];

/// 实际执行解码的实现
enum Codec {
    Whatwg(&'static Encoding),
    Utf32 { big_endian: bool },
    Latin1,
}

impl TextEncoding {
    /// 规范名称（小写，与下拉框一致）
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Gbk => "gbk",
            TextEncoding::Gb18030 => "gb18030",
            TextEncoding::Cp936 => "cp936",
            TextEncoding::Big5 => "big5",
            TextEncoding::ShiftJis => "shift_jis",
            TextEncoding::Cp949 => "cp949",
            TextEncoding::Utf16 => "utf-16",
            TextEncoding::Utf16Le => "utf-16-le",
            TextEncoding::Utf16Be => "utf-16-be",
            TextEncoding::Utf32 => "utf-32",
            TextEncoding::Utf32Le => "utf-32-le",
            TextEncoding::Utf32Be => "utf-32-be",
            TextEncoding::Latin1 => "latin1",
            TextEncoding::Legacy(encoding) => encoding.name(),
        }
    }

    /// 解析编码名称
    ///
    /// 先匹配常用名称及别名，再回退到 WHATWG 标签表（`gb2312`、`euc-kr`、`windows-1251` 等）。
    /// `replacement` 编码会把整个输入解码成一个替换字符，视为未知名称。
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        let named = match normalized.as_str() {
            "utf-8" | "utf8" | "utf_8" => Some(TextEncoding::Utf8),
            "utf-8-sig" | "utf8-sig" | "utf_8_sig" => Some(TextEncoding::Utf8Sig),
            "gbk" => Some(TextEncoding::Gbk),
            "gb18030" => Some(TextEncoding::Gb18030),
            "cp936" | "ms936" | "windows-936" => Some(TextEncoding::Cp936),
            "big5" => Some(TextEncoding::Big5),
            "shift_jis" | "shift-jis" | "sjis" => Some(TextEncoding::ShiftJis),
            "cp949" | "uhc" | "ms949" => Some(TextEncoding::Cp949),
            "utf-16" | "utf16" | "utf_16" => Some(TextEncoding::Utf16),
            "utf-16-le" | "utf-16le" | "utf_16_le" => Some(TextEncoding::Utf16Le),
            "utf-16-be" | "utf-16be" | "utf_16_be" => Some(TextEncoding::Utf16Be),
            "utf-32" | "utf32" | "utf_32" => Some(TextEncoding::Utf32),
            "utf-32-le" | "utf-32le" | "utf_32_le" => Some(TextEncoding::Utf32Le),
            "utf-32-be" | "utf-32be" | "utf_32_be" => Some(TextEncoding::Utf32Be),
            "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" | "iso_8859_1" => {
                Some(TextEncoding::Latin1)
            }
            _ => None,
        };

        named.or_else(|| Encoding::for_label(normalized.as_bytes()).and_then(Self::from_encoding))
    }

    /// 将 encoding_rs 的编码映射为具名编码
    pub fn from_encoding(encoding: &'static Encoding) -> Option<Self> {
        if encoding == encoding_rs::REPLACEMENT {
            return None;
        }
        let mapped = if encoding == encoding_rs::UTF_8 {
            TextEncoding::Utf8
        } else if encoding == encoding_rs::GBK {
            TextEncoding::Gbk
        } else if encoding == encoding_rs::GB18030 {
            TextEncoding::Gb18030
        } else if encoding == encoding_rs::BIG5 {
            TextEncoding::Big5
        } else if encoding == encoding_rs::SHIFT_JIS {
            TextEncoding::ShiftJis
        } else if encoding == encoding_rs::EUC_KR {
            TextEncoding::Cp949
        } else if encoding == encoding_rs::UTF_16LE {
            TextEncoding::Utf16Le
        } else if encoding == encoding_rs::UTF_16BE {
            TextEncoding::Utf16Be
        } else {
            TextEncoding::Legacy(encoding)
        };
        Some(mapped)
    }

    /// GBK 系列（gbk / gb18030 / cp936），评分时享受汉字加权
    pub fn is_gb_family(&self) -> bool {
        matches!(
            self,
            TextEncoding::Gbk | TextEncoding::Gb18030 | TextEncoding::Cp936
        )
    }

    /// 任一 UTF-16 变体
    pub fn is_utf16(&self) -> bool {
        matches!(
            self,
            TextEncoding::Utf16 | TextEncoding::Utf16Le | TextEncoding::Utf16Be
        )
    }

    /// 追加内容使用的编码
    ///
    /// 跟随模式下新增的字节不再带 BOM：`utf-8-sig` 退化为 `utf-8`，
    /// `utf-16` / `utf-32` 根据文件开头的 BOM 固定字节序。
    pub fn for_continuation(self, head: &[u8]) -> Self {
        match self {
            TextEncoding::Utf8Sig => TextEncoding::Utf8,
            TextEncoding::Utf16 if head.starts_with(&[0xFE, 0xFF]) => TextEncoding::Utf16Be,
            TextEncoding::Utf16 => TextEncoding::Utf16Le,
            TextEncoding::Utf32 if head.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) => {
                TextEncoding::Utf32Be
            }
            TextEncoding::Utf32 => TextEncoding::Utf32Le,
            other => other,
        }
    }

    /// 选出解码实现并去除该名称所要求识别的 BOM
    fn codec<'a>(&self, bytes: &'a [u8]) -> (Codec, &'a [u8]) {
        match self {
            TextEncoding::Utf8 => (Codec::Whatwg(encoding_rs::UTF_8), bytes),
            TextEncoding::Utf8Sig => (
                Codec::Whatwg(encoding_rs::UTF_8),
                bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes),
            ),
            TextEncoding::Gbk | TextEncoding::Cp936 => (Codec::Whatwg(encoding_rs::GBK), bytes),
            TextEncoding::Gb18030 => (Codec::Whatwg(encoding_rs::GB18030), bytes),
            TextEncoding::Big5 => (Codec::Whatwg(encoding_rs::BIG5), bytes),
            TextEncoding::ShiftJis => (Codec::Whatwg(encoding_rs::SHIFT_JIS), bytes),
            TextEncoding::Cp949 => (Codec::Whatwg(encoding_rs::EUC_KR), bytes),
            TextEncoding::Utf16 => {
                if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
                    (Codec::Whatwg(encoding_rs::UTF_16LE), rest)
                } else if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
                    (Codec::Whatwg(encoding_rs::UTF_16BE), rest)
                } else {
                    (Codec::Whatwg(encoding_rs::UTF_16LE), bytes)
                }
            }
            TextEncoding::Utf16Le => (Codec::Whatwg(encoding_rs::UTF_16LE), bytes),
            TextEncoding::Utf16Be => (Codec::Whatwg(encoding_rs::UTF_16BE), bytes),
            TextEncoding::Utf32 => {
                if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE, 0x00, 0x00]) {
                    (Codec::Utf32 { big_endian: false }, rest)
                } else if let Some(rest) = bytes.strip_prefix(&[0x00, 0x00, 0xFE, 0xFF]) {
                    (Codec::Utf32 { big_endian: true }, rest)
                } else {
                    (Codec::Utf32 { big_endian: false }, bytes)
                }
            }
            TextEncoding::Utf32Le => (Codec::Utf32 { big_endian: false }, bytes),
            TextEncoding::Utf32Be => (Codec::Utf32 { big_endian: true }, bytes),
            TextEncoding::Latin1 => (Codec::Latin1, bytes),
            TextEncoding::Legacy(encoding) => (Codec::Whatwg(encoding), bytes),
        }
    }

    /// 容错解码：无效字节序列替换为 U+FFFD，永不失败
    pub fn decode_lossy(&self, bytes: &[u8]) -> String {
        match self.codec(bytes) {
            (Codec::Whatwg(encoding), body) => {
                let (text, _had_errors) = encoding.decode_without_bom_handling(body);
                text.into_owned()
            }
            (Codec::Utf32 { big_endian }, body) => decode_utf32(body, big_endian, false)
                .unwrap_or_default(),
            (Codec::Latin1, body) => encoding_rs::mem::decode_latin1(body).into_owned(),
        }
    }

    /// 严格解码：遇到任何无效字节序列返回 `None`
    pub fn decode_strict(&self, bytes: &[u8]) -> Option<String> {
        match self.codec(bytes) {
            (Codec::Whatwg(encoding), body) => encoding
                .decode_without_bom_handling_and_without_replacement(body)
                .map(|text| text.into_owned()),
            (Codec::Utf32 { big_endian }, body) => decode_utf32(body, big_endian, true),
            (Codec::Latin1, body) => Some(encoding_rs::mem::decode_latin1(body).into_owned()),
        }
    }

    /// 按该编码编码文本
    ///
    /// 返回编码后的字节以及是否存在无法映射的字符（latin1 下这类字符的字节没有意义）。`utf-8-sig`、`utf-16`、`utf-32` 会写入 BOM。
    pub fn encode(&self, text: &str) -> (Vec<u8>, bool) {
        match self {
            TextEncoding::Utf8 => (text.as_bytes().to_vec(), false),
            TextEncoding::Utf8Sig => {
                let mut bytes = vec![0xEF, 0xBB, 0xBF];
                bytes.extend_from_slice(text.as_bytes());
                (bytes, false)
            }
            TextEncoding::Utf16 => {
                let mut bytes = vec![0xFF, 0xFE];
                bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
                (bytes, false)
            }
            TextEncoding::Utf16Le => (text.encode_utf16().flat_map(u16::to_le_bytes).collect(), false),
            TextEncoding::Utf16Be => (text.encode_utf16().flat_map(u16::to_be_bytes).collect(), false),
            TextEncoding::Utf32 => {
                let mut bytes = vec![0xFF, 0xFE, 0x00, 0x00];
                bytes.extend(text.chars().flat_map(|c| u32::from(c).to_le_bytes()));
                (bytes, false)
            }
            TextEncoding::Utf32Le => (
                text.chars().flat_map(|c| u32::from(c).to_le_bytes()).collect(),
                false,
            ),
            TextEncoding::Utf32Be => (
                text.chars().flat_map(|c| u32::from(c).to_be_bytes()).collect(),
                false,
            ),
            TextEncoding::Latin1 => (
                encoding_rs::mem::encode_latin1_lossy(text).into_owned(),
                !encoding_rs::mem::is_str_latin1(text),
            ),
            other => match other.codec(&[]) {
                (Codec::Whatwg(encoding), _) => {
                    let (bytes, _, unmappable) = encoding.encode(text);
                    (bytes.into_owned(), unmappable)
                }
                _ => (text.as_bytes().to_vec(), false),
            },
        }
    }
}

/// UTF-32 解码；`strict` 时遇到无效码点或残缺的尾部字节返回 `None`
fn decode_utf32(bytes: &[u8], big_endian: bool, strict: bool) -> Option<String> {
    let mut text = String::with_capacity(bytes.len() / 4);
    let mut chunks = bytes.chunks_exact(4);
    for chunk in &mut chunks {
        let raw = [chunk[0], chunk[1], chunk[2], chunk[3]];
        let value = if big_endian {
            u32::from_be_bytes(raw)
        } else {
            u32::from_le_bytes(raw)
        };
        match char::from_u32(value) {
            Some(c) => text.push(c),
            None if strict => return None,
            None => text.push(REPLACEMENT_CHARACTER),
        }
    }
    if !chunks.remainder().is_empty() {
        if strict {
            return None;
        }
        text.push(REPLACEMENT_CHARACTER);
    }
    Some(text)
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TextEncoding {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TextEncoding::from_label(s).ok_or_else(|| AppError::Encoding(s.to_string()))
    }
}

impl Serialize for TextEncoding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for TextEncoding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        TextEncoding::from_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown encoding: {}", label)))
    }
}

/// 用户的编码选择：自动检测或固定编码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodingChoice {
    #[default]
    Auto,
    Fixed(TextEncoding),
}

impl EncodingChoice {
    /// 下拉框中"自动检测"的文字
    pub const AUTO_LABEL: &'static str = "自动检测";

    pub fn name(&self) -> &'static str {
        match self {
            EncodingChoice::Auto => "auto",
            EncodingChoice::Fixed(encoding) => encoding.name(),
        }
    }
}

impl fmt::Display for EncodingChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EncodingChoice {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("auto")
            || trimmed == EncodingChoice::AUTO_LABEL
        {
            return Ok(EncodingChoice::Auto);
        }
        trimmed.parse::<TextEncoding>().map(EncodingChoice::from)
    }
}

impl From<TextEncoding> for EncodingChoice {
    fn from(encoding: TextEncoding) -> Self {
        EncodingChoice::Fixed(encoding)
    }
}
