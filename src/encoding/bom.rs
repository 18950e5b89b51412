//! 字节序标记（BOM）识别

use super::label::TextEncoding;

/// 按匹配优先级排列的 BOM 签名
///
/// UTF-32 LE 的 `FF FE 00 00` 以 UTF-16 LE 的 `FF FE` 开头，必须先于 UTF-16 检查。
const SIGNATURES: [(&[u8], TextEncoding); 5] = [
    (&[0xEF, 0xBB, 0xBF], TextEncoding::Utf8Sig),
    (&[0xFF, 0xFE, 0x00, 0x00], TextEncoding::Utf32),
    (&[0x00, 0x00, 0xFE, 0xFF], TextEncoding::Utf32),
    (&[0xFF, 0xFE], TextEncoding::Utf16),
    (&[0xFE, 0xFF], TextEncoding::Utf16),
];

/// 字节开头匹配的全部 BOM 编码，按优先级排列
///
/// `FF FE 00 00` 同时匹配 UTF-32 LE 与 UTF-16 LE；前者严格解码失败时应继续尝试后者。
pub fn bom_candidates(bytes: &[u8]) -> impl Iterator<Item = TextEncoding> + '_ {
    SIGNATURES
        .iter()
        .filter(move |(signature, _)| bytes.starts_with(signature))
        .map(|(_, encoding)| *encoding)
}

/// 识别字节开头的 BOM，返回优先级最高的（自带 BOM 处理的）编码
pub fn sniff_bom(bytes: &[u8]) -> Option<TextEncoding> {
    bom_candidates(bytes).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_each_signature() {
        assert_eq!(sniff_bom(b"\xef\xbb\xbfhello"), Some(TextEncoding::Utf8Sig));
        assert_eq!(sniff_bom(&[0xFF, 0xFE, 0x00, 0x00, b'a', 0, 0, 0]), Some(TextEncoding::Utf32));
        assert_eq!(sniff_bom(&[0x00, 0x00, 0xFE, 0xFF]), Some(TextEncoding::Utf32));
        assert_eq!(sniff_bom(&[0xFF, 0xFE, b'a', 0x00]), Some(TextEncoding::Utf16));
        assert_eq!(sniff_bom(&[0xFE, 0xFF, 0x00, b'a']), Some(TextEncoding::Utf16));
    }

    #[test]
    fn test_utf32_le_signature_also_matches_utf16() {
        let candidates: Vec<_> = bom_candidates(&[0xFF, 0xFE, 0x00, 0x00, b'A', 0x00]).collect();
        assert_eq!(candidates, vec![TextEncoding::Utf32, TextEncoding::Utf16]);

        let candidates: Vec<_> = bom_candidates(&[0xFE, 0xFF, 0x00, b'A']).collect();
        assert_eq!(candidates, vec![TextEncoding::Utf16]);
    }

    #[test]
    fn test_no_bom() {
        assert_eq!(sniff_bom(b""), None);
        assert_eq!(sniff_bom(b"\xef\xbb"), None);
        assert_eq!(sniff_bom(b"plain text"), None);
        assert_eq!(bom_candidates(b"plain text").count(), 0);
    }
}
