/// 编码解析集成测试
///
/// 覆盖以下场景：
/// 1. 空输入、BOM、手动指定编码、UTF-8 快速路径
/// 2. 检测器把 GBK 中文误判为 cp949 / utf-16 时的修正
/// 3. 检测器缺席时的降级
/// 4. 状态栏文本
use char_viewer::{
    CharsetDetector, Detection, DetectorChain, EncodingChoice, EncodingResolver, EncodingStatus,
    ResolutionMethod, TextEncoding,
};
use rstest::*;

/// 总是报告同一编码的检测器
struct MisreportingDetector(TextEncoding);

impl CharsetDetector for MisreportingDetector {
    fn name(&self) -> &'static str {
        "misreporting"
    }

    fn detect(&self, _sample: &[u8]) -> Option<Detection> {
        Some(Detection {
            encoding: self.0,
            confidence: 0.99,
        })
    }
}

/// 从不给出结果的检测器（模拟检测库不可用）
struct UnavailableDetector;

impl CharsetDetector for UnavailableDetector {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    fn detect(&self, _sample: &[u8]) -> Option<Detection> {
        None
    }
}

fn misreporting(encoding: TextEncoding) -> EncodingResolver {
    EncodingResolver::new(
        DetectorChain::empty().with(MisreportingDetector(encoding)),
        4096,
    )
}

fn gbk_bytes(text: &str) -> Vec<u8> {
    let (bytes, unmappable) = TextEncoding::Gbk.encode(text);
    assert!(!unmappable);
    bytes
}

#[fixture]
fn resolver() -> EncodingResolver {
    EncodingResolver::default()
}

#[rstest]
fn test_empty_buffer(resolver: EncodingResolver) {
    let result = resolver.resolve(b"", EncodingChoice::Auto);
    assert_eq!(result.text, "");
    assert_eq!(result.used_encoding, TextEncoding::Utf8);
    assert_eq!(result.detected_encoding, None);
}

#[rstest]
fn test_ascii_hello_world(resolver: EncodingResolver) {
    let result = resolver.resolve(b"hello world", EncodingChoice::Auto);
    assert_eq!(result.text, "hello world");
    assert_eq!(result.used_encoding, TextEncoding::Utf8);
    assert!(matches!(
        result.detected_encoding,
        None | Some(TextEncoding::Utf8)
    ));
}

#[rstest]
#[case::utf8_bom(b"\xef\xbb\xbf\xe4\xb8\xad\xe6\x96\x87".to_vec(), TextEncoding::Utf8Sig, "中文")]
#[case::utf16_le_bom(vec![0xFF, 0xFE, 0x2D, 0x4E, b'A', 0x00], TextEncoding::Utf16, "中A")]
#[case::utf16_be_bom(vec![0xFE, 0xFF, 0x4E, 0x2D, 0x00, b'A'], TextEncoding::Utf16, "中A")]
#[case::utf32_le_bom(vec![0xFF, 0xFE, 0x00, 0x00, b'A', 0, 0, 0], TextEncoding::Utf32, "A")]
#[case::utf32_be_bom(vec![0x00, 0x00, 0xFE, 0xFF, 0, 0, 0, b'A'], TextEncoding::Utf32, "A")]
#[case::truncated_utf32_le_is_utf16(vec![0xFF, 0xFE, 0x00, 0x00, b'A', 0x00], TextEncoding::Utf16, "\0A")]
#[case::utf8_bom_with_invalid_tail(b"\xef\xbb\xbfok\xff".to_vec(), TextEncoding::Utf8Sig, "ok\u{FFFD}")]
#[case::utf8_bom_with_gbk_tail(
    b"\xef\xbb\xbf\xbe\xc5\xc1\xaa".to_vec(),
    TextEncoding::Utf8Sig,
    "\u{FFFD}\u{FFFD}\u{FFFD}\u{FFFD}"
)]
fn test_byte_order_marks_are_authoritative(
    resolver: EncodingResolver,
    #[case] bytes: Vec<u8>,
    #[case] expected_encoding: TextEncoding,
    #[case] expected_text: &str,
) {
    let result = resolver.resolve(&bytes, EncodingChoice::Auto);
    assert_eq!(result.used_encoding, expected_encoding);
    assert_eq!(result.text, expected_text);
    assert_eq!(result.method, ResolutionMethod::ByteOrderMark);
}

#[rstest]
#[case::ascii(b"plain text".to_vec())]
#[case::gbk(b"\xbe\xc5\xc1\xaa\xb5\xe7\xc1\xa6".to_vec())]
#[case::invalid_everywhere(vec![0xFF, 0x80, 0x00, 0xFE, 0x81, 0x30])]
#[case::random_binary((0..=255u8).collect())]
fn test_latin1_override_never_fails(resolver: EncodingResolver, #[case] bytes: Vec<u8>) {
    let result = resolver.resolve(&bytes, EncodingChoice::Fixed(TextEncoding::Latin1));
    assert_eq!(result.used_encoding, TextEncoding::Latin1);
    assert_eq!(result.detected_encoding, None);
    assert_eq!(result.text.chars().count(), bytes.len());
}

#[test]
fn test_gbk_misreported_as_cp949() {
    let result = misreporting(TextEncoding::Cp949).resolve(&gbk_bytes("九联电力"), EncodingChoice::Auto);
    assert_eq!(result.text, "九联电力");
    assert_eq!(result.used_encoding, TextEncoding::Gbk);
    assert_eq!(result.detected_encoding, Some(TextEncoding::Cp949));
    assert_eq!(
        EncodingStatus::from_resolution(&result).to_string(),
        "编码: gbk (由 cp949 自动修正)"
    );
}

#[rstest]
#[case(TextEncoding::Utf16)]
#[case(TextEncoding::Utf16Le)]
#[case(TextEncoding::Utf16Be)]
fn test_gbk_misreported_as_utf16(#[case] guess: TextEncoding) {
    let text = "设备启动完成，开始上报数据";
    let result = misreporting(guess).resolve(&gbk_bytes(text), EncodingChoice::Auto);
    assert_eq!(result.text, text);
    assert_eq!(result.used_encoding, TextEncoding::Gbk);
    assert_eq!(result.detected_encoding, Some(guess));
    assert_eq!(result.method, ResolutionMethod::Utf16Correction);
}

#[test]
fn test_mixed_gbk_log_line() {
    let text = "2024-01-01 12:00:00 INFO 九联电力 设备在线\r\n";
    let result = EncodingResolver::without_detection().resolve(&gbk_bytes(text), EncodingChoice::Auto);
    assert_eq!(result.used_encoding, TextEncoding::Gbk);
    assert_eq!(result.text, text);
}

#[test]
fn test_unavailable_detector_degrades_gracefully() {
    let resolver = EncodingResolver::new(DetectorChain::empty().with(UnavailableDetector), 4096);
    let result = resolver.resolve(&gbk_bytes("九联电力"), EncodingChoice::Auto);
    assert_eq!(result.used_encoding, TextEncoding::Gbk);
    assert_eq!(result.detected_encoding, None);
    assert_eq!(result.confidence, None);
}

#[test]
fn test_gbk_bias_outscores_cyrillic_guess() {
    // windows-1251 编码的 "Привет мир"：高位字节两两组合后恰好都是 GB2312 汉字
    let bytes = [0xCF, 0xF0, 0xE8, 0xE2, 0xE5, 0xF2, 0x20, 0xEC, 0xE8, 0xF0];
    let legacy = TextEncoding::Legacy(encoding_rs::WINDOWS_1251);
    let result = misreporting(legacy).resolve(&bytes, EncodingChoice::Auto);
    assert_eq!(result.used_encoding, TextEncoding::Gbk);
    assert_eq!(result.detected_encoding, Some(legacy));
    assert_eq!(
        EncodingStatus::from_resolution(&result).to_string(),
        "编码: gbk (检测: windows-1251)"
    );

    // 手动指定仍可得到正确文本
    let forced = misreporting(legacy).resolve(&bytes, EncodingChoice::Fixed(legacy));
    assert_eq!(forced.text, "Привет мир");
}

#[test]
fn test_sample_size_limits_detection_input() {
    struct LengthRecorder;

    impl CharsetDetector for LengthRecorder {
        fn name(&self) -> &'static str {
            "length"
        }

        fn detect(&self, sample: &[u8]) -> Option<Detection> {
            assert!(sample.len() <= 16);
            None
        }
    }

    let resolver = EncodingResolver::new(DetectorChain::empty().with(LengthRecorder), 16);
    let bytes = gbk_bytes(&"九联电力".repeat(50));
    let result = resolver.resolve(&bytes, EncodingChoice::Auto);
    assert_eq!(result.used_encoding, TextEncoding::Gbk);
}

#[test]
fn test_resolver_is_shareable_across_threads() {
    let resolver = std::sync::Arc::new(EncodingResolver::default());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let resolver = resolver.clone();
            std::thread::spawn(move || {
                let text = format!("线程 {} 日志", i);
                let bytes = gbk_bytes(&text);
                let result = resolver.resolve(&bytes, EncodingChoice::Auto);
                (text, result.text)
            })
        })
        .collect();

    for handle in handles {
        let (expected, decoded) = handle.join().unwrap();
        assert_eq!(expected, decoded);
    }
}

#[test]
fn test_resolution_serializes_without_text() {
    let result = misreporting(TextEncoding::Cp949).resolve(&gbk_bytes("九联电力"), EncodingChoice::Auto);
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["used_encoding"], "gbk");
    assert_eq!(json["detected_encoding"], "cp949");
    assert_eq!(json["method"], "scored");
    assert!(json.get("text").is_none());
}
