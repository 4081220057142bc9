//! 테마명/종목명 정규화.
//!
//! macOS에서 저장된 파일명과 일부 엑셀 내보내기는 한글을 NFD(자모 분리)로
//! 담습니다. 같은 이름이 바이트 단위로 일치하도록 입력 경계에서 모든 이름을
//! NFC로 맞춥니다.

use unicode_normalization::{is_nfc, UnicodeNormalization};

/// 앞뒤 공백을 제거하고 NFC로 정규화합니다.
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    if is_nfc(trimmed) {
        trimmed.to_string()
    } else {
        trimmed.nfc().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nfd_hangul_is_composed() {
        // "반도체"를 자모 단위로 분해한 형태
        let decomposed: String = "반도체".nfd().collect();
        assert_ne!(decomposed, "반도체");
        assert_eq!(normalize_name(&decomposed), "반도체");
    }

    #[test]
    fn test_trims_and_keeps_ascii() {
        assert_eq!(normalize_name("  SK하이닉스 "), "SK하이닉스");
        assert_eq!(normalize_name(""), "");
    }
}
