//! 데이터 Provider 모듈.
//!
//! ## KRX Open API
//! - `KrxApiClient`: KRX Open API 클라이언트 (인증키 필요)
//! - `KrxListingSource`: KOSPI + KOSDAQ 일별 매매정보를 시세 레코드로 변환
//!
//! ## 파일 소스
//! - `CsvListingSource`: 오프라인 시세 CSV
//! - `CsvMembershipSource`: 테마 구성 CSV (long/wide 형식 자동 판별)
//! - `ThemePageScraper`: 저장된 테마 HTML 페이지

pub mod krx_api;
pub mod listing_csv;
pub mod membership_csv;
pub mod theme_page;

pub use krx_api::{KrxApiClient, KrxDailyTrade, KrxListingSource};
pub use listing_csv::CsvListingSource;
pub use membership_csv::CsvMembershipSource;
pub use theme_page::ThemePageScraper;

use rust_decimal::Decimal;

/// 문자열을 Decimal로 파싱 (쉼표, % 제거). 빈 값과 "-"는 `None`.
pub(crate) fn parse_decimal_opt(s: Option<&str>) -> Option<Decimal> {
    s.and_then(|v| {
        let cleaned = v.trim().replace(',', "").replace('%', "");
        if cleaned.is_empty() || cleaned == "-" {
            return None;
        }
        cleaned.parse().ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal_opt(Some("1,234.56")), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_decimal_opt(Some("12.34%")), Some(Decimal::new(1234, 2)));
        assert_eq!(parse_decimal_opt(Some("-3.5")), Some(Decimal::new(-35, 1)));
        assert_eq!(parse_decimal_opt(Some(" - ")), None);
        assert_eq!(parse_decimal_opt(Some("")), None);
        assert_eq!(parse_decimal_opt(None), None);
    }
}
