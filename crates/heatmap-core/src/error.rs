//! 히트맵 시스템의 에러 타입.
//!
//! 값 객체와 엔티티의 불변식 위반, 외부 데이터 부재를 구분합니다.

use thiserror::Error;

/// 핵심 히트맵 에러.
#[derive(Debug, Error)]
pub enum HeatmapError {
    /// 값 객체 불변식 위반 (음수 시가총액, ±100% 초과 등락률)
    #[error("잘못된 값: {0}")]
    InvalidValue(String),

    /// 엔티티 식별 필드 누락
    #[error("잘못된 엔티티: {0}")]
    InvalidEntity(String),

    /// 외부 데이터 소스가 사용 가능한 데이터를 반환하지 않음
    #[error("데이터 없음: {0}")]
    DataUnavailable(String),

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 히트맵 작업을 위한 Result 타입.
pub type HeatmapResult<T> = Result<T, HeatmapError>;

impl HeatmapError {
    /// 빈 결과로 보고하고 계속 진행할 수 있는 에러인지 확인합니다.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, HeatmapError::DataUnavailable(_))
    }
}

impl From<serde_json::Error> for HeatmapError {
    fn from(err: serde_json::Error) -> Self {
        HeatmapError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for HeatmapError {
    fn from(err: config::ConfigError) -> Self {
        HeatmapError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_recoverable() {
        let missing = HeatmapError::DataUnavailable("KRX listing".to_string());
        assert!(missing.is_recoverable());

        let invalid = HeatmapError::InvalidValue("-1".to_string());
        assert!(!invalid.is_recoverable());
    }

    #[test]
    fn test_error_display() {
        let err = HeatmapError::InvalidEntity("종목 코드는 필수입니다".to_string());
        assert_eq!(err.to_string(), "잘못된 엔티티: 종목 코드는 필수입니다");
    }
}
