//! # Heatmap Core
//!
//! 테마별 증시 히트맵의 핵심 도메인 모델과 집계 로직을 제공합니다.
//!
//! 이 크레이트는 히트맵 생성 전반에서 사용되는 기본 타입을 제공합니다:
//! - 시가총액/등락률 값 객체
//! - 종목, 테마, 테마 그룹 엔티티
//! - 계층형 가중 평균 집계 (시장 → 그룹 → 테마 → 종목)
//! - 트리맵 노드 생성
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod service;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use service::*;
