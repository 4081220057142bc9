//! 테마 히트맵 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 시세/테마 구성 입력 로딩
//! - Plotly 트리맵 HTML 출력
//! - 히트맵 생성, 통계 출력, 테마 구성 정리 명령어

pub mod chart;
pub mod commands;
pub mod input;
