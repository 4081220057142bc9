//! CLI 명령어 구현 모듈.

pub mod duplicates;
pub mod extract;
pub mod render;
pub mod resolve;
pub mod sectors;
pub mod stats;
