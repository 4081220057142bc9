//! 중복 종목 정리.
//!
//! 중복 보고서를 편집한 지정 파일(`종목명,테마1,테마2,...`)에 따라 각 종목을
//! 한 테마로 옮깁니다.

use anyhow::{Context, Result};
use heatmap_data::provider::membership_csv::{read_overrides, write_memberships};
use heatmap_data::{resolve_duplicates, ResolveOutcome};
use std::fs::File;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::input::load_memberships;

/// 중복 정리 설정.
#[derive(Debug)]
pub struct ResolveConfig {
    /// 테마 구성 CSV
    pub membership: PathBuf,
    /// 지정 파일
    pub overrides: PathBuf,
    /// 정리된 테마 구성 출력 경로
    pub output: PathBuf,
}

/// 지정 파일대로 중복 종목을 정리해 저장합니다.
pub async fn resolve(config: ResolveConfig) -> Result<ResolveOutcome> {
    let memberships = load_memberships(config.membership).await?;

    let file = File::open(&config.overrides)
        .with_context(|| format!("지정 파일 열기 실패: {}", config.overrides.display()))?;
    let overrides = read_overrides(file)?;

    let outcome = resolve_duplicates(&memberships, &overrides);

    for invalid in &outcome.invalid_themes {
        warn!(
            stock = %invalid.stock,
            theme = %invalid.theme,
            position = invalid.position,
            "존재하지 않는 테마"
        );
    }

    let file = File::create(&config.output)
        .with_context(|| format!("출력 파일 생성 실패: {}", config.output.display()))?;
    write_memberships(file, &outcome.memberships)?;

    info!(
        resolved = outcome.resolved,
        unresolved = outcome.unresolved.len(),
        output = %config.output.display(),
        "중복 종목 정리 저장"
    );
    Ok(outcome)
}
