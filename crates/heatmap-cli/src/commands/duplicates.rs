//! 중복 종목 보고서.

use anyhow::{Context, Result};
use heatmap_data::provider::membership_csv::write_duplicate_report;
use heatmap_data::{find_duplicates, DuplicateEntry};
use std::fs::File;
use std::path::PathBuf;

use crate::input::load_memberships;

/// 중복 보고서 설정.
#[derive(Debug)]
pub struct DuplicatesConfig {
    /// 테마 구성 CSV
    pub membership: PathBuf,
    /// 보고서 CSV 출력 경로 (없으면 stdout)
    pub output: Option<PathBuf>,
}

/// 여러 테마에 속한 종목을 보고합니다.
pub async fn duplicates(config: DuplicatesConfig) -> Result<Vec<DuplicateEntry>> {
    let memberships = load_memberships(config.membership).await?;
    let entries = find_duplicates(&memberships);

    match &config.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("출력 파일 생성 실패: {}", path.display()))?;
            write_duplicate_report(file, &entries)?;
            println!("중복 종목 {}개 → {}", entries.len(), path.display());
        }
        None => {
            for entry in &entries {
                println!("{}: {}", entry.stock, entry.themes.join(", "));
            }
            println!("\n중복 종목: {}개", entries.len());
        }
    }
    Ok(entries)
}
