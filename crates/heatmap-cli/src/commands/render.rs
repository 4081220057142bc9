//! 테마 히트맵 생성.

use anyhow::{bail, Result};
use heatmap_core::{HeatmapConfig, HeatmapReport, HeatmapService};
use std::path::PathBuf;
use tracing::info;

use crate::chart;
use crate::input::{load_listing, load_memberships, ListingInput};

/// 히트맵 생성 설정.
#[derive(Debug)]
pub struct RenderConfig {
    /// 시세 입력
    pub listing: ListingInput,
    /// 테마 구성 CSV
    pub membership: PathBuf,
    /// HTML 출력 경로
    pub output: PathBuf,
    /// 노드 JSON 출력 경로
    pub json: Option<PathBuf>,
}

/// 시세와 테마 구성으로 히트맵을 만들고 저장합니다.
pub async fn render(config: RenderConfig, heatmap: &HeatmapConfig) -> Result<HeatmapReport> {
    let listing = load_listing(config.listing).await?;
    let memberships = load_memberships(config.membership).await?;

    let service = HeatmapService::new(heatmap.clone());
    let report = service.generate(&listing, &memberships);

    if report.is_empty() {
        bail!("히트맵을 만들 데이터가 없습니다 (시세 {}건, 테마 구성 {}건)", listing.len(), memberships.len());
    }

    chart::write_html(&config.output, &report.view, &heatmap.chart)?;
    if let Some(json_path) = &config.json {
        chart::write_nodes_json(json_path, &report.view)?;
    }

    info!(
        themes = report.themes.len(),
        nodes = report.view.len(),
        output = %config.output.display(),
        "히트맵 생성 완료"
    );
    Ok(report)
}

/// 결합 결과 요약을 출력합니다.
pub fn print_ingest_summary(report: &HeatmapReport) {
    let s = &report.ingest;
    println!("\n테마 구성 {}행 중 {}행 결합", s.membership_rows, s.matched);
    if s.unmatched > 0 {
        println!("  시세 없음: {}행", s.unmatched);
    }
    if s.skipped > 0 {
        println!("  건너뜀: {}행", s.skipped);
    }
    if s.coerced > 0 {
        println!("  등락률 보정(0%): {}행", s.coerced);
    }
    println!(
        "테마 {}개, 종목 {}개, 전체 시가총액 {}",
        report.market.theme_count, report.market.stock_count, report.market.total_market_cap
    );
}
