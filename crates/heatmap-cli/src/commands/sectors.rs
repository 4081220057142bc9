//! 업종 기반 히트맵 생성 (시가총액 상위 N).

use anyhow::{bail, Result};
use heatmap_core::{HeatmapConfig, HeatmapReport, HeatmapService};
use std::path::PathBuf;
use tracing::info;

use crate::chart;
use crate::input::{load_listing, ListingInput};

/// 업종 히트맵 설정.
#[derive(Debug)]
pub struct SectorsConfig {
    /// 시세 입력
    pub listing: ListingInput,
    /// 사용할 상위 종목 수
    pub top: usize,
    /// HTML 출력 경로
    pub output: PathBuf,
}

/// 업종별 히트맵을 만들고 저장합니다.
pub async fn sectors(config: SectorsConfig, heatmap: &HeatmapConfig) -> Result<HeatmapReport> {
    let listing = load_listing(config.listing).await?;

    let mut heatmap = heatmap.clone();
    heatmap.chart.title = format!("대한민국 증시 히트맵 (시가총액 상위 {})", config.top);

    let service = HeatmapService::new(heatmap);
    let report = service.generate_sectors(&listing, config.top);
    if report.is_empty() {
        bail!("업종 히트맵을 만들 데이터가 없습니다");
    }

    chart::write_html(&config.output, &report.view, &service.config().chart)?;
    info!(
        sectors = report.themes.len(),
        stocks = report.market.stock_count,
        output = %config.output.display(),
        "업종 히트맵 생성 완료"
    );
    Ok(report)
}
