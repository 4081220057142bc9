//! 테마 통계 출력.

use anyhow::{bail, Result};
use heatmap_core::{HeatmapConfig, HeatmapReport, HeatmapService, Theme};
use std::path::PathBuf;

use crate::input::{load_listing, load_memberships, ListingInput};

/// 통계 출력 설정.
#[derive(Debug)]
pub struct StatsConfig {
    /// 시세 입력
    pub listing: ListingInput,
    /// 테마 구성 CSV
    pub membership: PathBuf,
    /// 최소 종목 수
    pub min_stocks: usize,
    /// 테마별 상위 종목 수
    pub top: usize,
    /// 시가총액 오름차순 정렬
    pub ascending: bool,
}

/// 테마 통계를 계산해 출력합니다.
pub async fn stats(config: StatsConfig, heatmap: &HeatmapConfig) -> Result<usize> {
    let listing = load_listing(config.listing).await?;
    let memberships = load_memberships(config.membership).await?;

    let service = HeatmapService::new(heatmap.clone());
    let report = service.generate(&listing, &memberships);
    if report.is_empty() {
        bail!("통계를 계산할 데이터가 없습니다");
    }

    let statistics = service.statistics();
    let filtered = statistics.filter_themes_by_min_stocks(&report.themes, config.min_stocks);
    let ranked = statistics.sort_themes_by_market_cap(filtered, !config.ascending);

    println!("\n{}", format_theme_table(&ranked));
    for theme in &ranked {
        let top = statistics.get_top_stocks_by_market_cap(theme, config.top);
        if top.is_empty() {
            continue;
        }
        let names: Vec<String> = top
            .iter()
            .map(|s| format!("{}({})", s.name(), s.change_ratio()))
            .collect();
        println!("  {}: {}", theme.name(), names.join(", "));
    }

    print_group_and_market(&report);
    Ok(ranked.len())
}

/// 테마 표를 만듭니다.
pub fn format_theme_table(themes: &[&Theme]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<20} {:<12} {:>14} {:>10} {:>6}\n",
        "테마", "그룹", "시가총액", "등락률", "종목수"
    ));
    out.push_str(&"-".repeat(68));
    out.push('\n');

    for theme in themes {
        out.push_str(&format!(
            "{:<20} {:<12} {:>14} {:>9.2}% {:>6}\n",
            theme.name(),
            theme.parent_group().unwrap_or("-"),
            theme.total_market_cap().to_string(),
            theme.weighted_change_ratio(),
            theme.stock_count()
        ));
    }
    out
}

fn print_group_and_market(report: &HeatmapReport) {
    if !report.group_stats.is_empty() {
        println!("\n[그룹]");
        for group in report.group_stats.values() {
            println!(
                "  {:<12} {:>14} {:>9.2}% (테마 {}개)",
                group.name(),
                group.market_cap().to_string(),
                group.weighted_change_ratio(),
                group.theme_count()
            );
        }
    }

    let market = &report.market;
    println!("\n[시장]");
    println!("  시가총액: {}", market.total_market_cap);
    println!("  가중 등락률: {:.2}%", market.weighted_change_ratio);
    println!(
        "  상승 {} / 하락 {} / 보합 {} (상승 비율 {:.1}%)",
        market.advancing,
        market.declining,
        market.unchanged,
        market.advance_ratio()
    );
}
