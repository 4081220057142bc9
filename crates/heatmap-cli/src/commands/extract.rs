//! 테마 HTML 페이지 → 테마 구성 CSV.

use anyhow::{Context, Result};
use heatmap_core::HeatmapConfig;
use heatmap_data::provider::membership_csv::write_memberships;
use heatmap_data::{curate_memberships, CurationOutcome, ThemePageScraper};
use std::fs::File;
use std::path::PathBuf;
use tracing::info;

/// 추출 설정.
#[derive(Debug)]
pub struct ExtractConfig {
    /// 테마 HTML 디렉토리
    pub html_dir: PathBuf,
    /// 테마 구성 CSV 출력 경로
    pub output: PathBuf,
}

/// 저장된 테마 페이지를 읽어 큐레이션한 테마 구성을 저장합니다.
pub async fn extract(config: ExtractConfig, heatmap: &HeatmapConfig) -> Result<CurationOutcome> {
    let scraper = ThemePageScraper::new(&config.html_dir);
    let lists = scraper
        .scrape_dir()
        .await
        .with_context(|| format!("테마 페이지 읽기 실패: {}", config.html_dir.display()))?;

    let outcome = curate_memberships(&lists, heatmap);

    let file = File::create(&config.output)
        .with_context(|| format!("출력 파일 생성 실패: {}", config.output.display()))?;
    write_memberships(file, &outcome.memberships)?;

    info!(
        pages = lists.len(),
        themes = outcome.themes_used,
        stocks = outcome.unique_stocks,
        output = %config.output.display(),
        "테마 구성 추출 완료"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatmap_data::{CsvMembershipSource, MembershipSource};
    use std::fs;

    fn page(names: &[&str]) -> String {
        names
            .iter()
            .map(|n| {
                format!(
                    r#"<tr class="stockTrMobile"><td><p class="stockInfoMobile">{}</p><p class="stockInfoMobile">(000000)</p></td></tr>"#,
                    n
                )
            })
            .collect::<String>()
    }

    #[tokio::test]
    async fn test_extract_writes_curated_membership() {
        let dir = tempfile::tempdir().unwrap();
        let html_dir = dir.path().join("theme_html");
        fs::create_dir(&html_dir).unwrap();
        fs::write(html_dir.join("원전.html"), page(&["두산에너빌리티", "한전기술"])).unwrap();
        fs::write(html_dir.join("전력설비.html"), page(&["한전기술", "LS ELECTRIC", "HD현대일렉트릭"])).unwrap();

        let output = dir.path().join("membership.csv");
        let mut config = HeatmapConfig::default();
        config.priority_themes = vec!["원전".to_string()];

        let outcome = extract(
            ExtractConfig {
                html_dir,
                output: output.clone(),
            },
            &config,
        )
        .await
        .unwrap();

        assert_eq!(outcome.unique_stocks, 4);
        let records = CsvMembershipSource::new(&output).fetch().await.unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[1].theme_name, "원전");
        assert_eq!(records[1].stock_name, "한전기술");
    }
}
