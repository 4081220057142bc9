//! 대한민국 테마별 증시 히트맵 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # KRX Open API 시세로 테마 히트맵 생성 (KRX_API_KEY 필요)
//! heatmap render --membership data/membership.csv --date 20240105
//!
//! # 오프라인 시세 CSV로 생성하고 노드 JSON도 저장
//! heatmap render --membership data/membership.csv --listing-csv data/listing.csv --json nodes.json
//!
//! # 테마 통계 (종목 2개 이상 테마, 상위 3종목)
//! heatmap stats --membership data/membership.csv --date 20240105 --min-stocks 2 --top 3
//!
//! # 업종 기반 히트맵 (시가총액 상위 100)
//! heatmap sectors --date 20240105
//!
//! # 테마 페이지 → 테마 구성 → 중복 정리
//! heatmap extract --html-dir data/theme_html --output data/membership.csv
//! heatmap duplicates --membership data/membership.csv --output data/duplicates.csv
//! heatmap resolve --membership data/membership.csv --overrides data/duplicates.csv --output data/membership.csv
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use heatmap_core::{init_logging, HeatmapConfig, LogFormat};
use std::path::PathBuf;
use tracing::{error, info};

use heatmap_cli::commands::duplicates::{duplicates, DuplicatesConfig};
use heatmap_cli::commands::extract::{extract, ExtractConfig};
use heatmap_cli::commands::render::{print_ingest_summary, render, RenderConfig};
use heatmap_cli::commands::resolve::{resolve, ResolveConfig};
use heatmap_cli::commands::sectors::{sectors, SectorsConfig};
use heatmap_cli::commands::stats::{stats, StatsConfig};
use heatmap_cli::input::ListingInput;

#[derive(Parser)]
#[command(name = "heatmap")]
#[command(about = "대한민국 테마별 증시 히트맵", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일
    #[arg(short, long, global = true, default_value = "config/heatmap.toml")]
    config: PathBuf,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

/// 시세 입력 (CSV 파일 또는 KRX 기준일).
#[derive(Args, Debug)]
struct ListingArgs {
    /// 오프라인 시세 CSV
    #[arg(long, conflicts_with = "date")]
    listing_csv: Option<PathBuf>,

    /// KRX Open API 기준일 (YYYYMMDD)
    #[arg(short, long)]
    date: Option<String>,
}

impl ListingArgs {
    fn into_input(self) -> Result<ListingInput> {
        ListingInput::from_args(self.listing_csv, self.date)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// 테마 히트맵 HTML 생성
    Render {
        /// 테마 구성 CSV
        #[arg(short, long)]
        membership: PathBuf,

        #[command(flatten)]
        listing: ListingArgs,

        /// HTML 출력 경로
        #[arg(short, long, default_value = "theme_heatmap.html")]
        output: PathBuf,

        /// 노드 JSON 출력 경로
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// 테마 통계 출력
    Stats {
        /// 테마 구성 CSV
        #[arg(short, long)]
        membership: PathBuf,

        #[command(flatten)]
        listing: ListingArgs,

        /// 최소 종목 수
        #[arg(long, default_value = "1")]
        min_stocks: usize,

        /// 테마별 상위 종목 수
        #[arg(long, default_value = "3")]
        top: usize,

        /// 시가총액 오름차순 정렬
        #[arg(long, default_value = "false")]
        ascending: bool,
    },

    /// 업종 기반 히트맵 생성
    Sectors {
        #[command(flatten)]
        listing: ListingArgs,

        /// 사용할 시가총액 상위 종목 수
        #[arg(long, default_value = "100")]
        top: usize,

        /// HTML 출력 경로
        #[arg(short, long, default_value = "heatmap.html")]
        output: PathBuf,
    },

    /// 테마 HTML 페이지에서 테마 구성 추출
    Extract {
        /// 테마 HTML 디렉토리
        #[arg(long)]
        html_dir: PathBuf,

        /// 테마 구성 CSV 출력 경로
        #[arg(short, long)]
        output: PathBuf,
    },

    /// 여러 테마에 속한 종목 보고
    Duplicates {
        /// 테마 구성 CSV
        #[arg(short, long)]
        membership: PathBuf,

        /// 보고서 CSV 출력 경로 (없으면 화면 출력)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 지정 파일대로 중복 종목 정리
    Resolve {
        /// 테마 구성 CSV
        #[arg(short, long)]
        membership: PathBuf,

        /// 지정 파일 (종목명,테마1,테마2,...)
        #[arg(long)]
        overrides: PathBuf,

        /// 정리된 테마 구성 출력 경로
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = HeatmapConfig::load_or_default(&cli.config)
        .with_context(|| format!("설정 로드 실패: {}", cli.config.display()))?;

    let mut log_config = config.logging.to_log_config();
    if let Some(format) = cli.log_format {
        log_config = log_config.with_format(format);
    }
    init_logging(log_config).map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    if let Err(e) = run(cli.command, &config).await {
        error!("명령 실패: {:#}", e);
        return Err(e);
    }
    Ok(())
}

async fn run(command: Commands, config: &HeatmapConfig) -> Result<()> {
    match command {
        Commands::Render {
            membership,
            listing,
            output,
            json,
        } => {
            let report = render(
                RenderConfig {
                    listing: listing.into_input()?,
                    membership,
                    output: output.clone(),
                    json,
                },
                config,
            )
            .await?;

            print_ingest_summary(&report);
            println!("\n히트맵 생성 완료: {}", output.display());
        }

        Commands::Stats {
            membership,
            listing,
            min_stocks,
            top,
            ascending,
        } => {
            let count = stats(
                StatsConfig {
                    listing: listing.into_input()?,
                    membership,
                    min_stocks,
                    top,
                    ascending,
                },
                config,
            )
            .await?;
            info!("테마 {}개 출력", count);
        }

        Commands::Sectors {
            listing,
            top,
            output,
        } => {
            let report = sectors(
                SectorsConfig {
                    listing: listing.into_input()?,
                    top,
                    output: output.clone(),
                },
                config,
            )
            .await?;

            println!(
                "\n업종 {}개, 종목 {}개 → {}",
                report.themes.len(),
                report.market.stock_count,
                output.display()
            );
        }

        Commands::Extract { html_dir, output } => {
            let outcome = extract(
                ExtractConfig {
                    html_dir,
                    output: output.clone(),
                },
                config,
            )
            .await?;

            println!(
                "\n테마 {}개, 종목 {}개 선택 → {}",
                outcome.themes_used,
                outcome.unique_stocks,
                output.display()
            );
            if !outcome.reached_target {
                println!(
                    "목표 종목 수({})에 도달하지 못했습니다",
                    config.curation.target_stock_count
                );
            }
        }

        Commands::Duplicates { membership, output } => {
            duplicates(DuplicatesConfig { membership, output }).await?;
        }

        Commands::Resolve {
            membership,
            overrides,
            output,
        } => {
            let outcome = resolve(ResolveConfig {
                membership,
                overrides,
                output: output.clone(),
            })
            .await?;

            println!("\n정리된 종목: {}개", outcome.resolved);
            for invalid in &outcome.invalid_themes {
                println!(
                    "  존재하지 않는 테마: {} → {} ({}번째 후보)",
                    invalid.stock, invalid.theme, invalid.position
                );
            }
            if !outcome.unresolved.is_empty() {
                println!("남은 중복 종목: {}개", outcome.unresolved.len());
            }
            println!("저장 위치: {}", output.display());
        }
    }
    Ok(())
}
