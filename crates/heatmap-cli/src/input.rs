//! 명령어 공통 입력 로딩.

use anyhow::{bail, Context, Result};
use heatmap_core::{MembershipRecord, StockRecord};
use heatmap_data::{
    CsvListingSource, CsvMembershipSource, KrxApiClient, KrxListingSource, ListingSource,
    MembershipSource,
};
use std::path::PathBuf;
use tracing::info;

/// 시세 입력 위치.
#[derive(Debug, Clone)]
pub enum ListingInput {
    /// 오프라인 시세 CSV
    Csv(PathBuf),
    /// KRX Open API 기준일 (YYYYMMDD)
    Krx(String),
}

impl ListingInput {
    /// CLI 인자에서 입력 위치를 고릅니다.
    pub fn from_args(listing_csv: Option<PathBuf>, date: Option<String>) -> Result<Self> {
        match (listing_csv, date) {
            (Some(path), None) => Ok(Self::Csv(path)),
            (None, Some(date)) => Ok(Self::Krx(date)),
            (Some(_), Some(_)) => bail!("--listing-csv와 --date는 함께 쓸 수 없습니다"),
            (None, None) => bail!("--listing-csv 또는 --date 중 하나가 필요합니다"),
        }
    }

    fn into_source(self) -> Result<Box<dyn ListingSource>> {
        Ok(match self {
            Self::Csv(path) => Box::new(CsvListingSource::new(path)),
            Self::Krx(date) => {
                let client = KrxApiClient::from_env().context("KRX API 클라이언트 생성 실패")?;
                Box::new(KrxListingSource::new(client, date)?)
            }
        })
    }
}

/// 시세를 읽습니다.
pub async fn load_listing(input: ListingInput) -> Result<Vec<StockRecord>> {
    let source = input.into_source()?;
    let records = source
        .fetch()
        .await
        .with_context(|| format!("시세 로드 실패 ({})", source.name()))?;
    info!(source = source.name(), count = records.len(), "시세 로드");
    Ok(records)
}

/// 테마 구성 CSV를 읽습니다.
pub async fn load_memberships(path: PathBuf) -> Result<Vec<MembershipRecord>> {
    let source = CsvMembershipSource::new(path);
    let records = source
        .fetch()
        .await
        .with_context(|| format!("테마 구성 로드 실패: {}", source.path().display()))?;
    Ok(records)
}
