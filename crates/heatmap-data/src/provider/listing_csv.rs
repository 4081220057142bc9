//! 오프라인 시세 CSV 소스.
//!
//! 헤더는 `code,name,market_cap,change_ratio` 이며 `sector`, `market` 열은
//! 선택입니다. 숫자 열의 쉼표와 % 기호는 무시합니다.

use async_trait::async_trait;
use heatmap_core::StockRecord;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::parse_decimal_opt;
use crate::error::{DataError, Result};
use crate::normalize::normalize_name;
use crate::source::ListingSource;

#[derive(Debug, Deserialize)]
struct RawListingRow {
    code: String,
    name: String,
    #[serde(default)]
    market_cap: Option<String>,
    #[serde(default)]
    change_ratio: Option<String>,
    #[serde(default)]
    sector: Option<String>,
    #[serde(default)]
    market: Option<String>,
}

impl RawListingRow {
    fn into_record(self) -> StockRecord {
        StockRecord {
            code: self.code,
            name: normalize_name(&self.name),
            market_cap: parse_decimal_opt(self.market_cap.as_deref()),
            change_ratio: parse_decimal_opt(self.change_ratio.as_deref()),
            sector: self.sector.filter(|s| !s.is_empty()),
            market: self.market.filter(|m| !m.is_empty()),
        }
    }
}

/// CSV 파일 시세 소스.
#[derive(Debug, Clone)]
pub struct CsvListingSource {
    path: PathBuf,
}

impl CsvListingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 리더에서 시세 레코드를 읽습니다.
    pub fn read_from<R: Read>(reader: R) -> Result<Vec<StockRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut records = Vec::new();
        for row in csv_reader.deserialize::<RawListingRow>() {
            records.push(row?.into_record());
        }
        Ok(records)
    }
}

#[async_trait]
impl ListingSource for CsvListingSource {
    fn name(&self) -> &str {
        "CSV listing"
    }

    async fn fetch(&self) -> Result<Vec<StockRecord>> {
        if !self.path.exists() {
            return Err(DataError::NotFound(self.path.display().to_string()));
        }

        let bytes = tokio::fs::read(&self.path).await?;
        let records = Self::read_from(bytes.as_slice())?;

        tracing::info!(
            path = %self.path.display(),
            count = records.len(),
            "시세 CSV 로드 완료"
        );
        Ok(records)
    }
}
