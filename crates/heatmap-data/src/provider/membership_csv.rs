//! 테마 구성 CSV 소스.
//!
//! 두 가지 형식을 헤더로 판별합니다.
//! - long: `theme,stock` (또는 `테마,종목명`) 두 열, 한 줄에 한 구성
//! - wide: 열 머리글이 테마명, 각 셀이 종목명 (빈 셀 무시)
//!
//! 중복 종목 보고서(`종목명,테마1,테마2,...`)의 읽기/쓰기도 제공합니다.
//! 읽은 이름은 모두 NFC로 정규화합니다.

use async_trait::async_trait;
use heatmap_core::MembershipRecord;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::curation::{DuplicateEntry, DuplicateOverride};
use crate::error::{DataError, Result};
use crate::normalize::normalize_name;
use crate::source::MembershipSource;

const LONG_THEME_HEADERS: [&str; 2] = ["theme", "테마"];
const LONG_STOCK_HEADERS: [&str; 2] = ["stock", "종목명"];

/// 테마 구성 CSV 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipFormat {
    Long,
    Wide,
}

impl MembershipFormat {
    /// 헤더로 형식을 판별합니다.
    pub fn detect(headers: &csv::StringRecord) -> Self {
        let header = |idx: usize| normalize_name(&headers[idx]).to_lowercase();
        let is_long = headers.len() == 2
            && LONG_THEME_HEADERS.contains(&header(0).as_str())
            && LONG_STOCK_HEADERS.contains(&header(1).as_str());
        if is_long {
            Self::Long
        } else {
            Self::Wide
        }
    }
}

/// CSV 파일 테마 구성 소스.
#[derive(Debug, Clone)]
pub struct CsvMembershipSource {
    path: PathBuf,
}

impl CsvMembershipSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 리더에서 테마 구성을 읽습니다.
    ///
    /// wide 형식은 열(테마) 순서대로 펼칩니다.
    pub fn read_from<R: Read>(reader: R) -> Result<Vec<MembershipRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let format = MembershipFormat::detect(&headers);

        match format {
            MembershipFormat::Long => {
                let mut records = Vec::new();
                for row in csv_reader.records() {
                    let row = row?;
                    let (Some(theme), Some(stock)) = (row.get(0), row.get(1)) else {
                        continue;
                    };
                    let (theme, stock) = (normalize_name(theme), normalize_name(stock));
                    if theme.is_empty() || stock.is_empty() {
                        continue;
                    }
                    records.push(MembershipRecord::new(theme, stock));
                }
                Ok(records)
            }
            MembershipFormat::Wide => {
                let mut columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
                for row in csv_reader.records() {
                    let row = row?;
                    for (idx, cell) in row.iter().enumerate().take(headers.len()) {
                        if !cell.is_empty() {
                            columns[idx].push(normalize_name(cell));
                        }
                    }
                }

                Ok(headers
                    .iter()
                    .map(normalize_name)
                    .zip(columns)
                    .filter(|(theme, _)| !theme.is_empty())
                    .flat_map(|(theme, stocks)| {
                        stocks
                            .into_iter()
                            .map(move |stock| MembershipRecord::new(theme.as_str(), stock))
                    })
                    .collect())
            }
        }
    }
}

#[async_trait]
impl MembershipSource for CsvMembershipSource {
    fn name(&self) -> &str {
        "CSV membership"
    }

    async fn fetch(&self) -> Result<Vec<MembershipRecord>> {
        if !self.path.exists() {
            return Err(DataError::NotFound(self.path.display().to_string()));
        }

        let bytes = tokio::fs::read(&self.path).await?;
        let records = Self::read_from(bytes.as_slice())?;

        tracing::info!(
            path = %self.path.display(),
            count = records.len(),
            "테마 구성 CSV 로드 완료"
        );
        Ok(records)
    }
}

/// 테마 구성을 long 형식(`theme,stock`)으로 씁니다.
pub fn write_memberships<W: Write>(writer: W, memberships: &[MembershipRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["theme", "stock"])?;
    for m in memberships {
        csv_writer.write_record([m.theme_name.as_str(), m.stock_name.as_str()])?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// 중복 종목 보고서를 씁니다 (`종목명,테마1,테마2,...`).
pub fn write_duplicate_report<W: Write>(writer: W, duplicates: &[DuplicateEntry]) -> Result<()> {
    let max_themes = duplicates.iter().map(|d| d.themes.len()).max().unwrap_or(0);

    let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    let mut header = vec!["종목명".to_string()];
    header.extend((1..=max_themes).map(|i| format!("테마{}", i)));
    csv_writer.write_record(&header)?;

    for entry in duplicates {
        let mut row = vec![entry.stock.clone()];
        row.extend(entry.themes.iter().cloned());
        row.resize(max_themes + 1, String::new());
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// 중복 해소 지정 파일을 읽습니다.
///
/// 첫 열은 종목명, 이후 열은 선호 순서대로 나열한 후보 테마입니다. 빈 셀은
/// 건너뜁니다.
pub fn read_overrides<R: Read>(reader: R) -> Result<Vec<DuplicateOverride>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut overrides = Vec::new();
    for row in csv_reader.records() {
        let row = row?;
        let Some(stock) = row.get(0).map(normalize_name).filter(|s| !s.is_empty()) else {
            continue;
        };
        let candidates: Vec<String> = row
            .iter()
            .skip(1)
            .map(normalize_name)
            .filter(|c| !c.is_empty())
            .collect();
        overrides.push(DuplicateOverride { stock, candidates });
    }
    Ok(overrides)
}
