//! 저장된 테마 HTML 페이지 스크래퍼.
//!
//! 테마 페이지의 종목 표(`tr.stockTrMobile`)에서 종목명을 추출합니다.
//! 파일 이름(확장자 제외)이 테마명입니다. 테마명과 종목명은 NFC로 정규화합니다.

use async_trait::async_trait;
use heatmap_core::MembershipRecord;
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};

use crate::curation::ThemeStockList;
use crate::error::{DataError, Result};
use crate::normalize::normalize_name;
use crate::source::MembershipSource;

const ROW_SELECTOR: &str = "tr.stockTrMobile";
const CELL_SELECTOR: &str = "td p.stockInfoMobile";

/// 테마 HTML 디렉토리 스크래퍼.
#[derive(Debug, Clone)]
pub struct ThemePageScraper {
    dir: PathBuf,
}

impl ThemePageScraper {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// HTML에서 종목명을 추출합니다.
    ///
    /// 행마다 `p.stockInfoMobile`이 두 개 이상(종목명, 종목코드)이어야 하며
    /// 첫 번째를 종목명으로 씁니다. 중복은 처음 순서를 유지해 제거합니다.
    pub fn parse_html(html: &str) -> Result<Vec<String>> {
        let row_selector = Selector::parse(ROW_SELECTOR)
            .map_err(|e| DataError::ParseError(format!("선택자 오류: {:?}", e)))?;
        let cell_selector = Selector::parse(CELL_SELECTOR)
            .map_err(|e| DataError::ParseError(format!("선택자 오류: {:?}", e)))?;

        let document = Html::parse_document(html);
        let mut stocks: Vec<String> = Vec::new();

        for row in document.select(&row_selector) {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|p| normalize_name(&p.text().collect::<String>()))
                .collect();
            if cells.len() < 2 {
                continue;
            }
            let name = &cells[0];
            if !name.is_empty() && !stocks.contains(name) {
                stocks.push(name.clone());
            }
        }

        Ok(stocks)
    }

    /// HTML 파일 하나를 읽어 테마 종목 목록을 만듭니다.
    pub async fn scrape_file(path: &Path) -> Result<ThemeStockList> {
        let theme = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(normalize_name)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DataError::InvalidData(format!("테마명 없음: {}", path.display())))?;

        let html = tokio::fs::read_to_string(path).await?;
        let stocks = Self::parse_html(&html)?;

        tracing::debug!(theme = %theme, count = stocks.len(), "테마 페이지 파싱");
        Ok(ThemeStockList::new(theme, stocks))
    }

    /// 디렉토리의 모든 `.html` 파일을 파일명 순서로 읽습니다.
    pub async fn scrape_dir(&self) -> Result<Vec<ThemeStockList>> {
        if !self.dir.is_dir() {
            return Err(DataError::NotFound(self.dir.display().to_string()));
        }

        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_html = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("html"));
            if is_html {
                paths.push(path);
            }
        }
        paths.sort();

        let lists =
            futures::future::try_join_all(paths.iter().map(|p| Self::scrape_file(p))).await?;

        tracing::info!(
            dir = %self.dir.display(),
            files = lists.len(),
            "테마 페이지 스크래핑 완료"
        );
        Ok(lists)
    }
}

#[async_trait]
impl MembershipSource for ThemePageScraper {
    fn name(&self) -> &str {
        "Theme HTML pages"
    }

    async fn fetch(&self) -> Result<Vec<MembershipRecord>> {
        let lists = self.scrape_dir().await?;
        Ok(lists
            .iter()
            .flat_map(|list| {
                list.stocks
                    .iter()
                    .map(move |stock| MembershipRecord::new(list.theme.as_str(), stock.as_str()))
            })
            .collect())
    }
}
