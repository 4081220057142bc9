//! 히트맵 생성 서비스.
//!
//! 시세 레코드와 테마 구성 레코드를 결합해 엔티티 그래프를 만들고, 그룹
//! 집계와 트리맵 노드 생성까지 한 번의 배치로 실행합니다.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::config::HeatmapConfig;
use crate::domain::{
    ChangeRatio, MarketCap, MarketSummary, MembershipRecord, SectorThemeMapper, Stock,
    StockRecord, Theme, ThemeGroup, ThemeStatisticsService, TreemapBuilder, TreemapViewModel,
};
use crate::error::{HeatmapError, HeatmapResult};

/// 입력 결합 요약.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    /// 처리한 테마 구성 행 수
    pub membership_rows: usize,
    /// 시세와 결합된 행 수
    pub matched: usize,
    /// 시세에 없는 종목이라 버린 행 수
    pub unmatched: usize,
    /// 엔티티 생성에 실패해 건너뛴 행 수
    pub skipped: usize,
    /// 범위를 벗어나 0으로 보정한 등락률 수
    pub coerced: usize,
}

/// 엔티티 생성 결과.
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub themes: Vec<Theme>,
    pub summary: IngestSummary,
}

/// 한 번의 히트맵 생성 결과.
#[derive(Debug, Clone)]
pub struct HeatmapReport {
    pub themes: Vec<Theme>,
    pub group_stats: BTreeMap<String, ThemeGroup>,
    pub market: MarketSummary,
    pub view: TreemapViewModel,
    pub ingest: IngestSummary,
}

impl HeatmapReport {
    /// 데이터가 없을 때의 빈 결과.
    pub fn empty() -> Self {
        Self {
            themes: Vec::new(),
            group_stats: BTreeMap::new(),
            market: MarketSummary::default(),
            view: TreemapViewModel {
                nodes: Vec::new(),
                root_label: String::new(),
                title: String::new(),
            },
            ingest: IngestSummary::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}

/// 히트맵 생성 서비스.
#[derive(Debug, Clone, Default)]
pub struct HeatmapService {
    config: HeatmapConfig,
    sector_mapper: SectorThemeMapper,
}

impl HeatmapService {
    pub fn new(config: HeatmapConfig) -> Self {
        Self {
            config,
            sector_mapper: SectorThemeMapper::default(),
        }
    }

    /// 업종 매퍼 교체.
    pub fn with_sector_mapper(mut self, mapper: SectorThemeMapper) -> Self {
        self.sector_mapper = mapper;
        self
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    pub fn statistics(&self) -> ThemeStatisticsService<'_> {
        ThemeStatisticsService::new(&self.config.hierarchy)
    }

    pub fn treemap_builder(&self) -> TreemapBuilder<'_> {
        TreemapBuilder::new(&self.config.chart, &self.config.hierarchy)
    }

    /// 시세와 테마 구성을 결합해 테마 목록을 만듭니다.
    ///
    /// 테마는 처음 등장한 순서를 따릅니다. 같은 종목이 여러 테마에 속하면
    /// 각 테마에 모두 들어갑니다.
    pub fn build_themes(
        &self,
        listing: &[StockRecord],
        memberships: &[MembershipRecord],
    ) -> HeatmapResult<IngestOutcome> {
        if listing.is_empty() {
            return Err(HeatmapError::DataUnavailable("시세 데이터가 비어 있습니다".to_string()));
        }
        if memberships.is_empty() {
            return Err(HeatmapError::DataUnavailable(
                "테마 구성 데이터가 비어 있습니다".to_string(),
            ));
        }

        // 종목명 → 시세 (먼저 나온 것 우선)
        let mut by_name: HashMap<&str, &StockRecord> = HashMap::with_capacity(listing.len());
        for record in listing {
            by_name.entry(record.name.trim()).or_insert(record);
        }

        let mut summary = IngestSummary::default();
        let mut builder = ThemeAccumulator::default();

        for membership in memberships {
            summary.membership_rows += 1;

            let stock_name = membership.stock_name.trim();
            let Some(record) = by_name.get(stock_name) else {
                summary.unmatched += 1;
                continue;
            };
            summary.matched += 1;

            let theme_name = self.config.rename.apply(membership.theme_name.trim());
            let stock = match to_stock(record, &mut summary) {
                Ok(stock) => stock,
                Err(e) => {
                    tracing::debug!(stock = %stock_name, error = %e, "종목 건너뜀");
                    summary.skipped += 1;
                    continue;
                }
            };

            let group = self.config.hierarchy.group_of(theme_name);
            if let Err(e) = builder.push(theme_name, group, stock) {
                tracing::debug!(theme = %theme_name, error = %e, "테마 건너뜀");
                summary.skipped += 1;
            }
        }

        let themes = builder.finish();
        tracing::info!(
            rows = summary.membership_rows,
            matched = summary.matched,
            unmatched = summary.unmatched,
            skipped = summary.skipped,
            coerced = summary.coerced,
            themes = themes.len(),
            "테마 구성 결합 완료"
        );

        Ok(IngestOutcome { themes, summary })
    }

    /// 업종명으로 테마를 만듭니다.
    ///
    /// 시가총액 상위 `top_n` 종목만 사용하며 테마에는 상위 그룹이 없습니다.
    pub fn build_sector_themes(
        &self,
        listing: &[StockRecord],
        top_n: usize,
    ) -> HeatmapResult<IngestOutcome> {
        if listing.is_empty() {
            return Err(HeatmapError::DataUnavailable("시세 데이터가 비어 있습니다".to_string()));
        }

        let mut ranked: Vec<&StockRecord> = listing.iter().collect();
        ranked.sort_by(|a, b| cap_or_zero(b).cmp(&cap_or_zero(a)));
        ranked.truncate(top_n);

        let mut summary = IngestSummary::default();
        let mut builder = ThemeAccumulator::default();

        for record in ranked {
            summary.membership_rows += 1;
            summary.matched += 1;

            let stock = match to_stock(record, &mut summary) {
                Ok(stock) => stock,
                Err(e) => {
                    tracing::debug!(code = %record.code, error = %e, "종목 건너뜀");
                    summary.skipped += 1;
                    continue;
                }
            };

            let theme_name = self.sector_mapper.map(record.sector.as_deref());
            builder.push(theme_name, None, stock)?;
        }

        let themes = builder.finish();
        tracing::info!(
            stocks = summary.matched,
            skipped = summary.skipped,
            themes = themes.len(),
            "업종 테마 구성 완료"
        );

        Ok(IngestOutcome { themes, summary })
    }

    /// 히트맵을 생성합니다.
    ///
    /// 입력 데이터가 없으면 경고를 남기고 빈 결과를 반환합니다.
    pub fn generate(&self, listing: &[StockRecord], memberships: &[MembershipRecord]) -> HeatmapReport {
        self.report_or_empty(self.build_themes(listing, memberships))
    }

    /// 업종 기반 히트맵을 생성합니다.
    pub fn generate_sectors(&self, listing: &[StockRecord], top_n: usize) -> HeatmapReport {
        self.report_or_empty(self.build_sector_themes(listing, top_n))
    }

    /// 이미 만들어진 테마 목록으로 결과를 구성합니다.
    pub fn report(&self, themes: Vec<Theme>, ingest: IngestSummary) -> HeatmapReport {
        let stats = self.statistics();
        let group_stats = stats.calculate_group_stats(&themes);
        let market = stats.market_summary(&themes);
        let view = self.treemap_builder().build(&themes, &group_stats);

        HeatmapReport {
            themes,
            group_stats,
            market,
            view,
            ingest,
        }
    }

    fn report_or_empty(&self, outcome: HeatmapResult<IngestOutcome>) -> HeatmapReport {
        match outcome {
            Ok(outcome) if outcome.themes.is_empty() => {
                tracing::warn!("결합된 종목이 없어 빈 히트맵을 반환합니다");
                HeatmapReport {
                    ingest: outcome.summary,
                    ..HeatmapReport::empty()
                }
            }
            Ok(outcome) => self.report(outcome.themes, outcome.summary),
            Err(e) => {
                tracing::warn!(error = %e, "히트맵 생성 불가, 빈 결과 반환");
                HeatmapReport::empty()
            }
        }
    }
}

/// 테마 이름별 누적기 (첫 등장 순서 유지).
#[derive(Default)]
struct ThemeAccumulator {
    themes: Vec<Theme>,
    index: HashMap<String, usize>,
}

impl ThemeAccumulator {
    fn push(&mut self, name: &str, group: Option<&str>, stock: Stock) -> HeatmapResult<()> {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                let mut theme = Theme::new(name)?;
                theme.set_parent_group(group.map(str::to_string));
                self.themes.push(theme);
                self.index.insert(name.to_string(), self.themes.len() - 1);
                self.themes.len() - 1
            }
        };
        self.themes[idx].add_stock(stock);
        Ok(())
    }

    fn finish(self) -> Vec<Theme> {
        self.themes
    }
}

fn cap_or_zero(record: &StockRecord) -> Decimal {
    record
        .market_cap
        .filter(|c| *c > Decimal::ZERO)
        .unwrap_or(Decimal::ZERO)
}

/// 시세 레코드를 종목 엔티티로 변환합니다.
///
/// 시가총액이 없거나 음수면 0, 등락률이 없으면 0, 범위를 벗어나면 0으로
/// 보정하고 `coerced`를 증가시킵니다.
fn to_stock(record: &StockRecord, summary: &mut IngestSummary) -> HeatmapResult<Stock> {
    let market_cap = MarketCap::new(cap_or_zero(record))?;

    let change_ratio = match record.change_ratio {
        None => ChangeRatio::zero(),
        Some(value) => ChangeRatio::new(value).unwrap_or_else(|_| {
            summary.coerced += 1;
            tracing::debug!(code = %record.code, change = %value, "비정상 등락률 보정");
            ChangeRatio::zero()
        }),
    };

    Stock::new(record.code.as_str(), record.name.as_str(), market_cap, change_ratio)
}
