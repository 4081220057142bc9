//! 테마 엔티티와 테마 그룹 집계.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::stock::Stock;
use super::value_objects::MarketCap;
use crate::error::{HeatmapError, HeatmapResult};

/// 테마 엔티티.
///
/// 테마명으로 식별되며 종목을 삽입 순서대로 소유합니다. 파생 값은 매 호출마다
/// 현재 종목 목록에서 다시 계산합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    name: String,
    stocks: Vec<Stock>,
    parent_group: Option<String>,
}

impl Theme {
    pub fn new(name: impl Into<String>) -> HeatmapResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(HeatmapError::InvalidEntity("테마명은 필수입니다".to_string()));
        }
        Ok(Self {
            name,
            stocks: Vec::new(),
            parent_group: None,
        })
    }

    /// 상위 그룹을 지정한 테마를 반환합니다.
    pub fn with_parent_group(mut self, group: impl Into<String>) -> Self {
        self.set_parent_group(Some(group.into()));
        self
    }

    /// 상위 그룹을 지정하거나 해제합니다. 빈 문자열은 해제로 취급합니다.
    pub fn set_parent_group(&mut self, group: Option<String>) {
        self.parent_group = group
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_group(&self) -> Option<&str> {
        self.parent_group.as_deref()
    }

    pub fn stocks(&self) -> &[Stock] {
        &self.stocks
    }

    /// 종목 추가.
    ///
    /// 같은 코드의 종목이 이미 있으면 아무것도 하지 않고 `false`를 반환합니다.
    pub fn add_stock(&mut self, mut stock: Stock) -> bool {
        if self.contains(&stock) {
            return false;
        }
        stock.attach_to(&self.name);
        self.stocks.push(stock);
        true
    }

    /// 종목 제거. 없으면 `None`.
    pub fn remove_stock(&mut self, stock: &Stock) -> Option<Stock> {
        let index = self.stocks.iter().position(|s| s == stock)?;
        let mut removed = self.stocks.remove(index);
        removed.detach();
        Some(removed)
    }

    pub fn contains(&self, stock: &Stock) -> bool {
        self.stocks.iter().any(|s| s == stock)
    }

    /// 테마 내 총 시가총액.
    pub fn total_market_cap(&self) -> MarketCap {
        self.stocks.iter().map(Stock::market_cap).sum()
    }

    /// 종목별 가중 등락률의 합 (가중 평균의 분자).
    pub fn weighted_change_sum(&self) -> Decimal {
        self.stocks.iter().map(Stock::weighted_change).sum()
    }

    /// 시가총액 가중 평균 등락률. 총 시가총액이 0이면 0입니다.
    pub fn weighted_change_ratio(&self) -> Decimal {
        weighted_average(self.weighted_change_sum(), self.total_market_cap())
    }

    pub fn stock_count(&self) -> usize {
        self.stocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stocks.is_empty()
    }
}

impl PartialEq for Theme {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Theme {}

/// 테마 그룹 집계 스냅샷.
///
/// 통계 서비스가 호출마다 새로 만들며, 호출자가 직접 생성하지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThemeGroup {
    name: String,
    market_cap: MarketCap,
    change_sum: Decimal,
    theme_count: usize,
}

impl ThemeGroup {
    pub(crate) fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            market_cap: MarketCap::zero(),
            change_sum: Decimal::ZERO,
            theme_count: 0,
        }
    }

    /// 테마의 원시 합계를 누적한 새 스냅샷을 반환합니다.
    pub(crate) fn absorb(self, theme: &Theme) -> Self {
        Self {
            market_cap: self.market_cap + theme.total_market_cap(),
            change_sum: self.change_sum + theme.weighted_change_sum(),
            theme_count: self.theme_count + 1,
            name: self.name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn market_cap(&self) -> MarketCap {
        self.market_cap
    }

    /// 가중 등락률 분자 합계 (등락률 × 조 단위 시가총액).
    pub fn change_sum(&self) -> Decimal {
        self.change_sum
    }

    pub fn theme_count(&self) -> usize {
        self.theme_count
    }

    /// 시가총액 가중 평균 등락률. 시가총액이 0이면 0입니다.
    pub fn weighted_change_ratio(&self) -> Decimal {
        weighted_average(self.change_sum, self.market_cap)
    }
}

/// 분자 합계를 조 단위 시가총액으로 나눕니다. 분모가 0이면 중립값 0.
pub(crate) fn weighted_average(weighted_sum: Decimal, total: MarketCap) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    weighted_sum / total.in_trillion()
}
