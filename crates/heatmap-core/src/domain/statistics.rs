//! 테마 통계 집계.
//!
//! 테마 목록에 대한 상태 없는 집계 함수를 제공합니다. 그룹 집계는 테마의
//! 가중 평균을 다시 평균하지 않고 종목 단위 원시 합계를 누적하므로, 그룹의
//! 가중 등락률은 소속 종목 전체의 시가총액 가중 평균과 같습니다.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use super::stock::Stock;
use super::theme::{weighted_average, Theme, ThemeGroup};
use super::value_objects::MarketCap;
use crate::config::ThemeHierarchy;

/// 시장 전체 요약.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MarketSummary {
    /// 전체 시가총액
    pub total_market_cap: MarketCap,
    /// 전체 종목의 시가총액 가중 등락률 (%)
    pub weighted_change_ratio: Decimal,
    /// 테마 수
    pub theme_count: usize,
    /// 종목 수 (테마 간 중복 포함)
    pub stock_count: usize,
    /// 상승 종목 수
    pub advancing: usize,
    /// 하락 종목 수
    pub declining: usize,
    /// 보합 종목 수
    pub unchanged: usize,
}

impl MarketSummary {
    /// 상승 비율 (%). 종목이 없으면 0.
    pub fn advance_ratio(&self) -> Decimal {
        if self.stock_count == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.advancing) / Decimal::from(self.stock_count) * Decimal::ONE_HUNDRED
    }
}

/// 테마 통계 서비스.
#[derive(Debug, Clone, Copy)]
pub struct ThemeStatisticsService<'a> {
    hierarchy: &'a ThemeHierarchy,
}

impl<'a> ThemeStatisticsService<'a> {
    pub fn new(hierarchy: &'a ThemeHierarchy) -> Self {
        Self { hierarchy }
    }

    /// 테마의 상위 그룹명.
    ///
    /// 테마 자체의 `parent_group`을 우선하고, 없으면 계층 매핑을 조회합니다.
    pub fn resolve_group<'t>(&self, theme: &'t Theme) -> Option<&'t str>
    where
        'a: 't,
    {
        theme
            .parent_group()
            .or_else(|| self.hierarchy.group_of(theme.name()))
    }

    /// 그룹별 집계를 계산합니다.
    ///
    /// 그룹을 찾을 수 없는 테마는 결과에서 제외됩니다. 결과는 그룹명 순으로
    /// 정렬됩니다.
    pub fn calculate_group_stats<'t, I>(&self, themes: I) -> BTreeMap<String, ThemeGroup>
    where
        I: IntoIterator<Item = &'t Theme>,
    {
        let mut groups: BTreeMap<String, ThemeGroup> = BTreeMap::new();

        for theme in themes {
            let Some(group_name) = self.resolve_group(theme) else {
                continue;
            };

            let group = groups
                .remove(group_name)
                .unwrap_or_else(|| ThemeGroup::empty(group_name));
            groups.insert(group_name.to_string(), group.absorb(theme));
        }

        tracing::debug!(groups = groups.len(), "그룹 통계 계산 완료");
        groups
    }

    /// 시가총액 기준 정렬 (안정 정렬).
    pub fn sort_themes_by_market_cap<'t, I>(&self, themes: I, descending: bool) -> Vec<&'t Theme>
    where
        I: IntoIterator<Item = &'t Theme>,
    {
        let mut sorted: Vec<&Theme> = themes.into_iter().collect();
        if descending {
            sorted.sort_by(|a, b| b.total_market_cap().cmp(&a.total_market_cap()));
        } else {
            sorted.sort_by_key(|t| t.total_market_cap());
        }
        sorted
    }

    /// 최소 종목 수 이상인 테마만 남깁니다. 입력 순서를 유지합니다.
    pub fn filter_themes_by_min_stocks<'t, I>(&self, themes: I, min_stocks: usize) -> Vec<&'t Theme>
    where
        I: IntoIterator<Item = &'t Theme>,
    {
        themes
            .into_iter()
            .filter(|t| t.stock_count() >= min_stocks)
            .collect()
    }

    /// 시가총액 상위 종목.
    pub fn get_top_stocks_by_market_cap<'t>(&self, theme: &'t Theme, top_n: usize) -> Vec<&'t Stock> {
        let mut stocks: Vec<&Stock> = theme.stocks().iter().collect();
        stocks.sort_by(|a, b| b.market_cap().cmp(&a.market_cap()));
        stocks.truncate(top_n);
        stocks
    }

    /// 시장 전체 요약을 계산합니다.
    pub fn market_summary<'t, I>(&self, themes: I) -> MarketSummary
    where
        I: IntoIterator<Item = &'t Theme>,
    {
        let mut total = MarketCap::zero();
        let mut weighted_sum = Decimal::ZERO;
        let mut summary = MarketSummary::default();

        for theme in themes {
            summary.theme_count += 1;
            total = total + theme.total_market_cap();
            weighted_sum += theme.weighted_change_sum();

            for stock in theme.stocks() {
                summary.stock_count += 1;
                let ratio = stock.change_ratio();
                if ratio.is_positive() {
                    summary.advancing += 1;
                } else if ratio.is_negative() {
                    summary.declining += 1;
                } else {
                    summary.unchanged += 1;
                }
            }
        }

        summary.total_market_cap = total;
        summary.weighted_change_ratio = weighted_average(weighted_sum, total);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ChangeRatio;
    use rust_decimal_macros::dec;

    fn stock(code: &str, name: &str, trillion: Decimal, change: Decimal) -> Stock {
        Stock::new(
            code,
            name,
            MarketCap::from_trillion(trillion).unwrap(),
            ChangeRatio::new(change).unwrap(),
        )
        .unwrap()
    }

    fn theme(name: &str, stocks: Vec<Stock>) -> Theme {
        let mut theme = Theme::new(name).unwrap();
        for s in stocks {
            theme.add_stock(s);
        }
        theme
    }

    fn semiconductor() -> Theme {
        theme(
            "반도체",
            vec![
                stock("005930", "삼성전자", dec!(400), dec!(2.0)),
                stock("000660", "SK하이닉스", dec!(100), dec!(3.0)),
            ],
        )
    }

    fn battery() -> Theme {
        theme(
            "2차전지",
            vec![
                stock("006400", "삼성SDI", dec!(50), dec!(1.5)),
                stock("051910", "LG화학", dec!(70), dec!(2.5)),
            ],
        )
    }

    #[test]
    fn test_group_stats_without_groups_is_empty() {
        let hierarchy = ThemeHierarchy::new();
        let service = ThemeStatisticsService::new(&hierarchy);
        let themes = vec![semiconductor(), battery()];

        assert!(service.calculate_group_stats(&themes).is_empty());
    }

    #[test]
    fn test_group_stats_uses_raw_sums() {
        let hierarchy = ThemeHierarchy::new()
            .with("반도체", "IT")
            .with("2차전지", "IT");
        let service = ThemeStatisticsService::new(&hierarchy);
        let themes = vec![semiconductor(), battery()];

        let groups = service.calculate_group_stats(&themes);
        let it = &groups["IT"];

        assert_eq!(it.market_cap().in_trillion(), dec!(620));
        assert_eq!(it.theme_count(), 2);
        // (800 + 300 + 75 + 175) / 620
        assert_eq!(it.change_sum(), dec!(1350));
        assert!((it.weighted_change_ratio() - dec!(2.1774)).abs() < dec!(0.01));
    }

    #[test]
    fn test_group_ratio_is_not_average_of_averages() {
        let hierarchy = ThemeHierarchy::new().with("대형", "G").with("소형", "G");
        let service = ThemeStatisticsService::new(&hierarchy);
        let themes = vec![
            theme("대형", vec![stock("A", "A", dec!(900), dec!(1.0))]),
            theme("소형", vec![stock("B", "B", dec!(100), dec!(10.0))]),
        ];

        let group = &service.calculate_group_stats(&themes)["G"];
        // 가중 평균 1.9, 평균의 평균이면 5.5
        assert_eq!(group.weighted_change_ratio(), dec!(1.9));
    }

    #[test]
    fn test_parent_group_attribute_wins_over_hierarchy() {
        let hierarchy = ThemeHierarchy::new().with("반도체", "IT");
        let service = ThemeStatisticsService::new(&hierarchy);

        let tagged = semiconductor().with_parent_group("메모리");
        assert_eq!(service.resolve_group(&tagged), Some("메모리"));
        assert_eq!(service.resolve_group(&semiconductor()), Some("IT"));
        assert_eq!(service.resolve_group(&battery()), None);
    }

    #[test]
    fn test_sort_themes_by_market_cap() {
        let hierarchy = ThemeHierarchy::new();
        let service = ThemeStatisticsService::new(&hierarchy);
        let equal_a = theme("동률A", vec![stock("X1", "X1", dec!(120), dec!(0))]);
        let equal_b = theme("동률B", vec![stock("X2", "X2", dec!(120), dec!(0))]);
        let themes = vec![battery(), semiconductor(), equal_a, equal_b];

        let desc: Vec<&str> = service
            .sort_themes_by_market_cap(&themes, true)
            .into_iter()
            .map(Theme::name)
            .collect();
        assert_eq!(desc, vec!["반도체", "2차전지", "동률A", "동률B"]);

        let asc: Vec<&str> = service
            .sort_themes_by_market_cap(&themes, false)
            .into_iter()
            .map(Theme::name)
            .collect();
        assert_eq!(asc, vec!["2차전지", "동률A", "동률B", "반도체"]);
    }

    #[test]
    fn test_filter_themes_by_min_stocks() {
        let hierarchy = ThemeHierarchy::new();
        let service = ThemeStatisticsService::new(&hierarchy);
        let single = theme("단일", vec![stock("S", "S", dec!(1), dec!(0))]);
        let themes = vec![semiconductor(), single, battery()];

        let kept: Vec<&str> = service
            .filter_themes_by_min_stocks(&themes, 2)
            .into_iter()
            .map(Theme::name)
            .collect();
        assert_eq!(kept, vec!["반도체", "2차전지"]);
    }

    #[test]
    fn test_top_stocks() {
        let hierarchy = ThemeHierarchy::new();
        let service = ThemeStatisticsService::new(&hierarchy);
        let battery = battery();

        let top = service.get_top_stocks_by_market_cap(&battery, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name(), "LG화학");

        assert_eq!(service.get_top_stocks_by_market_cap(&battery, 10).len(), 2);
        assert!(service.get_top_stocks_by_market_cap(&battery, 0).is_empty());
    }

    #[test]
    fn test_market_summary() {
        let hierarchy = ThemeHierarchy::new();
        let service = ThemeStatisticsService::new(&hierarchy);
        let mixed = theme(
            "혼조",
            vec![
                stock("D1", "하락주", dec!(10), dec!(-1.0)),
                stock("F1", "보합주", dec!(10), dec!(0)),
            ],
        );
        let themes = vec![semiconductor(), mixed];

        let summary = service.market_summary(&themes);
        assert_eq!(summary.theme_count, 2);
        assert_eq!(summary.stock_count, 4);
        assert_eq!(summary.advancing, 2);
        assert_eq!(summary.declining, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.total_market_cap.in_trillion(), dec!(520));
        // (1100 - 10) / 520
        assert!((summary.weighted_change_ratio - dec!(2.0962)).abs() < dec!(0.0001));
        assert_eq!(summary.advance_ratio(), dec!(50));
    }
}
