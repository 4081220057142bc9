//! 트리맵 노드 생성.
//!
//! 엔티티 그래프와 그룹 집계를 렌더러가 바로 소비할 수 있는 평탄한 노드
//! 목록으로 변환합니다. 노드는 루트 → 그룹 → 테마 → 종목 순서로 나열되며,
//! 모든 비단말 노드의 값은 직계 자식 값의 합과 정확히 같습니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::statistics::ThemeStatisticsService;
use super::theme::{weighted_average, Theme, ThemeGroup};
use super::value_objects::MarketCap;
use crate::config::{ChartConfig, ThemeHierarchy};

/// 루트/그룹/테마 노드의 텍스트 템플릿.
pub const BRANCH_TEXT_TEMPLATE: &str = "<b>%{label}</b>";

/// 종목 노드의 텍스트 템플릿.
pub const LEAF_TEXT_TEMPLATE: &str = "<b>%{label}</b><br>%{value:.2f}조<br>%{customdata:.2f}%";

const GROUP_ID_PREFIX: &str = "Group_";
const THEME_ID_PREFIX: &str = "Theme_";

/// 노드 계층.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Root,
    Group,
    Theme,
    Stock,
}

/// 트리맵 노드.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreemapNode {
    /// 트리 전체에서 고유한 ID
    pub id: String,
    pub kind: NodeKind,
    /// 표시 라벨
    pub label: String,
    /// 부모 ID (루트는 빈 문자열)
    pub parent_id: String,
    /// 시가총액 (조)
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    /// 색상 값 (가중 등락률, %)
    #[serde(with = "rust_decimal::serde::float")]
    pub color: Decimal,
    /// 툴팁용 값 (색상 값과 동일)
    #[serde(with = "rust_decimal::serde::float")]
    pub custom_data: Decimal,
    /// 텍스트 템플릿
    pub text_template: String,
}

impl TreemapNode {
    fn branch(
        kind: NodeKind,
        id: String,
        label: &str,
        parent_id: &str,
        cap: MarketCap,
        change: Decimal,
    ) -> Self {
        Self {
            id,
            kind,
            label: label.to_string(),
            parent_id: parent_id.to_string(),
            value: cap.in_trillion(),
            color: change,
            custom_data: change,
            text_template: BRANCH_TEXT_TEMPLATE.to_string(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_empty()
    }

    /// 종목 노드 여부. 종목이 없는 테마 노드는 단말이 아닙니다.
    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Stock
    }
}

/// 렌더링용 트리맵 뷰 모델.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreemapViewModel {
    pub nodes: Vec<TreemapNode>,
    pub root_label: String,
    pub title: String,
}

impl TreemapViewModel {
    pub fn ids(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.label.as_str()).collect()
    }

    pub fn parents(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.parent_id.as_str()).collect()
    }

    pub fn values(&self) -> Vec<Decimal> {
        self.nodes.iter().map(|n| n.value).collect()
    }

    pub fn colors(&self) -> Vec<Decimal> {
        self.nodes.iter().map(|n| n.color).collect()
    }

    pub fn custom_data(&self) -> Vec<Decimal> {
        self.nodes.iter().map(|n| n.custom_data).collect()
    }

    pub fn text_templates(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.text_template.as_str()).collect()
    }

    /// ID로 노드 조회.
    pub fn find(&self, id: &str) -> Option<&TreemapNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// 직계 자식 노드.
    pub fn children_of(&self, id: &str) -> Vec<&TreemapNode> {
        self.nodes.iter().filter(|n| n.parent_id == id).collect()
    }

    pub fn root(&self) -> Option<&TreemapNode> {
        self.nodes.iter().find(|n| n.is_root())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// 트리맵 빌더.
#[derive(Debug, Clone, Copy)]
pub struct TreemapBuilder<'a> {
    chart: &'a ChartConfig,
    hierarchy: &'a ThemeHierarchy,
}

impl<'a> TreemapBuilder<'a> {
    pub fn new(chart: &'a ChartConfig, hierarchy: &'a ThemeHierarchy) -> Self {
        Self { chart, hierarchy }
    }

    /// 그룹 집계를 직접 계산한 뒤 트리를 만듭니다.
    pub fn build_from_themes(&self, themes: &[Theme]) -> TreemapViewModel {
        let stats = ThemeStatisticsService::new(self.hierarchy);
        let group_stats = stats.calculate_group_stats(themes);
        self.build(themes, &group_stats)
    }

    /// 테마 목록과 그룹 집계로 트리를 만듭니다.
    ///
    /// `group_stats`는 어떤 그룹 노드를 만들지만 결정합니다. 그룹 노드의 값과
    /// 색상은 실제로 그 그룹에 붙는 테마에서 다시 합산하므로, 다른 테마 집합에서
    /// 계산된 집계를 넘겨도 부모 값은 자식 합과 같습니다. 그룹이 결정되었지만
    /// 집계에 없는 테마는 루트 아래에 붙습니다.
    pub fn build(
        &self,
        themes: &[Theme],
        group_stats: &BTreeMap<String, ThemeGroup>,
    ) -> TreemapViewModel {
        let stats = ThemeStatisticsService::new(self.hierarchy);
        let root_id = self.chart.root_id.as_str();

        // 테마별 부모 ID
        let parents: Vec<Option<&str>> = themes
            .iter()
            .map(|theme| {
                stats
                    .resolve_group(theme)
                    .filter(|group| group_stats.contains_key(*group))
            })
            .collect();

        let mut nodes = Vec::with_capacity(1 + group_stats.len() + themes.len());

        // 1. 루트
        let total: MarketCap = themes.iter().map(Theme::total_market_cap).sum();
        let weighted_sum: Decimal = themes.iter().map(Theme::weighted_change_sum).sum();
        nodes.push(TreemapNode::branch(
            NodeKind::Root,
            root_id.to_string(),
            &self.chart.root_label,
            "",
            total,
            weighted_average(weighted_sum, total),
        ));

        // 2. 그룹 (소속 테마가 있는 것만)
        for (name, group) in group_stats {
            let members: Vec<&Theme> = themes
                .iter()
                .zip(&parents)
                .filter(|(_, parent)| **parent == Some(name.as_str()))
                .map(|(theme, _)| theme)
                .collect();
            if members.is_empty() {
                continue;
            }

            let cap: MarketCap = members.iter().map(|t| t.total_market_cap()).sum();
            let weighted_sum: Decimal = members.iter().map(|t| t.weighted_change_sum()).sum();
            if cap != group.market_cap() {
                tracing::warn!(
                    group = %name,
                    group_cap = %group.market_cap(),
                    themes_cap = %cap,
                    "그룹 집계가 소속 테마 합계와 달라 테마 합계를 사용합니다"
                );
            }

            nodes.push(TreemapNode::branch(
                NodeKind::Group,
                group_id(name),
                name,
                root_id,
                cap,
                weighted_average(weighted_sum, cap),
            ));
        }

        // 3. 테마
        for (theme, parent) in themes.iter().zip(&parents) {
            let parent_id = parent.map(group_id).unwrap_or_else(|| root_id.to_string());
            nodes.push(TreemapNode::branch(
                NodeKind::Theme,
                theme_id(theme.name()),
                theme.name(),
                &parent_id,
                theme.total_market_cap(),
                theme.weighted_change_ratio(),
            ));
        }

        // 4. 종목
        let mut used_ids: HashSet<String> = nodes.iter().map(|n| n.id.clone()).collect();
        for theme in themes {
            let parent_id = theme_id(theme.name());
            for stock in theme.stocks() {
                let mut id = format!("{}_{}", theme.name(), stock.name());
                if used_ids.contains(&id) {
                    id = format!("{}_{}", id, stock.code());
                }
                used_ids.insert(id.clone());

                let change = stock.change_ratio().value();
                nodes.push(TreemapNode {
                    id,
                    kind: NodeKind::Stock,
                    label: stock.name().to_string(),
                    parent_id: parent_id.clone(),
                    value: stock.market_cap().in_trillion(),
                    color: change,
                    custom_data: change,
                    text_template: LEAF_TEXT_TEMPLATE.to_string(),
                });
            }
        }

        tracing::debug!(nodes = nodes.len(), themes = themes.len(), "트리맵 노드 생성 완료");

        TreemapViewModel {
            nodes,
            root_label: self.chart.root_label.clone(),
            title: self.chart.title.clone(),
        }
    }
}

fn group_id(name: &str) -> String {
    format!("{}{}", GROUP_ID_PREFIX, name)
}

fn theme_id(name: &str) -> String {
    format!("{}{}", THEME_ID_PREFIX, name)
}
