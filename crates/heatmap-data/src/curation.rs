//! 테마 구성 큐레이션.
//!
//! 테마별 종목 목록에서 히트맵에 올릴 구성을 고르고, 여러 테마에 걸친
//! 종목을 보고하거나 지정된 테마로 정리합니다.

use heatmap_core::{HeatmapConfig, MembershipRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::normalize::normalize_name;

/// 테마 하나의 종목 목록.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeStockList {
    pub theme: String,
    pub stocks: Vec<String>,
}

impl ThemeStockList {
    pub fn new(theme: impl Into<String>, stocks: Vec<String>) -> Self {
        Self {
            theme: theme.into(),
            stocks,
        }
    }
}

/// 그리디 선택 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurationOutcome {
    pub memberships: Vec<MembershipRecord>,
    /// 한 종목 이상 선택된 테마 수
    pub themes_used: usize,
    /// 선택된 고유 종목 수
    pub unique_stocks: usize,
    /// 목표 종목 수를 넘겨 중단했는지 여부
    pub reached_target: bool,
}

/// 여러 테마에 속한 종목.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEntry {
    pub stock: String,
    /// 소속 테마 (이름순)
    pub themes: Vec<String>,
}

/// 종목을 옮길 후보 테마 (선호 순서).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateOverride {
    pub stock: String,
    pub candidates: Vec<String>,
}

/// 존재하지 않는 테마가 후보로 지정된 경우.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidThemeReport {
    pub stock: String,
    pub theme: String,
    /// 후보 위치 (1부터)
    pub position: usize,
}

/// 중복 해소 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOutcome {
    pub memberships: Vec<MembershipRecord>,
    /// 지정 테마로 옮긴 종목 수
    pub resolved: usize,
    pub invalid_themes: Vec<InvalidThemeReport>,
    /// 해소 후에도 남은 중복
    pub unresolved: Vec<DuplicateEntry>,
}

/// 그리디 방식으로 테마 구성을 고릅니다.
///
/// 1. 테마명 변경 규칙을 적용합니다.
/// 2. 우선순위 테마를 설정 순서대로, 나머지는 종목 수가 많은 순서로 나열합니다.
/// 3. 앞에서부터 이미 선택된 종목을 빼고 테마당 최대 개수까지 선택합니다.
/// 4. 고유 종목 수가 목표를 넘으면 멈춥니다.
pub fn curate_memberships(lists: &[ThemeStockList], config: &HeatmapConfig) -> CurationOutcome {
    let priority_rank: HashMap<&str, usize> = config
        .priority_themes
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    let renamed: Vec<(&str, &[String])> = lists
        .iter()
        .filter(|l| !l.stocks.is_empty())
        .map(|l| (config.rename.apply(l.theme.as_str()), l.stocks.as_slice()))
        .collect();

    let (mut priority, mut normal): (Vec<_>, Vec<_>) = renamed
        .into_iter()
        .partition(|(theme, _)| priority_rank.contains_key(theme));
    priority.sort_by_key(|(theme, _)| priority_rank.get(theme).copied().unwrap_or(usize::MAX));
    normal.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

    let max_per_theme = config.curation.max_stocks_per_theme;
    let target = config.curation.target_stock_count;

    let mut memberships = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut themes_used = 0;
    let mut reached_target = false;

    for (theme, stocks) in priority.into_iter().chain(normal) {
        let mut taken = 0;
        for stock in stocks.iter() {
            if taken == max_per_theme {
                break;
            }
            if seen.insert(stock.as_str()) {
                memberships.push(MembershipRecord::new(theme, stock.as_str()));
                taken += 1;
            }
        }
        if taken == 0 {
            continue;
        }
        themes_used += 1;

        if seen.len() > target {
            reached_target = true;
            break;
        }
    }

    if reached_target {
        tracing::info!(
            stocks = seen.len(),
            themes = themes_used,
            "목표 종목 수 도달"
        );
    } else {
        tracing::warn!(
            stocks = seen.len(),
            target = target,
            "목표 종목 수에 도달하지 못했습니다"
        );
    }

    CurationOutcome {
        unique_stocks: seen.len(),
        memberships,
        themes_used,
        reached_target,
    }
}

/// 두 개 이상의 테마에 속한 종목을 찾습니다. 종목은 처음 등장한 순서입니다.
///
/// 이름은 NFC로 정규화해 비교합니다.
pub fn find_duplicates(memberships: &[MembershipRecord]) -> Vec<DuplicateEntry> {
    let mut order: Vec<String> = Vec::new();
    let mut themes_by_stock: HashMap<String, BTreeSet<String>> = HashMap::new();

    for m in memberships {
        let stock = normalize_name(&m.stock_name);
        let theme = normalize_name(&m.theme_name);
        if stock.is_empty() || theme.is_empty() {
            continue;
        }
        themes_by_stock
            .entry(stock)
            .or_insert_with_key(|stock| {
                order.push(stock.clone());
                BTreeSet::new()
            })
            .insert(theme);
    }

    order
        .into_iter()
        .filter_map(|stock| {
            let themes = themes_by_stock.remove(&stock)?;
            (themes.len() > 1).then(|| DuplicateEntry {
                stock,
                themes: themes.into_iter().collect(),
            })
        })
        .collect()
}

/// 지정된 테마로 중복 종목을 정리합니다.
///
/// 각 지정에 대해 존재하는 첫 후보 테마를 고르고, 종목을 모든 테마에서
/// 뺀 뒤 그 테마에만 넣습니다. 존재하지 않는 후보는 보고됩니다. 테마명과
/// 종목명은 NFC로 정규화해 비교하며 결과도 정규화된 이름으로 나옵니다.
pub fn resolve_duplicates(
    memberships: &[MembershipRecord],
    overrides: &[DuplicateOverride],
) -> ResolveOutcome {
    // 테마 → 종목 (테마 첫 등장 순서 유지)
    let mut themes: Vec<(String, Vec<String>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for m in memberships {
        let theme = normalize_name(&m.theme_name);
        let stock = normalize_name(&m.stock_name);
        if theme.is_empty() || stock.is_empty() {
            continue;
        }
        let idx = *index.entry(theme).or_insert_with_key(|theme| {
            themes.push((theme.clone(), Vec::new()));
            themes.len() - 1
        });
        let stocks = &mut themes[idx].1;
        if !stocks.contains(&stock) {
            stocks.push(stock);
        }
    }

    let mut invalid_themes = Vec::new();
    let mut resolved = 0;

    for rule in overrides {
        let stock = normalize_name(&rule.stock);
        let mut target = None;

        for (pos, candidate) in rule.candidates.iter().enumerate() {
            let candidate = normalize_name(candidate);
            if candidate.is_empty() {
                continue;
            }
            if let Some(&idx) = index.get(&candidate) {
                target = Some(idx);
                break;
            }
            invalid_themes.push(InvalidThemeReport {
                stock: stock.clone(),
                theme: candidate,
                position: pos + 1,
            });
        }

        let Some(target) = target else {
            continue;
        };

        for (_, stocks) in themes.iter_mut() {
            stocks.retain(|s| *s != stock);
        }
        themes[target].1.push(stock);
        resolved += 1;
    }

    let memberships: Vec<MembershipRecord> = themes
        .iter()
        .flat_map(|(theme, stocks)| stocks.iter().map(move |s| MembershipRecord::new(theme, s)))
        .collect();
    let unresolved = find_duplicates(&memberships);

    tracing::info!(
        resolved = resolved,
        invalid = invalid_themes.len(),
        unresolved = unresolved.len(),
        "중복 종목 정리 완료"
    );

    ResolveOutcome {
        memberships,
        resolved,
        invalid_themes,
        unresolved,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatmap_core::{CurationConfig, ThemeRenames};

    fn list(theme: &str, stocks: &[&str]) -> ThemeStockList {
        ThemeStockList::new(theme, stocks.iter().map(|s| s.to_string()).collect())
    }

    fn config(priority: &[&str], max_per_theme: usize, target: usize) -> HeatmapConfig {
        HeatmapConfig {
            priority_themes: priority.iter().map(|s| s.to_string()).collect(),
            curation: CurationConfig {
                max_stocks_per_theme: max_per_theme,
                target_stock_count: target,
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_priority_themes_first_then_by_size() {
        let lists = vec![
            list("대형", &["A", "B", "C"]),
            list("우선", &["B", "D"]),
            list("중형", &["E", "F"]),
        ];
        let outcome = curate_memberships(&lists, &config(&["우선"], 33, 200));

        let themes: Vec<&str> = outcome
            .memberships
            .iter()
            .map(|m| m.theme_name.as_str())
            .collect();
        assert_eq!(themes, vec!["우선", "우선", "대형", "대형", "중형", "중형"]);
        // B는 우선 테마에서 이미 선택됨
        assert!(!outcome
            .memberships
            .contains(&MembershipRecord::new("대형", "B")));
        assert_eq!(outcome.unique_stocks, 6);
        assert_eq!(outcome.themes_used, 3);
        assert!(!outcome.reached_target);
    }

    #[test]
    fn test_per_theme_cap_and_target_stop() {
        let lists = vec![
            list("T1", &["A", "B", "C", "D"]),
            list("T2", &["E", "F", "G"]),
            list("T3", &["H"]),
        ];
        let outcome = curate_memberships(&lists, &config(&[], 2, 3));

        // T1에서 2개, T2에서 2개 → 4 > 3 이므로 중단
        assert_eq!(outcome.unique_stocks, 4);
        assert_eq!(outcome.themes_used, 2);
        assert!(outcome.reached_target);
        assert!(outcome.memberships.iter().all(|m| m.theme_name != "T3"));
    }

    #[test]
    fn test_rename_applies_before_priority() {
        let lists = vec![list("큰테마", &["A", "B"]), list("HBM", &["C"])];
        let mut config = config(&["AI반도체"], 33, 200);
        config.rename = ThemeRenames::default().with("HBM", "AI반도체");

        let outcome = curate_memberships(&lists, &config);
        assert_eq!(outcome.memberships[0], MembershipRecord::new("AI반도체", "C"));
    }

    #[test]
    fn test_fully_overlapping_theme_is_not_used() {
        let lists = vec![list("T1", &["A", "B"]), list("T2", &["A"])];
        let outcome = curate_memberships(&lists, &config(&[], 33, 200));
        assert_eq!(outcome.themes_used, 1);
    }

    #[test]
    fn test_find_duplicates() {
        let memberships = vec![
            MembershipRecord::new("스마트폰", "삼성전자"),
            MembershipRecord::new("2차전지", "LG화학"),
            MembershipRecord::new("반도체", "삼성전자"),
            MembershipRecord::new("반도체", "SK하이닉스"),
            MembershipRecord::new("반도체", "삼성전자"),
        ];

        let duplicates = find_duplicates(&memberships);
        assert_eq!(
            duplicates,
            vec![DuplicateEntry {
                stock: "삼성전자".to_string(),
                themes: vec!["반도체".to_string(), "스마트폰".to_string()],
            }]
        );
    }

    #[test]
    fn test_resolve_duplicates() {
        let memberships = vec![
            MembershipRecord::new("반도체", "삼성전자"),
            MembershipRecord::new("반도체", "SK하이닉스"),
            MembershipRecord::new("스마트폰", "삼성전자"),
            MembershipRecord::new("2차전지", "LG화학"),
            MembershipRecord::new("화학", "LG화학"),
        ];
        let overrides = vec![
            DuplicateOverride {
                stock: "삼성전자".to_string(),
                candidates: vec!["메모리".to_string(), "반도체".to_string()],
            },
            DuplicateOverride {
                stock: "SK하이닉스".to_string(),
                candidates: vec!["없는테마".to_string()],
            },
        ];

        let outcome = resolve_duplicates(&memberships, &overrides);

        assert_eq!(outcome.resolved, 1);
        assert_eq!(
            outcome.invalid_themes,
            vec![
                InvalidThemeReport {
                    stock: "삼성전자".to_string(),
                    theme: "메모리".to_string(),
                    position: 1,
                },
                InvalidThemeReport {
                    stock: "SK하이닉스".to_string(),
                    theme: "없는테마".to_string(),
                    position: 1,
                },
            ]
        );

        let samsung: Vec<&str> = outcome
            .memberships
            .iter()
            .filter(|m| m.stock_name == "삼성전자")
            .map(|m| m.theme_name.as_str())
            .collect();
        assert_eq!(samsung, vec!["반도체"]);

        // SK하이닉스는 원래 테마에 그대로 남음
        assert!(outcome
            .memberships
            .contains(&MembershipRecord::new("반도체", "SK하이닉스")));

        assert_eq!(outcome.unresolved.len(), 1);
        assert_eq!(outcome.unresolved[0].stock, "LG화학");
    }

    #[test]
    fn test_nfd_names_match_composed_names() {
        use unicode_normalization::UnicodeNormalization;
        let nfd = |s: &str| -> String { s.nfd().collect() };

        let memberships = vec![
            MembershipRecord::new("반도체", "삼성전자"),
            MembershipRecord::new(nfd("스마트폰"), nfd("삼성전자")),
        ];
        let duplicates = find_duplicates(&memberships);
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].stock, "삼성전자");
        assert_eq!(duplicates[0].themes, vec!["반도체", "스마트폰"]);

        let overrides = vec![DuplicateOverride {
            stock: nfd("삼성전자"),
            candidates: vec![nfd("스마트폰")],
        }];
        let outcome = resolve_duplicates(&memberships, &overrides);
        assert_eq!(outcome.resolved, 1);
        assert!(outcome.invalid_themes.is_empty());
        assert_eq!(
            outcome.memberships,
            vec![MembershipRecord::new("스마트폰", "삼성전자")]
        );
    }
}
