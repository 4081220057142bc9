//! 설정 관리.
//!
//! 테마→그룹 계층, 테마명 변경, 우선순위 테마, 차트 스타일을 하나의 불변
//! 설정 객체로 묶습니다. 통계 서비스와 트리 빌더는 생성 시점에 이 설정을
//! 받으며 전역 상태를 참조하지 않습니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{HeatmapError, HeatmapResult};
use crate::logging::{LogConfig, LogFormat};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// 테마 → 그룹 계층
    pub hierarchy: ThemeHierarchy,
    /// 테마명 변경 규칙
    pub rename: ThemeRenames,
    /// 우선순위 테마 (큐레이션 시 먼저 선택)
    pub priority_themes: Vec<String>,
    /// 차트 설정
    pub chart: ChartConfig,
    /// 테마 구성 큐레이션 설정
    pub curation: CurationConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 테마 → 그룹 매핑 한 줄.
///
/// TOML 키는 대소문자 정규화 대상이므로 테마명을 키가 아닌 값으로 둡니다.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HierarchyEntry {
    pub theme: String,
    pub group: String,
}

/// 테마 → 그룹 계층 매핑.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "Vec<HierarchyEntry>", into = "Vec<HierarchyEntry>")]
pub struct ThemeHierarchy(BTreeMap<String, String>);

impl ThemeHierarchy {
    /// 빈 계층을 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 매핑을 추가한 계층을 반환합니다.
    pub fn with(mut self, theme: impl Into<String>, group: impl Into<String>) -> Self {
        self.0.insert(theme.into(), group.into());
        self
    }

    /// 테마가 속한 그룹명.
    pub fn group_of(&self, theme: &str) -> Option<&str> {
        self.0.get(theme).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<HierarchyEntry>> for ThemeHierarchy {
    fn from(entries: Vec<HierarchyEntry>) -> Self {
        Self(
            entries
                .into_iter()
                .map(|e| (e.theme.trim().to_string(), e.group.trim().to_string()))
                .collect(),
        )
    }
}

impl From<ThemeHierarchy> for Vec<HierarchyEntry> {
    fn from(hierarchy: ThemeHierarchy) -> Self {
        hierarchy
            .0
            .into_iter()
            .map(|(theme, group)| HierarchyEntry { theme, group })
            .collect()
    }
}

impl<T: Into<String>, G: Into<String>> FromIterator<(T, G)> for ThemeHierarchy {
    fn from_iter<I: IntoIterator<Item = (T, G)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(t, g)| (t.into(), g.into()))
                .collect(),
        )
    }
}

/// 테마명 변경 규칙 한 줄.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RenameEntry {
    pub from: String,
    pub to: String,
}

/// 원본 테마명 → 표시 테마명.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "Vec<RenameEntry>", into = "Vec<RenameEntry>")]
pub struct ThemeRenames(BTreeMap<String, String>);

impl ThemeRenames {
    pub fn with(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.0.insert(from.into(), to.into());
        self
    }

    /// 변경 규칙이 있으면 새 이름을, 없으면 원래 이름을 반환합니다.
    pub fn apply<'a>(&'a self, theme: &'a str) -> &'a str {
        self.0.get(theme).map(String::as_str).unwrap_or(theme)
    }
}

impl From<Vec<RenameEntry>> for ThemeRenames {
    fn from(entries: Vec<RenameEntry>) -> Self {
        Self(
            entries
                .into_iter()
                .map(|e| (e.from.trim().to_string(), e.to.trim().to_string()))
                .collect(),
        )
    }
}

impl From<ThemeRenames> for Vec<RenameEntry> {
    fn from(renames: ThemeRenames) -> Self {
        renames
            .0
            .into_iter()
            .map(|(from, to)| RenameEntry { from, to })
            .collect()
    }
}

/// 차트 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChartConfig {
    /// 루트 노드 ID
    pub root_id: String,
    /// 루트 노드 라벨
    pub root_label: String,
    /// 차트 제목
    pub title: String,
    /// 등락률 색상 스케일
    pub color_scale: ColorScale,
    /// 한 화면에 펼칠 최대 깊이
    pub max_depth: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            root_id: "KRX_Themes".to_string(),
            root_label: "대한민국 테마별 증시".to_string(),
            title: "대한민국 테마별 증시 히트맵".to_string(),
            color_scale: ColorScale::default(),
            max_depth: 2,
        }
    }
}

/// 중립점을 기준으로 대칭인 3점 발산형 색상 스케일.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColorScale {
    /// 하한 (%)
    pub min: Decimal,
    /// 중립점 (%)
    pub mid: Decimal,
    /// 상한 (%)
    pub max: Decimal,
    /// 하락 색상
    pub low_color: String,
    /// 보합 색상
    pub mid_color: String,
    /// 상승 색상
    pub high_color: String,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            min: Decimal::from(-5),
            mid: Decimal::ZERO,
            max: Decimal::from(5),
            low_color: "blue".to_string(),
            mid_color: "#444444".to_string(),
            high_color: "red".to_string(),
        }
    }
}

impl ColorScale {
    /// 범위가 중립점 기준 대칭인지 검증합니다.
    pub fn validate(&self) -> HeatmapResult<()> {
        if self.min >= self.mid || self.mid >= self.max {
            return Err(HeatmapError::Config(format!(
                "색상 스케일은 min < mid < max 이어야 합니다: {} / {} / {}",
                self.min, self.mid, self.max
            )));
        }
        if self.mid - self.min != self.max - self.mid {
            return Err(HeatmapError::Config(format!(
                "색상 스케일이 중립점 기준 대칭이 아닙니다: {} / {} / {}",
                self.min, self.mid, self.max
            )));
        }
        Ok(())
    }

    /// 정규화된 위치(0, 0.5, 1)와 색상.
    pub fn stops(&self) -> [(f64, &str); 3] {
        [
            (0.0, self.low_color.as_str()),
            (0.5, self.mid_color.as_str()),
            (1.0, self.high_color.as_str()),
        ]
    }
}

/// 테마 구성 큐레이션 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CurationConfig {
    /// 테마당 최대 종목 수
    pub max_stocks_per_theme: usize,
    /// 이 수를 넘으면 선택을 멈추는 고유 종목 수
    pub target_stock_count: usize,
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            max_stocks_per_theme: 33,
            target_stock_count: 200,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// span 진입/종료 기록
    pub span_events: bool,
    /// 파일명과 줄 번호 기록
    pub file_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            span_events: false,
            file_location: false,
        }
    }
}

impl LoggingConfig {
    /// 로깅 초기화용 설정으로 변환합니다. 알 수 없는 형식은 pretty로 처리합니다.
    pub fn to_log_config(&self) -> LogConfig {
        let format = self.format.parse().unwrap_or(LogFormat::Pretty);
        let mut config = LogConfig::new(self.level.clone())
            .with_format(format)
            .with_span_events(self.span_events);
        config.with_file = self.file_location;
        config
    }
}

impl HeatmapConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> HeatmapResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("HEATMAP")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값을 사용합니다.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> HeatmapResult<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            tracing::warn!(
                path = %path.as_ref().display(),
                "설정 파일이 없어 기본값을 사용합니다"
            );
            Ok(Self::default())
        }
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> HeatmapResult<Self> {
        Self::load_or_default("config/heatmap.toml")
    }

    /// 설정 값의 일관성을 검증합니다.
    pub fn validate(&self) -> HeatmapResult<()> {
        self.chart.color_scale.validate()?;
        if self.chart.root_id.trim().is_empty() {
            return Err(HeatmapError::Config("root_id는 비어 있을 수 없습니다".to_string()));
        }
        if self.curation.max_stocks_per_theme == 0 {
            return Err(HeatmapError::Config(
                "max_stocks_per_theme는 1 이상이어야 합니다".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = HeatmapConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chart.root_id, "KRX_Themes");
        assert_eq!(config.curation.max_stocks_per_theme, 33);
    }

    #[test]
    fn test_color_scale_must_be_symmetric() {
        let scale = ColorScale {
            min: dec!(-5),
            mid: dec!(0),
            max: dec!(3),
            ..Default::default()
        };
        assert!(scale.validate().is_err());

        let inverted = ColorScale {
            min: dec!(5),
            mid: dec!(0),
            max: dec!(-5),
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_hierarchy_lookup() {
        let hierarchy = ThemeHierarchy::new()
            .with("2차전지(소재)", "2차전지")
            .with("2차전지(장비)", "2차전지");

        assert_eq!(hierarchy.group_of("2차전지(소재)"), Some("2차전지"));
        assert_eq!(hierarchy.group_of("반도체"), None);
        assert_eq!(hierarchy.len(), 2);
    }

    #[test]
    fn test_rename_apply() {
        let renames = ThemeRenames::default().with("2차전지_소재", "2차전지(소재)");
        assert_eq!(renames.apply("2차전지_소재"), "2차전지(소재)");
        assert_eq!(renames.apply("반도체"), "반도체");
    }

    #[test]
    fn test_load_from_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
priority_themes = ["AI반도체"]

[[hierarchy]]
theme = "AI반도체"
group = "반도체"

[[rename]]
from = "HBM"
to = "AI반도체"

[chart]
title = "테스트 히트맵"

[chart.color_scale]
min = -3
mid = 0
max = 3
"#
        )
        .unwrap();

        let config = HeatmapConfig::load(file.path()).unwrap();
        assert_eq!(config.hierarchy.group_of("AI반도체"), Some("반도체"));
        assert_eq!(config.rename.apply("HBM"), "AI반도체");
        assert_eq!(config.priority_themes, vec!["AI반도체".to_string()]);
        assert_eq!(config.chart.title, "테스트 히트맵");
        assert_eq!(config.chart.root_id, "KRX_Themes");
        assert_eq!(config.chart.color_scale.max, dec!(3));
        assert_eq!(config.chart.color_scale.low_color, "blue");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = HeatmapConfig::load_or_default("does/not/exist.toml").unwrap();
        assert!(config.hierarchy.is_empty());
    }

    #[test]
    fn test_logging_config_conversion() {
        let logging = LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
            span_events: true,
            ..LoggingConfig::default()
        };
        let log_config = logging.to_log_config();
        assert_eq!(log_config.level, "debug");
        assert_eq!(log_config.format, LogFormat::Json);
        assert!(log_config.with_span_events);
        assert!(!log_config.with_file);
    }
}
