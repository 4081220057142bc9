//! 업종명 → 테마 매핑.
//!
//! 테마 구성 파일 없이 상장 종목의 업종명만으로 히트맵을 만들 때 사용합니다.
//! 규칙은 순서대로 검사하며 처음 일치한 규칙의 테마가 선택됩니다.

use serde::{Deserialize, Serialize};

/// 어느 규칙에도 일치하지 않는 업종의 테마.
pub const FALLBACK_SECTOR_THEME: &str = "기타";

/// 업종 키워드 규칙.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorRule {
    /// 테마 라벨
    pub theme: String,
    /// 업종명에 포함되면 일치로 보는 키워드
    pub keywords: Vec<String>,
}

impl SectorRule {
    pub fn new(theme: impl Into<String>, keywords: &[&str]) -> Self {
        Self {
            theme: theme.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn matches(&self, sector: &str) -> bool {
        self.keywords.iter().any(|k| sector.contains(k.as_str()))
    }
}

/// 업종명 → 테마 매퍼.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectorThemeMapper {
    rules: Vec<SectorRule>,
}

impl Default for SectorThemeMapper {
    fn default() -> Self {
        Self::new(vec![
            SectorRule::new(
                "IT/반도체",
                &["반도체", "전기전자", "IT부품", "통신장비", "휴대폰", "전자", "통신", "가정용 기기", "디스플레이"],
            ),
            SectorRule::new(
                "플랫폼/소프트웨어",
                &["소프트웨어", "인터넷", "게임", "IT서비스", "컴퓨터", "포털"],
            ),
            SectorRule::new("금융", &["은행", "증권", "보험", "금융", "투자"]),
            SectorRule::new("바이오/헬스케어", &["의료", "바이오", "생명", "제약", "의약품"]),
            SectorRule::new("방산/항공우주", &["항공", "방산", "우주", "무기", "미사일"]),
            SectorRule::new(
                "중공업/기계/건설",
                &["기계", "조선", "건설", "전기장비", "중공업"],
            ),
            SectorRule::new("화학/소재", &["화학", "철강", "금속", "제지", "비철", "소재"]),
            SectorRule::new("음식료/화장품", &["식음료", "음식료", "생활", "화장품", "담배"]),
            SectorRule::new("자동차/가전", &["자동차", "부품", "가전", "섬유", "의복"]),
            SectorRule::new("에너지", &["에너지", "석유"]),
            SectorRule::new("유틸리티", &["전력", "가스", "유틸리티"]),
            SectorRule::new("운송/물류", &["운송", "해운", "물류", "창고"]),
            SectorRule::new(
                "레저/엔터",
                &["호텔", "레저", "미디어", "엔터", "방송", "교육", "여행", "콘텐츠"],
            ),
            SectorRule::new("유통", &["유통", "백화점", "소매", "판매", "상업"]),
            SectorRule::new("상사/지주사", &["무역", "상사", "서비스", "지주", "기타금융"]),
        ])
    }
}

impl SectorThemeMapper {
    pub fn new(rules: Vec<SectorRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[SectorRule] {
        &self.rules
    }

    /// 업종명을 테마 라벨로 변환합니다. 업종이 없거나 일치하는 규칙이 없으면 "기타".
    pub fn map(&self, sector: Option<&str>) -> &str {
        let Some(sector) = sector.map(str::trim).filter(|s| !s.is_empty()) else {
            return FALLBACK_SECTOR_THEME;
        };

        self.rules
            .iter()
            .find(|rule| rule.matches(sector))
            .map(|rule| rule.theme.as_str())
            .unwrap_or(FALLBACK_SECTOR_THEME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules() {
        let mapper = SectorThemeMapper::default();
        assert_eq!(mapper.map(Some("반도체와반도체장비")), "IT/반도체");
        assert_eq!(mapper.map(Some("양방향미디어와서비스")), "레저/엔터");
        assert_eq!(mapper.map(Some("은행")), "금융");
        assert_eq!(mapper.map(Some("제약")), "바이오/헬스케어");
        assert_eq!(mapper.map(Some("조선")), "중공업/기계/건설");
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let mapper = SectorThemeMapper::default();
        // "전자"(IT/반도체)가 "부품"(자동차/가전)보다 먼저 검사됨
        assert_eq!(mapper.map(Some("전자부품")), "IT/반도체");
        // "금융"이 "기타금융"(상사/지주사)보다 먼저 검사됨
        assert_eq!(mapper.map(Some("기타금융")), "금융");
    }

    #[test]
    fn test_fallback() {
        let mapper = SectorThemeMapper::default();
        assert_eq!(mapper.map(None), FALLBACK_SECTOR_THEME);
        assert_eq!(mapper.map(Some("  ")), FALLBACK_SECTOR_THEME);
        assert_eq!(mapper.map(Some("광업")), FALLBACK_SECTOR_THEME);
    }

    #[test]
    fn test_custom_rules() {
        let mapper = SectorThemeMapper::new(vec![SectorRule::new("원전", &["원자력"])]);
        assert_eq!(mapper.map(Some("원자력발전")), "원전");
        assert_eq!(mapper.map(Some("반도체")), FALLBACK_SECTOR_THEME);
    }
}
