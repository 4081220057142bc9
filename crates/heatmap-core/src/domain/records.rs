//! 외부 데이터 경계의 입력 레코드.
//!
//! 시세 소스와 테마 구성 소스는 모두 이 고정된 레코드 형태로 파싱된 뒤
//! 핵심 로직에 전달됩니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 종목 시세 레코드 (종목당 한 줄).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    /// 종목 코드
    pub code: String,
    /// 종목명
    pub name: String,
    /// 시가총액 (원)
    pub market_cap: Option<Decimal>,
    /// 등락률 (%)
    pub change_ratio: Option<Decimal>,
    /// 업종명
    #[serde(default)]
    pub sector: Option<String>,
    /// 시장 구분 (KOSPI, KOSDAQ)
    #[serde(default)]
    pub market: Option<String>,
}

impl StockRecord {
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        market_cap: Option<Decimal>,
        change_ratio: Option<Decimal>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            market_cap,
            change_ratio,
            sector: None,
            market: None,
        }
    }

    /// 업종명 지정.
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// 시장 구분 지정.
    pub fn with_market(mut self, market: impl Into<String>) -> Self {
        self.market = Some(market.into());
        self
    }
}

/// 테마 구성 레코드 (테마명, 종목명).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub theme_name: String,
    pub stock_name: String,
}

impl MembershipRecord {
    pub fn new(theme_name: impl Into<String>, stock_name: impl Into<String>) -> Self {
        Self {
            theme_name: theme_name.into(),
            stock_name: stock_name.into(),
        }
    }
}
