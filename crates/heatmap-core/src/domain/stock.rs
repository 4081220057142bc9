//! 종목 엔티티.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::value_objects::{ChangeRatio, MarketCap};
use crate::error::{HeatmapError, HeatmapResult};

/// 종목 엔티티.
///
/// 종목 코드로 식별됩니다. 소속 테마는 탐색용 이름 참조일 뿐 소유 관계가
/// 아니며, 소유 테마의 추가/제거 연산만 이 값을 바꿉니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    code: String,
    name: String,
    market_cap: MarketCap,
    change_ratio: ChangeRatio,
    #[serde(skip)]
    theme: Option<String>,
}

impl Stock {
    /// 새 종목을 생성합니다. 코드와 종목명은 공백을 제거한 뒤 비어 있으면 안 됩니다.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        market_cap: MarketCap,
        change_ratio: ChangeRatio,
    ) -> HeatmapResult<Self> {
        let code = code.into().trim().to_string();
        let name = name.into().trim().to_string();

        if code.is_empty() {
            return Err(HeatmapError::InvalidEntity("종목 코드는 필수입니다".to_string()));
        }
        if name.is_empty() {
            return Err(HeatmapError::InvalidEntity(format!(
                "종목명은 필수입니다 (코드: {})",
                code
            )));
        }

        Ok(Self {
            code,
            name,
            market_cap,
            change_ratio,
            theme: None,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn market_cap(&self) -> MarketCap {
        self.market_cap
    }

    pub fn change_ratio(&self) -> ChangeRatio {
        self.change_ratio
    }

    /// 소속 테마명.
    pub fn theme_name(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    /// 시가총액으로 가중된 등락률.
    pub fn weighted_change(&self) -> Decimal {
        self.change_ratio.weighted_by(self.market_cap)
    }

    pub(crate) fn attach_to(&mut self, theme: &str) {
        self.theme = Some(theme.to_string());
    }

    pub(crate) fn detach(&mut self) {
        self.theme = None;
    }
}

impl PartialEq for Stock {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Stock {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn cap(trillion: Decimal) -> MarketCap {
        MarketCap::from_trillion(trillion).unwrap()
    }

    #[test]
    fn test_stock_requires_code_and_name() {
        let ratio = ChangeRatio::zero();
        assert!(matches!(
            Stock::new("", "삼성전자", cap(dec!(1)), ratio),
            Err(HeatmapError::InvalidEntity(_))
        ));
        assert!(matches!(
            Stock::new("005930", "  ", cap(dec!(1)), ratio),
            Err(HeatmapError::InvalidEntity(_))
        ));
    }

    #[test]
    fn test_stock_trims_identity_fields() {
        let stock = Stock::new(" 005930 ", " 삼성전자", cap(dec!(400)), ChangeRatio::zero()).unwrap();
        assert_eq!(stock.code(), "005930");
        assert_eq!(stock.name(), "삼성전자");
        assert_eq!(stock.theme_name(), None);
    }

    #[test]
    fn test_weighted_change() {
        let stock = Stock::new(
            "000660",
            "SK하이닉스",
            cap(dec!(100)),
            ChangeRatio::new(dec!(3.0)).unwrap(),
        )
        .unwrap();
        assert_eq!(stock.weighted_change(), dec!(300));
    }

    #[test]
    fn test_equality_by_code() {
        let a = Stock::new("005930", "삼성전자", cap(dec!(400)), ChangeRatio::zero()).unwrap();
        let b = Stock::new(
            "005930",
            "삼성전자우",
            cap(dec!(1)),
            ChangeRatio::new(dec!(1)).unwrap(),
        )
        .unwrap();
        let c = Stock::new("000660", "삼성전자", cap(dec!(400)), ChangeRatio::zero()).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
