//! 불변 값 객체.
//!
//! 시가총액은 원 단위로 저장하고, 조/억 단위는 표시와 누적 편의를 위한
//! 정확한 자릿수 이동으로만 다룹니다.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use crate::error::{HeatmapError, HeatmapResult};

/// 1조 원.
pub const WON_PER_TRILLION: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// 1억 원.
pub const WON_PER_HUNDRED_MILLION: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// 등락률 절대값 상한 (%).
pub const MAX_CHANGE_RATIO: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// 시가총액 (원 단위, 0 이상).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct MarketCap(Decimal);

impl MarketCap {
    /// 원 단위 값으로 생성합니다. 음수는 거부됩니다.
    pub fn new(won: Decimal) -> HeatmapResult<Self> {
        if won < Decimal::ZERO {
            return Err(HeatmapError::InvalidValue(format!(
                "시가총액은 음수일 수 없습니다: {}",
                won
            )));
        }
        Ok(Self(won))
    }

    /// 조 단위 값으로 생성합니다. 원 단위로 표현할 수 없는 값은 거부됩니다.
    pub fn from_trillion(trillion: Decimal) -> HeatmapResult<Self> {
        Self::new(scaled(trillion, WON_PER_TRILLION)?)
    }

    /// 억 단위 값으로 생성합니다.
    pub fn from_hundred_million(value: Decimal) -> HeatmapResult<Self> {
        Self::new(scaled(value, WON_PER_HUNDRED_MILLION)?)
    }

    /// 0원.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// 원 단위 값.
    pub fn value_in_won(&self) -> Decimal {
        self.0
    }

    /// 조 단위 값.
    pub fn in_trillion(&self) -> Decimal {
        self.0 / WON_PER_TRILLION
    }

    /// 억 단위 값.
    pub fn in_hundred_million(&self) -> Decimal {
        self.0 / WON_PER_HUNDRED_MILLION
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// 스칼라 배. 결과가 음수가 되는 배수는 거부됩니다.
    pub fn times(self, factor: Decimal) -> HeatmapResult<Self> {
        Self::new(scaled(self.0, factor)?)
    }

    /// 덧셈. 표현 범위를 넘으면 `None`.
    pub fn checked_add(self, other: MarketCap) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }
}

fn scaled(value: Decimal, factor: Decimal) -> HeatmapResult<Decimal> {
    value.checked_mul(factor).ok_or_else(|| {
        HeatmapError::InvalidValue(format!("시가총액 범위 초과: {} × {}", value, factor))
    })
}

/// 포화 덧셈. 합계가 `Decimal::MAX`를 넘으면 `Decimal::MAX`에 머뭅니다.
impl Add for MarketCap {
    type Output = MarketCap;

    fn add(self, other: MarketCap) -> MarketCap {
        Self(self.0.saturating_add(other.0))
    }
}

impl Sum for MarketCap {
    fn sum<I: Iterator<Item = MarketCap>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, cap| acc + cap)
    }
}

impl<'a> Sum<&'a MarketCap> for MarketCap {
    fn sum<I: Iterator<Item = &'a MarketCap>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl TryFrom<Decimal> for MarketCap {
    type Error = HeatmapError;

    fn try_from(won: Decimal) -> Result<Self, Self::Error> {
        Self::new(won)
    }
}

impl From<MarketCap> for Decimal {
    fn from(cap: MarketCap) -> Self {
        cap.0
    }
}

impl Default for MarketCap {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for MarketCap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}조", self.in_trillion())
    }
}

/// 등락률 (퍼센트, 예: 2.5는 2.5%).
///
/// 절대값 100 초과는 정상적인 급등락이 아닌 손상된 입력으로 간주합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct ChangeRatio(Decimal);

impl ChangeRatio {
    pub fn new(value: Decimal) -> HeatmapResult<Self> {
        if value.abs() > MAX_CHANGE_RATIO {
            return Err(HeatmapError::InvalidValue(format!(
                "등락률이 비정상적입니다: {}%",
                value
            )));
        }
        Ok(Self(value))
    }

    /// 보합 (0%).
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    /// 시가총액으로 가중된 등락률 (등락률 × 조 단위 시가총액).
    ///
    /// 가중 평균의 분자 기여분입니다.
    pub fn weighted_by(&self, market_cap: MarketCap) -> Decimal {
        self.0 * market_cap.in_trillion()
    }

    /// 상승 여부.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// 하락 여부.
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// 보합 여부.
    pub fn is_neutral(&self) -> bool {
        self.0.is_zero()
    }
}

impl TryFrom<Decimal> for ChangeRatio {
    type Error = HeatmapError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChangeRatio> for Decimal {
    fn from(ratio: ChangeRatio) -> Self {
        ratio.0
    }
}

impl Default for ChangeRatio {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for ChangeRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.2}%", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unit_constants() {
        assert_eq!(WON_PER_TRILLION, dec!(1_000_000_000_000));
        assert_eq!(WON_PER_HUNDRED_MILLION, dec!(100_000_000));
        assert_eq!(MAX_CHANGE_RATIO, dec!(100));
    }

    #[test]
    fn test_market_cap_rejects_negative() {
        let err = MarketCap::new(dec!(-1)).unwrap_err();
        assert!(matches!(err, HeatmapError::InvalidValue(_)));
        assert!(MarketCap::new(dec!(0)).is_ok());
    }

    #[test]
    fn test_market_cap_units() {
        let cap = MarketCap::new(dec!(1_500_000_000_000)).unwrap();
        assert_eq!(cap.in_trillion(), dec!(1.5));
        assert_eq!(cap.in_hundred_million(), dec!(15000));
        assert_eq!(cap.to_string(), "1.50조");

        let from_eok = MarketCap::from_hundred_million(dec!(15000)).unwrap();
        assert_eq!(from_eok, cap);
    }

    #[test]
    fn test_market_cap_from_trillion_round_trip() {
        let cap = MarketCap::from_trillion(dec!(400)).unwrap();
        assert_eq!(cap.value_in_won(), dec!(400_000_000_000_000));
        assert_eq!(cap.in_trillion(), dec!(400));
        assert!(MarketCap::from_trillion(dec!(-0.1)).is_err());
    }

    #[test]
    fn test_market_cap_arithmetic_and_ordering() {
        let a = MarketCap::from_trillion(dec!(100)).unwrap();
        let b = MarketCap::from_trillion(dec!(50)).unwrap();

        assert_eq!((a + b).in_trillion(), dec!(150));
        assert_eq!(a.times(dec!(2)).unwrap().in_trillion(), dec!(200));
        assert!(a.times(dec!(-1)).is_err());
        assert!(a > b);
        assert!(b < a);

        let total: MarketCap = [a, b].iter().sum();
        assert_eq!(total.in_trillion(), dec!(150));
    }

    #[test]
    fn test_market_cap_overflow_is_invalid_value() {
        let err = MarketCap::from_trillion(dec!(100_000_000_000_000_000)).unwrap_err();
        assert!(matches!(err, HeatmapError::InvalidValue(_)));

        let huge = MarketCap::new(Decimal::MAX).unwrap();
        assert!(matches!(
            MarketCap::from_hundred_million(Decimal::MAX),
            Err(HeatmapError::InvalidValue(_))
        ));
        assert!(matches!(huge.times(dec!(2)), Err(HeatmapError::InvalidValue(_))));
    }

    #[test]
    fn test_market_cap_addition_saturates() {
        let huge = MarketCap::new(Decimal::MAX).unwrap();
        let one = MarketCap::new(dec!(1)).unwrap();

        assert_eq!(huge.checked_add(one), None);
        assert_eq!((huge + one).value_in_won(), Decimal::MAX);
        let total: MarketCap = [huge, one, one].iter().sum();
        assert_eq!(total, huge);
    }

    #[test]
    fn test_change_ratio_bounds() {
        assert!(ChangeRatio::new(dec!(100)).is_ok());
        assert!(ChangeRatio::new(dec!(-100)).is_ok());
        assert!(matches!(
            ChangeRatio::new(dec!(150)),
            Err(HeatmapError::InvalidValue(_))
        ));
        assert!(ChangeRatio::new(dec!(-100.01)).is_err());
    }

    #[test]
    fn test_change_ratio_sign() {
        let up = ChangeRatio::new(dec!(0.01)).unwrap();
        let down = ChangeRatio::new(dec!(-0.01)).unwrap();
        let flat = ChangeRatio::zero();

        assert!(up.is_positive() && !up.is_negative() && !up.is_neutral());
        assert!(down.is_negative() && !down.is_positive());
        assert!(flat.is_neutral() && !flat.is_positive() && !flat.is_negative());
    }

    #[test]
    fn test_weighted_by() {
        let ratio = ChangeRatio::new(dec!(2.0)).unwrap();
        let cap = MarketCap::from_trillion(dec!(400)).unwrap();
        assert_eq!(ratio.weighted_by(cap), dec!(800));
    }

    #[test]
    fn test_serde_validates_on_deserialize() {
        let cap: MarketCap = serde_json::from_str("\"1000\"").unwrap();
        assert_eq!(cap.value_in_won(), dec!(1000));
        assert!(serde_json::from_str::<MarketCap>("\"-5\"").is_err());
        assert!(serde_json::from_str::<ChangeRatio>("\"101\"").is_err());
    }
}
