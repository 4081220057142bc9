//! 외부 데이터 소스 trait.

use async_trait::async_trait;
use heatmap_core::{MembershipRecord, StockRecord};

use crate::error::Result;

/// 종목 시세 소스.
///
/// 데이터가 없으면 빈 목록을 반환할 수 있으며, 빈 입력의 처리는 호출자가
/// 결정합니다.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// 소스 이름
    fn name(&self) -> &str;

    /// 전 종목 시세 조회
    async fn fetch(&self) -> Result<Vec<StockRecord>>;
}

/// 테마 구성 소스.
#[async_trait]
pub trait MembershipSource: Send + Sync {
    /// 소스 이름
    fn name(&self) -> &str;

    /// (테마명, 종목명) 목록 조회
    async fn fetch(&self) -> Result<Vec<MembershipRecord>>;
}
