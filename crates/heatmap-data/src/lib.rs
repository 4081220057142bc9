//! 히트맵 입력 데이터 수집.
//!
//! 이 crate는 다음을 제공합니다:
//! - KRX Open API 시세 소스
//! - CSV 시세/테마 구성 소스
//! - 저장된 테마 HTML 페이지 파서
//! - 테마 구성 큐레이션 (그리디 선택, 중복 종목 보고/해소)
//! - 이름 NFC 정규화

pub mod curation;
pub mod error;
pub mod normalize;
pub mod provider;
pub mod source;

pub use curation::{
    curate_memberships, find_duplicates, resolve_duplicates, CurationOutcome, DuplicateEntry,
    DuplicateOverride, InvalidThemeReport, ResolveOutcome, ThemeStockList,
};
pub use error::{DataError, Result};
pub use normalize::normalize_name;
pub use provider::{
    CsvListingSource, CsvMembershipSource, KrxApiClient, KrxDailyTrade, KrxListingSource,
    ThemePageScraper,
};
pub use source::{ListingSource, MembershipSource};
