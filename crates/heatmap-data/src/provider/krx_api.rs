//! KRX Open API 시세 소스.
//!
//! 유가증권(`stk_bydd_trd`)과 코스닥(`ksq_bydd_trd`) 전종목 일별 매매정보를
//! 기준일 하나에 대해 받아 시세 레코드로 바꿉니다. 인증키는 `AUTH_KEY`
//! 헤더로 보내며 환경 변수 `KRX_API_KEY`에서 읽을 수 있습니다.
//!
//! ```rust,ignore
//! let client = KrxApiClient::from_env()?;
//! let records = KrxListingSource::new(client, "20240105")?.fetch().await?;
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use heatmap_core::StockRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::parse_decimal_opt;
use crate::error::{DataError, Result};
use crate::normalize::normalize_name;
use crate::source::ListingSource;

pub const KRX_BASE_URL: &str = "https://data-dbg.krx.co.kr";

/// 유가증권시장 일별 매매정보
pub const KOSPI_DAILY_TRADE_API: &str = "stk_bydd_trd";

/// 코스닥시장 일별 매매정보
pub const KOSDAQ_DAILY_TRADE_API: &str = "ksq_bydd_trd";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// KRX Open API 클라이언트.
#[derive(Clone)]
pub struct KrxApiClient {
    http: reqwest::Client,
    auth_key: String,
    base_url: String,
}

/// 한 종목의 일별 매매정보.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KrxDailyTrade {
    pub date: Option<NaiveDate>,
    pub code: String,
    pub name: String,
    /// 응답에 시장명이 없으면 조회한 API의 시장 (KOSPI/KOSDAQ)
    pub market: String,
    pub sector: Option<String>,
    pub close: Option<Decimal>,
    /// 등락률 (%)
    pub change_ratio: Option<Decimal>,
    /// 시가총액 (원)
    pub market_cap: Option<Decimal>,
}

impl KrxDailyTrade {
    pub fn into_record(self) -> StockRecord {
        let mut record = StockRecord::new(self.code, self.name, self.market_cap, self.change_ratio)
            .with_market(self.market);
        record.sector = self.sector;
        record
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    #[serde(rename = "OutBlock_1")]
    rows: Option<Vec<T>>,
}

/// 응답 행. 숫자는 쉼표가 섞인 문자열로 옵니다.
#[derive(Deserialize)]
struct DailyTradeRow {
    #[serde(rename = "BAS_DD", default)]
    bas_dd: Option<String>,
    #[serde(rename = "ISU_CD")]
    isu_cd: String,
    #[serde(rename = "ISU_NM")]
    isu_nm: String,
    #[serde(rename = "MKT_NM", default)]
    mkt_nm: Option<String>,
    #[serde(rename = "SECT_TP_NM", default)]
    sect_tp_nm: Option<String>,
    #[serde(rename = "TDD_CLSPRC", default)]
    tdd_clsprc: Option<String>,
    #[serde(rename = "FLUC_RT", default)]
    fluc_rt: Option<String>,
    #[serde(rename = "MKTCAP", default)]
    mktcap: Option<String>,
}

impl DailyTradeRow {
    fn into_trade(self, market: &str) -> KrxDailyTrade {
        KrxDailyTrade {
            date: self.bas_dd.as_deref().and_then(parse_base_date),
            code: self.isu_cd.trim().to_string(),
            name: normalize_name(&self.isu_nm),
            market: non_blank(self.mkt_nm).unwrap_or_else(|| market.to_string()),
            sector: non_blank(self.sect_tp_nm),
            close: parse_decimal_opt(self.tdd_clsprc.as_deref()),
            change_ratio: parse_decimal_opt(self.fluc_rt.as_deref()),
            market_cap: parse_decimal_opt(self.mktcap.as_deref()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl KrxApiClient {
    pub fn new(auth_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            http,
            auth_key: auth_key.into(),
            base_url: KRX_BASE_URL.to_string(),
        })
    }

    /// `KRX_API_KEY` 환경 변수의 인증키로 생성합니다.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var("KRX_API_KEY")
            .map_err(|_| DataError::ConfigError("KRX_API_KEY 환경변수가 없습니다".to_string()))?;
        Self::new(key)
    }

    /// 다른 서버를 가리키게 합니다 (mock 서버 등).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_out_block<T>(&self, api_id: &str, base_date: &str) -> Result<Vec<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = format!("{}/svc/apis/sto/{}", self.base_url, api_id);
        tracing::debug!(api_id, base_date, "KRX API 요청");

        let response = self
            .http
            .get(&url)
            .query(&[("basDd", base_date)])
            .header("AUTH_KEY", &self.auth_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::FetchError(format!(
                "KRX {} 응답 {}: {}",
                api_id, status, body
            )));
        }

        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.rows.unwrap_or_default())
    }

    async fn daily_trades(
        &self,
        api_id: &str,
        market: &str,
        base_date: &str,
    ) -> Result<Vec<KrxDailyTrade>> {
        let rows: Vec<DailyTradeRow> = self.get_out_block(api_id, base_date).await?;
        let trades: Vec<KrxDailyTrade> = rows.into_iter().map(|r| r.into_trade(market)).collect();

        tracing::info!(market, base_date, count = trades.len(), "KRX 일별 매매정보 수신");
        Ok(trades)
    }

    pub async fn fetch_kospi_daily_trades(&self, base_date: &str) -> Result<Vec<KrxDailyTrade>> {
        self.daily_trades(KOSPI_DAILY_TRADE_API, "KOSPI", base_date)
            .await
    }

    pub async fn fetch_kosdaq_daily_trades(&self, base_date: &str) -> Result<Vec<KrxDailyTrade>> {
        self.daily_trades(KOSDAQ_DAILY_TRADE_API, "KOSDAQ", base_date)
            .await
    }

    /// 두 시장을 동시에 조회해 KOSPI, KOSDAQ 순으로 합칩니다. 한쪽이라도
    /// 실패하면 전체가 실패합니다.
    pub async fn fetch_all_daily_trades(&self, base_date: &str) -> Result<Vec<KrxDailyTrade>> {
        let (kospi, kosdaq) = tokio::join!(
            self.fetch_kospi_daily_trades(base_date),
            self.fetch_kosdaq_daily_trades(base_date),
        );

        let mut trades = kospi?;
        trades.extend(kosdaq?);
        Ok(trades)
    }
}

/// 기준일 하루치 KRX 시세 소스.
pub struct KrxListingSource {
    client: KrxApiClient,
    base_date: String,
}

impl KrxListingSource {
    /// 기준일은 YYYYMMDD 형식이어야 합니다.
    pub fn new(client: KrxApiClient, base_date: impl Into<String>) -> Result<Self> {
        let base_date = base_date.into();
        if parse_base_date(&base_date).is_none() {
            return Err(DataError::InvalidData(format!(
                "기준일은 YYYYMMDD 형식이어야 합니다: {}",
                base_date
            )));
        }
        Ok(Self { client, base_date })
    }

    pub fn base_date(&self) -> &str {
        &self.base_date
    }
}

#[async_trait]
impl ListingSource for KrxListingSource {
    fn name(&self) -> &str {
        "KRX Open API"
    }

    async fn fetch(&self) -> Result<Vec<StockRecord>> {
        let trades = self.client.fetch_all_daily_trades(&self.base_date).await?;
        tracing::info!(base_date = %self.base_date, total = trades.len(), "KRX 시세 조회 완료");
        Ok(trades.into_iter().map(KrxDailyTrade::into_record).collect())
    }
}

fn parse_base_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.len() != 8 {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y%m%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_date() {
        assert_eq!(parse_base_date("20240105"), NaiveDate::from_ymd_opt(2024, 1, 5));
        assert_eq!(parse_base_date("2024-01-05"), None);
        assert_eq!(parse_base_date("20241301"), None);
        assert_eq!(parse_base_date("2024015"), None);
    }

    #[test]
    fn test_listing_source_validates_base_date() {
        let client = KrxApiClient::new("key").unwrap();
        assert!(KrxListingSource::new(client.clone(), "20240105").is_ok());
        assert!(matches!(
            KrxListingSource::new(client, "yesterday"),
            Err(DataError::InvalidData(_))
        ));
    }

    #[test]
    fn test_row_falls_back_to_queried_market() {
        let row = DailyTradeRow {
            bas_dd: Some("20240105".to_string()),
            isu_cd: " 247540 ".to_string(),
            isu_nm: "에코프로비엠".to_string(),
            mkt_nm: Some("  ".to_string()),
            sect_tp_nm: None,
            tdd_clsprc: Some("280,000".to_string()),
            fluc_rt: Some("-".to_string()),
            mktcap: Some("27,000,000,000,000".to_string()),
        };

        let trade = row.into_trade("KOSDAQ");
        assert_eq!(trade.code, "247540");
        assert_eq!(trade.market, "KOSDAQ");
        assert_eq!(trade.change_ratio, None);
        assert_eq!(trade.close, Some(Decimal::new(280_000, 0)));
    }

    #[test]
    fn test_daily_trade_into_record() {
        let trade = KrxDailyTrade {
            date: None,
            code: "005930".to_string(),
            name: "삼성전자".to_string(),
            market: "KOSPI".to_string(),
            sector: Some("전기전자".to_string()),
            close: Some(Decimal::new(71000, 0)),
            change_ratio: Some(Decimal::new(-150, 2)),
            market_cap: Some(Decimal::new(423_000_000_000_000, 0)),
        };

        let record = trade.into_record();
        assert_eq!(record.code, "005930");
        assert_eq!(record.change_ratio, Some(Decimal::new(-150, 2)));
        assert_eq!(record.sector.as_deref(), Some("전기전자"));
        assert_eq!(record.market.as_deref(), Some("KOSPI"));
    }
}
