// region:    --- Imports
use crate::auction::snapshot::{AuctionSnapshot, AuctionStatus};
use crate::bidding::model::{Bid, BidPage, DisputeResolution};
use crate::error::{classify_message, ErrorEnvelope, ErrorKind, ServiceError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

// endregion: --- Imports

// region:    --- Contract Types

/// 성공 응답 봉투
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

/// 경매 목록 조회 옵션
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionListOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AuctionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// 경매 요약 (목록 화면용)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionSummary {
    pub gem_id: i64,
    pub title: String,
    pub current_highest_bid: i64,
    pub total_bids: i64,
    pub auction_end_time: DateTime<Utc>,
    pub auction_status: AuctionStatus,
}

// endregion: --- Contract Types

// region:    --- Bid Service Trait

// 원격 입찰 서비스 계약.
// 서버가 모든 경매 불변식을 소유하며, 클라이언트는 이 계약의 소비자일 뿐이다.
#[async_trait]
pub trait BidService {
    async fn place_bid(
        &self,
        gem_id: i64,
        amount: i64,
        proxy_max_bid: Option<i64>,
    ) -> Result<Bid, ServiceError>;

    async fn update_bid(&self, bid_id: i64, amount: i64) -> Result<Bid, ServiceError>;

    async fn delete_bid(&self, bid_id: i64) -> Result<(), ServiceError>;

    async fn flag_bid(&self, bid_id: i64, reason: &str) -> Result<(), ServiceError>;

    async fn resolve_dispute(
        &self,
        bid_id: i64,
        resolution: DisputeResolution,
        notes: Option<&str>,
    ) -> Result<(), ServiceError>;

    async fn get_bids_for_gem(
        &self,
        gem_id: i64,
        page: u32,
        page_size: u32,
    ) -> Result<BidPage, ServiceError>;

    async fn get_bid_stats_for_gem(&self, gem_id: i64) -> Result<AuctionSnapshot, ServiceError>;

    async fn get_all_auctions(
        &self,
        opts: &AuctionListOptions,
    ) -> Result<Vec<AuctionSummary>, ServiceError>;

    async fn get_seller_auctions(&self) -> Result<Vec<AuctionSummary>, ServiceError>;

    async fn finalize_bid(&self, bid_id: i64, note: &str) -> Result<(), ServiceError>;

    async fn cancel_bid(&self, bid_id: i64, note: &str) -> Result<(), ServiceError>;
}

pub type SharedBidService = Arc<dyn BidService + Send + Sync>;

// endregion: --- Bid Service Trait

// region:    --- HTTP Implementation

// HTTP 구현체. 커넥션 풀을 가진 Client 하나를 생성 시점에 만들어 재사용한다.
pub struct HttpBidService {
    client: Client,
    base_url: String,
}

impl HttpBidService {
    pub fn new(base_url: impl Into<String>, auth_token: Option<&str>) -> Result<Self, ServiceError> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = auth_token {
            headers.insert(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", token)
                    .parse()
                    .map_err(|_| ServiceError::validation("Invalid API token"))?,
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .map_err(|e| ServiceError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 전송 계층 오류 → network 분류
    fn transport(context: &str, error: reqwest::Error) -> ServiceError {
        ServiceError::network(format!("{}: {}", context, error))
    }

    /// 비성공 응답을 구조화 봉투로 해석한다.
    /// 봉투가 아니면 상태 코드와 메시지 휴리스틱으로 떨어진다.
    async fn fail(response: reqwest::Response) -> ServiceError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => ServiceError::from_envelope(envelope),
            Err(_) => {
                let message = if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body
                };
                let kind = if status.is_server_error() {
                    ErrorKind::Server
                } else {
                    classify_message(&message)
                };
                ServiceError {
                    kind,
                    code: None,
                    field: None,
                    message,
                }
            }
        }
    }

    /// 성공 봉투에서 data 추출
    async fn decode<T: DeserializeOwned>(
        context: &str,
        response: reqwest::Response,
    ) -> Result<T, ServiceError> {
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        let envelope = response
            .json::<ApiResponse<T>>()
            .await
            .map_err(|e| Self::transport(context, e))?;
        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| format!("{} failed", context));
            let kind = classify_message(&message);
            return Err(ServiceError {
                kind,
                code: None,
                field: None,
                message,
            });
        }
        envelope.data.ok_or_else(|| {
            ServiceError::server(format!("{}: response body missing data", context))
        })
    }

    /// data 가 없는 성공 봉투 처리
    async fn decode_unit(context: &str, response: reqwest::Response) -> Result<(), ServiceError> {
        if !response.status().is_success() {
            return Err(Self::fail(response).await);
        }
        let envelope = response
            .json::<ApiResponse<serde_json::Value>>()
            .await
            .map_err(|e| Self::transport(context, e))?;
        if !envelope.success {
            let message = envelope
                .message
                .unwrap_or_else(|| format!("{} failed", context));
            return Err(ServiceError {
                kind: classify_message(&message),
                code: None,
                field: None,
                message,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl BidService for HttpBidService {
    async fn place_bid(
        &self,
        gem_id: i64,
        amount: i64,
        proxy_max_bid: Option<i64>,
    ) -> Result<Bid, ServiceError> {
        info!(
            "{:<12} --> 입찰 제출: gem {}, 금액 {}",
            "Service", gem_id, amount
        );
        let response = self
            .client
            .post(self.url("/bids"))
            .json(&json!({
                "gemId": gem_id,
                "amount": amount,
                "proxyMaxBid": proxy_max_bid,
            }))
            .send()
            .await
            .map_err(|e| Self::transport("POST /bids", e))?;
        Self::decode("POST /bids", response).await
    }

    async fn update_bid(&self, bid_id: i64, amount: i64) -> Result<Bid, ServiceError> {
        info!(
            "{:<12} --> 입찰 수정: bid {}, 금액 {}",
            "Service", bid_id, amount
        );
        let response = self
            .client
            .put(self.url(&format!("/bids/{}", bid_id)))
            .json(&json!({ "amount": amount }))
            .send()
            .await
            .map_err(|e| Self::transport("PUT /bids/:id", e))?;
        Self::decode("PUT /bids/:id", response).await
    }

    async fn delete_bid(&self, bid_id: i64) -> Result<(), ServiceError> {
        info!("{:<12} --> 입찰 삭제: bid {}", "Service", bid_id);
        let response = self
            .client
            .delete(self.url(&format!("/bids/{}", bid_id)))
            .send()
            .await
            .map_err(|e| Self::transport("DELETE /bids/:id", e))?;
        Self::decode_unit("DELETE /bids/:id", response).await
    }

    async fn flag_bid(&self, bid_id: i64, reason: &str) -> Result<(), ServiceError> {
        info!("{:<12} --> 입찰 신고: bid {}", "Service", bid_id);
        let response = self
            .client
            .post(self.url(&format!("/bids/{}/flag", bid_id)))
            .json(&json!({ "reason": reason }))
            .send()
            .await
            .map_err(|e| Self::transport("POST /bids/:id/flag", e))?;
        Self::decode_unit("POST /bids/:id/flag", response).await
    }

    async fn resolve_dispute(
        &self,
        bid_id: i64,
        resolution: DisputeResolution,
        notes: Option<&str>,
    ) -> Result<(), ServiceError> {
        info!(
            "{:<12} --> 분쟁 처리: bid {}, 결과 {:?}",
            "Service", bid_id, resolution
        );
        let response = self
            .client
            .post(self.url(&format!("/bids/{}/resolve", bid_id)))
            .json(&json!({ "resolution": resolution, "notes": notes }))
            .send()
            .await
            .map_err(|e| Self::transport("POST /bids/:id/resolve", e))?;
        Self::decode_unit("POST /bids/:id/resolve", response).await
    }

    async fn get_bids_for_gem(
        &self,
        gem_id: i64,
        page: u32,
        page_size: u32,
    ) -> Result<BidPage, ServiceError> {
        info!(
            "{:<12} --> 입찰 목록 조회: gem {}, page {}",
            "Service", gem_id, page
        );
        let response = self
            .client
            .get(self.url(&format!("/gems/{}/bids", gem_id)))
            .query(&[("page", page), ("pageSize", page_size)])
            .send()
            .await
            .map_err(|e| Self::transport("GET /gems/:id/bids", e))?;
        Self::decode("GET /gems/:id/bids", response).await
    }

    async fn get_bid_stats_for_gem(&self, gem_id: i64) -> Result<AuctionSnapshot, ServiceError> {
        info!("{:<12} --> 경매 통계 조회: gem {}", "Service", gem_id);
        let response = self
            .client
            .get(self.url(&format!("/gems/{}/bid-stats", gem_id)))
            .send()
            .await
            .map_err(|e| Self::transport("GET /gems/:id/bid-stats", e))?;
        Self::decode("GET /gems/:id/bid-stats", response).await
    }

    async fn get_all_auctions(
        &self,
        opts: &AuctionListOptions,
    ) -> Result<Vec<AuctionSummary>, ServiceError> {
        info!("{:<12} --> 경매 목록 조회", "Service");
        let response = self
            .client
            .get(self.url("/auctions"))
            .query(opts)
            .send()
            .await
            .map_err(|e| Self::transport("GET /auctions", e))?;
        Self::decode("GET /auctions", response).await
    }

    async fn get_seller_auctions(&self) -> Result<Vec<AuctionSummary>, ServiceError> {
        info!("{:<12} --> 판매자 경매 목록 조회", "Service");
        let response = self
            .client
            .get(self.url("/auctions/mine"))
            .send()
            .await
            .map_err(|e| Self::transport("GET /auctions/mine", e))?;
        Self::decode("GET /auctions/mine", response).await
    }

    async fn finalize_bid(&self, bid_id: i64, note: &str) -> Result<(), ServiceError> {
        info!("{:<12} --> 낙찰 확정: bid {}", "Service", bid_id);
        let response = self
            .client
            .post(self.url(&format!("/bids/{}/finalize", bid_id)))
            .json(&json!({ "note": note }))
            .send()
            .await
            .map_err(|e| Self::transport("POST /bids/:id/finalize", e))?;
        Self::decode_unit("POST /bids/:id/finalize", response).await
    }

    async fn cancel_bid(&self, bid_id: i64, note: &str) -> Result<(), ServiceError> {
        info!("{:<12} --> 입찰 취소: bid {}", "Service", bid_id);
        let response = self
            .client
            .post(self.url(&format!("/bids/{}/cancel", bid_id)))
            .json(&json!({ "note": note }))
            .send()
            .await
            .map_err(|e| Self::transport("POST /bids/:id/cancel", e))?;
        Self::decode_unit("POST /bids/:id/cancel", response).await
    }
}

// endregion: --- HTTP Implementation
