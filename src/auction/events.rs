use crate::auction::snapshot::AuctionStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 실시간 피드로 수신되는 경매 이벤트
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuctionEvent {
    // 새 입찰 — 원장 전체 재조회의 트리거
    #[serde(rename_all = "camelCase")]
    NewBid {
        gem_id: i64,
        bid_id: i64,
        amount: i64,
        version: i64,
        timestamp: DateTime<Utc>,
    },
    // 상태 변경 — 스냅샷 필드 직접 갱신 (버전 병합 경유)
    #[serde(rename_all = "camelCase")]
    StatusChanged {
        gem_id: i64,
        current_highest_bid: i64,
        total_bids: i64,
        auction_status: AuctionStatus,
        is_finalized: bool,
        version: i64,
    },
}

impl AuctionEvent {
    /// 이벤트가 속한 상품 식별자
    pub fn gem_id(&self) -> i64 {
        match self {
            AuctionEvent::NewBid { gem_id, .. } => *gem_id,
            AuctionEvent::StatusChanged { gem_id, .. } => *gem_id,
        }
    }

    pub fn version(&self) -> i64 {
        match self {
            AuctionEvent::NewBid { version, .. } => *version,
            AuctionEvent::StatusChanged { version, .. } => *version,
        }
    }
}
