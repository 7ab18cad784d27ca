use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 최소 상회 폭 (1센트) — 기존 최고가는 엄격히 넘어야 한다
pub const MIN_BID_STEP: i64 = 1;

// 경매 진행 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    Scheduled,
    Active,
    Ended,
    Cancelled,
}

/// 스냅샷 병합 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Applied,
    Stale,
}

/// 다음 입찰 하한의 근거 (검증 메시지 분기용)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorBasis {
    Reserve,
    StartingBid,
    Outbid,
}

// 경매 표시 상태 스냅샷
// REST 응답과 실시간 이벤트가 같은 구조로 수렴하며,
// version 이 더 큰 쪽만 수용된다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionSnapshot {
    pub gem_id: i64,
    pub seller_id: i64,
    pub current_highest_bid: i64,
    pub total_bids: i64,
    #[serde(default)]
    pub reserve_price: Option<i64>,
    pub starting_bid: i64,
    pub auction_start_time: DateTime<Utc>,
    pub auction_end_time: DateTime<Utc>,
    pub auction_status: AuctionStatus,
    pub is_finalized: bool,
    pub version: i64,
}

impl AuctionSnapshot {
    /// 더 새로운 버전만 수용한다. 같은 버전의 재전달은 Stale 로 거부되므로
    /// 이벤트 중복 수신에 대해 멱등하다.
    pub fn apply(&mut self, incoming: AuctionSnapshot) -> MergeOutcome {
        if incoming.version <= self.version {
            return MergeOutcome::Stale;
        }
        *self = incoming;
        MergeOutcome::Applied
    }

    /// 실시간 상태 이벤트 적용 — 버전 검사는 apply 와 동일
    pub fn apply_status_change(
        &mut self,
        current_highest_bid: i64,
        total_bids: i64,
        auction_status: AuctionStatus,
        is_finalized: bool,
        version: i64,
    ) -> MergeOutcome {
        if version <= self.version {
            return MergeOutcome::Stale;
        }
        self.current_highest_bid = current_highest_bid;
        self.total_bids = total_bids;
        self.auction_status = auction_status;
        self.is_finalized = is_finalized;
        self.version = version;
        MergeOutcome::Applied
    }

    /// 최소 수용 입찰가.
    /// 입찰이 없으면 max(시작가, 보장가), 있으면 현재 최고가를 엄격히 상회.
    pub fn bid_floor(&self) -> (i64, FloorBasis) {
        if self.total_bids == 0 {
            let reserve = self.reserve_price.unwrap_or(0);
            if reserve > self.starting_bid {
                (reserve, FloorBasis::Reserve)
            } else {
                (self.starting_bid, FloorBasis::StartingBid)
            }
        } else {
            (self.current_highest_bid + MIN_BID_STEP, FloorBasis::Outbid)
        }
    }

    /// 보장가 충족 여부 (보장가 미설정이면 항상 충족)
    pub fn reserve_met(&self) -> bool {
        self.reserve_price
            .map(|reserve| self.current_highest_bid >= reserve)
            .unwrap_or(true)
    }

    /// 입찰이 더 이상 불가능한 상태인지 여부
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        matches!(
            self.auction_status,
            AuctionStatus::Ended | AuctionStatus::Cancelled
        ) || self.is_finalized
            || now >= self.auction_end_time
    }
}
