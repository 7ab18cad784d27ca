/// 입찰 제출 흐름
/// 1. 자격 검사 (순서 고정)
/// 2. 금액 검증 및 확인 대기
/// 3. 확정 제출
// region:    --- Imports
use crate::auction::snapshot::{AuctionSnapshot, FloorBasis};
use crate::bidding::model::{Actor, Bid};
use crate::error::ServiceError;
use crate::format::usd;
use crate::service::BidService;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

// endregion: --- Imports

// region:    --- Commands

/// 입찰 명령
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBidCommand {
    pub gem_id: i64,
    pub amount: i64,
    pub proxy_max_bid: Option<i64>,
}

/// 빠른 입찰 프리셋 증분의 최소 폭 ($100)
const QUICK_RAISE_MIN: i64 = 100_00;

// endregion: --- Commands

// region:    --- Eligibility

/// 입찰 차단 사유. 변형 순서가 곧 평가 순서다.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidBlock {
    #[error("Please sign in to place a bid")]
    SignInRequired,
    #[error("Auction has ended")]
    AuctionEnded,
    #[error("Sellers cannot bid on their own listing")]
    OwnListing,
    #[error("Your account is not eligible to bid")]
    RoleNotAllowed,
}

/// 순서 고정 자격 검사: 로그인 → 경매 종료 → 본인 출품 → 역할.
/// 첫 번째로 실패한 조건의 사유가 그대로 노출된다.
/// 미로그인 사용자는 종료된 경매에서도 로그인 안내를 먼저 본다.
pub fn check_eligibility(
    actor: Option<&Actor>,
    snapshot: &AuctionSnapshot,
    now: DateTime<Utc>,
) -> Result<(), BidBlock> {
    let actor = actor.ok_or(BidBlock::SignInRequired)?;
    if snapshot.has_ended(now) {
        return Err(BidBlock::AuctionEnded);
    }
    if actor.user_id == snapshot.seller_id {
        return Err(BidBlock::OwnListing);
    }
    if !actor.role.can_bid() {
        return Err(BidBlock::RoleNotAllowed);
    }
    Ok(())
}

// endregion: --- Eligibility

// region:    --- Amount Validation

/// 금액 검증 오류. 하한의 근거에 따라 메시지가 갈린다.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmountError {
    #[error("Bid must meet the reserve price of {}", usd(*.floor))]
    ReserveNotMet { floor: i64 },
    #[error("Bid must be at least the starting bid of {}", usd(*.floor))]
    BelowStartingBid { floor: i64 },
    #[error("Bid must be greater than the current highest bid of {}", usd(*.highest))]
    NotAboveHighest { highest: i64 },
    #[error("Proxy ceiling must be greater than the bid amount")]
    ProxyCeilingTooLow,
}

/// 서버 검증의 클라이언트 측 선행 검사 (대체가 아니라 반영)
pub fn validate_amount(
    snapshot: &AuctionSnapshot,
    amount: i64,
    proxy_max_bid: Option<i64>,
) -> Result<(), AmountError> {
    let (floor, basis) = snapshot.bid_floor();
    if amount < floor {
        return Err(match basis {
            FloorBasis::Reserve => AmountError::ReserveNotMet { floor },
            FloorBasis::StartingBid => AmountError::BelowStartingBid { floor },
            FloorBasis::Outbid => AmountError::NotAboveHighest {
                highest: snapshot.current_highest_bid,
            },
        });
    }
    if let Some(ceiling) = proxy_max_bid {
        if ceiling <= amount {
            return Err(AmountError::ProxyCeilingTooLow);
        }
    }
    Ok(())
}

// endregion: --- Amount Validation

// region:    --- Quick Bids

/// 빠른 입찰 프리셋
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickBids {
    pub minimum: i64,
    pub increment: i64,
    pub reserve: i64,
}

/// 프리셋 계산.
/// increment 는 기준가(입찰이 있으면 현재 최고가, 없으면 하한)에
/// max($100, 기준가의 5%) 를 더한 값이다.
pub fn quick_bids(snapshot: &AuctionSnapshot) -> QuickBids {
    let (floor, _) = snapshot.bid_floor();
    let base = if snapshot.total_bids == 0 {
        floor
    } else {
        snapshot.current_highest_bid
    };
    QuickBids {
        minimum: floor,
        increment: base + std::cmp::max(QUICK_RAISE_MIN, base / 20),
        reserve: snapshot.reserve_price.unwrap_or(floor),
    }
}

// endregion: --- Quick Bids

// region:    --- Place Bid Form

/// 제출 전 거절 사유
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BidRejection {
    #[error(transparent)]
    Blocked(#[from] BidBlock),
    #[error(transparent)]
    Amount(#[from] AmountError),
}

#[derive(Debug, Clone, PartialEq)]
enum FormStage {
    Editing,
    Confirming(PlaceBidCommand),
}

// 2단계 제출 폼: prepare 가 검증 후 확인 대기 상태로 올리고,
// confirm 만 네트워크 호출을 수행한다. 명시적 성공 시에만 리셋된다.
pub struct PlaceBidForm {
    gem_id: i64,
    stage: FormStage,
}

impl PlaceBidForm {
    pub fn new(gem_id: i64) -> Self {
        Self {
            gem_id,
            stage: FormStage::Editing,
        }
    }

    /// 1단계: 자격 → 금액 순 검증, 통과 시 확인 대기
    pub fn prepare(
        &mut self,
        actor: Option<&Actor>,
        snapshot: &AuctionSnapshot,
        amount: i64,
        proxy_max_bid: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<(), BidRejection> {
        check_eligibility(actor, snapshot, now)?;
        validate_amount(snapshot, amount, proxy_max_bid)?;
        self.stage = FormStage::Confirming(PlaceBidCommand {
            gem_id: self.gem_id,
            amount,
            proxy_max_bid,
        });
        Ok(())
    }

    /// 확인 대기 중인 명령
    pub fn pending(&self) -> Option<&PlaceBidCommand> {
        match &self.stage {
            FormStage::Confirming(cmd) => Some(cmd),
            FormStage::Editing => None,
        }
    }

    pub fn awaiting_confirmation(&self) -> bool {
        self.pending().is_some()
    }

    /// 확인 취소 — 대기 중인 명령 폐기
    pub fn cancel(&mut self) {
        self.stage = FormStage::Editing;
    }

    /// 2단계: 확정 제출.
    /// 성공 시에만 폼이 리셋되고, 재시도 가능한 실패는 같은 명령을
    /// 명시적 Retry 로 다시 보낼 수 있게 대기 상태를 유지한다.
    pub async fn confirm(&mut self, service: &dyn BidService) -> Result<Bid, ServiceError> {
        let cmd = match &self.stage {
            FormStage::Confirming(cmd) => cmd.clone(),
            FormStage::Editing => {
                return Err(ServiceError::validation("No bid is awaiting confirmation"))
            }
        };

        info!(
            "{:<12} --> 입찰 확정: gem {}, 금액 {}",
            "Command", cmd.gem_id, cmd.amount
        );
        match service
            .place_bid(cmd.gem_id, cmd.amount, cmd.proxy_max_bid)
            .await
        {
            Ok(bid) => {
                self.stage = FormStage::Editing;
                Ok(bid)
            }
            Err(e) => {
                if !e.retryable() {
                    self.stage = FormStage::Editing;
                }
                Err(e)
            }
        }
    }
}

// endregion: --- Place Bid Form
