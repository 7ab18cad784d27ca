/// 입찰 이력 뷰 상태
/// 최신순 원장 + 역할별 운영 액션 (수정/삭제/신고/분쟁 처리)
// region:    --- Imports
use crate::bidding::model::{Actor, Bid, BidStatus, DisputeResolution};
use crate::error::ServiceError;
use crate::service::BidService;
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Permission Predicates

/// 기본 표시 개수 — 나머지는 펼치기 토글 뒤에 숨는다
pub const DEFAULT_VISIBLE_BIDS: usize = 5;

/// 수정: 경매 진행 중 ∧ (관리자 ∨ (본인 입찰 ∧ active))
pub fn can_edit_bid(bid: &Bid, actor: &Actor, auction_ended: bool) -> bool {
    if auction_ended {
        return false;
    }
    actor.is_admin() || (actor.owns(bid) && bid.status == BidStatus::Active)
}

/// 삭제: 경매 진행 중 ∧ (관리자 ∨ (본인 입찰 ∧ 미확정))
pub fn can_delete_bid(bid: &Bid, actor: &Actor, auction_ended: bool) -> bool {
    if auction_ended {
        return false;
    }
    actor.is_admin() || (actor.owns(bid) && bid.status != BidStatus::Finalized)
}

/// 신고: 관리자 ∧ 아직 분쟁 아님
pub fn can_flag_bid(bid: &Bid, actor: &Actor) -> bool {
    actor.is_admin() && !bid.disputed
}

/// 분쟁 처리: 관리자 ∧ 분쟁 중 ∧ 미처리
pub fn can_resolve_dispute(bid: &Bid, actor: &Actor) -> bool {
    actor.is_admin() && bid.disputed && bid.dispute_resolution.is_none()
}

// endregion: --- Permission Predicates

// region:    --- Bid History

/// 이력 액션의 결과 — 호출자가 onRefresh 에 해당하는 재조회를 트리거한다
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOutcome {
    Updated,
    Deleted,
    Flagged,
    Resolved,
}

// 입찰 이력 상태.
// 원장은 timestamp 내림차순으로 유지되고, 변이 액션은
// 행 단위 in-flight 가드로 이중 실행이 막힌다.
#[derive(Default)]
pub struct BidHistory {
    bids: Vec<Bid>,
    expanded: bool,
    action_loading: Option<i64>,
    pending_delete: Option<i64>,
    error: Option<String>,
}

impl BidHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 원장 교체 — 최신순 정렬. 동일 시각은 입력 순서를 유지한다 (안정 정렬).
    pub fn set_bids(&mut self, mut bids: Vec<Bid>) {
        bids.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.bids = bids;
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    /// 현재 보이는 구간 (펼치기 전에는 상위 5건)
    pub fn visible(&self) -> &[Bid] {
        if self.expanded {
            &self.bids
        } else {
            &self.bids[..self.bids.len().min(DEFAULT_VISIBLE_BIDS)]
        }
    }

    pub fn hidden_count(&self) -> usize {
        self.bids.len() - self.visible().len()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle_expanded(&mut self) {
        self.expanded = !self.expanded;
    }

    /// 컴포넌트 수준 오류 문자열 (자동 재시도 없음)
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn action_in_flight(&self) -> Option<i64> {
        self.action_loading
    }

    fn find(&self, bid_id: i64) -> Result<&Bid, ServiceError> {
        self.bids
            .iter()
            .find(|bid| bid.id == bid_id)
            .ok_or_else(|| ServiceError::unknown(format!("Bid {} is not in the ledger", bid_id)))
    }

    /// 행 단위 가드 — 같은 행의 변이가 진행 중이면 거부
    fn begin_action(&mut self, bid_id: i64) -> Result<(), ServiceError> {
        if self.action_loading.is_some() {
            return Err(ServiceError::validation(
                "Another action is already in progress",
            ));
        }
        self.action_loading = Some(bid_id);
        Ok(())
    }

    fn finish_action(&mut self, result: Result<HistoryOutcome, ServiceError>) -> Result<HistoryOutcome, ServiceError> {
        self.action_loading = None;
        if let Err(e) = &result {
            warn!("{:<12} --> 이력 액션 실패: {}", "History", e);
            self.error = Some(e.to_string());
        }
        result
    }

    /// 금액 수정. 하한 재검증은 하지 않고 서버 판정에 위임한다.
    pub async fn edit_bid(
        &mut self,
        bid_id: i64,
        amount: i64,
        actor: &Actor,
        auction_ended: bool,
        service: &dyn BidService,
    ) -> Result<HistoryOutcome, ServiceError> {
        let bid = self.find(bid_id)?;
        if !can_edit_bid(bid, actor, auction_ended) {
            return Err(ServiceError::permission(
                "You do not have permission to edit this bid",
            ));
        }
        self.begin_action(bid_id)?;
        info!("{:<12} --> 금액 수정: bid {}, 금액 {}", "History", bid_id, amount);

        let result = match service.update_bid(bid_id, amount).await {
            Ok(updated) => {
                if let Some(slot) = self.bids.iter_mut().find(|bid| bid.id == bid_id) {
                    *slot = updated;
                }
                Ok(HistoryOutcome::Updated)
            }
            Err(e) => Err(e),
        };
        self.finish_action(result)
    }

    /// 삭제 1단계: 확인 요청
    pub fn request_delete(&mut self, bid_id: i64) {
        self.pending_delete = Some(bid_id);
    }

    pub fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// 삭제 2단계: 확인 후 실행
    pub async fn confirm_delete(
        &mut self,
        actor: &Actor,
        auction_ended: bool,
        service: &dyn BidService,
    ) -> Result<HistoryOutcome, ServiceError> {
        let bid_id = self
            .pending_delete
            .ok_or_else(|| ServiceError::validation("No delete is awaiting confirmation"))?;
        let bid = self.find(bid_id)?;
        if !can_delete_bid(bid, actor, auction_ended) {
            self.pending_delete = None;
            return Err(ServiceError::permission(
                "You do not have permission to delete this bid",
            ));
        }
        self.begin_action(bid_id)?;
        info!("{:<12} --> 삭제 확정: bid {}", "History", bid_id);

        let result = match service.delete_bid(bid_id).await {
            Ok(()) => {
                self.bids.retain(|bid| bid.id != bid_id);
                self.pending_delete = None;
                Ok(HistoryOutcome::Deleted)
            }
            Err(e) => Err(e),
        };
        self.finish_action(result)
    }

    /// 신고 — 빈 사유는 제출 전에 거부된다
    pub async fn flag_bid(
        &mut self,
        bid_id: i64,
        reason: &str,
        actor: &Actor,
        service: &dyn BidService,
    ) -> Result<HistoryOutcome, ServiceError> {
        let bid = self.find(bid_id)?;
        if !can_flag_bid(bid, actor) {
            return Err(ServiceError::permission(
                "You do not have permission to flag this bid",
            ));
        }
        if reason.trim().is_empty() {
            return Err(ServiceError::validation(
                "A reason is required to flag a bid",
            ));
        }
        self.begin_action(bid_id)?;
        info!("{:<12} --> 신고: bid {}", "History", bid_id);

        let result = match service.flag_bid(bid_id, reason).await {
            Ok(()) => {
                if let Some(slot) = self.bids.iter_mut().find(|bid| bid.id == bid_id) {
                    slot.disputed = true;
                }
                Ok(HistoryOutcome::Flagged)
            }
            Err(e) => Err(e),
        };
        self.finish_action(result)
    }

    /// 분쟁 처리 — approved/cancelled + 선택 메모
    pub async fn resolve_dispute(
        &mut self,
        bid_id: i64,
        resolution: DisputeResolution,
        notes: Option<&str>,
        actor: &Actor,
        service: &dyn BidService,
    ) -> Result<HistoryOutcome, ServiceError> {
        let bid = self.find(bid_id)?;
        if !can_resolve_dispute(bid, actor) {
            return Err(ServiceError::permission(
                "You do not have permission to resolve this dispute",
            ));
        }
        self.begin_action(bid_id)?;
        info!(
            "{:<12} --> 분쟁 처리: bid {}, 결과 {:?}",
            "History", bid_id, resolution
        );

        let result = match service.resolve_dispute(bid_id, resolution, notes).await {
            Ok(()) => {
                if let Some(slot) = self.bids.iter_mut().find(|bid| bid.id == bid_id) {
                    slot.dispute_resolution = Some(resolution);
                    slot.dispute_notes = notes.map(str::to_string);
                }
                Ok(HistoryOutcome::Resolved)
            }
            Err(e) => Err(e),
        };
        self.finish_action(result)
    }
}

// endregion: --- Bid History
