// region:    --- Imports
use crate::auction::events::AuctionEvent;
use crate::auction::snapshot::{AuctionSnapshot, MergeOutcome};
use crate::bidding::model::Bid;
use crate::error::ServiceError;
use crate::service::SharedBidService;
use tracing::{debug, info, warn};

// endregion: --- Imports

// region:    --- Auction Syncer

/// 원장 조회 페이지 크기
const LEDGER_PAGE_SIZE: u32 = 50;

// 경매 표시 상태 동기화기. 화면에 보이는 상품 하나당 하나.
// REST 스냅샷과 실시간 이벤트를 버전 병합으로 합쳐
// 느린 응답이 더 새로운 값을 덮어쓰지 못하게 한다.
pub struct AuctionSyncer {
    gem_id: i64,
    service: SharedBidService,
    snapshot: Option<AuctionSnapshot>,
    bids: Vec<Bid>,
    last_error: Option<String>,
}

impl AuctionSyncer {
    pub fn new(gem_id: i64, service: SharedBidService) -> Self {
        Self {
            gem_id,
            service,
            snapshot: None,
            bids: Vec::new(),
            last_error: None,
        }
    }

    pub fn gem_id(&self) -> i64 {
        self.gem_id
    }

    pub fn snapshot(&self) -> Option<&AuctionSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    /// 마지막 조회 실패 메시지 (재시도 버튼 노출 판단용)
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// REST 원천에서 통계와 원장을 재조회한다.
    /// 실패는 오류 문자열로 남을 뿐 구독 수명에는 영향을 주지 않는다.
    pub async fn refresh(&mut self) -> Result<(), ServiceError> {
        info!("{:<12} --> 재조회: gem {}", "Sync", self.gem_id);

        let stats = match self.service.get_bid_stats_for_gem(self.gem_id).await {
            Ok(stats) => stats,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };
        let page = match self
            .service
            .get_bids_for_gem(self.gem_id, 1, LEDGER_PAGE_SIZE)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        self.last_error = None;
        self.bids = page.bids;
        self.apply_snapshot(stats);
        Ok(())
    }

    /// 실시간 이벤트 처리. 다른 상품의 이벤트는 무시한다.
    pub async fn handle_event(&mut self, event: AuctionEvent) {
        if event.gem_id() != self.gem_id {
            debug!(
                "{:<12} --> 다른 상품 이벤트 무시: gem {}",
                "Sync",
                event.gem_id()
            );
            return;
        }

        match event {
            // 새 입찰은 증분 적용 대신 원천 재조회로 반영한다
            AuctionEvent::NewBid { bid_id, amount, .. } => {
                info!(
                    "{:<12} --> 새 입찰 수신: bid {}, 금액 {}",
                    "Sync", bid_id, amount
                );
                if let Err(e) = self.refresh().await {
                    warn!("{:<12} --> 입찰 반영 재조회 실패: {}", "Sync", e);
                }
            }
            AuctionEvent::StatusChanged {
                current_highest_bid,
                total_bids,
                auction_status,
                is_finalized,
                version,
                ..
            } => match &mut self.snapshot {
                Some(snapshot) => {
                    let outcome = snapshot.apply_status_change(
                        current_highest_bid,
                        total_bids,
                        auction_status,
                        is_finalized,
                        version,
                    );
                    if outcome == MergeOutcome::Stale {
                        debug!(
                            "{:<12} --> 낡은 상태 이벤트 거부: v{} <= v{}",
                            "Sync", version, snapshot.version
                        );
                    }
                }
                // 초기 조회 전에 이벤트가 먼저 오면 전체 재조회로 대체
                None => {
                    if let Err(e) = self.refresh().await {
                        warn!("{:<12} --> 상태 반영 재조회 실패: {}", "Sync", e);
                    }
                }
            },
        }
    }

    /// 버전 병합 — 낡은 스냅샷은 거부된다
    fn apply_snapshot(&mut self, incoming: AuctionSnapshot) -> MergeOutcome {
        match &mut self.snapshot {
            None => {
                self.snapshot = Some(incoming);
                MergeOutcome::Applied
            }
            Some(current) => {
                let outcome = current.apply(incoming);
                if outcome == MergeOutcome::Stale {
                    debug!("{:<12} --> 낡은 REST 스냅샷 거부", "Sync");
                }
                outcome
            }
        }
    }
}

// endregion: --- Auction Syncer
