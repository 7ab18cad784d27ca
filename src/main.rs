// region:    --- Imports
use auction_client::feed::RealtimeFeed;
use auction_client::notify::NotificationQueue;
use auction_client::service::{HttpBidService, SharedBidService};
use auction_client::sync::AuctionSyncer;
use auction_client::timer::{AuctionTimer, TimerSignal};
use chrono::Utc;
use std::sync::Arc;
use tokio::time::{interval, Duration};
use tracing::{error, info, warn};

// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // logging 초기화
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    // 환경 설정
    let api_url = std::env::var("AUCTION_API_URL")
        .unwrap_or_else(|_| "http://localhost:3000/api".to_string());
    let ws_url =
        std::env::var("AUCTION_WS_URL").unwrap_or_else(|_| "ws://localhost:3000/ws".to_string());
    let api_token = std::env::var("AUCTION_API_TOKEN").ok();
    let gem_id: i64 = std::env::var("GEM_ID")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(1);

    // 서비스 클라이언트 생성
    let service: SharedBidService =
        Arc::new(HttpBidService::new(&api_url, api_token.as_deref())?);
    info!("{:<12} --> 입찰 서비스 클라이언트 준비: {}", "Main", api_url);

    // 알림 큐 생성 (단일 제공자)
    let notifications = NotificationQueue::new();

    // 실시간 피드 접속 및 구독
    let feed = RealtimeFeed::spawn(ws_url);
    let mut subscription = feed.subscribe(gem_id);

    // 초기 스냅샷 조회
    let mut syncer = AuctionSyncer::new(gem_id, Arc::clone(&service));
    if let Err(e) = syncer.refresh().await {
        error!("{:<12} --> 초기 조회 실패: {}", "Main", e);
        return Err(e.into());
    }
    let snapshot = syncer
        .snapshot()
        .cloned()
        .ok_or("initial snapshot missing after refresh")?;
    info!(
        "{:<12} --> 관전 시작: gem {}, 현재 최고가 {}, 입찰 {}건",
        "Main",
        gem_id,
        auction_client::format::usd(snapshot.current_highest_bid),
        snapshot.total_bids
    );

    // 경매 단계 타이머 구동
    let timer = AuctionTimer::new(snapshot.auction_start_time, snapshot.auction_end_time);
    let timer_notifications = notifications.clone();
    tokio::spawn(timer.run(move |signal, _tick| {
        let message = match signal {
            TimerSignal::Started => "Auction has started",
            TimerSignal::Ended => "Auction has ended",
        };
        timer_notifications.info(message, Some(chrono::Duration::minutes(1)));
    }));

    // 메인 이벤트 루프: 피드 이벤트 반영 + 알림 만료 스윕
    let mut sweep = interval(Duration::from_secs(5));
    loop {
        tokio::select! {
            event = subscription.recv() => {
                match event {
                    Some(event) => {
                        syncer.handle_event(event).await;
                        if let Some(snapshot) = syncer.snapshot() {
                            info!(
                                "{:<12} --> 현재 최고가 {}, 입찰 {}건, 상태 {:?}",
                                "Main",
                                auction_client::format::usd(snapshot.current_highest_bid),
                                snapshot.total_bids,
                                snapshot.auction_status
                            );
                        }
                    }
                    // 구독 채널이 닫히면 재접속 후 다시 구독한다
                    None => {
                        warn!("{:<12} --> 구독 채널 종료, 재구독 시도", "Main");
                        feed.reconnect();
                        subscription = feed.subscribe(gem_id);
                    }
                }
            }
            _ = sweep.tick() => {
                notifications.expire(Utc::now());
                for notification in notifications.active() {
                    info!(
                        "{:<12} --> [{:?}] {}",
                        "Main", notification.kind, notification.message
                    );
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("{:<12} --> 종료 요청 수신", "Main");
                break;
            }
        }
    }

    Ok(())
}
// endregion: --- Main
