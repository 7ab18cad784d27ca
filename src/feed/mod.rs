// region:    --- Imports
use crate::auction::events::AuctionEvent;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

// endregion: --- Imports

// region:    --- Feed Handle

/// 재접속 대기 시간 — 수동 재접속 계약은 고정 1초
const RECONNECT_DELAY: Duration = Duration::from_secs(1);
/// 구독자별 이벤트 버퍼 크기
const EVENT_BUFFER: usize = 256;

#[derive(Debug)]
enum FeedCommand {
    Subscribe(i64),
    Unsubscribe(i64),
    Reconnect,
}

type SubscriberMap = Arc<Mutex<HashMap<i64, mpsc::Sender<AuctionEvent>>>>;

// 실시간 경매 피드.
// 워커가 웹소켓 접속 하나를 소유하고, 상품 아이디 단위로 구독을 관리한다.
#[derive(Clone)]
pub struct RealtimeFeed {
    cmd_tx: mpsc::Sender<FeedCommand>,
    subscribers: SubscriberMap,
    connected: Arc<AtomicBool>,
}

// 구독 핸들. 드랍되면 해당 상품 구독이 해지된다.
pub struct FeedSubscription {
    gem_id: i64,
    cmd_tx: mpsc::Sender<FeedCommand>,
    subscribers: SubscriberMap,
    rx: mpsc::Receiver<AuctionEvent>,
}

impl FeedSubscription {
    pub fn gem_id(&self) -> i64 {
        self.gem_id
    }

    /// 다음 이벤트 수신. 채널이 닫히면 None.
    pub async fn recv(&mut self) -> Option<AuctionEvent> {
        self.rx.recv().await
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.remove(&self.gem_id);
        }
        let _ = self.cmd_tx.try_send(FeedCommand::Unsubscribe(self.gem_id));
    }
}

impl RealtimeFeed {
    /// 워커 스폰 후 핸들 반환
    pub fn spawn(ws_url: impl Into<String>) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<FeedCommand>(64);
        let feed = Self {
            cmd_tx,
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            connected: Arc::new(AtomicBool::new(false)),
        };

        let worker = FeedWorker {
            ws_url: ws_url.into(),
            subscribers: Arc::clone(&feed.subscribers),
            connected: Arc::clone(&feed.connected),
        };
        tokio::spawn(async move {
            worker.run(cmd_rx).await;
            warn!("{:<12} --> 피드 워커 종료", "Feed");
        });

        feed
    }

    /// 상품 하나당 구독 하나. 같은 상품을 다시 구독하면 기존 채널이 교체된다.
    pub fn subscribe(&self, gem_id: i64) -> FeedSubscription {
        info!("{:<12} --> 구독: gem {}", "Feed", gem_id);
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        self.subscribers.lock().expect("lock").insert(gem_id, tx);
        let _ = self.cmd_tx.try_send(FeedCommand::Subscribe(gem_id));
        FeedSubscription {
            gem_id,
            cmd_tx: self.cmd_tx.clone(),
            subscribers: Arc::clone(&self.subscribers),
            rx,
        }
    }

    /// 수동 재접속 — 소켓을 끊고 1초 뒤 재접속, 구독 재전송
    pub fn reconnect(&self) {
        info!("{:<12} --> 수동 재접속 요청", "Feed");
        let _ = self.cmd_tx.try_send(FeedCommand::Reconnect);
    }

    /// 접속 상태 (UI 의 재접속 버튼 노출 판단용)
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }
}

// endregion: --- Feed Handle

// region:    --- Feed Worker

enum SessionExit {
    Shutdown,
    Reconnect,
}

struct FeedWorker {
    ws_url: String,
    subscribers: SubscriberMap,
    connected: Arc<AtomicBool>,
}

impl FeedWorker {
    async fn run(&self, mut cmd_rx: mpsc::Receiver<FeedCommand>) {
        let mut desired: HashSet<i64> = HashSet::new();

        loop {
            // 구독이 하나도 없으면 접속하지 않고 명령만 기다린다
            while desired.is_empty() {
                match cmd_rx.recv().await {
                    Some(FeedCommand::Subscribe(gem_id)) => {
                        desired.insert(gem_id);
                    }
                    Some(FeedCommand::Unsubscribe(_)) | Some(FeedCommand::Reconnect) => {}
                    None => return,
                }
            }

            match self.session(&mut cmd_rx, &mut desired).await {
                Ok(SessionExit::Shutdown) => return,
                Ok(SessionExit::Reconnect) => {
                    self.connected.store(false, Ordering::Relaxed);
                    sleep(RECONNECT_DELAY).await;
                }
                Err(e) => {
                    self.connected.store(false, Ordering::Relaxed);
                    error!("{:<12} --> 접속 끊김: {}, 재접속 대기", "Feed", e);
                    sleep(RECONNECT_DELAY).await;
                }
            }
        }
    }

    /// 접속 하나의 수명. 종료 사유를 반환한다.
    async fn session(
        &self,
        cmd_rx: &mut mpsc::Receiver<FeedCommand>,
        desired: &mut HashSet<i64>,
    ) -> Result<SessionExit, String> {
        info!("{:<12} --> 접속 시도: {}", "Feed", self.ws_url);
        let (ws_stream, _) = connect_async(self.ws_url.as_str())
            .await
            .map_err(|e| e.to_string())?;
        self.connected.store(true, Ordering::Relaxed);
        info!("{:<12} --> 접속 성공", "Feed");

        let (mut write, mut read) = ws_stream.split();

        // 기존 구독 재전송
        for gem_id in desired.iter() {
            let msg = json!({ "action": "subscribe", "gemId": gem_id });
            write
                .send(Message::Text(msg.to_string()))
                .await
                .map_err(|e| e.to_string())?;
        }

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    let Some(cmd) = cmd else {
                        return Ok(SessionExit::Shutdown);
                    };
                    match cmd {
                        FeedCommand::Subscribe(gem_id) => {
                            if desired.insert(gem_id) {
                                let msg = json!({ "action": "subscribe", "gemId": gem_id });
                                let _ = write.send(Message::Text(msg.to_string())).await;
                            }
                        }
                        FeedCommand::Unsubscribe(gem_id) => {
                            if desired.remove(&gem_id) {
                                let msg = json!({ "action": "unsubscribe", "gemId": gem_id });
                                let _ = write.send(Message::Text(msg.to_string())).await;
                            }
                        }
                        FeedCommand::Reconnect => {
                            let _ = write.send(Message::Close(None)).await;
                            return Ok(SessionExit::Reconnect);
                        }
                    }
                }
                ws_msg = read.next() => {
                    let Some(ws_msg) = ws_msg else {
                        return Err("stream ended".to_string());
                    };
                    match ws_msg {
                        Ok(Message::Text(text)) => self.dispatch(&text),
                        Ok(Message::Ping(payload)) => {
                            let _ = write.send(Message::Pong(payload)).await;
                        }
                        Ok(Message::Close(frame)) => {
                            debug!("{:<12} --> 서버 측 종료: {:?}", "Feed", frame);
                            return Err("closed by server".to_string());
                        }
                        Ok(_) => {}
                        Err(e) => return Err(e.to_string()),
                    }
                }
            }
        }
    }

    /// 수신 프레임 → 구독자 전달. 해석 불가능한 프레임은 건너뛴다.
    fn dispatch(&self, text: &str) {
        let event = match serde_json::from_str::<AuctionEvent>(text) {
            Ok(event) => event,
            Err(e) => {
                debug!("{:<12} --> 해석 불가 프레임 무시: {}", "Feed", e);
                return;
            }
        };

        let subscribers = self.subscribers.lock().expect("lock");
        match subscribers.get(&event.gem_id()) {
            Some(tx) => {
                if tx.try_send(event).is_err() {
                    warn!("{:<12} --> 구독자 버퍼 포화, 이벤트 유실", "Feed");
                }
            }
            None => debug!(
                "{:<12} --> 구독자 없는 이벤트 폐기: gem {}",
                "Feed",
                event.gem_id()
            ),
        }
    }
}

// endregion: --- Feed Worker
