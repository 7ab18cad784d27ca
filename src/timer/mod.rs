// region:    --- Imports
use chrono::{DateTime, Utc};
use tokio::time::{interval, Duration};
use tracing::{debug, info};

// endregion: --- Imports

// region:    --- Phase Model

/// 종료 임박 판정 기준 (1시간)
pub const ENDING_SOON_MS: i64 = 3_600_000;

// 경매 단계. 벽시계가 경계를 지나면 앞으로만 진행한다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuctionPhase {
    NotStarted,
    Active,
    EndingSoon,
    Ended,
}

// 남은 시간 분해 (종료 시각 경과 후에는 전부 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeRemaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub total_ms: i64,
}

impl TimeRemaining {
    /// 목표 시각까지 남은 시간
    pub fn until(now: DateTime<Utc>, deadline: DateTime<Utc>) -> Self {
        let total_ms = (deadline - now).num_milliseconds().max(0);
        let total_secs = total_ms / 1000;
        Self {
            days: total_secs / 86_400,
            hours: total_secs / 3_600 % 24,
            minutes: total_secs / 60 % 60,
            seconds: total_secs % 60,
            total_ms,
        }
    }
}

/// 경계 통과 시 각각 1회만 발화되는 신호
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSignal {
    Started,
    Ended,
}

/// 1틱의 관측 결과
#[derive(Debug, Clone, PartialEq)]
pub struct TimerTick {
    pub phase: AuctionPhase,
    pub remaining: TimeRemaining,
    pub signals: Vec<TimerSignal>,
}

// endregion: --- Phase Model

// region:    --- Auction Timer

// 벽시계 기준 경매 단계 계산기.
// 시작/종료 경계 신호는 내부 플래그로 latch 되어 반복 틱에 재발화되지 않는다.
pub struct AuctionTimer {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    start_fired: bool,
    end_fired: bool,
}

impl AuctionTimer {
    pub fn new(start_time: DateTime<Utc>, end_time: DateTime<Utc>) -> Self {
        Self {
            start_time,
            end_time,
            start_fired: false,
            end_fired: false,
        }
    }

    /// 현재 시각과 두 경계 시각만의 순수 함수
    pub fn phase_at(&self, now: DateTime<Utc>) -> AuctionPhase {
        if now < self.start_time {
            AuctionPhase::NotStarted
        } else if now >= self.end_time {
            AuctionPhase::Ended
        } else if (self.end_time - now).num_milliseconds() <= ENDING_SOON_MS {
            AuctionPhase::EndingSoon
        } else {
            AuctionPhase::Active
        }
    }

    /// 1틱 진행: 남은 시간 재계산 + 경계 신호 latch.
    /// 시작 시각도 이미 지나 있으면 Started, Ended 순서로 함께 발화된다.
    pub fn tick(&mut self, now: DateTime<Utc>) -> TimerTick {
        let mut signals = Vec::new();
        if !self.start_fired && now >= self.start_time {
            self.start_fired = true;
            signals.push(TimerSignal::Started);
        }
        if !self.end_fired && now >= self.end_time {
            self.end_fired = true;
            signals.push(TimerSignal::Ended);
        }
        TimerTick {
            phase: self.phase_at(now),
            remaining: TimeRemaining::until(now, self.end_time),
            signals,
        }
    }

    pub fn ended(&self) -> bool {
        self.end_fired
    }

    /// 1초 간격 구동 루프. 드리프트 보정 없이 매 틱 벽시계를 다시 읽는다.
    /// 종료 신호 발화 후 루프를 빠져나온다.
    pub async fn run<F>(mut self, mut on_signal: F)
    where
        F: FnMut(TimerSignal, &TimerTick) + Send,
    {
        let mut ticker = interval(Duration::from_millis(1000));
        loop {
            ticker.tick().await;
            let tick = self.tick(Utc::now());
            debug!(
                "{:<12} --> 단계: {:?}, 남은 시간: {}ms",
                "Timer", tick.phase, tick.remaining.total_ms
            );
            for signal in tick.signals.clone() {
                info!("{:<12} --> 경계 신호 발화: {:?}", "Timer", signal);
                on_signal(signal, &tick);
            }
            if self.ended() {
                break;
            }
        }
    }
}

// endregion: --- Auction Timer
