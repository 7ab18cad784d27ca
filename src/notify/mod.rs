// region:    --- Imports
use crate::error::{ErrorKind, ServiceError};
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, Mutex};
use tracing::debug;

// endregion: --- Imports

// region:    --- Notification Model

/// 알림 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error(ErrorKind),
}

// 알림 모델
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

// endregion: --- Notification Model

// region:    --- Notification Queue

// 단일 제공자 알림 큐.
// 컴포넌트마다 토스트 상태를 따로 들지 않고 복제 가능한 핸들 하나를 공유한다.
// 제거 경로는 명시적 dismiss 와 시한 만료(expire) 두 가지뿐이다.
#[derive(Clone, Default)]
pub struct NotificationQueue {
    inner: Arc<Mutex<QueueInner>>,
}

#[derive(Default)]
struct QueueInner {
    next_id: u64,
    entries: Vec<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// 알림 추가, 발급된 아이디 반환
    pub fn push(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        ttl: Option<Duration>,
    ) -> u64 {
        let now = Utc::now();
        let mut inner = self.inner.lock().expect("lock");
        inner.next_id += 1;
        let id = inner.next_id;
        inner.entries.push(Notification {
            id,
            kind,
            message: message.into(),
            created_at: now,
            expires_at: ttl.map(|ttl| now + ttl),
        });
        id
    }

    pub fn info(&self, message: impl Into<String>, ttl: Option<Duration>) -> u64 {
        self.push(NotificationKind::Info, message, ttl)
    }

    pub fn success(&self, message: impl Into<String>, ttl: Option<Duration>) -> u64 {
        self.push(NotificationKind::Success, message, ttl)
    }

    /// 서비스 오류를 분류 유지한 채 알림으로 전환
    pub fn error(&self, error: &ServiceError, ttl: Option<Duration>) -> u64 {
        self.push(NotificationKind::Error(error.kind), error.message.clone(), ttl)
    }

    /// 명시적 해제. 존재했으면 true.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut inner = self.inner.lock().expect("lock");
        let before = inner.entries.len();
        inner.entries.retain(|entry| entry.id != id);
        before != inner.entries.len()
    }

    /// 시한 경과 알림 일괄 제거, 제거 개수 반환
    pub fn expire(&self, now: DateTime<Utc>) -> usize {
        let mut inner = self.inner.lock().expect("lock");
        let before = inner.entries.len();
        inner
            .entries
            .retain(|entry| entry.expires_at.map(|at| at > now).unwrap_or(true));
        let removed = before - inner.entries.len();
        if removed > 0 {
            debug!("{:<12} --> 만료 알림 {}건 제거", "Notify", removed);
        }
        removed
    }

    /// 현재 활성 알림 (추가 순서 유지)
    pub fn active(&self) -> Vec<Notification> {
        self.inner.lock().expect("lock").entries.clone()
    }
}

// endregion: --- Notification Queue
