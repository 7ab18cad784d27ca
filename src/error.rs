// region:    --- Imports
use serde::{Deserialize, Serialize};
use thiserror::Error;

// endregion: --- Imports

// region:    --- Error Kind

// 클라이언트에서 관측되는 오류 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Validation,
    Network,
    Permission,
    Auction,
    Server,
    Unknown,
}

impl ErrorKind {
    /// 재시도 대상 여부 — network/server 만 명시적 Retry 의 대상이다
    pub fn retryable(self) -> bool {
        matches!(self, ErrorKind::Network | ErrorKind::Server)
    }
}

// endregion: --- Error Kind

// region:    --- Error Envelope

/// 서버가 내려주는 구조화된 오류 봉투
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub retryable: Option<bool>,
}

// 입찰 서비스 호출 오류
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub code: Option<String>,
    pub field: Option<String>,
    pub message: String,
}

impl ServiceError {
    pub fn retryable(&self) -> bool {
        self.kind.retryable()
    }

    fn of(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            field: None,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::of(ErrorKind::Validation, message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::of(ErrorKind::Network, message)
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::of(ErrorKind::Permission, message)
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::of(ErrorKind::Server, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::of(ErrorKind::Unknown, message)
    }

    /// 구조화된 봉투 → 분류된 오류.
    /// 코드 매핑이 우선이고, 그 다음이 retryable 필드,
    /// 마지막으로 메시지 문자열 휴리스틱으로 떨어진다.
    pub fn from_envelope(envelope: ErrorEnvelope) -> Self {
        let kind = match envelope.code.as_deref().and_then(kind_for_code) {
            Some(kind) => kind,
            None => match envelope.retryable {
                Some(true) => ErrorKind::Server,
                _ => classify_message(&envelope.error),
            },
        };
        Self {
            kind,
            code: envelope.code,
            field: envelope.field,
            message: envelope.error,
        }
    }
}

// endregion: --- Error Envelope

// region:    --- Classification

/// 서버 오류 코드 → 분류 매핑
fn kind_for_code(code: &str) -> Option<ErrorKind> {
    match code {
        "LOW_BID" | "INVALID_AMOUNT" | "RESERVE_NOT_MET" => Some(ErrorKind::Validation),
        "NOT_STARTED" | "ALREADY_ENDED" | "ALREADY_FINALIZED" | "INVALID_STATUS" => {
            Some(ErrorKind::Auction)
        }
        "UNAUTHORIZED" | "FORBIDDEN" | "NOT_OWNER" => Some(ErrorKind::Permission),
        "INTERNAL" | "MAX_RETRIES_EXCEEDED" => Some(ErrorKind::Server),
        _ => None,
    }
}

/// 비구조화 메시지에 대한 대소문자 무시 부분 문자열 휴리스틱.
/// 레거시 응답 전용 폴백이며, 어느 패턴에도 맞지 않으면 Unknown.
pub fn classify_message(message: &str) -> ErrorKind {
    let lower = message.to_lowercase();
    let contains_any =
        |needles: &[&str]| needles.iter().any(|needle| lower.contains(needle));

    if contains_any(&["network", "timeout", "timed out", "connection", "fetch"]) {
        ErrorKind::Network
    } else if contains_any(&["permission", "unauthorized", "forbidden", "not allowed"]) {
        ErrorKind::Permission
    } else if contains_any(&["auction", "ended", "finalized", "closed"]) {
        ErrorKind::Auction
    } else if contains_any(&["invalid", "must be", "required", "minimum", "reserve", "at least"]) {
        ErrorKind::Validation
    } else if contains_any(&["server", "internal", "unavailable"]) {
        ErrorKind::Server
    } else {
        ErrorKind::Unknown
    }
}

// endregion: --- Classification
