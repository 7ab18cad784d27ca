use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 입찰 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BidStatus {
    Active,
    Outbid,
    Winning,
    Finalized,
    Cancelled,
}

// 분쟁 처리 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisputeResolution {
    Approved,
    Cancelled,
}

// 입찰 모델 (금액은 USD 센트 단위 정수)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    pub id: i64,
    pub gem_id: i64,
    pub amount: i64,
    pub bidder_id: i64,
    pub bidder_display_name: String,
    pub timestamp: DateTime<Utc>,
    pub status: BidStatus,
    pub is_proxy: bool,
    #[serde(default)]
    pub proxy_max_amount: Option<i64>,
    pub disputed: bool,
    #[serde(default)]
    pub dispute_resolution: Option<DisputeResolution>,
    #[serde(default)]
    pub dispute_notes: Option<String>,
}

// 사용자 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Buyer,
    Seller,
    Admin,
    Unverified,
}

impl UserRole {
    /// 입찰 가능 역할 여부
    pub fn can_bid(self) -> bool {
        matches!(self, UserRole::Buyer | UserRole::Seller | UserRole::Admin)
    }
}

// 인증된 사용자
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub user_id: i64,
    pub display_name: String,
    pub role: UserRole,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// 해당 입찰이 본인 것인지 여부
    pub fn owns(&self, bid: &Bid) -> bool {
        self.user_id == bid.bidder_id
    }
}

// 페이지 단위 입찰 목록
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidPage {
    pub bids: Vec<Bid>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}
