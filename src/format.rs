use chrono::{DateTime, Utc};

/// 고정 en-US/USD 통화 표기. 센트 정수 → "$1,234.56".
/// 사용자 로캘을 따르지 않는다 (계약 고정).
pub fn usd(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.abs();
    format!("{}${}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

/// 고정 en-US 날짜 표기 ("Jan 5, 2026, 3:04 PM")
pub fn short_datetime(ts: DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y, %-I:%M %p").to_string()
}

/// 천 단위 쉼표 구분
fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
