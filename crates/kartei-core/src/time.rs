use chrono::Utc;

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}
