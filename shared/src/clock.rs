use chrono::{DateTime, Utc};

// 現在時刻の取得元。ドメイン側で Utc::now() を直接呼ばず、
// 必ずこのトレイト経由で時刻を読むことで境界条件のテストを可能にする
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// テスト用に固定時刻を返す実装
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_always_returns_the_configured_instant() {
        let at = "2025-06-01T09:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let clock = FixedClock::new(at);
        assert_eq!(clock.now(), at);
        assert_eq!(clock.now(), at);
    }
}
