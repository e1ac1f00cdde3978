use crate::model::id::SlotId;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

pub mod event;

// 予約可能な離散時間帯。(日付, 開始, 終了) の組で一意であり、作成後は変更されない
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub slot_id: SlotId,
    pub slot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl Slot {
    pub fn starts_at(&self) -> NaiveDateTime {
        self.slot_date.and_time(self.start_time)
    }

    pub fn ends_at(&self) -> NaiveDateTime {
        self.slot_date.and_time(self.end_time)
    }

    // 同一リソースへの予約で時間帯が重なるかどうか。
    // 重複条件：existing.start < new.end AND new.start < existing.end
    pub fn overlaps(&self, other: &Slot) -> bool {
        self.slot_date == other.slot_date
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }

    // 指定の時間窓と交差するかどうか。窓は複数日・複数スロットにまたがってよい
    pub fn intersects_window(&self, window_start: NaiveDateTime, window_end: NaiveDateTime) -> bool {
        self.starts_at() < window_end && window_start < self.ends_at()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(date: &str, start: &str, end: &str) -> Slot {
        Slot {
            slot_id: SlotId::new(),
            slot_date: date.parse().unwrap(),
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
        }
    }

    #[test]
    fn overlapping_ranges_on_the_same_date_conflict() {
        let a = slot("2025-06-01", "09:00:00", "10:00:00");
        let b = slot("2025-06-01", "09:30:00", "10:30:00");
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_ranges_do_not_conflict() {
        let a = slot("2025-06-01", "09:00:00", "10:00:00");
        let b = slot("2025-06-01", "10:00:00", "11:00:00");
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn same_range_on_another_date_does_not_conflict() {
        let a = slot("2025-06-01", "09:00:00", "10:00:00");
        let b = slot("2025-06-02", "09:00:00", "10:00:00");
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn window_intersection_follows_half_open_semantics() {
        let a = slot("2025-06-01", "10:00:00", "11:00:00");

        let start = "2025-06-01T09:00:00".parse().unwrap();
        let end = "2025-06-01T10:00:00".parse().unwrap();
        assert!(!a.intersects_window(start, end));

        let start = "2025-06-01T10:30:00".parse().unwrap();
        let end = "2025-06-02T09:00:00".parse().unwrap();
        assert!(a.intersects_window(start, end));
    }

    #[test]
    fn window_spanning_multiple_days_catches_the_slot() {
        let a = slot("2025-06-03", "10:00:00", "11:00:00");
        let start = "2025-06-01T00:00:00".parse().unwrap();
        let end = "2025-06-07T23:59:59".parse().unwrap();
        assert!(a.intersects_window(start, end));
    }
}
