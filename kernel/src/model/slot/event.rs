use chrono::{NaiveDate, NaiveTime};
use derive_new::new;
use shared::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, new)]
pub struct CreateSlot {
    pub slot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl CreateSlot {
    // start_time < end_time を満たさない時間帯は登録させない
    pub fn ensure_valid_range(&self) -> AppResult<()> {
        if self.start_time >= self.end_time {
            return Err(AppError::InvalidTimeRange(format!(
                "開始時刻（{}）は終了時刻（{}）より前である必要があります。",
                self.start_time, self.end_time
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_reversed_and_empty_ranges() {
        let date: NaiveDate = "2025-06-01".parse().unwrap();
        let nine: NaiveTime = "09:00:00".parse().unwrap();
        let ten: NaiveTime = "10:00:00".parse().unwrap();

        assert!(CreateSlot::new(date, nine, ten).ensure_valid_range().is_ok());
        assert!(matches!(
            CreateSlot::new(date, ten, nine).ensure_valid_range(),
            Err(AppError::InvalidTimeRange(_))
        ));
        assert!(matches!(
            CreateSlot::new(date, nine, nine).ensure_valid_range(),
            Err(AppError::InvalidTimeRange(_))
        ));
    }
}
