use chrono::{NaiveDate, NaiveTime};
use kernel::model::slot::Slot;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct SlotRow {
    pub slot_id: Uuid,
    pub slot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl From<SlotRow> for Slot {
    fn from(value: SlotRow) -> Self {
        let SlotRow {
            slot_id,
            slot_date,
            start_time,
            end_time,
        } = value;
        Slot {
            slot_id: slot_id.into(),
            slot_date,
            start_time,
            end_time,
        }
    }
}
