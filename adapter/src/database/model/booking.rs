use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use kernel::model::{
    booking::{status_color, BookedResource, Booking, BookingStatus, CalendarEvent},
    lab::Lab,
    resource::{ResourceKind, ResourceRef},
    slot::Slot,
    user::BookingUser,
};
use shared::error::AppError;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

// 両台帳共通の形で予約一行を取得する際に使う型。
// 機材側の SELECT では participants_count に NULL を埋める
#[derive(Debug, FromRow)]
pub struct BookingRow {
    pub booking_id: Uuid,
    pub resource_id: Uuid,
    pub resource_name: String,
    pub lab: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub slot_id: Uuid,
    pub slot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub purpose: String,
    pub project_name: Option<String>,
    pub notes: Option<String>,
    pub participants_count: Option<i32>,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// From トレイトの実装の代わりに、どちらの台帳から来た行かを
// 引数で受け取る into_booking メソッドを定義し実装する
impl BookingRow {
    pub fn into_booking(self, kind: ResourceKind) -> Result<Booking, AppError> {
        let BookingRow {
            booking_id,
            resource_id,
            resource_name,
            lab,
            user_id,
            user_name,
            slot_id,
            slot_date,
            start_time,
            end_time,
            status,
            purpose,
            project_name,
            notes,
            participants_count,
            approved_by,
            created_at,
            updated_at,
        } = self;
        let status = BookingStatus::from_str(&status).map_err(|_| {
            AppError::ConversionEntityError(format!("不正な予約状態です: {status}"))
        })?;
        let lab = Lab::from_str(&lab)
            .map_err(|_| AppError::ConversionEntityError(format!("不正なラボです: {lab}")))?;
        Ok(Booking {
            booking_id: booking_id.into(),
            resource: BookedResource {
                reference: resource_ref(kind, resource_id),
                resource_name,
                lab,
            },
            requested_by: BookingUser {
                user_id: user_id.into(),
                user_name,
            },
            slot: Slot {
                slot_id: slot_id.into(),
                slot_date,
                start_time,
                end_time,
            },
            status,
            purpose,
            project_name,
            notes,
            participants_count,
            approved_by: approved_by.map(Into::into),
            created_at,
            updated_at,
        })
    }
}

// カレンダー照会用の行。status は文字列のまま運び、色の確定は変換時に行う
#[derive(Debug, FromRow)]
pub struct CalendarEventRow {
    pub booking_id: Uuid,
    pub resource_id: Uuid,
    pub resource_name: String,
    pub lab: String,
    pub user_id: Uuid,
    pub user_name: String,
    pub slot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
}

impl CalendarEventRow {
    pub fn into_event(self, kind: ResourceKind) -> Result<CalendarEvent, AppError> {
        let CalendarEventRow {
            booking_id,
            resource_id,
            resource_name,
            lab,
            user_id,
            user_name,
            slot_date,
            start_time,
            end_time,
            status,
        } = self;
        let lab = Lab::from_str(&lab)
            .map_err(|_| AppError::ConversionEntityError(format!("不正なラボです: {lab}")))?;
        let color = status_color(&status);
        Ok(CalendarEvent {
            booking_id: booking_id.into(),
            resource: BookedResource {
                reference: resource_ref(kind, resource_id),
                resource_name,
                lab,
            },
            user_id: user_id.into(),
            user_name,
            slot_date,
            start_time,
            end_time,
            status,
            color,
        })
    }
}

// 状態遷移の前に行ロック付きで読む最小限の行
#[derive(Debug, FromRow)]
pub struct BookingHeadRow {
    pub booking_id: Uuid,
    pub user_id: Uuid,
    pub status: String,
}

fn resource_ref(kind: ResourceKind, resource_id: Uuid) -> ResourceRef {
    match kind {
        ResourceKind::Equipment => ResourceRef::Equipment(resource_id.into()),
        ResourceKind::Workspace => ResourceRef::Workspace(resource_id.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> BookingRow {
        BookingRow {
            booking_id: Uuid::new_v4(),
            resource_id: Uuid::new_v4(),
            resource_name: "Laser Cutter".into(),
            lab: "IVE".into(),
            user_id: Uuid::new_v4(),
            user_name: "test user".into(),
            slot_id: Uuid::new_v4(),
            slot_date: "2025-06-01".parse().unwrap(),
            start_time: "09:00:00".parse().unwrap(),
            end_time: "10:00:00".parse().unwrap(),
            status: status.into(),
            purpose: "prototype".into(),
            project_name: None,
            notes: None,
            participants_count: None,
            approved_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn stored_row_converts_into_a_booking() {
        let booking = row("PENDING").into_booking(ResourceKind::Equipment).unwrap();
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.resource.lab, Lab::Ive);
        assert!(matches!(
            booking.resource.reference,
            ResourceRef::Equipment(_)
        ));
    }

    #[test]
    fn corrupt_status_is_a_conversion_error() {
        assert!(matches!(
            row("ARCHIVED").into_booking(ResourceKind::Equipment),
            Err(AppError::ConversionEntityError(_))
        ));
    }

    #[test]
    fn calendar_event_keeps_the_raw_status_and_resolves_the_color() {
        let event = CalendarEventRow {
            booking_id: Uuid::new_v4(),
            resource_id: Uuid::new_v4(),
            resource_name: "Meeting Pod".into(),
            lab: "CEZERI".into(),
            user_id: Uuid::new_v4(),
            user_name: "test user".into(),
            slot_date: "2025-06-01".parse().unwrap(),
            start_time: "09:00:00".parse().unwrap(),
            end_time: "10:00:00".parse().unwrap(),
            status: "APPROVED".into(),
        }
        .into_event(ResourceKind::Workspace)
        .unwrap();
        assert_eq!(event.status, "APPROVED");
        assert_eq!(event.color, "#4CAF50");
    }
}
