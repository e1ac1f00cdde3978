use crate::model::{
    booking::{BookingAction, BookingStatus},
    id::{BookingId, EquipmentId, SlotId, UserId, WorkspaceId},
    lab::Lab,
    resource::{ResourceKind, ResourceRef},
    user::User,
};
use chrono::NaiveDate;
use derive_new::new;

#[derive(Debug, new)]
pub struct CreateBooking {
    pub resource: ResourceRef,
    pub requested_by: UserId,
    pub slot_id: SlotId,
    pub purpose: String,
    pub project_name: Option<String>,
    pub notes: Option<String>,
    // ワークスペース予約のみ意味を持つ
    pub participants_count: Option<i32>,
}

#[derive(Debug, new)]
pub struct TransitionBooking {
    pub booking_id: BookingId,
    pub action: BookingAction,
    pub actor: User,
}

// カレンダー照会の絞り込み条件
#[derive(Debug, Clone, Copy)]
pub struct CalendarQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub resource_kind: Option<ResourceKind>,
    pub equipment_id: Option<EquipmentId>,
    pub workspace_id: Option<WorkspaceId>,
    pub status: Option<BookingStatus>,
    pub lab: Option<Lab>,
}
