use crate::model::slot::SlotResponse;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use garde::Validate;
use kernel::model::{
    booking::{
        event::CalendarQuery, Availability, BookedResource, Booking, BookingStatus, CalendarEvent,
    },
    id::{BookingId, UserId},
    lab::Lab,
    resource::{ResourceKind, ResourceRef},
    user::BookingUser,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceTypeName {
    Equipment,
    Workspace,
}

impl From<ResourceTypeName> for ResourceKind {
    fn from(value: ResourceTypeName) -> Self {
        match value {
            ResourceTypeName::Equipment => Self::Equipment,
            ResourceTypeName::Workspace => Self::Workspace,
        }
    }
}

impl From<ResourceKind> for ResourceTypeName {
    fn from(value: ResourceKind) -> Self {
        match value {
            ResourceKind::Equipment => Self::Equipment,
            ResourceKind::Workspace => Self::Workspace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatusName {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl From<BookingStatusName> for BookingStatus {
    fn from(value: BookingStatusName) -> Self {
        match value {
            BookingStatusName::Pending => Self::Pending,
            BookingStatusName::Approved => Self::Approved,
            BookingStatusName::Rejected => Self::Rejected,
            BookingStatusName::Cancelled => Self::Cancelled,
            BookingStatusName::Completed => Self::Completed,
        }
    }
}

impl From<BookingStatus> for BookingStatusName {
    fn from(value: BookingStatus) -> Self {
        match value {
            BookingStatus::Pending => Self::Pending,
            BookingStatus::Approved => Self::Approved,
            BookingStatus::Rejected => Self::Rejected,
            BookingStatus::Cancelled => Self::Cancelled,
            BookingStatus::Completed => Self::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabName {
    Ive,
    Cezeri,
    Medtech,
}

impl From<LabName> for Lab {
    fn from(value: LabName) -> Self {
        match value {
            LabName::Ive => Self::Ive,
            LabName::Cezeri => Self::Cezeri,
            LabName::Medtech => Self::Medtech,
        }
    }
}

impl From<Lab> for LabName {
    fn from(value: Lab) -> Self {
        match value {
            Lab::Ive => Self::Ive,
            Lab::Cezeri => Self::Cezeri,
            Lab::Medtech => Self::Medtech,
        }
    }
}

// スロットは ID 指定か（日付・開始・終了）の組のどちらかで受け取る
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    #[garde(skip)]
    pub resource_type: ResourceTypeName,
    #[garde(skip)]
    pub resource_id: Uuid,
    #[garde(skip)]
    pub slot_id: Option<Uuid>,
    #[garde(skip)]
    pub date: Option<NaiveDate>,
    #[garde(skip)]
    pub start_time: Option<NaiveTime>,
    #[garde(skip)]
    pub end_time: Option<NaiveTime>,
    #[garde(length(min = 1))]
    pub purpose: String,
    #[garde(length(max = 200))]
    pub project_name: Option<String>,
    #[garde(skip)]
    pub notes: Option<String>,
    #[garde(range(min = 1))]
    pub participants_count: Option<i32>,
}

impl CreateBookingRequest {
    pub fn resource_ref(&self) -> ResourceRef {
        match self.resource_type {
            ResourceTypeName::Equipment => ResourceRef::Equipment(self.resource_id.into()),
            ResourceTypeName::Workspace => ResourceRef::Workspace(self.resource_id.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListQuery {
    pub status: Option<BookingStatusName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventsQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub resource_type: Option<ResourceTypeName>,
    pub equipment_id: Option<Uuid>,
    pub workspace_id: Option<Uuid>,
    pub status: Option<BookingStatusName>,
    pub lab: Option<LabName>,
}

impl From<CalendarEventsQuery> for CalendarQuery {
    fn from(value: CalendarEventsQuery) -> Self {
        let CalendarEventsQuery {
            start,
            end,
            resource_type,
            equipment_id,
            workspace_id,
            status,
            lab,
        } = value;
        CalendarQuery {
            start_date: start,
            end_date: end,
            resource_kind: resource_type.map(Into::into),
            equipment_id: equipment_id.map(Into::into),
            workspace_id: workspace_id.map(Into::into),
            status: status.map(Into::into),
            lab: lab.map(Into::into),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub resource_type: ResourceTypeName,
    pub resource_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl AvailabilityQuery {
    pub fn resource_ref(&self) -> ResourceRef {
        match self.resource_type {
            ResourceTypeName::Equipment => ResourceRef::Equipment(self.resource_id.into()),
            ResourceTypeName::Workspace => ResourceRef::Workspace(self.resource_id.into()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<Availability> for AvailabilityResponse {
    fn from(value: Availability) -> Self {
        match value {
            Availability::Available => Self {
                available: true,
                reason: None,
            },
            Availability::Unavailable { reason } => Self {
                available: false,
                reason: Some(reason),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking_id: BookingId,
    pub resource_type: ResourceTypeName,
    pub resource_id: Uuid,
    pub resource_name: String,
    pub lab: LabName,
    pub requested_by: UserId,
    pub user_name: String,
    pub slot: SlotResponse,
    pub status: BookingStatusName,
    pub purpose: String,
    pub project_name: Option<String>,
    pub notes: Option<String>,
    pub participants_count: Option<i32>,
    pub approved_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(value: Booking) -> Self {
        let Booking {
            booking_id,
            resource,
            requested_by,
            slot,
            status,
            purpose,
            project_name,
            notes,
            participants_count,
            approved_by,
            created_at,
            updated_at,
        } = value;
        let BookedResource {
            reference,
            resource_name,
            lab,
        } = resource;
        let BookingUser { user_id, user_name } = requested_by;
        Self {
            booking_id,
            resource_type: reference.kind().into(),
            resource_id: reference.raw(),
            resource_name,
            lab: lab.into(),
            requested_by: user_id,
            user_name,
            slot: slot.into(),
            status: status.into(),
            purpose,
            project_name,
            notes,
            participants_count,
            approved_by,
            created_at,
            updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingsResponse {
    pub items: Vec<BookingResponse>,
}

impl From<Vec<Booking>> for BookingsResponse {
    fn from(value: Vec<Booking>) -> Self {
        Self {
            items: value.into_iter().map(BookingResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventResponse {
    pub booking_id: BookingId,
    pub resource_type: ResourceTypeName,
    pub resource_id: Uuid,
    pub resource_name: String,
    pub lab: LabName,
    pub user_id: UserId,
    pub user_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub color: String,
}

impl From<CalendarEvent> for CalendarEventResponse {
    fn from(value: CalendarEvent) -> Self {
        let CalendarEvent {
            booking_id,
            resource,
            user_id,
            user_name,
            slot_date,
            start_time,
            end_time,
            status,
            color,
        } = value;
        let BookedResource {
            reference,
            resource_name,
            lab,
        } = resource;
        Self {
            booking_id,
            resource_type: reference.kind().into(),
            resource_id: reference.raw(),
            resource_name,
            lab: lab.into(),
            user_id,
            user_name,
            date: slot_date,
            start_time,
            end_time,
            status,
            color: color.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventsResponse {
    pub items: Vec<CalendarEventResponse>,
}

impl From<Vec<CalendarEvent>> for CalendarEventsResponse {
    fn from(value: Vec<CalendarEvent>) -> Self {
        Self {
            items: value.into_iter().map(CalendarEventResponse::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::model::slot::Slot;

    #[test]
    fn create_booking_request_accepts_the_wire_format() {
        let req: CreateBookingRequest = serde_json::from_str(
            r#"{
                "resourceType": "WORKSPACE",
                "resourceId": "6c9bd37e-4d22-4b3f-9f2e-45f3b5b2c111",
                "date": "2025-06-01",
                "startTime": "09:00:00",
                "endTime": "10:00:00",
                "purpose": "group project meeting",
                "participantsCount": 3
            }"#,
        )
        .unwrap();
        assert_eq!(req.resource_type, ResourceTypeName::Workspace);
        assert!(req.slot_id.is_none());
        assert_eq!(req.participants_count, Some(3));
        assert!(matches!(req.resource_ref(), ResourceRef::Workspace(_)));
    }

    #[test]
    fn calendar_event_response_carries_the_resolved_color() {
        let event = CalendarEvent {
            booking_id: BookingId::new(),
            resource: BookedResource {
                reference: ResourceRef::Equipment(Uuid::new_v4().into()),
                resource_name: "Laser Cutter".into(),
                lab: Lab::Ive,
            },
            user_id: UserId::new(),
            user_name: "test user".into(),
            slot_date: "2025-06-01".parse().unwrap(),
            start_time: "09:00:00".parse().unwrap(),
            end_time: "10:00:00".parse().unwrap(),
            status: "APPROVED".into(),
            color: "#4CAF50",
        };
        let response = CalendarEventResponse::from(event);
        assert_eq!(response.color, "#4CAF50");
        assert_eq!(response.resource_type, ResourceTypeName::Equipment);

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["status"], "APPROVED");
        assert_eq!(body["color"], "#4CAF50");
        assert_eq!(body["resourceType"], "EQUIPMENT");
    }

    #[test]
    fn booking_response_flattens_resource_and_requester() {
        let booking = Booking {
            booking_id: BookingId::new(),
            resource: BookedResource {
                reference: ResourceRef::Workspace(Uuid::new_v4().into()),
                resource_name: "Meeting Pod".into(),
                lab: Lab::Cezeri,
            },
            requested_by: BookingUser {
                user_id: UserId::new(),
                user_name: "test user".into(),
            },
            slot: Slot {
                slot_id: kernel::model::id::SlotId::new(),
                slot_date: "2025-06-01".parse().unwrap(),
                start_time: "09:00:00".parse().unwrap(),
                end_time: "10:00:00".parse().unwrap(),
            },
            status: BookingStatus::Pending,
            purpose: "workshop".into(),
            project_name: None,
            notes: None,
            participants_count: Some(2),
            approved_by: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let response = BookingResponse::from(booking);
        assert_eq!(response.status, BookingStatusName::Pending);
        assert_eq!(response.lab, LabName::Cezeri);

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["status"], "PENDING");
        assert_eq!(body["lab"], "CEZERI");
        assert_eq!(body["participantsCount"], 2);
    }
}
