use crate::model::{
    id::{BookingId, UserId},
    lab::Lab,
    resource::ResourceRef,
    role::Operation,
    slot::Slot,
    user::{BookingUser, User},
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use shared::error::{AppError, AppResult};
use std::str::FromStr;
use strum::{AsRefStr, EnumString, IntoStaticStr};

pub mod event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl BookingStatus {
    // 終端状態（そこからの遷移が存在しない状態）かどうか
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BookingStatus::Rejected | BookingStatus::Cancelled | BookingStatus::Completed
        )
    }

    pub fn display_color(self) -> &'static str {
        match self {
            BookingStatus::Pending => "#FFC107",
            BookingStatus::Approved => "#4CAF50",
            BookingStatus::Rejected => "#F44336",
            BookingStatus::Cancelled => "#9E9E9E",
            BookingStatus::Completed => "#2196F3",
        }
    }
}

// 保存されている状態文字列から表示色を引く。未知の値は紫を返す
pub fn status_color(status: &str) -> &'static str {
    BookingStatus::from_str(status)
        .map(BookingStatus::display_color)
        .unwrap_or("#9C27B0")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    Approve,
    Reject,
    Cancel,
    Complete,
}

impl BookingAction {
    fn required_operation(self) -> Operation {
        match self {
            BookingAction::Approve => Operation::ApproveBooking,
            BookingAction::Reject => Operation::RejectBooking,
            BookingAction::Cancel => Operation::CancelAnyBooking,
            BookingAction::Complete => Operation::CompleteBooking,
        }
    }

    // 遷移元として認められる状態
    fn allowed_from(self) -> &'static [BookingStatus] {
        match self {
            BookingAction::Approve | BookingAction::Reject => &[BookingStatus::Pending],
            BookingAction::Cancel => &[BookingStatus::Pending, BookingStatus::Approved],
            BookingAction::Complete => &[BookingStatus::Approved],
        }
    }

    pub fn target_status(self) -> BookingStatus {
        match self {
            BookingAction::Approve => BookingStatus::Approved,
            BookingAction::Reject => BookingStatus::Rejected,
            BookingAction::Cancel => BookingStatus::Cancelled,
            BookingAction::Complete => BookingStatus::Completed,
        }
    }

    // この操作で実行者を approved_by として記録するか
    pub fn records_approver(self) -> bool {
        matches!(self, BookingAction::Approve | BookingAction::Reject)
    }
}

// 認可と遷移前条件を検証し、遷移後の状態を返す。
// どちらかに失敗した場合、呼び出し側は一切状態を変更してはならない
pub fn authorize_transition(
    action: BookingAction,
    current: BookingStatus,
    actor: &User,
    owner: UserId,
) -> AppResult<BookingStatus> {
    // 認可チェック。Cancel は予約の所有者にも許可する
    let permitted = match action {
        BookingAction::Cancel => {
            actor.user_id == owner || actor.role.permits(Operation::CancelAnyBooking)
        }
        _ => actor.role.permits(action.required_operation()),
    };
    if !permitted {
        return Err(AppError::ForbiddenOperation);
    }

    // 現在の状態が遷移元として妥当かチェック。エラーには現在の状態を含める
    if !action.allowed_from().contains(&current) {
        return Err(AppError::InvalidTransition(format!(
            "現在の状態（{}）からこの操作はできません。",
            current.as_ref()
        )));
    }

    Ok(action.target_status())
}

// 予約に紐づくリソース（機材 or ワークスペース）の表示用情報
#[derive(Debug, Clone)]
pub struct BookedResource {
    pub reference: ResourceRef,
    pub resource_name: String,
    pub lab: Lab,
}

#[derive(Debug, Clone)]
pub struct Booking {
    pub booking_id: BookingId,
    pub resource: BookedResource,
    pub requested_by: BookingUser,
    pub slot: Slot,
    pub status: BookingStatus,
    pub purpose: String,
    pub project_name: Option<String>,
    pub notes: Option<String>,
    pub participants_count: Option<i32>,
    pub approved_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// カレンダー表示用に両台帳を統合したイベント。
// status は保存されている文字列のまま持ち、色はここで確定させる
#[derive(Debug, Clone)]
pub struct CalendarEvent {
    pub booking_id: BookingId,
    pub resource: BookedResource,
    pub user_id: UserId,
    pub user_name: String,
    pub slot_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub status: String,
    pub color: &'static str,
}

// 空き照会の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    Available,
    Unavailable { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::role::Role;

    fn actor(role: Role) -> User {
        User {
            user_id: UserId::new(),
            user_name: "actor".into(),
            email: "actor@example.com".into(),
            role,
            lab: Some(Lab::Ive),
        }
    }

    #[test]
    fn approvers_can_approve_and_reject_pending_bookings() {
        let owner = UserId::new();
        for role in [Role::Admin, Role::LabManager, Role::Technician] {
            let a = actor(role);
            assert_eq!(
                authorize_transition(BookingAction::Approve, BookingStatus::Pending, &a, owner)
                    .unwrap(),
                BookingStatus::Approved
            );
            assert_eq!(
                authorize_transition(BookingAction::Reject, BookingStatus::Pending, &a, owner)
                    .unwrap(),
                BookingStatus::Rejected
            );
        }
    }

    #[test]
    fn students_cannot_approve() {
        let owner = UserId::new();
        let a = actor(Role::Student);
        assert!(matches!(
            authorize_transition(BookingAction::Approve, BookingStatus::Pending, &a, owner),
            Err(AppError::ForbiddenOperation)
        ));
    }

    #[test]
    fn approving_twice_fails_with_invalid_transition() {
        let owner = UserId::new();
        let a = actor(Role::Technician);
        assert!(matches!(
            authorize_transition(BookingAction::Approve, BookingStatus::Approved, &a, owner),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn owner_can_cancel_pending_and_approved() {
        let a = actor(Role::Student);
        for current in [BookingStatus::Pending, BookingStatus::Approved] {
            assert_eq!(
                authorize_transition(BookingAction::Cancel, current, &a, a.user_id).unwrap(),
                BookingStatus::Cancelled
            );
        }
    }

    #[test]
    fn non_owner_student_cannot_cancel() {
        let a = actor(Role::Student);
        let someone_else = UserId::new();
        assert!(matches!(
            authorize_transition(BookingAction::Cancel, BookingStatus::Approved, &a, someone_else),
            Err(AppError::ForbiddenOperation)
        ));
    }

    #[test]
    fn admin_can_cancel_someone_elses_booking_but_technician_cannot() {
        let owner = UserId::new();
        assert!(authorize_transition(
            BookingAction::Cancel,
            BookingStatus::Pending,
            &actor(Role::Admin),
            owner
        )
        .is_ok());
        assert!(matches!(
            authorize_transition(
                BookingAction::Cancel,
                BookingStatus::Pending,
                &actor(Role::Technician),
                owner
            ),
            Err(AppError::ForbiddenOperation)
        ));
    }

    #[test]
    fn complete_requires_approved_status() {
        let owner = UserId::new();
        let a = actor(Role::LabManager);
        assert_eq!(
            authorize_transition(BookingAction::Complete, BookingStatus::Approved, &a, owner)
                .unwrap(),
            BookingStatus::Completed
        );
        assert!(matches!(
            authorize_transition(BookingAction::Complete, BookingStatus::Pending, &a, owner),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn terminal_states_admit_no_transition_at_all() {
        let a = actor(Role::Admin);
        for current in [
            BookingStatus::Rejected,
            BookingStatus::Cancelled,
            BookingStatus::Completed,
        ] {
            assert!(current.is_terminal());
            for action in [
                BookingAction::Approve,
                BookingAction::Reject,
                BookingAction::Cancel,
                BookingAction::Complete,
            ] {
                assert!(matches!(
                    authorize_transition(action, current, &a, a.user_id),
                    Err(AppError::InvalidTransition(_))
                ));
            }
        }
    }

    #[test]
    fn authority_is_checked_before_the_precondition() {
        // 学生が終端状態の他人の予約をキャンセルしようとした場合、
        // InvalidTransition ではなく Forbidden になる
        let a = actor(Role::Student);
        assert!(matches!(
            authorize_transition(
                BookingAction::Cancel,
                BookingStatus::Completed,
                &a,
                UserId::new()
            ),
            Err(AppError::ForbiddenOperation)
        ));
    }

    #[test]
    fn only_approve_and_reject_record_the_approver() {
        assert!(BookingAction::Approve.records_approver());
        assert!(BookingAction::Reject.records_approver());
        assert!(!BookingAction::Cancel.records_approver());
        assert!(!BookingAction::Complete.records_approver());
    }

    #[test]
    fn status_colors_match_the_fixed_table() {
        assert_eq!(status_color("PENDING"), "#FFC107");
        assert_eq!(status_color("APPROVED"), "#4CAF50");
        assert_eq!(status_color("REJECTED"), "#F44336");
        assert_eq!(status_color("CANCELLED"), "#9E9E9E");
        assert_eq!(status_color("COMPLETED"), "#2196F3");
        assert_eq!(status_color("ARCHIVED"), "#9C27B0");
    }
}
