use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    LabManager,
    Technician,
    Student,
}

// 予約まわりでロールに付与される操作。
// 各エンジンはロールごとの判定を書かず、この集合への所属だけを確認する
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ApproveBooking,
    RejectBooking,
    CompleteBooking,
    CancelAnyBooking,
    CreateSlot,
    ViewAllBookings,
}

impl Role {
    pub fn granted_operations(self) -> &'static [Operation] {
        match self {
            Role::Admin | Role::LabManager => &[
                Operation::ApproveBooking,
                Operation::RejectBooking,
                Operation::CompleteBooking,
                Operation::CancelAnyBooking,
                Operation::CreateSlot,
                Operation::ViewAllBookings,
            ],
            Role::Technician => &[
                Operation::ApproveBooking,
                Operation::RejectBooking,
                Operation::CompleteBooking,
            ],
            Role::Student => &[],
        }
    }

    pub fn permits(self, operation: Operation) -> bool {
        self.granted_operations().contains(&operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_and_lab_manager_hold_every_operation() {
        for role in [Role::Admin, Role::LabManager] {
            assert!(role.permits(Operation::ApproveBooking));
            assert!(role.permits(Operation::RejectBooking));
            assert!(role.permits(Operation::CompleteBooking));
            assert!(role.permits(Operation::CancelAnyBooking));
            assert!(role.permits(Operation::CreateSlot));
            assert!(role.permits(Operation::ViewAllBookings));
        }
    }

    #[test]
    fn technician_cannot_create_slots_or_cancel_others() {
        assert!(Role::Technician.permits(Operation::ApproveBooking));
        assert!(Role::Technician.permits(Operation::RejectBooking));
        assert!(Role::Technician.permits(Operation::CompleteBooking));
        assert!(!Role::Technician.permits(Operation::CancelAnyBooking));
        assert!(!Role::Technician.permits(Operation::CreateSlot));
        assert!(!Role::Technician.permits(Operation::ViewAllBookings));
    }

    #[test]
    fn student_holds_no_operations() {
        assert!(Role::Student.granted_operations().is_empty());
    }

    #[test]
    fn role_round_trips_through_storage_representation() {
        use std::str::FromStr;

        assert_eq!(Role::LabManager.as_ref(), "LAB_MANAGER");
        assert_eq!(Role::from_str("LAB_MANAGER").unwrap(), Role::LabManager);
        assert!(Role::from_str("SUPERVISOR").is_err());
    }
}
