use crate::model::{
    id::UserId,
    lab::Lab,
    role::{Operation, Role},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub user_id: UserId,
    pub user_name: String,
    pub email: String,
    pub role: Role,
    pub lab: Option<Lab>,
}

// 予約に表示用として紐づくユーザー情報
#[derive(Debug, Clone)]
pub struct BookingUser {
    pub user_id: UserId,
    pub user_name: String,
}

// 一覧系エンドポイントに一律で適用する可視範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingScope {
    All,
    Lab(Lab),
    Own(UserId),
}

impl User {
    // 管理者・ラボ管理者は全件、技術員は自ラボのリソースの予約、
    // 学生は自分の予約のみ閲覧できる。
    // 所属ラボを持たない技術員は自分の予約のみにフォールバックする
    pub fn booking_scope(&self) -> BookingScope {
        if self.role.permits(Operation::ViewAllBookings) {
            return BookingScope::All;
        }
        match (self.role, self.lab) {
            (Role::Technician, Some(lab)) => BookingScope::Lab(lab),
            _ => BookingScope::Own(self.user_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, lab: Option<Lab>) -> User {
        User {
            user_id: UserId::new(),
            user_name: "test user".into(),
            email: "test@example.com".into(),
            role,
            lab,
        }
    }

    #[test]
    fn admin_and_lab_manager_see_everything() {
        assert_eq!(user(Role::Admin, None).booking_scope(), BookingScope::All);
        assert_eq!(
            user(Role::LabManager, Some(Lab::Ive)).booking_scope(),
            BookingScope::All
        );
    }

    #[test]
    fn technician_sees_own_lab() {
        assert_eq!(
            user(Role::Technician, Some(Lab::Cezeri)).booking_scope(),
            BookingScope::Lab(Lab::Cezeri)
        );
    }

    #[test]
    fn technician_without_lab_falls_back_to_own_bookings() {
        let u = user(Role::Technician, None);
        assert_eq!(u.booking_scope(), BookingScope::Own(u.user_id));
    }

    #[test]
    fn student_sees_only_own_bookings() {
        let u = user(Role::Student, Some(Lab::Medtech));
        assert_eq!(u.booking_scope(), BookingScope::Own(u.user_id));
    }
}
