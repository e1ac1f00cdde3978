use kernel::model::{lab::Lab, role::Role, user::User};
use shared::error::AppError;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct UserRow {
    pub user_id: Uuid,
    pub user_name: String,
    pub email: String,
    pub role: String,
    pub lab: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    // role / lab は TEXT で保存されているため、ここで列挙型へ読み替える。
    // 未知の値はデータ破損としてエラーにする
    fn try_from(value: UserRow) -> Result<Self, Self::Error> {
        let UserRow {
            user_id,
            user_name,
            email,
            role,
            lab,
        } = value;
        let role = Role::from_str(&role)
            .map_err(|_| AppError::ConversionEntityError(format!("不正なロールです: {role}")))?;
        let lab = lab
            .map(|lab| {
                Lab::from_str(&lab)
                    .map_err(|_| AppError::ConversionEntityError(format!("不正なラボです: {lab}")))
            })
            .transpose()?;
        Ok(User {
            user_id: user_id.into(),
            user_name,
            email,
            role,
            lab,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str, lab: Option<&str>) -> UserRow {
        UserRow {
            user_id: Uuid::new_v4(),
            user_name: "test user".into(),
            email: "test@example.com".into(),
            role: role.into(),
            lab: lab.map(Into::into),
        }
    }

    #[test]
    fn converts_stored_role_and_lab() {
        let user = User::try_from(row("LAB_MANAGER", Some("MEDTECH"))).unwrap();
        assert_eq!(user.role, Role::LabManager);
        assert_eq!(user.lab, Some(Lab::Medtech));

        let user = User::try_from(row("STUDENT", None)).unwrap();
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.lab, None);
    }

    #[test]
    fn unknown_role_or_lab_is_a_conversion_error() {
        assert!(matches!(
            User::try_from(row("SUPERVISOR", None)),
            Err(AppError::ConversionEntityError(_))
        ));
        assert!(matches!(
            User::try_from(row("STUDENT", Some("MOON_BASE"))),
            Err(AppError::ConversionEntityError(_))
        ));
    }
}
