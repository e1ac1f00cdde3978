use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use kernel::model::{id::UserId, role::Role, user::User};
use registry::AppRegistry;
use shared::error::AppError;
use uuid::Uuid;

// X-User-Id ヘッダの ID をユーザーディレクトリで解決した認証済みアクター。
// トークンの発行・検証は外部コラボレータの責務であり、ここでは扱わない
pub struct AuthenticatedActor(pub User);

impl AuthenticatedActor {
    pub fn id(&self) -> UserId {
        self.0.user_id
    }

    pub fn role(&self) -> Role {
        self.0.role
    }

    pub fn into_inner(self) -> User {
        self.0
    }
}

#[async_trait]
impl FromRequestParts<AppRegistry> for AuthenticatedActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        registry: &AppRegistry,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("X-User-Id")
            .and_then(|value| value.to_str().ok())
            .ok_or(AppError::UnauthenticatedError)?;
        let user_id = header
            .parse::<Uuid>()
            .map_err(|_| AppError::UnauthenticatedError)?;
        let user = registry
            .user_repository()
            .find_by_id(UserId::from(user_id))
            .await?
            .ok_or(AppError::UnauthenticatedError)?;
        Ok(Self(user))
    }
}
