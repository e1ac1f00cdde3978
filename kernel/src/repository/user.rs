use crate::model::{id::UserId, user::User};
use async_trait::async_trait;
use shared::error::AppResult;

// ユーザーディレクトリ。ロール・所属ラボ・表示名の参照元であり、
// ユーザー自体の作成・更新はこのシステムの責務ではない
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, user_id: UserId) -> AppResult<Option<User>>;
}
