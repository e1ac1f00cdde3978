use crate::model::resource::{Resource, ResourceRef};
use async_trait::async_trait;
use shared::error::AppResult;

// リソースディレクトリ。機材・ワークスペースの状態・定員・所属ラボの参照元であり、
// リソース自体の管理（保守記録など）はこのシステムの責務ではない
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn find(&self, reference: ResourceRef) -> AppResult<Option<Resource>>;
}
