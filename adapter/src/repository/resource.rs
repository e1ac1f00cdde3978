use crate::database::{
    model::resource::{EquipmentRow, WorkspaceRow},
    ConnectionPool,
};
use async_trait::async_trait;
use derive_new::new;
use kernel::model::resource::{Resource, ResourceRef};
use kernel::repository::resource::ResourceRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct ResourceRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl ResourceRepository for ResourceRepositoryImpl {
    async fn find(&self, reference: ResourceRef) -> AppResult<Option<Resource>> {
        fetch_resource(self.db.inner_ref(), reference).await
    }
}

// 予約作成時はトランザクション内から同じ読み取りを行う必要があるため、
// エグゼキュータを受け取る自由関数として公開する
pub(crate) async fn fetch_resource<'a, E>(
    executor: E,
    reference: ResourceRef,
) -> AppResult<Option<Resource>>
where
    E: sqlx::PgExecutor<'a>,
{
    match reference {
        ResourceRef::Equipment(equipment_id) => {
            let row: Option<EquipmentRow> = sqlx::query_as(
                r#"
                    SELECT equipment_id, equipment_name, serial_number, status, lab, location
                    FROM equipment
                    WHERE equipment_id = $1
                "#,
            )
            .bind(equipment_id.raw())
            .fetch_optional(executor)
            .await
            .map_err(AppError::SpecificOperationError)?;
            row.map(|row| row.try_into().map(Resource::Equipment))
                .transpose()
        }
        ResourceRef::Workspace(workspace_id) => {
            let row: Option<WorkspaceRow> = sqlx::query_as(
                r#"
                    SELECT workspace_id, workspace_name, description, capacity,
                           lab, location, is_active
                    FROM workspaces
                    WHERE workspace_id = $1
                "#,
            )
            .bind(workspace_id.raw())
            .fetch_optional(executor)
            .await
            .map_err(AppError::SpecificOperationError)?;
            row.map(|row| row.try_into().map(Resource::Workspace))
                .transpose()
        }
    }
}
