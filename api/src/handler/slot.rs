use crate::{
    extractor::AuthenticatedActor,
    model::slot::{
        AvailableSlotsQuery, FindOrCreateSlotQuery, FindOrCreateSlotResponse, SlotRangeQuery,
        SlotsResponse,
    },
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Duration;
use kernel::model::{
    id::WorkspaceId, resource::ResourceRef, role::Operation, slot::event::CreateSlot,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn find_or_create_slot(
    actor: AuthenticatedActor,
    Query(query): Query<FindOrCreateSlotQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<FindOrCreateSlotResponse>> {
    let event = CreateSlot::new(query.date, query.start_time, query.end_time);
    event.ensure_valid_range()?;

    // 既存スロットの参照は誰でもできる
    if let Some(slot) = registry
        .slot_repository()
        .find_exact(query.date, query.start_time, query.end_time)
        .await?
    {
        return Ok(Json(FindOrCreateSlotResponse {
            slot: slot.into(),
            created: false,
        }));
    }

    // 新規作成は権限を持つロールに限る。
    // 学生は既存のスロットにしか予約を入れられない
    if !actor.role().permits(Operation::CreateSlot) {
        return Err(AppError::ForbiddenOperation);
    }

    let (slot, created) = registry.slot_repository().find_or_create(event).await?;
    Ok(Json(FindOrCreateSlotResponse {
        slot: slot.into(),
        created,
    }))
}

pub async fn show_slot_list(
    _actor: AuthenticatedActor,
    Query(query): Query<SlotRangeQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<SlotsResponse>> {
    // 範囲未指定の場合は今日から1週間分を返す
    let today = registry.clock().now().date_naive();
    let start_date = query.start_date.unwrap_or(today);
    let end_date = query.end_date.unwrap_or(today + Duration::days(7));
    if start_date > end_date {
        return Err(AppError::InvalidTimeRange(
            "開始日は終了日以前である必要があります。".into(),
        ));
    }

    registry
        .slot_repository()
        .list_in_range(start_date, end_date)
        .await
        .map(SlotsResponse::from)
        .map(Json)
}

pub async fn show_available_slots(
    _actor: AuthenticatedActor,
    Path(workspace_id): Path<WorkspaceId>,
    Query(query): Query<AvailableSlotsQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<SlotsResponse>> {
    // ワークスペースの存在確認
    registry
        .resource_repository()
        .find(ResourceRef::Workspace(workspace_id))
        .await?
        .ok_or_else(|| {
            AppError::EntityNotFound(format!(
                "ワークスペース（{workspace_id}）が見つかりませんでした。"
            ))
        })?;

    let date = query
        .date
        .unwrap_or_else(|| registry.clock().now().date_naive());

    registry
        .slot_repository()
        .list_free_for_workspace(workspace_id, date)
        .await
        .map(SlotsResponse::from)
        .map(Json)
}
