use crate::model::{
    id::{SlotId, WorkspaceId},
    slot::{event::CreateSlot, Slot},
};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use shared::error::AppResult;

#[async_trait]
pub trait SlotRepository: Send + Sync {
    // (日付, 開始, 終了) の完全一致でスロットを探す
    async fn find_exact(
        &self,
        slot_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> AppResult<Option<Slot>>;

    async fn find_by_id(&self, slot_id: SlotId) -> AppResult<Option<Slot>>;

    // 同一キーのスロットがあればそれを、無ければ作成して返す。
    // 返り値の bool は新規作成したかどうか
    async fn find_or_create(&self, event: CreateSlot) -> AppResult<(Slot, bool)>;

    // 期間内のスロット一覧（両端を含む）。日付・開始時刻順に並べる
    async fn list_in_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<Vec<Slot>>;

    // 指定ワークスペースの指定日で、有効な予約に占有されていないスロット一覧
    async fn list_free_for_workspace(
        &self,
        workspace_id: WorkspaceId,
        on: NaiveDate,
    ) -> AppResult<Vec<Slot>>;
}
