use crate::model::{
    booking::{
        event::{CalendarQuery, CreateBooking, TransitionBooking},
        Availability, Booking, BookingStatus, CalendarEvent,
    },
    id::BookingId,
    resource::ResourceRef,
    user::BookingScope,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use shared::error::AppResult;

#[async_trait]
pub trait BookingRepository: Send + Sync {
    // 予約を作成する。リソース状態・定員・スロット占有の検証と挿入を
    // 単一のシリアライザブルなトランザクションで行う
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId>;

    // 状態遷移を適用する。行ロックの上で認可と遷移前条件を検証してから更新する
    async fn transition(&self, event: TransitionBooking) -> AppResult<Booking>;

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>>;

    // 可視範囲と任意の状態フィルタで絞った一覧を時系列で返す
    async fn find_visible(
        &self,
        scope: BookingScope,
        status: Option<BookingStatus>,
    ) -> AppResult<Vec<Booking>>;

    // 期間内の両台帳のイベントを統合して時系列で返す
    async fn events_in_range(
        &self,
        query: CalendarQuery,
        scope: BookingScope,
    ) -> AppResult<Vec<CalendarEvent>>;

    // リソースが指定時間窓に空いているか。
    // 予約作成時の検証と同じ規則で判定する
    async fn is_available(
        &self,
        reference: ResourceRef,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> AppResult<Availability>;
}
