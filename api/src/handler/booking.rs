use crate::{
    extractor::AuthenticatedActor,
    model::booking::{
        AvailabilityQuery, AvailabilityResponse, BookingListQuery, BookingResponse,
        BookingsResponse, CalendarEventsQuery, CalendarEventsResponse, CreateBookingRequest,
    },
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use garde::Validate;
use kernel::model::{
    booking::{
        event::{CreateBooking, TransitionBooking},
        BookingAction,
    },
    id::{BookingId, SlotId},
    resource::ResourceRef,
    role::Operation,
    slot::event::CreateSlot,
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

pub async fn create_booking(
    actor: AuthenticatedActor,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateBookingRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate(&())?;

    let slot_id = resolve_slot(&actor, &registry, &req).await?;
    let resource = req.resource_ref();

    // 参加人数はワークスペース予約でのみ意味を持つ。機材側では無視する
    let participants_count = match resource {
        ResourceRef::Equipment(_) => None,
        ResourceRef::Workspace(_) => Some(req.participants_count.unwrap_or(1)),
    };

    let event = CreateBooking::new(
        resource,
        actor.id(),
        slot_id,
        req.purpose,
        req.project_name,
        req.notes,
        participants_count,
    );

    let booking_id = registry.booking_repository().create(event).await?;

    // 作成済みの予約を表示用情報込みで取り直して返す
    let booking = registry
        .booking_repository()
        .find_by_id(booking_id)
        .await?
        .ok_or_else(|| {
            AppError::EntityNotFound(format!("予約（{booking_id}）が見つかりませんでした。"))
        })?;

    Ok((StatusCode::CREATED, Json(BookingResponse::from(booking))))
}

// スロットは ID 指定か（日付・開始・終了）の組のどちらかで受け取る。
// 組で指定された場合は find_or_create と同じ規則で解決する
async fn resolve_slot(
    actor: &AuthenticatedActor,
    registry: &AppRegistry,
    req: &CreateBookingRequest,
) -> AppResult<SlotId> {
    match (req.slot_id, req.date, req.start_time, req.end_time) {
        (Some(slot_id), _, _, _) => {
            let slot = registry
                .slot_repository()
                .find_by_id(SlotId::from(slot_id))
                .await?
                .ok_or_else(|| {
                    AppError::EntityNotFound(format!("スロット（{slot_id}）が見つかりませんでした。"))
                })?;
            Ok(slot.slot_id)
        }
        (None, Some(date), Some(start_time), Some(end_time)) => {
            let event = CreateSlot::new(date, start_time, end_time);
            event.ensure_valid_range()?;

            match registry
                .slot_repository()
                .find_exact(date, start_time, end_time)
                .await?
            {
                Some(slot) => Ok(slot.slot_id),
                None => {
                    // 新規スロットの作成は権限を持つロールに限る
                    if !actor.role().permits(Operation::CreateSlot) {
                        return Err(AppError::ForbiddenOperation);
                    }
                    let (slot, _) = registry.slot_repository().find_or_create(event).await?;
                    Ok(slot.slot_id)
                }
            }
        }
        _ => Err(AppError::UnprocessableEntity(
            "slotId か（date, startTime, endTime）のいずれかを指定してください。".into(),
        )),
    }
}

pub async fn approve_booking(
    actor: AuthenticatedActor,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingResponse>> {
    transition_booking(actor, booking_id, BookingAction::Approve, registry).await
}

pub async fn reject_booking(
    actor: AuthenticatedActor,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingResponse>> {
    transition_booking(actor, booking_id, BookingAction::Reject, registry).await
}

pub async fn cancel_booking(
    actor: AuthenticatedActor,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingResponse>> {
    transition_booking(actor, booking_id, BookingAction::Cancel, registry).await
}

pub async fn complete_booking(
    actor: AuthenticatedActor,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingResponse>> {
    transition_booking(actor, booking_id, BookingAction::Complete, registry).await
}

// 認可と遷移前条件の検証はリポジトリ側で一括して行うため、
// 各ハンドラは操作の種類を渡すだけでよい
async fn transition_booking(
    actor: AuthenticatedActor,
    booking_id: BookingId,
    action: BookingAction,
    registry: AppRegistry,
) -> AppResult<Json<BookingResponse>> {
    let event = TransitionBooking::new(booking_id, action, actor.into_inner());
    registry
        .booking_repository()
        .transition(event)
        .await
        .map(BookingResponse::from)
        .map(Json)
}

pub async fn show_booking_list(
    actor: AuthenticatedActor,
    Query(query): Query<BookingListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingsResponse>> {
    let scope = actor.0.booking_scope();
    registry
        .booking_repository()
        .find_visible(scope, query.status.map(Into::into))
        .await
        .map(BookingsResponse::from)
        .map(Json)
}

pub async fn show_booking(
    _actor: AuthenticatedActor,
    Path(booking_id): Path<BookingId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<BookingResponse>> {
    registry
        .booking_repository()
        .find_by_id(booking_id)
        .await
        .and_then(|booking| match booking {
            Some(booking) => Ok(Json(booking.into())),
            None => Err(AppError::EntityNotFound(format!(
                "予約（{booking_id}）が見つかりませんでした。"
            ))),
        })
}

pub async fn show_calendar(
    actor: AuthenticatedActor,
    Query(query): Query<CalendarEventsQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<CalendarEventsResponse>> {
    if query.start > query.end {
        return Err(AppError::InvalidTimeRange(
            "開始日は終了日以前である必要があります。".into(),
        ));
    }

    let scope = actor.0.booking_scope();
    registry
        .booking_repository()
        .events_in_range(query.into(), scope)
        .await
        .map(CalendarEventsResponse::from)
        .map(Json)
}

pub async fn check_availability(
    _actor: AuthenticatedActor,
    Query(query): Query<AvailabilityQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<AvailabilityResponse>> {
    let reference = query.resource_ref();
    registry
        .booking_repository()
        .is_available(
            reference,
            query.start_time.naive_utc(),
            query.end_time.naive_utc(),
        )
        .await
        .map(AvailabilityResponse::from)
        .map(Json)
}
