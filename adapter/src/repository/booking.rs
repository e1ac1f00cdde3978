use crate::database::{
    model::{
        booking::{BookingHeadRow, BookingRow, CalendarEventRow},
        slot::SlotRow,
    },
    ConnectionPool,
};
use crate::repository::resource::fetch_resource;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use derive_new::new;
use kernel::model::{
    booking::{
        authorize_transition,
        event::{CalendarQuery, CreateBooking, TransitionBooking},
        Availability, Booking, BookingStatus, CalendarEvent,
    },
    id::BookingId,
    resource::{ResourceKind, ResourceRef},
    slot::Slot,
    user::BookingScope,
};
use kernel::repository::booking::BookingRepository;
use shared::clock::Clock;
use shared::error::{AppError, AppResult};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

#[derive(new)]
pub struct BookingRepositoryImpl {
    db: ConnectionPool,
    clock: Arc<dyn Clock>,
}

#[async_trait]
impl BookingRepository for BookingRepositoryImpl {
    // 予約操作を行う
    async fn create(&self, event: CreateBooking) -> AppResult<BookingId> {
        let kind = event.resource.kind();
        let mut tx = self.db.begin().await?;

        // トランザクション分離レベルを SERIALIZABLE に設定する
        self.set_transaction_serializable(&mut tx).await?;

        // 事前のチェックとして、以下を順に調べる。最初の失敗で打ち切る。
        // ① リソースが存在し、予約を受け付けられる状態か
        // ② （ワークスペースのみ）参加人数が定員以内か
        // ③ スロットが存在し、開始時刻が過去でないか
        // ④ 同一スロットを占有する有効な予約が無いか
        // ⑤ 時間帯の重なる別スロットの有効な予約が無いか
        //
        // すべて通過した場合のみ、このブロック以降の INSERT に進む
        {
            let resource = fetch_resource(&mut *tx, event.resource)
                .await?
                .ok_or_else(|| {
                    AppError::EntityNotFound(format!(
                        "リソース（{}）が見つかりませんでした。",
                        event.resource.raw()
                    ))
                })?;
            resource.ensure_bookable()?;
            resource.ensure_capacity(event.participants_count.unwrap_or(1))?;

            let slot_row: Option<SlotRow> = sqlx::query_as(
                r#"
                    SELECT slot_id, slot_date, start_time, end_time
                    FROM booking_slots
                    WHERE slot_id = $1
                "#,
            )
            .bind(event.slot_id.raw())
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            let slot = slot_row.map(Slot::from).ok_or_else(|| {
                AppError::EntityNotFound(format!(
                    "スロット（{}）が見つかりませんでした。",
                    event.slot_id
                ))
            })?;

            if slot.starts_at() < self.clock.now().naive_utc() {
                return Err(AppError::InvalidTimeRange(
                    "過去に開始するスロットは予約できません。".into(),
                ));
            }

            let occupied: Option<Uuid> = sqlx::query_scalar(&format!(
                r#"
                    SELECT booking_id
                    FROM {ledger}
                    WHERE {col} = $1
                      AND slot_id = $2
                      AND status IN ('PENDING', 'APPROVED')
                    LIMIT 1
                "#,
                ledger = ledger_table(kind),
                col = resource_column(kind),
            ))
            .bind(event.resource.raw())
            .bind(event.slot_id.raw())
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if occupied.is_some() {
                return Err(AppError::SlotAlreadyBooked(format!(
                    "リソース（{}）の指定スロットにはすでに予約が存在します。",
                    event.resource.raw()
                )));
            }

            // 同一リソースの有効な予約のうち、同日のものを取り出して時間帯の交差を調べる。
            // 重複条件：existing.start < new.end AND new.start < existing.end
            let booked_slots: Vec<SlotRow> = sqlx::query_as(&format!(
                r#"
                    SELECT s.slot_id, s.slot_date, s.start_time, s.end_time
                    FROM {ledger} AS b
                    INNER JOIN booking_slots AS s ON b.slot_id = s.slot_id
                    WHERE b.{col} = $1
                      AND b.status IN ('PENDING', 'APPROVED')
                      AND s.slot_date = $2
                "#,
                ledger = ledger_table(kind),
                col = resource_column(kind),
            ))
            .bind(event.resource.raw())
            .bind(slot.slot_date)
            .fetch_all(&mut *tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if booked_slots
                .into_iter()
                .map(Slot::from)
                .any(|booked| booked.overlaps(&slot))
            {
                return Err(AppError::SlotAlreadyBooked(format!(
                    "リソース（{}）には時間帯の重なる予約がすでに存在します。",
                    event.resource.raw()
                )));
            }
        }

        // 予約処理を行う、すなわち該当する台帳にレコードを追加する
        let booking_id = BookingId::new();
        let res = match event.resource {
            ResourceRef::Equipment(equipment_id) => sqlx::query(
                r#"
                    INSERT INTO equipment_bookings
                    (booking_id, equipment_id, user_id, slot_id,
                    status, purpose, project_name, notes)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(booking_id.raw())
            .bind(equipment_id.raw())
            .bind(event.requested_by.raw())
            .bind(event.slot_id.raw())
            .bind(BookingStatus::Pending.as_ref())
            .bind(&event.purpose)
            .bind(&event.project_name)
            .bind(&event.notes)
            .execute(&mut *tx)
            .await,
            ResourceRef::Workspace(workspace_id) => sqlx::query(
                r#"
                    INSERT INTO workspace_bookings
                    (booking_id, workspace_id, user_id, slot_id,
                    status, purpose, project_name, notes, participants_count)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(booking_id.raw())
            .bind(workspace_id.raw())
            .bind(event.requested_by.raw())
            .bind(event.slot_id.raw())
            .bind(BookingStatus::Pending.as_ref())
            .bind(&event.purpose)
            .bind(&event.project_name)
            .bind(&event.notes)
            .bind(event.participants_count.unwrap_or(1))
            .execute(&mut *tx)
            .await,
        }
        .map_err(translate_unique_violation)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been created".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        Ok(booking_id)
    }

    // 状態遷移操作を行う
    async fn transition(&self, event: TransitionBooking) -> AppResult<Booking> {
        let mut tx = self.db.begin().await?;

        // 対象行に行ロックをかけて現在の状態を読む。
        // どちらの台帳の予約かはここで確定する
        let Some((kind, head)) = self.find_head_for_update(&mut tx, event.booking_id).await?
        else {
            return Err(AppError::EntityNotFound(format!(
                "予約（{}）が見つかりませんでした。",
                event.booking_id
            )));
        };

        let current = BookingStatus::from_str(&head.status).map_err(|_| {
            AppError::ConversionEntityError(format!("不正な予約状態です: {}", head.status))
        })?;

        // 認可と遷移前条件の検証。失敗した場合は更新せずに戻る
        let next = authorize_transition(event.action, current, &event.actor, head.user_id.into())?;

        // approve / reject の場合のみ実行者を approved_by に記録する
        let approver: Option<Uuid> = event
            .action
            .records_approver()
            .then(|| event.actor.user_id.raw());

        let res = sqlx::query(&format!(
            r#"
                UPDATE {ledger}
                SET status = $1,
                    approved_by = COALESCE($2::uuid, approved_by),
                    updated_at = CURRENT_TIMESTAMP
                WHERE booking_id = $3
            "#,
            ledger = ledger_table(kind),
        ))
        .bind(next.as_ref())
        .bind(approver)
        .bind(event.booking_id.raw())
        .execute(&mut *tx)
        .await
        .map_err(AppError::SpecificOperationError)?;

        if res.rows_affected() < 1 {
            return Err(AppError::NoRowsAffectedError(
                "No booking record has been updated".into(),
            ));
        }

        tx.commit().await.map_err(AppError::TransactionError)?;

        // 表示用の結合情報を含めて更新後の予約を取り直す
        self.find_by_id(event.booking_id).await?.ok_or_else(|| {
            AppError::EntityNotFound(format!(
                "予約（{}）が見つかりませんでした。",
                event.booking_id
            ))
        })
    }

    async fn find_by_id(&self, booking_id: BookingId) -> AppResult<Option<Booking>> {
        for kind in [ResourceKind::Equipment, ResourceKind::Workspace] {
            let row: Option<BookingRow> = sqlx::query_as(&format!(
                "{} WHERE b.booking_id = $1",
                booking_select(kind)
            ))
            .bind(booking_id.raw())
            .fetch_optional(self.db.inner_ref())
            .await
            .map_err(AppError::SpecificOperationError)?;

            if let Some(row) = row {
                return row.into_booking(kind).map(Some);
            }
        }
        Ok(None)
    }

    async fn find_visible(
        &self,
        scope: BookingScope,
        status: Option<BookingStatus>,
    ) -> AppResult<Vec<Booking>> {
        let (own_user, scope_lab) = scope_binds(&scope);
        let status: Option<&'static str> = status.map(Into::into);

        let mut bookings = Vec::new();
        for kind in [ResourceKind::Equipment, ResourceKind::Workspace] {
            let sql = format!(
                r#"
                    {select}
                    WHERE ($1::uuid IS NULL OR b.user_id = $1)
                      AND ($2::text IS NULL OR {lab_col} = $2)
                      AND ($3::text IS NULL OR b.status = $3)
                "#,
                select = booking_select(kind),
                lab_col = lab_column(kind),
            );
            let rows: Vec<BookingRow> = sqlx::query_as(&sql)
                .bind(own_user)
                .bind(scope_lab)
                .bind(status)
                .fetch_all(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;
            for row in rows {
                bookings.push(row.into_booking(kind)?);
            }
        }

        // 両台帳を統合した上で時系列に並べ直す
        bookings.sort_by_key(|b| (b.slot.slot_date, b.slot.start_time, b.created_at));
        Ok(bookings)
    }

    async fn events_in_range(
        &self,
        query: CalendarQuery,
        scope: BookingScope,
    ) -> AppResult<Vec<CalendarEvent>> {
        let (own_user, scope_lab) = scope_binds(&scope);
        let status: Option<&'static str> = query.status.map(Into::into);
        let filter_lab: Option<&'static str> = query.lab.map(Into::into);

        let mut events = Vec::new();
        for kind in [ResourceKind::Equipment, ResourceKind::Workspace] {
            // リソース種別で絞り込まれている場合、対象外の台帳は読まない。
            // 片方の台帳だけに個別 ID が指定されている場合も同様に扱う
            if query.resource_kind.is_some_and(|k| k != kind) {
                continue;
            }
            let other_ledger_targeted = match kind {
                ResourceKind::Equipment => {
                    query.workspace_id.is_some() && query.equipment_id.is_none()
                }
                ResourceKind::Workspace => {
                    query.equipment_id.is_some() && query.workspace_id.is_none()
                }
            };
            if other_ledger_targeted {
                continue;
            }
            let resource_filter = match kind {
                ResourceKind::Equipment => query.equipment_id.map(|id| id.raw()),
                ResourceKind::Workspace => query.workspace_id.map(|id| id.raw()),
            };
            let sql = format!(
                r#"
                    {select}
                    WHERE s.slot_date BETWEEN $1 AND $2
                      AND ($3::uuid IS NULL OR b.{resource_col} = $3)
                      AND ($4::text IS NULL OR b.status = $4)
                      AND ($5::text IS NULL OR {lab_col} = $5)
                      AND ($6::uuid IS NULL OR b.user_id = $6)
                      AND ($7::text IS NULL OR {lab_col} = $7)
                "#,
                select = event_select(kind),
                resource_col = resource_column(kind),
                lab_col = lab_column(kind),
            );
            let rows: Vec<CalendarEventRow> = sqlx::query_as(&sql)
                .bind(query.start_date)
                .bind(query.end_date)
                .bind(resource_filter)
                .bind(status)
                .bind(filter_lab)
                .bind(own_user)
                .bind(scope_lab)
                .fetch_all(self.db.inner_ref())
                .await
                .map_err(AppError::SpecificOperationError)?;
            for row in rows {
                events.push(row.into_event(kind)?);
            }
        }

        events.sort_by_key(|e| (e.slot_date, e.start_time));
        Ok(events)
    }

    async fn is_available(
        &self,
        reference: ResourceRef,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> AppResult<Availability> {
        if window_start >= window_end {
            return Err(AppError::InvalidTimeRange(
                "開始時刻は終了時刻より前である必要があります。".into(),
            ));
        }

        // ① リソースの存在と状態の確認。予約作成時の検証と同じ規則で判定する
        let resource = fetch_resource(self.db.inner_ref(), reference)
            .await?
            .ok_or_else(|| {
                AppError::EntityNotFound(format!(
                    "リソース（{}）が見つかりませんでした。",
                    reference.raw()
                ))
            })?;
        match resource.ensure_bookable() {
            Err(AppError::ResourceUnavailable(reason)) => {
                return Ok(Availability::Unavailable { reason });
            }
            Err(e) => return Err(e),
            Ok(()) => {}
        }

        // ② 窓に含まれる日付の有効な予約を取り出し、時間帯の交差を調べる
        let kind = reference.kind();
        let rows: Vec<SlotRow> = sqlx::query_as(&format!(
            r#"
                SELECT s.slot_id, s.slot_date, s.start_time, s.end_time
                FROM {ledger} AS b
                INNER JOIN booking_slots AS s ON b.slot_id = s.slot_id
                WHERE b.{col} = $1
                  AND b.status IN ('PENDING', 'APPROVED')
                  AND s.slot_date BETWEEN $2 AND $3
            "#,
            ledger = ledger_table(kind),
            col = resource_column(kind),
        ))
        .bind(reference.raw())
        .bind(window_start.date())
        .bind(window_end.date())
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        let conflict = rows
            .into_iter()
            .map(Slot::from)
            .find(|slot| slot.intersects_window(window_start, window_end));

        Ok(match conflict {
            Some(slot) => Availability::Unavailable {
                reason: format!(
                    "指定時間帯（{} {}〜{}）にはすでに予約が存在します。",
                    slot.slot_date, slot.start_time, slot.end_time
                ),
            },
            None => Availability::Available,
        })
    }
}

impl BookingRepositoryImpl {
    // create メソッドでのトランザクションを利用するにあたり
    // トランザクション分離レベルを SERIALIZABLE にするために
    // 内部的に使うメソッド
    async fn set_transaction_serializable(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    ) -> AppResult<()> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;
        Ok(())
    }

    // 予約 ID がどちらの台帳に属するかを調べつつ、該当行をロックする
    async fn find_head_for_update(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        booking_id: BookingId,
    ) -> AppResult<Option<(ResourceKind, BookingHeadRow)>> {
        for kind in [ResourceKind::Equipment, ResourceKind::Workspace] {
            let row: Option<BookingHeadRow> = sqlx::query_as(&format!(
                r#"
                    SELECT booking_id, user_id, status
                    FROM {ledger}
                    WHERE booking_id = $1
                    FOR UPDATE
                "#,
                ledger = ledger_table(kind),
            ))
            .bind(booking_id.raw())
            .fetch_optional(&mut **tx)
            .await
            .map_err(AppError::SpecificOperationError)?;

            if let Some(row) = row {
                return Ok(Some((kind, row)));
            }
        }
        Ok(None)
    }
}

// 競合に負けて部分一意インデックス違反になった場合は
// SlotAlreadyBooked に読み替えて返す
fn translate_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = e {
        if db_err.is_unique_violation() {
            return AppError::SlotAlreadyBooked(
                "同じリソース・スロットの予約が直前に作成されました。".into(),
            );
        }
    }
    AppError::SpecificOperationError(e)
}

fn scope_binds(scope: &BookingScope) -> (Option<Uuid>, Option<&'static str>) {
    match scope {
        BookingScope::All => (None, None),
        BookingScope::Own(user_id) => (Some(user_id.raw()), None),
        BookingScope::Lab(lab) => (None, Some((*lab).into())),
    }
}

fn ledger_table(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Equipment => "equipment_bookings",
        ResourceKind::Workspace => "workspace_bookings",
    }
}

fn resource_column(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Equipment => "equipment_id",
        ResourceKind::Workspace => "workspace_id",
    }
}

fn lab_column(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Equipment => "e.lab",
        ResourceKind::Workspace => "w.lab",
    }
}

fn booking_select(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Equipment => {
            r#"
                SELECT
                b.booking_id,
                b.equipment_id AS resource_id,
                e.equipment_name AS resource_name,
                e.lab,
                b.user_id,
                u.user_name,
                b.slot_id,
                s.slot_date,
                s.start_time,
                s.end_time,
                b.status,
                b.purpose,
                b.project_name,
                b.notes,
                NULL::INTEGER AS participants_count,
                b.approved_by,
                b.created_at,
                b.updated_at
                FROM equipment_bookings AS b
                INNER JOIN equipment AS e ON b.equipment_id = e.equipment_id
                INNER JOIN users AS u ON b.user_id = u.user_id
                INNER JOIN booking_slots AS s ON b.slot_id = s.slot_id
            "#
        }
        ResourceKind::Workspace => {
            r#"
                SELECT
                b.booking_id,
                b.workspace_id AS resource_id,
                w.workspace_name AS resource_name,
                w.lab,
                b.user_id,
                u.user_name,
                b.slot_id,
                s.slot_date,
                s.start_time,
                s.end_time,
                b.status,
                b.purpose,
                b.project_name,
                b.notes,
                b.participants_count,
                b.approved_by,
                b.created_at,
                b.updated_at
                FROM workspace_bookings AS b
                INNER JOIN workspaces AS w ON b.workspace_id = w.workspace_id
                INNER JOIN users AS u ON b.user_id = u.user_id
                INNER JOIN booking_slots AS s ON b.slot_id = s.slot_id
            "#
        }
    }
}

fn event_select(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Equipment => {
            r#"
                SELECT
                b.booking_id,
                b.equipment_id AS resource_id,
                e.equipment_name AS resource_name,
                e.lab,
                b.user_id,
                u.user_name,
                s.slot_date,
                s.start_time,
                s.end_time,
                b.status
                FROM equipment_bookings AS b
                INNER JOIN equipment AS e ON b.equipment_id = e.equipment_id
                INNER JOIN users AS u ON b.user_id = u.user_id
                INNER JOIN booking_slots AS s ON b.slot_id = s.slot_id
            "#
        }
        ResourceKind::Workspace => {
            r#"
                SELECT
                b.booking_id,
                b.workspace_id AS resource_id,
                w.workspace_name AS resource_name,
                w.lab,
                b.user_id,
                u.user_name,
                s.slot_date,
                s.start_time,
                s.end_time,
                b.status
                FROM workspace_bookings AS b
                INNER JOIN workspaces AS w ON b.workspace_id = w.workspace_id
                INNER JOIN users AS u ON b.user_id = u.user_id
                INNER JOIN booking_slots AS s ON b.slot_id = s.slot_id
            "#
        }
    }
}
