use crate::database::{model::slot::SlotRow, ConnectionPool};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use derive_new::new;
use kernel::model::{
    id::{SlotId, WorkspaceId},
    slot::{event::CreateSlot, Slot},
};
use kernel::repository::slot::SlotRepository;
use shared::error::{AppError, AppResult};

#[derive(new)]
pub struct SlotRepositoryImpl {
    db: ConnectionPool,
}

#[async_trait]
impl SlotRepository for SlotRepositoryImpl {
    async fn find_exact(
        &self,
        slot_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> AppResult<Option<Slot>> {
        let row: Option<SlotRow> = sqlx::query_as(
            r#"
                SELECT slot_id, slot_date, start_time, end_time
                FROM booking_slots
                WHERE slot_date = $1 AND start_time = $2 AND end_time = $3
            "#,
        )
        .bind(slot_date)
        .bind(start_time)
        .bind(end_time)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Slot::from))
    }

    async fn find_by_id(&self, slot_id: SlotId) -> AppResult<Option<Slot>> {
        let row: Option<SlotRow> = sqlx::query_as(
            r#"
                SELECT slot_id, slot_date, start_time, end_time
                FROM booking_slots
                WHERE slot_id = $1
            "#,
        )
        .bind(slot_id.raw())
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(row.map(Slot::from))
    }

    async fn find_or_create(&self, event: CreateSlot) -> AppResult<(Slot, bool)> {
        event.ensure_valid_range()?;

        if let Some(slot) = self
            .find_exact(event.slot_date, event.start_time, event.end_time)
            .await?
        {
            return Ok((slot, false));
        }

        // 同じ組を同時に作成しようとした場合でも、一意制約によって
        // 一方だけが INSERT に成功する。負けた側は直後の再検索で拾う
        let inserted: Option<SlotRow> = sqlx::query_as(
            r#"
                INSERT INTO booking_slots (slot_date, start_time, end_time)
                VALUES ($1, $2, $3)
                ON CONFLICT (slot_date, start_time, end_time) DO NOTHING
                RETURNING slot_id, slot_date, start_time, end_time
            "#,
        )
        .bind(event.slot_date)
        .bind(event.start_time)
        .bind(event.end_time)
        .fetch_optional(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        match inserted {
            Some(row) => Ok((row.into(), true)),
            None => {
                let slot = self
                    .find_exact(event.slot_date, event.start_time, event.end_time)
                    .await?
                    .ok_or_else(|| {
                        AppError::NoRowsAffectedError(
                            "slot has been neither created nor found".into(),
                        )
                    })?;
                Ok((slot, false))
            }
        }
    }

    async fn list_in_range(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<Vec<Slot>> {
        let rows: Vec<SlotRow> = sqlx::query_as(
            r#"
                SELECT slot_id, slot_date, start_time, end_time
                FROM booking_slots
                WHERE slot_date BETWEEN $1 AND $2
                ORDER BY slot_date, start_time
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Slot::from).collect())
    }

    async fn list_free_for_workspace(
        &self,
        workspace_id: WorkspaceId,
        on: NaiveDate,
    ) -> AppResult<Vec<Slot>> {
        // 指定日の全スロットから、有効な予約に占有されているものを除外する
        let rows: Vec<SlotRow> = sqlx::query_as(
            r#"
                SELECT s.slot_id, s.slot_date, s.start_time, s.end_time
                FROM booking_slots AS s
                WHERE s.slot_date = $2
                  AND NOT EXISTS (
                      SELECT 1
                      FROM workspace_bookings AS b
                      WHERE b.slot_id = s.slot_id
                        AND b.workspace_id = $1
                        AND b.status IN ('PENDING', 'APPROVED')
                  )
                ORDER BY s.start_time
            "#,
        )
        .bind(workspace_id.raw())
        .bind(on)
        .fetch_all(self.db.inner_ref())
        .await
        .map_err(AppError::SpecificOperationError)?;

        Ok(rows.into_iter().map(Slot::from).collect())
    }
}
