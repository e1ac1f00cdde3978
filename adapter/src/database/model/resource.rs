use kernel::model::{
    lab::Lab,
    resource::{Equipment, EquipmentStatus, Workspace},
};
use shared::error::AppError;
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct EquipmentRow {
    pub equipment_id: Uuid,
    pub equipment_name: String,
    pub serial_number: String,
    pub status: String,
    pub lab: String,
    pub location: Option<String>,
}

impl TryFrom<EquipmentRow> for Equipment {
    type Error = AppError;

    fn try_from(value: EquipmentRow) -> Result<Self, Self::Error> {
        let EquipmentRow {
            equipment_id,
            equipment_name,
            serial_number,
            status,
            lab,
            location,
        } = value;
        let status = EquipmentStatus::from_str(&status).map_err(|_| {
            AppError::ConversionEntityError(format!("不正な機材ステータスです: {status}"))
        })?;
        let lab = Lab::from_str(&lab)
            .map_err(|_| AppError::ConversionEntityError(format!("不正なラボです: {lab}")))?;
        Ok(Equipment {
            equipment_id: equipment_id.into(),
            equipment_name,
            serial_number,
            status,
            lab,
            location,
        })
    }
}

#[derive(Debug, FromRow)]
pub struct WorkspaceRow {
    pub workspace_id: Uuid,
    pub workspace_name: String,
    pub description: Option<String>,
    pub capacity: i32,
    pub lab: String,
    pub location: Option<String>,
    pub is_active: bool,
}

impl TryFrom<WorkspaceRow> for Workspace {
    type Error = AppError;

    fn try_from(value: WorkspaceRow) -> Result<Self, Self::Error> {
        let WorkspaceRow {
            workspace_id,
            workspace_name,
            description,
            capacity,
            lab,
            location,
            is_active,
        } = value;
        let lab = Lab::from_str(&lab)
            .map_err(|_| AppError::ConversionEntityError(format!("不正なラボです: {lab}")))?;
        Ok(Workspace {
            workspace_id: workspace_id.into(),
            workspace_name,
            description,
            capacity,
            lab,
            location,
            is_active,
        })
    }
}
