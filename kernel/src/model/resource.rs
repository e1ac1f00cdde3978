use crate::model::{
    id::{EquipmentId, WorkspaceId},
    lab::Lab,
};
use shared::error::{AppError, AppResult};
use strum::{AsRefStr, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    Equipment,
    Workspace,
}

// 機材・ワークスペースのどちらかを指す参照。
// 予約エンジンはこのタグ付き参照だけを扱い、リソース種別ごとの分岐を持たない
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRef {
    Equipment(EquipmentId),
    Workspace(WorkspaceId),
}

impl ResourceRef {
    pub fn kind(self) -> ResourceKind {
        match self {
            ResourceRef::Equipment(_) => ResourceKind::Equipment,
            ResourceRef::Workspace(_) => ResourceKind::Workspace,
        }
    }

    pub fn raw(self) -> Uuid {
        match self {
            ResourceRef::Equipment(id) => id.raw(),
            ResourceRef::Workspace(id) => id.raw(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipmentStatus {
    Available,
    InUse,
    Maintenance,
    Shared,
}

#[derive(Debug, Clone)]
pub struct Equipment {
    pub equipment_id: EquipmentId,
    pub equipment_name: String,
    pub serial_number: String,
    pub status: EquipmentStatus,
    pub lab: Lab,
    pub location: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    pub workspace_id: WorkspaceId,
    pub workspace_name: String,
    pub description: Option<String>,
    pub capacity: i32,
    pub lab: Lab,
    pub location: Option<String>,
    pub is_active: bool,
}

// 予約エンジンから見た共通のリソース像
#[derive(Debug, Clone)]
pub enum Resource {
    Equipment(Equipment),
    Workspace(Workspace),
}

impl Resource {
    // 予約を受け付けられる状態かを確認する。
    // 機材は AVAILABLE / IN_USE のみ、ワークスペースは is_active のみ予約可
    pub fn ensure_bookable(&self) -> AppResult<()> {
        match self {
            Resource::Equipment(e) => match e.status {
                EquipmentStatus::Available | EquipmentStatus::InUse => Ok(()),
                _ => Err(AppError::ResourceUnavailable(format!(
                    "機材（{}）は現在予約できません（status = {}）。",
                    e.equipment_id,
                    e.status.as_ref()
                ))),
            },
            Resource::Workspace(w) => {
                if !w.is_active {
                    return Err(AppError::ResourceUnavailable(format!(
                        "ワークスペース（{}）は現在利用できません（is_active = false）。",
                        w.workspace_id
                    )));
                }
                Ok(())
            }
        }
    }

    // ワークスペースのみ定員チェックを行う。機材では常に通る
    pub fn ensure_capacity(&self, participants_count: i32) -> AppResult<()> {
        match self {
            Resource::Workspace(w) if participants_count > w.capacity => {
                Err(AppError::CapacityExceeded(format!(
                    "ワークスペース（{}）の定員（{}）を超えています（参加人数 = {}）。",
                    w.workspace_id, w.capacity, participants_count
                )))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equipment(status: EquipmentStatus) -> Resource {
        Resource::Equipment(Equipment {
            equipment_id: EquipmentId::new(),
            equipment_name: "Test Printer".into(),
            serial_number: "SN-0001".into(),
            status,
            lab: Lab::Ive,
            location: None,
        })
    }

    fn workspace(capacity: i32, is_active: bool) -> Resource {
        Resource::Workspace(Workspace {
            workspace_id: WorkspaceId::new(),
            workspace_name: "Test Bench".into(),
            description: None,
            capacity,
            lab: Lab::Cezeri,
            location: None,
            is_active,
        })
    }

    #[test]
    fn equipment_is_bookable_while_available_or_in_use() {
        assert!(equipment(EquipmentStatus::Available).ensure_bookable().is_ok());
        assert!(equipment(EquipmentStatus::InUse).ensure_bookable().is_ok());
        assert!(matches!(
            equipment(EquipmentStatus::Maintenance).ensure_bookable(),
            Err(AppError::ResourceUnavailable(_))
        ));
        assert!(matches!(
            equipment(EquipmentStatus::Shared).ensure_bookable(),
            Err(AppError::ResourceUnavailable(_))
        ));
    }

    #[test]
    fn inactive_workspace_is_not_bookable() {
        assert!(workspace(4, true).ensure_bookable().is_ok());
        assert!(matches!(
            workspace(4, false).ensure_bookable(),
            Err(AppError::ResourceUnavailable(_))
        ));
    }

    #[test]
    fn capacity_check_rejects_only_when_exceeded() {
        let w = workspace(4, true);
        assert!(w.ensure_capacity(1).is_ok());
        assert!(w.ensure_capacity(4).is_ok());
        assert!(matches!(
            w.ensure_capacity(5),
            Err(AppError::CapacityExceeded(_))
        ));
    }

    #[test]
    fn capacity_check_never_applies_to_equipment() {
        assert!(equipment(EquipmentStatus::Available)
            .ensure_capacity(100)
            .is_ok());
    }
}
