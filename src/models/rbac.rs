// src/models/rbac.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Papéis do canteiro (espelha o enum `user_role` do Postgres)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Client,      // Cliente / comprador
    Foreman,     // Mestre de obras
    Contractor,  // Empreiteiro
    Worker,      // Operário
    Storekeeper, // Almoxarife
    Technadzor,  // Fiscalização técnica
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Permission {
    #[serde(rename = "defects:read")]
    DefectsRead,
    #[serde(rename = "defects:write")]
    DefectsWrite,
    #[serde(rename = "defects:status")]
    DefectsStatus,
    #[serde(rename = "defects:delete")]
    DefectsDelete,
    #[serde(rename = "defects:sync")]
    DefectsSync,
    #[serde(rename = "budget:read")]
    BudgetRead,
    #[serde(rename = "budget:write")]
    BudgetWrite,
    #[serde(rename = "tasks:read")]
    TasksRead,
    #[serde(rename = "tasks:write")]
    TasksWrite,
    #[serde(rename = "materials:read")]
    MaterialsRead,
    #[serde(rename = "materials:write")]
    MaterialsWrite,
    #[serde(rename = "plans:read")]
    PlansRead,
    #[serde(rename = "plans:write")]
    PlansWrite,
    #[serde(rename = "projects:write")]
    ProjectsWrite,
    #[serde(rename = "reports:read")]
    ReportsRead,
    #[serde(rename = "dashboard:read")]
    DashboardRead,
}

impl Permission {
    pub const ALL: [Permission; 16] = [
        Permission::DefectsRead,
        Permission::DefectsWrite,
        Permission::DefectsStatus,
        Permission::DefectsDelete,
        Permission::DefectsSync,
        Permission::BudgetRead,
        Permission::BudgetWrite,
        Permission::TasksRead,
        Permission::TasksWrite,
        Permission::MaterialsRead,
        Permission::MaterialsWrite,
        Permission::PlansRead,
        Permission::PlansWrite,
        Permission::ProjectsWrite,
        Permission::ReportsRead,
        Permission::DashboardRead,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            Permission::DefectsRead => "defects:read",
            Permission::DefectsWrite => "defects:write",
            Permission::DefectsStatus => "defects:status",
            Permission::DefectsDelete => "defects:delete",
            Permission::DefectsSync => "defects:sync",
            Permission::BudgetRead => "budget:read",
            Permission::BudgetWrite => "budget:write",
            Permission::TasksRead => "tasks:read",
            Permission::TasksWrite => "tasks:write",
            Permission::MaterialsRead => "materials:read",
            Permission::MaterialsWrite => "materials:write",
            Permission::PlansRead => "plans:read",
            Permission::PlansWrite => "plans:write",
            Permission::ProjectsWrite => "projects:write",
            Permission::ReportsRead => "reports:read",
            Permission::DashboardRead => "dashboard:read",
        }
    }
}

impl UserRole {
    /// Matriz de acesso: o que cada papel pode fazer no sistema.
    pub fn can(self, permission: Permission) -> bool {
        use Permission::*;
        use UserRole::*;

        match permission {
            DefectsRead | TasksRead | PlansRead => true,
            DefectsWrite => matches!(self, Client | Foreman | Technadzor),
            DefectsStatus => matches!(self, Foreman | Contractor | Technadzor),
            DefectsDelete | DefectsSync | PlansWrite => matches!(self, Foreman | Technadzor),
            BudgetRead => matches!(self, Client | Foreman | Contractor),
            BudgetWrite | ProjectsWrite => self == Foreman,
            TasksWrite => matches!(self, Foreman | Contractor | Worker),
            MaterialsRead => matches!(self, Foreman | Contractor | Worker | Storekeeper),
            MaterialsWrite => self == Storekeeper,
            ReportsRead => matches!(self, Client | Foreman | Technadzor),
            DashboardRead => matches!(self, Client | Foreman),
        }
    }

    pub fn permissions(self) -> Vec<Permission> {
        Permission::ALL.into_iter().filter(|p| self.can(*p)).collect()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsResponse {
    pub role: UserRole,
    pub permissions: Vec<Permission>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn everyone_reads_defects_plans_and_tasks() {
        for role in [
            UserRole::Client,
            UserRole::Foreman,
            UserRole::Contractor,
            UserRole::Worker,
            UserRole::Storekeeper,
            UserRole::Technadzor,
        ] {
            assert!(role.can(Permission::DefectsRead));
            assert!(role.can(Permission::PlansRead));
            assert!(role.can(Permission::TasksRead));
        }
    }

    #[test]
    fn only_storekeeper_moves_stock() {
        assert!(UserRole::Storekeeper.can(Permission::MaterialsWrite));
        assert!(!UserRole::Foreman.can(Permission::MaterialsWrite));
        assert!(UserRole::Foreman.can(Permission::MaterialsRead));
        assert!(!UserRole::Client.can(Permission::MaterialsRead));
    }

    #[test]
    fn contractor_fixes_but_does_not_delete_defects() {
        assert!(UserRole::Contractor.can(Permission::DefectsStatus));
        assert!(!UserRole::Contractor.can(Permission::DefectsDelete));
        assert!(!UserRole::Contractor.can(Permission::DefectsWrite));
    }

    #[test]
    fn permission_serializes_as_slug() {
        for p in Permission::ALL {
            assert_eq!(serde_json::to_value(p).unwrap(), p.slug());
        }
        assert_eq!(serde_json::to_value(UserRole::Technadzor).unwrap(), "technadzor");
    }

    #[test]
    fn worker_permission_list() {
        let perms = UserRole::Worker.permissions();
        assert!(perms.contains(&Permission::TasksWrite));
        assert!(!perms.contains(&Permission::BudgetRead));
    }
}
