// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::rbac::Permission,
};

/// O que é uma permissão exigida por um handler.
pub trait PermissionDef: Send + Sync + 'static {
    const PERMISSION: Permission;
}

/// Guardião: rejeita com 403 quando o papel do token não tem a permissão.
/// A matriz papel -> permissão é estática, então não há consulta ao banco.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let Ok(locale) = Locale::from_request_parts(parts, state).await;

        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !user.0.role.can(T::PERMISSION) {
            tracing::debug!("🚫 {:?} sem permissão {}", user.0.role, T::PERMISSION.slug());
            return Err(AppError::Forbidden(T::PERMISSION.slug()).to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permission_types {
    ($($name:ident => $perm:ident),* $(,)?) => {
        $(
            pub struct $name;
            impl PermissionDef for $name {
                const PERMISSION: Permission = Permission::$perm;
            }
        )*
    };
}

permission_types! {
    PermDefectsRead => DefectsRead,
    PermDefectsWrite => DefectsWrite,
    PermDefectsStatus => DefectsStatus,
    PermDefectsDelete => DefectsDelete,
    PermDefectsSync => DefectsSync,
    PermBudgetRead => BudgetRead,
    PermBudgetWrite => BudgetWrite,
    PermTasksRead => TasksRead,
    PermTasksWrite => TasksWrite,
    PermMaterialsRead => MaterialsRead,
    PermMaterialsWrite => MaterialsWrite,
    PermPlansRead => PlansRead,
    PermPlansWrite => PlansWrite,
    PermProjectsWrite => ProjectsWrite,
    PermReportsRead => ReportsRead,
    PermDashboardRead => DashboardRead,
}
