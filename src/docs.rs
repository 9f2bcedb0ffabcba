// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::get_my_permissions,

        // --- Defects ---
        handlers::defects::list_defects,
        handlers::defects::create_defect,
        handlers::defects::get_defect,
        handlers::defects::update_defect,
        handlers::defects::update_defect_status,
        handlers::defects::delete_defect,
        handlers::defects::upload_defect_photo,
        handlers::defects::get_connectivity,
        handlers::defects::force_check_remote,
        handlers::defects::sync_pending,

        // --- Budget ---
        handlers::budget::list_items,
        handlers::budget::create_item,
        handlers::budget::update_item,
        handlers::budget::delete_item,
        handlers::budget::get_stats,
        handlers::budget::get_project_budget,

        // --- Tasks ---
        handlers::tasks::list_tasks,
        handlers::tasks::update_progress,
        handlers::tasks::get_schema,
        handlers::tasks::refresh_schema,

        // --- Projects / Plans ---
        handlers::projects::list_projects,
        handlers::projects::get_project,
        handlers::projects::create_project,
        handlers::projects::list_apartments,
        handlers::projects::create_apartment,
        handlers::projects::list_plans,
        handlers::projects::upload_plan,
        handlers::projects::delete_plan,

        // --- Materials ---
        handlers::materials::list_materials,
        handlers::materials::create_material,
        handlers::materials::receive_material,
        handlers::materials::issue_material,
        handlers::materials::correct_stock,
        handlers::materials::list_movements,

        // --- Reports ---
        handlers::reports::defect_report,
        handlers::reports::defect_report_pdf,
        handlers::budget::export_csv,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Auth / RBAC ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::rbac::UserRole,
            models::rbac::Permission,
            models::rbac::PermissionsResponse,

            // --- Defects ---
            models::defect::DefectStatus,
            models::defect::DefectDetailStatus,
            models::defect::Defect,
            models::defect::NewDefect,
            models::defect::DefectUpdate,
            models::defect::DefectStatusUpdate,
            models::defect::PersistenceMode,
            models::defect::ConnectivityStatus,
            models::defect::SyncReport,
            handlers::defects::DefectPhotoForm,

            // --- Budget ---
            models::budget::BudgetItemType,
            models::budget::BudgetItem,
            models::budget::CreateBudgetItemPayload,
            models::budget::UpdateBudgetItemPayload,
            models::budget::CategoryTotal,
            models::budget::BudgetStats,
            models::budget::ProjectBudget,

            // --- Tasks ---
            models::task::TaskStatus,
            models::task::Task,
            models::task::ColumnMapping,
            models::task::UpdateProgressPayload,

            // --- Projects ---
            models::project::Project,
            models::project::CreateProjectPayload,
            models::project::Apartment,
            models::project::CreateApartmentPayload,
            models::project::ArchitecturalPlan,
            models::project::PlanUploadForm,

            // --- Materials ---
            models::material::Material,
            models::material::MovementReason,
            models::material::MaterialMovement,
            models::material::CreateMaterialPayload,
            models::material::ReceiveMaterialPayload,
            models::material::IssueMaterialPayload,
            models::material::CorrectStockPayload,

            // --- Reports / Dashboard ---
            models::report::ApartmentDefectSummary,
            models::report::DefectReport,
            models::dashboard::DashboardSummary,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Permissões do Papel"),
        (name = "Defects", description = "Defeitos marcados na planta (persistência híbrida)"),
        (name = "Budget", description = "Receitas e Despesas das Obras"),
        (name = "Tasks", description = "Cronograma com mapeamento adaptativo de colunas"),
        (name = "Projects", description = "Obras e Apartamentos"),
        (name = "Plans", description = "Plantas Arquitetônicas"),
        (name = "Materials", description = "Almoxarifado"),
        (name = "Reports", description = "Relatórios e Exportações"),
        (name = "Dashboard", description = "Indicadores Gerenciais")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("api_jwt", SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)));
    }
}
