// src/services/dashboard_service.rs

use crate::{
    common::error::AppError,
    db::DashboardRepository,
    models::dashboard::DashboardSummary,
    services::{
        budget_service::BudgetService, defect_service::DefectService,
        report_service::summarize_defects, task_service::TaskService,
    },
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    defect_service: DefectService,
    budget_service: BudgetService,
    task_service: TaskService,
}

impl DashboardService {
    pub fn new(
        repo: DashboardRepository,
        defect_service: DefectService,
        budget_service: BudgetService,
        task_service: TaskService,
    ) -> Self {
        Self { repo, defect_service, budget_service, task_service }
    }

    /// Agregados reais de toda a base (sem séries simuladas).
    pub async fn get_summary(&self) -> Result<DashboardSummary, AppError> {
        let counts = self.repo.get_counts().await?;
        let defects = summarize_defects(&self.defect_service.list_all().await?);
        let budget = self.budget_service.get_budget_stats(None).await?;
        let average_task_progress = self.task_service.average_progress().await?;

        Ok(DashboardSummary {
            project_count: counts.projects,
            apartment_count: counts.apartments,
            active_defects: defects.active,
            fixed_defects: defects.fixed,
            total_income: budget.total_income,
            total_expenses: budget.total_expenses,
            net_income: budget.net_income,
            low_stock_materials: counts.low_stock_materials,
            average_task_progress,
            defects_source: self.defect_service.mode().await,
        })
    }
}
