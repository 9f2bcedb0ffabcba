// src/services/budget_service.rs

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{csv, error::AppError},
    db::BudgetRepository,
    models::budget::{
        BudgetItem, BudgetItemType, BudgetStats, CategoryTotal, CreateBudgetItemPayload,
        ProjectBudget, UpdateBudgetItemPayload,
    },
};

pub const CSV_HEADER: [&str; 5] = ["date", "category", "description", "type", "amount"];

#[derive(Clone)]
pub struct BudgetService {
    repo: BudgetRepository,
}

impl BudgetService {
    pub fn new(repo: BudgetRepository) -> Self {
        Self { repo }
    }

    pub async fn get_all_budget_items(&self, project_id: Option<Uuid>) -> Result<Vec<BudgetItem>, AppError> {
        self.repo.get_all(project_id).await
    }

    pub async fn create_budget_item(&self, input: &CreateBudgetItemPayload) -> Result<BudgetItem, AppError> {
        let item = self.repo.create(input).await?;
        tracing::info!("💰 Lançamento {} ({}) criado em {}", item.id, item.item_type.as_str(), item.category);
        Ok(item)
    }

    pub async fn update_budget_item(
        &self,
        id: Uuid,
        input: &UpdateBudgetItemPayload,
    ) -> Result<BudgetItem, AppError> {
        self.repo.update(id, input).await
    }

    pub async fn delete_budget_item(&self, id: Uuid) -> Result<(), AppError> {
        self.repo.delete(id).await
    }

    pub async fn get_project_budget(&self, project_id: Uuid) -> Result<ProjectBudget, AppError> {
        let items = self.repo.get_all(Some(project_id)).await?;
        let stats = compute_stats(&items);
        Ok(ProjectBudget {
            project_id,
            total_income: stats.total_income,
            total_expenses: stats.total_expenses,
            balance: stats.net_income,
            items,
        })
    }

    /// Sempre recalculado a partir do conjunto completo de lançamentos.
    pub async fn get_budget_stats(&self, project_id: Option<Uuid>) -> Result<BudgetStats, AppError> {
        let items = self.repo.get_all(project_id).await?;
        Ok(compute_stats(&items))
    }

    pub async fn export_budget_csv(&self, project_id: Option<Uuid>) -> Result<String, AppError> {
        let items = self.repo.get_all(project_id).await?;
        Ok(export_csv(&items))
    }
}

/// Totais por tipo e por categoria. Valores são magnitudes; o tipo dá o sentido.
pub fn compute_stats(items: &[BudgetItem]) -> BudgetStats {
    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;
    let mut categories: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();

    for item in items {
        let entry = categories.entry(item.category.as_str()).or_default();
        match item.item_type {
            BudgetItemType::Income => {
                total_income += item.amount;
                entry.0 += item.amount;
            }
            BudgetItemType::Expense => {
                total_expenses += item.amount;
                entry.1 += item.amount;
            }
        }
    }

    let by_category = categories
        .into_iter()
        .map(|(category, (income, expenses))| CategoryTotal {
            category: category.to_string(),
            income,
            expenses,
        })
        .collect();

    BudgetStats {
        total_income,
        total_expenses,
        net_income: total_income - total_expenses,
        item_count: items.len(),
        by_category,
    }
}

pub fn export_csv(items: &[BudgetItem]) -> String {
    let mut out = String::new();
    csv::write_row(&mut out, &CSV_HEADER);

    for item in items {
        let date = item.date.format("%Y-%m-%d").to_string();
        let amount = item.amount.to_string();
        csv::write_row(
            &mut out,
            &[
                date.as_str(),
                item.category.as_str(),
                item.description.as_deref().unwrap_or(""),
                item.item_type.as_str(),
                amount.as_str(),
            ],
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn item(category: &str, item_type: BudgetItemType, amount: i64) -> BudgetItem {
        BudgetItem {
            id: Uuid::new_v4(),
            category: category.into(),
            description: None,
            amount: Decimal::new(amount, 0),
            item_type,
            date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            project_id: Uuid::nil(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn stats_sum_amounts_by_type() {
        let items = vec![
            item("Vendas", BudgetItemType::Income, 100_000),
            item("Materiais", BudgetItemType::Expense, 40_000),
        ];
        let stats = compute_stats(&items);

        assert_eq!(stats.total_income, Decimal::new(100_000, 0));
        assert_eq!(stats.total_expenses, Decimal::new(40_000, 0));
        assert_eq!(stats.net_income, Decimal::new(60_000, 0));
        assert_eq!(stats.item_count, 2);
    }

    #[test]
    fn stats_group_by_category() {
        let items = vec![
            item("Materiais", BudgetItemType::Expense, 300),
            item("Materiais", BudgetItemType::Expense, 200),
            item("Materiais", BudgetItemType::Income, 50),
            item("Mão de obra", BudgetItemType::Expense, 1_000),
        ];
        let stats = compute_stats(&items);

        assert_eq!(stats.by_category.len(), 2);
        let materials = stats.by_category.iter().find(|c| c.category == "Materiais").unwrap();
        assert_eq!(materials.expenses, Decimal::new(500, 0));
        assert_eq!(materials.income, Decimal::new(50, 0));
        assert_eq!(stats.net_income, Decimal::new(-1_450, 0));
    }

    #[test]
    fn empty_budget_is_all_zero() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.net_income, Decimal::ZERO);
        assert_eq!(stats.item_count, 0);
        assert!(stats.by_category.is_empty());
    }

    #[test]
    fn csv_has_header_and_escaped_rows() {
        let mut concrete = item("Materiais", BudgetItemType::Expense, 1_500);
        concrete.description = Some("Concreto, fck 30".into());
        let csv = export_csv(&[concrete]);

        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("date,category,description,type,amount"));
        assert_eq!(lines.next(), Some("2024-03-10,Materiais,\"Concreto, fck 30\",expense,1500"));
        assert_eq!(lines.next(), None);
    }
}
