// src/services/material_service.rs

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::MaterialRepository,
    models::material::{
        CorrectStockPayload, CreateMaterialPayload, IssueMaterialPayload, Material,
        MaterialFilter, MaterialMovement, MovementReason, ReceiveMaterialPayload,
    },
};

#[derive(Clone)]
pub struct MaterialService {
    repo: MaterialRepository,
}

/// Custo médio ponderado após uma entrada.
pub fn calculate_new_average_cost(
    current_qty: Decimal,
    current_avg: Decimal,
    incoming_qty: Decimal,
    incoming_cost: Decimal,
) -> Decimal {
    let total_current_value = current_qty * current_avg;
    let total_incoming_value = incoming_qty * incoming_cost;
    let new_total_qty = current_qty + incoming_qty;

    if new_total_qty <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    ((total_current_value + total_incoming_value) / new_total_qty).round_dp(4)
}

impl MaterialService {
    pub fn new(repo: MaterialRepository) -> Self {
        Self { repo }
    }

    pub async fn list_materials(&self, filter: &MaterialFilter) -> Result<Vec<Material>, AppError> {
        self.repo.list(filter).await
    }

    pub async fn create_material(&self, input: &CreateMaterialPayload) -> Result<Material, AppError> {
        self.repo.create(input).await
    }

    pub async fn list_movements(&self, material_id: Uuid) -> Result<Vec<MaterialMovement>, AppError> {
        self.repo.list_movements(material_id).await
    }

    // --- ENTRADA ---
    pub async fn receive_material(
        &self,
        id: Uuid,
        input: &ReceiveMaterialPayload,
        user_id: Uuid,
    ) -> Result<Material, AppError> {
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::InvalidPayload("quantity deve ser maior que zero".into()));
        }

        let mut tx = self.repo.pool().begin().await?;

        let current = self
            .repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::MaterialNotFound(id))?;

        let new_avg = calculate_new_average_cost(
            current.quantity,
            current.unit_price,
            input.quantity,
            input.unit_price,
        );

        let updated = self
            .repo
            .apply_stock_change(&mut *tx, id, input.quantity, Some(new_avg))
            .await?;

        self.repo
            .record_movement(
                &mut *tx,
                id,
                input.quantity,
                MovementReason::Receipt,
                Some(input.unit_price),
                input.notes.as_deref(),
                Some(user_id),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    // --- SAÍDA ---
    pub async fn issue_material(
        &self,
        id: Uuid,
        input: &IssueMaterialPayload,
        user_id: Uuid,
    ) -> Result<Material, AppError> {
        if input.quantity <= Decimal::ZERO {
            return Err(AppError::InvalidPayload("quantity deve ser maior que zero".into()));
        }

        let mut tx = self.repo.pool().begin().await?;

        // Trava a linha: duas saídas simultâneas não podem furar o estoque
        let current = self
            .repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::MaterialNotFound(id))?;

        if current.quantity < input.quantity {
            return Err(AppError::InsufficientStock {
                available: current.quantity,
                requested: input.quantity,
            });
        }

        let updated = self
            .repo
            .apply_stock_change(&mut *tx, id, -input.quantity, None)
            .await?;

        self.repo
            .record_movement(
                &mut *tx,
                id,
                -input.quantity,
                MovementReason::Issue,
                Some(current.unit_price),
                input.notes.as_deref(),
                Some(user_id),
            )
            .await?;

        tx.commit().await?;

        if updated.is_low_stock() {
            tracing::warn!("📉 Material '{}' abaixo do mínimo ({} {})", updated.name, updated.quantity, updated.unit);
        }
        Ok(updated)
    }

    // --- AJUSTE DE INVENTÁRIO ---
    pub async fn correct_stock(
        &self,
        id: Uuid,
        input: &CorrectStockPayload,
        user_id: Uuid,
    ) -> Result<Material, AppError> {
        let mut tx = self.repo.pool().begin().await?;

        let current = self
            .repo
            .find_for_update(&mut *tx, id)
            .await?
            .ok_or(AppError::MaterialNotFound(id))?;

        let delta = input.counted_quantity - current.quantity;
        if delta.is_zero() {
            return Ok(current);
        }

        let updated = self.repo.apply_stock_change(&mut *tx, id, delta, None).await?;
        self.repo
            .record_movement(
                &mut *tx,
                id,
                delta,
                MovementReason::Correction,
                None,
                input.notes.as_deref(),
                Some(user_id),
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_cost_weights_by_quantity() {
        // 10 a 5,00 + 30 a 9,00 = 40 a 8,00
        let avg = calculate_new_average_cost(
            Decimal::new(10, 0),
            Decimal::new(5, 0),
            Decimal::new(30, 0),
            Decimal::new(9, 0),
        );
        assert_eq!(avg, Decimal::new(8, 0));
    }

    #[test]
    fn first_receipt_takes_incoming_cost() {
        let avg = calculate_new_average_cost(
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::new(50, 0),
            Decimal::new(3290, 2),
        );
        assert_eq!(avg, Decimal::new(3290, 2));
    }

    #[test]
    fn empty_result_has_zero_cost() {
        let avg = calculate_new_average_cost(Decimal::ZERO, Decimal::new(7, 0), Decimal::ZERO, Decimal::new(9, 0));
        assert_eq!(avg, Decimal::ZERO);
    }
}
