// src/services/stock_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    clients::{ClientError, StockService},
    common::error::AppError,
    models::stock::StockAdjustment,
};

// Ajuste de saldo: lê o registro, calcula, grava condicionado à versão lida.
#[derive(Clone)]
pub struct StockAdjustmentService {
    stock: Arc<dyn StockService>,
    max_attempts: u32,
}

impl StockAdjustmentService {
    pub fn new(stock: Arc<dyn StockService>, max_attempts: u32) -> Self {
        Self { stock, max_attempts: max_attempts.max(1) }
    }

    /// `delta` pode ser qualquer inteiro (zero inclusive). O saldo nunca fica negativo.
    pub async fn adjust(&self, branch_id: Uuid, product_id: Uuid, delta: i64) -> Result<StockAdjustment, AppError> {
        for attempt in 1..=self.max_attempts {
            let records = self
                .stock
                .records_for(branch_id, product_id)
                .await
                .map_err(|e| AppError::from_client("stock", "Stock record", e))?;

            // Mais de um registro para o par: vale o primeiro.
            let record = records
                .into_iter()
                .next()
                .ok_or(AppError::NotFound("Stock record"))?;

            let new_quantity = record
                .quantity
                .checked_add(delta)
                .ok_or_else(|| AppError::BadRequest("Quantity change is out of range".into()))?;
            if new_quantity < 0 {
                return Err(AppError::BadRequest(format!(
                    "Insufficient stock: available {}, requested change {}",
                    record.quantity, delta
                )));
            }

            match self
                .stock
                .write_quantity(&record.id, new_quantity, record.version)
                .await
            {
                Ok(stored) => {
                    tracing::info!(
                        %branch_id, %product_id, delta,
                        previous = record.quantity, current = stored.quantity, attempt,
                        "estoque ajustado"
                    );
                    return Ok(StockAdjustment {
                        previous_quantity: record.quantity,
                        stock: stored,
                        attempts: attempt,
                    });
                }
                Err(ClientError::Conflict) => {
                    tracing::debug!(%branch_id, %product_id, attempt, "registro de estoque mudou, relendo");
                }
                Err(e) => return Err(AppError::from_client("stock", "Stock record", e)),
            }
        }

        tracing::warn!(%branch_id, %product_id, "tentativas esgotadas no ajuste de estoque");
        Err(AppError::Conflict(
            "Stock record was modified concurrently, please retry".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeStock;

    #[tokio::test]
    async fn single_adjustment_applies_delta() {
        let stock = FakeStock::new();
        let (branch, product) = (Uuid::new_v4(), Uuid::new_v4());
        stock.seed(branch, product, 10).await;

        let service = StockAdjustmentService::new(Arc::new(stock.clone()), 5);
        let result = service.adjust(branch, product, -4).await.unwrap();

        assert_eq!(result.previous_quantity, 10);
        assert_eq!(result.stock.quantity, 6);
        assert_eq!(stock.quantity(branch, product).await, Some(6));
    }

    #[tokio::test]
    async fn zero_delta_is_accepted() {
        let stock = FakeStock::new();
        let (branch, product) = (Uuid::new_v4(), Uuid::new_v4());
        stock.seed(branch, product, 3).await;

        let service = StockAdjustmentService::new(Arc::new(stock.clone()), 5);
        assert_eq!(service.adjust(branch, product, 0).await.unwrap().stock.quantity, 3);
    }

    #[tokio::test]
    async fn negative_result_is_rejected_without_writing() {
        let stock = FakeStock::new();
        let (branch, product) = (Uuid::new_v4(), Uuid::new_v4());
        stock.seed(branch, product, 2).await;

        let service = StockAdjustmentService::new(Arc::new(stock.clone()), 5);
        let result = service.adjust(branch, product, -3).await;

        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg.contains("Insufficient stock")));
        assert_eq!(stock.quantity(branch, product).await, Some(2));
        assert_eq!(stock.writes().await, 0);
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let service = StockAdjustmentService::new(Arc::new(FakeStock::new()), 5);
        let result = service.adjust(Uuid::new_v4(), Uuid::new_v4(), 1).await;
        assert!(matches!(result, Err(AppError::NotFound("Stock record"))));
    }

    #[tokio::test]
    async fn unreachable_stock_service_is_unavailable() {
        let stock = FakeStock::new();
        stock.set_down(true).await;
        let service = StockAdjustmentService::new(Arc::new(stock), 5);
        let result = service.adjust(Uuid::new_v4(), Uuid::new_v4(), 1).await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable { .. })));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adjustments_are_not_lost() {
        const N: i64 = 10;
        let stock = FakeStock::new();
        let (branch, product) = (Uuid::new_v4(), Uuid::new_v4());
        stock.seed(branch, product, 100).await;

        let service = StockAdjustmentService::new(Arc::new(stock.clone()), N as u32 + 1);
        let deltas: Vec<i64> = (1..=N).map(|i| if i % 2 == 0 { i } else { -i }).collect();

        let tasks: Vec<_> = deltas
            .iter()
            .map(|delta| {
                let service = service.clone();
                let delta = *delta;
                tokio::spawn(async move { service.adjust(branch, product, delta).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let expected = 100 + deltas.iter().sum::<i64>();
        assert_eq!(stock.quantity(branch, product).await, Some(expected));
    }

    #[tokio::test]
    async fn exhausted_retries_are_a_conflict() {
        let stock = FakeStock::new();
        let (branch, product) = (Uuid::new_v4(), Uuid::new_v4());
        stock.seed(branch, product, 10).await;
        stock.always_conflict(true).await;

        let service = StockAdjustmentService::new(Arc::new(stock.clone()), 3);
        let result = service.adjust(branch, product, 1).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(stock.quantity(branch, product).await, Some(10));
    }
}
