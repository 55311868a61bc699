// src/services/aggregation.rs

use futures::future::join_all;
use uuid::Uuid;

use crate::{
    clients::{ClientError, ProductLookup},
    common::error::AppError,
    models::product::Product,
};

/// Busca os produtos em paralelo, na ordem de `ids`.
/// Falhas individuais são logadas e descartadas; só é erro quando nenhuma
/// busca chegou ao catálogo (todas falharam no transporte).
pub async fn fetch_products(catalog: &dyn ProductLookup, ids: &[Uuid]) -> Result<Vec<Product>, AppError> {
    let results = join_all(ids.iter().map(|id| catalog.fetch_product(*id))).await;

    let mut products = Vec::with_capacity(results.len());
    let mut unreachable = 0usize;
    let mut last_reason = None;

    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(product) => products.push(product),
            Err(err) => {
                tracing::warn!(product_id = %id, error = %err, "produto ignorado na agregação");
                if matches!(err, ClientError::Transport(_)) {
                    unreachable += 1;
                    last_reason = Some(err.to_string());
                }
            }
        }
    }

    if !ids.is_empty() && unreachable == ids.len() {
        return Err(AppError::ServiceUnavailable {
            service: "product",
            reason: last_reason.unwrap_or_default(),
        });
    }
    Ok(products)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCatalog;

    #[tokio::test]
    async fn drops_failed_fetches_and_keeps_order() {
        let catalog = FakeCatalog::new();
        let p1 = catalog.add("P1").await;
        let p2 = catalog.add("P2").await;
        let p3 = catalog.add("P3").await;
        catalog.fail(p2.id).await;

        let products = fetch_products(&catalog, &[p1.id, p2.id, p3.id]).await.unwrap();
        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["P1", "P3"]);
    }

    #[tokio::test]
    async fn missing_products_are_skipped_not_fatal() {
        let catalog = FakeCatalog::new();
        let products = fetch_products(&catalog, &[Uuid::new_v4(), Uuid::new_v4()])
            .await
            .unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn unreachable_catalog_fails_the_call() {
        let catalog = FakeCatalog::new();
        let a = catalog.add("A").await;
        let b = catalog.add("B").await;
        catalog.fail(a.id).await;
        catalog.fail(b.id).await;

        let result = fetch_products(&catalog, &[a.id, b.id]).await;
        assert!(matches!(result, Err(AppError::ServiceUnavailable { .. })));
    }

    #[tokio::test]
    async fn error_answers_from_a_live_catalog_are_dropped() {
        let catalog = FakeCatalog::new();
        let only = catalog.add("Only").await;
        catalog.answer_error(only.id).await;

        let products = fetch_products(&catalog, &[only.id]).await.unwrap();
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn empty_set_is_empty_list() {
        let catalog = FakeCatalog::new();
        assert!(fetch_products(&catalog, &[]).await.unwrap().is_empty());
    }
}
