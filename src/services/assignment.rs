// src/services/assignment.rs
//
// Atribuição de produtos a filiais e depósitos: a mesma regra para os dois donos.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    clients::ProductLookup,
    common::error::AppError,
    db::{Assignable, AssignmentStore},
    models::product::Product,
    services::aggregation::fetch_products,
};

#[derive(Clone)]
pub struct AssignmentService<T: Assignable> {
    owners: Arc<dyn AssignmentStore<T>>,
    catalog: Arc<dyn ProductLookup>,
    max_attempts: u32,
}

impl<T: Assignable> AssignmentService<T> {
    pub fn new(
        owners: Arc<dyn AssignmentStore<T>>,
        catalog: Arc<dyn ProductLookup>,
        max_attempts: u32,
    ) -> Self {
        Self { owners, catalog, max_attempts: max_attempts.max(1) }
    }

    pub async fn assign(&self, owner_id: Uuid, product_id: Uuid) -> Result<(T, Product), AppError> {
        let product = self
            .catalog
            .fetch_product(product_id)
            .await
            .map_err(|e| AppError::from_client("product", "Product", e))?;

        let owner = self
            .mutate(owner_id, |products| {
                if products.contains(&product_id) {
                    return Err(AppError::BadRequest(format!(
                        "Product is already assigned to this {}",
                        T::ENTITY.to_lowercase()
                    )));
                }
                products.push(product_id);
                Ok(())
            })
            .await?;

        tracing::info!(owner = T::ENTITY, %owner_id, %product_id, "produto atribuído");
        Ok((owner, product))
    }

    pub async fn remove(&self, owner_id: Uuid, product_id: Uuid) -> Result<T, AppError> {
        let owner = self
            .mutate(owner_id, |products| {
                let before = products.len();
                products.retain(|p| *p != product_id);
                if products.len() == before {
                    return Err(AppError::BadRequest(format!(
                        "Product is not assigned to this {}",
                        T::ENTITY.to_lowercase()
                    )));
                }
                Ok(())
            })
            .await?;

        tracing::info!(owner = T::ENTITY, %owner_id, %product_id, "produto removido");
        Ok(owner)
    }

    /// Produtos atribuídos, na ordem de atribuição.
    pub async fn products_of(&self, owner_id: Uuid) -> Result<Vec<Product>, AppError> {
        let owner = self
            .owners
            .find_owner(owner_id)
            .await?
            .ok_or(AppError::NotFound(T::ENTITY))?;
        fetch_products(self.catalog.as_ref(), owner.products()).await
    }

    // Lê, aplica `edit` e grava condicionado à versão lida. Se outra escrita
    // passou na frente, relê e tenta de novo até `max_attempts`.
    async fn mutate<F>(&self, owner_id: Uuid, edit: F) -> Result<T, AppError>
    where
        F: Fn(&mut Vec<Uuid>) -> Result<(), AppError> + Send + Sync,
    {
        for attempt in 1..=self.max_attempts {
            let owner = self
                .owners
                .find_owner(owner_id)
                .await?
                .ok_or(AppError::NotFound(T::ENTITY))?;

            let mut products = owner.products().to_vec();
            edit(&mut products)?;

            if let Some(updated) = self
                .owners
                .replace_products(owner_id, &products, owner.version())
                .await?
            {
                return Ok(updated);
            }
            tracing::debug!(owner = T::ENTITY, %owner_id, attempt, "versão mudou, relendo");
        }

        tracing::warn!(owner = T::ENTITY, %owner_id, "tentativas esgotadas na atribuição");
        Err(AppError::Conflict(format!(
            "{} was modified concurrently, please retry",
            T::ENTITY
        )))
    }
}
