// src/db/restock_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RestockStore,
    models::restock::{NewRestockRequest, RestockRequest, RestockStatus},
};

#[derive(Clone)]
pub struct RestockRepository {
    pool: PgPool,
}

impl RestockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RestockStore for RestockRepository {
    async fn create_restock(&self, new_request: NewRestockRequest) -> Result<RestockRequest, AppError> {
        // status nasce 'pending' pelo DEFAULT da tabela
        let request = sqlx::query_as::<_, RestockRequest>(
            r#"
            INSERT INTO restock_requests (branch_id, product_id, quantity)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(new_request.branch_id)
        .bind(new_request.product_id)
        .bind(new_request.quantity)
        .fetch_one(&self.pool)
        .await?;
        Ok(request)
    }

    async fn find_restock(&self, id: Uuid) -> Result<Option<RestockRequest>, AppError> {
        let request =
            sqlx::query_as::<_, RestockRequest>("SELECT * FROM restock_requests WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(request)
    }

    async fn list_restocks_for_branch(&self, branch_id: Uuid) -> Result<Vec<RestockRequest>, AppError> {
        let requests = sqlx::query_as::<_, RestockRequest>(
            "SELECT * FROM restock_requests WHERE branch_id = $1 ORDER BY created_at DESC",
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    async fn transition_restock(
        &self,
        id: Uuid,
        branch_id: Uuid,
        to: RestockStatus,
        only_from_pending: bool,
    ) -> Result<Option<RestockRequest>, AppError> {
        // Uma única instrução: o teste do status atual e a escrita são atômicos.
        let request = sqlx::query_as::<_, RestockRequest>(
            r#"
            UPDATE restock_requests
            SET status = $3, version = version + 1, updated_at = now()
            WHERE id = $1
              AND branch_id = $2
              AND (NOT $4 OR status = 'pending')
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(branch_id)
        .bind(to)
        .bind(only_from_pending)
        .fetch_optional(&self.pool)
        .await?;
        Ok(request)
    }
}
