// src/db/branch_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssignmentStore, BranchStore},
    models::branch::{Branch, NewBranch},
};

#[derive(Clone)]
pub struct BranchRepository {
    pool: PgPool,
}

impl BranchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentStore<Branch> for BranchRepository {
    async fn find_owner(&self, id: Uuid) -> Result<Option<Branch>, AppError> {
        let branch = sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(branch)
    }

    async fn replace_products(
        &self,
        id: Uuid,
        products: &[Uuid],
        expected_version: i64,
    ) -> Result<Option<Branch>, AppError> {
        // Compare-and-swap na coluna version: zero linhas = alguém escreveu antes.
        let branch = sqlx::query_as::<_, Branch>(
            r#"
            UPDATE branches
            SET products = $2, version = version + 1, updated_at = now()
            WHERE id = $1 AND version = $3
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(products)
        .bind(expected_version)
        .fetch_optional(&self.pool)
        .await?;
        Ok(branch)
    }
}

#[async_trait]
impl BranchStore for BranchRepository {
    async fn create_branch(&self, new_branch: NewBranch) -> Result<Branch, AppError> {
        let branch = sqlx::query_as::<_, Branch>(
            r#"
            INSERT INTO branches (name, location, warehouse_id, manager_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&new_branch.name)
        .bind(&new_branch.location)
        .bind(new_branch.warehouse_id)
        .bind(new_branch.manager_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(branch)
    }

    async fn list_branches(&self) -> Result<Vec<Branch>, AppError> {
        let branches = sqlx::query_as::<_, Branch>("SELECT * FROM branches ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(branches)
    }

    async fn list_branches_by_warehouse(&self, warehouse_id: Uuid) -> Result<Vec<Branch>, AppError> {
        let branches = sqlx::query_as::<_, Branch>(
            "SELECT * FROM branches WHERE warehouse_id = $1 ORDER BY created_at",
        )
        .bind(warehouse_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(branches)
    }
}
