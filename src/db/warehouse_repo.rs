// src/db/warehouse_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssignmentStore, WarehouseStore},
    models::warehouse::{NewWarehouse, Warehouse},
};

#[derive(Clone)]
pub struct WarehouseRepository {
    pool: PgPool,
}

impl WarehouseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentStore<Warehouse> for WarehouseRepository {
    async fn find_owner(&self, id: Uuid) -> Result<Option<Warehouse>, AppError> {
        let warehouse = sqlx::query_as::<_, Warehouse>("SELECT * FROM warehouses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(warehouse)
    }

    async fn replace_products(
        &self,
        id: Uuid,
        products: &[Uuid],
        expected_version: i64,
    ) -> Result<Option<Warehouse>, AppError> {
        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            UPDATE warehouses
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
        Ok(warehouse)
    }
}

#[async_trait]
impl WarehouseStore for WarehouseRepository {
    async fn create_warehouse(&self, new_warehouse: NewWarehouse) -> Result<Warehouse, AppError> {
        let warehouse = sqlx::query_as::<_, Warehouse>(
            r#"
            INSERT INTO warehouses (name, location, manager_id, company_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&new_warehouse.name)
        .bind(&new_warehouse.location)
        .bind(new_warehouse.manager_id)
        .bind(new_warehouse.company_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(warehouse)
    }

    async fn list_warehouses(&self) -> Result<Vec<Warehouse>, AppError> {
        let warehouses =
            sqlx::query_as::<_, Warehouse>("SELECT * FROM warehouses ORDER BY created_at")
                .fetch_all(&self.pool)
                .await?;
        Ok(warehouses)
    }
}
