// src/db/product_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ProductStore,
    models::product::{NewProduct, Product},
};

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn create_product(&self, new_product: NewProduct) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                company_id, name, description, category, price, cost_price,
                sku, unit, status, tag_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(new_product.company_id)
        .bind(&new_product.name)
        .bind(&new_product.description)
        .bind(&new_product.category)
        .bind(new_product.price)
        .bind(new_product.cost_price)
        .bind(&new_product.sku)
        .bind(&new_product.unit)
        .bind(new_product.status)
        .bind(&new_product.tag_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::SkuAlreadyExists;
                }
            }
            e.into()
        })
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        let products =
            sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(products)
    }

    async fn list_products_by_company(&self, company_id: Uuid) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE company_id = $1 ORDER BY created_at DESC",
        )
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }
}
