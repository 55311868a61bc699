// src/services/product_service.rs

use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, ids::parse_id},
    db::ProductStore,
    models::product::{CreateProductPayload, NewProduct, Product},
};

#[derive(Clone)]
pub struct ProductService {
    products: Arc<dyn ProductStore>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductStore>) -> Self {
        Self { products }
    }

    pub async fn create_product(&self, payload: CreateProductPayload) -> Result<Product, AppError> {
        payload.validate()?;
        payload.validate_prices()?;
        let new_product = into_new_product(payload)?;

        let product = self.products.create_product(new_product).await?;
        tracing::info!(product_id = %product.id, sku = %product.sku, "produto criado");
        Ok(product)
    }

    pub async fn get_product(&self, id: Uuid) -> Result<Product, AppError> {
        self.products
            .find_product(id)
            .await?
            .ok_or(AppError::NotFound("Product"))
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.products.list_products().await
    }

    pub async fn list_by_company(&self, company_id: Uuid) -> Result<Vec<Product>, AppError> {
        self.products.list_products_by_company(company_id).await
    }
}

// Depois do `validate()` os campos obrigatórios estão presentes.
fn into_new_product(payload: CreateProductPayload) -> Result<NewProduct, AppError> {
    let missing = |field: &str| AppError::BadRequest(format!("Missing field: {field}"));

    let company_id = payload.company_id.ok_or_else(|| missing("companyId"))?;
    Ok(NewProduct {
        company_id: parse_id(&company_id, "company")?,
        name: payload.name.ok_or_else(|| missing("name"))?,
        description: payload.description.ok_or_else(|| missing("description"))?,
        category: payload.category.ok_or_else(|| missing("category"))?,
        price: payload.price.ok_or_else(|| missing("price"))?,
        cost_price: payload.cost_price.ok_or_else(|| missing("costPrice"))?,
        sku: payload.sku.ok_or_else(|| missing("sku"))?,
        unit: payload.unit.ok_or_else(|| missing("unit"))?,
        status: payload.status,
        tag_name: payload.tag_name.filter(|t| !t.trim().is_empty()),
    })
}
