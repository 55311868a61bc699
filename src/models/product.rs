// src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "product_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Active,
    Inactive,
}

// --- Produto do catálogo ---
// Também é o formato que os outros serviços recebem de GET /api/products/{id}.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub company_id: Uuid,
    #[schema(example = "Arabica 1kg")]
    pub name: String,
    pub description: String,
    #[schema(example = "Coffee")]
    pub category: String,
    pub price: Decimal,
    pub cost_price: Decimal,
    #[schema(example = "COF-ARA-1KG")]
    pub sku: String,
    #[schema(example = "kg")]
    pub unit: String,
    pub status: ProductStatus,
    pub tag_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Todos os campos obrigatórios chegam como Option para o `required` devolver
// a mensagem certa em vez de um erro genérico de desserialização.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(required(message = "Company ID is required."))]
    pub company_id: Option<String>,

    #[validate(required(message = "Product name is required."), length(min = 1, message = "Product name is required."))]
    pub name: Option<String>,

    #[validate(required(message = "Product description is required."), length(min = 1, message = "Product description is required."))]
    pub description: Option<String>,

    #[validate(required(message = "Product category is required."), length(min = 1, message = "Product category is required."))]
    pub category: Option<String>,

    #[validate(required(message = "Product price is required."))]
    pub price: Option<Decimal>,

    #[validate(required(message = "Product cost price is required."))]
    pub cost_price: Option<Decimal>,

    #[validate(required(message = "Product SKU is required."), length(min = 1, message = "Product SKU is required."))]
    pub sku: Option<String>,

    #[validate(required(message = "Product unit is required."), length(min = 1, message = "Product unit is required."))]
    pub unit: Option<String>,

    #[serde(default)]
    pub status: ProductStatus,

    pub tag_name: Option<String>,
}

fn negative(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new("range");
    err.add_param("min".into(), &0.0);
    err.message = Some(message.into());
    err
}

impl CreateProductPayload {
    // Regras numéricas que o `validate()` não cobre (preço e custo >= 0).
    pub fn validate_prices(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.price.is_some_and(|p| p < Decimal::ZERO) {
            errors.add("price", negative("Price cannot be negative."));
        }
        if self.cost_price.is_some_and(|p| p < Decimal::ZERO) {
            errors.add("cost_price", negative("Cost price cannot be negative."));
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Produto validado, pronto para o repositório.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub company_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price: Decimal,
    pub cost_price: Decimal,
    pub sku: String,
    pub unit: String,
    pub status: ProductStatus,
    pub tag_name: Option<String>,
}
