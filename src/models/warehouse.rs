// src/models/warehouse.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{branch::Branch, product::Product};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: Uuid,
    #[schema(example = "Central Warehouse")]
    pub name: String,
    pub location: String,
    pub manager_id: Uuid,
    pub company_id: Option<Uuid>,
    pub products: Vec<Uuid>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWarehousePayload {
    #[validate(length(min = 1, message = "Warehouse name is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "Warehouse location is required."))]
    pub location: String,
    pub manager_id: String,
    pub company_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewWarehouse {
    pub name: String,
    pub location: String,
    pub manager_id: Uuid,
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WarehouseWithBranches {
    pub warehouse: Warehouse,
    pub branches: Vec<Branch>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WarehouseAssignment {
    pub warehouse: Warehouse,
    pub product: Product,
}

// Pedido de reposição encaminhado ao serviço de empresas
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplenishPayload {
    pub company_id: String,
    pub product_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    pub quantity: i64,
}
