// src/models/branch.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::{product::Product, warehouse::Warehouse};

// --- Filial ---
// `products` é o conjunto ordenado de produtos atribuídos (sem repetição).
// `version` cresce a cada escrita e serve de trava otimista.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub id: Uuid,
    #[schema(example = "Downtown")]
    pub name: String,
    #[schema(example = "Av. Paulista, 1000")]
    pub location: String,
    pub warehouse_id: Uuid,
    pub manager_id: Uuid,
    pub products: Vec<Uuid>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBranchPayload {
    #[validate(length(min = 1, message = "Branch name is required."))]
    pub name: String,
    #[validate(length(min = 1, message = "Branch location is required."))]
    pub location: String,
    pub warehouse_id: String,
    pub manager_id: String,
}

#[derive(Debug, Clone)]
pub struct NewBranch {
    pub name: String,
    pub location: String,
    pub warehouse_id: Uuid,
    pub manager_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BranchWithWarehouse {
    pub branch: Branch,
    pub warehouse: Warehouse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BranchAssignment {
    pub branch: Branch,
    pub product: Product,
}
