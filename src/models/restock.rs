// src/models/restock.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// pending -> approved | rejected (os dois últimos são terminais)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "restock_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RestockStatus {
    Pending,
    Approved,
    Rejected,
}

impl RestockStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RestockStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RestockStatus::Pending => "pending",
            RestockStatus::Approved => "approved",
            RestockStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RestockRequest {
    pub id: Uuid,
    pub branch_id: Uuid,
    pub product_id: Uuid,
    #[schema(example = 50)]
    pub quantity: i64,
    pub status: RestockStatus,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestockPayload {
    pub product_id: Option<String>,
    #[validate(required(message = "Quantity is required."), range(min = 1, message = "Quantity must be at least 1."))]
    pub quantity: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewRestockRequest {
    pub branch_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
}
