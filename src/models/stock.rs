// src/models/stock.rs
//
// Registros de estoque pertencem ao serviço de estoque externo;
// aqui só existem os formatos trocados com ele.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Saldo de um produto numa filial.
// `version` é opcional: sem ela a escrita não é condicional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub branch_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustPayload {
    pub product_id: Option<String>,
    #[schema(example = -3)]
    pub quantity_change: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    pub previous_quantity: i64,
    pub stock: StockRecord,
    // Quantas leituras/escritas foram precisas até a escrita condicional passar
    pub attempts: u32,
}

// Pedido de estoque da filial para o depósito (repassado ao serviço de estoque)
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockRequestPayload {
    pub warehouse_id: String,
    pub branch_id: String,
    pub product_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1."))]
    pub quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WarehouseStock {
    pub warehouse_id: Uuid,
    #[schema(value_type = Vec<Object>)]
    pub stock: Vec<serde_json::Value>,
}
