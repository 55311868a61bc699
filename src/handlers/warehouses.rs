// src/handlers/warehouses.rs

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value;

use crate::{
    clients::StockDecision,
    common::{
        error::AppError,
        ids::{parse_id, require_id},
    },
    config::AppState,
    handlers::branches::AssignProductPayload,
    models::{
        product::Product,
        stock::WarehouseStock,
        warehouse::{
            CreateWarehousePayload, ReplenishPayload, Warehouse, WarehouseAssignment, WarehouseWithBranches,
        },
    },
};

#[utoipa::path(
    post,
    path = "/api/warehouses",
    tag = "Warehouses",
    request_body = CreateWarehousePayload,
    responses((status = 201, description = "Depósito criado", body = Warehouse))
)]
pub async fn create_warehouse(
    State(app_state): State<AppState>,
    payload: Result<Json<CreateWarehousePayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let warehouse = app_state.warehouse_service.create_warehouse(payload).await?;
    Ok((StatusCode::CREATED, Json(warehouse)))
}

#[utoipa::path(
    get,
    path = "/api/warehouses",
    tag = "Warehouses",
    responses((status = 200, description = "Depósitos", body = Vec<Warehouse>))
)]
pub async fn list_warehouses(State(app_state): State<AppState>) -> Result<Json<Vec<Warehouse>>, AppError> {
    Ok(Json(app_state.warehouse_service.list_warehouses().await?))
}

#[utoipa::path(
    get,
    path = "/api/warehouses/{id}",
    tag = "Warehouses",
    params(("id" = String, Path, description = "ID do depósito (UUID)")),
    responses(
        (status = 200, description = "Depósito", body = Warehouse),
        (status = 404, description = "Depósito não encontrado")
    )
)]
pub async fn get_warehouse(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Warehouse>, AppError> {
    let id = parse_id(&id, "warehouse")?;
    Ok(Json(app_state.warehouse_service.get_warehouse(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/warehouses/{id}/with-branches",
    tag = "Warehouses",
    params(("id" = String, Path, description = "ID do depósito (UUID)")),
    responses((status = 200, description = "Depósito e as suas filiais", body = WarehouseWithBranches))
)]
pub async fn get_warehouse_with_branches(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WarehouseWithBranches>, AppError> {
    let id = parse_id(&id, "warehouse")?;
    Ok(Json(app_state.warehouse_service.with_branches(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/warehouses/{id}/stock",
    tag = "Warehouse Stock",
    params(("id" = String, Path, description = "ID do depósito (UUID)")),
    responses((status = 200, description = "Saldos do depósito", body = WarehouseStock))
)]
pub async fn get_warehouse_stock(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WarehouseStock>, AppError> {
    let id = parse_id(&id, "warehouse")?;
    Ok(Json(app_state.warehouse_service.warehouse_stock(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/warehouses/stock-requests/{id}/approve",
    tag = "Warehouse Stock",
    params(("id" = String, Path, description = "ID do pedido no serviço de estoque")),
    responses(
        (status = 200, description = "Aprovação repassada ao serviço de estoque"),
        (status = 404, description = "Pedido não encontrado")
    )
)]
pub async fn approve_stock_request(
    State(app_state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let outcome = app_state
        .warehouse_service
        .decide_stock_request(&request_id, StockDecision::Approve)
        .await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/warehouses/stock-requests/{id}/reject",
    tag = "Warehouse Stock",
    params(("id" = String, Path, description = "ID do pedido no serviço de estoque")),
    responses(
        (status = 200, description = "Rejeição repassada ao serviço de estoque"),
        (status = 404, description = "Pedido não encontrado")
    )
)]
pub async fn reject_stock_request(
    State(app_state): State<AppState>,
    Path(request_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let outcome = app_state
        .warehouse_service
        .decide_stock_request(&request_id, StockDecision::Reject)
        .await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/warehouses/{id}/replenish-requests",
    tag = "Warehouse Stock",
    params(("id" = String, Path, description = "ID do depósito (UUID)")),
    request_body = ReplenishPayload,
    responses((status = 201, description = "Pedido de reposição enviado à empresa"))
)]
pub async fn request_replenish(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ReplenishPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "warehouse")?;
    let Json(payload) = payload?;
    let created = app_state.warehouse_service.request_replenish(id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// --- Produtos atribuídos ---

#[utoipa::path(
    get,
    path = "/api/warehouses/{id}/products",
    tag = "Warehouse Products",
    params(("id" = String, Path, description = "ID do depósito (UUID)")),
    responses((status = 200, description = "Produtos atribuídos", body = Vec<Product>))
)]
pub async fn list_warehouse_products(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Product>>, AppError> {
    let id = parse_id(&id, "warehouse")?;
    Ok(Json(app_state.warehouse_service.products_of(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/warehouses/{id}/products",
    tag = "Warehouse Products",
    params(("id" = String, Path, description = "ID do depósito (UUID)")),
    request_body = AssignProductPayload,
    responses(
        (status = 200, description = "Produto atribuído", body = WarehouseAssignment),
        (status = 400, description = "Produto já atribuído")
    )
)]
pub async fn assign_warehouse_product(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AssignProductPayload>, JsonRejection>,
) -> Result<Json<WarehouseAssignment>, AppError> {
    let id = parse_id(&id, "warehouse")?;
    let Json(payload) = payload?;
    let product_id = require_id(payload.product_id.as_deref(), "product")?;
    Ok(Json(app_state.warehouse_service.assign_product(id, product_id).await?))
}

// Variante antiga: o produto vem no corpo do DELETE.
#[utoipa::path(
    delete,
    path = "/api/warehouses/{id}/products",
    tag = "Warehouse Products",
    params(("id" = String, Path, description = "ID do depósito (UUID)")),
    request_body = AssignProductPayload,
    responses(
        (status = 200, description = "Produto removido", body = Warehouse),
        (status = 400, description = "Produto não está atribuído")
    )
)]
pub async fn remove_warehouse_product_by_body(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AssignProductPayload>, JsonRejection>,
) -> Result<Json<Warehouse>, AppError> {
    let id = parse_id(&id, "warehouse")?;
    let Json(payload) = payload?;
    let product_id = require_id(payload.product_id.as_deref(), "product")?;
    Ok(Json(app_state.warehouse_service.remove_product(id, product_id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/warehouses/{id}/products/{product_id}",
    tag = "Warehouse Products",
    params(
        ("id" = String, Path, description = "ID do depósito (UUID)"),
        ("product_id" = String, Path, description = "ID do produto (UUID)")
    ),
    responses(
        (status = 200, description = "Produto removido", body = Warehouse),
        (status = 400, description = "Produto não está atribuído")
    )
)]
pub async fn remove_warehouse_product(
    State(app_state): State<AppState>,
    Path((id, product_id)): Path<(String, String)>,
) -> Result<Json<Warehouse>, AppError> {
    let id = parse_id(&id, "warehouse")?;
    let product_id = parse_id(&product_id, "product")?;
    Ok(Json(app_state.warehouse_service.remove_product(id, product_id).await?))
}
