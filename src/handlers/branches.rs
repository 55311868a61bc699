// src/handlers/branches.rs

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    common::{
        error::AppError,
        ids::{parse_id, require_id},
    },
    config::AppState,
    models::{
        branch::{Branch, BranchAssignment, BranchWithWarehouse, CreateBranchPayload},
        product::Product,
        restock::{CreateRestockPayload, RestockRequest},
        stock::{StockAdjustPayload, StockAdjustment, StockRequestPayload},
    },
};

/// Corpo de `POST .../products`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignProductPayload {
    pub product_id: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/branches",
    tag = "Branches",
    request_body = CreateBranchPayload,
    responses(
        (status = 201, description = "Filial criada", body = Branch),
        (status = 404, description = "Depósito não encontrado")
    )
)]
pub async fn create_branch(
    State(app_state): State<AppState>,
    payload: Result<Json<CreateBranchPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let branch = app_state.branch_service.create_branch(payload).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

#[utoipa::path(
    get,
    path = "/api/branches",
    tag = "Branches",
    responses((status = 200, description = "Filiais", body = Vec<Branch>))
)]
pub async fn list_branches(State(app_state): State<AppState>) -> Result<Json<Vec<Branch>>, AppError> {
    Ok(Json(app_state.branch_service.list_branches().await?))
}

#[utoipa::path(
    get,
    path = "/api/branches/{id}",
    tag = "Branches",
    params(("id" = String, Path, description = "ID da filial (UUID)")),
    responses(
        (status = 200, description = "Filial", body = Branch),
        (status = 404, description = "Filial não encontrada")
    )
)]
pub async fn get_branch(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Branch>, AppError> {
    let id = parse_id(&id, "branch")?;
    Ok(Json(app_state.branch_service.get_branch(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/branches/warehouse/{id}",
    tag = "Branches",
    params(("id" = String, Path, description = "ID do depósito (UUID)")),
    responses((status = 200, description = "Filiais do depósito (lista vazia quando não há)", body = Vec<Branch>))
)]
pub async fn list_warehouse_branches(
    State(app_state): State<AppState>,
    Path(warehouse_id): Path<String>,
) -> Result<Json<Vec<Branch>>, AppError> {
    let warehouse_id = parse_id(&warehouse_id, "warehouse")?;
    Ok(Json(app_state.branch_service.branches_by_warehouse(warehouse_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/branch-with-warehouse/{id}",
    tag = "Branches",
    params(("id" = String, Path, description = "ID da filial (UUID)")),
    responses(
        (status = 200, description = "Filial com o seu depósito", body = BranchWithWarehouse),
        (status = 404, description = "Filial ou depósito não encontrado")
    )
)]
pub async fn get_branch_with_warehouse(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BranchWithWarehouse>, AppError> {
    let id = parse_id(&id, "branch")?;
    Ok(Json(app_state.branch_service.branch_with_warehouse(id).await?))
}

// --- Estoque ---

#[utoipa::path(
    get,
    path = "/api/branches/{id}/stock",
    tag = "Branch Stock",
    params(("id" = String, Path, description = "ID da filial (UUID)")),
    responses((status = 200, description = "Saldos da filial (repassados do serviço de estoque)"))
)]
pub async fn get_branch_stock(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Value>>, AppError> {
    let id = parse_id(&id, "branch")?;
    Ok(Json(app_state.branch_service.branch_stock(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/branches/{id}/stock-adjust",
    tag = "Branch Stock",
    params(("id" = String, Path, description = "ID da filial (UUID)")),
    request_body = StockAdjustPayload,
    responses(
        (status = 200, description = "Saldo ajustado", body = StockAdjustment),
        (status = 400, description = "Estoque insuficiente ou dados inválidos"),
        (status = 404, description = "Filial ou registro de estoque não encontrado"),
        (status = 409, description = "Registro alterado concorrentemente")
    )
)]
pub async fn adjust_branch_stock(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<StockAdjustPayload>, JsonRejection>,
) -> Result<Json<StockAdjustment>, AppError> {
    let id = parse_id(&id, "branch")?;
    let Json(payload) = payload?;
    Ok(Json(app_state.branch_service.adjust_stock(id, payload).await?))
}

#[utoipa::path(
    post,
    path = "/api/stock-requests",
    tag = "Branch Stock",
    request_body = StockRequestPayload,
    responses((status = 201, description = "Pedido enviado ao serviço de estoque"))
)]
pub async fn create_stock_request(
    State(app_state): State<AppState>,
    payload: Result<Json<StockRequestPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let created = app_state.branch_service.create_stock_request(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

// --- Pedidos de reposição ---

#[utoipa::path(
    post,
    path = "/api/branches/{id}/restock",
    tag = "Restock",
    params(("id" = String, Path, description = "ID da filial (UUID)")),
    request_body = CreateRestockPayload,
    responses(
        (status = 201, description = "Pedido criado como pending", body = RestockRequest),
        (status = 404, description = "Filial ou produto não encontrado")
    )
)]
pub async fn create_restock(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CreateRestockPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_id(&id, "branch")?;
    let Json(payload) = payload?;
    let request = app_state.branch_service.create_restock(id, payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[utoipa::path(
    get,
    path = "/api/branches/{id}/restock",
    tag = "Restock",
    params(("id" = String, Path, description = "ID da filial (UUID)")),
    responses((status = 200, description = "Pedidos da filial, mais recentes primeiro", body = Vec<RestockRequest>))
)]
pub async fn list_restocks(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RestockRequest>>, AppError> {
    let id = parse_id(&id, "branch")?;
    Ok(Json(app_state.branch_service.list_restocks(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/branches/{id}/restock/{restock_id}/approve",
    tag = "Restock",
    params(
        ("id" = String, Path, description = "ID da filial (UUID)"),
        ("restock_id" = String, Path, description = "ID do pedido (UUID)")
    ),
    responses(
        (status = 200, description = "Pedido aprovado", body = RestockRequest),
        (status = 404, description = "Pedido não encontrado nesta filial"),
        (status = 409, description = "Pedido já está em estado terminal")
    )
)]
pub async fn approve_restock(
    State(app_state): State<AppState>,
    Path((id, restock_id)): Path<(String, String)>,
) -> Result<Json<RestockRequest>, AppError> {
    let id = parse_id(&id, "branch")?;
    let restock_id = parse_id(&restock_id, "restock request")?;
    Ok(Json(app_state.branch_service.approve_restock(id, restock_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/branches/{id}/restock/{restock_id}/reject",
    tag = "Restock",
    params(
        ("id" = String, Path, description = "ID da filial (UUID)"),
        ("restock_id" = String, Path, description = "ID do pedido (UUID)")
    ),
    responses(
        (status = 200, description = "Pedido rejeitado", body = RestockRequest),
        (status = 404, description = "Pedido não encontrado nesta filial"),
        (status = 409, description = "Pedido já está em estado terminal")
    )
)]
pub async fn reject_restock(
    State(app_state): State<AppState>,
    Path((id, restock_id)): Path<(String, String)>,
) -> Result<Json<RestockRequest>, AppError> {
    let id = parse_id(&id, "branch")?;
    let restock_id = parse_id(&restock_id, "restock request")?;
    Ok(Json(app_state.branch_service.reject_restock(id, restock_id).await?))
}

// --- Produtos atribuídos ---

#[utoipa::path(
    get,
    path = "/api/branches/{id}/products",
    tag = "Branch Products",
    params(("id" = String, Path, description = "ID da filial (UUID)")),
    responses((status = 200, description = "Produtos atribuídos, na ordem de atribuição", body = Vec<Product>))
)]
pub async fn list_branch_products(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Product>>, AppError> {
    let id = parse_id(&id, "branch")?;
    Ok(Json(app_state.branch_service.products_of(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/branches/{id}/products",
    tag = "Branch Products",
    params(("id" = String, Path, description = "ID da filial (UUID)")),
    request_body = AssignProductPayload,
    responses(
        (status = 200, description = "Produto atribuído", body = BranchAssignment),
        (status = 400, description = "Produto já atribuído")
    )
)]
pub async fn assign_branch_product(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AssignProductPayload>, JsonRejection>,
) -> Result<Json<BranchAssignment>, AppError> {
    let id = parse_id(&id, "branch")?;
    let Json(payload) = payload?;
    let product_id = require_id(payload.product_id.as_deref(), "product")?;
    Ok(Json(app_state.branch_service.assign_product(id, product_id).await?))
}

#[utoipa::path(
    delete,
    path = "/api/branches/{id}/products/{product_id}",
    tag = "Branch Products",
    params(
        ("id" = String, Path, description = "ID da filial (UUID)"),
        ("product_id" = String, Path, description = "ID do produto (UUID)")
    ),
    responses(
        (status = 200, description = "Produto removido", body = Branch),
        (status = 400, description = "Produto não está atribuído")
    )
)]
pub async fn remove_branch_product(
    State(app_state): State<AppState>,
    Path((id, product_id)): Path<(String, String)>,
) -> Result<Json<Branch>, AppError> {
    let id = parse_id(&id, "branch")?;
    let product_id = parse_id(&product_id, "product")?;
    Ok(Json(app_state.branch_service.remove_product(id, product_id).await?))
}
