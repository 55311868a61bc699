// src/handlers/products.rs

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::{error::AppError, ids::parse_id},
    config::AppState,
    models::product::{CreateProductPayload, Product},
};

#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = Product),
        (status = 400, description = "Dados inválidos ou SKU duplicado")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    payload: Result<Json<CreateProductPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let product = app_state.product_service.create_product(payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Products",
    responses((status = 200, description = "Todos os produtos, mais recentes primeiro", body = Vec<Product>))
)]
pub async fn list_products(State(app_state): State<AppState>) -> Result<Json<Vec<Product>>, AppError> {
    Ok(Json(app_state.product_service.list_products().await?))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "ID do produto (UUID)")),
    responses(
        (status = 200, description = "Produto", body = Product),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>, AppError> {
    let id = parse_id(&id, "product")?;
    Ok(Json(app_state.product_service.get_product(id).await?))
}

#[utoipa::path(
    get,
    path = "/api/products/company/{id}",
    tag = "Products",
    params(("id" = String, Path, description = "ID da empresa (UUID)")),
    responses((status = 200, description = "Produtos da empresa", body = Vec<Product>))
)]
pub async fn list_company_products(
    State(app_state): State<AppState>,
    Path(company_id): Path<String>,
) -> Result<Json<Vec<Product>>, AppError> {
    let company_id = parse_id(&company_id, "company")?;
    Ok(Json(app_state.product_service.list_by_company(company_id).await?))
}
