// src/handlers/auth.rs

use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::{error::AppError, ids::parse_id},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{CanListUsers, CanManageUsers, RequireCapability},
    },
    models::auth::{
        AuthResponse, CreateUserPayload, LoginUserPayload, RegisterUserPayload, Role, UpdateUserPayload,
        User,
    },
};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = User),
        (status = 400, description = "Dados inválidos ou usuário já existe")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    payload: Result<Json<RegisterUserPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let user = app_state.auth_service.register_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login efetuado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    payload: Result<Json<LoginUserPayload>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let session = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;
    Ok(Json(session))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Users",
    responses((status = 200, description = "Usuário logado", body = User)),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

#[utoipa::path(
    get,
    path = "/api/auth/roles",
    tag = "Auth",
    responses((status = 200, description = "Papéis disponíveis", body = Vec<String>))
)]
pub async fn list_roles() -> Json<Vec<&'static str>> {
    Json(Role::ALL.iter().map(Role::as_str).collect())
}

#[utoipa::path(
    get,
    path = "/api/auth/users",
    tag = "Users",
    responses(
        (status = 200, description = "Usuários visíveis para o papel do solicitante", body = Vec<User>),
        (status = 403, description = "Papel sem acesso")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    guard: RequireCapability<CanListUsers>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = app_state.auth_service.list_users(&guard.user).await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/auth/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "ID do usuário (UUID)")),
    responses(
        (status = 200, description = "Usuário", body = User),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_user(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanManageUsers>,
    Path(id): Path<String>,
) -> Result<Json<User>, AppError> {
    let id = parse_id(&id, "user")?;
    Ok(Json(app_state.auth_service.get_user(id).await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses((status = 201, description = "Usuário criado", body = User)),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanManageUsers>,
    payload: Result<Json<CreateUserPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let user = app_state.auth_service.create_user(payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    put,
    path = "/api/auth/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "ID do usuário (UUID)")),
    request_body = UpdateUserPayload,
    responses((status = 200, description = "Usuário atualizado", body = User)),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanManageUsers>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateUserPayload>, JsonRejection>,
) -> Result<Json<User>, AppError> {
    let id = parse_id(&id, "user")?;
    let Json(payload) = payload?;
    payload.validate()?;

    Ok(Json(app_state.auth_service.update_user(id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/auth/users/{id}",
    tag = "Users",
    params(("id" = String, Path, description = "ID do usuário (UUID)")),
    responses((status = 204, description = "Usuário removido")),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    _guard: RequireCapability<CanManageUsers>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "user")?;
    app_state.auth_service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
