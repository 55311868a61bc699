// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Papéis fixos do sistema. Mapeia o tipo `user_role` do Postgres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Admin,
    Company,
    WarehouseManager,
    BranchManager,
    #[default]
    Sales,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Company,
        Role::WarehouseManager,
        Role::BranchManager,
        Role::Sales,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Company => "company",
            Role::WarehouseManager => "warehouse-manager",
            Role::BranchManager => "branch-manager",
            Role::Sales => "sales",
        }
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "jdoe@example.com")]
    pub email: String,

    #[serde(skip_serializing)] // nunca sai na resposta
    #[schema(ignore)]
    pub password_hash: String,

    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dados já validados para gravar um usuário novo.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Alterações permitidas ao admin (a senha não muda por aqui).
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 1, message = "Username is required."))]
    pub username: String,
    #[validate(email(message = "The e-mail is invalid."))]
    pub email: String,
    #[validate(length(min = 6, message = "The password must have at least 6 characters."))]
    pub password: String,
    pub confirm_password: String,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "The e-mail is invalid."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

// Criação de usuário pelo admin (sem confirmação de senha)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserPayload {
    #[validate(length(min = 1, message = "Username is required."))]
    pub username: String,
    #[validate(email(message = "The e-mail is invalid."))]
    pub email: String,
    #[validate(length(min = 6, message = "The password must have at least 6 characters."))]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "Username cannot be empty."))]
    pub username: Option<String>,
    #[validate(email(message = "The e-mail is invalid."))]
    pub email: Option<String>,
    pub role: Option<Role>,
}

// Resposta de login: token + resumo do usuário
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// "Claims" do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}
