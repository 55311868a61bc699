// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserStore,
    models::auth::{
        AuthResponse, Claims, CreateUserPayload, NewUser, RegisterUserPayload, Role, UpdateUserPayload,
        User, UserChanges,
    },
};

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt_secret: Option<String>,
    token_ttl_hours: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        jwt_secret: Option<String>,
        token_ttl_hours: i64,
        bcrypt_cost: u32,
    ) -> Self {
        Self { users, jwt_secret, token_ttl_hours, bcrypt_cost }
    }

    pub async fn register_user(&self, payload: RegisterUserPayload) -> Result<User, AppError> {
        if payload.password != payload.confirm_password {
            return Err(AppError::BadRequest("Passwords do not match".into()));
        }
        self.insert_user(
            payload.username,
            payload.email,
            payload.password,
            payload.role.unwrap_or_default(),
        )
        .await
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // bcrypt é caro: roda fora do executor
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user)?;
        tracing::info!(user_id = %user.id, role = user.role.as_str(), "login concluído");
        Ok(AuthResponse { token, user })
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        // Sem segredo nenhum token pode ser válido.
        let secret = self.jwt_secret.as_deref().ok_or(AppError::InvalidToken)?;
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        // Usuário apagado depois de emitido o token
        self.users
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    /// Admin vê todos; empresa vê só gerentes de depósito.
    pub async fn list_users(&self, viewer: &User) -> Result<Vec<User>, AppError> {
        let filter = match viewer.role {
            Role::Admin => None,
            Role::Company => Some(Role::WarehouseManager),
            _ => return Err(AppError::Forbidden),
        };
        self.users.list_users(filter).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, AppError> {
        self.users.find_by_id(id).await?.ok_or(AppError::NotFound("User"))
    }

    pub async fn create_user(&self, payload: CreateUserPayload) -> Result<User, AppError> {
        self.insert_user(payload.username, payload.email, payload.password, payload.role)
            .await
    }

    pub async fn update_user(&self, id: Uuid, payload: UpdateUserPayload) -> Result<User, AppError> {
        let changes = UserChanges {
            username: payload.username,
            email: payload.email,
            role: payload.role,
        };
        self.users
            .update_user(id, changes)
            .await?
            .ok_or(AppError::NotFound("User"))
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        if self.users.delete_user(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("User"))
        }
    }

    async fn insert_user(
        &self,
        username: String,
        email: String,
        password: String,
        role: Role,
    ) -> Result<User, AppError> {
        // Checagem antecipada evita um hash bcrypt à toa; a constraint UNIQUE cobre a corrida.
        if self.users.username_or_email_taken(&username, &email).await? {
            return Err(AppError::UserAlreadyExists);
        }

        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let user = self
            .users
            .create_user(NewUser { username, email, password_hash, role })
            .await?;
        tracing::info!(user_id = %user.id, role = role.as_str(), "usuário criado");
        Ok(user)
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let secret = self.jwt_secret.as_deref().ok_or(AppError::MissingSigningSecret)?;
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(self.token_ttl_hours);

        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?)
    }
}
