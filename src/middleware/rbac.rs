// src/middleware/rbac.rs
//
// Controle de acesso por papel: uma tabela declarativa capacidade -> papéis
// e um único extrator que a consulta.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::{Role, User},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ListUsers,
    ManageUsers,
}

const CAPABILITIES: &[(Capability, &[Role])] = &[
    (Capability::ListUsers, &[Role::Admin, Role::Company]),
    (Capability::ManageUsers, &[Role::Admin]),
];

pub fn is_allowed(role: Role, capability: Capability) -> bool {
    CAPABILITIES
        .iter()
        .find(|(cap, _)| *cap == capability)
        .is_some_and(|(_, roles)| roles.contains(&role))
}

/// 1. O trait que liga um tipo marcador a uma capacidade
pub trait CapabilityDef: Send + Sync + 'static {
    const CAPABILITY: Capability;
}

/// 2. O extrator (guardião). Carrega o usuário já autorizado.
pub struct RequireCapability<C> {
    pub user: User,
    _capability: PhantomData<C>,
}

impl<C, S> FromRequestParts<S> for RequireCapability<C>
where
    C: CapabilityDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(user) = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !is_allowed(user.role, C::CAPABILITY) {
            tracing::warn!(
                user_id = %user.id,
                role = user.role.as_str(),
                capability = ?C::CAPABILITY,
                "acesso negado"
            );
            return Err(AppError::Forbidden);
        }

        Ok(RequireCapability { user, _capability: PhantomData })
    }
}

// ---
// DEFINIÇÃO DAS CAPACIDADES (TIPOS)
// ---

pub struct CanListUsers;
impl CapabilityDef for CanListUsers {
    const CAPABILITY: Capability = Capability::ListUsers;
}

pub struct CanManageUsers;
impl CapabilityDef for CanManageUsers {
    const CAPABILITY: Capability = Capability::ManageUsers;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_role_rules() {
        assert!(is_allowed(Role::Admin, Capability::ListUsers));
        assert!(is_allowed(Role::Company, Capability::ListUsers));
        assert!(!is_allowed(Role::Sales, Capability::ListUsers));
        assert!(!is_allowed(Role::BranchManager, Capability::ListUsers));

        assert!(is_allowed(Role::Admin, Capability::ManageUsers));
        assert!(!is_allowed(Role::Company, Capability::ManageUsers));
    }
}
