// src/db/memory.rs
//
// Store em memória com a mesma semântica dos repositórios Postgres
// (unicidade, versão otimista, transição condicional). Usado quando não há
// DATABASE_URL e nos testes.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssignmentStore, BranchStore, ProductStore, RestockStore, UserStore, WarehouseStore},
    models::{
        auth::{NewUser, Role, User, UserChanges},
        branch::{Branch, NewBranch},
        product::{NewProduct, Product},
        restock::{NewRestockRequest, RestockRequest, RestockStatus},
        warehouse::{NewWarehouse, Warehouse},
    },
};

// Vetores em ordem de inserção; "mais recentes primeiro" é só iterar ao contrário.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    products: RwLock<Vec<Product>>,
    branches: RwLock<Vec<Branch>>,
    warehouses: RwLock<Vec<Warehouse>>,
    restocks: RwLock<Vec<RestockRequest>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users
            .iter()
            .any(|u| u.username == new_user.username || u.email == new_user.email)
        {
            return Err(AppError::UserAlreadyExists);
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn username_or_email_taken(&self, username: &str, email: &str) -> Result<bool, AppError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .any(|u| u.username == username || u.email == email))
    }

    async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .rev()
            .filter(|u| role.is_none_or(|r| u.role == r))
            .cloned()
            .collect())
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut users = self.users.write().await;
        let clash = users.iter().any(|u| {
            u.id != id
                && (changes.username.as_ref() == Some(&u.username)
                    || changes.email.as_ref() == Some(&u.email))
        });
        if clash {
            return Err(AppError::UserAlreadyExists);
        }
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn create_product(&self, new_product: NewProduct) -> Result<Product, AppError> {
        let mut products = self.products.write().await;
        if products.iter().any(|p| p.sku == new_product.sku) {
            return Err(AppError::SkuAlreadyExists);
        }
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            company_id: new_product.company_id,
            name: new_product.name,
            description: new_product.description,
            category: new_product.category,
            price: new_product.price,
            cost_price: new_product.cost_price,
            sku: new_product.sku,
            unit: new_product.unit,
            status: new_product.status,
            tag_name: new_product.tag_name,
            created_at: now,
            updated_at: now,
        };
        products.push(product.clone());
        Ok(product)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        Ok(self.products.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.products.read().await.iter().rev().cloned().collect())
    }

    async fn list_products_by_company(&self, company_id: Uuid) -> Result<Vec<Product>, AppError> {
        Ok(self
            .products
            .read()
            .await
            .iter()
            .rev()
            .filter(|p| p.company_id == company_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssignmentStore<Branch> for MemoryStore {
    async fn find_owner(&self, id: Uuid) -> Result<Option<Branch>, AppError> {
        Ok(self.branches.read().await.iter().find(|b| b.id == id).cloned())
    }

    async fn replace_products(
        &self,
        id: Uuid,
        products: &[Uuid],
        expected_version: i64,
    ) -> Result<Option<Branch>, AppError> {
        let mut branches = self.branches.write().await;
        match branches
            .iter_mut()
            .find(|b| b.id == id && b.version == expected_version)
        {
            Some(branch) => {
                branch.products = products.to_vec();
                branch.version += 1;
                branch.updated_at = Utc::now();
                Ok(Some(branch.clone()))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl BranchStore for MemoryStore {
    async fn create_branch(&self, new_branch: NewBranch) -> Result<Branch, AppError> {
        let now = Utc::now();
        let branch = Branch {
            id: Uuid::new_v4(),
            name: new_branch.name,
            location: new_branch.location,
            warehouse_id: new_branch.warehouse_id,
            manager_id: new_branch.manager_id,
            products: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        };
        self.branches.write().await.push(branch.clone());
        Ok(branch)
    }

    async fn list_branches(&self) -> Result<Vec<Branch>, AppError> {
        Ok(self.branches.read().await.clone())
    }

    async fn list_branches_by_warehouse(&self, warehouse_id: Uuid) -> Result<Vec<Branch>, AppError> {
        Ok(self
            .branches
            .read()
            .await
            .iter()
            .filter(|b| b.warehouse_id == warehouse_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AssignmentStore<Warehouse> for MemoryStore {
    async fn find_owner(&self, id: Uuid) -> Result<Option<Warehouse>, AppError> {
        Ok(self.warehouses.read().await.iter().find(|w| w.id == id).cloned())
    }

    async fn replace_products(
        &self,
        id: Uuid,
        products: &[Uuid],
        expected_version: i64,
    ) -> Result<Option<Warehouse>, AppError> {
        let mut warehouses = self.warehouses.write().await;
        match warehouses
            .iter_mut()
            .find(|w| w.id == id && w.version == expected_version)
        {
            Some(warehouse) => {
                warehouse.products = products.to_vec();
                warehouse.version += 1;
                warehouse.updated_at = Utc::now();
                Ok(Some(warehouse.clone()))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl WarehouseStore for MemoryStore {
    async fn create_warehouse(&self, new_warehouse: NewWarehouse) -> Result<Warehouse, AppError> {
        let now = Utc::now();
        let warehouse = Warehouse {
            id: Uuid::new_v4(),
            name: new_warehouse.name,
            location: new_warehouse.location,
            manager_id: new_warehouse.manager_id,
            company_id: new_warehouse.company_id,
            products: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        };
        self.warehouses.write().await.push(warehouse.clone());
        Ok(warehouse)
    }

    async fn list_warehouses(&self) -> Result<Vec<Warehouse>, AppError> {
        Ok(self.warehouses.read().await.clone())
    }
}

#[async_trait]
impl RestockStore for MemoryStore {
    async fn create_restock(&self, new_request: NewRestockRequest) -> Result<RestockRequest, AppError> {
        let now = Utc::now();
        let request = RestockRequest {
            id: Uuid::new_v4(),
            branch_id: new_request.branch_id,
            product_id: new_request.product_id,
            quantity: new_request.quantity,
            status: RestockStatus::Pending,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        self.restocks.write().await.push(request.clone());
        Ok(request)
    }

    async fn find_restock(&self, id: Uuid) -> Result<Option<RestockRequest>, AppError> {
        Ok(self.restocks.read().await.iter().find(|r| r.id == id).cloned())
    }

    async fn list_restocks_for_branch(&self, branch_id: Uuid) -> Result<Vec<RestockRequest>, AppError> {
        Ok(self
            .restocks
            .read()
            .await
            .iter()
            .rev()
            .filter(|r| r.branch_id == branch_id)
            .cloned()
            .collect())
    }

    async fn transition_restock(
        &self,
        id: Uuid,
        branch_id: Uuid,
        to: RestockStatus,
        only_from_pending: bool,
    ) -> Result<Option<RestockRequest>, AppError> {
        let mut restocks = self.restocks.write().await;
        let target = restocks.iter_mut().find(|r| {
            r.id == id
                && r.branch_id == branch_id
                && (!only_from_pending || r.status == RestockStatus::Pending)
        });
        Ok(target.map(|request| {
            request.status = to;
            request.version += 1;
            request.updated_at = Utc::now();
            request.clone()
        }))
    }
}
