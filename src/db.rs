// src/db.rs
//
// Cada serviço fala com a persistência através destes traits.
// Há duas implementações: Postgres (produção) e memória (dev sem DATABASE_URL e testes).

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        auth::{NewUser, Role, User, UserChanges},
        branch::{Branch, NewBranch},
        product::{NewProduct, Product},
        restock::{NewRestockRequest, RestockRequest, RestockStatus},
        warehouse::{NewWarehouse, Warehouse},
    },
};

pub mod branch_repo;
pub mod memory;
pub mod product_repo;
pub mod restock_repo;
pub mod user_repo;
pub mod warehouse_repo;

pub use branch_repo::BranchRepository;
pub use memory::MemoryStore;
pub use product_repo::ProductRepository;
pub use restock_repo::RestockRepository;
pub use user_repo::UserRepository;
pub use warehouse_repo::WarehouseRepository;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Username e e-mail são únicos: duplicado vira `AppError::UserAlreadyExists`.
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn username_or_email_taken(&self, username: &str, email: &str) -> Result<bool, AppError>;
    async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>, AppError>;
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError>;
    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    /// SKU duplicado vira `AppError::SkuAlreadyExists`.
    async fn create_product(&self, new_product: NewProduct) -> Result<Product, AppError>;
    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError>;
    /// Mais recentes primeiro.
    async fn list_products(&self) -> Result<Vec<Product>, AppError>;
    async fn list_products_by_company(&self, company_id: Uuid) -> Result<Vec<Product>, AppError>;
}

// Dono de um conjunto de produtos atribuídos (filial ou depósito).
pub trait Assignable: Clone + Send + Sync + 'static {
    /// Nome usado nas mensagens ("Branch not found").
    const ENTITY: &'static str;

    fn id(&self) -> Uuid;
    fn products(&self) -> &[Uuid];
    fn version(&self) -> i64;
}

impl Assignable for Branch {
    const ENTITY: &'static str = "Branch";

    fn id(&self) -> Uuid {
        self.id
    }
    fn products(&self) -> &[Uuid] {
        &self.products
    }
    fn version(&self) -> i64 {
        self.version
    }
}

impl Assignable for Warehouse {
    const ENTITY: &'static str = "Warehouse";

    fn id(&self) -> Uuid {
        self.id
    }
    fn products(&self) -> &[Uuid] {
        &self.products
    }
    fn version(&self) -> i64 {
        self.version
    }
}

#[async_trait]
pub trait AssignmentStore<T: Assignable>: Send + Sync {
    async fn find_owner(&self, id: Uuid) -> Result<Option<T>, AppError>;

    /// Escrita condicional: só grava se a versão atual for `expected_version`.
    /// `None` quando a versão mudou (ou o dono sumiu) no meio do caminho.
    async fn replace_products(
        &self,
        id: Uuid,
        products: &[Uuid],
        expected_version: i64,
    ) -> Result<Option<T>, AppError>;
}

#[async_trait]
pub trait BranchStore: AssignmentStore<Branch> {
    async fn create_branch(&self, new_branch: NewBranch) -> Result<Branch, AppError>;
    async fn list_branches(&self) -> Result<Vec<Branch>, AppError>;
    async fn list_branches_by_warehouse(&self, warehouse_id: Uuid) -> Result<Vec<Branch>, AppError>;
}

#[async_trait]
pub trait WarehouseStore: AssignmentStore<Warehouse> {
    async fn create_warehouse(&self, new_warehouse: NewWarehouse) -> Result<Warehouse, AppError>;
    async fn list_warehouses(&self) -> Result<Vec<Warehouse>, AppError>;
}

#[async_trait]
pub trait RestockStore: Send + Sync {
    async fn create_restock(&self, new_request: NewRestockRequest) -> Result<RestockRequest, AppError>;
    async fn find_restock(&self, id: Uuid) -> Result<Option<RestockRequest>, AppError>;
    /// Mais recentes primeiro.
    async fn list_restocks_for_branch(&self, branch_id: Uuid) -> Result<Vec<RestockRequest>, AppError>;

    /// Grava o novo status numa única operação condicional.
    /// Com `only_from_pending`, só altera pedidos ainda pendentes.
    /// `None` quando nada foi alterado.
    async fn transition_restock(
        &self,
        id: Uuid,
        branch_id: Uuid,
        to: RestockStatus,
        only_from_pending: bool,
    ) -> Result<Option<RestockRequest>, AppError>;
}

/// Todas as stores de uma instância, já como objetos de trait.
#[derive(Clone)]
pub struct Stores {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub branches: Arc<dyn BranchStore>,
    pub branch_products: Arc<dyn AssignmentStore<Branch>>,
    pub warehouses: Arc<dyn WarehouseStore>,
    pub warehouse_products: Arc<dyn AssignmentStore<Warehouse>>,
    pub restocks: Arc<dyn RestockStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        let branches = Arc::new(BranchRepository::new(pool.clone()));
        let warehouses = Arc::new(WarehouseRepository::new(pool.clone()));
        Self {
            users: Arc::new(UserRepository::new(pool.clone())),
            products: Arc::new(ProductRepository::new(pool.clone())),
            branches: branches.clone(),
            branch_products: branches,
            warehouses: warehouses.clone(),
            warehouse_products: warehouses,
            restocks: Arc::new(RestockRepository::new(pool)),
        }
    }

    pub fn memory() -> Self {
        Self::shared_memory(Arc::new(MemoryStore::new()))
    }

    /// Usa a mesma `MemoryStore` para tudo (os testes inspecionam o conteúdo).
    pub fn shared_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            users: store.clone(),
            products: store.clone(),
            branches: store.clone(),
            branch_products: store.clone(),
            warehouses: store.clone(),
            warehouse_products: store.clone(),
            restocks: store,
        }
    }
}
