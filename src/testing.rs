// src/testing.rs
//
// Fakes em memória dos serviços irmãos e um estado de aplicação pronto para testes.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    clients::{
        BranchLookup, ClientError, CompanyService, ProductLookup, Siblings, StockDecision, StockService,
        WarehouseLookup,
    },
    config::{AppConfig, AppState, RestockTerminalPolicy},
    db::{MemoryStore, Stores},
    models::{
        branch::{Branch, CreateBranchPayload},
        product::{Product, ProductStatus},
        stock::{StockRecord, StockRequestPayload},
        warehouse::Warehouse,
    },
    routes,
};

fn down() -> ClientError {
    ClientError::Transport("connection refused".into())
}

// --- Catálogo de produtos ---

#[derive(Default)]
struct CatalogState {
    products: HashMap<Uuid, Product>,
    failing: HashSet<Uuid>,
    erroring: HashSet<Uuid>,
}

#[derive(Clone, Default)]
pub struct FakeCatalog {
    inner: Arc<Mutex<CatalogState>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, name: &str) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            company_id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("{name} description"),
            category: "General".into(),
            price: Decimal::new(1000, 2),
            cost_price: Decimal::new(700, 2),
            sku: format!("SKU-{}", Uuid::new_v4().simple()),
            unit: "un".into(),
            status: ProductStatus::Active,
            tag_name: None,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().await.products.insert(product.id, product.clone());
        product
    }

    /// A busca deste produto passa a falhar como se o catálogo estivesse fora.
    pub async fn fail(&self, id: Uuid) {
        self.inner.lock().await.failing.insert(id);
    }

    /// O catálogo responde, mas com 500 para este produto.
    pub async fn answer_error(&self, id: Uuid) {
        self.inner.lock().await.erroring.insert(id);
    }
}

#[async_trait]
impl ProductLookup for FakeCatalog {
    async fn fetch_product(&self, id: Uuid) -> Result<Product, ClientError> {
        tokio::task::yield_now().await;
        let state = self.inner.lock().await;
        if state.failing.contains(&id) {
            return Err(down());
        }
        if state.erroring.contains(&id) {
            return Err(ClientError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        }
        state.products.get(&id).cloned().ok_or(ClientError::NotFound)
    }
}

// --- Serviço de estoque ---

#[derive(Default)]
struct StockState {
    records: Vec<StockRecord>,
    requests: Vec<Value>,
    writes: u32,
    down: bool,
    always_conflict: bool,
}

#[derive(Clone, Default)]
pub struct FakeStock {
    inner: Arc<Mutex<StockState>>,
}

impl FakeStock {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, branch_id: Uuid, product_id: Uuid, quantity: i64) -> String {
        let id = format!("stk-{}", Uuid::new_v4().simple());
        self.inner.lock().await.records.push(StockRecord {
            id: id.clone(),
            branch_id,
            product_id,
            quantity,
            version: Some(0),
        });
        id
    }

    pub async fn quantity(&self, branch_id: Uuid, product_id: Uuid) -> Option<i64> {
        self.inner
            .lock()
            .await
            .records
            .iter()
            .find(|r| r.branch_id == branch_id && r.product_id == product_id)
            .map(|r| r.quantity)
    }

    pub async fn writes(&self) -> u32 {
        self.inner.lock().await.writes
    }

    pub async fn requests(&self) -> Vec<Value> {
        self.inner.lock().await.requests.clone()
    }

    /// Cria um pedido filial -> depósito pendente e devolve o id.
    pub async fn open_request(&self) -> String {
        let id = format!("req-{}", Uuid::new_v4().simple());
        self.inner
            .lock()
            .await
            .requests
            .push(json!({ "_id": id, "status": "pending" }));
        id
    }

    pub async fn set_down(&self, down: bool) {
        self.inner.lock().await.down = down;
    }

    pub async fn always_conflict(&self, on: bool) {
        self.inner.lock().await.always_conflict = on;
    }
}

#[async_trait]
impl StockService for FakeStock {
    async fn records_for(&self, branch_id: Uuid, product_id: Uuid) -> Result<Vec<StockRecord>, ClientError> {
        tokio::task::yield_now().await;
        let state = self.inner.lock().await;
        if state.down {
            return Err(down());
        }
        Ok(state
            .records
            .iter()
            .filter(|r| r.branch_id == branch_id && r.product_id == product_id)
            .cloned()
            .collect())
    }

    async fn write_quantity(
        &self,
        stock_id: &str,
        quantity: i64,
        expected_version: Option<i64>,
    ) -> Result<StockRecord, ClientError> {
        tokio::task::yield_now().await;
        let mut state = self.inner.lock().await;
        if state.down {
            return Err(down());
        }
        if state.always_conflict {
            return Err(ClientError::Conflict);
        }
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == stock_id)
            .ok_or(ClientError::NotFound)?;
        if expected_version.is_some() && record.version != expected_version {
            return Err(ClientError::Conflict);
        }
        record.quantity = quantity;
        record.version = record.version.map(|v| v + 1);
        let stored = record.clone();
        state.writes += 1;
        Ok(stored)
    }

    async fn branch_stock(&self, branch_id: Uuid) -> Result<Vec<Value>, ClientError> {
        let state = self.inner.lock().await;
        if state.down {
            return Err(down());
        }
        Ok(state
            .records
            .iter()
            .filter(|r| r.branch_id == branch_id)
            .map(|r| json!(r))
            .collect())
    }

    async fn warehouse_stock(&self, _warehouse_id: Uuid) -> Result<Vec<Value>, ClientError> {
        let state = self.inner.lock().await;
        if state.down {
            return Err(down());
        }
        Ok(vec![json!({ "productId": Uuid::nil(), "quantity": 0 })])
    }

    async fn create_stock_request(&self, request: &StockRequestPayload) -> Result<Value, ClientError> {
        let mut state = self.inner.lock().await;
        if state.down {
            return Err(down());
        }
        let created = json!({
            "_id": format!("req-{}", Uuid::new_v4().simple()),
            "warehouseId": request.warehouse_id,
            "branchId": request.branch_id,
            "productId": request.product_id,
            "quantity": request.quantity,
            "status": "pending",
        });
        state.requests.push(created.clone());
        Ok(created)
    }

    async fn decide_stock_request(&self, request_id: &str, decision: StockDecision) -> Result<Value, ClientError> {
        let mut state = self.inner.lock().await;
        if state.down {
            return Err(down());
        }
        let request = state
            .requests
            .iter_mut()
            .find(|r| r["_id"] == request_id)
            .ok_or(ClientError::NotFound)?;
        request["status"] = json!(match decision {
            StockDecision::Approve => "approved",
            StockDecision::Reject => "rejected",
        });
        Ok(request.clone())
    }
}

// --- Serviço de depósitos (visto pela filial) ---

#[derive(Clone, Default)]
pub struct FakeWarehouses {
    inner: Arc<Mutex<HashMap<Uuid, Warehouse>>>,
}

impl FakeWarehouses {
    pub async fn add(&self, name: &str) -> Warehouse {
        let now = Utc::now();
        let warehouse = Warehouse {
            id: Uuid::new_v4(),
            name: name.to_string(),
            location: "Distrito Industrial".into(),
            manager_id: Uuid::new_v4(),
            company_id: None,
            products: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        };
        self.inner.lock().await.insert(warehouse.id, warehouse.clone());
        warehouse
    }
}

#[async_trait]
impl WarehouseLookup for FakeWarehouses {
    async fn fetch_warehouse(&self, id: Uuid) -> Result<Warehouse, ClientError> {
        self.inner.lock().await.get(&id).cloned().ok_or(ClientError::NotFound)
    }
}

// --- Serviço de filiais (visto pelo depósito) ---

#[derive(Default)]
struct BranchesState {
    by_warehouse: HashMap<Uuid, Vec<Branch>>,
    down: bool,
}

#[derive(Clone, Default)]
pub struct FakeBranches {
    inner: Arc<Mutex<BranchesState>>,
}

impl FakeBranches {
    pub async fn add(&self, warehouse_id: Uuid, name: &str) -> Branch {
        let now = Utc::now();
        let branch = Branch {
            id: Uuid::new_v4(),
            name: name.to_string(),
            location: "Centro".into(),
            warehouse_id,
            manager_id: Uuid::new_v4(),
            products: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .lock()
            .await
            .by_warehouse
            .entry(warehouse_id)
            .or_default()
            .push(branch.clone());
        branch
    }

    pub async fn set_down(&self, down: bool) {
        self.inner.lock().await.down = down;
    }
}

#[async_trait]
impl BranchLookup for FakeBranches {
    // Depósito sem filiais responde 404, como o serviço real fazia.
    async fn branches_of_warehouse(&self, warehouse_id: Uuid) -> Result<Vec<Branch>, ClientError> {
        let state = self.inner.lock().await;
        if state.down {
            return Err(down());
        }
        state
            .by_warehouse
            .get(&warehouse_id)
            .cloned()
            .ok_or(ClientError::NotFound)
    }
}

// --- Serviço de empresas ---

#[derive(Clone, Default)]
pub struct FakeCompany {
    inner: Arc<Mutex<Vec<(Uuid, Uuid, Uuid, i64)>>>,
}

impl FakeCompany {
    /// (empresa, depósito, produto, quantidade) na ordem de envio.
    pub async fn sent(&self) -> Vec<(Uuid, Uuid, Uuid, i64)> {
        self.inner.lock().await.clone()
    }
}

#[async_trait]
impl CompanyService for FakeCompany {
    async fn send_replenish_request(
        &self,
        company_id: Uuid,
        warehouse_id: Uuid,
        product_id: Uuid,
        quantity: i64,
    ) -> Result<Value, ClientError> {
        self.inner
            .lock()
            .await
            .push((company_id, warehouse_id, product_id, quantity));
        Ok(json!({
            "companyId": company_id,
            "warehouseId": warehouse_id,
            "productId": product_id,
            "quantity": quantity,
            "status": "pending",
        }))
    }
}

// --- Estado montado ---

#[derive(Debug, Clone, Copy, Default)]
pub struct TestBedOptions {
    pub restock_policy: RestockTerminalPolicy,
}

pub struct TestBed {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub catalog: FakeCatalog,
    pub stock: FakeStock,
    pub warehouses: FakeWarehouses,
    pub branches: FakeBranches,
    pub company: FakeCompany,
}

impl TestBed {
    pub fn new() -> Self {
        Self::with(TestBedOptions::default())
    }

    pub fn with(options: TestBedOptions) -> Self {
        let config = AppConfig {
            jwt_secret: Some("test-secret".into()),
            bcrypt_cost: 4,
            restock_terminal_policy: options.restock_policy,
            ..AppConfig::default()
        };

        let store = Arc::new(MemoryStore::new());
        let (catalog, stock) = (FakeCatalog::new(), FakeStock::new());
        let (warehouses, branches, company) =
            (FakeWarehouses::default(), FakeBranches::default(), FakeCompany::default());

        let siblings = Siblings {
            catalog: Arc::new(catalog.clone()),
            warehouses: Arc::new(warehouses.clone()),
            branches: Arc::new(branches.clone()),
            stock: Arc::new(stock.clone()),
            company: Arc::new(company.clone()),
        };
        let state = AppState::assemble(
            Arc::new(config),
            Stores::shared_memory(store.clone()),
            siblings,
        );

        Self { state, store, catalog, stock, warehouses, branches, company }
    }

    /// Filial recém-criada, ligada a um depósito conhecido pelo fake.
    pub async fn branch(&self) -> Branch {
        let warehouse = self.warehouses.add("Central").await;
        self.state
            .branch_service
            .create_branch(CreateBranchPayload {
                name: "Centro".into(),
                location: "Rua A, 10".into(),
                warehouse_id: warehouse.id.to_string(),
                manager_id: Uuid::new_v4().to_string(),
            })
            .await
            .expect("branch")
    }

    pub fn router(&self) -> Router {
        routes::app(self.state.clone())
    }
}
