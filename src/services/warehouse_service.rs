// src/services/warehouse_service.rs

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{
    clients::{BranchLookup, ClientError, CompanyService, Siblings, StockDecision, StockService},
    common::{error::AppError, ids::parse_id},
    config::AppConfig,
    db::{AssignmentStore, WarehouseStore},
    models::{
        product::Product,
        stock::WarehouseStock,
        warehouse::{
            CreateWarehousePayload, NewWarehouse, ReplenishPayload, Warehouse, WarehouseAssignment,
            WarehouseWithBranches,
        },
    },
    services::assignment::AssignmentService,
};

#[derive(Clone)]
pub struct WarehouseService {
    warehouses: Arc<dyn WarehouseStore>,
    assignments: AssignmentService<Warehouse>,
    branches: Arc<dyn BranchLookup>,
    stock: Arc<dyn StockService>,
    company: Arc<dyn CompanyService>,
}

impl WarehouseService {
    pub fn new(
        warehouses: Arc<dyn WarehouseStore>,
        warehouse_products: Arc<dyn AssignmentStore<Warehouse>>,
        siblings: &Siblings,
        config: &AppConfig,
    ) -> Self {
        Self {
            warehouses,
            assignments: AssignmentService::new(
                warehouse_products,
                siblings.catalog.clone(),
                config.assignment_max_attempts,
            ),
            branches: siblings.branches.clone(),
            stock: siblings.stock.clone(),
            company: siblings.company.clone(),
        }
    }

    pub async fn create_warehouse(&self, payload: CreateWarehousePayload) -> Result<Warehouse, AppError> {
        payload.validate()?;
        let manager_id = parse_id(&payload.manager_id, "manager")?;
        let company_id = payload
            .company_id
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| parse_id(raw, "company"))
            .transpose()?;

        let warehouse = self
            .warehouses
            .create_warehouse(NewWarehouse {
                name: payload.name,
                location: payload.location,
                manager_id,
                company_id,
            })
            .await?;
        tracing::info!(warehouse_id = %warehouse.id, "depósito criado");
        Ok(warehouse)
    }

    pub async fn list_warehouses(&self) -> Result<Vec<Warehouse>, AppError> {
        self.warehouses.list_warehouses().await
    }

    pub async fn get_warehouse(&self, id: Uuid) -> Result<Warehouse, AppError> {
        self.warehouses
            .find_owner(id)
            .await?
            .ok_or(AppError::NotFound("Warehouse"))
    }

    /// Depósito + filiais vindas do serviço de filiais (404 de lá vira lista vazia).
    pub async fn with_branches(&self, id: Uuid) -> Result<WarehouseWithBranches, AppError> {
        let warehouse = self.get_warehouse(id).await?;
        let branches = match self.branches.branches_of_warehouse(id).await {
            Ok(branches) => branches,
            Err(ClientError::NotFound) => Vec::new(),
            Err(e) => return Err(AppError::from_client("branch", "Branch", e)),
        };
        Ok(WarehouseWithBranches { warehouse, branches })
    }

    pub async fn warehouse_stock(&self, id: Uuid) -> Result<WarehouseStock, AppError> {
        self.get_warehouse(id).await?;
        let stock = self
            .stock
            .warehouse_stock(id)
            .await
            .map_err(|e| AppError::from_client("stock", "Stock", e))?;
        Ok(WarehouseStock { warehouse_id: id, stock })
    }

    pub async fn decide_stock_request(&self, request_id: &str, decision: StockDecision) -> Result<Value, AppError> {
        let request_id = request_id.trim();
        if request_id.is_empty() {
            return Err(AppError::BadRequest("Missing stock request ID".into()));
        }
        let outcome = self
            .stock
            .decide_stock_request(request_id, decision)
            .await
            .map_err(|e| AppError::from_client("stock", "Stock request", e))?;
        tracing::info!(%request_id, decision = decision.as_path(), "pedido de estoque decidido");
        Ok(outcome)
    }

    pub async fn request_replenish(&self, id: Uuid, payload: ReplenishPayload) -> Result<Value, AppError> {
        payload.validate()?;
        let company_id = parse_id(&payload.company_id, "company")?;
        let product_id = parse_id(&payload.product_id, "product")?;
        self.get_warehouse(id).await?;

        let created = self
            .company
            .send_replenish_request(company_id, id, product_id, payload.quantity)
            .await
            .map_err(|e| AppError::from_client("company", "Company", e))?;
        tracing::info!(warehouse_id = %id, %company_id, %product_id, quantity = payload.quantity, "reposição solicitada à empresa");
        Ok(created)
    }

    // --- Produtos atribuídos ---

    pub async fn products_of(&self, id: Uuid) -> Result<Vec<Product>, AppError> {
        self.assignments.products_of(id).await
    }

    pub async fn assign_product(&self, id: Uuid, product_id: Uuid) -> Result<WarehouseAssignment, AppError> {
        let (warehouse, product) = self.assignments.assign(id, product_id).await?;
        Ok(WarehouseAssignment { warehouse, product })
    }

    pub async fn remove_product(&self, id: Uuid, product_id: Uuid) -> Result<Warehouse, AppError> {
        self.assignments.remove(id, product_id).await
    }
}
