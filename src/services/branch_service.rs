// src/services/branch_service.rs

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

use crate::{
    clients::{Siblings, StockService, WarehouseLookup, ProductLookup},
    common::{
        error::AppError,
        ids::{parse_id, require_id},
    },
    config::{AppConfig, RestockTerminalPolicy},
    db::{AssignmentStore, BranchStore, RestockStore},
    models::{
        branch::{Branch, BranchAssignment, BranchWithWarehouse, CreateBranchPayload, NewBranch},
        product::Product,
        restock::{CreateRestockPayload, NewRestockRequest, RestockRequest, RestockStatus},
        stock::{StockAdjustPayload, StockAdjustment, StockRequestPayload},
    },
    services::{assignment::AssignmentService, stock_service::StockAdjustmentService},
};

#[derive(Clone)]
pub struct BranchService {
    branches: Arc<dyn BranchStore>,
    restocks: Arc<dyn RestockStore>,
    assignments: AssignmentService<Branch>,
    stock_adjustments: StockAdjustmentService,
    catalog: Arc<dyn ProductLookup>,
    warehouses: Arc<dyn WarehouseLookup>,
    stock: Arc<dyn StockService>,
    restock_policy: RestockTerminalPolicy,
}

impl BranchService {
    pub fn new(
        branches: Arc<dyn BranchStore>,
        branch_products: Arc<dyn AssignmentStore<Branch>>,
        restocks: Arc<dyn RestockStore>,
        siblings: &Siblings,
        config: &AppConfig,
    ) -> Self {
        Self {
            branches,
            restocks,
            assignments: AssignmentService::new(
                branch_products,
                siblings.catalog.clone(),
                config.assignment_max_attempts,
            ),
            stock_adjustments: StockAdjustmentService::new(
                siblings.stock.clone(),
                config.stock_adjust_max_attempts,
            ),
            catalog: siblings.catalog.clone(),
            warehouses: siblings.warehouses.clone(),
            stock: siblings.stock.clone(),
            restock_policy: config.restock_terminal_policy,
        }
    }

    // --- Filiais ---

    pub async fn create_branch(&self, payload: CreateBranchPayload) -> Result<Branch, AppError> {
        payload.validate()?;
        let warehouse_id = parse_id(&payload.warehouse_id, "warehouse")?;
        let manager_id = parse_id(&payload.manager_id, "manager")?;

        // A filial sempre pertence a um depósito existente.
        self.warehouses
            .fetch_warehouse(warehouse_id)
            .await
            .map_err(|e| AppError::from_client("warehouse", "Warehouse", e))?;

        let branch = self
            .branches
            .create_branch(NewBranch {
                name: payload.name,
                location: payload.location,
                warehouse_id,
                manager_id,
            })
            .await?;
        tracing::info!(branch_id = %branch.id, %warehouse_id, "filial criada");
        Ok(branch)
    }

    pub async fn list_branches(&self) -> Result<Vec<Branch>, AppError> {
        self.branches.list_branches().await
    }

    pub async fn get_branch(&self, id: Uuid) -> Result<Branch, AppError> {
        self.branches.find_owner(id).await?.ok_or(AppError::NotFound("Branch"))
    }

    pub async fn branches_by_warehouse(&self, warehouse_id: Uuid) -> Result<Vec<Branch>, AppError> {
        self.branches.list_branches_by_warehouse(warehouse_id).await
    }

    pub async fn branch_with_warehouse(&self, id: Uuid) -> Result<BranchWithWarehouse, AppError> {
        let branch = self.get_branch(id).await?;
        let warehouse = self
            .warehouses
            .fetch_warehouse(branch.warehouse_id)
            .await
            .map_err(|e| AppError::from_client("warehouse", "Warehouse", e))?;
        Ok(BranchWithWarehouse { branch, warehouse })
    }

    // --- Estoque ---

    pub async fn branch_stock(&self, id: Uuid) -> Result<Vec<Value>, AppError> {
        self.get_branch(id).await?;
        self.stock
            .branch_stock(id)
            .await
            .map_err(|e| AppError::from_client("stock", "Stock", e))
    }

    pub async fn adjust_stock(&self, id: Uuid, payload: StockAdjustPayload) -> Result<StockAdjustment, AppError> {
        let product_id = require_id(payload.product_id.as_deref(), "product")?;
        let delta = payload
            .quantity_change
            .ok_or_else(|| AppError::BadRequest("Missing quantityChange".into()))?;

        self.get_branch(id).await?;
        self.stock_adjustments.adjust(id, product_id, delta).await
    }

    pub async fn create_stock_request(&self, payload: StockRequestPayload) -> Result<Value, AppError> {
        payload.validate()?;
        parse_id(&payload.warehouse_id, "warehouse")?;
        let branch_id = parse_id(&payload.branch_id, "branch")?;
        parse_id(&payload.product_id, "product")?;

        let created = self
            .stock
            .create_stock_request(&payload)
            .await
            .map_err(|e| AppError::from_client("stock", "Stock request", e))?;
        tracing::info!(%branch_id, quantity = payload.quantity, "pedido de estoque enviado");
        Ok(created)
    }

    // --- Pedidos de reposição ---

    pub async fn create_restock(&self, branch_id: Uuid, payload: CreateRestockPayload) -> Result<RestockRequest, AppError> {
        payload.validate()?;
        let product_id = require_id(payload.product_id.as_deref(), "product")?;
        let quantity = payload
            .quantity
            .ok_or_else(|| AppError::BadRequest("Quantity is required".into()))?;

        self.get_branch(branch_id).await?;
        self.catalog
            .fetch_product(product_id)
            .await
            .map_err(|e| AppError::from_client("product", "Product", e))?;

        let request = self
            .restocks
            .create_restock(NewRestockRequest { branch_id, product_id, quantity })
            .await?;
        tracing::info!(restock_id = %request.id, %branch_id, %product_id, quantity, "pedido de reposição criado");
        Ok(request)
    }

    pub async fn list_restocks(&self, branch_id: Uuid) -> Result<Vec<RestockRequest>, AppError> {
        self.get_branch(branch_id).await?;
        self.restocks.list_restocks_for_branch(branch_id).await
    }

    pub async fn approve_restock(&self, branch_id: Uuid, restock_id: Uuid) -> Result<RestockRequest, AppError> {
        self.transition_restock(branch_id, restock_id, RestockStatus::Approved).await
    }

    pub async fn reject_restock(&self, branch_id: Uuid, restock_id: Uuid) -> Result<RestockRequest, AppError> {
        self.transition_restock(branch_id, restock_id, RestockStatus::Rejected).await
    }

    // Nenhuma transição mexe no estoque.
    async fn transition_restock(
        &self,
        branch_id: Uuid,
        restock_id: Uuid,
        to: RestockStatus,
    ) -> Result<RestockRequest, AppError> {
        let only_from_pending = self.restock_policy == RestockTerminalPolicy::Reject;
        if let Some(updated) = self
            .restocks
            .transition_restock(restock_id, branch_id, to, only_from_pending)
            .await?
        {
            tracing::info!(%restock_id, %branch_id, status = to.as_str(), "pedido de reposição atualizado");
            return Ok(updated);
        }

        // Nada mudou: ou não existe (nesta filial) ou já é terminal.
        match self.restocks.find_restock(restock_id).await? {
            Some(current) if current.branch_id == branch_id => Err(AppError::Conflict(format!(
                "Restock request is already {}",
                current.status.as_str()
            ))),
            _ => Err(AppError::NotFound("Restock request")),
        }
    }

    // --- Produtos atribuídos ---

    pub async fn products_of(&self, id: Uuid) -> Result<Vec<Product>, AppError> {
        self.assignments.products_of(id).await
    }

    pub async fn assign_product(&self, id: Uuid, product_id: Uuid) -> Result<BranchAssignment, AppError> {
        let (branch, product) = self.assignments.assign(id, product_id).await?;
        Ok(BranchAssignment { branch, product })
    }

    pub async fn remove_product(&self, id: Uuid, product_id: Uuid) -> Result<Branch, AppError> {
        self.assignments.remove(id, product_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::restock::RestockStatus,
        testing::{TestBed, TestBedOptions},
    };

    fn restock(product_id: Uuid, quantity: i64) -> CreateRestockPayload {
        CreateRestockPayload {
            product_id: Some(product_id.to_string()),
            quantity: Some(quantity),
        }
    }

    #[tokio::test]
    async fn branch_requires_an_existing_warehouse() {
        let bed = TestBed::new();
        let payload = CreateBranchPayload {
            name: "Centro".into(),
            location: "Rua A".into(),
            warehouse_id: Uuid::new_v4().to_string(),
            manager_id: Uuid::new_v4().to_string(),
        };
        assert!(matches!(
            bed.state.branch_service.create_branch(payload).await,
            Err(AppError::NotFound("Warehouse"))
        ));
    }

    // managerId só é validado no formato; a identidade não é consultada.
    #[tokio::test]
    async fn manager_id_is_checked_for_shape_only() {
        let bed = TestBed::new();
        let warehouse = bed.warehouses.add("Central").await;
        let manager_id = Uuid::new_v4();
        let branch = bed
            .state
            .branch_service
            .create_branch(CreateBranchPayload {
                name: "Centro".into(),
                location: "Rua A".into(),
                warehouse_id: warehouse.id.to_string(),
                manager_id: manager_id.to_string(),
            })
            .await
            .unwrap();
        assert_eq!(branch.manager_id, manager_id);

        let malformed = bed
            .state
            .branch_service
            .create_branch(CreateBranchPayload {
                name: "Centro".into(),
                location: "Rua A".into(),
                warehouse_id: warehouse.id.to_string(),
                manager_id: "boss".into(),
            })
            .await;
        assert!(matches!(malformed, Err(AppError::InvalidId("manager"))));
    }

    #[tokio::test]
    async fn restock_lifecycle_leaves_stock_untouched() {
        let bed = TestBed::new();
        let branch = bed.branch().await;
        let product = bed.catalog.add("Beans").await;
        bed.stock.seed(branch.id, product.id, 10).await;
        let service = &bed.state.branch_service;

        let created = service
            .create_restock(branch.id, restock(product.id, 50))
            .await
            .unwrap();
        assert_eq!(created.status, RestockStatus::Pending);

        let approved = service.approve_restock(branch.id, created.id).await.unwrap();
        assert_eq!(approved.status, RestockStatus::Approved);
        assert_eq!(bed.stock.quantity(branch.id, product.id).await, Some(10));

        let again = service.reject_restock(branch.id, created.id).await;
        assert!(matches!(again, Err(AppError::Conflict(msg)) if msg.contains("approved")));
    }

    #[tokio::test]
    async fn overwrite_policy_allows_re_transition() {
        let bed = TestBed::with(TestBedOptions {
            restock_policy: RestockTerminalPolicy::Overwrite,
        });
        let branch = bed.branch().await;
        let product = bed.catalog.add("Beans").await;
        let service = &bed.state.branch_service;

        let created = service.create_restock(branch.id, restock(product.id, 5)).await.unwrap();
        service.reject_restock(branch.id, created.id).await.unwrap();
        let approved = service.approve_restock(branch.id, created.id).await.unwrap();
        assert_eq!(approved.status, RestockStatus::Approved);
    }

    #[tokio::test]
    async fn restock_of_another_branch_is_not_found() {
        let bed = TestBed::new();
        let branch = bed.branch().await;
        let other = bed.branch().await;
        let product = bed.catalog.add("Beans").await;
        let service = &bed.state.branch_service;

        let created = service.create_restock(branch.id, restock(product.id, 5)).await.unwrap();
        assert!(matches!(
            service.approve_restock(other.id, created.id).await,
            Err(AppError::NotFound("Restock request"))
        ));
        assert!(matches!(
            service.approve_restock(branch.id, Uuid::new_v4()).await,
            Err(AppError::NotFound("Restock request"))
        ));
    }

    #[tokio::test]
    async fn restock_validates_quantity_and_product() {
        let bed = TestBed::new();
        let branch = bed.branch().await;
        let product = bed.catalog.add("Beans").await;
        let service = &bed.state.branch_service;

        assert!(matches!(
            service.create_restock(branch.id, restock(product.id, 0)).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            service.create_restock(branch.id, restock(Uuid::new_v4(), 3)).await,
            Err(AppError::NotFound("Product"))
        ));
        assert!(matches!(
            service.create_restock(Uuid::new_v4(), restock(product.id, 3)).await,
            Err(AppError::NotFound("Branch"))
        ));
    }

    #[tokio::test]
    async fn restocks_are_listed_newest_first() {
        let bed = TestBed::new();
        let branch = bed.branch().await;
        let product = bed.catalog.add("Beans").await;
        let service = &bed.state.branch_service;

        let first = service.create_restock(branch.id, restock(product.id, 1)).await.unwrap();
        let second = service.create_restock(branch.id, restock(product.id, 2)).await.unwrap();

        let ids: Vec<Uuid> = service
            .list_restocks(branch.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn stock_adjustment_requires_the_branch() {
        let bed = TestBed::new();
        let payload = StockAdjustPayload {
            product_id: Some(Uuid::new_v4().to_string()),
            quantity_change: Some(1),
        };
        assert!(matches!(
            bed.state.branch_service.adjust_stock(Uuid::new_v4(), payload).await,
            Err(AppError::NotFound("Branch"))
        ));
    }

    #[tokio::test]
    async fn stock_adjustment_needs_product_and_change() {
        let bed = TestBed::new();
        let branch = bed.branch().await;
        let service = &bed.state.branch_service;

        let no_product = StockAdjustPayload { product_id: None, quantity_change: Some(1) };
        assert!(matches!(
            service.adjust_stock(branch.id, no_product).await,
            Err(AppError::BadRequest(_))
        ));

        let no_change = StockAdjustPayload {
            product_id: Some(Uuid::new_v4().to_string()),
            quantity_change: None,
        };
        assert!(matches!(
            service.adjust_stock(branch.id, no_change).await,
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn branch_with_warehouse_joins_both() {
        let bed = TestBed::new();
        let branch = bed.branch().await;
        let joined = bed.state.branch_service.branch_with_warehouse(branch.id).await.unwrap();
        assert_eq!(joined.warehouse.id, branch.warehouse_id);
    }

    #[tokio::test]
    async fn stock_requests_are_forwarded() {
        let bed = TestBed::new();
        let payload = StockRequestPayload {
            warehouse_id: Uuid::new_v4().to_string(),
            branch_id: Uuid::new_v4().to_string(),
            product_id: Uuid::new_v4().to_string(),
            quantity: 4,
        };
        let created = bed.state.branch_service.create_stock_request(payload).await.unwrap();
        assert_eq!(created["status"], "pending");
        assert_eq!(bed.stock.requests().await.len(), 1);
    }
}
