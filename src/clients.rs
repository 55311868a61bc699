// src/clients.rs
//
// O que cada serviço precisa dos irmãos, expresso como traits tipados.
// Produção usa as implementações HTTP (reqwest); os testes usam fakes.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    models::{
        branch::Branch, product::Product, stock::StockRecord, stock::StockRequestPayload,
        warehouse::Warehouse,
    },
};

pub mod http;

pub use http::{BranchClient, CompanyClient, ProductClient, StockClient, WarehouseClient};

#[derive(Debug, Error)]
pub enum ClientError {
    /// 404 confirmado pelo serviço remoto.
    #[error("resource not found")]
    NotFound,

    /// Escrita condicional recusada (versão mudou).
    #[error("version conflict")]
    Conflict,

    /// Nenhuma resposta chegou (conexão recusada, timeout, DNS).
    #[error("request failed: {0}")]
    Transport(String),

    /// O serviço respondeu, mas com status de erro.
    #[error("remote answered {0}")]
    Status(StatusCode),

    #[error("unexpected response body: {0}")]
    Decode(String),
}

#[async_trait]
pub trait ProductLookup: Send + Sync {
    async fn fetch_product(&self, id: Uuid) -> Result<Product, ClientError>;
}

#[async_trait]
pub trait WarehouseLookup: Send + Sync {
    async fn fetch_warehouse(&self, id: Uuid) -> Result<Warehouse, ClientError>;
}

#[async_trait]
pub trait BranchLookup: Send + Sync {
    async fn branches_of_warehouse(&self, warehouse_id: Uuid) -> Result<Vec<Branch>, ClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockDecision {
    Approve,
    Reject,
}

impl StockDecision {
    pub fn as_path(&self) -> &'static str {
        match self {
            StockDecision::Approve => "approve",
            StockDecision::Reject => "reject",
        }
    }
}

// Serviço de estoque externo: dono dos saldos e dos pedidos filial -> depósito.
#[async_trait]
pub trait StockService: Send + Sync {
    async fn records_for(&self, branch_id: Uuid, product_id: Uuid) -> Result<Vec<StockRecord>, ClientError>;

    /// Com `expected_version`, o serviço responde 409 se o registro mudou.
    async fn write_quantity(
        &self,
        stock_id: &str,
        quantity: i64,
        expected_version: Option<i64>,
    ) -> Result<StockRecord, ClientError>;

    async fn branch_stock(&self, branch_id: Uuid) -> Result<Vec<Value>, ClientError>;
    async fn warehouse_stock(&self, warehouse_id: Uuid) -> Result<Vec<Value>, ClientError>;
    async fn create_stock_request(&self, request: &StockRequestPayload) -> Result<Value, ClientError>;
    async fn decide_stock_request(&self, request_id: &str, decision: StockDecision) -> Result<Value, ClientError>;
}

#[async_trait]
pub trait CompanyService: Send + Sync {
    async fn send_replenish_request(
        &self,
        company_id: Uuid,
        warehouse_id: Uuid,
        product_id: Uuid,
        quantity: i64,
    ) -> Result<Value, ClientError>;
}

/// Os serviços irmãos vistos por esta instância.
#[derive(Clone)]
pub struct Siblings {
    pub catalog: Arc<dyn ProductLookup>,
    pub warehouses: Arc<dyn WarehouseLookup>,
    pub branches: Arc<dyn BranchLookup>,
    pub stock: Arc<dyn StockService>,
    pub company: Arc<dyn CompanyService>,
}

impl Siblings {
    /// Um único `reqwest::Client` (pool de conexões) compartilhado por todos.
    pub fn over_http(http: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            catalog: Arc::new(ProductClient::new(http.clone(), &config.product_service_url)),
            warehouses: Arc::new(WarehouseClient::new(http.clone(), &config.warehouse_service_url)),
            branches: Arc::new(BranchClient::new(http.clone(), &config.branch_service_url)),
            stock: Arc::new(StockClient::new(http.clone(), &config.stock_service_url)),
            company: Arc::new(CompanyClient::new(http, &config.company_service_url)),
        }
    }
}
