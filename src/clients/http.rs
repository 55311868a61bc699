// src/clients/http.rs

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{
    clients::{
        BranchLookup, ClientError, CompanyService, ProductLookup, StockDecision, StockService,
        WarehouseLookup,
    },
    models::{
        branch::Branch,
        product::Product,
        stock::{StockRecord, StockRequestPayload},
        warehouse::Warehouse,
    },
};

// O serviço de estoque embrulha as listas em `{ "data": [...] }`.
#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

// 404 e 409 viram variantes próprias; falha de transporte fica separada
// de um status de erro vindo de um serviço que respondeu.
async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = request
        .send()
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;

    match response.status() {
        StatusCode::NOT_FOUND => Err(ClientError::NotFound),
        StatusCode::CONFLICT => Err(ClientError::Conflict),
        status if !status.is_success() => {
            tracing::debug!(url = %response.url(), %status, "serviço irmão respondeu com erro");
            Err(ClientError::Status(status))
        }
        _ => response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string())),
    }
}

fn base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

#[derive(Clone)]
pub struct ProductClient {
    http: Client,
    base_url: String,
}

impl ProductClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self { http, base_url: base(base_url) }
    }
}

#[async_trait]
impl ProductLookup for ProductClient {
    async fn fetch_product(&self, id: Uuid) -> Result<Product, ClientError> {
        send_json(self.http.get(format!("{}/api/products/{}", self.base_url, id))).await
    }
}

#[derive(Clone)]
pub struct WarehouseClient {
    http: Client,
    base_url: String,
}

impl WarehouseClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self { http, base_url: base(base_url) }
    }
}

#[async_trait]
impl WarehouseLookup for WarehouseClient {
    async fn fetch_warehouse(&self, id: Uuid) -> Result<Warehouse, ClientError> {
        send_json(self.http.get(format!("{}/api/warehouses/{}", self.base_url, id))).await
    }
}

#[derive(Clone)]
pub struct BranchClient {
    http: Client,
    base_url: String,
}

impl BranchClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self { http, base_url: base(base_url) }
    }
}

#[async_trait]
impl BranchLookup for BranchClient {
    async fn branches_of_warehouse(&self, warehouse_id: Uuid) -> Result<Vec<Branch>, ClientError> {
        send_json(self.http.get(format!(
            "{}/api/branches/warehouse/{}",
            self.base_url, warehouse_id
        )))
        .await
    }
}

#[derive(Clone)]
pub struct StockClient {
    http: Client,
    base_url: String,
}

impl StockClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self { http, base_url: base(base_url) }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/stocks{}", self.base_url, path)
    }
}

#[async_trait]
impl StockService for StockClient {
    async fn records_for(&self, branch_id: Uuid, product_id: Uuid) -> Result<Vec<StockRecord>, ClientError> {
        let envelope: DataEnvelope<Vec<StockRecord>> = send_json(
            self.http
                .get(self.url(&format!("/branch/{}/product/{}", branch_id, product_id))),
        )
        .await?;
        Ok(envelope.data)
    }

    async fn write_quantity(
        &self,
        stock_id: &str,
        quantity: i64,
        expected_version: Option<i64>,
    ) -> Result<StockRecord, ClientError> {
        let mut body = json!({ "quantity": quantity });
        match expected_version {
            Some(version) => body["expectedVersion"] = json!(version),
            None => tracing::warn!(%stock_id, quantity, "registro sem versão: escrita de estoque incondicional"),
        }
        send_json(self.http.put(self.url(&format!("/{}", stock_id))).json(&body)).await
    }

    async fn branch_stock(&self, branch_id: Uuid) -> Result<Vec<Value>, ClientError> {
        let envelope: DataEnvelope<Vec<Value>> =
            send_json(self.http.get(self.url(&format!("/branch/{}", branch_id)))).await?;
        Ok(envelope.data)
    }

    async fn warehouse_stock(&self, warehouse_id: Uuid) -> Result<Vec<Value>, ClientError> {
        let envelope: DataEnvelope<Vec<Value>> =
            send_json(self.http.get(self.url(&format!("/warehouse/{}", warehouse_id)))).await?;
        Ok(envelope.data)
    }

    async fn create_stock_request(&self, request: &StockRequestPayload) -> Result<Value, ClientError> {
        send_json(self.http.post(self.url("/stock-requests")).json(request)).await
    }

    async fn decide_stock_request(&self, request_id: &str, decision: StockDecision) -> Result<Value, ClientError> {
        send_json(self.http.post(self.url(&format!(
            "/stock-requests/{}/{}",
            request_id,
            decision.as_path()
        ))))
        .await
    }
}

#[derive(Clone)]
pub struct CompanyClient {
    http: Client,
    base_url: String,
}

impl CompanyClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self { http, base_url: base(base_url) }
    }
}

#[async_trait]
impl CompanyService for CompanyClient {
    async fn send_replenish_request(
        &self,
        company_id: Uuid,
        warehouse_id: Uuid,
        product_id: Uuid,
        quantity: i64,
    ) -> Result<Value, ClientError> {
        send_json(
            self.http
                .post(format!(
                    "{}/api/company/{}/replenish-requests",
                    self.base_url, company_id
                ))
                .json(&json!({
                    "warehouseId": warehouse_id,
                    "productId": product_id,
                    "quantity": quantity,
                })),
        )
        .await
    }
}
