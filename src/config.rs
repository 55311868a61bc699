// src/config.rs

use std::{collections::HashSet, env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{Context, bail};
use sqlx::postgres::PgPoolOptions;

use crate::{
    clients::Siblings,
    db::Stores,
    services::{
        auth::AuthService, branch_service::BranchService, product_service::ProductService,
        warehouse_service::WarehouseService,
    },
};

/// Os quatro serviços que este binário sabe hospedar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Identity,
    Products,
    Branches,
    Warehouses,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 4] = [
        ServiceKind::Identity,
        ServiceKind::Products,
        ServiceKind::Branches,
        ServiceKind::Warehouses,
    ];
}

impl FromStr for ServiceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "auth" => Ok(ServiceKind::Identity),
            "products" | "product" => Ok(ServiceKind::Products),
            "branches" | "branch" => Ok(ServiceKind::Branches),
            "warehouses" | "warehouse" => Ok(ServiceKind::Warehouses),
            other => bail!("unknown service '{other}'"),
        }
    }
}

/// O que fazer quando aprovam/rejeitam um pedido que já saiu de `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RestockTerminalPolicy {
    /// 409 Conflict.
    #[default]
    Reject,
    /// Sobrescreve o status.
    Overwrite,
}

impl FromStr for RestockTerminalPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(RestockTerminalPolicy::Reject),
            "overwrite" => Ok(RestockTerminalPolicy::Overwrite),
            other => bail!("unknown restock terminal policy '{other}'"),
        }
    }
}

// Configuração lida uma única vez no main e repassada a todo o resto.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub services: HashSet<ServiceKind>,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub jwt_secret: Option<String>,
    pub token_ttl_hours: i64,
    pub bcrypt_cost: u32,
    pub product_service_url: String,
    pub branch_service_url: String,
    pub warehouse_service_url: String,
    pub stock_service_url: String,
    pub company_service_url: String,
    pub http_client_timeout: Option<Duration>,
    pub stock_adjust_max_attempts: u32,
    pub assignment_max_attempts: u32,
    pub restock_terminal_policy: RestockTerminalPolicy,
}

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

fn local_url(bind_addr: &str) -> String {
    let port = bind_addr.rsplit(':').next().unwrap_or("3000");
    format!("http://127.0.0.1:{port}")
}

impl Default for AppConfig {
    fn default() -> Self {
        let local = local_url(DEFAULT_BIND_ADDR);
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            services: ServiceKind::ALL.into_iter().collect(),
            database_url: None,
            database_max_connections: 5,
            jwt_secret: None,
            token_ttl_hours: 24,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            product_service_url: local.clone(),
            branch_service_url: local.clone(),
            warehouse_service_url: local,
            stock_service_url: "http://127.0.0.1:5005".to_string(),
            company_service_url: "http://127.0.0.1:5001".to_string(),
            http_client_timeout: Some(Duration::from_secs(10)),
            stock_adjust_max_attempts: 5,
            assignment_max_attempts: 5,
            restock_terminal_policy: RestockTerminalPolicy::Reject,
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} is invalid ({raw}): {e}")),
        None => Ok(default),
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let bind_addr = var("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let local = local_url(&bind_addr);

        let services = match var("SERVICES") {
            None => defaults.services,
            Some(raw) if raw.trim().eq_ignore_ascii_case("all") => defaults.services,
            Some(raw) => raw
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(ServiceKind::from_str)
                .collect::<anyhow::Result<HashSet<_>>>()
                .context("SERVICES is invalid")?,
        };
        if services.is_empty() {
            bail!("SERVICES must name at least one service");
        }

        let timeout_secs: u64 = parsed("HTTP_CLIENT_TIMEOUT_SECS", 10)?;

        Ok(Self {
            bind_addr,
            services,
            database_url: var("DATABASE_URL"),
            database_max_connections: parsed("DATABASE_MAX_CONNECTIONS", defaults.database_max_connections)?,
            jwt_secret: var("JWT_SECRET"),
            token_ttl_hours: parsed("TOKEN_TTL_HOURS", defaults.token_ttl_hours)?,
            bcrypt_cost: parsed("BCRYPT_COST", defaults.bcrypt_cost)?,
            product_service_url: var("PRODUCT_SERVICE_URL").unwrap_or_else(|| local.clone()),
            branch_service_url: var("BRANCH_SERVICE_URL").unwrap_or_else(|| local.clone()),
            warehouse_service_url: var("WAREHOUSE_SERVICE_URL").unwrap_or(local),
            stock_service_url: var("STOCK_SERVICE_URL").unwrap_or(defaults.stock_service_url),
            company_service_url: var("COMPANY_SERVICE_URL").unwrap_or(defaults.company_service_url),
            http_client_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            stock_adjust_max_attempts: parsed("STOCK_ADJUST_MAX_ATTEMPTS", defaults.stock_adjust_max_attempts)?,
            assignment_max_attempts: parsed("ASSIGNMENT_MAX_ATTEMPTS", defaults.assignment_max_attempts)?,
            restock_terminal_policy: parsed("RESTOCK_TERMINAL_POLICY", defaults.restock_terminal_policy)?,
        })
    }

    pub fn hosts(&self, service: ServiceKind) -> bool {
        self.services.contains(&service)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_service: AuthService,
    pub product_service: ProductService,
    pub branch_service: BranchService,
    pub warehouse_service: WarehouseService,
}

impl AppState {
    pub async fn new(config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let mut http = reqwest::Client::builder();
        if let Some(timeout) = config.http_client_timeout {
            http = http.timeout(timeout);
        }
        let http = http.build().context("Falha ao criar o cliente HTTP")?;
        let siblings = Siblings::over_http(http, &config);

        let stores = match &config.database_url {
            Some(url) => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.database_max_connections)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(url)
                    .await
                    .context("Falha ao conectar ao banco de dados")?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!()
                    .run(&pool)
                    .await
                    .context("Falha ao rodar as migrações do banco de dados")?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Stores::postgres(pool)
            }
            None => {
                tracing::warn!("DATABASE_URL não definida: usando armazenamento em memória (dados somem ao reiniciar)");
                Stores::memory()
            }
        };

        if config.jwt_secret.is_none() && config.hosts(ServiceKind::Identity) {
            tracing::warn!("JWT_SECRET não definido: login vai responder 500");
        }

        Ok(Self::assemble(config, stores, siblings))
    }

    /// Monta o gráfico de dependências a partir de stores e clientes prontos.
    pub fn assemble(config: Arc<AppConfig>, stores: Stores, siblings: Siblings) -> Self {
        let auth_service = AuthService::new(
            stores.users,
            config.jwt_secret.clone(),
            config.token_ttl_hours,
            config.bcrypt_cost,
        );
        let product_service = ProductService::new(stores.products);
        let branch_service = BranchService::new(
            stores.branches,
            stores.branch_products,
            stores.restocks,
            &siblings,
            &config,
        );
        let warehouse_service = WarehouseService::new(
            stores.warehouses,
            stores.warehouse_products,
            &siblings,
            &config,
        );

        Self {
            config,
            auth_service,
            product_service,
            branch_service,
            warehouse_service,
        }
    }
}
