// src/routes.rs

use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::{AppState, ServiceKind},
    docs::ApiDoc,
    handlers::{auth, branches, products, warehouses},
    middleware::auth::auth_guard,
};

// Identidade: rotas públicas + rotas protegidas pelo auth_guard
fn identity_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/roles", get(auth::list_roles));

    let protected = Router::new()
        .route("/me", get(auth::get_me))
        .route("/users", get(auth::list_users).post(auth::create_user))
        .route(
            "/users/{id}",
            get(auth::get_user).put(auth::update_user).delete(auth::delete_user),
        )
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_guard));

    Router::new().nest("/api/auth", public.merge(protected))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/products",
            post(products::create_product).get(products::list_products),
        )
        .route("/api/products/{id}", get(products::get_product))
        .route(
            "/api/products/company/{id}",
            get(products::list_company_products),
        )
}

fn branch_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/branches",
            post(branches::create_branch).get(branches::list_branches),
        )
        .route("/api/branches/{id}", get(branches::get_branch))
        .route(
            "/api/branches/warehouse/{id}",
            get(branches::list_warehouse_branches),
        )
        .route(
            "/api/branch-with-warehouse/{id}",
            get(branches::get_branch_with_warehouse),
        )
        .route("/api/branches/{id}/stock", get(branches::get_branch_stock))
        .route(
            "/api/branches/{id}/stock-adjust",
            post(branches::adjust_branch_stock),
        )
        .route("/api/stock-requests", post(branches::create_stock_request))
        .route(
            "/api/branches/{id}/restock",
            post(branches::create_restock).get(branches::list_restocks),
        )
        .route(
            "/api/branches/{id}/restock/{restock_id}/approve",
            post(branches::approve_restock),
        )
        .route(
            "/api/branches/{id}/restock/{restock_id}/reject",
            post(branches::reject_restock),
        )
        .route(
            "/api/branches/{id}/products",
            get(branches::list_branch_products).post(branches::assign_branch_product),
        )
        .route(
            "/api/branches/{id}/products/{product_id}",
            delete(branches::remove_branch_product),
        )
}

fn warehouse_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/warehouses",
            post(warehouses::create_warehouse).get(warehouses::list_warehouses),
        )
        .route("/api/warehouses/{id}", get(warehouses::get_warehouse))
        .route(
            "/api/warehouses/{id}/with-branches",
            get(warehouses::get_warehouse_with_branches),
        )
        .route("/api/warehouses/{id}/stock", get(warehouses::get_warehouse_stock))
        .route(
            "/api/warehouses/stock-requests/{id}/approve",
            post(warehouses::approve_stock_request),
        )
        .route(
            "/api/warehouses/stock-requests/{id}/reject",
            post(warehouses::reject_stock_request),
        )
        .route(
            "/api/warehouses/{id}/replenish-requests",
            post(warehouses::request_replenish),
        )
        .route(
            "/api/warehouses/{id}/products",
            get(warehouses::list_warehouse_products)
                .post(warehouses::assign_warehouse_product)
                .delete(warehouses::remove_warehouse_product_by_body),
        )
        .route(
            "/api/warehouses/{id}/products/{product_id}",
            delete(warehouses::remove_warehouse_product),
        )
}

/// Router completo com os serviços que esta instância hospeda.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    // O SPA fala direto com cada serviço.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    let mut router = Router::new().route("/api/health", get(|| async { "OK" }));

    if config.hosts(ServiceKind::Identity) {
        router = router.merge(identity_routes(&state));
    }
    if config.hosts(ServiceKind::Products) {
        router = router.merge(product_routes());
    }
    if config.hosts(ServiceKind::Branches) {
        router = router.merge(branch_routes());
    }
    if config.hosts(ServiceKind::Warehouses) {
        router = router.merge(warehouse_routes());
    }

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::AppConfig, testing::TestBed};

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn register_and_login(app: &Router, name: &str, role: &str) -> String {
        let (status, _) = send(
            app,
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": name,
                "email": format!("{name}@example.com"),
                "password": "secret123",
                "confirmPassword": "secret123",
                "role": role,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, session) = send(
            app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": format!("{name}@example.com"), "password": "secret123" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        session["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_answers_ok() {
        let bed = TestBed::new();
        let response = bed
            .router()
            .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_ids_are_bad_requests() {
        let app = TestBed::new().router();
        let (status, body) = send(&app, "GET", "/api/branches/not-a-uuid", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid branch ID");

        let (status, _) = send(&app, "GET", "/api/products/123", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_uses_error_envelope() {
        let app = TestBed::new().router();
        let request = Request::post("/api/warehouses")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn branch_product_assignment_flow() {
        let bed = TestBed::new();
        let app = bed.router();
        let branch = bed.branch().await;
        let product = bed.catalog.add("Arabica").await;
        let products_uri = format!("/api/branches/{}/products", branch.id);

        let (status, body) = send(&app, "POST", &products_uri, None, Some(json!({ "productId": product.id }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["branch"]["products"], json!([product.id]));

        let (status, body) = send(&app, "POST", &products_uri, None, Some(json!({ "productId": product.id }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Product is already assigned to this branch");

        let (status, body) = send(&app, "GET", &products_uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["name"], "Arabica");

        let (status, body) = send(&app, "DELETE", &format!("{products_uri}/{}", product.id), None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["products"], json!([]));

        let (status, body) = send(&app, "GET", &products_uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn approving_restock_leaves_stock_untouched() {
        let bed = TestBed::new();
        let app = bed.router();
        let branch = bed.branch().await;
        let product = bed.catalog.add("Arabica").await;
        bed.stock.seed(branch.id, product.id, 10).await;
        let restock_uri = format!("/api/branches/{}/restock", branch.id);

        let (status, created) = send(
            &app,
            "POST",
            &restock_uri,
            None,
            Some(json!({ "productId": product.id, "quantity": 25 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "pending");

        let approve_uri = format!("{restock_uri}/{}/approve", created["id"].as_str().unwrap());
        let (status, approved) = send(&app, "POST", &approve_uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(approved["status"], "approved");

        let (status, body) = send(&app, "POST", &approve_uri, None, None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "Restock request is already approved");

        assert_eq!(bed.stock.quantity(branch.id, product.id).await, Some(10));
        assert_eq!(bed.stock.writes().await, 0);
    }

    #[tokio::test]
    async fn identity_login_and_role_scoped_listing() {
        let bed = TestBed::new();
        let app = bed.router();

        let company = register_and_login(&app, "acme", "company").await;
        register_and_login(&app, "wm", "warehouse-manager").await;
        let sales = register_and_login(&app, "seller", "sales").await;

        let (status, _) = send(
            &app,
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "acme@example.com", "password": "wrong-pass" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, me) = send(&app, "GET", "/api/auth/me", Some(&company), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["username"], "acme");
        assert!(me.get("passwordHash").is_none());

        let (status, users) = send(&app, "GET", "/api/auth/users", Some(&company), None).await;
        assert_eq!(status, StatusCode::OK);
        let users = users.as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["role"], "warehouse-manager");

        let (status, _) = send(&app, "GET", "/api/auth/users", Some(&sales), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send(&app, "GET", "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = send(&app, "GET", "/api/auth/me", Some("garbage"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn only_hosted_services_are_routed() {
        let bed = TestBed::new();
        let mut state = bed.state.clone();
        state.config = Arc::new(AppConfig {
            services: [ServiceKind::Products].into_iter().collect(),
            ..AppConfig::default()
        });
        let router = app(state);

        let (status, _) = send(&router, "GET", "/api/products", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&router, "GET", "/api/branches", None, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&router, "POST", "/api/auth/login", None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
