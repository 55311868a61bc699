// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::list_roles,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::list_users,
        handlers::auth::get_user,
        handlers::auth::create_user,
        handlers::auth::update_user,
        handlers::auth::delete_user,

        // --- Products ---
        handlers::products::create_product,
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::list_company_products,

        // --- Branches ---
        handlers::branches::create_branch,
        handlers::branches::list_branches,
        handlers::branches::get_branch,
        handlers::branches::list_warehouse_branches,
        handlers::branches::get_branch_with_warehouse,
        handlers::branches::get_branch_stock,
        handlers::branches::adjust_branch_stock,
        handlers::branches::create_stock_request,
        handlers::branches::create_restock,
        handlers::branches::list_restocks,
        handlers::branches::approve_restock,
        handlers::branches::reject_restock,
        handlers::branches::list_branch_products,
        handlers::branches::assign_branch_product,
        handlers::branches::remove_branch_product,

        // --- Warehouses ---
        handlers::warehouses::create_warehouse,
        handlers::warehouses::list_warehouses,
        handlers::warehouses::get_warehouse,
        handlers::warehouses::get_warehouse_with_branches,
        handlers::warehouses::get_warehouse_stock,
        handlers::warehouses::approve_stock_request,
        handlers::warehouses::reject_stock_request,
        handlers::warehouses::request_replenish,
        handlers::warehouses::list_warehouse_products,
        handlers::warehouses::assign_warehouse_product,
        handlers::warehouses::remove_warehouse_product_by_body,
        handlers::warehouses::remove_warehouse_product,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::CreateUserPayload,
            models::auth::UpdateUserPayload,
            models::auth::AuthResponse,

            // --- Products ---
            models::product::ProductStatus,
            models::product::Product,
            models::product::CreateProductPayload,

            // --- Branches ---
            models::branch::Branch,
            models::branch::CreateBranchPayload,
            models::branch::BranchWithWarehouse,
            models::branch::BranchAssignment,
            handlers::branches::AssignProductPayload,

            // --- Warehouses ---
            models::warehouse::Warehouse,
            models::warehouse::CreateWarehousePayload,
            models::warehouse::WarehouseWithBranches,
            models::warehouse::WarehouseAssignment,
            models::warehouse::ReplenishPayload,

            // --- Restock ---
            models::restock::RestockStatus,
            models::restock::RestockRequest,
            models::restock::CreateRestockPayload,

            // --- Stock ---
            models::stock::StockRecord,
            models::stock::StockAdjustPayload,
            models::stock::StockAdjustment,
            models::stock::StockRequestPayload,
            models::stock::WarehouseStock,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Gestão de Usuários por papel"),
        (name = "Products", description = "Catálogo de Produtos"),
        (name = "Branches", description = "Filiais"),
        (name = "Branch Stock", description = "Saldos das Filiais (serviço de estoque)"),
        (name = "Branch Products", description = "Produtos atribuídos às Filiais"),
        (name = "Restock", description = "Pedidos de Reposição das Filiais"),
        (name = "Warehouses", description = "Depósitos"),
        (name = "Warehouse Stock", description = "Saldos e Pedidos dos Depósitos"),
        (name = "Warehouse Products", description = "Produtos atribuídos aos Depósitos")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
