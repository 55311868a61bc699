pub mod aggregation;
pub mod assignment;
pub mod auth;
pub mod branch_service;
pub mod product_service;
pub mod stock_service;
pub mod warehouse_service;
