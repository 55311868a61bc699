pub mod auth;
pub mod branch;
pub mod product;
pub mod restock;
pub mod stock;
pub mod warehouse;
