pub mod auth;
pub mod branches;
pub mod products;
pub mod warehouses;
