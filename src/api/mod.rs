pub mod health;
pub mod repair;
pub mod schema;
