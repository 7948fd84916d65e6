pub mod health;
pub mod impact;
