pub mod fetch;
pub mod filter;
