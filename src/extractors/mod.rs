// src/extractors/mod.rs
pub mod currency;
pub mod table;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use currency::parse_amount;
#[allow(unused_imports)]
pub use table::{aggregate, TableTransformer};
