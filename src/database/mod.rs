//! In-process storage: one `TeamStore` per team, held by `StoreManager`.

pub mod manager;
pub mod models;
pub mod seed;
pub mod store;

pub use manager::{DatabaseError, SharedStore, StoreManager};
pub use seed::SeedFile;
pub use store::TeamStore;
