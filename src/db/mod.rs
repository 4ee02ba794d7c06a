//! Persistence layer for Huddle
//!
//! `mongo` wraps the MongoDB client with typed, index-applying collections.
//! `store` defines the `SocialStore` trait the core components are built
//! against; `mongo_store` and `memory` are its two implementations
//! (production and dev/test respectively).

pub mod memory;
pub mod mongo;
pub mod mongo_store;
pub mod schemas;
pub mod store;

pub use memory::MemoryStore;
pub use mongo::MongoClient;
pub use mongo_store::MongoStore;
pub use store::{AthleteChanges, ProfileChanges, SocialStore};
