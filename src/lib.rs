//! bridgekv - secondary indexing and typed queries over a schemaless
//! key-value store

pub mod codec;
pub mod executor;
pub mod index;
pub mod observability;
pub mod planner;
pub mod schema;
pub mod storage;
pub mod store;

pub use planner::{Order, Query, SortDirection, Where};
pub use schema::{
    Attributes, FieldDef, FieldType, FieldValue, ModelDef, ModelRegistry, RegistryBuilder,
};
pub use storage::{MemoryClient, StorageClient, StorageError};
pub use store::{RecordStore, StoreError};
