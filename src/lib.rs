//! Komal Jewellery design studio.
//!
//! Builds jewelry render prompts from design parameters, requests images from
//! the remote generation service, and keeps two durable collections on the
//! local machine: the favorites gallery and the order ledger.

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod favorites;
pub mod generation;
pub mod ids;
pub mod models;
pub mod orders;
pub mod paths;
pub mod prompts;
pub mod store;
pub mod studio;

pub use db::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use error::{ExportError, GenerationError, OrderError, StorageError, ValidationError};
pub use favorites::{FavoritesWorkflow, SaveOutcome};
pub use generation::{DesignRequestService, ImageTransport, ReqwestTransport, TransportResponse};
pub use models::{
    Category, DesignFields, DesignParameters, FavoriteRecord, GeneratedArtifact, Metal,
    OrderRecord,
};
pub use orders::{OrderForm, OrderSource, OrderState, OrderWorkflow};
pub use store::CollectionStore;
pub use studio::{DesignStudio, GenerationTicket, ParameterChange};
