//! Core of the UGC ad-scene studio: prompt construction, the two-stage
//! (image → video) media generation client, the sequential batch
//! orchestrator, and the shared observable generation store.
//!
//! A shell (CLI, desktop, web bridge) collects a [`config::GenerationConfig`],
//! validates it at the boundary, and drives [`generator::Generator`] while
//! rendering [`store::GenerationStore`] snapshots.

pub mod config;
pub mod error;
pub mod generator;
pub mod kie;
pub mod prompts;
pub mod scene;
pub mod settings;
pub mod store;

pub use config::GenerationConfig;
pub use error::{GenerationError, Result};
pub use generator::Generator;
pub use kie::MediaClient;
pub use store::GenerationStore;
