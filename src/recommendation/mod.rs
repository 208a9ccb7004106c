//! Recommendation Module
//!
//! Turns precomputed model artifacts into per-user recommendation lists.
//!
//! ## Architecture
//!
//! 1. **Store** - Load the item catalog, popularity list, and per-model
//!    user tables from disk at startup
//! 2. **Registry** - Resolve a model name and user to a recommendation
//!    list, with popularity fallback for cold users
//! 3. **Top-N** - Rank one user's dense score vector into a filtered
//!    (item id, score) list; shared by serving and offline pipelines
//! 4. **Offline** - Batch mapper and grouped evaluation metric for the
//!    offline model-building side
//!
//! ## Serving model names
//!
//! - `random`: uniform sample over the catalog
//! - `popular`: the global popularity list
//! - anything else: a per-user table loaded from `models/<name>.json`
//!   (factorization, ANN, autoencoder, ranker, ... - the registry does not
//!   care how the table was produced)

pub mod metrics;
pub mod offline;
pub mod registry;
pub mod store;
pub mod topn;

// Re-export the types that are actually used externally
pub use registry::{ModelRegistry, UserId};
pub use topn::{extract_top_n, ItemId, ScoredItem};
