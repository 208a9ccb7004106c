//! Model registry and serving-time lookup
//!
//! Holds the artifacts the API serves from: the item catalog, the global
//! popularity list, and one precomputed per-user table per offline model
//! (popularity baseline, matrix factorization, approximate-nearest-neighbor,
//! autoencoder, two-tower ranker — the registry is agnostic to how a table
//! was produced). Serving is lookup-with-default: a user missing from a
//! table is a cold user and gets the popularity list instead.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::{Error, Result};

use super::topn::ItemId;

/// User identifier as exposed by the API
pub type UserId = u64;

/// Per-user precomputed recommendation lists for one model
pub type UserRecoTable = HashMap<UserId, Vec<ItemId>>;

/// Model name served by uniform random sampling over the catalog
pub const RANDOM_MODEL: &str = "random";

/// Model name served directly from the global popularity list
pub const POPULAR_MODEL: &str = "popular";

/// All loaded recommendation artifacts, ready for serving
#[derive(Debug)]
pub struct ModelRegistry {
    catalog: Vec<ItemId>,
    popular: Vec<ItemId>,
    tables: HashMap<String, UserRecoTable>,
}

impl ModelRegistry {
    pub fn new(
        catalog: Vec<ItemId>,
        popular: Vec<ItemId>,
        tables: HashMap<String, UserRecoTable>,
    ) -> Self {
        Self {
            catalog,
            popular,
            tables,
        }
    }

    /// Whether `model_name` can be served
    pub fn contains(&self, model_name: &str) -> bool {
        matches!(model_name, RANDOM_MODEL | POPULAR_MODEL) || self.tables.contains_key(model_name)
    }

    /// Names of all servable models, built-ins first
    pub fn model_names(&self) -> Vec<String> {
        let mut names = vec![RANDOM_MODEL.to_string(), POPULAR_MODEL.to_string()];
        names.extend(self.tables.keys().cloned());
        names
    }

    /// Number of items in the catalog
    pub fn catalog_size(&self) -> usize {
        self.catalog.len()
    }

    /// Produce `k` recommendations for `user_id` from `model_name`.
    ///
    /// Unknown model names fail with a not-found error; a user without a
    /// personalized entry falls back to the popularity list. The result is
    /// shorter than `k` only when the loaded artifacts cannot supply `k`
    /// distinct items.
    pub fn recommend(&self, model_name: &str, user_id: UserId, k: usize) -> Result<Vec<ItemId>> {
        match model_name {
            RANDOM_MODEL => Ok(self.random_sample(k)),
            POPULAR_MODEL => Ok(self.popular.iter().copied().take(k).collect()),
            name => {
                let table = self
                    .tables
                    .get(name)
                    .ok_or_else(|| Error::not_found("model", name))?;
                Ok(self.personalized(table, user_id, k))
            }
        }
    }

    /// Uniform sample of `k` distinct catalog items (the whole catalog when
    /// it holds fewer than `k`)
    fn random_sample(&self, k: usize) -> Vec<ItemId> {
        let mut rng = rand::thread_rng();
        self.catalog
            .choose_multiple(&mut rng, k)
            .copied()
            .collect()
    }

    /// Personalized list with popularity top-up for cold or short entries
    fn personalized(&self, table: &UserRecoTable, user_id: UserId, k: usize) -> Vec<ItemId> {
        let mut recs: Vec<ItemId> = match table.get(&user_id) {
            Some(entry) => entry.iter().copied().take(k).collect(),
            None => {
                debug!("Cold user {}, serving popularity fallback", user_id);
                Vec::new()
            }
        };

        if recs.len() < k {
            let present: HashSet<ItemId> = recs.iter().copied().collect();
            recs.extend(
                self.popular
                    .iter()
                    .copied()
                    .filter(|item| !present.contains(item))
                    .take(k - recs.len()),
            );
        }

        recs
    }
}
