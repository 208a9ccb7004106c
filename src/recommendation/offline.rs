//! Offline utilities for recommendation pipelines
//!
//! Companion helpers to the serving path: a batch mapper that turns raw
//! model predictions into ranked recommendation lists, and the grouped
//! evaluation metric used to score predictions user by user.

use std::collections::{HashMap, HashSet};

use rayon::prelude::*;

use crate::error::{Error, Result};

use super::registry::UserId;
use super::topn::{extract_top_n, ItemId, ScoredItem};

/// Ranked recommendations for one user
#[derive(Debug, Clone, PartialEq)]
pub struct RankedList {
    pub user_id: UserId,
    pub items: Vec<ScoredItem>,
}

/// Map raw per-user predictions to ranked recommendation lists.
///
/// `score_fn` produces the dense score vector for one user (one model call
/// against the full catalog). Users are processed in parallel; each list is
/// extracted with [`extract_top_n`], so seen-item filtering and tie-break
/// rules match the serving path exactly.
pub fn map_ranked_lists<S>(
    users: &[UserId],
    score_fn: S,
    index_to_id: &[ItemId],
    known_items: &HashMap<UserId, HashSet<usize>>,
    n: usize,
) -> Result<Vec<RankedList>>
where
    S: Fn(UserId) -> Result<Vec<f32>> + Sync,
{
    users
        .par_iter()
        .map(|&user_id| {
            let scores = score_fn(user_id)?;
            let no_history = HashSet::new();
            let known = known_items.get(&user_id).unwrap_or(&no_history);
            let items = extract_top_n(&scores, index_to_id, known, n)?;
            Ok(RankedList { user_id, items })
        })
        .collect()
}

/// Average a metric over contiguous user groups.
///
/// Rows must be grouped by `group_ids` (all rows of one user adjacent, the
/// usual layout of scored candidate frames). Groups whose targets are all
/// identical carry no ranking signal and are skipped. Returns 0.0 when no
/// group qualifies.
pub fn grouped_mean_metric<F>(
    targets: &[f32],
    predictions: &[f32],
    group_ids: &[UserId],
    metric: F,
) -> Result<f32>
where
    F: Fn(&[f32], &[f32]) -> f32,
{
    if targets.len() != predictions.len() || targets.len() != group_ids.len() {
        return Err(Error::invalid_argument(format!(
            "length mismatch: targets {}, predictions {}, group ids {}",
            targets.len(),
            predictions.len(),
            group_ids.len()
        )));
    }

    let mut total = 0.0f32;
    let mut qualifying = 0usize;
    let mut start = 0usize;

    for end in 1..=group_ids.len() {
        if end < group_ids.len() && group_ids[end] == group_ids[start] {
            continue;
        }
        let group_targets = &targets[start..end];
        if group_targets.iter().any(|t| t != &group_targets[0]) {
            total += metric(group_targets, &predictions[start..end]);
            qualifying += 1;
        }
        start = end;
    }

    Ok(total / qualifying.max(1) as f32)
}
