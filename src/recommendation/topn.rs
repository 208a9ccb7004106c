//! Top-N extraction over dense score vectors
//!
//! Turns one user's model scores into a ranked, filtered recommendation
//! list: select the highest-scoring internal indices, drop everything the
//! user has already interacted with, and map the survivors to external ids.
//!
//! The selection over-fetches by the size of the user's history so that
//! post-filtering still leaves `n` candidates whenever the catalog can
//! supply them. Selection is a single partial-selection pass followed by a
//! sort of the selected subset only, so cost stays linear in the catalog
//! plus `O(total_n log total_n)` for the tail.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Stable external identifier exposed to API consumers
pub type ItemId = i64;

/// A recommended item paired with its model score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item_id: ItemId,
    pub score: f32,
}

/// Extract the top `n` fresh recommendations from a dense score vector.
///
/// `scores[i]` is the model's relevance of internal index `i` for the
/// current user; `index_to_id` maps every internal index to its external
/// id; `known_indices` holds internal indices the user has already seen
/// (entries outside `[0, scores.len())` are ignored).
///
/// Returns at most `n` items, unique, ordered by descending score with
/// ascending index as the tie break. When filtering leaves fewer than `n`
/// candidates the shorter list is returned as-is.
///
/// Fails with `InvalidArgument` when `n == 0`, `scores` is empty, or a
/// selected index has no entry in `index_to_id`.
pub fn extract_top_n(
    scores: &[f32],
    index_to_id: &[ItemId],
    known_indices: &HashSet<usize>,
    n: usize,
) -> Result<Vec<ScoredItem>> {
    if n == 0 {
        return Err(Error::invalid_argument("requested count must be at least 1"));
    }
    if scores.is_empty() {
        return Err(Error::invalid_argument("score vector is empty"));
    }

    let m = scores.len();

    // Over-fetch margin: at most `known_in_range` of the selected
    // candidates can be filtered out below.
    let known_in_range = known_indices.iter().filter(|&&index| index < m).count();
    let total_n = (n + known_in_range).min(m);

    let mut candidates: Vec<usize> = (0..m).collect();
    if total_n < m {
        candidates.select_nth_unstable_by(total_n - 1, |&a, &b| rank(scores, a, b));
        candidates.truncate(total_n);
    }
    candidates.sort_unstable_by(|&a, &b| rank(scores, a, b));

    let mut recs = Vec::with_capacity(n.min(total_n));
    for index in candidates {
        if known_indices.contains(&index) {
            continue;
        }
        let item_id = *index_to_id.get(index).ok_or_else(|| {
            Error::invalid_argument(format!(
                "no external id for internal index {index} (mapping covers {} items)",
                index_to_id.len()
            ))
        })?;
        recs.push(ScoredItem {
            item_id,
            score: scores[index],
        });
        if recs.len() == n {
            break;
        }
    }

    Ok(recs)
}

/// Descending score, ascending index on ties. NaN scores compare equal
/// under `partial_cmp` and fall through to the index order.
fn rank(scores: &[f32], a: usize, b: usize) -> Ordering {
    scores[b]
        .partial_cmp(&scores[a])
        .unwrap_or(Ordering::Equal)
        .then(a.cmp(&b))
}
