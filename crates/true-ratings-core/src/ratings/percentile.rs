// Tie-aware ranking, rank-to-percentile, percentile-to-rating.
//
// A True Rating is relative: it only means something inside the pool it was
// ranked in, so these functions always take the whole pool at once.

use serde::Serialize;

/// Percentile floors for each rating, highest first. The floors sit on the
/// standard-deviation boundaries of a normal distribution, in half-sigma steps.
pub const RATING_TABLE: [(f64, f64); 9] = [
    (97.7, 5.0),
    (93.3, 4.5),
    (84.1, 4.0),
    (69.1, 3.5),
    (50.0, 3.0),
    (30.9, 2.5),
    (15.9, 2.0),
    (6.7, 1.5),
    (2.3, 1.0),
];

/// Rating for any percentile below the lowest floor.
pub const MIN_RATING: f64 = 0.5;
pub const MAX_RATING: f64 = 5.0;

/// Rank, percentile and rating for one member of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedScore {
    pub rank: f64,
    pub percentile: f64,
    pub rating: f64,
}

/// Rank scores ascending (lowest score is rank 1).
///
/// Returns one rank per input, in input order. Equal scores share the mean
/// of the positions they occupy: three scores tied across positions 4-6 all
/// get rank 5.
pub fn rank_with_ties(scores: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut ranks = vec![0.0; scores.len()];
    let mut start = 0;
    while start < order.len() {
        let value = scores[order[start]];
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == value {
            end += 1;
        }
        // Positions start+1 ..= end (1-based) share their mean.
        let shared = (start + 1 + end) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = shared;
        }
        start = end;
    }
    ranks
}

/// `(pool_size − rank + 0.5) / pool_size × 100`. Zero for an empty pool.
pub fn percentile_from_rank(rank: f64, pool_size: usize) -> f64 {
    if pool_size == 0 {
        return 0.0;
    }
    let n = pool_size as f64;
    (n - rank + 0.5) / n * 100.0
}

/// Map a percentile onto the 0.5-5.0 rating scale.
pub fn rating_from_percentile(percentile: f64) -> f64 {
    RATING_TABLE
        .iter()
        .find(|(floor, _)| percentile >= *floor)
        .map(|&(_, rating)| rating)
        .unwrap_or(MIN_RATING)
}

/// Rank a whole pool and map every member to a percentile and rating.
///
/// Lower scores are better. An empty pool yields an empty result.
pub fn rank_pool(scores: &[f64]) -> Vec<RankedScore> {
    let pool_size = scores.len();
    rank_with_ties(scores)
        .into_iter()
        .map(|rank| {
            let percentile = percentile_from_rank(rank, pool_size);
            RankedScore {
                rank,
                percentile,
                rating: rating_from_percentile(percentile),
            }
        })
        .collect()
}
