//! Weighted random selection over a pack pool.
//!
//! Each pack's weight is its remaining `in_person` count, so a draw picks a
//! single physical unit uniformly among all units left in the pool. Packs with
//! zero weight are never returned.

use rand::Rng;

use crate::domain::inventory::Pack;

/// Sum of the weights of every pack in the pool.
pub fn total_weight<'a>(pool: impl IntoIterator<Item = &'a Pack>) -> u64 {
    pool.into_iter().map(|pack| u64::from(pack.weight())).sum()
}

/// Draws one pack with probability proportional to its weight.
///
/// Returns `None` when the total weight is zero.
pub fn pick_weighted<'a, R>(pool: impl IntoIterator<Item = &'a Pack> + Clone, rng: &mut R) -> Option<&'a Pack>
where
    R: Rng + ?Sized,
{
    let total = total_weight(pool.clone());
    if total == 0 {
        return None;
    }

    let mut ticket = rng.gen_range(0..total);
    for pack in pool {
        let weight = u64::from(pack.weight());
        if weight == 0 {
            continue;
        }
        if ticket < weight {
            return Some(pack);
        }
        ticket -= weight;
    }
    None
}
