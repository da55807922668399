use std::collections::HashMap;

use super::ranking::Ranking;
use super::types::{Bounds, Tree};

/// Hands out horizontal intervals top-down.
///
/// The root gets `[0, width]`. Each commit splits the union of the slices
/// handed to it in this pass evenly among its children, in child order.
/// `seed` holds intervals from an earlier pass. They widen a retained
/// commit's own stored interval so it never narrows, but are never sliced
/// for its children.
///
/// Commits are visited in `ranking.order`, so a merge commit is sliced only
/// once all of its parents have contributed.
pub fn allocate_bounds(
    tree: &Tree,
    ranking: &Ranking,
    width: f32,
    seed: &HashMap<String, Bounds>,
) -> HashMap<String, Bounds> {
    let mut offered: HashMap<String, Bounds> = HashMap::with_capacity(ranking.order.len());
    offer(&mut offered, &tree.root, Bounds::new(0.0, width));

    for hash in &ranking.order {
        let Some(interval) = offered.get(hash).copied() else {
            continue;
        };
        let children = tree.children_of(hash);
        for (idx, child) in children.iter().enumerate() {
            offer(&mut offered, child, interval.slice(idx, children.len()));
        }
    }

    offered
        .into_iter()
        .map(|(hash, interval)| {
            let stored = seed
                .get(&hash)
                .map_or(interval, |prior| prior.union(interval));
            (hash, stored)
        })
        .collect()
}

fn offer(offered: &mut HashMap<String, Bounds>, hash: &str, interval: Bounds) {
    match offered.get_mut(hash) {
        Some(existing) => *existing = existing.union(interval),
        None => {
            offered.insert(hash.to_string(), interval);
        }
    }
}
