mod bounds;
mod error;
mod model;
mod ownership;
mod ranking;
mod tree;
pub(crate) mod types;

pub use bounds::allocate_bounds;
pub use error::LayoutError;
pub use model::{build_nodes, validate_input};
pub use ownership::{assign_ownership, collect_ancestors};
pub use ranking::{Ranking, assign_depths};
pub use tree::reduce_tree;
pub use types::*;

use crate::config::LayoutConfig;
use crate::ir::HeadRef;
use crate::theme::Theme;
use std::collections::{BTreeMap, HashMap};

const LABEL_HASH_CHARS: usize = 8;

pub fn index_nodes(nodes: &[GraphNode]) -> HashMap<String, usize> {
    nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (node.hash().to_string(), idx))
        .collect()
}

/// Runs tree reduction, depth assignment, ownership and bounds over `nodes`,
/// writing the results back into them.
///
/// Heads are visited in the order of `heads`; every head in `heads` must
/// already be present in `nodes`.
pub fn compute_layout(
    nodes: &mut [GraphNode],
    heads: &[HeadRef],
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<(), LayoutError> {
    let Some(tree) = reduce_tree(nodes)? else {
        return Ok(());
    };
    let index = index_nodes(nodes);

    let ranking = assign_depths(&tree);
    if !ranking.unranked.is_empty() {
        tracing::warn!(
            count = ranking.unranked.len(),
            "history contains a cycle; some commits were left unranked"
        );
    }
    for node in nodes.iter_mut() {
        if let GraphNode::Commit(commit) = node {
            commit.depth = ranking.depth_of(&commit.hash).unwrap_or(0);
        }
    }

    assign_ownership(nodes, &index, heads, &ranking, theme, config.tie_break);

    let seed: HashMap<String, Bounds> = nodes
        .iter()
        .filter_map(GraphNode::as_commit)
        .filter_map(|commit| commit.bounds.map(|b| (commit.hash.clone(), b)))
        .collect();
    let bounds = allocate_bounds(&tree, &ranking, config.width, &seed);
    for node in nodes.iter_mut() {
        if let GraphNode::Commit(commit) = node {
            if let Some(interval) = bounds.get(&commit.hash) {
                commit.bounds = Some(*interval);
            }
        }
    }

    Ok(())
}

/// Resolves screen positions. Commits sit at the center of their interval,
/// heads in the side column at `border_offset`.
pub fn snapshot(nodes: &[GraphNode], links: &[Link], config: &LayoutConfig) -> LayoutSnapshot {
    let mut positioned: BTreeMap<String, NodeLayout> = BTreeMap::new();
    let mut max_depth = 0usize;
    for node in nodes {
        let depth = node.depth();
        max_depth = max_depth.max(depth);
        let (x, bounds, label) = match node {
            GraphNode::Commit(commit) => {
                let x = commit
                    .bounds
                    .map(|b| b.center())
                    .unwrap_or(config.width / 2.0);
                (x, commit.bounds, short_hash(&commit.hash))
            }
            GraphNode::Head(head) => (config.border_offset, None, head.id.clone()),
        };
        positioned.insert(
            node.hash().to_string(),
            NodeLayout {
                hash: node.hash().to_string(),
                kind: node.kind(),
                depth,
                x,
                y: config.depth_to_y(depth),
                fill: node.fill().to_string(),
                label,
                bounds,
            },
        );
    }

    let links = links
        .iter()
        .filter_map(|link| {
            let source = positioned.get(&link.source)?;
            let target = positioned.get(&link.target)?;
            Some(LinkLayout {
                source: link.source.clone(),
                target: link.target.clone(),
                from: (source.x, source.y),
                to: (target.x, target.y),
            })
        })
        .collect();

    let height = if positioned.is_empty() {
        config.height
    } else {
        config
            .height
            .max(config.depth_to_y(max_depth) + config.border_offset)
    };

    LayoutSnapshot {
        width: config.width,
        height,
        nodes: positioned,
        links,
    }
}

pub fn short_hash(hash: &str) -> String {
    hash.chars().take(LABEL_HASH_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::CommitRow;

    fn run(rows: &[CommitRow], heads: &[HeadRef], width: f32) -> LayoutSnapshot {
        let theme = Theme::classic();
        let config = LayoutConfig {
            width,
            ..LayoutConfig::default()
        };
        let (mut nodes, links) = build_nodes(rows, heads, &theme);
        compute_layout(&mut nodes, heads, &theme, &config).unwrap();
        snapshot(&nodes, &links, &config)
    }

    #[test]
    fn positions_follow_depth_and_bounds() {
        let rows = vec![
            CommitRow::new("r", &[]),
            CommitRow::new("a", &["r"]),
            CommitRow::new("b", &["r"]),
        ];
        let snap = run(&rows, &[HeadRef::new("main", "a")], 200.0);
        let r = snap.node("r").unwrap();
        assert_eq!((r.x, r.y), (100.0, 25.0));
        let a = snap.node("a").unwrap();
        assert_eq!((a.x, a.y), (50.0, 125.0));
        let b = snap.node("b").unwrap();
        assert_eq!(b.x, 150.0);
        let head = snap.node("main").unwrap();
        assert_eq!(head.kind, NodeKind::Head);
        assert_eq!((head.x, head.y), (25.0, 225.0));
        assert_eq!(snap.links.len(), 3);
    }

    #[test]
    fn labels_use_short_hash() {
        let rows = vec![CommitRow::new("0123456789abcdef", &[])];
        let snap = run(&rows, &[], 100.0);
        assert_eq!(snap.node("0123456789abcdef").unwrap().label, "01234567");
    }

    #[test]
    fn empty_history_produces_empty_snapshot() {
        let snap = run(&[], &[], 100.0);
        assert!(snap.is_empty());
        assert!(snap.links.is_empty());
    }
}
