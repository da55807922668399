use std::collections::{BTreeSet, HashMap, HashSet};

use crate::config::TieBreak;
use crate::ir::HeadRef;
use crate::theme::Theme;

use super::ranking::Ranking;
use super::types::GraphNode;

/// Colors commits by the head that owns them and gives each head a depth.
///
/// Claims are rebuilt from scratch. A head claims every ancestor of its
/// commit unless that ancestor is already held by a head whose commit is
/// nearer the root. Heads are then stacked on the first free layer below
/// their commit. Returns head id → depth.
pub fn assign_ownership(
    nodes: &mut [GraphNode],
    index: &HashMap<String, usize>,
    heads: &[HeadRef],
    ranking: &Ranking,
    theme: &Theme,
    tie_break: TieBreak,
) -> HashMap<String, usize> {
    for node in nodes.iter_mut() {
        if let GraphNode::Commit(commit) = node {
            commit.claim_depth = None;
            commit.fill = theme.commit_fill.clone();
        }
    }

    for head in heads {
        let Some(pointed_depth) = ranking.depth_of(&head.pointed_hash) else {
            continue;
        };
        let color = theme.palette.color_for(head.color_key());
        for hash in collect_ancestors(nodes, index, &head.pointed_hash) {
            let Some(&idx) = index.get(&hash) else {
                continue;
            };
            let GraphNode::Commit(commit) = &mut nodes[idx] else {
                continue;
            };
            let takes_over = match (commit.claim_depth, tie_break) {
                (None, _) => true,
                (Some(claim), TieBreak::LastWins) => claim >= pointed_depth,
                (Some(claim), TieBreak::FirstWins) => claim > pointed_depth,
            };
            if takes_over {
                commit.fill = color.clone();
                commit.claim_depth = Some(pointed_depth);
            }
        }
    }

    let mut used: BTreeSet<usize> = BTreeSet::new();
    let mut head_depths = HashMap::with_capacity(heads.len());
    for head in heads {
        let pointed_depth = ranking.depth_of(&head.pointed_hash).unwrap_or(0);
        let mut depth = pointed_depth + 1;
        while used.contains(&depth) {
            depth += 1;
        }
        used.insert(depth);
        if let Some(&idx) = index.get(&head.id) {
            if let GraphNode::Head(node) = &mut nodes[idx] {
                node.depth = depth;
            }
        }
        head_depths.insert(head.id.clone(), depth);
    }
    head_depths
}

/// Every commit reachable from `start` through parent links, `start` included.
pub fn collect_ancestors(
    nodes: &[GraphNode],
    index: &HashMap<String, usize>,
    start: &str,
) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    let mut stack = vec![start];
    while let Some(hash) = stack.pop() {
        if !seen.insert(hash) {
            continue;
        }
        let Some(GraphNode::Commit(commit)) = index.get(hash).map(|&idx| &nodes[idx]) else {
            continue;
        };
        out.push(commit.hash.clone());
        for parent in &commit.parents {
            stack.push(parent.as_str());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::CommitRow;
    use crate::layout::model::build_nodes;
    use crate::layout::ranking::assign_depths;
    use crate::layout::tree::reduce_tree;
    use crate::theme::Palette;

    fn theme() -> Theme {
        let mut theme = Theme::classic();
        theme.palette = Palette::new(["red"]);
        theme
    }

    struct Fixture {
        nodes: Vec<GraphNode>,
        index: HashMap<String, usize>,
        ranking: Ranking,
    }

    fn fixture(rows: &[CommitRow], heads: &[HeadRef], theme: &Theme) -> Fixture {
        let (nodes, _) = build_nodes(rows, heads, theme);
        let index = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (node.hash().to_string(), idx))
            .collect();
        let tree = reduce_tree(&nodes).unwrap().unwrap();
        let ranking = assign_depths(&tree);
        Fixture {
            nodes,
            index,
            ranking,
        }
    }

    fn fill<'a>(f: &'a Fixture, hash: &str) -> &'a str {
        f.nodes[f.index[hash]].fill()
    }

    fn claim(f: &Fixture, hash: &str) -> Option<usize> {
        f.nodes[f.index[hash]].as_commit().unwrap().claim_depth
    }

    #[test]
    fn head_colors_its_whole_ancestry() {
        let rows = vec![
            CommitRow::new("r", &[]),
            CommitRow::new("a", &["r"]),
            CommitRow::new("b", &["a"]),
        ];
        let heads = vec![HeadRef::new("h1", "b")];
        let theme = theme();
        let mut f = fixture(&rows, &heads, &theme);
        let depths = assign_ownership(
            &mut f.nodes,
            &f.index,
            &heads,
            &f.ranking,
            &theme,
            TieBreak::LastWins,
        );
        for hash in ["r", "a", "b"] {
            assert_eq!(fill(&f, hash), "red");
            assert_eq!(claim(&f, hash), Some(2));
        }
        assert_eq!(depths["h1"], 3);
        assert_eq!(f.nodes[f.index["h1"]].depth(), 3);
    }

    #[test]
    fn head_nearer_root_keeps_shared_ancestors() {
        // r - a - b, dev points at a, master at b
        let rows = vec![
            CommitRow::new("r", &[]),
            CommitRow::new("a", &["r"]),
            CommitRow::new("b", &["a"]),
        ];
        let heads = vec![HeadRef::new("dev", "a"), HeadRef::new("master", "b")];
        let mut theme = Theme::classic();
        theme.palette = Palette::new(["gray"])
            .pin("dev", "#000001")
            .pin("master", "#000002");
        let mut f = fixture(&rows, &heads, &theme);
        assign_ownership(
            &mut f.nodes,
            &f.index,
            &heads,
            &f.ranking,
            &theme,
            TieBreak::LastWins,
        );
        let dev = theme.palette.color_for("dev");
        let master = theme.palette.color_for("master");
        assert_eq!(fill(&f, "r"), dev);
        assert_eq!(fill(&f, "a"), dev);
        assert_eq!(fill(&f, "b"), master);
        assert_eq!(claim(&f, "r"), Some(1));
        assert_eq!(claim(&f, "b"), Some(2));
    }

    #[test]
    fn equal_depth_tie_break_is_configurable() {
        let rows = vec![
            CommitRow::new("r", &[]),
            CommitRow::new("a", &["r"]),
            CommitRow::new("b", &["r"]),
        ];
        let heads = vec![HeadRef::new("left", "a"), HeadRef::new("right", "b")];
        let mut theme = Theme::classic();
        theme.palette = Palette::new(["gray"])
            .pin("left", "#0000aa")
            .pin("right", "#aa0000");
        let left = theme.palette.color_for("left");
        let right = theme.palette.color_for("right");

        let mut last = fixture(&rows, &heads, &theme);
        assign_ownership(
            &mut last.nodes,
            &last.index,
            &heads,
            &last.ranking,
            &theme,
            TieBreak::LastWins,
        );
        assert_eq!(fill(&last, "r"), right);

        let mut first = fixture(&rows, &heads, &theme);
        assign_ownership(
            &mut first.nodes,
            &first.index,
            &heads,
            &first.ranking,
            &theme,
            TieBreak::FirstWins,
        );
        assert_eq!(fill(&first, "r"), left);
        assert_eq!(fill(&first, "a"), left);
        assert_eq!(fill(&first, "b"), right);
    }

    #[test]
    fn heads_on_one_commit_get_distinct_depths() {
        let rows = vec![CommitRow::new("r", &[]), CommitRow::new("a", &["r"])];
        let heads = vec![
            HeadRef::new("x", "a"),
            HeadRef::new("y", "a"),
            HeadRef::new("z", "r"),
        ];
        let theme = theme();
        let mut f = fixture(&rows, &heads, &theme);
        let depths = assign_ownership(
            &mut f.nodes,
            &f.index,
            &heads,
            &f.ranking,
            &theme,
            TieBreak::LastWins,
        );
        assert_eq!(depths["x"], 2);
        assert_eq!(depths["y"], 3);
        assert_eq!(depths["z"], 1);
    }

    #[test]
    fn unclaimed_commits_fall_back_to_default_fill() {
        let rows = vec![CommitRow::new("r", &[]), CommitRow::new("a", &["r"])];
        let theme = theme();
        let mut f = fixture(&rows, &[], &theme);
        assign_ownership(
            &mut f.nodes,
            &f.index,
            &[],
            &f.ranking,
            &theme,
            TieBreak::LastWins,
        );
        assert_eq!(fill(&f, "a"), "orange");
        assert_eq!(claim(&f, "a"), None);
    }
}
