use std::collections::{HashMap, HashSet, VecDeque};

use super::types::Tree;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    /// Longest-path distance from the root, per commit hash.
    pub depths: HashMap<String, usize>,
    /// Topological order: every commit appears after all of its parents.
    pub order: Vec<String>,
    /// Commits reachable from the root that sit on a cycle and got no depth.
    pub unranked: Vec<String>,
}

impl Ranking {
    pub fn depth_of(&self, hash: &str) -> Option<usize> {
        self.depths.get(hash).copied()
    }
}

/// Assigns each commit its longest-path depth from the root.
///
/// The history must be acyclic. Commits on a cycle never reach in-degree
/// zero, so they are reported in `unranked` instead of looping.
pub fn assign_depths(tree: &Tree) -> Ranking {
    let reachable = reachable_from(tree, &tree.root);

    let mut indeg: HashMap<&str, usize> = reachable.iter().map(|id| (*id, 0)).collect();
    for id in &reachable {
        for child in tree.children_of(id) {
            if let Some(deg) = indeg.get_mut(child.as_str()) {
                *deg += 1;
            }
        }
    }

    let mut depths: HashMap<String, usize> = HashMap::with_capacity(reachable.len());
    let mut order = Vec::with_capacity(reachable.len());
    let mut ready: VecDeque<&str> = VecDeque::new();
    if indeg.get(tree.root.as_str()) == Some(&0) {
        depths.insert(tree.root.clone(), 0);
        ready.push_back(tree.root.as_str());
    }

    while let Some(id) = ready.pop_front() {
        order.push(id.to_string());
        let depth = depths.get(id).copied().unwrap_or(0);
        for child in tree.children_of(id) {
            let entry = depths.entry(child.clone()).or_insert(0);
            *entry = (*entry).max(depth + 1);
            if let Some(deg) = indeg.get_mut(child.as_str()) {
                *deg = deg.saturating_sub(1);
                if *deg == 0 {
                    ready.push_back(child.as_str());
                }
            }
        }
    }

    let ranked: HashSet<&str> = order.iter().map(String::as_str).collect();
    let mut unranked: Vec<String> = reachable
        .iter()
        .filter(|id| !ranked.contains(*id))
        .map(|id| id.to_string())
        .collect();
    unranked.sort();
    for id in &unranked {
        depths.remove(id);
    }

    Ranking {
        depths,
        order,
        unranked,
    }
}

fn reachable_from<'a>(tree: &'a Tree, root: &'a str) -> Vec<&'a str> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        out.push(id);
        for child in tree.children_of(id) {
            stack.push(child.as_str());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(root: &str, edges: &[(&str, &str)]) -> Tree {
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for (parent, child) in edges {
            children
                .entry(parent.to_string())
                .or_default()
                .push(child.to_string());
        }
        Tree {
            root: root.to_string(),
            children,
        }
    }

    #[test]
    fn chain_depths_increase_by_one() {
        let ranking = assign_depths(&tree("r", &[("r", "a"), ("a", "b")]));
        assert_eq!(ranking.depth_of("r"), Some(0));
        assert_eq!(ranking.depth_of("a"), Some(1));
        assert_eq!(ranking.depth_of("b"), Some(2));
        assert_eq!(ranking.order, vec!["r", "a", "b"]);
    }

    #[test]
    fn merge_takes_longest_path() {
        // r -> a -> b -> c -> m and r -> m
        let ranking = assign_depths(&tree(
            "r",
            &[("r", "a"), ("a", "b"), ("b", "c"), ("c", "m"), ("r", "m")],
        ));
        assert_eq!(ranking.depth_of("m"), Some(4));
    }

    #[test]
    fn lengthening_the_long_path_pushes_the_merge_down() {
        let short = assign_depths(&tree("r", &[("r", "a"), ("a", "m"), ("r", "m")]));
        let long = assign_depths(&tree(
            "r",
            &[("r", "a"), ("a", "x"), ("x", "y"), ("y", "m"), ("r", "m")],
        ));
        assert_eq!(long.depth_of("m").unwrap() - short.depth_of("m").unwrap(), 2);
    }

    #[test]
    fn cycle_terminates_and_is_reported() {
        let ranking = assign_depths(&tree("r", &[("r", "a"), ("a", "b"), ("b", "a")]));
        assert_eq!(ranking.depth_of("r"), Some(0));
        assert_eq!(ranking.unranked, vec!["a".to_string(), "b".to_string()]);
    }
}
