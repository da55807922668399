use std::collections::HashMap;

use super::error::LayoutError;
use super::types::{GraphNode, Tree};

/// Picks the single parentless commit out of `(hash, is_root)` pairs.
///
/// Returns `Ok(None)` for an empty history.
pub(crate) fn find_root<'a, I>(commits: I) -> Result<Option<&'a str>, LayoutError>
where
    I: IntoIterator<Item = (&'a str, bool)>,
{
    let mut root: Option<&str> = None;
    let mut seen_any = false;
    for (hash, is_root) in commits {
        seen_any = true;
        if !is_root {
            continue;
        }
        if let Some(first) = root {
            return Err(LayoutError::MultipleRoots {
                first: first.to_string(),
                second: hash.to_string(),
            });
        }
        root = Some(hash);
    }
    if seen_any && root.is_none() {
        return Err(LayoutError::MissingRoot);
    }
    Ok(root)
}

/// Reduces the commit DAG to a root plus a parent → children map.
///
/// Children keep node order. Head nodes are ignored.
pub fn reduce_tree(nodes: &[GraphNode]) -> Result<Option<Tree>, LayoutError> {
    let commits = nodes.iter().filter_map(GraphNode::as_commit);
    let Some(root) = find_root(commits.clone().map(|c| (c.hash.as_str(), c.is_root())))? else {
        return Ok(None);
    };

    let mut children: HashMap<String, Vec<String>> = HashMap::new();
    for commit in commits {
        for parent in &commit.parents {
            children
                .entry(parent.clone())
                .or_default()
                .push(commit.hash.clone());
        }
    }

    Ok(Some(Tree {
        root: root.to_string(),
        children,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{CommitRow, HeadRef};
    use crate::layout::model::build_nodes;
    use crate::theme::Theme;

    #[test]
    fn merge_commit_is_listed_under_each_parent() {
        let rows = vec![
            CommitRow::new("r", &[]),
            CommitRow::new("a", &["r"]),
            CommitRow::new("b", &["r"]),
            CommitRow::new("m", &["a", "b"]),
        ];
        let (nodes, _) = build_nodes(&rows, &[HeadRef::new("h", "m")], &Theme::classic());
        let tree = reduce_tree(&nodes).unwrap().unwrap();
        assert_eq!(tree.root, "r");
        assert_eq!(tree.children_of("r"), ["a".to_string(), "b".to_string()]);
        assert_eq!(tree.children_of("a"), ["m".to_string()]);
        assert_eq!(tree.children_of("b"), ["m".to_string()]);
        assert!(tree.children_of("m").is_empty());
        assert!(tree.children_of("h").is_empty());
    }

    #[test]
    fn empty_history_has_no_tree() {
        assert_eq!(reduce_tree(&[]).unwrap(), None);
    }
}
