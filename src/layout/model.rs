use std::collections::HashSet;

use crate::ir::{CommitRow, HeadRef};
use crate::theme::Theme;

use super::error::LayoutError;
use super::tree::find_root;
use super::types::{CommitNode, GraphNode, HeadNode, Link};

/// Checks a full input (commit rows plus heads) without building anything.
///
/// Every parent and every head target must name a commit row, hashes must be
/// unique across commits and heads, and a non-empty history must have exactly
/// one root.
pub fn validate_input(rows: &[CommitRow], heads: &[HeadRef]) -> Result<(), LayoutError> {
    let mut commits: HashSet<&str> = HashSet::with_capacity(rows.len());
    for row in rows {
        if !commits.insert(row.hash.as_str()) {
            return Err(LayoutError::DuplicateHash(row.hash.clone()));
        }
    }
    for row in rows {
        for parent in &row.parents {
            if !commits.contains(parent.as_str()) {
                return Err(LayoutError::MissingParent {
                    commit: row.hash.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }

    let mut head_ids: HashSet<&str> = HashSet::with_capacity(heads.len());
    for head in heads {
        if commits.contains(head.id.as_str()) || !head_ids.insert(head.id.as_str()) {
            return Err(LayoutError::DuplicateHash(head.id.clone()));
        }
        if !commits.contains(head.pointed_hash.as_str()) {
            return Err(LayoutError::DanglingHead {
                head: head.id.clone(),
                target: head.pointed_hash.clone(),
            });
        }
    }

    find_root(rows.iter().map(|row| (row.hash.as_str(), row.is_root())))?;
    Ok(())
}

/// Turns rows and heads into graph nodes plus the links they imply.
pub fn build_nodes(
    rows: &[CommitRow],
    heads: &[HeadRef],
    theme: &Theme,
) -> (Vec<GraphNode>, Vec<Link>) {
    let mut nodes = Vec::with_capacity(rows.len() + heads.len());
    let mut links = Vec::new();

    for row in rows {
        nodes.push(GraphNode::Commit(CommitNode {
            hash: row.hash.clone(),
            parents: row.parents.clone(),
            author: row.author.clone(),
            subject: row.subject.clone(),
            timestamp: row.timestamp,
            depth: 0,
            bounds: None,
            fill: theme.commit_fill.clone(),
            claim_depth: None,
        }));
        for parent in &row.parents {
            links.push(Link::new(&row.hash, parent));
        }
    }

    for head in heads {
        nodes.push(GraphNode::Head(HeadNode {
            id: head.id.clone(),
            pointed_hash: head.pointed_hash.clone(),
            depth: 0,
            fill: theme.palette.color_for(head.color_key()),
        }));
        links.push(Link::new(&head.id, &head.pointed_hash));
    }

    (nodes, links)
}
