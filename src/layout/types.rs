use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// Horizontal allocation window; a commit is drawn at its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub lower: f32,
    pub upper: f32,
}

impl Bounds {
    pub fn new(lower: f32, upper: f32) -> Self {
        Self { lower, upper }
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            lower: self.lower.min(other.lower),
            upper: self.upper.max(other.upper),
        }
    }

    pub fn center(&self) -> f32 {
        (self.lower + self.upper) / 2.0
    }

    pub fn width(&self) -> f32 {
        self.upper - self.lower
    }

    /// The `index`-th of `count` equal slices, in order.
    pub fn slice(&self, index: usize, count: usize) -> Bounds {
        let step = self.width() / count.max(1) as f32;
        Bounds {
            lower: self.lower + index as f32 * step,
            upper: self.lower + (index + 1) as f32 * step,
        }
    }

    pub fn contains(&self, other: &Bounds) -> bool {
        self.lower <= other.lower && other.upper <= self.upper
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Commit,
    Head,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitNode {
    pub hash: String,
    pub parents: Vec<String>,
    pub author: String,
    pub subject: String,
    pub timestamp: i64,
    pub depth: usize,
    pub bounds: Option<Bounds>,
    pub fill: String,
    pub claim_depth: Option<usize>,
}

impl CommitNode {
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadNode {
    pub id: String,
    pub pointed_hash: String,
    pub depth: usize,
    pub fill: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GraphNode {
    Commit(CommitNode),
    Head(HeadNode),
}

impl GraphNode {
    pub fn hash(&self) -> &str {
        match self {
            GraphNode::Commit(commit) => &commit.hash,
            GraphNode::Head(head) => &head.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            GraphNode::Commit(_) => NodeKind::Commit,
            GraphNode::Head(_) => NodeKind::Head,
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            GraphNode::Commit(commit) => commit.depth,
            GraphNode::Head(head) => head.depth,
        }
    }

    pub fn fill(&self) -> &str {
        match self {
            GraphNode::Commit(commit) => &commit.fill,
            GraphNode::Head(head) => &head.fill,
        }
    }

    pub fn as_commit(&self) -> Option<&CommitNode> {
        match self {
            GraphNode::Commit(commit) => Some(commit),
            GraphNode::Head(_) => None,
        }
    }

    pub fn as_head(&self) -> Option<&HeadNode> {
        match self {
            GraphNode::Head(head) => Some(head),
            GraphNode::Commit(_) => None,
        }
    }
}

/// Child commit to parent, or head to the commit it points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Link {
    pub source: String,
    pub target: String,
}

impl Link {
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
        }
    }

    pub fn touches(&self, hash: &str) -> bool {
        self.source == hash || self.target == hash
    }
}

/// Spanning structure of the commit DAG: a merge commit is listed under
/// every one of its parents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tree {
    pub root: String,
    pub children: HashMap<String, Vec<String>>,
}

impl Tree {
    pub fn children_of(&self, hash: &str) -> &[String] {
        self.children.get(hash).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeLayout {
    pub hash: String,
    pub kind: NodeKind,
    pub depth: usize,
    pub x: f32,
    pub y: f32,
    pub fill: String,
    pub label: String,
    pub bounds: Option<Bounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkLayout {
    pub source: String,
    pub target: String,
    pub from: (f32, f32),
    pub to: (f32, f32),
}

/// Immutable result of one layout pass, keyed by hash.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayoutSnapshot {
    pub width: f32,
    pub height: f32,
    pub nodes: BTreeMap<String, NodeLayout>,
    pub links: Vec<LinkLayout>,
}

impl LayoutSnapshot {
    pub fn node(&self, hash: &str) -> Option<&NodeLayout> {
        self.nodes.get(hash)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
