use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{Config, LayoutConfig};
use crate::ir::{CommitRow, HeadRef};
use crate::layout::{
    GraphNode, LayoutError, LayoutSnapshot, Link, build_nodes, compute_layout, index_nodes,
    snapshot, validate_input,
};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Empty,
    Populated,
}

/// Every node currently on screen, indexed by hash, plus the links between
/// them. Node order is insertion order: survivors first, newcomers after.
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    nodes: Vec<GraphNode>,
    index: HashMap<String, usize>,
    links: Vec<Link>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, hash: &str) -> Option<&GraphNode> {
        self.index.get(hash).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.index.contains_key(hash)
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn hashes(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(GraphNode::hash)
    }

    fn extend(&mut self, nodes: Vec<GraphNode>, links: Vec<Link>) {
        self.nodes.extend(nodes);
        self.links.extend(links);
        self.index = index_nodes(&self.nodes);
    }

    /// Drops the given nodes and every link that touches one of them.
    fn evict(&mut self, stale: &HashSet<String>) {
        if stale.is_empty() {
            return;
        }
        self.nodes.retain(|node| !stale.contains(node.hash()));
        self.links
            .retain(|link| !stale.contains(&link.source) && !stale.contains(&link.target));
        self.index = index_nodes(&self.nodes);
    }

    fn is_known_commit(&self, hash: &str) -> bool {
        matches!(self.get(hash), Some(GraphNode::Commit(_)))
    }

    fn is_unmoved_head(&self, head: &HeadRef) -> bool {
        matches!(self.get(&head.id), Some(GraphNode::Head(node)) if node.pointed_hash == head.pointed_hash)
    }
}

/// What changed between the previous snapshot and this one, by hash.
/// A head that moved is listed in both `removed` and `added`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GraphDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub retained: Vec<String>,
}

impl GraphDiff {
    pub fn is_unchanged(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct GraphUpdate {
    pub snapshot: LayoutSnapshot,
    pub diff: GraphDiff,
}

/// Owns the working set and re-lays it out as history arrives.
///
/// Each call either completes and replaces the working set or fails with a
/// `LayoutError` and leaves it untouched. Methods take `&mut self`, so one
/// update always finishes before the next starts. Every update re-runs the
/// full layout over the merged set, which is linear in graph size.
#[derive(Debug, Clone)]
pub struct GraphEngine {
    theme: Theme,
    config: LayoutConfig,
    working: WorkingSet,
    state: EngineState,
    current: LayoutSnapshot,
}

impl GraphEngine {
    pub fn new(theme: Theme, config: LayoutConfig) -> Self {
        Self {
            theme,
            config,
            working: WorkingSet::new(),
            state: EngineState::Empty,
            current: LayoutSnapshot::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.theme.clone(), config.layout.clone())
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working
    }

    pub fn snapshot(&self) -> &LayoutSnapshot {
        &self.current
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Builds on the first call, updates afterwards.
    pub fn make_graph(
        &mut self,
        rows: &[CommitRow],
        heads: &[HeadRef],
    ) -> Result<GraphUpdate, LayoutError> {
        match self.state {
            EngineState::Empty => self.build_graph(rows, heads),
            EngineState::Populated => self.update_graph(rows, heads),
        }
    }

    /// Lays out `rows` and `heads` from scratch, discarding any earlier
    /// working set.
    pub fn build_graph(
        &mut self,
        rows: &[CommitRow],
        heads: &[HeadRef],
    ) -> Result<GraphUpdate, LayoutError> {
        validate_input(rows, heads)?;

        let (nodes, links) = build_nodes(rows, heads, &self.theme);
        let mut next = WorkingSet::new();
        next.extend(nodes, links);
        compute_layout(&mut next.nodes, heads, &self.theme, &self.config)?;

        let previous: HashSet<&str> = self.working.hashes().collect();
        let mut diff = GraphDiff::default();
        for hash in next.hashes() {
            if previous.contains(hash) {
                diff.retained.push(hash.to_string());
            } else {
                diff.added.push(hash.to_string());
            }
        }
        let incoming: HashSet<&str> = next.hashes().collect();
        diff.removed = self
            .working
            .hashes()
            .filter(|hash| !incoming.contains(hash))
            .map(str::to_string)
            .collect();

        Ok(self.commit(next, diff))
    }

    /// Diffs the input against the working set, keeps what survives, and
    /// re-lays out the merged set. Falls back to `build_graph` when empty.
    pub fn update_graph(
        &mut self,
        rows: &[CommitRow],
        heads: &[HeadRef],
    ) -> Result<GraphUpdate, LayoutError> {
        if self.state == EngineState::Empty {
            return self.build_graph(rows, heads);
        }
        validate_input(rows, heads)?;

        let new_rows: Vec<CommitRow> = rows
            .iter()
            .filter(|row| !self.working.is_known_commit(&row.hash))
            .cloned()
            .collect();
        let new_heads: Vec<HeadRef> = heads
            .iter()
            .filter(|head| !self.working.is_unmoved_head(head))
            .cloned()
            .collect();

        let incoming_commits: HashSet<&str> = rows.iter().map(|row| row.hash.as_str()).collect();
        let mut stale: HashSet<String> = HashSet::new();
        let mut retained = Vec::new();
        for node in self.working.nodes() {
            let keep = match node {
                GraphNode::Commit(commit) => incoming_commits.contains(commit.hash.as_str()),
                GraphNode::Head(head) => heads
                    .iter()
                    .any(|h| h.id == head.id && h.pointed_hash == head.pointed_hash),
            };
            if keep {
                retained.push(node.hash().to_string());
            } else {
                stale.insert(node.hash().to_string());
            }
        }

        let mut next = self.working.clone();
        next.evict(&stale);
        let (nodes, links) = build_nodes(&new_rows, &new_heads, &self.theme);
        let added: Vec<String> = nodes.iter().map(|node| node.hash().to_string()).collect();
        next.extend(nodes, links);
        compute_layout(&mut next.nodes, heads, &self.theme, &self.config)?;

        let mut removed: Vec<String> = stale.into_iter().collect();
        removed.sort();
        let diff = GraphDiff {
            added,
            removed,
            retained,
        };
        Ok(self.commit(next, diff))
    }

    pub fn reset(&mut self) {
        self.working = WorkingSet::new();
        self.current = LayoutSnapshot::default();
        self.state = EngineState::Empty;
    }

    fn commit(&mut self, next: WorkingSet, diff: GraphDiff) -> GraphUpdate {
        debug!(
            nodes = next.len(),
            links = next.links().len(),
            added = diff.added.len(),
            removed = diff.removed.len(),
            "graph laid out"
        );
        let laid_out = snapshot(next.nodes(), next.links(), &self.config);
        self.working = next;
        self.current = laid_out.clone();
        if self.state == EngineState::Empty {
            info!(container = %self.config.container_id, "graph populated");
            self.state = EngineState::Populated;
        }
        GraphUpdate {
            snapshot: laid_out,
            diff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Bounds, NodeKind};

    fn engine() -> GraphEngine {
        GraphEngine::new(Theme::classic(), LayoutConfig::with_canvas(400.0, 300.0, "tree"))
    }

    fn chain() -> Vec<CommitRow> {
        vec![
            CommitRow::new("r", &[]),
            CommitRow::new("a", &["r"]),
            CommitRow::new("b", &["a"]),
        ]
    }

    #[test]
    fn first_call_populates() {
        let mut engine = engine();
        assert_eq!(engine.state(), EngineState::Empty);
        let update = engine
            .make_graph(&chain(), &[HeadRef::new("h1", "b")])
            .unwrap();
        assert_eq!(engine.state(), EngineState::Populated);
        assert_eq!(update.diff.added.len(), 4);
        assert_eq!(engine.working_set().len(), 4);
        assert_eq!(engine.working_set().links().len(), 3);
    }

    #[test]
    fn empty_input_still_populates() {
        let mut engine = engine();
        let update = engine.make_graph(&[], &[]).unwrap();
        assert!(update.snapshot.is_empty());
        assert_eq!(engine.state(), EngineState::Populated);
    }

    #[test]
    fn failed_call_leaves_state_untouched() {
        let mut engine = engine();
        let err = engine
            .make_graph(&[CommitRow::new("a", &["ghost"])], &[])
            .unwrap_err();
        assert!(matches!(err, LayoutError::MissingParent { .. }));
        assert_eq!(engine.state(), EngineState::Empty);

        engine.make_graph(&chain(), &[]).unwrap();
        let before = engine.snapshot().clone();
        let mut broken = chain();
        broken.push(CommitRow::new("c", &["zzz"]));
        assert!(engine.update_graph(&broken, &[]).is_err());
        assert_eq!(engine.snapshot(), &before);
        assert_eq!(engine.working_set().len(), 3);
    }

    #[test]
    fn moved_head_is_replaced() {
        let mut engine = engine();
        engine
            .make_graph(&chain(), &[HeadRef::new("dev", "a")])
            .unwrap();
        let update = engine
            .update_graph(&chain(), &[HeadRef::new("dev", "b")])
            .unwrap();
        assert_eq!(update.diff.added, vec!["dev".to_string()]);
        assert_eq!(update.diff.removed, vec!["dev".to_string()]);
        assert!(
            engine
                .working_set()
                .links()
                .contains(&Link::new("dev", "b"))
        );
        assert!(
            !engine
                .working_set()
                .links()
                .contains(&Link::new("dev", "a"))
        );
        assert_eq!(update.snapshot.node("dev").unwrap().depth, 3);
    }

    #[test]
    fn retained_commits_keep_their_interval() {
        let mut engine = engine();
        let rows = vec![CommitRow::new("r", &[]), CommitRow::new("a", &["r"])];
        engine.make_graph(&rows, &[]).unwrap();
        let mut more = rows.clone();
        more.push(CommitRow::new("b", &["r"]));
        let update = engine.update_graph(&more, &[]).unwrap();
        let a = update.snapshot.node("a").unwrap();
        assert_eq!(a.bounds, Some(Bounds::new(0.0, 400.0)));
        let b = update.snapshot.node("b").unwrap();
        assert_eq!(b.bounds, Some(Bounds::new(200.0, 400.0)));
        assert_eq!(b.kind, NodeKind::Commit);
    }

    #[test]
    fn commit_absent_from_input_is_evicted() {
        let mut engine = engine();
        engine.make_graph(&chain(), &[]).unwrap();
        let update = engine.update_graph(&chain()[..2], &[]).unwrap();
        assert_eq!(update.diff.removed, vec!["b".to_string()]);
        assert!(!engine.working_set().contains("b"));
        assert!(
            engine
                .working_set()
                .links()
                .iter()
                .all(|link| !link.touches("b"))
        );
    }
}
