use crate::engine::{GraphDiff, GraphUpdate};
use crate::layout::{LayoutSnapshot, NodeKind};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct LayoutDump {
    pub width: f32,
    pub height: f32,
    pub nodes: Vec<NodeDump>,
    pub links: Vec<LinkDump>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<GraphDiff>,
}

#[derive(Debug, Serialize)]
pub struct NodeDump {
    pub hash: String,
    pub kind: NodeKind,
    pub depth: usize,
    pub x: f32,
    pub y: f32,
    pub fill: String,
    pub label: String,
    pub bounds: Option<[f32; 2]>,
}

#[derive(Debug, Serialize)]
pub struct LinkDump {
    pub source: String,
    pub target: String,
}

impl LayoutDump {
    pub fn from_snapshot(snapshot: &LayoutSnapshot) -> Self {
        let nodes = snapshot
            .nodes
            .values()
            .map(|node| NodeDump {
                hash: node.hash.clone(),
                kind: node.kind,
                depth: node.depth,
                x: node.x,
                y: node.y,
                fill: node.fill.clone(),
                label: node.label.clone(),
                bounds: node.bounds.map(|b| [b.lower, b.upper]),
            })
            .collect();

        let links = snapshot
            .links
            .iter()
            .map(|link| LinkDump {
                source: link.source.clone(),
                target: link.target.clone(),
            })
            .collect();

        LayoutDump {
            width: snapshot.width,
            height: snapshot.height,
            nodes,
            links,
            diff: None,
        }
    }

    pub fn from_update(update: &GraphUpdate) -> Self {
        let mut dump = Self::from_snapshot(&update.snapshot);
        dump.diff = Some(update.diff.clone());
        dump
    }
}

pub fn write_layout_dump(path: Option<&Path>, update: &GraphUpdate) -> anyhow::Result<()> {
    let dump = LayoutDump::from_update(update);
    match path {
        Some(path) => {
            let file = File::create(path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, &dump)?;
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&dump)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::engine::GraphEngine;
    use crate::ir::{CommitRow, HeadRef};
    use crate::theme::Theme;

    #[test]
    fn dump_lists_nodes_links_and_diff() {
        let mut engine = GraphEngine::new(Theme::classic(), LayoutConfig::default());
        let update = engine
            .make_graph(
                &[CommitRow::new("r", &[]), CommitRow::new("a", &["r"])],
                &[HeadRef::new("main", "a")],
            )
            .unwrap();
        let value = serde_json::to_value(LayoutDump::from_update(&update)).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), 3);
        assert_eq!(value["links"].as_array().unwrap().len(), 2);
        assert_eq!(value["diff"]["added"].as_array().unwrap().len(), 3);
        let head = value["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|node| node["hash"] == "main")
            .unwrap();
        assert_eq!(head["kind"], "head");
        assert!(head["bounds"].is_null());
    }
}
