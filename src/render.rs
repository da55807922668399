use crate::config::{LayoutConfig, RenderConfig};
use crate::engine::{GraphDiff, GraphUpdate};
use crate::layout::{LayoutSnapshot, LinkLayout, NodeKind, NodeLayout};
use crate::theme::Theme;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

const NODE_RADIUS: f32 = 29.6;
const HEAD_HALF_SIDE: f32 = 26.2;
const LABEL_OFFSET_X: f32 = -21.0;
const LABEL_OFFSET_Y: f32 = 5.0;

/// Consumer of laid-out graphs. Implementations key their visuals by hash:
/// hashes in `diff.removed` go away, everything in the snapshot is drawn or
/// moved to its new position.
pub trait Renderer {
    fn render(&mut self, snapshot: &LayoutSnapshot, diff: &GraphDiff) -> Result<()>;

    fn render_update(&mut self, update: &GraphUpdate) -> Result<()> {
        self.render(&update.snapshot, &update.diff)
    }
}

/// Keeps one SVG fragment per node and per link, updated in place as
/// snapshots arrive.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    theme: Theme,
    config: LayoutConfig,
    width: f32,
    height: f32,
    nodes: BTreeMap<String, String>,
    links: BTreeMap<(String, String), String>,
    frames: usize,
}

impl SvgRenderer {
    pub fn new(theme: Theme, config: LayoutConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            theme,
            config,
            nodes: BTreeMap::new(),
            links: BTreeMap::new(),
            frames: 0,
        }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn node_fragment(&self, hash: &str) -> Option<&str> {
        self.nodes.get(hash).map(String::as_str)
    }

    pub fn drawn_nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn svg(&self) -> String {
        let mut svg = open_svg(self.width, self.height, &self.config.container_id, &self.theme);
        for fragment in self.links.values() {
            svg.push_str(fragment);
        }
        for fragment in self.nodes.values() {
            svg.push_str(fragment);
        }
        svg.push_str("</svg>");
        svg
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, snapshot: &LayoutSnapshot, diff: &GraphDiff) -> Result<()> {
        for hash in &diff.removed {
            if !snapshot.nodes.contains_key(hash) {
                self.nodes.remove(hash);
            }
        }
        self.links.retain(|(source, target), _| {
            snapshot.nodes.contains_key(source) && snapshot.nodes.contains_key(target)
        });
        for link in &snapshot.links {
            self.links.insert(
                (link.source.clone(), link.target.clone()),
                link_svg(link, &self.theme),
            );
        }
        for node in snapshot.nodes.values() {
            self.nodes.insert(node.hash.clone(), node_svg(node, &self.theme));
        }
        self.width = snapshot.width;
        self.height = snapshot.height;
        self.frames += 1;
        Ok(())
    }
}

pub fn render_svg(snapshot: &LayoutSnapshot, theme: &Theme, config: &LayoutConfig) -> String {
    let mut svg = open_svg(snapshot.width, snapshot.height, &config.container_id, theme);
    // Links first so nodes are painted over them.
    for link in &snapshot.links {
        svg.push_str(&link_svg(link, theme));
    }
    for node in snapshot.nodes.values() {
        svg.push_str(&node_svg(node, theme));
    }
    svg.push_str("</svg>");
    svg
}

fn open_svg(width: f32, height: f32, id: &str, theme: &Theme) -> String {
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" id=\"{}\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
        escape_xml(id)
    );
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str(&format!(
        "<defs><marker id=\"arrow\" viewBox=\"0 0 20 20\" refX=\"30\" refY=\"10\" markerUnits=\"strokeWidth\" markerWidth=\"11\" markerHeight=\"7\" orient=\"auto\"><path d=\"M 0 0 L 20 10 L 0 20 z\" fill=\"{}\"/></marker></defs>",
        theme.line_color
    ));
    svg
}

fn link_svg(link: &LinkLayout, theme: &Theme) -> String {
    format!(
        "<path class=\"link\" data-source=\"{}\" data-target=\"{}\" d=\"M{:.2},{:.2} L{:.2},{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" marker-end=\"url(#arrow)\"/>",
        escape_xml(&link.source),
        escape_xml(&link.target),
        link.from.0,
        link.from.1,
        link.to.0,
        link.to.1,
        theme.line_color
    )
}

fn node_svg(node: &NodeLayout, theme: &Theme) -> String {
    let shape = match node.kind {
        NodeKind::Commit => format!(
            "<circle r=\"{NODE_RADIUS}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            node.fill, theme.node_stroke, theme.node_stroke_width
        ),
        NodeKind::Head => format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
            -HEAD_HALF_SIDE,
            -HEAD_HALF_SIDE,
            HEAD_HALF_SIDE * 2.0,
            HEAD_HALF_SIDE * 2.0,
            node.fill,
            theme.node_stroke,
            theme.node_stroke_width
        ),
    };
    format!(
        "<g class=\"node {}\" id=\"{}\" transform=\"translate({:.2},{:.2})\">{}<text x=\"{LABEL_OFFSET_X}\" y=\"{LABEL_OFFSET_Y}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text></g>",
        match node.kind {
            NodeKind::Commit => "commit",
            NodeKind::Head => "head",
        },
        escape_xml(&node.hash),
        node.x,
        node.y,
        shape,
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.label_color,
        escape_xml(&node.label)
    )
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Helvetica".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid canvas size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!(
        "PNG output requires the 'png' feature"
    ))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
