use crate::theme::{Palette, Theme};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Which head keeps a commit when two heads point at the same depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TieBreak {
    /// A later head overwrites an equal-depth claim.
    #[default]
    LastWins,
    /// The first head to claim a commit keeps it on equal depth.
    FirstWins,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub width: f32,
    pub height: f32,
    pub level_height: f32,
    pub border_offset: f32,
    pub container_id: String,
    pub tie_break: TieBreak,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
            level_height: 100.0,
            border_offset: 25.0,
            container_id: "git_tree".to_string(),
            tie_break: TieBreak::LastWins,
        }
    }
}

impl LayoutConfig {
    pub fn with_canvas(width: f32, height: f32, container_id: &str) -> Self {
        Self {
            width,
            height,
            container_id: container_id.to_string(),
            ..Self::default()
        }
    }

    pub fn depth_to_y(&self, depth: usize) -> f32 {
        self.level_height * depth as f32 + self.border_offset
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 600.0,
            background: "#82CAFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

impl Config {
    /// Canvas size is set once here; the render target follows it.
    pub fn set_canvas(&mut self, width: f32, height: f32) {
        self.layout.width = width;
        self.layout.height = height;
        self.render.width = width;
        self.render.height = height;
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    commit_color: Option<String>,
    node_stroke: Option<String>,
    node_stroke_width: Option<f32>,
    line_color: Option<String>,
    label_color: Option<String>,
    palette: Option<Vec<String>>,
    branch_colors: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutSection {
    width: Option<f32>,
    height: Option<f32>,
    level_height: Option<f32>,
    border_offset: Option<f32>,
    container_id: Option<String>,
    tie_break: Option<TieBreak>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutSection>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    match parsed.theme.as_deref() {
        Some("modern") => config.theme = Theme::modern(),
        Some("classic") | Some("default") => config.theme = Theme::classic(),
        Some(other) => anyhow::bail!("unknown theme '{other}'"),
        None => {}
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.commit_color {
            config.theme.commit_fill = v;
        }
        if let Some(v) = vars.node_stroke {
            config.theme.node_stroke = v;
        }
        if let Some(v) = vars.node_stroke_width {
            config.theme.node_stroke_width = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.label_color {
            config.theme.label_color = v;
        }
        if let Some(v) = vars.palette {
            if v.is_empty() {
                anyhow::bail!("palette must contain at least one color");
            }
            config.theme.palette = Palette {
                colors: v,
                pinned: std::mem::take(&mut config.theme.palette.pinned),
            };
        }
        if let Some(v) = vars.branch_colors {
            config.theme.palette.pinned.extend(v);
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.width {
            config.layout.width = v;
            config.render.width = v;
        }
        if let Some(v) = layout.height {
            config.layout.height = v;
            config.render.height = v;
        }
        if let Some(v) = layout.level_height {
            config.layout.level_height = v;
        }
        if let Some(v) = layout.border_offset {
            config.layout.border_offset = v;
        }
        if let Some(v) = layout.container_id {
            config.layout.container_id = v;
        }
        if let Some(v) = layout.tie_break {
            config.layout.tie_break = v;
        }
    }

    config.render.background = config.theme.background.clone();

    Ok(config)
}
