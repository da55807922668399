#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod engine;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, LayoutConfig, TieBreak, load_config};
pub use engine::{EngineState, GraphDiff, GraphEngine, GraphUpdate, WorkingSet};
pub use ir::{CommitRow, HeadRef, Snapshot};
pub use layout::{LayoutError, LayoutSnapshot};
pub use parser::parse_snapshots;
pub use render::{Renderer, SvgRenderer, render_svg};
pub use theme::{Palette, Theme};
