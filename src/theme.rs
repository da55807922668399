use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

/// Fixed color table; a head id always maps to the same entry.
/// `pinned` colors take precedence over the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub colors: Vec<String>,
    #[serde(default)]
    pub pinned: BTreeMap<String, String>,
}

impl Palette {
    pub fn new<I, S>(colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            colors: colors.into_iter().map(Into::into).collect(),
            pinned: BTreeMap::new(),
        }
    }

    pub fn pin(mut self, id: &str, color: &str) -> Self {
        self.pinned.insert(id.to_string(), color.to_string());
        self
    }

    pub fn category10() -> Self {
        Self::new(CATEGORY10)
    }

    pub fn color_for(&self, id: &str) -> String {
        if let Some(color) = self.pinned.get(id) {
            return color.clone();
        }
        if self.colors.is_empty() {
            return "#000000".to_string();
        }
        let idx = (fnv1a(id.as_bytes()) % self.colors.len() as u64) as usize;
        self.colors[idx].clone()
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::category10()
    }
}

// FNV-1a keeps colors stable across runs and platforms, unlike the std hasher.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub commit_fill: String,
    pub node_stroke: String,
    pub node_stroke_width: f32,
    pub line_color: String,
    pub label_color: String,
    pub palette: Palette,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "'Helvetica Neue', Helvetica, Arial, sans-serif".to_string(),
            font_size: 14.0,
            background: "#82CAFF".to_string(),
            commit_fill: "orange".to_string(),
            node_stroke: "white".to_string(),
            node_stroke_width: 3.0,
            line_color: "#333333".to_string(),
            label_color: "#000000".to_string(),
            palette: Palette::category10(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            commit_fill: "#C7D2E5".to_string(),
            node_stroke: "#FFFFFF".to_string(),
            node_stroke_width: 2.0,
            line_color: "#7A8AA6".to_string(),
            label_color: "#1C2430".to_string(),
            palette: Palette::category10(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
