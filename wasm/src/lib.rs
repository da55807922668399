use gittree_rs::{GraphEngine, LayoutConfig, Snapshot, Theme, render_svg};
use wasm_bindgen::prelude::*;

/// One graph bound to a container. Successive `makeGraph` calls update the
/// same layout in place.
#[wasm_bindgen]
pub struct GitTree {
    engine: GraphEngine,
}

#[wasm_bindgen]
impl GitTree {
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32, container_id: &str) -> GitTree {
        let config = LayoutConfig::with_canvas(width, height, container_id);
        GitTree {
            engine: GraphEngine::new(Theme::classic(), config),
        }
    }

    /// Takes `{"commits": [...], "heads": [...]}` and returns the SVG for the
    /// updated graph.
    #[wasm_bindgen(js_name = makeGraph)]
    pub fn make_graph(&mut self, input_json: &str) -> Result<String, JsValue> {
        let input = parse_input(input_json).map_err(|error| JsValue::from_str(&error))?;
        self.apply(&input).map_err(|error| JsValue::from_str(&error))
    }

    pub fn reset(&mut self) {
        self.engine.reset();
    }
}

impl GitTree {
    fn apply(&mut self, input: &Snapshot) -> Result<String, String> {
        let update = self
            .engine
            .make_graph(&input.commits, &input.heads)
            .map_err(|error| error.to_string())?;
        Ok(render_svg(
            &update.snapshot,
            self.engine.theme(),
            self.engine.config(),
        ))
    }
}

fn parse_input(raw: &str) -> Result<Snapshot, String> {
    serde_json::from_str::<Snapshot>(raw).map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use crate::{GitTree, parse_input};

    #[test]
    fn renders_and_updates_a_history() {
        let mut tree = GitTree::new(400.0, 300.0, "graph");
        let first = parse_input(
            r#"{"commits": [{"hash": "r", "parents": ""}, {"hash": "a", "parents": "r"}],
                "heads": [{"id": "master*", "pointed_hash": "a"}]}"#,
        )
        .unwrap();
        let svg = tree.apply(&first).expect("first history should render");
        assert!(svg.contains("id=\"graph\""));
        assert!(svg.contains("master*"));

        let second = parse_input(
            r#"{"commits": [{"hash": "r", "parents": ""}, {"hash": "a", "parents": "r"},
                            {"hash": "b", "parents": ["a"]}],
                "heads": [{"id": "master*", "pointed_hash": "b"}]}"#,
        )
        .unwrap();
        let svg = tree.apply(&second).expect("update should render");
        assert!(svg.contains("id=\"b\""));
    }

    #[test]
    fn rejects_dangling_parent() {
        let mut tree = GitTree::new(400.0, 300.0, "graph");
        let input = parse_input(r#"{"commits": [{"hash": "a", "parents": "r"}]}"#).unwrap();
        let err = tree.apply(&input).unwrap_err();
        assert!(err.contains("r"));
    }
}
