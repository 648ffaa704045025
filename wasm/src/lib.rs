use family_tree_layout::{RenderOptions, layout_json, render_with_options};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeViewOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    focal_person_id: Option<String>,
    family_id: Option<String>,
    ancestor_generations: Option<usize>,
    descendant_generations: Option<usize>,
    include_collateral: Option<bool>,
}

fn build_render_options(options: TreeViewOptions) -> RenderOptions {
    let mut render_options = if options.theme.as_deref() == Some("modern") {
        RenderOptions::modern()
    } else {
        RenderOptions::classic()
    };

    if let Some(font_family) = options.font_family {
        render_options.theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        render_options.theme.font_size = font_size;
    }
    render_options.focus = options.focal_person_id;
    render_options.family = options.family_id;

    let scope = &mut render_options.layout.scope;
    if let Some(depth) = options.ancestor_generations {
        scope.ancestor_generations = depth;
    }
    if let Some(depth) = options.descendant_generations {
        scope.descendant_generations = depth;
    }
    if let Some(collateral) = options.include_collateral {
        scope.include_collateral = collateral;
    }

    render_options
}

fn parse_options(options_json: Option<String>) -> Result<TreeViewOptions, JsValue> {
    match options_json {
        Some(raw_options) => serde_json::from_str::<TreeViewOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string())),
        None => Ok(TreeViewOptions::default()),
    }
}

/// `{nodes, edges}` JSON for the interactive tree view.
#[wasm_bindgen]
pub fn layout_family_tree(register_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = build_render_options(parse_options(options_json)?);
    layout_json(register_json, &render_options).map_err(|error| JsValue::from_str(&error.to_string()))
}

#[wasm_bindgen]
pub fn render_family_tree_svg(register_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let render_options = build_render_options(parse_options(options_json)?);
    render_with_options(register_json, render_options)
        .map_err(|error| JsValue::from_str(&error.to_string()))
}
