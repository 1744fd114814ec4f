//! Topic-map scatter chart
//!
//! Each node sits at its projected 2D position, filled by the 2D gradient so
//! nearby topics share a hue. The chart is four layers: edge rules, node
//! shapes, and a black and a white label layer of which only the readable one
//! is visible per node.

use super::color::{gradient_2d, LUMINANCE_THRESHOLD, LUMINANCE_WEIGHTS};
use super::{truncate_chars, VegaLiteSpec, VEGA_LITE_SCHEMA};
use crate::graph::{ArgumentGraph, NodeType, UNKNOWN_SPEAKER};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Characters of content shown in a node label
pub const LABEL_CONTENT_CHARS: usize = 30;
pub const CHART_WIDTH: u32 = 700;
pub const CHART_HEIGHT: u32 = 500;

/// Mark shape per canonical node type, in legend order
pub const TYPE_SHAPES: [(NodeType, &str); 4] = [
    (NodeType::Issue, "circle"),
    (NodeType::Position, "square"),
    (NodeType::Argument, "triangle-right"),
    (NodeType::Decision, "diamond"),
];

/// Render the topic map, or `None` unless every node has a 2D position and
/// there are at least two nodes
pub fn render_topic_map(graph: &ArgumentGraph) -> Option<VegaLiteSpec> {
    if graph.node_count() < 2 {
        return None;
    }
    let positions = graph
        .nodes()
        .map(|n| n.position())
        .collect::<Option<Vec<[f64; 2]>>>()?;

    let colors = gradient_2d(&positions);
    let position_by_id: HashMap<&str, [f64; 2]> = graph
        .nodes()
        .map(|n| n.id.as_str())
        .zip(positions.iter().copied())
        .collect();

    let node_rows: Vec<Value> = graph
        .nodes()
        .zip(positions.iter())
        .zip(colors.iter())
        .map(|((node, pos), color)| {
            let speaker = node.speaker.as_deref().unwrap_or(UNKNOWN_SPEAKER);
            json!({
                "id": node.id.as_str(),
                "x": pos[0],
                "y": pos[1],
                "type": node.node_type.as_str(),
                "content_full": node.content,
                "label_text": format!("{}\n{}", speaker, truncate_chars(&node.content, LABEL_CONTENT_CHARS)),
                "r": color.r,
                "g": color.g,
                "b": color.b,
                "color_rgb": color.to_hex(),
                "text_color": color.contrasting_text().to_hex(),
            })
        })
        .collect();

    let edge_rows: Vec<Value> = graph
        .edges()
        .iter()
        .filter_map(|edge| {
            let source = position_by_id.get(edge.source.as_str())?;
            let target = position_by_id.get(edge.target.as_str())?;
            Some(json!({
                "x1": source[0],
                "y1": source[1],
                "x2": target[0],
                "y2": target[1],
            }))
        })
        .collect();

    let [wr, wg, wb] = LUMINANCE_WEIGHTS;
    let luminance = format!("(datum.r * {} + datum.g * {} + datum.b * {})", wr, wg, wb);
    let bright = format!("{} > {}", luminance, LUMINANCE_THRESHOLD);
    let dark = format!("{} <= {}", luminance, LUMINANCE_THRESHOLD);

    let axis = |field: &str, title: &str| {
        json!({"field": field, "type": "quantitative",
               "axis": {"title": title, "ticks": false, "labels": false, "grid": false}})
    };
    let x_enc = axis("x", "Topic Dimension 1");
    let y_enc = axis("y", "Topic Dimension 2");

    let text_layer = |color: &str, test: &str| {
        json!({
            "data": {"name": "nodes"},
            "mark": {"type": "text", "align": "center", "baseline": "middle",
                     "fontSize": 10, "color": color, "lineBreak": "\n"},
            "encoding": {
                "x": x_enc,
                "y": y_enc,
                "text": {"field": "label_text", "type": "nominal"},
                "opacity": {"condition": {"test": test, "value": 1}, "value": 0}
            }
        })
    };

    let (domain, range): (Vec<&str>, Vec<&str>) =
        TYPE_SHAPES.iter().map(|(t, shape)| (t.as_str(), *shape)).unzip();

    let spec = json!({
        "$schema": VEGA_LITE_SCHEMA,
        "width": CHART_WIDTH,
        "height": CHART_HEIGHT,
        "datasets": {"nodes": node_rows, "edges": edge_rows},
        "layer": [
            {
                "data": {"name": "edges"},
                "mark": {"type": "rule", "color": "gray", "opacity": 0.4},
                "encoding": {
                    "x": {"field": "x1", "type": "quantitative"},
                    "y": {"field": "y1", "type": "quantitative"},
                    "x2": {"field": "x2"},
                    "y2": {"field": "y2"}
                }
            },
            {
                "data": {"name": "nodes"},
                "mark": {"type": "point", "size": 2000, "opacity": 0.9, "filled": true},
                "encoding": {
                    "x": x_enc,
                    "y": y_enc,
                    "color": {"field": "color_rgb", "type": "nominal", "scale": null, "legend": null},
                    "shape": {"field": "type", "type": "nominal", "title": "Node Type",
                              "scale": {"domain": domain, "range": range}},
                    "tooltip": [
                        {"field": "content_full", "type": "nominal", "title": "Content"},
                        {"field": "id", "type": "nominal", "title": "Node ID"}
                    ]
                },
                "params": [{"name": "zoom", "select": "interval", "bind": "scales"}]
            },
            text_layer("black", &bright),
            text_layer("white", &dark)
        ]
    });

    Some(VegaLiteSpec(spec))
}
