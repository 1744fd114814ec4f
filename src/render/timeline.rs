//! Timeline chart
//!
//! Nodes are placed by conversation order (x) and speaker (y), so topic
//! drift reads left to right. Fill comes from the 1D drift gradient over one
//! explicitly chosen score.

use super::color::{gradient_1d, Rgb, NEUTRAL_FILL};
use super::{truncate_chars, VegaLiteSpec, VEGA_LITE_SCHEMA};
use crate::analysis::{ComparisonMode, MetricKind};
use crate::graph::{ArgumentGraph, Node, UNKNOWN_SPEAKER};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Characters of content shown next to a timeline point
pub const LABEL_CONTENT_CHARS: usize = 20;
pub const CHART_WIDTH: u32 = 800;
/// Height of one speaker row
pub const ROW_HEIGHT: u32 = 60;

/// Which stored score drives the timeline colors
///
/// Has no `Default`; callers state both parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineColoring {
    pub metric: MetricKind,
    pub mode: ComparisonMode,
}

impl TimelineColoring {
    fn title(&self) -> String {
        let metric = match self.metric {
            MetricKind::Similarity => "Similarity",
            MetricKind::Distance => "Distance",
        };
        let mode = match self.mode {
            ComparisonMode::ReferencePoint => "first",
            ComparisonMode::Sequential => "previous",
        };
        format!("{} to {}", metric, mode)
    }
}

/// Render the timeline, or `None` when fewer than two nodes carry a sequence
pub fn render_timeline(graph: &ArgumentGraph, coloring: TimelineColoring) -> Option<VegaLiteSpec> {
    let timeline: Vec<&Node> = graph
        .sequence_order()
        .into_iter()
        .filter_map(|idx| graph.node_at(idx))
        .filter(|n| n.sequence.is_some())
        .collect();
    if timeline.len() < 2 {
        return None;
    }

    let scores: Vec<Option<f64>> = timeline
        .iter()
        .map(|n| n.metrics().map(|m| m.select(coloring.metric, coloring.mode)))
        .collect();
    let fills = fill_colors(&scores, coloring.metric);

    let mut placed: HashMap<&str, (i64, &str)> = HashMap::new();
    let mut speakers: Vec<&str> = Vec::new();

    let node_rows: Vec<Value> = timeline
        .iter()
        .zip(scores.iter().zip(fills.iter()))
        .filter_map(|(node, (score, fill))| {
            let sequence = node.sequence?;
            let speaker = node.speaker.as_deref().unwrap_or(UNKNOWN_SPEAKER);
            placed.insert(node.id.as_str(), (sequence, speaker));
            if !speakers.contains(&speaker) {
                speakers.push(speaker);
            }
            Some(json!({
                "id": node.id.as_str(),
                "sequence": sequence,
                "speaker": speaker,
                "type": node.node_type.as_str(),
                "content_full": node.content,
                "label_text": truncate_chars(&node.content, LABEL_CONTENT_CHARS),
                "metric": score,
                "color_rgb": fill.to_hex(),
                "text_color": fill.contrasting_text().to_hex(),
            }))
        })
        .collect();

    let edge_rows: Vec<Value> = graph
        .edges()
        .iter()
        .filter_map(|edge| {
            let (source_seq, source_speaker) = placed.get(edge.source.as_str())?;
            let (target_seq, target_speaker) = placed.get(edge.target.as_str())?;
            Some(json!({
                "x1": source_seq,
                "y1": source_speaker,
                "x2": target_seq,
                "y2": target_speaker,
                "label": edge.label,
                "label_x": (*source_seq as f64 + *target_seq as f64) / 2.0,
                "label_y": source_speaker,
            }))
        })
        .collect();

    let y_scale = json!({"domain": speakers});
    let x_axis = json!({"title": "Sequence", "tickMinStep": 1});
    let metric_title = coloring.title();

    let spec = json!({
        "$schema": VEGA_LITE_SCHEMA,
        "width": CHART_WIDTH,
        "height": ROW_HEIGHT * speakers.len().max(1) as u32,
        "datasets": {"nodes": node_rows, "edges": edge_rows},
        "layer": [
            {
                "data": {"name": "edges"},
                "mark": {"type": "rule", "color": "gray", "opacity": 0.5},
                "encoding": {
                    "x": {"field": "x1", "type": "quantitative", "axis": x_axis},
                    "y": {"field": "y1", "type": "nominal", "scale": y_scale, "title": "Speaker"},
                    "x2": {"field": "x2"},
                    "y2": {"field": "y2"}
                }
            },
            {
                "data": {"name": "edges"},
                "mark": {"type": "text", "fontSize": 9, "color": "#555", "dy": -8},
                "encoding": {
                    "x": {"field": "label_x", "type": "quantitative"},
                    "y": {"field": "label_y", "type": "nominal", "scale": y_scale},
                    "text": {"field": "label", "type": "nominal"}
                }
            },
            {
                "data": {"name": "nodes"},
                "mark": {"type": "circle", "size": 600, "opacity": 0.95, "stroke": "#333", "strokeWidth": 0.5},
                "encoding": {
                    "x": {"field": "sequence", "type": "quantitative", "axis": x_axis},
                    "y": {"field": "speaker", "type": "nominal", "scale": y_scale, "title": "Speaker"},
                    "color": {"field": "color_rgb", "type": "nominal", "scale": null, "legend": null},
                    "tooltip": [
                        {"field": "sequence", "type": "quantitative", "title": "Sequence"},
                        {"field": "metric", "type": "quantitative", "title": metric_title, "format": ".3f"},
                        {"field": "content_full", "type": "nominal", "title": "Content"},
                        {"field": "id", "type": "nominal", "title": "Node ID"}
                    ]
                }
            },
            {
                "data": {"name": "nodes"},
                "mark": {"type": "text", "fontSize": 9, "dy": 18, "color": "#333"},
                "encoding": {
                    "x": {"field": "sequence", "type": "quantitative"},
                    "y": {"field": "speaker", "type": "nominal", "scale": y_scale},
                    "text": {"field": "label_text", "type": "nominal"}
                }
            }
        ]
    });

    Some(VegaLiteSpec(spec))
}

/// Gradient colors for scored nodes (normalized among themselves), neutral
/// grey for the rest
fn fill_colors(scores: &[Option<f64>], metric: MetricKind) -> Vec<Rgb> {
    let present: Vec<f64> = scores.iter().flatten().copied().collect();
    let mut gradient = gradient_1d(&present, metric).into_iter();

    scores
        .iter()
        .map(|score| match score {
            Some(_) => gradient.next().unwrap_or(NEUTRAL_FILL),
            None => NEUTRAL_FILL,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{attach_embeddings, score_graph};
    use crate::graph::Edge;
    use crate::render::color::drift_color;

    const SEQ_SIM: TimelineColoring = TimelineColoring {
        metric: MetricKind::Similarity,
        mode: ComparisonMode::Sequential,
    };

    fn scored_graph() -> ArgumentGraph {
        let mut graph = ArgumentGraph::from_parts(
            vec![
                Node::new("n3", "argument", "Cost").with_speaker("Bob").with_sequence(3),
                Node::new("n1", "issue", "Which DB?").with_speaker("Alice").with_sequence(1),
                Node::new("n2", "position", "Postgres").with_speaker("Bob").with_sequence(2),
            ],
            vec![Edge::new("n2", "n1", "proposal"), Edge::new("n3", "n2", "concern")],
        )
        .unwrap();
        attach_embeddings(&mut graph, vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 0.0]]).unwrap();
        score_graph(&mut graph).unwrap();
        graph
    }

    #[test]
    fn test_needs_two_sequenced_nodes() {
        let graph = ArgumentGraph::from_parts(
            vec![Node::new("n1", "issue", "a").with_sequence(1), Node::new("n2", "issue", "b")],
            vec![],
        )
        .unwrap();
        assert!(render_timeline(&graph, SEQ_SIM).is_none());
    }

    #[test]
    fn test_rows_follow_sequence() {
        let spec = render_timeline(&scored_graph(), SEQ_SIM).unwrap();
        let rows = spec.as_json()["datasets"]["nodes"].as_array().unwrap().clone();
        let ids: Vec<&str> = rows.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["n1", "n2", "n3"]);

        // n2 repeats n1, n3 is orthogonal to n2
        assert_eq!(rows[1]["metric"], 1.0);
        assert_eq!(rows[2]["metric"], 0.0);
        assert_eq!(rows[1]["color_rgb"], drift_color(0.0).to_hex());
        assert_eq!(rows[2]["color_rgb"], drift_color(0.5).to_hex());
    }

    #[test]
    fn test_edge_label_at_midpoint_on_source_row() {
        let spec = render_timeline(&scored_graph(), SEQ_SIM).unwrap();
        let edges = spec.as_json()["datasets"]["edges"].as_array().unwrap().clone();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0]["label_x"], 1.5);
        assert_eq!(edges[0]["label_y"], "Bob");
        assert_eq!(edges[1]["label_x"], 2.5);
    }

    #[test]
    fn test_midpoint_of_extreme_sequences() {
        let graph = ArgumentGraph::from_parts(
            vec![
                Node::new("n1", "issue", "a").with_sequence(i64::MAX - 1),
                Node::new("n2", "issue", "b").with_sequence(i64::MAX),
            ],
            vec![Edge::new("n1", "n2", "next")],
        )
        .unwrap();
        let spec = render_timeline(&graph, SEQ_SIM).unwrap();
        let label_x = spec.as_json()["datasets"]["edges"][0]["label_x"].as_f64().unwrap();
        assert!((label_x - i64::MAX as f64).abs() <= 2.0f64.powi(11));
    }

    #[test]
    fn test_unscored_nodes_are_grey() {
        let graph = ArgumentGraph::from_parts(
            vec![Node::new("n1", "issue", "a").with_sequence(1), Node::new("n2", "issue", "b").with_sequence(2)],
            vec![Edge::new("n1", "missing", "")],
        )
        .unwrap();
        let spec = render_timeline(&graph, SEQ_SIM).unwrap();
        let json = spec.as_json();
        let rows = json["datasets"]["nodes"].as_array().unwrap();
        assert!(rows.iter().all(|r| r["color_rgb"] == NEUTRAL_FILL.to_hex()));
        assert!(rows.iter().all(|r| r["speaker"] == "Unknown" && r["metric"].is_null()));
        assert!(json["datasets"]["edges"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_distance_coloring() {
        let coloring = TimelineColoring {
            metric: MetricKind::Distance,
            mode: ComparisonMode::ReferencePoint,
        };
        let spec = render_timeline(&scored_graph(), coloring).unwrap();
        let rows = spec.as_json()["datasets"]["nodes"].as_array().unwrap().clone();
        // anchor and its duplicate are closest, n3 is the farthest
        assert_eq!(rows[0]["color_rgb"], drift_color(0.0).to_hex());
        assert_eq!(rows[1]["color_rgb"], drift_color(0.0).to_hex());
        assert_eq!(rows[2]["color_rgb"], drift_color(1.0).to_hex());
    }
}
