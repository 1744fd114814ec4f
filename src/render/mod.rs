//! Diagram rendering
//!
//! Renderers read an analysed [`ArgumentGraph`] and produce artifacts for the
//! viewer: Vega-Lite v5 chart specs for the topic map and the timeline, and
//! Mermaid flowchart markup for the flow diagram. They never mutate the
//! graph; a chart that cannot be drawn comes back as `None`.

pub mod color;
pub mod flow;
pub mod timeline;
pub mod topic_map;

use crate::graph::ArgumentGraph;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub use color::Rgb;
pub use flow::render_flow;
pub use timeline::{render_timeline, TimelineColoring};
pub use topic_map::render_topic_map;

/// Vega-Lite schema URL stamped on every chart
pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// A Vega-Lite chart specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VegaLiteSpec(pub serde_json::Value);

impl VegaLiteSpec {
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_json(self) -> serde_json::Value {
        self.0
    }
}

/// Mermaid flowchart markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MermaidDiagram(pub String);

impl MermaidDiagram {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MermaidDiagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Layout direction of the flow diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlowDirection {
    /// Top to bottom
    #[default]
    #[serde(rename = "TD", alias = "td", alias = "top_down")]
    TopDown,
    /// Left to right
    #[serde(rename = "LR", alias = "lr", alias = "left_right")]
    LeftRight,
}

impl FlowDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowDirection::TopDown => "TD",
            FlowDirection::LeftRight => "LR",
        }
    }
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller choices that affect rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub timeline: TimelineColoring,
    #[serde(default)]
    pub flow_direction: FlowDirection,
}

/// Everything the viewer shows for one graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagrams {
    pub topic_map: Option<VegaLiteSpec>,
    pub timeline: Option<VegaLiteSpec>,
    pub flow: MermaidDiagram,
}

/// Run every renderer over the graph
pub fn render_all(graph: &ArgumentGraph, options: &RenderOptions) -> Diagrams {
    let diagrams = Diagrams {
        topic_map: render_topic_map(graph),
        timeline: render_timeline(graph, options.timeline),
        flow: render_flow(graph, options.flow_direction),
    };
    debug!(
        "Rendered diagrams: topic_map={} timeline={}",
        diagrams.topic_map.is_some(),
        diagrams.timeline.is_some()
    );
    diagrams
}

/// Keep the first `max_chars` characters, appending "..." when cut
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
