//! Mermaid flow diagram
//!
//! The structural view of the discussion: one shaped box per node and one
//! arrow per edge. Nodes are colored by cluster when the clustering pass has
//! run, by argument role otherwise.

use super::{FlowDirection, MermaidDiagram};
use crate::graph::{ArgumentGraph, Node, NodeType};
use std::fmt::Write;

/// Characters per line of node text
pub const WRAP_WIDTH: usize = 15;

/// Fill and stroke per cluster, indexed by `cluster_id % 8`
pub const CLUSTER_COLORS: [(&str, &str); 8] = [
    ("#E3F2FD", "#90CAF9"),
    ("#E8F5E9", "#A5D6A7"),
    ("#FFFDE7", "#FFF59D"),
    ("#FBE9E7", "#FFAB91"),
    ("#F3E5F5", "#CE93D8"),
    ("#EFEBE9", "#BCAAA4"),
    ("#E0F7FA", "#80DEEA"),
    ("#FCE4EC", "#F48FB1"),
];

const ISSUE_STYLE: &str = "fill:#fff3cd,stroke:#d6b656,stroke-width:4px,color:#333";
const DECISION_STYLE: &str = "fill:#d4edda,stroke:#155724,stroke-width:4px,color:#155724";
const ARGUMENT_STYLE: &str = "fill:#f8f9fa,stroke:#6c757d,stroke-width:2px,stroke-dasharray: 5 5,color:#555";
const POSITION_STYLE: &str = "fill:#cce5ff,stroke:#b8daff,stroke-width:2px,color:#004085";

/// Render the flow diagram. Always succeeds; an empty graph yields only the
/// header line.
pub fn render_flow(graph: &ArgumentGraph, direction: FlowDirection) -> MermaidDiagram {
    let mut out = format!("graph {}", direction);

    for node in graph.nodes() {
        let _ = write!(out, "\n    {}{}", node.id, shaped_text(node));
        let _ = write!(out, "\n    style {} {}", node.id, node_style(node));
    }

    for (source, target, edge) in graph.resolved_edges() {
        if edge.has_label() {
            let _ = write!(out, "\n    {} -- {} --> {}", source.id, sanitize(&edge.label), target.id);
        } else {
            let _ = write!(out, "\n    {} --> {}", source.id, target.id);
        }
    }

    MermaidDiagram(out)
}

fn shaped_text(node: &Node) -> String {
    let mut text = wrap(&sanitize(&node.content), WRAP_WIDTH).join("<br/>");
    if let Some(speaker) = node.speaker.as_deref().filter(|s| !s.is_empty()) {
        let _ = write!(text, "<br/><small>by {}</small>", sanitize(speaker));
    }

    match node.node_type {
        NodeType::Issue => format!("((\"{}\"))", text),
        NodeType::Decision => format!("{{{{\"{}\"}}}}", text),
        NodeType::Argument => format!(">\"{}\"]", text),
        NodeType::Position | NodeType::Other(_) => format!("[\"{}\"]", text),
    }
}

fn node_style(node: &Node) -> String {
    if let Some(cluster) = node.cluster_id() {
        let (fill, stroke) = CLUSTER_COLORS[cluster % CLUSTER_COLORS.len()];
        return format!("fill:{},stroke:{},stroke-width:3px,color:#333", fill, stroke);
    }
    match node.node_type {
        NodeType::Issue => ISSUE_STYLE,
        NodeType::Decision => DECISION_STYLE,
        NodeType::Argument => ARGUMENT_STYLE,
        NodeType::Position | NodeType::Other(_) => POSITION_STYLE,
    }
    .to_string()
}

/// Replace characters that break Mermaid label syntax
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '"' => '\'',
            '(' => '（',
            ')' => '）',
            '\n' | '\r' | '\t' => ' ',
            other => other,
        })
        .collect()
}

/// Greedy word wrap to at most `width` characters per line; words longer
/// than a line are split
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        let word_len = chars.len();

        if current_len > 0 && current_len + 1 + word_len <= width {
            current.push(' ');
            current.extend(chars.iter());
            current_len += 1 + word_len;
            continue;
        }

        if current_len > 0 {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }

        let mut pieces = chars.chunks(width).peekable();
        while let Some(piece) = pieces.next() {
            if pieces.peek().is_some() {
                lines.push(piece.iter().collect());
            } else {
                current = piece.iter().collect();
                current_len = piece.len();
            }
        }
    }

    if current_len > 0 {
        lines.push(current);
    }
    lines
}
