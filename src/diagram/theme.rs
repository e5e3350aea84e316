//! Color palette for rendered flowcharts.

use super::graph::NodeShape;
use eframe::egui::Color32;

/// Diagram-wide colors, one set per light/dark variant.
#[derive(Clone, Copy)]
pub struct DiagramTheme {
    /// Background color for the canvas
    pub canvas_bg: Color32,
    /// Default node fill
    pub node_fill: Color32,
    /// Default node stroke
    pub node_stroke: Color32,
    /// Node text color
    pub node_text: Color32,
    /// Subgraph/group fill
    pub group_fill: Color32,
    /// Subgraph border
    pub group_stroke: Color32,
    /// Subgraph title color
    pub group_text: Color32,
    /// Edge/connection color
    pub edge_color: Color32,
    /// Edge label color
    pub edge_text: Color32,
    /// Cylinder shape accent
    pub shape_database: Color32,
    /// Diamond shape accent
    pub shape_decision: Color32,
    /// Hexagon shape accent
    pub shape_process: Color32,
    /// Error placeholder text
    pub status_error: Color32,
}

impl DiagramTheme {
    pub fn dark() -> Self {
        Self {
            canvas_bg: Color32::from_rgb(24, 24, 27),
            node_fill: Color32::from_rgb(39, 39, 46),
            node_stroke: Color32::from_rgb(96, 165, 250),
            node_text: Color32::from_rgb(228, 228, 231),
            group_fill: Color32::from_rgba_unmultiplied(63, 63, 70, 90),
            group_stroke: Color32::from_rgb(82, 82, 91),
            group_text: Color32::from_rgb(161, 161, 170),
            edge_color: Color32::from_rgb(148, 163, 184),
            edge_text: Color32::from_rgb(148, 163, 184),
            shape_database: Color32::from_rgb(45, 212, 191),
            shape_decision: Color32::from_rgb(250, 204, 21),
            shape_process: Color32::from_rgb(192, 132, 252),
            status_error: Color32::from_rgb(248, 113, 113),
        }
    }

    pub fn light() -> Self {
        Self {
            canvas_bg: Color32::from_rgb(250, 250, 250),
            node_fill: Color32::from_rgb(255, 255, 255),
            node_stroke: Color32::from_rgb(37, 99, 235),
            node_text: Color32::from_rgb(24, 24, 27),
            group_fill: Color32::from_rgba_unmultiplied(228, 228, 231, 120),
            group_stroke: Color32::from_rgb(161, 161, 170),
            group_text: Color32::from_rgb(82, 82, 91),
            edge_color: Color32::from_rgb(71, 85, 105),
            edge_text: Color32::from_rgb(71, 85, 105),
            shape_database: Color32::from_rgb(13, 148, 136),
            shape_decision: Color32::from_rgb(202, 138, 4),
            shape_process: Color32::from_rgb(147, 51, 234),
            status_error: Color32::from_rgb(220, 38, 38),
        }
    }

    /// Stroke accent for a shape. Most shapes share the default stroke;
    /// a few carry a shape-specific accent so they read at a glance.
    pub fn stroke_for_shape(&self, shape: NodeShape) -> Color32 {
        match shape {
            NodeShape::Cylinder => self.shape_database,
            NodeShape::Diamond => self.shape_decision,
            NodeShape::Hexagon => self.shape_process,
            _ => self.node_stroke,
        }
    }
}

impl Default for DiagramTheme {
    fn default() -> Self {
        Self::dark()
    }
}
