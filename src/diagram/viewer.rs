//! Interactive flowchart viewport.
//!
//! Hosts the renderer and maps the scene into screen space through a
//! pan/zoom transform driven by mouse wheel, drag, and toolbar buttons.

use eframe::egui::{self, Align2, Color32, FontId, Painter, Pos2, Rect, Sense, Stroke, Vec2};

use super::graph::{EdgeKind, FlowEdge, FlowNode, NodeShape};
use super::renderer::{DiagramRenderer, RenderConfig, RenderState, Scene};
use super::theme::DiagramTheme;
use crate::error::{InitError, RenderError};

/// Pan/zoom state mapping world coordinates to viewport coordinates.
///
/// `screen = viewport_min + translate + (world - origin) * scale`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    /// Zoom factor, always > 0.
    pub scale: f32,
    /// Pan offset in viewport pixels.
    pub translate: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translate: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    /// Scale the scene to fill 95% of the viewport and center it.
    pub fn fit_to_viewport(extent: Vec2, viewport: Vec2) -> Self {
        let scale = (viewport.x * 0.95 / extent.x).min(viewport.y * 0.95 / extent.y);
        let translate = Vec2::new(
            (viewport.x - extent.x * scale) / 2.0,
            (viewport.y - extent.y * scale) / 2.0,
        );
        Self { scale, translate }
    }

    /// Wheel zoom: scroll up multiplies the scale by 1.1, scroll down by
    /// 0.9. Deliberately unclamped; `reset` is the recovery path from an
    /// extreme zoom.
    pub fn on_wheel(&mut self, delta_y: f32) {
        if delta_y < 0.0 {
            self.scale *= 1.1;
        } else {
            self.scale *= 0.9;
        }
    }

    pub fn zoom_in(&mut self) {
        self.scale *= 1.2;
    }

    pub fn zoom_out(&mut self) {
        self.scale *= 0.8;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn to_screen(&self, world: Pos2, origin: Pos2, viewport_min: Pos2) -> Pos2 {
        viewport_min + self.translate + (world - origin) * self.scale
    }
}

/// Drag-to-pan bookkeeping. The anchor is the pointer position minus the
/// translate at press time, so `pointer - anchor` keeps the grabbed point
/// under the cursor while dragging.
#[derive(Debug, Clone, Copy, Default)]
pub struct DragState {
    pub is_dragging: bool,
    pub anchor: Vec2,
}

impl DragState {
    pub fn press(&mut self, pointer: Vec2, translate: Vec2) {
        self.is_dragging = true;
        self.anchor = pointer - translate;
    }

    pub fn drag_to(&self, pointer: Vec2) -> Vec2 {
        pointer - self.anchor
    }

    pub fn release(&mut self) {
        self.is_dragging = false;
    }
}

/// Flowchart viewer widget.
pub struct DiagramViewer {
    renderer: DiagramRenderer,
    pub transform: ViewTransform,
    drag: DragState,
    theme: DiagramTheme,
    /// Markup of the last successfully rendered diagram.
    markup: Option<String>,
    /// Fit on the next `ui` pass, once the viewport rect is known.
    needs_fit: bool,
}

impl Default for DiagramViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagramViewer {
    pub fn new() -> Self {
        Self {
            renderer: DiagramRenderer::new(),
            transform: ViewTransform::default(),
            drag: DragState::default(),
            theme: DiagramTheme::dark(),
            markup: None,
            needs_fit: false,
        }
    }

    pub fn initialize(&mut self, config: RenderConfig) -> Result<(), InitError> {
        self.renderer.initialize(config)
    }

    pub fn markup(&self) -> Option<&str> {
        self.markup.as_deref()
    }

    pub fn has_diagram(&self) -> bool {
        self.renderer.scene().is_some()
    }

    pub fn render_state(&self) -> RenderState {
        self.renderer.state()
    }

    /// Render new markup. On success the viewer stores the markup and
    /// schedules a fit for the next frame; on failure the previously
    /// stored markup is left untouched.
    pub fn set_diagram(&mut self, markup: &str) -> Result<(), RenderError> {
        let ticket = self.renderer.begin();
        self.renderer.complete(ticket, markup)?;
        self.markup = Some(markup.to_owned());
        self.needs_fit = true;
        Ok(())
    }

    /// Drop the current diagram and reset the view.
    pub fn clear(&mut self) {
        self.renderer.clear();
        self.markup = None;
        self.transform.reset();
        self.drag.release();
        self.needs_fit = false;
    }

    pub fn ui(&mut self, ui: &mut egui::Ui) {
        let available_size = ui.available_size();
        let (response, painter) = ui.allocate_painter(available_size, Sense::click_and_drag());
        let rect = response.rect;

        painter.rect_filled(rect, 0.0, self.theme.canvas_bg);

        // Fit only once the viewport has a real size; a fit computed
        // before layout would use a zero rect.
        if self.needs_fit {
            if let Some(scene) = self.renderer.scene() {
                if rect.width() > 0.0 && rect.height() > 0.0 {
                    self.transform = ViewTransform::fit_to_viewport(scene.extent, rect.size());
                    self.needs_fit = false;
                }
            } else {
                self.needs_fit = false;
            }
        }

        self.handle_input(ui, &response);

        if let Some(scene) = self.renderer.scene() {
            draw_scene(&painter, rect, scene, &self.transform, &self.theme);
        }

        if self.renderer.state() == RenderState::RenderError {
            let reason = self
                .renderer
                .last_error()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "render failed".to_owned());
            self.draw_error(&painter, rect, &reason);
        }

        self.draw_toolbar(ui, rect);
    }

    fn handle_input(&mut self, ui: &egui::Ui, response: &egui::Response) {
        let rect = response.rect;

        // Wheel zoom. egui reports scroll-up as a positive delta while
        // the zoom convention here treats negative as "toward the user",
        // so the sign flips.
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                self.transform.on_wheel(-scroll);
            }
        }

        if response.drag_started_by(egui::PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                let local = pos - rect.min;
                self.drag.press(local, self.transform.translate);
            }
        }

        if self.drag.is_dragging {
            if response.dragged_by(egui::PointerButton::Primary) {
                if let Some(pos) = response.interact_pointer_pos() {
                    let local = pos - rect.min;
                    self.transform.translate = self.drag.drag_to(local);
                }
            }
            // Release or leaving the canvas both end the pan.
            if response.drag_stopped() || !response.hovered() {
                self.drag.release();
            }
        }
    }

    fn draw_toolbar(&mut self, ui: &mut egui::Ui, rect: Rect) {
        let toolbar_rect = Rect::from_min_size(rect.min + Vec2::new(10.0, 10.0), Vec2::new(220.0, 30.0));
        ui.allocate_ui_at_rect(toolbar_rect, |ui| {
            ui.horizontal(|ui| {
                if ui.small_button("+").on_hover_text("Zoom in").clicked() {
                    self.transform.zoom_in();
                }
                if ui.small_button("−").on_hover_text("Zoom out").clicked() {
                    self.transform.zoom_out();
                }
                if ui.small_button("Reset").on_hover_text("Reset view").clicked() {
                    self.transform.reset();
                }
                ui.label(format!("{:.0}%", self.transform.scale * 100.0));
            });
        });
    }

    fn draw_error(&self, painter: &Painter, rect: Rect, reason: &str) {
        let error_rect = Rect::from_center_size(rect.center(), Vec2::new(420.0, 60.0));
        painter.rect_filled(error_rect, 8.0, Color32::from_rgb(60, 20, 20));
        painter.rect_stroke(error_rect, 8.0, Stroke::new(2.0, self.theme.status_error));
        painter.text(
            error_rect.center(),
            Align2::CENTER_CENTER,
            format!("⚠ {}", reason),
            FontId::proportional(14.0),
            self.theme.status_error,
        );
    }
}

fn draw_scene(painter: &Painter, rect: Rect, scene: &Scene, transform: &ViewTransform, theme: &DiagramTheme) {
    let to_screen = |world: Pos2| transform.to_screen(world, scene.origin, rect.min);
    let screen_rect =
        |r: Rect| Rect::from_min_max(to_screen(r.min), to_screen(r.max));

    // Groups first so members draw on top.
    for subgraph in &scene.graph.subgraphs {
        let mut bounds: Option<Rect> = None;
        for member in &subgraph.members {
            if let Some(node) = scene.graph.nodes.get(member) {
                let r = node.rect();
                bounds = Some(bounds.map_or(r, |b| b.union(r)));
            }
        }
        if let Some(bounds) = bounds {
            let group_rect = screen_rect(bounds.expand(16.0));
            painter.rect(group_rect, 6.0, theme.group_fill, Stroke::new(1.0, theme.group_stroke));
            painter.text(
                group_rect.min + Vec2::new(8.0, 4.0),
                Align2::LEFT_TOP,
                &subgraph.label,
                FontId::proportional(12.0 * transform.scale),
                theme.group_text,
            );
        }
    }

    for edge in &scene.graph.edges {
        let (from, to) = match (scene.graph.nodes.get(&edge.from), scene.graph.nodes.get(&edge.to)) {
            (Some(f), Some(t)) => (f, t),
            _ => continue,
        };
        draw_edge(painter, edge, &screen_rect(from.rect()), &screen_rect(to.rect()), transform.scale, theme);
    }

    for node in scene.graph.nodes_in_order() {
        draw_node(painter, node, &screen_rect(node.rect()), transform.scale, theme);
    }
}

fn draw_edge(painter: &Painter, edge: &FlowEdge, from: &Rect, to: &Rect, scale: f32, theme: &DiagramTheme) {
    let start = rect_intersection(from, from.center(), to.center());
    let end = rect_intersection(to, to.center(), from.center());

    let width = match edge.kind {
        EdgeKind::Thick => 3.0,
        _ => 1.5,
    };
    let stroke = Stroke::new(width, theme.edge_color);

    match edge.kind {
        EdgeKind::Dotted => draw_dashed_line(painter, start, end, stroke, 6.0 * scale),
        _ => {
            painter.line_segment([start, end], stroke);
        }
    }

    if edge.kind != EdgeKind::Open {
        draw_arrowhead(painter, start, end, theme.edge_color, scale);
    }

    if let Some(ref label) = edge.label {
        let mid = Pos2::new((start.x + end.x) / 2.0, (start.y + end.y) / 2.0);
        let font = FontId::proportional(12.0 * scale);
        let galley = painter.layout_no_wrap(label.clone(), font.clone(), theme.edge_text);
        let label_rect = Rect::from_center_size(mid, galley.size() + Vec2::splat(4.0));
        painter.rect_filled(label_rect, 2.0, theme.canvas_bg);
        painter.text(mid, Align2::CENTER_CENTER, label, font, theme.edge_text);
    }
}

fn draw_node(painter: &Painter, node: &FlowNode, rect: &Rect, scale: f32, theme: &DiagramTheme) {
    let stroke = Stroke::new(1.5, theme.stroke_for_shape(node.shape));
    let fill = theme.node_fill;

    match node.shape {
        NodeShape::Rectangle => {
            painter.rect(*rect, 0.0, fill, stroke);
        }
        NodeShape::Rounded => {
            painter.rect(*rect, 6.0 * scale, fill, stroke);
        }
        NodeShape::Stadium => {
            painter.rect(*rect, rect.height() / 2.0, fill, stroke);
        }
        NodeShape::Subroutine => {
            painter.rect(*rect, 0.0, fill, stroke);
            let inset = 5.0 * scale;
            painter.line_segment(
                [Pos2::new(rect.min.x + inset, rect.min.y), Pos2::new(rect.min.x + inset, rect.max.y)],
                stroke,
            );
            painter.line_segment(
                [Pos2::new(rect.max.x - inset, rect.min.y), Pos2::new(rect.max.x - inset, rect.max.y)],
                stroke,
            );
        }
        NodeShape::Cylinder => {
            let cap = rect.height() * 0.15;
            let body = Rect::from_min_max(
                Pos2::new(rect.min.x, rect.min.y + cap * 0.5),
                Pos2::new(rect.max.x, rect.max.y - cap * 0.5),
            );
            painter.rect_filled(body, 0.0, fill);
            let half = Vec2::new(rect.width() / 2.0, cap);
            let top = Pos2::new(rect.center().x, rect.min.y + cap * 0.5);
            let bottom = Pos2::new(rect.center().x, rect.max.y - cap * 0.5);
            painter.add(egui::Shape::ellipse_filled(top, half, fill));
            painter.add(egui::Shape::ellipse_stroke(bottom, half, stroke));
            painter.rect_stroke(body, 0.0, stroke);
            painter.add(egui::Shape::ellipse_stroke(top, half, stroke));
        }
        NodeShape::Circle => {
            let radius = rect.width().max(rect.height()) / 2.0;
            painter.circle(rect.center(), radius, fill, stroke);
        }
        NodeShape::Diamond => {
            let center = rect.center();
            let points = vec![
                Pos2::new(center.x, rect.min.y),
                Pos2::new(rect.max.x, center.y),
                Pos2::new(center.x, rect.max.y),
                Pos2::new(rect.min.x, center.y),
            ];
            painter.add(egui::Shape::convex_polygon(points, fill, stroke));
        }
        NodeShape::Hexagon => {
            let center = rect.center();
            let w = rect.width() / 2.0;
            let points = vec![
                Pos2::new(center.x - w * 0.5, rect.min.y),
                Pos2::new(center.x + w * 0.5, rect.min.y),
                Pos2::new(rect.max.x, center.y),
                Pos2::new(center.x + w * 0.5, rect.max.y),
                Pos2::new(center.x - w * 0.5, rect.max.y),
                Pos2::new(rect.min.x, center.y),
            ];
            painter.add(egui::Shape::convex_polygon(points, fill, stroke));
        }
        NodeShape::Asymmetric => {
            let lean = rect.width() * 0.2;
            let points = vec![
                rect.left_top(),
                rect.right_top(),
                Pos2::new(rect.max.x - lean, rect.max.y),
                rect.left_bottom(),
            ];
            painter.add(egui::Shape::convex_polygon(points, fill, stroke));
        }
    }

    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        &node.label,
        FontId::proportional(14.0 * scale),
        theme.node_text,
    );
}

fn draw_arrowhead(painter: &Painter, from: Pos2, to: Pos2, color: Color32, scale: f32) {
    let dir = (from - to).normalized();
    let size = 9.0 * scale;
    let angle: f32 = 0.4;

    let left = to
        + Vec2::new(
            dir.x * angle.cos() - dir.y * angle.sin(),
            dir.x * angle.sin() + dir.y * angle.cos(),
        ) * size;
    let right = to
        + Vec2::new(
            dir.x * angle.cos() + dir.y * angle.sin(),
            -dir.x * angle.sin() + dir.y * angle.cos(),
        ) * size;

    painter.add(egui::Shape::convex_polygon(vec![to, left, right], color, Stroke::NONE));
}

fn draw_dashed_line(painter: &Painter, start: Pos2, end: Pos2, stroke: Stroke, dash_len: f32) {
    let dir = end - start;
    let len = dir.length();
    if len <= f32::EPSILON {
        return;
    }
    let dir = dir / len;

    let mut pos = 0.0;
    let mut drawing = true;
    while pos < len {
        let next = (pos + dash_len).min(len);
        if drawing {
            painter.line_segment([start + dir * pos, start + dir * next], stroke);
        }
        pos = next;
        drawing = !drawing;
    }
}

/// Intersection of the segment `inside -> outside` with the rect border.
fn rect_intersection(rect: &Rect, inside: Pos2, outside: Pos2) -> Pos2 {
    let dir = outside - inside;
    let mut t = f32::MAX;

    if dir.x != 0.0 {
        let t_left = (rect.left() - inside.x) / dir.x;
        let t_right = (rect.right() - inside.x) / dir.x;
        if t_left > 0.0 {
            t = t.min(t_left);
        }
        if t_right > 0.0 {
            t = t.min(t_right);
        }
    }
    if dir.y != 0.0 {
        let t_top = (rect.top() - inside.y) / dir.y;
        let t_bottom = (rect.bottom() - inside.y) / dir.y;
        if t_top > 0.0 {
            t = t.min(t_top);
        }
        if t_bottom > 0.0 {
            t = t.min(t_bottom);
        }
    }

    if t == f32::MAX {
        inside
    } else {
        inside + dir * t
    }
}
