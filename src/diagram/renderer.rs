//! Diagram render lifecycle.
//!
//! Owns the parse + layout step behind a small state machine so callers
//! never paint a half-built scene. Render attempts are ticketed: each
//! `begin` bumps a generation counter and only the newest ticket's
//! `complete` takes effect, so a slow render finishing late cannot
//! clobber a newer diagram.

use super::graph::FlowGraph;
use super::layout::{compute_layout, LayoutConfig};
use super::parser::parse_string;
use crate::error::{InitError, RenderError};
use eframe::egui::{Pos2, Vec2};

/// Lifecycle of the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// Nothing configured yet; rendering is refused.
    Uninitialized,
    /// `initialize` in progress.
    Initializing,
    /// Configured and idle; a scene or nothing may be on display.
    Ready,
    /// A render attempt is outstanding.
    Rendering,
    /// Last attempt failed; the error placeholder is on display.
    /// Recoverable: the next successful render returns to `Ready`.
    RenderError,
}

/// One-time renderer configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub layout: LayoutConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
        }
    }
}

/// Handle for one render attempt. Opaque outside this module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTicket(u64);

/// A parsed, laid-out graph ready to paint.
pub struct Scene {
    pub graph: FlowGraph,
    /// World position of the scene's top-left corner.
    pub origin: Pos2,
    /// Scene size in world units; both components are > 0.
    pub extent: Vec2,
}

impl Scene {
    fn build(markup: &str, layout: &LayoutConfig) -> Result<Self, RenderError> {
        let mut graph = parse_string(markup).map_err(|e| RenderError::new(e.to_string()))?;
        compute_layout(&mut graph, layout);
        let bounds = graph.bounds;
        Ok(Self {
            graph,
            origin: bounds.min,
            extent: bounds.size(),
        })
    }
}

pub struct DiagramRenderer {
    state: RenderState,
    config: RenderConfig,
    /// Generation of the most recently issued ticket.
    generation: u64,
    scene: Option<Scene>,
    last_error: Option<RenderError>,
}

impl Default for DiagramRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagramRenderer {
    pub fn new() -> Self {
        Self {
            state: RenderState::Uninitialized,
            config: RenderConfig::default(),
            generation: 0,
            scene: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> RenderState {
        self.state
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Error from the most recent failed attempt, if the renderer is in
    /// the error state.
    pub fn last_error(&self) -> Option<&RenderError> {
        self.last_error.as_ref()
    }

    /// Configure the renderer. Idempotent: calling again after the first
    /// successful initialization is a no-op, so double-init cannot reset
    /// a live scene.
    pub fn initialize(&mut self, config: RenderConfig) -> Result<(), InitError> {
        if self.state != RenderState::Uninitialized {
            return Ok(());
        }
        self.state = RenderState::Initializing;

        if config.layout.node_width <= 0.0 || config.layout.node_height <= 0.0 {
            self.state = RenderState::Uninitialized;
            return Err(InitError::new("layout node size must be positive"));
        }

        self.config = config;
        self.state = RenderState::Ready;
        Ok(())
    }

    /// Start a render attempt. The returned ticket must be handed back to
    /// `complete`; issuing a newer ticket invalidates all older ones.
    pub fn begin(&mut self) -> RenderTicket {
        self.generation += 1;
        if matches!(self.state, RenderState::Ready | RenderState::RenderError) {
            self.state = RenderState::Rendering;
        }
        RenderTicket(self.generation)
    }

    /// Drop the current scene and invalidate outstanding tickets.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.scene = None;
        self.last_error = None;
        if matches!(self.state, RenderState::Rendering | RenderState::RenderError) {
            self.state = RenderState::Ready;
        }
    }

    /// Finish a render attempt. A stale ticket is discarded without any
    /// observable effect. The previous scene is cleared before parsing,
    /// so a failed attempt leaves the error placeholder, never a stale
    /// diagram.
    pub fn complete(&mut self, ticket: RenderTicket, markup: &str) -> Result<(), RenderError> {
        if ticket.0 != self.generation {
            return Ok(());
        }
        if matches!(self.state, RenderState::Uninitialized | RenderState::Initializing) {
            return Err(RenderError::new("renderer is not initialized"));
        }

        self.scene = None;
        match Scene::build(markup, &self.config.layout) {
            Ok(scene) => {
                self.scene = Some(scene);
                self.last_error = None;
                self.state = RenderState::Ready;
                Ok(())
            }
            Err(err) => {
                self.last_error = Some(err.clone());
                self.state = RenderState::RenderError;
                Err(err)
            }
        }
    }
}
