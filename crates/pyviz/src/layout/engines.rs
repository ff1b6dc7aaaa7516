//! Layout engine factory.
//!
//! An engine decides, for every node of a [`DiagramModel`], which rank it sits
//! on and where it goes within that rank. [`EngineBuilder`] picks the engine
//! named by the configuration, runs it and hands the ranks to the shared
//! placement step, which turns them into coordinates the same way for every
//! engine.

mod layered;
mod sugiyama;

pub use layered::Engine as LayeredEngine;
pub use sugiyama::Engine as SugiyamaEngine;

use log::{debug, trace};

use pyviz_core::{draw::TextDefinition, geometry::Insets};

use super::{DiagramLayout, positioning};
use crate::{
    config::{LayoutConfig, LayoutEngine, RankDirection},
    error::PyvizError,
    structure::DiagramModel,
};

/// Rank and in-rank ordering key of one node.
///
/// Nodes of a rank are placed by ascending `order`; ties keep model order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub rank: usize,
    pub order: f64,
}

/// Interface of a rank assignment engine.
pub trait RankEngine {
    /// Returns one [`Placement`] per node, aligned with `model.nodes()`.
    ///
    /// # Errors
    /// Returns `PyvizError::Layout` if the engine cannot rank the diagram.
    fn place(&self, model: &DiagramModel) -> Result<Vec<Placement>, PyvizError>;
}

/// Builder for configuring and running a layout engine.
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    engine: LayoutEngine,
    direction: RankDirection,
    margins: Insets,
    node_spacing: f32,
    rank_spacing: f32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::from_config(&LayoutConfig::default())
    }
}

impl EngineBuilder {
    /// Create a builder with the default layout configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder from a `[layout]` configuration section
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            engine: config.engine(),
            direction: config.direction(),
            margins: config.margins(),
            node_spacing: config.node_spacing(),
            rank_spacing: config.rank_spacing(),
        }
    }

    pub fn with_engine(mut self, engine: LayoutEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_direction(mut self, direction: RankDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Set the empty space around the whole diagram
    pub fn with_margins(mut self, margins: Insets) -> Self {
        self.margins = margins;
        self
    }

    /// Set the gap between neighbours of a rank and the gap between ranks
    pub fn with_spacing(mut self, node_spacing: f32, rank_spacing: f32) -> Self {
        self.node_spacing = node_spacing;
        self.rank_spacing = rank_spacing;
        self
    }

    fn rank_engine(&self) -> Box<dyn RankEngine> {
        match self.engine {
            LayoutEngine::Sugiyama => Box::new(SugiyamaEngine::new()),
            LayoutEngine::Layered => Box::new(LayeredEngine::new()),
        }
    }

    /// Lay out `model`, measuring node boxes with `text`.
    ///
    /// # Errors
    /// Returns `PyvizError::Layout` if the engine fails to rank the nodes.
    pub fn build(
        &self,
        model: &DiagramModel,
        text: &TextDefinition,
    ) -> Result<DiagramLayout, PyvizError> {
        debug!(engine:? = self.engine, direction:? = self.direction; "Running layout engine");

        let placements = self.rank_engine().place(model)?;
        if placements.len() != model.nodes().len() {
            return Err(PyvizError::Layout(format!(
                "engine placed {} of {} nodes",
                placements.len(),
                model.nodes().len()
            )));
        }
        trace!(placements:?; "Ranks assigned");

        let layout = positioning::arrange(
            model,
            &placements,
            text,
            &positioning::Spacing {
                direction: self.direction,
                margins: self.margins,
                node: self.node_spacing,
                rank: self.rank_spacing,
            },
        );
        Ok(layout)
    }
}
