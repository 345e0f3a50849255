use crate::frame_node::NodeId;
use crate::layout::{BoxLayoutAlgorithm, LayoutAlgorithm, LinearAxis, LinearLayoutAlgorithm};
use crate::paint::NodePaintMethod;
use crate::pipeline::PipelineContext;
use core::any::Any;

/// Implements the downcasting methods of [`Pattern`] inside an `impl Pattern for …` block.
#[macro_export]
macro_rules! impl_pattern_any {
    () => {
        fn as_any(&self) -> &dyn ::core::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
            self
        }
    };
}

/// Patterns are the behavior attached to a frame node: they decide how the node lays out its
/// children, how it paints, and which gestures it listens to.
///
/// A pattern never holds a reference to its host node, only its id. Hooks that need the rest of
/// the pipeline receive it as a parameter.
pub trait Pattern: Any {
    /// For downcasting.
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Creates the layout algorithm for the next layout pass.
    fn create_layout_algorithm(&self) -> Box<dyn LayoutAlgorithm> {
        Box::new(BoxLayoutAlgorithm)
    }

    /// Creates the paint method for the next render pass, if this node paints anything.
    fn create_node_paint_method(&self) -> Option<Box<dyn NodePaintMethod>> {
        None
    }

    /// Called once the node exists in the tree.
    fn on_attach_to_frame_node(&mut self, host: NodeId, ctx: &mut PipelineContext) {
        let _ = (host, ctx);
    }

    /// Called right before the node is destroyed.
    fn on_detach_from_frame_node(&mut self, host: NodeId) {
        let _ = host;
    }

    /// Called after a layout pass has written geometry back into the tree.
    ///
    /// Returns true if the node needs to be repainted as a result.
    fn on_dirty_layout_wrapper_swap(
        &mut self,
        host: NodeId,
        algorithm: &dyn LayoutAlgorithm,
        ctx: &mut PipelineContext,
    ) -> bool {
        let _ = (host, algorithm, ctx);
        false
    }
}

/// A pattern with no behavior.
#[derive(Debug, Default)]
pub struct EmptyPattern;

impl Pattern for EmptyPattern {
    impl_pattern_any!();
}

/// Lays its children out in a row or column.
#[derive(Debug)]
pub struct LinearLayoutPattern {
    axis: LinearAxis,
    padding: f64,
}

impl LinearLayoutPattern {
    pub fn row(padding: f64) -> LinearLayoutPattern {
        LinearLayoutPattern {
            axis: LinearAxis::Row,
            padding,
        }
    }

    pub fn column(padding: f64) -> LinearLayoutPattern {
        LinearLayoutPattern {
            axis: LinearAxis::Column,
            padding,
        }
    }
}

impl Pattern for LinearLayoutPattern {
    impl_pattern_any!();

    fn create_layout_algorithm(&self) -> Box<dyn LayoutAlgorithm> {
        Box::new(LinearLayoutAlgorithm {
            axis: self.axis,
            padding: self.padding,
        })
    }
}
