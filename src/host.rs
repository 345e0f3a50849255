use crate::backend::RenderBackend;
use crate::canvas::Canvas;
use crate::error::Error;
use crate::events::TouchEvent;
use crate::pipeline::{PipelineConfig, PipelineContext};
use crate::render_tree::RenderTree;
use crate::theme::Theme;
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use tracing::{trace, warn};

/// Connects a pipeline to a render backend.
pub struct Host<B: RenderBackend> {
    pub context: PipelineContext,
    render_tree: RenderTree<B>,
    event_sender: Sender<TouchEvent>,
    event_recv: Receiver<TouchEvent>,
}

impl<B: RenderBackend> Host<B> {
    /// Creates a new Host.
    ///
    /// The root node exists right away, but nothing reaches the backend until you call `poll`.
    pub fn new(config: PipelineConfig, theme: Theme, backend: B) -> Host<B> {
        let (event_sender, event_recv) = channel::unbounded();

        Host {
            context: PipelineContext::new(config, theme),
            render_tree: RenderTree::new(backend),
            event_sender,
            event_recv,
        }
    }

    /// Returns a sender for pointer events. Events are dispatched on the next `poll`.
    pub fn event_sender(&self) -> Sender<TouchEvent> {
        self.event_sender.clone()
    }

    pub fn render_tree(&self) -> &RenderTree<B> {
        &self.render_tree
    }

    /// Dispatches all queued events, runs a frame, and brings the render tree up to date.
    ///
    /// Every patch is applied even if an earlier one fails; the first error is returned.
    pub fn poll(&mut self) -> Result<(), Error> {
        loop {
            match self.event_recv.try_recv() {
                Ok(event) => {
                    trace!("dispatching {:?}", event);
                    self.context.dispatch_touch(event);
                }
                Err(TryRecvError::Empty) => break,
                // the host owns a sender, so this cannot happen
                Err(TryRecvError::Disconnected) => break,
            }
        }

        self.context.flush_frame();

        let mut result = Ok(());
        for patch in self.context.tree_mut().patches() {
            if let Err(err) = self.render_tree.patch(patch) {
                warn!("failed to apply render patch: {}", err);
                if result.is_ok() {
                    result = Err(err.into());
                }
            }
        }
        result
    }

    /// Moves the pipeline clock forward and polls.
    pub fn advance_time(&mut self, ms: u64) -> Result<(), Error> {
        self.context.advance_time(ms);
        self.poll()
    }

    /// Paints the render tree at the current pipeline time.
    pub fn paint(&self, canvas: &mut dyn Canvas) {
        self.render_tree.paint(canvas, self.context.now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendOp, RecordingBackend};
    use crate::frame_node::tags;

    #[test]
    fn poll_mirrors_mounted_nodes() {
        let mut host = Host::new(
            PipelineConfig::default(),
            Theme::default(),
            RecordingBackend::new(),
        );
        host.poll().unwrap();
        let root = host.context.root();
        assert!(host.render_tree().contains(root));
        assert!(host.render_tree().backend().ops.contains(&BackendOp::SetRoot(root)));

        let page = host.context.create_frame_node(tags::PAGE, None);
        host.context.tree_mut().add_child(root, page);
        host.poll().unwrap();
        assert_eq!(host.render_tree().children(root), Some(&[page][..]));

        host.context.tree_mut().remove_node(page);
        host.poll().unwrap();
        assert!(!host.render_tree().contains(page));
    }
}
