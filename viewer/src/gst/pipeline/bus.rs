use super::{pipeline_state, ViewerPipeline};
use crate::error::ViewerError;
use crate::events::EventBroadcaster;
use gstreamer as gst;
use gstreamer::glib;
use gstreamer::prelude::*;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};
use v3xctrl_gst_types::{PipelineState, ViewerEvent};

/// Everything a bus callback needs, cloned into the signal closure.
#[derive(Clone)]
pub(crate) struct BusContext {
    /// The pipeline whose own state changes are reported
    pub(crate) pipeline: glib::WeakRef<gst::Pipeline>,
    pub(crate) main_loop: glib::MainLoop,
    pub(crate) events: EventBroadcaster,
    pub(crate) cached_state: Arc<RwLock<PipelineState>>,
}

impl BusContext {
    /// React to a single bus message.
    pub(crate) fn handle_message(&self, msg: &gst::Message) {
        use gst::MessageView;

        trace!("Bus message type: {:?}", msg.type_());

        match msg.view() {
            MessageView::Error(err) => {
                let message = err.error().to_string();
                let debug_info = err.debug().map(|d| d.to_string());
                let source = err.src().map(|s| s.name().to_string());

                error!("Error: {} (source: {:?})", message, source);
                if let Some(ref debug_info) = debug_info {
                    debug!("Debug info: {}", debug_info);
                }

                self.events.broadcast(ViewerEvent::Error {
                    message,
                    debug: debug_info,
                    source,
                });
                self.main_loop.quit();
            }
            MessageView::Warning(warning) => {
                let message = warning.error().to_string();
                let debug_info = warning.debug().map(|d| d.to_string());
                let source = warning.src().map(|s| s.name().to_string());

                warn!("Warning: {} (source: {:?})", message, source);

                self.events.broadcast(ViewerEvent::Warning {
                    message,
                    debug: debug_info,
                    source,
                });
            }
            MessageView::Eos(_) => {
                info!("End of stream");
                self.events.broadcast(ViewerEvent::Eos);
                self.main_loop.quit();
            }
            MessageView::StateChanged(state_changed) => {
                let Some(source) = msg.src() else {
                    return;
                };
                let old = pipeline_state(state_changed.old());
                let new = pipeline_state(state_changed.current());

                if self.is_pipeline(source) {
                    info!("Pipeline state changed from {} to {}", old, new);
                    *self.cached_state.write() = new;
                    self.events
                        .broadcast(ViewerEvent::StateChanged { old, new });
                } else {
                    trace!(
                        "Element '{}' state changed: {} -> {}",
                        source.name(),
                        old,
                        new
                    );
                }
            }
            _ => {}
        }
    }

    fn is_pipeline(&self, source: &gst::Object) -> bool {
        self.pipeline
            .upgrade()
            .is_some_and(|pipeline| source == pipeline.upcast_ref::<gst::Object>())
    }
}

impl ViewerPipeline {
    /// Install the signal watch and the message handler on the pipeline bus.
    ///
    /// The watch is attached to the loop's own main context so the
    /// handler only ever runs on the main loop thread.
    pub(super) fn setup_bus_watch(&mut self) -> Result<(), ViewerError> {
        let bus = self.pipeline.bus().ok_or(ViewerError::MissingBus)?;

        self.main_loop
            .context()
            .with_thread_default(|| bus.add_signal_watch())?;

        let context = BusContext {
            pipeline: self.pipeline.downgrade(),
            main_loop: self.main_loop.clone(),
            events: self.events.clone(),
            cached_state: self.cached_state.clone(),
        };
        let handler_id = bus.connect_message(None, move |_bus, msg| {
            context.handle_message(msg);
        });
        self.bus_handlers.push(handler_id);

        debug!("Bus message handlers set up");
        Ok(())
    }

    /// Remove the bus message handlers and the signal watch.
    pub(super) fn remove_bus_watch(&mut self) {
        if self.bus_handlers.is_empty() {
            return;
        }

        if let Some(bus) = self.pipeline.bus() {
            for handler_id in self.bus_handlers.drain(..) {
                bus.disconnect(handler_id);
            }
            bus.remove_signal_watch();
        } else {
            self.bus_handlers.clear();
        }
        debug!("Bus message handlers removed");
    }
}
