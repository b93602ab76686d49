//! Render queues.
//!
//! A [`RenderQueue`] collects the tasks submitted to one pass, orders them
//! by [`SortKey`] and replays them through the executor. Opaque geometry
//! comes out batched by shader and front-to-back; translucent geometry
//! comes out back-to-front.

use std::sync::Arc;

use log::trace;

use crate::renderer::backend::RenderDevice;
use crate::renderer::state::{RenderLayer, RenderStateExecutor};

use super::key::SortKey;
use super::task::RenderTask;

struct QueueEntry {
    key: SortKey,
    task: Arc<RenderTask>,
}

/// Sortable collection of submitted draw tasks.
#[derive(Default)]
pub struct RenderQueue {
    entries: Vec<QueueEntry>,
}

impl RenderQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Stores a task with its derived sort key.
    ///
    /// Tasks on the `Invisible` layer (including tasks that never chose a
    /// layer) are dropped here rather than carried to execution.
    pub fn add(&mut self, task: Arc<RenderTask>) {
        if task.state.render_layer == RenderLayer::Invisible {
            trace!("dropping task on invisible layer");
            return;
        }
        self.entries.push(QueueEntry {
            key: SortKey::derive(&task.state),
            task,
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sorts ascending by key and executes every task.
    ///
    /// With `flush == false` the entries stay queued, so the same draw
    /// stream can be replayed against different bindings (shadow cascades).
    pub fn submit(
        &mut self,
        executor: &mut RenderStateExecutor,
        device: &mut dyn RenderDevice,
        flush: bool,
    ) {
        if self.entries.is_empty() {
            return;
        }

        self.entries.sort_unstable_by_key(|entry| entry.key);

        for entry in &self.entries {
            executor.run(device, &entry.task.state, &entry.task.draw_call);
        }

        if flush {
            self.entries.clear();
        }
    }
}
