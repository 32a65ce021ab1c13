//! Batch commands and the pending → retired → reclaimed queue
//!
//! Commands are replayed strictly in insertion order. A flushed generation is
//! retired rather than freed: the rasterizer may still be reading its buffers.
//! Generations are reclaimed once `retire_lag` further resets have happened,
//! and a batch's storage is recycled only if nobody else holds it.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::core::config::MAX_RETIRE_LAG;
use crate::foundation::logging::{debug, trace};
use crate::render::{BlendMode, Rasterizer, RenderResult, TriangleBatch};

/// Discriminant of a [`BatchCommand`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Draw a closed triangle batch
    DrawBatch,
    /// Change the compositing mode
    SetBlendMode,
}

/// A unit of queued work
#[derive(Debug, Clone)]
pub enum BatchCommand {
    /// Draw a closed, non-empty batch
    DrawBatch(Arc<TriangleBatch>),
    /// Switch compositing mode for everything after this command
    SetBlendMode(BlendMode),
}

impl BatchCommand {
    /// Command discriminant
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::DrawBatch(_) => CommandKind::DrawBatch,
            Self::SetBlendMode(_) => CommandKind::SetBlendMode,
        }
    }

    /// Batch carried by a draw command
    pub fn batch(&self) -> Option<&TriangleBatch> {
        match self {
            Self::DrawBatch(batch) => Some(batch.as_ref()),
            Self::SetBlendMode(_) => None,
        }
    }

    /// Submit this command
    pub fn execute(&self, rasterizer: &mut dyn Rasterizer) -> RenderResult<()> {
        match self {
            Self::DrawBatch(batch) => rasterizer.draw_triangles(batch),
            Self::SetBlendMode(mode) => rasterizer.set_blend_mode(*mode),
        }
    }
}

/// Outcome of one reclamation step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReclaimReport {
    /// Draw commands whose generation was reclaimed
    pub reclaimed: usize,
    /// Batches whose storage went back to the free pool
    pub recycled: usize,
    /// Batches still held elsewhere and released without recycling
    pub released_shared: usize,
}

/// Ordered command list with delayed reclamation
#[derive(Debug)]
pub struct CommandQueue {
    pending: Vec<BatchCommand>,
    retired: VecDeque<Vec<BatchCommand>>,
    spare_lists: Vec<Vec<BatchCommand>>,
    retire_lag: usize,
}

impl CommandQueue {
    /// Create a queue that keeps flushed generations for `retire_lag` resets
    ///
    /// A lag of 0 is treated as 1: the generation flushed in a pass is never
    /// reclaimed before the next reset.
    pub fn new(retire_lag: usize) -> Self {
        let retire_lag = retire_lag.max(1);
        Self {
            pending: Vec::new(),
            retired: VecDeque::with_capacity(retire_lag.saturating_add(1).min(MAX_RETIRE_LAG + 1)),
            spare_lists: Vec::new(),
            retire_lag,
        }
    }

    /// Append a command to the pending list
    pub fn push(&mut self, command: BatchCommand) {
        self.pending.push(command);
    }

    /// Commands accumulated since the last flush
    pub fn pending(&self) -> &[BatchCommand] {
        &self.pending
    }

    /// Most recently flushed generation
    pub fn last_flushed(&self) -> Option<&[BatchCommand]> {
        self.retired.back().map(Vec::as_slice)
    }

    /// Number of retired generations awaiting reclamation
    pub fn retired_generations(&self) -> usize {
        self.retired.len()
    }

    /// Total commands across all retired generations
    pub fn retired_len(&self) -> usize {
        self.retired.iter().map(Vec::len).sum()
    }

    /// Replay every pending command in order, then retire them
    ///
    /// Execution stops at the first rasterizer error, but the whole
    /// generation is retired regardless so the next pass starts clean.
    /// Returns the number of commands submitted.
    pub fn flush(&mut self, rasterizer: &mut dyn Rasterizer) -> RenderResult<usize> {
        let next = self.spare_lists.pop().unwrap_or_default();
        let generation = std::mem::replace(&mut self.pending, next);
        let submitted = generation.len();

        let result = generation.iter().try_for_each(|command| {
            trace!("Submitting {:?}", command.kind());
            command.execute(rasterizer)
        });

        self.retired.push_back(generation);
        result.map(|()| submitted)
    }

    /// Reclaim every generation that has aged past the retirement lag
    ///
    /// Uniquely owned batches are cleared and pushed onto `pool`. Batches the
    /// rasterizer still holds are released to it instead.
    pub fn reclaim(&mut self, pool: &mut Vec<TriangleBatch>) -> ReclaimReport {
        let mut report = ReclaimReport::default();

        while self.retired.len() >= self.retire_lag {
            let Some(mut generation) = self.retired.pop_front() else {
                break;
            };

            for command in generation.drain(..) {
                let BatchCommand::DrawBatch(batch) = command else {
                    continue;
                };
                report.reclaimed += 1;

                match Arc::try_unwrap(batch) {
                    Ok(mut batch) => {
                        batch.clear();
                        pool.push(batch);
                        report.recycled += 1;
                    }
                    Err(shared) => {
                        debug!(
                            "Batch still held by {} other owner(s); releasing without recycling",
                            Arc::strong_count(&shared) - 1
                        );
                        report.released_shared += 1;
                    }
                }
            }

            self.spare_lists.push(generation);
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RecordedCommand, RecordingRasterizer, TextureId};

    fn batch_for(texture: u64) -> Arc<TriangleBatch> {
        let mut batch = TriangleBatch::new(4);
        batch.bind(TextureId(texture));
        batch.append(
            &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0],
            &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0],
            &[0, 1, 2],
            crate::foundation::math::colors::white(),
            crate::render::Flip::NONE,
        );
        Arc::new(batch)
    }

    #[test]
    fn test_flush_replays_in_order() {
        let mut queue = CommandQueue::new(1);
        queue.push(BatchCommand::DrawBatch(batch_for(1)));
        queue.push(BatchCommand::SetBlendMode(BlendMode::Additive));
        queue.push(BatchCommand::DrawBatch(batch_for(2)));

        let mut rasterizer = RecordingRasterizer::new();
        assert_eq!(queue.flush(&mut rasterizer).unwrap(), 3);

        let kinds: Vec<_> = rasterizer
            .commands()
            .iter()
            .map(|command| match command {
                RecordedCommand::DrawTriangles(batch) => format!("draw {}", batch.texture.0),
                RecordedCommand::SetBlendMode(mode) => format!("blend {mode:?}"),
                other => format!("{other:?}"),
            })
            .collect();
        assert_eq!(kinds, vec!["draw 1", "blend Additive", "draw 2"]);
        assert!(queue.pending().is_empty());
        assert_eq!(queue.retired_len(), 3);
    }

    #[test]
    fn test_reclaim_respects_lag() {
        let mut queue = CommandQueue::new(2);
        let mut pool = Vec::new();
        let mut rasterizer = RecordingRasterizer::new();

        queue.push(BatchCommand::DrawBatch(batch_for(1)));
        queue.flush(&mut rasterizer).unwrap();

        // One generation retired, lag of two: nothing reclaimable yet.
        assert_eq!(queue.reclaim(&mut pool), ReclaimReport::default());
        assert_eq!(queue.retired_generations(), 1);

        queue.flush(&mut rasterizer).unwrap();
        let report = queue.reclaim(&mut pool);
        assert_eq!(report.reclaimed, 1);
        assert_eq!(report.recycled, 1);
        assert_eq!(queue.retired_generations(), 1);
        assert_eq!(pool.len(), 1);
        assert!(pool[0].is_empty());
    }

    #[test]
    fn test_zero_lag_behaves_like_one() {
        let mut queue = CommandQueue::new(0);
        let mut pool = Vec::new();

        queue.push(BatchCommand::DrawBatch(batch_for(1)));
        queue.flush(&mut RecordingRasterizer::new()).unwrap();

        assert_eq!(queue.reclaim(&mut pool).recycled, 1);
        assert_eq!(queue.retired_generations(), 0);
    }

    #[test]
    fn test_huge_lag_does_not_overflow() {
        let mut queue = CommandQueue::new(usize::MAX);
        let mut pool = Vec::new();

        queue.push(BatchCommand::DrawBatch(batch_for(1)));
        queue.flush(&mut RecordingRasterizer::new()).unwrap();

        assert_eq!(queue.reclaim(&mut pool), ReclaimReport::default());
        assert_eq!(queue.retired_generations(), 1);
    }

    #[test]
    fn test_shared_batches_are_not_recycled() {
        let mut queue = CommandQueue::new(1);
        let mut pool = Vec::new();
        let held = batch_for(7);

        queue.push(BatchCommand::DrawBatch(Arc::clone(&held)));
        queue.flush(&mut RecordingRasterizer::new()).unwrap();

        let report = queue.reclaim(&mut pool);
        assert_eq!(report.reclaimed, 1);
        assert_eq!(report.released_shared, 1);
        assert!(pool.is_empty());

        // The outside holder still sees intact geometry.
        assert_eq!(held.vertex_count(), 3);
        assert_eq!(Arc::strong_count(&held), 1);
    }

    #[test]
    fn test_flush_error_still_retires_generation() {
        let mut queue = CommandQueue::new(1);
        queue.push(BatchCommand::DrawBatch(batch_for(1)));
        queue.push(BatchCommand::DrawBatch(batch_for(2)));
        queue.push(BatchCommand::DrawBatch(batch_for(3)));

        let mut rasterizer = RecordingRasterizer::new();
        rasterizer.reject_texture(TextureId(2));

        assert!(queue.flush(&mut rasterizer).is_err());
        assert_eq!(rasterizer.draw_calls().count(), 1);
        assert!(queue.pending().is_empty());
        assert_eq!(queue.retired_len(), 3);
    }
}
