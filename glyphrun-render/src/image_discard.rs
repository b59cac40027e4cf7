//! Cross-thread queue of inline images waiting to be released.
//!
//! Any thread may enqueue an image id (e.g. the input thread dropping an
//! inline image); the render thread drains the queue once per frame, before
//! issuing new draws.

use std::sync::Arc;

use parking_lot::Mutex;

/// Identifier of an uploaded inline image.
pub type ImageId = u64;

/// Shared handle to the pending-discard list. Clones share the same queue.
#[derive(Debug, Clone, Default)]
pub struct ImageDiscardQueue {
    pending: Arc<Mutex<Vec<ImageId>>>,
}

impl ImageDiscardQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `id` for release at the start of the next frame.
    pub fn enqueue(&self, id: ImageId) {
        self.pending.lock().push(id);
    }

    /// Take every pending id, in enqueue order, leaving the queue empty.
    pub fn drain(&self) -> Vec<ImageId> {
        std::mem::take(&mut *self.pending.lock())
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_in_order() {
        let queue = ImageDiscardQueue::new();
        queue.enqueue(7);
        queue.enqueue(3);
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.drain(), vec![7, 3]);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_clones_share_one_queue() {
        let queue = ImageDiscardQueue::new();
        let producer = queue.clone();
        producer.enqueue(42);
        assert_eq!(queue.drain(), vec![42]);
    }
}
