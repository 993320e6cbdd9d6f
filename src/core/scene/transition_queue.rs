//=========================================================================
// Transition Queue
//=========================================================================
//
// Deferred scene-stack requests.
//
// Scenes and behaviors queue requests here while the stack is being
// iterated. The stack applies them at the tick boundary, in FIFO order.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::{SceneKey, SceneTransition};

//=== Transition Queue ====================================================

/// FIFO of pending scene-stack requests.
#[derive(Debug)]
pub struct TransitionQueue<K: SceneKey> {
    queue: Vec<SceneTransition<K>>,
}

impl<K: SceneKey> TransitionQueue<K> {
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Queues a request for the next tick boundary. `Empty` is dropped.
    pub fn push(&mut self, transition: SceneTransition<K>) {
        if transition != SceneTransition::Empty {
            self.queue.push(transition);
        }
    }

    /// Takes every queued request, leaving the queue empty.
    ///
    /// Requests queued while the taken batch is applied land in the next
    /// batch.
    pub fn take(&mut self) -> Vec<SceneTransition<K>> {
        std::mem::take(&mut self.queue)
    }
}

impl<K: SceneKey> Default for TransitionQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Key {
        A,
        B,
    }

    impl SceneKey for Key {}

    #[test]
    fn take_preserves_fifo_order_and_empties() {
        let mut queue = TransitionQueue::new();
        queue.push(SceneTransition::Push(Key::A));
        queue.push(SceneTransition::Replace(Key::A, Key::B));

        let batch = queue.take();
        assert_eq!(
            batch,
            vec![
                SceneTransition::Push(Key::A),
                SceneTransition::Replace(Key::A, Key::B)
            ]
        );
        assert!(queue.take().is_empty());
    }

    #[test]
    fn empty_requests_are_dropped() {
        let mut queue = TransitionQueue::<Key>::new();
        queue.push(SceneTransition::Empty);
        queue.push(SceneTransition::Push(Key::B));
        assert_eq!(queue.take(), vec![SceneTransition::Push(Key::B)]);
    }
}
