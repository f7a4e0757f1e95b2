//! Blocking work queue for directory-walk requests.
//!
//! The queue is a double-ended collection: workers spawning child entries
//! push at the front, idle workers pop from the back. Traversal correctness
//! does not depend on the order, but front-push/back-pop keeps the in-flight
//! mix breadth-leaning, which bounds the number of deep parent chains held
//! open at once.
//!
//! Completion detection does not rely on queue emptiness: a worker that is
//! still enumerating a directory can push more work after an observer saw the
//! queue empty. The queue therefore carries an outstanding-work counter,
//! incremented on every push and decremented when the corresponding task
//! finalizes. When the counter reaches zero the walk is structurally complete
//! and all blocked consumers are woken to exit.

use crate::walk::TaskNode;
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A request to materialize and process one entry.
#[derive(Debug)]
pub struct WalkRequest {
    /// Parent task, kept alive until this entry (and its subtree) finalizes.
    /// `None` only for the root request.
    pub parent: Option<Arc<TaskNode>>,

    /// Absolute path of the entry.
    pub path: PathBuf,

    /// Depth from root (0 = root).
    pub depth: u64,
}

impl WalkRequest {
    /// Create the root request.
    pub fn root(path: PathBuf) -> Self {
        Self {
            parent: None,
            path,
            depth: 0,
        }
    }
}

/// Shared work queue with blocking pop and termination detection.
pub struct WorkQueue {
    items: Mutex<VecDeque<WalkRequest>>,
    available: Condvar,
    outstanding: AtomicUsize,
    done: AtomicBool,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
            outstanding: AtomicUsize::new(0),
            done: AtomicBool::new(false),
        }
    }

    /// Enqueue a request, counting it as outstanding work.
    pub fn push(&self, request: WalkRequest) {
        self.outstanding.fetch_add(1, Ordering::SeqCst);
        let mut items = self.items.lock();
        items.push_front(request);
        self.available.notify_one();
    }

    /// Blocking pop. Returns `None` once the walk is complete.
    pub fn pop(&self) -> Option<WalkRequest> {
        let mut items = self.items.lock();
        loop {
            if let Some(request) = items.pop_back() {
                return Some(request);
            }
            if self.done.load(Ordering::SeqCst) {
                return None;
            }
            self.available.wait(&mut items);
        }
    }

    /// Record one finalized task. The last finalize completes the walk and
    /// releases every blocked consumer.
    pub fn task_done(&self) {
        if self.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.done.store(true, Ordering::SeqCst);
            // Take the lock so no consumer misses the wakeup between its
            // empty-check and its wait.
            let _items = self.items.lock();
            self.available.notify_all();
        }
    }

    /// Number of requests pushed but not yet finalized.
    pub fn outstanding(&self) -> usize {
        self.outstanding.load(Ordering::SeqCst)
    }

    /// True once the outstanding counter has hit zero.
    pub fn is_complete(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// Current queue length.
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Check if the queue is empty. Not a completion signal by itself.
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_queue_basic() {
        let queue = WorkQueue::new();

        queue.push(WalkRequest::root(PathBuf::from("/test")));
        assert!(!queue.is_empty());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.outstanding(), 1);

        let request = queue.pop().expect("expected a request");
        assert_eq!(request.path, PathBuf::from("/test"));
        assert_eq!(request.depth, 0);
        assert!(request.parent.is_none());
    }

    #[test]
    fn test_queue_is_fifo() {
        let queue = WorkQueue::new();
        queue.push(WalkRequest::root(PathBuf::from("/a")));
        queue.push(WalkRequest::root(PathBuf::from("/b")));

        assert_eq!(queue.pop().unwrap().path, PathBuf::from("/a"));
        assert_eq!(queue.pop().unwrap().path, PathBuf::from("/b"));
    }

    #[test]
    fn test_empty_queue_is_not_completion() {
        let queue = WorkQueue::new();
        queue.push(WalkRequest::root(PathBuf::from("/test")));

        let _request = queue.pop().unwrap();

        // Queue is empty but the popped task has not finalized yet.
        assert!(queue.is_empty());
        assert!(!queue.is_complete());

        queue.task_done();
        assert!(queue.is_complete());
        assert_eq!(queue.outstanding(), 0);
    }

    #[test]
    fn test_completion_wakes_blocked_consumers() {
        let queue = Arc::new(WorkQueue::new());
        queue.push(WalkRequest::root(PathBuf::from("/test")));

        let consumer = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                // First pop gets the request, second blocks until completion.
                let first = queue.pop();
                let second = queue.pop();
                (first.is_some(), second.is_none())
            })
        };

        std::thread::sleep(Duration::from_millis(50));
        queue.task_done();

        let (got_request, woke_on_done) = consumer.join().expect("consumer panicked");
        assert!(got_request);
        assert!(woke_on_done);
    }
}
