//! Concurrent traversal-and-aggregation engine for `ruwalk`.
//!
//! This module handles:
//! - Dynamic task spawning over the shared [`WorkQueue`]
//! - A fixed pool of worker threads with explicit start/join
//! - Bottom-up directory aggregation without a join barrier
//!
//! Every dequeued request materializes a [`TaskNode`], which probes its
//! entry's metadata and, for directories, enqueues one request per direct
//! child. Each node carries a pending counter seeded to 1 (the enumeration
//! hold), incremented per spawned child and decremented by each child's
//! finalize and by enumeration completion. The node finalizes exactly once,
//! when the counter reaches zero: it folds its statistics into its parent
//! and emits its finished record to the sink. A directory therefore always
//! emits after every entry below it.
//!
//! Termination is detected by the queue's outstanding-work counter, never by
//! queue emptiness alone: a parent mid-enumeration can still add work after
//! the queue was momentarily observed empty.

use crate::data::{EntryKind, EntryRecord, path_hash};
use crate::output::RecordSink;
use crate::probe::{Probe, probe};
use crate::queue::{WalkRequest, WorkQueue};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Mutable subtree statistics, folded in by finalizing children.
///
/// For non-directories `size` is fixed at probe time and `width`/`length`
/// stay 0.
#[derive(Debug, Default, Clone, Copy)]
struct SubtreeStats {
    size: u64,
    width: u64,
    length: u64,
}

/// One in-flight entry: owns the record-in-progress until finalization.
///
/// Parents stay alive through the `Arc` held by each pending child request,
/// but finalization is driven by the explicit pending counter, not by drop
/// order.
pub struct TaskNode {
    parent: Option<Arc<TaskNode>>,
    path: PathBuf,
    hash: u64,
    depth: u64,
    kind: EntryKind,
    created: i64,
    modified: i64,
    accessed: i64,
    stats: Mutex<SubtreeStats>,
    /// Children not yet finalized, plus one hold for in-progress enumeration.
    pending: AtomicUsize,
}

impl std::fmt::Debug for TaskNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskNode")
            .field("path", &self.path)
            .field("depth", &self.depth)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl TaskNode {
    /// Materializes a node from a dequeued request, probing metadata
    /// immediately. A failed probe yields an unreadable marker node with
    /// zeroed size and timestamps instead of aborting the walk.
    fn create(request: WalkRequest, stats: &WalkStats) -> Self {
        let WalkRequest {
            parent,
            path,
            depth,
        } = request;

        let probed = match probe(&path) {
            Ok(probed) => probed,
            Err(error) => {
                warn!(path = %path.display(), %error, "metadata probe failed, marking entry unreadable");
                stats.record_skip();
                Probe {
                    kind: EntryKind::Unreadable,
                    size: 0,
                    created: 0,
                    modified: 0,
                    accessed: 0,
                }
            }
        };

        Self {
            parent,
            hash: path_hash(&path),
            path,
            depth,
            kind: probed.kind,
            created: probed.created,
            modified: probed.modified,
            accessed: probed.accessed,
            stats: Mutex::new(SubtreeStats {
                size: probed.size,
                ..SubtreeStats::default()
            }),
            pending: AtomicUsize::new(1),
        }
    }

    /// Folds a finalized child's statistics into this node.
    fn fold_child(&self, child: &EntryRecord) {
        let mut stats = self.stats.lock();
        stats.width += 1;
        stats.size += child.size;
        stats.length = stats.length.max(child.length + 1);
    }

    /// Releases one pending hold; true when this was the last one and the
    /// node must finalize.
    fn release(&self) -> bool {
        self.pending.fetch_sub(1, Ordering::SeqCst) == 1
    }

    /// Builds the immutable finished record.
    fn freeze(&self) -> EntryRecord {
        let stats = *self.stats.lock();
        EntryRecord {
            path: self.path.clone(),
            hash: self.hash,
            size: stats.size,
            depth: self.depth,
            width: stats.width,
            length: stats.length,
            kind: self.kind,
            created: self.created,
            modified: self.modified,
            accessed: self.accessed,
        }
    }
}

/// Counters shared by all workers for the end-of-run summary.
#[derive(Debug, Default)]
struct WalkStats {
    /// Records emitted to the sink.
    emitted: AtomicU64,

    /// Entries skipped or degraded by per-entry failures.
    skipped: AtomicU64,

    /// Sum of non-directory sizes (directory sizes would double-count).
    bytes: AtomicU64,

    /// Failed sink writes.
    write_errors: AtomicU64,
}

impl WalkStats {
    fn record_emitted(&self, record: &EntryRecord) {
        self.emitted.fetch_add(1, Ordering::Relaxed);
        if record.kind != EntryKind::Directory {
            self.bytes.fetch_add(record.size, Ordering::Relaxed);
        }
    }

    fn record_skip(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn record_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }
}

/// Final result of a completed walk.
#[derive(Debug, Clone, Copy)]
pub struct WalkSummary {
    /// Records written to the sink.
    pub entries: u64,

    /// Per-entry failures tolerated along the way.
    pub skipped: u64,

    /// Total bytes across all non-directory entries.
    pub bytes: u64,

    /// Wall-clock duration of the walk.
    pub elapsed: Duration,
}

/// Shared state handed to every worker thread.
struct WalkContext {
    queue: WorkQueue,
    sink: Arc<dyn RecordSink>,
    stats: WalkStats,
}

/// Resolves the effective worker count from the CLI request.
///
/// The count is capped at the available parallelism; `Some(0)` is rejected.
pub fn resolve_worker_count(requested: Option<usize>) -> Result<usize> {
    match requested {
        Some(0) => anyhow::bail!("--threads requires at least 1 worker"),
        Some(n) => Ok(n.min(num_cpus::get())),
        None => Ok(num_cpus::get()),
    }
}

/// Explicitly constructed walker pool.
///
/// Unlike a global process-lifetime pool, each `Walker` owns its worker
/// threads for exactly one run: [`Walker::run`] seeds the queue, starts the
/// workers, and joins them before returning. A worker count of 1 gives a
/// deterministic single-threaded walk, which the tests rely on.
pub struct Walker {
    workers: usize,
}

impl Walker {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    /// Walks the tree rooted at `root`, emitting one record per entry.
    ///
    /// # Errors
    /// Fails when the root cannot be probed at all (the one fatal case), when
    /// a worker thread cannot be spawned or panics, or when any record write
    /// failed. Per-entry probe and enumeration failures are tolerated and
    /// surface in [`WalkSummary::skipped`].
    pub fn run(&self, root: &Path, sink: Arc<dyn RecordSink>) -> Result<WalkSummary> {
        let started = Instant::now();

        let root = std::path::absolute(root)
            .with_context(|| format!("Failed to resolve walk root '{}'", root.display()))?;

        // The root is the one entry whose failure is fatal.
        probe(&root).with_context(|| format!("Cannot read walk root '{}'", root.display()))?;

        let ctx = Arc::new(WalkContext {
            queue: WorkQueue::new(),
            sink,
            stats: WalkStats::default(),
        });

        ctx.queue.push(WalkRequest::root(root));

        let mut handles = Vec::with_capacity(self.workers);
        for id in 0..self.workers {
            let ctx = Arc::clone(&ctx);
            let handle = thread::Builder::new()
                .name(format!("walker-{}", id))
                .spawn(move || worker_loop(id, &ctx))
                .with_context(|| format!("Failed to spawn worker thread {}", id))?;
            handles.push(handle);
        }

        for handle in handles {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("worker thread panicked"))?;
        }

        let write_errors = ctx.stats.write_errors.load(Ordering::Relaxed);
        if write_errors > 0 {
            anyhow::bail!("{} record write(s) failed", write_errors);
        }

        Ok(WalkSummary {
            entries: ctx.stats.emitted.load(Ordering::Relaxed),
            skipped: ctx.stats.skipped.load(Ordering::Relaxed),
            bytes: ctx.stats.bytes.load(Ordering::Relaxed),
            elapsed: started.elapsed(),
        })
    }
}

/// Main worker loop: drain the queue until the walk completes.
fn worker_loop(id: usize, ctx: &WalkContext) {
    debug!(worker = id, "worker starting");

    while let Some(request) = ctx.queue.pop() {
        process_request(ctx, request);
    }

    debug!(worker = id, "worker shutting down");
}

/// Handles one dequeued request end to end.
fn process_request(ctx: &WalkContext, request: WalkRequest) {
    let node = Arc::new(TaskNode::create(request, &ctx.stats));

    if node.kind == EntryKind::Directory {
        enumerate(ctx, &node);
    }

    // Release the enumeration hold; for leaves this finalizes immediately.
    if node.release() {
        finalize_chain(ctx, node);
    }
}

/// Enumerates a directory's immediate children, enqueueing one request per
/// child. Enumeration failures degrade to zero (further) children.
fn enumerate(ctx: &WalkContext, node: &Arc<TaskNode>) {
    let entries = match fs::read_dir(&node.path) {
        Ok(entries) => entries,
        Err(error) => {
            warn!(dir = %node.path.display(), %error, "directory enumeration failed");
            ctx.stats.record_skip();
            return;
        }
    };

    for entry in entries {
        match entry {
            Ok(child) => {
                node.pending.fetch_add(1, Ordering::SeqCst);
                ctx.queue.push(WalkRequest {
                    parent: Some(Arc::clone(node)),
                    path: child.path(),
                    depth: node.depth + 1,
                });
            }
            Err(error) => {
                warn!(dir = %node.path.display(), %error, "failed to read directory entry");
                ctx.stats.record_skip();
            }
        }
    }
}

/// Finalizes a node and cascades upward: each completed node folds into its
/// parent, and a parent whose last hold is released finalizes in turn. The
/// chain is iterative so a deep tree cannot overflow the stack.
fn finalize_chain(ctx: &WalkContext, node: Arc<TaskNode>) {
    let mut node = node;
    loop {
        let record = node.freeze();

        // Report to the parent first, then emit. The parent cannot finalize
        // until this node's hold is released below, so its record always
        // lands after every record in its subtree.
        if let Some(parent) = &node.parent {
            parent.fold_child(&record);
        }

        if let Err(error) = ctx.sink.submit(&record) {
            warn!(path = %record.path.display(), %error, "failed to write record");
            ctx.stats.record_write_error();
        }
        ctx.stats.record_emitted(&record);
        ctx.queue.task_done();

        let parent = match &node.parent {
            Some(parent) => Arc::clone(parent),
            None => break,
        };
        if !parent.release() {
            break;
        }
        node = parent;
    }
}
