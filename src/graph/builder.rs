//! Breadth-first lineage expansion
//!
//! The builder grows the shared graph level by level from a seed. Members of
//! one level are independent and run on a bounded worker pool; the
//! coordinator alone applies their results to the graph and decides the next
//! frontier, so the "already expanded" check and the expansion that follows
//! it stay atomic without making the graph itself thread-safe.
//!
//! Termination holds even through citation cycles: a number only enters a
//! frontier while it has zero outgoing edges, and expanding it always gives
//! it at least one (a real predicate or the dead-end marker), so no number
//! is expanded twice.

use super::LineageGraph;
use crate::approval::ApprovalId;
use crate::discovery::{Expansion, PredicateSource};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Cooperative run-scoped cancellation.
///
/// Cancelling abandons frontier work that has not started; expansions
/// already in flight finish, and everything persisted or written to the
/// graph so far remains valid, since caches are per-number and idempotent.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

/// How a build run ended.
///
/// `truncated` is the signal that the depth bound cut the run short: the
/// graph is then a lower bound on the closure, and `residual_frontier`
/// holds the numbers that were discovered but never expanded.
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    /// Numbers expanded during this run.
    pub expanded: usize,
    /// Breadth-first levels fully processed.
    pub depth_reached: usize,
    /// The depth bound was hit with work remaining.
    pub truncated: bool,
    /// The run was cancelled with work remaining.
    pub cancelled: bool,
    /// Discovered but unexpanded numbers at the point the run stopped.
    pub residual_frontier: Vec<ApprovalId>,
}

impl BuildOutcome {
    /// True when the graph reached closure: nothing left to expand.
    pub fn complete(&self) -> bool {
        !self.truncated && !self.cancelled
    }
}

/// Expands seeds into the shared lineage graph.
pub struct GraphBuilder {
    source: Arc<dyn PredicateSource>,
    concurrency: usize,
    cancel: CancellationToken,
}

impl GraphBuilder {
    pub fn new(source: Arc<dyn PredicateSource>) -> Self {
        Self {
            source,
            concurrency: 4,
            cancel: CancellationToken::new(),
        }
    }

    /// Worker-pool width within one level.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Use an externally held cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// A clone of the run's cancellation token.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Expand `seed` into `graph`, breadth first, to at most `max_depth`
    /// levels (`None` for unbounded).
    ///
    /// Every expansion adds edges: to each cited predicate, or to the
    /// terminal sentinel when the document has none or cannot be read. A
    /// per-document failure never aborts the build. Numbers the graph has
    /// already expanded (in this run or a previous one sharing the graph)
    /// are never expanded again, so populating several seeds over one graph
    /// yields the union of their lineages with shared sub-lineages walked
    /// once.
    pub async fn populate(
        &self,
        graph: &mut LineageGraph,
        seed: &ApprovalId,
        max_depth: Option<usize>,
    ) -> BuildOutcome {
        graph.add_node(seed);
        let mut frontier = vec![seed.clone()];
        let mut outcome = BuildOutcome::default();

        loop {
            // The sentinel is never expanded, and neither is anything an
            // earlier run already gave outgoing edges.
            frontier.retain(|d| !d.is_terminal() && graph.out_degree(d) == 0);
            if frontier.is_empty() {
                info!(seed = %seed, expanded = outcome.expanded, "lineage closure reached");
                return outcome;
            }
            if let Some(max) = max_depth {
                if outcome.depth_reached >= max {
                    warn!(
                        seed = %seed,
                        depth = outcome.depth_reached,
                        remaining = frontier.len(),
                        "depth bound reached with work remaining"
                    );
                    outcome.truncated = true;
                    outcome.residual_frontier = frontier;
                    return outcome;
                }
            }
            if self.cancel.is_cancelled() {
                outcome.cancelled = true;
                outcome.residual_frontier = frontier;
                return outcome;
            }

            debug!(seed = %seed, depth = outcome.depth_reached, width = frontier.len(), "expanding level");
            let (results, skipped) = self.expand_level(&frontier).await;

            let mut next = Vec::new();
            let mut queued: BTreeSet<String> = BTreeSet::new();
            for (device, expansion) in results {
                outcome.expanded += 1;
                match expansion {
                    Expansion::Cited(predicates) => {
                        for predicate in predicates {
                            graph.add_edge(&device, &predicate);
                            if !predicate.is_terminal()
                                && graph.out_degree(&predicate) == 0
                                && queued.insert(predicate.as_str().to_string())
                            {
                                next.push(predicate);
                            }
                        }
                    }
                    Expansion::DeadEnd => {
                        graph.add_edge(&device, &ApprovalId::terminal());
                    }
                    Expansion::Failed(reason) => {
                        warn!(id = %device, reason = %reason, "marking failed expansion as dead end");
                        graph.add_edge(&device, &ApprovalId::terminal());
                    }
                }
            }

            if !skipped.is_empty() {
                // Cancelled mid-level: the skipped members plus whatever the
                // completed ones discovered is exactly the work left undone.
                next.extend(skipped);
                outcome.cancelled = true;
                outcome.residual_frontier = next;
                return outcome;
            }

            frontier = next;
            outcome.depth_reached += 1;
        }
    }

    /// Expand one level on the worker pool. Returns completed expansions and
    /// the members skipped because cancellation arrived mid-level.
    async fn expand_level(
        &self,
        frontier: &[ApprovalId],
    ) -> (Vec<(ApprovalId, Expansion)>, Vec<ApprovalId>) {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        for device in frontier {
            let device = device.clone();
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&semaphore);
            let cancel = self.cancel.clone();
            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return (device, None);
                };
                if cancel.is_cancelled() {
                    return (device, None);
                }
                let expansion = source.expand(&device).await;
                (device, Some(expansion))
            });
        }

        let mut completed = Vec::new();
        let mut skipped = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((device, Some(expansion))) => completed.push((device, expansion)),
                Ok((device, None)) => skipped.push(device),
                Err(e) => warn!(error = %e, "expansion task failed to join"),
            }
        }
        (completed, skipped)
    }
}
