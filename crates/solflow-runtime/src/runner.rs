//! The run controller: orchestrates scheduler → (resolver → dispatch) per
//! node, strictly sequentially, recording outputs and halting the run at
//! the first failure.

use crate::registry::NodeRegistry;
use crate::resolver::resolve_inputs;
use crate::scheduler::execution_order;
use crate::session::{RunOutcome, RunSession};
use chrono::Utc;
use solflow_core::{
    EngineError, EventBus, ExecutionContext, Graph, NodeContext, NodeError, NodeOutput, RunEvent,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Fail with an unresolved-input error instead of the loose
    /// first-declared-output fallback when an edge names a missing handle.
    pub strict_inputs: bool,
}

/// Executes graphs one at a time. Holds no per-run state beyond the
/// mutual-exclusion and stop flags; everything else lives on the
/// [`RunSession`] the caller passes in.
pub struct Runner {
    registry: Arc<NodeRegistry>,
    events: Arc<EventBus>,
    running: AtomicBool,
    stop_requested: AtomicBool,
}

impl Runner {
    pub fn new(registry: Arc<NodeRegistry>, events: Arc<EventBus>) -> Self {
        Self {
            registry,
            events,
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Cooperative stop: checked between nodes only. An in-flight RPC call
    /// or signing prompt cannot be aborted mid-flight, and nodes already
    /// executed are not rolled back.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub async fn run(
        &self,
        graph: &Graph,
        session: &mut RunSession,
        context: Arc<ExecutionContext>,
    ) -> Result<RunOutcome, EngineError> {
        self.run_with_options(graph, session, context, RunOptions::default())
            .await
    }

    pub async fn run_with_options(
        &self,
        graph: &Graph,
        session: &mut RunSession,
        context: Arc<ExecutionContext>,
        options: RunOptions,
    ) -> Result<RunOutcome, EngineError> {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("start requested while a run is in progress; ignoring");
            return Err(EngineError::AlreadyRunning);
        }
        let _guard = RunningGuard(&self.running);
        self.stop_requested.store(false, Ordering::SeqCst);

        // Pre-flight: both abort before any node executes.
        if context.endpoint().is_empty() {
            return Err(EngineError::MissingEndpoint);
        }
        let order = execution_order(graph)?;

        let run_id = session.run_id();
        let started = Instant::now();
        tracing::info!(%run_id, nodes = order.len(), "run started");
        self.events.emit(RunEvent::RunStarted {
            run_id,
            timestamp: Utc::now(),
        });

        for node_id in &order {
            if self.stop_requested.load(Ordering::SeqCst) {
                tracing::info!(%run_id, "stop requested; halting before next node");
                self.finish(run_id, false, started);
                return Ok(RunOutcome::Stopped);
            }
            let Some(node) = graph.find_node(node_id) else {
                continue;
            };

            session.mark_executing(node_id);
            self.events.emit(RunEvent::NodeStarted {
                run_id,
                node_id: node_id.clone(),
                node_type: node.node_type.clone(),
                timestamp: Utc::now(),
            });

            let node_started = Instant::now();
            let dispatched: Result<NodeOutput, NodeError> = async {
                let handler = self.registry.get(&node.node_type)?;
                let inputs =
                    resolve_inputs(node, graph, &self.registry, session.results(), options.strict_inputs)?;
                handler
                    .execute(NodeContext {
                        node_id: node_id.clone(),
                        inputs,
                        context: Arc::clone(&context),
                        events: self.events.emitter(run_id, node_id.clone()),
                    })
                    .await
            }
            .await;
            let duration_ms = node_started.elapsed().as_millis() as u64;

            match dispatched {
                Ok(output) => {
                    tracing::debug!(%node_id, duration_ms, "node finished");
                    self.events.emit(RunEvent::NodeFinished {
                        run_id,
                        node_id: node_id.clone(),
                        outputs: output.outputs.clone(),
                        duration_ms,
                        timestamp: Utc::now(),
                    });
                    session.record_success(node_id, output.outputs);
                }
                Err(error) => {
                    tracing::error!(%node_id, %error, "node failed; aborting run");
                    session.record_failure(node_id, error.to_string());
                    self.events.emit(RunEvent::NodeFailed {
                        run_id,
                        node_id: node_id.clone(),
                        error: error.to_string(),
                        timestamp: Utc::now(),
                    });
                    self.finish(run_id, false, started);
                    return Err(EngineError::NodeFailed {
                        node_id: node_id.clone(),
                        source: error,
                    });
                }
            }
        }

        tracing::info!(%run_id, "run completed");
        self.finish(run_id, true, started);
        Ok(RunOutcome::Completed)
    }

    fn finish(&self, run_id: solflow_core::RunId, success: bool, started: Instant) {
        self.events.emit(RunEvent::RunFinished {
            run_id,
            success,
            duration_ms: started.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        });
    }
}

/// Clears the running flag on every exit path.
struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
