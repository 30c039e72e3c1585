//! Run-progress signals for external consumers (CLI progress output, a UI
//! rendering per-node state). Fire-and-forget over a broadcast channel;
//! a run never blocks on slow subscribers.

use crate::graph::NodeId;
use crate::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

pub type RunId = Uuid;

/// Events emitted while a graph executes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunEvent {
    RunStarted {
        run_id: RunId,
        timestamp: DateTime<Utc>,
    },
    NodeStarted {
        run_id: RunId,
        node_id: NodeId,
        node_type: String,
        timestamp: DateTime<Utc>,
    },
    NodeFinished {
        run_id: RunId,
        node_id: NodeId,
        outputs: HashMap<String, Value>,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    NodeFailed {
        run_id: RunId,
        node_id: NodeId,
        error: String,
        timestamp: DateTime<Utc>,
    },
    /// Terminal signal: `success` is false both for a failed and for a
    /// stopped run.
    RunFinished {
        run_id: RunId,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },
    NodeLog {
        run_id: RunId,
        node_id: NodeId,
        level: LogLevel,
        message: String,
        timestamp: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warning,
}

/// Handle a node uses to emit log lines attributed to it.
#[derive(Clone)]
pub struct EventEmitter {
    run_id: RunId,
    node_id: NodeId,
    sender: broadcast::Sender<RunEvent>,
}

impl EventEmitter {
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warning, message);
    }

    fn log(&self, level: LogLevel, message: impl Into<String>) {
        let _ = self.sender.send(RunEvent::NodeLog {
            run_id: self.run_id,
            node_id: self.node_id.clone(),
            level,
            message: message.into(),
            timestamp: Utc::now(),
        });
    }
}

/// Broadcast bus connecting one runner to any number of subscribers.
pub struct EventBus {
    sender: broadcast::Sender<RunEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.sender.subscribe()
    }

    pub fn emit(&self, event: RunEvent) {
        let _ = self.sender.send(event);
    }

    pub fn emitter(&self, run_id: RunId, node_id: NodeId) -> EventEmitter {
        EventEmitter {
            run_id,
            node_id,
            sender: self.sender.clone(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
