//! Step-by-step trace records emitted by the searches.
//!
//! A trace is purely observational: searches record into a `Tracer` and never read
//! from it, and a disabled tracer never runs the closures that build the entries, so
//! no board snapshots are taken when tracing is off.
use crate::engine::{Board, Move};
use serde::Serialize;
use std::fmt;

/// A* cost breakdown for one node, with the exact distance used for auditing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Costs {
    /// Path cost from the root.
    pub g: usize,
    /// Heuristic estimate to the goal.
    pub h: f64,
    /// `g + h`.
    pub f: f64,
    /// Exact remaining slides, `None` if the goal is unreachable.
    pub true_distance: Option<usize>,
}

impl Costs {
    /// `true` if the heuristic did not overestimate the true remaining distance.
    pub fn is_admissible(&self) -> bool {
        self.true_distance.map_or(true, |d| self.h <= d as f64)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TraceEvent {
    /// The root was placed on the frontier.
    Initialize {
        board: Board,
        frontier_size: usize,
        explored_size: usize,
        costs: Option<Costs>,
    },
    /// IDDFS started a new depth-limited pass with fresh bookkeeping.
    StartIteration { depth_limit: usize },
    /// A state was taken off the frontier for goal testing and expansion.
    Pop {
        board: Board,
        depth: usize,
        #[serde(rename = "move")]
        action: Option<Move>,
        frontier_size: usize,
        explored_size: usize,
        costs: Option<Costs>,
    },
    /// Successors of the last popped state were added to, or improved in, the frontier.
    Expand {
        added: usize,
        updated: usize,
        frontier_size: usize,
        explored_size: usize,
    },
    GoalFound {
        board: Board,
        solution_length: usize,
        total_cost: usize,
    },
    Failed { reason: String },
}

impl TraceEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            TraceEvent::Initialize { .. } => "initialize",
            TraceEvent::StartIteration { .. } => "start_iteration",
            TraceEvent::Pop { .. } => "pop",
            TraceEvent::Expand { .. } => "expand",
            TraceEvent::GoalFound { .. } => "goal_found",
            TraceEvent::Failed { .. } => "failed",
        }
    }

    /// Board snapshot carried by this event, if any.
    pub fn board(&self) -> Option<&Board> {
        match self {
            TraceEvent::Initialize { board, .. }
            | TraceEvent::Pop { board, .. }
            | TraceEvent::GoalFound { board, .. } => Some(board),
            _ => None,
        }
    }

    pub fn costs(&self) -> Option<&Costs> {
        match self {
            TraceEvent::Initialize { costs, .. } | TraceEvent::Pop { costs, .. } => costs.as_ref(),
            _ => None,
        }
    }

    /// `(frontier_size, explored_size)` at the time of the event.
    pub fn sizes(&self) -> Option<(usize, usize)> {
        match self {
            TraceEvent::Initialize {
                frontier_size,
                explored_size,
                ..
            }
            | TraceEvent::Pop {
                frontier_size,
                explored_size,
                ..
            }
            | TraceEvent::Expand {
                frontier_size,
                explored_size,
                ..
            } => Some((*frontier_size, *explored_size)),
            _ => None,
        }
    }
}

/// One append-only trace record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TraceEntry {
    pub step: usize,
    #[serde(flatten)]
    pub event: TraceEvent,
}

impl fmt::Display for TraceEntry {
    /// One-line summary of the entry, e.g. `[3] pop: depth 2 via Left`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: ", self.step, self.event.kind())?;
        match &self.event {
            TraceEvent::Initialize { frontier_size, .. } => {
                write!(f, "search started with {} state(s) on the frontier", frontier_size)
            }
            TraceEvent::StartIteration { depth_limit } => {
                write!(f, "depth-limited search with limit {}", depth_limit)
            }
            TraceEvent::Pop {
                depth,
                action,
                costs,
                ..
            } => {
                write!(f, "depth {}", depth)?;
                if let Some(mv) = action {
                    write!(f, " via {}", mv)?;
                }
                if let Some(c) = costs {
                    write!(f, ", f={:.2} (g={}, h={:.2}", c.f, c.g, c.h)?;
                    match c.true_distance {
                        Some(d) => write!(f, ", d*={})", d)?,
                        None => write!(f, ", d*=inf)")?,
                    }
                }
                Ok(())
            }
            TraceEvent::Expand { added, updated, .. } => {
                write!(f, "added {}, updated {} neighbors", added, updated)
            }
            TraceEvent::GoalFound {
                solution_length,
                total_cost,
                ..
            } => write!(f, "goal found after {} moves (cost {})", solution_length, total_cost),
            TraceEvent::Failed { reason } => write!(f, "{}", reason),
        }
    }
}

/// Optional trace sink handed to every search.
#[derive(Debug)]
pub struct Tracer {
    entries: Option<Vec<TraceEntry>>,
}

impl Tracer {
    pub fn new(enabled: bool) -> Self {
        Tracer {
            entries: enabled.then(Vec::new),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.entries.is_some()
    }

    /// Appends the event built by `event` at `step`. `event` only runs when enabled.
    pub fn record<F: FnOnce() -> TraceEvent>(&mut self, step: usize, event: F) {
        if let Some(entries) = self.entries.as_mut() {
            entries.push(TraceEntry {
                step,
                event: event(),
            });
        }
    }

    pub fn into_entries(self) -> Vec<TraceEntry> {
        self.entries.unwrap_or_default()
    }
}
