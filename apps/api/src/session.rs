//! Session State — the single "last result" slot per interactive session.
//!
//! Transitions are a pure reducer so they can be tested without handlers or
//! network. The slot itself lives in `AppState` behind a `tokio::sync::Mutex`
//! held for the full duration of an action, which queues concurrent
//! analyze/optimize requests instead of letting them race.

use chrono::{DateTime, Utc};

use crate::evaluation::parser::EvaluationResult;

/// A stored evaluation plus the text that produced it. The optimize action
/// re-reads `source_text`, so a fresh analysis invalidates any optimization.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEvaluation {
    pub source_text: String,
    pub result: EvaluationResult,
    pub evaluated_at: DateTime<Utc>,
}

/// The rewritten description. `source_text` records what it was rewritten
/// from — informational only, not enforced.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    pub text: String,
    pub source_text: String,
}

/// Idle: both slots empty. Evaluated: evaluation set. Optimized: both set.
/// An optimization never exists without the evaluation it belongs to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub evaluation: Option<StoredEvaluation>,
    pub optimization: Option<OptimizationResult>,
}

/// User-triggered transitions. Failed actions dispatch nothing — state is
/// only touched on success.
#[derive(Debug, Clone)]
pub enum Action {
    StoreEvaluation(StoredEvaluation),
    StoreOptimization(OptimizationResult),
}

/// Pure transition function.
pub fn reduce(state: SessionState, action: Action) -> SessionState {
    match action {
        // A new evaluation always clears the optimization: the rewrite was
        // tied to the description behind the previous evaluation.
        Action::StoreEvaluation(evaluation) => SessionState {
            evaluation: Some(evaluation),
            optimization: None,
        },
        // Handlers reject optimize-while-Idle before dispatching; if one is
        // dispatched anyway, keep the invariant and drop it.
        Action::StoreOptimization(optimization) => {
            if state.evaluation.is_some() {
                SessionState {
                    optimization: Some(optimization),
                    ..state
                }
            } else {
                state
            }
        }
    }
}
