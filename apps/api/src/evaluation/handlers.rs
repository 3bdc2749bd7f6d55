//! Axum route handlers for the analyze / optimize / session-view surface.
//!
//! Input validation happens here, before any network call; the session mutex
//! is taken for the full action so a second click queues behind the one in
//! flight instead of racing it.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::parser::{parse_evaluation, CriterionFinding};
use crate::evaluation::prompts::{
    build_evaluation_prompt, build_optimization_prompt, EVALUATION_SYSTEM, OPTIMIZER_SYSTEM,
};
use crate::evaluation::rubric::GEO_CRITERIA;
use crate::evaluation::score::ScoreBand;
use crate::llm_client::DecodingConfig;
use crate::session::{reduce, Action, OptimizationResult, SessionState, StoredEvaluation};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub api_key: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub evaluation: EvaluationView,
}

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub api_key: String,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub optimization: OptimizationView,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub evaluation: Option<EvaluationView>,
    pub optimization: Option<OptimizationView>,
}

/// What the renderer draws: score, badge band and color, critique paragraph,
/// per-criterion rows.
#[derive(Debug, Serialize)]
pub struct EvaluationView {
    pub score: i64,
    pub band: ScoreBand,
    pub color: &'static str,
    pub critique: String,
    pub breakdown: Vec<CriterionFinding>,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationView {
    fn from_stored(stored: &StoredEvaluation) -> Self {
        let band = ScoreBand::for_score(stored.result.score);
        Self {
            score: stored.result.score,
            band,
            color: band.css_color(),
            critique: stored.result.critique.clone(),
            breakdown: stored.result.breakdown.clone(),
            evaluated_at: stored.evaluated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OptimizationView {
    pub optimized_text: String,
    pub source_text: String,
}

impl OptimizationView {
    fn from_stored(stored: &OptimizationResult) -> Self {
        Self {
            optimized_text: stored.text.clone(),
            source_text: stored.source_text.clone(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Judges the description against the nine-criterion rubric. On success the
/// result replaces the session's evaluation and clears any optimization.
/// On any failure the session is left exactly as it was.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if request.api_key.trim().is_empty() {
        return Err(AppError::Validation("api_key is required".to_string()));
    }
    if request.description.trim().is_empty() {
        return Err(AppError::Validation(
            "description cannot be empty".to_string(),
        ));
    }

    let mut session = state.session.lock().await;

    let prompt = build_evaluation_prompt(&GEO_CRITERIA, &request.description);
    let raw = state
        .llm
        .complete(
            &prompt,
            EVALUATION_SYSTEM,
            DecodingConfig::judgment(),
            &request.api_key,
        )
        .await?;
    let result = parse_evaluation(&raw)?;

    info!(score = result.score, "analysis stored");

    let stored = StoredEvaluation {
        source_text: request.description,
        result,
        evaluated_at: Utc::now(),
    };
    let view = EvaluationView::from_stored(&stored);
    *session = reduce(session.clone(), Action::StoreEvaluation(stored));

    Ok(Json(AnalyzeResponse { evaluation: view }))
}

/// POST /api/v1/optimize
///
/// Rewrites the description behind the current evaluation under the fixed
/// GEO policy. Rejected while Idle — there is nothing to rewrite yet.
pub async fn handle_optimize(
    State(state): State<AppState>,
    Json(request): Json<OptimizeRequest>,
) -> Result<Json<OptimizeResponse>, AppError> {
    if request.api_key.trim().is_empty() {
        return Err(AppError::Validation("api_key is required".to_string()));
    }

    let mut session = state.session.lock().await;

    let source_text = session
        .evaluation
        .as_ref()
        .map(|e| e.source_text.clone())
        .ok_or(AppError::NoEvaluation)?;

    let prompt = build_optimization_prompt(&source_text);
    let text = state
        .llm
        .complete(
            &prompt,
            OPTIMIZER_SYSTEM,
            DecodingConfig::rewrite(),
            &request.api_key,
        )
        .await?;

    info!("optimization stored");

    let stored = OptimizationResult { text, source_text };
    let view = OptimizationView::from_stored(&stored);
    *session = reduce(session.clone(), Action::StoreOptimization(stored));

    Ok(Json(OptimizeResponse { optimization: view }))
}

/// GET /api/v1/session
///
/// The current view model — everything the renderer needs to redraw.
pub async fn handle_session(State(state): State<AppState>) -> Json<SessionResponse> {
    let session: SessionState = state.session.lock().await.clone();
    Json(SessionResponse {
        evaluation: session.evaluation.as_ref().map(EvaluationView::from_stored),
        optimization: session
            .optimization
            .as_ref()
            .map(OptimizationView::from_stored),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Mutex as AsyncMutex;

    use crate::config::Config;
    use crate::evaluation::score::ScoreBand;
    use crate::llm_client::{CompletionClient, TransportFailure};

    /// Returns canned replies in order; panics if called more often than
    /// replies were queued.
    struct StubClient {
        replies: AsyncMutex<VecDeque<Result<String, TransportFailure>>>,
    }

    impl StubClient {
        fn with_replies(replies: Vec<Result<String, TransportFailure>>) -> Arc<Self> {
            Arc::new(Self {
                replies: AsyncMutex::new(replies.into()),
            })
        }
    }

    #[async_trait]
    impl CompletionClient for StubClient {
        async fn complete(
            &self,
            _prompt: &str,
            _system: &str,
            _decoding: crate::llm_client::DecodingConfig,
            _api_key: &str,
        ) -> Result<String, TransportFailure> {
            self.replies
                .lock()
                .await
                .pop_front()
                .expect("stub ran out of canned replies")
        }
    }

    fn app_state(replies: Vec<Result<String, TransportFailure>>) -> AppState {
        AppState::new(Config::default(), StubClient::with_replies(replies))
    }

    fn analyze_request(description: &str) -> Json<AnalyzeRequest> {
        Json(AnalyzeRequest {
            api_key: "gsk-test".to_string(),
            description: description.to_string(),
        })
    }

    const JUDGMENT_35: &str = r#"{
        "score": 35,
        "critique_summary": "Too generic.",
        "breakdown": {
            "Scannability/Format": { "status": "Fail", "comment": "No bullets." }
        }
    }"#;

    #[tokio::test]
    async fn analyze_end_to_end_scenario() {
        let state = app_state(vec![Ok(JUDGMENT_35.to_string())]);

        let Json(response) = handle_analyze(
            State(state.clone()),
            analyze_request("Best shoes ever, buy now!"),
        )
        .await
        .unwrap();

        let view = response.evaluation;
        assert_eq!(view.score, 35);
        assert_eq!(view.band, ScoreBand::Red);
        assert_eq!(view.color, "#dc2626");
        assert_eq!(view.critique, "Too generic.");
        assert_eq!(view.breakdown.len(), 1);
        assert_eq!(view.breakdown[0].criterion, "Scannability/Format");
        assert!(!view.breakdown[0].passed);
        assert_eq!(view.breakdown[0].comment, "No bullets.");

        let session = state.session.lock().await;
        assert_eq!(
            session.evaluation.as_ref().unwrap().source_text,
            "Best shoes ever, buy now!"
        );
    }

    #[tokio::test]
    async fn analyze_rejects_empty_description_before_any_call() {
        let state = app_state(vec![]); // a completion call would panic the stub

        let err = handle_analyze(State(state.clone()), analyze_request("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(state.session.lock().await.evaluation.is_none());
    }

    #[tokio::test]
    async fn analyze_rejects_missing_credential_before_any_call() {
        let state = app_state(vec![]);

        let err = handle_analyze(
            State(state),
            Json(AnalyzeRequest {
                api_key: String::new(),
                description: "Soft cotton t-shirt.".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn transport_failure_leaves_previous_result_visible() {
        let state = app_state(vec![
            Ok(JUDGMENT_35.to_string()),
            Err(TransportFailure::Status {
                status: 500,
                body: "server error".to_string(),
            }),
        ]);

        handle_analyze(State(state.clone()), analyze_request("first"))
            .await
            .unwrap();
        let err = handle_analyze(State(state.clone()), analyze_request("second"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upstream(_)));
        // The failed action must not disturb the stored result.
        let session = state.session.lock().await;
        assert_eq!(session.evaluation.as_ref().unwrap().source_text, "first");
    }

    #[tokio::test]
    async fn non_json_judgment_is_a_parse_error_and_stores_nothing() {
        let state = app_state(vec![Ok("not json".to_string())]);

        let err = handle_analyze(State(state.clone()), analyze_request("shoes"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MalformedJudgment(_)));
        assert!(state.session.lock().await.evaluation.is_none());
    }

    #[tokio::test]
    async fn optimize_while_idle_is_rejected() {
        let state = app_state(vec![]);

        let err = handle_optimize(
            State(state),
            Json(OptimizeRequest {
                api_key: "gsk-test".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NoEvaluation));
    }

    #[tokio::test]
    async fn optimize_rewrites_the_analyzed_text_and_reanalysis_clears_it() {
        let state = app_state(vec![
            Ok(JUDGMENT_35.to_string()),
            Ok("## Premium Shoes\n- Loved by 10,000 runners".to_string()),
            Ok(r#"{"score": 80}"#.to_string()),
        ]);

        handle_analyze(State(state.clone()), analyze_request("Best shoes ever, buy now!"))
            .await
            .unwrap();

        let Json(response) = handle_optimize(
            State(state.clone()),
            Json(OptimizeRequest {
                api_key: "gsk-test".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(
            response.optimization.source_text,
            "Best shoes ever, buy now!"
        );
        assert!(response.optimization.optimized_text.contains("Premium Shoes"));

        // A fresh analysis invalidates the stored optimization.
        handle_analyze(State(state.clone()), analyze_request("New product copy"))
            .await
            .unwrap();
        let session = state.session.lock().await;
        assert!(session.optimization.is_none());
        assert_eq!(session.evaluation.as_ref().unwrap().result.score, 80);
    }

    #[tokio::test]
    async fn session_view_reports_both_slots() {
        let state = app_state(vec![
            Ok(JUDGMENT_35.to_string()),
            Ok("rewrite".to_string()),
        ]);

        let Json(empty) = handle_session(State(state.clone())).await;
        assert!(empty.evaluation.is_none());
        assert!(empty.optimization.is_none());

        handle_analyze(State(state.clone()), analyze_request("shoes"))
            .await
            .unwrap();
        handle_optimize(
            State(state.clone()),
            Json(OptimizeRequest {
                api_key: "gsk-test".to_string(),
            }),
        )
        .await
        .unwrap();

        let Json(full) = handle_session(State(state)).await;
        assert_eq!(full.evaluation.unwrap().score, 35);
        assert_eq!(full.optimization.unwrap().optimized_text, "rewrite");
    }
}
