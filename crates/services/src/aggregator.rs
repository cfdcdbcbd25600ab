use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use exam_core::Clock;
use exam_core::model::{Question, QuestionId, QuestionStatus, SessionConfig};
use storage::repository::CredentialStore;

use crate::backend::{BackendClient, PracticeSubmission, ScoredResult, UserAnswer};
use crate::error::SubmissionError;
use crate::provider::PartProvider;
use crate::registry::PartRegistry;

/// Everything pulled out of the part providers at submission time:
/// the union of their answer and status maps, the summed duration
/// snapshots, and the flattened question data used for local scoring.
#[derive(Debug, Clone)]
pub struct AggregatedResult {
    pub merged_answers: HashMap<QuestionId, String>,
    pub merged_status: HashMap<QuestionId, QuestionStatus>,
    pub total_duration_seconds: u64,
    pub questions: Vec<Question>,
    pub num_correct: u32,
}

impl AggregatedResult {
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.merged_answers.len()
    }
}

/// Collapse all part providers' state into one result set.
///
/// Question ids are globally unique, so the map unions are disjoint;
/// parts that never finished loading contribute empty maps and zero
/// duration rather than blocking. All reads are synchronous against the
/// registry, so the merge sees a consistent snapshot.
#[must_use]
pub fn aggregate(registry: &PartRegistry, now: DateTime<Utc>) -> AggregatedResult {
    let mut merged_answers = HashMap::new();
    let mut merged_status = HashMap::new();
    let mut total_duration_seconds = 0_u64;
    let mut questions = Vec::new();

    for part in registry.parts() {
        let Some(slot) = registry.slot(*part) else {
            continue;
        };
        merged_answers.extend(slot.answers());
        merged_status.extend(slot.question_status());
        total_duration_seconds += slot.duration_seconds(now);
        questions.extend(
            slot.question_data()
                .iter()
                .flat_map(|group| group.questions().iter().cloned()),
        );
    }

    let num_correct = count_correct(&questions, &merged_answers);

    AggregatedResult {
        merged_answers,
        merged_status,
        total_duration_seconds,
        questions,
        num_correct,
    }
}

fn count_correct(questions: &[Question], answers: &HashMap<QuestionId, String>) -> u32 {
    let count = questions
        .iter()
        .filter(|question| {
            answers
                .get(&question.id())
                .is_some_and(|label| question.is_correct(label))
        })
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// The merged local data plus the server's authoritative scores,
/// handed to the results view.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    pub local: AggregatedResult,
    pub scored: ScoredResult,
}

/// Submission flow: aggregate, validate credentials, post the merged
/// payload, then fetch back the server-scored record.
///
/// Every failure leaves the session state untouched, so retrying is
/// simply submitting again.
#[derive(Clone)]
pub struct SubmissionAggregator {
    backend: Arc<BackendClient>,
    credentials: Arc<dyn CredentialStore>,
    clock: Clock,
}

impl SubmissionAggregator {
    #[must_use]
    pub fn new(
        backend: Arc<BackendClient>,
        credentials: Arc<dyn CredentialStore>,
        clock: Clock,
    ) -> Self {
        Self {
            backend,
            credentials,
            clock,
        }
    }

    /// Run the post-confirmation submission protocol.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::NotAuthenticated` when no usable
    /// credentials are stored (nothing is sent in that case), or a
    /// backend/storage error from the POST or the follow-up GET.
    pub async fn submit(
        &self,
        config: &SessionConfig,
        registry: &PartRegistry,
    ) -> Result<SessionOutcome, SubmissionError> {
        let local = aggregate(registry, self.clock.now());

        let degraded = registry
            .parts()
            .iter()
            .filter(|part| !registry.slot(**part).is_some_and(|slot| slot.is_ready()))
            .count();
        if degraded > 0 {
            tracing::warn!(
                degraded_parts = degraded,
                "submitting with parts that never finished loading"
            );
        }

        let credentials = self
            .credentials
            .read_credentials()
            .await?
            .filter(|creds| {
                !creds.token.trim().is_empty() && !creds.user_id.as_str().trim().is_empty()
            })
            .ok_or(SubmissionError::NotAuthenticated)?;

        // Only answered ids are serialized; ordering is by question id
        // to keep payloads deterministic.
        let mut user_answer: Vec<UserAnswer> = local
            .merged_answers
            .iter()
            .map(|(id, answer)| UserAnswer {
                id_question: *id,
                answer: answer.clone(),
            })
            .collect();
        user_answer.sort_by_key(|entry| entry.id_question);

        let submission = PracticeSubmission {
            user_id: credentials.user_id.clone(),
            test_id: config.test_id().clone(),
            time: local.total_duration_seconds,
            user_answer,
            is_full_test: config.is_full_test(),
        };

        tracing::debug!(
            test_id = %config.test_id(),
            answered = local.answered_count(),
            num_correct = local.num_correct,
            "submitting practice test"
        );

        let practice_id = self
            .backend
            .submit_practice(&credentials.token, &submission)
            .await?;
        let scored = self
            .backend
            .fetch_practice(&credentials.token, &practice_id)
            .await?;

        tracing::debug!(practice_id = %practice_id, "received server scoring");

        Ok(SessionOutcome { local, scored })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
