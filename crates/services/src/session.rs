use std::sync::Arc;

use exam_core::Clock;
use exam_core::model::{PartKey, QuestionId, SessionClock, SessionConfig};

use crate::backend::BackendClient;
use crate::error::{SessionError, SubmissionError};
use crate::index::{IndexEntry, question_index};
use crate::provider::PartData;
use crate::registry::PartRegistry;
use crate::aggregator::{SessionOutcome, SubmissionAggregator};
use crate::ticker::SessionTicker;

/// One in-flight test session: the immutable configuration, the part
/// registry, the running clock, and the part currently rendered.
///
/// Created when the user starts a test; torn down when they navigate
/// away or submit. All accumulated part state lives until teardown.
pub struct TestSession {
    config: SessionConfig,
    registry: PartRegistry,
    ticker: SessionTicker,
    current_part: PartKey,
    active: bool,
    backend: Arc<BackendClient>,
    clock: Clock,
}

impl TestSession {
    /// Start a session: spawn the clock ticker and eagerly load every
    /// selected part. A part whose fetch fails is left in the failed
    /// state with a retry affordance; it never aborts the session.
    pub async fn start(config: SessionConfig, backend: Arc<BackendClient>, clock: Clock) -> Self {
        let registry = PartRegistry::new(config.selected_parts().to_vec());
        let ticker = SessionTicker::start(SessionClock::new(config.time_limit_seconds()));
        let current_part = config.selected_parts()[0];

        let mut session = Self {
            config,
            registry,
            ticker,
            current_part,
            active: true,
            backend,
            clock,
        };

        for part in session.config.selected_parts().to_vec() {
            session.load_part(part).await;
        }
        session
    }

    async fn load_part(&mut self, part: PartKey) {
        let result = self
            .backend
            .fetch_part(self.config.test_id(), part)
            .await;

        // teardown may have raced the fetch; never write into a dead session
        if !self.active {
            return;
        }

        match result {
            Ok(groups) => {
                let data = PartData::new(groups, self.clock.now());
                let _ = self.registry.set_loaded(part, data);
            }
            Err(err) => {
                tracing::warn!(part = %part, error = %err, "part load failed");
                let _ = self.registry.set_failed(part, err.to_string());
            }
        }
    }

    /// Re-issue the fetch for a failed (or loading) part.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Inactive` after teardown, or
    /// `SessionError::UnknownPart` for parts outside the session.
    pub async fn retry_part(&mut self, part: PartKey) -> Result<(), SessionError> {
        if !self.active {
            return Err(SessionError::Inactive);
        }
        self.registry.set_loading(part)?;
        self.load_part(part).await;
        Ok(())
    }

    /// Record an answer selection for the owning part.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Inactive` after teardown, or the registry
    /// error when no loaded part owns the question.
    pub fn select_answer(
        &mut self,
        id: QuestionId,
        label: Option<&str>,
    ) -> Result<(), SessionError> {
        if !self.active {
            return Err(SessionError::Inactive);
        }
        self.registry.select_answer(id, label)
    }

    /// Navigation-strip press: switch to the owning part, promote the
    /// question to viewed, and report which part became current.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Inactive` after teardown, or
    /// `SessionError::UnknownQuestion` when no loaded part owns the id.
    pub fn jump_to_question(&mut self, id: QuestionId) -> Result<PartKey, SessionError> {
        if !self.active {
            return Err(SessionError::Inactive);
        }
        let part = self
            .registry
            .owner_of(id)
            .ok_or(SessionError::UnknownQuestion(id))?;
        self.current_part = part;
        self.registry.mark_viewed(id)?;
        Ok(part)
    }

    /// Navigation-strip long-press: toggle the review mark.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Inactive` after teardown, or
    /// `SessionError::UnknownQuestion` when no loaded part owns the id.
    pub fn toggle_marked(&mut self, id: QuestionId) -> Result<(), SessionError> {
        if !self.active {
            return Err(SessionError::Inactive);
        }
        self.registry.toggle_marked(id)
    }

    /// The flat cross-part index for the navigation strip.
    #[must_use]
    pub fn question_index(&self) -> Vec<IndexEntry> {
        question_index(&self.registry)
    }

    /// Submit the session through the aggregator. The session itself is
    /// left untouched so a failed submission can simply be retried.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError` from credential validation or the
    /// backend round-trips.
    pub async fn submit(
        &self,
        aggregator: &SubmissionAggregator,
    ) -> Result<SessionOutcome, SubmissionError> {
        aggregator.submit(&self.config, &self.registry).await
    }

    /// Cancel the clock and mark the session dead; late async results
    /// are dropped instead of written into freed state.
    pub fn teardown(&mut self) {
        self.active = false;
        self.ticker.shutdown();
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &PartRegistry {
        &self.registry
    }

    #[must_use]
    pub fn current_part(&self) -> PartKey {
        self.current_part
    }

    /// Switch the rendered part directly (tab press).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownPart` for parts outside the session.
    pub fn set_current_part(&mut self, part: PartKey) -> Result<(), SessionError> {
        if !self.config.selected_parts().contains(&part) {
            return Err(SessionError::UnknownPart(part));
        }
        self.current_part = part;
        Ok(())
    }

    #[must_use]
    pub fn ticker(&self) -> &SessionTicker {
        &self.ticker
    }

    /// `mm:ss` display of the session clock.
    #[must_use]
    pub fn clock_display(&self) -> String {
        self.ticker.display()
    }
}
