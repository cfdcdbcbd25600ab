use std::collections::HashMap;

use exam_core::model::{PartKey, QuestionId, QuestionStatus};

use crate::error::SessionError;
use crate::provider::{AnswerEffect, PartData, PartProvider, PartSlot};

/// Ordered arena of part providers for one session, plus the shared
/// status map that feeds the navigation strip.
///
/// Each provider only ever writes its own slice of the shared map;
/// globally unique question ids keep the slices disjoint.
pub struct PartRegistry {
    order: Vec<PartKey>,
    slots: HashMap<PartKey, PartSlot>,
    shared_status: HashMap<QuestionId, QuestionStatus>,
}

impl PartRegistry {
    /// Every selected part starts in the `Loading` state.
    #[must_use]
    pub fn new(selected_parts: Vec<PartKey>) -> Self {
        let slots = selected_parts
            .iter()
            .map(|part| (*part, PartSlot::Loading))
            .collect();
        Self {
            order: selected_parts,
            slots,
            shared_status: HashMap::new(),
        }
    }

    /// Selected parts in session order.
    #[must_use]
    pub fn parts(&self) -> &[PartKey] {
        &self.order
    }

    #[must_use]
    pub fn slot(&self, part: PartKey) -> Option<&PartSlot> {
        self.slots.get(&part)
    }

    /// The aggregated status map across all providers.
    #[must_use]
    pub fn shared_status(&self) -> &HashMap<QuestionId, QuestionStatus> {
        &self.shared_status
    }

    #[must_use]
    pub fn status_of(&self, id: QuestionId) -> QuestionStatus {
        self.shared_status.get(&id).copied().unwrap_or_default()
    }

    /// The part owning the given question, scanning in session order.
    #[must_use]
    pub fn owner_of(&self, id: QuestionId) -> Option<PartKey> {
        self.order.iter().copied().find(|part| {
            self.slots
                .get(part)
                .and_then(PartSlot::data)
                .is_some_and(|data| data.question(id).is_some())
        })
    }

    fn slot_mut(&mut self, part: PartKey) -> Result<&mut PartSlot, SessionError> {
        self.slots
            .get_mut(&part)
            .ok_or(SessionError::UnknownPart(part))
    }

    /// Install loaded data for a part and seed its slice of the shared
    /// status map.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownPart` for parts outside the session.
    pub fn set_loaded(&mut self, part: PartKey, data: PartData) -> Result<(), SessionError> {
        for (id, status) in data.question_status() {
            self.shared_status.insert(id, status);
        }
        *self.slot_mut(part)? = PartSlot::Ready(data);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::UnknownPart` for parts outside the session.
    pub fn set_failed(&mut self, part: PartKey, message: String) -> Result<(), SessionError> {
        *self.slot_mut(part)? = PartSlot::Failed { message };
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::UnknownPart` for parts outside the session.
    pub fn set_loading(&mut self, part: PartKey) -> Result<(), SessionError> {
        *self.slot_mut(part)? = PartSlot::Loading;
        Ok(())
    }

    /// Record an answer selection against the owning part and reflect
    /// the status change in the shared map immediately, so the
    /// navigation strip updates without waiting for a part switch.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownQuestion` if no loaded part owns
    /// the id, or a provider error from the owning part.
    pub fn select_answer(
        &mut self,
        id: QuestionId,
        label: Option<&str>,
    ) -> Result<(), SessionError> {
        let part = self
            .owner_of(id)
            .ok_or(SessionError::UnknownQuestion(id))?;
        let data = self
            .slot_mut(part)?
            .data_mut()
            .ok_or(SessionError::UnknownQuestion(id))?;
        if let AnswerEffect::Updated(status) = data.select_answer(id, label)? {
            self.shared_status.insert(id, status);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::UnknownQuestion` if no loaded part owns the id.
    pub fn mark_viewed(&mut self, id: QuestionId) -> Result<(), SessionError> {
        let part = self
            .owner_of(id)
            .ok_or(SessionError::UnknownQuestion(id))?;
        let data = self
            .slot_mut(part)?
            .data_mut()
            .ok_or(SessionError::UnknownQuestion(id))?;
        let status = data.mark_viewed(id)?;
        self.shared_status.insert(id, status);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `SessionError::UnknownQuestion` if no loaded part owns the id.
    pub fn toggle_marked(&mut self, id: QuestionId) -> Result<(), SessionError> {
        let part = self
            .owner_of(id)
            .ok_or(SessionError::UnknownQuestion(id))?;
        let data = self
            .slot_mut(part)?
            .data_mut()
            .ok_or(SessionError::UnknownQuestion(id))?;
        let status = data.toggle_marked(id)?;
        self.shared_status.insert(id, status);
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
