use chrono::NaiveDate;
use log::debug;

use crate::errors::CoreError;
use crate::models::draft::{DraftField, FormDraft};
use crate::models::holding::{HoldingId, Metal};
use crate::storage::holdings_store::{HoldingsStore, StoreUpdate};
use crate::storage::traits::KeyValueStore;

/// State of the add/edit holding form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormState {
    Closed,
    Creating(FormDraft),
    /// `metal` is the holding's metal, locked for the whole edit.
    Editing {
        id: HoldingId,
        metal: Metal,
        draft: FormDraft,
    },
}

/// The add/edit workflow. The only code path that mutates holdings.
///
/// ```text
/// Closed --open_create--> Creating --commit/cancel--> Closed
/// Closed --open_edit----> Editing  --commit/cancel--> Closed
/// ```
/// A failed commit leaves the form open with the draft untouched.
#[derive(Debug)]
pub struct HoldingWorkflow {
    state: FormState,
    default_metal: Metal,
}

impl HoldingWorkflow {
    pub fn new(default_metal: Metal) -> Self {
        Self {
            state: FormState::Closed,
            default_metal,
        }
    }

    pub fn set_default_metal(&mut self, metal: Metal) {
        self.default_metal = metal;
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.state, FormState::Closed)
    }

    pub fn draft(&self) -> Option<&FormDraft> {
        match &self.state {
            FormState::Closed => None,
            FormState::Creating(draft) | FormState::Editing { draft, .. } => Some(draft),
        }
    }

    /// Open the form for a new holding with default values.
    pub fn open_create(&mut self, today: NaiveDate) -> Result<&FormDraft, CoreError> {
        self.ensure_closed()?;
        self.state = FormState::Creating(FormDraft::new_for(self.default_metal, today));
        self.draft().ok_or(CoreError::FormClosed)
    }

    /// Open the form on an existing holding. Its metal cannot be changed.
    pub fn open_edit<S: KeyValueStore>(
        &mut self,
        store: &HoldingsStore<S>,
        id: &HoldingId,
        metal: Metal,
    ) -> Result<&FormDraft, CoreError> {
        self.ensure_closed()?;
        let holding = store
            .get(id, metal)
            .ok_or_else(|| CoreError::HoldingNotFound(id.to_string()))?;
        self.state = FormState::Editing {
            id: holding.id.clone(),
            metal: holding.metal,
            draft: FormDraft::from_holding(holding),
        };
        self.draft().ok_or(CoreError::FormClosed)
    }

    /// Set one draft field. Values are not validated until commit, except
    /// that an edit may not switch metal.
    pub fn update_field(&mut self, field: DraftField) -> Result<(), CoreError> {
        match &mut self.state {
            FormState::Closed => Err(CoreError::FormClosed),
            FormState::Creating(draft) => {
                draft.apply(field);
                Ok(())
            }
            FormState::Editing { id, metal, draft } => {
                match &field {
                    DraftField::Metal(None) => {
                        return Err(CoreError::ValidationError(
                            "Metal must be silver or gold".into(),
                        ))
                    }
                    DraftField::Metal(Some(requested)) if *requested != *metal => {
                        return Err(CoreError::MetalImmutable {
                            id: id.to_string(),
                            actual: *metal,
                            requested: *requested,
                        })
                    }
                    _ => {}
                }
                draft.apply(field);
                Ok(())
            }
        }
    }

    /// Validate the draft and write it through `store`, then close the form.
    ///
    /// On a validation error nothing is written and the form stays open.
    /// Persistence problems come back as warnings in the `StoreUpdate`.
    pub fn commit<S: KeyValueStore>(
        &mut self,
        store: &mut HoldingsStore<S>,
        today: NaiveDate,
    ) -> Result<StoreUpdate, CoreError> {
        let update = match &self.state {
            FormState::Closed => return Err(CoreError::FormClosed),
            FormState::Creating(draft) => {
                let holding = draft.to_holding(HoldingId::unassigned(), today)?;
                store.create(holding)
            }
            FormState::Editing { id, metal, draft } => {
                let holding = draft.to_holding(id.clone(), today)?;
                if holding.metal != *metal {
                    return Err(CoreError::MetalImmutable {
                        id: id.to_string(),
                        actual: *metal,
                        requested: holding.metal,
                    });
                }
                store.update(holding)?
            }
        };
        debug!("holding form committed");
        self.state = FormState::Closed;
        Ok(update)
    }

    /// Discard the draft. Returns whether a form was open.
    pub fn cancel(&mut self) -> bool {
        let was_open = self.is_open();
        self.state = FormState::Closed;
        was_open
    }

    /// Delete a holding. Routed through the workflow so all writes share one path.
    pub fn delete<S: KeyValueStore>(
        &mut self,
        store: &mut HoldingsStore<S>,
        id: &HoldingId,
        metal: Metal,
    ) -> StoreUpdate {
        // Editing a holding that no longer exists would silently do nothing.
        let editing_deleted =
            matches!(&self.state, FormState::Editing { id: editing, .. } if editing == id);
        if editing_deleted {
            self.state = FormState::Closed;
        }
        store.delete(id, metal)
    }

    fn ensure_closed(&self) -> Result<(), CoreError> {
        if self.is_open() {
            return Err(CoreError::FormAlreadyOpen);
        }
        Ok(())
    }
}

impl Default for HoldingWorkflow {
    fn default() -> Self {
        Self::new(Metal::Silver)
    }
}
