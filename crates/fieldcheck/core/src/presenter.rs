//! Presentation side of validation
//!
//! Handlers never touch a UI toolkit directly; they go through a [`Presenter`].
//! The browser binding implements it over the DOM, [`MemoryPresenter`] keeps
//! everything in maps.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::PresenterError;
use crate::field::{FieldKey, FieldRef};

/// Mutually exclusive state of a field group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldState {
    Error,
    Success,
}

/// UI effects triggered after validation
pub trait Presenter {
    /// Render an error message next to the field, tagged with `key`
    fn show_field_error(
        &mut self,
        field: &FieldRef,
        key: &FieldKey,
        message: &str,
    ) -> Result<(), PresenterError>;

    /// Remove the error message tagged with `key`, if any
    fn clear_field_error(&mut self, key: &FieldKey) -> Result<(), PresenterError>;

    /// Whether an error message tagged with `key` is shown
    fn has_field_error(&self, key: &FieldKey) -> Result<bool, PresenterError>;

    /// Whether any error message is shown for the field
    fn field_has_errors(&self, field: &FieldRef) -> Result<bool, PresenterError>;

    /// Switch the field group to `state`, dropping the other state
    fn mark_field_state(&mut self, field: &FieldRef, state: FieldState)
        -> Result<(), PresenterError>;

    /// Overwrite the field's current value
    fn set_field_value(&mut self, field: &FieldRef, value: &str) -> Result<(), PresenterError>;

    /// Submit the form identified by `form`
    fn submit_form(&mut self, form: &str) -> Result<(), PresenterError>;
}

/// In-memory presenter
///
/// Records what a real UI would show. Fast and inspectable; nothing is rendered.
#[derive(Debug, Clone, Default)]
pub struct MemoryPresenter {
    errors: BTreeMap<FieldKey, String>,
    states: HashMap<FieldRef, FieldState>,
    values: HashMap<FieldRef, String>,
    submitted: Vec<String>,
}

impl MemoryPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message shown under `key`
    pub fn error_message(&self, key: &FieldKey) -> Option<&str> {
        self.errors.get(key).map(String::as_str)
    }

    /// Number of error messages currently shown
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn field_state(&self, field: &FieldRef) -> Option<FieldState> {
        self.states.get(field).copied()
    }

    pub fn field_value(&self, field: &FieldRef) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    /// Forms submitted so far, in order
    pub fn submitted_forms(&self) -> &[String] {
        &self.submitted
    }
}

impl Presenter for MemoryPresenter {
    fn show_field_error(
        &mut self,
        _field: &FieldRef,
        key: &FieldKey,
        message: &str,
    ) -> Result<(), PresenterError> {
        self.errors.insert(key.clone(), message.to_string());
        Ok(())
    }

    fn clear_field_error(&mut self, key: &FieldKey) -> Result<(), PresenterError> {
        self.errors.remove(key);
        Ok(())
    }

    fn has_field_error(&self, key: &FieldKey) -> Result<bool, PresenterError> {
        Ok(self.errors.contains_key(key))
    }

    fn field_has_errors(&self, field: &FieldRef) -> Result<bool, PresenterError> {
        Ok(self.errors.keys().any(|key| key.field() == *field))
    }

    fn mark_field_state(
        &mut self,
        field: &FieldRef,
        state: FieldState,
    ) -> Result<(), PresenterError> {
        self.states.insert(field.clone(), state);
        Ok(())
    }

    fn set_field_value(&mut self, field: &FieldRef, value: &str) -> Result<(), PresenterError> {
        self.values.insert(field.clone(), value.to_string());
        Ok(())
    }

    fn submit_form(&mut self, form: &str) -> Result<(), PresenterError> {
        self.submitted.push(form.to_string());
        Ok(())
    }
}
