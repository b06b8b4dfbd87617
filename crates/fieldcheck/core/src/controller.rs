//! Validation controller
//!
//! Central place that owns the attached validators and handlers, records the
//! result of every validator run per field, and decides whether the form may
//! be submitted.
//!
//! Lookups that fail (unknown validator, unknown handler, running before
//! `apply_to`) come in two flavours: the chainable methods log through
//! `tracing` and carry on without touching the stored results, the `try_*`
//! methods return a [`ControllerError`] instead.

use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;

use crate::config::ControllerConfig;
use crate::error::{ArgumentError, ControllerError};
use crate::field::{FieldKey, FieldRef};
use crate::handlers::default_handlers;
use crate::presenter::Presenter;
use crate::validators::builtin_validators;

/// Predicate over positional arguments
pub type Validator = Rc<dyn Fn(&[Value]) -> Result<bool, ArgumentError>>;

/// Reaction to a validator outcome
pub type Handler =
    Rc<dyn Fn(&HandlerContext<'_>, &[Value], &mut dyn Presenter) -> Result<(), ControllerError>>;

/// What a handler knows about the validator run it reacts to
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    pub field: &'a FieldRef,
    pub key: &'a FieldKey,
    /// `None` when the validator has not run (or could not run) on this instance
    pub status: Option<bool>,
    pub config: &'a ControllerConfig,
}

pub struct ValidationController<P: Presenter> {
    validators: HashMap<String, Validator>,
    handlers: HashMap<String, Handler>,
    results: HashMap<FieldKey, bool>,
    presenter: P,
    config: ControllerConfig,
}

impl<P: Presenter> ValidationController<P> {
    /// Controller with the built-in validators and handlers attached
    pub fn new(presenter: P) -> Self {
        Self::with_config(presenter, ControllerConfig::default())
    }

    pub fn with_config(presenter: P, config: ControllerConfig) -> Self {
        let mut controller = Self {
            validators: HashMap::new(),
            handlers: HashMap::new(),
            results: HashMap::new(),
            presenter,
            config,
        };

        if controller.config.register_builtins {
            controller
                .attach_validator(builtin_validators())
                .attach_handlers_after_valid(default_handlers());
        }

        controller
    }

    /// Merge validators into the registry, replacing any with the same name
    pub fn attach_validator<I, K>(&mut self, validators: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, Validator)>,
        K: Into<String>,
    {
        for (name, validator) in validators {
            self.validators.insert(name.into(), validator);
        }
        self
    }

    pub fn attach_validator_fn<F>(&mut self, name: impl Into<String>, validator: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<bool, ArgumentError> + 'static,
    {
        self.validators.insert(name.into(), Rc::new(validator));
        self
    }

    /// Merge post-validation handlers into the registry, replacing any with the same name
    pub fn attach_handlers_after_valid<I, K>(&mut self, handlers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, Handler)>,
        K: Into<String>,
    {
        for (name, handler) in handlers {
            self.handlers.insert(name.into(), handler);
        }
        self
    }

    pub fn attach_handler_fn<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&HandlerContext<'_>, &[Value], &mut dyn Presenter) -> Result<(), ControllerError>
            + 'static,
    {
        self.handlers.insert(name.into(), Rc::new(handler));
        self
    }

    pub fn has_validator(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Start working with the named validator
    ///
    /// Never fails: an unknown name is logged and the returned instance's
    /// `run` leaves the stored results alone.
    pub fn get_validator(&mut self, name: &str) -> BoundValidator<'_, P> {
        if !self.has_validator(name) {
            tracing::warn!("Validator \"{}\" is not attached to the controller", name);
        }
        BoundValidator::new(self, name)
    }

    pub fn try_validator(&mut self, name: &str) -> Result<BoundValidator<'_, P>, ControllerError> {
        if !self.has_validator(name) {
            return Err(ControllerError::UnknownValidator(name.to_string()));
        }
        Ok(BoundValidator::new(self, name))
    }

    /// Last stored result for `key`, `None` if it never ran
    pub fn get_valid_status(&self, key: &FieldKey) -> Option<bool> {
        self.results.get(key).copied()
    }

    /// Record a result, overwriting the previous one for the same key
    pub fn save_valid_result(&mut self, key: FieldKey, status: bool) {
        tracing::debug!("Saved validation result {} = {}", key, status);
        self.results.insert(key, status);
    }

    /// Whether any recorded result is a failure
    pub fn has_error(&self) -> bool {
        self.results.values().any(|status| !status)
    }

    /// Submit the form unless a recorded result failed
    ///
    /// Returns whether the form was handed to the presenter.
    pub fn send_form(&mut self, form: &str) -> Result<bool, ControllerError> {
        if self.has_error() {
            tracing::debug!("Form {} not submitted: validation errors present", form);
            return Ok(false);
        }
        self.presenter.submit_form(form)?;
        Ok(true)
    }

    pub fn results(&self) -> impl Iterator<Item = (&FieldKey, bool)> {
        self.results.iter().map(|(key, status)| (key, *status))
    }

    /// Forget every recorded result, e.g. when a form is rendered afresh
    pub fn reset(&mut self) {
        self.results.clear();
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    fn validator(&self, name: &str) -> Option<Validator> {
        self.validators.get(name).cloned()
    }

    fn handler(&self, name: &str) -> Option<Handler> {
        self.handlers.get(name).cloned()
    }
}

/// A validator applied to one field
///
/// Lives for a single call chain:
/// `get_validator(..).apply_to(..).run(..).process_after_validation(..)`.
/// Only the result it records outlives it.
pub struct BoundValidator<'c, P: Presenter> {
    controller: &'c mut ValidationController<P>,
    name: String,
    field: Option<FieldRef>,
    key: Option<FieldKey>,
    status: Option<bool>,
}

impl<'c, P: Presenter> BoundValidator<'c, P> {
    fn new(controller: &'c mut ValidationController<P>, name: &str) -> Self {
        Self {
            controller,
            name: name.to_string(),
            field: None,
            key: None,
            status: None,
        }
    }

    /// Bind the field to validate; required before `run`
    pub fn apply_to(&mut self, field: &FieldRef) -> &mut Self {
        self.key = Some(FieldKey::new(self.name.as_str(), field));
        self.field = Some(field.clone());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> Option<&FieldKey> {
        self.key.as_ref()
    }

    pub fn field(&self) -> Option<&FieldRef> {
        self.field.as_ref()
    }

    /// Result of the last `run` on this instance
    pub fn status(&self) -> Option<bool> {
        self.status
    }

    /// Take the status an earlier run recorded for this field
    ///
    /// Lets handlers react to a result without running the validator again.
    pub fn load_stored_status(&mut self) -> &mut Self {
        self.status = self
            .key
            .as_ref()
            .and_then(|key| self.controller.get_valid_status(key));
        self
    }

    /// Run the validator and record its result; failures are logged
    pub fn run(&mut self, args: &[Value]) -> &mut Self {
        if let Err(err) = self.try_run(args) {
            report(&err);
        }
        self
    }

    /// Run the validator and record its result
    ///
    /// `Ok(false)` means the value failed validation; `Err` means nothing ran.
    pub fn try_run(&mut self, args: &[Value]) -> Result<bool, ControllerError> {
        let key = self.key.clone().ok_or_else(|| ControllerError::Unbound {
            validator: self.name.clone(),
        })?;
        let validator = self
            .controller
            .validator(&self.name)
            .ok_or_else(|| ControllerError::UnknownValidator(self.name.clone()))?;

        let status = validator(args).map_err(|source| ControllerError::InvalidArgument {
            name: self.name.clone(),
            source,
        })?;

        self.status = Some(status);
        self.controller.save_valid_result(key, status);
        Ok(status)
    }

    /// Hand the outcome to a post-validation handler; failures are logged
    ///
    /// A JSON array in `params` is spread into positional arguments, any
    /// other value is passed as the single argument.
    pub fn process_after_validation(&mut self, handler: &str, params: Value) -> &mut Self {
        if let Err(err) = self.try_process_after_validation(handler, params) {
            report(&err);
        }
        self
    }

    pub fn try_process_after_validation(
        &mut self,
        handler: &str,
        params: Value,
    ) -> Result<(), ControllerError> {
        let (field, key) = match (&self.field, &self.key) {
            (Some(field), Some(key)) => (field, key),
            _ => {
                return Err(ControllerError::Unbound {
                    validator: self.name.clone(),
                })
            }
        };
        let callback = self
            .controller
            .handler(handler)
            .ok_or_else(|| ControllerError::UnknownHandler(handler.to_string()))?;

        let params = normalize_params(params);
        let ctx = HandlerContext {
            field,
            key,
            status: self.status,
            config: &self.controller.config,
        };
        callback(&ctx, &params, &mut self.controller.presenter)
    }
}

/// Spread a JSON array into positional arguments; any other value becomes the only one
pub fn normalize_params(params: Value) -> Vec<Value> {
    match params {
        Value::Array(items) => items,
        other => vec![other],
    }
}

fn report(err: &ControllerError) {
    if err.is_recoverable() {
        tracing::warn!("{}", err);
    } else {
        tracing::error!("Validation failed to run: {}", err);
    }
}
