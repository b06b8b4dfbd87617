//! Default post-validation handlers

use std::rc::Rc;

use serde_json::Value;

use crate::controller::{Handler, HandlerContext};
use crate::error::ControllerError;
use crate::presenter::{FieldState, Presenter};
use crate::validators::{arg, str_arg, strip_non_cyrillic};

/// Show or remove the error message of a validator run
pub const MSG_ERR: &str = "MSG_ERR";
/// Mark the field group successful once no error messages are left
pub const CHECK_ERR_BOX: &str = "CHECK_ERR_BOX";
/// Strip non-Cyrillic characters from the field value
pub const CLEAN_NOT_CYRILLIC_SYMBOLS: &str = "CLEAN_NOT_CYRILLIC_SYMBOLS";

pub fn default_handlers() -> Vec<(&'static str, Handler)> {
    vec![
        (MSG_ERR, Rc::new(error_message) as Handler),
        (CHECK_ERR_BOX, Rc::new(check_error_box) as Handler),
        (CLEAN_NOT_CYRILLIC_SYMBOLS, Rc::new(clean_not_cyrillic) as Handler),
    ]
}

/// `params[0]`: message text; empty or absent falls back to the configured default
fn error_message(
    ctx: &HandlerContext<'_>,
    params: &[Value],
    presenter: &mut dyn Presenter,
) -> Result<(), ControllerError> {
    if ctx.status == Some(true) {
        presenter.clear_field_error(ctx.key)?;
        return Ok(());
    }

    // one message per validator and field
    if presenter.has_field_error(ctx.key)? {
        return Ok(());
    }

    let message = match arg(params, 0) {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Null | Value::Bool(false) | Value::String(_) => ctx.config.default_error_message.clone(),
        Value::Number(n) if n.as_f64() == Some(0.0) => ctx.config.default_error_message.clone(),
        other => other.to_string(),
    };
    presenter.show_field_error(ctx.field, ctx.key, &message)?;
    presenter.mark_field_state(ctx.field, FieldState::Error)?;
    Ok(())
}

fn check_error_box(
    ctx: &HandlerContext<'_>,
    _params: &[Value],
    presenter: &mut dyn Presenter,
) -> Result<(), ControllerError> {
    if !presenter.field_has_errors(ctx.field)? {
        presenter.mark_field_state(ctx.field, FieldState::Success)?;
    }
    Ok(())
}

/// `params[0]`: the field's current value
fn clean_not_cyrillic(
    ctx: &HandlerContext<'_>,
    params: &[Value],
    presenter: &mut dyn Presenter,
) -> Result<(), ControllerError> {
    let value = str_arg(params, 0).map_err(|source| ControllerError::InvalidArgument {
        name: CLEAN_NOT_CYRILLIC_SYMBOLS.to_string(),
        source,
    })?;

    let cleaned = strip_non_cyrillic(value);
    if cleaned != value {
        tracing::debug!("Stripped non-Cyrillic characters from {}", ctx.field.label());
        presenter.set_field_value(ctx.field, &cleaned)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ValidationController;
    use crate::field::{FieldKey, FieldRef};
    use crate::presenter::MemoryPresenter;
    use crate::validators::{CYRILLIC_LNG, EMAIL, REQUIRE};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_message_shown_once_and_removed_on_success() {
        let mut ctrl = ValidationController::new(MemoryPresenter::new());
        let field = FieldRef::new("email", "email");
        let key = FieldKey::new(EMAIL, &field);

        for _ in 0..2 {
            ctrl.get_validator(EMAIL)
                .apply_to(&field)
                .run(&[json!("nope")])
                .process_after_validation(MSG_ERR, json!("Invalid email"));
        }
        assert_eq!(ctrl.presenter().error_count(), 1);
        assert_eq!(ctrl.presenter().error_message(&key), Some("Invalid email"));
        assert_eq!(ctrl.presenter().field_state(&field), Some(FieldState::Error));

        ctrl.get_validator(EMAIL)
            .apply_to(&field)
            .run(&[json!("user@example.com")])
            .process_after_validation(MSG_ERR, json!("Invalid email"));
        assert_eq!(ctrl.presenter().error_message(&key), None);
    }

    #[test]
    fn test_default_message() {
        let mut ctrl = ValidationController::new(MemoryPresenter::new());
        let field = FieldRef::with_id("name");

        ctrl.get_validator(REQUIRE)
            .apply_to(&field)
            .run(&[json!("")])
            .process_after_validation(MSG_ERR, Value::Null);

        let key = FieldKey::new(REQUIRE, &field);
        assert_eq!(ctrl.presenter().error_message(&key), Some("Ошибка"));
    }

    #[rstest::rstest]
    #[case(json!(0))]
    #[case(json!(0.0))]
    #[case(json!(false))]
    #[case(json!(""))]
    fn test_falsy_message_uses_default(#[case] message: Value) {
        let mut ctrl = ValidationController::new(MemoryPresenter::new());
        let field = FieldRef::with_id("name");

        ctrl.get_validator(REQUIRE)
            .apply_to(&field)
            .run(&[json!("")])
            .process_after_validation(MSG_ERR, message);

        let key = FieldKey::new(REQUIRE, &field);
        assert_eq!(ctrl.presenter().error_message(&key), Some("Ошибка"));
    }

    #[test]
    fn test_numeric_message_is_rendered() {
        let mut ctrl = ValidationController::new(MemoryPresenter::new());
        let field = FieldRef::with_id("age");

        ctrl.get_validator(REQUIRE)
            .apply_to(&field)
            .run(&[json!("")])
            .process_after_validation(MSG_ERR, json!(18));

        let key = FieldKey::new(REQUIRE, &field);
        assert_eq!(ctrl.presenter().error_message(&key), Some("18"));
    }

    #[test]
    fn test_message_shown_when_validator_did_not_run() {
        let mut ctrl = ValidationController::new(MemoryPresenter::new());
        let field = FieldRef::with_id("name");

        ctrl.get_validator(REQUIRE)
            .apply_to(&field)
            .process_after_validation(MSG_ERR, json!("Required"));

        assert_eq!(ctrl.presenter().error_count(), 1);
        assert!(!ctrl.has_error());
    }

    #[test]
    fn test_check_error_box_waits_for_all_messages() {
        let mut ctrl = ValidationController::new(MemoryPresenter::new());
        let field = FieldRef::new("city", "city");

        ctrl.get_validator(REQUIRE)
            .apply_to(&field)
            .run(&[json!("")])
            .process_after_validation(MSG_ERR, json!("Required"));
        ctrl.get_validator(CYRILLIC_LNG)
            .apply_to(&field)
            .run(&[json!("")])
            .process_after_validation(MSG_ERR, json!("Cyrillic only"))
            .process_after_validation(CHECK_ERR_BOX, Value::Null);

        // REQUIRE still has a message up
        assert_eq!(ctrl.presenter().field_state(&field), Some(FieldState::Error));

        ctrl.get_validator(REQUIRE)
            .apply_to(&field)
            .run(&[json!("Москва")])
            .process_after_validation(MSG_ERR, json!("Required"))
            .process_after_validation(CHECK_ERR_BOX, Value::Null);

        assert_eq!(ctrl.presenter().field_state(&field), Some(FieldState::Success));
    }

    #[test]
    fn test_clean_not_cyrillic_rewrites_only_when_changed() {
        let mut ctrl = ValidationController::new(MemoryPresenter::new());
        let field = FieldRef::with_id("surname");

        ctrl.get_validator(CYRILLIC_LNG)
            .apply_to(&field)
            .run(&[json!("Иванов")])
            .process_after_validation(CLEAN_NOT_CYRILLIC_SYMBOLS, json!("Иванов"));
        assert_eq!(ctrl.presenter().field_value(&field), None);

        ctrl.get_validator(CYRILLIC_LNG)
            .apply_to(&field)
            .run(&[json!("Ива1нов")])
            .process_after_validation(CLEAN_NOT_CYRILLIC_SYMBOLS, json!("Ива1нов"));
        assert_eq!(ctrl.presenter().field_value(&field), Some("Иванов"));
    }

    #[test]
    fn test_clean_not_cyrillic_requires_string() {
        let mut ctrl = ValidationController::new(MemoryPresenter::new());
        let result = ctrl
            .get_validator(CYRILLIC_LNG)
            .apply_to(&FieldRef::with_id("surname"))
            .try_process_after_validation(CLEAN_NOT_CYRILLIC_SYMBOLS, json!(7));

        assert!(matches!(result, Err(ControllerError::InvalidArgument { .. })));
    }
}
