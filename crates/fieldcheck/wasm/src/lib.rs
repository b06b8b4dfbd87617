//! fieldcheck WASM
//!
//! WebAssembly bindings for the fieldcheck validation controller.
//! Runs the same validators in the browser and renders feedback into the DOM.

mod dom;

use fieldcheck_core::{
    number_value, ArgumentError, ControllerConfig, ControllerError, FieldKey, FieldRef,
    HandlerContext, PresenterError, ValidationController,
};
use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

pub use dom::DomPresenter;

/// Set panic hook for better error messages in the browser
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// `this` of a JavaScript post-validation handler
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HandlerInfo {
    pub key: String,
    pub legacy_id: String,
    pub field_id: Option<String>,
    pub field_name: Option<String>,
    pub status: Option<bool>,
}

impl HandlerInfo {
    fn from_context(ctx: &HandlerContext<'_>) -> Self {
        Self {
            key: ctx.key.to_string(),
            legacy_id: ctx.key.legacy_id(),
            field_id: ctx.field.id.clone(),
            field_name: ctx.field.name.clone(),
            status: ctx.status,
        }
    }
}

/// Browser-side validation controller
///
/// # Example (JavaScript)
/// ```javascript
/// const form = new FormValidator({ defaultErrorMessage: 'Required' });
/// form.run('REQUIRE', 'email', 'email', [input.value], [['MSG_ERR', 'Required'], 'CHECK_ERR_BOX']);
/// form.sendForm('signup');
/// ```
#[wasm_bindgen]
pub struct FormValidator {
    controller: ValidationController<DomPresenter>,
}

#[wasm_bindgen]
impl FormValidator {
    /// `config` is an optional object with `ControllerConfig` fields in camelCase
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<FormValidator, JsValue> {
        let config = parse_config(config)?;
        let presenter =
            DomPresenter::new(config.clone()).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(FormValidator {
            controller: ValidationController::with_config(presenter, config),
        })
    }

    /// Attach (or replace) a validator implemented in JavaScript
    ///
    /// Only an explicit `false` return counts as a failure.
    #[wasm_bindgen(js_name = attachValidator)]
    pub fn attach_validator(&mut self, name: &str, validator: js_sys::Function) {
        self.controller.attach_validator_fn(name, move |args: &[Value]| {
            let result = validator
                .apply(&JsValue::NULL, &to_js_array(args))
                .map_err(|e| ArgumentError::Rejected(format!("{:?}", e)))?;
            Ok(result.as_bool() != Some(false))
        });
    }

    /// Attach (or replace) a post-validation handler implemented in JavaScript
    ///
    /// The handler is called with `this` set to `{ key, legacyId, fieldId, fieldName, status }`
    /// and the params spread as arguments.
    #[wasm_bindgen(js_name = attachHandler)]
    pub fn attach_handler(&mut self, name: &str, handler: js_sys::Function) {
        self.controller.attach_handler_fn(name, move |ctx, params, _presenter| {
            let this = to_js(&HandlerInfo::from_context(ctx));
            handler
                .apply(&this, &to_js_array(params))
                .map(|_| ())
                .map_err(|e| ControllerError::Presenter(PresenterError::Dom(format!("{:?}", e))))
        });
    }

    /// Run a validator on a field and record the result
    ///
    /// `args` is an array of arguments or a single value. Returns the
    /// validation result, or `undefined` when nothing ran (unknown validator,
    /// NaN or unconvertible arguments).
    pub fn validate(
        &mut self,
        validator: &str,
        field_id: Option<String>,
        field_name: Option<String>,
        args: JsValue,
    ) -> Option<bool> {
        let args = js_args(args)
            .map_err(|source| warn(&invalid_argument(validator, source)))
            .ok()?;
        let field = FieldRef {
            id: field_id,
            name: field_name,
        };

        self.controller
            .get_validator(validator)
            .apply_to(&field)
            .try_run(&args)
            .map_err(|e| warn(&e))
            .ok()
    }

    /// Run a post-validation handler against the last recorded result
    ///
    /// The validator is not run again. Returns whether the handler ran.
    pub fn process(
        &mut self,
        validator: &str,
        field_id: Option<String>,
        field_name: Option<String>,
        handler: &str,
        params: JsValue,
    ) -> bool {
        let params = match js_value(params, 0) {
            Ok(params) => params,
            Err(source) => {
                warn(&invalid_argument(handler, source));
                return false;
            }
        };
        let field = FieldRef {
            id: field_id,
            name: field_name,
        };

        self.controller
            .get_validator(validator)
            .apply_to(&field)
            .load_stored_status()
            .try_process_after_validation(handler, params)
            .map_err(|e| warn(&e))
            .is_ok()
    }

    /// Run a validator on a field, then the listed handlers
    ///
    /// `handlers` is an optional array of handler names or `[name, params]`
    /// pairs. Handlers still run when the validator could not, and then see
    /// no status. Returns the validation result, or `undefined` when nothing ran.
    pub fn run(
        &mut self,
        validator: &str,
        field_id: Option<String>,
        field_name: Option<String>,
        args: JsValue,
        handlers: JsValue,
    ) -> Option<bool> {
        let args = js_args(args)
            .map_err(|source| warn(&invalid_argument(validator, source)))
            .ok();
        let handlers = match js_value(handlers, 0) {
            Ok(handlers) => parse_handlers(handlers),
            Err(source) => {
                warn(&invalid_argument(validator, source));
                Vec::new()
            }
        };
        let field = FieldRef {
            id: field_id,
            name: field_name,
        };

        let mut bound = self.controller.get_validator(validator);
        bound.apply_to(&field);
        let status = args.and_then(|args| bound.try_run(&args).map_err(|e| warn(&e)).ok());
        for (handler, params) in handlers {
            if let Err(e) = bound.try_process_after_validation(&handler, params) {
                warn(&e);
            }
        }
        status
    }

    #[wasm_bindgen(js_name = getValidStatus)]
    pub fn get_valid_status(
        &self,
        validator: &str,
        field_id: Option<String>,
        field_name: Option<String>,
    ) -> Option<bool> {
        let field = FieldRef {
            id: field_id,
            name: field_name,
        };
        self.controller
            .get_valid_status(&FieldKey::new(validator, &field))
    }

    #[wasm_bindgen(js_name = hasError)]
    pub fn has_error(&self) -> bool {
        self.controller.has_error()
    }

    /// Submit the form (by id or selector) unless a validation failed
    #[wasm_bindgen(js_name = sendForm)]
    pub fn send_form(&mut self, form: &str) -> Result<bool, JsValue> {
        self.controller
            .send_form(form)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }
}

/// Quick email validation
#[wasm_bindgen(js_name = isEmail)]
pub fn is_email_js(value: &str) -> bool {
    fieldcheck_core::is_email(value)
}

/// Quick Cyrillic-only check
#[wasm_bindgen(js_name = isCyrillic)]
pub fn is_cyrillic_js(value: &str) -> bool {
    fieldcheck_core::is_cyrillic(value)
}

#[wasm_bindgen(js_name = stripNonCyrillic)]
pub fn strip_non_cyrillic_js(value: &str) -> String {
    fieldcheck_core::strip_non_cyrillic(value)
}

fn parse_config(config: JsValue) -> Result<ControllerConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(ControllerConfig::default());
    }
    let config: Value = serde_wasm_bindgen::from_value(config)
        .map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))?;
    config_from_value(config).map_err(|e| JsValue::from_str(&format!("Failed to parse config: {}", e)))
}

/// Accepts camelCase keys from JavaScript as well as the snake_case TOML names
fn config_from_value(config: Value) -> Result<ControllerConfig, serde_json::Error> {
    let config = match config {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (to_snake_case(&key), value))
                .collect(),
        ),
        other => other,
    };
    serde_json::from_value(config)
}

fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `["MSG_ERR", ["CHECK_ERR_BOX"], ["MSG_ERR", "text"]]` into (name, params) pairs
fn parse_handlers(handlers: Value) -> Vec<(String, Value)> {
    let items = match handlers {
        Value::Null => return Vec::new(),
        Value::Array(items) => items,
        single => vec![single],
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(name) => Some((name, Value::Null)),
            Value::Array(mut pair) if !pair.is_empty() => {
                let params = if pair.len() > 1 { pair.remove(1) } else { Value::Null };
                match pair.remove(0) {
                    Value::String(name) => Some((name, params)),
                    _ => None,
                }
            }
            _ => None,
        })
        .collect()
}

/// Positional arguments: an array is spread, anything else is the only argument
fn js_args(args: JsValue) -> Result<Vec<Value>, ArgumentError> {
    if js_sys::Array::is_array(&args) {
        js_sys::Array::from(&args)
            .iter()
            .enumerate()
            .map(|(index, value)| js_value(value, index))
            .collect()
    } else {
        Ok(vec![js_value(args, 0)?])
    }
}

/// Convert a browser value without coercion
///
/// Numbers and arrays are walked here so a NaN anywhere in them is rejected
/// instead of turning into `null`; `index` is the top-level argument position.
fn js_value(value: JsValue, index: usize) -> Result<Value, ArgumentError> {
    if let Some(n) = value.as_f64() {
        return number_value(n, index);
    }
    if js_sys::Array::is_array(&value) {
        return js_sys::Array::from(&value)
            .iter()
            .map(|item| js_value(item, index))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array);
    }
    serde_wasm_bindgen::from_value(value).map_err(|e| ArgumentError::Unconvertible {
        index,
        reason: e.to_string(),
    })
}

fn invalid_argument(name: &str, source: ArgumentError) -> ControllerError {
    ControllerError::InvalidArgument {
        name: name.to_string(),
        source,
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::UNDEFINED)
}

fn to_js_array(values: &[Value]) -> js_sys::Array {
    values.iter().map(to_js).collect()
}

fn warn(err: &ControllerError) {
    let message = JsValue::from_str(&err.to_string());
    if err.is_recoverable() {
        tracing::warn!("{}", err);
        web_sys::console::warn_1(&message);
    } else {
        tracing::error!("{}", err);
        web_sys::console::error_1(&message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn test_email_validation() {
        assert!(is_email_js("user@example.com"));
        assert!(!is_email_js("invalid-email"));
    }

    #[wasm_bindgen_test]
    fn test_cyrillic_validation() {
        assert!(is_cyrillic_js("привет"));
        assert!(!is_cyrillic_js("привет123"));
        assert_eq!(strip_non_cyrillic_js("при1вет"), "привет");
    }

    #[test]
    fn test_parse_handlers() {
        let handlers = parse_handlers(json!(["CHECK_ERR_BOX", ["MSG_ERR", "Required"], [5], ["X"]]));
        assert_eq!(
            handlers,
            vec![
                ("CHECK_ERR_BOX".to_string(), Value::Null),
                ("MSG_ERR".to_string(), json!("Required")),
                ("X".to_string(), Value::Null),
            ]
        );
        assert!(parse_handlers(Value::Null).is_empty());
        assert_eq!(parse_handlers(json!("MSG_ERR")), vec![("MSG_ERR".to_string(), Value::Null)]);
    }

    #[test]
    fn test_config_from_camel_case() {
        let config = config_from_value(json!({
            "defaultErrorMessage": "Required",
            "errorClass": "is-invalid",
            "register_builtins": false,
        }))
        .unwrap();

        assert_eq!(config.default_error_message, "Required");
        assert_eq!(config.error_class, "is-invalid");
        assert_eq!(config.success_class, "has-success");
        assert!(!config.register_builtins);
    }
}
