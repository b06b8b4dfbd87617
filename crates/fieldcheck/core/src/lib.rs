//! fieldcheck Core
//!
//! Form field validators and the controller that binds them to fields,
//! keeps per-field results and gates form submission.
//! Used natively by tests and headless callers, and by the WASM binding in the browser.
//!
//! ## Example
//!
//! ```rust
//! use fieldcheck_core::{FieldRef, MemoryPresenter, ValidationController, MSG_ERR};
//! use serde_json::json;
//!
//! let mut ctrl = ValidationController::new(MemoryPresenter::new());
//! let email = FieldRef::new("email", "email");
//!
//! ctrl.get_validator("REQUIRE")
//!     .apply_to(&email)
//!     .run(&[json!("")])
//!     .process_after_validation(MSG_ERR, json!("Required"));
//!
//! assert!(ctrl.has_error());
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod field;
pub mod handlers;
pub mod presenter;
pub mod validators;

pub use config::ControllerConfig;
pub use controller::{
    normalize_params, BoundValidator, Handler, HandlerContext, ValidationController, Validator,
};
pub use error::{ArgumentError, ControllerError, PresenterError};
pub use field::{FieldKey, FieldRef};
pub use handlers::{CHECK_ERR_BOX, CLEAN_NOT_CYRILLIC_SYMBOLS, MSG_ERR};
pub use presenter::{FieldState, MemoryPresenter, Presenter};
pub use validators::*;
