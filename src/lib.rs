//! Client-side form validation over an in-memory form document.
//!
//! A [`Validator`] attaches to a [`Form`], validates its fields on submit
//! (and optionally on every edit) and reports the outcome through
//! subscriber notifications. Fields that expose native constraint
//! validation are checked by the form's own engine, extended with format
//! rules, minimum length and file size limits; fields that do not are
//! checked entirely by the legacy rule pipeline.
//!
//! ```
//! use form_validator::{Form, Validator, SubmitOutcome};
//!
//! let mut form = Form::from_html(
//!     "<form><input name='email' required data-validation-rule='email'></form>",
//! )?;
//! let _validator = Validator::attach(&mut form, true);
//! assert_eq!(form.submit(), SubmitOutcome::Prevented);
//!
//! form.type_text("input[name=email]", "user@example.com")?;
//! assert_eq!(form.submit(), SubmitOutcome::Submitted);
//! # Ok::<(), form_validator::Error>(())
//! ```

mod checker;
mod config;
mod constraint;
mod error;
mod events;
mod form;
mod html;
mod js_number;
mod js_regex;
mod listeners;
mod rules;
mod selector;
mod validator;
mod validity;

pub use checker::{
    ATTR_MAX_FILESIZE, ATTR_RULE, ATTR_TITLE, LegacyChecker, NativeChecker, ValidityChecker,
    checker_for,
};
pub use config::ValidatorConfig;
pub use error::{Error, Result};
pub use events::{
    EVENT_FORM_VALIDATION, EVENT_VALIDATION, FieldValidationEvent, FormValidationEvent,
    FormValidationResult, Subscriber, SubscriptionId,
};
pub use form::{ControlKind, FieldId, Form, SelectedFile, SubmitOutcome};
pub use listeners::{EventTarget, HostEvent, HostEventKind, HostListener};
pub use rules::{RULE_EMAIL, RULE_PHONE, RuleRegistry};
pub use validator::Validator;
pub use validity::{FailureKind, ValidationResult, ValidityState};
