use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::checker::checker_for;
use crate::config::ValidatorConfig;
use crate::error::Result;
use crate::events::{
    self, FieldValidationEvent, FormValidationEvent, FormValidationResult, SubscriberList,
    SubscriptionId, SubscriptionIds,
};
use crate::form::{FieldId, Form};
use crate::listeners::{EventTarget, HostEvent, HostEventKind};
use crate::rules::RuleRegistry;

type WeakListener = Weak<dyn Fn(&mut Form, &mut HostEvent)>;

const CHANGE_EVENTS: [HostEventKind; 3] = [
    HostEventKind::Input,
    HostEventKind::Blur,
    HostEventKind::Change,
];

struct Inner {
    rules: RefCell<RuleRegistry>,
    field_subscribers: SubscriberList<FieldValidationEvent>,
    form_subscribers: SubscriberList<FormValidationEvent>,
    subscription_ids: SubscriptionIds,
    // Weak so the form's listeners, which own a handle to us, do not form a
    // cycle through this list.
    attached: RefCell<Vec<(EventTarget, HostEventKind, WeakListener)>>,
    previous_no_validate: Cell<bool>,
}

/// Validates the fields of one form and notifies subscribers of the outcome.
///
/// A `Validator` is a cheap handle; clones share rules, subscribers and the
/// listeners registered on the form. The form itself is only borrowed for
/// the duration of each call.
#[derive(Clone)]
pub struct Validator {
    inner: Rc<Inner>,
}

impl Validator {
    pub const EVENT_VALIDATION: &'static str = events::EVENT_VALIDATION;
    pub const EVENT_FORM_VALIDATION: &'static str = events::EVENT_FORM_VALIDATION;

    /// Binds a validator with the built-in rules to `form`.
    ///
    /// Turns off the form's own interactive validation, validates the form
    /// on every submit and, with `validate_on_change`, validates each
    /// eligible field on `input`, `blur` and `change`.
    pub fn attach(form: &mut Form, validate_on_change: bool) -> Self {
        Self::bind(form, validate_on_change, RuleRegistry::with_builtin_rules())
    }

    /// Like [`Validator::attach`], with the extra rules of `config`.
    pub fn with_config(form: &mut Form, config: &ValidatorConfig) -> Result<Self> {
        let rules = config.build_rules()?;
        Ok(Self::bind(form, config.validate_on_change, rules))
    }

    fn bind(form: &mut Form, validate_on_change: bool, rules: RuleRegistry) -> Self {
        let validator = Self {
            inner: Rc::new(Inner {
                rules: RefCell::new(rules),
                field_subscribers: SubscriberList::default(),
                form_subscribers: SubscriberList::default(),
                subscription_ids: SubscriptionIds::default(),
                attached: RefCell::new(Vec::new()),
                previous_no_validate: Cell::new(form.no_validate()),
            }),
        };

        form.set_no_validate(true);
        let handle = validator.clone();
        let listener = form.add_listener(
            EventTarget::Form,
            HostEventKind::Submit,
            move |form: &mut Form, event: &mut HostEvent| {
                handle.validate_form(form, Some(event));
            },
        );
        validator.remember(EventTarget::Form, HostEventKind::Submit, &listener);

        if validate_on_change {
            validator.enable_change_validation(form);
        }

        tracing::debug!(
            fields = form.len(),
            eligible = form.eligible_fields().len(),
            validate_on_change,
            "validator attached"
        );
        validator
    }

    fn remember(
        &self,
        target: EventTarget,
        kind: HostEventKind,
        listener: &Rc<dyn Fn(&mut Form, &mut HostEvent)>,
    ) {
        self.inner
            .attached
            .borrow_mut()
            .push((target, kind, Rc::downgrade(listener)));
    }

    /// Validates one field and raises [`Validator::EVENT_VALIDATION`],
    /// whether the field is valid or not.
    ///
    /// Returns `false` without notifying for an id the form does not know.
    pub fn validate_field(&self, form: &mut Form, field: FieldId) -> bool {
        if !form.contains(field) {
            tracing::debug!(field = field.index(), "validate_field on unknown field");
            return false;
        }

        let checker = checker_for(form, field);
        let valid = {
            let rules = self.inner.rules.borrow();
            checker.check(form, field, &rules)
        };
        let message = form.validation_message(field);
        tracing::debug!(
            field = form.name(field),
            path = checker.name(),
            valid,
            message = message.as_str(),
            "field validated"
        );

        let mut event =
            FieldValidationEvent::new(field, form.name(field).to_string(), valid, message);
        self.inner.field_subscribers.dispatch(form, &mut event);
        valid
    }

    /// Validates every eligible field and raises
    /// [`Validator::EVENT_FORM_VALIDATION`]. When the form is invalid the
    /// triggering submit event, if any, is cancelled.
    pub fn validate_form(&self, form: &mut Form, submit: Option<&mut HostEvent>) -> bool {
        let result = self.collect(form);
        let valid = result.valid;

        let mut event = FormValidationEvent::new(result);
        self.inner.form_subscribers.dispatch(form, &mut event);

        if !valid {
            if let Some(submit) = submit {
                submit.prevent_default();
            }
        }
        valid
    }

    /// Same as [`Validator::validate_form`] without a submit event, returning
    /// the notification payload.
    pub fn validate_all(&self, form: &mut Form) -> FormValidationResult {
        let result = self.collect(form);
        let mut event = FormValidationEvent::new(result);
        self.inner.form_subscribers.dispatch(form, &mut event);
        event.detail
    }

    fn collect(&self, form: &mut Form) -> FormValidationResult {
        let mut result = FormValidationResult {
            valid: true,
            messages: Vec::new(),
        };
        let mut failed_names = HashSet::new();

        for field in form.eligible_fields() {
            if self.validate_field(form, field) {
                continue;
            }
            result.valid = false;
            // One message per field name: radio groups and repeated names
            // report once.
            if failed_names.insert(form.name(field).to_string()) {
                result.messages.push(form.validation_message(field));
            }
        }

        tracing::debug!(
            valid = result.valid,
            messages = result.messages.len(),
            "form validated"
        );
        result
    }

    /// Validates each eligible field on `input`, `blur` and `change`.
    ///
    /// Every call registers a fresh set of listeners, so calling it twice
    /// validates twice per event. Call it again only for fields added since
    /// the last call, or [`Validator::detach`] first.
    pub fn enable_change_validation(&self, form: &mut Form) {
        for field in form.eligible_fields() {
            for kind in CHANGE_EVENTS {
                let handle = self.clone();
                let listener = form.add_listener(
                    EventTarget::Field(field),
                    kind,
                    move |form: &mut Form, _event: &mut HostEvent| {
                        handle.validate_field(form, field);
                    },
                );
                self.remember(EventTarget::Field(field), kind, &listener);
            }
        }
    }

    /// Removes every listener this validator registered on `form` and
    /// restores the form's own validation setting. Returns the number of
    /// listeners removed.
    pub fn detach(&self, form: &mut Form) -> usize {
        let attached = std::mem::take(&mut *self.inner.attached.borrow_mut());
        let mut removed = 0;
        for (target, kind, listener) in attached {
            if let Some(listener) = listener.upgrade() {
                if form.remove_listener(target, kind, &listener) {
                    removed += 1;
                }
            }
        }
        form.set_no_validate(self.inner.previous_no_validate.get());
        tracing::debug!(removed, "validator detached");
        removed
    }

    /// Calls `subscriber` after every single-field validation.
    pub fn on_field_validated<F>(&self, subscriber: F) -> SubscriptionId
    where
        F: Fn(&mut Form, &mut FieldValidationEvent) + 'static,
    {
        let id = self.inner.subscription_ids.next();
        self.inner.field_subscribers.add(id, Rc::new(subscriber));
        id
    }

    /// Calls `subscriber` after every whole-form validation.
    pub fn on_form_validated<F>(&self, subscriber: F) -> SubscriptionId
    where
        F: Fn(&mut Form, &mut FormValidationEvent) + 'static,
    {
        let id = self.inner.subscription_ids.next();
        self.inner.form_subscribers.add(id, Rc::new(subscriber));
        id
    }

    /// Removes a field or form subscriber. Returns `false` for an unknown id.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.field_subscribers.remove(id) || self.inner.form_subscribers.remove(id)
    }

    /// Number of field and form subscribers currently registered.
    pub fn subscriber_count(&self) -> usize {
        self.inner.field_subscribers.len() + self.inner.form_subscribers.len()
    }

    /// Adds or replaces a `data-validation-rule` identifier.
    pub fn register_rule(&self, id: &str, pattern: &str) -> Result<()> {
        self.inner.rules.borrow_mut().register(id, pattern)
    }

    /// Whether `id` names a built-in or registered rule.
    pub fn has_rule(&self, id: &str) -> bool {
        self.inner.rules.borrow().contains(id)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("rules", &self.inner.rules.borrow())
            .field("subscribers", &self.subscriber_count())
            .field("listeners", &self.inner.attached.borrow().len())
            .finish()
    }
}
