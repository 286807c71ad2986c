use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Serialize;

use crate::form::{FieldId, Form};

/// Name of the notification raised after every field validation.
pub const EVENT_VALIDATION: &str = "VALIDATION_ELEMENT";
/// Name of the notification raised after every form validation.
pub const EVENT_FORM_VALIDATION: &str = "VALIDATION_FORM";

/// Payload of the form notification. Serializes as
/// `{"valid": bool, "messages": [string]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormValidationResult {
    pub valid: bool,
    pub messages: Vec<String>,
}

impl FormValidationResult {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Raised on a field after it was validated, valid or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValidationEvent {
    pub field: FieldId,
    pub field_name: String,
    pub valid: bool,
    pub message: String,
    default_prevented: bool,
}

impl FieldValidationEvent {
    pub(crate) fn new(field: FieldId, field_name: String, valid: bool, message: String) -> Self {
        Self {
            field,
            field_name,
            valid,
            message,
            default_prevented: false,
        }
    }

    pub fn event_name(&self) -> &'static str {
        EVENT_VALIDATION
    }

    /// Both notifications bubble from the field to the form.
    pub fn bubbles(&self) -> bool {
        true
    }

    pub fn cancelable(&self) -> bool {
        true
    }

    /// Marks the notification; the validator finishes its work regardless.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Raised on the form after all eligible fields were validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValidationEvent {
    pub detail: FormValidationResult,
    default_prevented: bool,
}

impl FormValidationEvent {
    pub(crate) fn new(detail: FormValidationResult) -> Self {
        Self {
            detail,
            default_prevented: false,
        }
    }

    pub fn event_name(&self) -> &'static str {
        EVENT_FORM_VALIDATION
    }

    pub fn bubbles(&self) -> bool {
        true
    }

    pub fn cancelable(&self) -> bool {
        true
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

pub type Subscriber<E> = Rc<dyn Fn(&mut Form, &mut E)>;

/// Subscribers of one notification kind, invoked synchronously in
/// registration order.
pub(crate) struct SubscriberList<E> {
    entries: RefCell<Vec<(SubscriptionId, Subscriber<E>)>>,
}

impl<E> Default for SubscriberList<E> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
        }
    }
}

impl<E> SubscriberList<E> {
    pub(crate) fn add(&self, id: SubscriptionId, subscriber: Subscriber<E>) {
        self.entries.borrow_mut().push((id, subscriber));
    }

    pub(crate) fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Invokes a snapshot of the subscribers, so a subscriber may subscribe,
    /// unsubscribe or validate again while being notified.
    pub(crate) fn dispatch(&self, form: &mut Form, event: &mut E) {
        let snapshot = self
            .entries
            .borrow()
            .iter()
            .map(|(_, subscriber)| Rc::clone(subscriber))
            .collect::<Vec<_>>();
        for subscriber in snapshot {
            subscriber(form, event);
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct SubscriptionIds {
    next: Cell<u64>,
}

impl SubscriptionIds {
    pub(crate) fn next(&self) -> SubscriptionId {
        let id = self.next.get();
        self.next.set(id + 1);
        SubscriptionId(id)
    }
}
