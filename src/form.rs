use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::html::{ParsedControl, parse_form_html};
use crate::listeners::{EventTarget, HostEvent, HostEventKind, HostListener, ListenerStore};
use crate::selector::{
    SelectorAttrCondition, SelectorPseudoClass, SelectorStep, parse_selector_groups,
};
use crate::validity::ValidityState;

/// Handle to a field of a [`Form`]. Ids are stable for the life of the form.
///
/// An id is only meaningful to the form that issued it (see the panics
/// section of [`Form`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub(crate) usize);

impl FieldId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlKind {
    Input,
    Textarea,
    Select,
}

impl ControlKind {
    pub fn tag_name(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Textarea => "textarea",
            Self::Select => "select",
        }
    }
}

/// Metadata of a file picked in a file input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SelectOption {
    pub(crate) value: String,
    pub(crate) selected: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) kind: ControlKind,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) value: String,
    pub(crate) checked: bool,
    pub(crate) files: Vec<SelectedFile>,
    pub(crate) options: Vec<SelectOption>,
    pub(crate) fieldset_disabled: bool,
    pub(crate) native_validation: bool,
    pub(crate) custom_validity_message: String,
    pub(crate) legacy_validity: ValidityState,
    pub(crate) legacy_message: String,
}

impl Element {
    fn from_parsed(control: ParsedControl, native_validation: bool) -> Self {
        let ParsedControl {
            kind,
            attrs,
            text,
            options,
            fieldset_disabled,
        } = control;

        let options = options
            .into_iter()
            .map(|option| SelectOption {
                value: option.value.unwrap_or_else(|| option.text.trim().to_string()),
                selected: option.selected,
            })
            .collect::<Vec<_>>();

        let checkable = kind == ControlKind::Input
            && matches!(
                attrs.get("type").map(|t| t.to_ascii_lowercase()).as_deref(),
                Some("checkbox") | Some("radio")
            );

        let value = match kind {
            ControlKind::Input => match attrs.get("value") {
                Some(value) => value.clone(),
                None if checkable => "on".to_string(),
                None => String::new(),
            },
            ControlKind::Textarea => text,
            ControlKind::Select => options
                .iter()
                .rev()
                .find(|option| option.selected)
                .or_else(|| options.first())
                .map(|option| option.value.clone())
                .unwrap_or_default(),
        };

        Self {
            kind,
            checked: checkable && attrs.contains_key("checked"),
            attrs,
            value,
            files: Vec::new(),
            options,
            fieldset_disabled,
            native_validation,
            custom_validity_message: String::new(),
            legacy_validity: ValidityState::valid(),
            legacy_message: String::new(),
        }
    }
}

/// Result of a [`Form::submit`] request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The submit event ran and nobody prevented it.
    Submitted,
    /// A submit listener called `prevent_default`.
    Prevented,
    /// Interactive native validation found an invalid field; no submit
    /// event was dispatched.
    BlockedByConstraints,
}

/// In-memory form document: the host a validator attaches to.
///
/// The form owns its fields and their state. Validators only borrow it for
/// the duration of a call.
///
/// # Panics
///
/// Accessors that take a [`FieldId`] (`value`, `attr`, `set_value`,
/// `validity`, `check_validity` and the rest) panic when the id is out of
/// range for this form. An in-range id from another form names whatever
/// field sits at that position here. Check foreign ids with
/// [`Form::contains`] first.
/// [`Validator::validate_field`](crate::Validator::validate_field) does this
/// itself and returns `false` for them.
#[derive(Debug, Clone, Default)]
pub struct Form {
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) elements: Vec<Element>,
    pub(crate) no_validate: bool,
    pub(crate) native_default: bool,
    pub(crate) listeners: ListenerStore,
}

impl Form {
    /// An empty form whose fields support native constraint validation.
    pub fn new() -> Self {
        Self::with_native_validation(true)
    }

    /// An empty form. `native` decides whether fields added later expose the
    /// native constraint API.
    pub fn with_native_validation(native: bool) -> Self {
        Self {
            native_default: native,
            ..Self::default()
        }
    }

    pub fn from_html(html: &str) -> Result<Self> {
        let mut form = Self::new();
        form.load(html)?;
        Ok(form)
    }

    /// Parses `html` into a form whose fields lack native constraint
    /// validation, so every check runs through the legacy rules.
    pub fn from_html_legacy(html: &str) -> Result<Self> {
        let mut form = Self::with_native_validation(false);
        form.load(html)?;
        Ok(form)
    }

    fn load(&mut self, html: &str) -> Result<()> {
        let parsed = parse_form_html(html)?;
        if let Some(attrs) = parsed.form_attrs {
            self.no_validate = attrs.contains_key("novalidate");
            self.attrs = attrs;
        }
        for control in parsed.controls {
            self.push_control(control);
        }
        Ok(())
    }

    /// Parses `html` and appends its controls after the existing fields.
    pub fn append_html(&mut self, html: &str) -> Result<Vec<FieldId>> {
        let parsed = parse_form_html(html)?;
        Ok(parsed
            .controls
            .into_iter()
            .map(|control| self.push_control(control))
            .collect())
    }

    fn push_control(&mut self, control: ParsedControl) -> FieldId {
        let id = FieldId(self.elements.len());
        self.elements
            .push(Element::from_parsed(control, self.native_default));
        id
    }

    // Indexes directly: an out-of-range id panics, see the type docs.
    pub(crate) fn element(&self, field: FieldId) -> &Element {
        &self.elements[field.0]
    }

    pub(crate) fn element_mut(&mut self, field: FieldId) -> &mut Element {
        &mut self.elements[field.0]
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether `field` is in range for this form and safe to pass to its
    /// accessors.
    pub fn contains(&self, field: FieldId) -> bool {
        field.0 < self.elements.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldId> + '_ {
        (0..self.elements.len()).map(FieldId)
    }

    /// Fields the validator checks, in document order.
    pub fn eligible_fields(&self) -> Vec<FieldId> {
        self.fields()
            .filter(|field| self.is_eligible(*field))
            .collect()
    }

    /// Not `hidden`/`submit`/`reset`, not disabled, not read-only.
    pub fn is_eligible(&self, field: FieldId) -> bool {
        if self.element(field).kind == ControlKind::Input
            && matches!(
                self.input_type(field).as_str(),
                "hidden" | "submit" | "reset"
            )
        {
            return false;
        }
        !self.is_disabled(field) && !self.is_readonly(field)
    }

    pub fn form_attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn no_validate(&self) -> bool {
        self.no_validate
    }

    pub fn set_no_validate(&mut self, no_validate: bool) {
        self.no_validate = no_validate;
        if no_validate {
            self.attrs.insert("novalidate".into(), String::new());
        } else {
            self.attrs.remove("novalidate");
        }
    }

    pub fn kind(&self, field: FieldId) -> ControlKind {
        self.element(field).kind
    }

    pub fn tag_name(&self, field: FieldId) -> &'static str {
        self.element(field).kind.tag_name()
    }

    /// Lower-cased `type`: `text` for inputs without one, `textarea`,
    /// `select-one` or `select-multiple` for the other controls.
    pub fn input_type(&self, field: FieldId) -> String {
        let element = self.element(field);
        match element.kind {
            ControlKind::Input => element
                .attrs
                .get("type")
                .map(|kind| kind.trim().to_ascii_lowercase())
                .filter(|kind| !kind.is_empty())
                .unwrap_or_else(|| "text".to_string()),
            ControlKind::Textarea => "textarea".to_string(),
            ControlKind::Select => {
                if element.attrs.contains_key("multiple") {
                    "select-multiple".to_string()
                } else {
                    "select-one".to_string()
                }
            }
        }
    }

    pub fn name(&self, field: FieldId) -> &str {
        self.attr(field, "name").unwrap_or("")
    }

    pub fn attr(&self, field: FieldId, name: &str) -> Option<&str> {
        self.element(field).attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, field: FieldId, name: &str) -> bool {
        self.element(field).attrs.contains_key(name)
    }

    pub fn set_attribute(&mut self, field: FieldId, name: &str, value: &str) {
        self.element_mut(field)
            .attrs
            .insert(name.to_ascii_lowercase(), value.to_string());
    }

    pub fn remove_attribute(&mut self, field: FieldId, name: &str) -> bool {
        self.element_mut(field)
            .attrs
            .remove(&name.to_ascii_lowercase())
            .is_some()
    }

    pub fn value(&self, field: FieldId) -> &str {
        &self.element(field).value
    }

    /// Sets the value without dispatching events.
    pub fn set_value(&mut self, field: FieldId, value: &str) {
        let element = self.element_mut(field);
        element.value = value.to_string();
        if element.kind == ControlKind::Select {
            for option in &mut element.options {
                option.selected = option.value == value;
            }
        }
    }

    pub fn checked(&self, field: FieldId) -> bool {
        self.element(field).checked
    }

    /// Sets the checked state without dispatching events. Checking a radio
    /// unchecks the other radios of its group.
    pub fn set_checked_state(&mut self, field: FieldId, checked: bool) {
        self.element_mut(field).checked = checked;
        if checked && self.input_type(field) == "radio" {
            let name = self.name(field).to_string();
            if name.is_empty() {
                return;
            }
            for other in self.radio_group(&name) {
                if other != field {
                    self.element_mut(other).checked = false;
                }
            }
        }
    }

    pub(crate) fn radio_group(&self, name: &str) -> Vec<FieldId> {
        self.fields()
            .filter(|field| {
                self.element(*field).kind == ControlKind::Input
                    && self.input_type(*field) == "radio"
                    && self.name(*field) == name
            })
            .collect()
    }

    pub fn files(&self, field: FieldId) -> &[SelectedFile] {
        &self.element(field).files
    }

    pub fn is_checkable(&self, field: FieldId) -> bool {
        self.element(field).kind == ControlKind::Input
            && matches!(self.input_type(field).as_str(), "checkbox" | "radio")
    }

    pub fn is_disabled(&self, field: FieldId) -> bool {
        let element = self.element(field);
        element.fieldset_disabled || element.attrs.contains_key("disabled")
    }

    pub fn is_readonly(&self, field: FieldId) -> bool {
        self.has_attr(field, "readonly")
    }

    pub fn is_required(&self, field: FieldId) -> bool {
        self.has_attr(field, "required")
    }

    /// Whether the field exposes the native constraint validation API.
    pub fn supports_native_validation(&self, field: FieldId) -> bool {
        self.element(field).native_validation
    }

    pub fn set_native_validation(&mut self, field: FieldId, native: bool) {
        self.element_mut(field).native_validation = native;
    }

    pub(crate) fn set_legacy_result(
        &mut self,
        field: FieldId,
        validity: ValidityState,
        message: String,
    ) {
        let element = self.element_mut(field);
        element.legacy_validity = validity;
        element.legacy_message = message;
    }

    pub fn select_one(&self, selector: &str) -> Result<FieldId> {
        let groups = parse_selector_groups(selector)?;
        self.fields()
            .find(|field| groups.iter().any(|step| self.matches_step(*field, step)))
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    pub fn select_all(&self, selector: &str) -> Result<Vec<FieldId>> {
        let groups = parse_selector_groups(selector)?;
        Ok(self
            .fields()
            .filter(|field| groups.iter().any(|step| self.matches_step(*field, step)))
            .collect())
    }

    fn matches_step(&self, field: FieldId, step: &SelectorStep) -> bool {
        if let Some(id) = step.id_only() {
            return self.attr(field, "id") == Some(id);
        }
        if let Some(tag) = &step.tag {
            if tag != self.tag_name(field) {
                return false;
            }
        }
        if let Some(id) = &step.id {
            if self.attr(field, "id") != Some(id.as_str()) {
                return false;
            }
        }
        let attrs_match = step.attrs.iter().all(|condition| match condition {
            SelectorAttrCondition::Exists { key } => self.has_attr(field, key),
            SelectorAttrCondition::Eq { key, value } => {
                self.attr(field, key) == Some(value.as_str())
            }
        });
        if !attrs_match {
            return false;
        }
        step.pseudo_classes.iter().all(|pseudo| match pseudo {
            SelectorPseudoClass::Checked => self.is_checkable(field) && self.checked(field),
            SelectorPseudoClass::Disabled => self.is_disabled(field),
            SelectorPseudoClass::Enabled => !self.is_disabled(field),
            SelectorPseudoClass::Required => self.is_required(field),
            SelectorPseudoClass::Optional => !self.is_required(field),
            SelectorPseudoClass::Readonly => self.is_readonly(field),
            SelectorPseudoClass::Valid => self.validity(field).valid,
            SelectorPseudoClass::Invalid => !self.validity(field).valid,
        })
    }

    /// Registers `listener` and returns the handle needed to remove it.
    pub fn add_listener<F>(
        &mut self,
        target: EventTarget,
        kind: HostEventKind,
        listener: F,
    ) -> HostListener
    where
        F: Fn(&mut Form, &mut HostEvent) + 'static,
    {
        let listener: HostListener = Rc::new(listener);
        self.listeners.add(target, kind, Rc::clone(&listener));
        listener
    }

    pub fn add_shared_listener(
        &mut self,
        target: EventTarget,
        kind: HostEventKind,
        listener: HostListener,
    ) {
        self.listeners.add(target, kind, listener);
    }

    pub fn remove_listener(
        &mut self,
        target: EventTarget,
        kind: HostEventKind,
        listener: &HostListener,
    ) -> bool {
        self.listeners.remove(target, kind, listener)
    }

    pub fn listener_count(&self, target: EventTarget, kind: HostEventKind) -> usize {
        self.listeners.count(target, kind)
    }

    /// Runs the listeners of the event's target, then of the form when the
    /// event bubbles (`blur` does not).
    pub fn dispatch_event(&mut self, mut event: HostEvent) -> HostEvent {
        let target = event.target();
        let kind = event.kind();
        for listener in self.listeners.get(target, kind) {
            listener(self, &mut event);
        }
        if target != EventTarget::Form && kind != HostEventKind::Blur {
            for listener in self.listeners.get(EventTarget::Form, kind) {
                listener(self, &mut event);
            }
        }
        event
    }

    pub fn dispatch(&mut self, target: EventTarget, kind: HostEventKind) -> HostEvent {
        self.dispatch_event(HostEvent::new(kind, target))
    }

    fn is_user_editable(&self, field: FieldId) -> bool {
        !self.is_disabled(field) && !self.is_readonly(field)
    }

    /// Replaces the value of a text-like control and dispatches `input`.
    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let kind = self.input_type(target);
        if self.kind(target) == ControlKind::Select
            || matches!(kind.as_str(), "checkbox" | "radio" | "file")
        {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: format!("{}[type={kind}]", self.tag_name(target)),
            });
        }
        if kind == "hidden" || !self.is_user_editable(target) {
            return Ok(());
        }

        self.set_value(target, text);
        self.dispatch(EventTarget::Field(target), HostEventKind::Input);
        Ok(())
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        if !self.is_checkable(target) {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=checkbox|radio]".into(),
                actual: format!("{}[type={}]", self.tag_name(target), self.input_type(target)),
            });
        }
        if self.is_disabled(target) {
            return Ok(());
        }

        if self.checked(target) != checked {
            self.set_checked_state(target, checked);
            self.dispatch(EventTarget::Field(target), HostEventKind::Input);
            self.dispatch(EventTarget::Field(target), HostEventKind::Change);
        }
        Ok(())
    }

    pub fn select_option(&mut self, selector: &str, value: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.kind(target) != ControlKind::Select {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "select".into(),
                actual: self.tag_name(target).into(),
            });
        }
        if self.is_disabled(target) {
            return Ok(());
        }
        if !self
            .element(target)
            .options
            .iter()
            .any(|option| option.value == value)
        {
            return Err(Error::SelectorNotFound(format!(
                "{selector} option[value={value}]"
            )));
        }

        if self.value(target) != value {
            self.set_value(target, value);
            self.dispatch(EventTarget::Field(target), HostEventKind::Input);
            self.dispatch(EventTarget::Field(target), HostEventKind::Change);
        }
        Ok(())
    }

    pub fn set_files(&mut self, selector: &str, files: Vec<SelectedFile>) -> Result<()> {
        let target = self.select_one(selector)?;
        let kind = self.input_type(target);
        if kind != "file" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=file]".into(),
                actual: format!("{}[type={kind}]", self.tag_name(target)),
            });
        }
        if self.is_disabled(target) {
            return Ok(());
        }

        let element = self.element_mut(target);
        element.value = files
            .first()
            .map(|file| format!("C:\\fakepath\\{}", file.name))
            .unwrap_or_default();
        element.files = files;
        self.dispatch(EventTarget::Field(target), HostEventKind::Input);
        self.dispatch(EventTarget::Field(target), HostEventKind::Change);
        Ok(())
    }

    pub fn blur(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch(EventTarget::Field(target), HostEventKind::Blur);
        Ok(())
    }

    /// Requests submission: interactive native validation first (skipped
    /// when `novalidate` is set), then a cancelable `submit` event.
    pub fn submit(&mut self) -> SubmitOutcome {
        if !self.no_validate {
            let blocked = self
                .fields()
                .filter(|field| self.supports_native_validation(*field))
                .any(|field| !self.check_validity(field));
            if blocked {
                tracing::debug!("submission blocked by native constraint validation");
                return SubmitOutcome::BlockedByConstraints;
            }
        }

        let event = self.dispatch_event(HostEvent::submit());
        if event.default_prevented() {
            SubmitOutcome::Prevented
        } else {
            SubmitOutcome::Submitted
        }
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.value(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                field_snippet: self.field_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_valid(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.validity(target).valid;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                field_snippet: self.field_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_validation_message(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.validation_message(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                field_snippet: self.field_snippet(target),
            });
        }
        Ok(())
    }

    /// Start tag of the field with its attributes in name order.
    pub fn field_snippet(&self, field: FieldId) -> String {
        let element = self.element(field);
        let mut names = element.attrs.keys().collect::<Vec<_>>();
        names.sort();
        let mut out = format!("<{}", element.kind.tag_name());
        for name in names {
            let value = &element.attrs[name];
            if value.is_empty() {
                out.push_str(&format!(" {name}"));
            } else {
                out.push_str(&format!(" {name}=\"{}\"", value.replace('"', "&quot;")));
            }
        }
        out.push('>');
        out
    }
}
