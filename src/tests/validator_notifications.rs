use super::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const SIGNUP_HTML: &str = r#"
    <form id='signup'>
      <input id='name' name='name' required>
      <input id='red' type='radio' name='color' value='red' required>
      <input id='blue' type='radio' name='color' value='blue' required>
      <input id='email' name='email' data-validation-rule='email' value='bad'>
      <input type='hidden' name='token' required>
      <input id='locked' name='locked' required disabled>
    </form>
    "#;

fn record_fields(validator: &Validator) -> Rc<RefCell<Vec<(String, bool, String)>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    validator.on_field_validated(move |_, event| {
        sink.borrow_mut().push((
            event.field_name.clone(),
            event.valid,
            event.message.clone(),
        ));
    });
    seen
}

fn record_forms(validator: &Validator) -> Rc<RefCell<Vec<FormValidationResult>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    validator.on_form_validated(move |_, event| {
        sink.borrow_mut().push(event.detail.clone());
    });
    seen
}

#[test]
fn field_notification_is_raised_for_valid_and_invalid_outcomes() -> Result<()> {
    let mut form = Form::from_html("<input id='a' name='a' required>")?;
    let validator = Validator::attach(&mut form, false);
    let seen = record_fields(&validator);
    let a = form.select_one("#a")?;

    assert!(!validator.validate_field(&mut form, a));
    form.set_value(a, "filled");
    assert!(validator.validate_field(&mut form, a));

    assert_eq!(
        *seen.borrow(),
        vec![
            ("a".to_string(), false, "Please fill out this field.".to_string()),
            ("a".to_string(), true, String::new()),
        ]
    );
    Ok(())
}

#[test]
fn field_notification_carries_name_and_flags() -> Result<()> {
    let mut form = Form::from_html_legacy("<input id='a' name='a' required>")?;
    let validator = Validator::attach(&mut form, false);
    let a = form.select_one("#a")?;
    let checked = Rc::new(Cell::new(false));
    let flag = Rc::clone(&checked);
    validator.on_field_validated(move |_, event| {
        assert_eq!(event.event_name(), Validator::EVENT_VALIDATION);
        assert!(event.bubbles());
        assert!(event.cancelable());
        event.prevent_default();
        assert!(event.default_prevented());
        flag.set(true);
    });

    // Preventing the notification does not change the outcome.
    assert!(!validator.validate_field(&mut form, a));
    assert!(checked.get());
    assert_eq!(form.validation_message(a), "This field is required");
    Ok(())
}

#[test]
fn form_messages_are_deduplicated_by_field_name() -> Result<()> {
    let mut form = Form::from_html_legacy(SIGNUP_HTML)?;
    let validator = Validator::attach(&mut form, false);
    let fields = record_fields(&validator);
    let forms = record_forms(&validator);

    assert!(!validator.validate_form(&mut form, None));

    // Hidden and disabled fields are not validated at all.
    let names = fields
        .borrow()
        .iter()
        .map(|(name, _, _)| name.clone())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["name", "color", "color", "email"]);

    assert_eq!(
        *forms.borrow(),
        vec![FormValidationResult {
            valid: false,
            messages: vec![
                "This field is required".into(),
                "This field is required".into(),
                "Incorrect format".into(),
            ],
        }]
    );
    Ok(())
}

#[test]
fn native_radio_group_reports_once() -> Result<()> {
    let mut form = Form::from_html(SIGNUP_HTML)?;
    let validator = Validator::attach(&mut form, false);
    form.type_text("#name", "Taro")?;
    form.type_text("#email", "taro@example.com")?;

    let result = validator.validate_all(&mut form);
    assert!(!result.valid);
    assert_eq!(result.messages, vec!["Please select one of these options."]);

    form.set_checked("#blue", true)?;
    let result = validator.validate_all(&mut form);
    assert!(result.valid);
    assert!(result.messages.is_empty());
    Ok(())
}

#[test]
fn field_events_precede_the_form_event() -> Result<()> {
    let mut form = Form::from_html("<input id='a' name='a'><input id='b' name='b'>")?;
    let validator = Validator::attach(&mut form, false);
    let order = Rc::new(RefCell::new(Vec::new()));

    let log = Rc::clone(&order);
    validator.on_field_validated(move |_, event| {
        log.borrow_mut().push(event.field_name.clone());
    });
    let log = Rc::clone(&order);
    validator.on_form_validated(move |_, event| {
        assert_eq!(event.event_name(), Validator::EVENT_FORM_VALIDATION);
        log.borrow_mut().push("form".to_string());
    });

    assert!(validator.validate_form(&mut form, None));
    assert_eq!(*order.borrow(), vec!["a", "b", "form"]);
    Ok(())
}

#[test]
fn invalid_form_cancels_the_submit_event() -> Result<()> {
    let mut form = Form::from_html("<input id='a' name='a' required>")?;
    let validator = Validator::attach(&mut form, false);
    let a = form.select_one("#a")?;

    let mut submit = HostEvent::submit();
    assert!(!validator.validate_form(&mut form, Some(&mut submit)));
    assert!(submit.default_prevented());

    form.set_value(a, "ok");
    let mut submit = HostEvent::submit();
    assert!(validator.validate_form(&mut form, Some(&mut submit)));
    assert!(!submit.default_prevented());
    Ok(())
}

#[test]
fn attach_registers_one_submit_listener_and_sets_novalidate() -> Result<()> {
    let mut form = Form::from_html("<form><input id='a' name='a' required></form>")?;
    assert!(!form.no_validate());

    let validator = Validator::attach(&mut form, false);
    assert!(form.no_validate());
    assert_eq!(form.listener_count(EventTarget::Form, HostEventKind::Submit), 1);
    let a = form.select_one("#a")?;
    assert_eq!(form.listener_count(EventTarget::Field(a), HostEventKind::Input), 0);

    assert_eq!(validator.detach(&mut form), 1);
    assert!(!form.no_validate());
    assert_eq!(form.listener_count(EventTarget::Form, HostEventKind::Submit), 0);
    assert_eq!(form.submit(), SubmitOutcome::BlockedByConstraints);
    Ok(())
}

#[test]
fn change_validation_runs_on_input_blur_and_change() -> Result<()> {
    let html = r#"
        <input id='name' name='name' required>
        <input id='agree' type='checkbox' name='agree' required>
        <input id='ro' name='ro' readonly>
        "#;
    let mut form = Form::from_html(html)?;
    let validator = Validator::attach(&mut form, true);
    let seen = record_fields(&validator);

    let ro = form.select_one("#ro")?;
    assert_eq!(form.listener_count(EventTarget::Field(ro), HostEventKind::Input), 0);

    form.type_text("#name", "Taro")?;
    form.blur("#name")?;
    form.set_checked("#agree", true)?;

    let names = seen
        .borrow()
        .iter()
        .map(|(name, valid, _)| (name.clone(), *valid))
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            ("name".to_string(), true),
            ("name".to_string(), true),
            ("agree".to_string(), true),
            ("agree".to_string(), true),
        ]
    );
    Ok(())
}

#[test]
fn enabling_change_validation_twice_validates_twice() -> Result<()> {
    let mut form = Form::from_html("<input id='a' name='a'>")?;
    let validator = Validator::attach(&mut form, false);
    validator.enable_change_validation(&mut form);
    validator.enable_change_validation(&mut form);
    let seen = record_fields(&validator);

    form.type_text("#a", "x")?;
    assert_eq!(seen.borrow().len(), 2);

    // One submit listener plus two sets of three change listeners.
    assert_eq!(validator.detach(&mut form), 7);
    form.type_text("#a", "y")?;
    assert_eq!(seen.borrow().len(), 2);
    Ok(())
}

#[test]
fn idempotent_field_validation() -> Result<()> {
    let mut form = Form::from_html(
        "<input id='e' name='e' data-validation-rule='email' value='bad' title='Use an email'>",
    )?;
    let validator = Validator::attach(&mut form, false);
    let e = form.select_one("#e")?;

    let first = (validator.validate_field(&mut form, e), form.validation_message(e));
    let second = (validator.validate_field(&mut form, e), form.validation_message(e));
    assert_eq!(first, second);
    assert_eq!(first, (false, "Use an email".to_string()));
    Ok(())
}

#[test]
fn unknown_field_id_is_invalid_without_notification() -> Result<()> {
    let mut form = Form::from_html("<input id='a'>")?;
    let other = Form::from_html("<input><input><input id='c'>")?;
    let validator = Validator::attach(&mut form, false);
    let seen = record_fields(&validator);

    let foreign = other.select_one("#c")?;
    assert!(!validator.validate_field(&mut form, foreign));
    assert!(seen.borrow().is_empty());
    Ok(())
}

#[test]
fn subscribers_can_unsubscribe_and_reenter() -> Result<()> {
    let mut form = Form::from_html("<input id='a' name='a' required>")?;
    let validator = Validator::attach(&mut form, false);
    let a = form.select_one("#a")?;
    let calls = Rc::new(Cell::new(0));

    let counter = Rc::clone(&calls);
    let id = validator.on_field_validated(move |_, _| {
        counter.set(counter.get() + 1);
    });
    assert_eq!(validator.subscriber_count(), 1);

    // A form subscriber that validates a field again while being notified.
    let inner = validator.clone();
    let form_id = validator.on_form_validated(move |form, event| {
        if !event.detail.valid {
            inner.validate_field(form, a);
        }
    });

    validator.validate_form(&mut form, None);
    assert_eq!(calls.get(), 2);

    assert!(validator.unsubscribe(id));
    assert!(!validator.unsubscribe(id));
    assert!(validator.unsubscribe(form_id));
    validator.validate_form(&mut form, None);
    assert_eq!(calls.get(), 2);
    assert_eq!(validator.subscriber_count(), 0);
    Ok(())
}

#[test]
fn configured_rules_apply_and_bad_patterns_fail() -> Result<()> {
    let mut form = Form::from_html("<input id='z' name='z' data-validation-rule='zip' value='12'>")?;
    let config = ValidatorConfig::new(false).with_rule("zip", "^[0-9]{5}$");
    let validator = Validator::with_config(&mut form, &config)?;
    let z = form.select_one("#z")?;

    assert!(validator.has_rule("zip"));
    assert!(!validator.validate_field(&mut form, z));
    form.set_value(z, "12345");
    assert!(validator.validate_field(&mut form, z));

    validator.register_rule("zip", "^[0-9]{3}$")?;
    assert!(!validator.validate_field(&mut form, z));

    let mut other = Form::from_html("<input>")?;
    let bad = ValidatorConfig::new(false).with_rule("broken", "[");
    assert!(matches!(
        Validator::with_config(&mut other, &bad),
        Err(Error::InvalidRule { .. })
    ));
    Ok(())
}
