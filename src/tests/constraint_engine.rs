use super::*;

fn message_of(html: &str) -> Result<String> {
    let form = Form::from_html(html)?;
    let field = form.select_one("#f")?;
    Ok(form.validation_message(field))
}

#[test]
fn required_wording_depends_on_the_control() -> Result<()> {
    assert_eq!(
        message_of("<input id='f' required>")?,
        "Please fill out this field."
    );
    assert_eq!(
        message_of("<input id='f' type='checkbox' required>")?,
        "Please check this box if you want to proceed."
    );
    assert_eq!(
        message_of("<input id='f' type='radio' name='r' required>")?,
        "Please select one of these options."
    );
    assert_eq!(
        message_of("<input id='f' type='file' required>")?,
        "Please select a file."
    );
    assert_eq!(
        message_of("<select id='f' required><option value=''>Pick</option></select>")?,
        "Please select an item in the list."
    );
    assert_eq!(
        message_of("<textarea id='f' required></textarea>")?,
        "Please fill out this field."
    );
    Ok(())
}

#[test]
fn type_mismatch_for_email_and_url() -> Result<()> {
    assert_eq!(
        message_of("<input id='f' type='email' value='nope'>")?,
        "Please enter an email address."
    );
    assert_eq!(message_of("<input id='f' type='email' value='a@b.co'>")?, "");
    assert_eq!(
        message_of("<input id='f' type='url' value='example'>")?,
        "Please enter a URL."
    );
    assert_eq!(
        message_of("<input id='f' type='url' value='https://example.com'>")?,
        ""
    );
    Ok(())
}

#[test]
fn pattern_attribute_is_anchored() -> Result<()> {
    let form = Form::from_html("<input id='f' pattern='[0-9]{3}' value='1234'>")?;
    let f = form.select_one("#f")?;
    assert!(form.validity(f).pattern_mismatch);
    assert_eq!(
        form.validation_message(f),
        "Please match the requested format."
    );

    let form = Form::from_html("<input id='f' pattern='a|b' value='a'>")?;
    assert!(form.check_validity(form.select_one("#f")?));
    Ok(())
}

#[test]
fn max_length_wording_reports_the_current_length() -> Result<()> {
    assert_eq!(
        message_of("<textarea id='f' maxlength='2'>abc</textarea>")?,
        "Please shorten this text to 2 characters or less (you are currently using 3 characters)."
    );
    Ok(())
}

#[test]
fn min_length_is_not_a_native_constraint() -> Result<()> {
    let form = Form::from_html("<input id='f' minlength='4' value='ab'>")?;
    let f = form.select_one("#f")?;
    assert!(!form.validity(f).too_short);
    assert!(form.check_validity(f));
    assert_eq!(form.validation_message(f), "");
    Ok(())
}

#[test]
fn number_inputs_check_bad_input_range_and_step() -> Result<()> {
    assert_eq!(
        message_of("<input id='f' type='number' value='abc'>")?,
        "Please enter a number."
    );
    assert_eq!(
        message_of("<input id='f' type='number' min='10' value='3'>")?,
        "Value must be greater than or equal to 10."
    );
    assert_eq!(
        message_of("<input id='f' type='number' max='10' value='30'>")?,
        "Value must be less than or equal to 10."
    );
    assert_eq!(
        message_of("<input id='f' type='number' min='0' value='1.5'>")?,
        "Please enter a valid value."
    );
    assert_eq!(
        message_of("<input id='f' type='number' min='0' step='any' value='1.5'>")?,
        ""
    );
    assert_eq!(
        message_of("<input id='f' type='number' min='0' step='0.5' value='1.5'>")?,
        ""
    );
    Ok(())
}

#[test]
fn radio_group_is_satisfied_by_any_checked_member() -> Result<()> {
    let html = r#"
        <input id='red' type='radio' name='color' value='red' required>
        <input id='blue' type='radio' name='color' value='blue'>
        "#;
    let mut form = Form::from_html(html)?;
    let red = form.select_one("#red")?;
    let blue = form.select_one("#blue")?;

    assert!(!form.check_validity(red));
    form.set_checked("#blue", true)?;
    assert!(form.check_validity(red));
    assert!(form.checked(blue));

    form.set_checked("#red", true)?;
    assert!(!form.checked(blue));
    Ok(())
}

#[test]
fn disabled_and_readonly_fields_are_barred_from_validation() -> Result<()> {
    let html = r#"
        <input id='d' required disabled>
        <input id='r' required readonly>
        <fieldset disabled><input id='nested' required></fieldset>
        <input id='h' type='hidden' required>
        "#;
    let form = Form::from_html(html)?;
    for selector in ["#d", "#r", "#nested", "#h"] {
        let field = form.select_one(selector)?;
        assert!(!form.will_validate(field), "{selector} should not validate");
        assert!(form.check_validity(field), "{selector} should be valid");
    }
    Ok(())
}

#[test]
fn custom_validity_marks_the_field_invalid() -> Result<()> {
    let mut form = Form::from_html("<input id='f' value='x'>")?;
    let f = form.select_one("#f")?;

    form.set_custom_validity(f, "Already taken");
    let validity = form.validity(f);
    assert!(validity.custom_error);
    assert!(!validity.valid);
    assert_eq!(form.validation_message(f), "Already taken");

    form.set_custom_validity(f, "");
    assert!(form.check_validity(f));
    assert_eq!(
        form.validation_result(f),
        ValidationResult {
            valid: true,
            message: String::new(),
        }
    );
    Ok(())
}

#[test]
fn legacy_fields_expose_the_shadow_record() -> Result<()> {
    let form = Form::from_html_legacy("<input id='f' required>")?;
    let f = form.select_one("#f")?;

    // Nothing has checked the field yet.
    assert!(!form.supports_native_validation(f));
    assert!(form.check_validity(f));
    assert_eq!(form.validation_message(f), "");
    Ok(())
}
