//! Form widgets shared by every page.

use domain::models::FormErrors;
use shared::html::escape;

pub fn csrf_field(token: &str) -> String {
    format!(
        r#"<input type="hidden" name="csrf_token" value="{}">"#,
        escape(token)
    )
}

fn field_errors(errors: &FormErrors, name: &str) -> String {
    errors
        .get(name)
        .iter()
        .map(|m| format!(r#"<p class="field-error">{}</p>"#, escape(m)))
        .collect()
}

/// Errors that do not belong to a single field, shown above the form.
pub fn non_field_errors(errors: &FormErrors) -> String {
    if errors.non_field().is_empty() {
        return String::new();
    }
    let items: String = errors
        .non_field()
        .iter()
        .map(|m| format!("<li>{}</li>", escape(m)))
        .collect();
    format!(r#"<ul class="form-errors">{}</ul>"#, items)
}

fn row_class(errors: &FormErrors, name: &str) -> &'static str {
    if errors.has(name) {
        "form-row has-error"
    } else {
        "form-row"
    }
}

/// `<input>` with label and inline errors. `kind` is the input type.
pub fn input(kind: &str, name: &str, label: &str, value: &str, errors: &FormErrors) -> String {
    // Browsers never get a password echoed back.
    let value = if kind == "password" { "" } else { value };
    format!(
        r#"<div class="{class}"><label for="id_{name}">{label}</label><input type="{kind}" name="{name}" id="id_{name}" value="{value}">{errors}</div>"#,
        class = row_class(errors, name),
        name = name,
        label = escape(label),
        kind = kind,
        value = escape(value),
        errors = field_errors(errors, name),
    )
}

pub fn textarea(name: &str, label: &str, value: &str, errors: &FormErrors) -> String {
    format!(
        r#"<div class="{class}"><label for="id_{name}">{label}</label><textarea name="{name}" id="id_{name}" rows="5">{value}</textarea>{errors}</div>"#,
        class = row_class(errors, name),
        name = name,
        label = escape(label),
        value = escape(value),
        errors = field_errors(errors, name),
    )
}

/// `<select>`; `options` are `(value, label)` pairs.
pub fn select(
    name: &str,
    label: &str,
    options: &[(String, String)],
    selected: &str,
    errors: &FormErrors,
) -> String {
    let options: String = options
        .iter()
        .map(|(value, text)| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape(value),
                if value == selected { " selected" } else { "" },
                escape(text)
            )
        })
        .collect();
    format!(
        r#"<div class="{class}"><label for="id_{name}">{label}</label><select name="{name}" id="id_{name}"><option value="">---------</option>{options}</select>{errors}</div>"#,
        class = row_class(errors, name),
        name = name,
        label = escape(label),
        options = options,
        errors = field_errors(errors, name),
    )
}

pub fn checkbox(name: &str, label: &str, checked: bool) -> String {
    format!(
        r#"<div class="form-row checkbox"><label><input type="checkbox" name="{name}" value="on"{checked}> {label}</label></div>"#,
        name = name,
        checked = if checked { " checked" } else { "" },
        label = escape(label),
    )
}

/// A one-button form posting to `action`, used for delete/toggle/resend.
pub fn post_button(action: &str, csrf_token: &str, label: &str, class: &str) -> String {
    format!(
        r#"<form method="post" action="{action}" class="inline">{csrf}<button type="submit" class="{class}">{label}</button></form>"#,
        action = escape(action),
        csrf = csrf_field(csrf_token),
        class = class,
        label = escape(label),
    )
}

pub fn money(amount: f64) -> String {
    format!("{:.2}", amount)
}

pub fn date(at: &chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// A calendar day, or an empty string.
pub fn day(d: Option<chrono::NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn datetime(at: &chrono::DateTime<chrono::Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_escapes_value_and_shows_errors() {
        let errors = FormErrors::single("city", "This field is required.");
        let html = input("text", "city", "City", "\"><script>", &errors);
        assert!(html.contains("value=\"&quot;&gt;&lt;script&gt;\""));
        assert!(html.contains("has-error"));
        assert!(html.contains("This field is required."));
    }

    #[test]
    fn test_password_value_never_rendered() {
        let html = input("password", "password", "Password", "hunter22", &FormErrors::new());
        assert!(!html.contains("hunter22"));
    }

    #[test]
    fn test_select_marks_selected() {
        let options = vec![
            ("a".to_string(), "A".to_string()),
            ("b".to_string(), "B".to_string()),
        ];
        let html = select("status", "Status", &options, "b", &FormErrors::new());
        assert!(html.contains(r#"<option value="b" selected>B</option>"#));
        assert!(html.contains(r#"<option value="a">A</option>"#));
    }

    #[test]
    fn test_non_field_errors_empty() {
        assert_eq!(non_field_errors(&FormErrors::new()), "");
        let mut errors = FormErrors::new();
        errors.add_non_field("Bad credentials");
        assert!(non_field_errors(&errors).contains("<li>Bad credentials</li>"));
    }

    #[test]
    fn test_day() {
        assert_eq!(day(chrono::NaiveDate::from_ymd_opt(2025, 3, 7)), "2025-03-07");
        assert_eq!(day(None), "");
    }

    #[test]
    fn test_money() {
        assert_eq!(money(3200.0), "3200.00");
        assert_eq!(money(12.346), "12.35");
    }
}
