//! Field-level rules: type, presence requirement and refinements.

use serde_json::{Number, Value};

const REQUIRED: &str = "Required";

/// JSON type a field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldType {
    String,
    Number,
    /// A string drawn from a closed set of values.
    Enum(&'static [&'static str]),
}

/// Whether (and how) a field may be left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Requirement {
    /// Must be present; the message is reported when it is absent.
    Required(Option<&'static str>),
    /// May be absent, but `null` is a type error.
    Optional,
    /// May be absent or `null`.
    Nullish,
}

/// Refinement applied to a value once its type checks out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Constraint {
    MinLength { len: usize, message: &'static str },
    MaxLength { len: usize, message: &'static str },
    Email { message: &'static str },
}

/// Declarative rule for one named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRule {
    name: &'static str,
    ty: FieldType,
    requirement: Requirement,
    constraints: Vec<Constraint>,
}

impl FieldRule {
    fn with_type(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            requirement: Requirement::Required(None),
            constraints: Vec::new(),
        }
    }

    /// A required string field.
    pub fn string(name: &'static str) -> Self {
        Self::with_type(name, FieldType::String)
    }

    /// A required number field.
    pub fn number(name: &'static str) -> Self {
        Self::with_type(name, FieldType::Number)
    }

    /// A required field whose value must be one of `values`.
    pub fn one_of(name: &'static str, values: &'static [&'static str]) -> Self {
        Self::with_type(name, FieldType::Enum(values))
    }

    pub fn required(mut self, message: &'static str) -> Self {
        self.requirement = Requirement::Required(Some(message));
        self
    }

    pub fn optional(mut self) -> Self {
        self.requirement = Requirement::Optional;
        self
    }

    pub fn nullish(mut self) -> Self {
        self.requirement = Requirement::Nullish;
        self
    }

    pub fn min_len(mut self, len: usize, message: &'static str) -> Self {
        self.constraints.push(Constraint::MinLength { len, message });
        self
    }

    pub fn max_len(mut self, len: usize, message: &'static str) -> Self {
        self.constraints.push(Constraint::MaxLength { len, message });
        self
    }

    /// Shorthand for `min_len(1, message)`.
    pub fn non_empty(self, message: &'static str) -> Self {
        self.min_len(1, message)
    }

    pub fn email(mut self, message: &'static str) -> Self {
        self.constraints.push(Constraint::Email { message });
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Check a raw value against this rule.
    ///
    /// Every violation is appended to `errors`. Returns the normalized value to
    /// keep, or `None` when the field is absent or invalid. With
    /// `coerce_text`, number fields also accept their decimal text (path and
    /// query values are always strings).
    pub fn check(
        &self,
        raw: Option<&Value>,
        coerce_text: bool,
        errors: &mut Vec<String>,
    ) -> Option<Value> {
        let value = match raw {
            None => {
                if let Requirement::Required(message) = self.requirement {
                    errors.push(message.unwrap_or(REQUIRED).to_string());
                }
                return None;
            }
            Some(Value::Null) if self.requirement == Requirement::Nullish => {
                return Some(Value::Null);
            }
            Some(v) => v,
        };

        match self.ty {
            FieldType::String => {
                let Some(text) = value.as_str() else {
                    errors.push(type_mismatch("string", value));
                    return None;
                };
                let before = errors.len();
                self.refine(text, errors);
                (errors.len() == before).then(|| Value::String(text.to_string()))
            }
            FieldType::Number => match value {
                Value::Number(_) => Some(value.clone()),
                Value::String(text) if coerce_text => match parse_number(text) {
                    Some(n) => Some(Value::Number(n)),
                    None => {
                        errors.push(type_mismatch("number", value));
                        None
                    }
                },
                _ => {
                    errors.push(type_mismatch("number", value));
                    None
                }
            },
            FieldType::Enum(values) => {
                let expected = enum_listing(values);
                match value.as_str() {
                    Some(text) if values.contains(&text) => Some(value.clone()),
                    Some(text) => {
                        errors.push(format!(
                            "Invalid enum value. Expected {expected}, received '{text}'"
                        ));
                        None
                    }
                    None => {
                        errors.push(type_mismatch(&expected, value));
                        None
                    }
                }
            }
        }
    }

    fn refine(&self, text: &str, errors: &mut Vec<String>) {
        let len = text.chars().count();
        for constraint in &self.constraints {
            match *constraint {
                Constraint::MinLength { len: min, message } if len < min => {
                    errors.push(message.to_string());
                }
                Constraint::MaxLength { len: max, message } if len > max => {
                    errors.push(message.to_string());
                }
                Constraint::Email { message } if !is_valid_email(text) => {
                    errors.push(message.to_string());
                }
                _ => {}
            }
        }
    }
}

/// Name of a JSON value's type, as used in mismatch messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn type_mismatch(expected: &str, value: &Value) -> String {
    format!("Expected {expected}, received {}", type_name(value))
}

fn enum_listing(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(i) = text.parse::<i64>() {
        return Some(Number::from(i));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Structural email check: one `@`, non-empty local part, dotted domain.
pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    if !domain.contains('.') {
        return false;
    }

    let valid_local = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');

    local.chars().all(valid_local)
        && domain.chars().all(valid_domain)
        && domain.split('.').all(|part| !part.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(rule: &FieldRule, raw: Option<Value>) -> (Option<Value>, Vec<String>) {
        let mut errors = Vec::new();
        let out = rule.check(raw.as_ref(), false, &mut errors);
        (out, errors)
    }

    #[test]
    fn absent_required_field_reports_its_message() {
        let rule = FieldRule::string("email").required("Email is required");
        let (out, errors) = run(&rule, None);
        assert_eq!(out, None);
        assert_eq!(errors, vec!["Email is required"]);
    }

    #[test]
    fn absent_required_field_without_message_says_required() {
        let (_, errors) = run(&FieldRule::string("jobId"), None);
        assert_eq!(errors, vec!["Required"]);
    }

    #[test]
    fn null_on_required_string_is_a_type_error() {
        let rule = FieldRule::string("lastName").required("Last name is required");
        let (_, errors) = run(&rule, Some(Value::Null));
        assert_eq!(errors, vec!["Expected string, received null"]);
    }

    #[test]
    fn nullish_number_accepts_absent_and_null() {
        let rule = FieldRule::number("age").nullish();
        assert_eq!(run(&rule, None), (None, vec![]));
        assert_eq!(run(&rule, Some(Value::Null)), (Some(Value::Null), vec![]));
        assert_eq!(run(&rule, Some(json!(31))), (Some(json!(31)), vec![]));
    }

    #[test]
    fn nullish_number_rejects_text_in_body() {
        let rule = FieldRule::number("age").nullish();
        let (_, errors) = run(&rule, Some(json!("31")));
        assert_eq!(errors, vec!["Expected number, received string"]);
    }

    #[test]
    fn number_coerces_text_when_asked() {
        let rule = FieldRule::number("page");
        let mut errors = Vec::new();
        let out = rule.check(Some(&json!("12")), true, &mut errors);
        assert_eq!(out, Some(json!(12)));
        assert!(errors.is_empty());

        let out = rule.check(Some(&json!("twelve")), true, &mut errors);
        assert_eq!(out, None);
        assert_eq!(errors, vec!["Expected number, received string"]);
    }

    #[test]
    fn optional_rejects_null() {
        let rule = FieldRule::string("coverLetter").optional();
        assert_eq!(run(&rule, None), (None, vec![]));
        let (_, errors) = run(&rule, Some(Value::Null));
        assert_eq!(errors, vec!["Expected string, received null"]);
    }

    #[test]
    fn enum_membership_is_closed() {
        let rule = FieldRule::one_of("role", &["user", "employer", "admin"]).required("Role is required");
        assert_eq!(run(&rule, Some(json!("employer"))).1, Vec::<String>::new());

        let (_, errors) = run(&rule, Some(json!("superadmin")));
        assert_eq!(
            errors,
            vec!["Invalid enum value. Expected 'user' | 'employer' | 'admin', received 'superadmin'"]
        );

        let (_, errors) = run(&rule, Some(json!(3)));
        assert_eq!(errors, vec!["Expected 'user' | 'employer' | 'admin', received number"]);
    }

    #[test]
    fn all_string_refinements_are_reported() {
        let rule = FieldRule::string("email")
            .min_len(6, "too short")
            .email("Not a valid email");
        let (out, errors) = run(&rule, Some(json!("a@b")));
        assert_eq!(out, None);
        assert_eq!(errors, vec!["too short", "Not a valid email"]);
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let rule = FieldRule::string("password").max_len(6, "too long");
        let (_, errors) = run(&rule, Some(json!("éééééé")));
        assert!(errors.is_empty());
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user+tag@sub.example.com"));
        assert!(!is_valid_email("invalid"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@localhost"));
        assert!(!is_valid_email("a@b@c.com"));
        assert!(!is_valid_email("user@example..com"));
    }
}
