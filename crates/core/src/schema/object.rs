use serde_json::{Map, Value};

use super::rule::{FieldRule, type_name};
use super::{FieldError, Location, SchemaError};

/// Ordered set of field rules describing one JSON object.
///
/// Unknown keys are stripped from the normalized output, so a handler only
/// ever sees fields the schema declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSchema {
    fields: Vec<FieldRule>,
}

impl ObjectSchema {
    pub fn new(fields: Vec<FieldRule>) -> Result<Self, SchemaError> {
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name() == field.name()) {
                return Err(SchemaError::DuplicateField(field.name().to_string()));
            }
        }
        Ok(Self { fields })
    }

    /// Derive a schema from a subset of this schema's fields.
    ///
    /// The picked rules are shared verbatim and keep this schema's declaration
    /// order. Naming a field this schema does not declare is an error.
    pub fn pick(&self, names: &[&str]) -> Result<Self, SchemaError> {
        if let Some(unknown) = names.iter().find(|n| self.field(n).is_none()) {
            return Err(SchemaError::UnknownField(unknown.to_string()));
        }

        let fields = self
            .fields
            .iter()
            .filter(|f| names.contains(&f.name()))
            .cloned()
            .collect();
        Ok(Self { fields })
    }

    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(FieldRule::name)
    }

    /// Validate `value` (expected to be an object) found at `location`.
    ///
    /// Errors are appended in field declaration order. The returned map holds
    /// only the declared fields that passed.
    pub fn validate(
        &self,
        location: Location,
        value: &Value,
        errors: &mut Vec<FieldError>,
    ) -> Map<String, Value> {
        let mut out = Map::new();

        let Some(object) = value.as_object() else {
            errors.push(FieldError::new(
                location,
                location.as_str(),
                format!("Expected object, received {}", type_name(value)),
            ));
            return out;
        };

        let coerce_text = location != Location::Body;
        for rule in &self.fields {
            let mut messages = Vec::new();
            let checked = rule.check(object.get(rule.name()), coerce_text, &mut messages);
            errors.extend(
                messages
                    .into_iter()
                    .map(|message| FieldError::new(location, rule.name(), message)),
            );
            if let Some(v) = checked {
                out.insert(rule.name().to_string(), v);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> ObjectSchema {
        ObjectSchema::new(vec![
            FieldRule::string("name").required("Name is required"),
            FieldRule::number("age").nullish(),
            FieldRule::string("secret"),
        ])
        .unwrap()
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let err = ObjectSchema::new(vec![FieldRule::string("a"), FieldRule::number("a")]).unwrap_err();
        assert_eq!(err, SchemaError::DuplicateField("a".into()));
    }

    #[test]
    fn pick_keeps_base_order_and_rules() {
        let picked = person().pick(&["age", "name"]).unwrap();
        assert_eq!(picked.field_names().collect::<Vec<_>>(), vec!["name", "age"]);
        assert_eq!(picked.field("name"), person().field("name"));
        assert!(picked.field("secret").is_none());
    }

    #[test]
    fn pick_unknown_field_fails() {
        let err = person().pick(&["name", "nope"]).unwrap_err();
        assert_eq!(err, SchemaError::UnknownField("nope".into()));
    }

    #[test]
    fn strips_unknown_keys() {
        let mut errors = Vec::new();
        let out = person().validate(
            Location::Body,
            &json!({"name": "Ada", "secret": "s", "admin": true}),
            &mut errors,
        );
        assert!(errors.is_empty());
        assert_eq!(Value::Object(out), json!({"name": "Ada", "secret": "s"}));
    }

    #[test]
    fn non_object_reports_single_error() {
        let mut errors = Vec::new();
        person().validate(Location::Body, &json!([1, 2]), &mut errors);
        assert_eq!(
            errors,
            vec![FieldError::new(Location::Body, "body", "Expected object, received array")]
        );
    }

    #[test]
    fn reports_every_field_in_declaration_order() {
        let mut errors = Vec::new();
        person().validate(Location::Body, &json!({"age": "old"}), &mut errors);
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "age", "secret"]);
    }
}
