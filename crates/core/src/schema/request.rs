use serde_json::{Map, Value};

use super::{FieldError, Location, ObjectSchema, ValidationErrors};

/// Payload schema for a whole request: optional shapes for body, path params
/// and query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSchema {
    pub body: Option<ObjectSchema>,
    pub params: Option<ObjectSchema>,
    pub query: Option<ObjectSchema>,
}

impl RequestSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(mut self, schema: ObjectSchema) -> Self {
        self.body = Some(schema);
        self
    }

    pub fn params(mut self, schema: ObjectSchema) -> Self {
        self.params = Some(schema);
        self
    }

    pub fn query(mut self, schema: ObjectSchema) -> Self {
        self.query = Some(schema);
        self
    }
}

/// The parts of an inbound request a schema is checked against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestData {
    /// Parsed JSON body; `None` when the request carried no body.
    pub body: Option<Value>,
    pub params: Map<String, Value>,
    pub query: Map<String, Value>,
}

/// Normalized data for each part the schema declares.
///
/// A part the schema does not declare is `None` and is left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedRequest {
    pub body: Option<Value>,
    pub params: Option<Map<String, Value>>,
    pub query: Option<Map<String, Value>>,
}

impl ValidatedRequest {
    /// A validated path parameter, when the schema declared it as a string.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.as_ref()?.get(name)?.as_str()
    }
}

/// Validate request data against a schema.
///
/// Every violated field is reported, ordered by location (body, params,
/// query) and then by field declaration order. An absent body is checked as
/// an empty object.
pub fn validate(schema: &RequestSchema, data: &RequestData) -> Result<ValidatedRequest, ValidationErrors> {
    let mut errors: Vec<FieldError> = Vec::new();
    let mut validated = ValidatedRequest::default();

    if let Some(body_schema) = &schema.body {
        let empty = Value::Object(Map::new());
        let body = data.body.as_ref().unwrap_or(&empty);
        let out = body_schema.validate(Location::Body, body, &mut errors);
        validated.body = Some(Value::Object(out));
    }

    if let Some(params_schema) = &schema.params {
        let params = Value::Object(data.params.clone());
        validated.params = Some(params_schema.validate(Location::Params, &params, &mut errors));
    }

    if let Some(query_schema) = &schema.query {
        let query = Value::Object(data.query.clone());
        validated.query = Some(query_schema.validate(Location::Query, &query, &mut errors));
    }

    if errors.is_empty() {
        Ok(validated)
    } else {
        Err(ValidationErrors::new(errors))
    }
}
