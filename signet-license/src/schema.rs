//! Typed validation of license features and metadata.
//!
//! A [`Schema`] describes what a well-formed license for an application
//! looks like: which feature and metadata fields exist, their JSON types,
//! and per-field constraints. Validation never short-circuits inside a
//! section; every violated constraint is collected so a license with
//! three bad fields reports all three.

use std::collections::BTreeMap;
use std::fmt;

use regex_lite::Regex;
use serde_json::{Map, Value};

use crate::license::License;

/// JSON type a field must carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    /// Whole number (JSON number with no fractional part).
    Integer,
    /// Any JSON number.
    Number,
    Boolean,
    Array,
    Object,
    /// No type constraint.
    Any,
}

impl FieldType {
    fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Any => true,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Any => "any",
        }
    }
}

/// A single constraint on a field's value.
///
/// Validators only run once the value has the declared type; a type
/// mismatch reports one error rather than a cascade.
#[derive(Debug, Clone)]
pub enum FieldValidator {
    /// String length bounds, inclusive.
    Length { min: Option<usize>, max: Option<usize> },
    /// Full-match regular expression over a string value.
    Pattern(String),
    /// Numeric bounds, inclusive unless the exclusive flag is set.
    Range {
        min: Option<f64>,
        max: Option<f64>,
        exclusive_min: bool,
        exclusive_max: bool,
    },
    /// Array length bounds and an optional per-item validator.
    Items {
        min_len: Option<usize>,
        max_len: Option<usize>,
        each: Option<Box<SchemaField>>,
    },
    /// Nested object validated against its own section schema.
    Nested(SectionSchema),
}

impl FieldValidator {
    fn check(&self, value: &Value, errors: &mut Vec<String>) {
        match self {
            Self::Length { min, max } => {
                let Some(s) = value.as_str() else { return };
                let len = s.chars().count();
                if let Some(min) = min {
                    if len < *min {
                        errors.push(format!("length {len} is below minimum {min}"));
                    }
                }
                if let Some(max) = max {
                    if len > *max {
                        errors.push(format!("length {len} exceeds maximum {max}"));
                    }
                }
            }
            Self::Pattern(pattern) => {
                let Some(s) = value.as_str() else { return };
                match Regex::new(&format!("^(?:{pattern})$")) {
                    Ok(re) => {
                        if !re.is_match(s) {
                            errors.push(format!("value does not match pattern {pattern}"));
                        }
                    }
                    Err(_) => errors.push(format!("invalid pattern {pattern}")),
                }
            }
            Self::Range {
                min,
                max,
                exclusive_min,
                exclusive_max,
            } => {
                let Some(n) = value.as_f64() else { return };
                if let Some(min) = min {
                    let bad = if *exclusive_min { n <= *min } else { n < *min };
                    if bad {
                        errors.push(format!("value {n} is below minimum {min}"));
                    }
                }
                if let Some(max) = max {
                    let bad = if *exclusive_max { n >= *max } else { n > *max };
                    if bad {
                        errors.push(format!("value {n} exceeds maximum {max}"));
                    }
                }
            }
            Self::Items { min_len, max_len, each } => {
                let Some(items) = value.as_array() else { return };
                if let Some(min) = min_len {
                    if items.len() < *min {
                        errors.push(format!("array has {} items, need at least {min}", items.len()));
                    }
                }
                if let Some(max) = max_len {
                    if items.len() > *max {
                        errors.push(format!("array has {} items, allowed at most {max}", items.len()));
                    }
                }
                if let Some(field) = each {
                    for (index, item) in items.iter().enumerate() {
                        for message in field.check(item) {
                            errors.push(format!("item {index}: {message}"));
                        }
                    }
                }
            }
            Self::Nested(section) => {
                let Some(map) = value.as_object() else { return };
                for (key, messages) in section.validate(map) {
                    for message in messages {
                        errors.push(format!("{key}: {message}"));
                    }
                }
            }
        }
    }
}

/// Declaration of a single field: its type, whether it must be present,
/// and any value constraints.
#[derive(Debug, Clone)]
pub struct SchemaField {
    field_type: FieldType,
    required: bool,
    validators: Vec<FieldValidator>,
}

impl SchemaField {
    /// An optional field of the given type with no constraints.
    #[must_use]
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            validators: Vec::new(),
        }
    }

    /// Marks the field as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Adds a value constraint.
    #[must_use]
    pub fn with(mut self, validator: FieldValidator) -> Self {
        self.validators.push(validator);
        self
    }

    fn check(&self, value: &Value) -> Vec<String> {
        if !self.field_type.matches(value) {
            return vec![format!(
                "expected {}, got {}",
                self.field_type.name(),
                json_type_name(value)
            )];
        }
        let mut errors = Vec::new();
        for validator in &self.validators {
            validator.check(value, &mut errors);
        }
        errors
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Schema for one section of a license (features or metadata).
#[derive(Debug, Clone, Default)]
pub struct SectionSchema {
    fields: BTreeMap<String, SchemaField>,
    allow_unknown: bool,
}

impl SectionSchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: SchemaField) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Permits fields not declared in the schema. By default unknown
    /// fields are rejected.
    #[must_use]
    pub fn allow_unknown(mut self) -> Self {
        self.allow_unknown = true;
        self
    }

    /// Validates a map against this section, collecting every error keyed
    /// by field name.
    #[must_use]
    pub fn validate(&self, map: &Map<String, Value>) -> BTreeMap<String, Vec<String>> {
        let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (name, field) in &self.fields {
            match map.get(name) {
                Some(value) => {
                    let messages = field.check(value);
                    if !messages.is_empty() {
                        errors.insert(name.clone(), messages);
                    }
                }
                None if field.required => {
                    errors.insert(name.clone(), vec!["required field is missing".to_string()]);
                }
                None => {}
            }
        }

        if !self.allow_unknown {
            for name in map.keys() {
                if !self.fields.contains_key(name) {
                    errors
                        .entry(name.clone())
                        .or_default()
                        .push("unknown field".to_string());
                }
            }
        }

        errors
    }
}

/// Full license schema: one section for features, one for metadata.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub features: SectionSchema,
    pub metadata: SectionSchema,
}

impl Schema {
    /// Starts a fluent schema build.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Validates a license's features and metadata.
    ///
    /// Absent metadata is validated as an empty map, so a schema with a
    /// required metadata field rejects a license without metadata.
    #[must_use]
    pub fn validate_license(&self, license: &License) -> SchemaValidationResult {
        let empty = Map::new();
        let metadata = license.metadata.as_ref().unwrap_or(&empty);

        let mut errors = BTreeMap::new();
        let feature_errors = self.features.validate(&license.features);
        if !feature_errors.is_empty() {
            errors.insert("features".to_string(), feature_errors);
        }
        let metadata_errors = self.metadata.validate(metadata);
        if !metadata_errors.is_empty() {
            errors.insert("metadata".to_string(), metadata_errors);
        }
        SchemaValidationResult { errors }
    }
}

/// Fluent construction of a [`Schema`].
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    features: SectionSchema,
    metadata: SectionSchema,
}

impl SchemaBuilder {
    /// Declares a feature field.
    #[must_use]
    pub fn feature(mut self, name: impl Into<String>, field: SchemaField) -> Self {
        self.features.fields.insert(name.into(), field);
        self
    }

    /// Declares a metadata field.
    #[must_use]
    pub fn metadata(mut self, name: impl Into<String>, field: SchemaField) -> Self {
        self.metadata.fields.insert(name.into(), field);
        self
    }

    /// Permits undeclared feature fields.
    #[must_use]
    pub fn allow_unknown_features(mut self) -> Self {
        self.features.allow_unknown = true;
        self
    }

    /// Permits undeclared metadata fields.
    #[must_use]
    pub fn allow_unknown_metadata(mut self) -> Self {
        self.metadata.allow_unknown = true;
        self
    }

    #[must_use]
    pub fn build(self) -> Schema {
        Schema {
            features: self.features,
            metadata: self.metadata,
        }
    }
}

/// Every schema violation found in a license, keyed section → field →
/// messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaValidationResult {
    pub errors: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl SchemaValidationResult {
    /// True when no violations were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Violations for one section, if any.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&BTreeMap<String, Vec<String>>> {
        self.errors.get(name)
    }
}

impl fmt::Display for SchemaValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return f.write_str("no violations");
        }
        let mut first = true;
        for (section, fields) in &self.errors {
            for (field, messages) in fields {
                for message in messages {
                    if !first {
                        f.write_str("; ")?;
                    }
                    write!(f, "{section}.{field}: {message}")?;
                    first = false;
                }
            }
        }
        Ok(())
    }
}
