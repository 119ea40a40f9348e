//! Closed-world structural validation of curated request bodies.
//!
//! Each body is described by a static [`Shape`]: a field table plus a
//! "require at least one field" flag. [`validate`] checks a candidate JSON
//! object against the table and reports every violation at once.

use serde_json::{Map, Value};

use crate::error::CliError;

mod shapes;

pub use shapes::{
    CAMPAIGN_CREATE, CAMPAIGN_LEAD_UPDATE, CAMPAIGN_LEADS_ADD, CAMPAIGN_LEADS_ADD_SETTINGS,
    CAMPAIGN_SCHEDULE, CAMPAIGN_UPDATE, CAMPAIGN_WEBHOOK_UPSERT, OUT_OF_OFFICE_SETTINGS,
};

/// Curated body variants, one per modeled endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    CampaignCreate,
    CampaignUpdate,
    CampaignSchedule,
    CampaignLeadsAdd,
    CampaignLeadUpdate,
    CampaignWebhookUpsert,
}

impl BodyKind {
    #[must_use]
    pub fn shape(self) -> &'static Shape {
        match self {
            Self::CampaignCreate => &CAMPAIGN_CREATE,
            Self::CampaignUpdate => &CAMPAIGN_UPDATE,
            Self::CampaignSchedule => &CAMPAIGN_SCHEDULE,
            Self::CampaignLeadsAdd => &CAMPAIGN_LEADS_ADD,
            Self::CampaignLeadUpdate => &CAMPAIGN_LEAD_UPDATE,
            Self::CampaignWebhookUpsert => &CAMPAIGN_WEBHOOK_UPSERT,
        }
    }
}

#[derive(Debug)]
pub struct Shape {
    pub label: &'static str,
    pub fields: &'static [FieldSpec],
    pub require_any: bool,
}

impl Shape {
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.name)
    }

    fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    Str,
    Int,
    Bool,
    /// String, integer or float.
    StrOrNumber,
    /// Free-form JSON object.
    Object,
    StrList,
    IntList,
    Nested(&'static Shape),
    NestedList(&'static Shape),
}

/// Constraint applied after a field passes its type check.
#[derive(Debug, Clone, Copy)]
pub enum FieldCheck {
    NonEmpty,
    ElementsInRange { min: i64, max: i64 },
    ElementsHaveEmail,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub check: Option<FieldCheck>,
}

impl FieldSpec {
    #[must_use]
    pub const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: false,
            min: None,
            max: None,
            check: None,
        }
    }

    #[must_use]
    pub const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            required: true,
            ..Self::optional(name, ty)
        }
    }

    #[must_use]
    pub const fn at_least(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    #[must_use]
    pub const fn between(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    #[must_use]
    pub const fn check(mut self, check: FieldCheck) -> Self {
        self.check = Some(check);
        self
    }
}

/// One failed constraint. `loc` is a dotted path, empty for whole-body rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub loc: String,
    pub message: String,
}

impl Violation {
    fn new(loc: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            message: message.into(),
        }
    }
}

/// A candidate body that passed validation. The body is kept exactly as
/// supplied, explicit `null`s included.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBody {
    kind: BodyKind,
    body: Map<String, Value>,
}

impl ValidatedBody {
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.body)
    }

    /// Field projection without unset (`null`) fields.
    #[must_use]
    pub fn projection(&self) -> Value {
        Value::Object(project(self.kind.shape(), &self.body))
    }
}

/// Validate `candidate` against the shape for `kind`.
pub fn validate(kind: BodyKind, candidate: &Value) -> Result<ValidatedBody, CliError> {
    let shape = kind.shape();
    check_shape(shape, candidate)?;
    let body = candidate.as_object().cloned().unwrap_or_default();
    Ok(ValidatedBody { kind, body })
}

/// Validate against any shape, nested ones included, reporting under the
/// shape's own label.
pub fn check_shape(shape: &Shape, candidate: &Value) -> Result<(), CliError> {
    let violations = violations(shape, candidate);
    if violations.is_empty() {
        return Ok(());
    }
    let joined = violations
        .iter()
        .map(|violation| {
            if violation.loc.is_empty() {
                violation.message.clone()
            } else {
                format!("{}: {}", violation.loc, violation.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ");
    Err(CliError::validation(format!(
        "{} failed validation ({joined})",
        shape.label
    )))
}

/// Every violation of `shape` by `candidate`, in field-table order followed
/// by unknown keys in input order.
#[must_use]
pub fn violations(shape: &Shape, candidate: &Value) -> Vec<Violation> {
    let mut out = Vec::new();
    collect(shape, candidate, "", &mut out);
    out
}

/// Shallow merge: keys from `patch` replace keys from `base`.
#[must_use]
pub fn merge_objects(base: &Map<String, Value>, patch: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

fn collect(shape: &Shape, candidate: &Value, prefix: &str, out: &mut Vec<Violation>) {
    let Some(object) = candidate.as_object() else {
        out.push(Violation::new(prefix, "Input should be a valid dictionary"));
        return;
    };

    let before = out.len();
    for field in shape.fields {
        let loc = join_loc(prefix, field.name);
        match object.get(field.name) {
            None if field.required => out.push(Violation::new(loc, "Field required")),
            None => {}
            Some(Value::Null) if !field.required => {}
            Some(value) => check_field(field, value, &loc, out),
        }
    }
    for key in object.keys() {
        if shape.field(key).is_none() {
            out.push(Violation::new(
                join_loc(prefix, key),
                "Extra inputs are not permitted",
            ));
        }
    }

    if out.len() == before
        && shape.require_any
        && !object.iter().any(|(key, value)| {
            !value.is_null() && shape.field(key).is_some()
        })
    {
        out.push(Violation::new(
            prefix,
            format!("{} must include at least one field", shape.label),
        ));
    }
}

fn check_field(field: &FieldSpec, value: &Value, loc: &str, out: &mut Vec<Violation>) {
    let before = out.len();
    match field.ty {
        FieldType::Str => expect_str(value, loc, out),
        FieldType::Int => {
            if let Some(number) = expect_int(value, loc, out) {
                check_bounds(field, number, loc, out);
            }
        }
        FieldType::Bool => {
            if !value.is_boolean() {
                out.push(Violation::new(loc, "Input should be a valid boolean"));
            }
        }
        FieldType::StrOrNumber => {
            if !(value.is_string() || value.is_number()) {
                out.push(Violation::new(loc, "Input should be a valid string or number"));
            }
        }
        FieldType::Object => {
            if !value.is_object() {
                out.push(Violation::new(loc, "Input should be a valid dictionary"));
            }
        }
        FieldType::StrList => {
            if let Some(items) = expect_list(value, loc, out) {
                for (index, item) in items.iter().enumerate() {
                    expect_str(item, &join_loc(loc, &index.to_string()), out);
                }
            }
        }
        FieldType::IntList => {
            if let Some(items) = expect_list(value, loc, out) {
                for (index, item) in items.iter().enumerate() {
                    expect_int(item, &join_loc(loc, &index.to_string()), out);
                }
            }
        }
        FieldType::Nested(shape) => collect(shape, value, loc, out),
        FieldType::NestedList(shape) => {
            if let Some(items) = expect_list(value, loc, out) {
                for (index, item) in items.iter().enumerate() {
                    collect(shape, item, &join_loc(loc, &index.to_string()), out);
                }
            }
        }
    }

    if out.len() == before
        && let Some(check) = field.check
        && let Some(message) = run_check(field.name, check, value)
    {
        out.push(Violation::new(loc, message));
    }
}

fn run_check(name: &str, check: FieldCheck, value: &Value) -> Option<String> {
    let items = value.as_array()?;
    match check {
        FieldCheck::NonEmpty => items
            .is_empty()
            .then(|| format!("{name} must not be empty")),
        FieldCheck::ElementsInRange { min, max } => items.iter().enumerate().find_map(|(i, item)| {
            let day = item.as_i64()?;
            (day < min || day > max).then(|| format!("{name}[{i}] must be {min}..{max}"))
        }),
        FieldCheck::ElementsHaveEmail => {
            if items.is_empty() {
                return Some(format!("{name} must not be empty"));
            }
            items.iter().enumerate().find_map(|(i, item)| {
                let missing = match item.get("email") {
                    None | Some(Value::Null) => true,
                    Some(Value::String(email)) => email.is_empty(),
                    Some(_) => false,
                };
                missing.then(|| format!("{name}[{i}].email is required"))
            })
        }
    }
}

fn expect_str(value: &Value, loc: &str, out: &mut Vec<Violation>) {
    if !value.is_string() {
        out.push(Violation::new(loc, "Input should be a valid string"));
    }
}

fn expect_int(value: &Value, loc: &str, out: &mut Vec<Violation>) -> Option<i64> {
    let number = value.as_i64();
    if number.is_none() {
        out.push(Violation::new(loc, "Input should be a valid integer"));
    }
    number
}

fn expect_list<'a>(value: &'a Value, loc: &str, out: &mut Vec<Violation>) -> Option<&'a [Value]> {
    let items = value.as_array().map(Vec::as_slice);
    if items.is_none() {
        out.push(Violation::new(loc, "Input should be a valid list"));
    }
    items
}

fn check_bounds(field: &FieldSpec, number: i64, loc: &str, out: &mut Vec<Violation>) {
    if let Some(min) = field.min
        && number < min
    {
        out.push(Violation::new(
            loc,
            format!("Input should be greater than or equal to {min}"),
        ));
    }
    if let Some(max) = field.max
        && number > max
    {
        out.push(Violation::new(
            loc,
            format!("Input should be less than or equal to {max}"),
        ));
    }
}

fn project(shape: &Shape, body: &Map<String, Value>) -> Map<String, Value> {
    body.iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let projected = match (shape.field(key).map(|field| field.ty), value) {
                (Some(FieldType::Nested(nested)), Value::Object(inner)) => {
                    Value::Object(project(nested, inner))
                }
                (Some(FieldType::NestedList(nested)), Value::Array(items)) => Value::Array(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::Object(inner) => Value::Object(project(nested, inner)),
                            other => other.clone(),
                        })
                        .collect(),
                ),
                _ => value.clone(),
            };
            (key.clone(), projected)
        })
        .collect()
}

fn join_loc(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}
