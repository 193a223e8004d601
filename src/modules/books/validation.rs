//! Book payload validation.
//!
//! The body is read leniently first, so a wrong type on one field does not
//! hide constraint violations on the others. Length and range constraints
//! live on [`BookDraft`] and are checked by `validator`.

use serde::Serialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError};

use super::models::BookInput;

/// Order in which violations are reported.
const FIELDS: [&str; 5] = ["title", "author", "genre", "price", "quantity"];

/// One violated constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    /// Stable machine-readable code, e.g. `string_too_short`
    pub error: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(
        field: impl Into<String>,
        error: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Every violation found in a payload, in field order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} invalid field(s)", .violations.len())]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    pub fn single(violation: FieldViolation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    /// Whether `field` has at least one violation
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }

    pub fn to_details(&self) -> Vec<Value> {
        self.violations
            .iter()
            .map(|violation| serde_json::json!(violation))
            .collect()
    }
}

/// Fields of a payload that have the right JSON type. Absent or mistyped
/// fields stay `None` and are skipped by the constraint checks.
#[derive(Debug, Default, Validate)]
struct BookDraft {
    #[validate(length(min = 2, max = 100))]
    title: Option<String>,
    #[validate(length(min = 2, max = 50))]
    author: Option<String>,
    #[validate(length(max = 30))]
    genre: Option<String>,
    #[validate(range(
        exclusive_min = 0.0,
        code = "greater_than",
        message = "Input should be greater than 0"
    ))]
    price: Option<f64>,
    #[validate(range(
        min = 0,
        code = "greater_than_equal",
        message = "Input should be greater than or equal to 0"
    ))]
    quantity: Option<i64>,
}

impl BookDraft {
    fn read(object: &Map<String, Value>, violations: &mut Vec<FieldViolation>) -> Self {
        let title = required(object, "title", violations).and_then(|v| text("title", v, violations));
        let author =
            required(object, "author", violations).and_then(|v| text("author", v, violations));
        let genre = present(object, "genre").and_then(|v| text("genre", v, violations));
        let price = required(object, "price", violations).and_then(|v| number(v, violations));
        let quantity =
            required(object, "quantity", violations).and_then(|v| integer(v, violations));

        Self {
            title,
            author,
            genre,
            price,
            quantity,
        }
    }

    fn text(&self, field: &str) -> Option<&str> {
        match field {
            "title" => self.title.as_deref(),
            "author" => self.author.as_deref(),
            "genre" => self.genre.as_deref(),
            _ => None,
        }
    }
}

/// Validate an inbound payload against the book input shape.
///
/// Unknown fields are ignored. `genre` may be absent or null.
pub fn validate_book_input(payload: &Value) -> Result<BookInput, ValidationErrors> {
    let Some(object) = payload.as_object() else {
        return Err(ValidationErrors::single(FieldViolation::new(
            "body",
            "object_type",
            "Input should be a JSON object",
        )));
    };

    let mut violations = Vec::new();
    let draft = BookDraft::read(object, &mut violations);

    if let Err(errors) = draft.validate() {
        let field_errors = errors.field_errors();
        for field in FIELDS {
            let Some(errors) = field_errors.get(field) else {
                continue;
            };
            violations.extend(errors.iter().map(|error| describe(field, error, &draft)));
        }
    }

    violations.sort_by_key(|violation| FIELDS.iter().position(|f| *f == violation.field));

    match draft {
        BookDraft {
            title: Some(title),
            author: Some(author),
            genre,
            price: Some(price),
            quantity: Some(quantity),
        } if violations.is_empty() => Ok(BookInput {
            title,
            author,
            genre,
            price,
            quantity,
        }),
        _ => Err(ValidationErrors { violations }),
    }
}

/// Translate a `validator` error into the reported violation.
fn describe(field: &str, error: &ValidationError, draft: &BookDraft) -> FieldViolation {
    if error.code == "length" {
        let bound = |name: &str| error.params.get(name).and_then(Value::as_u64);
        let length = draft.text(field).map_or(0, |text| text.chars().count() as u64);

        return match bound("min") {
            Some(min) if length < min => FieldViolation::new(
                field,
                "string_too_short",
                format!("String should have at least {min} characters"),
            ),
            _ => FieldViolation::new(
                field,
                "string_too_long",
                format!(
                    "String should have at most {} characters",
                    bound("max").unwrap_or_default()
                ),
            ),
        };
    }

    let message = error
        .message
        .as_deref()
        .map_or_else(|| error.to_string(), str::to_string);
    FieldViolation::new(field, error.code.as_ref(), message)
}

fn present<'a>(object: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    object.get(field).filter(|value| !value.is_null())
}

fn required<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<&'a Value> {
    let value = present(object, field);
    if value.is_none() {
        violations.push(FieldViolation::new(field, "missing", "Field required"));
    }
    value
}

fn text(field: &str, value: &Value, violations: &mut Vec<FieldViolation>) -> Option<String> {
    let text = value.as_str().map(str::to_string);
    if text.is_none() {
        violations.push(FieldViolation::new(
            field,
            "string_type",
            "Input should be a valid string",
        ));
    }
    text
}

fn number(value: &Value, violations: &mut Vec<FieldViolation>) -> Option<f64> {
    let Some(price) = value.as_f64() else {
        violations.push(FieldViolation::new(
            "price",
            "float_type",
            "Input should be a valid number",
        ));
        return None;
    };

    if !price.is_finite() {
        violations.push(FieldViolation::new(
            "price",
            "finite_number",
            "Input should be a finite number",
        ));
        return None;
    }

    Some(price)
}

fn integer(value: &Value, violations: &mut Vec<FieldViolation>) -> Option<i64> {
    let quantity = integral(value);
    if quantity.is_none() {
        violations.push(FieldViolation::new(
            "quantity",
            "int_type",
            "Input should be a valid integer",
        ));
    }
    quantity
}

/// Integers, plus floats with no fractional part (`3.0`).
fn integral(value: &Value) -> Option<i64> {
    if let Some(integer) = value.as_i64() {
        return Some(integer);
    }

    let float = value.as_f64()?;
    let in_range = float >= i64::MIN as f64 && float < i64::MAX as f64;
    (float.fract() == 0.0 && in_range).then_some(float as i64)
}
