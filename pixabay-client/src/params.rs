//! Query parameter registry
//!
//! Central catalog of every canonical query key the API understands, the
//! kind of value it carries and the rule used to validate and coerce it.
//! Rendering a search through [`validate_all`] is the single point where
//! outbound parameters are checked before a request is sent.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use crate::enums::{Category, Color, ImageType, Language, Order, Orientation, Param, VideoType};
use crate::error::PixabayError;

/// Maximum length of the free-text query, in characters.
pub const QUERY_MAX_CHARS: usize = 100;
/// Smallest accepted `per_page` value.
pub const PER_PAGE_MIN: u64 = 3;
/// Largest accepted `per_page` value.
pub const PER_PAGE_MAX: u64 = 100;

// Pattern is a compile-time constant; Regex::new cannot fail on it.
static RE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("invalid digits regex"));

/// Semantic type of a query parameter, with its validation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Free text limited to `max_chars` characters.
    Text { max_chars: usize },
    /// Exactly one member of a token set.
    OneOf(&'static [&'static str]),
    /// Comma-joined members of a token set.
    ListOf(&'static [&'static str]),
    /// A literal boolean.
    Flag,
    /// A non-negative integer, optionally bounded.
    Count { min: u64, max: Option<u64> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub param: Param,
    pub kind: ParamKind,
}

static REGISTRY: LazyLock<HashMap<&'static str, ParamDescriptor>> = LazyLock::new(|| {
    Param::ALL
        .iter()
        .map(|&param| {
            let kind = match param {
                Param::Q => ParamKind::Text { max_chars: QUERY_MAX_CHARS },
                Param::Lang => ParamKind::OneOf(Language::TOKENS),
                Param::ImageType => ParamKind::OneOf(ImageType::TOKENS),
                Param::VideoType => ParamKind::OneOf(VideoType::TOKENS),
                Param::Orientation => ParamKind::OneOf(Orientation::TOKENS),
                Param::Category => ParamKind::OneOf(Category::TOKENS),
                Param::Order => ParamKind::OneOf(Order::TOKENS),
                Param::Colors => ParamKind::ListOf(Color::TOKENS),
                Param::EditorsChoice | Param::SafeSearch => ParamKind::Flag,
                Param::MinWidth | Param::MinHeight | Param::Page => ParamKind::Count { min: 0, max: None },
                Param::PerPage => ParamKind::Count {
                    min: PER_PAGE_MIN,
                    max: Some(PER_PAGE_MAX),
                },
            };
            (param.as_str(), ParamDescriptor { param, kind })
        })
        .collect()
});

/// Look up the descriptor of a canonical key.
#[must_use]
pub fn descriptor(name: &str) -> Option<&'static ParamDescriptor> {
    REGISTRY.get(name)
}

/// A validated, server-shaped parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Integer(u64),
    Boolean(bool),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// Canonical outbound parameter mapping, in definition order.
pub type QueryMap = IndexMap<Param, ParamValue>;

/// Validate one raw value against the rule registered for `name` and
/// return its coerced form.
pub fn validate_and_coerce(name: &str, value: &Value) -> Result<ParamValue, PixabayError> {
    let descriptor =
        descriptor(name).ok_or_else(|| PixabayError::UnsupportedParameter(name.to_string()))?;

    match descriptor.kind {
        ParamKind::Text { max_chars } => {
            let text = text_of(name, value)?;
            if text.chars().count() > max_chars {
                return Err(PixabayError::invalid_value(
                    name,
                    text,
                    format!("Cannot contain more than {max_chars} characters"),
                ));
            }
            Ok(ParamValue::Text(text))
        }
        ParamKind::OneOf(supported) => {
            let token = value.as_str().unwrap_or_default();
            if value.is_string() && supported.contains(&token) {
                Ok(ParamValue::Text(token.to_string()))
            } else {
                Err(not_supported(name, value, supported))
            }
        }
        ParamKind::ListOf(supported) => {
            let Some(list) = value.as_str() else {
                return Err(not_supported(name, value, supported));
            };
            if list.split(',').all(|token| supported.contains(&token)) {
                Ok(ParamValue::Text(list.to_string()))
            } else {
                Err(not_supported(name, value, supported))
            }
        }
        ParamKind::Flag => value
            .as_bool()
            .map(ParamValue::Boolean)
            .ok_or_else(|| PixabayError::invalid_value(name, display_value(value), "Supported values are: false, true")),
        ParamKind::Count { min, max } => {
            let expected = match max {
                Some(max) => format!("Must be an integer between {min} and {max} (inclusive)"),
                None => "Must be a non-negative integer".to_string(),
            };
            let count = count_of(value)
                .filter(|n| *n >= min && max.map_or(true, |max| *n <= max))
                .ok_or_else(|| PixabayError::invalid_value(name, display_value(value), expected))?;
            Ok(ParamValue::Integer(count))
        }
    }
}

/// Validate a whole mapping. Either every entry passes and the coerced
/// mapping is returned, or the first failure is.
pub fn validate_all<I, K>(params: I) -> Result<QueryMap, PixabayError>
where
    I: IntoIterator<Item = (K, Value)>,
    K: AsRef<str>,
{
    params
        .into_iter()
        .map(|(name, value)| {
            let name = name.as_ref();
            let coerced = validate_and_coerce(name, &value)?;
            let param = descriptor(name)
                .map(|d| d.param)
                .ok_or_else(|| PixabayError::UnsupportedParameter(name.to_string()))?;
            Ok((param, coerced))
        })
        .collect()
}

/// String coercion used by free-text parameters.
fn text_of(name: &str, value: &Value) -> Result<String, PixabayError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(PixabayError::invalid_value(name, other.to_string(), "Must be a string")),
    }
}

/// Integer coercion: unsigned JSON integers, or strings made only of digits.
fn count_of(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) if RE_DIGITS.is_match(s) => s.parse().ok(),
        _ => None,
    }
}

fn not_supported(name: &str, value: &Value, supported: &[&str]) -> PixabayError {
    PixabayError::invalid_value(
        name,
        display_value(value),
        format!("Supported values are: {}", supported.join(", ")),
    )
}

/// Render a raw value for error messages without JSON quoting of strings.
pub(crate) fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
