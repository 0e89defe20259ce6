//! Search parameter builders
//!
//! [`SearchParams`] holds the fields shared by every search, and a variant
//! (`ImageFilters` or `VideoFilters`) holds the fields only one resource
//! type understands. Nothing is validated when a field is set: validation
//! happens once, in [`SearchParams::render`], through the parameter
//! registry.
//!
//! # Example
//!
//! ```
//! use pixabay_client::{Category, Color, ImageSearchParams, ImageType};
//!
//! let search = ImageSearchParams::new()
//!     .colors([Color::Green, Color::Orange])
//!     .image_type(ImageType::Photo)
//!     .category(Category::Nature)
//!     .editors_choice(true)
//!     .per_page(3);
//!
//! let rendered = search.render().unwrap();
//! assert_eq!(rendered.len(), 5);
//! ```

use std::fmt::Debug;

use serde_json::Value;

use crate::enums::Param;
use crate::error::PixabayError;
use crate::params::{self, display_value, QueryMap};

/// Fields specific to one resource type.
pub trait SearchVariant: Debug + Clone + Default + Send + Sync {
    /// Name used when reporting unsupported input keys.
    const NAME: &'static str;

    /// Every outbound field of this variant, in the order the API
    /// documents them. Absent fields are `None`.
    fn define_params(search: &SearchParams<Self>) -> Vec<(Param, Option<Value>)>;

    /// Resolve a normalized input key that none of the shared fields
    /// claimed.
    fn apply_param(&mut self, normalized: &str, original: &str, value: &Value) -> Result<(), PixabayError>;
}

/// A mutable bag of optional search fields.
///
/// Every field is optional; an absent field leaves the server default in
/// place. Setting a field again overwrites it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams<V> {
    pub query: Option<String>,
    pub lang: Option<String>,
    pub category: Option<String>,
    pub min_width: Option<i64>,
    pub min_height: Option<i64>,
    pub editors_choice: Option<bool>,
    pub safe_search: Option<bool>,
    pub order: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub filters: V,
}

impl<V: SearchVariant> SearchParams<V> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a search from a loosely-keyed mapping.
    ///
    /// Keys are normalized with [`normalize_key`] so that `"Per-Page"`,
    /// `"PER_PAGE"` and `"perPage"` all address the same field. Keys that
    /// resolve to nothing fail with
    /// [`PixabayError::UnsupportedLocalParameter`].
    pub fn from_map<I, K>(input: I) -> Result<Self, PixabayError>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut search = Self::default();
        for (key, value) in input {
            search.apply(key.as_ref(), &value)?;
        }
        Ok(search)
    }

    /// Apply one loosely-keyed entry.
    pub fn apply(&mut self, key: &str, value: &Value) -> Result<&mut Self, PixabayError> {
        let normalized = normalize_key(key);
        match normalized.as_str() {
            "q" | "query" => self.query = as_string(value),
            "category" => self.category = as_string(value),
            "lang" | "language" => self.lang = as_string(value),
            "width" | "minwidth" => self.min_width = as_int(key, value)?,
            "height" | "minheight" => self.min_height = as_int(key, value)?,
            "editorschoice" => self.editors_choice = as_bool(value),
            "safe" | "safesearch" => self.safe_search = as_bool(value),
            "order" => self.order = as_string(value),
            "page" => self.page = as_int(key, value)?,
            "limit" | "perpage" => self.per_page = as_int(key, value)?,
            _ => self.filters.apply_param(&normalized, key, value)?,
        }
        Ok(self)
    }

    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    #[must_use]
    pub fn lang(mut self, lang: impl AsRef<str>) -> Self {
        self.lang = Some(lang.as_ref().to_string());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl AsRef<str>) -> Self {
        self.category = Some(category.as_ref().to_string());
        self
    }

    #[must_use]
    pub fn min_width(mut self, min_width: u32) -> Self {
        self.min_width = Some(i64::from(min_width));
        self
    }

    #[must_use]
    pub fn min_height(mut self, min_height: u32) -> Self {
        self.min_height = Some(i64::from(min_height));
        self
    }

    #[must_use]
    pub fn editors_choice(mut self, editors_choice: bool) -> Self {
        self.editors_choice = Some(editors_choice);
        self
    }

    #[must_use]
    pub fn safe_search(mut self, safe_search: bool) -> Self {
        self.safe_search = Some(safe_search);
        self
    }

    #[must_use]
    pub fn order(mut self, order: impl AsRef<str>) -> Self {
        self.order = Some(order.as_ref().to_string());
        self
    }

    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(i64::from(page));
        self
    }

    #[must_use]
    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(i64::from(per_page));
        self
    }

    /// Render into the canonical outbound mapping.
    ///
    /// Absent fields are omitted and string values are lower-cased before
    /// the whole mapping goes through [`params::validate_all`].
    pub fn render(&self) -> Result<QueryMap, PixabayError> {
        let defined = V::define_params(self)
            .into_iter()
            .filter_map(|(param, value)| {
                let value = match value? {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                Some((param.as_str(), value))
            });
        params::validate_all(defined)
    }

    pub(crate) fn text(value: Option<&String>) -> Option<Value> {
        value.map(|s| Value::String(s.clone()))
    }

    pub(crate) fn int(value: Option<i64>) -> Option<Value> {
        value.map(Value::from)
    }

    pub(crate) fn flag(value: Option<bool>) -> Option<Value> {
        value.map(Value::Bool)
    }
}

/// Fields only image searches understand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageFilters {
    pub image_type: Option<String>,
    pub orientation: Option<String>,
    pub colors: Option<Vec<String>>,
}

/// Fields only video searches understand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoFilters {
    pub video_type: Option<String>,
}

pub type ImageSearchParams = SearchParams<ImageFilters>;
pub type VideoSearchParams = SearchParams<VideoFilters>;

impl SearchVariant for ImageFilters {
    const NAME: &'static str = "ImageSearchParams";

    fn define_params(search: &SearchParams<Self>) -> Vec<(Param, Option<Value>)> {
        let filters = &search.filters;
        vec![
            (Param::Q, SearchParams::<Self>::text(search.query.as_ref())),
            (Param::Lang, SearchParams::<Self>::text(search.lang.as_ref())),
            (Param::ImageType, SearchParams::<Self>::text(filters.image_type.as_ref())),
            (Param::Orientation, SearchParams::<Self>::text(filters.orientation.as_ref())),
            (Param::Category, SearchParams::<Self>::text(search.category.as_ref())),
            (Param::MinWidth, SearchParams::<Self>::int(search.min_width)),
            (Param::MinHeight, SearchParams::<Self>::int(search.min_height)),
            (Param::Colors, filters.colors.as_ref().map(|c| Value::String(c.join(",")))),
            (Param::EditorsChoice, SearchParams::<Self>::flag(search.editors_choice)),
            (Param::SafeSearch, SearchParams::<Self>::flag(search.safe_search)),
            (Param::Order, SearchParams::<Self>::text(search.order.as_ref())),
            (Param::Page, SearchParams::<Self>::int(search.page)),
            (Param::PerPage, SearchParams::<Self>::int(search.per_page)),
        ]
    }

    fn apply_param(&mut self, normalized: &str, original: &str, value: &Value) -> Result<(), PixabayError> {
        match normalized {
            "type" | "image" | "imagetype" => self.image_type = truthy_string(value),
            "orientation" => self.orientation = truthy_string(value),
            "color" | "colors" => self.colors = as_list(value),
            _ => {
                return Err(PixabayError::UnsupportedLocalParameter {
                    variant: Self::NAME,
                    key: original.to_string(),
                })
            }
        }
        Ok(())
    }
}

impl SearchVariant for VideoFilters {
    const NAME: &'static str = "VideoSearchParams";

    fn define_params(search: &SearchParams<Self>) -> Vec<(Param, Option<Value>)> {
        vec![
            (Param::Q, SearchParams::<Self>::text(search.query.as_ref())),
            (Param::Lang, SearchParams::<Self>::text(search.lang.as_ref())),
            (Param::VideoType, SearchParams::<Self>::text(search.filters.video_type.as_ref())),
            (Param::Category, SearchParams::<Self>::text(search.category.as_ref())),
            (Param::MinWidth, SearchParams::<Self>::int(search.min_width)),
            (Param::MinHeight, SearchParams::<Self>::int(search.min_height)),
            (Param::EditorsChoice, SearchParams::<Self>::flag(search.editors_choice)),
            (Param::SafeSearch, SearchParams::<Self>::flag(search.safe_search)),
            (Param::Order, SearchParams::<Self>::text(search.order.as_ref())),
            (Param::Page, SearchParams::<Self>::int(search.page)),
            (Param::PerPage, SearchParams::<Self>::int(search.per_page)),
        ]
    }

    fn apply_param(&mut self, normalized: &str, original: &str, value: &Value) -> Result<(), PixabayError> {
        match normalized {
            "type" | "video" | "videotype" => self.video_type = as_string(value),
            _ => {
                return Err(PixabayError::UnsupportedLocalParameter {
                    variant: Self::NAME,
                    key: original.to_string(),
                })
            }
        }
        Ok(())
    }
}

impl ImageSearchParams {
    #[must_use]
    pub fn image_type(mut self, image_type: impl AsRef<str>) -> Self {
        self.filters.image_type = Some(image_type.as_ref().to_string());
        self
    }

    #[must_use]
    pub fn orientation(mut self, orientation: impl AsRef<str>) -> Self {
        self.filters.orientation = Some(orientation.as_ref().to_string());
        self
    }

    /// Filter by a single color, replacing any previous color filter.
    #[must_use]
    pub fn color(mut self, color: impl AsRef<str>) -> Self {
        self.filters.colors = Some(vec![color.as_ref().to_string()]);
        self
    }

    #[must_use]
    pub fn colors<I, C>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<str>,
    {
        self.filters.colors = Some(colors.into_iter().map(|c| c.as_ref().to_string()).collect());
        self
    }
}

impl VideoSearchParams {
    #[must_use]
    pub fn video_type(mut self, video_type: impl AsRef<str>) -> Self {
        self.filters.video_type = Some(video_type.as_ref().to_string());
        self
    }
}

/// Normalize a caller-supplied parameter name for alias matching.
///
/// Case is folded and whitespace, `_` and `-` are removed, which also
/// collapses camel-case boundaries: `"Per-Page"`, `"PER_PAGE"` and
/// `"perPage"` all become `"perpage"`.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn truthy_string(value: &Value) -> Option<String> {
    if is_falsy(value) {
        None
    } else {
        as_string(value)
    }
}

fn as_int(key: &str, value: &Value) -> Result<Option<i64>, PixabayError> {
    let parsed = match value {
        Value::Null => return Ok(None),
        Value::Number(n) if n.is_f64() => n.as_f64().map(f64::trunc).and_then(float_to_i64),
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };
    parsed
        .map(Some)
        .ok_or_else(|| PixabayError::invalid_value(key, display_value(value), "Must be an integer"))
}

/// Whole floats inside the `i64` range; anything else has no integer value.
fn float_to_i64(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    let bound = -(i64::MIN as f64);
    (f.is_finite() && f >= i64::MIN as f64 && f < bound).then(|| f as i64)
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            Some(!matches!(s.as_str(), "" | "0" | "n" | "no" | "off" | "false"))
        }
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::Array(items) => Some(!items.is_empty()),
        Value::Object(map) => Some(!map.is_empty()),
    }
}

fn as_list(value: &Value) -> Option<Vec<String>> {
    let list: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(as_string).collect(),
        Value::String(s) if !s.is_empty() => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    };
    (!list.is_empty()).then_some(list)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::String(s) => s.is_empty() || s == "0",
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
