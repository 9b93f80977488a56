//! Run-time parameters and the resolver for parameter indirections.
//!
//! A schema value that may be written either literally or as
//! `{"paramId": "<name>"}` is a [`ValueOrParam`]. It is turned into a concrete
//! value against a [`ParamBinding`] by [`resolve`].
//!
//! ```rust,ignore
//! use workflow_runner::params::{resolve, ParamBinding, ParamValue, ValueOrParam};
//!
//! let binding = ParamBinding::new()
//!     .with("allowed_subjects", ParamValue::list(["Math", "History"]));
//! let allowed: ValueOrParam<Vec<String>> = ValueOrParam::param("allowed_subjects");
//! assert_eq!(resolve(&allowed, &binding)?, vec!["Math", "History"]);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{BindingFileResult, MissingParameterError, RunError, RunResult};

/// A reference to a parameter by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamRef {
    #[serde(rename = "paramId")]
    pub param_id: String,
}

/// Either a literal value or an indirection through a parameter.
///
/// Literals are tried first; only a JSON object can be an indirection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueOrParam<T> {
    Literal(T),
    Param(ParamRef),
}

impl<T> ValueOrParam<T> {
    pub fn param(name: impl Into<String>) -> Self {
        ValueOrParam::Param(ParamRef {
            param_id: name.into(),
        })
    }

    /// Name of the referenced parameter, if this is an indirection.
    pub fn param_name(&self) -> Option<&str> {
        match self {
            ValueOrParam::Param(r) => Some(&r.param_id),
            ValueOrParam::Literal(_) => None,
        }
    }
}

/// A value bound to a parameter for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Integer(i64),
    String(String),
    List(Vec<String>),
}

impl ParamValue {
    pub fn string(value: impl Into<String>) -> Self {
        ParamValue::String(value.into())
    }

    pub fn list<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParamValue::List(values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

/// Parameter name to value, supplied fresh for every run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamBinding {
    values: BTreeMap<String, ParamValue>,
}

impl ParamBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) {
        self.values.insert(name.into(), value);
    }

    /// Merge `other` into this binding; values in `other` win.
    pub fn extend(&mut self, other: ParamBinding) {
        self.values.extend(other.values);
    }

    /// Bound value for `name`. A bound `null` counts as unbound.
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ParamValue)> for ParamBinding {
    fn from_iter<I: IntoIterator<Item = (K, ParamValue)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Shapes a bound [`ParamValue`] can be coerced into.
pub trait FromParamValue: Sized {
    /// Human description used in shape errors.
    const EXPECTED: &'static str;

    fn from_param_value(value: &ParamValue) -> Option<Self>;
}

impl FromParamValue for String {
    const EXPECTED: &'static str = "a string";

    fn from_param_value(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromParamValue for Vec<String> {
    const EXPECTED: &'static str = "a list of strings";

    fn from_param_value(value: &ParamValue) -> Option<Self> {
        match value {
            ParamValue::List(items) => Some(items.clone()),
            _ => None,
        }
    }
}

/// Resolve a literal-or-indirection against a binding.
///
/// Literals come back unchanged. Indirections fail with
/// [`MissingParameterError`] when unbound and with [`RunError::ParamShape`]
/// when the bound value has the wrong shape.
pub fn resolve<T>(value: &ValueOrParam<T>, binding: &ParamBinding) -> RunResult<T>
where
    T: FromParamValue + Clone,
{
    match value {
        ValueOrParam::Literal(v) => Ok(v.clone()),
        ValueOrParam::Param(r) => {
            let bound = binding
                .get(&r.param_id)
                .ok_or_else(|| MissingParameterError::new(&r.param_id))?;
            T::from_param_value(bound).ok_or_else(|| RunError::ParamShape {
                name: r.param_id.clone(),
                expected: T::EXPECTED,
            })
        }
    }
}

/// Split a `name=value` command-line assignment.
fn split_assignment(arg: &str) -> Result<(String, &str), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", arg))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing parameter name in '{}'", arg));
    }
    Ok((name.to_string(), value))
}

/// Parse `name=value` into a string binding.
pub fn parse_string_assignment(arg: &str) -> Result<(String, ParamValue), String> {
    let (name, value) = split_assignment(arg)?;
    Ok((name, ParamValue::string(value)))
}

/// Parse `name=a,b,c` into a list binding. An empty value binds an empty list.
pub fn parse_list_assignment(arg: &str) -> Result<(String, ParamValue), String> {
    let (name, value) = split_assignment(arg)?;
    let items: Vec<&str> = if value.is_empty() {
        Vec::new()
    } else {
        value.split(',').map(str::trim).collect()
    };
    Ok((name, ParamValue::list(items)))
}

/// Load a binding from an optional JSON file, then apply `overrides` on top.
///
/// The file holds a JSON object of parameter values. Names present in both
/// take the override's value.
pub fn load_binding(
    params_json: Option<&Path>,
    overrides: ParamBinding,
) -> BindingFileResult<ParamBinding> {
    let mut binding = match params_json {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => ParamBinding::new(),
    };
    binding.extend(overrides);
    Ok(binding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subjects() -> ParamBinding {
        ParamBinding::new().with(
            "allowed_subjects",
            ParamValue::list(["Math", "History", "Science"]),
        )
    }

    #[test]
    fn test_literal_passes_through() {
        let value: ValueOrParam<String> = ValueOrParam::Literal("grades".into());
        assert_eq!(resolve(&value, &ParamBinding::new()).unwrap(), "grades");
    }

    #[test]
    fn test_param_resolves_list() {
        let value: ValueOrParam<Vec<String>> = ValueOrParam::param("allowed_subjects");
        let resolved = resolve(&value, &subjects()).unwrap();
        assert_eq!(resolved, vec!["Math", "History", "Science"]);
    }

    #[test]
    fn test_missing_param() {
        let value: ValueOrParam<Vec<String>> = ValueOrParam::param("nope");
        let err = resolve(&value, &subjects()).unwrap_err();
        assert_eq!(err, RunError::MissingParameter(MissingParameterError::new("nope")));
    }

    #[test]
    fn test_null_binding_counts_as_missing() {
        let binding = ParamBinding::new().with("fieldset", ParamValue::Null);
        let value: ValueOrParam<String> = ValueOrParam::param("fieldset");
        assert!(matches!(
            resolve(&value, &binding),
            Err(RunError::MissingParameter(_))
        ));
    }

    #[test]
    fn test_wrong_shape() {
        let value: ValueOrParam<String> = ValueOrParam::param("allowed_subjects");
        let err = resolve(&value, &subjects()).unwrap_err();
        assert_eq!(
            err,
            RunError::ParamShape {
                name: "allowed_subjects".into(),
                expected: "a string",
            }
        );
    }

    #[test]
    fn test_resolution_is_stable_within_a_run() {
        let value: ValueOrParam<Vec<String>> = ValueOrParam::param("allowed_subjects");
        let binding = subjects();
        assert_eq!(resolve(&value, &binding).unwrap(), resolve(&value, &binding).unwrap());
    }

    #[test]
    fn test_deserialize_value_or_param() {
        let literal: ValueOrParam<Vec<String>> = serde_json::from_value(json!(["A", "B"])).unwrap();
        assert_eq!(literal, ValueOrParam::Literal(vec!["A".to_string(), "B".to_string()]));

        let indirect: ValueOrParam<Vec<String>> =
            serde_json::from_value(json!({ "paramId": "allowed_subjects" })).unwrap();
        assert_eq!(indirect.param_name(), Some("allowed_subjects"));
    }

    #[test]
    fn test_deserialize_binding() {
        let binding: ParamBinding = serde_json::from_value(json!({
            "allowed_subjects": ["Math"],
            "fieldset": "grades",
            "limit": 3,
            "unused": null
        }))
        .unwrap();

        assert_eq!(binding.len(), 4);
        assert_eq!(binding.get("fieldset"), Some(&ParamValue::string("grades")));
        assert_eq!(binding.get("limit"), Some(&ParamValue::Integer(3)));
        assert_eq!(binding.get("unused"), None);
    }

    #[test]
    fn test_parse_assignments() {
        assert_eq!(
            parse_string_assignment("fieldset=subject grades").unwrap(),
            ("fieldset".to_string(), ParamValue::string("subject grades"))
        );
        assert_eq!(
            parse_list_assignment("allowed_subjects=Math, History").unwrap(),
            ("allowed_subjects".to_string(), ParamValue::list(["Math", "History"]))
        );
        assert_eq!(
            parse_list_assignment("empty=").unwrap().1,
            ParamValue::list(Vec::<String>::new())
        );
        assert!(parse_string_assignment("novalue").is_err());
        assert!(parse_string_assignment("=x").is_err());
    }

    #[test]
    fn test_single_value_list_is_literal() {
        let value: ValueOrParam<Vec<String>> = serde_json::from_value(json!(["Yes"])).unwrap();
        assert_eq!(value, ValueOrParam::Literal(vec!["Yes".to_string()]));
        assert_eq!(serde_json::to_value(&value).unwrap(), json!(["Yes"]));

        let name: ValueOrParam<String> = serde_json::from_value(json!("grades")).unwrap();
        assert_eq!(name.param_name(), None);

        let indirect: ValueOrParam<String> =
            serde_json::from_value(json!({ "paramId": "fieldset" })).unwrap();
        assert_eq!(indirect, ValueOrParam::param("fieldset"));
    }

    #[test]
    fn test_load_binding_overrides_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"allowed_subjects": ["Math"], "fieldset": "names"}}"#
        )
        .unwrap();

        let overrides = ParamBinding::new().with(
            "allowed_subjects",
            ParamValue::list(["History", "Science"]),
        );
        let binding = load_binding(Some(file.path()), overrides).unwrap();

        assert_eq!(
            binding.get("allowed_subjects"),
            Some(&ParamValue::list(["History", "Science"]))
        );
        assert_eq!(binding.get("fieldset"), Some(&ParamValue::string("names")));
    }

    #[test]
    fn test_load_binding_without_file() {
        let overrides = ParamBinding::new().with("fieldset", ParamValue::string("grades"));
        assert_eq!(load_binding(None, overrides.clone()).unwrap(), overrides);
    }

    #[test]
    fn test_load_binding_rejects_non_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"[1, 2]").unwrap();
        assert!(load_binding(Some(file.path()), ParamBinding::new()).is_err());
    }
}
