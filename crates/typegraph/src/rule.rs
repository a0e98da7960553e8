use crate::{
    def::Def,
    error::{Error, Result},
    value::Value,
};
use serde::Serialize;

///
/// Rule
/// cross-cutting check run after a node's own type check passes
///

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum Rule {
    Length(Length),
}

impl Rule {
    /// Check a value that already passed the node's type check.
    #[must_use]
    pub fn check(&self, value: &Value) -> Option<String> {
        match self {
            Self::Length(length) => length.check(value),
        }
    }
}

///
/// Length
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct Length {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

impl Length {
    /// Parse `length: 10` (maximum) or `length: { min: 2, max: 10 }`.
    pub fn from_def(def: &Def) -> Result<Self> {
        match def {
            Def::Number(_) => Ok(Self {
                min: None,
                max: Some(bound(def)?),
            }),
            Def::Record(_) => {
                let min = def.get("min").map(bound).transpose()?;
                let max = def.get("max").map(bound).transpose()?;
                if let (Some(min), Some(max)) = (min, max)
                    && min > max
                {
                    return Err(Error::invalid_definition(def, "length min exceeds max"));
                }

                Ok(Self { min, max })
            }
            _ => Err(Error::invalid_definition(
                def,
                "length must be a number or a {min, max} record",
            )),
        }
    }

    #[must_use]
    pub fn check(&self, value: &Value) -> Option<String> {
        let len = value.measure()?;

        if let Some(min) = self.min
            && len < min
        {
            return Some(format!("length ({len}) is lower than minimum of {min}"));
        }
        if let Some(max) = self.max
            && len > max
        {
            return Some(format!("length ({len}) is greater than maximum of {max}"));
        }

        None
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bound(def: &Def) -> Result<usize> {
    match def {
        Def::Number(n) if *n >= 0.0 && n.fract() == 0.0 => Ok(*n as usize),
        _ => Err(Error::invalid_definition(
            def,
            "length bound must be a non-negative integer",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_is_a_maximum() {
        let length = Length::from_def(&Def::from(json!(3))).expect("valid length");

        assert_eq!(length, Length { min: None, max: Some(3) });
        assert_eq!(length.check(&Value::from("abc")), None);
        assert_eq!(
            length.check(&Value::from("abcd")),
            Some("length (4) is greater than maximum of 3".to_string())
        );
    }

    #[test]
    fn record_bounds_both_sides() {
        let length =
            Length::from_def(&Def::from(json!({ "min": 2, "max": 4 }))).expect("valid length");

        assert_eq!(
            length.check(&Value::from(json!([1]))),
            Some("length (1) is lower than minimum of 2".to_string())
        );
        assert_eq!(length.check(&Value::from(json!([1, 2, 3]))), None);
    }

    #[test]
    fn rejects_inverted_and_negative_bounds() {
        assert!(Length::from_def(&Def::from(json!({ "min": 5, "max": 1 }))).is_err());
        assert!(Length::from_def(&Def::from(json!(-1))).is_err());
        assert!(Length::from_def(&Def::from(json!("ten"))).is_err());
    }

    #[test]
    fn unmeasurable_values_pass() {
        let length = Length { min: Some(1), max: None };

        assert_eq!(Rule::Length(length).check(&Value::Bool(false)), None);
    }
}
