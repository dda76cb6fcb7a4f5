//! Lenient scalar fields.
//!
//! Rule attributes such as ranges, durations and comparison values are kept
//! as text so malformed values are reported (and tolerated) at evaluation
//! time rather than rejecting the whole document. YAML authors may still
//! write integers and booleans unquoted; they are converted to their
//! textual form. Unquoted floats are rejected: YAML reads them as `f64`,
//! which loses their text (`6.10` would become `6.1`).

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl Scalar {
    fn into_text(self) -> Result<String, String> {
        match self {
            Scalar::Bool(b) => Ok(b.to_string()),
            Scalar::Int(i) => Ok(i.to_string()),
            Scalar::UInt(u) => Ok(u.to_string()),
            Scalar::Float(f) => Err(format!(
                "floating-point value {f} must be quoted to keep its exact text"
            )),
            Scalar::Str(s) => Ok(s),
        }
    }
}

/// Deserialize an optional scalar of any YAML type into its text form.
pub(crate) fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Scalar>::deserialize(deserializer)?
        .map(Scalar::into_text)
        .transpose()
        .map_err(D::Error::custom)
}
