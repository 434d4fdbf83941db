//! Serde adapters for float fields that must survive a JSON round trip.
//!
//! JSON has no NaN or infinity. Finite values are written as numbers (f32
//! widened to f64 so the decimal text parses back to the same bits), anything
//! else as the hex string of its bit pattern, e.g. `"0x7fc00001"`.
//!
//! ```ignore
//! #[serde(with = "crate::ftir_pipeline::common::float_serde::lossless_f32")]
//! pub frequency: f32,
//! ```

use std::fmt;

use serde::de::{self, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

macro_rules! lossless_float {
    ($module:ident, $float:ty, $bits:ty) => {
        pub mod $module {
            use super::*;

            pub fn serialize<S: Serializer>(value: &$float, serializer: S) -> Result<S::Ok, S::Error> {
                if value.is_finite() {
                    serializer.serialize_f64(f64::from(*value))
                } else {
                    serializer.serialize_str(&format!("0x{:x}", value.to_bits()))
                }
            }

            pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<$float, D::Error> {
                deserializer.deserialize_any(FloatVisitor)
            }

            struct FloatVisitor;

            impl<'de> Visitor<'de> for FloatVisitor {
                type Value = $float;

                fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                    write!(f, "a number or a hex bit pattern such as \"0x7fc00000\"")
                }

                fn visit_f64<E: de::Error>(self, v: f64) -> Result<$float, E> {
                    Ok(v as $float)
                }

                fn visit_i64<E: de::Error>(self, v: i64) -> Result<$float, E> {
                    Ok(v as $float)
                }

                fn visit_u64<E: de::Error>(self, v: u64) -> Result<$float, E> {
                    Ok(v as $float)
                }

                fn visit_str<E: de::Error>(self, v: &str) -> Result<$float, E> {
                    v.strip_prefix("0x")
                        .and_then(|hex| <$bits>::from_str_radix(hex, 16).ok())
                        .map(<$float>::from_bits)
                        .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }
    };
}

lossless_float!(lossless_f32, f32, u32);
lossless_float!(lossless_f64, f64, u64);

struct Lossless(f64);

impl Serialize for Lossless {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        lossless_f64::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Lossless {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        lossless_f64::deserialize(deserializer).map(Lossless)
    }
}

/// [`lossless_f64`] applied to every element of a `Vec<f64>`.
pub mod lossless_f64_vec {
    use super::*;

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(values.len()))?;
        for &v in values {
            seq.serialize_element(&Lossless(v))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        let values = Vec::<Lossless>::deserialize(deserializer)?;
        Ok(values.into_iter().map(|v| v.0).collect())
    }
}
