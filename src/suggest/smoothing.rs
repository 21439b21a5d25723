//! Smoothing models for phrase suggestions.
//!
//! Each model encodes as `{ "<model_type>": { ...parameters } }`, nested under
//! the `smoothing` key of a phrase suggestion.

use bigdecimal::BigDecimal;
use serde_json::Value;

use crate::codec::{IntoDecimal, JsonCodec, KeyedReader, KeyedWriter, decode_named, named, wire_enum};
use crate::error::{QueryDslError, Result};

wire_enum! {
    /// Discriminator of a smoothing model.
    pub enum SmoothingModelType("smoothing model") {
        Laplace => "laplace",
        StupidBackoff => "stupid_backoff",
        LinearInterpolation => "linear_interpolation",
    }
}

/// Additive smoothing: adds `alpha` to every count.
#[derive(Debug, Clone, PartialEq)]
pub struct Laplace {
    pub alpha: BigDecimal,
}

impl Laplace {
    pub fn new(alpha: impl IntoDecimal) -> Self {
        Laplace {
            alpha: alpha.into_decimal(),
        }
    }
}

/// Backs off to lower-order n-grams, discounting each step by `discount`.
#[derive(Debug, Clone, PartialEq)]
pub struct StupidBackoff {
    pub discount: BigDecimal,
}

impl StupidBackoff {
    pub fn new(discount: impl IntoDecimal) -> Self {
        StupidBackoff {
            discount: discount.into_decimal(),
        }
    }
}

/// Weighted sum of the tri-, bi- and unigram scores.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolation {
    pub trigram_lambda: BigDecimal,
    pub bigram_lambda: BigDecimal,
    pub unigram_lambda: BigDecimal,
}

impl LinearInterpolation {
    pub fn new(
        trigram_lambda: impl IntoDecimal,
        bigram_lambda: impl IntoDecimal,
        unigram_lambda: impl IntoDecimal,
    ) -> Self {
        LinearInterpolation {
            trigram_lambda: trigram_lambda.into_decimal(),
            bigram_lambda: bigram_lambda.into_decimal(),
            unigram_lambda: unigram_lambda.into_decimal(),
        }
    }
}

/// Any smoothing model.
#[derive(Debug, Clone, PartialEq)]
pub enum SmoothingModel {
    Laplace(Laplace),
    StupidBackoff(StupidBackoff),
    LinearInterpolation(LinearInterpolation),
}

impl SmoothingModel {
    pub fn smoothing_model_type(&self) -> SmoothingModelType {
        match self {
            SmoothingModel::Laplace(_) => SmoothingModelType::Laplace,
            SmoothingModel::StupidBackoff(_) => SmoothingModelType::StupidBackoff,
            SmoothingModel::LinearInterpolation(_) => SmoothingModelType::LinearInterpolation,
        }
    }

    pub fn is_equal_to(&self, other: &SmoothingModel) -> bool {
        self == other
    }

    fn encode_body(&self) -> Value {
        let mut writer = KeyedWriter::new();
        match self {
            SmoothingModel::Laplace(model) => {
                writer.put_decimal("alpha", &model.alpha);
            }
            SmoothingModel::StupidBackoff(model) => {
                writer.put_decimal("discount", &model.discount);
            }
            SmoothingModel::LinearInterpolation(model) => {
                writer
                    .put_decimal("trigram_lambda", &model.trigram_lambda)
                    .put_decimal("bigram_lambda", &model.bigram_lambda)
                    .put_decimal("unigram_lambda", &model.unigram_lambda);
            }
        }
        writer.finish()
    }

    fn decode_tagged(model_type: SmoothingModelType, body: &Value) -> Result<SmoothingModel> {
        let reader = KeyedReader::new("SmoothingModel", body)?;
        let model = match model_type {
            SmoothingModelType::Laplace => SmoothingModel::Laplace(Laplace {
                alpha: reader.decimal("alpha")?,
            }),
            SmoothingModelType::StupidBackoff => SmoothingModel::StupidBackoff(StupidBackoff {
                discount: reader.decimal("discount")?,
            }),
            SmoothingModelType::LinearInterpolation => {
                SmoothingModel::LinearInterpolation(LinearInterpolation {
                    trigram_lambda: reader.decimal("trigram_lambda")?,
                    bigram_lambda: reader.decimal("bigram_lambda")?,
                    unigram_lambda: reader.decimal("unigram_lambda")?,
                })
            }
        };
        Ok(model)
    }
}

/// Equality over optional models: both absent is equal, one absent is not.
pub fn is_equal_smoothing_models(lhs: Option<&SmoothingModel>, rhs: Option<&SmoothingModel>) -> bool {
    match (lhs, rhs) {
        (None, None) => true,
        (Some(lhs), Some(rhs)) => lhs.is_equal_to(rhs),
        _ => false,
    }
}

impl JsonCodec for SmoothingModel {
    fn to_json(&self) -> Value {
        named(self.smoothing_model_type().as_str(), self.encode_body())
    }

    fn from_json(value: &Value) -> Result<Self> {
        let reader = KeyedReader::new("SmoothingModel", value)?;
        let (tag, body) = reader.single_entry()?;
        SmoothingModel::decode_tagged(tag.parse()?, body)
    }
}

macro_rules! smoothing_variant {
    ($($t:ident),+ $(,)?) => {
        $(
            impl JsonCodec for $t {
                fn to_json(&self) -> Value {
                    SmoothingModel::from(self.clone()).to_json()
                }

                fn from_json(value: &Value) -> Result<Self> {
                    let tag = SmoothingModelType::$t.as_str();
                    let body = decode_named(stringify!($t), tag, value)?;
                    match SmoothingModel::decode_tagged(SmoothingModelType::$t, body)? {
                        SmoothingModel::$t(model) => Ok(model),
                        other => Err(QueryDslError::variant_mismatch(
                            tag,
                            other.smoothing_model_type().as_str(),
                        )),
                    }
                }
            }

            impl From<$t> for SmoothingModel {
                fn from(model: $t) -> Self {
                    SmoothingModel::$t(model)
                }
            }
        )+
    };
}

smoothing_variant!(Laplace, StupidBackoff, LinearInterpolation);

crate::codec::serde_via_codec!(SmoothingModel, Laplace, StupidBackoff, LinearInterpolation);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_smoothing_model_encode() {
        assert_eq!(
            SmoothingModel::from(Laplace::new(0.7)).to_json(),
            json!({"laplace": {"alpha": 0.7}})
        );
        assert_eq!(
            StupidBackoff::new(0.4).to_json(),
            json!({"stupid_backoff": {"discount": 0.4}})
        );
        assert_eq!(
            LinearInterpolation::new(0.5, 0.3, 0.2).to_json(),
            json!({
                "linear_interpolation": {
                    "trigram_lambda": 0.5,
                    "bigram_lambda": 0.3,
                    "unigram_lambda": 0.2
                }
            })
        );
    }

    #[test]
    fn test_smoothing_model_decode() {
        let doc = json!({"stupid_backoff": {"discount": 0.4}});
        let model = SmoothingModel::from_json(&doc).unwrap();
        assert_eq!(model, StupidBackoff::new(0.4).into());
        assert_eq!(model.smoothing_model_type(), SmoothingModelType::StupidBackoff);

        assert!(Laplace::from_json(&doc).is_err());
        assert!(SmoothingModel::from_json(&json!({"laplace": {}})).is_err());
        assert!(SmoothingModel::from_json(&json!({"good_turing": {"discount": 0.4}})).is_err());
    }

    #[test]
    fn test_is_equal_smoothing_models() {
        let laplace = SmoothingModel::from(Laplace::new(0.5));
        let backoff = SmoothingModel::from(StupidBackoff::new(0.5));

        assert!(is_equal_smoothing_models(None, None));
        assert!(!is_equal_smoothing_models(Some(&laplace), None));
        assert!(!is_equal_smoothing_models(None, Some(&laplace)));
        assert!(is_equal_smoothing_models(Some(&laplace), Some(&laplace.clone())));
        assert!(!is_equal_smoothing_models(Some(&laplace), Some(&backoff)));
    }
}
