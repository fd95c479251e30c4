//! Wire form of [`Field`]: absent or `null` is unset, `"none"` (in any
//! case) is not applicable, anything else is a value.

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::settings::{is_not_applicable, Field, NOT_APPLICABLE};

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Field::Unset => serializer.serialize_none(),
            Field::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
            Field::Value(value) => value.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Field::Unset),
            Value::String(text) if is_not_applicable(&text) => Ok(Field::NotApplicable),
            value => T::deserialize(value)
                .map(Field::Value)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_states() {
        assert_eq!(serde_json::to_string(&Field::<u32>::Unset).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&Field::<u32>::NotApplicable).unwrap(),
            "\"none\""
        );
        assert_eq!(serde_json::to_string(&Field::Value(7u32)).unwrap(), "7");

        assert_eq!(serde_json::from_str::<Field<u32>>("null").unwrap(), Field::Unset);
        assert_eq!(
            serde_json::from_str::<Field<u32>>("\"none\"").unwrap(),
            Field::NotApplicable
        );
        for text in ["\"None\"", "\"NONE\""] {
            assert_eq!(
                serde_json::from_str::<Field<u32>>(text).unwrap(),
                Field::NotApplicable
            );
        }
        assert_eq!(
            serde_json::from_str::<Field<Vec<String>>>("[\"energy\"]").unwrap(),
            Field::Value(vec!["energy".to_owned()])
        );
        assert!(serde_json::from_str::<Field<u32>>("\"seven\"").is_err());
    }

    #[test]
    fn floats_round_trip_exactly() {
        for value in [1e-6_f64, 0.0408740470708, 298.15, 3.5e-3, 1.0 / 3.0] {
            let text = serde_json::to_string(&Field::Value(value)).unwrap();
            let back = serde_json::from_str::<Field<f64>>(&text).unwrap();
            assert_eq!(back.value().map(|v| v.to_bits()), Some(value.to_bits()));
        }
    }
}
