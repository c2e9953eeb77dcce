//! Serde adapter for base64-encoded payload fields, standard alphabet.
//!
//! Referenced as `#[serde(with = "crate::wire::base64")]`, the same spelling
//! the teacher crate uses for its `rxpk`/`txpk` payload fields.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&STANDARD.encode(bytes))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = <&str>::deserialize(deserializer)?;
    STANDARD
        .decode(s)
        .map_err(|e| serde::de::Error::custom(format!("invalid base64: {e}")))
}

#[cfg(test)]
mod test {
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    #[test]
    fn round_trips_every_length_up_to_255() {
        for len in 0..=255usize {
            let payload: Vec<u8> = (0..len).map(|i| (i % 256) as u8).collect();
            let encoded = STANDARD.encode(&payload);
            let decoded = STANDARD.decode(&encoded).unwrap();
            assert_eq!(decoded, payload);
        }
    }
}
