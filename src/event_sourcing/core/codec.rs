use std::collections::HashMap;
use std::fmt;

use serde::de::{self, DeserializeOwned, Deserializer, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use super::record::Record;

// ============================================================================
// Record Codec - Tagged Envelopes
// ============================================================================
//
// A tagged envelope is one flat JSON object: the reserved "$type" field names
// the variant and every payload field sits beside it at the top level.
//
//   {"$type": "PlaceBid", "at": "...", "auction_id": 1, "amount": {...}}
//
// The file log stores whole envelopes. The relational log stores the tag in
// its own column and the payload (tag removed) as the row data, so the codec
// also knows how to split an envelope and join it back together.
//
// ============================================================================

/// Reserved envelope field carrying the variant tag.
pub const TAG_FIELD: &str = "$type";

/// Errors raised while converting records to and from envelopes.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("unknown record variant: {0}")]
    UnknownVariant(String),

    #[error("malformed payload for {tag}: {source}")]
    MalformedPayload {
        tag: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("envelope has no string \"$type\" field")]
    MissingTag,

    #[error("envelope is not a JSON object")]
    NotAnObject,

    #[error("failed to encode {tag}: {source}")]
    Encode {
        tag: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("variant {tag} uses the reserved \"$type\" field")]
    ReservedField { tag: String },

    #[error("variant {0} is registered twice")]
    DuplicateVariant(String),

    #[error("envelope is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
}

// ============================================================================
// Envelope
// ============================================================================

/// A record's tag together with its payload fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub tag: String,
    pub payload: Map<String, Value>,
}

impl Envelope {
    /// Split a flat envelope object into tag and payload.
    pub fn from_value(value: Value) -> Result<Self, CodecError> {
        let Value::Object(mut payload) = value else {
            return Err(CodecError::NotAnObject);
        };

        match payload.remove(TAG_FIELD) {
            Some(Value::String(tag)) => Ok(Self { tag, payload }),
            _ => Err(CodecError::MissingTag),
        }
    }

    /// Parse envelope bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        let value = serde_json::from_slice(bytes).map_err(CodecError::InvalidJson)?;
        Self::from_value(value)
    }

    /// Rebuild an envelope from a tag and a stored payload object.
    ///
    /// The tag is inserted structurally. A stray `"$type"` inside the payload
    /// is discarded so the supplied tag always wins.
    pub fn join(tag: impl Into<String>, payload: Value) -> Result<Self, CodecError> {
        let Value::Object(mut payload) = payload else {
            return Err(CodecError::NotAnObject);
        };
        payload.remove(TAG_FIELD);

        Ok(Self {
            tag: tag.into(),
            payload,
        })
    }

    /// Flatten back into one JSON object with the tag first.
    pub fn into_value(self) -> Value {
        let mut object = Map::with_capacity(self.payload.len() + 1);
        object.insert(TAG_FIELD.to_string(), Value::String(self.tag));
        object.extend(self.payload);
        Value::Object(object)
    }
}

impl Serialize for Envelope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.payload.len() + 1))?;
        map.serialize_entry(TAG_FIELD, &self.tag)?;
        for (key, value) in &self.payload {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Error for a payload that parsed as JSON but is not an object.
pub(crate) fn not_an_object(value: &Value) -> serde_json::Error {
    let unexpected = match value {
        Value::Null => de::Unexpected::Unit,
        Value::Bool(b) => de::Unexpected::Bool(*b),
        Value::Number(_) => de::Unexpected::Other("number"),
        Value::String(s) => de::Unexpected::Str(s),
        Value::Array(_) => de::Unexpected::Seq,
        Value::Object(_) => de::Unexpected::Map,
    };
    <serde_json::Error as de::Error>::invalid_type(unexpected, &"a JSON object")
}

/// Split envelope bytes into the tag and the payload bytes (tag removed).
pub fn split_envelope(bytes: &[u8]) -> Result<(String, Vec<u8>), CodecError> {
    let Envelope { tag, payload } = Envelope::from_slice(bytes)?;
    let payload = serde_json::to_vec(&payload).map_err(|source| CodecError::Encode {
        tag: tag.clone(),
        source,
    })?;
    Ok((tag, payload))
}

// ============================================================================
// Codec - explicit tag registry
// ============================================================================

type Decoder<R> = Box<dyn Fn(Value) -> serde_json::Result<R> + Send + Sync>;

/// Registry mapping variant tags to decoders for one record kind.
///
/// Built explicitly by the application and handed to a store backend:
///
/// ```ignore
/// let codec = Codec::builder()
///     .register("AddAuction", Command::AddAuction)?
///     .register("PlaceBid", Command::PlaceBid)?
///     .build();
/// ```
pub struct Codec<R> {
    decoders: HashMap<&'static str, Decoder<R>>,
}

impl<R: Record> Codec<R> {
    pub fn builder() -> CodecBuilder<R> {
        CodecBuilder {
            decoders: HashMap::new(),
        }
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    /// Registered tags, in no particular order.
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.decoders.keys().copied()
    }

    /// Encode a record into its tagged envelope.
    pub fn encode_envelope(&self, record: &R) -> Result<Envelope, CodecError> {
        let tag = record.type_tag();
        if !self.is_registered(tag) {
            return Err(CodecError::UnknownVariant(tag.to_string()));
        }

        let payload = record.encode_payload().map_err(|source| CodecError::Encode {
            tag: tag.to_string(),
            source,
        })?;
        let Value::Object(payload) = payload else {
            return Err(CodecError::NotAnObject);
        };
        if payload.contains_key(TAG_FIELD) {
            return Err(CodecError::ReservedField {
                tag: tag.to_string(),
            });
        }

        Ok(Envelope {
            tag: tag.to_string(),
            payload,
        })
    }

    /// Decode an envelope into the variant registered under its tag.
    pub fn decode_envelope(&self, envelope: Envelope) -> Result<R, CodecError> {
        let Envelope { tag, payload } = envelope;
        let decoder = self
            .decoders
            .get(tag.as_str())
            .ok_or_else(|| CodecError::UnknownVariant(tag.clone()))?;

        decoder(Value::Object(payload)).map_err(|source| CodecError::MalformedPayload { tag, source })
    }

    /// Encode a record to envelope bytes.
    pub fn encode(&self, record: &R) -> Result<Vec<u8>, CodecError> {
        let envelope = self.encode_envelope(record)?;
        serde_json::to_vec(&envelope).map_err(|source| CodecError::Encode {
            tag: envelope.tag.clone(),
            source,
        })
    }

    /// Decode payload bytes (tag already split off) as the variant `tag`.
    pub fn decode(&self, tag: &str, payload: &[u8]) -> Result<R, CodecError> {
        if !self.is_registered(tag) {
            return Err(CodecError::UnknownVariant(tag.to_string()));
        }

        let payload: Value = serde_json::from_slice(payload).map_err(|source| {
            CodecError::MalformedPayload {
                tag: tag.to_string(),
                source,
            }
        })?;
        let payload = match payload {
            Value::Object(payload) => payload,
            other => {
                return Err(CodecError::MalformedPayload {
                    tag: tag.to_string(),
                    source: not_an_object(&other),
                })
            }
        };

        self.decode_envelope(Envelope {
            tag: tag.to_string(),
            payload,
        })
    }

    /// Decode full envelope bytes.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<R, CodecError> {
        self.decode_envelope(Envelope::from_slice(bytes)?)
    }
}

impl<R> fmt::Debug for Codec<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<_> = self.decoders.keys().collect();
        tags.sort();
        f.debug_struct("Codec").field("tags", &tags).finish()
    }
}

pub struct CodecBuilder<R> {
    decoders: HashMap<&'static str, Decoder<R>>,
}

impl<R: Record> CodecBuilder<R> {
    /// Register payload type `P` under `tag`, wrapped into `R` by `wrap`.
    ///
    /// Fails if the tag is already taken or if `P` declares a field that
    /// collides with the reserved tag field.
    pub fn register<P>(mut self, tag: &'static str, wrap: fn(P) -> R) -> Result<Self, CodecError>
    where
        P: DeserializeOwned + 'static,
    {
        if self.decoders.contains_key(tag) {
            return Err(CodecError::DuplicateVariant(tag.to_string()));
        }
        if struct_fields::<P>().contains(&TAG_FIELD) {
            return Err(CodecError::ReservedField {
                tag: tag.to_string(),
            });
        }

        self.decoders.insert(
            tag,
            Box::new(move |value| serde_json::from_value::<P>(value).map(wrap)),
        );
        Ok(self)
    }

    pub fn build(self) -> Codec<R> {
        Codec {
            decoders: self.decoders,
        }
    }
}

// ============================================================================
// Field introspection
// ============================================================================

/// Field names a derived `Deserialize` struct expects (after serde renames).
///
/// Empty for anything that is not deserialized as a plain struct.
fn struct_fields<P: DeserializeOwned>() -> &'static [&'static str] {
    let mut fields: &'static [&'static str] = &[];
    let _ = P::deserialize(FieldNames {
        fields: &mut fields,
    });
    fields
}

struct FieldNames<'a> {
    fields: &'a mut &'static [&'static str],
}

impl<'de> Deserializer<'de> for FieldNames<'_> {
    type Error = de::value::Error;

    fn deserialize_any<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Self::Error> {
        Err(de::Error::custom("not a struct"))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error> {
        *self.fields = fields;
        Err(de::Error::custom("fields captured"))
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf option unit unit_struct newtype_struct seq tuple
        tuple_struct map enum identifier ignored_any
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
