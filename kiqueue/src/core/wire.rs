//! The on-wire job record understood by Sidekiq-compatible consumers.
//!
//! ```text
//! {"jid":"<24 hex>","retry":<int>,"queue":"<name>","class":"<name>","args":[...],"enqueued_at":<unix seconds>}
//! ```
//!
//! Field names and order are fixed. Arguments are checked before any JSON is written because
//! serde_json renders non-finite floats as `null`, which a consumer would happily run with.
use serde::ser::{self, Impossible};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Errors produced while turning a job into its wire representation.
#[derive(Error, Debug)]
pub enum SerializeError {
    #[error("Unsupported value: {0} cannot be represented in JSON")]
    UnsupportedValue(f64),
    #[error("Unsupported map key: JSON object keys must be strings")]
    NonStringKey,
    /// Raised by an argument's own `Serialize` implementation.
    #[error("{0}")]
    Custom(String),
    #[error("Failed to encode job as JSON")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

impl ser::Error for SerializeError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        SerializeError::Custom(msg.to_string())
    }
}

/// Borrowed view of a job in wire field order.
#[derive(Serialize)]
pub(crate) struct WireJob<'a, A> {
    pub jid: &'a str,
    pub retry: u32,
    pub queue: &'a str,
    pub class: &'a str,
    pub args: &'a [A],
    pub enqueued_at: i64,
}

impl<A: Serialize> WireJob<'_, A> {
    pub(crate) fn to_json(&self) -> Result<String, SerializeError> {
        for arg in self.args {
            validate(arg)?;
        }
        Ok(serde_json::to_string(self)?)
    }
}

/// Check that `value` can be written as JSON without losing information: every float is finite
/// and every map key is a string.
pub fn validate<T: Serialize + ?Sized>(value: &T) -> Result<(), SerializeError> {
    value.serialize(Validator)
}

#[derive(Clone, Copy)]
struct Validator;

impl Serializer for Validator {
    type Ok = ();
    type Error = SerializeError;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, _: bool) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_i128(self, _: i128) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_u128(self, _: u128) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<(), SerializeError> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), SerializeError> {
        if v.is_finite() {
            Ok(())
        } else {
            Err(SerializeError::UnsupportedValue(v))
        }
    }

    fn serialize_char(self, _: char) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_none(self) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<(), SerializeError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<(), SerializeError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Result<(), SerializeError> {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self, SerializeError> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> Result<Self, SerializeError> {
        Ok(self)
    }

    fn serialize_tuple_struct(self, _: &'static str, _: usize) -> Result<Self, SerializeError> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, SerializeError> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self, SerializeError> {
        Ok(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> Result<Self, SerializeError> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self, SerializeError> {
        Ok(self)
    }
}

impl ser::SerializeSeq for Validator {
    type Ok = ();
    type Error = SerializeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerializeError> {
        value.serialize(Validator)
    }

    fn end(self) -> Result<(), SerializeError> {
        Ok(())
    }
}

impl ser::SerializeTuple for Validator {
    type Ok = ();
    type Error = SerializeError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerializeError> {
        value.serialize(Validator)
    }

    fn end(self) -> Result<(), SerializeError> {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for Validator {
    type Ok = ();
    type Error = SerializeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerializeError> {
        value.serialize(Validator)
    }

    fn end(self) -> Result<(), SerializeError> {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for Validator {
    type Ok = ();
    type Error = SerializeError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerializeError> {
        value.serialize(Validator)
    }

    fn end(self) -> Result<(), SerializeError> {
        Ok(())
    }
}

impl ser::SerializeMap for Validator {
    type Ok = ();
    type Error = SerializeError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), SerializeError> {
        key.serialize(KeyValidator)
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), SerializeError> {
        value.serialize(Validator)
    }

    fn end(self) -> Result<(), SerializeError> {
        Ok(())
    }
}

impl ser::SerializeStruct for Validator {
    type Ok = ();
    type Error = SerializeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), SerializeError> {
        value.serialize(Validator)
    }

    fn end(self) -> Result<(), SerializeError> {
        Ok(())
    }
}

impl ser::SerializeStructVariant for Validator {
    type Ok = ();
    type Error = SerializeError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        _: &'static str,
        value: &T,
    ) -> Result<(), SerializeError> {
        value.serialize(Validator)
    }

    fn end(self) -> Result<(), SerializeError> {
        Ok(())
    }
}

/// Accepts only values that end up as JSON strings.
struct KeyValidator;

macro_rules! reject_key {
    ($($method:ident($($arg:ty),*)),* $(,)?) => {
        $(
            fn $method(self, $(_: $arg),*) -> Result<(), SerializeError> {
                Err(SerializeError::NonStringKey)
            }
        )*
    };
}

impl Serializer for KeyValidator {
    type Ok = ();
    type Error = SerializeError;
    type SerializeSeq = Impossible<(), SerializeError>;
    type SerializeTuple = Impossible<(), SerializeError>;
    type SerializeTupleStruct = Impossible<(), SerializeError>;
    type SerializeTupleVariant = Impossible<(), SerializeError>;
    type SerializeMap = Impossible<(), SerializeError>;
    type SerializeStruct = Impossible<(), SerializeError>;
    type SerializeStructVariant = Impossible<(), SerializeError>;

    reject_key! {
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_bytes(&[u8]),
        serialize_none(),
        serialize_unit(),
        serialize_unit_struct(&'static str),
    }

    fn serialize_char(self, _: char) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
    ) -> Result<(), SerializeError> {
        Ok(())
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<(), SerializeError> {
        value.serialize(self)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _: &T) -> Result<(), SerializeError> {
        Err(SerializeError::NonStringKey)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Result<(), SerializeError> {
        Err(SerializeError::NonStringKey)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq, SerializeError> {
        Err(SerializeError::NonStringKey)
    }

    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, SerializeError> {
        Err(SerializeError::NonStringKey)
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct, SerializeError> {
        Err(SerializeError::NonStringKey)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, SerializeError> {
        Err(SerializeError::NonStringKey)
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap, SerializeError> {
        Err(SerializeError::NonStringKey)
    }

    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStruct, SerializeError> {
        Err(SerializeError::NonStringKey)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, SerializeError> {
        Err(SerializeError::NonStringKey)
    }
}
