//! Serde bridge: drive a [`TokenSink`] from any `T: Serialize`.
//!
//! The mapping follows `serde_json`: unit and `None` become `null`, newtype
//! structs are transparent, unit variants become strings, other enum variants
//! become a single-key object, sequences and tuples become arrays, maps and
//! structs become objects. Map keys must serialize to a string, number or
//! boolean; numbers and booleans are stringified.

use serde::ser::{self, Serialize, Serializer};
use serde_json::Number;

use crate::error::{FilterError, FilterResult};
use crate::sink::TokenSink;

/// Serialize `value` as tokens into `sink`.
///
/// The sink is not closed; wrap the call in
/// [`write_scoped`](crate::sink::write_scoped) when the sink should be
/// released afterwards.
pub fn write_value<T, S>(value: &T, sink: S) -> FilterResult<()>
where
    T: ?Sized + Serialize,
    S: TokenSink,
{
    value.serialize(&mut TokenSerializer::new(sink))
}

/// A `serde::Serializer` that emits tokens into a [`TokenSink`].
pub struct TokenSerializer<S> {
    sink: S,
}

impl<S: TokenSink> TokenSerializer<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }
}

impl<'a, S: TokenSink> Serializer for &'a mut TokenSerializer<S> {
    type Ok = ();
    type Error = FilterError;

    type SerializeSeq = Compound<'a, S>;
    type SerializeTuple = Compound<'a, S>;
    type SerializeTupleStruct = Compound<'a, S>;
    type SerializeTupleVariant = Compound<'a, S>;
    type SerializeMap = Compound<'a, S>;
    type SerializeStruct = Compound<'a, S>;
    type SerializeStructVariant = Compound<'a, S>;

    fn serialize_bool(self, v: bool) -> FilterResult<()> {
        self.sink.write_bool(v)
    }

    fn serialize_i8(self, v: i8) -> FilterResult<()> {
        self.sink.write_number(&Number::from(v))
    }

    fn serialize_i16(self, v: i16) -> FilterResult<()> {
        self.sink.write_number(&Number::from(v))
    }

    fn serialize_i32(self, v: i32) -> FilterResult<()> {
        self.sink.write_number(&Number::from(v))
    }

    fn serialize_i64(self, v: i64) -> FilterResult<()> {
        self.sink.write_number(&Number::from(v))
    }

    fn serialize_i128(self, v: i128) -> FilterResult<()> {
        if let Ok(v) = u64::try_from(v) {
            self.serialize_u64(v)
        } else if let Ok(v) = i64::try_from(v) {
            self.serialize_i64(v)
        } else {
            Err(FilterError::Serialization(format!("number {v} out of range")))
        }
    }

    fn serialize_u8(self, v: u8) -> FilterResult<()> {
        self.sink.write_number(&Number::from(v))
    }

    fn serialize_u16(self, v: u16) -> FilterResult<()> {
        self.sink.write_number(&Number::from(v))
    }

    fn serialize_u32(self, v: u32) -> FilterResult<()> {
        self.sink.write_number(&Number::from(v))
    }

    fn serialize_u64(self, v: u64) -> FilterResult<()> {
        self.sink.write_number(&Number::from(v))
    }

    fn serialize_u128(self, v: u128) -> FilterResult<()> {
        let v = u64::try_from(v)
            .map_err(|_| FilterError::Serialization(format!("number {v} out of range")))?;
        self.serialize_u64(v)
    }

    fn serialize_f32(self, v: f32) -> FilterResult<()> {
        // Keep the shortest f32 digits: 0.1f32 is written as 0.1.
        let v = v.to_string().parse::<f64>().unwrap_or(f64::from(v));
        self.serialize_f64(v)
    }

    fn serialize_f64(self, v: f64) -> FilterResult<()> {
        // NaN and infinities have no JSON form.
        match Number::from_f64(v) {
            Some(n) => self.sink.write_number(&n),
            None => self.sink.write_null(),
        }
    }

    fn serialize_char(self, v: char) -> FilterResult<()> {
        let mut buf = [0u8; 4];
        self.sink.write_string(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> FilterResult<()> {
        self.sink.write_string(v)
    }

    fn serialize_bytes(self, v: &[u8]) -> FilterResult<()> {
        self.sink.start_array()?;
        for byte in v {
            self.sink.write_number(&Number::from(*byte))?;
        }
        self.sink.end_array()
    }

    fn serialize_none(self) -> FilterResult<()> {
        self.sink.write_null()
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> FilterResult<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> FilterResult<()> {
        self.sink.write_null()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> FilterResult<()> {
        self.sink.write_null()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> FilterResult<()> {
        self.sink.write_string(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> FilterResult<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> FilterResult<()> {
        self.sink.start_object()?;
        self.sink.write_field_name(variant)?;
        value.serialize(&mut *self)?;
        self.sink.end_object()
    }

    fn serialize_seq(self, _len: Option<usize>) -> FilterResult<Compound<'a, S>> {
        self.sink.start_array()?;
        Ok(Compound::new(self, false))
    }

    fn serialize_tuple(self, len: usize) -> FilterResult<Compound<'a, S>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> FilterResult<Compound<'a, S>> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> FilterResult<Compound<'a, S>> {
        self.sink.start_object()?;
        self.sink.write_field_name(variant)?;
        self.sink.start_array()?;
        Ok(Compound::new(self, true))
    }

    fn serialize_map(self, _len: Option<usize>) -> FilterResult<Compound<'a, S>> {
        self.sink.start_object()?;
        Ok(Compound::new(self, false))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> FilterResult<Compound<'a, S>> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> FilterResult<Compound<'a, S>> {
        self.sink.start_object()?;
        self.sink.write_field_name(variant)?;
        self.sink.start_object()?;
        Ok(Compound::new(self, true))
    }
}

/// State for an open array or object while its elements are serialized.
pub struct Compound<'a, S> {
    ser: &'a mut TokenSerializer<S>,
    /// The container is wrapped in a single-key variant object.
    variant: bool,
}

impl<'a, S: TokenSink> Compound<'a, S> {
    fn new(ser: &'a mut TokenSerializer<S>, variant: bool) -> Self {
        Self { ser, variant }
    }

    fn end_array(self) -> FilterResult<()> {
        self.ser.sink.end_array()?;
        if self.variant {
            self.ser.sink.end_object()?;
        }
        Ok(())
    }

    fn end_object(self) -> FilterResult<()> {
        self.ser.sink.end_object()?;
        if self.variant {
            self.ser.sink.end_object()?;
        }
        Ok(())
    }

    fn field<T: ?Sized + Serialize>(&mut self, key: &str, value: &T) -> FilterResult<()> {
        self.ser.sink.write_field_name(key)?;
        value.serialize(&mut *self.ser)
    }
}

impl<S: TokenSink> ser::SerializeSeq for Compound<'_, S> {
    type Ok = ();
    type Error = FilterError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> FilterResult<()> {
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> FilterResult<()> {
        self.end_array()
    }
}

impl<S: TokenSink> ser::SerializeTuple for Compound<'_, S> {
    type Ok = ();
    type Error = FilterError;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> FilterResult<()> {
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> FilterResult<()> {
        self.end_array()
    }
}

impl<S: TokenSink> ser::SerializeTupleStruct for Compound<'_, S> {
    type Ok = ();
    type Error = FilterError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> FilterResult<()> {
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> FilterResult<()> {
        self.end_array()
    }
}

impl<S: TokenSink> ser::SerializeTupleVariant for Compound<'_, S> {
    type Ok = ();
    type Error = FilterError;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> FilterResult<()> {
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> FilterResult<()> {
        self.end_array()
    }
}

impl<S: TokenSink> ser::SerializeMap for Compound<'_, S> {
    type Ok = ();
    type Error = FilterError;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> FilterResult<()> {
        key.serialize(KeySerializer {
            sink: &mut self.ser.sink,
        })
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> FilterResult<()> {
        value.serialize(&mut *self.ser)
    }

    fn end(self) -> FilterResult<()> {
        self.end_object()
    }
}

impl<S: TokenSink> ser::SerializeStruct for Compound<'_, S> {
    type Ok = ();
    type Error = FilterError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> FilterResult<()> {
        self.field(key, value)
    }

    fn end(self) -> FilterResult<()> {
        self.end_object()
    }
}

impl<S: TokenSink> ser::SerializeStructVariant for Compound<'_, S> {
    type Ok = ();
    type Error = FilterError;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> FilterResult<()> {
        self.field(key, value)
    }

    fn end(self) -> FilterResult<()> {
        self.end_object()
    }
}

/// Writes a map key as a field name.
///
/// String keys are forwarded as they are. Integers, finite floats and booleans
/// are stringified; any other key is an error.
struct KeySerializer<'a, S> {
    sink: &'a mut S,
}

impl<S: TokenSink> KeySerializer<'_, S> {
    fn name(self, name: &str) -> FilterResult<()> {
        self.sink.write_field_name(name)
    }
}

fn key_error(kind: &str) -> FilterError {
    FilterError::Serialization(format!(
        "map key must be a string, number or boolean, got {kind}"
    ))
}

impl<S: TokenSink> Serializer for KeySerializer<'_, S> {
    type Ok = ();
    type Error = FilterError;

    type SerializeSeq = ser::Impossible<(), FilterError>;
    type SerializeTuple = ser::Impossible<(), FilterError>;
    type SerializeTupleStruct = ser::Impossible<(), FilterError>;
    type SerializeTupleVariant = ser::Impossible<(), FilterError>;
    type SerializeMap = ser::Impossible<(), FilterError>;
    type SerializeStruct = ser::Impossible<(), FilterError>;
    type SerializeStructVariant = ser::Impossible<(), FilterError>;

    fn serialize_str(self, v: &str) -> FilterResult<()> {
        self.name(v)
    }

    fn serialize_char(self, v: char) -> FilterResult<()> {
        let mut buf = [0u8; 4];
        self.name(v.encode_utf8(&mut buf))
    }

    fn serialize_bool(self, v: bool) -> FilterResult<()> {
        self.name(if v { "true" } else { "false" })
    }

    fn serialize_i8(self, v: i8) -> FilterResult<()> {
        self.name(&v.to_string())
    }

    fn serialize_i16(self, v: i16) -> FilterResult<()> {
        self.name(&v.to_string())
    }

    fn serialize_i32(self, v: i32) -> FilterResult<()> {
        self.name(&v.to_string())
    }

    fn serialize_i64(self, v: i64) -> FilterResult<()> {
        self.name(&v.to_string())
    }

    fn serialize_i128(self, v: i128) -> FilterResult<()> {
        self.name(&v.to_string())
    }

    fn serialize_u8(self, v: u8) -> FilterResult<()> {
        self.name(&v.to_string())
    }

    fn serialize_u16(self, v: u16) -> FilterResult<()> {
        self.name(&v.to_string())
    }

    fn serialize_u32(self, v: u32) -> FilterResult<()> {
        self.name(&v.to_string())
    }

    fn serialize_u64(self, v: u64) -> FilterResult<()> {
        self.name(&v.to_string())
    }

    fn serialize_u128(self, v: u128) -> FilterResult<()> {
        self.name(&v.to_string())
    }

    fn serialize_f32(self, v: f32) -> FilterResult<()> {
        if !v.is_finite() {
            return Err(key_error("a non-finite float"));
        }
        self.name(&v.to_string())
    }

    fn serialize_f64(self, v: f64) -> FilterResult<()> {
        match Number::from_f64(v) {
            Some(n) => self.name(&n.to_string()),
            None => Err(key_error("a non-finite float")),
        }
    }

    fn serialize_bytes(self, _v: &[u8]) -> FilterResult<()> {
        Err(key_error("bytes"))
    }

    fn serialize_none(self) -> FilterResult<()> {
        Err(key_error("null"))
    }

    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> FilterResult<()> {
        Err(key_error("an option"))
    }

    fn serialize_unit(self) -> FilterResult<()> {
        Err(key_error("null"))
    }

    fn serialize_unit_struct(self, _name: &'static str) -> FilterResult<()> {
        Err(key_error("null"))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> FilterResult<()> {
        self.name(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> FilterResult<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> FilterResult<()> {
        Err(key_error("an enum variant"))
    }

    fn serialize_seq(self, _len: Option<usize>) -> FilterResult<Self::SerializeSeq> {
        Err(key_error("an array"))
    }

    fn serialize_tuple(self, _len: usize) -> FilterResult<Self::SerializeTuple> {
        Err(key_error("an array"))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> FilterResult<Self::SerializeTupleStruct> {
        Err(key_error("an array"))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> FilterResult<Self::SerializeTupleVariant> {
        Err(key_error("an enum variant"))
    }

    fn serialize_map(self, _len: Option<usize>) -> FilterResult<Self::SerializeMap> {
        Err(key_error("an object"))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> FilterResult<Self::SerializeStruct> {
        Err(key_error("an object"))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> FilterResult<Self::SerializeStructVariant> {
        Err(key_error("an enum variant"))
    }
}
