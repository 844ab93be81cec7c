//! Serde deserializer over the event stream produced by the stack machine.
//!
//! The three destination shapes map onto serde access types: records resolve
//! named fields (with `#[serde(alias)]` for display names), sequences
//! accumulate ordered elements, mappings accumulate keyed entries with typed
//! keys. Whether a field recurses into a nested destination or coerces a
//! scalar is decided by the field's declared type, i.e. by which
//! `deserialize_*` hook its `Deserialize` impl invokes.

use serde::de::{self, DeserializeSeed, Deserializer as _, IntoDeserializer, Visitor};

use crate::error::{Error, Location};
use crate::event::{Ev, Events};
use crate::parse_scalars::{parse_bool, parse_f32, parse_f64, parse_int_signed, parse_int_unsigned};
use crate::parser::parse_events;
use crate::tokenizer::ScalarKind;

/// Deserialize a value of type `T` from the text format.
///
/// All failures are fatal for the whole call and carry a 1-based line and
/// column where known; no partial value is ever returned.
///
/// ```
/// use serde::Deserialize;
///
/// #[derive(Deserialize, Debug, PartialEq)]
/// struct Item {
///     x: i32,
/// }
///
/// let items: Vec<Item> = serde_piyaml::from_str("- x: 1\n- x: 2").unwrap();
/// assert_eq!(items, vec![Item { x: 1 }, Item { x: 2 }]);
/// ```
pub fn from_str<T: de::DeserializeOwned>(input: &str) -> Result<T, Error> {
    let mut events = Events::new(parse_events(input)?);
    let value = T::deserialize(Deser { ev: &mut events })?;
    if let Some(extra) = events.peek() {
        return Err(Error::structural(
            "trailing content after the root value",
            extra.location(),
        ));
    }
    Ok(value)
}

/// Attach a location to errors that were raised without one (e.g. by a
/// `Visitor` or by serde derive).
fn locate(e: Error, location: Location) -> Error {
    if e.location().is_none() {
        e.with_location(location)
    } else {
        e
    }
}

/// A consumed scalar event.
struct Scalar {
    text: String,
    kind: ScalarKind,
    location: Location,
}

/// One-shot deserializer borrowing the event cursor.
pub(crate) struct Deser<'e> {
    ev: &'e mut Events,
}

impl<'e> Deser<'e> {
    fn next_ev(&mut self) -> Result<Ev, Error> {
        self.ev
            .next()
            .ok_or_else(|| Error::eof(self.ev.last_location()))
    }

    fn next_scalar(&mut self, expected: &'static str) -> Result<Scalar, Error> {
        match self.next_ev()? {
            Ev::Scalar {
                text,
                kind,
                location,
                ..
            } => Ok(Scalar {
                text,
                kind,
                location,
            }),
            Ev::SeqStart { location } => Err(Error::unexpected(expected, "a sequence", location)),
            Ev::MapStart { location } => Err(Error::unexpected(expected, "a mapping", location)),
            Ev::SeqEnd { location } | Ev::MapEnd { location } => Err(Error::structural(
                "container end with no matching start",
                location,
            )),
        }
    }

    /// Skip one balanced value (used for ignored fields).
    fn skip_value(&mut self) -> Result<(), Error> {
        let mut depth = 0usize;
        loop {
            match self.next_ev()? {
                Ev::SeqStart { .. } | Ev::MapStart { .. } => depth += 1,
                Ev::SeqEnd { location } | Ev::MapEnd { location } => {
                    if depth == 0 {
                        return Err(Error::structural(
                            "container end with no matching start",
                            location,
                        ));
                    }
                    depth -= 1;
                }
                Ev::Scalar { .. } => {}
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }
}

/// Sequence access when the source was the explicit `[]` literal or an empty
/// value block.
struct EmptySeq;

impl<'de> de::SeqAccess<'de> for EmptySeq {
    type Error = Error;

    fn next_element_seed<T>(&mut self, _seed: T) -> Result<Option<T::Value>, Error>
    where
        T: DeserializeSeed<'de>,
    {
        Ok(None)
    }
}

/// Mapping access for `{}` and empty value blocks.
struct EmptyMap;

impl<'de> de::MapAccess<'de> for EmptyMap {
    type Error = Error;

    fn next_key_seed<K>(&mut self, _seed: K) -> Result<Option<K::Value>, Error>
    where
        K: DeserializeSeed<'de>,
    {
        Ok(None)
    }

    fn next_value_seed<V>(&mut self, _seed: V) -> Result<V::Value, Error>
    where
        V: DeserializeSeed<'de>,
    {
        Err(Error::structural(
            "value requested from an empty mapping",
            Location::UNKNOWN,
        ))
    }
}

/// Streaming sequence access over the events between `SeqStart`/`SeqEnd`.
struct SA<'e> {
    ev: &'e mut Events,
}

impl<'de, 'e> de::SeqAccess<'de> for SA<'e> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Error>
    where
        T: DeserializeSeed<'de>,
    {
        match self.ev.peek() {
            None => Err(Error::eof(self.ev.last_location())),
            Some(Ev::SeqEnd { .. }) => Ok(None),
            Some(_) => seed.deserialize(Deser { ev: &mut *self.ev }).map(Some),
        }
    }
}

/// Streaming mapping access over the events between `MapStart`/`MapEnd`.
struct MA<'e> {
    ev: &'e mut Events,
}

impl<'de, 'e> de::MapAccess<'de> for MA<'e> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Error>
    where
        K: DeserializeSeed<'de>,
    {
        let location = match self.ev.peek() {
            None => return Err(Error::eof(self.ev.last_location())),
            Some(Ev::MapEnd { .. }) => return Ok(None),
            Some(ev) => ev.location(),
        };
        // Unknown-field errors from serde derive surface here; pin them to
        // the key that raised them.
        seed.deserialize(Deser { ev: &mut *self.ev })
            .map(Some)
            .map_err(|e| locate(e, location))
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Error>
    where
        V: DeserializeSeed<'de>,
    {
        seed.deserialize(Deser { ev: &mut *self.ev })
    }
}

/// Enum access for a plain scalar variant name.
struct UnitEnum {
    variant: String,
    location: Location,
}

impl<'de> de::EnumAccess<'de> for UnitEnum {
    type Error = Error;
    type Variant = UnitOnly;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, UnitOnly), Error>
    where
        V: DeserializeSeed<'de>,
    {
        let location = self.location;
        let value = seed
            .deserialize(self.variant.into_deserializer())
            .map_err(|e: Error| locate(e, location))?;
        Ok((value, UnitOnly { location }))
    }
}

struct UnitOnly {
    location: Location,
}

impl<'de> de::VariantAccess<'de> for UnitOnly {
    type Error = Error;

    fn unit_variant(self) -> Result<(), Error> {
        Ok(())
    }

    fn newtype_variant_seed<T>(self, _seed: T) -> Result<T::Value, Error>
    where
        T: DeserializeSeed<'de>,
    {
        Err(Error::msg("this variant carries a value; write it as `Variant: value`")
            .with_location(self.location))
    }

    fn tuple_variant<V>(self, _len: usize, _visitor: V) -> Result<V::Value, Error>
    where
        V: Visitor<'de>,
    {
        Err(Error::msg("this variant carries values; write it as `Variant:` with a nested block")
            .with_location(self.location))
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], _visitor: V) -> Result<V::Value, Error>
    where
        V: Visitor<'de>,
    {
        Err(Error::msg("this variant carries fields; write it as `Variant:` with a nested block")
            .with_location(self.location))
    }
}

/// Enum access for the `Variant: value` mapping form.
struct VariantData<'e> {
    ev: &'e mut Events,
}

impl<'de, 'e> de::EnumAccess<'de> for VariantData<'e> {
    type Error = Error;
    type Variant = VariantData<'e>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Error>
    where
        V: DeserializeSeed<'de>,
    {
        let (text, location) = match self.ev.next() {
            Some(Ev::Scalar { text, location, .. }) => (text, location),
            Some(other) => {
                return Err(Error::unexpected(
                    "a variant name",
                    other.describe(),
                    other.location(),
                ))
            }
            None => return Err(Error::eof(self.ev.last_location())),
        };
        let value = seed
            .deserialize(text.into_deserializer())
            .map_err(|e: Error| locate(e, location))?;
        Ok((value, self))
    }
}

impl<'de, 'e> de::VariantAccess<'de> for VariantData<'e> {
    type Error = Error;

    fn unit_variant(self) -> Result<(), Error> {
        let scalar = Deser { ev: self.ev }.next_scalar("an empty value")?;
        if scalar.kind == ScalarKind::Null {
            Ok(())
        } else {
            Err(Error::unexpected(
                "an empty value for a unit variant",
                "a value",
                scalar.location,
            ))
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Error>
    where
        T: DeserializeSeed<'de>,
    {
        seed.deserialize(Deser { ev: self.ev })
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, Error>
    where
        V: Visitor<'de>,
    {
        Deser { ev: self.ev }.deserialize_seq(visitor)
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value, Error>
    where
        V: Visitor<'de>,
    {
        Deser { ev: self.ev }.deserialize_map(visitor)
    }
}

impl<'de, 'e> de::Deserializer<'de> for Deser<'e> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        match self.ev.peek() {
            None => Err(Error::eof(self.ev.last_location())),
            Some(Ev::SeqStart { .. }) => self.deserialize_seq(visitor),
            Some(Ev::MapStart { .. }) => self.deserialize_map(visitor),
            Some(Ev::SeqEnd { location }) | Some(Ev::MapEnd { location }) => Err(
                Error::structural("container end with no matching start", *location),
            ),
            Some(Ev::Scalar { .. }) => {
                let s = self.next_scalar("a value")?;
                match s.kind {
                    ScalarKind::Null => visitor.visit_unit(),
                    ScalarKind::Bool => visitor.visit_bool(s.text == "true"),
                    ScalarKind::Int => {
                        if let Ok(v) = parse_int_signed::<i64>(&s.text, "i64", s.location) {
                            visitor.visit_i64(v)
                        } else if let Ok(v) = parse_int_unsigned::<u64>(&s.text, "u64", s.location)
                        {
                            visitor.visit_u64(v)
                        } else {
                            visitor.visit_string(s.text)
                        }
                    }
                    ScalarKind::Hex => {
                        visitor.visit_u32(parse_int_unsigned::<u32>(&s.text, "u32", s.location)?)
                    }
                    ScalarKind::Float => visitor.visit_f64(parse_f64(&s.text, s.location)?),
                    ScalarKind::Str => visitor.visit_string(s.text),
                }
                .map_err(|e| locate(e, s.location))
            }
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("a boolean")?;
        visitor.visit_bool(parse_bool(&s.text, s.location)?)
    }

    fn deserialize_i8<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("an integer")?;
        visitor.visit_i8(parse_int_signed(&s.text, "i8", s.location)?)
    }

    fn deserialize_i16<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("an integer")?;
        visitor.visit_i16(parse_int_signed(&s.text, "i16", s.location)?)
    }

    fn deserialize_i32<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("an integer")?;
        visitor.visit_i32(parse_int_signed(&s.text, "i32", s.location)?)
    }

    fn deserialize_i64<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("an integer")?;
        visitor.visit_i64(parse_int_signed(&s.text, "i64", s.location)?)
    }

    fn deserialize_i128<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("an integer")?;
        visitor.visit_i128(parse_int_signed(&s.text, "i128", s.location)?)
    }

    fn deserialize_u8<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("an unsigned integer")?;
        visitor.visit_u8(parse_int_unsigned(&s.text, "u8", s.location)?)
    }

    fn deserialize_u16<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("an unsigned integer")?;
        visitor.visit_u16(parse_int_unsigned(&s.text, "u16", s.location)?)
    }

    fn deserialize_u32<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("an unsigned integer")?;
        visitor.visit_u32(parse_int_unsigned(&s.text, "u32", s.location)?)
    }

    fn deserialize_u64<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("an unsigned integer")?;
        visitor.visit_u64(parse_int_unsigned(&s.text, "u64", s.location)?)
    }

    fn deserialize_u128<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("an unsigned integer")?;
        visitor.visit_u128(parse_int_unsigned(&s.text, "u128", s.location)?)
    }

    fn deserialize_f32<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("a float")?;
        visitor.visit_f32(parse_f32(&s.text, s.location)?)
    }

    fn deserialize_f64<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("a float")?;
        visitor.visit_f64(parse_f64(&s.text, s.location)?)
    }

    fn deserialize_char<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("a character")?;
        let mut chars = s.text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(Error::coercion("a single character", &s.text, s.location)),
        }
    }

    fn deserialize_str<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("a string")?;
        visitor
            .visit_string(s.text)
            .map_err(|e| locate(e, s.location))
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Error> {
        Err(Error::msg("binary data is not supported by this format")
            .with_location(self.ev.last_location()))
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.ev.peek() {
            None => Err(Error::eof(self.ev.last_location())),
            Some(Ev::Scalar {
                kind: ScalarKind::Null,
                ..
            }) => {
                self.ev.next();
                visitor.visit_none()
            }
            Some(_) => visitor.visit_some(Deser { ev: self.ev }),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        let s = self.next_scalar("an empty value")?;
        if s.kind == ScalarKind::Null || s.text.is_empty() {
            visitor.visit_unit()
        } else {
            Err(Error::unexpected("an empty value", "a value", s.location))
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    /// Sequences arrive either as `SeqStart..SeqEnd`, as the explicit `[]`
    /// literal, or as an empty value block.
    fn deserialize_seq<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        match self.next_ev()? {
            Ev::SeqStart { .. } => {
                let value = visitor.visit_seq(SA { ev: &mut *self.ev })?;
                match self.next_ev()? {
                    Ev::SeqEnd { .. } => Ok(value),
                    other => Err(Error::structural(
                        "sequence has more elements than the target accepts",
                        other.location(),
                    )),
                }
            }
            Ev::Scalar {
                kind: ScalarKind::Null,
                ..
            } => visitor.visit_seq(EmptySeq),
            Ev::Scalar { text, location, .. } => {
                if text == "[]" {
                    visitor.visit_seq(EmptySeq)
                } else {
                    Err(Error::MalformedCollectionLiteral { text, location })
                }
            }
            Ev::MapStart { location } => Err(Error::unexpected("a sequence", "a mapping", location)),
            Ev::SeqEnd { location } | Ev::MapEnd { location } => Err(Error::structural(
                "container end with no matching start",
                location,
            )),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.deserialize_seq(visitor)
    }

    /// Mappings arrive either as `MapStart..MapEnd`, as the explicit `{}`
    /// literal, or as an empty value block. Keys pass through the same scalar
    /// coercion as values, so integer-keyed maps work.
    fn deserialize_map<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        match self.next_ev()? {
            Ev::MapStart { .. } => {
                let value = visitor.visit_map(MA { ev: &mut *self.ev })?;
                match self.next_ev()? {
                    Ev::MapEnd { .. } => Ok(value),
                    other => Err(Error::structural(
                        "mapping has more entries than the target accepts",
                        other.location(),
                    )),
                }
            }
            Ev::Scalar {
                kind: ScalarKind::Null,
                ..
            } => visitor.visit_map(EmptyMap),
            Ev::Scalar { text, location, .. } => {
                if text == "{}" {
                    visitor.visit_map(EmptyMap)
                } else {
                    Err(Error::MalformedCollectionLiteral { text, location })
                }
            }
            Ev::SeqStart { location } => Err(Error::unexpected("a mapping", "a sequence", location)),
            Ev::SeqEnd { location } | Ev::MapEnd { location } => Err(Error::structural(
                "container end with no matching start",
                location,
            )),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        mut self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        match self.next_ev()? {
            Ev::Scalar {
                text,
                kind,
                location,
                ..
            } => {
                if kind == ScalarKind::Null {
                    return Err(Error::unexpected(
                        "an enum variant",
                        "an empty value",
                        location,
                    ));
                }
                visitor.visit_enum(UnitEnum {
                    variant: text,
                    location,
                })
            }
            Ev::MapStart { .. } => {
                let value = visitor.visit_enum(VariantData { ev: &mut *self.ev })?;
                match self.next_ev()? {
                    Ev::MapEnd { .. } => Ok(value),
                    other => Err(Error::structural(
                        "an enum mapping must contain exactly one variant",
                        other.location(),
                    )),
                }
            }
            Ev::SeqStart { location } => {
                Err(Error::unexpected("an enum variant", "a sequence", location))
            }
            Ev::SeqEnd { location } | Ev::MapEnd { location } => Err(Error::structural(
                "container end with no matching start",
                location,
            )),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(mut self, visitor: V) -> Result<V::Value, Error> {
        self.skip_value()?;
        visitor.visit_unit()
    }
}
