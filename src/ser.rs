//! Serializer producing the same indented text the reader accepts.
//!
//! Output rules mirror the reader exactly: two spaces per indent level,
//! `key: value` entries, `- ` sequence entries with the first record field
//! inline after the dash, `[]`/`{}` for empty collections and a bare empty
//! value for `None`. Strings are always single-quoted so that `'true'` and
//! `'99'` survive a round trip as strings.

use serde::ser::{self, Serialize};

use crate::error::Error;

/// Serialize a value to the text format.
///
/// ```
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Item {
///     x: i32,
/// }
///
/// let text = serde_piyaml::to_string(&vec![Item { x: 1 }, Item { x: 2 }]).unwrap();
/// assert_eq!(text, "- x: 1\n- x: 2\n");
/// ```
pub fn to_string<T: Serialize>(value: &T) -> Result<String, Error> {
    let mut out = String::new();
    value.serialize(ValueSer {
        out: &mut out,
        flow: Flow::Root,
    })?;
    Ok(out)
}

/// Where the value being serialized lands in the surrounding text.
#[derive(Clone, Copy)]
enum Flow {
    /// Top-level document value.
    Root,
    /// Right-hand side of a `key:` written at `indent`.
    Key { indent: usize },
    /// After a `- ` marker whose items sit at `indent`.
    Dash { indent: usize },
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

/// Serializer for one value in a known flow position.
struct ValueSer<'a> {
    out: &'a mut String,
    flow: Flow,
}

impl<'a> ValueSer<'a> {
    /// Write a finished scalar in this flow position.
    fn write_scalar(self, text: &str) -> Result<(), Error> {
        match self.flow {
            Flow::Root | Flow::Dash { .. } => {
                self.out.push_str(text);
            }
            Flow::Key { .. } => {
                self.out.push(' ');
                self.out.push_str(text);
            }
        }
        self.out.push('\n');
        Ok(())
    }

    /// An absent value: the line simply ends after `key:` or `-`.
    fn write_null(self) -> Result<(), Error> {
        self.out.push('\n');
        Ok(())
    }

    /// Write `variant:` in this flow position and return the indent its value
    /// block belongs to.
    fn begin_variant(&mut self, variant: &'static str) -> usize {
        let indent = match self.flow {
            Flow::Root => 0,
            Flow::Key { indent } => {
                self.out.push('\n');
                push_indent(self.out, indent + 1);
                indent + 1
            }
            Flow::Dash { indent } => indent + 1,
        };
        self.out.push_str(variant);
        self.out.push(':');
        indent
    }
}

/// Serializes sequence elements as `- ` entries one level below the owner.
struct SeqSer<'a> {
    out: &'a mut String,
    flow: Flow,
    item_indent: usize,
    started: bool,
}

impl<'a> SeqSer<'a> {
    fn new(out: &'a mut String, flow: Flow) -> Self {
        let item_indent = match flow {
            Flow::Root => 0,
            Flow::Key { indent } | Flow::Dash { indent } => indent + 1,
        };
        Self {
            out,
            flow,
            item_indent,
            started: false,
        }
    }

    fn begin_element(&mut self) {
        if !self.started {
            self.started = true;
            if !matches!(self.flow, Flow::Root) {
                self.out.push('\n');
            }
        }
        push_indent(self.out, self.item_indent);
        self.out.push_str("- ");
    }

    fn finish(self) -> Result<(), Error> {
        if !self.started {
            return ValueSer {
                out: self.out,
                flow: self.flow,
            }
            .write_scalar("[]");
        }
        Ok(())
    }
}

impl<'a> ser::SerializeSeq for SeqSer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        self.begin_element();
        value.serialize(ValueSer {
            out: self.out,
            flow: Flow::Dash {
                indent: self.item_indent,
            },
        })
    }

    fn end(self) -> Result<(), Error> {
        self.finish()
    }
}

impl<'a> ser::SerializeTuple for SeqSer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<(), Error> {
        self.finish()
    }
}

impl<'a> ser::SerializeTupleStruct for SeqSer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<(), Error> {
        self.finish()
    }
}

impl<'a> ser::SerializeTupleVariant for SeqSer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<(), Error> {
        self.finish()
    }
}

/// Serializes mapping entries as `key:` lines; inside a sequence element the
/// first entry stays on the dash line.
struct MapSer<'a> {
    out: &'a mut String,
    flow: Flow,
    entry_indent: usize,
    started: bool,
    key: Option<String>,
}

impl<'a> MapSer<'a> {
    fn new(out: &'a mut String, flow: Flow) -> Self {
        let entry_indent = match flow {
            Flow::Root => 0,
            Flow::Key { indent } | Flow::Dash { indent } => indent + 1,
        };
        Self {
            out,
            flow,
            entry_indent,
            started: false,
            key: None,
        }
    }

    fn begin_entry(&mut self) {
        if !self.started {
            self.started = true;
            match self.flow {
                // Root entries start at column zero, the first entry of a
                // sequence element continues the dash line.
                Flow::Root | Flow::Dash { .. } => {}
                Flow::Key { .. } => {
                    self.out.push('\n');
                    push_indent(self.out, self.entry_indent);
                }
            }
        } else {
            push_indent(self.out, self.entry_indent);
        }
    }

    fn write_entry<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), Error> {
        self.begin_entry();
        self.out.push_str(key);
        self.out.push(':');
        value.serialize(ValueSer {
            out: self.out,
            flow: Flow::Key {
                indent: self.entry_indent,
            },
        })
    }

    fn finish(self) -> Result<(), Error> {
        if !self.started {
            return ValueSer {
                out: self.out,
                flow: self.flow,
            }
            .write_scalar("{}");
        }
        Ok(())
    }
}

impl<'a> ser::SerializeMap for MapSer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Error> {
        self.key = Some(key.serialize(KeySer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        let key = self
            .key
            .take()
            .ok_or_else(|| Error::msg("mapping value serialized before its key"))?;
        self.write_entry(&key, value)
    }

    fn end(self) -> Result<(), Error> {
        self.finish()
    }
}

impl<'a> ser::SerializeStruct for MapSer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        self.write_entry(key, value)
    }

    fn end(self) -> Result<(), Error> {
        self.finish()
    }
}

impl<'a> ser::SerializeStructVariant for MapSer<'a> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        self.write_entry(key, value)
    }

    fn end(self) -> Result<(), Error> {
        self.finish()
    }
}

impl<'a> ser::Serializer for ValueSer<'a> {
    type Ok = ();
    type Error = Error;
    type SerializeSeq = SeqSer<'a>;
    type SerializeTuple = SeqSer<'a>;
    type SerializeTupleStruct = SeqSer<'a>;
    type SerializeTupleVariant = SeqSer<'a>;
    type SerializeMap = MapSer<'a>;
    type SerializeStruct = MapSer<'a>;
    type SerializeStructVariant = MapSer<'a>;

    fn serialize_bool(self, v: bool) -> Result<(), Error> {
        self.write_scalar(if v { "true" } else { "false" })
    }

    fn serialize_i8(self, v: i8) -> Result<(), Error> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<(), Error> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<(), Error> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<(), Error> {
        let mut buf = itoa::Buffer::new();
        self.write_scalar(buf.format(v))
    }

    fn serialize_i128(self, v: i128) -> Result<(), Error> {
        let mut buf = itoa::Buffer::new();
        self.write_scalar(buf.format(v))
    }

    fn serialize_u8(self, v: u8) -> Result<(), Error> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<(), Error> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<(), Error> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<(), Error> {
        let mut buf = itoa::Buffer::new();
        self.write_scalar(buf.format(v))
    }

    fn serialize_u128(self, v: u128) -> Result<(), Error> {
        let mut buf = itoa::Buffer::new();
        self.write_scalar(buf.format(v))
    }

    fn serialize_f32(self, v: f32) -> Result<(), Error> {
        if !v.is_finite() {
            return Err(Error::msg("non-finite floats are not representable"));
        }
        let mut buf = ryu::Buffer::new();
        self.write_scalar(buf.format(v))
    }

    fn serialize_f64(self, v: f64) -> Result<(), Error> {
        if !v.is_finite() {
            return Err(Error::msg("non-finite floats are not representable"));
        }
        let mut buf = ryu::Buffer::new();
        self.write_scalar(buf.format(v))
    }

    fn serialize_char(self, v: char) -> Result<(), Error> {
        let mut buf = [0u8; 4];
        self.serialize_str(v.encode_utf8(&mut buf))
    }

    fn serialize_str(self, v: &str) -> Result<(), Error> {
        if v.contains('\n') || v.contains('\r') {
            return Err(Error::msg(
                "strings containing line breaks are not representable",
            ));
        }
        let mut quoted = String::with_capacity(v.len() + 2);
        quoted.push('\'');
        for c in v.chars() {
            if c == '\'' {
                quoted.push('\'');
            }
            quoted.push(c);
        }
        quoted.push('\'');
        self.write_scalar(&quoted)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<(), Error> {
        Err(Error::msg("binary data is not supported by this format"))
    }

    fn serialize_none(self) -> Result<(), Error> {
        self.write_null()
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<(), Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<(), Error> {
        self.write_null()
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<(), Error> {
        self.write_null()
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<(), Error> {
        self.write_scalar(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        mut self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        let indent = self.begin_variant(variant);
        value.serialize(ValueSer {
            out: self.out,
            flow: Flow::Key { indent },
        })
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Error> {
        Ok(SeqSer::new(self.out, self.flow))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Error> {
        Ok(SeqSer::new(self.out, self.flow))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Error> {
        Ok(SeqSer::new(self.out, self.flow))
    }

    fn serialize_tuple_variant(
        mut self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Error> {
        let indent = self.begin_variant(variant);
        Ok(SeqSer::new(self.out, Flow::Key { indent }))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Error> {
        Ok(MapSer::new(self.out, self.flow))
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Error> {
        Ok(MapSer::new(self.out, self.flow))
    }

    fn serialize_struct_variant(
        mut self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Error> {
        let indent = self.begin_variant(variant);
        Ok(MapSer::new(self.out, Flow::Key { indent }))
    }

    fn collect_str<T: std::fmt::Display + ?Sized>(self, value: &T) -> Result<(), Error> {
        self.serialize_str(&value.to_string())
    }
}

/// Key serializer: identifiers and integers only, producing the raw key text.
struct KeySer;

fn key_error() -> Error {
    Error::msg("mapping keys must be identifiers or integers")
}

fn identifier_key(s: &str) -> Result<String, Error> {
    let ok = !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$');
    if ok {
        Ok(s.to_owned())
    } else {
        Err(Error::msg(format!(
            "key `{s}` contains characters not representable in this format"
        )))
    }
}

impl ser::Serializer for KeySer {
    type Ok = String;
    type Error = Error;
    type SerializeSeq = ser::Impossible<String, Error>;
    type SerializeTuple = ser::Impossible<String, Error>;
    type SerializeTupleStruct = ser::Impossible<String, Error>;
    type SerializeTupleVariant = ser::Impossible<String, Error>;
    type SerializeMap = ser::Impossible<String, Error>;
    type SerializeStruct = ser::Impossible<String, Error>;
    type SerializeStructVariant = ser::Impossible<String, Error>;

    fn serialize_bool(self, _v: bool) -> Result<String, Error> {
        Err(key_error())
    }

    fn serialize_i8(self, v: i8) -> Result<String, Error> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i16(self, v: i16) -> Result<String, Error> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i32(self, v: i32) -> Result<String, Error> {
        self.serialize_i64(v as i64)
    }

    fn serialize_i64(self, v: i64) -> Result<String, Error> {
        if v < 0 {
            // A leading `-` would read back as a sequence marker.
            return Err(Error::msg("negative integers cannot be mapping keys"));
        }
        let mut buf = itoa::Buffer::new();
        Ok(buf.format(v).to_owned())
    }

    fn serialize_i128(self, v: i128) -> Result<String, Error> {
        if v < 0 {
            return Err(Error::msg("negative integers cannot be mapping keys"));
        }
        let mut buf = itoa::Buffer::new();
        Ok(buf.format(v).to_owned())
    }

    fn serialize_u8(self, v: u8) -> Result<String, Error> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u16(self, v: u16) -> Result<String, Error> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u32(self, v: u32) -> Result<String, Error> {
        self.serialize_u64(v as u64)
    }

    fn serialize_u64(self, v: u64) -> Result<String, Error> {
        let mut buf = itoa::Buffer::new();
        Ok(buf.format(v).to_owned())
    }

    fn serialize_u128(self, v: u128) -> Result<String, Error> {
        let mut buf = itoa::Buffer::new();
        Ok(buf.format(v).to_owned())
    }

    fn serialize_f32(self, _v: f32) -> Result<String, Error> {
        Err(key_error())
    }

    fn serialize_f64(self, _v: f64) -> Result<String, Error> {
        Err(key_error())
    }

    fn serialize_char(self, v: char) -> Result<String, Error> {
        identifier_key(v.encode_utf8(&mut [0u8; 4]))
    }

    fn serialize_str(self, v: &str) -> Result<String, Error> {
        identifier_key(v)
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<String, Error> {
        Err(key_error())
    }

    fn serialize_none(self) -> Result<String, Error> {
        Err(key_error())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<String, Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<String, Error> {
        Err(key_error())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<String, Error> {
        Err(key_error())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String, Error> {
        identifier_key(variant)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<String, Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, Error> {
        Err(key_error())
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, Error> {
        Err(key_error())
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, Error> {
        Err(key_error())
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, Error> {
        Err(key_error())
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, Error> {
        Err(key_error())
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, Error> {
        Err(key_error())
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStruct, Error> {
        Err(key_error())
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, Error> {
        Err(key_error())
    }

    fn collect_str<T: std::fmt::Display + ?Sized>(self, value: &T) -> Result<String, Error> {
        identifier_key(&value.to_string())
    }
}
