//! Binary wire encoder: streams an `Object` out as tagged, delta-field,
//! varint-compressed bytes.

use crate::binary::tag::{pack_tag, DataType, SHARED_DEF, SHARED_REF};
use crate::binary::varint::{write_svarint, write_uvarint};
use crate::descriptors::{StructDescriptor, Type};
use crate::error::{CodaError, EncodingError, Result};
use crate::int::BigEndian;
use crate::object::{FieldValue, SharedObject};
use crate::shared::EncoderRefTable;
use std::collections::HashSet;
use std::rc::Rc;

/// Default recursion depth limit, matching the original runtime's default
/// cap against runaway (or cyclic, pre-cycle-detection) structures.
pub const DEFAULT_MAX_DEPTH: usize = 255;

pub struct BinaryEncoder {
  buf: Vec<u8>,
  refs: EncoderRefTable,
  in_progress: HashSet<usize>,
  depth: usize,
  max_depth: usize,
  /// Field-id delta computed by `write_field_tag`, consumed by the next
  /// call to `emit_tagged`. `None` when encoding a container element,
  /// which carries no field-id context.
  pending_delta: Option<u32>,
}

impl BinaryEncoder {
  pub fn new() -> Self {
    BinaryEncoder {
      buf: Vec::new(),
      refs: EncoderRefTable::new(),
      in_progress: HashSet::new(),
      depth: 0,
      max_depth: DEFAULT_MAX_DEPTH,
      pending_delta: None,
    }
  }

  pub fn with_max_depth(max_depth: usize) -> Self {
    let mut e = Self::new();
    e.max_depth = max_depth;
    e
  }

  /// Encodes `root` as the top-level value of a binary stream.
  pub fn encode(mut self, root: &SharedObject) -> Result<Vec<u8>> {
    self.write_struct_chain(root)?;
    Ok(self.buf)
  }

  fn obj_key(obj: &SharedObject) -> usize {
    Rc::as_ptr(obj) as *const () as usize
  }

  fn write_struct_chain(&mut self, obj: &SharedObject) -> Result<()> {
    self.depth += 1;
    if self.depth > self.max_depth {
      self.depth -= 1;
      return Err(CodaError::Encoding(EncodingError::DepthExceeded(self.max_depth)));
    }

    let key = Self::obj_key(obj);
    if self.in_progress.contains(&key) {
      self.depth -= 1;
      return Err(CodaError::Encoding(EncodingError::Cycle));
    }
    self.in_progress.insert(key);

    let descriptor = obj.borrow().descriptor();
    let mut levels = vec![descriptor];
    let mut cur = descriptor;
    while let Some(base) = cur.base {
      levels.push(base);
      cur = base;
    }

    for level in levels {
      if level.base.is_some() {
        self.write_subtype_tag(level.type_id);
      }
      self.write_level_fields(obj, level)?;
      self.buf.push(pack_tag(0, DataType::End));
    }

    self.in_progress.remove(&key);
    self.depth -= 1;
    Ok(())
  }

  fn write_subtype_tag(&mut self, type_id: u32) {
    if type_id <= 15 {
      self.buf.push(pack_tag(type_id as u8, DataType::Subtype));
    } else {
      self.buf.push(pack_tag(0, DataType::Subtype));
      write_uvarint(type_id as u64, &mut self.buf);
    }
  }

  fn write_level_fields(&mut self, obj: &SharedObject, level: &'static StructDescriptor) -> Result<()> {
    let mut last_id = 0u32;
    for field in level.own_fields {
      let value = (field.get)(&*obj.borrow());
      if matches!(value, FieldValue::Null) {
        continue;
      }
      if field.id <= last_id && last_id != 0 {
        return Err(CodaError::Encoding(EncodingError::NonMonotonicField {
          last: last_id,
          next: field.id,
        }));
      }
      self.write_field_tag(last_id, field.id)?;
      last_id = field.id;
      self.write_value(field.ty, value, field.options.fixed_width)?;
    }
    Ok(())
  }

  fn write_field_tag(&mut self, last_id: u32, field_id: u32) -> Result<()> {
    let delta = field_id.checked_sub(last_id).ok_or(CodaError::Encoding(
      EncodingError::NonMonotonicField { last: last_id, next: field_id },
    ))?;
    if delta == 0 {
      return Err(CodaError::Encoding(EncodingError::NonMonotonicField {
        last: last_id,
        next: field_id,
      }));
    }
    // The data type nibble for this tag is filled in by the caller via
    // `write_value`'s first byte; here we only reserve the delta slot by
    // writing a placeholder is wrong for a streaming format, so instead we
    // compute the tag once `write_value` knows the data type. See
    // `write_value` for the actual tag byte emission.
    self.pending_delta = Some(delta);
    Ok(())
  }

  /// Encodes `value` (whose static type is `ty`) including the leading
  /// tag byte, using `self.pending_delta` (set by `write_field_tag`) for
  /// the tag's high nibble. `fixed` is the field's `FieldOptions::fixed_width`,
  /// which only affects the `Int` case: a fixed-width field always uses its
  /// declared bit width's fixed encoding, where a varint field falls back to
  /// `Zero`/`One`/`Varint`.
  fn write_value(&mut self, ty: &'static Type, value: FieldValue, fixed: bool) -> Result<()> {
    let (inner_ty, _is_const, is_shared, _is_nullable) = ty.unwrap_modified();
    match value {
      FieldValue::Null => Ok(()),
      FieldValue::Bool(b) => self.emit_tagged(if b { DataType::One } else { DataType::Zero }, |_| {}),
      FieldValue::Int(n) => self.write_int(inner_ty, n, fixed),
      FieldValue::Float(f) => self.emit_tagged(DataType::Float, |buf| buf.extend_from_slice(&f.to_be_bytes())),
      FieldValue::Double(d) => self.emit_tagged(DataType::Double, |buf| buf.extend_from_slice(&d.to_be_bytes())),
      FieldValue::String(s) => self.emit_tagged(DataType::Bytes, |buf| {
        write_uvarint(s.len() as u64, buf);
        buf.extend_from_slice(s.as_bytes());
      }),
      FieldValue::Bytes(b) => self.emit_tagged(DataType::Bytes, |buf| {
        write_uvarint(b.len() as u64, buf);
        buf.extend_from_slice(&b);
      }),
      FieldValue::Enum(v) => self.emit_tagged(DataType::Varint, |buf| write_svarint(v as i64, buf)),
      FieldValue::Struct(obj) => self.write_struct_field(is_shared, obj),
      FieldValue::List(items) => self.write_container(DataType::List, inner_ty, items, false),
      FieldValue::Set(items) => self.write_container(DataType::PList, inner_ty, items, false),
      FieldValue::Map(entries) => self.write_map(inner_ty, entries, false),
    }
  }

  fn write_int(&mut self, ty: &'static Type, n: i64, fixed: bool) -> Result<()> {
    let bits = match ty {
      Type::Integer { bits } => *bits,
      _ => 32,
    };
    if fixed {
      self.emit_tagged(fixed_data_type(bits), |buf| write_fixed_int(bits, n, buf))
    } else if n == 0 {
      self.emit_tagged(DataType::Zero, |_| {})
    } else if n == 1 {
      self.emit_tagged(DataType::One, |_| {})
    } else {
      self.emit_tagged(DataType::Varint, |buf| write_svarint(n, buf))
    }
  }

  fn write_struct_field(&mut self, is_shared: bool, obj: SharedObject) -> Result<()> {
    if !is_shared {
      self.emit_tagged(DataType::Struct, |_| {})?;
      return self.write_struct_chain(&obj);
    }
    self.emit_tagged(DataType::SStruct, |_| {})?;
    let (id, known) = self.refs.intern(&obj);
    if known {
      self.buf.push(SHARED_REF);
      write_uvarint(id as u64, &mut self.buf);
      Ok(())
    } else {
      self.buf.push(SHARED_DEF);
      write_uvarint(id as u64, &mut self.buf);
      self.write_struct_chain(&obj)
    }
  }

  fn write_container(
    &mut self,
    data_type: DataType,
    ty: &'static Type,
    items: Vec<FieldValue>,
    as_element: bool,
  ) -> Result<()> {
    let elem_ty = match ty {
      Type::List(e) | Type::Set(e) => *e,
      _ => return Err(io_err("container field type missing element type")),
    };
    if as_element {
      self.buf.push(data_type.as_nibble());
      write_uvarint(items.len() as u64, &mut self.buf);
    } else {
      self.emit_tagged(data_type, |buf| write_uvarint(items.len() as u64, buf))?;
    }
    for item in items {
      self.write_element(elem_ty, item)?;
    }
    Ok(())
  }

  fn write_map(
    &mut self,
    ty: &'static Type,
    entries: Vec<(FieldValue, FieldValue)>,
    as_element: bool,
  ) -> Result<()> {
    let (key_ty, value_ty) = match ty {
      Type::Map(k, v) => (*k, *v),
      _ => return Err(io_err("map field type missing key/value types")),
    };
    if as_element {
      self.buf.push(DataType::Map.as_nibble());
      write_uvarint(entries.len() as u64, &mut self.buf);
    } else {
      self.emit_tagged(DataType::Map, |buf| write_uvarint(entries.len() as u64, buf))?;
    }
    for (k, v) in entries {
      self.write_element(key_ty, k)?;
      self.write_element(value_ty, v)?;
    }
    Ok(())
  }

  /// Writes one container element: a standalone byte (no field-id delta
  /// applies inside a container) followed by the element's payload.
  fn write_element(&mut self, ty: &'static Type, value: FieldValue) -> Result<()> {
    let (inner_ty, _c, is_shared, _n) = ty.unwrap_modified();
    match value {
      FieldValue::Bool(b) => {
        self.buf.push((if b { DataType::One } else { DataType::Zero }).as_nibble());
        Ok(())
      }
      FieldValue::Int(n) => self.write_element_int(inner_ty, n),
      FieldValue::Float(f) => {
        self.buf.push(DataType::Float.as_nibble());
        self.buf.extend_from_slice(&f.to_be_bytes());
        Ok(())
      }
      FieldValue::Double(d) => {
        self.buf.push(DataType::Double.as_nibble());
        self.buf.extend_from_slice(&d.to_be_bytes());
        Ok(())
      }
      FieldValue::String(s) => {
        self.buf.push(DataType::Bytes.as_nibble());
        write_uvarint(s.len() as u64, &mut self.buf);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
      }
      FieldValue::Bytes(b) => {
        self.buf.push(DataType::Bytes.as_nibble());
        write_uvarint(b.len() as u64, &mut self.buf);
        self.buf.extend_from_slice(&b);
        Ok(())
      }
      FieldValue::Enum(v) => {
        self.buf.push(DataType::Varint.as_nibble());
        write_svarint(v as i64, &mut self.buf);
        Ok(())
      }
      FieldValue::Struct(obj) => {
        if !is_shared {
          self.buf.push(DataType::Struct.as_nibble());
          return self.write_struct_chain(&obj);
        }
        let (id, known) = self.refs.intern(&obj);
        if known {
          self.buf.push(SHARED_REF);
          write_uvarint(id as u64, &mut self.buf);
          Ok(())
        } else {
          self.buf.push(SHARED_DEF);
          write_uvarint(id as u64, &mut self.buf);
          self.write_struct_chain(&obj)
        }
      }
      FieldValue::List(items) => self.write_container(DataType::List, inner_ty, items, true),
      FieldValue::Set(items) => self.write_container(DataType::PList, inner_ty, items, true),
      FieldValue::Map(entries) => self.write_map(inner_ty, entries, true),
      FieldValue::Null => Err(io_err("container elements may not be null")),
    }
  }

  fn write_element_int(&mut self, ty: &'static Type, n: i64) -> Result<()> {
    if let Type::Integer { bits } = ty {
      self.buf.push(fixed_data_type(*bits).as_nibble());
      write_fixed_int(*bits, n, &mut self.buf);
      return Ok(());
    }
    if n == 0 {
      self.buf.push(DataType::Zero.as_nibble());
    } else if n == 1 {
      self.buf.push(DataType::One.as_nibble());
    } else {
      self.buf.push(DataType::Varint.as_nibble());
      write_svarint(n, &mut self.buf);
    }
    Ok(())
  }

  /// Emits the pending field tag (set by `write_field_tag`) with the given
  /// data type, then runs `payload` to append the value's bytes. When
  /// there is no pending field context (top-level container elements
  /// never call this -- they use `write_element` instead), this always
  /// has a delta available.
  fn emit_tagged(&mut self, data_type: DataType, payload: impl FnOnce(&mut Vec<u8>)) -> Result<()> {
    let delta = self.pending_delta.take().unwrap_or(0);
    if delta <= 15 {
      self.buf.push(pack_tag(delta as u8, data_type));
    } else {
      self.buf.push(pack_tag(0, data_type));
      write_uvarint(delta as u64, &mut self.buf);
    }
    payload(&mut self.buf);
    Ok(())
  }
}

fn fixed_data_type(bits: u8) -> DataType {
  match bits {
    16 => DataType::Fixed16,
    32 => DataType::Fixed32,
    64 => DataType::Fixed64,
    _ => DataType::Varint,
  }
}

fn write_fixed_int(bits: u8, value: i64, out: &mut Vec<u8>) {
  match bits {
    16 => out.extend_from_slice(&(value as i16).be_bytes()),
    32 => out.extend_from_slice(&(value as i32).be_bytes()),
    _ => out.extend_from_slice(&value.be_bytes()),
  }
}

fn io_err(msg: &str) -> CodaError {
  CodaError::Encoding(EncodingError::Io(msg.to_string()))
}
