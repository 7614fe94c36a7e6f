//! Binary wire decoder: the structural mirror of `BinaryEncoder`.

use crate::binary::tag::{unpack_tag, DataType, SHARED_DEF, SHARED_REF};
use crate::binary::varint::{read_svarint, read_uvarint};
use crate::descriptors::{StructDescriptor, Type, TypeKind};
use crate::error::{CodaError, EncodingError, Result};
use crate::object::{FieldValue, SharedObject};
use crate::registry::TypeRegistry;
use crate::shared::DecoderRefTable;

pub struct BinaryDecoder<'a> {
  bytes: &'a [u8],
  pos: usize,
  registry: &'a TypeRegistry,
  refs: DecoderRefTable,
  depth: usize,
  max_depth: usize,
}

impl<'a> BinaryDecoder<'a> {
  pub fn new(bytes: &'a [u8], registry: &'a TypeRegistry) -> Self {
    BinaryDecoder {
      bytes,
      pos: 0,
      registry,
      refs: DecoderRefTable::new(),
      depth: 0,
      max_depth: crate::binary::encoder::DEFAULT_MAX_DEPTH,
    }
  }

  /// Decodes a single top-level value of the statically-declared type
  /// `expected`. Any bytes following the decoded value are left unread.
  pub fn decode(mut self, expected: &'static StructDescriptor) -> Result<SharedObject> {
    self.read_struct(expected)
  }

  fn io_err(&self, msg: impl Into<String>) -> CodaError {
    CodaError::Encoding(EncodingError::Io(msg.into()))
  }

  fn next_byte(&mut self) -> Result<u8> {
    let byte = *self
      .bytes
      .get(self.pos)
      .ok_or_else(|| self.io_err("unexpected end of input"))?;
    self.pos += 1;
    Ok(byte)
  }

  fn peek_byte(&self) -> Result<u8> {
    self
      .bytes
      .get(self.pos)
      .copied()
      .ok_or_else(|| self.io_err("unexpected end of input"))
  }

  fn take(&mut self, n: usize) -> Result<&'a [u8]> {
    let slice = self
      .bytes
      .get(self.pos..self.pos + n)
      .ok_or_else(|| self.io_err("unexpected end of input"))?;
    self.pos += n;
    Ok(slice)
  }

  /// Resolves the concrete descriptor for the struct about to be read
  /// (consuming a leading `Subtype` tag if present) and constructs a
  /// fresh, empty instance of it.
  fn resolve_concrete(&mut self, expected: &'static StructDescriptor) -> Result<(&'static StructDescriptor, SharedObject)> {
    let byte = self.peek_byte()?;
    let (nibble, dt) = unpack_tag(byte);
    let concrete = if dt == DataType::Subtype {
      self.pos += 1;
      let subtype_id = if nibble == 0 {
        read_uvarint(self.bytes, &mut self.pos)? as u32
      } else {
        nibble as u32
      };
      self
        .registry
        .resolve(expected.root(), subtype_id)
        .ok_or_else(|| self.io_err(format!("unregistered subtype id {}", subtype_id)))?
    } else {
      expected.root()
    };
    let instance = (concrete.factory)();
    Ok((concrete, instance))
  }

  fn read_struct(&mut self, expected: &'static StructDescriptor) -> Result<SharedObject> {
    self.depth += 1;
    if self.depth > self.max_depth {
      self.depth -= 1;
      return Err(CodaError::Encoding(EncodingError::DepthExceeded(self.max_depth)));
    }
    let (concrete, instance) = self.resolve_concrete(expected)?;
    self.fill_struct(&instance, concrete)?;
    self.depth -= 1;
    Ok(instance)
  }

  fn fill_struct(&mut self, instance: &SharedObject, concrete: &'static StructDescriptor) -> Result<()> {
    let mut level = concrete;
    loop {
      self.read_level_fields(instance, level)?;
      match level.base {
        None => break,
        Some(base) => {
          if base.base.is_some() {
            let byte = self.peek_byte()?;
            let (_nibble, dt) = unpack_tag(byte);
            if dt == DataType::Subtype {
              self.pos += 1;
              if unpack_tag(byte).0 == 0 {
                read_uvarint(self.bytes, &mut self.pos)?;
              }
            }
          }
          level = base;
        }
      }
    }
    Ok(())
  }

  fn read_level_fields(&mut self, instance: &SharedObject, level: &'static StructDescriptor) -> Result<()> {
    let mut last_id = 0u32;
    loop {
      let byte = self.next_byte()?;
      let (nibble, dt) = unpack_tag(byte);
      if dt == DataType::End {
        return Ok(());
      }
      let field_id = if nibble == 0 {
        read_uvarint(self.bytes, &mut self.pos)? as u32
      } else {
        last_id + nibble as u32
      };
      last_id = field_id;
      let field = level
        .own_field_by_id(field_id)
        .ok_or_else(|| self.io_err(format!("unknown field id {} on `{}`", field_id, level.name)))?;
      let value = self.read_value(dt, field.ty)?;
      (field.set)(&mut *instance.borrow_mut(), value)?;
    }
  }

  fn read_value(&mut self, dt: DataType, ty: &'static Type) -> Result<FieldValue> {
    let (inner_ty, _is_const, is_shared, _is_nullable) = ty.unwrap_modified();
    match dt {
      DataType::Zero => Ok(zero_or_one_value(inner_ty, false)?),
      DataType::One => Ok(zero_or_one_value(inner_ty, true)?),
      DataType::Varint => {
        let raw = read_svarint(self.bytes, &mut self.pos)?;
        Ok(match inner_ty.kind() {
          TypeKind::Enum => FieldValue::Enum(raw as i32),
          _ => FieldValue::Int(raw),
        })
      }
      DataType::Fixed16 | DataType::Fixed32 | DataType::Fixed64 => {
        let bits = fixed_bits(dt);
        Ok(FieldValue::Int(self.read_fixed_int(bits)?))
      }
      DataType::Float => {
        let bytes: [u8; 4] = self.take(4)?.try_into().unwrap();
        Ok(FieldValue::Float(f32::from_be_bytes(bytes)))
      }
      DataType::Double => {
        let bytes: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(FieldValue::Double(f64::from_be_bytes(bytes)))
      }
      DataType::Bytes => {
        let len = read_uvarint(self.bytes, &mut self.pos)? as usize;
        let bytes = self.take(len)?.to_vec();
        Ok(match inner_ty.kind() {
          TypeKind::String => FieldValue::String(
            String::from_utf8(bytes).map_err(|_| self.io_err("invalid utf-8 in string field"))?,
          ),
          _ => FieldValue::Bytes(bytes),
        })
      }
      DataType::Struct => {
        let struct_ty = inner_ty
          .as_struct()
          .ok_or_else(|| self.io_err("struct tag on non-struct field"))?;
        Ok(FieldValue::Struct(self.read_struct(struct_ty)?))
      }
      DataType::SStruct => {
        let struct_ty = inner_ty
          .as_struct()
          .ok_or_else(|| self.io_err("struct tag on non-struct field"))?;
        self.read_shared_struct(struct_ty, is_shared)
      }
      DataType::List => self.read_container(inner_ty, false),
      DataType::PList => self.read_container(inner_ty, true),
      DataType::Map => self.read_map(inner_ty),
      DataType::End | DataType::Subtype => Err(self.io_err("unexpected structural tag in field position")),
    }
  }

  fn read_shared_struct(&mut self, struct_ty: &'static StructDescriptor, is_shared: bool) -> Result<FieldValue> {
    if !is_shared {
      return Err(self.io_err("shared struct tag on non-shared field"));
    }
    let marker = self.next_byte()?;
    if marker == SHARED_REF {
      let id = read_uvarint(self.bytes, &mut self.pos)? as u32;
      let obj = self
        .refs
        .get(id)
        .ok_or_else(|| self.io_err(format!("unknown shared reference id {}", id)))?;
      Ok(FieldValue::Struct(obj))
    } else if marker == SHARED_DEF {
      let id = read_uvarint(self.bytes, &mut self.pos)? as u32;
      let (concrete, instance) = self.resolve_concrete(struct_ty)?;
      self.refs.register(id, instance.clone());
      self.fill_struct(&instance, concrete)?;
      Ok(FieldValue::Struct(instance))
    } else {
      Err(self.io_err("expected shared-ref or shared-def marker"))
    }
  }

  fn read_container(&mut self, ty: &'static Type, as_set: bool) -> Result<FieldValue> {
    let elem_ty = match ty {
      Type::List(e) | Type::Set(e) => *e,
      _ => return Err(self.io_err("container field type missing element type")),
    };
    let count = read_uvarint(self.bytes, &mut self.pos)? as usize;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
      items.push(self.read_element(elem_ty)?);
    }
    Ok(if as_set { FieldValue::Set(items) } else { FieldValue::List(items) })
  }

  fn read_map(&mut self, ty: &'static Type) -> Result<FieldValue> {
    let (key_ty, value_ty) = match ty {
      Type::Map(k, v) => (*k, *v),
      _ => return Err(self.io_err("map field type missing key/value types")),
    };
    let count = read_uvarint(self.bytes, &mut self.pos)? as usize;
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
      let k = self.read_element(key_ty)?;
      let v = self.read_element(value_ty)?;
      entries.push((k, v));
    }
    Ok(FieldValue::Map(entries))
  }

  fn read_element(&mut self, ty: &'static Type) -> Result<FieldValue> {
    let (inner_ty, _c, is_shared, _n) = ty.unwrap_modified();
    let byte = self.peek_byte()?;
    if is_shared && (byte == SHARED_REF || byte == SHARED_DEF) {
      let struct_ty = inner_ty
        .as_struct()
        .ok_or_else(|| self.io_err("shared marker on non-struct element"))?;
      return self.read_shared_struct(struct_ty, true);
    }
    self.pos += 1;
    let (_nibble, dt) = unpack_tag(byte);
    match dt {
      DataType::Zero => zero_or_one_value(inner_ty, false),
      DataType::One => zero_or_one_value(inner_ty, true),
      DataType::Varint => {
        let raw = read_svarint(self.bytes, &mut self.pos)?;
        Ok(match inner_ty.kind() {
          TypeKind::Enum => FieldValue::Enum(raw as i32),
          _ => FieldValue::Int(raw),
        })
      }
      DataType::Fixed16 | DataType::Fixed32 | DataType::Fixed64 => {
        Ok(FieldValue::Int(self.read_fixed_int(fixed_bits(dt))?))
      }
      DataType::Float => {
        let bytes: [u8; 4] = self.take(4)?.try_into().unwrap();
        Ok(FieldValue::Float(f32::from_be_bytes(bytes)))
      }
      DataType::Double => {
        let bytes: [u8; 8] = self.take(8)?.try_into().unwrap();
        Ok(FieldValue::Double(f64::from_be_bytes(bytes)))
      }
      DataType::Bytes => {
        let len = read_uvarint(self.bytes, &mut self.pos)? as usize;
        let bytes = self.take(len)?.to_vec();
        Ok(match inner_ty.kind() {
          TypeKind::String => FieldValue::String(
            String::from_utf8(bytes).map_err(|_| self.io_err("invalid utf-8 in string element"))?,
          ),
          _ => FieldValue::Bytes(bytes),
        })
      }
      DataType::Struct => {
        let struct_ty = inner_ty
          .as_struct()
          .ok_or_else(|| self.io_err("struct tag on non-struct element"))?;
        Ok(FieldValue::Struct(self.read_struct(struct_ty)?))
      }
      DataType::List => self.read_container(inner_ty, false),
      DataType::PList => self.read_container(inner_ty, true),
      DataType::Map => self.read_map(inner_ty),
      DataType::SStruct | DataType::End | DataType::Subtype => {
        Err(self.io_err("unexpected structural tag in element position"))
      }
    }
  }

  fn read_fixed_int(&mut self, bits: u8) -> Result<i64> {
    Ok(match bits {
      16 => i16::from_be_bytes(self.take(2)?.try_into().unwrap()) as i64,
      32 => i32::from_be_bytes(self.take(4)?.try_into().unwrap()) as i64,
      _ => i64::from_be_bytes(self.take(8)?.try_into().unwrap()),
    })
  }
}

fn fixed_bits(dt: DataType) -> u8 {
  match dt {
    DataType::Fixed16 => 16,
    DataType::Fixed32 => 32,
    _ => 64,
  }
}

fn zero_or_one_value(ty: &'static Type, is_one: bool) -> Result<FieldValue> {
  match ty.kind() {
    TypeKind::Bool => Ok(FieldValue::Bool(is_one)),
    _ => Ok(FieldValue::Int(if is_one { 1 } else { 0 })),
  }
}
