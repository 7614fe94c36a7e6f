//! Indented pretty-printer producing the canonical text format.

use crate::descriptors::{StructDescriptor, Type};
use crate::error::{CodaError, EncodingError, Result};
use crate::object::{FieldValue, SharedObject};
use crate::shared::EncoderRefTable;
use std::fmt::Write as _;

pub const DEFAULT_MAX_DEPTH: usize = 255;

pub struct TextEncoder {
  out: String,
  indent: usize,
  refs: EncoderRefTable,
  depth: usize,
  max_depth: usize,
}

impl TextEncoder {
  pub fn new() -> Self {
    TextEncoder {
      out: String::new(),
      indent: 0,
      refs: EncoderRefTable::new(),
      depth: 0,
      max_depth: DEFAULT_MAX_DEPTH,
    }
  }

  /// Encodes `root` as the top-level `object` of a text document: a bare
  /// `struct_body`, with no enclosing braces.
  pub fn encode(mut self, root: &SharedObject) -> Result<String> {
    self.write_body(root)?;
    if self.out.starts_with('\n') {
      self.out.remove(0);
    }
    Ok(self.out)
  }

  fn push_indent(&mut self) {
    for _ in 0..self.indent {
      self.out.push_str("  ");
    }
  }

  /// Writes one object's `struct_body`: the root-most level's own fields,
  /// then (if the object's actual type is a registered subtype) a nested
  /// `$id (Name): { ... }` subtype block carrying each deeper level's own
  /// fields, recursively.
  fn write_body(&mut self, obj: &SharedObject) -> Result<()> {
    self.depth += 1;
    if self.depth > self.max_depth {
      self.depth -= 1;
      return Err(CodaError::Encoding(EncodingError::DepthExceeded(self.max_depth)));
    }
    let descriptor = obj.borrow().descriptor();
    let chain = level_chain(descriptor);
    self.write_struct_levels(&chain, 0, obj)?;
    self.depth -= 1;
    Ok(())
  }

  fn write_struct_levels(&mut self, chain: &[&'static StructDescriptor], idx: usize, obj: &SharedObject) -> Result<()> {
    let level = chain[idx];
    for field in level.own_fields {
      let value = (field.get)(&*obj.borrow());
      if matches!(value, FieldValue::Null) {
        continue;
      }
      self.out.push('\n');
      self.push_indent();
      let _ = write!(self.out, "{}: ", field.name);
      self.write_value(field.ty, value)?;
    }
    if idx + 1 < chain.len() {
      let next = chain[idx + 1];
      self.out.push('\n');
      self.push_indent();
      let _ = write!(self.out, "${} ({}): {{", next.type_id, next.name);
      self.indent += 1;
      self.write_struct_levels(chain, idx + 1, obj)?;
      self.indent -= 1;
      self.out.push('\n');
      self.push_indent();
      self.out.push('}');
    }
    Ok(())
  }

  fn write_struct_literal(&mut self, obj: &SharedObject) -> Result<()> {
    self.out.push('{');
    self.indent += 1;
    let start = self.out.len();
    self.write_body(obj)?;
    self.indent -= 1;
    if self.out.len() > start {
      self.out.push('\n');
      self.push_indent();
    }
    self.out.push('}');
    Ok(())
  }

  fn write_value(&mut self, ty: &'static Type, value: FieldValue) -> Result<()> {
    let (inner_ty, _is_const, is_shared, _is_nullable) = ty.unwrap_modified();
    match value {
      FieldValue::Null => {
        self.out.push_str("null");
        Ok(())
      }
      FieldValue::Bool(b) => {
        self.out.push_str(if b { "true" } else { "false" });
        Ok(())
      }
      FieldValue::Int(n) => {
        let _ = write!(self.out, "{}", n);
        Ok(())
      }
      FieldValue::Float(f) => {
        let _ = write!(self.out, "{}", format_float(f as f64));
        Ok(())
      }
      FieldValue::Double(d) => {
        let _ = write!(self.out, "{}", format_float(d));
        Ok(())
      }
      FieldValue::String(s) => {
        self.write_quoted_string(&s);
        Ok(())
      }
      FieldValue::Bytes(b) => {
        self.write_bytes_literal(&b);
        Ok(())
      }
      FieldValue::Enum(v) => {
        let descriptor = inner_ty
          .as_enum()
          .ok_or_else(|| io_err("enum value written for a non-enum field"))?;
        let name = descriptor
          .name_of(v)
          .ok_or_else(|| io_err(format!("enum ordinal {} has no name in `{}`", v, descriptor.name)))?;
        self.out.push_str(name);
        Ok(())
      }
      FieldValue::Struct(obj) => self.write_struct_value(is_shared, &obj),
      FieldValue::List(items) | FieldValue::Set(items) => self.write_list(inner_ty, items),
      FieldValue::Map(entries) => self.write_map(inner_ty, entries),
    }
  }

  /// Writes a struct-typed field value. Shared fields are written
  /// literally with a trailing `#id` on first occurrence, and as a bare
  /// `%id` back-reference on every later occurrence.
  fn write_struct_value(&mut self, is_shared: bool, obj: &SharedObject) -> Result<()> {
    if !is_shared {
      return self.write_struct_literal(obj);
    }
    let (id, known) = self.refs.intern(obj);
    if known {
      let _ = write!(self.out, "%{}", id);
      Ok(())
    } else {
      self.write_struct_literal(obj)?;
      let _ = write!(self.out, "#{}", id);
      Ok(())
    }
  }

  fn write_list(&mut self, ty: &'static Type, items: Vec<FieldValue>) -> Result<()> {
    let elem_ty = match ty {
      Type::List(e) | Type::Set(e) => *e,
      _ => return Err(io_err("list/set value written for a field without an element type")),
    };
    self.out.push('[');
    for (i, item) in items.into_iter().enumerate() {
      if i > 0 {
        self.out.push(' ');
      }
      self.write_value(elem_ty, item)?;
    }
    self.out.push(']');
    Ok(())
  }

  fn write_map(&mut self, ty: &'static Type, entries: Vec<(FieldValue, FieldValue)>) -> Result<()> {
    let (key_ty, value_ty) = match ty {
      Type::Map(k, v) => (*k, *v),
      _ => return Err(io_err("map value written for a field without key/value types")),
    };
    self.out.push('{');
    for (i, (k, v)) in entries.into_iter().enumerate() {
      if i > 0 {
        self.out.push(' ');
      }
      self.write_value(key_ty, k)?;
      self.out.push_str(": ");
      self.write_value(value_ty, v)?;
    }
    self.out.push('}');
    Ok(())
  }

  fn write_quoted_string(&mut self, s: &str) {
    self.out.push('\'');
    for c in s.chars() {
      match c {
        '\'' => self.out.push_str("\\'"),
        '\\' => self.out.push_str("\\\\"),
        '\n' => self.out.push_str("\\n"),
        '\t' => self.out.push_str("\\t"),
        '\r' => self.out.push_str("\\r"),
        c if (c as u32) < 0x20 => {
          let _ = write!(self.out, "\\x{:02x}", c as u32);
        }
        c => self.out.push(c),
      }
    }
    self.out.push('\'');
  }

  fn write_bytes_literal(&mut self, bytes: &[u8]) {
    self.out.push_str("<[");
    for (i, byte) in bytes.iter().enumerate() {
      if i > 0 {
        self.out.push_str(", ");
      }
      let _ = write!(self.out, "{}", byte);
    }
    self.out.push_str("]>");
  }
}

/// `concrete`'s inheritance chain, root-first.
fn level_chain(concrete: &'static StructDescriptor) -> Vec<&'static StructDescriptor> {
  let mut chain = vec![concrete];
  let mut cur = concrete;
  while let Some(base) = cur.base {
    chain.push(base);
    cur = base;
  }
  chain.reverse();
  chain
}

fn format_float(value: f64) -> String {
  if value.fract() == 0.0 && value.is_finite() {
    format!("{:.1}", value)
  } else {
    format!("{}", value)
  }
}

fn io_err(msg: impl Into<String>) -> CodaError {
  CodaError::Encoding(EncodingError::Io(msg.into()))
}
