//! The `Object` base protocol and the runtime-typed `FieldValue` carrier.
//!
//! Every generated record implements `Object`. Field access crosses the
//! descriptor boundary as a `FieldValue` rather than a raw memory offset;
//! see the "Field storage access" note in DESIGN.md.

use crate::descriptors::{StructDescriptor, Type};
use crate::error::{CodaError, Result};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Reference-counted, interior-mutable handle to a record. Used uniformly
/// for every struct-valued field, shared or not; see DESIGN.md.
pub type SharedObject = Rc<RefCell<dyn Object>>;

/// A runtime-typed value standing in for one field's payload as it crosses
/// a descriptor's get/set boundary.
#[derive(Clone)]
pub enum FieldValue {
  Bool(bool),
  Int(i64),
  Float(f32),
  Double(f64),
  String(String),
  Bytes(Vec<u8>),
  Enum(i32),
  Struct(SharedObject),
  List(Vec<FieldValue>),
  Set(Vec<FieldValue>),
  Map(Vec<(FieldValue, FieldValue)>),
  Null,
}

impl fmt::Debug for FieldValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FieldValue::Bool(b) => write!(f, "Bool({})", b),
      FieldValue::Int(i) => write!(f, "Int({})", i),
      FieldValue::Float(x) => write!(f, "Float({})", x),
      FieldValue::Double(x) => write!(f, "Double({})", x),
      FieldValue::String(s) => write!(f, "String({:?})", s),
      FieldValue::Bytes(b) => write!(f, "Bytes({} bytes)", b.len()),
      FieldValue::Enum(v) => write!(f, "Enum({})", v),
      FieldValue::Struct(_) => write!(f, "Struct(..)"),
      FieldValue::List(v) => write!(f, "List({} items)", v.len()),
      FieldValue::Set(v) => write!(f, "Set({} items)", v.len()),
      FieldValue::Map(v) => write!(f, "Map({} entries)", v.len()),
      FieldValue::Null => write!(f, "Null"),
    }
  }
}

impl FieldValue {
  pub fn as_bool(&self) -> Option<bool> {
    match self {
      FieldValue::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_int(&self) -> Option<i64> {
    match self {
      FieldValue::Int(i) => Some(*i),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      FieldValue::String(s) => Some(s.as_str()),
      _ => None,
    }
  }

  pub fn as_bytes(&self) -> Option<&[u8]> {
    match self {
      FieldValue::Bytes(b) => Some(b.as_slice()),
      _ => None,
    }
  }

  pub fn typename(&self) -> &'static str {
    match self {
      FieldValue::Bool(_) => "bool",
      FieldValue::Int(_) => "int",
      FieldValue::Float(_) => "float",
      FieldValue::Double(_) => "double",
      FieldValue::String(_) => "string",
      FieldValue::Bytes(_) => "bytes",
      FieldValue::Enum(_) => "enum",
      FieldValue::Struct(_) => "struct",
      FieldValue::List(_) => "list",
      FieldValue::Set(_) => "set",
      FieldValue::Map(_) => "map",
      FieldValue::Null => "null",
    }
  }
}

/// Structural equality over two field values. Struct fields compare by the
/// pointed-to object's own `Object::equals`.
pub fn field_values_equal(a: &FieldValue, b: &FieldValue) -> bool {
  use FieldValue::*;
  match (a, b) {
    (Bool(x), Bool(y)) => x == y,
    (Int(x), Int(y)) => x == y,
    (Float(x), Float(y)) => x.to_bits() == y.to_bits(),
    (Double(x), Double(y)) => x.to_bits() == y.to_bits(),
    (String(x), String(y)) => x == y,
    (Bytes(x), Bytes(y)) => x == y,
    (Enum(x), Enum(y)) => x == y,
    (Struct(x), Struct(y)) => x.borrow().equals(&*y.borrow()),
    (List(x), List(y)) | (Set(x), Set(y)) => {
      x.len() == y.len() && x.iter().zip(y).all(|(a, b)| field_values_equal(a, b))
    }
    (Map(x), Map(y)) => {
      x.len() == y.len()
        && x.iter().zip(y).all(|((ka, va), (kb, vb))| {
          field_values_equal(ka, kb) && field_values_equal(va, vb)
        })
    }
    (Null, Null) => true,
    _ => false,
  }
}

/// Combines a hash value the way the original C++ runtime combines field
/// hashes: a simple odd-multiplier mix, order-sensitive for lists/structs.
pub fn combine_hash(seed: u64, value: u64) -> u64 {
  seed
    .wrapping_mul(1000003)
    .wrapping_add(value)
    .wrapping_add(0x9e3779b97f4a7c15)
}

pub fn hash_field_value(value: &FieldValue) -> u64 {
  use std::collections::hash_map::DefaultHasher;
  use std::hash::{Hash, Hasher};

  match value {
    FieldValue::Bool(b) => *b as u64,
    FieldValue::Int(i) => *i as u64,
    FieldValue::Float(x) => x.to_bits() as u64,
    FieldValue::Double(x) => x.to_bits(),
    FieldValue::String(s) => {
      let mut h = DefaultHasher::new();
      s.hash(&mut h);
      h.finish()
    }
    FieldValue::Bytes(b) => {
      let mut h = DefaultHasher::new();
      b.hash(&mut h);
      h.finish()
    }
    FieldValue::Enum(v) => *v as u64,
    FieldValue::Struct(obj) => obj.borrow().struct_hash(),
    FieldValue::List(items) | FieldValue::Set(items) => {
      items.iter().fold(0u64, |acc, v| combine_hash(acc, hash_field_value(v)))
    }
    FieldValue::Map(entries) => entries.iter().fold(0u64, |acc, (k, v)| {
      combine_hash(combine_hash(acc, hash_field_value(k)), hash_field_value(v))
    }),
    FieldValue::Null => 0,
  }
}

/// Base protocol implemented by every generated record.
pub trait Object {
  /// The descriptor describing this object's dynamic type.
  fn descriptor(&self) -> &'static StructDescriptor;

  /// Whether this object may currently be mutated.
  fn is_mutable(&self) -> bool;

  /// Marks this object (and, transitively, every struct-valued field it
  /// owns) as immutable. Idempotent.
  fn freeze(&mut self);

  /// Upcasts to `&dyn Object` for use with a `FieldDescriptor`'s `get`
  /// accessor, which is written in terms of the trait object.
  fn as_object(&self) -> &dyn Object;

  /// Upcasts to `&mut dyn Object` for use with a `FieldDescriptor`'s `set`
  /// accessor.
  fn as_object_mut(&mut self) -> &mut dyn Object;

  /// Downcasting hook: a `FieldDescriptor`'s `get`/`set` function pointers
  /// are monomorphic to one concrete record type, and recover it from the
  /// `&dyn Object` they're called with through this.
  fn as_any(&self) -> &dyn std::any::Any;
  fn as_any_mut(&mut self) -> &mut dyn std::any::Any;

  /// Tests whether this object's dynamic type is `other` or derives from
  /// it, walking the base chain.
  fn is_instance_of(&self, other: &'static StructDescriptor) -> bool {
    self.descriptor().is_subtype_of(other)
  }

  /// Structural equality: same descriptor and all declared fields equal.
  fn equals(&self, other: &dyn Object) -> bool {
    if !std::ptr::eq(self.descriptor(), other.descriptor()) {
      return false;
    }
    for field in self.descriptor().all_fields() {
      let a = (field.get)(self.as_object());
      let b = (field.get)(other.as_object());
      if !field_values_equal(&a, &b) {
        return false;
      }
    }
    true
  }

  /// A structural hash over all declared fields, order-sensitive for the
  /// field declaration order (base fields first, then own).
  fn struct_hash(&self) -> u64 {
    let mut acc = self.descriptor().type_id as u64;
    for field in self.descriptor().all_fields() {
      acc = combine_hash(acc, hash_field_value(&(field.get)(self.as_object())));
    }
    acc
  }

  /// Produces an independent, mutable deep copy of this object.
  fn clone_object(&self) -> SharedObject;
}

/// Helper for generated setters: returns `IllegalMutation` if `mutable` is
/// false, otherwise runs `body`.
pub fn guard_mutable<T>(mutable: bool, descriptor_name: &str, body: impl FnOnce() -> T) -> Result<T> {
  if !mutable {
    return Err(CodaError::IllegalMutation(descriptor_name.to_string()));
  }
  Ok(body())
}

/// Deep-clones a field value for `Object::clone_object`: owned struct
/// fields are recursively cloned into fresh, independent instances;
/// shared struct fields keep pointing at the same object, since the
/// whole point of marking a field `shared` is that clones may alias it.
pub fn clone_field_value(ty: &'static Type, value: &FieldValue) -> FieldValue {
  let (inner_ty, _is_const, is_shared, _is_nullable) = ty.unwrap_modified();
  match value {
    FieldValue::Struct(obj) => {
      if is_shared {
        FieldValue::Struct(obj.clone())
      } else {
        FieldValue::Struct(obj.borrow().clone_object())
      }
    }
    FieldValue::List(items) => {
      let elem_ty = list_element_type(inner_ty);
      FieldValue::List(items.iter().map(|v| clone_field_value(elem_ty, v)).collect())
    }
    FieldValue::Set(items) => {
      let elem_ty = list_element_type(inner_ty);
      FieldValue::Set(items.iter().map(|v| clone_field_value(elem_ty, v)).collect())
    }
    FieldValue::Map(entries) => {
      let (key_ty, value_ty) = map_key_value_types(inner_ty);
      FieldValue::Map(
        entries
          .iter()
          .map(|(k, v)| (clone_field_value(key_ty, k), clone_field_value(value_ty, v)))
          .collect(),
      )
    }
    other => other.clone(),
  }
}

fn list_element_type(ty: &'static Type) -> &'static Type {
  match ty {
    Type::List(e) | Type::Set(e) => *e,
    _ => ty,
  }
}

fn map_key_value_types(ty: &'static Type) -> (&'static Type, &'static Type) {
  match ty {
    Type::Map(k, v) => (*k, *v),
    _ => (ty, ty),
  }
}

/// Recursively freezes a field value: any struct, list, set, or map
/// contained within is frozen transitively.
pub fn freeze_field_value(value: &FieldValue) {
  match value {
    FieldValue::Struct(obj) => obj.borrow_mut().freeze(),
    FieldValue::List(items) | FieldValue::Set(items) => {
      for item in items {
        freeze_field_value(item);
      }
    }
    FieldValue::Map(entries) => {
      for (k, v) in entries {
        freeze_field_value(k);
        freeze_field_value(v);
      }
    }
    _ => {}
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn field_values_equal_scalars() {
    assert!(field_values_equal(&FieldValue::Int(1), &FieldValue::Int(1)));
    assert!(!field_values_equal(&FieldValue::Int(1), &FieldValue::Int(2)));
    assert!(!field_values_equal(&FieldValue::Int(1), &FieldValue::Bool(true)));
  }

  #[test]
  fn field_values_equal_lists_are_order_sensitive() {
    let a = FieldValue::List(vec![FieldValue::Int(1), FieldValue::Int(2)]);
    let b = FieldValue::List(vec![FieldValue::Int(2), FieldValue::Int(1)]);
    assert!(!field_values_equal(&a, &b));
  }

  #[test]
  fn hash_is_stable_for_equal_values() {
    let a = FieldValue::String("alpha".to_string());
    let b = FieldValue::String("alpha".to_string());
    assert_eq!(hash_field_value(&a), hash_field_value(&b));
  }
}
