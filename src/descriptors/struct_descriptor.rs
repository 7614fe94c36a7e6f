//! `StructDescriptor`: runtime metadata for one struct type.

use crate::descriptors::{EnumDescriptor, FieldDescriptor};
use crate::object::SharedObject;

/// Runtime metadata for one struct type, including its position in a
/// single-inheritance hierarchy.
pub struct StructDescriptor {
  pub name: &'static str,

  /// Stable id within this struct's root-type hierarchy. `0` for a root
  /// type with no base.
  pub type_id: u32,

  pub enclosing: Option<&'static StructDescriptor>,
  pub base: Option<&'static StructDescriptor>,

  /// Fields declared directly on this level of the hierarchy (not
  /// inherited). Sorted ascending by id, as the encoder requires.
  pub own_fields: &'static [FieldDescriptor],

  pub nested_structs: &'static [&'static StructDescriptor],
  pub nested_enums: &'static [&'static EnumDescriptor],

  /// Builds a fresh, mutable, default-valued instance of this struct.
  pub factory: fn() -> SharedObject,

  /// Builds this struct's frozen default instance. Invoked once per
  /// comparison/access rather than cached as a literal `static`, since
  /// `SharedObject` (`Rc<RefCell<dyn Object>>`) is `!Sync`; two instances
  /// it returns always compare equal (see `object::Object::equals`).
  pub default_instance: fn() -> SharedObject,
}

impl std::fmt::Debug for StructDescriptor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StructDescriptor")
      .field("name", &self.name)
      .field("type_id", &self.type_id)
      .finish()
  }
}

impl PartialEq for StructDescriptor {
  fn eq(&self, other: &Self) -> bool {
    std::ptr::eq(self, other)
  }
}

impl StructDescriptor {
  /// The root of this struct's inheritance chain (the base with no base
  /// of its own).
  pub fn root(&'static self) -> &'static StructDescriptor {
    let mut cur = self;
    while let Some(base) = cur.base {
      cur = base;
    }
    cur
  }

  /// Own fields plus every inherited field, base-first.
  pub fn all_fields(&'static self) -> Vec<&'static FieldDescriptor> {
    let mut fields = match self.base {
      Some(base) => base.all_fields(),
      None => Vec::new(),
    };
    fields.extend(self.own_fields.iter());
    fields
  }

  /// Looks up one of this level's own fields by id. Does not search the
  /// base chain, since field ids are only unique within a single level.
  pub fn own_field_by_id(&self, id: u32) -> Option<&'static FieldDescriptor> {
    self.own_fields.iter().find(|f| f.id == id)
  }

  pub fn own_field_by_name(&self, name: &str) -> Option<&'static FieldDescriptor> {
    self.own_fields.iter().find(|f| f.name == name)
  }

  /// Walks the base chain searching each level's own fields, most-derived
  /// first.
  pub fn field_by_name(&'static self, name: &str) -> Option<&'static FieldDescriptor> {
    if let Some(f) = self.own_field_by_name(name) {
      return Some(f);
    }
    self.base.and_then(|b| b.field_by_name(name))
  }

  /// Whether `self` is `other` or derives from it, walking the base chain.
  pub fn is_subtype_of(&'static self, other: &'static StructDescriptor) -> bool {
    let mut cur = Some(self);
    while let Some(d) = cur {
      if std::ptr::eq(d, other) {
        return true;
      }
      cur = d.base;
    }
    false
  }
}

#[cfg(test)]
mod test {
  use super::*;

  static LEAF: StructDescriptor = StructDescriptor {
    name: "Leaf",
    type_id: 0,
    enclosing: None,
    base: None,
    own_fields: &[],
    nested_structs: &[],
    nested_enums: &[],
    factory: || unreachable!(),
    default_instance: || unreachable!(),
  };

  #[test]
  fn root_of_base_free_struct_is_itself() {
    assert!(std::ptr::eq(LEAF.root(), &LEAF));
  }
}
