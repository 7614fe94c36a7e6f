//! `FieldDescriptor`: one struct field's static metadata plus its typed
//! accessors.

use crate::descriptors::Type;
use crate::error::Result;
use crate::object::{FieldValue, Object};

/// Options carried by a field, mirroring the schema's per-field modifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldOptions {
  pub fixed_width: bool,
  pub nullable: bool,
  pub shared: bool,
}

/// Static metadata for one field of a `StructDescriptor`, plus the
/// generated accessor functions used to read/write it on a concrete
/// record without raw offsets (see DESIGN.md, "Field storage access").
pub struct FieldDescriptor {
  pub name: &'static str,
  pub id: u32,
  pub ty: &'static Type,
  pub options: FieldOptions,

  /// Index of this field's presence bit, if the schema tracks explicit
  /// presence for it. `None` means "always considered present."
  pub presence_bit: Option<usize>,

  pub get: fn(&dyn Object) -> FieldValue,
  pub set: fn(&mut dyn Object, FieldValue) -> Result<()>,
}

impl std::fmt::Debug for FieldDescriptor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("FieldDescriptor")
      .field("name", &self.name)
      .field("id", &self.id)
      .finish()
  }
}
