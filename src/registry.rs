//! `TypeRegistry`: resolves `(root type, type id)` pairs to the concrete
//! `StructDescriptor` of a subtype, enabling polymorphic decode.

use crate::descriptors::{FileDescriptor, StructDescriptor};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug)]
pub enum RegistryError {
  /// A `(root, type_id)` pair was registered more than once with
  /// different descriptors.
  Collision {
    root: &'static str,
    type_id: u32,
  },

  /// `register` was called on a struct that isn't a valid subtype: it has
  /// no base (it's a root itself) or its type id is `0`.
  NotASubtype {
    name: &'static str,
  },
}

impl std::fmt::Display for RegistryError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      RegistryError::Collision { root, type_id } => write!(
        f,
        "type id {} already registered under root `{}`",
        type_id, root
      ),
      RegistryError::NotASubtype { name } => write!(
        f,
        "`{}` cannot be registered as a subtype: it has no base, or its type id is 0",
        name
      ),
    }
  }
}

impl std::error::Error for RegistryError {}

/// Maps a root struct (by pointer identity) to the subtype ids declared
/// somewhere in its hierarchy.
#[derive(Default)]
pub struct TypeRegistry {
  // Keyed by the root descriptor's pointer address, since `StructDescriptor`
  // doesn't implement `Hash`/`Eq` beyond pointer identity.
  roots: HashMap<usize, HashMap<u32, &'static StructDescriptor>>,

  /// Fully-qualified name -> descriptor, used by the text format, which
  /// identifies struct types by name rather than by wire id.
  by_name: HashMap<&'static str, &'static StructDescriptor>,
}

impl TypeRegistry {
  pub fn new() -> Self {
    TypeRegistry {
      roots: HashMap::new(),
      by_name: HashMap::new(),
    }
  }

  pub fn resolve_by_name(&self, name: &str) -> Option<&'static StructDescriptor> {
    self.by_name.get(name).copied()
  }

  fn root_key(root: &'static StructDescriptor) -> usize {
    root as *const StructDescriptor as usize
  }

  /// Registers every struct declared in `file` (recursively, through
  /// nested structs) that has a non-null base, inserting it into its
  /// root hierarchy's subtype table.
  pub fn register_file(&mut self, file: &'static FileDescriptor) -> Result<(), RegistryError> {
    for s in file.all_structs() {
      self.by_name.insert(s.name, s);
      if s.base.is_some() {
        self.register(s)?;
      }
    }
    Ok(())
  }

  /// Registers `descriptor` as a subtype, addressable via `resolve` under
  /// `(descriptor.root(), descriptor.type_id)`. Fails if `descriptor` has
  /// no base (it would be the root of its own hierarchy) or its type id
  /// is `0` (reserved for "no subtype", see `resolve`).
  pub fn register(&mut self, descriptor: &'static StructDescriptor) -> Result<(), RegistryError> {
    if descriptor.base.is_none() || descriptor.type_id == 0 {
      return Err(RegistryError::NotASubtype { name: descriptor.name });
    }
    self.by_name.insert(descriptor.name, descriptor);
    let root = descriptor.root();
    let key = Self::root_key(root);
    let table = self.roots.entry(key).or_insert_with(HashMap::new);
    match table.get(&descriptor.type_id) {
      Some(existing) if !std::ptr::eq(*existing, descriptor) => {
        return Err(RegistryError::Collision {
          root: root.name,
          type_id: descriptor.type_id,
        })
      }
      _ => {}
    }
    table.insert(descriptor.type_id, descriptor);
    Ok(())
  }

  /// Resolves `type_id` within `root`'s hierarchy. Returns `root` itself
  /// when `type_id == 0` or no subtype is registered under that id (a
  /// decoder treats this as "read as the expected base type").
  pub fn resolve(
    &self,
    root: &'static StructDescriptor,
    type_id: u32,
  ) -> Option<&'static StructDescriptor> {
    if type_id == 0 {
      return Some(root);
    }
    self
      .roots
      .get(&Self::root_key(root))
      .and_then(|table| table.get(&type_id))
      .copied()
  }
}

/// Process-wide default registry, populated by generated code's
/// `register_defaults` hooks at first use.
pub static DEFAULT_REGISTRY: Lazy<Mutex<TypeRegistry>> = Lazy::new(|| Mutex::new(TypeRegistry::new()));

#[cfg(test)]
mod test {
  use super::*;

  static ROOT: StructDescriptor = StructDescriptor {
    name: "Root",
    type_id: 0,
    enclosing: None,
    base: None,
    own_fields: &[],
    nested_structs: &[],
    nested_enums: &[],
    factory: || unreachable!(),
    default_instance: || unreachable!(),
  };

  static CHILD: StructDescriptor = StructDescriptor {
    name: "Child",
    type_id: 1,
    enclosing: None,
    base: Some(&ROOT),
    own_fields: &[],
    nested_structs: &[],
    nested_enums: &[],
    factory: || unreachable!(),
    default_instance: || unreachable!(),
  };

  static ORPHAN: StructDescriptor = StructDescriptor {
    name: "Orphan",
    type_id: 0,
    enclosing: None,
    base: None,
    own_fields: &[],
    nested_structs: &[],
    nested_enums: &[],
    factory: || unreachable!(),
    default_instance: || unreachable!(),
  };

  static BAD_ID: StructDescriptor = StructDescriptor {
    name: "BadId",
    type_id: 0,
    enclosing: None,
    base: Some(&ROOT),
    own_fields: &[],
    nested_structs: &[],
    nested_enums: &[],
    factory: || unreachable!(),
    default_instance: || unreachable!(),
  };

  #[test]
  fn resolve_finds_registered_subtype() {
    let mut reg = TypeRegistry::new();
    reg.register(&CHILD).unwrap();
    let resolved = reg.resolve(&ROOT, 1).unwrap();
    assert!(std::ptr::eq(resolved, &CHILD));
  }

  #[test]
  fn resolve_zero_returns_root() {
    let reg = TypeRegistry::new();
    let resolved = reg.resolve(&ROOT, 0).unwrap();
    assert!(std::ptr::eq(resolved, &ROOT));
  }

  #[test]
  fn duplicate_registration_of_same_descriptor_is_fine() {
    let mut reg = TypeRegistry::new();
    reg.register(&CHILD).unwrap();
    reg.register(&CHILD).unwrap();
  }

  #[test]
  fn registering_a_root_with_no_base_is_rejected() {
    let mut reg = TypeRegistry::new();
    let err = reg.register(&ORPHAN).unwrap_err();
    assert!(matches!(err, RegistryError::NotASubtype { name: "Orphan" }));
  }

  #[test]
  fn registering_a_zero_type_id_is_rejected() {
    let mut reg = TypeRegistry::new();
    let err = reg.register(&BAD_ID).unwrap_err();
    assert!(matches!(err, RegistryError::NotASubtype { name: "BadId" }));
  }
}
