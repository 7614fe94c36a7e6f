//! `TypeKind` and the `Type` runtime metadata it tags.

use crate::descriptors::{EnumDescriptor, StructDescriptor};

/// The closed set of kinds a `Type` can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
  Bool,
  Integer,
  Float,
  Double,
  String,
  Bytes,
  List,
  Set,
  Map,
  Struct,
  Enum,
  Modified,
}

/// Runtime metadata for one schema type. Built once per distinct type and
/// referenced by `'static` pointer thereafter; see DESIGN.md for why this
/// avoids needing an arena or lifetime parameter.
#[derive(Debug, Clone, Copy)]
pub enum Type {
  Bool,
  Integer { bits: u8 },
  Float,
  Double,
  String,
  Bytes,
  List(&'static Type),
  Set(&'static Type),
  Map(&'static Type, &'static Type),
  Struct(&'static StructDescriptor),
  Enum(&'static EnumDescriptor),
  Modified {
    is_const: bool,
    is_shared: bool,
    is_nullable: bool,
    inner: &'static Type,
  },
}

impl Type {
  pub fn kind(&self) -> TypeKind {
    match self {
      Type::Bool => TypeKind::Bool,
      Type::Integer { .. } => TypeKind::Integer,
      Type::Float => TypeKind::Float,
      Type::Double => TypeKind::Double,
      Type::String => TypeKind::String,
      Type::Bytes => TypeKind::Bytes,
      Type::List(_) => TypeKind::List,
      Type::Set(_) => TypeKind::Set,
      Type::Map(_, _) => TypeKind::Map,
      Type::Struct(_) => TypeKind::Struct,
      Type::Enum(_) => TypeKind::Enum,
      Type::Modified { .. } => TypeKind::Modified,
    }
  }

  /// Strips any `Modified` wrapper, returning the innermost type and the
  /// flags that were unwrapped along the way.
  pub fn unwrap_modified(&'static self) -> (&'static Type, bool, bool, bool) {
    match self {
      Type::Modified {
        is_const,
        is_shared,
        is_nullable,
        inner,
      } => {
        let (t, c, s, n) = inner.unwrap_modified();
        (t, c || *is_const, s || *is_shared, n || *is_nullable)
      }
      other => (other, false, false, false),
    }
  }

  pub fn is_shared(&'static self) -> bool {
    self.unwrap_modified().2
  }

  pub fn as_struct(&self) -> Option<&'static StructDescriptor> {
    match self {
      Type::Struct(d) => Some(*d),
      _ => None,
    }
  }

  pub fn as_enum(&self) -> Option<&'static EnumDescriptor> {
    match self {
      Type::Enum(d) => Some(*d),
      _ => None,
    }
  }
}
