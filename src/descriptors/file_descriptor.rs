//! `FileDescriptor`: groups the structs and enums declared by one schema
//! file and records per-target package options.

use crate::descriptors::{EnumDescriptor, StructDescriptor};

#[derive(Debug, Clone, Copy, Default)]
pub struct FileOptions {
  /// Package name to use when generating code for a given target
  /// language, e.g. `("cpp", "coda::sample")`.
  pub target_packages: &'static [(&'static str, &'static str)],
  pub imports: &'static [&'static str],
}

#[derive(Debug)]
pub struct FileDescriptor {
  pub name: &'static str,
  pub package: &'static str,
  pub structs: &'static [&'static StructDescriptor],
  pub enums: &'static [&'static EnumDescriptor],
  pub options: FileOptions,
}

impl FileDescriptor {
  /// Every struct transitively nested under this file's top-level structs,
  /// including the top-level structs themselves.
  pub fn all_structs(&self) -> Vec<&'static StructDescriptor> {
    fn walk(s: &'static StructDescriptor, out: &mut Vec<&'static StructDescriptor>) {
      out.push(s);
      for nested in s.nested_structs.iter().copied() {
        walk(nested, out);
      }
    }
    let mut out = Vec::new();
    for s in self.structs.iter().copied() {
      walk(s, &mut out);
    }
    out
  }
}
