//! Runtime type-descriptor model: the metadata that drives both wire
//! codecs and the registry's polymorphic subtype dispatch.

mod enum_descriptor;
mod field;
mod file_descriptor;
mod kind;
mod struct_descriptor;

pub use enum_descriptor::{EnumDescriptor, EnumValue};
pub use field::{FieldDescriptor, FieldOptions};
pub use file_descriptor::{FileDescriptor, FileOptions};
pub use kind::{Type, TypeKind};
pub use struct_descriptor::StructDescriptor;
