//! Hand-written stand-ins for what the (out-of-scope) code generator
//! would emit from a schema file: one Rust struct per schema struct, its
//! `StructDescriptor`/`FieldDescriptor` statics, and an `Object` impl.
//!
//! Field values in the original `test_textcodec.cpp` fixtures are mirrored
//! here so the test suite exercises the same data the original runtime
//! does; see DESIGN.md.

pub mod cyclic;
pub mod sample;
pub mod values;

/// Implements the common `Object` boilerplate for a generated record
/// type: descriptor lookup, the mutability flag, freeze, the `dyn Any`/
/// `dyn Object` up/downcasts, and a descriptor-driven deep clone. Each
/// record still hand-writes its own `FieldDescriptor` get/set closures,
/// since those know the concrete Rust field types.
macro_rules! impl_object {
  ($ty:ty, $descriptor:expr) => {
    impl crate::object::Object for $ty {
      fn descriptor(&self) -> &'static crate::descriptors::StructDescriptor {
        $descriptor
      }

      fn is_mutable(&self) -> bool {
        self.mutable
      }

      fn freeze(&mut self) {
        if !self.mutable {
          return;
        }
        self.mutable = false;
        for field in self.descriptor().all_fields() {
          crate::object::freeze_field_value(&(field.get)(self));
        }
      }

      fn as_object(&self) -> &dyn crate::object::Object {
        self
      }

      fn as_object_mut(&mut self) -> &mut dyn crate::object::Object {
        self
      }

      fn as_any(&self) -> &dyn std::any::Any {
        self
      }

      fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
      }

      fn clone_object(&self) -> crate::object::SharedObject {
        let fresh = (self.descriptor().factory)();
        for field in self.descriptor().all_fields() {
          let value = crate::object::clone_field_value(field.ty, &(field.get)(self));
          (field.set)(&mut *fresh.borrow_mut(), value).expect("a freshly constructed instance is always mutable");
        }
        fresh
      }
    }
  };
}

pub(crate) use impl_object;
