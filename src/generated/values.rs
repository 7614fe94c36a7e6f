//! Single-field wrapper records used by the simple round-trip fixtures in
//! `original_source/test/cpp/test_textcodec.cpp` (`BoolValue`,
//! `IntegerValue`, `StringValue`, `ListValue`).

use crate::descriptors::{FieldDescriptor, FieldOptions, StructDescriptor, Type};
use crate::error::Result;
use crate::object::{guard_mutable, FieldValue, Object, SharedObject};
use std::cell::RefCell;
use std::rc::Rc;

use super::impl_object;

macro_rules! scalar_wrapper {
  ($ty:ident, $descriptor:ident, $field:ident, $variant:ident, $inner:ty, $type_const:expr) => {
    pub struct $ty {
      pub mutable: bool,
      pub value: $inner,
    }

    impl $ty {
      pub fn new(value: $inner) -> SharedObject {
        Rc::new(RefCell::new($ty { mutable: true, value }))
      }

      fn get_value(obj: &dyn Object) -> FieldValue {
        let this = obj.as_any().downcast_ref::<$ty>().expect("descriptor/type mismatch");
        FieldValue::$variant(this.value.clone())
      }

      fn set_value(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
        let mutable = obj.is_mutable();
        let this = obj.as_any_mut().downcast_mut::<$ty>().expect("descriptor/type mismatch");
        let name = $descriptor.name;
        guard_mutable(mutable, name, || {
          if let FieldValue::$variant(v) = value {
            this.value = v;
          }
        })
      }
    }

    static $field: FieldDescriptor = FieldDescriptor {
      name: "value",
      id: 1,
      ty: &$type_const,
      options: FieldOptions { fixed_width: false, nullable: false, shared: false },
      presence_bit: None,
      get: $ty::get_value,
      set: $ty::set_value,
    };

    pub static $descriptor: StructDescriptor = StructDescriptor {
      name: stringify!($ty),
      type_id: 0,
      enclosing: None,
      base: None,
      own_fields: std::slice::from_ref(&$field),
      nested_structs: &[],
      nested_enums: &[],
      factory: || $ty::new(Default::default()),
      default_instance: || {
        let obj = $ty::new(Default::default());
        obj.borrow_mut().freeze();
        obj
      },
    };

    impl_object!($ty, &$descriptor);
  };
}

scalar_wrapper!(BoolValue, BOOL_VALUE_DESCRIPTOR, BOOL_VALUE_FIELD, Bool, bool, Type::Bool);
scalar_wrapper!(IntegerValue, INTEGER_VALUE_DESCRIPTOR, INTEGER_VALUE_FIELD, Int, i64, Type::Integer { bits: 32 });
scalar_wrapper!(StringValue, STRING_VALUE_DESCRIPTOR, STRING_VALUE_FIELD, String, String, Type::String);

pub struct ListValue {
  pub mutable: bool,
  pub value: Vec<i64>,
}

static LIST_VALUE_ELEMENT_TYPE: Type = Type::Integer { bits: 32 };
static LIST_VALUE_TYPE: Type = Type::List(&LIST_VALUE_ELEMENT_TYPE);

impl ListValue {
  pub fn new(value: Vec<i64>) -> SharedObject {
    Rc::new(RefCell::new(ListValue { mutable: true, value }))
  }

  fn get_value(obj: &dyn Object) -> FieldValue {
    let this = obj.as_any().downcast_ref::<ListValue>().expect("descriptor/type mismatch");
    FieldValue::List(this.value.iter().map(|v| FieldValue::Int(*v)).collect())
  }

  fn set_value(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
    let mutable = obj.is_mutable();
    let this = obj.as_any_mut().downcast_mut::<ListValue>().expect("descriptor/type mismatch");
    guard_mutable(mutable, LIST_VALUE_DESCRIPTOR.name, || {
      if let FieldValue::List(items) = value {
        this.value = items.into_iter().filter_map(|v| v.as_int()).collect();
      }
    })
  }
}

static LIST_VALUE_FIELD: FieldDescriptor = FieldDescriptor {
  name: "value",
  id: 1,
  ty: &LIST_VALUE_TYPE,
  options: FieldOptions { fixed_width: false, nullable: false, shared: false },
  presence_bit: None,
  get: ListValue::get_value,
  set: ListValue::set_value,
};

fn list_value_default_instance() -> SharedObject {
  let obj = ListValue::new(Vec::new());
  obj.borrow_mut().freeze();
  obj
}

pub static LIST_VALUE_DESCRIPTOR: StructDescriptor = StructDescriptor {
  name: "ListValue",
  type_id: 0,
  enclosing: None,
  base: None,
  own_fields: std::slice::from_ref(&LIST_VALUE_FIELD),
  nested_structs: &[],
  nested_enums: &[],
  factory: || ListValue::new(Vec::new()),
  default_instance: list_value_default_instance,
};

impl_object!(ListValue, &LIST_VALUE_DESCRIPTOR);

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn integer_value_round_trips_through_field_value() {
    let obj = IntegerValue::new(12);
    let field = &INTEGER_VALUE_FIELD;
    let value = (field.get)(&*obj.borrow());
    assert_eq!(value.as_int(), Some(12));
  }

  #[test]
  fn list_value_holds_fixture_data() {
    let obj = ListValue::new(vec![11, 12, 13]);
    let borrowed = obj.borrow();
    let downcast = borrowed.as_any().downcast_ref::<ListValue>().unwrap();
    assert_eq!(downcast.value, vec![11, 12, 13]);
  }

  #[test]
  fn two_frozen_default_instances_compare_equal() {
    let a = (INTEGER_VALUE_DESCRIPTOR.default_instance)();
    let b = (INTEGER_VALUE_DESCRIPTOR.default_instance)();
    assert!(!a.borrow().is_mutable());
    assert!(a.borrow().equals(&*b.borrow()));
  }
}
