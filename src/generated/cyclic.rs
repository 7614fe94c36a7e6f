//! `Node`: a self-referential shared struct used to exercise cycle
//! detection and shared-object interning in both wire formats.

use crate::descriptors::{FieldDescriptor, FieldOptions, StructDescriptor, Type};
use crate::error::Result;
use crate::object::{guard_mutable, FieldValue, Object, SharedObject};
use std::cell::RefCell;
use std::rc::Rc;

use super::impl_object;

pub struct Node {
  pub mutable: bool,
  pub label: String,
  pub next: Option<SharedObject>,
}

impl Default for Node {
  fn default() -> Self {
    Node { mutable: true, label: String::new(), next: None }
  }
}

impl Node {
  pub fn new() -> SharedObject {
    Rc::new(RefCell::new(Node::default()))
  }

  fn get_label(obj: &dyn Object) -> FieldValue {
    let this = obj.as_any().downcast_ref::<Node>().expect("descriptor/type mismatch");
    FieldValue::String(this.label.clone())
  }

  fn set_label(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
    let mutable = obj.is_mutable();
    let this = obj.as_any_mut().downcast_mut::<Node>().expect("descriptor/type mismatch");
    guard_mutable(mutable, NODE_DESCRIPTOR.name, || {
      if let FieldValue::String(v) = value {
        this.label = v;
      }
    })
  }

  fn get_next(obj: &dyn Object) -> FieldValue {
    let this = obj.as_any().downcast_ref::<Node>().expect("descriptor/type mismatch");
    match &this.next {
      Some(obj) => FieldValue::Struct(obj.clone()),
      None => FieldValue::Null,
    }
  }

  fn set_next(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
    let mutable = obj.is_mutable();
    let this = obj.as_any_mut().downcast_mut::<Node>().expect("descriptor/type mismatch");
    guard_mutable(mutable, NODE_DESCRIPTOR.name, || match value {
      FieldValue::Struct(o) => this.next = Some(o),
      FieldValue::Null => this.next = None,
      _ => {}
    })
  }
}

static NODE_TYPE: Type = Type::Struct(&NODE_DESCRIPTOR);
static NODE_NEXT_TYPE: Type = Type::Modified {
  is_const: false,
  is_shared: true,
  is_nullable: true,
  inner: &NODE_TYPE,
};

static NODE_FIELDS: &[FieldDescriptor] = &[
  FieldDescriptor {
    name: "label",
    id: 1,
    ty: &Type::String,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: Node::get_label,
    set: Node::set_label,
  },
  FieldDescriptor {
    name: "next",
    id: 2,
    ty: &NODE_NEXT_TYPE,
    options: FieldOptions { fixed_width: false, nullable: true, shared: true },
    presence_bit: None,
    get: Node::get_next,
    set: Node::set_next,
  },
];

fn node_default_instance() -> SharedObject {
  let obj = Node::new();
  obj.borrow_mut().freeze();
  obj
}

pub static NODE_DESCRIPTOR: StructDescriptor = StructDescriptor {
  name: "Node",
  type_id: 0,
  enclosing: None,
  base: None,
  own_fields: NODE_FIELDS,
  nested_structs: &[],
  nested_enums: &[],
  factory: Node::new,
  default_instance: node_default_instance,
};

impl_object!(Node, &NODE_DESCRIPTOR);

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn node_can_point_to_itself() {
    let node = Node::new();
    {
      let mut guard = node.borrow_mut();
      let this = guard.as_any_mut().downcast_mut::<Node>().unwrap();
      this.label = "self-loop".to_string();
      this.next = Some(node.clone());
    }
    let field = NODE_DESCRIPTOR.field_by_name("next").unwrap();
    let value = (field.get)(&*node.borrow());
    match value {
      FieldValue::Struct(o) => assert!(Rc::ptr_eq(&o, &node)),
      _ => panic!("expected a struct value"),
    }
  }

  #[test]
  fn node_chain_round_trips_through_clone() {
    let tail = Node::new();
    tail.borrow_mut().as_any_mut().downcast_mut::<Node>().unwrap().label = "tail".to_string();
    let head = Node::new();
    {
      let mut guard = head.borrow_mut();
      let this = guard.as_any_mut().downcast_mut::<Node>().unwrap();
      this.label = "head".to_string();
      this.next = Some(tail.clone());
    }
    let cloned = head.borrow().clone_object();
    let cloned_ref = cloned.borrow();
    let cloned_node = cloned_ref.as_any().downcast_ref::<Node>().unwrap();
    assert_eq!(cloned_node.label, "head");
    // `next` is a shared field: clones keep aliasing the same tail object.
    assert!(Rc::ptr_eq(cloned_node.next.as_ref().unwrap(), &tail));
  }

  #[test]
  fn two_frozen_default_instances_compare_equal() {
    let a = (NODE_DESCRIPTOR.default_instance)();
    let b = (NODE_DESCRIPTOR.default_instance)();
    assert!(!a.borrow().is_mutable());
    assert!(a.borrow().equals(&*b.borrow()));
  }
}
