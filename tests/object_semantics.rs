use coda::generated::cyclic::Node;
use coda::generated::sample::S1;
use coda::object::{FieldValue, Object};
use std::rc::Rc;

#[test]
fn clone_object_deep_copies_non_shared_list_field() {
  let obj = S1::new();
  obj.borrow_mut().as_any_mut().downcast_mut::<S1>().unwrap().list_int = vec![1, 2, 3];
  let clone = obj.borrow().clone_object();
  clone.borrow_mut().as_any_mut().downcast_mut::<S1>().unwrap().list_int.push(4);
  let original = obj.borrow();
  let original = original.as_any().downcast_ref::<S1>().unwrap();
  assert_eq!(original.list_int, vec![1, 2, 3]);
}

#[test]
fn clone_object_aliases_shared_struct_field() {
  let tail = Node::new();
  let head = Node::new();
  head.borrow_mut().as_any_mut().downcast_mut::<Node>().unwrap().next = Some(tail.clone());
  let clone = head.borrow().clone_object();
  let clone_ref = clone.borrow();
  let clone_node = clone_ref.as_any().downcast_ref::<Node>().unwrap();
  assert!(Rc::ptr_eq(clone_node.next.as_ref().unwrap(), &tail));
}

#[test]
fn equals_compares_structurally_not_by_identity() {
  let a = S1::new();
  let b = S1::new();
  a.borrow_mut().as_any_mut().downcast_mut::<S1>().unwrap().scalar_i32 = 5;
  b.borrow_mut().as_any_mut().downcast_mut::<S1>().unwrap().scalar_i32 = 5;
  assert!(a.borrow().equals(&*b.borrow()));
  b.borrow_mut().as_any_mut().downcast_mut::<S1>().unwrap().scalar_i32 = 6;
  assert!(!a.borrow().equals(&*b.borrow()));
}

#[test]
fn freeze_is_transitive_over_shared_struct_fields() {
  let tail = Node::new();
  let head = Node::new();
  head.borrow_mut().as_any_mut().downcast_mut::<Node>().unwrap().next = Some(tail.clone());
  head.borrow_mut().freeze();
  assert!(!tail.borrow().is_mutable());
}

#[test]
fn setting_a_field_on_a_frozen_object_returns_illegal_mutation() {
  let obj = S1::new();
  obj.borrow_mut().freeze();
  let field = coda::generated::sample::S1_DESCRIPTOR.field_by_name("scalarI32").unwrap();
  let err = (field.set)(&mut *obj.borrow_mut(), FieldValue::Int(1)).unwrap_err();
  match err {
    coda::error::CodaError::IllegalMutation(name) => assert_eq!(name, "S1"),
    other => panic!("expected IllegalMutation, got {:?}", other),
  }
}

#[test]
fn struct_hash_is_stable_across_equal_objects() {
  let a = S1::new();
  let b = S1::new();
  a.borrow_mut().as_any_mut().downcast_mut::<S1>().unwrap().scalar_string = "x".to_string();
  b.borrow_mut().as_any_mut().downcast_mut::<S1>().unwrap().scalar_string = "x".to_string();
  assert_eq!(a.borrow().struct_hash(), b.borrow().struct_hash());
}
