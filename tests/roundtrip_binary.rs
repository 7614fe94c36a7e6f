use coda::binary::{BinaryDecoder, BinaryEncoder};
use coda::generated::cyclic::{Node, NODE_DESCRIPTOR};
use coda::generated::sample::{S1, S1_DESCRIPTOR, S2, S2_DESCRIPTOR};
use coda::generated::values::{IntegerValue, INTEGER_VALUE_DESCRIPTOR};
use coda::object::Object;
use coda::registry::TypeRegistry;

fn registry_with_sample_hierarchy() -> TypeRegistry {
  let mut registry = TypeRegistry::new();
  registry.register(&S2_DESCRIPTOR).unwrap();
  registry
}

fn sample_s1_with_fixture_data() -> coda::object::SharedObject {
  let obj = S1::new();
  {
    let mut guard = obj.borrow_mut();
    let this = guard.as_any_mut().downcast_mut::<S1>().unwrap();
    this.scalar_boolean = true;
    this.scalar_i16 = 11;
    this.scalar_i32 = -42;
    this.scalar_i64 = 13;
    this.scalar_fixed_i16 = 14;
    this.scalar_fixed_i32 = 12345;
    this.scalar_fixed_i64 = 16;
    this.scalar_float = 1.5;
    this.scalar_double = 2.25;
    this.scalar_string = "hello, coda".to_string();
    this.scalar_bytes = vec![0xde, 0xad, 0xbe, 0xef];
    this.scalar_enum = 2;
    this.list_boolean = vec![true, false, true];
    this.list_int = vec![1, 2, 3, -4];
    this.list_float = vec![110.0, 110.1, 110.2];
    this.list_string = vec!["beta".to_string(), "delta".to_string()];
    this.list_enum = vec![1, 2, 1];
    this.set_int.insert(200);
    this.set_int.insert(201);
    this.set_string.insert("a".to_string());
    this.set_string.insert("b".to_string());
    this.set_enum.insert(1);
    this.set_enum.insert(2);
    this.map_int_string.insert(1, "one".to_string());
    this.map_int_string.insert(2, "two".to_string());
    this.map_string_int.insert("three".to_string(), 3);
    this.map_string_int.insert("four".to_string(), 4);
  }
  obj
}

#[test]
fn scalar_value_round_trips_through_binary() {
  let obj = IntegerValue::new(-7);
  let bytes = BinaryEncoder::new().encode(&obj).unwrap();
  let registry = TypeRegistry::new();
  let decoded = BinaryDecoder::new(&bytes, &registry)
    .decode(&INTEGER_VALUE_DESCRIPTOR)
    .unwrap();
  assert!(obj.borrow().equals(&*decoded.borrow()));
}

#[test]
fn s1_round_trips_through_binary_preserving_all_fields() {
  let obj = sample_s1_with_fixture_data();
  let bytes = BinaryEncoder::new().encode(&obj).unwrap();
  let registry = registry_with_sample_hierarchy();
  let decoded = BinaryDecoder::new(&bytes, &registry)
    .decode(&S1_DESCRIPTOR)
    .unwrap();
  assert!(obj.borrow().equals(&*decoded.borrow()));
}

#[test]
fn fixed_width_and_varint_integer_fields_encode_to_different_byte_lengths() {
  // `scalarI16`/`scalarI64` are plain varint fields; `scalarFixedI16`/
  // `scalarFixedI64` set `FieldOptions::fixed_width`. A small value (14,
  // 16) that fits in one varint byte but forces a fixed 2- or 8-byte
  // payload should make the fixed-width encoding larger.
  let varint_only = S1::new();
  {
    let mut guard = varint_only.borrow_mut();
    let this = guard.as_any_mut().downcast_mut::<S1>().unwrap();
    this.scalar_i16 = 14;
  }
  let fixed_only = S1::new();
  {
    let mut guard = fixed_only.borrow_mut();
    let this = guard.as_any_mut().downcast_mut::<S1>().unwrap();
    this.scalar_fixed_i16 = 14;
  }
  let varint_bytes = BinaryEncoder::new().encode(&varint_only).unwrap();
  let fixed_bytes = BinaryEncoder::new().encode(&fixed_only).unwrap();
  assert!(fixed_bytes.len() > varint_bytes.len());

  let registry = registry_with_sample_hierarchy();
  let decoded = BinaryDecoder::new(&fixed_bytes, &registry).decode(&S1_DESCRIPTOR).unwrap();
  assert!(fixed_only.borrow().equals(&*decoded.borrow()));
}

#[test]
fn s2_subtype_round_trips_when_decoded_as_its_base() {
  let obj = S2::new();
  {
    let mut guard = obj.borrow_mut();
    let this = guard.as_any_mut().downcast_mut::<S2>().unwrap();
    this.base.scalar_string = "derived".to_string();
    this.map_enum_struct.insert(1, sample_s1_with_fixture_data());
  }
  let bytes = BinaryEncoder::new().encode(&obj).unwrap();
  let registry = registry_with_sample_hierarchy();
  let decoded = BinaryDecoder::new(&bytes, &registry)
    .decode(&S1_DESCRIPTOR)
    .unwrap();
  assert!(decoded.borrow().is_instance_of(&S2_DESCRIPTOR));
  assert!(obj.borrow().equals(&*decoded.borrow()));
}

#[test]
fn shared_struct_field_round_trips_as_a_single_object() {
  let tail = Node::new();
  tail.borrow_mut().as_any_mut().downcast_mut::<Node>().unwrap().label = "tail".to_string();
  let head = Node::new();
  {
    let mut guard = head.borrow_mut();
    let this = guard.as_any_mut().downcast_mut::<Node>().unwrap();
    this.label = "head".to_string();
    this.next = Some(tail.clone());
  }
  let bytes = BinaryEncoder::new().encode(&head).unwrap();
  let registry = TypeRegistry::new();
  let decoded = BinaryDecoder::new(&bytes, &registry).decode(&NODE_DESCRIPTOR).unwrap();
  assert!(head.borrow().equals(&*decoded.borrow()));
}

#[test]
fn self_referential_node_is_rejected_by_cycle_detection() {
  let node = Node::new();
  {
    let mut guard = node.borrow_mut();
    let this = guard.as_any_mut().downcast_mut::<Node>().unwrap();
    this.label = "loop".to_string();
    this.next = Some(node.clone());
  }
  let result = BinaryEncoder::new().encode(&node);
  assert!(result.is_err());
}

#[test]
fn frozen_s1_rejects_field_mutation() {
  let obj = sample_s1_with_fixture_data();
  obj.borrow_mut().freeze();
  let field = S1_DESCRIPTOR.field_by_name("scalarString").unwrap();
  let result = (field.set)(
    &mut *obj.borrow_mut(),
    coda::object::FieldValue::String("changed".to_string()),
  );
  assert!(result.is_err());
}

#[test]
fn unknown_field_id_is_a_decode_error() {
  // A hand-built stream: field id 99 (past any of S1's own fields) tagged
  // as a zero value, followed by End.
  let mut buf = Vec::new();
  buf.push(0x01); // tag: delta=0 (varint id follows), data type = Zero
  coda::binary::varint::write_uvarint(99, &mut buf);
  buf.push(0x00); // End
  let registry = registry_with_sample_hierarchy();
  let result = BinaryDecoder::new(&buf, &registry).decode(&S1_DESCRIPTOR);
  assert!(result.is_err());
}

#[test]
fn two_frozen_default_instances_compare_equal_across_codecs() {
  let a = (S1_DESCRIPTOR.default_instance)();
  let bytes = BinaryEncoder::new().encode(&a).unwrap();
  let registry = registry_with_sample_hierarchy();
  let decoded = BinaryDecoder::new(&bytes, &registry).decode(&S1_DESCRIPTOR).unwrap();
  let b = (S1_DESCRIPTOR.default_instance)();
  assert!(b.borrow().equals(&*decoded.borrow()));
}
