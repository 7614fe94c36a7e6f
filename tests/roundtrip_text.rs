use coda::generated::cyclic::{Node, NODE_DESCRIPTOR};
use coda::generated::sample::{S1, S1_DESCRIPTOR, S2, S2_DESCRIPTOR};
use coda::object::Object;
use coda::registry::TypeRegistry;
use coda::text::{TextEncoder, TextParser};

fn registry_with_sample_hierarchy() -> TypeRegistry {
  let mut registry = TypeRegistry::new();
  registry.register(&S2_DESCRIPTOR).unwrap();
  registry
}

#[test]
fn s1_round_trips_through_text() {
  let obj = S1::new();
  {
    let mut guard = obj.borrow_mut();
    let this = guard.as_any_mut().downcast_mut::<S1>().unwrap();
    this.scalar_boolean = true;
    this.scalar_string = "quote ' and newline\n".to_string();
    this.scalar_bytes = vec![1, 2, 3];
    this.list_int = vec![10, 20, 30];
    this.list_string = vec!["alpha".to_string(), "beta".to_string()];
    this.set_enum.insert(1);
    this.map_string_int.insert("three".to_string(), 3);
  }
  let text = TextEncoder::new().encode(&obj).unwrap();
  let registry = registry_with_sample_hierarchy();
  let mut parser = TextParser::new(&text, &registry).unwrap();
  let decoded = parser.parse_document(&S1_DESCRIPTOR).unwrap();
  parser.expect_end().unwrap();
  assert!(obj.borrow().equals(&*decoded.borrow()));
}

#[test]
fn scalar_string_uses_single_quotes_and_rejects_double_quoted_fields() {
  let obj = S1::new();
  obj.borrow_mut().as_any_mut().downcast_mut::<S1>().unwrap().scalar_string = "alpha".to_string();
  let text = TextEncoder::new().encode(&obj).unwrap();
  assert!(text.contains("scalarString: 'alpha'"));
}

#[test]
fn bytes_literal_is_comma_separated_decimal() {
  let obj = S1::new();
  obj.borrow_mut().as_any_mut().downcast_mut::<S1>().unwrap().scalar_bytes = vec![10, 255, 0];
  let text = TextEncoder::new().encode(&obj).unwrap();
  assert!(text.contains("scalarBytes: <[10, 255, 0]>"));
  let registry = registry_with_sample_hierarchy();
  let mut parser = TextParser::new(&text, &registry).unwrap();
  let decoded = parser.parse_document(&S1_DESCRIPTOR).unwrap();
  assert!(obj.borrow().equals(&*decoded.borrow()));
}

#[test]
fn s2_subtype_is_introduced_by_a_nested_subtype_block() {
  let obj = S2::new();
  obj.borrow_mut().as_any_mut().downcast_mut::<S2>().unwrap().base.scalar_string = "derived".to_string();
  let text = TextEncoder::new().encode(&obj).unwrap();
  assert!(text.contains(&format!("${} (S2): {{", S2_DESCRIPTOR.type_id)));
  let registry = registry_with_sample_hierarchy();
  let mut parser = TextParser::new(&text, &registry).unwrap();
  let decoded = parser.parse_document(&S1_DESCRIPTOR).unwrap();
  assert!(decoded.borrow().is_instance_of(&S2_DESCRIPTOR));
  assert!(obj.borrow().equals(&*decoded.borrow()));
}

#[test]
fn shared_node_uses_trailing_definition_and_back_reference_markers() {
  let tail = Node::new();
  tail.borrow_mut().as_any_mut().downcast_mut::<Node>().unwrap().label = "tail".to_string();
  let head = Node::new();
  {
    let mut guard = head.borrow_mut();
    let this = guard.as_any_mut().downcast_mut::<Node>().unwrap();
    this.label = "head".to_string();
    this.next = Some(tail.clone());
  }
  let text = TextEncoder::new().encode(&head).unwrap();
  assert!(text.contains('#'));
  let registry = TypeRegistry::new();
  let mut parser = TextParser::new(&text, &registry).unwrap();
  let decoded = parser.parse_document(&NODE_DESCRIPTOR).unwrap();
  assert!(head.borrow().equals(&*decoded.borrow()));
}

#[test]
fn single_and_double_quoted_strings_are_both_accepted() {
  let registry = registry_with_sample_hierarchy();
  let mut parser = TextParser::new("scalarString: \"double\"", &registry).unwrap();
  let decoded = parser.parse_document(&S1_DESCRIPTOR).unwrap();
  let field = S1_DESCRIPTOR.field_by_name("scalarString").unwrap();
  assert_eq!((field.get)(&*decoded.borrow()).as_str(), Some("double"));
}

#[test]
fn hex_and_float_suffix_numeric_literals_are_accepted() {
  let registry = registry_with_sample_hierarchy();
  let mut parser = TextParser::new("scalarI32: 0x2a\nscalarFloat: 1.5f", &registry).unwrap();
  let decoded = parser.parse_document(&S1_DESCRIPTOR).unwrap();
  assert_eq!(
    (S1_DESCRIPTOR.field_by_name("scalarI32").unwrap().get)(&*decoded.borrow()).as_int(),
    Some(42)
  );
}

#[test]
fn back_reference_to_an_undefined_shared_object_is_a_parse_error() {
  let registry = TypeRegistry::new();
  let text = "label: 'a'\nnext: %1";
  let mut parser = TextParser::new(text, &registry).unwrap();
  let result = parser.parse_document(&NODE_DESCRIPTOR);
  assert!(result.is_err());
}

#[test]
fn unterminated_string_is_a_parse_error() {
  let registry = registry_with_sample_hierarchy();
  let text = "scalarString: 'unterminated";
  let mut parser = TextParser::new(text, &registry).unwrap();
  let result = parser.parse_document(&S1_DESCRIPTOR);
  assert!(result.is_err());
}

#[test]
fn unknown_field_name_is_a_parse_error() {
  let registry = registry_with_sample_hierarchy();
  let text = "notAField: 1";
  let mut parser = TextParser::new(text, &registry).unwrap();
  let result = parser.parse_document(&S1_DESCRIPTOR);
  assert!(result.is_err());
}

#[test]
fn trailing_garbage_after_document_is_rejected() {
  let registry = registry_with_sample_hierarchy();
  let text = "scalarBoolean: true ]";
  let mut parser = TextParser::new(text, &registry).unwrap();
  parser.parse_document(&S1_DESCRIPTOR).unwrap();
  assert!(parser.expect_end().is_err());
}
