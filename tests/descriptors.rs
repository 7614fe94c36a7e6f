use coda::generated::sample::{S1_DESCRIPTOR, S2_DESCRIPTOR, SAMPLE_ENUM};
use coda::registry::TypeRegistry;

#[test]
fn s2_reports_s1_as_its_base() {
  assert!(std::ptr::eq(S2_DESCRIPTOR.base.unwrap(), &S1_DESCRIPTOR));
}

#[test]
fn s2_is_subtype_of_s1_and_of_itself() {
  assert!(S2_DESCRIPTOR.is_subtype_of(&S1_DESCRIPTOR));
  assert!(S2_DESCRIPTOR.is_subtype_of(&S2_DESCRIPTOR));
  assert!(!S1_DESCRIPTOR.is_subtype_of(&S2_DESCRIPTOR));
}

#[test]
fn s2_all_fields_are_base_first_then_own() {
  let fields = S2_DESCRIPTOR.all_fields();
  let names: Vec<&str> = fields.iter().map(|f| f.name).collect();
  let own_index = names.iter().position(|n| *n == "mapEnumStruct").unwrap();
  let base_index = names.iter().position(|n| *n == "scalarBoolean").unwrap();
  assert!(base_index < own_index);
}

#[test]
fn sample_enum_resolves_both_directions() {
  assert_eq!(SAMPLE_ENUM.name_of(1), Some("E1"));
  assert_eq!(SAMPLE_ENUM.number_of("E2"), Some(2));
  assert_eq!(SAMPLE_ENUM.number_of("E3"), None);
}

#[test]
fn registry_resolves_registered_subtype_by_id() {
  let mut registry = TypeRegistry::new();
  registry.register(&S2_DESCRIPTOR).unwrap();
  let resolved = registry.resolve(&S1_DESCRIPTOR, S2_DESCRIPTOR.type_id).unwrap();
  assert!(std::ptr::eq(resolved, &S2_DESCRIPTOR));
}

#[test]
fn registry_resolves_root_for_type_id_zero() {
  let registry = TypeRegistry::new();
  let resolved = registry.resolve(&S1_DESCRIPTOR, 0).unwrap();
  assert!(std::ptr::eq(resolved, &S1_DESCRIPTOR));
}

#[test]
fn registry_resolves_struct_by_name() {
  let mut registry = TypeRegistry::new();
  registry.register(&S2_DESCRIPTOR).unwrap();
  let resolved = registry.resolve_by_name("S2").unwrap();
  assert!(std::ptr::eq(resolved, &S2_DESCRIPTOR));
  assert!(registry.resolve_by_name("Nonexistent").is_none());
}
