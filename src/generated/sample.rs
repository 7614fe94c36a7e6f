//! `SampleEnum`, `S1`, and `S2` (`S2 extends S1`), mirroring the field
//! names and fixture values used throughout
//! `original_source/test/cpp/test_textcodec.cpp`.

use crate::descriptors::{
  EnumDescriptor, EnumValue, FieldDescriptor, FieldOptions, StructDescriptor, Type,
};
use crate::error::Result;
use crate::object::{guard_mutable, FieldValue, Object, SharedObject};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use super::impl_object;

pub static SAMPLE_ENUM_VALUES: &[EnumValue] = &[
  EnumValue { name: "E1", number: 1 },
  EnumValue { name: "E2", number: 2 },
];

pub static SAMPLE_ENUM: EnumDescriptor = EnumDescriptor {
  name: "SampleEnum",
  values: SAMPLE_ENUM_VALUES,
};

static SAMPLE_ENUM_TYPE: Type = Type::Enum(&SAMPLE_ENUM);
static BOOL_TYPE: Type = Type::Bool;
static VARINT_I16_TYPE: Type = Type::Integer { bits: 16 };
static VARINT_I32_TYPE: Type = Type::Integer { bits: 32 };
static VARINT_I64_TYPE: Type = Type::Integer { bits: 64 };
static FIXED_I16_TYPE: Type = Type::Integer { bits: 16 };
static FIXED_I32_TYPE: Type = Type::Integer { bits: 32 };
static FIXED_I64_TYPE: Type = Type::Integer { bits: 64 };
static FLOAT_TYPE: Type = Type::Float;
static DOUBLE_TYPE: Type = Type::Double;
static STRING_TYPE: Type = Type::String;
static BYTES_TYPE: Type = Type::Bytes;
static LIST_INT_ELEM: Type = Type::Integer { bits: 32 };
static LIST_INT_TYPE: Type = Type::List(&LIST_INT_ELEM);
static LIST_BOOLEAN_ELEM: Type = Type::Bool;
static LIST_BOOLEAN_TYPE: Type = Type::List(&LIST_BOOLEAN_ELEM);
static LIST_FLOAT_ELEM: Type = Type::Float;
static LIST_FLOAT_TYPE: Type = Type::List(&LIST_FLOAT_ELEM);
static LIST_STRING_ELEM: Type = Type::String;
static LIST_STRING_TYPE: Type = Type::List(&LIST_STRING_ELEM);
static LIST_ENUM_ELEM: Type = Type::Enum(&SAMPLE_ENUM);
static LIST_ENUM_TYPE: Type = Type::List(&LIST_ENUM_ELEM);
static SET_STRING_ELEM: Type = Type::String;
static SET_STRING_TYPE: Type = Type::Set(&SET_STRING_ELEM);
static SET_INT_ELEM: Type = Type::Integer { bits: 32 };
static SET_INT_TYPE: Type = Type::Set(&SET_INT_ELEM);
static SET_ENUM_ELEM: Type = Type::Enum(&SAMPLE_ENUM);
static SET_ENUM_TYPE: Type = Type::Set(&SET_ENUM_ELEM);
static MAP_INT_STRING_KEY: Type = Type::Integer { bits: 32 };
static MAP_INT_STRING_VALUE: Type = Type::String;
static MAP_INT_STRING_TYPE: Type = Type::Map(&MAP_INT_STRING_KEY, &MAP_INT_STRING_VALUE);
static MAP_STRING_INT_KEY: Type = Type::String;
static MAP_STRING_INT_VALUE: Type = Type::Integer { bits: 32 };
static MAP_STRING_INT_TYPE: Type = Type::Map(&MAP_STRING_INT_KEY, &MAP_STRING_INT_VALUE);
static UNUSED_INNER_TYPE: Type = Type::Integer { bits: 32 };
static UNUSED_TYPE: Type = Type::Modified {
  is_const: false,
  is_shared: false,
  is_nullable: true,
  inner: &UNUSED_INNER_TYPE,
};

/// Root struct of a one-level hierarchy (`S2 extends S1`), holding one
/// field of each scalar, list, set, and map kind the wire formats need to
/// exercise.
pub struct S1 {
  pub mutable: bool,
  pub scalar_boolean: bool,
  pub scalar_i16: i64,
  pub scalar_i32: i64,
  pub scalar_i64: i64,
  pub scalar_fixed_i16: i64,
  pub scalar_fixed_i32: i64,
  pub scalar_fixed_i64: i64,
  pub scalar_float: f32,
  pub scalar_double: f64,
  pub scalar_string: String,
  pub scalar_bytes: Vec<u8>,
  pub scalar_enum: i32,
  pub list_boolean: Vec<bool>,
  pub list_int: Vec<i64>,
  pub list_float: Vec<f32>,
  pub list_string: Vec<String>,
  pub list_enum: Vec<i32>,
  pub set_int: HashSet<i64>,
  pub set_string: HashSet<String>,
  pub set_enum: HashSet<i32>,
  pub map_int_string: HashMap<i64, String>,
  pub map_string_int: HashMap<String, i64>,
  pub unused: Option<i64>,
}

impl Default for S1 {
  fn default() -> Self {
    S1 {
      mutable: true,
      scalar_boolean: false,
      scalar_i16: 0,
      scalar_i32: 0,
      scalar_i64: 0,
      scalar_fixed_i16: 0,
      scalar_fixed_i32: 0,
      scalar_fixed_i64: 0,
      scalar_float: 0.0,
      scalar_double: 0.0,
      scalar_string: String::new(),
      scalar_bytes: Vec::new(),
      scalar_enum: SAMPLE_ENUM.values[0].number,
      list_boolean: Vec::new(),
      list_int: Vec::new(),
      list_float: Vec::new(),
      list_string: Vec::new(),
      list_enum: Vec::new(),
      set_int: HashSet::new(),
      set_string: HashSet::new(),
      set_enum: HashSet::new(),
      map_int_string: HashMap::new(),
      map_string_int: HashMap::new(),
      unused: None,
    }
  }
}

impl S1 {
  pub fn new() -> SharedObject {
    Rc::new(RefCell::new(S1::default()))
  }
}

fn s1_default_instance() -> SharedObject {
  let obj = S1::new();
  obj.borrow_mut().freeze();
  obj
}

/// Every S1-level field accessor goes through this instead of a direct
/// `downcast_ref::<S1>()`, since the same accessor runs against an S2
/// instance (S2 composes `S1` as its `base` field) whenever a
/// field-access call only has `level = S1_DESCRIPTOR` in hand, e.g. the
/// binary/text codecs reading the base level of a subtype chain.
fn s1_ref(obj: &dyn Object) -> &S1 {
  if let Some(s1) = obj.as_any().downcast_ref::<S1>() {
    return s1;
  }
  &obj.as_any().downcast_ref::<S2>().expect("descriptor/type mismatch").base
}

fn s1_mut(obj: &mut dyn Object) -> &mut S1 {
  if obj.as_any().downcast_ref::<S1>().is_some() {
    return obj.as_any_mut().downcast_mut::<S1>().expect("checked above");
  }
  &mut obj.as_any_mut().downcast_mut::<S2>().expect("descriptor/type mismatch").base
}

macro_rules! field_accessor {
  ($get_fn:ident, $set_fn:ident, $field:ident, $variant:ident) => {
    fn $get_fn(obj: &dyn Object) -> FieldValue {
      FieldValue::$variant(s1_ref(obj).$field.clone())
    }

    fn $set_fn(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
      let mutable = obj.is_mutable();
      let name = obj.descriptor().name;
      let this = s1_mut(obj);
      guard_mutable(mutable, name, || {
        if let FieldValue::$variant(v) = value {
          this.$field = v;
        }
      })
    }
  };
}

macro_rules! int_field_accessor {
  ($get_fn:ident, $set_fn:ident, $field:ident) => {
    fn $get_fn(obj: &dyn Object) -> FieldValue {
      FieldValue::Int(s1_ref(obj).$field)
    }

    fn $set_fn(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
      let mutable = obj.is_mutable();
      let name = obj.descriptor().name;
      let this = s1_mut(obj);
      guard_mutable(mutable, name, || {
        if let FieldValue::Int(v) = value {
          this.$field = v;
        }
      })
    }
  };
}

field_accessor!(s1_get_scalar_boolean, s1_set_scalar_boolean, scalar_boolean, Bool);
field_accessor!(s1_get_scalar_float, s1_set_scalar_float, scalar_float, Float);
field_accessor!(s1_get_scalar_double, s1_set_scalar_double, scalar_double, Double);
field_accessor!(s1_get_scalar_string, s1_set_scalar_string, scalar_string, String);
field_accessor!(s1_get_scalar_bytes, s1_set_scalar_bytes, scalar_bytes, Bytes);

int_field_accessor!(s1_get_scalar_i16, s1_set_scalar_i16, scalar_i16);
int_field_accessor!(s1_get_scalar_i32, s1_set_scalar_i32, scalar_i32);
int_field_accessor!(s1_get_scalar_i64, s1_set_scalar_i64, scalar_i64);
int_field_accessor!(s1_get_scalar_fixed_i16, s1_set_scalar_fixed_i16, scalar_fixed_i16);
int_field_accessor!(s1_get_scalar_fixed_i32, s1_set_scalar_fixed_i32, scalar_fixed_i32);
int_field_accessor!(s1_get_scalar_fixed_i64, s1_set_scalar_fixed_i64, scalar_fixed_i64);

fn s1_get_scalar_enum(obj: &dyn Object) -> FieldValue {
  FieldValue::Enum(s1_ref(obj).scalar_enum)
}

fn s1_set_scalar_enum(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
  let mutable = obj.is_mutable();
  let name = obj.descriptor().name;
  let this = s1_mut(obj);
  guard_mutable(mutable, name, || {
    if let FieldValue::Enum(v) = value {
      this.scalar_enum = v;
    }
  })
}

fn s1_get_list_boolean(obj: &dyn Object) -> FieldValue {
  FieldValue::List(s1_ref(obj).list_boolean.iter().map(|v| FieldValue::Bool(*v)).collect())
}

fn s1_set_list_boolean(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
  let mutable = obj.is_mutable();
  let name = obj.descriptor().name;
  let this = s1_mut(obj);
  guard_mutable(mutable, name, || {
    if let FieldValue::List(items) = value {
      this.list_boolean = items.into_iter().filter_map(|v| v.as_bool()).collect();
    }
  })
}

fn s1_get_list_int(obj: &dyn Object) -> FieldValue {
  FieldValue::List(s1_ref(obj).list_int.iter().map(|v| FieldValue::Int(*v)).collect())
}

fn s1_set_list_int(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
  let mutable = obj.is_mutable();
  let name = obj.descriptor().name;
  let this = s1_mut(obj);
  guard_mutable(mutable, name, || {
    if let FieldValue::List(items) = value {
      this.list_int = items.into_iter().filter_map(|v| v.as_int()).collect();
    }
  })
}

fn s1_get_list_float(obj: &dyn Object) -> FieldValue {
  FieldValue::List(s1_ref(obj).list_float.iter().map(|v| FieldValue::Float(*v)).collect())
}

fn s1_set_list_float(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
  let mutable = obj.is_mutable();
  let name = obj.descriptor().name;
  let this = s1_mut(obj);
  guard_mutable(mutable, name, || {
    if let FieldValue::List(items) = value {
      this.list_float = items
        .into_iter()
        .filter_map(|v| match v {
          FieldValue::Float(f) => Some(f),
          _ => None,
        })
        .collect();
    }
  })
}

fn s1_get_list_string(obj: &dyn Object) -> FieldValue {
  FieldValue::List(s1_ref(obj).list_string.iter().map(|v| FieldValue::String(v.clone())).collect())
}

fn s1_set_list_string(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
  let mutable = obj.is_mutable();
  let name = obj.descriptor().name;
  let this = s1_mut(obj);
  guard_mutable(mutable, name, || {
    if let FieldValue::List(items) = value {
      this.list_string = items.into_iter().filter_map(|v| v.as_str().map(str::to_string)).collect();
    }
  })
}

fn s1_get_list_enum(obj: &dyn Object) -> FieldValue {
  FieldValue::List(s1_ref(obj).list_enum.iter().map(|v| FieldValue::Enum(*v)).collect())
}

fn s1_set_list_enum(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
  let mutable = obj.is_mutable();
  let name = obj.descriptor().name;
  let this = s1_mut(obj);
  guard_mutable(mutable, name, || {
    if let FieldValue::List(items) = value {
      this.list_enum = items
        .into_iter()
        .filter_map(|v| match v {
          FieldValue::Enum(n) => Some(n),
          _ => None,
        })
        .collect();
    }
  })
}

fn s1_get_set_int(obj: &dyn Object) -> FieldValue {
  let this = s1_ref(obj);
  let mut items: Vec<&i64> = this.set_int.iter().collect();
  items.sort();
  FieldValue::Set(items.into_iter().map(|v| FieldValue::Int(*v)).collect())
}

fn s1_set_set_int(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
  let mutable = obj.is_mutable();
  let name = obj.descriptor().name;
  let this = s1_mut(obj);
  guard_mutable(mutable, name, || {
    if let FieldValue::Set(items) = value {
      this.set_int = items.into_iter().filter_map(|v| v.as_int()).collect();
    }
  })
}

fn s1_get_set_string(obj: &dyn Object) -> FieldValue {
  let this = s1_ref(obj);
  let mut items: Vec<&String> = this.set_string.iter().collect();
  items.sort();
  FieldValue::Set(items.into_iter().map(|s| FieldValue::String(s.clone())).collect())
}

fn s1_set_set_string(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
  let mutable = obj.is_mutable();
  let name = obj.descriptor().name;
  let this = s1_mut(obj);
  guard_mutable(mutable, name, || {
    if let FieldValue::Set(items) = value {
      this.set_string = items.into_iter().filter_map(|v| v.as_str().map(str::to_string)).collect();
    }
  })
}

fn s1_get_set_enum(obj: &dyn Object) -> FieldValue {
  let this = s1_ref(obj);
  let mut items: Vec<&i32> = this.set_enum.iter().collect();
  items.sort();
  FieldValue::Set(items.into_iter().map(|v| FieldValue::Enum(*v)).collect())
}

fn s1_set_set_enum(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
  let mutable = obj.is_mutable();
  let name = obj.descriptor().name;
  let this = s1_mut(obj);
  guard_mutable(mutable, name, || {
    if let FieldValue::Set(items) = value {
      this.set_enum = items
        .into_iter()
        .filter_map(|v| match v {
          FieldValue::Enum(n) => Some(n),
          _ => None,
        })
        .collect();
    }
  })
}

fn s1_get_map_int_string(obj: &dyn Object) -> FieldValue {
  let this = s1_ref(obj);
  let mut entries: Vec<(&i64, &String)> = this.map_int_string.iter().collect();
  entries.sort_by_key(|(k, _)| **k);
  FieldValue::Map(
    entries
      .into_iter()
      .map(|(k, v)| (FieldValue::Int(*k), FieldValue::String(v.clone())))
      .collect(),
  )
}

fn s1_set_map_int_string(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
  let mutable = obj.is_mutable();
  let name = obj.descriptor().name;
  let this = s1_mut(obj);
  guard_mutable(mutable, name, || {
    if let FieldValue::Map(entries) = value {
      this.map_int_string = entries
        .into_iter()
        .filter_map(|(k, v)| Some((k.as_int()?, v.as_str()?.to_string())))
        .collect();
    }
  })
}

fn s1_get_map_string_int(obj: &dyn Object) -> FieldValue {
  let this = s1_ref(obj);
  let mut entries: Vec<(&String, &i64)> = this.map_string_int.iter().collect();
  entries.sort();
  FieldValue::Map(
    entries
      .into_iter()
      .map(|(k, v)| (FieldValue::String(k.clone()), FieldValue::Int(*v)))
      .collect(),
  )
}

fn s1_set_map_string_int(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
  let mutable = obj.is_mutable();
  let name = obj.descriptor().name;
  let this = s1_mut(obj);
  guard_mutable(mutable, name, || {
    if let FieldValue::Map(entries) = value {
      this.map_string_int = entries
        .into_iter()
        .filter_map(|(k, v)| Some((k.as_str()?.to_string(), v.as_int()?)))
        .collect();
    }
  })
}

fn s1_get_unused(obj: &dyn Object) -> FieldValue {
  match s1_ref(obj).unused {
    Some(v) => FieldValue::Int(v),
    None => FieldValue::Null,
  }
}

fn s1_set_unused(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
  let mutable = obj.is_mutable();
  let name = obj.descriptor().name;
  let this = s1_mut(obj);
  guard_mutable(mutable, name, || match value {
    FieldValue::Int(v) => this.unused = Some(v),
    FieldValue::Null => this.unused = None,
    _ => {}
  })
}

static S1_FIELDS: &[FieldDescriptor] = &[
  FieldDescriptor {
    name: "scalarBoolean",
    id: 1,
    ty: &BOOL_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_scalar_boolean,
    set: s1_set_scalar_boolean,
  },
  FieldDescriptor {
    name: "scalarI32",
    id: 2,
    ty: &VARINT_I32_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_scalar_i32,
    set: s1_set_scalar_i32,
  },
  FieldDescriptor {
    name: "scalarFixedI32",
    id: 3,
    ty: &FIXED_I32_TYPE,
    options: FieldOptions { fixed_width: true, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_scalar_fixed_i32,
    set: s1_set_scalar_fixed_i32,
  },
  FieldDescriptor {
    name: "scalarFloat",
    id: 4,
    ty: &FLOAT_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_scalar_float,
    set: s1_set_scalar_float,
  },
  FieldDescriptor {
    name: "scalarDouble",
    id: 5,
    ty: &DOUBLE_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_scalar_double,
    set: s1_set_scalar_double,
  },
  FieldDescriptor {
    name: "scalarString",
    id: 6,
    ty: &STRING_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_scalar_string,
    set: s1_set_scalar_string,
  },
  FieldDescriptor {
    name: "scalarBytes",
    id: 7,
    ty: &BYTES_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_scalar_bytes,
    set: s1_set_scalar_bytes,
  },
  FieldDescriptor {
    name: "scalarEnum",
    id: 8,
    ty: &SAMPLE_ENUM_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_scalar_enum,
    set: s1_set_scalar_enum,
  },
  FieldDescriptor {
    name: "listInt",
    id: 9,
    ty: &LIST_INT_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_list_int,
    set: s1_set_list_int,
  },
  FieldDescriptor {
    name: "setString",
    id: 10,
    ty: &SET_STRING_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_set_string,
    set: s1_set_set_string,
  },
  FieldDescriptor {
    name: "mapIntString",
    id: 11,
    ty: &MAP_INT_STRING_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_map_int_string,
    set: s1_set_map_int_string,
  },
  FieldDescriptor {
    name: "scalarI16",
    id: 12,
    ty: &VARINT_I16_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_scalar_i16,
    set: s1_set_scalar_i16,
  },
  FieldDescriptor {
    name: "scalarI64",
    id: 13,
    ty: &VARINT_I64_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_scalar_i64,
    set: s1_set_scalar_i64,
  },
  FieldDescriptor {
    name: "scalarFixedI16",
    id: 14,
    ty: &FIXED_I16_TYPE,
    options: FieldOptions { fixed_width: true, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_scalar_fixed_i16,
    set: s1_set_scalar_fixed_i16,
  },
  FieldDescriptor {
    name: "scalarFixedI64",
    id: 15,
    ty: &FIXED_I64_TYPE,
    options: FieldOptions { fixed_width: true, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_scalar_fixed_i64,
    set: s1_set_scalar_fixed_i64,
  },
  FieldDescriptor {
    name: "listBoolean",
    id: 16,
    ty: &LIST_BOOLEAN_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_list_boolean,
    set: s1_set_list_boolean,
  },
  FieldDescriptor {
    name: "listFloat",
    id: 17,
    ty: &LIST_FLOAT_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_list_float,
    set: s1_set_list_float,
  },
  FieldDescriptor {
    name: "listString",
    id: 18,
    ty: &LIST_STRING_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_list_string,
    set: s1_set_list_string,
  },
  FieldDescriptor {
    name: "listEnum",
    id: 19,
    ty: &LIST_ENUM_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_list_enum,
    set: s1_set_list_enum,
  },
  FieldDescriptor {
    name: "setInt",
    id: 20,
    ty: &SET_INT_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_set_int,
    set: s1_set_set_int,
  },
  FieldDescriptor {
    name: "setEnum",
    id: 21,
    ty: &SET_ENUM_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_set_enum,
    set: s1_set_set_enum,
  },
  FieldDescriptor {
    name: "mapStringInt",
    id: 22,
    ty: &MAP_STRING_INT_TYPE,
    options: FieldOptions { fixed_width: false, nullable: false, shared: false },
    presence_bit: None,
    get: s1_get_map_string_int,
    set: s1_set_map_string_int,
  },
  FieldDescriptor {
    name: "unused",
    id: 23,
    ty: &UNUSED_TYPE,
    options: FieldOptions { fixed_width: false, nullable: true, shared: false },
    presence_bit: None,
    get: s1_get_unused,
    set: s1_set_unused,
  },
];

pub static S1_DESCRIPTOR: StructDescriptor = StructDescriptor {
  name: "S1",
  type_id: 0,
  enclosing: None,
  base: None,
  own_fields: S1_FIELDS,
  nested_structs: &[],
  nested_enums: &[&SAMPLE_ENUM],
  factory: S1::new,
  default_instance: s1_default_instance,
};

impl_object!(S1, &S1_DESCRIPTOR);

/// `S2 extends S1`, adding one field whose value type (`Map<SampleEnum,
/// S1>`) exercises struct-valued map entries and subtype framing at once.
pub struct S2 {
  pub base: S1,
  pub map_enum_struct: HashMap<i32, SharedObject>,
}

impl Default for S2 {
  fn default() -> Self {
    S2 {
      base: S1::default(),
      map_enum_struct: HashMap::new(),
    }
  }
}

impl S2 {
  pub fn new() -> SharedObject {
    Rc::new(RefCell::new(S2::default()))
  }
}

fn s2_default_instance() -> SharedObject {
  let obj = S2::new();
  obj.borrow_mut().freeze();
  obj
}

static MAP_ENUM_STRUCT_VALUE_TYPE: Type = Type::Struct(&S1_DESCRIPTOR);
static MAP_ENUM_STRUCT_TYPE: Type = Type::Map(&SAMPLE_ENUM_TYPE, &MAP_ENUM_STRUCT_VALUE_TYPE);

fn s2_get_map_enum_struct(obj: &dyn Object) -> FieldValue {
  let this = obj.as_any().downcast_ref::<S2>().expect("descriptor/type mismatch");
  let mut entries: Vec<(&i32, &SharedObject)> = this.map_enum_struct.iter().collect();
  entries.sort_by_key(|(k, _)| **k);
  FieldValue::Map(
    entries
      .into_iter()
      .map(|(k, v)| (FieldValue::Enum(*k), FieldValue::Struct(v.clone())))
      .collect(),
  )
}

fn s2_set_map_enum_struct(obj: &mut dyn Object, value: FieldValue) -> Result<()> {
  let mutable = obj.is_mutable();
  let name = obj.descriptor().name;
  let this = obj.as_any_mut().downcast_mut::<S2>().expect("descriptor/type mismatch");
  guard_mutable(mutable, name, || {
    if let FieldValue::Map(entries) = value {
      this.map_enum_struct = entries
        .into_iter()
        .filter_map(|(k, v)| {
          let key = match k {
            FieldValue::Enum(n) => n,
            _ => return None,
          };
          let obj = match v {
            FieldValue::Struct(o) => o,
            _ => return None,
          };
          Some((key, obj))
        })
        .collect();
    }
  })
}

static S2_FIELDS: &[FieldDescriptor] = &[FieldDescriptor {
  name: "mapEnumStruct",
  id: 1,
  ty: &MAP_ENUM_STRUCT_TYPE,
  options: FieldOptions { fixed_width: false, nullable: false, shared: false },
  presence_bit: None,
  get: s2_get_map_enum_struct,
  set: s2_set_map_enum_struct,
}];

pub static S2_DESCRIPTOR: StructDescriptor = StructDescriptor {
  name: "S2",
  type_id: 1,
  enclosing: None,
  base: Some(&S1_DESCRIPTOR),
  own_fields: S2_FIELDS,
  nested_structs: &[],
  nested_enums: &[],
  factory: S2::new,
  default_instance: s2_default_instance,
};

impl crate::object::Object for S2 {
  fn descriptor(&self) -> &'static StructDescriptor {
    &S2_DESCRIPTOR
  }

  fn is_mutable(&self) -> bool {
    self.base.mutable
  }

  fn freeze(&mut self) {
    if !self.base.mutable {
      return;
    }
    self.base.mutable = false;
    for field in self.descriptor().all_fields() {
      crate::object::freeze_field_value(&(field.get)(self));
    }
  }

  fn as_object(&self) -> &dyn Object {
    self
  }

  fn as_object_mut(&mut self) -> &mut dyn Object {
    self
  }

  fn as_any(&self) -> &dyn std::any::Any {
    self
  }

  fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
    self
  }

  fn clone_object(&self) -> SharedObject {
    let fresh = (self.descriptor().factory)();
    for field in self.descriptor().all_fields() {
      let value = crate::object::clone_field_value(field.ty, &(field.get)(self));
      (field.set)(&mut *fresh.borrow_mut(), value).expect("a freshly constructed instance is always mutable");
    }
    fresh
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::object::Object;

  fn sample_s1() -> SharedObject {
    let obj = S1::new();
    {
      let mut guard = obj.borrow_mut();
      let this = guard.as_any_mut().downcast_mut::<S1>().unwrap();
      this.scalar_boolean = true;
      this.scalar_i16 = 11;
      this.scalar_i32 = 12;
      this.scalar_i64 = 13;
      this.scalar_fixed_i16 = 14;
      this.scalar_fixed_i32 = 15;
      this.scalar_fixed_i64 = 16;
      this.scalar_float = 55.0;
      this.scalar_double = 56.0;
      this.scalar_string = "alpha\n\t".to_string();
      this.scalar_bytes = b"beta".to_vec();
      this.scalar_enum = 1;
      this.list_boolean = vec![true, false, true];
      this.list_int = vec![100, 101, 102];
      this.list_float = vec![110.0, 110.1, 110.2];
      this.list_string = vec!["beta".to_string(), "delta".to_string()];
      this.list_enum = vec![1, 2, 1];
      this.set_int.insert(200);
      this.set_int.insert(201);
      this.set_string.insert("gamma".to_string());
      this.set_enum.insert(1);
      this.set_enum.insert(2);
      this.map_int_string.insert(300, "three_oh_oh".to_string());
      this.map_string_int.insert("three_oh_oh".to_string(), 300);
    }
    obj
  }

  #[test]
  fn s1_fields_round_trip_through_field_value() {
    let obj = sample_s1();
    let guard = obj.borrow();
    let field = S1_DESCRIPTOR.field_by_name("scalarString").unwrap();
    assert_eq!((field.get)(&*guard).as_str(), Some("alpha\n\t"));
  }

  #[test]
  fn s1_new_scalar_fields_round_trip_through_field_value() {
    let obj = sample_s1();
    let guard = obj.borrow();
    assert_eq!((S1_DESCRIPTOR.field_by_name("scalarI16").unwrap().get)(&*guard).as_int(), Some(11));
    assert_eq!((S1_DESCRIPTOR.field_by_name("scalarI64").unwrap().get)(&*guard).as_int(), Some(13));
    assert_eq!((S1_DESCRIPTOR.field_by_name("scalarFixedI16").unwrap().get)(&*guard).as_int(), Some(14));
    assert_eq!((S1_DESCRIPTOR.field_by_name("scalarFixedI64").unwrap().get)(&*guard).as_int(), Some(16));
  }

  #[test]
  fn s1_unused_field_defaults_to_null() {
    let obj = S1::new();
    let field = S1_DESCRIPTOR.field_by_name("unused").unwrap();
    assert!(matches!((field.get)(&*obj.borrow()), FieldValue::Null));
  }

  #[test]
  fn frozen_s1_rejects_mutation() {
    let obj = sample_s1();
    obj.borrow_mut().freeze();
    let field = S1_DESCRIPTOR.field_by_name("scalarI32").unwrap();
    let result = (field.set)(&mut *obj.borrow_mut(), FieldValue::Int(99));
    assert!(result.is_err());
  }

  #[test]
  fn s2_is_instance_of_s1() {
    let obj = S2::new();
    assert!(obj.borrow().is_instance_of(&S1_DESCRIPTOR));
  }

  #[test]
  fn s2_all_fields_includes_inherited_and_own() {
    let fields = S2_DESCRIPTOR.all_fields();
    assert!(fields.iter().any(|f| f.name == "scalarBoolean"));
    assert!(fields.iter().any(|f| f.name == "mapEnumStruct"));
  }

  #[test]
  fn s1_field_accessors_work_against_an_s2_instance() {
    // S2 composes S1 as its `base` field; an S1-level FieldDescriptor's
    // accessor must still work when invoked against a full S2 object,
    // e.g. when a codec walks S2's base chain using S1_DESCRIPTOR's own
    // fields.
    let obj = S2::new();
    let field = S1_DESCRIPTOR.field_by_name("scalarString").unwrap();
    (field.set)(&mut *obj.borrow_mut(), FieldValue::String("via base".to_string())).unwrap();
    assert_eq!((field.get)(&*obj.borrow()).as_str(), Some("via base"));
  }

  #[test]
  fn two_frozen_default_instances_compare_equal() {
    let a = (S1_DESCRIPTOR.default_instance)();
    let b = (S1_DESCRIPTOR.default_instance)();
    assert!(!a.borrow().is_mutable());
    assert!(a.borrow().equals(&*b.borrow()));
  }
}
