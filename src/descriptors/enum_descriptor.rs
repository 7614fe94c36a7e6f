//! `EnumDescriptor`: runtime metadata for one enum type.

/// One labeled value of an enum.
#[derive(Debug, Clone, Copy)]
pub struct EnumValue {
  pub name: &'static str,
  pub number: i32,
}

#[derive(Debug)]
pub struct EnumDescriptor {
  pub name: &'static str,
  pub values: &'static [EnumValue],
}

impl EnumDescriptor {
  pub fn name_of(&self, number: i32) -> Option<&'static str> {
    self.values.iter().find(|v| v.number == number).map(|v| v.name)
  }

  pub fn number_of(&self, name: &str) -> Option<i32> {
    self.values.iter().find(|v| v.name == name).map(|v| v.number)
  }
}
