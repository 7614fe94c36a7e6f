//! Recursive-descent parser for the canonical text format, materializing
//! parsed values directly against descriptor-declared types.

use crate::descriptors::{FieldDescriptor, StructDescriptor, Type, TypeKind};
use crate::error::{CodaError, ParseError, Result};
use crate::object::{FieldValue, SharedObject};
use crate::registry::TypeRegistry;
use crate::shared::DecoderRefTable;
use crate::text::lexer::Lexer;
use crate::text::token::Token;

pub struct TextParser<'a> {
  lexer: Lexer<'a>,
  current: (Token, usize, usize),
  registry: &'a TypeRegistry,
  refs: DecoderRefTable,
}

impl<'a> TextParser<'a> {
  pub fn new(source: &'a str, registry: &'a TypeRegistry) -> Result<Self> {
    let mut lexer = Lexer::new(source);
    let current = lexer.next_token().map_err(CodaError::Parsing)?;
    Ok(TextParser {
      lexer,
      current,
      registry,
      refs: DecoderRefTable::new(),
    })
  }

  fn err(&self, message: impl Into<String>) -> CodaError {
    let (_, line, column) = &self.current;
    CodaError::Parsing(ParseError {
      path: None,
      line: *line,
      column: *column,
      message: message.into(),
    })
  }

  fn advance(&mut self) -> Result<Token> {
    let next = self.lexer.next_token().map_err(CodaError::Parsing)?;
    Ok(std::mem::replace(&mut self.current, next).0)
  }

  fn expect(&mut self, expected: &Token) -> Result<()> {
    if &self.current.0 == expected {
      self.advance()?;
      Ok(())
    } else {
      Err(self.err(format!(
        "expected {} but found {}",
        expected.describe(),
        self.current.0.describe()
      )))
    }
  }

  fn expect_id(&mut self) -> Result<String> {
    match self.advance()? {
      Token::Id(s) => Ok(s),
      other => Err(self.err(format!("expected identifier, found {}", other.describe()))),
    }
  }

  /// Parses a top-level document: a bare `struct_body` of type `expected`
  /// (or a registered subtype of it, introduced by a nested subtype
  /// block), with no enclosing braces.
  pub fn parse_document(&mut self, expected: &'static StructDescriptor) -> Result<SharedObject> {
    self.parse_struct_fields(expected)
  }

  /// Parses one value, materializing it according to `ty`.
  pub fn parse_value(&mut self, ty: &'static Type) -> Result<FieldValue> {
    let (inner_ty, _is_const, is_shared, is_nullable) = ty.unwrap_modified();
    match &self.current.0 {
      Token::Null => {
        self.advance()?;
        if !is_nullable {
          return Err(self.err("`null` is not permitted for a non-nullable field"));
        }
        Ok(FieldValue::Null)
      }
      Token::True => {
        self.advance()?;
        Ok(FieldValue::Bool(true))
      }
      Token::False => {
        self.advance()?;
        Ok(FieldValue::Bool(false))
      }
      Token::IntVal(_) | Token::FloatVal(_) => self.parse_number(inner_ty),
      Token::Str(_) => self.parse_string_or_bytes(inner_ty),
      Token::BytesOpen => self.parse_bytes_literal(),
      Token::LBracket => self.parse_list_or_set(inner_ty),
      Token::ObjRef(_) => self.parse_struct_ref(is_shared),
      Token::Id(_) => self.parse_enum_value(inner_ty),
      Token::LBrace => match inner_ty.kind() {
        TypeKind::Struct => {
          let struct_ty = inner_ty
            .as_struct()
            .ok_or_else(|| self.err("struct literal used for a non-struct field"))?;
          self.parse_struct_value(struct_ty, is_shared)
        }
        TypeKind::Map => self.parse_map(inner_ty),
        _ => Err(self.err("'{' literal used for a field that is neither a struct nor a map")),
      },
      other => Err(self.err(format!("unexpected token {}", other.describe()))),
    }
  }

  fn parse_number(&mut self, ty: &'static Type) -> Result<FieldValue> {
    let token = self.advance()?;
    match (token, ty.kind()) {
      (Token::IntVal(v), TypeKind::Float) => Ok(FieldValue::Float(v as f32)),
      (Token::IntVal(v), TypeKind::Double) => Ok(FieldValue::Double(v as f64)),
      (Token::IntVal(v), TypeKind::Enum) => Ok(FieldValue::Enum(v as i32)),
      (Token::IntVal(v), _) => Ok(FieldValue::Int(v)),
      (Token::FloatVal(v), TypeKind::Float) => Ok(FieldValue::Float(v as f32)),
      (Token::FloatVal(v), TypeKind::Double) => Ok(FieldValue::Double(v)),
      (Token::FloatVal(_), _) => Err(self.err("float literal used for a non-floating field")),
      _ => unreachable!("caller only dispatches numeric tokens here"),
    }
  }

  fn parse_string_or_bytes(&mut self, ty: &'static Type) -> Result<FieldValue> {
    match self.advance()? {
      Token::Str(s) => match ty.kind() {
        TypeKind::Bytes => Ok(FieldValue::Bytes(s.into_bytes())),
        _ => Ok(FieldValue::String(s)),
      },
      _ => unreachable!(),
    }
  }

  fn parse_bytes_literal(&mut self) -> Result<FieldValue> {
    self.expect(&Token::BytesOpen)?;
    let bytes = self.lexer.scan_bytes_body().map_err(CodaError::Parsing)?;
    // Re-sync the parser's lookahead token, since `scan_bytes_body` read
    // directly from the lexer.
    self.current = self.lexer.next_token().map_err(CodaError::Parsing)?;
    self.expect(&Token::BytesClose)?;
    Ok(FieldValue::Bytes(bytes))
  }

  fn parse_list_or_set(&mut self, ty: &'static Type) -> Result<FieldValue> {
    let elem_ty = match ty {
      Type::List(e) | Type::Set(e) => *e,
      _ => return Err(self.err("list literal used for a non-list, non-set field")),
    };
    self.expect(&Token::LBracket)?;
    let mut items = Vec::new();
    // List/map elements are whitespace-separated; a comma is accepted but
    // optional.
    while self.current.0 != Token::RBracket {
      items.push(self.parse_value(elem_ty)?);
      if self.current.0 == Token::Comma {
        self.advance()?;
      }
    }
    self.expect(&Token::RBracket)?;
    Ok(match ty {
      Type::Set(_) => FieldValue::Set(items),
      _ => FieldValue::List(items),
    })
  }

  fn parse_map(&mut self, ty: &'static Type) -> Result<FieldValue> {
    let (key_ty, value_ty) = match ty {
      Type::Map(k, v) => (*k, *v),
      _ => return Err(self.err("map literal used for a non-map field")),
    };
    self.expect(&Token::LBrace)?;
    let mut entries = Vec::new();
    while self.current.0 != Token::RBrace {
      let key = self.parse_value(key_ty)?;
      self.expect(&Token::Colon)?;
      let value = self.parse_value(value_ty)?;
      entries.push((key, value));
      if self.current.0 == Token::Comma {
        self.advance()?;
      }
    }
    self.expect(&Token::RBrace)?;
    Ok(FieldValue::Map(entries))
  }

  /// Parses a bare `%N` back-reference to an already-shared object.
  fn parse_struct_ref(&mut self, is_shared: bool) -> Result<FieldValue> {
    if !is_shared {
      return Err(self.err("object references are only valid for shared fields"));
    }
    match self.advance()? {
      Token::ObjRef(id) => {
        let obj = self
          .refs
          .get(id)
          .ok_or_else(|| self.err(format!("reference to undefined shared object %{}", id)))?;
        Ok(FieldValue::Struct(obj))
      }
      _ => unreachable!(),
    }
  }

  /// Parses a struct literal value and, when the field is shared and the
  /// literal is a first-definition, consumes the trailing `#id` marker
  /// and registers it for later `%id` references.
  fn parse_struct_value(&mut self, expected: &'static StructDescriptor, is_shared: bool) -> Result<FieldValue> {
    let instance = self.parse_struct_literal(expected)?;
    if is_shared {
      if let Token::ShareDef(id) = self.current.0 {
        self.advance()?;
        self.refs.register(id, instance.clone());
      }
    }
    Ok(FieldValue::Struct(instance))
  }

  fn parse_enum_value(&mut self, ty: &'static Type) -> Result<FieldValue> {
    let name = self.expect_id()?;
    let descriptor = ty
      .as_enum()
      .ok_or_else(|| self.err("enum value used for a non-enum field"))?;
    let number = descriptor
      .number_of(&name)
      .ok_or_else(|| self.err(format!("unknown enum value `{}`", name)))?;
    Ok(FieldValue::Enum(number))
  }

  /// Parses `'{' struct_body '}'`.
  fn parse_struct_literal(&mut self, expected: &'static StructDescriptor) -> Result<SharedObject> {
    self.expect(&Token::LBrace)?;
    let instance = self.parse_struct_fields(expected)?;
    self.expect(&Token::RBrace)?;
    Ok(instance)
  }

  /// Parses `struct_body := (field | subtype_block)*` for `level`. Own
  /// fields are buffered rather than applied immediately, since a
  /// trailing `subtype_block` can still redirect the concrete type this
  /// instance is allocated as; once the concrete type is known (either
  /// `level` itself, or a subtype resolved from a nested block) the
  /// buffered values are applied to the freshly-allocated instance.
  fn parse_struct_fields(&mut self, level: &'static StructDescriptor) -> Result<SharedObject> {
    let mut pending: Vec<(&'static FieldDescriptor, FieldValue)> = Vec::new();
    while let Token::Id(_) = &self.current.0 {
      let name = self.expect_id()?;
      self.expect(&Token::Colon)?;
      let field = level
        .own_field_by_name(&name)
        .ok_or_else(|| self.err(format!("unknown field `{}` on `{}`", name, level.name)))?;
      let value = self.parse_value(field.ty)?;
      pending.push((field, value));
    }
    if let Token::TypeRef(id) = self.current.0 {
      let concrete = self.expect_subtype_block(level, id)?;
      let instance = (concrete.factory)();
      for (field, value) in pending {
        (field.set)(&mut *instance.borrow_mut(), value)?;
      }
      self.expect(&Token::LBrace)?;
      self.parse_subtype_fields(&instance, concrete)?;
      self.expect(&Token::RBrace)?;
      return Ok(instance);
    }
    let instance = (level.factory)();
    for (field, value) in pending {
      (field.set)(&mut *instance.borrow_mut(), value)?;
    }
    Ok(instance)
  }

  /// Parses `level`'s own fields directly into the already-allocated
  /// `instance`, then recurses into a further nested subtype block when
  /// present.
  fn parse_subtype_fields(&mut self, instance: &SharedObject, level: &'static StructDescriptor) -> Result<()> {
    while let Token::Id(_) = &self.current.0 {
      let name = self.expect_id()?;
      self.expect(&Token::Colon)?;
      let field = level
        .own_field_by_name(&name)
        .ok_or_else(|| self.err(format!("unknown field `{}` on `{}`", name, level.name)))?;
      let value = self.parse_value(field.ty)?;
      (field.set)(&mut *instance.borrow_mut(), value)?;
    }
    if let Token::TypeRef(id) = self.current.0 {
      let concrete = self.expect_subtype_block(level, id)?;
      self.expect(&Token::LBrace)?;
      self.parse_subtype_fields(instance, concrete)?;
      self.expect(&Token::RBrace)?;
    }
    Ok(())
  }

  /// Consumes `$id '(' ID ')' ':'` and resolves `id` against `level`'s
  /// root hierarchy. The parenthesized name is informational and is not
  /// verified against the resolved descriptor.
  fn expect_subtype_block(&mut self, level: &'static StructDescriptor, id: u32) -> Result<&'static StructDescriptor> {
    self.advance()?;
    self.expect(&Token::LParen)?;
    self.expect_id()?;
    self.expect(&Token::RParen)?;
    self.expect(&Token::Colon)?;
    self
      .registry
      .resolve(level.root(), id)
      .ok_or_else(|| self.err(format!("unregistered subtype id {}", id)))
  }

  pub fn expect_end(&self) -> Result<()> {
    if self.current.0 == Token::End {
      Ok(())
    } else {
      Err(self.err(format!("unexpected trailing input: {}", self.current.0.describe())))
    }
  }
}
