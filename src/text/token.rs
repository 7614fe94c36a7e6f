//! Lexical tokens of the canonical text format.

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
  LBrace,
  RBrace,
  LBracket,
  RBracket,
  LParen,
  RParen,
  BytesOpen,  // `<[`
  BytesClose, // `]>`
  Colon,
  Comma,
  Dot,
  Id(String),
  IntVal(i64),
  FloatVal(f64),
  Str(String),
  ObjRef(u32),  // `%N`
  TypeRef(u32), // `$N`, introduces a subtype_block
  ShareDef(u32), // `#N`, trailing marker on a shared object's first write
  True,
  False,
  Null,
  End,
}

impl Token {
  pub fn describe(&self) -> String {
    match self {
      Token::LBrace => "'{'".into(),
      Token::RBrace => "'}'".into(),
      Token::LBracket => "'['".into(),
      Token::RBracket => "']'".into(),
      Token::LParen => "'('".into(),
      Token::RParen => "')'".into(),
      Token::BytesOpen => "'<['".into(),
      Token::BytesClose => "']>'".into(),
      Token::Colon => "':'".into(),
      Token::Comma => "','".into(),
      Token::Dot => "'.'".into(),
      Token::Id(s) => format!("identifier `{}`", s),
      Token::IntVal(v) => format!("integer `{}`", v),
      Token::FloatVal(v) => format!("float `{}`", v),
      Token::Str(s) => format!("string {:?}", s),
      Token::ObjRef(n) => format!("object reference `%{}`", n),
      Token::TypeRef(n) => format!("subtype marker `${}`", n),
      Token::ShareDef(n) => format!("shared-object marker `#{}`", n),
      Token::True => "`true`".into(),
      Token::False => "`false`".into(),
      Token::Null => "`null`".into(),
      Token::End => "end of input".into(),
    }
  }
}
