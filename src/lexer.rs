// Copyright (C) Brian G. Milnes 2025

//! Tokenizer for Go source
//!
//! Produces the full token vector up front, including the semicolons Go
//! inserts automatically at line ends.

pub mod lexer {
    use crate::syntax::syntax::{position, Span};
    use anyhow::Result;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Tok {
        Ident,
        Int,
        Float,
        Imag,
        Char,
        String,

        // Keywords
        Break,
        Case,
        Chan,
        Const,
        Continue,
        Default,
        Defer,
        Else,
        Fallthrough,
        For,
        Func,
        Go,
        Goto,
        If,
        Import,
        Interface,
        Map,
        Package,
        Range,
        Return,
        Select,
        Struct,
        Switch,
        Type,
        Var,

        // Operators and delimiters
        Add,
        Sub,
        Mul,
        Quo,
        Rem,
        And,
        Or,
        Xor,
        Shl,
        Shr,
        AndNot,
        AddAssign,
        SubAssign,
        MulAssign,
        QuoAssign,
        RemAssign,
        AndAssign,
        OrAssign,
        XorAssign,
        ShlAssign,
        ShrAssign,
        AndNotAssign,
        LAnd,
        LOr,
        Arrow,
        Inc,
        Dec,
        Eql,
        Lss,
        Gtr,
        Assign,
        Not,
        Neq,
        Leq,
        Geq,
        Define,
        Ellipsis,
        LParen,
        LBrack,
        LBrace,
        Comma,
        Period,
        RParen,
        RBrack,
        RBrace,
        Semicolon,
        Colon,
        Tilde,

        Eof,
    }

    impl Tok {
        fn keyword(word: &str) -> Option<Tok> {
            let tok = match word {
                "break" => Tok::Break,
                "case" => Tok::Case,
                "chan" => Tok::Chan,
                "const" => Tok::Const,
                "continue" => Tok::Continue,
                "default" => Tok::Default,
                "defer" => Tok::Defer,
                "else" => Tok::Else,
                "fallthrough" => Tok::Fallthrough,
                "for" => Tok::For,
                "func" => Tok::Func,
                "go" => Tok::Go,
                "goto" => Tok::Goto,
                "if" => Tok::If,
                "import" => Tok::Import,
                "interface" => Tok::Interface,
                "map" => Tok::Map,
                "package" => Tok::Package,
                "range" => Tok::Range,
                "return" => Tok::Return,
                "select" => Tok::Select,
                "struct" => Tok::Struct,
                "switch" => Tok::Switch,
                "type" => Tok::Type,
                "var" => Tok::Var,
                _ => return None,
            };
            Some(tok)
        }

        /// Tokens after which a newline ends the statement.
        fn ends_statement(self) -> bool {
            matches!(
                self,
                Tok::Ident
                    | Tok::Int
                    | Tok::Float
                    | Tok::Imag
                    | Tok::Char
                    | Tok::String
                    | Tok::Break
                    | Tok::Continue
                    | Tok::Fallthrough
                    | Tok::Return
                    | Tok::Inc
                    | Tok::Dec
                    | Tok::RParen
                    | Tok::RBrack
                    | Tok::RBrace
            )
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Token {
        pub kind: Tok,
        /// Empty for automatically inserted semicolons.
        pub span: Span,
    }

    // Longest operators first so prefix matching picks the right one.
    const OPERATORS: &[(&str, Tok)] = &[
        ("<<=", Tok::ShlAssign),
        (">>=", Tok::ShrAssign),
        ("&^=", Tok::AndNotAssign),
        ("...", Tok::Ellipsis),
        ("&&", Tok::LAnd),
        ("||", Tok::LOr),
        ("<-", Tok::Arrow),
        ("++", Tok::Inc),
        ("--", Tok::Dec),
        ("==", Tok::Eql),
        ("!=", Tok::Neq),
        ("<=", Tok::Leq),
        (">=", Tok::Geq),
        (":=", Tok::Define),
        ("+=", Tok::AddAssign),
        ("-=", Tok::SubAssign),
        ("*=", Tok::MulAssign),
        ("/=", Tok::QuoAssign),
        ("%=", Tok::RemAssign),
        ("&=", Tok::AndAssign),
        ("|=", Tok::OrAssign),
        ("^=", Tok::XorAssign),
        ("<<", Tok::Shl),
        (">>", Tok::Shr),
        ("&^", Tok::AndNot),
        ("+", Tok::Add),
        ("-", Tok::Sub),
        ("*", Tok::Mul),
        ("/", Tok::Quo),
        ("%", Tok::Rem),
        ("&", Tok::And),
        ("|", Tok::Or),
        ("^", Tok::Xor),
        ("<", Tok::Lss),
        (">", Tok::Gtr),
        ("=", Tok::Assign),
        ("!", Tok::Not),
        ("(", Tok::LParen),
        ("[", Tok::LBrack),
        ("{", Tok::LBrace),
        (",", Tok::Comma),
        (".", Tok::Period),
        (")", Tok::RParen),
        ("]", Tok::RBrack),
        ("}", Tok::RBrace),
        (";", Tok::Semicolon),
        (":", Tok::Colon),
        ("~", Tok::Tilde),
    ];

    struct Lexer<'a> {
        src: &'a str,
        name: &'a str,
        pos: usize,
        tokens: Vec<Token>,
    }

    /// Tokenize a whole file. The result always ends with `Tok::Eof`.
    pub fn tokenize(name: &str, src: &str) -> Result<Vec<Token>> {
        let mut lexer = Lexer {
            src,
            name,
            pos: 0,
            tokens: Vec::new(),
        };
        lexer.run()?;
        Ok(lexer.tokens)
    }

    impl<'a> Lexer<'a> {
        fn rest(&self) -> &'a str {
            &self.src[self.pos..]
        }

        fn peek_char(&self) -> Option<char> {
            self.rest().chars().next()
        }

        fn error(&self, pos: usize, message: &str) -> anyhow::Error {
            let (line, column) = position(self.src, pos);
            anyhow::anyhow!("{}:{}:{}: {}", self.name, line, column, message)
        }

        fn needs_semicolon(&self) -> bool {
            self.tokens.last().is_some_and(|t| t.kind.ends_statement())
        }

        fn insert_semicolon(&mut self, at: usize) {
            if self.needs_semicolon() {
                self.tokens.push(Token {
                    kind: Tok::Semicolon,
                    span: Span::new(at, at),
                });
            }
        }

        fn push(&mut self, kind: Tok, start: usize) {
            self.tokens.push(Token {
                kind,
                span: Span::new(start, self.pos),
            });
        }

        fn run(&mut self) -> Result<()> {
            while let Some(c) = self.peek_char() {
                let start = self.pos;
                match c {
                    '\n' => {
                        self.insert_semicolon(start);
                        self.pos += 1;
                    }
                    ' ' | '\t' | '\r' => self.pos += 1,
                    '/' if self.rest().starts_with("//") => {
                        let len = self.rest().find('\n').unwrap_or(self.rest().len());
                        self.pos += len;
                    }
                    '/' if self.rest().starts_with("/*") => {
                        let Some(close) = self.rest()[2..].find("*/") else {
                            return Err(self.error(start, "comment not terminated"));
                        };
                        let body = &self.rest()[..close + 4];
                        if body.contains('\n') {
                            self.insert_semicolon(start);
                        }
                        self.pos += close + 4;
                    }
                    c if c.is_alphabetic() || c == '_' => self.ident(),
                    c if c.is_ascii_digit() => self.number()?,
                    '.' if self.rest()[1..].starts_with(|d: char| d.is_ascii_digit()) => {
                        self.number()?
                    }
                    '"' => self.interpreted_string()?,
                    '`' => self.raw_string()?,
                    '\'' => self.char_lit()?,
                    _ => self.operator()?,
                }
            }
            let end = self.src.len();
            self.insert_semicolon(end);
            self.tokens.push(Token {
                kind: Tok::Eof,
                span: Span::new(end, end),
            });
            Ok(())
        }

        fn ident(&mut self) {
            let start = self.pos;
            let len = self
                .rest()
                .find(|c: char| !(c.is_alphanumeric() || c == '_'))
                .unwrap_or(self.rest().len());
            self.pos += len;
            let word = &self.src[start..self.pos];
            self.push(Tok::keyword(word).unwrap_or(Tok::Ident), start);
        }

        fn number(&mut self) -> Result<()> {
            let start = self.pos;
            let bytes = self.src.as_bytes();
            let mut kind = Tok::Int;
            let hex = self.rest().starts_with("0x") || self.rest().starts_with("0X");
            if hex
                || self.rest().starts_with("0b")
                || self.rest().starts_with("0B")
                || self.rest().starts_with("0o")
                || self.rest().starts_with("0O")
            {
                self.pos += 2;
            }
            while self.pos < bytes.len() {
                let b = bytes[self.pos];
                let exponent = if hex { b == b'p' || b == b'P' } else { b == b'e' || b == b'E' };
                if exponent {
                    kind = Tok::Float;
                    self.pos += 1;
                    if self.pos < bytes.len() && (bytes[self.pos] == b'+' || bytes[self.pos] == b'-') {
                        self.pos += 1;
                    }
                } else if b == b'.' {
                    // `x[1:]` style slices never reach here; a second `.` ends the literal.
                    if kind == Tok::Float {
                        break;
                    }
                    kind = Tok::Float;
                    self.pos += 1;
                } else if b.is_ascii_alphanumeric() || b == b'_' {
                    if b == b'i' {
                        self.pos += 1;
                        kind = Tok::Imag;
                        break;
                    }
                    self.pos += 1;
                } else {
                    break;
                }
            }
            if self.pos == start {
                return Err(self.error(start, "invalid number literal"));
            }
            self.push(kind, start);
            Ok(())
        }

        fn interpreted_string(&mut self) -> Result<()> {
            let start = self.pos;
            self.pos += 1;
            loop {
                match self.peek_char() {
                    None | Some('\n') => return Err(self.error(start, "string literal not terminated")),
                    Some('\\') => {
                        self.pos += 1;
                        if let Some(escaped) = self.peek_char() {
                            self.pos += escaped.len_utf8();
                        }
                    }
                    Some('"') => {
                        self.pos += 1;
                        break;
                    }
                    Some(c) => self.pos += c.len_utf8(),
                }
            }
            self.push(Tok::String, start);
            Ok(())
        }

        fn raw_string(&mut self) -> Result<()> {
            let start = self.pos;
            let Some(close) = self.rest()[1..].find('`') else {
                return Err(self.error(start, "raw string literal not terminated"));
            };
            self.pos += close + 2;
            self.push(Tok::String, start);
            Ok(())
        }

        fn char_lit(&mut self) -> Result<()> {
            let start = self.pos;
            self.pos += 1;
            loop {
                match self.peek_char() {
                    None | Some('\n') => return Err(self.error(start, "rune literal not terminated")),
                    Some('\\') => {
                        self.pos += 1;
                        if let Some(escaped) = self.peek_char() {
                            self.pos += escaped.len_utf8();
                        }
                    }
                    Some('\'') => {
                        self.pos += 1;
                        break;
                    }
                    Some(c) => self.pos += c.len_utf8(),
                }
            }
            self.push(Tok::Char, start);
            Ok(())
        }

        fn operator(&mut self) -> Result<()> {
            let start = self.pos;
            let rest = self.rest();
            match OPERATORS.iter().find(|(text, _)| rest.starts_with(text)) {
                Some((text, kind)) => {
                    self.pos += text.len();
                    self.push(*kind, start);
                    Ok(())
                }
                None => {
                    let c = self.peek_char().unwrap_or('?');
                    Err(self.error(start, &format!("invalid character {c:?}")))
                }
            }
        }
    }
}
