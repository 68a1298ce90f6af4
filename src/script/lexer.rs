// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
use ruint::aliases::U256;

use crate::errors::{CompileError, SourceLoc};

// ===================================================================
// Token
// ===================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum Tok {
    Eof,
    Ident(String),
    Num(U256),
    Str(String),
    Const,
    True,
    False,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Semi,
    Assign,
}

impl Tok {
    /// How this token is described in error messages.
    pub fn describe(&self) -> String {
        match self {
            Tok::Eof => "end of input".to_string(),
            Tok::Ident(s) => format!("\"{}\"", s),
            Tok::Num(_) => "a number".to_string(),
            Tok::Str(_) => "a string".to_string(),
            Tok::Const => "\"const\"".to_string(),
            Tok::True => "\"true\"".to_string(),
            Tok::False => "\"false\"".to_string(),
            Tok::LParen => "\"(\"".to_string(),
            Tok::RParen => "\")\"".to_string(),
            Tok::LBracket => "\"[\"".to_string(),
            Tok::RBracket => "\"]\"".to_string(),
            Tok::LBrace => "\"{\"".to_string(),
            Tok::RBrace => "\"}\"".to_string(),
            Tok::Comma => "\",\"".to_string(),
            Tok::Colon => "\":\"".to_string(),
            Tok::Semi => "\";\"".to_string(),
            Tok::Assign => "\"=\"".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub tok: Tok,
    pub loc: SourceLoc,
}

// ===================================================================
// Lexer
// ===================================================================

/// A very simple lexer.  Every token carries the line/column it
/// starts at; these positions flow onto actions and errors.
pub struct Lexer {
    chars: Vec<char>,
    index: usize,
    line: u32,
    col: u32,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        Lexer { chars, index: 0, line: 1, col: 1 }
    }

    /// Scan the whole input into a token stream terminated by `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next()?;
            let eof = token.tok == Tok::Eof;
            tokens.push(token);
            if eof {
                return Ok(tokens);
            }
        }
    }

    fn next(&mut self) -> Result<Token, CompileError> {
        self.skip_trivia()?;
        let loc = SourceLoc::new(self.line, self.col);
        let c = match self.peek() {
            None => return Ok(Token { tok: Tok::Eof, loc }),
            Some(c) => c,
        };
        let tok = match c {
            '(' => self.punct(Tok::LParen),
            ')' => self.punct(Tok::RParen),
            '[' => self.punct(Tok::LBracket),
            ']' => self.punct(Tok::RBracket),
            '{' => self.punct(Tok::LBrace),
            '}' => self.punct(Tok::RBrace),
            ',' => self.punct(Tok::Comma),
            ':' => self.punct(Tok::Colon),
            ';' => self.punct(Tok::Semi),
            '=' => self.punct(Tok::Assign),
            '"' | '\'' => self.scan_string(loc)?,
            '0'..='9' => self.scan_number(loc)?,
            c if ident_start(c) => self.scan_ident(),
            c => {
                return Err(CompileError::Syntax {
                    loc,
                    message: format!("unexpected character {:?}", c),
                })
            }
        };
        Ok(Token { tok, loc })
    }

    /// Skip whitespace and `//` / `/* */` comments.
    fn skip_trivia(&mut self) -> Result<(), CompileError> {
        loop {
            match self.peek() {
                Some(c) if c.is_ascii_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_at(1) == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    let loc = SourceLoc::new(self.line, self.col);
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek() {
                            None => {
                                return Err(CompileError::Syntax {
                                    loc,
                                    message: "unterminated comment".to_string(),
                                })
                            }
                            Some('*') if self.peek_at(1) == Some('/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn scan_string(&mut self, loc: SourceLoc) -> Result<Tok, CompileError> {
        let quote = self.bump().unwrap();
        let mut out = String::new();
        loop {
            match self.bump() {
                None | Some('\n') => {
                    return Err(CompileError::Syntax {
                        loc,
                        message: "unterminated string literal".to_string(),
                    })
                }
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('\\') => out.push('\\'),
                    Some(c) if c == quote => out.push(c),
                    other => {
                        return Err(CompileError::Syntax {
                            loc,
                            message: format!("unsupported escape {:?}", other),
                        })
                    }
                },
                Some(c) if c == quote => return Ok(Tok::Str(out)),
                Some(c) => out.push(c),
            }
        }
    }

    fn scan_number(&mut self, loc: SourceLoc) -> Result<Tok, CompileError> {
        let mut digits = String::new();
        let radix = if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x') | Some('X'))
        {
            self.bump();
            self.bump();
            16
        } else {
            10
        };
        while let Some(c) = self.peek() {
            if (radix == 16 && c.is_ascii_hexdigit()) || (radix == 10 && c.is_ascii_digit()) {
                digits.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if digits.is_empty() {
            return Err(CompileError::Syntax {
                loc,
                message: "expected digits after \"0x\"".to_string(),
            });
        }
        match U256::from_str_radix(&digits, radix) {
            Ok(v) => Ok(Tok::Num(v)),
            Err(_) => Err(CompileError::Syntax {
                loc,
                message: "numeric literal does not fit in 256 bits".to_string(),
            }),
        }
    }

    fn scan_ident(&mut self) -> Tok {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if ident_part(c) {
                out.push(c);
                self.bump();
            } else {
                break;
            }
        }
        match out.as_str() {
            "const" => Tok::Const,
            "true" => Tok::True,
            "false" => Tok::False,
            _ => Tok::Ident(out),
        }
    }

    fn punct(&mut self, tok: Tok) -> Tok {
        self.bump();
        tok
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.index + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.index += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }
}

fn ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn ident_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
