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
use super::lexer::{Lexer, Tok, Token};

// ===================================================================
// Syntax tree
// ===================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Num(U256, SourceLoc),
    Str(String, SourceLoc),
    Bool(bool, SourceLoc),
    Ident(String, SourceLoc),
    Call(String, Vec<Expr>, SourceLoc),
    Map(Vec<(String, Expr)>, SourceLoc),
}

impl Expr {
    pub fn loc(&self) -> SourceLoc {
        match self {
            Expr::Num(_, loc)
            | Expr::Str(_, loc)
            | Expr::Bool(_, loc)
            | Expr::Ident(_, loc)
            | Expr::Call(_, _, loc)
            | Expr::Map(_, loc) => *loc,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// A bare expression evaluated for its side effects.
    Expr(Expr),
    /// `name = expr` or `const name = expr`.
    Assign {
        constant: bool,
        name: String,
        expr: Expr,
        loc: SourceLoc,
    },
    /// `[a, b, c] = expr`: bind the leading stack slots of an action
    /// pointer.
    Destructure {
        names: Vec<String>,
        expr: Expr,
        loc: SourceLoc,
    },
}

/// Parse a whole script.
pub fn parse(input: &str) -> Result<Vec<Stmt>, CompileError> {
    Parser::new(input)?.parse()
}

// ===================================================================
// Parser
// ===================================================================

pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    pub fn new(input: &str) -> Result<Self, CompileError> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Parser { tokens, index: 0 })
    }

    pub fn parse(mut self) -> Result<Vec<Stmt>, CompileError> {
        let mut stmts = Vec::new();
        loop {
            // Statement separators are optional.
            while self.peek().tok == Tok::Semi {
                self.advance();
            }
            if self.peek().tok == Tok::Eof {
                return Ok(stmts);
            }
            stmts.push(self.parse_stmt()?);
        }
    }

    fn parse_stmt(&mut self) -> Result<Stmt, CompileError> {
        let token = self.peek().clone();
        match &token.tok {
            Tok::Const => {
                self.advance();
                let name = self.expect_ident()?;
                self.expect(Tok::Assign)?;
                let expr = self.parse_expr()?;
                Ok(Stmt::Assign { constant: true, name, expr, loc: token.loc })
            }
            Tok::LBracket => {
                self.advance();
                let mut names = vec![self.expect_ident()?];
                while self.peek().tok == Tok::Comma {
                    self.advance();
                    names.push(self.expect_ident()?);
                }
                self.expect(Tok::RBracket)?;
                self.expect(Tok::Assign)?;
                let expr = self.parse_expr()?;
                Ok(Stmt::Destructure { names, expr, loc: token.loc })
            }
            Tok::Ident(_) if self.peek_at(1).tok == Tok::Assign => {
                let name = self.expect_ident()?;
                self.advance(); // "="
                let expr = self.parse_expr()?;
                Ok(Stmt::Assign { constant: false, name, expr, loc: token.loc })
            }
            _ => Ok(Stmt::Expr(self.parse_expr()?)),
        }
    }

    fn parse_expr(&mut self) -> Result<Expr, CompileError> {
        let token = self.peek().clone();
        match token.tok {
            Tok::Num(v) => {
                self.advance();
                Ok(Expr::Num(v, token.loc))
            }
            Tok::Str(s) => {
                self.advance();
                Ok(Expr::Str(s, token.loc))
            }
            Tok::True => {
                self.advance();
                Ok(Expr::Bool(true, token.loc))
            }
            Tok::False => {
                self.advance();
                Ok(Expr::Bool(false, token.loc))
            }
            Tok::LBrace => self.parse_map(),
            Tok::Ident(name) => {
                self.advance();
                if self.peek().tok == Tok::LParen {
                    self.parse_call(name, token.loc)
                } else {
                    Ok(Expr::Ident(name, token.loc))
                }
            }
            _ => Err(self.unexpected(&token, "an expression")),
        }
    }

    fn parse_call(&mut self, name: String, loc: SourceLoc) -> Result<Expr, CompileError> {
        self.expect(Tok::LParen)?;
        let mut args = Vec::new();
        if self.peek().tok != Tok::RParen {
            args.push(self.parse_expr()?);
            while self.peek().tok == Tok::Comma {
                self.advance();
                args.push(self.parse_expr()?);
            }
        }
        self.expect(Tok::RParen)?;
        Ok(Expr::Call(name, args, loc))
    }

    fn parse_map(&mut self) -> Result<Expr, CompileError> {
        let open = self.peek().clone();
        self.expect(Tok::LBrace)?;
        let mut entries = Vec::new();
        loop {
            let token = self.peek().clone();
            match token.tok {
                Tok::RBrace => {
                    self.advance();
                    return Ok(Expr::Map(entries, open.loc));
                }
                Tok::Str(key) => {
                    self.advance();
                    self.expect(Tok::Colon)?;
                    let value = self.parse_expr()?;
                    entries.push((key, value));
                    // Entries are comma separated, with a trailing
                    // comma allowed.
                    if self.peek().tok == Tok::Comma {
                        self.advance();
                    }
                }
                _ => return Err(self.unexpected(&token, "a string key or \"}\"")),
            }
        }
    }

    // ---------------------------------------------------------------
    // Token plumbing
    // ---------------------------------------------------------------

    fn peek(&self) -> &Token {
        &self.tokens[self.index]
    }

    fn peek_at(&self, ahead: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[std::cmp::min(self.index + ahead, last)]
    }

    fn advance(&mut self) {
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
    }

    fn expect(&mut self, tok: Tok) -> Result<Token, CompileError> {
        let token = self.peek().clone();
        if token.tok == tok {
            self.advance();
            Ok(token)
        } else {
            Err(self.unexpected(&token, &tok.describe()))
        }
    }

    fn expect_ident(&mut self) -> Result<String, CompileError> {
        let token = self.peek().clone();
        match token.tok {
            Tok::Ident(name) => {
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(&token, "an identifier")),
        }
    }

    fn unexpected(&self, token: &Token, wanted: &str) -> CompileError {
        CompileError::Syntax {
            loc: token.loc,
            message: format!("expected {} but found {}", wanted, token.tok.describe()),
        }
    }
}
