//! Parser for SPICE model cards.

use std::collections::HashMap;

use super::ast::*;
use super::lexer::{parse_value, Lexer, Token, TokenKind};
use crate::error::{ClipperError, Result};

/// Directives that commonly appear in vendor libraries next to `.model`
/// cards. Their lines are skipped.
const SKIPPED_DIRECTIVES: &[&str] = &[".lib", ".endl", ".end", ".param", ".include", ".inc"];

/// Parser for model libraries.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Create a new parser with the given lexer.
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            current: Token {
                kind: TokenKind::Newline,
                text: String::new(),
                line: 1,
                column: 1,
            },
        }
    }

    /// Parse every model card in the input.
    pub fn parse(&mut self) -> Result<ModelLibrary> {
        let mut library = ModelLibrary::new();
        self.advance()?;

        while self.current.kind != TokenKind::Eof {
            // Skip empty lines
            if self.current.kind == TokenKind::Newline {
                self.advance()?;
                continue;
            }

            match &self.current.kind {
                TokenKind::Directive => {
                    let directive = self.current.text.to_lowercase();
                    let line = self.current.line;
                    if directive == ".model" {
                        self.advance()?;
                        let model = self.parse_model_def(line)?;
                        log::debug!(
                            "parsed model {} ({}) with {} parameters",
                            model.name,
                            model.model_type,
                            model.params.len()
                        );
                        library.insert(model)?;
                    } else if SKIPPED_DIRECTIVES.contains(&directive.as_str()) {
                        self.skip_line()?;
                    } else {
                        return Err(ClipperError::parse(
                            line,
                            format!("unsupported directive: {}", self.current.text),
                        ));
                    }
                }
                _ => {
                    return Err(ClipperError::parse(
                        self.current.line,
                        format!("unexpected token: {:?}", self.current.text),
                    ));
                }
            }

            if self.current.kind == TokenKind::Newline {
                self.advance()?;
            } else if self.current.kind != TokenKind::Eof {
                return Err(ClipperError::parse(
                    self.current.line,
                    format!("trailing input after model: {:?}", self.current.text),
                ));
            }
        }

        Ok(library)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current.kind == kind {
            let tok = self.current.clone();
            self.advance()?;
            Ok(tok)
        } else {
            Err(ClipperError::parse(
                self.current.line,
                format!("expected {:?}, got {:?}", kind, self.current.kind),
            ))
        }
    }

    fn skip_line(&mut self) -> Result<()> {
        while self.current.kind != TokenKind::Newline && self.current.kind != TokenKind::Eof {
            self.advance()?;
        }
        Ok(())
    }

    fn parse_model_def(&mut self, line: usize) -> Result<ModelDef> {
        let name = self.expect(TokenKind::Identifier)?.text;
        let type_str = self.expect(TokenKind::Identifier)?.text;

        let model_type = ModelType::from_keyword(&type_str).ok_or_else(|| {
            ClipperError::parse(line, format!("unknown model type: {}", type_str))
        })?;

        let parenthesized = self.current.kind == TokenKind::OpenParen;
        if parenthesized {
            self.advance()?;
        }

        // Parameters: (param=value param2=value2), parentheses optional
        let mut params = HashMap::new();
        while self.current.kind == TokenKind::Identifier {
            let param_name = self.expect(TokenKind::Identifier)?.text;
            self.expect(TokenKind::Equals)?;

            let value = match self.current.kind {
                TokenKind::Number => {
                    let text = self.current.text.clone();
                    self.advance()?;
                    parse_value(&text).ok_or_else(|| {
                        ClipperError::parse(line, format!("invalid number: {}", text))
                    })?
                }
                _ => {
                    return Err(ClipperError::parse(
                        line,
                        format!("expected value for parameter {}", param_name),
                    ))
                }
            };

            if params.insert(param_name.to_lowercase(), value).is_some() {
                log::warn!("model {}: parameter {} given twice, keeping the last", name, param_name);
            }
        }

        if parenthesized {
            self.expect(TokenKind::CloseParen)?;
        }

        Ok(ModelDef {
            name,
            model_type,
            params,
            line,
        })
    }
}
