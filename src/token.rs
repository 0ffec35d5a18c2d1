// Copyright 2026 The lca-engine Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

// derived from the LALRPOP whitespace tokenizer

use std::str::CharIndices;

use unicode_xid::UnicodeXID;

use self::Token::*;
use crate::common::ErrorCode::*;
use crate::common::{EquationError, ErrorCode};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Token<'input> {
    Plus,
    Minus,
    Mul,
    Div,
    Exp,
    LParen,
    RParen,
    Ident(&'input str),
    Num(&'input str),
}

fn error<T>(code: ErrorCode, start: usize, end: usize) -> Result<T, EquationError> {
    Err(EquationError {
        start: start as u16,
        end: end as u16,
        code,
    })
}

pub type Spanned<T> = (usize, T, usize);

pub struct Lexer<'input> {
    text: &'input str,
    chars: CharIndices<'input>,
    lookahead: Option<(usize, char)>,
}

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        let mut t = Lexer {
            text: input,
            chars: input.char_indices(),
            lookahead: None,
        };
        t.bump();
        t
    }

    fn bump(&mut self) -> Option<(usize, char)> {
        self.lookahead = self.chars.next();
        self.lookahead
    }

    fn take_while<F>(&mut self, mut keep_going: F) -> Option<usize>
    where
        F: FnMut(char) -> bool,
    {
        loop {
            match self.lookahead {
                None => {
                    return None;
                }
                Some((idx1, c)) => {
                    if !keep_going(c) {
                        return Some(idx1);
                    } else {
                        self.bump();
                    }
                }
            }
        }
    }

    fn word(&mut self, idx0: usize) -> Spanned<&'input str> {
        match self.take_while(is_identifier_continue) {
            Some(end) => (idx0, &self.text[idx0..end], end),
            None => (idx0, &self.text[idx0..], self.text.len()),
        }
    }

    fn number(&mut self, idx0: usize) -> Result<Spanned<Token<'input>>, EquationError> {
        let mut seen_exponent = false;
        loop {
            let end = self.take_while(|c| c.is_ascii_digit() || c == '.');
            match (end, self.lookahead) {
                (Some(end), Some((_, c))) if (c == 'e' || c == 'E') && !seen_exponent => {
                    seen_exponent = true;
                    match self.bump() {
                        Some((_, c)) if c == '+' || c == '-' => {
                            self.bump();
                        }
                        Some((_, c)) if c.is_ascii_digit() => {}
                        _ => {
                            return error(ExpectedNumber, idx0, end);
                        }
                    }
                }
                (Some(end), _) => {
                    return Ok((idx0, Num(&self.text[idx0..end]), end));
                }
                (None, _) => {
                    return Ok((idx0, Num(&self.text[idx0..]), self.text.len()));
                }
            }
        }
    }

    fn next_token(&mut self) -> Option<Result<Spanned<Token<'input>>, EquationError>> {
        loop {
            let (idx0, c) = self.lookahead?;
            let single = |t: Token<'input>| Some(Ok((idx0, t, idx0 + 1)));
            match c {
                '+' => {
                    self.bump();
                    return single(Plus);
                }
                '-' => {
                    self.bump();
                    return single(Minus);
                }
                '*' => {
                    self.bump();
                    return single(Mul);
                }
                '/' => {
                    self.bump();
                    return single(Div);
                }
                '^' => {
                    self.bump();
                    return single(Exp);
                }
                '(' => {
                    self.bump();
                    return single(LParen);
                }
                ')' => {
                    self.bump();
                    return single(RParen);
                }
                _ if c.is_whitespace() => {
                    self.bump();
                }
                _ if c.is_ascii_digit() || c == '.' => {
                    self.bump();
                    return Some(self.number(idx0));
                }
                _ if is_identifier_start(c) => {
                    let (start, word, end) = self.word(idx0);
                    return Some(Ok((start, Ident(word), end)));
                }
                _ => {
                    self.bump();
                    return Some(error(InvalidToken, idx0, idx0 + c.len_utf8()));
                }
            }
        }
    }
}

impl<'input> Iterator for Lexer<'input> {
    type Item = Result<Spanned<Token<'input>>, EquationError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

fn is_identifier_start(c: char) -> bool {
    UnicodeXID::is_xid_start(c) || c == '_'
}

fn is_identifier_continue(c: char) -> bool {
    UnicodeXID::is_xid_continue(c)
}
