// exprdoc - Expression tree document serialization
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Type name rendering and parsing.
//!
//! Grammar accepted by [`parse_type_name`]:
//!
//! ```text
//! type     := name [ '<' type { ',' type } '>' ] { suffix }
//! suffix   := '?' | '[]' | '&'
//! ```

use super::{CollectionKind, DelegateKind, Type};
use crate::config::TypeNameConvention;
use crate::vocabulary;
use thiserror::Error;

/// Why a type name could not be turned into a [`Type`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeNameError {
    #[error("empty type name")]
    Empty,

    #[error("syntax error at offset {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("unknown type '{0}'")]
    Unknown(String),

    #[error("'{name}' takes {expected} generic argument(s), found {found}")]
    Arity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("'{0}' cannot be made nullable")]
    InvalidNullable(String),
}

const NULLABLE: [&str; 2] = ["Nullable", "System.Nullable"];
const KEY_VALUE_PAIR: [&str; 2] = ["KeyValuePair", "System.Collections.Generic.KeyValuePair"];
const FUNC: [&str; 2] = ["Func", "System.Func"];
const ACTION: [&str; 2] = ["Action", "System.Action"];

/// Render `ty` using `convention`.
pub fn format_type_name(ty: &Type, convention: TypeNameConvention) -> String {
    let mut out = String::new();
    write_type(&mut out, ty, convention);
    out
}

fn write_type(out: &mut String, ty: &Type, convention: TypeNameConvention) {
    let full = convention == TypeNameConvention::Full;
    match ty {
        Type::Basic(b) => out.push_str(if full { b.full_name() } else { b.short_name() }),
        Type::Nullable(inner) => {
            if full {
                out.push_str("System.Nullable<");
                write_type(out, inner, convention);
                out.push('>');
            } else {
                write_type(out, inner, convention);
                out.push('?');
            }
        }
        Type::Array(element) => {
            write_type(out, element, convention);
            out.push_str("[]");
        }
        Type::ByRef(inner) => {
            write_type(out, inner, convention);
            out.push('&');
        }
        Type::Collection(kind, args) => {
            if full {
                out.push_str(kind.namespace());
                out.push('.');
            }
            out.push_str(kind.short_name());
            write_args(out, args, convention);
        }
        Type::KeyValuePair(k, v) => {
            out.push_str(KEY_VALUE_PAIR[usize::from(full)]);
            out.push('<');
            write_type(out, k, convention);
            out.push_str(", ");
            write_type(out, v, convention);
            out.push('>');
        }
        Type::Delegate(kind, args) => {
            let names = match kind {
                DelegateKind::Func => FUNC,
                DelegateKind::Action => ACTION,
            };
            out.push_str(names[usize::from(full)]);
            if !args.is_empty() {
                write_args(out, args, convention);
            }
        }
        Type::Named(def) => out.push_str(def.full_name()),
    }
}

fn write_args(out: &mut String, args: &[Type], convention: TypeNameConvention) {
    out.push('<');
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_type(out, arg, convention);
    }
    out.push('>');
}

/// Parse a type name in either convention.
///
/// `lookup` resolves application type names (no generic arguments) that are
/// not basic types.
pub fn parse_type_name(
    text: &str,
    lookup: &dyn Fn(&str) -> Option<Type>,
) -> Result<Type, TypeNameError> {
    if text.trim().is_empty() {
        return Err(TypeNameError::Empty);
    }
    let mut parser = Parser {
        src: text.as_bytes(),
        pos: 0,
        lookup,
    };
    let ty = parser.parse_type()?;
    parser.skip_ws();
    if parser.pos != parser.src.len() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(ty)
}

struct Parser<'a> {
    src: &'a [u8],
    pos: usize,
    lookup: &'a dyn Fn(&str) -> Option<Type>,
}

impl<'a> Parser<'a> {
    fn error(&self, message: &str) -> TypeNameError {
        TypeNameError::Syntax {
            position: self.pos,
            message: message.to_string(),
        }
    }

    fn skip_ws(&mut self) {
        while self.pos < self.src.len() && self.src[self.pos].is_ascii_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn eat(&mut self, c: u8) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_name(&mut self) -> Result<&'a str, TypeNameError> {
        self.skip_ws();
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == b'.' || c == b'_' || c == b'+' {
                self.pos += 1;
            } else {
                break;
            }
        }
        if start == self.pos {
            return Err(self.error("expected a type name"));
        }
        let src: &'a [u8] = self.src;
        std::str::from_utf8(&src[start..self.pos]).map_err(|_| self.error("invalid UTF-8"))
    }

    fn parse_type(&mut self) -> Result<Type, TypeNameError> {
        let name = self.parse_name()?;
        let mut args = Vec::new();
        let generic = self.eat(b'<');
        if generic {
            loop {
                args.push(self.parse_type()?);
                if self.eat(b',') {
                    continue;
                }
                if self.eat(b'>') {
                    break;
                }
                return Err(self.error("expected ',' or '>'"));
            }
        }
        let mut ty = self.resolve(name, args, generic)?;
        loop {
            if self.eat(b'?') {
                ty = make_nullable(ty)?;
            } else if self.eat(b'[') {
                if !self.eat(b']') {
                    return Err(self.error("only single-dimensional arrays are supported"));
                }
                ty = Type::array(ty);
            } else if self.eat(b'&') {
                ty = Type::by_ref(ty);
            } else {
                return Ok(ty);
            }
        }
    }

    fn resolve(&self, name: &str, mut args: Vec<Type>, generic: bool) -> Result<Type, TypeNameError> {
        let arity = |expected: usize, args: &[Type]| {
            if args.len() == expected {
                Ok(())
            } else {
                Err(TypeNameError::Arity {
                    name: name.to_string(),
                    expected,
                    found: args.len(),
                })
            }
        };

        if ACTION.contains(&name) {
            return Ok(Type::Delegate(DelegateKind::Action, args));
        }
        if !generic {
            if let Some(basic) = vocabulary::basic_type(name) {
                return Ok(Type::Basic(basic));
            }
            return (self.lookup)(name).ok_or_else(|| TypeNameError::Unknown(name.to_string()));
        }
        if NULLABLE.contains(&name) {
            arity(1, &args)?;
            return make_nullable(args.remove(0));
        }
        if KEY_VALUE_PAIR.contains(&name) {
            arity(2, &args)?;
            let value = args.remove(1);
            let key = args.remove(0);
            return Ok(Type::key_value_pair(key, value));
        }
        if FUNC.contains(&name) {
            if args.is_empty() {
                return Err(TypeNameError::Arity {
                    name: name.to_string(),
                    expected: 1,
                    found: 0,
                });
            }
            return Ok(Type::Delegate(DelegateKind::Func, args));
        }
        if let Some(kind) = CollectionKind::by_name(name) {
            arity(kind.arity(), &args)?;
            return Ok(Type::Collection(kind, args));
        }
        Err(TypeNameError::Unknown(name.to_string()))
    }
}

fn make_nullable(inner: Type) -> Result<Type, TypeNameError> {
    if inner.is_nullable() || !inner.is_value_type() {
        return Err(TypeNameError::InvalidNullable(format_type_name(
            &inner,
            TypeNameConvention::Short,
        )));
    }
    Ok(Type::nullable(inner))
}
