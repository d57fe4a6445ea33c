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

//! Element and property names of the document dialect.
//!
//! These names are shared by both formats and must stay in sync with the
//! bundled schemas.

use crate::types::BasicType;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Namespace of the XML dialect.
pub const XML_NAMESPACE: &str = "urn:schemas-vm-com:Linq.Expressions.Serialization";

/// Schema identifier of the JSON dialect.
pub const JSON_SCHEMA_ID: &str = "urn:schemas-vm-com:Linq.Expressions.Serialization.Json";

/// Envelope element / property holding the root node.
pub const EXPRESSION: &str = "expression";
/// JSON property holding the schema identifier.
pub const SCHEMA: &str = "$schema";
/// JSON property holding a node comment.
pub const COMMENT: &str = "$comment";

pub const BODY: &str = "body";
pub const OPERAND: &str = "operand";
pub const OPERANDS: &str = "operands";
pub const METHOD: &str = "method";
pub const OBJECT: &str = "object";
pub const ARGUMENTS: &str = "arguments";
pub const MEMBER: &str = "member";
pub const PROPERTY: &str = "property";
pub const FIELD: &str = "field";
pub const CONSTRUCTOR: &str = "constructor";
pub const EVENT: &str = "event";
pub const PARAMETERS: &str = "parameters";
pub const VARIABLES: &str = "variables";
pub const EXPRESSIONS: &str = "expressions";
pub const INDEXES: &str = "indexes";
pub const INDEXER: &str = "indexer";
pub const LABEL_TARGET: &str = "labelTarget";
pub const KIND: &str = "kind";
pub const BREAK_LABEL: &str = "breakLabel";
pub const CONTINUE_LABEL: &str = "continueLabel";
pub const VALUE: &str = "value";
pub const DEFAULT_VALUE: &str = "defaultValue";
pub const DEFAULT_CASE: &str = "defaultCase";
pub const CASES: &str = "cases";
pub const CASE_VALUES: &str = "caseValues";
pub const IF: &str = "if";
pub const THEN: &str = "then";
pub const ELSE: &str = "else";
pub const FINALLY: &str = "finally";
pub const FAULT: &str = "fault";
pub const CATCHES: &str = "catches";
pub const EXCEPTION: &str = "exception";
pub const FILTER: &str = "filter";
pub const MEMBERS: &str = "members";
pub const TAIL_CALL: &str = "tailCall";
pub const IS_BY_REF: &str = "isByRef";
pub const IS_LIFTED_TO_NULL: &str = "isLiftedToNull";
pub const DECLARING_TYPE: &str = "declaringType";
pub const STATIC: &str = "static";
pub const VISIBILITY: &str = "visibility";
pub const PUBLIC: &str = "public";
pub const NON_PUBLIC: &str = "nonPublic";
pub const PARAMETER_SPECS: &str = "parameterSpecs";
pub const PARAMETER_SPEC: &str = "parameterSpec";
pub const INDEX_PARAMETERS: &str = "indexParameters";
pub const TYPE_OPERAND: &str = "typeOperand";
pub const CONVERT: &str = "convert";
pub const DELEGATE: &str = "delegate";
pub const LENGTH: &str = "length";
pub const ITEMS: &str = "items";
pub const ITEM: &str = "item";
pub const KEY: &str = "key";
pub const NIL: &str = "nil";
pub const TYPE: &str = "type";
pub const NAME: &str = "name";
pub const ID: &str = "id";
pub const IDREF: &str = "idref";

/// Goto kinds.
pub const GOTO_KIND_GOTO: &str = "goto";
pub const GOTO_KIND_RETURN: &str = "return";
pub const GOTO_KIND_BREAK: &str = "break";
pub const GOTO_KIND_CONTINUE: &str = "continue";

/// Node tags that are not operator tags.
pub mod tags {
    pub const CONSTANT: &str = "constant";
    pub const DEFAULT: &str = "default";
    pub const PARAMETER: &str = "parameter";
    pub const TYPE_IS: &str = "typeIs";
    pub const TYPE_EQUAL: &str = "typeEqual";
    pub const INDEX: &str = "index";
    pub const BLOCK: &str = "block";
    pub const MEMBER_ACCESS: &str = "memberAccess";
    pub const CALL: &str = "call";
    pub const INVOKE: &str = "invoke";
    pub const LABEL: &str = "label";
    pub const LABEL_TARGET: &str = "labelTarget";
    pub const GOTO: &str = "goto";
    pub const LOOP: &str = "loop";
    pub const SWITCH: &str = "switch";
    pub const CASE: &str = "case";
    pub const CONDITIONAL: &str = "conditional";
    pub const TRY: &str = "try";
    pub const CATCH: &str = "catch";
    pub const NEW: &str = "new";
    pub const LAMBDA: &str = "lambda";
}

/// Lookup table from both spellings of every basic type name to the type.
static BASIC_TYPES: Lazy<HashMap<&'static str, BasicType>> = Lazy::new(|| {
    let mut map = HashMap::with_capacity(BasicType::ALL.len() * 2);
    for basic in BasicType::ALL {
        map.insert(basic.short_name(), basic);
        map.insert(basic.full_name(), basic);
    }
    map
});

/// Resolve a basic type by its short (`int`) or full (`System.Int32`) name.
pub fn basic_type(name: &str) -> Option<BasicType> {
    BASIC_TYPES.get(name).copied()
}
