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

//! Options shared by the JSON and XML converters.

/// Default maximum node nesting depth accepted when reading a document.
///
/// Readers grow the stack on demand; the limit bounds the work per document.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// How type names are written into documents.
///
/// Reading always accepts both spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeNameConvention {
    /// `int`, `List<string>`, `Acme.Orders.Order`.
    #[default]
    Short,
    /// `System.Int32`, `System.Collections.Generic.List<System.String>`.
    Full,
}

/// When documents are checked against the dialect schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationMode {
    /// Validate every document; a missing schema is an error.
    Always,
    /// Never validate.
    Never,
    /// Validate when a schema is configured or the document names a known one.
    #[default]
    IfSchemaPresent,
}

/// Options for the expression-to-document direction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SerializeOptions {
    /// Attach a readable rendering of each node as a comment.
    pub add_comments: bool,
    /// Type name spelling.
    pub type_names: TypeNameConvention,
}

/// Options for the document-to-expression direction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeserializeOptions {
    /// Maximum node nesting depth.
    pub max_depth: usize,
}

impl Default for DeserializeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(ValidationMode::default(), ValidationMode::IfSchemaPresent);
        assert_eq!(TypeNameConvention::default(), TypeNameConvention::Short);
        assert_eq!(DeserializeOptions::default().max_depth, DEFAULT_MAX_DEPTH);
        assert!(!SerializeOptions::default().add_comments);
    }
}
