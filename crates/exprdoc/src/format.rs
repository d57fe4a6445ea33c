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

//! Document format selection

use crate::error::Error;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The two document dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    /// Usual file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Xml => "xml",
        }
    }

    /// Format named by the extension of `path`.
    pub fn from_path(path: &Path) -> Result<Format, Error> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| Error::UnknownFormat(path.display().to_string()))?;
        ext.parse()
    }

    /// Guess the format from the first significant character of `text`.
    pub fn detect(text: &str) -> Option<Format> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        match text.trim_start().chars().next()? {
            '{' => Some(Format::Json),
            '<' => Some(Format::Xml),
            // a lenient JSON document may open with a comment
            '/' => Some(Format::Json),
            _ => None,
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("XML".parse::<Format>().unwrap(), Format::Xml);
        assert!(matches!("yaml".parse::<Format>(), Err(Error::UnknownFormat(s)) if s == "yaml"));
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Format::from_path(Path::new("a/b.Json")).unwrap(), Format::Json);
        assert_eq!(Format::from_path(Path::new("tree.xml")).unwrap(), Format::Xml);
        assert!(Format::from_path(Path::new("README")).is_err());
    }

    #[test]
    fn test_detect() {
        assert_eq!(Format::detect("\u{feff}  <?xml version=\"1.0\"?>"), Some(Format::Xml));
        assert_eq!(Format::detect("\n{}"), Some(Format::Json));
        assert_eq!(Format::detect("// note\n{}"), Some(Format::Json));
        assert_eq!(Format::detect("   "), None);
        assert_eq!(Format::detect("42"), None);
    }
}
