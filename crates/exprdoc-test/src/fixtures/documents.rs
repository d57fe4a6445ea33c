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

//! Hand-written documents for the failure scenarios.
//!
//! Each scenario comes in both dialects. The documents are schema-valid; the
//! engine is what rejects them.

use exprdoc_core::vocabulary::{JSON_SCHEMA_ID, XML_NAMESPACE};

/// Path of the operand array in [`three_operand_add_json`] / [`three_operand_add_xml`].
pub const THREE_OPERAND_PATH: &str = "expression/lambda/body/add/operands";

/// Path of the method fragment in [`wrong_overload_json`] / [`wrong_overload_xml`].
pub const WRONG_OVERLOAD_PATH: &str = "expression/call/method";

/// `(a, b) => a + b` with a third operand.
pub fn three_operand_add_json() -> String {
    format!(
        r#"{{
  "$schema": "{JSON_SCHEMA_ID}",
  "expression": {{
    "lambda": {{
      "type": "Func<int, int, int>",
      "parameters": [
        {{"parameter": {{"id": "P1", "type": "int", "name": "a"}}}},
        {{"parameter": {{"id": "P2", "type": "int", "name": "b"}}}}
      ],
      "body": {{
        "add": {{
          "operands": [
            {{"parameter": {{"idref": "P1"}}}},
            {{"parameter": {{"idref": "P2"}}}},
            {{"constant": {{"type": "int", "value": 3}}}}
          ]
        }}
      }}
    }}
  }}
}}"#
    )
}

/// `(a, b) => a + b` with a third operand.
pub fn three_operand_add_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<expression xmlns="{XML_NAMESPACE}">
  <lambda type="Func&lt;int, int, int&gt;">
    <parameters>
      <parameter id="P1" type="int" name="a"/>
      <parameter id="P2" type="int" name="b"/>
    </parameters>
    <body>
      <add>
        <operands>
          <parameter idref="P1"/>
          <parameter idref="P2"/>
          <constant type="int"><value>3</value></constant>
        </operands>
      </add>
    </body>
  </lambda>
</expression>"#
    )
}

fn thirty() -> impl Iterator<Item = u32> {
    1..=30
}

/// A `BlockingCollection<int>` constant reporting 32 items but carrying 30.
pub fn short_collection_json() -> String {
    let items = thirty().map(|i| i.to_string()).collect::<Vec<_>>().join(", ");
    format!(
        r#"{{
  "$schema": "{JSON_SCHEMA_ID}",
  "expression": {{
    "constant": {{
      "type": "BlockingCollection<int>",
      "value": {{"length": 32, "items": [{items}]}}
    }}
  }}
}}"#
    )
}

/// A `BlockingCollection<int>` constant reporting 32 items but carrying 30.
pub fn short_collection_xml() -> String {
    let items: String = thirty().map(|i| format!("<item>{}</item>", i)).collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<expression xmlns="{XML_NAMESPACE}">
  <constant type="BlockingCollection&lt;int&gt;">
    <value><length>32</length><items>{items}</items></value>
  </constant>
</expression>"#
    )
}

/// A call to `Acme.Sample.Method3(int, double)`, which is not declared.
///
/// Needs the sample registry.
pub fn wrong_overload_json() -> String {
    format!(
        r#"{{
  "$schema": "{JSON_SCHEMA_ID}",
  "expression": {{
    "call": {{
      "method": {{
        "declaringType": "Acme.Sample",
        "name": "Method3",
        "parameterSpecs": [{{"type": "int"}}, {{"type": "double"}}]
      }},
      "object": {{
        "new": {{"type": "Acme.Sample", "constructor": {{"declaringType": "Acme.Sample"}}}}
      }},
      "arguments": [
        {{"constant": {{"type": "int", "value": 1}}}},
        {{"constant": {{"type": "double", "value": 2.5}}}}
      ]
    }}
  }}
}}"#
    )
}

/// A call to `Acme.Sample.Method3(int, double)`, which is not declared.
///
/// Needs the sample registry.
pub fn wrong_overload_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<expression xmlns="{XML_NAMESPACE}">
  <call>
    <method declaringType="Acme.Sample" name="Method3">
      <parameterSpecs>
        <parameterSpec type="int"/>
        <parameterSpec type="double"/>
      </parameterSpecs>
    </method>
    <object>
      <new type="Acme.Sample"><constructor declaringType="Acme.Sample"/></new>
    </object>
    <arguments>
      <constant type="int"><value>1</value></constant>
      <constant type="double"><value>2.5</value></constant>
    </arguments>
  </call>
</expression>"#
    )
}

/// `x => x * 2` written by hand, with comments and a trailing comma.
pub fn lenient_json() -> String {
    format!(
        r#"{{
  // written by hand
  "$schema": "{JSON_SCHEMA_ID}",
  "expression": {{
    "lambda": {{
      "$comment": "x => (x * 2)",
      "type": "Func<int, int>",
      "parameters": [{{"parameter": {{"id": "P1", "type": "int", "name": "x"}}}}],
      /* the body */
      "body": {{
        "multiply": {{
          "operands": [
            {{"parameter": {{"idref": "P1"}}}},
            {{"constant": {{"type": "int", "value": 2}}}},
          ],
        }},
      }},
    }},
  }},
}}"#
    )
}

/// `x => x * 2` with an XML comment in front of every node.
pub fn commented_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<expression xmlns="{XML_NAMESPACE}">
  <lambda type="Func&lt;int, int&gt;">
    <!-- x => (x * 2) -->
    <parameters>
      <parameter id="P1" type="int" name="x"/>
    </parameters>
    <body>
      <multiply>
        <!-- (x * 2) -->
        <operands>
          <parameter idref="P1"/>
          <constant type="int"><value>2</value></constant>
        </operands>
      </multiply>
    </body>
  </lambda>
</expression>"#
    )
}
