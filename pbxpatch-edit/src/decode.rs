//! Object-graph decoding of a descriptor.
//!
//! The decoder only has to produce a nested key-value tree; the line view in
//! [`crate::document`] stays the source of truth for edits.

use crate::error::{EditError, EditResult};
use pbxpatch_types::isa::Isa;
use pbxpatch_types::record::{ObjectId, ProjectGraph, Record};
use serde_json::{Map, Value};

/// Turns raw descriptor text into a nested key-value tree.
pub trait GraphDecoder {
    fn decode(&self, text: &str) -> EditResult<Value>;
}

/// Decoder for the OpenStep ASCII property-list dialect Xcode writes.
///
/// Dictionaries become JSON objects, arrays become JSON arrays and every
/// scalar becomes a JSON string. Comments are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenStepDecoder;

impl GraphDecoder for OpenStepDecoder {
    fn decode(&self, text: &str) -> EditResult<Value> {
        let mut parser = Parser { src: text, pos: 0 };
        let value = parser.value()?;
        parser.skip_trivia()?;
        if parser.pos < parser.src.len() {
            return Err(parser.error("trailing content after top-level value"));
        }
        Ok(value)
    }
}

/// Build the record view from a decoded tree (`{ objects = {...}; rootObject = ...; }`).
pub fn graph_from_tree(tree: &Value) -> EditResult<ProjectGraph> {
    let objects = tree
        .get("objects")
        .and_then(Value::as_object)
        .ok_or_else(|| EditError::malformed("missing `objects` dictionary"))?;

    let mut graph = ProjectGraph {
        root_object: tree
            .get("rootObject")
            .and_then(Value::as_str)
            .map(ObjectId::from),
        ..ProjectGraph::default()
    };

    for (id, object) in objects {
        let Some(fields) = object.as_object() else {
            return Err(EditError::malformed(format!(
                "object {id} is not a dictionary"
            )));
        };
        let Some(isa) = fields.get("isa").and_then(Value::as_str) else {
            return Err(EditError::malformed(format!("object {id} has no `isa`")));
        };

        let record = Record {
            id: ObjectId::from(id.as_str()),
            isa: Isa::from(isa),
            fields: fields
                .iter()
                .filter(|(k, _)| k.as_str() != "isa")
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };
        graph.records.insert(record.id.clone(), record);
    }

    Ok(graph)
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn error(&self, message: &str) -> EditError {
        let consumed = &self.src[..self.pos];
        let line = consumed.matches('\n').count() + 1;
        let column = consumed.len() - consumed.rfind('\n').map_or(0, |i| i + 1) + 1;
        EditError::malformed(format!("{message} at line {line}, column {column}"))
    }

    fn skip_trivia(&mut self) -> EditResult<()> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            self.pos += rest.len() - trimmed.len();

            if trimmed.starts_with("/*") {
                match trimmed[2..].find("*/") {
                    Some(end) => self.pos += end + 4,
                    None => return Err(self.error("unterminated comment")),
                }
            } else if trimmed.starts_with("//") {
                self.pos += trimmed.find('\n').unwrap_or(trimmed.len());
            } else {
                return Ok(());
            }
        }
    }

    fn expect(&mut self, c: char) -> EditResult<()> {
        self.skip_trivia()?;
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            Ok(())
        } else {
            Err(self.error(&format!("expected `{c}`")))
        }
    }

    fn value(&mut self) -> EditResult<Value> {
        self.skip_trivia()?;
        match self.peek() {
            Some('{') => self.dictionary(),
            Some('(') => self.array(),
            Some(_) => self.string().map(Value::String),
            None => Err(self.error("unexpected end of input")),
        }
    }

    fn dictionary(&mut self) -> EditResult<Value> {
        self.expect('{')?;
        let mut map = Map::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.pos += 1;
                return Ok(Value::Object(map));
            }
            let key = self.string()?;
            self.expect('=')?;
            let value = self.value()?;
            self.expect(';')?;
            map.insert(key, value);
        }
    }

    fn array(&mut self) -> EditResult<Value> {
        self.expect('(')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(')') {
                self.pos += 1;
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(')') => {}
                _ => return Err(self.error("expected `,` or `)` in array")),
            }
        }
    }

    fn string(&mut self) -> EditResult<String> {
        self.skip_trivia()?;
        if self.peek() == Some('"') {
            return self.quoted();
        }

        let rest = self.rest();
        let mut end = 0;
        for (i, c) in rest.char_indices() {
            if !is_unquoted_char(c) || rest[i..].starts_with("/*") {
                break;
            }
            end = i + c.len_utf8();
        }
        if end == 0 {
            return Err(self.error("expected a string"));
        }
        self.pos += end;
        Ok(rest[..end].to_string())
    }

    fn quoted(&mut self) -> EditResult<String> {
        self.pos += 1;
        let mut out = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += i + 1;
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, 'U')) => {
                        let hex: String = chars.by_ref().take(4).map(|(_, h)| h).collect();
                        match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                            Some(decoded) => out.push(decoded),
                            None => return Err(self.error("invalid \\U escape")),
                        }
                    }
                    Some((_, other)) => out.push(other),
                    None => break,
                },
                other => out.push(other),
            }
        }
        Err(self.error("unterminated quoted string"))
    }
}

pub(crate) fn is_unquoted_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '{' | '}' | '(' | ')' | '=' | ';' | ',' | '"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(text: &str) -> EditResult<Value> {
        OpenStepDecoder.decode(text)
    }

    #[test]
    fn decodes_nested_structures_and_drops_comments() {
        let text = r#"// !$*UTF8*$!
{
	archiveVersion = 1;
	objects = {
		A1 /* Runner */ = {isa = PBXNativeTarget; name = Runner; buildPhases = (B1 /* Sources */, B2, ); };
	};
	rootObject = P1 /* Project object */;
}
"#;
        let tree = decode(text).expect("decode");
        assert_eq!(
            tree,
            json!({
                "archiveVersion": "1",
                "objects": {
                    "A1": {
                        "isa": "PBXNativeTarget",
                        "name": "Runner",
                        "buildPhases": ["B1", "B2"],
                    }
                },
                "rootObject": "P1",
            })
        );
    }

    #[test]
    fn decodes_quoted_strings_with_escapes() {
        let tree = decode(r#"{ a = "x \"y\"\n"; b = "\U00e9"; c = "<group>"; }"#).expect("decode");
        assert_eq!(tree["a"], json!("x \"y\"\n"));
        assert_eq!(tree["b"], json!("é"));
        assert_eq!(tree["c"], json!("<group>"));
    }

    #[test]
    fn unquoted_paths_keep_slashes() {
        let tree = decode("{ relativePath = Flutter/ephemeral/Packages; }").expect("decode");
        assert_eq!(tree["relativePath"], json!("Flutter/ephemeral/Packages"));
    }

    #[test]
    fn reports_position_of_errors() {
        let err = decode("{\n a = b\n}").unwrap_err();
        assert!(err.to_string().contains("expected `;`"), "{err}");
        assert!(err.to_string().contains("line 3"), "{err}");

        assert!(decode("{ a = \"open; }").is_err());
        assert!(decode("{ a = b; /* open").is_err());
        assert!(decode("{ a = b; } extra").is_err());
    }

    #[test]
    fn graph_requires_objects_and_isa() {
        assert!(graph_from_tree(&json!({})).is_err());
        assert!(graph_from_tree(&json!({ "objects": { "A": { "name": "x" } } })).is_err());

        let graph = graph_from_tree(&json!({
            "objects": { "A": { "isa": "PBXProject" } },
            "rootObject": "A",
        }))
        .expect("graph");
        assert_eq!(graph.root_object, Some(ObjectId::from("A")));
        assert!(graph.contains(&ObjectId::from("A"), &Isa::Project));
        assert!(graph.records[&ObjectId::from("A")].fields.is_empty());
    }
}
