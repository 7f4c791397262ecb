//! Struct field projection
//!
//! Decides, field by field and in declaration order, what survives into the
//! mirrored struct. Unexported fields and fields tagged `json:"-"` disappear,
//! embedded fields keep only their type, and only the `json` tag key is carried
//! over. Other tag keys (`yaml`, `toml`, ...) are intentionally not re-emitted.

use regex::Regex;
use std::sync::OnceLock;

use super::imports::ImportCollector;
use super::render::TypeRenderer;
use super::types::{Field, StructType};

/// The only struct tag key carried into the mirror package
pub const SERIALIZATION_TAG_KEY: &str = "json";

/// The decision taken for one struct field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProjection {
    pub included: bool,
    pub embedded: bool,
    /// Cleaned import paths the field's type needs
    pub imports: Vec<String>,
    /// Comma-separated values of the `json` tag, when the field had one
    pub tag_values: Option<Vec<String>>,
    /// Rendered field line, empty when the field is not included
    pub line: String,
}

impl FieldProjection {
    fn dropped() -> Self {
        Self {
            included: false,
            embedded: false,
            imports: Vec::new(),
            tag_values: None,
            line: String::new(),
        }
    }

    /// First tag value, i.e. the serialized key name
    pub fn serialization_key(&self) -> Option<&str> {
        self.tag_values
            .as_ref()
            .and_then(|values| values.first())
            .map(String::as_str)
    }
}

pub struct FieldProjector<'a> {
    renderer: TypeRenderer<'a>,
}

impl<'a> FieldProjector<'a> {
    pub fn new(renderer: TypeRenderer<'a>) -> Self {
        Self { renderer }
    }

    pub fn project(&self, field: &Field, current_package: &str) -> FieldProjection {
        if !field.is_exported() {
            return FieldProjection::dropped();
        }

        let imports = self.renderer.imports_for(&field.ty, current_package);
        let rendered = self.renderer.render(&field.ty, current_package);

        if field.embedded {
            return FieldProjection {
                included: true,
                embedded: true,
                imports,
                tag_values: None,
                line: format!("\t{rendered}\n"),
            };
        }

        let tag_values = field
            .tag
            .as_deref()
            .and_then(|tag| lookup_tag_values(tag, SERIALIZATION_TAG_KEY));
        if tag_values
            .as_ref()
            .is_some_and(|values| values.first().is_some_and(|first| first == "-"))
        {
            return FieldProjection::dropped();
        }

        let mut line = format!("\t{} {}", field.name, rendered);
        if let Some(values) = &tag_values {
            line.push_str(&format!(
                " `{}:\"{}\"`",
                SERIALIZATION_TAG_KEY,
                values.join(",")
            ));
        }
        line.push('\n');

        FieldProjection {
            included: true,
            embedded: false,
            imports,
            tag_values,
            line,
        }
    }

    /// Render `type <name> struct { ... }`, recording the imports of surviving fields
    pub fn render_struct(
        &self,
        name: &str,
        st: &StructType,
        current_package: &str,
        imports: &mut ImportCollector,
    ) -> String {
        let mut out = format!("type {name} struct {{\n");
        for field in &st.fields {
            let projection = self.project(field, current_package);
            if !projection.included {
                continue;
            }
            for path in &projection.imports {
                imports.add(path);
            }
            out.push_str(&projection.line);
        }
        out.push_str("}\n");
        out
    }
}

fn tag_pair_regex() -> &'static Regex {
    static TAG_PAIR: OnceLock<Regex> = OnceLock::new();
    TAG_PAIR.get_or_init(|| {
        Regex::new(r#"^ *([^ \x00-\x1f\x7f:"]+):"((?:[^"\\]|\\.)*)""#)
            .unwrap_or_else(|err| panic!("invalid struct tag pattern: {err}"))
    })
}

/// Look up `key` in a conventional `key:"value" other:"value"` struct tag and
/// split its value on commas. Returns `None` when the key is absent or the tag
/// is malformed before the key is reached.
pub fn lookup_tag_values(tag: &str, key: &str) -> Option<Vec<String>> {
    let pattern = tag_pair_regex();
    let mut rest = tag;
    while let Some(captures) = pattern.captures(rest) {
        let whole = captures.get(0)?;
        if &captures[1] == key {
            let value = unescape(&captures[2]);
            return Some(value.split(',').map(str::to_string).collect());
        }
        rest = &rest[whole.end()..];
    }
    None
}

fn unescape(quoted: &str) -> String {
    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
