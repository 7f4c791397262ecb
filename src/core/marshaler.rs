use super::writer::PROVENANCE;

/// Default name of the generated helper file
pub const DEFAULT_FILE_NAME: &str = "marshaler.go";

/// Default top-level type wrapped by the helper
pub const DEFAULT_ROOT_TYPE: &str = "Configuration";

/// The JSON marshaling helper for the mirror package.
///
/// `JSONPayload` embeds a pointer to `root_type`; a nil payload marshals to no
/// bytes at all instead of `null`.
pub fn render(package_name: &str, root_type: &str) -> String {
    format!(
        r#"package {package_name}

{PROVENANCE}

import "encoding/json"

// JSONPayload wraps {root_type} for JSON serialization.
type JSONPayload struct {{
	*{root_type}
}}

// MarshalJSON returns the JSON encoding of the wrapped {root_type}.
func (c JSONPayload) MarshalJSON() ([]byte, error) {{
	if c.{root_type} == nil {{
		return nil, nil
	}}
	return json.Marshal(c.{root_type})
}}
"#
    )
}
