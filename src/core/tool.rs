use serde::{Deserialize, Serialize};

/// What the assistant is told about one storefront action: its name, when to
/// use it, and the JSON arguments it takes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<serde_json::Value>,
}

impl ToolDescriptor {
    /// Argument names the schema marks as required.
    pub fn required_args(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(|v| v.as_array())
            .map(|names| names.iter().filter_map(|n| n.as_str()).collect())
            .unwrap_or_default()
    }

    /// Markdown section describing this tool in the assistant prompt.
    pub fn prompt_entry(&self) -> String {
        let mut out = format!("### {}\n{}\n", self.name, self.description);
        let required = self.required_args();
        if !required.is_empty() {
            out.push_str(&format!("Required: {}\n", required.join(", ")));
        }
        out.push_str(&format!(
            "Input schema: {}\n\n",
            serde_json::to_string(&self.input_schema).unwrap_or_else(|_| "{}".to_string())
        ));
        out
    }
}
