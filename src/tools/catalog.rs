//! Declarative tool catalog
//!
//! The single source of truth for what the model is permitted to request.
//! Purely declarative; execution lives in the dispatcher.

use serde_json::{Value, json};

use crate::llm::ToolDefinition;

/// A declared tool: name, description, parameter schema, required fields
#[derive(Debug, Clone)]
pub struct Tool {
    pub name: String,
    pub description: String,
    /// JSON-schema `properties` map for the parameters object
    pub params: Value,
    pub required: Vec<String>,
}

impl Tool {
    /// Create a new tool with an empty parameter schema
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: json!({}),
            required: Vec::new(),
        }
    }

    /// Set the parameter properties schema
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    /// Set the required field names
    pub fn with_required(mut self, required: &[&str]) -> Self {
        self.required = required.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Names of required fields absent from the given argument map
    pub fn missing_required(&self, args: &serde_json::Map<String, Value>) -> Vec<&str> {
        self.required
            .iter()
            .filter(|field| !args.contains_key(*field))
            .map(String::as_str)
            .collect()
    }

    /// Convert to the wire-format tool definition offered to the model
    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(
            self.name.clone(),
            self.description.clone(),
            json!({
                "type": "object",
                "properties": self.params,
                "required": self.required
            }),
        )
    }
}

/// Ordered catalog of declared tools
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<Tool>,
}

impl ToolCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in catalog for the recipe assistant
    pub fn builtin() -> Self {
        let mut catalog = Self::new();

        catalog.add(
            Tool::new(
                "create_family",
                "Creates a new family unit. Use a short, memorable, URL-friendly slug.",
            )
            .with_params(json!({
                "name": {
                    "type": "string",
                    "description": "The name of the family."
                },
                "slug": {
                    "type": "string",
                    "description": "A short, URL-friendly slug for the family (e.g., 'the-smiths')."
                }
            }))
            .with_required(&["name", "slug"]),
        );

        catalog.add(
            Tool::new(
                "add_family_member",
                "Adds a new member to a specified family. All details are optional except name and family_slug.",
            )
            .with_params(json!({
                "family_slug": {
                    "type": "string",
                    "description": "The slug of the family to add the member to."
                },
                "name": {
                    "type": "string",
                    "description": "Name of the family member."
                },
                "height_cm": {
                    "type": "integer",
                    "description": "Height of the member in centimeters (optional)."
                },
                "weight_kg": {
                    "type": "number",
                    "description": "Weight of the member in kilograms (optional)."
                },
                "age_years": {
                    "type": "integer",
                    "description": "Age of the member in years (optional)."
                },
                "gender": {
                    "type": "string",
                    "description": "Gender of the member (optional).",
                    "enum": ["male", "female", "diverse", "prefer_not_to_say"]
                },
                "target_caloric_intake_kcal": {
                    "type": "integer",
                    "description": "Target daily caloric intake in kcal for the member (optional)."
                }
            }))
            .with_required(&["family_slug", "name"]),
        );

        catalog.add(
            Tool::new(
                "get_family_members_summary",
                "Retrieves a CSV summary of all members for a given family slug.",
            )
            .with_params(json!({
                "family_slug": {
                    "type": "string",
                    "description": "The slug of the family to retrieve members from."
                }
            }))
            .with_required(&["family_slug"]),
        );

        catalog.add(
            Tool::new(
                "create_shopping_list",
                "Creates a new shopping list for a family. Items is a mapping of item name to quantity or note.",
            )
            .with_params(json!({
                "family_slug": {
                    "type": "string",
                    "description": "The slug of the family the list belongs to."
                },
                "items": {
                    "type": "object",
                    "description": "Shopping list items as a name -> quantity/note mapping."
                }
            }))
            .with_required(&["family_slug", "items"]),
        );

        catalog.add(
            Tool::new(
                "get_latest_shopping_list",
                "Retrieves the most recent shopping list for a given family slug.",
            )
            .with_params(json!({
                "family_slug": {
                    "type": "string",
                    "description": "The slug of the family to retrieve the list for."
                }
            }))
            .with_required(&["family_slug"]),
        );

        catalog
    }

    /// Add a tool, preserving insertion order
    pub fn add(&mut self, tool: Tool) {
        self.tools.push(tool);
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }

    /// Tool names in catalog order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    /// All tools in catalog order
    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    /// Wire-format definitions for a completion request, in catalog order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(Tool::to_definition).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_builder() {
        let tool = Tool::new("create_family", "Creates a family")
            .with_params(json!({"name": {"type": "string"}}))
            .with_required(&["name"]);

        assert_eq!(tool.name, "create_family");
        assert_eq!(tool.required, vec!["name"]);
        assert!(tool.params["name"].is_object());
    }

    #[test]
    fn test_missing_required() {
        let tool = Tool::new("create_family", "desc").with_required(&["name", "slug"]);

        let mut args = serde_json::Map::new();
        args.insert("name".to_string(), json!("The Smiths"));

        assert_eq!(tool.missing_required(&args), vec!["slug"]);

        args.insert("slug".to_string(), json!("smiths"));
        assert!(tool.missing_required(&args).is_empty());
    }

    #[test]
    fn test_to_definition_schema_shape() {
        let tool = Tool::new("create_family", "Creates a family")
            .with_params(json!({"name": {"type": "string"}}))
            .with_required(&["name"]);

        let def = tool.to_definition();
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["parameters"]["type"], "object");
        assert_eq!(json["function"]["parameters"]["required"][0], "name");
        assert!(json["function"]["parameters"]["properties"]["name"].is_object());
    }

    #[test]
    fn test_builtin_catalog_contents() {
        let catalog = ToolCatalog::builtin();
        assert_eq!(catalog.len(), 5);
        assert_eq!(
            catalog.names(),
            vec![
                "create_family",
                "add_family_member",
                "get_family_members_summary",
                "create_shopping_list",
                "get_latest_shopping_list"
            ]
        );
    }

    #[test]
    fn test_builtin_catalog_required_fields() {
        let catalog = ToolCatalog::builtin();
        assert_eq!(
            catalog.get("create_family").unwrap().required,
            vec!["name", "slug"]
        );
        assert_eq!(
            catalog.get("add_family_member").unwrap().required,
            vec!["family_slug", "name"]
        );
        assert_eq!(
            catalog.get("get_family_members_summary").unwrap().required,
            vec!["family_slug"]
        );
    }

    #[test]
    fn test_builtin_gender_enum_matches_store() {
        use crate::store::Gender;

        let catalog = ToolCatalog::builtin();
        let tool = catalog.get("add_family_member").unwrap();
        let schema_values: Vec<String> = tool.params["gender"]["enum"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect();

        let enum_values: Vec<String> = Gender::ALL.iter().map(|g| g.as_str().to_string()).collect();
        assert_eq!(schema_values, enum_values);
    }

    #[test]
    fn test_get_unknown_tool() {
        let catalog = ToolCatalog::builtin();
        assert!(catalog.get("launch_rocket").is_none());
    }

    #[test]
    fn test_definitions_preserve_order() {
        let catalog = ToolCatalog::builtin();
        let defs = catalog.definitions();
        assert_eq!(defs.len(), 5);
        assert_eq!(defs[0].function.name, "create_family");
        assert_eq!(defs[4].function.name, "get_latest_shopping_list");
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = ToolCatalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.definitions().is_empty());
    }
}
