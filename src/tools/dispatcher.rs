//! Tool dispatch - validate and execute a single named tool invocation
//!
//! Business failures (unknown tool, missing fields, bad enum values, missing
//! parents, duplicate keys) are returned as human-readable text so they can
//! be folded into the conversation as tool output. Only infrastructure
//! failures (the store itself erroring) propagate as `Err`.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::store::{FamilyStore, Gender, NewMember};
use crate::tools::catalog::ToolCatalog;

/// Validates tool calls against the catalog and executes them on the store
pub struct ToolDispatcher<'a> {
    catalog: &'a ToolCatalog,
}

impl<'a> ToolDispatcher<'a> {
    /// Create a dispatcher over the given catalog
    pub fn new(catalog: &'a ToolCatalog) -> Self {
        Self { catalog }
    }

    /// Execute one tool invocation, returning human-readable result text.
    ///
    /// Side effects occur exactly once per successful call; this method is
    /// not idempotent and is never retried by the orchestrator.
    pub fn dispatch(
        &self,
        store: &FamilyStore,
        name: &str,
        args: &Map<String, Value>,
    ) -> Result<String> {
        log::info!("Executing tool: {}", name);

        let Some(tool) = self.catalog.get(name) else {
            return Ok(format!("Error: Unknown tool '{}'.", name));
        };

        let missing = tool.missing_required(args);
        if !missing.is_empty() {
            return Ok(format!(
                "Error: Missing one or more required arguments for {}: {}",
                name,
                missing.join(", ")
            ));
        }

        match name {
            "create_family" => self.create_family(store, args),
            "add_family_member" => self.add_family_member(store, args),
            "get_family_members_summary" => self.family_members_summary(store, args),
            "create_shopping_list" => self.create_shopping_list(store, args),
            "get_latest_shopping_list" => self.latest_shopping_list(store, args),
            // Catalog and dispatcher drifting apart is a defect; surface it
            // as tool output rather than crashing the turn.
            _ => Ok(format!("Error: Tool '{}' is not implemented.", name)),
        }
    }

    fn create_family(&self, store: &FamilyStore, args: &Map<String, Value>) -> Result<String> {
        let name = match require_str(args, "name") {
            Ok(v) => v,
            Err(msg) => return Ok(msg),
        };
        let slug = match require_str(args, "slug") {
            Ok(v) => v,
            Err(msg) => return Ok(msg),
        };

        match store.create_family(name, slug)? {
            Some(family) => Ok(format!(
                "Successfully created family: {} (ID: {})",
                family.name, family.id
            )),
            None => Ok(format!(
                "Error: Could not create family. A family with name '{}' or slug '{}' may already exist.",
                name, slug
            )),
        }
    }

    fn add_family_member(&self, store: &FamilyStore, args: &Map<String, Value>) -> Result<String> {
        let family_slug = match require_str(args, "family_slug") {
            Ok(v) => v,
            Err(msg) => return Ok(msg),
        };
        let member_name = match require_str(args, "name") {
            Ok(v) => v,
            Err(msg) => return Ok(msg),
        };

        let Some(family) = store.get_family_by_slug(family_slug)? else {
            return Ok(format!("Error: Family with slug '{}' not found.", family_slug));
        };

        let mut member = NewMember::named(member_name);

        // Gender arrives as free text; coerce case-insensitively into the
        // closed enumeration before anything is persisted.
        if let Some(value) = args.get("gender") {
            let Some(text) = value.as_str() else {
                return Ok(format!(
                    "Error: Invalid gender value '{}'. Valid options are: {}.",
                    value,
                    Gender::valid_values()
                ));
            };
            match Gender::from_input(text) {
                Some(gender) => member.gender = Some(gender),
                None => {
                    return Ok(format!(
                        "Error: Invalid gender value '{}'. Valid options are: {}.",
                        text,
                        Gender::valid_values()
                    ));
                }
            }
        }

        member.height_cm = match opt_integer(args, "height_cm") {
            Ok(v) => v,
            Err(msg) => return Ok(msg),
        };
        member.weight_kg = match opt_number(args, "weight_kg") {
            Ok(v) => v,
            Err(msg) => return Ok(msg),
        };
        member.age_years = match opt_integer(args, "age_years") {
            Ok(v) => v,
            Err(msg) => return Ok(msg),
        };
        member.target_caloric_intake_kcal = match opt_integer(args, "target_caloric_intake_kcal") {
            Ok(v) => v,
            Err(msg) => return Ok(msg),
        };

        match store.add_family_member(family.id, member)? {
            Some(created) => Ok(format!(
                "Successfully added member: {} to family {} (Member ID: {})",
                created.name, family.name, created.id
            )),
            None => Ok(format!(
                "Error: Could not add member {} to family {}.",
                member_name, family.name
            )),
        }
    }

    fn family_members_summary(
        &self,
        store: &FamilyStore,
        args: &Map<String, Value>,
    ) -> Result<String> {
        let family_slug = match require_str(args, "family_slug") {
            Ok(v) => v,
            Err(msg) => return Ok(msg),
        };

        let Some(family) = store.get_family_by_slug(family_slug)? else {
            return Ok(format!("Error: Family with slug '{}' not found.", family_slug));
        };

        store.members_summary(family.id)
    }

    fn create_shopping_list(&self, store: &FamilyStore, args: &Map<String, Value>) -> Result<String> {
        let family_slug = match require_str(args, "family_slug") {
            Ok(v) => v,
            Err(msg) => return Ok(msg),
        };

        let items = args.get("items").cloned().unwrap_or(Value::Null);
        if !items.is_object() && !items.is_array() {
            return Ok(
                "Error: Invalid value for 'items': expected an object or array of items."
                    .to_string(),
            );
        }

        let Some(family) = store.get_family_by_slug(family_slug)? else {
            return Ok(format!("Error: Family with slug '{}' not found.", family_slug));
        };

        match store.create_shopping_list(family.id, &items)? {
            Some(list) => Ok(format!(
                "Successfully created shopping list for family {} (List ID: {})",
                family.name, list.id
            )),
            None => Ok(format!(
                "Error: Could not create shopping list for family {}.",
                family.name
            )),
        }
    }

    fn latest_shopping_list(&self, store: &FamilyStore, args: &Map<String, Value>) -> Result<String> {
        let family_slug = match require_str(args, "family_slug") {
            Ok(v) => v,
            Err(msg) => return Ok(msg),
        };

        let Some(family) = store.get_family_by_slug(family_slug)? else {
            return Ok(format!("Error: Family with slug '{}' not found.", family_slug));
        };

        match store.latest_shopping_list(family.id)? {
            Some(list) => Ok(format!(
                "Latest shopping list for family {} (created {}): {}",
                family.name, list.created_at, list.items
            )),
            None => Ok("No shopping lists found for this family.".to_string()),
        }
    }
}

/// Get a required string field; Err carries the user-facing message
fn require_str<'a>(args: &'a Map<String, Value>, field: &str) -> std::result::Result<&'a str, String> {
    match args.get(field) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(format!(
            "Error: Invalid value for '{}': expected a string, got {}.",
            field, other
        )),
        None => Err(format!("Error: Missing required argument '{}'.", field)),
    }
}

/// Get an optional integer field; Err carries the user-facing message
fn opt_integer(args: &Map<String, Value>, field: &str) -> std::result::Result<Option<i64>, String> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_i64().map(Some).ok_or_else(|| {
            format!("Error: Invalid value for '{}': expected an integer, got {}.", field, value)
        }),
    }
}

/// Get an optional numeric field; Err carries the user-facing message
fn opt_number(args: &Map<String, Value>, field: &str) -> std::result::Result<Option<f64>, String> {
    match args.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value.as_f64().map(Some).ok_or_else(|| {
            format!("Error: Invalid value for '{}': expected a number, got {}.", field, value)
        }),
    }
}
