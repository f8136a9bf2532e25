//! Persisted entity records: families, members, shopping lists.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Closed gender enumeration for family members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Diverse,
    PreferNotToSay,
}

impl Gender {
    /// All valid values, in declaration order
    pub const ALL: [Gender; 4] = [
        Gender::Male,
        Gender::Female,
        Gender::Diverse,
        Gender::PreferNotToSay,
    ];

    /// Lowercase string form used on the wire and in storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Diverse => "diverse",
            Gender::PreferNotToSay => "prefer_not_to_say",
        }
    }

    /// Parse free-text input, case-insensitively
    pub fn from_input(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "diverse" => Some(Gender::Diverse),
            "prefer_not_to_say" => Some(Gender::PreferNotToSay),
            _ => None,
        }
    }

    /// Comma-separated list of valid values, for validation messages
    pub fn valid_values() -> String {
        Self::ALL
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A family unit, addressed externally by its unique slug
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// A member of a family; all measurements are optional
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyMember {
    pub id: i64,
    pub family_id: i64,
    pub name: String,
    pub height_cm: Option<i64>,
    pub weight_kg: Option<f64>,
    pub age_years: Option<i64>,
    pub gender: Option<Gender>,
    pub target_caloric_intake_kcal: Option<i64>,
}

/// Fields for creating a family member; the store assigns the id
#[derive(Debug, Clone, Default)]
pub struct NewMember {
    pub name: String,
    pub height_cm: Option<i64>,
    pub weight_kg: Option<f64>,
    pub age_years: Option<i64>,
    pub gender: Option<Gender>,
    pub target_caloric_intake_kcal: Option<i64>,
}

impl NewMember {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// A shopping list snapshot attached to a family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: i64,
    pub family_id: i64,
    pub created_at: String,
    pub items: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_as_str() {
        assert_eq!(Gender::Male.as_str(), "male");
        assert_eq!(Gender::Female.as_str(), "female");
        assert_eq!(Gender::Diverse.as_str(), "diverse");
        assert_eq!(Gender::PreferNotToSay.as_str(), "prefer_not_to_say");
    }

    #[test]
    fn test_gender_from_input_case_insensitive() {
        assert_eq!(Gender::from_input("male"), Some(Gender::Male));
        assert_eq!(Gender::from_input("Male"), Some(Gender::Male));
        assert_eq!(Gender::from_input("FEMALE"), Some(Gender::Female));
        assert_eq!(Gender::from_input("Prefer_Not_To_Say"), Some(Gender::PreferNotToSay));
    }

    #[test]
    fn test_gender_from_input_unknown() {
        assert_eq!(Gender::from_input("robot"), None);
        assert_eq!(Gender::from_input(""), None);
    }

    #[test]
    fn test_gender_valid_values() {
        assert_eq!(
            Gender::valid_values(),
            "male, female, diverse, prefer_not_to_say"
        );
    }

    #[test]
    fn test_gender_serde_snake_case() {
        let json = serde_json::to_string(&Gender::PreferNotToSay).unwrap();
        assert_eq!(json, "\"prefer_not_to_say\"");
        let back: Gender = serde_json::from_str("\"diverse\"").unwrap();
        assert_eq!(back, Gender::Diverse);
    }

    #[test]
    fn test_new_member_named() {
        let member = NewMember::named("Lisa");
        assert_eq!(member.name, "Lisa");
        assert!(member.height_cm.is_none());
        assert!(member.gender.is_none());
    }

    #[test]
    fn test_family_serialization_roundtrip() {
        let family = Family {
            id: 1,
            name: "The Smiths".to_string(),
            slug: "smiths".to_string(),
        };
        let json = serde_json::to_string(&family).unwrap();
        let back: Family = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, 1);
        assert_eq!(back.slug, "smiths");
    }
}
