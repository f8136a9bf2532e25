//! FamilyStore implementation backed by SQLite.
//!
//! The store owns a single `rusqlite::Connection` and exposes the backend
//! service operations the tool dispatcher runs against: family creation and
//! lookup, member management, the CSV member summary, and shopping lists.
//! A store is opened for exactly one dispatch phase and released when it is
//! dropped.

use std::path::Path;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;

use crate::error::Result;
use crate::store::models::{Family, FamilyMember, Gender, NewMember, ShoppingList};

/// Sentinel returned by the member summary when the family does not exist
pub const FAMILY_NOT_FOUND: &str = "Family not found.";

/// Sentinel returned by the member summary when the family has no members
pub const NO_MEMBERS_FOUND: &str = "No members found for this family.";

/// Fixed column order of the member summary CSV
const SUMMARY_COLUMNS: &str = "id,name,height_cm,weight_kg,age_years,gender,target_caloric_intake_kcal";

/// SQLite-backed store for families, members, and shopping lists
pub struct FamilyStore {
    conn: Connection,
}

impl FamilyStore {
    /// Open or create the store at the given database path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an ephemeral in-memory store (tests, dry runs)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Initialize the schema idempotently
    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS family (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                slug TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS family_member (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                family_id INTEGER NOT NULL REFERENCES family(id),
                name TEXT NOT NULL,
                height_cm INTEGER,
                weight_kg REAL,
                age_years INTEGER,
                gender TEXT,
                target_caloric_intake_kcal INTEGER
            );

            CREATE TABLE IF NOT EXISTS shopping_list (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                family_id INTEGER NOT NULL REFERENCES family(id),
                created_at TEXT NOT NULL,
                items_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_member_family ON family_member(family_id);
            CREATE INDEX IF NOT EXISTS idx_list_family ON shopping_list(family_id);
            "#,
        )?;
        Ok(())
    }

    /// Create a new family.
    ///
    /// Returns `None` when a family with the same name or slug already
    /// exists.
    pub fn create_family(&self, name: &str, slug: &str) -> Result<Option<Family>> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM family WHERE name = ?1 OR slug = ?2",
                params![name, slug],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Ok(None);
        }

        self.conn.execute(
            "INSERT INTO family (name, slug) VALUES (?1, ?2)",
            params![name, slug],
        )?;

        let id = self.conn.last_insert_rowid();
        Ok(Some(Family {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
        }))
    }

    /// Retrieve a family by its slug
    pub fn get_family_by_slug(&self, slug: &str) -> Result<Option<Family>> {
        let family = self
            .conn
            .query_row(
                "SELECT id, name, slug FROM family WHERE slug = ?1",
                [slug],
                |row| {
                    Ok(Family {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        slug: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(family)
    }

    /// Retrieve a family by its id
    pub fn get_family_by_id(&self, family_id: i64) -> Result<Option<Family>> {
        let family = self
            .conn
            .query_row(
                "SELECT id, name, slug FROM family WHERE id = ?1",
                [family_id],
                |row| {
                    Ok(Family {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        slug: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(family)
    }

    /// Add a member to an existing family.
    ///
    /// Returns `None` when the family does not exist.
    pub fn add_family_member(&self, family_id: i64, member: NewMember) -> Result<Option<FamilyMember>> {
        if self.get_family_by_id(family_id)?.is_none() {
            return Ok(None);
        }

        self.conn.execute(
            r#"
            INSERT INTO family_member
            (family_id, name, height_cm, weight_kg, age_years, gender, target_caloric_intake_kcal)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                family_id,
                member.name,
                member.height_cm,
                member.weight_kg,
                member.age_years,
                member.gender.map(|g| g.as_str()),
                member.target_caloric_intake_kcal,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        Ok(Some(FamilyMember {
            id,
            family_id,
            name: member.name,
            height_cm: member.height_cm,
            weight_kg: member.weight_kg,
            age_years: member.age_years,
            gender: member.gender,
            target_caloric_intake_kcal: member.target_caloric_intake_kcal,
        }))
    }

    /// List all members of a family, ordered by id
    pub fn list_members(&self, family_id: i64) -> Result<Vec<FamilyMember>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, family_id, name, height_cm, weight_kg, age_years, gender, target_caloric_intake_kcal
            FROM family_member WHERE family_id = ?1 ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map([family_id], |row| {
            let gender: Option<String> = row.get(6)?;
            Ok(FamilyMember {
                id: row.get(0)?,
                family_id: row.get(1)?,
                name: row.get(2)?,
                height_cm: row.get(3)?,
                weight_kg: row.get(4)?,
                age_years: row.get(5)?,
                gender: gender.as_deref().and_then(Gender::from_input),
                target_caloric_intake_kcal: row.get(7)?,
            })
        })?;

        let mut members = Vec::new();
        for row in rows {
            members.push(row?);
        }
        Ok(members)
    }

    /// Format all members of a family as CSV text.
    ///
    /// Header row is fixed; missing fields render as empty, gender as its
    /// lowercase string form, and names are quoted when they contain CSV
    /// metacharacters. Returns a sentinel string when the family is missing
    /// or childless.
    pub fn members_summary(&self, family_id: i64) -> Result<String> {
        if self.get_family_by_id(family_id)?.is_none() {
            return Ok(FAMILY_NOT_FOUND.to_string());
        }

        let members = self.list_members(family_id)?;
        if members.is_empty() {
            return Ok(NO_MEMBERS_FOUND.to_string());
        }

        let mut out = String::from(SUMMARY_COLUMNS);
        for m in &members {
            out.push('\n');
            out.push_str(&format!(
                "{},{},{},{},{},{},{}",
                m.id,
                csv_field(&m.name),
                opt_to_field(m.height_cm),
                opt_to_field(m.weight_kg),
                opt_to_field(m.age_years),
                m.gender.map(|g| g.as_str()).unwrap_or(""),
                opt_to_field(m.target_caloric_intake_kcal),
            ));
        }
        Ok(out)
    }

    /// Create a shopping list for an existing family.
    ///
    /// Returns `None` when the family does not exist.
    pub fn create_shopping_list(&self, family_id: i64, items: &Value) -> Result<Option<ShoppingList>> {
        if self.get_family_by_id(family_id)?.is_none() {
            return Ok(None);
        }

        let created_at = Utc::now().to_rfc3339();
        let items_json = serde_json::to_string(items)?;

        self.conn.execute(
            "INSERT INTO shopping_list (family_id, created_at, items_json) VALUES (?1, ?2, ?3)",
            params![family_id, created_at, items_json],
        )?;

        let id = self.conn.last_insert_rowid();
        Ok(Some(ShoppingList {
            id,
            family_id,
            created_at,
            items: items.clone(),
        }))
    }

    /// Retrieve the most recent shopping list for a family
    pub fn latest_shopping_list(&self, family_id: i64) -> Result<Option<ShoppingList>> {
        let list = self
            .conn
            .query_row(
                r#"
                SELECT id, family_id, created_at, items_json FROM shopping_list
                WHERE family_id = ?1 ORDER BY created_at DESC, id DESC LIMIT 1
                "#,
                [family_id],
                |row| {
                    let items_json: String = row.get(3)?;
                    Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, String>(2)?, items_json))
                },
            )
            .optional()?;

        match list {
            Some((id, family_id, created_at, items_json)) => {
                let items: Value = serde_json::from_str(&items_json)?;
                Ok(Some(ShoppingList {
                    id,
                    family_id,
                    created_at,
                    items,
                }))
            }
            None => Ok(None),
        }
    }
}

/// Render an optional numeric field as CSV text (empty when absent)
fn opt_to_field<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Quote a free-text CSV field when it contains a comma, quote, or newline,
/// doubling embedded quotes
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
