/*
 * Responsibility
 * - Persons の request/response DTO
 */
use serde::{Deserialize, Serialize};

use crate::repos::person_repo::PersonRow;

/// Adults are strictly older than this.
pub const ADULT_AGE: i32 = 18;

#[derive(Debug, Deserialize)]
pub struct PersonRequest {
    pub name: String,
    pub age: i32,
}

impl PersonRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.name.len() > 256 {
            return Err("name must be <= 256 chars");
        }
        if !(0..=150).contains(&self.age) {
            return Err("age must be between 0 and 150");
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct PersonResponse {
    pub id: i64,
    pub name: String,
    pub age: i32,
}

impl From<PersonRow> for PersonResponse {
    fn from(row: PersonRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            age: row.age,
        }
    }
}
