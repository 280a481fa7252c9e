//! Patient record type
//!
//! A patient is identified by a unique numeric id assigned once by the
//! manager's allocator; everything else is opaque payload as far as the
//! index is concerned. Ordering and equality in the tree go through
//! `Keyed`, which compares by id alone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::btree::{Keyed, RecordKey};

/// Unique patient identifier
pub type PatientId = u64;

/// Patient gender as recorded at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        };
        write!(f, "{}", label)
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Ok(Gender::Male),
            "f" | "female" => Ok(Gender::Female),
            "o" | "other" => Ok(Gender::Other),
            other => Err(format!("unrecognized gender: {}", other)),
        }
    }
}

/// Registration details for a patient, everything except the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientDetails {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub phone: String,
    pub visit_date: String,
}

/// A single patient record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Unique id, immutable once assigned
    pub id: PatientId,
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub phone: String,
    /// Visit date, stored as entered (YYYY-MM-DD by convention)
    pub visit_date: String,
}

impl Patient {
    /// Create a patient record from an assigned id and its details
    pub fn new(id: PatientId, details: PatientDetails) -> Self {
        Self {
            id,
            name: details.name,
            age: details.age,
            gender: details.gender,
            phone: details.phone,
            visit_date: details.visit_date,
        }
    }
}

impl Keyed for Patient {
    fn key(&self) -> RecordKey {
        self.id
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {} | Name: {} | Age: {} | Gender: {} | Phone: {} | Visit: {}",
            self.id, self.name, self.age, self.gender, self.phone, self.visit_date
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_details(name: &str) -> PatientDetails {
        PatientDetails {
            name: name.to_string(),
            age: 34,
            gender: Gender::Female,
            phone: "0912345678".to_string(),
            visit_date: "2026-08-25".to_string(),
        }
    }

    #[test]
    fn test_key_is_id() {
        let patient = Patient::new(42, sample_details("Alice"));
        assert_eq!(patient.key(), 42);
    }

    #[test]
    fn test_gender_parsing() {
        assert_eq!("male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!(" F ".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("Other".parse::<Gender>().unwrap(), Gender::Other);
        assert!("??".parse::<Gender>().is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let patient = Patient::new(7, sample_details("Bob"));

        let json = serde_json::to_string(&patient).unwrap();
        let restored: Patient = serde_json::from_str(&json).unwrap();

        assert_eq!(patient, restored);
    }
}
