//! Personal name shared by patients and doctors

use serde::{Deserialize, Serialize};
use std::fmt;

/// First name, last name and an optional middle initial
///
/// Two names are the same person for duplicate detection only when all three
/// parts match exactly. A missing middle initial never matches a present one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonName {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_initial: Option<char>,
}

impl PersonName {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        middle_initial: Option<char>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            middle_initial,
        }
    }

    /// Display form: `First M. Last`, or `First Last` without an initial
    pub fn full_name(&self) -> String {
        match self.middle_initial {
            Some(mi) => format!("{} {}. {}", self.first_name, mi, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name_with_initial() {
        let name = PersonName::new("Ann", "Lee", Some('M'));
        assert_eq!(name.full_name(), "Ann M. Lee");
    }

    #[test]
    fn test_full_name_without_initial() {
        let name = PersonName::new("Bo", "Chen", None);
        assert_eq!(name.to_string(), "Bo Chen");
    }

    #[test]
    fn test_absent_initial_is_distinct() {
        let a = PersonName::new("Ann", "Lee", None);
        let b = PersonName::new("Ann", "Lee", Some('Q'));
        assert_ne!(a, b);
    }
}
