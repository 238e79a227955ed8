//! Field-level rules
//!
//! Pure checks on submitted values. Each helper records its own messages in
//! the shared [`ValidationErrors`] and returns the parsed value only when the
//! field passed, so every failing field is reported in one pass.
//!
//! Submitted strings are trimmed first; an empty string counts as missing.

use crate::domain::{PersonName, ValidationErrors};
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use std::str::FromStr;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 255;
pub const CONTACT_MAX: usize = 20;
pub const ADDRESS_MIN: usize = 10;
pub const ADDRESS_MAX: usize = 500;
pub const AGE_MAX: i64 = 150;
pub const SPECIALIZATION_MIN: usize = 2;
pub const SPECIALIZATION_MAX: usize = 255;
pub const PURPOSE_MIN: usize = 3;
pub const PURPOSE_MAX: usize = 255;

/// Smallest accepted payment: 0.01
pub const AMOUNT_MIN: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
/// Largest accepted payment: 999999.99
pub const AMOUNT_MAX: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIME_FORMAT: &str = "%H:%M";
/// Also accepted, so a stored time can be sent back unchanged
pub const TIME_FORMAT_SECONDS: &str = "%H:%M:%S";

/// Trimmed value, or `None` when absent or blank
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Text that must be present and within `[min, max]` characters
pub struct TextRule<'a> {
    pub field: &'a str,
    pub label: &'a str,
    pub min: usize,
    pub max: usize,
    pub required: &'a str,
}

impl TextRule<'_> {
    pub fn check(&self, errors: &mut ValidationErrors, value: Option<&str>) -> Option<String> {
        let Some(value) = present(value) else {
            errors.add(self.field, self.required);
            return None;
        };
        let len = value.chars().count();
        if len < self.min {
            errors.add(
                self.field,
                format!("{} must be at least {} characters.", self.label, self.min),
            );
            return None;
        }
        if len > self.max {
            errors.add(
                self.field,
                format!("{} cannot exceed {} characters.", self.label, self.max),
            );
            return None;
        }
        Some(value.to_string())
    }
}

/// Optional single alphabetic middle initial
///
/// The outer `Option` is `None` when the value was rejected.
pub fn middle_initial(errors: &mut ValidationErrors, value: Option<&str>) -> Option<Option<char>> {
    let Some(value) = present(value) else {
        return Some(None);
    };
    let mut chars = value.chars();
    let (Some(first), None) = (chars.next(), chars.next()) else {
        errors.add("middle_initial", "Middle initial can only be one character.");
        return None;
    };
    if !first.is_alphabetic() {
        errors.add("middle_initial", "Middle initial must be a letter.");
        return None;
    }
    Some(Some(first))
}

/// First name, last name and middle initial together
pub fn person_name(
    errors: &mut ValidationErrors,
    first_name: Option<&str>,
    last_name: Option<&str>,
    middle: Option<&str>,
) -> Option<PersonName> {
    let first = TextRule {
        field: "first_name",
        label: "First name",
        min: NAME_MIN,
        max: NAME_MAX,
        required: "First name is required.",
    }
    .check(errors, first_name);
    let last = TextRule {
        field: "last_name",
        label: "Last name",
        min: NAME_MIN,
        max: NAME_MAX,
        required: "Last name is required.",
    }
    .check(errors, last_name);
    let initial = middle_initial(errors, middle);

    Some(PersonName::new(first?, last?, initial?))
}

pub fn contact(errors: &mut ValidationErrors, value: Option<&str>) -> Option<String> {
    let Some(value) = present(value) else {
        errors.add("contact", "Contact number is required.");
        return None;
    };
    if value.chars().count() > CONTACT_MAX {
        errors.add(
            "contact",
            format!("Contact number cannot exceed {CONTACT_MAX} characters."),
        );
        return None;
    }
    Some(value.to_string())
}

pub fn age(errors: &mut ValidationErrors, value: Option<i64>) -> Option<u8> {
    let Some(value) = value else {
        errors.add("age", "Patient age is required.");
        return None;
    };
    if value < 0 {
        errors.add("age", "Age cannot be negative.");
        return None;
    }
    if value > AGE_MAX {
        errors.add("age", format!("Age cannot exceed {AGE_MAX} years."));
        return None;
    }
    u8::try_from(value).ok()
}

/// A required value drawn from a fixed set
pub fn required_choice<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    required: &str,
    invalid: &str,
) -> Option<T> {
    let Some(value) = present(value) else {
        errors.add(field, required);
        return None;
    };
    optional_choice(errors, field, Some(value), invalid).flatten()
}

/// An optional value drawn from a fixed set
///
/// The outer `Option` is `None` when the value was rejected.
pub fn optional_choice<T: FromStr>(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    invalid: &str,
) -> Option<Option<T>> {
    let Some(value) = present(value) else {
        return Some(None);
    };
    match T::from_str(value) {
        Ok(parsed) => Some(Some(parsed)),
        Err(_) => {
            errors.add(field, invalid);
            None
        }
    }
}

/// A positive record id submitted for a reference field
pub fn reference(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<i64>,
    required: &str,
) -> Option<i64> {
    match value {
        Some(id) if id > 0 => Some(id),
        _ => {
            errors.add(field, required);
            None
        }
    }
}

/// Appointment date: `YYYY-MM-DD`, not before `today`
pub fn appointment_date(
    errors: &mut ValidationErrors,
    value: Option<&str>,
    today: NaiveDate,
) -> Option<NaiveDate> {
    let Some(value) = present(value) else {
        errors.add("appointment_date", "Appointment date is required.");
        return None;
    };
    let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) else {
        errors.add("appointment_date", "Please provide a valid date.");
        return None;
    };
    if date < today {
        errors.add("appointment_date", "Appointment date cannot be in the past.");
        return None;
    }
    Some(date)
}

/// Appointment time: `HH:MM`, or `HH:MM:SS`
pub fn appointment_time(errors: &mut ValidationErrors, value: Option<&str>) -> Option<NaiveTime> {
    let Some(value) = present(value) else {
        errors.add("appointment_time", "Appointment time is required.");
        return None;
    };
    match NaiveTime::parse_from_str(value, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(value, TIME_FORMAT_SECONDS))
    {
        Ok(time) => Some(time),
        Err(_) => {
            errors.add(
                "appointment_time",
                "Please provide a valid time format (HH:MM).",
            );
            None
        }
    }
}

/// Purpose text, falling back to `default_purpose` when none was given
pub fn purpose(
    errors: &mut ValidationErrors,
    value: Option<&str>,
    default_purpose: &str,
) -> Option<String> {
    let value = present(value).unwrap_or(default_purpose);
    TextRule {
        field: "purpose",
        label: "Purpose",
        min: PURPOSE_MIN,
        max: PURPOSE_MAX,
        required: "Appointment purpose is required.",
    }
    .check(errors, Some(value))
}

/// Payment amount in `[0.01, 999999.99]` with at most two decimals
pub fn amount(errors: &mut ValidationErrors, value: Option<&str>) -> Option<Decimal> {
    let Some(value) = present(value) else {
        errors.add("amount", "Payment amount is required.");
        return None;
    };
    let Ok(amount) = Decimal::from_str(value) else {
        errors.add("amount", "Amount must be a valid number.");
        return None;
    };
    if amount < AMOUNT_MIN {
        errors.add("amount", "Amount must be greater than 0.");
        return None;
    }
    if amount > AMOUNT_MAX {
        errors.add("amount", "Amount cannot exceed 999,999.99.");
        return None;
    }
    if amount.normalize().scale() > 2 {
        errors.add("amount", "Amount cannot have more than two decimal places.");
        return None;
    }
    let mut amount = amount;
    amount.rescale(2);
    Some(amount)
}

/// Specialization labels submitted with a doctor
///
/// Blank entries are dropped; at least one must remain, each within length
/// bounds, with no repeats after trimming.
pub fn specialization_set(errors: &mut ValidationErrors, values: &[String]) -> Option<Vec<String>> {
    let labels: Vec<String> = values
        .iter()
        .filter_map(|v| present(Some(v.as_str())))
        .map(str::to_string)
        .collect();

    if labels.is_empty() {
        errors.add("specializations", "At least one specialization is required.");
        return None;
    }

    let mut ok = true;
    for label in &labels {
        let len = label.chars().count();
        if len < SPECIALIZATION_MIN {
            errors.add(
                "specializations",
                format!("Each specialization must be at least {SPECIALIZATION_MIN} characters."),
            );
            ok = false;
        } else if len > SPECIALIZATION_MAX {
            errors.add(
                "specializations",
                format!("Each specialization cannot exceed {SPECIALIZATION_MAX} characters."),
            );
            ok = false;
        }
    }

    let has_duplicates = labels
        .iter()
        .enumerate()
        .any(|(i, label)| labels[..i].contains(label));
    if has_duplicates {
        errors.add("specializations", "Duplicate specializations are not allowed.");
        ok = false;
    }

    ok.then_some(labels)
}

/// A single specialization label
pub fn specialization_label(errors: &mut ValidationErrors, value: Option<&str>) -> Option<String> {
    TextRule {
        field: "specialization",
        label: "Specialization",
        min: SPECIALIZATION_MIN,
        max: SPECIALIZATION_MAX,
        required: "Specialization is required.",
    }
    .check(errors, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_present_trims_and_drops_blank() {
        assert_eq!(present(Some("  Ann ")), Some("Ann"));
        assert_eq!(present(Some("   ")), None);
        assert_eq!(present(None), None);
    }

    #[test]
    fn test_person_name_reports_every_part() {
        let mut errors = ValidationErrors::new();
        let name = person_name(&mut errors, Some("A"), None, Some("7"));
        assert!(name.is_none());
        assert_eq!(
            errors.messages_for("first_name"),
            vec!["First name must be at least 2 characters."]
        );
        assert_eq!(errors.messages_for("last_name"), vec!["Last name is required."]);
        assert_eq!(
            errors.messages_for("middle_initial"),
            vec!["Middle initial must be a letter."]
        );
    }

    #[test]
    fn test_person_name_valid() {
        let mut errors = ValidationErrors::new();
        let name = person_name(&mut errors, Some(" Ann "), Some("Lee"), Some("k")).unwrap();
        assert!(errors.is_empty());
        assert_eq!(name, PersonName::new("Ann", "Lee", Some('k')));
    }

    #[test_case(Some("AB"), false ; "two characters")]
    #[test_case(Some("Q"), true ; "one letter")]
    #[test_case(None, true ; "absent")]
    #[test_case(Some(""), true ; "blank")]
    fn test_middle_initial(value: Option<&str>, accepted: bool) {
        let mut errors = ValidationErrors::new();
        assert_eq!(middle_initial(&mut errors, value).is_some(), accepted);
    }

    #[test_case(Some(-1), Some("Age cannot be negative.") ; "negative")]
    #[test_case(Some(151), Some("Age cannot exceed 150 years.") ; "too old")]
    #[test_case(None, Some("Patient age is required.") ; "missing")]
    #[test_case(Some(0), None ; "newborn")]
    #[test_case(Some(150), None ; "upper bound")]
    fn test_age(value: Option<i64>, message: Option<&str>) {
        let mut errors = ValidationErrors::new();
        let parsed = age(&mut errors, value);
        match message {
            Some(m) => {
                assert!(parsed.is_none());
                assert_eq!(errors.messages_for("age"), vec![m]);
            }
            None => assert!(parsed.is_some() && errors.is_empty()),
        }
    }

    #[test]
    fn test_contact_length() {
        let mut errors = ValidationErrors::new();
        assert!(contact(&mut errors, Some("012345678901234567890")).is_none());
        assert!(contact(&mut errors, Some("555-0100")).is_some());
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_appointment_date_rules() {
        let today = date("2030-06-15");
        let mut errors = ValidationErrors::new();

        assert_eq!(
            appointment_date(&mut errors, Some("2030-06-15"), today),
            Some(today)
        );
        assert!(appointment_date(&mut errors, Some("2030-06-14"), today).is_none());
        assert!(appointment_date(&mut errors, Some("15/06/2030"), today).is_none());
        assert_eq!(
            errors.messages_for("appointment_date"),
            vec![
                "Appointment date cannot be in the past.",
                "Please provide a valid date."
            ]
        );
    }

    #[test_case("09:00", true ; "morning")]
    #[test_case("23:59", true ; "late")]
    #[test_case("24:00", false ; "out of range")]
    #[test_case("9am", false ; "words")]
    #[test_case("09:00:30", true ; "seconds")]
    #[test_case("09:00:61", false ; "seconds out of range")]
    #[test_case("09:00:", false ; "dangling colon")]
    fn test_appointment_time(value: &str, accepted: bool) {
        let mut errors = ValidationErrors::new();
        assert_eq!(appointment_time(&mut errors, Some(value)).is_some(), accepted);
    }

    #[test]
    fn test_appointment_time_keeps_seconds() {
        let mut errors = ValidationErrors::new();
        let time = appointment_time(&mut errors, Some("10:30:15")).unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(10, 30, 15).unwrap());
        assert!(errors.is_empty());
    }

    #[test]
    fn test_purpose_defaults_when_blank() {
        let mut errors = ValidationErrors::new();
        assert_eq!(
            purpose(&mut errors, Some("  "), "General consultation").as_deref(),
            Some("General consultation")
        );
        assert!(purpose(&mut errors, Some("ok"), "General consultation").is_none());
        assert_eq!(
            errors.messages_for("purpose"),
            vec!["Purpose must be at least 3 characters."]
        );
    }

    #[test_case("50.00", true ; "plain")]
    #[test_case("0.01", true ; "minimum")]
    #[test_case("999999.99", true ; "maximum")]
    #[test_case("0", false ; "zero")]
    #[test_case("1000000", false ; "too large")]
    #[test_case("12.345", false ; "three decimals")]
    #[test_case("fifty", false ; "not a number")]
    fn test_amount(value: &str, accepted: bool) {
        let mut errors = ValidationErrors::new();
        assert_eq!(amount(&mut errors, Some(value)).is_some(), accepted);
    }

    #[test]
    fn test_amount_is_stored_with_two_decimals() {
        let mut errors = ValidationErrors::new();
        assert_eq!(amount(&mut errors, Some("12.5")).unwrap().to_string(), "12.50");
        assert_eq!(amount(&mut errors, Some("50")).unwrap().to_string(), "50.00");
    }

    #[test]
    fn test_specialization_set_requires_one() {
        let mut errors = ValidationErrors::new();
        assert!(specialization_set(&mut errors, &[]).is_none());
        assert!(specialization_set(&mut errors, &["  ".to_string()]).is_none());
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_specialization_set_rejects_duplicates_after_trim() {
        let mut errors = ValidationErrors::new();
        let labels = vec!["Cardiology".to_string(), " Cardiology ".to_string()];
        assert!(specialization_set(&mut errors, &labels).is_none());
        assert_eq!(
            errors.messages_for("specializations"),
            vec!["Duplicate specializations are not allowed."]
        );
    }

    #[test]
    fn test_specialization_set_drops_blanks() {
        let mut errors = ValidationErrors::new();
        let labels = vec!["Cardiology".to_string(), "".to_string(), "Oncology".to_string()];
        assert_eq!(
            specialization_set(&mut errors, &labels).unwrap(),
            vec!["Cardiology", "Oncology"]
        );
    }

    #[test]
    fn test_required_choice() {
        use crate::domain::Gender;

        let mut errors = ValidationErrors::new();
        let gender: Option<Gender> =
            required_choice(&mut errors, "gender", Some("Other"), "required", "invalid");
        assert_eq!(gender, Some(Gender::Other));

        let gender: Option<Gender> =
            required_choice(&mut errors, "gender", Some("Robot"), "required", "invalid");
        assert!(gender.is_none());
        assert_eq!(errors.messages_for("gender"), vec!["invalid"]);
    }
}
