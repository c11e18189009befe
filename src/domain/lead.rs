use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use thiserror::Error;

use super::email_index::normalize_email;
use super::pitch_deck::PitchDeckDirectory;

pub const FORM_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const LEAD_DATE_FORMAT: &str = "%d/%m/%Y";

/// Width of the worksheet layout. The column order is contractual: the
/// destination sheet is read by humans and by other automations, so rows are
/// always rendered at exactly this width.
pub const LEAD_COLUMN_COUNT: usize = 19;

/// Immutable business constants for one sync run, built once at startup and
/// passed into the pipeline by reference.
pub struct LeadRules {
    /// Only leads submitted strictly after this instant are accepted.
    pub date_cutoff: NaiveDateTime,
    /// Lowercased full names that must never be inserted.
    pub excluded_names: HashSet<String>,
    pub pitch_decks: PitchDeckDirectory,
    pub lead_source: String,
    pub interest_tag: String,
}

impl LeadRules {
    pub fn standard() -> Self {
        Self {
            date_cutoff: NaiveDate::from_ymd_opt(2025, 8, 20)
                .expect("valid cutoff date")
                .and_hms_opt(23, 59, 59)
                .expect("valid cutoff time"),
            excluded_names: ["sibi abraham", "sujeet pandit"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
            pitch_decks: PitchDeckDirectory::standard(),
            lead_source: "B2B Website".to_owned(),
            interest_tag: "Exhibitors_opportunity".to_owned(),
        }
    }
}

/// Why a raw entry was skipped. Rejections are per-item and never fatal.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LeadRejection {
    #[error("entry is not a JSON object")]
    NotAnObject,
    #[error("form_value is not a JSON object")]
    MalformedFormValue,
    #[error("entry has no email")]
    MissingEmail,
    #[error("duplicate email: {email}")]
    DuplicateEmail { email: String },
    #[error("failed to parse date '{form_date}' for {email}")]
    UnparseableDate { form_date: String, email: String },
    #[error("old lead ({form_date}) for {email}")]
    StaleLead { form_date: String, email: String },
    #[error("excluded lead: {full_name}")]
    ExcludedName { full_name: String },
}

impl LeadRejection {
    /// Skips (duplicates, stale dates, excluded names) are routine; anything
    /// else means the entry itself was malformed.
    pub fn is_routine_skip(&self) -> bool {
        matches!(
            self,
            LeadRejection::DuplicateEmail { .. }
                | LeadRejection::StaleLead { .. }
                | LeadRejection::ExcludedName { .. }
        )
    }
}

/// One accepted lead: the normalized dedup key plus the rendered output row.
#[derive(Debug)]
pub struct AcceptedLead {
    pub email_key: String,
    pub row: LeadRow,
}

/// Output row for the worksheet, rendered to exactly [`LEAD_COLUMN_COUNT`]
/// cells. Columns without a named field here are manual-tracking columns that
/// start out empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadRow {
    pub lead_date: String,
    pub lead_source: String,
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub mobile: String,
    pub email: String,
    pub show: String,
    pub pitch_deck_url: String,
    pub interested_for: String,
}

impl LeadRow {
    pub fn into_cells(self) -> Vec<String> {
        let cells = vec![
            self.lead_date,           // Lead Date
            self.lead_source,         // Lead Source
            self.first_name,          // First Name
            self.last_name,           // Last Name
            self.company,             // Company Name
            self.mobile,              // Mobile
            self.email,               // Email
            self.show,                // Show
            String::new(),            // Next Followup
            String::new(),            // Email Count
            String::new(),            // Call Attempt
            String::new(),            // Linkedin Msg Count
            String::new(),            // WhatsApp Msg Count
            String::new(),            // Comments
            self.pitch_deck_url,      // Pitch Deck URL
            self.interested_for,      // Interested For
            String::new(),            // Follow-Up Count
            String::new(),            // Last Follow-Up Date
            String::new(),            // Reply Status
        ];
        debug_assert_eq!(cells.len(), LEAD_COLUMN_COUNT);
        cells
    }
}

fn text_field<'a>(map: &'a Map<String, Value>, key: &str) -> &'a str {
    map.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Splits a full name on the first space, like the lead form expects.
pub fn split_full_name(full_name: &str) -> (String, String) {
    match full_name.split_once(' ') {
        Some((first, last)) => (first.to_owned(), last.to_owned()),
        None => (full_name.to_owned(), String::new()),
    }
}

/// Runs one raw API entry through the full filter chain, short-circuiting on
/// the first failing check.
///
/// `known_emails` must hold the sheet history plus every lead accepted
/// earlier in the same batch; the caller owns inserting the returned
/// `email_key` after acceptance.
pub fn evaluate_entry(
    entry: &Value,
    known_emails: &HashSet<String>,
    rules: &LeadRules,
) -> Result<AcceptedLead, LeadRejection> {
    let item = entry.as_object().ok_or(LeadRejection::NotAnObject)?;

    // A missing form_value behaves like an empty one (and falls through to
    // the missing-email rejection); a present non-object form_value is
    // malformed in its own right.
    let empty = Map::new();
    let form_value = match item.get("form_value") {
        None => &empty,
        Some(value) => value
            .as_object()
            .ok_or(LeadRejection::MalformedFormValue)?,
    };

    let email_key = normalize_email(text_field(form_value, "your-email"));
    if email_key.is_empty() {
        return Err(LeadRejection::MissingEmail);
    }
    if known_emails.contains(&email_key) {
        return Err(LeadRejection::DuplicateEmail { email: email_key });
    }

    // An absent or empty form_date yields an empty output date and is never
    // rejected; a non-empty one must parse and land strictly after the
    // cutoff. The asymmetry is deliberate.
    let form_date_raw = text_field(item, "form_date");
    let mut lead_date = String::new();
    if !form_date_raw.is_empty() {
        match NaiveDateTime::parse_from_str(form_date_raw, FORM_DATE_FORMAT) {
            Ok(parsed) if parsed <= rules.date_cutoff => {
                return Err(LeadRejection::StaleLead {
                    form_date: form_date_raw.to_owned(),
                    email: email_key,
                });
            }
            Ok(parsed) => lead_date = parsed.format(LEAD_DATE_FORMAT).to_string(),
            Err(_) => {
                return Err(LeadRejection::UnparseableDate {
                    form_date: form_date_raw.to_owned(),
                    email: email_key,
                });
            }
        }
    }

    let full_name = text_field(form_value, "your-name").trim();
    let mut first_name = String::new();
    let mut last_name = String::new();
    if !full_name.is_empty() {
        if rules.excluded_names.contains(&full_name.to_lowercase()) {
            return Err(LeadRejection::ExcludedName {
                full_name: full_name.to_owned(),
            });
        }
        (first_name, last_name) = split_full_name(full_name);
    }

    let expo_name = text_field(item, "expo_label").trim();
    let pitch_deck_url = rules
        .pitch_decks
        .resolve(expo_name)
        .unwrap_or_default()
        .to_owned();

    Ok(AcceptedLead {
        email_key,
        row: LeadRow {
            lead_date,
            lead_source: rules.lead_source.clone(),
            first_name,
            last_name,
            company: text_field(form_value, "your-company").to_owned(),
            mobile: text_field(form_value, "phone-number").to_owned(),
            // The sheet keeps the email exactly as submitted; only the dedup
            // key is normalized.
            email: text_field(form_value, "your-email").to_owned(),
            show: expo_name.to_owned(),
            pitch_deck_url,
            interested_for: rules.interest_tag.clone(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(form_value: Value, form_date: &str, expo_label: &str) -> Value {
        json!({
            "form_value": form_value,
            "form_date": form_date,
            "expo_label": expo_label,
        })
    }

    fn accept(entry: &Value) -> AcceptedLead {
        evaluate_entry(entry, &HashSet::new(), &LeadRules::standard()).unwrap()
    }

    fn reject(entry: &Value) -> LeadRejection {
        evaluate_entry(entry, &HashSet::new(), &LeadRules::standard()).unwrap_err()
    }

    #[test]
    fn test_accepts_complete_entry() {
        let entry = entry(
            json!({
                "your-email": "Jane.Doe@Example.com",
                "your-name": "Jane Doe",
                "your-company": "Acme Ltd",
                "phone-number": "07123 456789",
            }),
            "2025-09-01 10:30:00",
            "London Expo 2025",
        );
        let accepted = accept(&entry);
        assert_eq!(accepted.email_key, "jane.doe@example.com");
        assert_eq!(accepted.row.lead_date, "01/09/2025");
        assert_eq!(accepted.row.first_name, "Jane");
        assert_eq!(accepted.row.last_name, "Doe");
        assert_eq!(accepted.row.company, "Acme Ltd");
        assert_eq!(accepted.row.mobile, "07123 456789");
        // Raw email text is preserved for the sheet.
        assert_eq!(accepted.row.email, "Jane.Doe@Example.com");
        assert_eq!(accepted.row.show, "London Expo 2025");
        assert_eq!(
            accepted.row.pitch_deck_url,
            "https://b2bgrowthexpo.com/london-exhibitor-pitch-deck/"
        );
        assert_eq!(accepted.row.interested_for, "Exhibitors_opportunity");
    }

    #[test]
    fn test_rejects_non_object_entry() {
        assert_eq!(reject(&json!("not-an-object")), LeadRejection::NotAnObject);
    }

    #[test]
    fn test_rejects_non_object_form_value() {
        let entry = json!({ "form_value": [1, 2, 3] });
        assert_eq!(reject(&entry), LeadRejection::MalformedFormValue);
    }

    #[test]
    fn test_missing_form_value_is_a_missing_email() {
        // No form_value at all falls through to the email check, it is not
        // treated as a malformed entry.
        let entry = json!({ "form_date": "2025-09-01 10:30:00" });
        assert_eq!(reject(&entry), LeadRejection::MissingEmail);
    }

    #[test]
    fn test_rejects_blank_email() {
        let entry = entry(json!({ "your-email": "   " }), "", "");
        assert_eq!(reject(&entry), LeadRejection::MissingEmail);
    }

    #[test]
    fn test_rejects_known_email_case_insensitively() {
        let entry = entry(json!({ "your-email": "Jane@Example.com" }), "", "");
        let known: HashSet<String> = ["jane@example.com".to_owned()].into();
        let rejection = evaluate_entry(&entry, &known, &LeadRules::standard()).unwrap_err();
        assert_eq!(
            rejection,
            LeadRejection::DuplicateEmail {
                email: "jane@example.com".to_owned()
            }
        );
    }

    #[test]
    fn test_rejects_date_on_cutoff_boundary() {
        // The cutoff itself is excluded; only strictly-after passes.
        let entry = entry(
            json!({ "your-email": "a@b.com" }),
            "2025-08-20 23:59:59",
            "",
        );
        assert!(matches!(reject(&entry), LeadRejection::StaleLead { .. }));
    }

    #[test]
    fn test_accepts_date_one_second_after_cutoff() {
        let entry = entry(
            json!({ "your-email": "a@b.com" }),
            "2025-08-21 00:00:00",
            "",
        );
        assert_eq!(accept(&entry).row.lead_date, "21/08/2025");
    }

    #[test]
    fn test_rejects_unparseable_date() {
        let entry = entry(json!({ "your-email": "a@b.com" }), "21-08-2025", "");
        assert_eq!(
            reject(&entry),
            LeadRejection::UnparseableDate {
                form_date: "21-08-2025".to_owned(),
                email: "a@b.com".to_owned()
            }
        );
    }

    #[test]
    fn test_empty_date_bypasses_the_cutoff() {
        // Missing and empty dates produce an empty output date; they are
        // never rejected on date grounds.
        let no_date = json!({ "form_value": { "your-email": "a@b.com" } });
        assert_eq!(accept(&no_date).row.lead_date, "");

        let empty_date = entry(json!({ "your-email": "a@b.com" }), "", "");
        assert_eq!(accept(&empty_date).row.lead_date, "");
    }

    #[test]
    fn test_rejects_excluded_name_regardless_of_case() {
        for name in ["Sibi Abraham", "SIBI ABRAHAM", "sibi abraham"] {
            let entry = entry(
                json!({ "your-email": "a@b.com", "your-name": name }),
                "",
                "",
            );
            assert_eq!(
                reject(&entry),
                LeadRejection::ExcludedName {
                    full_name: name.to_owned()
                }
            );
        }
    }

    #[test]
    fn test_exclusion_matches_full_name_only() {
        // Substrings and supersets of an excluded name are fine.
        let entry = entry(
            json!({ "your-email": "a@b.com", "your-name": "Sibi Abraham Jr" }),
            "",
            "",
        );
        let accepted = accept(&entry);
        assert_eq!(accepted.row.first_name, "Sibi");
        assert_eq!(accepted.row.last_name, "Abraham Jr");
    }

    #[test]
    fn test_absent_name_is_not_a_rejection() {
        let entry = entry(json!({ "your-email": "a@b.com" }), "", "");
        let accepted = accept(&entry);
        assert_eq!(accepted.row.first_name, "");
        assert_eq!(accepted.row.last_name, "");
    }

    #[test]
    fn test_unknown_expo_yields_empty_pitch_deck() {
        let entry = entry(
            json!({ "your-email": "a@b.com" }),
            "",
            "Antarctica Expo 2030",
        );
        let accepted = accept(&entry);
        assert_eq!(accepted.row.pitch_deck_url, "");
        assert_eq!(accepted.row.show, "Antarctica Expo 2030");
    }

    #[test]
    fn test_split_full_name() {
        assert_eq!(
            split_full_name("Jane Doe"),
            ("Jane".to_owned(), "Doe".to_owned())
        );
        assert_eq!(
            split_full_name("Jane Mary Doe"),
            ("Jane".to_owned(), "Mary Doe".to_owned())
        );
        assert_eq!(split_full_name("Jane"), ("Jane".to_owned(), String::new()));
    }

    #[test]
    fn test_row_is_always_nineteen_cells() {
        let entry = entry(json!({ "your-email": "a@b.com" }), "", "");
        let cells = accept(&entry).row.into_cells();
        assert_eq!(cells.len(), LEAD_COLUMN_COUNT);
    }

    #[test]
    fn test_row_cell_order() {
        let entry = entry(
            json!({
                "your-email": "a@b.com",
                "your-name": "Jane Doe",
                "your-company": "Acme",
                "phone-number": "0712",
            }),
            "2025-09-01 10:30:00",
            "Cardiff Growth Expo",
        );
        let cells = accept(&entry).row.into_cells();
        assert_eq!(cells[0], "01/09/2025");
        assert_eq!(cells[1], "B2B Website");
        assert_eq!(cells[2], "Jane");
        assert_eq!(cells[3], "Doe");
        assert_eq!(cells[4], "Acme");
        assert_eq!(cells[5], "0712");
        assert_eq!(cells[6], "a@b.com");
        assert_eq!(cells[7], "Cardiff Growth Expo");
        assert_eq!(
            cells[14],
            "https://b2bgrowthexpo.com/cardiff-exhibitor-pitch-deck/"
        );
        assert_eq!(cells[15], "Exhibitors_opportunity");
        for manual in [8, 9, 10, 11, 12, 13, 16, 17, 18] {
            assert_eq!(cells[manual], "", "cell {} should start empty", manual);
        }
    }

    #[test]
    fn test_rejection_severity_split() {
        assert!(LeadRejection::DuplicateEmail {
            email: "a@b.com".into()
        }
        .is_routine_skip());
        assert!(!LeadRejection::MissingEmail.is_routine_skip());
    }
}
