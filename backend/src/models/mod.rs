//! Domain models for the alumni directory.
//!
//! - [`Record`] - One person entry with the fixed 14-attribute schema
//! - [`Field`] - The schema attributes, addressable by name
//! - [`RecordSummary`] - Public card projection of a record
//! - [`FilterCriteria`] - User-entered search values
//! - [`RateWindow`] - Persisted counter for the daily message cap

use serde::{Deserialize, Serialize};

// =============================================================================
// Schema Fields
// =============================================================================

/// One attribute of the record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    /// Baccalaureate year / credential.
    Bac,
    /// Family name.
    Nom,
    /// Given name.
    Prenom,
    /// Landline.
    Tel,
    Email,
    /// Mobile phone.
    Cell,
    /// Date of birth.
    DateNaiss,
    /// Place of birth.
    LieuNaiss,
    Sexe,
    Ville,
    Pays,
    /// Miscellaneous column of the sheet.
    Pr,
    /// Field of study.
    Etudes,
    Profession,
}

impl Field {
    /// Every schema field, in sheet order.
    pub const ALL: [Field; 14] = [
        Field::Bac,
        Field::Nom,
        Field::Prenom,
        Field::Tel,
        Field::Email,
        Field::Cell,
        Field::DateNaiss,
        Field::LieuNaiss,
        Field::Sexe,
        Field::Ville,
        Field::Pays,
        Field::Pr,
        Field::Etudes,
        Field::Profession,
    ];
}

// =============================================================================
// Record
// =============================================================================

/// One alumnus entry.
///
/// Every attribute is always present; unset columns hold an empty string.
/// Records are built in bulk at ingestion and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Session-local identifier derived from the source row position.
    pub id: String,
    pub bac: String,
    pub nom: String,
    pub prenom: String,
    pub tel: String,
    pub email: String,
    pub cell: String,
    pub date_naiss: String,
    pub lieu_naiss: String,
    pub sexe: String,
    pub ville: String,
    pub pays: String,
    pub pr: String,
    pub etudes: String,
    pub profession: String,
}

impl Record {
    /// Create an empty record for the given source row.
    pub fn for_row(row_index: usize) -> Self {
        Self {
            id: format!("row-{}", row_index),
            ..Self::default()
        }
    }

    /// Read a schema attribute.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Bac => &self.bac,
            Field::Nom => &self.nom,
            Field::Prenom => &self.prenom,
            Field::Tel => &self.tel,
            Field::Email => &self.email,
            Field::Cell => &self.cell,
            Field::DateNaiss => &self.date_naiss,
            Field::LieuNaiss => &self.lieu_naiss,
            Field::Sexe => &self.sexe,
            Field::Ville => &self.ville,
            Field::Pays => &self.pays,
            Field::Pr => &self.pr,
            Field::Etudes => &self.etudes,
            Field::Profession => &self.profession,
        }
    }

    /// Overwrite a schema attribute.
    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Bac => &mut self.bac,
            Field::Nom => &mut self.nom,
            Field::Prenom => &mut self.prenom,
            Field::Tel => &mut self.tel,
            Field::Email => &mut self.email,
            Field::Cell => &mut self.cell,
            Field::DateNaiss => &mut self.date_naiss,
            Field::LieuNaiss => &mut self.lieu_naiss,
            Field::Sexe => &mut self.sexe,
            Field::Ville => &mut self.ville,
            Field::Pays => &mut self.pays,
            Field::Pr => &mut self.pr,
            Field::Etudes => &mut self.etudes,
            Field::Profession => &mut self.profession,
        };
        *slot = value;
    }

    /// Public card name: given name followed by the family-name initial.
    pub fn display_name(&self) -> String {
        match self.nom.chars().next() {
            Some(initial) => {
                let initial: String = initial.to_uppercase().collect();
                format!("{} {}.", self.prenom, initial)
            }
            None => self.prenom.clone(),
        }
    }

    /// Full name as sent to the relay ("NOM Prenom").
    pub fn relay_name(&self) -> String {
        format!("{} {}", self.nom, self.prenom)
    }

    /// Credential as sent to the relay, `N/A` when unknown.
    pub fn relay_bac(&self) -> &str {
        if self.bac.is_empty() {
            "N/A"
        } else {
            &self.bac
        }
    }

    /// Project to the public card shown in search results.
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            id: self.id.clone(),
            display_name: self.display_name(),
            bac: self.bac.clone(),
        }
    }
}

/// What a search result card reveals about a record.
///
/// Contact details never leave the engine; messages go through the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub id: String,
    pub display_name: String,
    pub bac: String,
}

// =============================================================================
// Filter Criteria
// =============================================================================

/// User-entered search values. Empty means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// General query over name and city.
    pub query: String,
    pub bac: String,
    pub pays: String,
    pub profession: String,
    pub etudes: String,
    pub lieu_naiss: String,
}

impl FilterCriteria {
    /// Number of non-empty criteria.
    pub fn active_count(&self) -> usize {
        [
            &self.query,
            &self.bac,
            &self.pays,
            &self.profession,
            &self.etudes,
            &self.lieu_naiss,
        ]
        .iter()
        .filter(|value| !value.is_empty())
        .count()
    }

    /// True when no criterion constrains the result.
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    /// Reset every criterion.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Per-attribute criteria paired with the field they constrain.
    pub fn field_criteria(&self) -> [(Field, &str); 5] {
        [
            (Field::Bac, self.bac.as_str()),
            (Field::Pays, self.pays.as_str()),
            (Field::Profession, self.profession.as_str()),
            (Field::Etudes, self.etudes.as_str()),
            (Field::LieuNaiss, self.lieu_naiss.as_str()),
        ]
    }
}

// =============================================================================
// Rate Window
// =============================================================================

/// Persisted daily message counter.
///
/// Serialized as `{"count": n, "startTime": epoch_millis}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateWindow {
    pub count: u32,
    /// Window start, milliseconds since the Unix epoch.
    #[serde(rename = "startTime")]
    pub start_time: i64,
}

impl RateWindow {
    /// A new, empty window starting at `now_ms`.
    pub fn fresh(now_ms: i64) -> Self {
        Self {
            count: 0,
            start_time: now_ms,
        }
    }

    /// Whether the window has run for at least `length_ms`.
    pub fn is_expired(&self, now_ms: i64, length_ms: i64) -> bool {
        now_ms.saturating_sub(self.start_time) >= length_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_cover_every_field() {
        let mut record = Record::for_row(3);
        for (i, field) in Field::ALL.iter().enumerate() {
            record.set(*field, format!("v{}", i));
        }
        for (i, field) in Field::ALL.iter().enumerate() {
            assert_eq!(record.get(*field), format!("v{}", i));
        }
        assert_eq!(record.id, "row-3");
    }

    #[test]
    fn test_display_name_uses_initial() {
        let record = Record {
            nom: "dupont".into(),
            prenom: "Jean".into(),
            ..Record::default()
        };
        assert_eq!(record.display_name(), "Jean D.");
        assert_eq!(record.relay_name(), "dupont Jean");
    }

    #[test]
    fn test_relay_bac_defaults_to_na() {
        let mut record = Record::default();
        assert_eq!(record.relay_bac(), "N/A");
        record.bac = "1999".into();
        assert_eq!(record.relay_bac(), "1999");
    }

    #[test]
    fn test_active_count_and_clear() {
        let mut criteria = FilterCriteria {
            query: "jean".into(),
            pays: "italie".into(),
            ..FilterCriteria::default()
        };
        assert_eq!(criteria.active_count(), 2);
        criteria.clear();
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_rate_window_wire_format() {
        let window: RateWindow = serde_json::from_str(r#"{"count":3,"startTime":1700000000000}"#).unwrap();
        assert_eq!(window.count, 3);
        assert_eq!(window.start_time, 1_700_000_000_000);

        let json = serde_json::to_string(&window).unwrap();
        assert!(json.contains("\"startTime\""));
    }

    #[test]
    fn test_rate_window_expiry_boundary() {
        let window = RateWindow::fresh(0);
        assert!(!window.is_expired(999, 1000));
        assert!(window.is_expired(1000, 1000));
    }

    #[test]
    fn test_expiry_with_extreme_start() {
        assert!(RateWindow { count: 3, start_time: i64::MIN }.is_expired(0, 1000));
        assert!(!RateWindow { count: 3, start_time: i64::MAX }.is_expired(0, 1000));
    }
}
