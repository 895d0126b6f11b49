//! Wire field-set format and the logical-value → field-number mapping.
//!
//! The remote service exchanges state as a flat set of numbered fields.
//! Outbound, the payload is ampersand-joined `fieldN=value` pairs in
//! ascending field order, terminated by a literal `status=MQTTPUBLISH`
//! sentinel. This format must be preserved bit-for-bit for compatibility
//! with the existing channel.
//!
//! Which field number carries which logical value is configuration, not
//! convention: every deployment variant differs mainly in this table.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Number of field slots the service supports.
pub const MAX_FIELDS: usize = 8;

/// Sentinel appended to every outbound payload.
const PUBLISH_SENTINEL: &str = "status=MQTTPUBLISH";

// ───────────────────────────────────────────────────────────────
// Field mapping
// ───────────────────────────────────────────────────────────────

/// Logical value → wire field number (1-based).
///
/// Defaults follow the canonical channel layout:
///
/// | Field | Value             |
/// |-------|-------------------|
/// | 1     | temperature (°C)  |
/// | 2     | temperature goal  |
/// | 3     | measured lux      |
/// | 4     | LED brightness    |
/// | 5     | lux goal          |
/// | 6     | pressure (hPa)    |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMapping {
    pub temperature: u8,
    pub temperature_goal: u8,
    pub lux: u8,
    pub brightness: u8,
    pub lux_goal: u8,
    pub pressure: u8,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            temperature: 1,
            temperature_goal: 2,
            lux: 3,
            brightness: 4,
            lux_goal: 5,
            pressure: 6,
        }
    }
}

impl FieldMapping {
    /// Every slot must be a distinct field number within the wire range.
    pub fn validate(&self) -> Result<()> {
        let slots = [
            self.temperature,
            self.temperature_goal,
            self.lux,
            self.brightness,
            self.lux_goal,
            self.pressure,
        ];
        for (i, n) in slots.iter().enumerate() {
            if *n == 0 || *n as usize > MAX_FIELDS {
                return Err(Error::Config("field number out of 1..=8"));
            }
            if slots[i + 1..].contains(n) {
                return Err(Error::Config("duplicate field number in mapping"));
            }
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Field set
// ───────────────────────────────────────────────────────────────

/// A sparse set of numbered field values.
///
/// Used in both directions: outbound before encoding, and inbound as the
/// parse result of a last-feed fetch. Absent slots stay `None`, which is
/// what gives the fetch path its partial-update semantics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSet {
    values: [Option<f64>; MAX_FIELDS],
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set field `number` (1-based). Out-of-range numbers are ignored;
    /// inbound documents may carry fields this device doesn't use.
    pub fn insert(&mut self, number: u8, value: f64) {
        if (1..=MAX_FIELDS as u8).contains(&number) {
            self.values[number as usize - 1] = Some(value);
        }
    }

    /// Get field `number` (1-based).
    pub fn get(&self, number: u8) -> Option<f64> {
        if (1..=MAX_FIELDS as u8).contains(&number) {
            self.values[number as usize - 1]
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Encode as the outbound wire payload.
    ///
    /// Fields appear in ascending field order, values as integers (the
    /// channel stores whole units), followed by the publish sentinel:
    ///
    /// ```text
    /// field1=21&field3=87&status=MQTTPUBLISH
    /// ```
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (i, slot) in self.values.iter().enumerate() {
            if let Some(v) = slot {
                out.push_str(&format!("field{}={}&", i + 1, *v as i64));
            }
        }
        out.push_str(PUBLISH_SENTINEL);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_matches_wire_format() {
        let mut set = FieldSet::new();
        set.insert(1, 21.0);
        set.insert(2, 25.0);
        set.insert(3, 100.0);
        set.insert(4, 50.0);
        set.insert(5, 100.0);
        set.insert(6, 1013.0);
        assert_eq!(
            set.encode(),
            "field1=21&field2=25&field3=100&field4=50&field5=100&field6=1013&status=MQTTPUBLISH"
        );
    }

    #[test]
    fn encode_skips_absent_fields_keeps_order() {
        let mut set = FieldSet::new();
        set.insert(5, 300.0);
        set.insert(1, 20.9); // truncated toward zero like the channel expects
        assert_eq!(set.encode(), "field1=20&field5=300&status=MQTTPUBLISH");
    }

    #[test]
    fn empty_set_still_carries_sentinel() {
        assert_eq!(FieldSet::new().encode(), "status=MQTTPUBLISH");
    }

    #[test]
    fn out_of_range_inserts_are_ignored() {
        let mut set = FieldSet::new();
        set.insert(0, 1.0);
        set.insert(9, 1.0);
        assert!(set.is_empty());
    }

    #[test]
    fn default_mapping_is_valid() {
        assert!(FieldMapping::default().validate().is_ok());
    }

    #[test]
    fn mapping_rejects_duplicates() {
        let mapping = FieldMapping {
            lux_goal: 3,
            ..FieldMapping::default()
        };
        assert!(mapping.validate().is_err());
    }

    #[test]
    fn mapping_rejects_out_of_range() {
        let mapping = FieldMapping {
            pressure: 9,
            ..FieldMapping::default()
        };
        assert!(mapping.validate().is_err());
    }
}
