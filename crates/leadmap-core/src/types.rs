//! Shared record types for the leadmap pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Marker value the extraction scripts emit for fields that are present in
/// the page schema but have no value for a particular listing.
pub const NOT_AVAILABLE: &str = "N/A";

/// One extracted business lead.
///
/// `name` is the anchor field: a record without it is not a partial lead,
/// it is no lead at all (see [`Lead::from_value`]). The remaining fields are
/// optional; `None` means the listing did not expose that field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    /// Business name (anchor field, always present)
    pub name: String,
    /// Physical address
    pub address: Option<String>,
    /// Phone number
    pub phone: Option<String>,
    /// Website URL
    pub website: Option<String>,
}

impl Lead {
    /// Parse a lead from the JSON object produced by the extraction script.
    ///
    /// Returns `None` when the script signalled a missing anchor element
    /// (a JSON `null`) or when the `name` field is absent or empty; both
    /// invalidate the whole record rather than producing a partial one.
    /// Field values equal to the `"N/A"` marker map to `None`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let name = obj.get("name")?.as_str()?.trim();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            address: field(obj, "address"),
            phone: field(obj, "phone"),
            website: field(obj, "website"),
        })
    }

    /// Column order for tabular output.
    #[must_use]
    pub fn field_names() -> [&'static str; 4] {
        ["name", "address", "phone", "website"]
    }
}

impl fmt::Display for Lead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn field(obj: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    let text = obj.get(key)?.as_str()?.trim();
    if text.is_empty() || text == NOT_AVAILABLE {
        None
    } else {
        Some(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_complete() {
        let value = json!({
            "name": "Ace Mobile Repair",
            "address": "123 Main St, Springfield",
            "phone": "(555) 010-2030",
            "website": "acemobile.example.com",
        });

        let lead = Lead::from_value(&value).expect("complete record parses");
        assert_eq!(lead.name, "Ace Mobile Repair");
        assert_eq!(lead.address.as_deref(), Some("123 Main St, Springfield"));
        assert_eq!(lead.phone.as_deref(), Some("(555) 010-2030"));
        assert_eq!(lead.website.as_deref(), Some("acemobile.example.com"));
    }

    #[test]
    fn test_from_value_not_available_markers() {
        let value = json!({
            "name": "Corner Bakery",
            "address": "N/A",
            "phone": "N/A",
            "website": "N/A",
        });

        let lead = Lead::from_value(&value).expect("record with N/A fields parses");
        assert_eq!(lead.name, "Corner Bakery");
        assert!(lead.address.is_none());
        assert!(lead.phone.is_none());
        assert!(lead.website.is_none());
    }

    #[test]
    fn test_from_value_null_is_no_record() {
        assert!(Lead::from_value(&Value::Null).is_none());
    }

    #[test]
    fn test_from_value_missing_anchor_is_no_record() {
        let value = json!({ "address": "123 Main St" });
        assert!(Lead::from_value(&value).is_none());

        let value = json!({ "name": "   ", "address": "123 Main St" });
        assert!(Lead::from_value(&value).is_none());
    }

    #[test]
    fn test_from_value_trims_whitespace() {
        let value = json!({ "name": "  Trimmed Name  ", "phone": " 555 " });
        let lead = Lead::from_value(&value).expect("parses");
        assert_eq!(lead.name, "Trimmed Name");
        assert_eq!(lead.phone.as_deref(), Some("555"));
    }

    #[test]
    fn test_serialization_round_trip() {
        let lead = Lead {
            name: "Ace".to_string(),
            address: Some("123 Main St".to_string()),
            phone: None,
            website: None,
        };

        let json = serde_json::to_string(&lead).expect("serialize lead");
        let back: Lead = serde_json::from_str(&json).expect("deserialize lead");
        assert_eq!(back, lead);
    }
}
