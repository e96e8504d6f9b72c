//! RFC 4180 CSV encoding of owner records
//!
//! Quoting is triggered by a comma, a double quote, or a line feed. A bare
//! carriage return does not trigger quoting.

use std::borrow::Cow;

/// Header row written before any records
pub const OWNERS_CSV_HEADER: &str = "First Name,Last Name,Address,City,Telephone\n";

/// Owner-like record accepted by the encoder
///
/// Every field is optional; an absent field encodes as an empty cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OwnerRecord {
    /// Given name
    pub first_name: Option<String>,
    /// Family name
    pub last_name: Option<String>,
    /// Street address
    pub address: Option<String>,
    /// City
    pub city: Option<String>,
    /// Telephone number
    pub telephone: Option<String>,
}

impl OwnerRecord {
    fn fields(&self) -> [Option<&str>; 5] {
        [
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            self.address.as_deref(),
            self.city.as_deref(),
            self.telephone.as_deref(),
        ]
    }
}

impl From<crate::types::Owner> for OwnerRecord {
    fn from(owner: crate::types::Owner) -> Self {
        Self {
            first_name: Some(owner.first_name),
            last_name: Some(owner.last_name),
            address: owner.address,
            city: owner.city,
            telephone: owner.telephone,
        }
    }
}

/// Encode owners as CSV: the header row, then one row per record in input order
pub fn encode_owners(records: &[OwnerRecord]) -> String {
    let mut csv = String::from(OWNERS_CSV_HEADER);
    for record in records {
        for (i, field) in record.fields().into_iter().enumerate() {
            if i > 0 {
                csv.push(',');
            }
            csv.push_str(&escape_field(field));
        }
        csv.push('\n');
    }
    csv
}

/// Escape a single field
///
/// `None` becomes the empty string. Fields containing `,`, `"` or `\n` are
/// wrapped in double quotes with embedded quotes doubled; anything else is
/// borrowed unchanged.
pub fn escape_field(field: Option<&str>) -> Cow<'_, str> {
    let Some(field) = field else {
        return Cow::Borrowed("");
    };
    if field.contains([',', '"', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
