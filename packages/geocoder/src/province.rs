//! Two-digit province code to province name translation.

use std::collections::BTreeMap;

/// Name returned for any code the table does not know.
pub const FALLBACK_NAME: &str = "Indonesia";

/// Province codes as used by Kemendagri administrative codes.
const KNOWN_PROVINCES: &[(&str, &str)] = &[
    ("11", "Aceh"),
    ("12", "Sumatera Utara"),
    ("13", "Sumatera Barat"),
    ("14", "Riau"),
    ("15", "Jambi"),
    ("16", "Sumatera Selatan"),
    ("17", "Bengkulu"),
    ("18", "Lampung"),
    ("19", "Kepulauan Bangka Belitung"),
    ("21", "Kepulauan Riau"),
    ("31", "DKI Jakarta"),
    ("32", "Jawa Barat"),
    ("33", "Jawa Tengah"),
    ("34", "Daerah Istimewa Yogyakarta"),
    ("35", "Jawa Timur"),
    ("36", "Banten"),
    ("51", "Bali"),
    ("52", "Nusa Tenggara Barat"),
    ("53", "Nusa Tenggara Timur"),
    ("61", "Kalimantan Barat"),
    ("62", "Kalimantan Tengah"),
    ("63", "Kalimantan Selatan"),
    ("64", "Kalimantan Timur"),
    ("65", "Kalimantan Utara"),
    ("71", "Sulawesi Utara"),
    ("72", "Sulawesi Tengah"),
    ("73", "Sulawesi Selatan"),
    ("74", "Sulawesi Tenggara"),
    ("75", "Gorontalo"),
    ("76", "Sulawesi Barat"),
    ("81", "Maluku"),
    ("82", "Maluku Utara"),
    ("91", "Papua"),
    ("92", "Papua Barat"),
    ("93", "Papua Selatan"),
    ("94", "Papua Tengah"),
    ("95", "Papua Pegunungan"),
    ("96", "Papua Barat Daya"),
];

/// Immutable mapping from province code to canonical province name.
///
/// [`lookup`](Self::lookup) is total: unknown codes yield
/// [`FALLBACK_NAME`]. The name only sharpens remote queries, so an
/// unknown code degrades precision rather than failing a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvinceCodeTable {
    names: BTreeMap<String, String>,
}

impl ProvinceCodeTable {
    /// Returns the province name for `code`, or [`FALLBACK_NAME`].
    #[must_use]
    pub fn lookup(&self, code: &str) -> &str {
        self.names.get(code).map_or(FALLBACK_NAME, String::as_str)
    }

    /// Number of known codes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table has no known codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates `(code, name)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.names.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for ProvinceCodeTable {
    /// The 38 provinces in effect since the 2022 Papua split.
    fn default() -> Self {
        KNOWN_PROVINCES.iter().copied().collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProvinceCodeTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
