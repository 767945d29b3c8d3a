//! Static canton lookup.
//!
//! The 26 Swiss cantons keyed by their two-letter code. The table is
//! immutable for the lifetime of the process.

/// Canton code to display name, in no particular order.
pub const CANTONS: [(&str, &str); 26] = [
    ("TG", "Thurgau"),
    ("GR", "Graubünden"),
    ("LU", "Luzern"),
    ("BE", "Bern"),
    ("VS", "Valais"),
    ("BL", "Basel-Landschaft"),
    ("SO", "Solothurn"),
    ("VD", "Vaud"),
    ("SH", "Schaffhausen"),
    ("ZH", "Zürich"),
    ("AG", "Aargau"),
    ("UR", "Uri"),
    ("NE", "Neuchâtel"),
    ("TI", "Ticino"),
    ("SG", "St. Gallen"),
    ("GE", "Genève"),
    ("GL", "Glarus"),
    ("JU", "Jura"),
    ("ZG", "Zug"),
    ("OW", "Obwalden"),
    ("FR", "Fribourg"),
    ("SZ", "Schwyz"),
    ("AR", "Appenzell Ausserrhoden"),
    ("AI", "Appenzell Innerrhoden"),
    ("NW", "Nidwalden"),
    ("BS", "Basel-Stadt"),
];

/// Look up the display name for a canton code.
///
/// Matching is exact after trimming surrounding whitespace; codes in the
/// source data are upper-case.
pub fn canton_name(code: &str) -> Option<&'static str> {
    let code = code.trim();
    CANTONS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}
