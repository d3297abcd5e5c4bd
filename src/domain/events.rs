use crate::domain::model::YearMonth;
use std::collections::BTreeMap;

/// Built-in notes for months where the published indices moved for known
/// structural reasons.
const BITRE_EVENTS: &[(i32, u32, &str)] = &[
    (
        2011,
        6,
        "Structural Change: Virgin & Jetstar introduced simplified, lower-cost Flexi fare structures; Qantas followed with competitive price cuts.",
    ),
    (
        2012,
        1,
        "Market Shift: Virgin Australia expanded Business Class; Full Economy index rose as Premium Economy was removed.",
    ),
    (
        2015,
        3,
        "Methodology Change: Qantas discontinued Full Economy fares; index tracking for this category ceased.",
    ),
    (
        2017,
        11,
        "Product Redefinition: Jetstar changed refund rules to vouchers, removing its product from the BITRE Restricted Economy definition.",
    ),
    (
        2020,
        4,
        "COVID-19 Impact: Massive reduction in services; indices based on limited available routes.",
    ),
];

/// Immutable month → note lookup handed to the audit engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalEvents {
    notes: BTreeMap<YearMonth, String>,
}

impl HistoricalEvents {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The reference table shipped with the tool.
    pub fn builtin() -> Self {
        let notes = BITRE_EVENTS
            .iter()
            .filter_map(|(year, month, note)| {
                YearMonth::new(*year, *month).map(|ym| (ym, note.to_string()))
            })
            .collect();
        Self { notes }
    }

    /// Returns a new table with `extra` entries added; an entry for a month
    /// already present replaces its note.
    pub fn with_overrides<I>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = (YearMonth, String)>,
    {
        self.notes.extend(extra);
        self
    }

    pub fn note_for(&self, month: YearMonth) -> Option<&str> {
        self.notes.get(&month).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
