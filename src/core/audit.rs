use crate::domain::events::HistoricalEvents;
use crate::domain::model::{
    AuditAnnotation, AuditedRecord, AuditedSeries, FareClass, FareRecord, FareSeries, YearMonth,
};

/// Restricted Economy must fall by more than this (percent, exclusive).
pub const ECONOMY_DROP_THRESHOLD_PCT: f64 = -10.0;

/// Business Class counts as stable within this band (percent, inclusive).
pub const BUSINESS_STABLE_BAND_PCT: f64 = 3.0;

/// The one month whose leakage event is reported as high priority. Fixed,
/// not derived from the size of the move.
pub const HIGH_PRIORITY_MONTH: YearMonth = match YearMonth::new(2011, 6) {
    Some(ym) => ym,
    None => panic!("invalid high priority month"),
};

/// Month-over-month change in percent. Undefined when either value is
/// absent or the prior value is zero.
pub fn mom_pct(previous: Option<f64>, current: Option<f64>) -> Option<f64> {
    match (previous, current) {
        (Some(prev), Some(cur)) if prev != 0.0 => Some((cur - prev) / prev * 100.0),
        _ => None,
    }
}

pub fn is_revenue_leakage(mom_business: Option<f64>, mom_economy: Option<f64>) -> bool {
    let economy_drop = mom_economy
        .map(|m| m < ECONOMY_DROP_THRESHOLD_PCT)
        .unwrap_or(false);
    let business_stable = mom_business
        .map(|m| (-BUSINESS_STABLE_BAND_PCT..=BUSINESS_STABLE_BAND_PCT).contains(&m))
        .unwrap_or(false);
    economy_drop && business_stable
}

/// Applies the leakage rule to a cleaned series. Holds the historical
/// table it annotates with; never mutates it.
#[derive(Debug, Clone)]
pub struct AuditEngine {
    events: HistoricalEvents,
}

impl AuditEngine {
    pub fn new(events: HistoricalEvents) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &HistoricalEvents {
        &self.events
    }

    fn annotate(&self, previous: Option<&FareRecord>, current: &FareRecord) -> AuditAnnotation {
        let historical_note = self.events.note_for(current.month).map(str::to_string);

        let Some(previous) = previous else {
            return AuditAnnotation {
                historical_note,
                ..AuditAnnotation::default()
            };
        };

        let change = |class: FareClass| mom_pct(previous.value(class), current.value(class));
        let mom_business = change(FareClass::BusinessClass);
        let mom_restricted_economy = change(FareClass::RestrictedEconomy);
        let mom_best_discount = change(FareClass::BestDiscount);

        let is_revenue_leakage = is_revenue_leakage(mom_business, mom_restricted_economy);
        let is_high_priority = is_revenue_leakage && current.month == HIGH_PRIORITY_MONTH;

        AuditAnnotation {
            mom_business,
            mom_restricted_economy,
            mom_best_discount,
            is_revenue_leakage,
            is_high_priority,
            historical_note,
        }
    }

    /// Each record is compared with the record before it in the series,
    /// which may be more than one calendar month earlier when rows were
    /// dropped during cleaning.
    pub fn run(&self, series: &FareSeries) -> AuditedSeries {
        let records = series.records();
        let audited: Vec<AuditedRecord> = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let previous = i.checked_sub(1).map(|p| &records[p]);
                AuditedRecord {
                    record: record.clone(),
                    annotation: self.annotate(previous, record),
                }
            })
            .collect();

        let leakage = audited.iter().filter(|r| r.annotation.is_revenue_leakage).count();
        tracing::info!(
            "Audited {} months: {} revenue leakage event(s)",
            audited.len(),
            leakage
        );
        for event in audited.iter().filter(|r| r.annotation.is_revenue_leakage) {
            tracing::debug!(
                "Leakage at {}: economy {:?}%, business {:?}%",
                event.record.month,
                event.annotation.mom_restricted_economy,
                event.annotation.mom_business
            );
        }

        AuditedSeries {
            records: audited,
            located: series.located_classes().to_vec(),
        }
    }
}

impl Default for AuditEngine {
    fn default() -> Self {
        Self::new(HistoricalEvents::builtin())
    }
}
