//! Trip picked for settlement, and the filters of the trip report screen.

use crate::resources::non_blank;
use crate::resources::trips::{PendingTrip, TripQuery};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripSelection {
    pub selected_trip_id: Option<i64>,
    pub selected_trip: Option<PendingTrip>,
    pub active_filters: Option<TripQuery>,
    pub show_results: bool,
}

impl TripSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, trip: PendingTrip) {
        self.selected_trip_id = Some(trip.id);
        self.selected_trip = Some(trip);
    }

    pub fn set_active_filters(&mut self, filters: Option<TripQuery>) {
        self.active_filters = filters;
    }

    pub fn set_show_results(&mut self, show: bool) {
        self.show_results = show;
    }

    /// The report query runs only once both bounds are filled in.
    pub fn report_query(&self) -> Option<&TripQuery> {
        self.active_filters.as_ref().filter(|f| {
            non_blank(f.start_date.as_deref()).is_some()
                && non_blank(f.end_date.as_deref()).is_some()
        })
    }

    pub fn reset_selection(&mut self) {
        self.selected_trip_id = None;
        self.selected_trip = None;
    }

    pub fn reset_report(&mut self) {
        self.active_filters = None;
        self.show_results = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip() -> PendingTrip {
        PendingTrip {
            id: 31,
            vehicle_id: 2,
            vehicle_tag: "L-12".into(),
            date: "2024-05-03 07:30:00".into(),
            driver: "Pedro".into(),
            user: "caja1".into(),
        }
    }

    #[test]
    fn resets_are_independent() {
        let mut sel = TripSelection::new();
        sel.select(trip());
        sel.set_active_filters(Some(TripQuery {
            vehicle_id: Some(2),
            start_date: Some("2024-05-01".into()),
            end_date: Some("2024-05-31".into()),
        }));
        sel.set_show_results(true);

        sel.reset_selection();
        assert_eq!(sel.selected_trip_id, None);
        assert!(sel.selected_trip.is_none());
        assert!(sel.show_results);
        assert!(sel.report_query().is_some());

        sel.reset_report();
        assert!(sel.active_filters.is_none());
        assert!(!sel.show_results);
    }

    #[test]
    fn report_query_needs_both_dates() {
        let mut sel = TripSelection::new();
        sel.set_active_filters(Some(TripQuery {
            start_date: Some("2024-05-01".into()),
            end_date: Some("".into()),
            ..Default::default()
        }));
        assert!(sel.report_query().is_none());
    }
}
