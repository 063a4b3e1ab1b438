//! Service-id based exclusion of calendars and trips.
//!
//! The set of useful service ids is computed once, before any filtering, and
//! only read afterwards.

use std::collections::HashSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{RawCalendar, RawCalendarDate, RawTrip};

/// GTFS service date format.
const DATE_FORMAT: &str = "%Y%m%d";

/// Exclusion predicates over a precomputed set of useful service ids.
///
/// Without a set nothing is excluded. With an empty set everything is.
#[derive(Debug, Clone, Default)]
pub struct ServiceIdFilter {
    useful: Option<HashSet<String>>,
}

impl ServiceIdFilter {
    /// A filter that excludes nothing.
    pub fn unfiltered() -> Self {
        Self::default()
    }

    /// A filter that keeps only the given service ids.
    pub fn new(useful: HashSet<String>) -> Self {
        Self {
            useful: Some(useful),
        }
    }

    fn is_excluded(&self, service_id: &str) -> bool {
        self.useful
            .as_ref()
            .is_some_and(|useful| !useful.contains(service_id))
    }

    pub fn is_calendar_excluded(&self, calendar: &RawCalendar) -> bool {
        self.is_excluded(&calendar.service_id)
    }

    pub fn is_calendar_date_excluded(&self, calendar_date: &RawCalendarDate) -> bool {
        self.is_excluded(&calendar_date.service_id)
    }

    pub fn is_trip_excluded(&self, trip: &RawTrip) -> bool {
        self.is_excluded(&trip.service_id)
    }

    /// True exactly when a set was computed and it is empty.
    pub fn is_everything_excluded(&self) -> bool {
        self.useful.as_ref().is_some_and(HashSet::is_empty)
    }
}

/// A calendar or calendar date that is not a `YYYYMMDD` date.
#[derive(Debug, thiserror::Error)]
#[error("invalid date {date:?} for service {service_id:?}: {source}")]
pub struct ServiceDateError {
    pub service_id: String,
    pub date: String,
    pub source: chrono::ParseError,
}

fn parse_date(service_id: &str, date: &str) -> Result<NaiveDate, ServiceDateError> {
    NaiveDate::parse_from_str(date, DATE_FORMAT).map_err(|source| ServiceDateError {
        service_id: service_id.to_string(),
        date: date.to_string(),
        source,
    })
}

/// Service ids referenced by at least one of `trips` that still run on or
/// after `today`.
///
/// A service still runs if its calendar ends on or after `today`, or if a
/// calendar date adds it on or after `today`. Any malformed date fails the
/// whole computation.
pub fn useful_service_ids<'a>(
    trips: impl IntoIterator<Item = &'a RawTrip>,
    calendars: &[RawCalendar],
    calendar_dates: &[RawCalendarDate],
    today: NaiveDate,
) -> Result<HashSet<String>, ServiceDateError> {
    let referenced: HashSet<&str> = trips.into_iter().map(|t| t.service_id.as_str()).collect();

    let mut active: HashSet<&str> = HashSet::new();
    for calendar in calendars {
        parse_date(&calendar.service_id, &calendar.start_date)?;
        let end = parse_date(&calendar.service_id, &calendar.end_date)?;
        if end >= today {
            active.insert(&calendar.service_id);
        }
    }
    for calendar_date in calendar_dates {
        let date = parse_date(&calendar_date.service_id, &calendar_date.date)?;
        if calendar_date.is_addition() && date >= today {
            active.insert(&calendar_date.service_id);
        }
    }

    let useful: HashSet<String> = referenced
        .intersection(&active)
        .map(|s| s.to_string())
        .collect();
    debug!(
        referenced = referenced.len(),
        active = active.len(),
        useful = useful.len(),
        "computed useful service ids"
    );
    Ok(useful)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trip(service_id: &str) -> RawTrip {
        RawTrip {
            trip_id: format!("T-{service_id}"),
            route_id: "700".into(),
            headsign: "Longueuil".into(),
            direction_id: Some(0),
            service_id: service_id.into(),
        }
    }

    fn calendar(service_id: &str, start: &str, end: &str) -> RawCalendar {
        RawCalendar {
            service_id: service_id.into(),
            start_date: start.into(),
            end_date: end.into(),
        }
    }

    fn calendar_date(service_id: &str, date: &str, exception_type: u8) -> RawCalendarDate {
        RawCalendarDate {
            service_id: service_id.into(),
            date: date.into(),
            exception_type,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn unfiltered_excludes_nothing() {
        let filter = ServiceIdFilter::unfiltered();
        assert!(!filter.is_trip_excluded(&trip("S1")));
        assert!(!filter.is_calendar_excluded(&calendar("S1", "20240101", "20241231")));
        assert!(!filter.is_calendar_date_excluded(&calendar_date("S1", "20240101", 1)));
        assert!(!filter.is_everything_excluded());
    }

    #[test]
    fn keeps_only_useful_ids() {
        let filter = ServiceIdFilter::new(HashSet::from(["S1".to_string()]));
        assert!(!filter.is_trip_excluded(&trip("S1")));
        assert!(filter.is_trip_excluded(&trip("S2")));
        assert!(!filter.is_calendar_excluded(&calendar("S1", "20240101", "20241231")));
        assert!(filter.is_calendar_excluded(&calendar("S2", "20240101", "20241231")));
        assert!(!filter.is_calendar_date_excluded(&calendar_date("S1", "20240101", 2)));
        assert!(filter.is_calendar_date_excluded(&calendar_date("S2", "20240101", 1)));
        assert!(!filter.is_everything_excluded());
    }

    #[test]
    fn empty_set_excludes_everything() {
        let filter = ServiceIdFilter::new(HashSet::new());
        assert!(filter.is_everything_excluded());
        assert!(filter.is_trip_excluded(&trip("S1")));
        assert!(filter.is_calendar_excluded(&calendar("S1", "20240101", "20241231")));
    }

    #[test]
    fn useful_requires_reference_and_future_service() {
        let trips = [trip("CURRENT"), trip("EXPIRED"), trip("ADDED")];
        let calendars = [
            calendar("CURRENT", "20240101", "20240630"),
            calendar("EXPIRED", "20230101", "20231231"),
            calendar("UNUSED", "20240101", "20240630"),
        ];
        let dates = [
            calendar_date("ADDED", "20240401", 1),
            calendar_date("EXPIRED", "20240401", 2),
        ];

        let useful = useful_service_ids(&trips, &calendars, &dates, today()).unwrap();
        assert_eq!(
            useful,
            HashSet::from(["CURRENT".to_string(), "ADDED".to_string()])
        );
    }

    #[test]
    fn service_ending_today_is_useful() {
        let trips = [trip("S1")];
        let calendars = [calendar("S1", "20240101", "20240315")];
        let useful = useful_service_ids(&trips, &calendars, &[], today()).unwrap();
        assert!(useful.contains("S1"));
    }

    #[test]
    fn past_additions_are_not_useful() {
        let trips = [trip("S1")];
        let dates = [calendar_date("S1", "20240314", 1)];
        assert!(useful_service_ids(&trips, &[], &dates, today()).unwrap().is_empty());
    }

    #[test]
    fn bad_calendar_date_is_an_error() {
        let trips = [trip("S1")];
        let calendars = [calendar("S1", "20240101", "2024-12-31")];
        let err = useful_service_ids(&trips, &calendars, &[], today()).unwrap_err();
        assert_eq!(err.service_id, "S1");
        assert_eq!(err.date, "2024-12-31");
    }

    #[test]
    fn bad_exception_date_is_an_error() {
        let trips = [trip("S1")];
        let calendars = [calendar("S1", "20240101", "20241231")];
        // removals are checked too, even though they never make a service useful
        let dates = [calendar_date("S2", "not a date", 2)];
        let err = useful_service_ids(&trips, &calendars, &dates, today()).unwrap_err();
        assert_eq!(err.service_id, "S2");
        assert!(err.to_string().contains("not a date"));
    }

    #[test]
    fn nothing_useful_means_everything_excluded() {
        let useful = useful_service_ids(&[trip("S1")], &[], &[], today()).unwrap();
        assert!(ServiceIdFilter::new(useful).is_everything_excluded());
    }
}
