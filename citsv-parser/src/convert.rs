//! One feed conversion run.
//!
//! Applies the agency rules to a loaded [`Feed`]: route and service
//! filtering, canonical IDs, label cleanup and per-direction headsign merging.
//! Any rule failure aborts the whole conversion; there is no partial output.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::time::Instant;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::AgencyConfig;
use crate::domain::{RawRoute, RawStop, RawTrip, RouteId, StopId, StopIdEncoder};
use crate::error::ConvertError;
use crate::feed::Feed;
use crate::headsign::{HeadsignMerger, TripHeadsign};
use crate::labels::{LabelRules, normalize_label};
use crate::output::OutputTarget;
use crate::service::{ServiceIdFilter, useful_service_ids};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgencyInfo {
    pub color: String,
    pub route_type: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedRoute {
    pub id: u64,
    pub short_name: String,
    pub long_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedStop {
    pub id: u32,
    pub code: Option<String>,
    pub name: String,
}

/// The single headsign shown for one direction of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Direction {
    pub route_id: u64,
    pub direction_id: u8,
    pub headsign: String,
    pub trip_count: usize,
}

/// Result of a conversion, sorted by ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedFeed {
    pub agency: AgencyInfo,
    pub routes: Vec<ConvertedRoute>,
    pub stops: Vec<ConvertedStop>,
    pub directions: Vec<Direction>,
    pub service_ids: Vec<String>,
}

impl ConvertedFeed {
    fn empty(agency: AgencyInfo) -> Self {
        Self {
            agency,
            routes: Vec::new(),
            stops: Vec::new(),
            directions: Vec::new(),
            service_ids: Vec::new(),
        }
    }
}

/// Applies an [`AgencyConfig`] to feeds.
#[derive(Debug, Clone)]
pub struct Converter {
    config: AgencyConfig,
    stops: StopIdEncoder,
    merger: HeadsignMerger,
}

impl Converter {
    pub fn new(config: AgencyConfig) -> Self {
        Self {
            stops: config.stop_id_encoder(),
            merger: config.headsign_merger(),
            config,
        }
    }

    /// Convert a feed, keeping only service that runs on or after `today`.
    pub fn convert(&self, feed: &Feed, today: NaiveDate) -> Result<ConvertedFeed, ConvertError> {
        let agency = AgencyInfo {
            color: self.config.agency_color.clone(),
            route_type: self.config.route_type,
        };

        let routes = self.retained_routes(&feed.routes)?;
        let route_ids: HashMap<&str, RouteId> = routes
            .iter()
            .map(|(id, route)| (route.route_id.as_str(), *id))
            .collect();

        let trips: Vec<(RouteId, &RawTrip)> = feed
            .trips
            .iter()
            .filter_map(|trip| route_ids.get(trip.route_id.as_str()).map(|id| (*id, trip)))
            .collect();
        let orphans = feed.trips.len() - trips.len();
        if orphans > 0 {
            debug!(orphans, "dropped trips of excluded or unknown routes");
        }

        let useful = useful_service_ids(
            trips.iter().map(|(_, trip)| *trip),
            &feed.calendars,
            &feed.calendar_dates,
            today,
        )?;
        let filter = ServiceIdFilter::new(useful);
        if filter.is_everything_excluded() {
            warn!("no service runs on or after {today}, excluding everything");
            return Ok(ConvertedFeed::empty(agency));
        }

        let trips: Vec<(RouteId, &RawTrip)> = trips
            .into_iter()
            .filter(|(_, trip)| !filter.is_trip_excluded(trip))
            .collect();

        let served: HashSet<RouteId> = trips.iter().map(|(id, _)| *id).collect();
        let converted = ConvertedFeed {
            agency,
            routes: convert_routes(&routes, &served),
            stops: self.convert_stops(&feed.stops)?,
            directions: self.merge_directions(&trips)?,
            service_ids: kept_service_ids(feed, &filter),
        };
        info!(
            routes = converted.routes.len(),
            stops = converted.stops.len(),
            directions = converted.directions.len(),
            trips = trips.len(),
            "converted feed"
        );
        Ok(converted)
    }

    /// Routes of the configured type, with their canonical IDs, in feed order.
    ///
    /// Two distinct raw routes resolving to the same ID is fatal.
    fn retained_routes<'f>(
        &self,
        routes: &'f [RawRoute],
    ) -> Result<Vec<(RouteId, &'f RawRoute)>, ConvertError> {
        let mut retained = Vec::with_capacity(routes.len());
        let mut taken: HashMap<RouteId, &str> = HashMap::new();
        for route in routes {
            if let Some(route_type) = route.route_type
                && route_type != self.config.route_type
            {
                debug!(route_id = %route.route_id, route_type, "excluding route");
                continue;
            }
            let id = RouteId::resolve(route).map_err(|source| ConvertError::RouteId {
                record: format!("{route:?}"),
                source,
            })?;
            match taken.get(&id).copied() {
                None => {
                    taken.insert(id, route.route_id.as_str());
                    retained.push((id, route));
                }
                Some(first) if first == route.route_id => {
                    warn!(route_id = %route.route_id, "duplicate route record, keeping the first");
                }
                Some(first) => {
                    return Err(ConvertError::DuplicateRouteId {
                        id,
                        first: first.to_string(),
                        second: route.route_id.clone(),
                    });
                }
            }
        }
        Ok(retained)
    }

    fn convert_stops(&self, stops: &[RawStop]) -> Result<Vec<ConvertedStop>, ConvertError> {
        let mut converted: BTreeMap<StopId, (&str, ConvertedStop)> = BTreeMap::new();
        for stop in stops {
            let id = self.stops.encode(stop).map_err(|source| ConvertError::StopId {
                record: format!("{stop:?}"),
                source,
            })?;
            match converted.entry(id) {
                Entry::Vacant(entry) => {
                    entry.insert((
                        stop.stop_id.as_str(),
                        ConvertedStop {
                            id: id.value(),
                            code: self.stops.stop_code(stop).map(str::to_string),
                            name: normalize_label(&stop.name, &LabelRules::STOP_NAME),
                        },
                    ));
                }
                Entry::Occupied(entry) if entry.get().0 == stop.stop_id => {
                    warn!(stop_id = %stop.stop_id, "duplicate stop record, keeping the first");
                }
                Entry::Occupied(entry) => {
                    return Err(ConvertError::DuplicateStopId {
                        id,
                        first: entry.get().0.to_string(),
                        second: stop.stop_id.clone(),
                    });
                }
            }
        }
        Ok(converted.into_values().map(|(_, stop)| stop).collect())
    }

    /// One headsign per route and direction.
    fn merge_directions(
        &self,
        trips: &[(RouteId, &RawTrip)],
    ) -> Result<Vec<Direction>, ConvertError> {
        // Distinct cleaned headsigns with trip counts, in order of first appearance.
        let mut groups: BTreeMap<(RouteId, u8), Vec<(String, usize)>> = BTreeMap::new();
        for (route, trip) in trips {
            let headsign = normalize_label(&trip.headsign, &LabelRules::TRIP_HEADSIGN);
            let counts = groups.entry((*route, trip.direction())).or_default();
            match counts.iter_mut().find(|(h, _)| *h == headsign) {
                Some((_, n)) => *n += 1,
                None => counts.push((headsign, 1)),
            }
        }

        groups
            .into_iter()
            .map(|((route, direction), counts)| -> Result<Direction, ConvertError> {
                Ok(Direction {
                    route_id: route.value(),
                    direction_id: direction,
                    headsign: self.resolve_headsign(route, direction, &counts)?,
                    trip_count: counts.iter().map(|(_, n)| n).sum(),
                })
            })
            .collect()
    }

    fn resolve_headsign(
        &self,
        route: RouteId,
        direction: u8,
        counts: &[(String, usize)],
    ) -> Result<String, ConvertError> {
        let mut candidates = counts.iter().map(|(headsign, _)| headsign);
        let Some(first) = candidates.next() else {
            return Ok(String::new());
        };

        let mut target = TripHeadsign::new(first.clone(), u32::from(direction));
        for other in candidates {
            if *other == target.value {
                continue;
            }
            let other = TripHeadsign::new(other.clone(), target.id);
            match self.merger.merge(route, &target, &other) {
                Ok(Some(merged)) => {
                    trace!(
                        %route,
                        direction,
                        "merged {:?} & {:?} into {:?}",
                        target.value,
                        other.value,
                        merged.value
                    );
                    target = merged;
                }
                Ok(None) => return Ok(most_common(counts)),
                Err(source) => return Err(ConvertError::Merge { direction, source }),
            }
        }
        Ok(target.value)
    }
}

/// Headsign carried by the most trips; ties go to the smallest string.
fn most_common(counts: &[(String, usize)]) -> String {
    counts
        .iter()
        .max_by(|(a, na), (b, nb)| na.cmp(nb).then_with(|| b.cmp(a)))
        .map(|(headsign, _)| headsign.clone())
        .unwrap_or_default()
}

fn convert_routes(
    routes: &[(RouteId, &RawRoute)],
    served: &HashSet<RouteId>,
) -> Vec<ConvertedRoute> {
    let mut converted: BTreeMap<RouteId, ConvertedRoute> = BTreeMap::new();
    for (id, route) in routes {
        if !served.contains(id) {
            continue;
        }
        converted.insert(
            *id,
            ConvertedRoute {
                id: id.value(),
                short_name: route.route_short_name.trim().to_string(),
                long_name: normalize_label(&route.route_long_name, &LabelRules::ROUTE_LONG_NAME),
            },
        );
    }
    converted.into_values().collect()
}

fn kept_service_ids(feed: &Feed, filter: &ServiceIdFilter) -> Vec<String> {
    let from_calendars = feed
        .calendars
        .iter()
        .filter(|c| !filter.is_calendar_excluded(c))
        .map(|c| c.service_id.as_str());
    let from_dates = feed
        .calendar_dates
        .iter()
        .filter(|d| !filter.is_calendar_date_excluded(d))
        .map(|d| d.service_id.as_str());
    let ids: BTreeSet<&str> = from_calendars.chain(from_dates).collect();
    ids.into_iter().map(str::to_string).collect()
}

/// Load, convert and write one feed.
pub fn run(
    input: &Path,
    target: &OutputTarget,
    config: AgencyConfig,
    today: NaiveDate,
) -> Result<ConvertedFeed, ConvertError> {
    let start = Instant::now();
    info!("Generating CITSV bus data...");

    let feed = Feed::load(input)?;
    let converted = Converter::new(config).convert(&feed, today)?;
    target.write(&converted)?;

    info!("Generating CITSV bus data... DONE in {:.2?}", start.elapsed());
    Ok(converted)
}
