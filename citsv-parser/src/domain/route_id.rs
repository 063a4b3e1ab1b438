//! Canonical route ID resolution.

use std::fmt;

use super::error::RouteIdError;
use super::raw::RawRoute;
use super::stop_id::is_digits_only;

/// A canonical numeric route ID.
///
/// # Examples
///
/// ```
/// use citsv_parser::domain::{RawRoute, RouteId};
///
/// let route = RawRoute::new("370", "370", "Ste-Julie - St-Amable");
/// assert_eq!(RouteId::resolve(&route).unwrap().value(), 370);
///
/// // Non-numeric raw ids fall back to the short name
/// let route = RawRoute::new("CITSV-700", "700", "Sorel-Tracy");
/// assert_eq!(RouteId::resolve(&route).unwrap().value(), 700);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(u64);

impl RouteId {
    pub const fn new(value: u64) -> Self {
        RouteId(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Resolve the canonical ID of a raw route.
    ///
    /// An all-digit raw route id is the ID. Anything else uses the route's
    /// short name, which must then parse as an integer.
    pub fn resolve(route: &RawRoute) -> Result<Self, RouteIdError> {
        if is_digits_only(&route.route_id) {
            return route
                .route_id
                .parse()
                .map(RouteId)
                .map_err(|source| RouteIdError::InvalidId {
                    route_id: route.route_id.clone(),
                    source,
                });
        }
        route
            .route_short_name
            .trim()
            .parse()
            .map(RouteId)
            .map_err(|source| RouteIdError::InvalidShortName {
                route_id: route.route_id.clone(),
                short_name: route.route_short_name.clone(),
                source,
            })
    }
}

impl fmt::Debug for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RouteId({})", self.0)
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_raw_id() {
        let route = RawRoute::new("370", "ignored", "");
        assert_eq!(RouteId::resolve(&route).unwrap(), RouteId::new(370));
    }

    #[test]
    fn non_numeric_raw_id_uses_short_name() {
        let route = RawRoute::new("CIT_720", "720", "");
        assert_eq!(RouteId::resolve(&route).unwrap(), RouteId::new(720));
    }

    #[test]
    fn empty_raw_id_uses_short_name() {
        let route = RawRoute::new("", "731", "");
        assert_eq!(RouteId::resolve(&route).unwrap(), RouteId::new(731));
    }

    #[test]
    fn non_numeric_short_name_is_an_error() {
        let route = RawRoute::new("CIT_T", "T", "");
        assert!(matches!(
            RouteId::resolve(&route),
            Err(RouteIdError::InvalidShortName { .. })
        ));
    }

    #[test]
    fn oversized_raw_id_is_an_error() {
        let route = RawRoute::new("99999999999999999999999", "1", "");
        assert!(matches!(
            RouteId::resolve(&route),
            Err(RouteIdError::InvalidId { .. })
        ));
    }

    #[test]
    fn display_and_debug() {
        let id = RouteId::new(700);
        assert_eq!(id.to_string(), "700");
        assert_eq!(format!("{:?}", id), "RouteId(700)");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Numeric raw ids resolve to themselves regardless of the short name
        #[test]
        fn numeric_identity(id in any::<u64>(), short in ".*") {
            let route = RawRoute::new(&id.to_string(), &short, "");
            prop_assert_eq!(RouteId::resolve(&route).unwrap().value(), id);
        }

        /// Non-numeric raw ids resolve to the short name
        #[test]
        fn short_name_fallback(raw in "[A-Z_]{1,8}", short in any::<u32>()) {
            let route = RawRoute::new(&raw, &short.to_string(), "");
            prop_assert_eq!(RouteId::resolve(&route).unwrap().value(), u64::from(short));
        }
    }
}
