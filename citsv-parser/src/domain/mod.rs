//! Domain types for the CITSV feed customisation.
//!
//! Raw records are owned by the feed reader and only ever borrowed here.
//! The identifier types are derived from them and valid by construction.

mod error;
mod raw;
mod route_id;
mod stop_id;

pub use error::{RouteIdError, StopIdError};
pub use raw::{RawCalendar, RawCalendarDate, RawRoute, RawStop, RawTrip};
pub use route_id::RouteId;
pub use stop_id::{StopId, StopIdEncoder, SuffixTable, ZoneTable};
