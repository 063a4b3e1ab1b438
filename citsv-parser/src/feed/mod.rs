//! GTFS feed reading.
//!
//! Loads the five tables the agency rules need from either an unpacked feed
//! directory or a `.zip` archive. Rows are deserialized with `csv` + `serde`;
//! unknown columns are ignored.

mod error;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::debug;
use zip::ZipArchive;

use crate::domain::{RawCalendar, RawCalendarDate, RawRoute, RawStop, RawTrip};

pub use error::FeedError;

const ROUTES: &str = "routes.txt";
const STOPS: &str = "stops.txt";
const TRIPS: &str = "trips.txt";
const CALENDAR: &str = "calendar.txt";
const CALENDAR_DATES: &str = "calendar_dates.txt";

/// The raw records of one feed.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    pub routes: Vec<RawRoute>,
    pub stops: Vec<RawStop>,
    pub trips: Vec<RawTrip>,
    pub calendars: Vec<RawCalendar>,
    pub calendar_dates: Vec<RawCalendarDate>,
}

impl Feed {
    /// Load a feed from a directory or a zip archive.
    pub fn load(path: &Path) -> Result<Self, FeedError> {
        let mut source = FeedSource::open(path)?;
        let feed = Feed {
            routes: source.read_required(ROUTES)?,
            stops: source.read_required(STOPS)?,
            trips: source.read_required(TRIPS)?,
            calendars: source.read_optional(CALENDAR)?,
            calendar_dates: source.read_optional(CALENDAR_DATES)?,
        };
        debug!(
            routes = feed.routes.len(),
            stops = feed.stops.len(),
            trips = feed.trips.len(),
            calendars = feed.calendars.len(),
            calendar_dates = feed.calendar_dates.len(),
            "loaded feed from {}",
            path.display()
        );
        Ok(feed)
    }
}

enum FeedSource {
    Dir(PathBuf),
    Zip {
        path: PathBuf,
        archive: ZipArchive<File>,
    },
}

impl FeedSource {
    fn open(path: &Path) -> Result<Self, FeedError> {
        let io_error = |source| FeedError::Io {
            path: path.to_path_buf(),
            source,
        };
        let metadata = std::fs::metadata(path).map_err(io_error)?;
        if metadata.is_dir() {
            return Ok(FeedSource::Dir(path.to_path_buf()));
        }

        let file = File::open(path).map_err(io_error)?;
        let archive = ZipArchive::new(file).map_err(|source| FeedError::Zip {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(FeedSource::Zip {
            path: path.to_path_buf(),
            archive,
        })
    }

    fn read_required<T: DeserializeOwned>(
        &mut self,
        file: &'static str,
    ) -> Result<Vec<T>, FeedError> {
        self.read(file)?.ok_or(FeedError::MissingFile(file))
    }

    fn read_optional<T: DeserializeOwned>(
        &mut self,
        file: &'static str,
    ) -> Result<Vec<T>, FeedError> {
        Ok(self.read(file)?.unwrap_or_default())
    }

    /// Returns `None` when the file is not part of the feed.
    fn read<T: DeserializeOwned>(
        &mut self,
        file: &'static str,
    ) -> Result<Option<Vec<T>>, FeedError> {
        match self {
            FeedSource::Dir(dir) => {
                let path = dir.join(file);
                if !path.is_file() {
                    return Ok(None);
                }
                let reader = File::open(&path).map_err(|source| FeedError::Io { path, source })?;
                read_records(reader, file).map(Some)
            }
            FeedSource::Zip { path, archive } => match archive.by_name(file) {
                Ok(entry) => read_records(entry, file).map(Some),
                Err(zip::result::ZipError::FileNotFound) => Ok(None),
                Err(source) => Err(FeedError::Zip {
                    path: path.clone(),
                    source,
                }),
            },
        }
    }
}

fn read_records<T: DeserializeOwned, R: Read>(
    reader: R,
    file: &'static str,
) -> Result<Vec<T>, FeedError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| FeedError::Csv { file, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    const ROUTES_TXT: &str = "route_id,agency_id,route_short_name,route_long_name,route_type\n\
        700,CITSV,700,Sorel-Tracy - Longueuil,3\n\
        CIT_720,CITSV,720,Varennes - Longueuil,3\n";
    const STOPS_TXT: &str = "stop_id,stop_code,stop_name,stop_lat,stop_lon\n\
        BOU29C,0,Face au Terminus,45.6,-73.4\n\
        LON6A,77060,Terminus Longueuil,45.5,-73.5\n";
    const TRIPS_TXT: &str = "route_id,service_id,trip_id,trip_headsign,direction_id\n\
        700,S1,T1,Direction Sorel-Tracy,0\n\
        CIT_720,S1,T2,Longueuil,\n";
    const CALENDAR_TXT: &str = "service_id,monday,tuesday,wednesday,thursday,\
        friday,saturday,sunday,start_date,end_date\n\
        S1,1,1,1,1,1,0,0,20240101,20241231\n";

    fn write_dir(dir: &Path, files: &[(&str, &str)]) {
        for (name, contents) in files {
            std::fs::write(dir.join(name), contents).unwrap();
        }
    }

    #[test]
    fn load_directory() {
        let dir = tempdir().unwrap();
        write_dir(
            dir.path(),
            &[
                (ROUTES, ROUTES_TXT),
                (STOPS, STOPS_TXT),
                (TRIPS, TRIPS_TXT),
                (CALENDAR, CALENDAR_TXT),
            ],
        );

        let feed = Feed::load(dir.path()).unwrap();
        assert_eq!(feed.routes.len(), 2);
        assert_eq!(feed.routes[1].route_id, "CIT_720");
        assert_eq!(feed.routes[1].route_type, Some(3));
        assert_eq!(feed.stops[0].stop_code.as_deref(), Some("0"));
        assert_eq!(feed.stops[0].name, "Face au Terminus");
        assert_eq!(feed.trips[0].headsign, "Direction Sorel-Tracy");
        assert_eq!(feed.trips[0].direction_id, Some(0));
        assert_eq!(feed.trips[1].direction_id, None);
        assert_eq!(feed.calendars[0].end_date, "20241231");
        assert!(feed.calendar_dates.is_empty());
    }

    #[test]
    fn load_zip() {
        let dir = tempdir().unwrap();
        let zip_path = dir.path().join("gtfs.zip");
        let mut writer = zip::ZipWriter::new(File::create(&zip_path).unwrap());
        for (name, contents) in [(ROUTES, ROUTES_TXT), (STOPS, STOPS_TXT), (TRIPS, TRIPS_TXT)] {
            writer
                .start_file(name, zip::write::SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();

        let feed = Feed::load(&zip_path).unwrap();
        assert_eq!(feed.routes.len(), 2);
        assert_eq!(feed.stops.len(), 2);
        assert_eq!(feed.trips.len(), 2);
        assert!(feed.calendars.is_empty());
    }

    #[test]
    fn missing_required_file() {
        let dir = tempdir().unwrap();
        write_dir(dir.path(), &[(ROUTES, ROUTES_TXT), (TRIPS, TRIPS_TXT)]);

        let err = Feed::load(dir.path()).unwrap_err();
        assert!(matches!(err, FeedError::MissingFile("stops.txt")));
    }

    #[test]
    fn missing_feed_path() {
        let err = Feed::load(Path::new("/nonexistent/gtfs.zip")).unwrap_err();
        assert!(matches!(err, FeedError::Io { .. }));
    }

    #[test]
    fn not_a_zip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gtfs.zip");
        std::fs::write(&path, "definitely not a zip").unwrap();

        let err = Feed::load(&path).unwrap_err();
        assert!(matches!(err, FeedError::Zip { .. }));
    }

    #[test]
    fn bad_record() {
        let dir = tempdir().unwrap();
        write_dir(
            dir.path(),
            &[
                (ROUTES, ROUTES_TXT),
                (STOPS, STOPS_TXT),
                (TRIPS, "route_id,service_id,trip_id,direction_id\n700,S1,T1,north\n"),
            ],
        );

        let err = Feed::load(dir.path()).unwrap_err();
        assert!(matches!(err, FeedError::Csv { file: "trips.txt", .. }));
    }
}
