use super::Schedule;
use crate::{error::Error, shared::Time};
use std::{collections::HashSet, sync::Arc};

/// Result of a successful [`resolve_station`] call.
#[derive(Debug, Clone)]
pub struct StationMatch {
    pub station_idx: u32,
    pub name: Arc<str>,
}

/// `resolveStation(query)` (§4.4): ranked substring matching over the
/// popularity-sorted station list built at ingestion. Exact match scores
/// highest, then prefix, then any substring; ties break by popularity, then
/// by the position the query was found at, then alphabetically.
pub fn resolve_station(schedule: &Schedule, query: &str) -> Result<StationMatch, Error> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Err(Error::EmptyQuery);
    }

    struct Candidate {
        score: u8,
        popularity: u32,
        match_idx: usize,
        station_idx: u32,
        name: Arc<str>,
    }

    let mut candidates: Vec<Candidate> = Vec::new();
    for entry in schedule.station_search_list.iter() {
        let Some(match_idx) = entry.lower_name.find(needle.as_str()) else {
            continue;
        };
        let score = if entry.lower_name.as_ref() == needle.as_str() {
            3
        } else if match_idx == 0 {
            2
        } else {
            1
        };
        candidates.push(Candidate {
            score,
            popularity: entry.popularity,
            match_idx,
            station_idx: entry.station_idx,
            name: entry.name.clone(),
        });
    }

    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.popularity.cmp(&a.popularity))
            .then(a.match_idx.cmp(&b.match_idx))
            .then(a.name.as_ref().cmp(b.name.as_ref()))
    });

    let mut seen_lower = HashSet::new();
    let best = candidates
        .into_iter()
        .find(|c| seen_lower.insert(c.name.to_lowercase()))
        .ok_or_else(|| Error::NoStationMatch(query.to_string()))?;

    Ok(StationMatch {
        station_idx: best.station_idx,
        name: best.name,
    })
}

/// `pickStartPlatform(station_id, t0)` (§4.4): the platform whose earliest
/// departure at or after `t0` is minimal; falls back to any platform if
/// none has a qualifying departure, and to `None` only for a
/// platform-less station.
pub fn pick_start_platform(schedule: &Schedule, station_idx: u32, t0: Time) -> Option<u32> {
    let platforms = schedule.station_platforms(station_idx);
    if platforms.is_empty() {
        return None;
    }

    let mut best: Option<(u32, u32)> = None; // (departure_sec, stop_idx)
    for &stop_idx in platforms {
        if let Some(first) = schedule
            .rows_at_stop(stop_idx)
            .find(|row| row.departure_sec >= t0.as_seconds())
        {
            let candidate = (first.departure_sec, stop_idx);
            if best.is_none_or(|(dep, _)| candidate.0 < dep) {
                best = Some(candidate);
            }
        }
    }

    Some(best.map(|(_, stop_idx)| stop_idx).unwrap_or(platforms[0]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs::{Config, Gtfs};
    use std::io::Write;

    fn build_fixture() -> Schedule {
        let dir = tempdir();
        write_csv(
            &dir,
            "stops.txt",
            "stop_id,stop_name,stop_lat,stop_lon,stop_desc,parent_station,location_type\n\
             S1,Uhlandstr,52.5,13.3,,,0\n\
             S2,Uhlandstrasse Nord,52.5001,13.3001,,,0\n\
             S3,Vinetastr,52.55,13.41,,,0\n",
        );
        write_csv(&dir, "routes.txt", "route_id,agency_id,route_short_name,route_long_name,route_type,route_desc\nR1,,U2,,1,\n");
        write_csv(&dir, "trips.txt", "route_id,trip_id,trip_headsign,direction_id,shape_id\nR1,T1,,,\n");
        write_csv(
            &dir,
            "stop_times.txt",
            "trip_id,stop_id,stop_sequence,arrival_time,departure_time\n\
             T1,S1,1,10:00:00,10:00:00\n\
             T1,S3,2,10:06:00,10:06:00\n",
        );
        write_csv(&dir, "pathways.txt", "from_stop_id,to_stop_id,traversal_time\n");
        write_csv(&dir, "transfers.txt", "from_stop_id,to_stop_id,min_transfer_time\n");

        let mut gtfs = Gtfs::new()
            .with_config(Config::default())
            .from_directory(dir.path());
        Schedule::build(&mut gtfs).unwrap()
    }

    struct TempDir(std::path::PathBuf);
    impl TempDir {
        fn path(&self) -> &std::path::Path {
            &self.0
        }
    }
    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn tempdir() -> TempDir {
        let mut path = std::env::temp_dir();
        path.push(format!("confluence-resolver-test-{}", std::process::id()));
        std::fs::create_dir_all(&path).unwrap();
        TempDir(path)
    }

    fn write_csv(dir: &TempDir, name: &str, contents: &str) {
        let mut file = std::fs::File::create(dir.path().join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn exact_match_outranks_prefix_and_substring() {
        let schedule = build_fixture();
        let got = resolve_station(&schedule, "Uhlandstr").unwrap();
        assert_eq!(got.name.as_ref(), "Uhlandstr");
    }

    #[test]
    fn empty_query_fails() {
        let schedule = build_fixture();
        assert_eq!(resolve_station(&schedule, "   "), Err(Error::EmptyQuery));
    }

    #[test]
    fn no_match_fails() {
        let schedule = build_fixture();
        assert!(matches!(
            resolve_station(&schedule, "nonexistent"),
            Err(Error::NoStationMatch(_))
        ));
    }

    #[test]
    fn picks_earliest_qualifying_platform() {
        let schedule = build_fixture();
        let station_idx = schedule.station_by_id("S1").unwrap();
        let stop_idx = pick_start_platform(&schedule, station_idx, Time::from_seconds(9 * 3600));
        assert_eq!(stop_idx, Some(schedule.stop_by_id("S1").unwrap()));
    }
}
