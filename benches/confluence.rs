use confluence::{
    MeetingRequest, ParticipantInput, ParticipantRequest, SearchLimits, Schedule,
    gtfs::{Config, Gtfs},
    query,
    schedule::grid,
    shared::Coordinate,
};
use criterion::{Criterion, criterion_group, criterion_main};
use std::{fmt::Write as _, fs, hint::black_box, io::Write as _, time::Duration};

/// A throwaway directory of GTFS CSVs, built and ingested once per benchmark
/// group. Benchmarks run against a synthesized network rather than a
/// downloaded feed, so they don't depend on a `GTFS_DATA_PATH` environment
/// variable to run in CI.
struct Fixture {
    dir: std::path::PathBuf,
}

impl Fixture {
    fn new(tag: &str) -> Self {
        let mut dir = std::env::temp_dir();
        dir.push(format!("confluence-bench-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("create bench fixture dir");
        Self { dir }
    }

    fn write(&self, name: &str, contents: &str) -> &Self {
        let mut file = fs::File::create(self.dir.join(name)).expect("create bench fixture file");
        file.write_all(contents.as_bytes()).expect("write bench fixture file");
        self
    }

    fn build(&self) -> Schedule {
        let mut gtfs = Gtfs::new().with_config(Config::default()).from_directory(&self.dir);
        Schedule::build(&mut gtfs).expect("build schedule from bench fixture")
    }
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

const STOPS_HEADER: &str = "stop_id,stop_name,stop_lat,stop_lon,stop_desc,parent_station,location_type";
const ROUTES_HEADER: &str = "route_id,agency_id,route_short_name,route_long_name,route_type,route_desc";
const TRIPS_HEADER: &str = "route_id,trip_id,trip_headsign,direction_id,shape_id";
const STOP_TIMES_HEADER: &str = "trip_id,stop_id,stop_sequence,arrival_time,departure_time";

/// A side x side grid of stops, close enough together (0.002 degree, ~220m)
/// that every stop has dozens of geo-walk neighbors within the 780m radius —
/// the shape that stresses [`grid::nearby_stops`].
fn build_geo_grid(side: usize) -> Schedule {
    let fixture = Fixture::new("geo-grid");
    let mut stops = String::from(STOPS_HEADER);
    stops.push('\n');
    for row in 0..side {
        for col in 0..side {
            writeln!(
                stops,
                "s{row}_{col},s{row}_{col},{:.4},{:.4},,,0",
                row as f64 * 0.002,
                col as f64 * 0.002
            )
            .unwrap();
        }
    }
    fixture
        .write("stops.txt", &stops)
        .write("routes.txt", &format!("{ROUTES_HEADER}\n"))
        .write("trips.txt", &format!("{TRIPS_HEADER}\n"))
        .write("stop_times.txt", &format!("{STOP_TIMES_HEADER}\n"));
    fixture.build()
}

fn geo_lookup_default_radius(schedule: &Schedule) {
    let origin = Coordinate::from((0.02, 0.02));
    let _ = black_box(grid::nearby_stops(schedule.grid(), &schedule.stops, origin, 780.0, None));
}

fn geo_lookup_10x_radius(schedule: &Schedule) {
    let origin = Coordinate::from((0.02, 0.02));
    let _ = black_box(grid::nearby_stops(schedule.grid(), &schedule.stops, origin, 7_800.0, None));
}

/// `lines` parallel routes, each `stops_per_line` stops long, all crossing a
/// shared hub stop partway along. Mirrors the multi-route, transfer-hub
/// shape of the meeting scenarios, scaled up for a heavier solve.
fn build_transit_network(lines: usize, stops_per_line: usize) -> Schedule {
    let fixture = Fixture::new(&format!("transit-{lines}-{stops_per_line}"));
    let hub_at = stops_per_line / 2;

    let mut stops = String::from(STOPS_HEADER);
    stops.push('\n');
    writeln!(stops, "HUB,HUB,0,0,,,0").unwrap();
    for line in 0..lines {
        for i in 0..stops_per_line {
            if i == hub_at {
                continue;
            }
            let lat = (line as f64 - lines as f64 / 2.0) * 0.2;
            let lon = (i as f64 - hub_at as f64) * 0.05;
            writeln!(stops, "L{line}S{i},L{line}S{i},{lat:.4},{lon:.4},,,0").unwrap();
        }
    }

    let mut routes = String::from(ROUTES_HEADER);
    routes.push('\n');
    let mut trips = String::from(TRIPS_HEADER);
    trips.push('\n');
    let mut stop_times = String::from(STOP_TIMES_HEADER);
    stop_times.push('\n');
    for line in 0..lines {
        writeln!(routes, "R{line},,,,1,").unwrap();
        writeln!(trips, "R{line},T{line},,,").unwrap();
        for i in 0..stops_per_line {
            let stop_id = if i == hub_at { "HUB".to_string() } else { format!("L{line}S{i}") };
            let t = 8 * 3600 + i * 90;
            let hh = t / 3600;
            let mm = (t % 3600) / 60;
            writeln!(
                stop_times,
                "T{line},{stop_id},{},{:02}:{:02}:00,{:02}:{:02}:00",
                i + 1,
                hh,
                mm,
                hh,
                mm
            )
            .unwrap();
        }
    }

    fixture
        .write("stops.txt", &stops)
        .write("routes.txt", &routes)
        .write("trips.txt", &trips)
        .write("stop_times.txt", &stop_times);
    fixture.build()
}

fn station(label: char, query: &str) -> ParticipantRequest {
    ParticipantRequest {
        label,
        input: ParticipantInput::Station {
            query: query.to_string(),
            start_stop_id: None,
        },
    }
}

fn short_solve(schedule: &Schedule) {
    let request = MeetingRequest {
        participants: vec![station('A', "L0S0"), station('B', "L1S0")],
        start_time: "08:00:00".to_string(),
    };
    let _ = black_box(query::run_meeting(schedule, &request, &SearchLimits::default()).unwrap());
}

fn long_solve(schedule: &Schedule) {
    let request = MeetingRequest {
        participants: vec![
            station('A', "L0S0"),
            station('B', "L3S0"),
            station('C', "L6S0"),
        ],
        start_time: "08:00:00".to_string(),
    };
    let _ = black_box(query::run_meeting(schedule, &request, &SearchLimits::default()).unwrap());
}

fn criterion_benchmark(c: &mut Criterion) {
    let geo_grid = build_geo_grid(45);
    let small_network = build_transit_network(2, 40);
    let large_network = build_transit_network(8, 160);

    let mut group = c.benchmark_group("Routing");
    group.warm_up_time(Duration::from_secs(5));
    group.measurement_time(Duration::from_secs(15));

    group.bench_function("Geo lookup 1x radius", |b| b.iter(|| geo_lookup_default_radius(&geo_grid)));
    group.bench_function("Geo lookup 10x radius", |b| b.iter(|| geo_lookup_10x_radius(&geo_grid)));
    group.bench_function("Short meeting solve", |b| b.iter(|| short_solve(&small_network)));
    group.bench_function("Long meeting solve", |b| b.iter(|| long_solve(&large_network)));

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
