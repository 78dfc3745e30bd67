mod config;
pub mod models;

pub use config::*;
use models::*;
use serde::de::DeserializeOwned;
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use zip::ZipArchive;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not find file with name: {0}")]
    FileNotFound(String),
    #[error("missing any source to pull data from")]
    MissingSource,
}

/// Where feed bytes are actually read from. Loading from disk or network is
/// an external collaborator this crate does not specify further than this
/// enum's two variants.
#[derive(Default)]
pub enum Source {
    #[default]
    None,
    Zip(Box<ZipArchive<File>>),
    Directory(PathBuf),
}

#[derive(Default)]
pub struct Gtfs {
    config: Config,
    storage: Source,
}

impl Gtfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn from_zip<P: AsRef<Path>>(mut self, path: P) -> Result<Self, self::Error> {
        let zip_file = File::open(path)?;
        let archive = ZipArchive::new(zip_file)?;
        self.storage = Source::Zip(Box::new(archive));
        Ok(self)
    }

    pub fn from_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.storage = Source::Directory(path.as_ref().to_path_buf());
        self
    }

    pub fn stream_stops<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsStop)),
    {
        self.stream(&self.config.stops_path.clone(), f)
    }

    pub fn stream_routes<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsRoute)),
    {
        self.stream(&self.config.routes_path.clone(), f)
    }

    pub fn stream_trips<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsTrip)),
    {
        self.stream(&self.config.trips_path.clone(), f)
    }

    pub fn stream_stop_times<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsStopTime)),
    {
        self.stream(&self.config.stop_times_path.clone(), f)
    }

    pub fn stream_pathways<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsPathway)),
    {
        // pathways.txt is an optional table; a feed without one has no
        // explicit pathway edges, not a load failure.
        match &mut self.storage {
            Source::None => Err(self::Error::MissingSource),
            Source::Zip(archive) => match stream_from_zip(archive, &self.config.pathways_path, f) {
                Err(self::Error::FileNotFound(_)) => Ok(()),
                other => other,
            },
            Source::Directory(path) => {
                match stream_from_dir(path, &self.config.pathways_path, f) {
                    Err(self::Error::Io(_)) => Ok(()),
                    other => other,
                }
            }
        }
    }

    pub fn stream_transfers<F>(&mut self, f: F) -> Result<(), self::Error>
    where
        F: FnMut((usize, GtfsTransfer)),
    {
        match &mut self.storage {
            Source::None => Err(self::Error::MissingSource),
            Source::Zip(archive) => match stream_from_zip(archive, &self.config.transfers_path, f) {
                Err(self::Error::FileNotFound(_)) => Ok(()),
                other => other,
            },
            Source::Directory(path) => {
                match stream_from_dir(path, &self.config.transfers_path, f) {
                    Err(self::Error::Io(_)) => Ok(()),
                    other => other,
                }
            }
        }
    }

    fn stream<T, F>(&mut self, file_name: &str, f: F) -> Result<(), self::Error>
    where
        T: DeserializeOwned,
        F: FnMut((usize, T)),
    {
        match &mut self.storage {
            Source::None => Err(self::Error::MissingSource),
            Source::Zip(archive) => stream_from_zip(archive, file_name, f),
            Source::Directory(path) => stream_from_dir(path, file_name, f),
        }
    }
}

fn stream_from_zip<T, F>(
    archive: &mut ZipArchive<File>,
    file_name: &str,
    mut f: F,
) -> Result<(), self::Error>
where
    T: DeserializeOwned,
    F: FnMut((usize, T)),
{
    let index = archive
        .index_for_name(file_name)
        .ok_or_else(|| self::Error::FileNotFound(file_name.to_string()))?;
    let file = archive.by_index(index)?;
    let mut reader = csv::Reader::from_reader(file);
    for (i, result) in reader.deserialize().enumerate() {
        let record: T = result?;
        f((i, record));
    }
    Ok(())
}

fn stream_from_dir<T, F>(dir_path: &Path, file_name: &str, mut f: F) -> Result<(), self::Error>
where
    T: DeserializeOwned,
    F: FnMut((usize, T)),
{
    let file_path = dir_path.join(file_name);
    let file = File::open(file_path)?;
    // BufReader is critical here for speed on large feeds.
    let reader = io::BufReader::with_capacity(128 * 1024, file);
    let mut csv_reader = csv::Reader::from_reader(reader);
    for (i, result) in csv_reader.deserialize().enumerate() {
        let record: T = result?;
        f((i, record));
    }
    Ok(())
}
