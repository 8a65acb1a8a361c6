//! OSRM dataset preparation (download + preprocess) for a travel profile.
//!
//! Each profile gets its own extracted graph because OSRM bakes the routing
//! profile in at extract time.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::traits::TravelProfile;

const OSRM_IMAGE: &str = "osrm/osrm-backend";

#[derive(Debug, Clone)]
pub struct GeofabrikRegion {
    /// Geofabrik region path, e.g. "north-america/us/nevada".
    pub path: String,
}

impl GeofabrikRegion {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("region")
    }

    pub fn url(&self) -> String {
        format!("https://download.geofabrik.de/{}-latest.osm.pbf", self.path)
    }
}

/// Lua profile shipped in the OSRM image for a travel mode.
fn lua_profile(profile: TravelProfile) -> &'static str {
    match profile {
        TravelProfile::Walking => "/opt/foot.lua",
        TravelProfile::Cycling => "/opt/bicycle.lua",
        TravelProfile::Driving => "/opt/car.lua",
    }
}

#[derive(Debug, Clone)]
pub struct OsrmDatasetConfig {
    pub region: GeofabrikRegion,
    pub data_root: PathBuf,
    pub profile: TravelProfile,
}

impl OsrmDatasetConfig {
    pub fn new(region: GeofabrikRegion, data_root: impl Into<PathBuf>, profile: TravelProfile) -> Self {
        Self {
            region,
            data_root: data_root.into(),
            profile,
        }
    }
}

/// Prepared MLD graph on disk.
#[derive(Debug, Clone)]
pub struct OsrmDataset {
    /// Directory mounted as `/data` in the container.
    pub data_dir: PathBuf,
    pub osrm_base: PathBuf,
    pub pbf_path: PathBuf,
}

impl OsrmDataset {
    /// Path of the graph inside the container.
    pub fn container_path(&self) -> String {
        format!("/data/{}", file_name(&self.osrm_base))
    }
}

#[derive(Debug)]
pub enum OsrmDataError {
    Io(io::Error),
    Http(reqwest::Error),
    ProcessFailure(String),
}

impl From<io::Error> for OsrmDataError {
    fn from(err: io::Error) -> Self {
        OsrmDataError::Io(err)
    }
}

impl From<reqwest::Error> for OsrmDataError {
    fn from(err: reqwest::Error) -> Self {
        OsrmDataError::Http(err)
    }
}

impl OsrmDataset {
    /// Downloads and preprocesses the region for the configured profile,
    /// skipping any step whose output already exists.
    pub fn ensure(config: &OsrmDatasetConfig) -> Result<Self, OsrmDataError> {
        let data_root = if config.data_root.is_absolute() {
            config.data_root.clone()
        } else {
            std::env::current_dir()?.join(&config.data_root)
        };
        let region = config.region.name();
        let data_dir = data_root.join(region).join(config.profile.osrm_profile());
        fs::create_dir_all(&data_dir)?;

        let pbf_path = data_dir.join(format!("{}-latest.osm.pbf", region));
        if !pbf_path.exists() {
            tracing::info!(url = %config.region.url(), "downloading region extract");
            download_pbf(&config.region.url(), &pbf_path)?;
        }

        let osrm_base = data_dir.join(format!("{}-latest.osrm", region));
        if !osrm_base.exists() {
            let input = format!("/data/{}", file_name(&pbf_path));
            run_docker(&["osrm-extract", "-p", lua_profile(config.profile), &input], &data_dir)?;
        }

        if !mld_ready(&osrm_base) {
            let graph = format!("/data/{}", file_name(&osrm_base));
            run_docker(&["osrm-partition", &graph], &data_dir)?;
            run_docker(&["osrm-customize", &graph], &data_dir)?;
        }

        Ok(Self {
            data_dir,
            osrm_base,
            pbf_path,
        })
    }
}

fn download_pbf(url: &str, dest: &Path) -> Result<(), OsrmDataError> {
    let response = reqwest::blocking::get(url)?.error_for_status()?;
    let tmp_path = dest.with_extension("tmp");
    let mut writer = BufWriter::new(File::create(&tmp_path)?);
    writer.write_all(&response.bytes()?)?;
    writer.flush()?;
    fs::rename(tmp_path, dest)?;
    Ok(())
}

fn mld_ready(osrm_base: &Path) -> bool {
    ["osrm.partition", "osrm.mldgr", "osrm.cells"]
        .iter()
        .all(|ext| osrm_base.with_extension(ext).exists())
        && osrm_base.exists()
}

fn run_docker(args: &[&str], data_dir: &Path) -> Result<(), OsrmDataError> {
    tracing::info!(step = args.first().copied().unwrap_or_default(), "running osrm preprocessing");
    let status = Command::new("docker")
        .args(["run", "--rm", "-t", "-v"])
        .arg(format!("{}:/data", data_dir.display()))
        .arg(OSRM_IMAGE)
        .args(args)
        .status()?;

    if status.success() {
        Ok(())
    } else {
        Err(OsrmDataError::ProcessFailure(format!(
            "{} exited with status {}",
            args.first().copied().unwrap_or("docker"),
            status
        )))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default()
        .to_string()
}
