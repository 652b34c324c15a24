// Serial device discovery for the admin device picker.

use std::fmt;
use std::fs;
use std::path::Path;

pub const DEVICE_NAME_PATTERNS: [&str; 3] = ["tty.usbserial", "ttyUSB", "ttyACM"];
pub const NOT_FOUND_MARKER: &str = "Arduino not found";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceCandidate {
    Path(String),
    NotFound,
}

impl DeviceCandidate {
    pub fn as_str(&self) -> &str {
        match self {
            DeviceCandidate::Path(path) => path,
            DeviceCandidate::NotFound => NOT_FOUND_MARKER,
        }
    }

    pub fn is_device(&self) -> bool {
        matches!(self, DeviceCandidate::Path(_))
    }
}

impl fmt::Display for DeviceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_candidate_name(name: &str) -> bool {
    DEVICE_NAME_PATTERNS
        .iter()
        .any(|pattern| name.contains(pattern))
}

/// Filters `names` down to device paths under `dir`, sorted, with the
/// not-found marker standing in for an empty result.
pub fn candidates_from_names<I, S>(dir: &Path, names: I) -> Vec<DeviceCandidate>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut paths: Vec<String> = names
        .into_iter()
        .filter(|name| is_candidate_name(name.as_ref()))
        .map(|name| dir.join(name.as_ref()).to_string_lossy().to_string())
        .collect();
    paths.sort();

    if paths.is_empty() {
        return vec![DeviceCandidate::NotFound];
    }
    paths.into_iter().map(DeviceCandidate::Path).collect()
}

/// Scans `dir` on every call; an unreadable directory counts as no devices.
pub fn discover(dir: &Path) -> Vec<DeviceCandidate> {
    let names: Vec<String> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect(),
        Err(_) => Vec::new(),
    };
    candidates_from_names(dir, names)
}
