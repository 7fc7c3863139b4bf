use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::date::exif::{read_capture_time, ExifError};
use crate::date::guess::{filename_source, guess_date_from_path};
use crate::date::ApproxDate;
use crate::media::ImageFile;

/// A fully precise path date this close to the EXIF time is not flagged.
pub const PRECISE_TOLERANCE_SECS: i64 = 2;

/// Stand-in for a timestamp that could not be determined.
const NO_TIMESTAMP: &str = ".... .. .. .. .. ..";

const RED_BOLD: &str = "\x1b[1;31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// EXIF time agrees with the path
    Ok,
    /// EXIF time contradicts the path: probably misfiled
    Mismatch,
    /// Nothing in the path looks like a date
    Unknown,
    /// The image could not be read
    Error,
}

impl CheckStatus {
    fn marker(self) -> char {
        match self {
            CheckStatus::Ok => ' ',
            CheckStatus::Mismatch => '!',
            CheckStatus::Unknown => '?',
            CheckStatus::Error => 'E',
        }
    }

    /// Whether the line deserves a curator's attention.
    pub fn is_flagged(self) -> bool {
        self != CheckStatus::Ok
    }
}

/// Outcome of checking one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    pub path: PathBuf,
    pub image_timestamp: Option<NaiveDateTime>,
    pub path_date: Option<ApproxDate>,
    /// Naming convention or "folder" the path date came from
    pub date_source: Option<String>,
    pub status: CheckStatus,
    pub error: Option<String>,
}

/// Decide whether an EXIF time contradicts the date implied by the path.
pub fn is_mismatch(image_ts: NaiveDateTime, path_date: &ApproxDate) -> bool {
    if path_date.contains(image_ts) {
        return false;
    }
    match path_date.to_datetime() {
        Ok(path_ts) => (image_ts - path_ts).num_seconds().abs() > PRECISE_TOLERANCE_SECS,
        Err(_) => true,
    }
}

fn date_source(rel_path: &Path) -> String {
    let from_name = rel_path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(filename_source);
    from_name.unwrap_or("folder").to_string()
}

/// Compare an EXIF capture time (or the failure to read one) against the
/// date guessed from `rel_path`.
pub fn evaluate(rel_path: &Path, image_ts: Result<NaiveDateTime, ExifError>) -> CheckReport {
    let path_date = guess_date_from_path(rel_path);
    let date_source = path_date.map(|_| date_source(rel_path));

    let (image_timestamp, status, error) = match image_ts {
        Err(e) => (None, CheckStatus::Error, Some(e.to_string())),
        Ok(ts) => {
            let status = match &path_date {
                None => CheckStatus::Unknown,
                Some(date) if is_mismatch(ts, date) => CheckStatus::Mismatch,
                Some(_) => CheckStatus::Ok,
            };
            (Some(ts), status, None)
        }
    };

    CheckReport {
        path: rel_path.to_path_buf(),
        image_timestamp,
        path_date,
        date_source,
        status,
        error,
    }
}

/// Read the image's EXIF time and check it against its location.
pub fn check_image(image: &ImageFile) -> CheckReport {
    evaluate(&image.rel_path, read_capture_time(&image.abs_path))
}

impl CheckReport {
    /// One aligned console line:
    /// `<marker>  <EXIF time>  <path date>  <path>[  Error: ...]`.
    pub fn render(&self, color: bool) -> String {
        let image_ts = self
            .image_timestamp
            .map_or_else(|| NO_TIMESTAMP.to_string(), |ts| ts.format("%Y-%m-%d %H:%M:%S").to_string());
        let path_date = self
            .path_date
            .map_or_else(|| NO_TIMESTAMP.to_string(), |d| d.to_string());

        let mut line = format!(
            "{}  {}  {}  {}",
            self.status.marker(),
            image_ts,
            path_date,
            self.path.display()
        );
        if let Some(err) = &self.error {
            line.push_str("  Error: ");
            line.push_str(err);
        }

        if !color {
            return line;
        }
        match self.status {
            CheckStatus::Mismatch | CheckStatus::Error => format!("{RED_BOLD}{line}{RESET}"),
            CheckStatus::Unknown => format!("{YELLOW}{line}{RESET}"),
            CheckStatus::Ok => line,
        }
    }

    /// One JSON object, for `--format json`.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
