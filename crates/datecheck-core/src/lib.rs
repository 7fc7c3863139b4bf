pub mod date;
pub mod media;
pub mod report;
pub mod scan;

use std::path::PathBuf;
use std::time::Instant;

use serde::{Deserialize, Serialize};

pub use date::guess::guess_date_from_path;
pub use date::{ApproxDate, DateError, Moment};
pub use report::{CheckReport, CheckStatus};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOptions {
    /// Root of the photo archive
    pub root: PathBuf,
    /// Report only images that are not `Ok`
    #[serde(default)]
    pub only_flagged: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub total: u64,
    pub ok: u64,
    pub mismatched: u64,
    pub unknown: u64,
    pub errors: u64,
    #[serde(default)]
    pub skipped_dirs: u64,
}

impl CheckSummary {
    fn record(&mut self, status: CheckStatus) {
        self.total += 1;
        match status {
            CheckStatus::Ok => self.ok += 1,
            CheckStatus::Mismatch => self.mismatched += 1,
            CheckStatus::Unknown => self.unknown += 1,
            CheckStatus::Error => self.errors += 1,
        }
    }
}

/// Type alias for the per-image report callback
pub type ReportCallback<'a> = dyn FnMut(&CheckReport) -> anyhow::Result<()> + 'a;

/// Walk the archive, check every image and hand each report to `on_report`.
///
/// Unreadable images are reported with [`CheckStatus::Error`] and the walk
/// goes on; only an unreadable root or a failing callback aborts the run.
pub fn check_tree(options: &CheckOptions, on_report: &mut ReportCallback) -> anyhow::Result<CheckSummary> {
    let t = Instant::now();
    let scan = scan::scan_dir(&options.root)?;
    eprintln!(
        "Found {} images under {} ({:.2}s)",
        scan.images.len(),
        options.root.display(),
        t.elapsed().as_secs_f64()
    );

    let mut summary = CheckSummary {
        skipped_dirs: scan.skipped_dirs.len() as u64,
        ..CheckSummary::default()
    };

    for image in &scan.images {
        let report = report::check_image(image);
        summary.record(report.status);
        if options.only_flagged && !report.status.is_flagged() {
            continue;
        }
        on_report(&report)?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::{self, File};
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_check_tree_without_exif() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("2012/1204 wedding")).unwrap();
        File::create(root.join("2012/1204 wedding/a.jpg"))
            .unwrap()
            .write_all(b"no exif here")
            .unwrap();
        File::create(root.join("2012/readme.txt")).unwrap();

        let options = CheckOptions { root: root.to_path_buf(), only_flagged: false };
        let mut seen = Vec::new();
        let summary = check_tree(&options, &mut |r: &CheckReport| -> anyhow::Result<()> {
            seen.push(r.clone());
            Ok(())
        })
        .unwrap();

        assert_eq!(summary.total, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].path, PathBuf::from("2012/1204 wedding/a.jpg"));
        assert_eq!(seen[0].path_date, Some(ApproxDate::ym(2012, 4)));
        assert_eq!(seen[0].status, CheckStatus::Error);
    }

    #[test]
    fn test_check_tree_reads_exif() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("2012/1204 wedding")).unwrap();
        for (name, taken) in [("a.jpg", "2012:04:21 14:03:00"), ("b.jpg", "2012:05:01 09:00:00")] {
            File::create(root.join("2012/1204 wedding").join(name))
                .unwrap()
                .write_all(&date::exif::jpeg_with_exif(Some(taken), None))
                .unwrap();
        }

        let options = CheckOptions { root: root.to_path_buf(), only_flagged: false };
        let mut seen = Vec::new();
        let summary = check_tree(&options, &mut |r: &CheckReport| -> anyhow::Result<()> {
            seen.push(r.clone());
            Ok(())
        })
        .unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.ok, 1);
        assert_eq!(summary.mismatched, 1);
        assert_eq!(seen[0].status, CheckStatus::Ok);
        assert_eq!(
            seen[0].image_timestamp.map(|ts| ts.to_string()).as_deref(),
            Some("2012-04-21 14:03:00")
        );
        assert_eq!(seen[1].status, CheckStatus::Mismatch);
        assert_eq!(
            seen[1].render(false),
            "!  2012-05-01 09:00:00  2012-04-.. ..:..:..  2012/1204 wedding/b.jpg"
        );
    }

    #[test]
    fn test_only_flagged_skips_agreeing_images() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("1204")).unwrap();
        File::create(root.join("1204/a.jpg"))
            .unwrap()
            .write_all(&date::exif::jpeg_with_exif(Some("2012:04:21 14:03:00"), None))
            .unwrap();

        let options = CheckOptions { root: root.to_path_buf(), only_flagged: true };
        let mut count = 0;
        let summary = check_tree(&options, &mut |_: &CheckReport| -> anyhow::Result<()> {
            count += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(summary.ok, 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_root_name_is_not_a_date_source() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("1204");
        fs::create_dir_all(&root).unwrap();
        File::create(root.join("DSC_0001.jpg")).unwrap();

        let options = CheckOptions { root, only_flagged: true };
        let mut count = 0;
        let summary = check_tree(&options, &mut |r: &CheckReport| -> anyhow::Result<()> {
            assert_eq!(r.path_date, None);
            count += 1;
            Ok(())
        })
        .unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_callback_error_aborts() {
        let dir = tempdir().unwrap();
        File::create(dir.path().join("a.jpg")).unwrap();
        let options = CheckOptions { root: dir.path().to_path_buf(), only_flagged: false };
        let result = check_tree(&options, &mut |_: &CheckReport| -> anyhow::Result<()> {
            anyhow::bail!("stdout closed")
        });
        assert!(result.is_err());
    }
}
