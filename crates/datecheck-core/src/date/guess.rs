use regex::{Captures, Regex};
use std::path::Path;
use std::sync::LazyLock;

use super::ApproxDate;

/// Two-digit years (and four-digit folder names) below this are taken to
/// mean the next century: `05` -> 2005, not 1905. Assumes the archive holds
/// nothing older than 1970.
pub const YEAR_WINDOW_PIVOT: i32 = 1970;

const FIELDS: [&str; 6] = ["year", "month", "day", "hour", "minute", "second"];

struct NamePattern {
    /// Which device/app produces names like this.
    source: &'static str,
    regex: &'static LazyLock<Regex>,
}

// IMG_20140604_074913.jpg, VID_20140604_074913_1.mp4
static RE_CAMERA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:IMG|VID|PANO)_(?P<year>[0-9]{4})(?P<month>[0-9]{2})(?P<day>[0-9]{2})_(?P<hour>[0-9]{2})(?P<minute>[0-9]{2})(?P<second>[0-9]{2})(?:_[0-9]+)?\.(?:jpg|mpg|mp4)").unwrap()
});
// 2014-12-29 12.53.54.jpg, 2014-12-29 12.53.54-1.png
static RE_DOTTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?P<year>[0-9]{4})-(?P<month>[0-9]{2})-(?P<day>[0-9]{2}) (?P<hour>[0-9]{2})\.(?P<minute>[0-9]{2})\.(?P<second>[0-9]{2})(?:-[0-9]+)?\.(?:jpg|png)").unwrap()
});
// IMG-20120803-WA0001.jpg
static RE_WHATSAPP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:IMG|VID)-(?P<year>[0-9]{4})(?P<month>[0-9]{2})(?P<day>[0-9]{2})-WA[0-9]+\.(?:jpe?g|mp4)").unwrap()
});
// IMG-20170730-WA0000 (2017-10-14T07_59_05.000).jpg
static RE_WHATSAPP_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:IMG|VID)-[0-9]{8}-WA[0-9]+ \((?P<year>[0-9]{4})-(?P<month>[0-9]{2})-(?P<day>[0-9]{2})T(?P<hour>[0-9]{2})_(?P<minute>[0-9]{2})_(?P<second>[0-9]{2})\.[0-9]+\)\.(?:jpe?g|mp4)").unwrap()
});

/// Tried in order against the file name; the first match wins.
static NAME_PATTERNS: &[NamePattern] = &[
    NamePattern { source: "Android camera", regex: &RE_CAMERA },
    NamePattern { source: "HTC/Samsung camera", regex: &RE_DOTTED },
    NamePattern { source: "WhatsApp", regex: &RE_WHATSAPP },
    NamePattern { source: "WhatsApp backup export", regex: &RE_WHATSAPP_EXPORT },
];

// "1204", "1204 - wedding", "0509 travel"
static MONTH_FOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<year>[0-9]{2})(?P<month>01|02|03|04|05|06|07|08|09|10|11|12)").unwrap()
});
static YEAR_FOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{4}$").unwrap());

fn window_year(year: i32) -> i32 {
    if year < YEAR_WINDOW_PIVOT {
        year + 100
    } else {
        year
    }
}

fn group(caps: &Captures, name: &str) -> Option<i32> {
    caps.name(name)?.as_str().parse().ok()
}

/// Fields captured by a file-name pattern, in year..second order.
fn date_from_captures(caps: &Captures) -> Option<ApproxDate> {
    let mut values = Vec::with_capacity(FIELDS.len());
    for field in FIELDS {
        match caps.name(field) {
            Some(m) => values.push(m.as_str().parse::<u32>().ok()?),
            None => break,
        }
    }
    ApproxDate::from_leading(&values)
}

/// Date encoded in a file name by a camera or messaging app, if any.
pub fn guess_date_from_filename(filename: &str) -> Option<ApproxDate> {
    NAME_PATTERNS.iter().find_map(|pat| {
        let caps = pat.regex.captures(filename)?;
        date_from_captures(&caps)
    })
}

/// Date implied by a single directory name: a `YYMM...` month folder or a
/// bare `YYYY` year folder.
pub fn guess_date_from_folder(name: &str) -> Option<ApproxDate> {
    if let Some(caps) = MONTH_FOLDER_RE.captures(name) {
        let year = window_year(1900 + group(&caps, "year")?);
        let month = u32::try_from(group(&caps, "month")?).ok()?;
        return Some(ApproxDate::ym(year, month));
    }
    if YEAR_FOLDER_RE.is_match(name) {
        return Some(ApproxDate::year(window_year(name.parse().ok()?)));
    }
    None
}

/// Best date that can be inferred from a path without opening the file.
///
/// The file name is tried first; failing that, the enclosing directories are
/// tried from the innermost outwards. `None` means nothing in the path looks
/// like a date.
pub fn guess_date_from_path(path: impl AsRef<Path>) -> Option<ApproxDate> {
    let path = path.as_ref();

    if let Some(date) = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(guess_date_from_filename)
    {
        return Some(date);
    }

    path.parent()?
        .ancestors()
        .filter_map(|dir| dir.file_name()?.to_str())
        .find_map(guess_date_from_folder)
}

/// Which naming convention a file name follows, for diagnostics.
pub fn filename_source(filename: &str) -> Option<&'static str> {
    NAME_PATTERNS
        .iter()
        .find(|pat| pat.regex.is_match(filename))
        .map(|pat| pat.source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_file_names() {
        let cases = [
            ("IMG_20140604_074913.jpg", ApproxDate::full(2014, 6, 4, 7, 49, 13)),
            ("2014-12-29 12.53.54.jpg", ApproxDate::full(2014, 12, 29, 12, 53, 54)),
            ("2013-08-15 14.27.57.jpg", ApproxDate::full(2013, 8, 15, 14, 27, 57)),
            ("IMG-20120803-WA0001.jpg", ApproxDate::ymd(2012, 8, 3)),
            (
                "IMG-20170730-WA0000 (2017-10-14T07_59_05.000).jpg",
                ApproxDate::full(2017, 10, 14, 7, 59, 5),
            ),
        ];
        for (input, expected) in cases {
            assert_eq!(guess_date_from_path(input), Some(expected), "{input}");
        }
    }

    #[test]
    fn test_guess_folders() {
        assert_eq!(
            guess_date_from_path("2012/1204 - Hochzeit/Mama Ursula/BILD0325.JPG"),
            Some(ApproxDate::ym(2012, 4))
        );
        assert_eq!(
            guess_date_from_path("2017/Foto-DVD der Eulengruppe 2017/Turnen/IMG_7565.JPG"),
            Some(ApproxDate::year(2017))
        );
    }

    #[test]
    fn test_guess_nothing() {
        assert_eq!(guess_date_from_path("DSC_2098.JPG"), None);
        assert_eq!(guess_date_from_path("holiday/beach/DSC_2098.JPG"), None);
        assert_eq!(guess_date_from_path("/absolute/DSC_2098.JPG"), None);
        assert_eq!(guess_date_from_path(""), None);
    }

    #[test]
    fn test_file_name_beats_folders() {
        assert_eq!(
            guess_date_from_path("2012/1204/IMG_20140604_074913.jpg"),
            Some(ApproxDate::full(2014, 6, 4, 7, 49, 13))
        );
    }

    #[test]
    fn test_patterns_ignore_case() {
        assert_eq!(
            guess_date_from_path("img_20140604_074913_2.JPG"),
            Some(ApproxDate::full(2014, 6, 4, 7, 49, 13))
        );
        assert_eq!(
            guess_date_from_path("vid-20120803-wa0001.MP4"),
            Some(ApproxDate::ymd(2012, 8, 3))
        );
        assert_eq!(
            guess_date_from_path("PANO_20150101_000001.jpg"),
            Some(ApproxDate::full(2015, 1, 1, 0, 0, 1))
        );
    }

    #[test]
    fn test_unlisted_extension_falls_back_to_folders() {
        // PNG is not a camera-pattern extension
        assert_eq!(
            guess_date_from_path("1508/IMG_20150801_120000.png"),
            Some(ApproxDate::ym(2015, 8))
        );
    }

    #[test]
    fn test_folder_year_window() {
        assert_eq!(guess_date_from_folder("0509 travel"), Some(ApproxDate::ym(2005, 9)));
        assert_eq!(guess_date_from_folder("9912"), Some(ApproxDate::ym(1999, 12)));
        assert_eq!(guess_date_from_folder("7001"), Some(ApproxDate::ym(1970, 1)));
        assert_eq!(guess_date_from_folder("6901"), Some(ApproxDate::ym(2069, 1)));
        assert_eq!(guess_date_from_folder("1985"), Some(ApproxDate::year(1985)));
        assert_eq!(guess_date_from_folder("1969"), Some(ApproxDate::year(2069)));
    }

    #[test]
    fn test_month_rule_precedes_year_rule() {
        // "2012" also reads as month folder 20/12
        assert_eq!(guess_date_from_folder("2012"), Some(ApproxDate::ym(2020, 12)));
        assert_eq!(guess_date_from_folder("2017"), Some(ApproxDate::year(2017)));
    }

    #[test]
    fn test_folder_non_matches() {
        // no valid month after the first two digits, so only the year rule applies
        assert_eq!(guess_date_from_folder("1213"), Some(ApproxDate::year(1313)));
        assert_eq!(guess_date_from_folder("1200"), Some(ApproxDate::year(1300)));
        assert_eq!(guess_date_from_folder("Turnen"), None);
        assert_eq!(guess_date_from_folder("Foto-DVD 2017"), None);
        assert_eq!(guess_date_from_folder("20177"), None);
        assert_eq!(guess_date_from_folder("113"), None);
    }

    #[test]
    fn test_only_ascii_digits_count() {
        assert_eq!(guess_date_from_filename("IMG_２０１４０６０４_０７４９１３.jpg"), None);
        assert_eq!(guess_date_from_folder("１２０４"), None);
        assert_eq!(guess_date_from_folder("٢٠١٧"), None);
        assert_eq!(
            guess_date_from_path("2017/１７０５ Ausflug/IMG_7565.JPG"),
            Some(ApproxDate::year(2017))
        );
    }

    #[test]
    fn test_filename_source() {
        assert_eq!(filename_source("IMG-20120803-WA0001.jpg"), Some("WhatsApp"));
        assert_eq!(filename_source("DSC_2098.JPG"), None);
    }
}
