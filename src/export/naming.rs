use chrono::NaiveDate;

/// First-column marker of the header row in an exported file.
pub const HEADER_MARKER: &str = "Фамилия";
/// First-column marker of the trailing summary row. Recognized by value,
/// not by position, since exported files may have been hand-edited.
pub const SUMMARY_MARKER: &str = "Итого";

pub const EXPORT_EXT: &str = "csv";
const DATE_FMT: &str = "%Y-%m-%d";

/// One export file per (class, date) pair: `{class}_{YYYY-MM-DD}.csv`.
/// The cleanup sweep parses the date back out with
/// [`parse_export_file_name`], so the two must stay in lockstep.
pub fn export_file_name(class_name: &str, date: NaiveDate) -> String {
    format!("{}_{}.{}", class_name, date.format(DATE_FMT), EXPORT_EXT)
}

/// Inverse of [`export_file_name`]. Returns `None` for anything this
/// service did not produce. Class names may contain underscores; the date
/// is always the last `_`-separated segment.
pub fn parse_export_file_name(file_name: &str) -> Option<(String, NaiveDate)> {
    let stem = file_name.strip_suffix(&format!(".{}", EXPORT_EXT))?;
    let (class_name, date_part) = stem.rsplit_once('_')?;
    if class_name.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(date_part, DATE_FMT).ok()?;
    Some((class_name.to_string(), date))
}
