use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};
use tracing::{debug, error, info, warn};

use crate::config::FilterConfig;
use crate::error::RecordError;
use crate::process::{date_parser, utils};
use crate::schema::{col, schema_width, types::UtmPosition, WellRecord};

/// Per-reason counters for everything the reader saw.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReaderStats {
    pub lines: usize,
    pub decode_errors: usize,
    pub wrong_width: usize,
    pub excluded_basin: usize,
    pub missing_coordinates: usize,
    pub missing_finish_date: usize,
    pub bad_coordinates: usize,
    pub bad_dates: usize,
    pub yielded: usize,
}

impl ReaderStats {
    pub fn skipped(&self) -> usize {
        self.decode_errors
            + self.wrong_width
            + self.excluded_basin
            + self.missing_coordinates
            + self.missing_finish_date
            + self.bad_coordinates
            + self.bad_dates
    }
}

enum SkipReason {
    WrongWidth(usize),
    ExcludedBasin,
    MissingCoordinates,
    MissingFinishDate,
    BadCoordinates,
}

enum LineOutcome {
    Record(WellRecord),
    Skip(SkipReason),
    BadDate {
        start_raw: String,
        finish_raw: String,
        source: crate::error::DateError,
    },
}

/// Lazy, single-pass reader over a pipe-delimited POD export.
///
/// Yields one [`WellRecord`] per row that passes the filters. Malformed rows
/// (wrong width, undecodable bytes, non-numeric coordinates) are skipped and
/// counted. A bad `finish_date` is yielded as an error unless the filter
/// config turns off `strict_dates`.
pub struct PodReader<R> {
    reader: R,
    filter: FilterConfig,
    buf: Vec<u8>,
    line_no: usize,
    stats: ReaderStats,
}

impl PodReader<BufReader<File>> {
    #[tracing::instrument(level = "info", skip(path, filter), fields(file = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P, filter: &FilterConfig) -> Result<Self> {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open POD export: {:?}", path.as_ref()))?;
        info!("reading POD export");
        Ok(Self::new(BufReader::new(file), filter))
    }
}

impl<R: BufRead> PodReader<R> {
    pub fn new(reader: R, filter: &FilterConfig) -> Self {
        Self {
            reader,
            filter: filter.clone(),
            buf: Vec::with_capacity(1024),
            line_no: 0,
            stats: ReaderStats::default(),
        }
    }

    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    fn record_skip(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::WrongWidth(n) => {
                self.stats.wrong_width += 1;
                debug!(line = self.line_no, fields = n, "wrong field count, skipping");
            }
            SkipReason::ExcludedBasin => self.stats.excluded_basin += 1,
            SkipReason::MissingCoordinates => self.stats.missing_coordinates += 1,
            SkipReason::MissingFinishDate => self.stats.missing_finish_date += 1,
            SkipReason::BadCoordinates => {
                self.stats.bad_coordinates += 1;
                debug!(line = self.line_no, "non-numeric UTM coordinates, skipping");
            }
        }
    }
}

fn classify_line(line: &str, filter: &FilterConfig) -> LineOutcome {
    let fields = utils::split_pod_line(line);
    if fields.len() != schema_width() {
        return LineOutcome::Skip(SkipReason::WrongWidth(fields.len()));
    }
    if filter.is_excluded(&fields[col::POD_BASIN]) {
        return LineOutcome::Skip(SkipReason::ExcludedBasin);
    }
    if fields[col::EASTING].is_empty()
        || fields[col::NORTHING].is_empty()
        || fields[col::UTM_ZONE].is_empty()
    {
        return LineOutcome::Skip(SkipReason::MissingCoordinates);
    }
    if fields[col::FINISH_DATE].is_empty() {
        return LineOutcome::Skip(SkipReason::MissingFinishDate);
    }

    let position = match (
        fields[col::UTM_ZONE].parse::<u8>().ok(),
        utils::parse_finite(&fields[col::EASTING]),
        utils::parse_finite(&fields[col::NORTHING]),
    ) {
        (Some(zone), Some(easting), Some(northing)) => UtmPosition {
            zone,
            easting,
            northing,
        },
        _ => return LineOutcome::Skip(SkipReason::BadCoordinates),
    };

    let finish_date = match date_parser::parse_mdy(&fields[col::FINISH_DATE]) {
        Ok(d) => d,
        Err(source) => {
            return LineOutcome::BadDate {
                start_raw: fields[col::START_DATE].clone(),
                finish_raw: fields[col::FINISH_DATE].clone(),
                source,
            }
        }
    };
    // start_date is informational only; a bad one just reads as absent
    let start_date = date_parser::parse_optional_mdy(&fields[col::START_DATE])
        .ok()
        .flatten();

    LineOutcome::Record(WellRecord::from_row(
        fields,
        position,
        start_date,
        finish_date,
    ))
}

impl<R: BufRead> Iterator for PodReader<R> {
    type Item = Result<WellRecord, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => self.line_no += 1,
                Err(source) => {
                    return Some(Err(RecordError::Io {
                        line: self.line_no + 1,
                        source,
                    }))
                }
            }
            self.stats.lines += 1;

            let outcome = match std::str::from_utf8(&self.buf) {
                Ok(line) => classify_line(line, &self.filter),
                Err(e) => {
                    self.stats.decode_errors += 1;
                    debug!(line = self.line_no, error = %e, "undecodable line, skipping");
                    continue;
                }
            };

            match outcome {
                LineOutcome::Record(record) => {
                    self.stats.yielded += 1;
                    return Some(Ok(record));
                }
                LineOutcome::Skip(reason) => self.record_skip(reason),
                LineOutcome::BadDate {
                    start_raw,
                    finish_raw,
                    source,
                } => {
                    self.stats.bad_dates += 1;
                    if self.filter.strict_dates {
                        error!(
                            line = self.line_no,
                            start_date = %start_raw,
                            finish_date = %finish_raw,
                            "unparseable finish_date"
                        );
                        return Some(Err(RecordError::Date {
                            line: self.line_no,
                            column: "finish_date",
                            source,
                        }));
                    }
                    warn!(
                        line = self.line_no,
                        start_date = %start_raw,
                        finish_date = %finish_raw,
                        "unparseable finish_date, skipping"
                    );
                }
            }
        }
    }
}

/// Read every surviving record from `path`, stopping at the first fatal row.
pub fn load_pod_file<P: AsRef<Path>>(path: P, filter: &FilterConfig) -> Result<Vec<WellRecord>> {
    let mut reader = PodReader::open(&path, filter)?;
    let records = reader
        .by_ref()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("reading {}", path.as_ref().display()))?;
    let stats = reader.stats();
    info!(
        lines = stats.lines,
        kept = stats.yielded,
        skipped = stats.skipped(),
        wrong_width = stats.wrong_width,
        excluded_basin = stats.excluded_basin,
        missing_coordinates = stats.missing_coordinates,
        missing_finish_date = stats.missing_finish_date,
        "POD export loaded"
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::fixtures::line;
    use anyhow::Result;
    use chrono::NaiveDate;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,podviz::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    fn good_line(basin: &str, finish: &str) -> String {
        line(&[
            ("pod_basin", basin),
            ("pod_nbr", "01234"),
            ("pod_status", "ACT"),
            ("utm_zone", "13"),
            ("easting", "350000"),
            ("northing", "3800000"),
            ("finish_date", finish),
        ])
    }

    fn read_all(input: &str, filter: &FilterConfig) -> (Vec<Result<WellRecord, RecordError>>, ReaderStats) {
        let mut reader = PodReader::new(Cursor::new(input.as_bytes().to_vec()), filter);
        let items: Vec<_> = reader.by_ref().collect();
        (items, reader.stats())
    }

    #[test]
    fn test_three_line_scenario() -> Result<()> {
        init_test_logging();
        let missing_easting = line(&[
            ("pod_basin", "OS"),
            ("utm_zone", "13"),
            ("northing", "3800000"),
            ("finish_date", "01/01/1980"),
        ]);
        let content = format!(
            "{}\n{}\n{}\n",
            good_line("OS", "06/15/1975"),
            good_line("SP", "06/15/1975"),
            missing_easting
        );

        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(content.as_bytes())?;

        let records = load_pod_file(tmp.path(), &FilterConfig::default())?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pod_basin, "OS");
        assert_eq!(
            records[0].finish_date,
            NaiveDate::from_ymd_opt(1975, 6, 15).unwrap()
        );
        assert_eq!(records[0].utm_zone, 13);
        assert_eq!(records[0].easting, 350_000.0);
        Ok(())
    }

    #[test]
    fn test_wrong_width_lines_are_omitted() {
        init_test_logging();
        let good = good_line("RG", "06/15/1975");
        let short = good.replacen("RG|", "", 1);
        let long = format!("extra|{}", good);
        let input = format!("{}\n{}\n{}\n{}\n\n", good, short, long, good);

        let (items, stats) = read_all(&input, &FilterConfig::default());
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|r| r.is_ok()));
        assert_eq!(stats.lines, 5);
        assert_eq!(stats.wrong_width, 3);
        assert_eq!(stats.yielded, 2);
    }

    #[test]
    fn test_excluded_basins_never_survive() {
        let filter = FilterConfig::default();
        let input: String = ["SP", "SD", "RG", "SP", "LRG", "SD"]
            .iter()
            .map(|b| good_line(b, "03/04/1999") + "\n")
            .collect();

        let (items, stats) = read_all(&input, &filter);
        let basins: Vec<String> = items
            .into_iter()
            .map(|r| r.expect("no fatal rows").pod_basin)
            .collect();
        assert_eq!(basins, vec!["RG", "LRG"]);
        assert!(basins.iter().all(|b| !filter.is_excluded(b)));
        assert_eq!(stats.excluded_basin, 4);
    }

    #[test]
    fn test_undecodable_line_is_skipped() {
        let mut input = good_line("RG", "06/15/1975").into_bytes();
        input.push(b'\n');
        input.extend_from_slice(b"RG|\xff\xfe|broken|\n");
        input.extend_from_slice(good_line("RG", "07/04/1976").as_bytes());

        let mut reader = PodReader::new(Cursor::new(input), &FilterConfig::default());
        let records: Vec<_> = reader.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(reader.stats().decode_errors, 1);
    }

    #[test]
    fn test_blank_finish_date_and_bad_coordinates_are_skipped() {
        let input = format!(
            "{}\n{}\n{}\n",
            good_line("RG", "   "),
            line(&[
                ("pod_basin", "RG"),
                ("utm_zone", "13"),
                ("easting", "east"),
                ("northing", "3800000"),
                ("finish_date", "06/15/1975"),
            ]),
            good_line("RG", "06/15/1975"),
        );
        let (items, stats) = read_all(&input, &FilterConfig::default());
        assert_eq!(items.len(), 1);
        assert_eq!(stats.missing_finish_date, 1);
        assert_eq!(stats.bad_coordinates, 1);
    }

    #[test]
    fn test_bad_date_is_fatal_when_strict() {
        init_test_logging();
        let input = format!(
            "{}\n{}\n{}\n",
            good_line("RG", "06/15/1975"),
            good_line("RG", "1975-06-15"),
            good_line("RG", "07/04/1976"),
        );

        let (items, _) = read_all(&input, &FilterConfig::default());
        assert!(items[0].is_ok());
        match &items[1] {
            Err(RecordError::Date { line, column, .. }) => {
                assert_eq!(*line, 2);
                assert_eq!(*column, "finish_date");
            }
            other => panic!("expected date error, got {:?}", other),
        }

        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(input.as_bytes()).unwrap();
        assert!(load_pod_file(tmp.path(), &FilterConfig::default()).is_err());
    }

    #[test]
    fn test_bad_date_is_skipped_when_lenient() {
        let filter = FilterConfig {
            strict_dates: false,
            ..FilterConfig::default()
        };
        let input = format!(
            "{}\n{}\n",
            good_line("RG", "13/45/1975"),
            good_line("RG", "07/04/1976"),
        );
        let (items, stats) = read_all(&input, &filter);
        assert_eq!(items.len(), 1);
        assert!(items[0].is_ok());
        assert_eq!(stats.bad_dates, 1);
    }

    #[test]
    fn test_year_zero_finish_date_is_a_date_error() {
        let input = format!("{}\n", good_line("RG", "01/01/0"));
        let (items, stats) = read_all(&input, &FilterConfig::default());
        assert!(matches!(items[0], Err(RecordError::Date { .. })));
        assert_eq!(stats.bad_dates, 1);
    }
}
