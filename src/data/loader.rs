//! CSV loader
//!
//! Turns a raw export into a `SalesFrame`: drops source-only columns by
//! header name, maps the remaining columns positionally onto the canonical
//! schema, removes the trailing summary row where the export has one, and
//! parses day-first dates.

use super::models::{CanonicalColumn, Category, DatasetKind, Measure};
use super::{NumericColumn, SalesFrame, TextColumn};
use crate::config::{DelimiterSetting, EncodingSetting, SourceConfig};
use crate::error::{AppError, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Day-first formats accepted for the date column, tried in order
const DATE_FORMATS: [&str; 5] = ["%d.%m.%Y", "%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d", "%d.%m.%y"];

/// Layout of one source export
#[derive(Debug, Clone)]
pub struct SourceSchema {
    pub kind: DatasetKind,
    /// Canonical columns in file order, after dropped columns are removed
    pub columns: Vec<CanonicalColumn>,
    /// Raw header names removed before positional mapping
    pub dropped: Vec<&'static str>,
    /// Raw positions of `dropped`, used when the file has no header row
    pub dropped_at: Vec<usize>,
    /// The export ends with an incomplete totals row
    pub drop_trailing_row: bool,
}

impl SourceSchema {
    /// `Date, zn, sb, tax, marza`
    pub fn day_sell() -> Self {
        Self {
            kind: DatasetKind::DaySell,
            columns: vec![
                CanonicalColumn::Date,
                CanonicalColumn::Numeric(Measure::NetPurchase),
                CanonicalColumn::Numeric(Measure::GrossSale),
                CanonicalColumn::Numeric(Measure::Tax),
                CanonicalColumn::Numeric(Measure::Margin),
            ],
            dropped: vec![],
            dropped_at: vec![],
            drop_trailing_row: true,
        }
    }

    /// Product export with its margin breakdown columns removed
    pub fn product_sales() -> Self {
        Self {
            kind: DatasetKind::ProductSales,
            columns: vec![
                CanonicalColumn::Date,
                CanonicalColumn::Text(Category::ProductId),
                CanonicalColumn::Text(Category::ProductGroup),
                CanonicalColumn::Text(Category::ProductName),
                CanonicalColumn::Numeric(Measure::ProductQuantity),
                CanonicalColumn::Numeric(Measure::NetPurchasePrice),
                CanonicalColumn::Numeric(Measure::NetPurchaseValue),
                CanonicalColumn::Numeric(Measure::NetSalePrice),
                CanonicalColumn::Numeric(Measure::NetSaleValue),
            ],
            dropped: vec![
                "pmarza",
                "pudzmarza",
                "pce_sb",
                "pwa_sb",
                "pudzsb",
                "pmarzajedn",
                "pkwmarza",
            ],
            // data,id,grupa,nazwa,ilosc,pmarza,zn_c,zn_w,pudzmarza,pce_sb,sb_c,pwa_sb,sb_w,pudzsb,pmarzajedn,pkwmarza
            dropped_at: vec![5, 8, 9, 11, 13, 14, 15],
            drop_trailing_row: false,
        }
    }

    /// Raw positions of the canonical columns in a file without a header
    fn headerless_indices(&self) -> Vec<usize> {
        (0..self.columns.len() + self.dropped_at.len())
            .filter(|i| !self.dropped_at.contains(i))
            .collect()
    }

    pub fn for_kind(kind: DatasetKind) -> Self {
        match kind {
            DatasetKind::DaySell => Self::day_sell(),
            DatasetKind::ProductSales => Self::product_sales(),
        }
    }
}

/// How to read the raw bytes
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub delimiter: DelimiterSetting,
    pub encoding: EncodingSetting,
    pub has_header: bool,
}

impl From<&SourceConfig> for LoadOptions {
    fn from(source: &SourceConfig) -> Self {
        Self {
            delimiter: source.delimiter,
            encoding: source.encoding,
            has_header: source.has_header,
        }
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: DelimiterSetting::Auto,
            encoding: EncodingSetting::Utf8,
            has_header: true,
        }
    }
}

/// Load a CSV export from disk
pub fn load(path: &Path, schema: &SourceSchema, options: LoadOptions) -> Result<SalesFrame> {
    info!("Loading {:?} from {}", schema.kind, path.display());
    let t0 = Instant::now();

    let bytes = fs::read(path)?;
    let text = decode(&bytes, options.encoding)?;
    let frame = parse(&text, schema, options)?;

    debug!("Loaded {} rows in {:?}", frame.len(), t0.elapsed());
    Ok(frame)
}

/// Parse CSV text already in memory
pub fn parse(text: &str, schema: &SourceSchema, options: LoadOptions) -> Result<SalesFrame> {
    let delimiter = match options.delimiter {
        DelimiterSetting::Comma => b',',
        DelimiterSetting::Semicolon => b';',
        DelimiterSetting::Auto => sniff_delimiter(text),
    };
    let decimal_comma = delimiter == b';';

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(options.has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let keep = if options.has_header {
        kept_indices(reader.headers()?, schema)?
    } else {
        schema.headerless_indices()
    };

    let mut records: Vec<StringRecord> = reader.records().collect::<std::result::Result<_, _>>()?;
    if schema.drop_trailing_row {
        if let Some(last) = records.pop() {
            debug!("Dropped trailing record: {:?}", last);
        }
    }

    // 1-based file line of the first data record
    let first_line = if options.has_header { 2 } else { 1 };

    let mut dates = Vec::with_capacity(records.len());
    let mut numeric: Vec<NumericColumn> = Vec::new();
    let mut text_columns: Vec<TextColumn> = Vec::new();
    for column in &schema.columns {
        match column {
            CanonicalColumn::Numeric(measure) => numeric.push(NumericColumn {
                measure: *measure,
                values: Vec::with_capacity(records.len()),
            }),
            CanonicalColumn::Text(category) => text_columns.push(TextColumn {
                category: *category,
                values: Vec::with_capacity(records.len()),
            }),
            CanonicalColumn::Date => {}
        }
    }

    let mut blanks = 0usize;
    for (offset, record) in records.iter().enumerate() {
        let line = first_line + offset;
        let (mut n, mut t) = (0, 0);
        for (column, &index) in schema.columns.iter().zip(&keep) {
            let field = record.get(index).ok_or_else(|| {
                AppError::parse(line, format!("expected at least {} fields", index + 1))
            })?;
            match column {
                CanonicalColumn::Date => dates.push(parse_date(field).ok_or_else(|| {
                    AppError::parse(line, format!("unrecognised date '{}'", field))
                })?),
                CanonicalColumn::Numeric(_) => {
                    let value = if field.is_empty() {
                        blanks += 1;
                        f64::NAN
                    } else {
                        parse_number(field, decimal_comma).ok_or_else(|| {
                            AppError::parse(line, format!("unparseable number '{}'", field))
                        })?
                    };
                    numeric[n].values.push(value);
                    n += 1;
                }
                CanonicalColumn::Text(_) => {
                    text_columns[t].values.push(field.to_string());
                    t += 1;
                }
            }
        }
    }
    if blanks > 0 {
        warn!("{} blank numeric field(s) read as missing", blanks);
    }

    SalesFrame::new(schema.kind, dates, numeric, text_columns)
}

/// Positions of the canonical columns once dropped headers are removed
fn kept_indices(headers: &StringRecord, schema: &SourceSchema) -> Result<Vec<usize>> {
    for name in &schema.dropped {
        if !headers.iter().any(|h| h.eq_ignore_ascii_case(name)) {
            return Err(AppError::MissingColumn(name.to_string()));
        }
    }
    let keep: Vec<usize> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !schema.dropped.iter().any(|d| h.eq_ignore_ascii_case(d)))
        .map(|(i, _)| i)
        .collect();

    if keep.len() != schema.columns.len() {
        return Err(AppError::parse(
            1,
            format!(
                "expected {} columns after dropping {:?}, found {}",
                schema.columns.len(),
                schema.dropped,
                keep.len()
            ),
        ));
    }
    Ok(keep)
}

fn decode(bytes: &[u8], encoding: EncodingSetting) -> Result<String> {
    match encoding {
        EncodingSetting::Utf8 => String::from_utf8(bytes.to_vec())
            .map_err(|e| AppError::parse(0, format!("file is not valid UTF-8: {}", e))),
        // ISO-8859-1 maps every byte to the code point of the same value
        EncodingSetting::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
    }
}

/// Semicolon when the first line has semicolons and no commas, else comma
pub fn sniff_delimiter(text: &str) -> u8 {
    let first = text.lines().next().unwrap_or_default();
    if first.contains(';') && !first.contains(',') {
        b';'
    } else {
        b','
    }
}

/// Parse a day-first calendar date
pub fn parse_date(field: &str) -> Option<NaiveDate> {
    // exports sometimes carry a time part
    let day = field.split_whitespace().next()?;
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(day, format).ok())
}

fn parse_number(field: &str, decimal_comma: bool) -> Option<f64> {
    if decimal_comma {
        field.replace(',', ".").parse().ok()
    } else {
        field.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_CSV: &str = "\
Date,zn,sb,tax,marza
05.01.2018,50.5,100,10,39.5
20.01.2018,120,200,20,60
03.02.2018,80,150,15,55
,5414124.75,1218719.16,1220682.59,365027.61
";

    #[test]
    fn test_day_sell_drops_trailing_row() {
        let frame = parse(DAY_CSV, &SourceSchema::day_sell(), LoadOptions::default()).unwrap();
        // four data lines in the file, the totals line is removed
        assert_eq!(frame.len(), 3);
        assert_eq!(frame.column(Measure::GrossSale).unwrap(), &[100.0, 200.0, 150.0]);
        assert_eq!(frame.dates()[2], NaiveDate::from_ymd_opt(2018, 2, 3).unwrap());
        assert!(frame.has_calendar());
    }

    #[test]
    fn test_semicolon_export_with_decimal_commas() {
        let text = "Date;zn;sb;tax;marza\n05.01.2018;50,5;100,25;10;39,5\n31.12.2018;1;1;1;1\n";
        let frame = parse(text, &SourceSchema::day_sell(), LoadOptions::default()).unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.column(Measure::NetPurchase).unwrap(), &[50.5]);
        assert_eq!(frame.column(Measure::GrossSale).unwrap(), &[100.25]);
    }

    #[test]
    fn test_bad_date_reports_line() {
        let text = "Date,zn,sb,tax,marza\n05.01.2018,1,1,1,1\nnot-a-date,1,1,1,1\nx,1,1,1,1\n";
        let err = parse(text, &SourceSchema::day_sell(), LoadOptions::default()).unwrap_err();
        match err {
            AppError::Parse { row, .. } => assert_eq!(row, 3),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_product_columns_dropped_by_name() {
        let text = "\
data,id,grupa,nazwa,ilosc,pmarza,zn_c,zn_w,pudzmarza,pce_sb,sb_c,pwa_sb,sb_w,pudzsb,pmarzajedn,pkwmarza
01.03.2018,17,Wine,Merlot,2,9,10,20,9,9,15,9,30,9,9,9
02.03.2018,18,Beer,Lager,6,9,1,6,9,9,2,9,12,9,9,9
";
        let frame = parse(text, &SourceSchema::product_sales(), LoadOptions::default()).unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.column(Measure::NetPurchaseValue).unwrap(), &[20.0, 6.0]);
        assert_eq!(frame.column(Measure::NetSaleValue).unwrap(), &[30.0, 12.0]);
        let names: Vec<_> = frame
            .text_column(Category::ProductName)
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(names, vec!["Merlot", "Lager"]);
    }

    #[test]
    fn test_headerless_product_export() {
        let text = "\
01.03.2018,17,Wine,Merlot,2,9,10,20,9,9,15,9,30,9,9,9
02.03.2018,18,Beer,Lager,6,9,1,6,9,9,2,9,12,9,9,9
";
        let options = LoadOptions {
            has_header: false,
            ..LoadOptions::default()
        };
        let frame = parse(text, &SourceSchema::product_sales(), options).unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.column(Measure::NetPurchasePrice).unwrap(), &[10.0, 1.0]);
        assert_eq!(frame.column(Measure::NetPurchaseValue).unwrap(), &[20.0, 6.0]);
        assert_eq!(frame.column(Measure::NetSalePrice).unwrap(), &[15.0, 2.0]);
        assert_eq!(frame.column(Measure::NetSaleValue).unwrap(), &[30.0, 12.0]);
        assert_eq!(
            frame,
            parse(
                &format!(
                    "data,id,grupa,nazwa,ilosc,pmarza,zn_c,zn_w,pudzmarza,pce_sb,sb_c,pwa_sb,sb_w,pudzsb,pmarzajedn,pkwmarza\n{}",
                    text
                ),
                &SourceSchema::product_sales(),
                LoadOptions::default()
            )
            .unwrap()
        );
    }

    #[test]
    fn test_product_missing_drop_column() {
        let text = "data,id,grupa\n01.03.2018,1,Wine\n";
        let err = parse(text, &SourceSchema::product_sales(), LoadOptions::default()).unwrap_err();
        assert!(matches!(err, AppError::MissingColumn(_)));
    }

    #[test]
    fn test_latin1_decoding() {
        let bytes = b"Caf\xe9";
        assert_eq!(decode(bytes, EncodingSetting::Latin1).unwrap(), "Café");
        assert!(decode(bytes, EncodingSetting::Utf8).is_err());
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2018, 12, 24);
        assert_eq!(parse_date("24.12.2018"), expected);
        assert_eq!(parse_date("24/12/2018"), expected);
        assert_eq!(parse_date("2018-12-24"), expected);
        assert_eq!(parse_date("24.12.2018 00:00:00"), expected);
        assert_eq!(parse_date("12.24.2018"), None);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let err = load(
            Path::new("/nonexistent/day_sell.csv"),
            &SourceSchema::day_sell(),
            LoadOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Load(_)));
    }
}
