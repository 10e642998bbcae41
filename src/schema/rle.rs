//! Run-length encoded (RLE) pattern descriptions.
//!
//! The format is the one used by most Life pattern collections:
//!
//! ```text
//! #N Glider
//! #O Richard K. Guy
//! #C The smallest, most common, and first discovered spaceship.
//! x = 3, y = 3, rule = B3/S23
//! bob$2bo$3o!
//! ```
//!
//! Metadata lines start with `#`, a single header line declares the bounding
//! box, and the remaining lines form one run-length string where `o` is a live
//! cell, `b` a dead cell, `$` ends a row and `!` ends the pattern.

use std::fs;
use std::path::Path;
use std::str::FromStr;

const DEFAULT_NAME: &str = "unknown";
const DEFAULT_RULE: &str = "23/3";

/// A decoded pattern: metadata plus a rectangular cell grid.
///
/// Patterns are immutable once decoded. Every row of [`Pattern::rows`] has
/// exactly [`Pattern::width`] cells and there are exactly
/// [`Pattern::height`] rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    name: String,
    comment: String,
    created_by: String,
    rule: String,
    width: usize,
    height: usize,
    data: Vec<Vec<bool>>,
}

/// Errors produced while decoding RLE text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("Unexpected line {line} before the pattern header: {text:?}")]
    UnexpectedLine { line: usize, text: String },
    #[error("Unexpected token {token:?} on line {line}, column {column}")]
    UnexpectedToken {
        token: char,
        line: usize,
        column: usize,
    },
    #[error("Run length on line {line} does not fit in a cell count")]
    RunLengthOverflow { line: usize },
    #[error("Pattern has no `x = .., y = ..` header line")]
    MissingHeader,
    #[error("Pattern dimensions must be non-zero, got {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    #[error("Encoded pattern has {actual} rows but the header declares {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Errors produced while loading a pattern from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Failed to read pattern file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Parsed `x = <w>, y = <h>[, rule = <rule>]` header line.
struct Header {
    width: usize,
    height: usize,
    rule: Option<String>,
}

impl Header {
    /// Parse a header line, returning `None` if the line is not a header.
    ///
    /// Whitespace around keys, values and separators is ignored. The rule is
    /// the leading run of word characters and `/` in the `rule` value, so
    /// suffixes such as `:P10,10` are dropped. Other fields are ignored.
    fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split(',');

        let width = parse_count(field_value(fields.next()?, "x")?)?;
        let height = parse_count(field_value(fields.next()?, "y")?)?;
        let rule = fields
            .next()
            .and_then(|field| field_value(field, "rule"))
            .map(rule_prefix)
            .filter(|rule| !rule.is_empty())
            .map(str::to_string);

        Some(Self {
            width,
            height,
            rule,
        })
    }
}

fn field_value<'a>(field: &'a str, key: &str) -> Option<&'a str> {
    let (name, value) = field.split_once('=')?;
    (name.trim() == key).then(|| value.trim())
}

fn parse_count(value: &str) -> Option<usize> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn rule_prefix(value: &str) -> &str {
    let end = value
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '/'))
        .unwrap_or(value.len());
    &value[..end]
}

impl Pattern {
    /// Decode a pattern from RLE text.
    pub fn decode(text: &str) -> Result<Self, FormatError> {
        let mut name = DEFAULT_NAME.to_string();
        let mut comment = String::new();
        let mut created_by = String::new();
        let mut rule = DEFAULT_RULE.to_string();
        let mut header: Option<(usize, usize)> = None;

        let mut body: Vec<BodyLine<'_>> = Vec::new();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim_end();
            if line.is_empty() {
                continue;
            }
            let number = index + 1;

            if let Some(rest) = line.strip_prefix("#C").or_else(|| line.strip_prefix("#c")) {
                if !comment.is_empty() {
                    comment.push('\n');
                }
                comment.push_str(rest.trim());
            } else if let Some(rest) = line.strip_prefix("#N") {
                name = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix("#O") {
                created_by = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix("#r") {
                rule = rest.trim().to_string();
            } else if line.starts_with('#') {
                log::debug!("Ignoring comment line: {line}");
            } else if let Some(parsed) = Header::parse(line) {
                rule = parsed.rule.unwrap_or_else(|| DEFAULT_RULE.to_string());
                header = Some((parsed.width, parsed.height));
            } else if header.is_some() {
                let text = line.trim_start();
                body.push(BodyLine {
                    number,
                    indent: line[..line.len() - text.len()].chars().count(),
                    text,
                });
            } else {
                return Err(FormatError::UnexpectedLine {
                    line: number,
                    text: line.to_string(),
                });
            }
        }

        let (width, height) = header.ok_or(FormatError::MissingHeader)?;
        if width == 0 || height == 0 {
            return Err(FormatError::InvalidDimensions { width, height });
        }

        let data = decode_rows(&body, width, height)?;
        if data.len() != height {
            return Err(FormatError::DimensionMismatch {
                expected: height,
                actual: data.len(),
            });
        }

        Ok(Self {
            name,
            comment,
            created_by,
            rule,
            width,
            height,
            data,
        })
    }

    /// Read and decode an RLE file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path)?;
        Ok(Self::decode(&text)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Comment lines, joined with `\n`.
    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    /// Rule string from the file. Informational only; evolution is always B3/S23.
    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of cells in the bounding box.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Cell rows, top to bottom.
    pub fn rows(&self) -> &[Vec<bool>] {
        &self.data
    }

    /// Cell state at `(x, y)`, or `None` outside the bounding box.
    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        self.data.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.data
            .iter()
            .map(|row| row.iter().filter(|&&alive| alive).count())
            .sum()
    }
}

impl FromStr for Pattern {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

/// One line of the run-length body, left-trimmed.
struct BodyLine<'a> {
    number: usize,
    /// Characters trimmed from the start of the source line.
    indent: usize,
    text: &'a str,
}

/// Expand the run-length body into rows normalized to `width` cells.
///
/// Rows are truncated while decoding, so oversized runs never allocate past
/// the bounding box.
fn decode_rows(
    body: &[BodyLine<'_>],
    width: usize,
    height: usize,
) -> Result<Vec<Vec<bool>>, FormatError> {
    let mut rows: Vec<Vec<bool>> = Vec::with_capacity(height);
    let mut row: Vec<bool> = Vec::with_capacity(width);
    let mut count: Option<usize> = None;
    let mut previous: Option<char> = None;

    'decode: for body_line in body {
        let line = body_line.number;
        for (column, token) in body_line.text.chars().enumerate() {
            match token {
                '0'..='9' => {
                    let digit = token as usize - '0' as usize;
                    let run = count
                        .unwrap_or(0)
                        .checked_mul(10)
                        .and_then(|run| run.checked_add(digit))
                        .ok_or(FormatError::RunLengthOverflow { line })?;
                    count = Some(run);
                }
                'o' | 'b' => {
                    let run = count.take().unwrap_or(1);
                    let room = width.saturating_sub(row.len());
                    row.extend(std::iter::repeat_n(token == 'o', run.min(room)));
                }
                '$' => {
                    let run = count.take().unwrap_or(1);
                    if run > 0 {
                        if rows.len() + run > height {
                            return Err(FormatError::DimensionMismatch {
                                expected: height,
                                actual: rows.len() + run,
                            });
                        }
                        rows.push(normalize(std::mem::take(&mut row), width));
                        rows.extend((1..run).map(|_| vec![false; width]));
                    }
                }
                '!' => {
                    if previous != Some('$') {
                        rows.push(normalize(std::mem::take(&mut row), width));
                    }
                    break 'decode;
                }
                other => {
                    return Err(FormatError::UnexpectedToken {
                        token: other,
                        line,
                        column: body_line.indent + column + 1,
                    });
                }
            }
            previous = Some(token);
        }
    }

    Ok(rows)
}

fn normalize(mut row: Vec<bool>, width: usize) -> Vec<bool> {
    row.resize(width, false);
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GLIDER: &str = "#N Glider
#O Richard K. Guy
#C The smallest, most common, and first discovered spaceship.
#C www.conwaylife.com/wiki/index.php?title=Glider
x = 3, y = 3, rule = B3/S23
bob$2bo$3o!";

    #[test]
    fn test_decode_glider() {
        let pattern = Pattern::decode(GLIDER).unwrap();

        assert_eq!(pattern.width(), 3);
        assert_eq!(pattern.height(), 3);
        assert_eq!(
            pattern.rows(),
            &[
                vec![false, true, false],
                vec![false, false, true],
                vec![true, true, true],
            ]
        );
        assert_eq!(pattern.population(), 5);
    }

    #[test]
    fn test_decode_metadata() {
        let pattern = Pattern::decode(GLIDER).unwrap();

        assert_eq!(pattern.name(), "Glider");
        assert_eq!(pattern.created_by(), "Richard K. Guy");
        assert_eq!(pattern.rule(), "B3/S23");
        assert_eq!(
            pattern.comment(),
            "The smallest, most common, and first discovered spaceship.\n\
             www.conwaylife.com/wiki/index.php?title=Glider"
        );
    }

    #[test]
    fn test_defaults_without_metadata() {
        let pattern = Pattern::decode("x=3,y=3\nbob$2bo$3o!").unwrap();

        assert_eq!(pattern.name(), "unknown");
        assert_eq!(pattern.created_by(), "");
        assert_eq!(pattern.comment(), "");
        assert_eq!(pattern.rule(), "23/3");
        assert_eq!(pattern.get(2, 2), Some(true));
        assert_eq!(pattern.get(3, 0), None);
    }

    #[test]
    fn test_lowercase_rule_line_and_header_override() {
        let pattern = Pattern::decode("#r 34/3\nx = 1, y = 1\no!").unwrap();
        // Header without a rule resets to the default
        assert_eq!(pattern.rule(), "23/3");

        let pattern = Pattern::decode("x = 1, y = 1\n#r 34/3\no!").unwrap();
        assert_eq!(pattern.rule(), "34/3");

        // Uppercase `#R` is an ignored comment
        let pattern = Pattern::decode("x = 1, y = 1\n#R 34/3\no!").unwrap();
        assert_eq!(pattern.rule(), "23/3");
    }

    #[test]
    fn test_header_rule_with_suffix() {
        let pattern = Pattern::decode("x = 3, y = 1, rule = B3/S23:P10,10\n3o!").unwrap();
        assert_eq!(pattern.rule(), "B3/S23");
        assert_eq!(pattern.population(), 3);

        let pattern = Pattern::decode("x = 3, y = 1, rule = :T10\n3o!").unwrap();
        assert_eq!(pattern.rule(), "23/3");
    }

    #[test]
    fn test_body_spans_lines() {
        let pattern = Pattern::decode("x = 3, y = 3\nbob$2b\no$3o!").unwrap();
        assert_eq!(pattern.rows()[1], vec![false, false, true]);
    }

    #[test]
    fn test_multi_digit_runs() {
        let pattern = Pattern::decode("x = 12, y = 1\n12o!").unwrap();
        assert_eq!(pattern.population(), 12);
    }

    #[test]
    fn test_row_end_repeat_inserts_blank_rows() {
        let pattern = Pattern::decode("x = 2, y = 4\n2o3$2o!").unwrap();

        assert_eq!(
            pattern.rows(),
            &[
                vec![true, true],
                vec![false, false],
                vec![false, false],
                vec![true, true],
            ]
        );
    }

    #[test]
    fn test_rows_padded_and_truncated() {
        let pattern = Pattern::decode("x = 3, y = 2\no$5o!").unwrap();

        assert_eq!(pattern.rows()[0], vec![true, false, false]);
        assert_eq!(pattern.rows()[1], vec![true, true, true]);
    }

    #[test]
    fn test_terminator_after_row_end_does_not_flush() {
        let pattern = Pattern::decode("x = 2, y = 2\n2o$2o$!").unwrap();
        assert_eq!(pattern.height(), 2);
        assert_eq!(pattern.population(), 4);
    }

    #[test]
    fn test_tokens_after_terminator_ignored() {
        let pattern = Pattern::decode("x = 1, y = 1\no!garbage").unwrap();
        assert_eq!(pattern.population(), 1);
    }

    #[test]
    fn test_rejects_body_before_header() {
        let err = Pattern::decode("#N Glider\nbob$2bo$3o!\nx = 3, y = 3").unwrap_err();

        assert_eq!(
            err,
            FormatError::UnexpectedLine {
                line: 2,
                text: "bob$2bo$3o!".to_string(),
            }
        );
    }

    #[test]
    fn test_rejects_unknown_token() {
        let err = Pattern::decode("x = 3, y = 3\nbob$\n2bo$3x!").unwrap_err();

        assert_eq!(
            err,
            FormatError::UnexpectedToken {
                token: 'x',
                line: 3,
                column: 6,
            }
        );
    }

    #[test]
    fn test_unknown_token_column_counts_indent() {
        let err = Pattern::decode("x = 3, y = 1\n   3x!").unwrap_err();

        assert_eq!(
            err,
            FormatError::UnexpectedToken {
                token: 'x',
                line: 2,
                column: 5,
            }
        );
    }

    #[test]
    fn test_rejects_dimension_mismatch() {
        let err = Pattern::decode("x = 3, y = 4\nbob$2bo$3o!").unwrap_err();
        assert_eq!(
            err,
            FormatError::DimensionMismatch {
                expected: 4,
                actual: 3,
            }
        );

        let err = Pattern::decode("x = 3, y = 2\nbob$2bo$3o!").unwrap_err();
        assert!(matches!(err, FormatError::DimensionMismatch { expected: 2, .. }));
    }

    #[test]
    fn test_rejects_missing_terminator_row() {
        // The final row is only emitted by `!`
        let err = Pattern::decode("x = 2, y = 2\n2o$2o").unwrap_err();
        assert!(matches!(err, FormatError::DimensionMismatch { actual: 1, .. }));
    }

    #[test]
    fn test_rejects_missing_or_empty_header() {
        assert_eq!(
            Pattern::decode("#N Nothing\n#C here").unwrap_err(),
            FormatError::MissingHeader
        );
        assert_eq!(
            Pattern::decode("x = 0, y = 3\n!").unwrap_err(),
            FormatError::InvalidDimensions {
                width: 0,
                height: 3
            }
        );
    }

    #[test]
    fn test_rejects_overflowing_run() {
        let err = Pattern::decode("x = 1, y = 1\n99999999999999999999999o!").unwrap_err();
        assert_eq!(err, FormatError::RunLengthOverflow { line: 2 });
    }

    #[test]
    fn test_from_str() {
        let pattern: Pattern = "x = 2, y = 2\n2o$2o!".parse().unwrap();
        assert_eq!(pattern.area(), 4);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(GLIDER.as_bytes()).unwrap();

        let pattern = Pattern::from_file(file.path()).unwrap();
        assert_eq!(pattern.name(), "Glider");

        let missing = Pattern::from_file(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(LoadError::Io(_))));
    }
}
