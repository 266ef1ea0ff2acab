//! Three-column sweep file parser.
//!
//! One measurement per row: `frequency  value1  value2`, separated by
//! whitespace or commas. By default the value columns are the literal real
//! and imaginary parts of S21; a polar reading must be requested explicitly.
//!
//! Lines that are blank or start with `!`, `#`, `%` or `;` are skipped, and a
//! trailing `! comment` on a data row is ignored.

use crate::error::ParseError;
use lib_types::{
    measurement::{DataFormat, Measurement},
    units::FrequencyUnit,
};
use nom::{
    branch::alt,
    character::complete::{char, space0, space1},
    combinator::{opt, rest, value},
    multi::separated_list1,
    number::complete::double,
    sequence::preceded,
    IResult, Parser,
};
use std::path::Path;

/// How to read the numeric columns of a sweep file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Interpretation of the two value columns.
    pub format: DataFormat,

    /// Unit of the frequency column.
    pub unit: FrequencyUnit,
}

/// Parse a column file from a string.
pub fn parse_columns(content: &str, options: &LoadOptions) -> Result<Measurement, ParseError> {
    let mut measurement = Measurement::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        if is_comment_or_blank(line) {
            continue;
        }

        let values = parse_row(line, line_no)?;
        if values.len() != 3 {
            return Err(ParseError::syntax(
                line_no,
                1,
                format!(
                    "expected 3 columns (frequency, value1, value2), found {}",
                    values.len()
                ),
            ));
        }

        measurement.add_point(
            options.unit.to_hertz(values[0]),
            options.format.to_complex(values[1], values[2]),
        );
    }

    if measurement.is_empty() {
        return Err(ParseError::invalid_format("column", "no data rows found"));
    }

    tracing::debug!(
        "Parsed {} rows ({:?}, {})",
        measurement.len(),
        options.format,
        options.unit
    );

    Ok(measurement)
}

/// Parse a column file from a path.
pub fn parse_columns_file(path: &Path, options: &LoadOptions) -> Result<Measurement, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_columns(&content, options)
}

fn is_comment_or_blank(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with(['!', '#', '%', ';'])
}

/// Parse one row of numbers, reporting the 1-based column of any failure.
pub(crate) fn parse_row(line: &str, line_no: usize) -> Result<Vec<f64>, ParseError> {
    let column_of = |remaining: &str| line.len() - remaining.len() + 1;

    match numeric_row(line) {
        Ok(("", values)) => Ok(values),
        Ok((remaining, _)) => {
            let preview: String = remaining.chars().take(20).collect();
            Err(ParseError::syntax(
                line_no,
                column_of(remaining),
                format!("unexpected text '{}'", preview),
            ))
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(ParseError::syntax(
            line_no,
            column_of(e.input),
            "expected a number",
        )),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::syntax(
            line_no,
            line.len() + 1,
            "incomplete row",
        )),
    }
}

// ============================================================================
// Nom Parsers (nom 8 compatible)
// ============================================================================

fn numeric_row(input: &str) -> IResult<&str, Vec<f64>> {
    let (input, _) = space0(input)?;
    let (input, values) = separated_list1(column_separator, double).parse(input)?;
    let (input, _) = space0(input)?;
    let (input, _) = opt(preceded(char('!'), rest)).parse(input)?;
    Ok((input, values))
}

fn column_separator(input: &str) -> IResult<&str, ()> {
    alt((
        value((), (space0, char(','), space0)),
        value((), space1),
    ))
    .parse(input)
}
