//! Touchstone 1.0 reader for transmission sweeps.
//!
//! Supports:
//! - 1-port (.s1p) and 2-port (.s2p) files
//! - All data formats: RI, MA, DB
//! - Frequency units: Hz, kHz, MHz, GHz
//!
//! A 2-port file yields its S21 trace. A 1-port file only has S11, which is
//! returned with a warning so reflection sweeps can still be inspected.
//!
//! Reference: Touchstone File Format Specification, Version 1.1

use crate::columns::parse_row;
use crate::error::ParseError;
use lib_types::{
    measurement::{DataFormat, Measurement},
    units::FrequencyUnit,
};
use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, space0, space1},
    combinator::{opt, rest, value},
    multi::many0,
    number::complete::double,
    sequence::preceded,
    IResult, Parser,
};
use std::path::Path;

/// Parsed Touchstone file.
#[derive(Clone, Debug)]
pub struct TouchstoneFile {
    /// Number of ports.
    pub num_ports: usize,

    /// Data format (RI, MA, DB).
    pub format: DataFormat,

    /// Frequency unit from the option line.
    pub unit: FrequencyUnit,

    /// Network parameter type (S, Y, Z, H, G).
    pub param_type: char,

    /// Reference impedance in ohms.
    pub z0: f64,

    /// The extracted transmission (or 1-port reflection) trace.
    pub measurement: Measurement,
}

impl TouchstoneFile {
    /// Get the measurement.
    pub fn into_measurement(self) -> Measurement {
        self.measurement
    }
}

/// Parse a Touchstone file from a string.
pub fn parse_touchstone(content: &str) -> Result<TouchstoneFile, ParseError> {
    let mut options: Option<OptionsLine> = None;
    let mut values: Vec<f64> = Vec::new();
    let mut first_row_len = None;

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim_start();

        if trimmed.is_empty() || trimmed.starts_with('!') {
            continue;
        }

        if trimmed.starts_with('#') {
            if options.is_some() {
                tracing::warn!("Ignoring repeated option line at line {}", line_no);
                continue;
            }
            let (_, parsed) = parse_options_line(line)
                .map_err(|_| ParseError::syntax(line_no, 1, "malformed option line"))?;
            options = Some(parsed);
            continue;
        }

        let row = parse_row(line, line_no)?;
        first_row_len.get_or_insert(row.len());
        values.extend(row);
    }

    let options = options.ok_or_else(|| {
        ParseError::invalid_format("Touchstone", "missing '#' option line")
    })?;

    let num_ports = match first_row_len {
        Some(3) => 1,
        Some(9) => 2,
        Some(n) => {
            return Err(ParseError::invalid_format(
                "Touchstone",
                format!(
                    "{} values per row; only 1-port (3) and 2-port (9) files are supported",
                    n
                ),
            ))
        }
        None => {
            return Err(ParseError::invalid_format("Touchstone", "no data lines found"));
        }
    };

    if options.param_type != 'S' {
        return Err(ParseError::invalid_value(
            "parameter type",
            format!("expected S-parameters, got {}", options.param_type),
        ));
    }

    let measurement = extract_trace(&options, &values, num_ports)?;

    if num_ports == 1 {
        tracing::warn!("1-port Touchstone file: using S11, there is no transmission trace");
    }

    Ok(TouchstoneFile {
        num_ports,
        format: options.format,
        unit: options.unit,
        param_type: options.param_type,
        z0: options.z0,
        measurement,
    })
}

/// Parse a Touchstone file from a path.
pub fn parse_touchstone_file(path: &Path) -> Result<TouchstoneFile, ParseError> {
    let content = std::fs::read_to_string(path)?;
    let file = parse_touchstone(&content)?;

    // Verify port count matches extension
    if let Some(expected) = infer_ports_from_extension(path) {
        if file.num_ports != expected {
            tracing::warn!(
                "Port count mismatch: extension suggests {} ports, file has {}",
                expected,
                file.num_ports
            );
        }
    }

    Ok(file)
}

pub(crate) fn infer_ports_from_extension(path: &Path) -> Option<usize> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let digits = ext.strip_prefix('s')?.strip_suffix('p')?;
    digits.parse().ok()
}

/// Pull the transmission trace out of the flattened data values.
///
/// 2-port rows are `f S11 S21 S12 S22`, each parameter a value pair.
/// A trailing partial frequency point is an error.
fn extract_trace(
    options: &OptionsLine,
    values: &[f64],
    num_ports: usize,
) -> Result<Measurement, ParseError> {
    let values_per_freq = 1 + 2 * num_ports * num_ports;
    let offset = if num_ports == 2 { 3 } else { 1 };

    let remainder = values.len() % values_per_freq;
    if remainder != 0 {
        return Err(ParseError::invalid_format(
            "Touchstone",
            format!(
                "incomplete frequency point: {} trailing values, expected {} per point",
                remainder, values_per_freq
            ),
        ));
    }

    Ok(Measurement::from_points(values.chunks_exact(values_per_freq).map(|chunk| {
        (
            options.unit.to_hertz(chunk[0]),
            options.format.to_complex(chunk[offset], chunk[offset + 1]),
        )
    })))
}

// ============================================================================
// Nom Parsers (nom 8 compatible)
// ============================================================================

/// Options from the # line.
#[derive(Clone, Debug)]
struct OptionsLine {
    unit: FrequencyUnit,
    param_type: char, // S, Y, Z, H, G
    format: DataFormat,
    z0: f64,
}

impl Default for OptionsLine {
    fn default() -> Self {
        Self {
            unit: FrequencyUnit::GHz,
            param_type: 'S',
            format: DataFormat::MA,
            z0: 50.0,
        }
    }
}

fn parse_options_line(input: &str) -> IResult<&str, OptionsLine> {
    let (input, _) = space0(input)?;
    let (input, _) = char('#')(input)?;
    let (input, _) = space0(input)?;

    let mut options = OptionsLine::default();

    // Parse tokens in any order
    let (input, tokens) = many0(preceded(space0, parse_option_token)).parse(input)?;

    for token in tokens {
        match token {
            OptionToken::Unit(unit) => options.unit = unit,
            OptionToken::ParamType(t) => options.param_type = t,
            OptionToken::Format(f) => options.format = f,
            OptionToken::Z0(z) => options.z0 = z,
        }
    }

    let (input, _) = space0(input)?;
    let (input, _) = opt(preceded(char('!'), rest)).parse(input)?;

    Ok((input, options))
}

#[derive(Clone, Debug)]
enum OptionToken {
    Unit(FrequencyUnit),
    ParamType(char),
    Format(DataFormat),
    Z0(f64),
}

fn parse_option_token(input: &str) -> IResult<&str, OptionToken> {
    alt((parse_freq_unit, parse_format, parse_z0, parse_param_type)).parse(input)
}

fn parse_freq_unit(input: &str) -> IResult<&str, OptionToken> {
    alt((
        value(OptionToken::Unit(FrequencyUnit::KHz), tag_no_case("KHZ")),
        value(OptionToken::Unit(FrequencyUnit::MHz), tag_no_case("MHZ")),
        value(OptionToken::Unit(FrequencyUnit::GHz), tag_no_case("GHZ")),
        value(OptionToken::Unit(FrequencyUnit::Hz), tag_no_case("HZ")),
    ))
    .parse(input)
}

fn parse_param_type(input: &str) -> IResult<&str, OptionToken> {
    alt((
        value(OptionToken::ParamType('S'), tag_no_case("S")),
        value(OptionToken::ParamType('Y'), tag_no_case("Y")),
        value(OptionToken::ParamType('Z'), tag_no_case("Z")),
        value(OptionToken::ParamType('H'), tag_no_case("H")),
        value(OptionToken::ParamType('G'), tag_no_case("G")),
    ))
    .parse(input)
}

fn parse_format(input: &str) -> IResult<&str, OptionToken> {
    alt((
        value(OptionToken::Format(DataFormat::RI), tag_no_case("RI")),
        value(OptionToken::Format(DataFormat::MA), tag_no_case("MA")),
        value(OptionToken::Format(DataFormat::DB), tag_no_case("DB")),
    ))
    .parse(input)
}

fn parse_z0(input: &str) -> IResult<&str, OptionToken> {
    let (input, _) = tag_no_case("R")(input)?;
    let (input, _) = space1(input)?;
    let (input, z0) = double(input)?;
    Ok((input, OptionToken::Z0(z0)))
}
