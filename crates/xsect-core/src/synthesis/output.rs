//! Plain-text column output driven by a C-style row format such as `"%.12f %e"`.

use crate::domain::XsectError;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_ROW_FORMAT: &str = "%.12f %e";

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("format '{format}' ends inside a conversion")]
    Incomplete { format: String },
    #[error("format '{format}' has a width or precision above {limit}")]
    FieldTooWide { format: String, limit: usize },
    #[error("format '{format}' uses unsupported conversion '%{conversion}'")]
    UnsupportedConversion { format: String, conversion: char },
    #[error("format '{format}' has {expected} conversions but rows have {found} columns")]
    ColumnCount {
        format: String,
        expected: usize,
        found: usize,
    },
    #[error("columns differ in length: {first} vs {second}")]
    LengthMismatch { first: usize, second: usize },
    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl From<OutputError> for XsectError {
    fn from(error: OutputError) -> Self {
        let message = error.to_string();
        match error {
            OutputError::Write { .. } => Self::io_system("IO.OUTPUT", message),
            OutputError::LengthMismatch { .. } => Self::internal("RUN.OUTPUT", message),
            _ => Self::input_validation("INPUT.FORMAT", message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notation {
    Fixed,
    Exponent { upper: bool },
    General { upper: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Flags {
    left: bool,
    plus: bool,
    space: bool,
    zero: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Conversion {
    flags: Flags,
    width: usize,
    precision: Option<usize>,
    notation: Notation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Value(Conversion),
}

/// Parsed row format: literal text interleaved with `%f`, `%e`, `%E`, `%g`
/// or `%G` conversions, each with optional flags, width and precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFormat {
    source: String,
    pieces: Vec<Piece>,
}

impl Default for RowFormat {
    fn default() -> Self {
        Self {
            source: DEFAULT_ROW_FORMAT.to_string(),
            pieces: vec![
                Piece::Value(Conversion {
                    flags: Flags::default(),
                    width: 0,
                    precision: Some(12),
                    notation: Notation::Fixed,
                }),
                Piece::Literal(" ".to_string()),
                Piece::Value(Conversion {
                    flags: Flags::default(),
                    width: 0,
                    precision: None,
                    notation: Notation::Exponent { upper: false },
                }),
            ],
        }
    }
}

impl FromStr for RowFormat {
    type Err = OutputError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let incomplete = || OutputError::Incomplete {
            format: source.to_string(),
        };
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(character) = chars.next() {
            if character != '%' {
                literal.push(character);
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                literal.push('%');
                continue;
            }

            let mut flags = Flags::default();
            while let Some(&flag) = chars.peek() {
                match flag {
                    '-' => flags.left = true,
                    '+' => flags.plus = true,
                    ' ' => flags.space = true,
                    '0' => flags.zero = true,
                    _ => break,
                }
                chars.next();
            }
            let width = take_number(&mut chars, source)?.unwrap_or(0);
            let precision = if chars.peek() == Some(&'.') {
                chars.next();
                Some(take_number(&mut chars, source)?.unwrap_or(0))
            } else {
                None
            };
            let notation = match chars.next().ok_or_else(incomplete)? {
                'f' | 'F' => Notation::Fixed,
                'e' => Notation::Exponent { upper: false },
                'E' => Notation::Exponent { upper: true },
                'g' => Notation::General { upper: false },
                'G' => Notation::General { upper: true },
                conversion => {
                    return Err(OutputError::UnsupportedConversion {
                        format: source.to_string(),
                        conversion,
                    });
                }
            };

            if !literal.is_empty() {
                pieces.push(Piece::Literal(std::mem::take(&mut literal)));
            }
            pieces.push(Piece::Value(Conversion {
                flags,
                width,
                precision,
                notation,
            }));
        }
        if !literal.is_empty() {
            pieces.push(Piece::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            pieces,
        })
    }
}

/// Largest width or precision a conversion may request.
pub const MAX_FIELD_WIDTH: usize = 1024;

fn take_number(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    source: &str,
) -> Result<Option<usize>, OutputError> {
    let mut number: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|character| character.to_digit(10)) {
        let next = number
            .unwrap_or(0)
            .checked_mul(10)
            .and_then(|value| value.checked_add(digit as usize))
            .filter(|&value| value <= MAX_FIELD_WIDTH)
            .ok_or_else(|| OutputError::FieldTooWide {
                format: source.to_string(),
                limit: MAX_FIELD_WIDTH,
            })?;
        number = Some(next);
        chars.next();
    }
    Ok(number)
}

impl RowFormat {
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn conversions(&self) -> usize {
        self.pieces
            .iter()
            .filter(|piece| matches!(piece, Piece::Value(_)))
            .count()
    }

    pub fn format_row(&self, values: &[f64]) -> Result<String, OutputError> {
        if values.len() != self.conversions() {
            return Err(OutputError::ColumnCount {
                format: self.source.clone(),
                expected: self.conversions(),
                found: values.len(),
            });
        }

        let mut row = String::new();
        let mut values = values.iter();
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => row.push_str(text),
                Piece::Value(conversion) => {
                    if let Some(&value) = values.next() {
                        row.push_str(&conversion.render(value));
                    }
                }
            }
        }
        Ok(row)
    }
}

impl Conversion {
    fn render(&self, value: f64) -> String {
        let precision = self.precision.unwrap_or(6);
        let upper = matches!(
            self.notation,
            Notation::Exponent { upper: true } | Notation::General { upper: true }
        );

        let body = if !value.is_finite() {
            let text = if value.is_nan() { "nan" } else { "inf" };
            if upper {
                text.to_ascii_uppercase()
            } else {
                text.to_string()
            }
        } else {
            match self.notation {
                Notation::Fixed => format!("{:.*}", precision, value.abs()),
                Notation::Exponent { upper } => exponent_form(value.abs(), precision, upper),
                Notation::General { upper } => general_form(value.abs(), precision, upper),
            }
        };

        let sign = if value.is_sign_negative() && !value.is_nan() {
            "-"
        } else if self.flags.plus {
            "+"
        } else if self.flags.space {
            " "
        } else {
            ""
        };

        let length = sign.len() + body.len();
        if length >= self.width {
            return format!("{sign}{body}");
        }
        let padding = self.width - length;
        if self.flags.left {
            format!("{sign}{body}{}", " ".repeat(padding))
        } else if self.flags.zero && value.is_finite() {
            format!("{sign}{}{body}", "0".repeat(padding))
        } else {
            format!("{}{sign}{body}", " ".repeat(padding))
        }
    }
}

/// `d.ddde+XX` with at least two exponent digits.
fn exponent_form(value: f64, precision: usize, upper: bool) -> String {
    let rendered = format!("{:.*e}", precision, value);
    let (mantissa, exponent) = rendered.split_once('e').unwrap_or((rendered.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let mut text = String::with_capacity(mantissa.len() + 5);
    text.push_str(mantissa);
    text.push(if upper { 'E' } else { 'e' });
    text.push(if exponent < 0 { '-' } else { '+' });
    let _ = write!(text, "{:02}", exponent.abs());
    text
}

fn general_form(value: f64, precision: usize, upper: bool) -> String {
    let significant = precision.max(1);
    let probe = format!("{:.*e}", significant - 1, value);
    let exponent: i32 = probe
        .split_once('e')
        .and_then(|(_, exponent)| exponent.parse().ok())
        .unwrap_or(0);

    if exponent < -4 || exponent >= significant as i32 {
        let text = exponent_form(value, significant - 1, upper);
        match text.split_once(if upper { 'E' } else { 'e' }) {
            Some((mantissa, tail)) => {
                format!("{}{}{tail}", strip_zeros(mantissa), if upper { 'E' } else { 'e' })
            }
            None => text,
        }
    } else {
        let decimals = (significant as i32 - 1 - exponent).max(0) as usize;
        strip_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn strip_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Writes one formatted row per index of the two columns.
pub fn write_columns<W: Write>(
    writer: &mut W,
    format: &RowFormat,
    first: &[f64],
    second: &[f64],
) -> Result<(), std::io::Error> {
    for (&x, &y) in first.iter().zip(second) {
        let row = format
            .format_row(&[x, y])
            .map_err(|error| std::io::Error::new(std::io::ErrorKind::InvalidInput, error))?;
        writeln!(writer, "{row}")?;
    }
    Ok(())
}

pub fn save_columns(
    path: impl AsRef<Path>,
    format: &RowFormat,
    first: &[f64],
    second: &[f64],
) -> Result<(), OutputError> {
    if first.len() != second.len() {
        return Err(OutputError::LengthMismatch {
            first: first.len(),
            second: second.len(),
        });
    }
    if format.conversions() != 2 {
        return Err(OutputError::ColumnCount {
            format: format.as_str().to_string(),
            expected: format.conversions(),
            found: 2,
        });
    }

    let path = path.as_ref();
    let to_error = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(to_error)?;
    let mut writer = BufWriter::new(file);
    write_columns(&mut writer, format, first, second).map_err(to_error)?;
    writer.flush().map_err(to_error)
}
