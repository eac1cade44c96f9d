//! Tabbed text conversion
//!
//! The table has a header row followed by one row per record. Cells are
//! separated by tabs and rows end with CRLF. Cells holding a tab, quote or
//! line break are quoted. Trigger codes are stored densely, one
//! `FrameDataNNN` column per frame.

use crate::{Error, Result};
use animdata_core::{ActionTriggers, Record, ValidationError, FRAME_MAX};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::num::IntErrorKind;

const COF_NAME: &str = "CofName";
const FRAMES_PER_DIRECTION: &str = "FramesPerDirection";
const ANIMATION_SPEED: &str = "AnimationSpeed";

fn frame_data_column(frame: usize) -> String {
    format!("FrameData{:03}", frame)
}

/// Converts records to tabbed text
pub fn records_to_txt(records: &[Record]) -> Result<String> {
    let mut buffer = Vec::new();
    write_txt(records, &mut buffer)?;
    // Every cell is ASCII or a decimal number
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Writes records as tabbed text
pub fn write_txt<W: Write>(records: &[Record], writer: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .terminator(csv::Terminator::CRLF)
        .from_writer(writer);

    let mut header = vec![
        COF_NAME.to_string(),
        FRAMES_PER_DIRECTION.to_string(),
        ANIMATION_SPEED.to_string(),
    ];
    header.extend((0..FRAME_MAX).map(frame_data_column));
    writer.write_record(&header)?;

    for record in records {
        let mut row = vec![
            record.cof_name().to_string(),
            record.frames_per_direction().to_string(),
            record.animation_speed().to_string(),
        ];
        row.extend(
            record
                .triggers()
                .to_dense_codes()
                .iter()
                .map(|code| code.to_string()),
        );
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Reads records from tabbed text.
///
/// Columns are located by their header names, so their order is free and
/// unknown columns are ignored. Empty input yields no records.
pub fn read_txt<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    let column_names: Vec<&str> = headers.iter().collect();
    let columns = Columns::locate(&column_names)?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let cells = result?;
        let cells: Vec<&str> = cells.iter().collect();
        let record = RowReader {
            row,
            cells: &cells,
            column_names: &column_names,
        }
        .read_record(&columns)?;
        records.push(record);
    }
    Ok(records)
}

/// Parses records from tabbed text
pub fn records_from_txt(txt: &str) -> Result<Vec<Record>> {
    read_txt(txt.as_bytes())
}

/// Column indices of every field, resolved from the header row
struct Columns {
    cof_name: usize,
    frames_per_direction: usize,
    animation_speed: usize,
    frame_data: Vec<usize>,
}

impl Columns {
    fn locate(column_names: &[&str]) -> Result<Self> {
        let indices: HashMap<&str, usize> = column_names
            .iter()
            .enumerate()
            .map(|(index, &name)| (name, index))
            .collect();

        let index_of = |name: &str| {
            indices
                .get(name)
                .copied()
                .ok_or_else(|| Error::MissingColumn {
                    column_name: name.to_string(),
                })
        };

        Ok(Self {
            cof_name: index_of(COF_NAME)?,
            frames_per_direction: index_of(FRAMES_PER_DIRECTION)?,
            animation_speed: index_of(ANIMATION_SPEED)?,
            frame_data: (0..FRAME_MAX)
                .map(|frame| index_of(&frame_data_column(frame)))
                .collect::<Result<_>>()?,
        })
    }
}

struct RowReader<'a> {
    row: usize,
    cells: &'a [&'a str],
    column_names: &'a [&'a str],
}

impl RowReader<'_> {
    fn read_record(&self, columns: &Columns) -> Result<Record> {
        let cof_name = self.cell(columns.cof_name)?;
        let frames_per_direction = self.u32_cell(columns.frames_per_direction)?;
        let animation_speed = self.u32_cell(columns.animation_speed)?;

        let mut codes = [0u8; FRAME_MAX];
        for (code, &column) in codes.iter_mut().zip(&columns.frame_data) {
            let value = self.int_cell(column)?;
            *code = u8::try_from(value)
                .map_err(|_| self.invalid(Some(column), ValidationError::CodeOutOfRange(value)))?;
        }
        let triggers =
            ActionTriggers::from_dense_codes(&codes).map_err(|source| self.invalid(None, source))?;

        Record::new(cof_name, frames_per_direction, animation_speed, triggers)
            .map_err(|source| self.invalid(Some(columns.cof_name), source))
    }

    fn column_name(&self, column: usize) -> String {
        self.column_names[column].to_string()
    }

    fn cell(&self, column: usize) -> Result<&str> {
        self.cells
            .get(column)
            .copied()
            .ok_or_else(|| Error::MissingCell {
                row: self.row,
                column,
                column_name: self.column_name(column),
            })
    }

    /// Parses an integer cell. Values past the `i128` range saturate so they
    /// surface as range errors.
    fn int_cell(&self, column: usize) -> Result<i128> {
        let value = self.cell(column)?;
        match value.trim().parse::<i128>() {
            Ok(value) => Ok(value),
            Err(err) => match err.kind() {
                IntErrorKind::PosOverflow => Ok(i128::MAX),
                IntErrorKind::NegOverflow => Ok(i128::MIN),
                _ => Err(Error::NotAnInteger {
                    row: self.row,
                    column,
                    column_name: self.column_name(column),
                    value: value.to_string(),
                }),
            },
        }
    }

    fn u32_cell(&self, column: usize) -> Result<u32> {
        let value = self.int_cell(column)?;
        u32::try_from(value).map_err(|_| {
            let field = match self.column_names[column] {
                FRAMES_PER_DIRECTION => "frames_per_direction",
                _ => "animation_speed",
            };
            self.invalid(
                Some(column),
                ValidationError::FieldOutOfRange { field, value },
            )
        })
    }

    fn invalid(&self, column: Option<usize>, source: ValidationError) -> Error {
        Error::InvalidField {
            row: self.row,
            column_name: column.map(|column| self.column_name(column)),
            source,
        }
    }
}
