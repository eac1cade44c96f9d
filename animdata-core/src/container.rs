//! AnimData.D2 container serialization and deserialization
//!
//! The container is a hash table of 256 buckets laid out back to back. Each
//! bucket is a little-endian `u32` record count followed by that many
//! fixed-size record blocks:
//!
//! | field                  | size        |
//! |------------------------|-------------|
//! | COF name, NUL-padded   | 8 bytes     |
//! | frames per direction   | `u32`       |
//! | animation speed        | `u32`       |
//! | trigger code per frame | 144 x `u8`  |

use crate::hash::BUCKET_COUNT;
use crate::record::{validate_cof_name, COF_NAME_MAX};
use crate::triggers::FRAME_MAX;
use crate::{ActionTriggers, Error, Record, Result, ValidationError};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use std::io::{Cursor, Read, Write};

/// Size of the NUL-padded COF name field
const COF_NAME_FIELD_SIZE: usize = COF_NAME_MAX + 1;

/// Size of a bucket's record count field
const RECORD_COUNT_SIZE: usize = 4;

/// Size of one encoded record block
pub const RECORD_SIZE: usize = COF_NAME_FIELD_SIZE + 4 + 4 + FRAME_MAX;

/// Options for [`encode_with`]
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    /// Sort records by COF name before bucketing them. This only changes the
    /// order of records inside each bucket.
    pub sort: bool,
}

/// Decodes the contents of an AnimData.D2 file.
///
/// Records are returned in the order they appear in `data`, which is the
/// order [`encode`] reproduces. Any malformed field fails the whole call.
pub fn decode(data: &[u8]) -> Result<Vec<Record>> {
    let mut cursor = Cursor::new(data);
    let mut records = Vec::new();

    for bucket in 0..BUCKET_COUNT {
        let offset = cursor.position() as usize;
        let count = cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| Error::Truncated {
                offset,
                what: "record count",
            })?;

        let remaining = data.len() - cursor.position() as usize;
        if count as u64 * RECORD_SIZE as u64 > remaining as u64 {
            return Err(Error::CountOverflow {
                offset,
                bucket,
                count,
                remaining,
            });
        }

        for _ in 0..count {
            let offset = cursor.position() as usize;
            let record = read_record(&mut cursor, offset)?;

            let actual = record.bucket() as usize;
            if actual != bucket {
                return Err(Error::HashMismatch {
                    offset,
                    cof_name: record.cof_name().to_string(),
                    bucket,
                    hash: actual,
                });
            }
            records.push(record);
        }

        if count > 0 {
            debug!("Bucket {}: {} record(s)", bucket, count);
        }
    }

    let end = cursor.position() as usize;
    if end != data.len() {
        return Err(Error::TrailingData {
            offset: end,
            len: data.len(),
        });
    }

    Ok(records)
}

/// Reads a whole AnimData.D2 file from a reader and decodes it
pub fn read_from<R: Read>(mut reader: R) -> Result<Vec<Record>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    decode(&data)
}

/// Encodes records into AnimData.D2 layout, keeping their relative order
pub fn encode(records: &[Record]) -> Result<Vec<u8>> {
    encode_with(records, &EncodeOptions::default())
}

/// Encodes records into AnimData.D2 layout.
///
/// Each record goes into the bucket its COF name hashes to. Inside a bucket,
/// records keep their input order unless `options.sort` is set.
pub fn encode_with(records: &[Record], options: &EncodeOptions) -> Result<Vec<u8>> {
    let mut ordered: Vec<&Record> = records.iter().collect();
    if options.sort {
        ordered.sort_by(|a, b| a.cof_name().cmp(b.cof_name()));
    }

    let mut buckets: Vec<Vec<&Record>> = vec![Vec::new(); BUCKET_COUNT];
    for record in ordered {
        buckets[record.bucket() as usize].push(record);
    }

    let mut buffer =
        Vec::with_capacity(BUCKET_COUNT * RECORD_COUNT_SIZE + records.len() * RECORD_SIZE);
    for (index, bucket) in buckets.iter().enumerate() {
        let count = u32::try_from(bucket.len()).map_err(|_| Error::TooManyRecords {
            bucket: index,
            count: bucket.len(),
        })?;
        buffer.write_u32::<LittleEndian>(count)?;

        for record in bucket {
            write_record(&mut buffer, record)?;
        }
    }

    debug!(
        "Encoded {} record(s) into {} bytes",
        records.len(),
        buffer.len()
    );
    Ok(buffer)
}

/// Encodes records and writes them to a writer
pub fn write_to<W: Write>(records: &[Record], mut writer: W, options: &EncodeOptions) -> Result<()> {
    let buffer = encode_with(records, options)?;
    writer.write_all(&buffer)?;
    Ok(())
}

fn read_record(cursor: &mut Cursor<&[u8]>, offset: usize) -> Result<Record> {
    let truncated = |_| Error::Truncated {
        offset,
        what: "record",
    };
    let invalid = |source| Error::InvalidRecord { offset, source };

    let mut name_field = [0u8; COF_NAME_FIELD_SIZE];
    cursor.read_exact(&mut name_field).map_err(truncated)?;
    let frames_per_direction = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
    let animation_speed = cursor.read_u32::<LittleEndian>().map_err(truncated)?;
    let mut codes = [0u8; FRAME_MAX];
    cursor.read_exact(&mut codes).map_err(truncated)?;

    let cof_name = parse_cof_name(&name_field).map_err(invalid)?;
    let triggers = ActionTriggers::from_dense_codes(&codes).map_err(invalid)?;
    Record::new(cof_name, frames_per_direction, animation_speed, triggers).map_err(invalid)
}

/// Takes the bytes before the first NUL in the name field
fn parse_cof_name(field: &[u8]) -> std::result::Result<String, ValidationError> {
    let lossy = || String::from_utf8_lossy(field).into_owned();

    let end = field
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| ValidationError::NameLength(lossy()))?;
    let name = std::str::from_utf8(&field[..end])
        .map_err(|_| ValidationError::NameNotAscii(lossy()))?;
    validate_cof_name(name)?;
    Ok(name.to_string())
}

fn write_record<W: Write>(writer: &mut W, record: &Record) -> std::io::Result<()> {
    let mut name_field = [0u8; COF_NAME_FIELD_SIZE];
    let name = record.cof_name().as_bytes();
    name_field[..name.len()].copy_from_slice(name);

    writer.write_all(&name_field)?;
    writer.write_u32::<LittleEndian>(record.frames_per_direction())?;
    writer.write_u32::<LittleEndian>(record.animation_speed())?;
    writer.write_all(&record.triggers().to_dense_codes())?;
    Ok(())
}
