//! FIT activity decoding.
//!
//! Container parsing (header validation, CRC integrity, field definitions)
//! is delegated to `fitparser`; this module folds its loosely typed output
//! into the explicit message structs the rest of the crate consumes.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::Utc;
use fitparser::profile::MesgNum;
use fitparser::{FitDataRecord, Value};
use flate2::read::GzDecoder;
use log::debug;

use crate::track::{FitMessages, RecordMessage};
use crate::{Error, Result};

/// Reads and decodes a FIT activity file.
///
/// Files ending in `.gz` (Strava exports ship activities as `.fit.gz`) are
/// decompressed transparently. A decode failure means the input is not a
/// FIT file or failed its integrity check; nothing is extracted from it.
pub fn read_fit_file(path: &Path) -> Result<FitMessages> {
    let bytes = read_raw(path)?;
    let records =
        fitparser::from_bytes(&bytes).map_err(|e| Error::FitDecode(e.to_string()))?;
    Ok(fold_messages(records))
}

fn read_raw(path: &Path) -> Result<Vec<u8>> {
    let io_error = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(io_error)?;
    let mut bytes = Vec::new();

    let gzipped = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    if gzipped {
        GzDecoder::new(file).read_to_end(&mut bytes).map_err(io_error)?;
    } else {
        file.read_to_end(&mut bytes).map_err(io_error)?;
    }

    Ok(bytes)
}

fn fold_messages(records: Vec<FitDataRecord>) -> FitMessages {
    let mut messages = FitMessages::default();

    for record in &records {
        match record.kind() {
            MesgNum::Record => messages.records.push(record_message(record)),
            MesgNum::Sport => {
                if messages.sport.is_none() {
                    messages.sport = sport_name(record);
                }
            }
            _ => {} // ignore other message categories
        }
    }

    debug!(
        "decoded {} record messages, sport {:?}",
        messages.records.len(),
        messages.sport
    );
    messages
}

fn record_message(record: &FitDataRecord) -> RecordMessage {
    let mut message = RecordMessage::default();

    for field in record.fields() {
        match field.name() {
            "position_lat" => message.position_lat = coordinate_value(field.value()),
            "position_long" => message.position_long = coordinate_value(field.value()),
            "enhanced_altitude" => message.enhanced_altitude = float_value(field.value()),
            "altitude" => {
                // only a fallback; enhanced_altitude wins when both exist
                if message.enhanced_altitude.is_none() {
                    message.enhanced_altitude = float_value(field.value());
                }
            }
            "timestamp" => {
                if let Value::Timestamp(t) = field.value() {
                    message.timestamp = Some(t.with_timezone(&Utc));
                }
            }
            _ => {} // ignore other fields
        }
    }

    message
}

fn sport_name(record: &FitDataRecord) -> Option<String> {
    record
        .fields()
        .iter()
        .find_map(|field| match (field.name(), field.value()) {
            ("sport", Value::String(name)) => Some(name.clone()),
            _ => None,
        })
}

fn coordinate_value(value: &Value) -> Option<i32> {
    match value {
        Value::SInt32(v) => Some(*v),
        _ => None,
    }
}

fn float_value(value: &Value) -> Option<f64> {
    match value {
        Value::Float64(v) => Some(*v),
        Value::Float32(v) => Some(f64::from(*v)),
        Value::UInt32(v) => Some(f64::from(*v)),
        Value::SInt32(v) => Some(f64::from(*v)),
        Value::UInt16(v) => Some(f64::from(*v)),
        Value::SInt16(v) => Some(f64::from(*v)),
        _ => None,
    }
}
