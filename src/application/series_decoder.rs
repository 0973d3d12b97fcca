// Series decoder - Projects raw batches onto the selected channels
use crate::application::series_fetcher::RawBatch;
use crate::domain::telemetry::{Point, Series};
use crate::domain::topic::SlotSelection;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("failed to decode batch: {0}")]
pub struct DecodeError(pub String);

type Record = Map<String, Value>;

/// Decode one batch into one series per slot, in slot order.
///
/// Two response shapes are understood:
/// - legacy `{ "data": [{ "usec", "payload": "<json>" }, ...] }` where every
///   record carries all fields of a composite topic;
/// - multi-field `{ "<field id>": [{ "usec", "value" }, ...], ... }`.
///
/// Entries may be JSON-encoded strings or plain objects. Any malformed entry
/// rejects the whole batch. Missing fields are skipped, so series lengths can
/// differ. Inactive slots and unknown ids yield empty series.
pub fn decode(raw: &RawBatch, slots: &[Option<SlotSelection>]) -> Result<Vec<Series>, DecodeError> {
    if slots.iter().all(Option::is_none) {
        return Ok(vec![Series::default(); slots.len()]);
    }

    match raw {
        Value::Object(body) if body.contains_key("data") => decode_legacy(body, slots),
        Value::Object(body) => decode_multi_field(body, slots),
        other => Err(DecodeError(format!(
            "expected a JSON object, got {}",
            type_name(other)
        ))),
    }
}

fn decode_legacy(body: &Record, slots: &[Option<SlotSelection>]) -> Result<Vec<Series>, DecodeError> {
    let entries = body
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| DecodeError("`data` is not an array".to_string()))?;

    let records = entries
        .iter()
        .map(legacy_record)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(slots
        .iter()
        .map(|slot| match slot {
            Some(selection) => project(&records, selection),
            None => Series::default(),
        })
        .collect())
}

fn decode_multi_field(body: &Record, slots: &[Option<SlotSelection>]) -> Result<Vec<Series>, DecodeError> {
    let mut out = Vec::with_capacity(slots.len());

    for slot in slots {
        let Some(selection) = slot else {
            out.push(Series::default());
            continue;
        };

        let entries = match body.get(&selection.channel.key) {
            None | Some(Value::Null) => {
                tracing::debug!(field = %selection.channel.key, "Field absent from response");
                out.push(Series::default());
                continue;
            }
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                return Err(DecodeError(format!(
                    "field `{}` is {}, expected an array",
                    selection.channel.key,
                    type_name(other)
                )));
            }
        };

        let records = entries
            .iter()
            .map(|entry| to_record(entry).and_then(|r| usec_of(&r).map(|usec| (usec, r))))
            .collect::<Result<Vec<_>, _>>()?;

        out.push(project(&records, selection));
    }

    Ok(out)
}

/// A legacy entry is `{usec, payload}` with the payload encoded or inline,
/// or the record itself. The payload's own `usec` wins over the envelope's.
fn legacy_record(entry: &Value) -> Result<(i64, Record), DecodeError> {
    let envelope = to_record(entry)?;

    let record = match envelope.get("payload") {
        Some(payload) => to_record(payload)?,
        None => envelope.clone(),
    };

    let usec = usec_of(&record).or_else(|_| usec_of(&envelope))?;
    Ok((usec, record))
}

fn to_record(value: &Value) -> Result<Record, DecodeError> {
    match value {
        Value::Object(map) => Ok(map.clone()),
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(DecodeError(format!(
                "encoded payload is {}, expected an object",
                type_name(&other)
            ))),
            Err(e) => Err(DecodeError(format!("invalid encoded payload: {}", e))),
        },
        other => Err(DecodeError(format!(
            "entry is {}, expected an object",
            type_name(other)
        ))),
    }
}

fn usec_of(record: &Record) -> Result<i64, DecodeError> {
    record
        .get("usec")
        .and_then(Value::as_i64)
        .ok_or_else(|| DecodeError("entry without integer `usec`".to_string()))
}

fn project(records: &[(i64, Record)], selection: &SlotSelection) -> Series {
    let points = records
        .iter()
        .filter_map(|(usec, record)| {
            selection
                .kind
                .extract(&selection.channel, record)
                .map(|y| Point::new(*usec, y))
        })
        .collect();
    Series::new(points)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
