//! AnimData record model

use crate::hash::bucket_of;
use crate::triggers::FRAME_MAX;
use crate::{ActionTriggers, ValidationError};
use serde_json::{Map, Value};
use std::num::IntErrorKind;

/// Maximum length of a COF name. The binary field is one byte longer to hold
/// the terminator.
pub const COF_NAME_MAX: usize = 7;

/// Metadata for a single animation sequence, keyed by COF name.
///
/// Every field is validated when it is assigned, including at construction.
/// A failed assignment leaves the record unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    cof_name: String,
    frames_per_direction: u32,
    animation_speed: u32,
    triggers: ActionTriggers,
}

impl Record {
    /// Creates a new record, validating the COF name
    pub fn new(
        cof_name: impl Into<String>,
        frames_per_direction: u32,
        animation_speed: u32,
        triggers: ActionTriggers,
    ) -> Result<Self, ValidationError> {
        let cof_name = cof_name.into();
        validate_cof_name(&cof_name)?;
        Ok(Self {
            cof_name,
            frames_per_direction,
            animation_speed,
            triggers,
        })
    }

    pub fn cof_name(&self) -> &str {
        &self.cof_name
    }

    /// Replaces the COF name. Names must be 1 to 7 ASCII characters without NUL.
    pub fn set_cof_name(&mut self, cof_name: impl Into<String>) -> Result<(), ValidationError> {
        let cof_name = cof_name.into();
        validate_cof_name(&cof_name)?;
        self.cof_name = cof_name;
        Ok(())
    }

    pub fn frames_per_direction(&self) -> u32 {
        self.frames_per_direction
    }

    pub fn set_frames_per_direction(&mut self, frames_per_direction: u32) {
        self.frames_per_direction = frames_per_direction;
    }

    pub fn animation_speed(&self) -> u32 {
        self.animation_speed
    }

    pub fn set_animation_speed(&mut self, animation_speed: u32) {
        self.animation_speed = animation_speed;
    }

    pub fn triggers(&self) -> &ActionTriggers {
        &self.triggers
    }

    /// Mutable access to the trigger map. Its own methods keep it valid.
    pub fn triggers_mut(&mut self) -> &mut ActionTriggers {
        &mut self.triggers
    }

    pub fn set_triggers(&mut self, triggers: ActionTriggers) {
        self.triggers = triggers;
    }

    /// Bucket this record belongs to in the binary container
    pub fn bucket(&self) -> u8 {
        bucket_of(self.cof_name.as_bytes())
    }

    /// Converts the record into a plain JSON-like value.
    ///
    /// Trigger frames become string keys, since that is how a JSON object keys
    /// its entries.
    pub fn to_plain_map(&self) -> Value {
        let triggers: Map<String, Value> = self
            .triggers
            .iter()
            .map(|(frame, code)| (frame.to_string(), Value::from(code)))
            .collect();

        let mut map = Map::new();
        map.insert("name".into(), Value::from(self.cof_name.as_str()));
        map.insert(
            "frames_per_direction".into(),
            Value::from(self.frames_per_direction),
        );
        map.insert("animation_speed".into(), Value::from(self.animation_speed));
        map.insert("triggers".into(), Value::Object(triggers));
        Value::Object(map)
    }

    /// Builds a record from a plain value produced by [`Record::to_plain_map`]
    /// or parsed from another format.
    ///
    /// Trigger keys may be integer-valued strings (`"7"`) as well as numbers.
    /// The name is read from `name`, or from `cof_name` when `name` is absent.
    pub fn from_plain_map(value: &Value) -> Result<Self, ValidationError> {
        let map = value.as_object().ok_or(ValidationError::WrongType {
            field: "record",
            expected: "object",
        })?;

        let cof_name = map
            .get("name")
            .or_else(|| map.get("cof_name"))
            .ok_or(ValidationError::MissingField("name"))?
            .as_str()
            .ok_or(ValidationError::WrongType {
                field: "name",
                expected: "string",
            })?;
        let frames_per_direction = u32_field(map, "frames_per_direction")?;
        let animation_speed = u32_field(map, "animation_speed")?;

        let trigger_map = field(map, "triggers")?
            .as_object()
            .ok_or(ValidationError::WrongType {
                field: "triggers",
                expected: "object",
            })?;

        let mut triggers = ActionTriggers::new();
        for (key, code) in trigger_map {
            let frame = parse_frame_key(key)?;
            let code = code
                .as_i64()
                .map(i128::from)
                .or_else(|| code.as_u64().map(i128::from))
                .ok_or(ValidationError::WrongType {
                    field: "triggers",
                    expected: "integer trigger code",
                })?;
            let code = u8::try_from(code).map_err(|_| ValidationError::CodeOutOfRange(code))?;
            triggers.set(frame, code)?;
        }

        Self::new(cof_name, frames_per_direction, animation_speed, triggers)
    }
}

/// Checks that a COF name fits the 8-byte, NUL-terminated binary field
pub fn validate_cof_name(cof_name: &str) -> Result<(), ValidationError> {
    if !cof_name.is_ascii() {
        return Err(ValidationError::NameNotAscii(cof_name.to_string()));
    }
    if cof_name.is_empty() || cof_name.len() > COF_NAME_MAX {
        return Err(ValidationError::NameLength(cof_name.to_string()));
    }
    if cof_name.contains('\0') {
        return Err(ValidationError::NameHasNul(cof_name.to_string()));
    }
    Ok(())
}

fn field<'a>(map: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, ValidationError> {
    map.get(name).ok_or(ValidationError::MissingField(name))
}

fn u32_field(map: &Map<String, Value>, name: &'static str) -> Result<u32, ValidationError> {
    let value = field(map, name)?;
    let out_of_range = |value: i128| ValidationError::FieldOutOfRange { field: name, value };

    if let Some(value) = value.as_u64() {
        u32::try_from(value).map_err(|_| out_of_range(value as i128))
    } else if let Some(value) = value.as_i64() {
        Err(out_of_range(value as i128))
    } else {
        Err(ValidationError::WrongType {
            field: name,
            expected: "integer",
        })
    }
}

fn parse_frame_key(key: &str) -> Result<usize, ValidationError> {
    let frame = match key.trim().parse::<i128>() {
        Ok(frame) => frame,
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => i128::MAX,
            IntErrorKind::NegOverflow => i128::MIN,
            _ => return Err(ValidationError::FrameKey(key.to_string())),
        },
    };
    usize::try_from(frame)
        .ok()
        .filter(|&frame| frame < FRAME_MAX)
        .ok_or(ValidationError::FrameOutOfRange(frame))
}
