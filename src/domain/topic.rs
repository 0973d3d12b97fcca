// Topic domain model - sensor streams the user can select
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Human readable name shown in selectors
    pub name: String,
    /// Wire identifier used in requests and response keys
    pub value: String,
    /// Axis and legend label
    pub label: String,
}

impl Topic {
    pub fn new(name: &str, value: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            label: label.to_string(),
        }
    }

    pub fn kind(&self) -> TopicKind {
        TopicKind::from_wire(&self.value)
    }
}

/// How a topic's records are projected onto chart channels.
///
/// Composite topics (`temp`, `acc`, `water`) come from the legacy endpoint and
/// expose a fixed set of fields per record. Generic topics are single fields
/// served by the multi-field `latest` endpoint, keyed by their wire id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicKind {
    Temp,
    Accel,
    Water,
    Generic(String),
}

/// One projected field of a topic, i.e. one chart dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Key of the field inside a record (composite) or of the response map (generic)
    pub key: String,
    pub label: String,
}

impl Channel {
    fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
        }
    }
}

/// What a chart slot displays: a channel and the kind that knows how to read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSelection {
    pub kind: TopicKind,
    pub channel: Channel,
}

impl TopicKind {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "temp" => Self::Temp,
            "acc" => Self::Accel,
            "water" => Self::Water,
            other => Self::Generic(other.to_string()),
        }
    }

    pub fn is_composite(&self) -> bool {
        !matches!(self, Self::Generic(_))
    }

    /// Channels exposed by this kind. Generic topics use the catalog label.
    pub fn channels(&self, label: &str) -> Vec<Channel> {
        match self {
            Self::Temp => vec![
                Channel::new("temp", "temperature (C)"),
                Channel::new("pres", "pressure (hPa)"),
                Channel::new("hum", "humidity (%)"),
            ],
            Self::Accel => vec![
                Channel::new("x", "x"),
                Channel::new("y", "y"),
                Channel::new("z", "z"),
            ],
            Self::Water => vec![
                Channel::new("inlet_temp", "inlet (C)"),
                Channel::new("outlet_temp", "outlet (C)"),
            ],
            Self::Generic(id) => vec![Channel::new(id, label)],
        }
    }

    /// Field extraction for one decoded record.
    pub fn extract(
        &self,
        channel: &Channel,
        record: &serde_json::Map<String, serde_json::Value>,
    ) -> Option<f64> {
        let key = match self {
            Self::Generic(_) => "value",
            _ => channel.key.as_str(),
        };
        record.get(key).and_then(numeric)
    }
}

/// Numbers, plus numeric strings so that `"NaN"` or `"inf"` survive transport.
fn numeric(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Static list of selectable topics, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Catalog {
    topics: Vec<Topic>,
}

const BUILTIN_TOPICS: &[(&str, &str, &str)] = &[
    ("Environment (BME280)", "temp", "environment"),
    ("Accelerometer", "acc", "acceleration"),
    ("Water temperature", "water", "water (C)"),
    ("Stroke sensor front left", "stroke/front/left", "front/left (V)"),
    ("Stroke sensor front right", "stroke/front/right", "front/right (V)"),
    ("Stroke sensor rear left", "stroke/rear/left", "rear/left (V)"),
    ("Stroke sensor rear right", "stroke/rear/right", "rear/right (V)"),
    ("Water temperature inlet", "water/inlet_temp", "inlet (C)"),
    ("Water temperature outlet", "water/outlet_temp", "outlet (C)"),
    ("ECU ECT", "ecu/ect", "ECT (V)"),
    ("ECU TPS", "ecu/tps", "TPS (V)"),
    ("ECU IAP", "ecu/iap", "IAP (V)"),
    ("ECU GP", "ecu/gp", "GP"),
    ("RPM", "rpm/rpm", "RPM"),
    ("RPM (probe)", "rpm/god", "rpm"),
    ("IMU accel X", "acc/accel_x", "Accel X (m/s^2)"),
    ("IMU accel Y", "acc/accel_y", "Accel Y (m/s^2)"),
    ("IMU accel Z", "acc/accel_z", "Accel Z (m/s^2)"),
    ("IMU gyro X", "acc/gyro_x", "Gyro X (dps)"),
    ("IMU gyro Y", "acc/gyro_y", "Gyro Y (dps)"),
    ("IMU gyro Z", "acc/gyro_z", "Gyro Z (dps)"),
    ("IMU magnetometer X", "acc/mag_x", "Mag X (uT)"),
    ("IMU magnetometer Y", "acc/mag_y", "Mag Y (uT)"),
    ("IMU magnetometer Z", "acc/mag_z", "Mag Z (uT)"),
    ("IMU euler heading", "acc/euler_heading", "Euler Heading (deg)"),
    ("IMU euler roll", "acc/euler_roll", "Euler Roll (deg)"),
    ("IMU euler pitch", "acc/euler_pitch", "Euler Pitch (deg)"),
    ("IMU quaternion W", "acc/quaternion_w", "Quaternion W"),
    ("IMU quaternion X", "acc/quaternion_x", "Quaternion X"),
    ("IMU quaternion Y", "acc/quaternion_y", "Quaternion Y"),
    ("IMU quaternion Z", "acc/quaternion_z", "Quaternion Z"),
    ("IMU linear accel X", "acc/linear_accel_x", "Linear Accel X (m/s^2)"),
    ("IMU linear accel Y", "acc/linear_accel_y", "Linear Accel Y (m/s^2)"),
    ("IMU linear accel Z", "acc/linear_accel_z", "Linear Accel Z (m/s^2)"),
    ("IMU gravity X", "acc/gravity_x", "Gravity X (m/s^2)"),
    ("IMU gravity Y", "acc/gravity_y", "Gravity Y (m/s^2)"),
    ("IMU gravity Z", "acc/gravity_z", "Gravity Z (m/s^2)"),
    ("IMU calibration system", "acc/status_sys", "Status SYS"),
    ("IMU calibration gyro", "acc/status_gyro", "Status Gyro"),
    ("IMU calibration accel", "acc/status_accel", "Status Accel"),
    ("IMU calibration mag", "acc/status_mag", "Status Mag"),
];

impl Catalog {
    pub fn builtin() -> Self {
        let topics = BUILTIN_TOPICS
            .iter()
            .map(|(name, value, label)| Topic::new(name, value, label))
            .collect();
        Self { topics }
    }

    /// Append extra topics; entries whose wire id is already known are skipped.
    pub fn with_extra(mut self, extra: impl IntoIterator<Item = Topic>) -> Self {
        for topic in extra {
            if self.resolve(&topic.value).is_some() {
                tracing::warn!(value = %topic.value, "Ignoring duplicate catalog topic");
                continue;
            }
            self.topics.push(topic);
        }
        self
    }

    pub fn resolve(&self, value: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.value == value)
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }
}
