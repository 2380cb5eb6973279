//! API models

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Channel of the endpoint the dashboard consumes
pub const MAIN_CHANNEL: &str = "main";

/// A named, typed signal exposed by a device endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceContact {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
}

impl DeviceContact {
    /// Contact with a name only, the data type being unknown
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: None,
        }
    }

    /// Whether the gateway reports this contact as a floating point signal
    pub fn is_numeric(&self) -> bool {
        self.data_type.as_deref() == Some("double")
    }
}

/// Logical grouping of contacts under a channel
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceEndpoint {
    pub channel: String,
    #[serde(default)]
    pub inputs: Vec<DeviceContact>,
    #[serde(default)]
    pub outputs: Vec<DeviceContact>,
}

/// Static description of a device
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceConfiguration {
    #[serde(default)]
    pub alias: Option<String>,
    pub identifier: String,
    #[serde(default)]
    pub endpoints: Vec<DeviceEndpoint>,
}

impl DeviceConfiguration {
    /// The first endpoint on the main channel
    pub fn main_endpoint(&self) -> Option<&DeviceEndpoint> {
        self.endpoints.iter().find(|e| e.channel == MAIN_CHANNEL)
    }

    /// Look a contact up on the main endpoint, inputs first
    pub fn find_contact(&self, name: &str) -> Option<&DeviceContact> {
        let endpoint = self.main_endpoint()?;
        endpoint
            .inputs
            .iter()
            .chain(endpoint.outputs.iter())
            .find(|c| c.name == name)
    }
}

/// Raw value of a contact as reported by the gateway
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RawValue {
    Bool(bool),
    Text(String),
    Number(f64),
    #[default]
    Unknown,
}

impl RawValue {
    /// Name of the runtime type carried by the value
    pub fn type_name(&self) -> &'static str {
        match self {
            RawValue::Bool(_) => "boolean",
            RawValue::Text(_) => "string",
            RawValue::Number(_) => "number",
            RawValue::Unknown => "unknown",
        }
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Bool(b) => RawValue::Bool(b),
            serde_json::Value::String(s) => RawValue::Text(s),
            serde_json::Value::Number(n) => n.as_f64().map_or(RawValue::Unknown, RawValue::Number),
            _ => RawValue::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for RawValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(RawValue::from)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Bool(b) => write!(f, "{}", b),
            RawValue::Text(s) => f.write_str(s),
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Unknown => f.write_str("unknown"),
        }
    }
}

/// One point-in-time reading of a contact
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceContactValue {
    pub contact: DeviceContact,
    pub value: RawValue,
}

/// One sample of a contact's time series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalValue {
    pub time_stamp: DateTime<Utc>,
    pub value: f64,
}

/// A history entry as returned by the gateway, whose value may be missing or
/// not a number
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalSample {
    pub time_stamp: DateTime<Utc>,
    #[serde(default)]
    pub value: RawValue,
}

impl HistoricalSample {
    /// The numeric sample, `None` when the value cannot be charted
    pub fn numeric(self) -> Option<HistoricalValue> {
        match self.value {
            RawValue::Number(value) => Some(HistoricalValue {
                time_stamp: self.time_stamp,
                value,
            }),
            _ => None,
        }
    }
}

/// Command value sent to an actionable contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConductValue {
    On,
    Off,
}

impl ConductValue {
    /// The command that flips a contact from the given state
    pub fn toggled_from(is_active: bool) -> Self {
        if is_active {
            ConductValue::Off
        } else {
            ConductValue::On
        }
    }
}

/// Contact addressed by a conduct command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConductTarget {
    pub identifier: String,
    pub channel: String,
    pub contact: String,
}

/// Conduct request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConductRequest {
    pub target: ConductTarget,
    pub value: ConductValue,
}

/// Icon family shown by a device widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Icon {
    Light,
    Socket,
    Motion,
    Window,
    Doors,
}

/// Presentation and behavior policy for one device widget
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_contact_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_contact_name: Option<String>,
}
