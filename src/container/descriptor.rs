use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fmt;

pub const KEY_VALUE_CONTAINER_TAG: &str = "KeyValueContainer";
pub const CURRENT_LAYOUT_VERSION: u32 = 1;

/// Declared type of a container. Unknown tags still parse so the validator
/// can classify them as unsupported instead of corrupt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContainerType {
    KeyValue,
    Unsupported(String),
}

impl ContainerType {
    pub fn tag(&self) -> &str {
        match self {
            ContainerType::KeyValue => KEY_VALUE_CONTAINER_TAG,
            ContainerType::Unsupported(tag) => tag,
        }
    }
}

impl From<String> for ContainerType {
    fn from(tag: String) -> Self {
        if tag == KEY_VALUE_CONTAINER_TAG {
            ContainerType::KeyValue
        } else {
            ContainerType::Unsupported(tag)
        }
    }
}

impl From<ContainerType> for String {
    fn from(value: ContainerType) -> Self {
        match value {
            ContainerType::KeyValue => KEY_VALUE_CONTAINER_TAG.to_string(),
            ContainerType::Unsupported(tag) => tag,
        }
    }
}

impl fmt::Display for ContainerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Lifecycle state recorded in the descriptor. Recovery carries it through
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContainerState {
    Open,
    Closing,
    QuasiClosed,
    Closed,
    Unhealthy,
}

/// Parsed contents of a `<id>.container` file. Fields beyond the common set
/// stay untyped in `payload` until the validator projects them onto the
/// declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerDescriptor {
    pub container_id: u64,
    pub container_type: ContainerType,
    #[serde(default = "default_layout_version")]
    pub layout_version: u32,
    pub state: ContainerState,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(flatten)]
    pub payload: Mapping,
}

fn default_layout_version() -> u32 {
    CURRENT_LAYOUT_VERSION
}

impl ContainerDescriptor {
    pub fn key_value(container_id: u64, key_value: &KeyValueDescriptor) -> Self {
        let mut payload = Mapping::new();
        payload.insert(
            Value::String("index_db_type".into()),
            Value::String(key_value.index_db_type.clone()),
        );
        payload.insert(
            Value::String("max_size_gb".into()),
            Value::Number(key_value.max_size_gb.into()),
        );
        Self {
            container_id,
            container_type: ContainerType::KeyValue,
            layout_version: CURRENT_LAYOUT_VERSION,
            state: ContainerState::Open,
            metadata: BTreeMap::new(),
            payload,
        }
    }

    pub fn key_value_payload(&self) -> Result<KeyValueDescriptor, serde_yaml::Error> {
        serde_yaml::from_value(Value::Mapping(self.payload.clone()))
    }
}

/// Type-specific fields of a key-value container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueDescriptor {
    pub index_db_type: String,
    pub max_size_gb: u64,
}

impl Default for KeyValueDescriptor {
    fn default() -> Self {
        Self {
            index_db_type: "RocksDB".into(),
            max_size_gb: 5,
        }
    }
}
