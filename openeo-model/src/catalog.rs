use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::capabilities::Link;

/// A STAC collection. Only `id` is interpreted; every other field is carried
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collections {
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// A predefined process description. Only `id` is interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Process {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Processes {
    pub processes: Vec<Process>,
    #[serde(default)]
    pub links: Vec<Link>,
}
