// SPDX-License-Identifier: Apache-2.0
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DBConfig {
    pub max_connections: u32,

    /// Empty means the index.db file inside the storage folder
    pub uri: String
}

impl Default for DBConfig {
    fn default() -> Self {
        DBConfig {
            max_connections: 4,
            uri: "".to_string()
        }
    }
}
