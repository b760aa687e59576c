// Debug dump of raw response payloads
//
// One file per logical name, overwritten on every write. Failures are
// logged and never propagated to the request that produced the payload.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Writes decoded payloads under a directory as pretty, key-sorted JSON.
#[derive(Debug, Clone)]
pub struct ResponseDump {
    dir: PathBuf,
}

impl ResponseDump {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a payload for `name` lands in: `/` and `.` become `_`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        let stem = name.replace(['/', '.'], "_");
        self.dir.join(format!("{stem}.json"))
    }

    /// Write `value` for `name`. Never fails; problems are logged.
    pub fn save(&self, name: &str, value: &Value) {
        let path = self.path_for(name);
        match render(value).and_then(|bytes| {
            std::fs::create_dir_all(&self.dir)?;
            std::fs::write(&path, bytes)
        }) {
            Ok(()) => debug!(path = %path.display(), "saved response"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to save response"),
        }
    }
}

fn render(value: &Value) -> std::io::Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    sorted(value).serialize(&mut ser)?;
    Ok(out)
}

fn sorted(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = Map::with_capacity(map.len());
            for key in keys {
                out.insert(key.clone(), sorted(&map[key.as_str()]));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn names_are_sanitized() {
        let dump = ResponseDump::new("/tmp/eero");
        assert_eq!(
            dump.path_for("/2.2/networks/123"),
            PathBuf::from("/tmp/eero/_2_2_networks_123.json")
        );
        assert_eq!(dump.path_for("update_data"), PathBuf::from("/tmp/eero/update_data.json"));
    }

    #[test]
    fn saves_sorted_pretty_json_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let dump = ResponseDump::new(dir.path());

        dump.save("/2.2/account", &json!({ "b": 1, "a": { "d": 2, "c": 3 } }));
        let text = std::fs::read_to_string(dump.path_for("/2.2/account")).unwrap();
        assert_eq!(
            text,
            "{\n    \"a\": {\n        \"c\": 3,\n        \"d\": 2\n    },\n    \"b\": 1\n}"
        );

        dump.save("/2.2/account", &json!({ "z": true }));
        let text = std::fs::read_to_string(dump.path_for("/2.2/account")).unwrap();
        assert_eq!(text, "{\n    \"z\": true\n}");
    }
}
