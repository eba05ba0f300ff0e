//! JSON patches (RFC 6902) applied to a configuration.
//!
//! The configuration is patched in its JSON form with `json_patch` and
//! decoded again, so a patch that produces an invalid document fails like a
//! bad input would.

use json_patch::{Patch, PatchOperation};
use log::debug;
use serde_json::{json, Value};
use thiserror::Error;

use crate::schema::latest::{Config, JsonPatch};

#[derive(Error, Debug)]
pub enum Error {
    #[error("encode configuration: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("patched configuration is invalid: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("{op} {path:?}: {source}")]
    Pointer {
        op: String,
        path: String,
        source: serde_json::Error,
    },
    #[error("{op} {path:?}: patches can't target the whole document")]
    Root { op: String, path: String },
    #[error("unsupported patch operation {0:?}")]
    Op(String),
    #[error("{op} {path:?} requires a value")]
    MissingValue { op: String, path: String },
    #[error("{op} {path:?} requires from")]
    MissingFrom { op: String, path: String },
    #[error(transparent)]
    Apply(#[from] json_patch::PatchError),
}

use Error::*;

const DEFAULT_OP: &str = "replace";

pub fn apply(config: Config, patches: &[JsonPatch]) -> Result<Config, Error> {
    if patches.is_empty() {
        return Ok(config);
    }
    let operations = patches
        .iter()
        .map(operation)
        .collect::<Result<Vec<_>, _>>()?;
    let mut document = serde_json::to_value(&config).map_err(Encode)?;
    json_patch::patch(&mut document, &Patch(operations))?;
    serde_json::from_value(document).map_err(Decode)
}

/// Checks one configured patch and turns it into a `json_patch` operation.
fn operation(patch: &JsonPatch) -> Result<PatchOperation, Error> {
    let JsonPatch {
        op,
        path,
        from,
        value,
    } = patch;
    let op = if op.is_empty() { DEFAULT_OP } else { op.as_str() };
    debug!("patch: {} {}", op, path);

    let missing_value = || MissingValue {
        op: op.to_string(),
        path: path.clone(),
    };
    let missing_from = || MissingFrom {
        op: op.to_string(),
        path: path.clone(),
    };
    if path.is_empty() {
        return Err(Root {
            op: op.to_string(),
            path: path.clone(),
        });
    }
    let operation = match op {
        "add" | "replace" | "test" => {
            json!({ "op": op, "path": path, "value": value.clone().ok_or_else(missing_value)? })
        }
        "remove" => json!({ "op": op, "path": path }),
        "move" | "copy" if from.is_empty() => return Err(missing_from()),
        "move" | "copy" => json!({ "op": op, "from": from, "path": path }),
        other => return Err(Op(other.to_string())),
    };

    serde_json::from_value(operation).map_err(|source| Pointer {
        op: op.to_string(),
        path: path.clone(),
        source,
    })
}
