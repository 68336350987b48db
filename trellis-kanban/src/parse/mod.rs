//! Boundary parsing of mutation payloads
//!
//! Accepts a JSON object, or a flattened form map where every value is a
//! string, and turns it into a typed `Command` once. Parameter names and
//! required flags come from each command's `#[operation]` parameter table.

use crate::dispatch::{Command, Intent};
use crate::error::{KanbanError, Result};
use crate::types::BoardId;
use serde_json::{Map, Number, Value};
use trellis_operations::{ParamMeta, ParamType};

/// Parse a payload into a command
pub fn parse_command(payload: Value) -> Result<Command> {
    parse_command_in(payload, None)
}

/// Parse a payload posted from a board view. `createColumn` and
/// `updateBoardName` take a missing `boardId` from the view; other intents
/// must carry their own.
pub fn parse_command_in(payload: Value, route_board: Option<&BoardId>) -> Result<Command> {
    let Value::Object(mut obj) = payload else {
        return Err(KanbanError::malformed("request must be an object"));
    };

    let tag = match obj.remove("intent") {
        Some(Value::String(tag)) if !tag.trim().is_empty() => tag,
        None | Some(Value::Null) | Some(Value::String(_)) => {
            return Err(KanbanError::malformed("missing required field: intent"))
        }
        Some(_) => return Err(KanbanError::malformed("intent must be a string")),
    };
    let intent = Intent::parse(&tag).ok_or(KanbanError::UnknownIntent { intent: tag })?;

    let mut params = normalize_params(obj, intent.params())?;
    if let Some(board) = route_board.filter(|_| intent.takes_route_board()) {
        if !params.contains_key("boardId") {
            params.insert("boardId".into(), Value::String(board.to_string()));
        }
    }

    let missing: Vec<&str> = intent
        .params()
        .iter()
        .filter(|p| p.required && !params.contains_key(p.name))
        .map(|p| p.name)
        .collect();
    match missing.as_slice() {
        [] => {}
        [field] => {
            return Err(KanbanError::malformed(format!(
                "missing required field: {field}"
            )))
        }
        fields => {
            return Err(KanbanError::malformed(format!(
                "missing required fields: {}",
                fields.join(", ")
            )))
        }
    }

    params.insert("intent".into(), Value::String(intent.as_str().into()));
    let command: Command = serde_json::from_value(Value::Object(params))
        .map_err(|e| KanbanError::malformed(e.to_string()))?;
    command.validate()?;
    Ok(command)
}

/// Keep only known parameters under their canonical names, coercing form
/// strings to numbers and numbers to strings as the table demands. Blank
/// values count as absent. Unknown keys (form tokens and the like) are
/// dropped.
fn normalize_params(mut obj: Map<String, Value>, table: &[ParamMeta]) -> Result<Map<String, Value>> {
    let mut params = Map::new();

    for meta in table {
        let Some(value) = obj.remove(meta.name) else { continue };
        if is_blank(&value) {
            continue;
        }
        params.insert(meta.name.to_string(), coerce(meta, value)?);
    }

    Ok(params)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn coerce(meta: &ParamMeta, value: Value) -> Result<Value> {
    match (meta.param_type, value) {
        (ParamType::Number, Value::String(s)) => {
            let number = s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .ok_or_else(|| {
                    KanbanError::malformed(format!("{} must be a number", meta.name))
                })?;
            Ok(Value::Number(number))
        }
        (ParamType::Integer, Value::String(s)) => {
            let number = s.trim().parse::<i64>().map_err(|_| {
                KanbanError::malformed(format!("{} must be an integer", meta.name))
            })?;
            Ok(Value::Number(number.into()))
        }
        (ParamType::String, Value::Number(n)) => Ok(Value::String(n.to_string())),
        (ParamType::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),
        (_, value) => Ok(value),
    }
}
