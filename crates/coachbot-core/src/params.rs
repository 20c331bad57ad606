//! Reference token codec.
//!
//! Callback buttons carry a compact token of the form
//! `prefix["?" key "=" value {"&" key "=" value}]`. The prefix selects the
//! route; the pairs carry optional entity ids and a pagination window. A zero
//! value means "not present" and is never encoded.
//!
//! The grammar round-trips through the chat platform's callback field, so it
//! must stay stable.

use thiserror::Error;

const QUERY_SEPARATOR: &str = "?";
const PAIR_SEPARATOR: &str = "&";
const KEY_VALUE_SEPARATOR: &str = "=";

const KEY_PROGRAM_ID: &str = "pid";
const KEY_USER_ID: &str = "uid";
const KEY_EXERCISE_ID: &str = "eid";
const KEY_SUB_PROGRAM_ID: &str = "sid";
const KEY_RECORD_ID: &str = "rid";
const KEY_LIMIT: &str = "limit";
const KEY_OFFSET: &str = "offset";

/// Errors produced while decoding a reference token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("unknown key '{0}'")]
    UnknownKey(String),

    #[error("invalid value '{value}' for field '{field}'")]
    InvalidValue { field: &'static str, value: String },
}

/// Decoded reference token fields. Zero means absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Params {
    pub program_id: i64,
    pub user_id: i64,
    pub exercise_id: i64,
    pub sub_program_id: i64,
    pub record_id: i64,
    pub limit: u32,
    pub offset: u32,
}

impl Params {
    pub fn program(program_id: i64) -> Self {
        Self {
            program_id,
            ..Self::default()
        }
    }

    pub fn user(user_id: i64) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    pub fn exercise(exercise_id: i64) -> Self {
        Self {
            exercise_id,
            ..Self::default()
        }
    }

    pub fn sub_program(sub_program_id: i64) -> Self {
        Self {
            sub_program_id,
            ..Self::default()
        }
    }

    /// Pagination window only.
    pub fn page(limit: u32, offset: u32) -> Self {
        Self {
            limit,
            offset,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Set fields in a fixed key order.
    fn pairs(&self) -> Vec<(&'static str, String)> {
        let ids = [
            (KEY_PROGRAM_ID, self.program_id),
            (KEY_USER_ID, self.user_id),
            (KEY_EXERCISE_ID, self.exercise_id),
            (KEY_SUB_PROGRAM_ID, self.sub_program_id),
            (KEY_RECORD_ID, self.record_id),
        ];
        let window = [(KEY_LIMIT, self.limit), (KEY_OFFSET, self.offset)];

        ids.into_iter()
            .filter(|(_, v)| *v != 0)
            .map(|(k, v)| (k, v.to_string()))
            .chain(
                window
                    .into_iter()
                    .filter(|(_, v)| *v != 0)
                    .map(|(k, v)| (k, v.to_string())),
            )
            .collect()
    }
}

/// Encode `params` after `prefix`.
///
/// Returns `prefix` unchanged when no field is set.
pub fn encode(prefix: &str, params: &Params) -> String {
    let pairs = params.pairs();
    if pairs.is_empty() {
        return prefix.to_string();
    }

    let query = pairs
        .into_iter()
        .map(|(k, v)| format!("{k}{KEY_VALUE_SEPARATOR}{v}"))
        .collect::<Vec<_>>()
        .join(PAIR_SEPARATOR);
    format!("{prefix}{QUERY_SEPARATOR}{query}")
}

/// The route part of a token (everything before the first `?`).
pub fn prefix(token: &str) -> &str {
    token
        .split_once(QUERY_SEPARATOR)
        .map_or(token, |(prefix, _)| prefix)
}

/// Decode the parameters of a token.
///
/// Pairs with an empty key or value are skipped. Unknown keys and
/// non-numeric values are errors.
pub fn decode(token: &str) -> Result<Params, ParamError> {
    let mut params = Params::default();

    let Some((_, query)) = token.split_once(QUERY_SEPARATOR) else {
        return Ok(params);
    };

    for pair in query.split(PAIR_SEPARATOR) {
        let (key, value) = pair.split_once(KEY_VALUE_SEPARATOR).unwrap_or((pair, ""));
        if key.is_empty() || value.is_empty() {
            continue;
        }

        match key {
            KEY_PROGRAM_ID => params.program_id = parse_id("program_id", value)?,
            KEY_USER_ID => params.user_id = parse_id("user_id", value)?,
            KEY_EXERCISE_ID => params.exercise_id = parse_id("exercise_id", value)?,
            KEY_SUB_PROGRAM_ID => params.sub_program_id = parse_id("sub_program_id", value)?,
            KEY_RECORD_ID => params.record_id = parse_id("record_id", value)?,
            KEY_LIMIT => params.limit = parse_window("limit", value)?,
            KEY_OFFSET => params.offset = parse_window("offset", value)?,
            other => return Err(ParamError::UnknownKey(other.to_string())),
        }
    }

    Ok(params)
}

fn parse_id(field: &'static str, value: &str) -> Result<i64, ParamError> {
    value.parse().map_err(|_| ParamError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

fn parse_window(field: &'static str, value: &str) -> Result<u32, ParamError> {
    value.parse().map_err(|_| ParamError::InvalidValue {
        field,
        value: value.to_string(),
    })
}
