//! `key=value|key=value` descriptor shorthand.

use super::PropertyError;
use crate::value::{Map, Value};

const TOKEN_SEPARATOR: char = '|';
const PAIR_SEPARATOR: char = '=';

/// Splits shorthand into a map of trimmed text values.
///
/// Values may themselves contain `=`; only the first one separates the key.
/// Later duplicates of a key overwrite earlier ones.
pub(super) fn parse(text: &str) -> Result<Map, PropertyError> {
    let mut map = Map::new();
    for token in text.split(TOKEN_SEPARATOR) {
        let Some((key, value)) = token.split_once(PAIR_SEPARATOR) else {
            return Err(PropertyError::Parse {
                token: token.to_string(),
                text: text.to_string(),
            });
        };
        map.insert(key.trim().to_string(), Value::from(value.trim()));
    }
    Ok(map)
}
