use serde::{ Deserialize, Deserializer, Serialize };
use serde_json::Value;

/// Speaker of a single chat turn. The completion provider accepts exactly
/// these three roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One message in a conversation. Ordering is chronological; duplicates are
/// allowed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    #[serde(default, deserialize_with = "nullable_text")]
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

// Clients may send `content: null` or omit it entirely; both coerce to "".
fn nullable_text<'de, D>(deserializer: D) -> Result<String, D::Error>
    where D: Deserializer<'de>
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body answered by `POST /api/chat` on success. `raw` carries the provider
/// payload untouched.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelayReply {
    pub reply: String,
    #[serde(rename = "usedTemperature")]
    pub used_temperature: f64,
    pub raw: Value,
}
