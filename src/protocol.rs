/// Runtime messages exchanged between controller, page agent and options page
use serde::{Deserialize, Serialize};

/// A command, tagged by its `action` field on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    ToggleZenMode {
        #[serde(default, rename = "fromKeyboard")]
        from_keyboard: bool,
    },
    GetZenState,
    Ping,
    UpdateCustomDomains { domains: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZenStateReply {
    pub zen_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingReply {
    pub injected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckReply {
    pub success: bool,
}

/// Any reply a listener sends back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    ZenState(ZenStateReply),
    Ping(PingReply),
    Ack(AckReply),
}

impl Reply {
    pub fn zen_state(zen_mode: bool) -> Reply {
        Reply::ZenState(ZenStateReply { zen_mode })
    }

    pub fn pong() -> Reply {
        Reply::Ping(PingReply { injected: true })
    }

    pub fn ack() -> Reply {
        Reply::Ack(AckReply { success: true })
    }
}
