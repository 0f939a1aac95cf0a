//! Versioned JSON transport form of [`ResultEnvelope`].
//!
//! ```json
//! {"schema":"clusterhub.envelope","schema_version":1,"envelope":{...}}
//! ```
//!
//! Output is deterministic: struct fields serialize in declaration order and
//! the envelope holds no maps.

use serde::{Deserialize, Serialize};

use crate::domain::errors::CodecError;
use crate::domain::models::ResultEnvelope;

/// Value of the `schema` tag.
pub const SCHEMA: &str = "clusterhub.envelope";
/// Only version `decode` accepts.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct Outgoing<'a> {
    schema: &'static str,
    schema_version: u32,
    envelope: &'a ResultEnvelope,
}

#[derive(Deserialize)]
struct Incoming {
    schema: String,
    schema_version: u32,
    envelope: ResultEnvelope,
}

/// Serialize an envelope with its schema tag.
pub fn encode(envelope: &ResultEnvelope) -> Result<String, CodecError> {
    Ok(serde_json::to_string(&Outgoing {
        schema: SCHEMA,
        schema_version: SCHEMA_VERSION,
        envelope,
    })?)
}

/// Pretty-printed variant for terminals.
pub fn encode_pretty(envelope: &ResultEnvelope) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(&Outgoing {
        schema: SCHEMA,
        schema_version: SCHEMA_VERSION,
        envelope,
    })?)
}

/// Parse an envelope, rejecting unknown schemas and versions.
pub fn decode(text: &str) -> Result<ResultEnvelope, CodecError> {
    let incoming: Incoming = serde_json::from_str(text)?;
    if incoming.schema != SCHEMA || incoming.schema_version != SCHEMA_VERSION {
        return Err(CodecError::UnsupportedSchema {
            schema: incoming.schema,
            version: incoming.schema_version,
        });
    }
    Ok(incoming.envelope)
}
