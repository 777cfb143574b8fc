//! Shareable single-line encoding of a program.
//!
//! Programs travel between players as
//! `gridbot:v1:<block-count>:<base64 json>`; the block count rides along in
//! clear text so a truncated paste is caught before the payload is parsed.

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use gridbot_core::{program_block_count, Instruction};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const TRANSFER_DOMAIN: &str = "gridbot";
const TRANSFER_VERSION: &str = "v1";
/// Delimiter used to separate the prefix, block count and payload.
const FIELD_DELIMITER: char = ':';

/// Payload serialized into the base64 segment of a code string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SerializableProgram {
    instructions: Vec<Instruction>,
}

/// Encodes a program into a single-line string suitable for clipboard
/// transfer.
pub(crate) fn encode(program: &[Instruction]) -> String {
    let payload = SerializableProgram {
        instructions: program.to_vec(),
    };
    let json = serde_json::to_vec(&payload).expect("program serialization never fails");
    let encoded = STANDARD_NO_PAD.encode(json);
    format!(
        "{TRANSFER_DOMAIN}{FIELD_DELIMITER}{TRANSFER_VERSION}{FIELD_DELIMITER}{}{FIELD_DELIMITER}{encoded}",
        program_block_count(program)
    )
}

/// Decodes a program from the provided code string.
pub(crate) fn decode(value: &str) -> Result<Vec<Instruction>, TransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(TransferError::MissingPrefix)?;
    let version = parts.next().ok_or(TransferError::MissingVersion)?;
    let count = parts.next().ok_or(TransferError::MissingBlockCount)?;
    let payload = parts.next().ok_or(TransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(TransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(TransferError::UnsupportedVersion(version.to_owned()));
    }

    let expected: u32 = count
        .parse()
        .map_err(|_| TransferError::InvalidBlockCount(count.to_owned()))?;
    let bytes = STANDARD_NO_PAD.decode(payload.as_bytes())?;
    let decoded: SerializableProgram = serde_json::from_slice(&bytes)?;

    let actual = program_block_count(&decoded.instructions);
    if actual != expected {
        return Err(TransferError::BlockCountMismatch { expected, actual });
    }

    Ok(decoded.instructions)
}

/// Errors that can occur while decoding a shared code string.
#[derive(Debug, Error)]
pub(crate) enum TransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("code string was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("code string is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("code string is missing the version")]
    MissingVersion,
    /// The block count segment was missing.
    #[error("code string is missing the block count")]
    MissingBlockCount,
    /// The payload segment was missing.
    #[error("code string is missing the payload")]
    MissingPayload,
    /// The prefix segment did not name this game.
    #[error("code prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The version segment named an unknown format revision.
    #[error("code version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The block count segment was not a number.
    #[error("could not parse block count '{0}'")]
    InvalidBlockCount(String),
    /// The advertised block count disagreed with the decoded program.
    #[error("code advertises {expected} blocks but contains {actual}")]
    BlockCountMismatch {
        /// Count named in the clear-text segment.
        expected: u32,
        /// Count computed from the decoded instructions.
        actual: u32,
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode code payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse code payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}
