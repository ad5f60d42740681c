//! Classification of terminal replies
//!
//! Replies arrive as whole escape payloads with the envelope already removed.
//! Unrelated escape traffic is expected and simply not recognized.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use memchr::memchr;

use crate::error::ClipError;
use crate::event_loop::EscapeKind;

const ACK_PREFIX: &[u8] = b"1+r";
const CLIPBOARD_PREFIX: &[u8] = b"52;";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// XTGETTCAP success reply, sent after everything queued before it
    Ack,
    /// Clipboard contents reported by the terminal
    ClipboardData(Vec<u8>),
    /// A clipboard reply without a data field. Terminals that refuse or do not
    /// support reads answer this way, so it is not treated as an error.
    Declined,
    Unrecognized,
}

pub fn decode_reply(kind: EscapeKind, payload: &[u8]) -> Result<Reply, ClipError> {
    match kind {
        EscapeKind::Dcs if payload.starts_with(ACK_PREFIX) => Ok(Reply::Ack),
        EscapeKind::Osc if payload.starts_with(CLIPBOARD_PREFIX) => decode_clipboard(payload),
        _ => Ok(Reply::Unrecognized),
    }
}

/// Split `52;<target>;<data>` and decode the data field. Anything after the
/// second separator belongs to the data field.
fn decode_clipboard(payload: &[u8]) -> Result<Reply, ClipError> {
    let after_code = &payload[CLIPBOARD_PREFIX.len()..];
    let Some(sep) = memchr(b';', after_code) else {
        #[cfg(debug_assertions)]
        log::debug!("Clipboard reply has no data field, treating as declined");
        return Ok(Reply::Declined);
    };

    let data = &after_code[sep + 1..];
    let decoded = STANDARD.decode(data)?;
    Ok(Reply::ClipboardData(decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_clipboard_reply_roundtrip(data in prop::collection::vec(any::<u8>(), 0..256)) {
            let payload = format!("52;c;{}", STANDARD.encode(&data));
            let reply = decode_reply(EscapeKind::Osc, payload.as_bytes()).unwrap();
            prop_assert_eq!(reply, Reply::ClipboardData(data));
        }
    }

    #[test]
    fn test_ack_reply() {
        let reply = decode_reply(EscapeKind::Dcs, b"1+r544e=787465726d").unwrap();
        assert_eq!(reply, Reply::Ack);
    }

    #[test]
    fn test_ack_prefix_in_osc_is_ignored() {
        let reply = decode_reply(EscapeKind::Osc, b"1+r544e").unwrap();
        assert_eq!(reply, Reply::Unrecognized);
    }

    #[test]
    fn test_failed_capability_reply_is_not_an_ack() {
        let reply = decode_reply(EscapeKind::Dcs, b"0+r544e").unwrap();
        assert_eq!(reply, Reply::Unrecognized);
    }

    #[test]
    fn test_two_field_reply_is_declined() {
        let reply = decode_reply(EscapeKind::Osc, b"52;c").unwrap();
        assert_eq!(reply, Reply::Declined);
    }

    #[test]
    fn test_bare_code_is_unrecognized() {
        // Only `52;` introduces a clipboard reply
        let reply = decode_reply(EscapeKind::Osc, b"52").unwrap();
        assert_eq!(reply, Reply::Unrecognized);
    }

    #[test]
    fn test_empty_data_field_is_empty_payload() {
        let reply = decode_reply(EscapeKind::Osc, b"52;c;").unwrap();
        assert_eq!(reply, Reply::ClipboardData(Vec::new()));
    }

    #[test]
    fn test_primary_reply() {
        let reply = decode_reply(EscapeKind::Osc, b"52;p;aGVsbG8=").unwrap();
        assert_eq!(reply, Reply::ClipboardData(b"hello".to_vec()));
    }

    #[test]
    fn test_invalid_base64_is_encoding_error() {
        let err = decode_reply(EscapeKind::Osc, b"52;c;not*base64").unwrap_err();
        assert!(matches!(err, ClipError::InvalidEncodedData(_)));
        assert!(
            err.to_string()
                .starts_with("invalid encoded data from terminal")
        );
    }

    #[test]
    fn test_other_escape_traffic_is_unrecognized() {
        assert_eq!(
            decode_reply(EscapeKind::Osc, b"11;rgb:0000/0000/0000").unwrap(),
            Reply::Unrecognized
        );
        assert_eq!(
            decode_reply(EscapeKind::Dcs, b"$r0m").unwrap(),
            Reply::Unrecognized
        );
        assert_eq!(decode_reply(EscapeKind::Osc, b"").unwrap(), Reply::Unrecognized);
    }

    #[test]
    fn test_code_prefix_must_be_exact() {
        // OSC 520 is not OSC 52
        assert_eq!(
            decode_reply(EscapeKind::Osc, b"520;c;aGk=").unwrap(),
            Reply::Unrecognized
        );
    }
}
