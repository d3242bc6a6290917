//! Stable event identifiers.

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::event::EventKind;
use crate::record::NormalizedRecord;
use crate::settings::{EventSettings, HashAlgorithm};

/// UID for one derived event: a hex digest of the record identity and event
/// kind, suffixed with the configured domain.
///
/// Only the record key (code, open date text) goes into the hash, so editing
/// any other field upstream updates the existing calendar entry.
pub fn event_uid(record: &NormalizedRecord, kind: EventKind, settings: &EventSettings) -> String {
    let identity = format!("{}-{}-{}", record.code(), record.open_date(), kind.uid_tag());
    let raw = if settings.uid_prefix.is_empty() {
        identity
    } else {
        format!("{}-{}", settings.uid_prefix, identity)
    };

    format!("{}@{}", digest_hex(settings.hash_algorithm, raw.as_bytes()), settings.uid_domain)
}

fn digest_hex(algorithm: HashAlgorithm, bytes: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Md5 => hex::encode(Md5::digest(bytes)),
        HashAlgorithm::Sha1 => hex::encode(Sha1::digest(bytes)),
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
    }
}
