//! Revision model.
//!
//! A revision is a common envelope (predecessor pointer, timestamp, protocol
//! version) plus a payload whose shape depends on the revision type. On the wire
//! a revision is one flat JSON object: the envelope fields, a `revision_type` tag
//! and the payload fields side by side. Form fields are flattened into
//! `forms_<key>` entries.
//!
//! The verification hash of a revision is BLAKE3 over a domain tag followed by the
//! canonical JSON of that flat object. It is derived, never stored inside the
//! revision itself; the owning [`AquaTree`](crate::AquaTree) keys revisions by it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::TreeError;
use crate::hash::{canonical_json, ContentHash};
use crate::merkle::leaf_hashes;
use crate::timestamp::LocalTimestamp;

/// Protocol string written into every new revision.
pub const PROTOCOL_VERSION: &str = "aqua-rs/v1 | BLAKE3 | Method: tree";

/// Prefix for flattened form field keys.
pub const FORM_KEY_PREFIX: &str = "forms_";

const REVISION_DOMAIN: &[u8] = b"aqua-revision-v1:";

const PREVIOUS_KEY: &str = "previous_verification_hash";
const TIMESTAMP_KEY: &str = "local_timestamp";
const VERSION_KEY: &str = "version";
const TYPE_KEY: &str = "revision_type";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevisionType {
    File,
    Form,
    Link,
    Signature,
    Witness,
}

impl RevisionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionType::File => "file",
            RevisionType::Form => "form",
            RevisionType::Link => "link",
            RevisionType::Signature => "signature",
            RevisionType::Witness => "witness",
        }
    }
}

impl fmt::Display for RevisionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RevisionType {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(RevisionType::File),
            "form" => Ok(RevisionType::Form),
            "link" => Ok(RevisionType::Link),
            "signature" => Ok(RevisionType::Signature),
            "witness" => Ok(RevisionType::Witness),
            other => Err(TreeError::MalformedRevision {
                field: TYPE_KEY.to_string(),
                reason: format!("unknown revision type {other:?}"),
            }),
        }
    }
}

/// Content revision: the hash and Merkle leaves of a file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilePayload {
    pub file_hash: ContentHash,
    pub file_nonce: String,
    pub leaves: Vec<ContentHash>,
    /// Inline UTF-8 content, when the file travels with the tree.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Structured claim. `fields` are written as `forms_<key>` entries; `file_hash`
/// and `leaves` cover the canonical JSON of `fields`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormPayload {
    pub file_hash: ContentHash,
    pub file_nonce: String,
    pub leaves: Vec<ContentHash>,
    #[serde(skip)]
    pub fields: BTreeMap<String, String>,
}

impl FormPayload {
    pub fn from_fields(
        fields: BTreeMap<String, String>,
        file_nonce: String,
    ) -> Result<Self, TreeError> {
        let content = form_content(&fields)?;
        Ok(Self {
            file_hash: ContentHash::digest(&content),
            file_nonce,
            leaves: leaf_hashes(&content)?,
            fields,
        })
    }
}

/// Canonical bytes a form's `file_hash` and `leaves` are computed over.
pub fn form_content(fields: &BTreeMap<String, String>) -> Result<Vec<u8>, TreeError> {
    let object: Map<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    Ok(canonical_json(&Value::Object(object))?)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkPayload {
    pub link_type: String,
    pub link_verification_hashes: Vec<ContentHash>,
    pub link_file_hashes: Vec<ContentHash>,
}

impl LinkPayload {
    /// Head hash of the linked tree.
    pub fn target(&self) -> Option<&ContentHash> {
        self.link_verification_hashes.first()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignatureType {
    Ed25519,
    Other(String),
}

impl From<String> for SignatureType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "ed25519" => SignatureType::Ed25519,
            _ => SignatureType::Other(raw),
        }
    }
}

impl From<SignatureType> for String {
    fn from(kind: SignatureType) -> Self {
        match kind {
            SignatureType::Ed25519 => "ed25519".to_string(),
            SignatureType::Other(raw) => raw,
        }
    }
}

impl fmt::Display for SignatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureType::Ed25519 => f.write_str("ed25519"),
            SignatureType::Other(raw) => f.write_str(raw),
        }
    }
}

/// Signature over the predecessor's verification hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignaturePayload {
    /// Hex-encoded signature bytes.
    pub signature: String,
    pub signature_type: SignatureType,
    pub signature_wallet_address: String,
    pub signature_public_key: String,
}

/// External anchoring of the predecessor's verification hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WitnessPayload {
    pub witness_network: String,
    pub witness_transaction_hash: String,
    pub witness_timestamp: u64,
    pub witness_sender_account_address: String,
    pub witness_smart_contract_address: String,
    pub witness_merkle_root: ContentHash,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevisionPayload {
    File(FilePayload),
    Form(FormPayload),
    Link(LinkPayload),
    Signature(SignaturePayload),
    Witness(WitnessPayload),
}

impl RevisionPayload {
    pub fn revision_type(&self) -> RevisionType {
        match self {
            RevisionPayload::File(_) => RevisionType::File,
            RevisionPayload::Form(_) => RevisionType::Form,
            RevisionPayload::Link(_) => RevisionType::Link,
            RevisionPayload::Signature(_) => RevisionType::Signature,
            RevisionPayload::Witness(_) => RevisionType::Witness,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Revision {
    /// `None` only for the genesis revision (empty string on the wire).
    pub previous_verification_hash: Option<ContentHash>,
    pub local_timestamp: LocalTimestamp,
    pub version: String,
    pub payload: RevisionPayload,
}

impl Revision {
    pub fn new(previous: Option<ContentHash>, payload: RevisionPayload) -> Self {
        Self {
            previous_verification_hash: previous,
            local_timestamp: LocalTimestamp::now(),
            version: PROTOCOL_VERSION.to_string(),
            payload,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: LocalTimestamp) -> Self {
        self.local_timestamp = timestamp;
        self
    }

    pub fn revision_type(&self) -> RevisionType {
        self.payload.revision_type()
    }

    pub fn is_genesis(&self) -> bool {
        self.previous_verification_hash.is_none()
    }

    pub fn as_file(&self) -> Option<&FilePayload> {
        match &self.payload {
            RevisionPayload::File(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_form(&self) -> Option<&FormPayload> {
        match &self.payload {
            RevisionPayload::Form(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_link(&self) -> Option<&LinkPayload> {
        match &self.payload {
            RevisionPayload::Link(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_signature(&self) -> Option<&SignaturePayload> {
        match &self.payload {
            RevisionPayload::Signature(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_witness(&self) -> Option<&WitnessPayload> {
        match &self.payload {
            RevisionPayload::Witness(p) => Some(p),
            _ => None,
        }
    }

    /// Flat wire object.
    pub fn to_json_map(&self) -> Result<Map<String, Value>, TreeError> {
        let mut map = match &self.payload {
            RevisionPayload::File(p) => payload_object(p)?,
            RevisionPayload::Form(p) => {
                let mut object = payload_object(p)?;
                for (key, value) in &p.fields {
                    object.insert(
                        format!("{FORM_KEY_PREFIX}{key}"),
                        Value::String(value.clone()),
                    );
                }
                object
            }
            RevisionPayload::Link(p) => payload_object(p)?,
            RevisionPayload::Signature(p) => payload_object(p)?,
            RevisionPayload::Witness(p) => payload_object(p)?,
        };

        let previous = self
            .previous_verification_hash
            .map(|h| h.to_prefixed_hex())
            .unwrap_or_default();
        map.insert(PREVIOUS_KEY.to_string(), Value::String(previous));
        map.insert(
            TIMESTAMP_KEY.to_string(),
            Value::String(self.local_timestamp.to_string()),
        );
        map.insert(VERSION_KEY.to_string(), Value::String(self.version.clone()));
        map.insert(
            TYPE_KEY.to_string(),
            Value::String(self.revision_type().as_str().to_string()),
        );
        Ok(map)
    }

    pub fn from_json_map(map: &Map<String, Value>) -> Result<Self, TreeError> {
        let mut rest = map.clone();

        let previous = match take_string(&mut rest, PREVIOUS_KEY)?.as_str() {
            "" => None,
            raw => Some(ContentHash::from_hex(raw).map_err(|e| malformed(PREVIOUS_KEY, e))?),
        };
        let local_timestamp = LocalTimestamp::parse(&take_string(&mut rest, TIMESTAMP_KEY)?)?;
        let version = take_string(&mut rest, VERSION_KEY)?;
        let revision_type: RevisionType = take_string(&mut rest, TYPE_KEY)?.parse()?;

        let payload = match revision_type {
            RevisionType::File => RevisionPayload::File(payload_from(rest)?),
            RevisionType::Form => {
                let keys: Vec<String> = rest
                    .keys()
                    .filter(|k| k.starts_with(FORM_KEY_PREFIX))
                    .cloned()
                    .collect();
                let mut fields = BTreeMap::new();
                for key in keys {
                    let value = take_string(&mut rest, &key)?;
                    fields.insert(key[FORM_KEY_PREFIX.len()..].to_string(), value);
                }
                let mut form: FormPayload = payload_from(rest)?;
                form.fields = fields;
                RevisionPayload::Form(form)
            }
            RevisionType::Link => RevisionPayload::Link(payload_from(rest)?),
            RevisionType::Signature => RevisionPayload::Signature(payload_from(rest)?),
            RevisionType::Witness => RevisionPayload::Witness(payload_from(rest)?),
        };

        Ok(Self {
            previous_verification_hash: previous,
            local_timestamp,
            version,
            payload,
        })
    }

    /// Canonical serialization the verification hash is computed over.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, TreeError> {
        Ok(canonical_json(&Value::Object(self.to_json_map()?))?)
    }

    pub fn verification_hash(&self) -> Result<ContentHash, TreeError> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(REVISION_DOMAIN);
        hasher.update(&self.canonical_bytes()?);
        Ok(ContentHash::from_bytes(*hasher.finalize().as_bytes()))
    }
}

fn payload_object<T: Serialize>(payload: &T) -> Result<Map<String, Value>, TreeError> {
    match serde_json::to_value(payload)? {
        Value::Object(map) => Ok(map),
        other => Err(TreeError::Serialization(format!(
            "payload serialized to non-object: {other}"
        ))),
    }
}

fn payload_from<T: for<'de> Deserialize<'de>>(rest: Map<String, Value>) -> Result<T, TreeError> {
    Ok(serde_json::from_value(Value::Object(rest))?)
}

fn take_string(map: &mut Map<String, Value>, key: &str) -> Result<String, TreeError> {
    match map.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(malformed(key, format!("expected string, got {other}"))),
        None => Err(malformed(key, "missing")),
    }
}

fn malformed(field: &str, reason: impl fmt::Display) -> TreeError {
    TreeError::MalformedRevision {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

impl Serialize for Revision {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let map = self.to_json_map().map_err(serde::ser::Error::custom)?;
        map.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Revision {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Revision::from_json_map(&map).map_err(serde::de::Error::custom)
    }
}
