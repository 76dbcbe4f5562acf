//! Wire types for the Firestore `documents:commit` REST call.
//!
//! Only the subset needed to create documents is modelled: typed field values,
//! a server timestamp transform and a create-only precondition.

use std::collections::BTreeMap;

use locality_core::LocationRecord;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};

/// Length of client-generated document identifiers.
pub(super) const AUTO_ID_LEN: usize = 20;

/// Field receiving the server-assigned creation timestamp.
pub(super) const CREATED_AT_FIELD: &str = "createdAt";

/// Body of a `documents:commit` request.
#[derive(Debug, Serialize)]
pub(super) struct CommitRequest<'a> {
    pub(super) writes: Vec<Write<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct Write<'a> {
    pub(super) update: Document<'a>,
    pub(super) update_transforms: [FieldTransform; 1],
    pub(super) current_document: Precondition,
}

#[derive(Debug, Serialize)]
pub(super) struct Document<'a> {
    pub(super) name: String,
    pub(super) fields: BTreeMap<&'static str, Value<'a>>,
}

/// Firestore typed value. Serialises as `{"stringValue": ...}` and friends.
#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) enum Value<'a> {
    StringValue(&'a str),
    GeoPointValue(LatLng),
}

#[derive(Debug, PartialEq, Serialize)]
pub(super) struct LatLng {
    pub(super) latitude: f64,
    pub(super) longitude: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct FieldTransform {
    pub(super) field_path: &'static str,
    pub(super) set_to_server_value: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct Precondition {
    pub(super) exists: bool,
}

/// Successful commit response; only the write count is inspected.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CommitResponse {
    #[serde(default)]
    pub(super) write_results: Vec<serde_json::Value>,
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorEnvelope {
    pub(super) error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    #[serde(default)]
    pub(super) message: String,
    #[serde(default)]
    pub(super) status: String,
}

/// Generate a document id in Firestore's auto-id alphabet.
pub(super) fn auto_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.sample_iter(Alphanumeric)
        .take(AUTO_ID_LEN)
        .map(char::from)
        .collect()
}

/// Map a record onto Firestore's stored field names.
pub(super) fn fields(record: &LocationRecord) -> BTreeMap<&'static str, Value<'_>> {
    BTreeMap::from([
        ("name", Value::StringValue(&record.name)),
        ("name_lower", Value::StringValue(&record.name_lower)),
        ("governorate", Value::StringValue(&record.governorate)),
        ("governorateCode", Value::StringValue(&record.governorate_code)),
        ("delegation", Value::StringValue(&record.delegation)),
        ("country", Value::StringValue(&record.country)),
        ("countryCode", Value::StringValue(record.country_code)),
        (
            "location",
            Value::GeoPointValue(LatLng {
                latitude: record.latitude(),
                longitude: record.longitude(),
            }),
        ),
    ])
}

/// Build the create-only write for `record` under `collection_path`.
pub(super) fn create_write<'a, R: Rng + ?Sized>(
    collection_path: &str,
    record: &'a LocationRecord,
    rng: &mut R,
) -> Write<'a> {
    Write {
        update: Document {
            name: format!("{collection_path}/{}", auto_id(rng)),
            fields: fields(record),
        },
        update_transforms: [FieldTransform {
            field_path: CREATED_AT_FIELD,
            set_to_server_value: "REQUEST_TIME",
        }],
        current_document: Precondition { exists: false },
    }
}
