//! Model record
//!
//! A model as described by the `/models` endpoints. Built only by decoding
//! JSON (or through [`Model::new`]) and immutable afterwards.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};
use crate::id::{Identifier, IdentifierKind, ModelId, ObjectType, OwnerId};

const ID: &str = "Model identification";
const OBJECT: &str = "Object type";
const CREATED: &str = "Creation timestamp";
const OWNED_BY: &str = "Owner identification";
const ROOT: &str = "Root model identification";
const PARENT: &str = "Parent model identification";

/// A model exposed by the API.
///
/// `root` and `parent` refer to other models by id only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Model {
    id: ModelId,
    object: ObjectType,
    created: DateTime<Utc>,
    owned_by: OwnerId,
    root: Option<ModelId>,
    parent: Option<ModelId>,
}

impl Model {
    /// Creates a model with no root or parent.
    #[must_use]
    pub const fn new(id: ModelId, object: ObjectType, created: DateTime<Utc>, owned_by: OwnerId) -> Self {
        Self {
            id,
            object,
            created,
            owned_by,
            root: None,
            parent: None,
        }
    }

    /// Sets the root model id.
    #[must_use]
    pub fn with_root(mut self, root: ModelId) -> Self {
        self.root = Some(root);
        self
    }

    /// Sets the parent model id.
    #[must_use]
    pub fn with_parent(mut self, parent: ModelId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Decodes a model from a JSON object.
    ///
    /// `id`, `object`, `created` (epoch seconds) and `owned_by` are required.
    /// `root` and `parent` may be absent or `null`, but a present value must
    /// be a valid identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidFormat`] naming the first field that is
    /// missing or invalid.
    pub fn parse(json: &Value) -> DomainResult<Self> {
        let fields = json
            .as_object()
            .filter(|fields| !fields.is_empty())
            .ok_or_else(|| DomainError::InvalidFormat("Model JSON is empty or not an object".to_string()))?;

        Ok(Self {
            id: required(fields, "id", ID)?,
            object: required(fields, "object", OBJECT)?,
            created: fields
                .get("created")
                .and_then(Value::as_i64)
                .and_then(|seconds| Utc.timestamp_opt(seconds, 0).single())
                .ok_or_else(|| DomainError::field(CREATED))?,
            owned_by: required(fields, "owned_by", OWNED_BY)?,
            root: optional(fields, "root", ROOT)?,
            parent: optional(fields, "parent", PARENT)?,
        })
    }

    /// Decodes a model, then passes it through `hook` together with the raw JSON.
    ///
    /// # Errors
    ///
    /// Same as [`Model::parse`]; the hook only runs on success.
    pub fn parse_with<H>(json: &Value, hook: H) -> DomainResult<Self>
    where
        H: FnOnce(&Value, Self) -> Self,
    {
        Self::parse(json).map(|model| hook(json, model))
    }

    /// Decodes a model from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidFormat`] for malformed JSON or fields.
    pub fn parse_str(text: &str) -> DomainResult<Self> {
        let json: Value =
            serde_json::from_str(text).map_err(|e| DomainError::InvalidFormat(e.to_string()))?;
        Self::parse(&json)
    }

    /// Decodes a model, reporting failure as plain error text.
    ///
    /// # Errors
    ///
    /// Returns the error message of [`Model::parse`].
    pub fn try_parse(json: &Value) -> Result<Self, String> {
        Self::parse(json).map_err(|e| e.to_string())
    }

    /// Encodes the model; `root` and `parent` are emitted only when present.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.fields())
    }

    /// Encodes the model, then lets `hook` rewrite the emitted fields.
    #[must_use]
    pub fn to_json_with<H>(&self, hook: H) -> Value
    where
        H: FnOnce(&Self, Map<String, Value>) -> Map<String, Value>,
    {
        Value::Object(hook(self, self.fields()))
    }

    fn fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("id".into(), Value::from(self.id.as_str()));
        fields.insert("object".into(), Value::from(self.object.as_str()));
        fields.insert("created".into(), Value::from(self.created.timestamp()));
        fields.insert("owned_by".into(), Value::from(self.owned_by.as_str()));
        if let Some(root) = &self.root {
            fields.insert("root".into(), Value::from(root.as_str()));
        }
        if let Some(parent) = &self.parent {
            fields.insert("parent".into(), Value::from(parent.as_str()));
        }
        fields
    }

    /// Model id.
    #[must_use]
    pub const fn id(&self) -> &ModelId {
        &self.id
    }

    /// Object-type tag, normally `"model"`.
    #[must_use]
    pub const fn object(&self) -> &ObjectType {
        &self.object
    }

    /// Creation time (UTC, second precision on the wire).
    #[must_use]
    pub const fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Owner id.
    #[must_use]
    pub const fn owned_by(&self) -> &OwnerId {
        &self.owned_by
    }

    /// Id of the root model, if any.
    #[must_use]
    pub const fn root(&self) -> Option<&ModelId> {
        self.root.as_ref()
    }

    /// Id of the parent model, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<&ModelId> {
        self.parent.as_ref()
    }
}

fn required<K: IdentifierKind>(
    fields: &Map<String, Value>,
    key: &str,
    description: &str,
) -> DomainResult<Identifier<K>> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .and_then(Identifier::try_parse)
        .ok_or_else(|| DomainError::field(description))
}

fn optional<K: IdentifierKind>(
    fields: &Map<String, Value>,
    key: &str,
    description: &str,
) -> DomainResult<Option<Identifier<K>>> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_str()
            .and_then(Identifier::try_parse)
            .map(Some)
            .ok_or_else(|| DomainError::field(description)),
    }
}

impl Serialize for Model {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = Value::deserialize(deserializer)?;
        Self::parse(&json).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use serde_json::json;

    fn curie() -> Value {
        json!({
            "id": "text-curie:001",
            "object": "model",
            "created": 1_641_955_047,
            "owned_by": "system",
            "root": "text-curie:001",
            "parent": null
        })
    }

    #[test]
    fn test_parse_full_record() {
        let model = Model::parse(&curie()).unwrap();

        assert_eq!(model.id().as_str(), "text-curie:001");
        assert_eq!(model.object().as_str(), "model");
        assert_eq!(model.created(), Utc.timestamp_opt(1_641_955_047, 0).unwrap());
        assert_eq!(model.owned_by().as_str(), "system");
        assert_eq!(model.root().map(ModelId::as_str), Some("text-curie:001"));
        assert_eq!(model.parent(), None);
    }

    #[test]
    fn test_parse_rejects_empty_object() {
        assert!(Model::parse(&json!({})).is_err());
        assert!(Model::parse(&Value::Null).is_err());
        assert!(Model::parse(&json!(["id"])).is_err());
    }

    #[test]
    fn test_missing_required_fields_are_named() {
        let cases = [
            ("id", "Model identification invalid or missing"),
            ("object", "Object type invalid or missing"),
            ("created", "Creation timestamp invalid or missing"),
            ("owned_by", "Owner identification invalid or missing"),
        ];
        for (field, message) in cases {
            let mut json = curie();
            json.as_object_mut().unwrap().remove(field);
            assert_eq!(Model::try_parse(&json), Err(message.to_string()), "field {field}");
        }
    }

    #[test]
    fn test_blank_identifier_is_invalid() {
        let mut json = curie();
        json["owned_by"] = json!("   ");
        assert_eq!(
            Model::parse(&json),
            Err(DomainError::field("Owner identification"))
        );
    }

    #[test]
    fn test_created_must_be_integer_seconds() {
        let mut json = curie();
        json["created"] = json!("2022-01-12");
        assert!(Model::parse(&json).is_err());

        json["created"] = json!(1.5);
        assert!(Model::parse(&json).is_err());
    }

    #[test]
    fn test_invalid_optional_field_fails_closed() {
        let mut json = curie();
        json["parent"] = json!("");
        assert_eq!(
            Model::try_parse(&json),
            Err("Parent model identification invalid or missing".to_string())
        );

        json["parent"] = json!(12);
        assert!(Model::parse(&json).is_err());
    }

    #[test]
    fn test_optional_fields_are_independent() {
        let json = json!({
            "id": "ft-abc",
            "object": "model",
            "created": 0,
            "owned_by": "user-1",
            "parent": "davinci"
        });
        let model = Model::parse(&json).unwrap();
        assert_eq!(model.root(), None);
        assert_eq!(model.parent().map(ModelId::as_str), Some("davinci"));
    }

    #[test]
    fn test_to_json_omits_absent_optionals() {
        let model = Model::parse(&curie()).unwrap();
        let json = model.to_json();

        assert_eq!(
            json,
            json!({
                "id": "text-curie:001",
                "object": "model",
                "created": 1_641_955_047,
                "owned_by": "system",
                "root": "text-curie:001"
            })
        );
    }

    #[test]
    fn test_parse_hook_can_replace_record() {
        let model = Model::parse_with(&curie(), |raw, model| {
            assert_eq!(raw["owned_by"], "system");
            model.with_parent(ModelId::parse("curie").unwrap())
        })
        .unwrap();
        assert_eq!(model.parent().map(ModelId::as_str), Some("curie"));
    }

    #[test]
    fn test_serialize_hook_can_add_fields() {
        let model = Model::parse(&curie()).unwrap();
        let json = model.to_json_with(|_, mut fields| {
            fields.insert("permission".into(), json!([]));
            fields
        });
        assert_eq!(json["permission"], json!([]));
        assert_eq!(json["id"], "text-curie:001");
    }

    #[test]
    fn test_parse_str() {
        let model = Model::parse_str(&curie().to_string()).unwrap();
        assert_eq!(model.owned_by().as_str(), "system");
        assert!(matches!(
            Model::parse_str("{"),
            Err(DomainError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip_through_value() {
        let model = Model::parse(&curie()).unwrap();
        let text = serde_json::to_string(&model).unwrap();
        let back: Model = serde_json::from_str(&text).unwrap();
        assert_eq!(back, model);
    }

    #[test]
    fn test_equality_ignores_identifier_case() {
        let mut upper = curie();
        upper["id"] = json!("TEXT-CURIE:001");
        assert_eq!(Model::parse(&upper).unwrap(), Model::parse(&curie()).unwrap());
    }

    fn identifier() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9][a-zA-Z0-9:._-]{0,24}"
    }

    proptest! {
        #[test]
        fn prop_roundtrip(
            id in identifier(),
            owner in identifier(),
            created in 0i64..4_102_444_800,
            root in proptest::option::of(identifier()),
            parent in proptest::option::of(identifier()),
        ) {
            let mut model = Model::new(
                ModelId::parse(&id).unwrap(),
                ObjectType::parse("model").unwrap(),
                Utc.timestamp_opt(created, 0).unwrap(),
                OwnerId::parse(&owner).unwrap(),
            );
            if let Some(root) = root {
                model = model.with_root(ModelId::parse(&root).unwrap());
            }
            if let Some(parent) = parent {
                model = model.with_parent(ModelId::parse(&parent).unwrap());
            }

            let decoded = Model::parse(&model.to_json()).unwrap();
            prop_assert_eq!(decoded, model);
        }
    }
}
