//! Records, batches, and per-entity containers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::EntityType;

/// Field the scorer writes the ranking score into.
pub const SCORE_FIELD: &str = "score";

/// A single record as returned by the data API.
///
/// The structure is opaque apart from the ranking score the scorer attaches. Fields are kept in
/// a sorted map, so the serialized form of a record is canonical.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRecord(Map<String, Value>);

impl ResultRecord {
    /// Wraps a JSON value, returning `None` if it is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Returns the value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns all fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Returns the ranking score, if one is attached and numeric.
    pub fn score(&self) -> Option<f64> {
        self.0.get(SCORE_FIELD).and_then(Value::as_f64)
    }

    /// Returns the ranking score, treating a missing score as zero.
    pub fn score_or_zero(&self) -> f64 {
        self.score().unwrap_or(0.0)
    }

    /// Attaches or replaces the ranking score.
    ///
    /// Non-finite scores are stored as zero, since JSON cannot represent them.
    pub fn set_score(&mut self, score: f64) {
        let value = serde_json::Number::from_f64(score)
            .map_or_else(|| Value::from(0.0), Value::Number);
        self.0.insert(SCORE_FIELD.to_string(), value);
    }

    /// Returns the key used to recognize the same record across batches.
    ///
    /// This is the JSON text of `id_field` when present, so the string `"42"` and the number `42`
    /// are different records. Records without it are identified by their canonical JSON text with
    /// the score removed, so rescoring never changes identity.
    pub fn identity(&self, id_field: &str) -> String {
        match self.0.get(id_field) {
            Some(Value::Null) | None => {
                let mut unscored = self.0.clone();
                unscored.remove(SCORE_FIELD);
                Value::Object(unscored).to_string()
            }
            Some(id) => id.to_string(),
        }
    }
}

/// One entity-type-scoped, scored slice of a single resolved call's response.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultBatch {
    /// Scored records in the order the data API returned them.
    pub results: Vec<ResultRecord>,
    /// Whether the records are selected (`true`) or excluded (`false`) from the merged list.
    pub to_include: bool,
}

impl ResultBatch {
    /// Creates a batch.
    pub fn new(results: Vec<ResultRecord>, to_include: bool) -> Self {
        Self {
            results,
            to_include,
        }
    }

    /// Creates a selecting batch.
    pub fn include(results: Vec<ResultRecord>) -> Self {
        Self::new(results, true)
    }

    /// Creates an excluding batch.
    pub fn exclude(results: Vec<ResultRecord>) -> Self {
        Self::new(results, false)
    }
}

/// One value per entity type.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct PerEntity<T> {
    /// Value for scenes.
    pub scene: T,
    /// Value for levels.
    pub level: T,
    /// Value for rooms.
    pub room: T,
}

impl<T> PerEntity<T> {
    /// Builds a value for every entity type.
    pub fn from_fn(mut f: impl FnMut(EntityType) -> T) -> Self {
        Self {
            scene: f(EntityType::Scene),
            level: f(EntityType::Level),
            room: f(EntityType::Room),
        }
    }

    /// Returns the value for an entity type.
    pub fn get(&self, entity: EntityType) -> &T {
        match entity {
            EntityType::Scene => &self.scene,
            EntityType::Level => &self.level,
            EntityType::Room => &self.room,
        }
    }

    /// Returns the value for an entity type mutably.
    pub fn get_mut(&mut self, entity: EntityType) -> &mut T {
        match entity {
            EntityType::Scene => &mut self.scene,
            EntityType::Level => &mut self.level,
            EntityType::Room => &mut self.room,
        }
    }

    /// Maps every value, keeping the entity association.
    pub fn map<U>(self, mut f: impl FnMut(EntityType, T) -> U) -> PerEntity<U> {
        PerEntity {
            scene: f(EntityType::Scene, self.scene),
            level: f(EntityType::Level, self.level),
            room: f(EntityType::Room, self.room),
        }
    }
}

impl<T> PerEntity<Vec<T>> {
    /// Number of items per entity type.
    pub fn counts(&self) -> PerEntity<usize> {
        PerEntity {
            scene: self.scene.len(),
            level: self.level.len(),
            room: self.room.len(),
        }
    }

    /// True when every entity type is empty.
    pub fn is_empty(&self) -> bool {
        self.scene.is_empty() && self.level.is_empty() && self.room.is_empty()
    }
}
