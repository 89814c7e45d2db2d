use std::fmt;

use serde::{Deserialize, Serialize};

/// A persisted project row
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub person: String,
    pub client: String,
    pub contact: String,
    pub achievements: f64,
    pub price: f64,
    #[serde(with = "flag")]
    pub finished: bool,
}

impl Project {
    /// The replacement record an update would send for this project
    pub fn fields(&self) -> ProjectFields {
        ProjectFields {
            title: self.title.clone(),
            description: self.description.clone(),
            deadline: self.deadline.clone(),
            person: self.person.clone(),
            client: self.client.clone(),
            contact: self.contact.clone(),
            achievements: self.achievements,
            price: self.price,
            finished: self.finished,
        }
    }
}

/// Create request body. Everything is optional on the wire so that missing
/// required fields surface as a validation error rather than a parse error.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NewProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achievements: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, with = "flag::optional", skip_serializing_if = "Option::is_none")]
    pub finished: Option<bool>,
}

/// Required fields absent or empty on a create request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields(pub Vec<&'static str>);

impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Missing required fields: {}", self.0.join(", "))
    }
}

impl std::error::Error for MissingFields {}

impl NewProject {
    /// Check the required fields and apply defaults to the optional ones
    pub fn validate(self) -> Result<ProjectFields, MissingFields> {
        fn present(value: &Option<String>) -> bool {
            value.as_deref().is_some_and(|v| !v.is_empty())
        }

        let mut missing = Vec::new();
        if !present(&self.title) {
            missing.push("title");
        }
        if !present(&self.deadline) {
            missing.push("deadline");
        }
        if !present(&self.person) {
            missing.push("person");
        }
        if !missing.is_empty() {
            return Err(MissingFields(missing));
        }

        Ok(ProjectFields {
            title: self.title.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            deadline: self.deadline.unwrap_or_default(),
            person: self.person.unwrap_or_default(),
            client: self.client.unwrap_or_default(),
            contact: self.contact.unwrap_or_default(),
            achievements: self.achievements.unwrap_or(0.0),
            price: self.price.unwrap_or(0.0),
            finished: self.finished.unwrap_or(false),
        })
    }
}

/// Every writable column of a project. Used as the update request body and
/// as the checked input to an insert.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProjectFields {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub deadline: String,
    pub person: String,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub achievements: f64,
    #[serde(default)]
    pub price: f64,
    #[serde(default, with = "flag")]
    pub finished: bool,
}

/// `finished` travels as 0/1 but is accepted as a bool or any integer.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Float(f64),
    }

    impl From<Flag> for bool {
        fn from(flag: Flag) -> Self {
            match flag {
                Flag::Bool(b) => b,
                Flag::Int(i) => i != 0,
                Flag::Float(f) => f != 0.0,
            }
        }
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Flag::deserialize(deserializer).map(bool::from)
    }

    pub mod optional {
        use super::Flag;
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => super::serialize(v, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
            Ok(Option::<Flag>::deserialize(deserializer)?.map(bool::from))
        }
    }
}
