use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fixed schema the structuring service fills from resume text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub links: Vec<String>,
    pub skills: Vec<String>,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub company: Option<String>,
    pub role: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub summary: Option<String>,
}

/// Keys every serialized profile carries.
pub const PROFILE_KEYS: [&str; 8] = [
    "full_name",
    "email",
    "phone",
    "location",
    "links",
    "skills",
    "education",
    "experience",
];

impl ResumeProfile {
    /// Builds a profile from loosely-shaped model output.
    ///
    /// Unknown keys are ignored, scalars are stringified, and list items that
    /// don't fit the schema are dropped individually instead of failing the record.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            full_name: scalar(obj, "full_name"),
            email: scalar(obj, "email"),
            phone: scalar(obj, "phone"),
            location: scalar(obj, "location"),
            links: string_list(obj, "links"),
            skills: string_list(obj, "skills"),
            education: object_list(obj, "education"),
            experience: object_list(obj, "experience"),
        }
    }

    /// The profile as JSON with null and empty values removed.
    pub fn filtered(&self) -> Value {
        let full = serde_json::to_value(self).unwrap_or(Value::Null);
        let mut filtered = Map::new();
        if let Value::Object(fields) = full {
            for (key, value) in fields {
                if !is_blank(&value) {
                    filtered.insert(key, value);
                }
            }
        }
        Value::Object(filtered)
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

fn scalar(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    match obj.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => vec![],
    }
}

fn object_list<T: serde::de::DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Vec<T> {
    obj.get(key)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter(|item| item.is_object())
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}
