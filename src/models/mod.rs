use crate::entities::{categories, materials};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown value '{0}'")]
pub struct UnknownValue(pub String);

/// Grade bucket a material is published under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum MaterialClass {
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "12-science")]
    TwelveScience,
    #[serde(rename = "12-commerce")]
    TwelveCommerce,
    #[serde(rename = "12-arts")]
    TwelveArts,
}

impl MaterialClass {
    pub const ALL: [MaterialClass; 4] = [
        MaterialClass::Ten,
        MaterialClass::TwelveScience,
        MaterialClass::TwelveCommerce,
        MaterialClass::TwelveArts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialClass::Ten => "10",
            MaterialClass::TwelveScience => "12-science",
            MaterialClass::TwelveCommerce => "12-commerce",
            MaterialClass::TwelveArts => "12-arts",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialClass::Ten => "Class 10th",
            MaterialClass::TwelveScience => "Class 12th - Science",
            MaterialClass::TwelveCommerce => "Class 12th - Commerce",
            MaterialClass::TwelveArts => "Class 12th - Arts",
        }
    }

    /// Tag used to match categories against this class.
    pub fn category_tag(&self) -> ClassAssociation {
        class_tag_of(self.as_str())
    }
}

impl fmt::Display for MaterialClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialClass {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MaterialClass::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownValue(s.to_string()))
    }
}

/// Any class string beginning with "12" belongs to the "12" tag, everything else to "10".
pub fn class_tag_of(class: &str) -> ClassAssociation {
    if class.starts_with("12") {
        ClassAssociation::Twelve
    } else {
        ClassAssociation::Ten
    }
}

/// Grade level(s) a category is offered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum ClassAssociation {
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "12")]
    Twelve,
    #[serde(rename = "both")]
    Both,
}

impl ClassAssociation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassAssociation::Ten => "10",
            ClassAssociation::Twelve => "12",
            ClassAssociation::Both => "both",
        }
    }
}

impl fmt::Display for ClassAssociation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassAssociation {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "10" => Ok(ClassAssociation::Ten),
            "12" => Ok(ClassAssociation::Twelve),
            "both" => Ok(ClassAssociation::Both),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Doc,
    Zip,
}

impl FileType {
    /// Unrecognized or missing extensions fall back to `Pdf`.
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let ext = path
            .rsplit_once('.')
            .filter(|(_, ext)| !ext.contains('/'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        match ext.as_deref() {
            Some("doc") | Some("docx") => FileType::Doc,
            Some("zip") => FileType::Zip,
            _ => FileType::Pdf,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub class_association: String,
    pub parent_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<categories::Model> for CategoryResponse {
    fn from(m: categories::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            class_association: m.class_association,
            parent_id: m.parent_id,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MaterialResponse {
    pub id: String,
    pub title: String,
    pub class: String,
    pub category_id: Option<String>,
    pub file_url: String,
    pub file_path: Option<String>,
    pub file_type: FileType,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}

impl From<materials::Model> for MaterialResponse {
    fn from(m: materials::Model) -> Self {
        let file_type = FileType::from_path(m.file_path.as_deref().unwrap_or(&m.file_url));
        Self {
            id: m.id,
            title: m.title,
            class: m.class,
            category_id: m.category_id,
            file_url: m.file_url,
            file_path: m.file_path,
            file_type,
            size: m.size,
            created_at: m.created_at,
        }
    }
}
