use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A historical artifact record as returned by the service.
///
/// Missing text fields decode as empty strings and a missing like count as 0.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Artifact {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub image: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub historical_context: String,
    pub description: String,
    pub created_at: String,
    pub discovered_at: String,
    pub discovered_by: String,
    pub present_location: String,
    pub adder_name: String,
    pub adder_email: String,
    pub like_count: i64,
}

impl Artifact {
    /// Like count as shown to users (never negative)
    pub fn display_likes(&self) -> u64 {
        self.like_count.max(0) as u64
    }

    /// Whether `email` submitted this artifact
    pub fn is_owned_by(&self, email: &str) -> bool {
        !email.is_empty() && self.adder_email.eq_ignore_ascii_case(email)
    }
}

/// Descriptive fields of an artifact, as entered in the add and edit forms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtifactForm {
    pub name: String,
    pub image: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub historical_context: String,
    pub description: String,
    pub created_at: String,
    pub discovered_at: String,
    pub discovered_by: String,
    pub present_location: String,
}

/// Body of `PATCH /artifacts/{id}`.
pub type ArtifactUpdate = ArtifactForm;

impl From<&Artifact> for ArtifactForm {
    fn from(a: &Artifact) -> Self {
        Self {
            name: a.name.clone(),
            image: a.image.clone(),
            artifact_type: a.artifact_type.clone(),
            historical_context: a.historical_context.clone(),
            description: a.description.clone(),
            created_at: a.created_at.clone(),
            discovered_at: a.discovered_at.clone(),
            discovered_by: a.discovered_by.clone(),
            present_location: a.present_location.clone(),
        }
    }
}

/// Body of `POST /artifacts`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArtifact {
    #[serde(flatten)]
    pub form: ArtifactForm,
    pub adder_name: String,
    pub adder_email: String,
}

/// Write acknowledgement returned by create/update/delete/like/dislike.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MutationAck {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Artifact categories offered by the submission form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactType {
    Tools,
    Weapons,
    Documents,
    Writings,
    Pottery,
    Jewelry,
    Clothing,
    #[serde(rename = "Religious Items")]
    ReligiousItems,
    Art,
    Other,
}

impl ArtifactType {
    pub const ALL: [ArtifactType; 10] = [
        ArtifactType::Tools,
        ArtifactType::Weapons,
        ArtifactType::Documents,
        ArtifactType::Writings,
        ArtifactType::Pottery,
        ArtifactType::Jewelry,
        ArtifactType::Clothing,
        ArtifactType::ReligiousItems,
        ArtifactType::Art,
        ArtifactType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactType::Tools => "Tools",
            ArtifactType::Weapons => "Weapons",
            ArtifactType::Documents => "Documents",
            ArtifactType::Writings => "Writings",
            ArtifactType::Pottery => "Pottery",
            ArtifactType::Jewelry => "Jewelry",
            ArtifactType::Clothing => "Clothing",
            ArtifactType::ReligiousItems => "Religious Items",
            ArtifactType::Art => "Art",
            ArtifactType::Other => "Other",
        }
    }
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ArtifactType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown artifact type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_artifact_response() {
        let json = r#"{
            "_id": "65f1c2",
            "name": "Rosetta Stone",
            "image": "https://example.org/rosetta.jpg",
            "type": "Writings",
            "historicalContext": "Ptolemaic decree",
            "description": "Granodiorite stele",
            "createdAt": "196 BC",
            "discoveredAt": "1799",
            "discoveredBy": "Pierre-François Bouchard",
            "presentLocation": "British Museum",
            "adderName": "Ada",
            "adderEmail": "ada@example.org",
            "likeCount": 4,
            "likedBy": ["x@example.org"]
        }"#;

        let a: Artifact = serde_json::from_str(json).expect("Failed to parse artifact test JSON");
        assert_eq!(a.id, "65f1c2");
        assert_eq!(a.artifact_type, "Writings");
        assert_eq!(a.historical_context, "Ptolemaic decree");
        assert_eq!(a.like_count, 4);
        assert!(a.is_owned_by("ADA@example.org"));
        assert!(!a.is_owned_by(""));
    }

    #[test]
    fn test_sparse_artifact_uses_defaults() {
        let a: Artifact = serde_json::from_str(r#"{"id":"42","likeCount":-3}"#).unwrap();
        assert_eq!(a.id, "42");
        assert_eq!(a.name, "");
        assert_eq!(a.display_likes(), 0);
    }

    #[test]
    fn test_new_artifact_serializes_flat_camel_case() {
        let new = NewArtifact {
            form: ArtifactForm {
                name: "Bronze dagger".to_string(),
                artifact_type: ArtifactType::Weapons.to_string(),
                historical_context: "Late Bronze Age".to_string(),
                ..Default::default()
            },
            adder_name: "Ada".to_string(),
            adder_email: "ada@example.org".to_string(),
        };

        let value = serde_json::to_value(&new).unwrap();
        assert_eq!(value["name"], "Bronze dagger");
        assert_eq!(value["type"], "Weapons");
        assert_eq!(value["historicalContext"], "Late Bronze Age");
        assert_eq!(value["adderEmail"], "ada@example.org");
        assert!(value.get("form").is_none());
    }

    #[test]
    fn test_artifact_type_from_str() {
        assert_eq!("religious items".parse::<ArtifactType>(), Ok(ArtifactType::ReligiousItems));
        assert_eq!(" Pottery ".parse::<ArtifactType>(), Ok(ArtifactType::Pottery));
        assert!("Spaceship".parse::<ArtifactType>().is_err());
        assert_eq!(ArtifactType::ALL.len(), 10);
    }
}
