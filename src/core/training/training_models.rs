use serde::{Deserialize, Serialize};

/// One course of a training programme, as described in the structure file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingCourse {
    pub name: String,
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub topics: Vec<TrainingTopic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingTopic {
    pub name: String,
    #[serde(default)]
    pub materials: Vec<TrainingMaterial>,
}

/// A document to upload; `filename` is relative to the documents directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingMaterial {
    pub title: String,
    pub filename: String,
}

pub fn parse_structure(json: &str) -> Result<Vec<TrainingCourse>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structure() {
        let json = r#"[
            {
                "name": "Onboarding",
                "topics": [
                    { "name": "Week 1", "materials": [
                        { "title": "Welcome", "filename": "welcome.docx" }
                    ]},
                    { "name": "Week 2" }
                ]
            }
        ]"#;

        let courses = parse_structure(json).unwrap();

        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].section, None);
        assert_eq!(courses[0].topics.len(), 2);
        assert_eq!(courses[0].topics[0].materials[0].filename, "welcome.docx");
        assert!(courses[0].topics[1].materials.is_empty());
    }

    #[test]
    fn test_missing_name_is_rejected() {
        assert!(parse_structure(r#"[{ "topics": [] }]"#).is_err());
    }
}
