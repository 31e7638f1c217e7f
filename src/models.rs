use serde::{Deserialize, Serialize};

use crate::risk::RiskTier;

/// Explicit per-user context passed to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct StudentSession {
    pub student_id: Option<String>,
}

impl StudentSession {
    pub fn new(student_id: Option<String>) -> Self {
        let student_id = student_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty());
        Self { student_id }
    }

    pub fn welcome(&self) -> Option<String> {
        self.student_id.as_ref().map(|id| {
            format!("Welcome, {id}. Please complete the form below.")
        })
    }

    pub fn label(&self) -> &str {
        self.student_id.as_deref().unwrap_or("anonymous")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExamPreparation {
    pub collaborating_with_study_partners: bool,
    pub practicing_past_exam_papers: bool,
    pub reviewing_lecture_notes_and_materials: bool,
    pub seeking_help_from_instructors_or_tutors: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyMaterials {
    pub lecture_notes: bool,
    pub online_resources: bool,
    pub practice_problems_and_exercises: bool,
    pub textbooks: bool,
    pub tutorials: bool,
    pub video_lectures: bool,
}

/// A questionnaire submission as the student entered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    pub age: u32,
    pub study_hours_per_day: f64,
    pub waec_grades: Vec<u8>,
    #[serde(default)]
    pub exam_preparation: ExamPreparation,
    #[serde(default)]
    pub study_materials: StudyMaterials,
}

/// The 21-field vector the scoring service was trained on.
///
/// Field names on the wire follow the training schema exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Study_Hours_Per_Day")]
    pub study_hours_per_day: f64,
    #[serde(rename = "WAEC_Average")]
    pub waec_average: f64,

    #[serde(rename = "Exam_Preparation_Collaborating_with_study_partners")]
    pub prep_collaborating: f64,
    #[serde(rename = "Exam_Preparation_Practicing_past_exam_papers")]
    pub prep_past_papers: f64,
    #[serde(rename = "Exam_Preparation_Reviewing_lecture_notes_and_materials")]
    pub prep_reviewing_notes: f64,
    #[serde(rename = "Exam_Preparation_Seeking_help_from_instructors_or_tutors")]
    pub prep_seeking_help: f64,

    #[serde(rename = "Helpful_Study_Materials_Lecture_notes")]
    pub material_lecture_notes: f64,
    #[serde(rename = "Helpful_Study_Materials_Online_resources_eg")]
    pub material_online: f64,
    #[serde(rename = "Helpful_Study_Materials_Practice_problems_and_exercises")]
    pub material_practice: f64,
    #[serde(rename = "Helpful_Study_Materials_Textbooks")]
    pub material_textbooks: f64,
    #[serde(rename = "Helpful_Study_Materials_tutorials")]
    pub material_tutorials: f64,
    #[serde(rename = "Helpful_Study_Materials_video_lectures")]
    pub material_videos: f64,

    #[serde(rename = "Age_standardized")]
    pub age_standardized: f64,
    #[serde(rename = "Age_minmax")]
    pub age_minmax: f64,
    #[serde(rename = "Study_Hours_Per_Day_standardized")]
    pub study_hours_standardized: f64,
    #[serde(rename = "Study_Hours_Per_Day_minmax")]
    pub study_hours_minmax: f64,
    #[serde(rename = "WAEC_Average_standardized")]
    pub waec_average_standardized: f64,
    #[serde(rename = "WAEC_Average_minmax")]
    pub waec_average_minmax: f64,

    // Placeholders for the target columns of the training schema.
    #[serde(rename = "First_Year_GPA_Average_standardized")]
    pub first_year_gpa_standardized: f64,
    #[serde(rename = "First_Year_GPA_Average_minmax")]
    pub first_year_gpa_minmax: f64,
}

impl FeatureRecord {
    pub const LEN: usize = 21;
}

/// Where the predicted GPA came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub gpa: f64,
    pub risk: RiskTier,
    pub suggestions: Vec<String>,
    pub source: PredictionSource,
}

/// One row of an advisor roster, loaded from CSV.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RosterEntry {
    pub student_id: String,
    pub predicted_gpa: String,
    pub key_predictors: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierSummary {
    pub tier: RiskTier,
    pub count: usize,
    pub avg_gpa: f64,
}
