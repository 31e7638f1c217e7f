//! Turns a questionnaire submission into the scoring feature record.

use crate::error::ValidationError;
use crate::models::{FeatureRecord, RawInput};

/// Centre and spread used to standardize one field.
#[derive(Debug, Clone, Copy)]
pub struct Standardize {
    pub mean: f64,
    pub spread: f64,
}

impl Standardize {
    pub fn apply(&self, value: f64) -> f64 {
        (value - self.mean) / self.spread
    }
}

/// Calibration range used to min-max scale one field into [0, 1].
#[derive(Debug, Clone, Copy)]
pub struct MinMax {
    pub lo: f64,
    pub hi: f64,
}

impl MinMax {
    pub fn apply(&self, value: f64) -> f64 {
        ((value - self.lo) / (self.hi - self.lo)).clamp(0.0, 1.0)
    }
}

pub const AGE_STANDARDIZE: Standardize = Standardize { mean: 18.0, spread: 2.0 };
pub const STUDY_STANDARDIZE: Standardize = Standardize { mean: 3.0, spread: 2.0 };
pub const WAEC_STANDARDIZE: Standardize = Standardize { mean: 3.0, spread: 1.5 };

pub const AGE_MINMAX: MinMax = MinMax { lo: 15.0, hi: 25.0 };
pub const STUDY_MINMAX: MinMax = MinMax { lo: 0.0, hi: 8.0 };
pub const WAEC_MINMAX: MinMax = MinMax { lo: 1.0, hi: 6.0 };

pub fn validate(input: &RawInput) -> Result<(), ValidationError> {
    if input.age == 0 {
        return Err(ValidationError::InvalidAge(input.age));
    }
    if !input.study_hours_per_day.is_finite() || input.study_hours_per_day < 0.0 {
        return Err(ValidationError::InvalidStudyHours(input.study_hours_per_day));
    }
    if input.waec_grades.is_empty() {
        return Err(ValidationError::NoGrades);
    }
    if let Some(&grade) = input.waec_grades.iter().find(|g| !(1..=6).contains(*g)) {
        return Err(ValidationError::GradeOutOfRange(grade));
    }
    Ok(())
}

pub fn waec_average(grades: &[u8]) -> f64 {
    if grades.is_empty() {
        return 0.0;
    }
    let total: u32 = grades.iter().map(|&g| g as u32).sum();
    total as f64 / grades.len() as f64
}

fn flag(set: bool) -> f64 {
    if set {
        1.0
    } else {
        0.0
    }
}

pub fn build_features(input: &RawInput) -> Result<FeatureRecord, ValidationError> {
    validate(input)?;

    let age = input.age as f64;
    let study = input.study_hours_per_day;
    let waec = waec_average(&input.waec_grades);
    let prep = &input.exam_preparation;
    let materials = &input.study_materials;

    Ok(FeatureRecord {
        age,
        study_hours_per_day: study,
        waec_average: waec,
        prep_collaborating: flag(prep.collaborating_with_study_partners),
        prep_past_papers: flag(prep.practicing_past_exam_papers),
        prep_reviewing_notes: flag(prep.reviewing_lecture_notes_and_materials),
        prep_seeking_help: flag(prep.seeking_help_from_instructors_or_tutors),
        material_lecture_notes: flag(materials.lecture_notes),
        material_online: flag(materials.online_resources),
        material_practice: flag(materials.practice_problems_and_exercises),
        material_textbooks: flag(materials.textbooks),
        material_tutorials: flag(materials.tutorials),
        material_videos: flag(materials.video_lectures),
        age_standardized: AGE_STANDARDIZE.apply(age),
        age_minmax: AGE_MINMAX.apply(age),
        study_hours_standardized: STUDY_STANDARDIZE.apply(study),
        study_hours_minmax: STUDY_MINMAX.apply(study),
        waec_average_standardized: WAEC_STANDARDIZE.apply(waec),
        waec_average_minmax: WAEC_MINMAX.apply(waec),
        first_year_gpa_standardized: 0.0,
        first_year_gpa_minmax: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExamPreparation, StudyMaterials};

    fn sample_input(age: u32, study: f64, grades: Vec<u8>) -> RawInput {
        RawInput {
            age,
            study_hours_per_day: study,
            waec_grades: grades,
            exam_preparation: ExamPreparation::default(),
            study_materials: StudyMaterials::default(),
        }
    }

    #[test]
    fn record_serializes_to_21_named_fields() {
        let record = build_features(&sample_input(19, 2.0, vec![2, 3])).unwrap();
        let value = serde_json::to_value(record).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), FeatureRecord::LEN);
        for key in [
            "Age",
            "WAEC_Average",
            "Helpful_Study_Materials_Online_resources_eg",
            "Study_Hours_Per_Day_minmax",
            "First_Year_GPA_Average_minmax",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert!(object.values().all(|v| v.is_number()));
    }

    #[test]
    fn waec_average_is_mean_of_grades() {
        let record = build_features(&sample_input(18, 1.0, vec![1, 2, 6])).unwrap();
        assert!((record.waec_average - 3.0).abs() < 1e-9);
        assert!((waec_average(&[4]) - 4.0).abs() < 1e-9);
        assert!((waec_average(&[1, 2]) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn scaled_fields_use_fixed_constants() {
        let record = build_features(&sample_input(20, 5.0, vec![4, 5])).unwrap();
        assert!((record.age_standardized - 1.0).abs() < 1e-9);
        assert!((record.age_minmax - 0.5).abs() < 1e-9);
        assert!((record.study_hours_standardized - 1.0).abs() < 1e-9);
        assert!((record.study_hours_minmax - 0.625).abs() < 1e-9);
        assert!((record.waec_average_standardized - 1.0).abs() < 1e-9);
        assert!((record.waec_average_minmax - 0.7).abs() < 1e-9);
        assert_eq!(record.first_year_gpa_standardized, 0.0);
        assert_eq!(record.first_year_gpa_minmax, 0.0);
    }

    #[test]
    fn minmax_clamps_outside_calibration_range() {
        let young = build_features(&sample_input(5, 0.0, vec![1])).unwrap();
        assert_eq!(young.age_minmax, 0.0);
        assert_eq!(young.study_hours_minmax, 0.0);
        assert_eq!(young.waec_average_minmax, 0.0);

        let old = build_features(&sample_input(30, 14.0, vec![6])).unwrap();
        assert_eq!(old.age_minmax, 1.0);
        assert_eq!(old.study_hours_minmax, 1.0);
        assert_eq!(old.waec_average_minmax, 1.0);

        for record in [young, old] {
            for value in [record.age_minmax, record.study_hours_minmax, record.waec_average_minmax] {
                assert!((0.0..=1.0).contains(&value));
            }
        }
    }

    #[test]
    fn flags_become_zero_or_one() {
        let mut input = sample_input(18, 2.0, vec![3]);
        input.exam_preparation.practicing_past_exam_papers = true;
        input.study_materials.video_lectures = true;
        let record = build_features(&input).unwrap();
        assert_eq!(record.prep_past_papers, 1.0);
        assert_eq!(record.prep_collaborating, 0.0);
        assert_eq!(record.material_videos, 1.0);
        assert_eq!(record.material_textbooks, 0.0);
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(
            build_features(&sample_input(0, 2.0, vec![3])),
            Err(ValidationError::InvalidAge(0))
        );
        assert_eq!(
            build_features(&sample_input(18, -1.0, vec![3])),
            Err(ValidationError::InvalidStudyHours(-1.0))
        );
        assert!(matches!(
            build_features(&sample_input(18, f64::NAN, vec![3])),
            Err(ValidationError::InvalidStudyHours(_))
        ));
        assert_eq!(
            build_features(&sample_input(18, 2.0, vec![])),
            Err(ValidationError::NoGrades)
        );
        assert_eq!(
            build_features(&sample_input(18, 2.0, vec![3, 7])),
            Err(ValidationError::GradeOutOfRange(7))
        );
    }

    #[test]
    fn building_is_deterministic() {
        let input = sample_input(21, 3.5, vec![2, 4, 5]);
        assert_eq!(build_features(&input), build_features(&input));
    }
}
