use crate::models::{RiskBand, SymptomEvent, VitalEvent};
use crate::vocabulary::SymptomVocabulary;
use crate::window::{last_n, WindowedEvents};

/// Score when the window holds nothing: "not enough data", not "safe".
pub const BASELINE_SCORE: f64 = 0.1;

pub const VITALS_SAMPLED: usize = 3;
pub const SYMPTOMS_SAMPLED: usize = 5;

pub const MEDIUM_THRESHOLD: f64 = 0.33;
pub const HIGH_THRESHOLD: f64 = 0.66;

const SEVERE_BP_WEIGHT: f64 = 0.4;
const ELEVATED_BP_WEIGHT: f64 = 0.25;
const CONCERNING_SYMPTOM_WEIGHT: f64 = 0.3;
const MODERATE_SYMPTOM_WEIGHT: f64 = 0.15;
const LOW_MOOD_WEIGHT: f64 = 0.1;

pub const LOW_MOOD_MAX: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BloodPressureLevel {
    Normal,
    Elevated,
    Severe,
}

pub fn blood_pressure_level(vital: &VitalEvent) -> BloodPressureLevel {
    if vital.systolic_bp >= 160 || vital.diastolic_bp >= 110 {
        BloodPressureLevel::Severe
    } else if vital.systolic_bp >= 140 || vital.diastolic_bp >= 90 {
        BloodPressureLevel::Elevated
    } else {
        BloodPressureLevel::Normal
    }
}

pub fn has_low_mood(symptom: &SymptomEvent) -> bool {
    symptom.mood <= LOW_MOOD_MAX
}

fn vital_weight(vital: &VitalEvent) -> f64 {
    match blood_pressure_level(vital) {
        BloodPressureLevel::Severe => SEVERE_BP_WEIGHT,
        BloodPressureLevel::Elevated => ELEVATED_BP_WEIGHT,
        BloodPressureLevel::Normal => 0.0,
    }
}

fn symptom_weight(symptom: &SymptomEvent, vocabulary: &SymptomVocabulary) -> f64 {
    let mut weight = 0.0;
    if vocabulary.any_concerning(&symptom.symptoms) {
        weight += CONCERNING_SYMPTOM_WEIGHT;
    }
    if vocabulary.any_moderate(&symptom.symptoms) {
        weight += MODERATE_SYMPTOM_WEIGHT;
    }
    if has_low_mood(symptom) {
        weight += LOW_MOOD_WEIGHT;
    }
    weight
}

/// Additive rule score over the most recent vitals and symptoms, clamped to [0, 1].
pub fn score_window(window: &WindowedEvents<'_>, vocabulary: &SymptomVocabulary) -> f64 {
    if window.is_empty() {
        return BASELINE_SCORE;
    }

    let mut total = 0.0;
    for vital in last_n(&window.vitals, VITALS_SAMPLED) {
        total += vital_weight(vital);
    }
    for symptom in last_n(&window.symptoms, SYMPTOMS_SAMPLED) {
        total += symptom_weight(symptom, vocabulary);
    }

    total.clamp(0.0, 1.0)
}

pub fn band_for_score(score: f64) -> RiskBand {
    if score < MEDIUM_THRESHOLD {
        RiskBand::Low
    } else if score < HIGH_THRESHOLD {
        RiskBand::Medium
    } else {
        RiskBand::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::SymptomTag;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    fn vital(systolic: u32, diastolic: u32) -> VitalEvent {
        VitalEvent {
            patient_id: "p1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 11, 17, 8, 0, 0).unwrap(),
            gestational_week: 30,
            systolic_bp: systolic,
            diastolic_bp: diastolic,
            heart_rate: 88,
            weight_kg: 72.5,
        }
    }

    fn symptom(tags: &[&str], mood: u8) -> SymptomEvent {
        SymptomEvent {
            patient_id: "p1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 11, 17, 8, 0, 0).unwrap() + Duration::minutes(5),
            gestational_week: 30,
            symptoms: tags.iter().map(|t| SymptomTag::parse(t).unwrap()).collect(),
            mood,
            notes: None,
        }
    }

    fn score(symptoms: &[SymptomEvent], vitals: &[VitalEvent]) -> f64 {
        let window = WindowedEvents {
            symptoms: symptoms.iter().collect(),
            vitals: vitals.iter().collect(),
        };
        score_window(&window, &SymptomVocabulary::default())
    }

    #[test]
    fn empty_window_scores_baseline() {
        assert_eq!(score(&[], &[]), BASELINE_SCORE);
        assert_eq!(band_for_score(BASELINE_SCORE), RiskBand::Low);
    }

    #[test]
    fn blood_pressure_brackets_are_exclusive() {
        assert_eq!(score(&[], &[vital(170, 80)]), 0.4);
        assert_eq!(score(&[], &[vital(120, 112)]), 0.4);
        assert_eq!(score(&[], &[vital(145, 80)]), 0.25);
        assert_eq!(score(&[], &[vital(120, 90)]), 0.25);
        assert_eq!(score(&[], &[vital(139, 89)]), 0.0);
    }

    #[test]
    fn only_last_three_vitals_count() {
        let vitals = vec![vital(170, 80), vital(120, 80), vital(120, 80), vital(120, 80)];
        assert_eq!(score(&[], &vitals), 0.0);
    }

    #[test]
    fn only_last_five_symptoms_count() {
        let mut symptoms = vec![symptom(&["heavy_bleeding"], 5)];
        symptoms.extend((0..5).map(|_| symptom(&["nausea"], 4)));
        assert_eq!(score(&symptoms, &[]), 0.0);
    }

    #[test]
    fn symptom_contributions_stack_within_one_event() {
        let total = score(&[symptom(&["vision_changes", "swelling"], 1)], &[]);
        assert!((total - 0.55).abs() < 1e-9);
    }

    #[test]
    fn several_concerning_tags_count_once_per_event() {
        let total = score(&[symptom(&["severe_headache", "vision_changes"], 5)], &[]);
        assert!((total - 0.3).abs() < 1e-9);
    }

    #[test]
    fn mood_threshold_is_inclusive() {
        assert!((score(&[symptom(&[], 2)], &[]) - 0.1).abs() < 1e-9);
        assert_eq!(score(&[symptom(&[], 3)], &[]), 0.0);
    }

    #[test]
    fn mild_window_scores_zero_not_baseline() {
        assert_eq!(score(&[symptom(&["nausea"], 4)], &[vital(118, 76)]), 0.0);
    }

    #[test]
    fn total_is_clamped() {
        let vitals = vec![vital(180, 120); 3];
        let symptoms = vec![symptom(&["heavy_bleeding", "pain"], 1); 5];
        assert_eq!(score(&symptoms, &vitals), 1.0);
    }

    #[test]
    fn band_boundaries_are_exact() {
        assert_eq!(band_for_score(0.0), RiskBand::Low);
        assert_eq!(band_for_score(0.329999), RiskBand::Low);
        assert_eq!(band_for_score(0.33), RiskBand::Medium);
        assert_eq!(band_for_score(0.659999), RiskBand::Medium);
        assert_eq!(band_for_score(0.66), RiskBand::High);
        assert_eq!(band_for_score(1.0), RiskBand::High);
    }

    proptest! {
        #[test]
        fn score_stays_within_unit_interval(
            readings in proptest::collection::vec((60u32..260, 40u32..180), 0..12),
            moods in proptest::collection::vec((1u8..=5, any::<bool>(), any::<bool>()), 0..20),
        ) {
            let vitals: Vec<VitalEvent> = readings.iter().map(|(s, d)| vital(*s, *d)).collect();
            let symptoms: Vec<SymptomEvent> = moods
                .iter()
                .map(|(mood, concerning, moderate)| {
                    let mut tags = Vec::new();
                    if *concerning {
                        tags.push("no_fetal_movement");
                    }
                    if *moderate {
                        tags.push("shortness_of_breath");
                    }
                    symptom(&tags, *mood)
                })
                .collect();

            let total = score(&symptoms, &vitals);
            prop_assert!((0.0..=1.0).contains(&total));
        }
    }
}
