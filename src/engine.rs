use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::explain::build_explanation;
use crate::guidance::cards_for;
use crate::models::{
    DashboardOverview, Event, GuidanceResponse, PatientState, PatientSummary, RiskAssessment,
    SymptomEvent, VitalEvent,
};
use crate::risk::{band_for_score, score_window};
use crate::window::select_window;

/// Owns every patient's history and answers risk queries over it.
///
/// One lock guards the whole registry; an assessment holds it from window
/// selection through explanation so it never sees a half-applied ingest.
pub struct RiskEngine {
    patients: Mutex<BTreeMap<String, PatientState>>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
}

impl RiskEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            patients: Mutex::new(BTreeMap::new()),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // Ingest and query are plain appends and reads, so a poisoned lock still
    // holds consistent state.
    fn registry(&self) -> MutexGuard<'_, BTreeMap<String, PatientState>> {
        self.patients
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn state_entry<'a>(
        patients: &'a mut BTreeMap<String, PatientState>,
        patient_id: &str,
    ) -> &'a mut PatientState {
        patients
            .entry(patient_id.to_string())
            .or_insert_with(|| PatientState::new(patient_id))
    }

    /// Appends and moves `last_seen` to this event, even if it is older than what is stored.
    pub fn ingest_symptom(&self, event: SymptomEvent) {
        let mut patients = self.registry();
        let state = Self::state_entry(&mut patients, &event.patient_id);
        state.last_seen = Some(event.timestamp);
        state.last_gestational_week = Some(event.gestational_week);
        state.symptoms.push(event);
    }

    /// Appends and moves `last_seen` to this event, even if it is older than what is stored.
    pub fn ingest_vital(&self, event: VitalEvent) {
        let mut patients = self.registry();
        let state = Self::state_entry(&mut patients, &event.patient_id);
        state.last_seen = Some(event.timestamp);
        state.last_gestational_week = Some(event.gestational_week);
        state.vitals.push(event);
    }

    pub fn ingest(&self, event: Event) {
        match event {
            Event::Symptom(symptom) => self.ingest_symptom(symptom),
            Event::Vital(vital) => self.ingest_vital(vital),
        }
    }

    fn assess_state(&self, state: &PatientState) -> RiskAssessment {
        let window = select_window(state, self.config.horizon);
        let score = score_window(&window, &self.config.vocabulary);
        let band = band_for_score(score);
        let explanation = build_explanation(&window, score);

        tracing::debug!(
            patient_id = %state.patient_id,
            symptoms = window.symptoms.len(),
            vitals = window.vitals.len(),
            score,
            %band,
            "assessed patient"
        );

        RiskAssessment {
            patient_id: state.patient_id.clone(),
            as_of: state.last_seen.unwrap_or_else(|| self.clock.now()),
            gestational_week: state.last_gestational_week,
            risk_band: band,
            risk_score: score,
            explanation,
        }
    }

    /// Assesses a patient, registering an empty history for ids never seen before.
    pub fn current_assessment(&self, patient_id: &str) -> RiskAssessment {
        let mut patients = self.registry();
        let state = Self::state_entry(&mut patients, patient_id);
        self.assess_state(state)
    }

    pub fn guidance(&self, patient_id: &str) -> GuidanceResponse {
        let assessment = self.current_assessment(patient_id);
        let cards = cards_for(assessment.risk_band, assessment.gestational_week);

        GuidanceResponse {
            patient_id: assessment.patient_id,
            as_of: assessment.as_of,
            gestational_week: assessment.gestational_week,
            risk_band: assessment.risk_band,
            cards,
        }
    }

    /// Every patient with at least one event, highest score first.
    /// Ties keep patient-id order.
    pub fn dashboard(&self) -> DashboardOverview {
        let generated_at = self.clock.now();
        let patients = self.registry();

        let mut summaries: Vec<PatientSummary> = patients
            .values()
            .filter_map(|state| {
                let last_seen = state.last_seen?;
                let window = select_window(state, self.config.horizon);
                let score = score_window(&window, &self.config.vocabulary);
                Some(PatientSummary {
                    patient_id: state.patient_id.clone(),
                    last_seen,
                    gestational_week: state.last_gestational_week,
                    risk_band: band_for_score(score),
                    risk_score: score,
                })
            })
            .collect();
        drop(patients);

        summaries.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));

        DashboardOverview {
            generated_at,
            patients: summaries,
        }
    }

    pub fn patient_ids(&self) -> Vec<String> {
        self.registry().keys().cloned().collect()
    }

    /// Runs `f` against a snapshot-consistent view of one patient, if known.
    pub fn with_patient<R>(
        &self,
        patient_id: &str,
        f: impl FnOnce(&PatientState) -> R,
    ) -> Option<R> {
        self.registry().get(patient_id).map(f)
    }
}
