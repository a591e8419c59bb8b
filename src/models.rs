use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::vocabulary::SymptomTag;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomEvent {
    pub patient_id: String,
    pub timestamp: DateTime<Utc>,
    pub gestational_week: u32,
    pub symptoms: Vec<SymptomTag>,
    /// 1 to 5, 1 is worst.
    pub mood: u8,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalEvent {
    pub patient_id: String,
    pub timestamp: DateTime<Utc>,
    pub gestational_week: u32,
    pub systolic_bp: u32,
    pub diastolic_bp: u32,
    pub heart_rate: u32,
    pub weight_kg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    Symptom(SymptomEvent),
    Vital(VitalEvent),
}

impl Event {
    pub fn patient_id(&self) -> &str {
        match self {
            Event::Symptom(event) => &event.patient_id,
            Event::Vital(event) => &event.patient_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskBand::Low => write!(f, "low"),
            RiskBand::Medium => write!(f, "medium"),
            RiskBand::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    pub patient_id: String,
    pub as_of: DateTime<Utc>,
    pub gestational_week: Option<u32>,
    pub risk_band: RiskBand,
    pub risk_score: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuidanceCard {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuidanceResponse {
    pub patient_id: String,
    pub as_of: DateTime<Utc>,
    pub gestational_week: Option<u32>,
    pub risk_band: RiskBand,
    pub cards: Vec<GuidanceCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientSummary {
    pub patient_id: String,
    pub last_seen: DateTime<Utc>,
    pub gestational_week: Option<u32>,
    pub risk_band: RiskBand,
    pub risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardOverview {
    pub generated_at: DateTime<Utc>,
    pub patients: Vec<PatientSummary>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VitalTrend {
    pub reading_count: usize,
    pub avg_heart_rate: f64,
    pub avg_systolic: f64,
    pub avg_diastolic: f64,
}

/// Everything ingested for one patient, in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientState {
    pub patient_id: String,
    pub symptoms: Vec<SymptomEvent>,
    pub vitals: Vec<VitalEvent>,
    pub last_seen: Option<DateTime<Utc>>,
    pub last_gestational_week: Option<u32>,
}

impl PatientState {
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            ..Self::default()
        }
    }
}
