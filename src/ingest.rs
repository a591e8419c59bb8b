use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use anyhow::{bail, ensure, Context};
use chrono::{DateTime, Utc};

use crate::engine::RiskEngine;
use crate::models::{Event, SymptomEvent, VitalEvent};
use crate::vocabulary::SymptomTag;

pub const MAX_GESTATIONAL_WEEK: u32 = 45;

/// Rejects records the engine must never see: it does no range checks itself.
pub fn validate(event: &Event) -> anyhow::Result<()> {
    ensure!(!event.patient_id().trim().is_empty(), "patient_id must not be empty");

    match event {
        Event::Symptom(symptom) => {
            ensure!(
                (1..=5).contains(&symptom.mood),
                "mood must be between 1 and 5, got {}",
                symptom.mood
            );
            ensure!(
                symptom.gestational_week <= MAX_GESTATIONAL_WEEK,
                "gestational_week {} is out of range",
                symptom.gestational_week
            );
        }
        Event::Vital(vital) => {
            ensure!(
                vital.gestational_week <= MAX_GESTATIONAL_WEEK,
                "gestational_week {} is out of range",
                vital.gestational_week
            );
            ensure!(
                vital.systolic_bp > 0 && vital.diastolic_bp > 0,
                "blood pressure must be positive"
            );
            ensure!(vital.heart_rate > 0, "heart_rate must be positive");
            ensure!(
                vital.weight_kg.is_finite() && vital.weight_kg > 0.0,
                "weight_kg must be a positive number"
            );
        }
    }

    Ok(())
}

pub fn read_jsonl(reader: impl Read) -> anyhow::Result<Vec<Event>> {
    let mut events = Vec::new();

    for (index, line) in BufReader::new(reader).lines().enumerate() {
        let line_number = index + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event: Event = serde_json::from_str(&line)
            .with_context(|| format!("line {line_number}: malformed event"))?;
        validate(&event).with_context(|| format!("line {line_number}: invalid event"))?;
        events.push(event);
    }

    Ok(events)
}

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    kind: String,
    patient_id: String,
    timestamp: DateTime<Utc>,
    gestational_week: u32,
    symptoms: Option<String>,
    mood: Option<u8>,
    notes: Option<String>,
    systolic_bp: Option<u32>,
    diastolic_bp: Option<u32>,
    heart_rate: Option<u32>,
    weight_kg: Option<f64>,
}

impl CsvRow {
    fn into_event(self) -> anyhow::Result<Event> {
        match self.kind.as_str() {
            "symptom" => {
                let symptoms = self
                    .symptoms
                    .as_deref()
                    .unwrap_or_default()
                    .split(';')
                    .filter(|raw| !raw.trim().is_empty())
                    .map(SymptomTag::parse)
                    .collect::<anyhow::Result<Vec<_>>>()?;

                Ok(Event::Symptom(SymptomEvent {
                    patient_id: self.patient_id,
                    timestamp: self.timestamp,
                    gestational_week: self.gestational_week,
                    symptoms,
                    mood: self.mood.context("symptom row needs a mood")?,
                    notes: self.notes.filter(|note| !note.is_empty()),
                }))
            }
            "vital" => Ok(Event::Vital(VitalEvent {
                patient_id: self.patient_id,
                timestamp: self.timestamp,
                gestational_week: self.gestational_week,
                systolic_bp: self.systolic_bp.context("vital row needs systolic_bp")?,
                diastolic_bp: self.diastolic_bp.context("vital row needs diastolic_bp")?,
                heart_rate: self.heart_rate.context("vital row needs heart_rate")?,
                weight_kg: self.weight_kg.context("vital row needs weight_kg")?,
            })),
            other => bail!("unknown event kind {other:?}"),
        }
    }
}

pub fn read_csv(reader: impl Read) -> anyhow::Result<Vec<Event>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut events = Vec::new();

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        // Header is line 1.
        let line_number = index + 2;
        let row = result.with_context(|| format!("line {line_number}: malformed row"))?;
        let event = row
            .into_event()
            .and_then(|event| validate(&event).map(|_| event))
            .with_context(|| format!("line {line_number}: invalid event"))?;
        events.push(event);
    }

    Ok(events)
}

pub fn read_events(path: &Path) -> anyhow::Result<Vec<Event>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let events = match path.extension().and_then(|ext| ext.to_str()) {
        Some("csv") => read_csv(file),
        Some("jsonl") | Some("ndjson") => read_jsonl(file),
        _ => bail!("unsupported event file {}, expected .csv or .jsonl", path.display()),
    };

    events.with_context(|| format!("failed to import {}", path.display()))
}

/// Reads and validates the whole file before the engine sees any of it.
pub fn import_file(engine: &RiskEngine, path: &Path) -> anyhow::Result<usize> {
    let events = read_events(path)?;
    let count = events.len();

    for event in events {
        engine.ingest(event);
    }

    tracing::info!(count, path = %path.display(), "ingested events");
    Ok(count)
}

fn sample_time(raw: &str) -> anyhow::Result<DateTime<Utc>> {
    let time = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("invalid sample timestamp {raw:?}"))?;
    Ok(time.with_timezone(&Utc))
}

fn sample_vital(
    patient_id: &str,
    timestamp: &str,
    week: u32,
    bp: (u32, u32),
    heart_rate: u32,
) -> anyhow::Result<Event> {
    Ok(Event::Vital(VitalEvent {
        patient_id: patient_id.to_string(),
        timestamp: sample_time(timestamp)?,
        gestational_week: week,
        systolic_bp: bp.0,
        diastolic_bp: bp.1,
        heart_rate,
        weight_kg: 68.0 + week as f64 * 0.25,
    }))
}

fn sample_symptom(
    patient_id: &str,
    timestamp: &str,
    week: u32,
    tags: &[&str],
    mood: u8,
    notes: &str,
) -> anyhow::Result<Event> {
    let symptoms = tags
        .iter()
        .map(|tag| SymptomTag::parse(tag))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Event::Symptom(SymptomEvent {
        patient_id: patient_id.to_string(),
        timestamp: sample_time(timestamp)?,
        gestational_week: week,
        symptoms,
        mood,
        notes: Some(notes.to_string()),
    }))
}

/// Three patients: one steady, one with climbing blood pressure, one quiet.
pub fn sample_events() -> anyhow::Result<Vec<Event>> {
    Ok(vec![
        sample_vital("p1", "2025-11-17T00:00:00Z", 24, (120, 78), 88)?,
        sample_vital("p2", "2025-11-17T00:00:10Z", 33, (140, 90), 110)?,
        sample_vital("p3", "2025-11-17T00:00:20Z", 14, (110, 70), 70)?,
        sample_symptom(
            "p1",
            "2025-11-17T08:30:00Z",
            24,
            &["swelling"],
            4,
            "ankles puffy after work",
        )?,
        sample_vital("p2", "2025-11-17T09:15:00Z", 33, (162, 104), 112)?,
        sample_symptom(
            "p2",
            "2025-11-17T09:20:00Z",
            33,
            &["severe_headache", "vision_changes"],
            2,
            "spots in vision",
        )?,
        sample_symptom("p3", "2025-11-17T12:00:00Z", 14, &["nausea"], 4, "morning sickness")?,
        sample_vital("p1", "2025-11-17T18:00:00Z", 24, (118, 76), 84)?,
    ])
}

pub fn write_seed(path: &Path) -> anyhow::Result<usize> {
    let events = sample_events()?;
    let mut output = String::new();
    for event in events.iter() {
        output.push_str(&serde_json::to_string(event)?);
        output.push('\n');
    }

    std::fs::write(path, output).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(events.len())
}
