use std::fmt::Write;

use crate::engine::RiskEngine;
use crate::models::{PatientState, TagCount, VitalTrend};
use crate::window::{last_n, select_window, WindowedEvents};

pub const TREND_READINGS: usize = 3;

pub fn summarize_tags(window: &WindowedEvents<'_>) -> Vec<TagCount> {
    let mut map: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();

    for symptom in window.symptoms.iter() {
        for tag in symptom.symptoms.iter() {
            *map.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut counts: Vec<TagCount> = map
        .into_iter()
        .map(|(tag, count)| TagCount {
            tag: tag.to_string(),
            count,
        })
        .collect();

    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
    counts
}

/// Rolling averages over the most recent windowed vitals. Informational only.
pub fn vital_trend(window: &WindowedEvents<'_>) -> Option<VitalTrend> {
    let recent = last_n(&window.vitals, TREND_READINGS);
    if recent.is_empty() {
        return None;
    }

    let count = recent.len() as f64;
    let average = |value: fn(&crate::models::VitalEvent) -> u32| {
        recent.iter().map(|vital| value(*vital) as f64).sum::<f64>() / count
    };

    Some(VitalTrend {
        reading_count: recent.len(),
        avg_heart_rate: average(|vital| vital.heart_rate),
        avg_systolic: average(|vital| vital.systolic_bp),
        avg_diastolic: average(|vital| vital.diastolic_bp),
    })
}

fn write_patient_detail(output: &mut String, engine: &RiskEngine, state: &PatientState) {
    let window = select_window(state, engine.config().horizon);
    let tags = summarize_tags(&window);

    let _ = writeln!(output, "### {}", state.patient_id);

    if tags.is_empty() {
        let _ = writeln!(output, "- Symptoms: none logged in this window");
    } else {
        let mix: Vec<String> = tags
            .iter()
            .map(|entry| format!("{} x{}", entry.tag, entry.count))
            .collect();
        let _ = writeln!(output, "- Symptoms: {}", mix.join(", "));
    }

    match vital_trend(&window) {
        Some(trend) => {
            let _ = writeln!(
                output,
                "- Vitals (last {}): BP {:.0}/{:.0}, heart rate {:.0}",
                trend.reading_count, trend.avg_systolic, trend.avg_diastolic, trend.avg_heart_rate
            );
        }
        None => {
            let _ = writeln!(output, "- Vitals: none logged in this window");
        }
    }
}

pub fn build_report(engine: &RiskEngine) -> String {
    let overview = engine.dashboard();

    let mut output = String::new();
    let horizon_hours = engine.config().horizon.num_hours();

    let _ = writeln!(output, "# Maternal Risk Report");
    let _ = writeln!(
        output,
        "Generated {} (events within {} hours of each patient's latest log)",
        overview.generated_at.format("%Y-%m-%d %H:%M UTC"),
        horizon_hours
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Patients by Risk");

    if overview.patients.is_empty() {
        let _ = writeln!(output, "No patients have logged events yet.");
        return output;
    }

    let _ = writeln!(output, "| Patient | Band | Score | Week | Last seen |");
    let _ = writeln!(output, "|---|---|---|---|---|");
    for summary in overview.patients.iter() {
        let week = summary
            .gestational_week
            .map(|week| week.to_string())
            .unwrap_or_else(|| "-".to_string());
        let _ = writeln!(
            output,
            "| {} | {} | {:.2} | {} | {} |",
            summary.patient_id,
            summary.risk_band,
            summary.risk_score,
            week,
            summary.last_seen.format("%Y-%m-%d %H:%M")
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Activity");
    for summary in overview.patients.iter() {
        engine.with_patient(&summary.patient_id, |state| {
            write_patient_detail(&mut output, engine, state)
        });
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Guidance");
    for summary in overview.patients.iter() {
        let guidance = engine.guidance(&summary.patient_id);
        let titles: Vec<&str> = guidance.cards.iter().map(|card| card.title.as_str()).collect();
        let _ = writeln!(output, "- {}: {}", summary.patient_id, titles.join("; "));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::EngineConfig;
    use crate::models::{SymptomEvent, VitalEvent};
    use crate::vocabulary::SymptomTag;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Arc;

    fn vital(hours: i64, systolic: u32, diastolic: u32, heart_rate: u32) -> VitalEvent {
        VitalEvent {
            patient_id: "p1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 11, 17, 0, 0, 0).unwrap()
                + Duration::hours(hours),
            gestational_week: 32,
            systolic_bp: systolic,
            diastolic_bp: diastolic,
            heart_rate,
            weight_kg: 74.0,
        }
    }

    fn symptom(tags: &[&str]) -> SymptomEvent {
        SymptomEvent {
            patient_id: "p1".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 11, 17, 1, 0, 0).unwrap(),
            gestational_week: 32,
            symptoms: tags.iter().map(|t| SymptomTag::parse(t).unwrap()).collect(),
            mood: 4,
            notes: None,
        }
    }

    #[test]
    fn tag_mix_counts_and_orders() {
        let symptoms = vec![
            symptom(&["swelling", "pain"]),
            symptom(&["swelling"]),
            symptom(&["dizziness"]),
        ];
        let window = WindowedEvents {
            symptoms: symptoms.iter().collect(),
            vitals: Vec::new(),
        };
        let counts = summarize_tags(&window);
        let flat: Vec<(&str, usize)> = counts.iter().map(|c| (c.tag.as_str(), c.count)).collect();
        assert_eq!(flat, vec![("swelling", 2), ("dizziness", 1), ("pain", 1)]);
    }

    #[test]
    fn trend_averages_last_three_vitals() {
        let vitals = vec![
            vital(0, 200, 120, 150),
            vital(1, 120, 80, 80),
            vital(2, 130, 84, 90),
            vital(3, 140, 88, 100),
        ];
        let window = WindowedEvents {
            symptoms: Vec::new(),
            vitals: vitals.iter().collect(),
        };
        let trend = vital_trend(&window).unwrap();
        assert_eq!(trend.reading_count, 3);
        assert!((trend.avg_systolic - 130.0).abs() < 1e-9);
        assert!((trend.avg_diastolic - 84.0).abs() < 1e-9);
        assert!((trend.avg_heart_rate - 90.0).abs() < 1e-9);
        assert!(vital_trend(&WindowedEvents::default()).is_none());
    }

    #[test]
    fn report_lists_patients_and_guidance() {
        let now = Utc.with_ymd_and_hms(2025, 11, 18, 0, 0, 0).unwrap();
        let engine = RiskEngine::with_clock(EngineConfig::default(), Arc::new(FixedClock(now)));
        engine.ingest_vital(vital(0, 165, 100, 96));
        engine.ingest_symptom(symptom(&["vision_changes"]));

        let report = build_report(&engine);
        assert!(report.contains("# Maternal Risk Report"));
        assert!(report.contains("| p1 | high | 0.70 | 32 |"));
        assert!(report.contains("- Symptoms: vision_changes x1"));
        assert!(report.contains("- Vitals (last 1): BP 165/100, heart rate 96"));
        assert!(report.contains("- p1: High concern items present; Call your provider soon"));
    }

    #[test]
    fn empty_engine_reports_no_patients() {
        let engine = RiskEngine::new(EngineConfig::default());
        assert!(build_report(&engine).contains("No patients have logged events yet."));
    }
}
