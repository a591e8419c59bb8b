use crate::models::SymptomEvent;
use crate::risk::{blood_pressure_level, has_low_mood, BloodPressureLevel};
use crate::vocabulary::{HEAVY_BLEEDING, NO_FETAL_MOVEMENT, SEVERE_HEADACHE, VISION_CHANGES};
use crate::window::{last_n, WindowedEvents};

pub const NOT_ENOUGH_INFORMATION: &str = "There is not enough recent information to estimate risk yet. Continue logging symptoms and vitals.";
pub const SEVERE_BLOOD_PRESSURE: &str = "Your recent blood pressure has been in a higher range that can sometimes be concerning in pregnancy.";
pub const ELEVATED_BLOOD_PRESSURE: &str = "Your recent blood pressure readings have been somewhat elevated.";
pub const HEADACHE_OR_VISION: &str = "You reported headache or vision changes, which can sometimes be warning signs when combined with higher blood pressure.";
pub const HEAVY_BLEEDING_NOTE: &str = "You logged heavier bleeding, which should be discussed with a provider as soon as possible.";
pub const FETAL_MOVEMENT_NOTE: &str = "You noted very little or no fetal movement compared to usual. This can be important to check quickly.";
pub const LOW_MOOD_NOTE: &str = "Your mood scores have been on the lower side, which matters for your well being.";
pub const REASSURANCE: &str = "Recent logs look mostly within expected ranges for pregnancy, but the system will keep watching for changes.";

fn mentions(symptom: &SymptomEvent, tag: &str) -> bool {
    symptom.symptoms.iter().any(|logged| logged.as_str() == tag)
}

/// Explains a window using only the latest vital and the latest symptom.
///
/// The scorer samples the last 3 vitals and 5 symptoms while this looks at one
/// of each, so a high score can come with the reassuring sentence when the
/// newest entries are mild.
pub fn build_explanation(window: &WindowedEvents<'_>, _score: f64) -> String {
    if window.is_empty() {
        return NOT_ENOUGH_INFORMATION.to_string();
    }

    let mut parts: Vec<&str> = Vec::new();

    if let [latest] = last_n(&window.vitals, 1) {
        match blood_pressure_level(latest) {
            BloodPressureLevel::Severe => parts.push(SEVERE_BLOOD_PRESSURE),
            BloodPressureLevel::Elevated => parts.push(ELEVATED_BLOOD_PRESSURE),
            BloodPressureLevel::Normal => {}
        }
    }

    if let [recent] = last_n(&window.symptoms, 1) {
        if mentions(recent, SEVERE_HEADACHE) || mentions(recent, VISION_CHANGES) {
            parts.push(HEADACHE_OR_VISION);
        }
        if mentions(recent, HEAVY_BLEEDING) {
            parts.push(HEAVY_BLEEDING_NOTE);
        }
        if mentions(recent, NO_FETAL_MOVEMENT) {
            parts.push(FETAL_MOVEMENT_NOTE);
        }
        if has_low_mood(recent) {
            parts.push(LOW_MOOD_NOTE);
        }
    }

    if parts.is_empty() {
        parts.push(REASSURANCE);
    }

    parts.join(" ")
}
