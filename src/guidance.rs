use crate::models::{GuidanceCard, RiskBand};

pub const THIRD_TRIMESTER_WEEK: u32 = 28;

fn card(title: &str, body: &str) -> GuidanceCard {
    GuidanceCard {
        title: title.to_string(),
        body: body.to_string(),
    }
}

fn stable() -> GuidanceCard {
    card(
        "Things seem stable right now",
        "Based on what you logged, things look mostly within expected ranges. \
         Keep paying attention to your body, drink water, and continue your checkins. \
         If anything feels suddenly wrong, always trust your instincts and contact your provider.",
    )
}

fn monitor() -> GuidanceCard {
    card(
        "Monitor and plan a check in",
        "Some of your recent symptoms or blood pressure readings are a bit higher than usual. \
         Consider writing down what you are noticing and contact your provider to ask if they \
         want an earlier visit or extra checks.",
    )
}

fn fetal_movement() -> GuidanceCard {
    card(
        "Pay extra attention to fetal movement",
        "In the third trimester, changes in fetal movement can matter. \
         If you notice fewer movements than usual, follow your clinic instructions for counting kicks \
         and call if the pattern feels very different.",
    )
}

fn high_concern() -> GuidanceCard {
    card(
        "High concern items present",
        "Some of your recent entries suggest symptoms that can be urgent in pregnancy. \
         If you have severe pain, heavy bleeding, trouble breathing, chest pain, or a sense that \
         something is very wrong, do not wait for the app. Contact emergency services or your hospital now.",
    )
}

fn call_provider() -> GuidanceCard {
    card(
        "Call your provider soon",
        "Even if you are not in immediate danger, this is a good time to call your provider, \
         describe what you logged, and ask if they want you to be seen today.",
    )
}

/// Cards for a band. A missing week counts as week 0.
pub fn cards_for(band: RiskBand, gestational_week: Option<u32>) -> Vec<GuidanceCard> {
    let week = gestational_week.unwrap_or(0);
    match band {
        RiskBand::Low => vec![stable()],
        RiskBand::Medium => {
            let mut cards = vec![monitor()];
            if week >= THIRD_TRIMESTER_WEEK {
                cards.push(fetal_movement());
            }
            cards
        }
        RiskBand::High => vec![high_concern(), call_provider()],
    }
}
