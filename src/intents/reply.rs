//! Reply production: texts, navigation targets, highlight requests

use super::{Intent, RandomSource};

/// Stagger between successive highlighted elements during a system scan
pub const SCAN_STAGGER_MS: u64 = 400;
/// How long each element stays highlighted during a system scan
pub const SCAN_HOLD_MS: u64 = 3000;

/// Apology for a denied microphone permission
pub const PERMISSION_DENIED_REPLY: &str = "Pit Wall AI here. I can't hear you because microphone \
     access was denied. Please check your microphone permissions to enable telemetry.";

/// Apology for a generic capture failure
pub const DIDNT_CATCH_REPLY: &str =
    "I didn't quite catch that. Telemetry interference? Please try your command again.";

const FALLBACK_REPLY: &str = "I've analyzed your request, but I don't have a direct telemetry \
     link for that command yet. Ask me about teams, standings, or say 'System Scan'.";

/// Canned status lines offered when live voice commands are unavailable
const RADIO_QUOTES: &[&str] = &[
    "Copy that, we're monitoring the telemetry.",
    "Box this lap, box box box!",
    "The gap to the car behind is 2.5 seconds.",
    "Tyre temperatures are looking good. Keep it up.",
];

/// A timed highlight request over a named element collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub target: &'static str,
    pub stagger_ms: u64,
    pub hold_ms: u64,
}

/// What one matched intent produces
#[derive(Debug, Clone)]
pub struct Reply {
    /// Reply text to speak and show
    pub text: String,
    /// Page section to scroll into view, if any
    pub navigate: Option<&'static str>,
    /// Highlight sequence to run, if any
    pub highlight: Option<Highlight>,
}

impl Reply {
    fn text_only(text: &str) -> Self {
        Self {
            text: text.to_string(),
            navigate: None,
            highlight: None,
        }
    }

    fn with_navigate(text: &str, section: &'static str) -> Self {
        Self {
            text: text.to_string(),
            navigate: Some(section),
            highlight: None,
        }
    }
}

/// Reply for an utterance that matched no rule; never fails, no side effects
pub fn fallback_reply() -> Reply {
    Reply::text_only(FALLBACK_REPLY)
}

/// Reply for a listening toggle on a host without speech capture
pub fn capture_unavailable_reply(rng: &mut dyn RandomSource) -> Reply {
    let index = (rng.unit() * RADIO_QUOTES.len() as f64) as usize;
    let quote = RADIO_QUOTES[index.min(RADIO_QUOTES.len() - 1)];
    Reply::text_only(&format!(
        "Apologies, but live voice commands are offline on this rig. \
         I'll give you periodic updates instead: {quote}"
    ))
}

/// Produce the reply and side effects for a matched intent
pub fn respond(intent: Intent, rng: &mut dyn RandomSource) -> Reply {
    match intent {
        Intent::Greeting => Reply::text_only(
            "Hello! I am your AI Race Engineer. I'm monitoring the telemetry and ready for \
             your commands. How can I assist you on the pit wall today?",
        ),
        Intent::Identity => Reply::text_only(
            "I am PIT WALL AI, your virtual race engineer. I can help you navigate the season, \
             check standings, or find information about your favorite teams.",
        ),
        Intent::Teams => Reply::with_navigate(
            "Navigating to the 2026 grid. We have ten world-class teams competing this season, \
             including the much-anticipated entry of Audi and Cadillac.",
            "teams",
        ),
        Intent::Standings => Reply::with_navigate(
            "Opening the championship pulse. Charles Leclerc is currently leading the pack \
             with forty-two points, followed closely by Max Verstappen.",
            "standings",
        ),
        Intent::Schedule => Reply::with_navigate(
            "The 2026 calendar is packed with twenty-four races. Up next is the Australian \
             Grand Prix at Albert Park. Lights out in Melbourne is just around the corner.",
            "schedule",
        ),
        Intent::Cars => Reply::with_navigate(
            "Viewing the 2026 technical marvels. These cars feature active aerodynamics and \
             a 50/50 power split between electric and combustion.",
            "cars",
        ),
        Intent::Stats => Reply::with_navigate(
            "Analyzing the historical data. From Monaco's tight corners to Monza's temple of \
             speed, the numbers tell a story of seventy-six years of excellence.",
            "stats",
        ),
        Intent::FanPass => Reply::with_navigate(
            "Accessing the Paddock Pass generator. You can create your customized official \
             F1 ID here and represent your favorite team.",
            "fan-id",
        ),
        Intent::Merch => Reply::with_navigate(
            "Opening the F1 Store. Get ready to gear up for the 2026 season with the latest \
             team collections.",
            "merch",
        ),
        Intent::TyresGone => Reply::text_only(
            "Copy that. But we checked the data, and your pace is still green. Stay out, \
             stay out!",
        ),
        Intent::LeaveMeAlone => Reply::text_only(
            "Understood. Radio silence for the next sector. I know what I'm doing.",
        ),
        Intent::HammerTime => Reply::text_only(
            "Acknowledged. It's hammer time! Box, box, box for fresh rubber. Let's send it!",
        ),
        Intent::BoxBox => {
            Reply::text_only("Confirming box. Box this lap. Confirm, box box box!")
        }
        Intent::Weather => {
            let ambient = (rng.unit() * 15.0) as i32 + 20;
            let track = ambient + (rng.unit() * 10.0) as i32;
            Reply::text_only(&format!(
                "Track conditions are optimal. Ambient temperature is {ambient} degrees \
                 Celsius, track surface is at {track} degrees. Zero percent chance of rain \
                 for the next twenty minutes.",
            ))
        }
        Intent::Scan => Reply {
            text: "Initiating full chassis and aero scan. Telemetry is showing nominal \
                   values. All systems are green."
                .to_string(),
            navigate: Some("cars"),
            highlight: Some(Highlight {
                target: "car-card",
                stagger_ms: SCAN_STAGGER_MS,
                hold_ms: SCAN_HOLD_MS,
            }),
        },
        Intent::Help => Reply::text_only(
            "You can ask me about teams, standings, race schedules, car technical specs, or \
             track weather. You can also ask about specific drivers like Hamilton or Leclerc.",
        ),
        Intent::BestDriver => Reply::text_only(
            "That is the ultimate debate. While Lewis Hamilton and Michael Schumacher hold \
             the record for seven championships, many experts point to Ayrton Senna's pure \
             speed or Max Verstappen's current dominance. In 2026, Charles Leclerc is \
             certainly making his case for the throne.",
        ),
        Intent::Hamilton => Reply::with_navigate(
            "Lewis Hamilton. Seven-time world champion. He's currently pushing the Ferrari \
             project to its limits for the 2026 season.",
            "teams",
        ),
        Intent::Verstappen => Reply::with_navigate(
            "Max Verstappen. The Dutchman continues to be the benchmark for pure speed at \
             Red Bull Racing.",
            "teams",
        ),
        Intent::Leclerc => Reply::with_navigate(
            "Charles Leclerc. Ferrari's golden boy and our current championship leader. \
             His qualifying pace remains unmatched.",
            "teams",
        ),
        Intent::Rules => Reply::text_only(
            "The 2026 regulations introduced active aerodynamics and power units with a \
             50/50 split between electric and combustion power, aiming for carbon neutrality.",
        ),
        Intent::Origins => Reply::text_only(
            "Formula 1 as we know it started in 1950. The FIA, led by figures like Antonio \
             Brivio and others, established the first World Championship. The first race was \
             held at Silverstone.",
        ),
        Intent::FastestCar => Reply::text_only(
            "Historically, the 2020 Mercedes W11 is considered the fastest F1 car ever in \
             terms of raw lap time. However, the 2026 machinery uses advanced active aero to \
             achieve incredible speeds while being more sustainable.",
        ),
        Intent::RaceCount => Reply::text_only(
            "The 2026 season features a record-breaking twenty-four races, spanning from \
             Melbourne in March to Abu Dhabi in December.",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::SeqRandom;
    use super::*;

    #[test]
    fn test_weather_lower_bound() {
        let mut rng = SeqRandom::new(&[0.0, 0.0]);
        let reply = respond(Intent::Weather, &mut rng);
        assert!(reply.text.contains("Ambient temperature is 20 degrees"));
        assert!(reply.text.contains("track surface is at 20 degrees"));
        assert!(reply.navigate.is_none());
    }

    #[test]
    fn test_weather_upper_bound() {
        let mut rng = SeqRandom::new(&[0.999, 0.999]);
        let reply = respond(Intent::Weather, &mut rng);
        // Ambient tops out at 34, track offset at +9.
        assert!(reply.text.contains("Ambient temperature is 34 degrees"));
        assert!(reply.text.contains("track surface is at 43 degrees"));
    }

    #[test]
    fn test_weather_track_at_least_ambient() {
        let mut rng = SeqRandom::new(&[0.5, 0.0]);
        let reply = respond(Intent::Weather, &mut rng);
        assert!(reply.text.contains("Ambient temperature is 27 degrees"));
        assert!(reply.text.contains("track surface is at 27 degrees"));
    }

    #[test]
    fn test_scan_reply_side_effects() {
        let mut rng = SeqRandom::new(&[0.0]);
        let reply = respond(Intent::Scan, &mut rng);
        assert_eq!(reply.navigate, Some("cars"));
        let highlight = reply.highlight.unwrap();
        assert_eq!(highlight.target, "car-card");
        assert_eq!(highlight.stagger_ms, 400);
        assert_eq!(highlight.hold_ms, 3000);
    }

    #[test]
    fn test_navigation_intents_name_their_sections() {
        let mut rng = SeqRandom::new(&[0.0]);
        assert_eq!(respond(Intent::Teams, &mut rng).navigate, Some("teams"));
        assert_eq!(respond(Intent::FanPass, &mut rng).navigate, Some("fan-id"));
        assert_eq!(respond(Intent::Leclerc, &mut rng).navigate, Some("teams"));
        assert_eq!(respond(Intent::Greeting, &mut rng).navigate, None);
    }

    #[test]
    fn test_fallback_has_no_side_effects() {
        let reply = fallback_reply();
        assert!(reply.text.contains("telemetry link"));
        assert!(reply.navigate.is_none());
        assert!(reply.highlight.is_none());
    }

    #[test]
    fn test_capture_unavailable_picks_a_quote() {
        let mut first = SeqRandom::new(&[0.0]);
        let reply = capture_unavailable_reply(&mut first);
        assert!(reply.text.contains("Copy that, we're monitoring the telemetry."));

        // 0.999 * 4 floors to index 3, the last quote.
        let mut last = SeqRandom::new(&[0.999]);
        let reply = capture_unavailable_reply(&mut last);
        assert!(reply.text.contains("Tyre temperatures are looking good."));
    }
}
