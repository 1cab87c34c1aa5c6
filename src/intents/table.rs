//! The ordered intent rule table
//!
//! Rules are evaluated top to bottom; the first rule whose predicate
//! holds wins and evaluation stops. The ordering is deliberate: radio
//! literals ("box box") sit above broad categories, the best-driver rule
//! sits above the named-driver rules, and the generic keyword rules sit
//! just above the fallback.

/// A recognized command category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Identity,
    Teams,
    Standings,
    Schedule,
    Cars,
    Stats,
    FanPass,
    Merch,
    TyresGone,
    LeaveMeAlone,
    HammerTime,
    BoxBox,
    Weather,
    Scan,
    Help,
    BestDriver,
    Hamilton,
    Verstappen,
    Leclerc,
    Rules,
    Origins,
    FastestCar,
    RaceCount,
}

/// Predicate over a normalized utterance
#[derive(Debug)]
pub enum Matcher {
    /// Utterance contains any of these phrases
    AnyOf(&'static [&'static str]),
    /// Utterance contains a phrase from each list
    Both {
        any: &'static [&'static str],
        with: &'static [&'static str],
    },
}

impl Matcher {
    fn matches(&self, utterance: &str) -> bool {
        match self {
            Matcher::AnyOf(phrases) => phrases.iter().any(|p| utterance.contains(p)),
            Matcher::Both { any, with } => {
                any.iter().any(|p| utterance.contains(p))
                    && with.iter().any(|p| utterance.contains(p))
            }
        }
    }
}

/// One entry in the priority-ordered table
pub struct IntentRule {
    pub intent: Intent,
    pub matcher: Matcher,
}

/// The full table, highest priority first
pub static RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::Greeting,
        matcher: Matcher::AnyOf(&["hello", "hi", "hey", "engineer", "morning", "afternoon"]),
    },
    IntentRule {
        intent: Intent::Identity,
        matcher: Matcher::AnyOf(&["who are you", "what are you", "tell me about yourself"]),
    },
    IntentRule {
        intent: Intent::Teams,
        matcher: Matcher::AnyOf(&["teams", "show teams", "who are the teams", "racing teams"]),
    },
    IntentRule {
        intent: Intent::Standings,
        matcher: Matcher::AnyOf(&[
            "standings",
            "leaderboard",
            "who is leading",
            "points",
            "championship",
        ]),
    },
    IntentRule {
        intent: Intent::Schedule,
        matcher: Matcher::AnyOf(&["schedule", "calendar", "races", "next race"]),
    },
    IntentRule {
        intent: Intent::Cars,
        matcher: Matcher::AnyOf(&["cars", "show me the cars", "machinery"]),
    },
    IntentRule {
        intent: Intent::Stats,
        matcher: Matcher::AnyOf(&["statistics", "stats", "data", "history"]),
    },
    IntentRule {
        intent: Intent::FanPass,
        matcher: Matcher::AnyOf(&["fan pass", "fan id", "paddock pass"]),
    },
    IntentRule {
        intent: Intent::Merch,
        matcher: Matcher::AnyOf(&["merch", "store", "shop", "merchandise"]),
    },
    // Radio literals outrank everything below.
    IntentRule {
        intent: Intent::TyresGone,
        matcher: Matcher::AnyOf(&["tyres are gone", "tires are gone"]),
    },
    IntentRule {
        intent: Intent::LeaveMeAlone,
        matcher: Matcher::AnyOf(&["leave me alone"]),
    },
    IntentRule {
        intent: Intent::HammerTime,
        matcher: Matcher::AnyOf(&["hammer time"]),
    },
    IntentRule {
        intent: Intent::BoxBox,
        matcher: Matcher::AnyOf(&["box box"]),
    },
    IntentRule {
        intent: Intent::Weather,
        matcher: Matcher::AnyOf(&["weather", "conditions", "track temperature", "is it raining"]),
    },
    IntentRule {
        intent: Intent::Scan,
        matcher: Matcher::AnyOf(&["scan", "analyze", "system scan", "check the car"]),
    },
    IntentRule {
        intent: Intent::Help,
        matcher: Matcher::AnyOf(&["help", "what can i say", "commands"]),
    },
    // The superlative rule precedes the named drivers, so "is hamilton
    // the best driver" resolves here.
    IntentRule {
        intent: Intent::BestDriver,
        matcher: Matcher::Both {
            any: &["best", "greatest", "goat", "legend", "fastest"],
            with: &["racer", "driver"],
        },
    },
    IntentRule {
        intent: Intent::Hamilton,
        matcher: Matcher::AnyOf(&["hamilton"]),
    },
    IntentRule {
        intent: Intent::Verstappen,
        matcher: Matcher::AnyOf(&["verstappen"]),
    },
    IntentRule {
        intent: Intent::Leclerc,
        matcher: Matcher::AnyOf(&["leclerc"]),
    },
    IntentRule {
        intent: Intent::Rules,
        matcher: Matcher::AnyOf(&["rules", "regulations"]),
    },
    IntentRule {
        intent: Intent::Origins,
        matcher: Matcher::AnyOf(&["founder", "started"]),
    },
    IntentRule {
        intent: Intent::FastestCar,
        matcher: Matcher::AnyOf(&["fastest car"]),
    },
    IntentRule {
        intent: Intent::RaceCount,
        matcher: Matcher::AnyOf(&["how many races"]),
    },
];

/// Match a normalized utterance against the table, first match wins
pub fn match_intent(utterance: &str) -> Option<Intent> {
    RULES
        .iter()
        .find(|rule| rule.matcher.matches(utterance))
        .map(|rule| rule.intent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting() {
        assert_eq!(match_intent("hello there"), Some(Intent::Greeting));
        assert_eq!(match_intent("good morning"), Some(Intent::Greeting));
    }

    #[test]
    fn test_no_match_is_none() {
        assert_eq!(match_intent("gibberish xyz"), None);
        assert_eq!(match_intent(""), None);
    }

    #[test]
    fn test_box_box_literal_wins() {
        // "box box" is also vaguely radio chatter, but it must hit the
        // literal rule, not anything broader.
        assert_eq!(match_intent("box box"), Some(Intent::BoxBox));
    }

    #[test]
    fn test_literal_outranks_weather() {
        // "tyres are gone" mentions tyres, which could read as a
        // conditions query; the literal sits above the weather rule.
        assert_eq!(
            match_intent("tyres are gone and track conditions are bad"),
            Some(Intent::TyresGone)
        );
    }

    #[test]
    fn test_teams_navigation() {
        assert_eq!(match_intent("show teams"), Some(Intent::Teams));
    }

    #[test]
    fn test_weather() {
        assert_eq!(match_intent("what's the weather like"), Some(Intent::Weather));
    }

    #[test]
    fn test_best_driver_outranks_named_driver() {
        // Both the superlative rule and the hamilton rule apply; the
        // table resolves to the superlative.
        assert_eq!(
            match_intent("is hamilton the best driver"),
            Some(Intent::BestDriver)
        );
    }

    #[test]
    fn test_named_driver_without_superlative() {
        assert_eq!(match_intent("tell me about verstappen"), Some(Intent::Verstappen));
        assert_eq!(match_intent("leclerc lap one"), Some(Intent::Leclerc));
    }

    #[test]
    fn test_fastest_car_without_driver_word() {
        // "fastest" is a superlative trigger, but without "driver" or
        // "racer" the utterance falls through to the fastest-car rule.
        assert_eq!(match_intent("fastest car ever"), Some(Intent::FastestCar));
    }

    #[test]
    fn test_fastest_driver_is_superlative() {
        assert_eq!(match_intent("fastest driver"), Some(Intent::BestDriver));
    }

    #[test]
    fn test_schedule_outranks_race_count() {
        // "how many races" also contains "races", a schedule trigger
        // higher in the table.
        assert_eq!(match_intent("how many races"), Some(Intent::Schedule));
        assert_eq!(match_intent("how many rounds in total"), None);
    }

    #[test]
    fn test_scan() {
        assert_eq!(match_intent("run a system scan"), Some(Intent::Scan));
        assert_eq!(match_intent("analyze the car"), Some(Intent::Scan));
    }
}
