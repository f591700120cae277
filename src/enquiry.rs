use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::KioskError;

/// A language offered at the counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub name: &'static str,
    pub code: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language { name: "Hindi", code: "hi" },
    Language { name: "English", code: "en" },
    Language { name: "Bengali", code: "bn" },
    Language { name: "Tamil", code: "ta" },
    Language { name: "Telugu", code: "te" },
    Language { name: "Gujarati", code: "gu" },
    Language { name: "Kannada", code: "kn" },
    Language { name: "Malayalam", code: "ml" },
    Language { name: "Marathi", code: "mr" },
    Language { name: "Punjabi", code: "pa" },
    Language { name: "Urdu", code: "ur" },
    Language { name: "Maithili", code: "mai" },
];

/// Look up a counter language by its code
pub fn language(code: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.code.eq_ignore_ascii_case(code))
}

const RAILWAY_QUESTIONS: &[&str] = &[
    "What is your full name?",
    "What is your phone number?",
    "What is your PNR number?",
    "What is your train number or train name?",
    "What is your boarding station?",
    "What is your destination station?",
    "What is your date of journey?",
    "Do you need to check seat availability?",
    "Do you want to enquire about train timings?",
    "Do you want to enquire about train delay status?",
    "Do you want to know about platform information?",
    "Do you need help with ticket cancellation or refund?",
];

const AIRPORT_QUESTIONS: &[&str] = &[
    "What is your full name?",
    "What is your phone number?",
    "Do you have any identity proof with you?",
    "What is your flight number?",
    "What is your departure city?",
    "What is your destination city?",
    "What is your travel date?",
    "Do you need to check flight status?",
    "Do you want to enquire about check-in counters?",
    "Do you want to enquire about boarding gates?",
    "Do you want to know baggage allowance?",
    "Do you need information about delays or cancellations?",
    "Do you need help with ticket rescheduling?",
];

/// Invitation to the customer to ask anything else, shown after the questions
pub const CLOSING_PROMPT: &str = "If you have any further questions, you can speak in the mic";

/// Kind of counter the kiosk is deployed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnquiryKind {
    Railway,
    Airport,
}

impl EnquiryKind {
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Railway => "Railway Enquiry Questions for the Customer",
            Self::Airport => "Airport Enquiry Questions for the Customer",
        }
    }

    pub fn questions(&self) -> &'static [&'static str] {
        match self {
            Self::Railway => RAILWAY_QUESTIONS,
            Self::Airport => AIRPORT_QUESTIONS,
        }
    }

    /// Question by 1-based number, as shown to the staff
    pub fn question(&self, number: usize) -> Option<&'static str> {
        number.checked_sub(1).and_then(|i| self.questions().get(i).copied())
    }
}

impl FromStr for EnquiryKind {
    type Err = KioskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "railway" | "rail" | "train" => Ok(Self::Railway),
            "airport" | "air" | "flight" => Ok(Self::Airport),
            _ => Err(KioskError::Config(format!(
                "Invalid enquiry kind '{}'. Valid kinds: railway, airport",
                s
            ))),
        }
    }
}
