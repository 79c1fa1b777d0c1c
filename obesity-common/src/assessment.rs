//! Class index → label, advisory text and presentation tier
//!
//! Pure table lookup. Indices outside the seven known classes resolve to an
//! explicit "unknown" entry instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Label returned for class indices the table does not know
pub const UNKNOWN_LABEL: &str = "unknown";

/// Class index produced by the classifier (nominally 0..=6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassIndex(pub u32);

impl fmt::Display for ClassIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Presentation-only severity grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Informational,
    Cautionary,
    Urgent,
}

/// Copy register for page text and advice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// Self-assessment tool addressed to the individual
    #[default]
    Consumer,
    /// Decision-support aid addressed to a health professional
    Clinical,
}

impl Framing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framing::Consumer => "consumer",
            Framing::Clinical => "clinical",
        }
    }

    pub fn page_title(&self) -> &'static str {
        match self {
            Framing::Consumer => "Obesity Level Predictor",
            Framing::Clinical => "Obesity Risk Assessment (Clinical Aid)",
        }
    }

    pub fn page_intro(&self) -> &'static str {
        match self {
            Framing::Consumer => {
                "This tool uses a machine learning model (Random Forest) to estimate \
                 an obesity level from body measurements and lifestyle habits. \
                 Fill in the fields below to get your result."
            }
            Framing::Clinical => {
                "Decision-support aid. A Random Forest classifier trained on \
                 anthropometric and lifestyle data estimates the patient's obesity \
                 category. The result complements, and does not replace, clinical judgement."
            }
        }
    }

    /// Message shown when the model artifact could not be loaded
    pub fn unavailable_message(&self) -> &'static str {
        match self {
            Framing::Consumer => "The prediction feature is temporarily unavailable. Please try again later.",
            Framing::Clinical => {
                "The classification model is temporarily unavailable. No assessment can be produced."
            }
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "consumer" => Ok(Framing::Consumer),
            "clinical" => Ok(Framing::Clinical),
            other => Err(Error::Config(format!(
                "Unknown framing '{}' (expected 'consumer' or 'clinical')",
                other
            ))),
        }
    }
}

/// Human-readable result for one prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assessment {
    pub class_index: ClassIndex,
    pub label: &'static str,
    pub advice: &'static str,
    /// None for unknown class indices
    pub tier: Option<Tier>,
}

impl Assessment {
    pub fn is_known(&self) -> bool {
        self.tier.is_some()
    }
}

struct ClassEntry {
    label: &'static str,
    tier: Tier,
    consumer: &'static str,
    clinical: &'static str,
}

const CLASS_TABLE: [ClassEntry; 7] = [
    ClassEntry {
        label: "Underweight",
        tier: Tier::Informational,
        consumer: "Your weight is below the healthy range. Make sure you eat enough \
                   nutrient-dense food across the day, and consider talking to a \
                   doctor or nutritionist to rule out underlying causes.",
        clinical: "Classified as underweight. Consider nutritional assessment and \
                   screening for causes of low body mass (malabsorption, endocrine, \
                   eating disorders) as clinically indicated.",
    },
    ClassEntry {
        label: "Normal weight",
        tier: Tier::Informational,
        consumer: "Your weight is within the healthy range. Keep up a balanced diet, \
                   regular physical activity and good hydration to stay there.",
        clinical: "Classified as normal weight. No weight-related intervention \
                   indicated; reinforce current dietary and activity habits.",
    },
    ClassEntry {
        label: "Overweight I",
        tier: Tier::Cautionary,
        consumer: "You are slightly above the healthy weight range. Small changes such \
                   as fewer caloric snacks, more vegetables and a few more active days \
                   a week can bring you back.",
        clinical: "Classified as overweight (level I). Recommend lifestyle counselling \
                   on diet quality and physical activity; reassess at follow-up.",
    },
    ClassEntry {
        label: "Overweight II",
        tier: Tier::Cautionary,
        consumer: "You are above the healthy weight range. It is a good moment to review \
                   eating habits and activity levels, ideally with guidance from a \
                   health professional.",
        clinical: "Classified as overweight (level II). Recommend structured lifestyle \
                   intervention and screening for cardiometabolic risk factors.",
    },
    ClassEntry {
        label: "Obesity I",
        tier: Tier::Urgent,
        consumer: "Your result indicates obesity (level I). Please seek guidance from a \
                   doctor to build a safe plan for diet and physical activity.",
        clinical: "Classified as obesity class I. Evaluate comorbidities (hypertension, \
                   dyslipidaemia, type 2 diabetes) and initiate a weight management plan.",
    },
    ClassEntry {
        label: "Obesity II",
        tier: Tier::Urgent,
        consumer: "Your result indicates obesity (level II). We strongly recommend seeing \
                   a doctor for a full assessment and a supervised treatment plan.",
        clinical: "Classified as obesity class II. Comprehensive evaluation advised; \
                   consider multidisciplinary management including pharmacotherapy.",
    },
    ClassEntry {
        label: "Obesity III",
        tier: Tier::Urgent,
        consumer: "Your result indicates severe obesity (level III). Please seek medical \
                   care soon; a specialist team can help with a safe treatment plan.",
        clinical: "Classified as obesity class III. Specialist referral advised; assess \
                   eligibility for intensive or surgical treatment options.",
    },
];

const UNKNOWN_ADVICE: &str =
    "The model returned a category this tool does not recognise, so no guidance can be given.";

/// Number of classes the table knows about
pub const CLASS_COUNT: usize = CLASS_TABLE.len();

/// Look up label, advice and tier for a class index
pub fn assess(index: ClassIndex, framing: Framing) -> Assessment {
    match CLASS_TABLE.get(index.0 as usize) {
        Some(entry) => Assessment {
            class_index: index,
            label: entry.label,
            advice: match framing {
                Framing::Consumer => entry.consumer,
                Framing::Clinical => entry.clinical,
            },
            tier: Some(entry.tier),
        },
        None => Assessment {
            class_index: index,
            label: UNKNOWN_LABEL,
            advice: UNKNOWN_ADVICE,
            tier: None,
        },
    }
}
