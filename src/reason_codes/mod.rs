//! Reason codes
//!
//! Turns signed local contributions into short, ranked, audit-facing
//! statements such as `RC-01: Higher debt ratio increases risk score.`

mod generator;

pub use generator::{
    load_templates, Direction, ReasonCode, ReasonCodeConfig, ReasonCodeGenerator, ReasonTemplate,
    ReasonTemplates, MAX_REASON_CODES,
};
