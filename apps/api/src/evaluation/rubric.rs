//! The GEO rubric — nine fixed criteria for e-commerce copy.
//!
//! This is the canonical key set: the same names are embedded in the
//! evaluation prompt and used to order the returned breakdown. Do not
//! abbreviate or reorder; renderers rely on this ordering.

pub const GEO_CRITERIA: [&str; 9] = [
    "User Intent Alignment",
    "Competitive Differentiation",
    "Social Proof / Reviews",
    "Compelling Narrative",
    "Authoritative Tone",
    "Unique Selling Points (USPs)",
    "Urgency / Call to Action",
    "Scannability (Formatting)",
    "Factual Preservation",
];
