//! Dialect detection
//!
//! The detected dialect is advisory metadata: it selects documentation and
//! analysis context but never changes which parser handles the text.

use crate::explain::plan::PlanDialect;

/// Keywords searched for in priority order; the first one present wins
const DIALECT_KEYWORDS: [(&str, PlanDialect); 2] = [
    ("opengauss", PlanDialect::OpenGauss),
    ("dws", PlanDialect::Dws),
];

/// Classifies raw plan text by a case-insensitive keyword search
///
/// Falls back to [`PlanDialect::OpenGauss`] when no keyword is present.
///
/// # Examples
///
/// ```
/// use planlens_analyzer::explain::{detect_dialect, PlanDialect};
///
/// assert_eq!(detect_dialect("-- captured on DWS cluster"), PlanDialect::Dws);
/// assert_eq!(detect_dialect("Seq Scan on t"), PlanDialect::OpenGauss);
/// ```
pub fn detect_dialect(text: &str) -> PlanDialect {
    let lowered = text.to_lowercase();
    DIALECT_KEYWORDS
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword))
        .map(|(_, dialect)| *dialect)
        .unwrap_or_default()
}
