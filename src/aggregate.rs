//! Classification aggregator — reduce a document's markings to one verdict

use crate::level::{ClassificationLevel, SECRET_ORDINAL};
use crate::types::{Marking, Verdict};

const UNDETERMINED: &str =
    "Classification level could not be determined. Proceed with caution.";

/// Fixed rationale for a level
///
/// Ordinals above the table fall back to the cautionary sentence rather than
/// reading as a clean result.
pub fn explanation(level: u8) -> &'static str {
    match level {
        0 => "No restrictive classification detected. Content may be processed normally.",
        1 => "Content is marked CONFIDENTIAL. Handle according to organizational policy.",
        2 => "Content is marked SECRET. Processing by external services requires explicit user override.",
        3 => "Content is marked TOP SECRET. External processing is strongly discouraged.",
        4 => "Content is marked COSMIC TOP SECRET. External processing is strongly discouraged.",
        _ => UNDETERMINED,
    }
}

/// Reduce markings to a single highest-severity verdict
///
/// `level`, `canonical_text` and `warning_required` depend only on the set of
/// markings; `markings` keeps the order it was given.
pub fn aggregate(markings: Vec<Marking>) -> Verdict {
    let top = highest(&markings).unwrap_or_default();

    Verdict {
        detected: !markings.is_empty(),
        level: top.ordinal(),
        canonical_text: top.name().to_string(),
        warning_required: top.ordinal() >= SECRET_ORDINAL,
        explanation: explanation(top.ordinal()).to_string(),
        color: top.color().to_string(),
        markings,
    }
}

/// Verdict for input with nothing to scan
pub fn empty_verdict() -> Verdict {
    aggregate(Vec::new())
}

/// Highest classification among the markings, if any
pub fn highest(markings: &[Marking]) -> Option<ClassificationLevel> {
    markings.iter().map(|m| m.classification).max()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MarkingFamily;

    fn marking(level: ClassificationLevel, line: usize) -> Marking {
        Marking {
            raw_text: level.alias().to_string(),
            classification: level,
            line,
            family: MarkingFamily::Portion,
        }
    }

    #[test]
    fn test_no_markings() {
        let verdict = aggregate(vec![]);
        assert!(!verdict.detected);
        assert_eq!(verdict.level, 0);
        assert_eq!(verdict.canonical_text, "UNCLASSIFIED");
        assert!(!verdict.warning_required);
        assert!(verdict.markings.is_empty());
        assert_eq!(verdict.color, "green");
        assert_eq!(verdict, empty_verdict());
    }

    #[test]
    fn test_highest_wins() {
        let verdict = aggregate(vec![
            marking(ClassificationLevel::Unclassified, 1),
            marking(ClassificationLevel::Secret, 1),
            marking(ClassificationLevel::Confidential, 2),
        ]);
        assert!(verdict.detected);
        assert_eq!(verdict.level, 2);
        assert_eq!(verdict.canonical_text, "SECRET");
        assert!(verdict.warning_required);
        assert_eq!(verdict.markings.len(), 3);
        assert_eq!(verdict.color, "red");
    }

    #[test]
    fn test_order_independent() {
        let levels = [
            ClassificationLevel::Confidential,
            ClassificationLevel::TopSecret,
            ClassificationLevel::Unclassified,
            ClassificationLevel::Secret,
        ];
        let forward: Vec<Marking> = levels.iter().map(|l| marking(*l, 1)).collect();
        let mut reversed = forward.clone();
        reversed.reverse();

        let a = aggregate(forward.clone());
        let b = aggregate(reversed);
        assert_eq!(a.level, b.level);
        assert_eq!(a.canonical_text, b.canonical_text);
        assert_eq!(a.warning_required, b.warning_required);
        assert_eq!(a.markings, forward);
    }

    #[test]
    fn test_explicit_unclassified_is_detected() {
        let verdict = aggregate(vec![marking(ClassificationLevel::Unclassified, 1)]);
        assert!(verdict.detected);
        assert_eq!(verdict.level, 0);
        assert!(!verdict.warning_required);
    }

    #[test]
    fn test_confidential_no_warning() {
        let verdict = aggregate(vec![marking(ClassificationLevel::Confidential, 1)]);
        assert_eq!(verdict.level, 1);
        assert!(!verdict.warning_required);
    }

    #[test]
    fn test_explanation_out_of_table_is_cautious() {
        assert!(explanation(5).contains("could not be determined"));
        assert!(explanation(255).contains("caution"));
        assert!(explanation(2).contains("SECRET"));
    }

    #[test]
    fn test_parsed_marking_level_is_ignored() {
        let parsed: Marking = serde_json::from_str(
            r#"{"rawText":"TS","classification":"TOP SECRET","level":0,"line":1,"family":"banner"}"#,
        )
        .unwrap();
        let verdict = aggregate(vec![parsed]);
        assert_eq!(verdict.level, 3);
        assert_eq!(verdict.markings[0].level(), verdict.level);
    }

    #[test]
    fn test_highest() {
        assert_eq!(highest(&[]), None);
        assert_eq!(
            highest(&[
                marking(ClassificationLevel::CosmicTopSecret, 1),
                marking(ClassificationLevel::Secret, 2),
            ]),
            Some(ClassificationLevel::CosmicTopSecret)
        );
    }
}
