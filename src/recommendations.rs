/// Advisory strings per risk level, in priority order. Levels outside the
/// known three map to an empty list rather than an error.
pub fn recommendations_for(risk_level: &str) -> &'static [&'static str] {
    match risk_level {
        "Low" => &[
            "Continue regular health checkups",
            "Maintain healthy lifestyle",
            "Annual screening recommended",
        ],
        "Medium" => &[
            "Schedule consultation with oncologist",
            "Consider additional screening tests",
            "Monitor symptoms closely",
            "Lifestyle modifications recommended",
        ],
        "High" => &[
            "Immediate consultation with oncologist required",
            "Comprehensive diagnostic workup needed",
            "Consider genetic counseling",
            "Frequent monitoring essential",
        ],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_low_has_three_items() {
        assert_eq!(recommendations_for("Low").len(), 3);
        assert_eq!(
            recommendations_for("Low")[0],
            "Continue regular health checkups"
        );
    }

    #[test]
    fn test_medium_and_high_have_four_items() {
        assert_eq!(recommendations_for("Medium").len(), 4);
        assert_eq!(recommendations_for("High").len(), 4);
        assert_eq!(
            recommendations_for("High")[0],
            "Immediate consultation with oncologist required"
        );
    }

    #[test]
    fn test_unrecognized_levels_are_empty() {
        assert!(recommendations_for("").is_empty());
        assert!(recommendations_for("low").is_empty());
        assert!(recommendations_for("CRITICAL").is_empty());
    }

    #[test]
    fn test_lookup_is_stable_across_calls() {
        let first = recommendations_for("Medium");
        let second = recommendations_for("Medium");
        assert_eq!(first, second);

        // Interleave other lookups; the answer must not depend on history.
        recommendations_for("High");
        recommendations_for("nonsense");
        assert_eq!(recommendations_for("Medium"), first);
    }
}
