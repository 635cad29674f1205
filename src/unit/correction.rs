//! Classification of how a unit's word changed after it was first entered.

use std::fmt;

/// How the word of a log unit was corrected, if at all.
///
/// The ordinals are written to the log as `_corType` and must stay stable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CorrectionType {
    /// The word was never replaced
    #[default]
    None,
    /// The word was replaced but no candidates were known to classify it
    Correction,
    /// The replacement was not among the original candidates
    DifferentWord,
    /// The replacement was one of the original candidates
    Typo,
}

impl CorrectionType {
    pub fn ordinal(self) -> u8 {
        match self {
            CorrectionType::None => 0,
            CorrectionType::Correction => 1,
            CorrectionType::DifferentWord => 2,
            CorrectionType::Typo => 3,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(CorrectionType::None),
            1 => Some(CorrectionType::Correction),
            2 => Some(CorrectionType::DifferentWord),
            3 => Some(CorrectionType::Typo),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CorrectionType::None => "none",
            CorrectionType::Correction => "correction",
            CorrectionType::DifferentWord => "different_word",
            CorrectionType::Typo => "typo",
        }
    }
}

impl fmt::Display for CorrectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinals_are_stable() {
        assert_eq!(CorrectionType::None.ordinal(), 0);
        assert_eq!(CorrectionType::Correction.ordinal(), 1);
        assert_eq!(CorrectionType::DifferentWord.ordinal(), 2);
        assert_eq!(CorrectionType::Typo.ordinal(), 3);
        assert_eq!(CorrectionType::from_ordinal(3), Some(CorrectionType::Typo));
        assert_eq!(CorrectionType::from_ordinal(4), None);
    }
}
