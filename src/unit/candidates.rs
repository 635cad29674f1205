//! Candidate words captured when a word is first entered.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Supplies the candidate words for a unit.
///
/// Implemented by whatever ranks suggestions; the log unit only ever asks for
/// the list once and then queries it for exact membership.
pub trait CandidateProvider {
    fn candidates(&self) -> Arc<CandidateList>;
}

/// An immutable, ordered list of candidate words.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateList {
    words: Vec<String>,
}

impl CandidateList {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Case-sensitive membership. The empty string is never a member.
    pub fn contains(&self, word: &str) -> bool {
        !word.is_empty() && self.words.iter().any(|w| w == word)
    }
}

impl CandidateProvider for Arc<CandidateList> {
    fn candidates(&self) -> Arc<CandidateList> {
        Arc::clone(self)
    }
}
