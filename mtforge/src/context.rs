//! The artifact channel threaded through all steps of a run.

use crate::corpus::BilingualCorpus;

/// Intermediate artifacts shared across pipeline steps.
///
/// One step writes a field, a later step reads it. The artifact set is
/// small and fixed per pipeline definition, so fields are declared up
/// front instead of going through a dynamic bag. A context is owned by
/// exactly one run; handlers must not retain references past their own
/// invocation.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    /// The corpora currently feeding the pipeline. Seeded with the
    /// discovered raw corpora, replaced by the cleaning step's output.
    pub corpora: Vec<BilingualCorpus>,
    /// Output of the preprocessing step, once it has run.
    pub processed_corpora: Option<Vec<BilingualCorpus>>,
}

impl BuildContext {
    /// Creates a context seeded with the discovered corpora.
    #[must_use]
    pub fn new(corpora: Vec<BilingualCorpus>) -> Self {
        Self {
            corpora,
            processed_corpora: None,
        }
    }

    /// Returns the corpora to train on: processed corpora when available
    /// and non-empty, otherwise the cleaned/raw set.
    #[must_use]
    pub fn training_corpora(&self) -> &[BilingualCorpus] {
        match &self.processed_corpora {
            Some(processed) if !processed.is_empty() => processed,
            _ => &self.corpora,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn corpus(name: &str, root: &str) -> BilingualCorpus {
        BilingualCorpus::new(name, "en", "fr", root)
    }

    #[test]
    fn test_training_corpora_prefers_processed() {
        let mut ctx = BuildContext::new(vec![corpus("raw", "/raw")]);
        ctx.processed_corpora = Some(vec![corpus("proc", "/processed")]);

        let names: Vec<&str> = ctx.training_corpora().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["proc"]);
    }

    #[test]
    fn test_training_corpora_falls_back_to_raw() {
        let mut ctx = BuildContext::new(vec![corpus("raw", "/raw")]);
        assert_eq!(ctx.training_corpora()[0].name(), "raw");

        // An empty processed set is as good as none.
        ctx.processed_corpora = Some(Vec::new());
        assert_eq!(ctx.training_corpora()[0].name(), "raw");
    }
}
