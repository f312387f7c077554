//! Non-fatal conditions raised while estimating.
//!
//! A diagnostic never changes a computed number. Raising one emits a
//! `tracing` warning and records it on the caller's [`Diagnostics`] so that
//! callers can detect degraded estimates without scraping logs.

use serde::Serialize;

/// A non-fatal estimation condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[non_exhaustive]
pub enum Diagnostic {
    /// The compute-buffer formula is calibrated for one batch size only.
    /// Smaller batches are overestimated.
    NonStandardBatchSize { batch_size: u64, reference: u64 },
    /// The scheme name is not in the quantization table, bpw fell back to 0
    /// and the model size is reported as 0.
    UnknownQuantScheme { name: String },
}

impl Diagnostic {
    /// Stable machine-readable key.
    pub fn key(&self) -> &'static str {
        match self {
            Self::NonStandardBatchSize { .. } => "non_standard_batch_size",
            Self::UnknownQuantScheme { .. } => "unknown_quant_scheme",
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonStandardBatchSize { batch_size, reference } => write!(
                f,
                "batch size {batch_size} is not supported for the compute buffer, \
                 the estimate uses batch size {reference} and overestimates"
            ),
            Self::UnknownQuantScheme { name } => write!(
                f,
                "unknown quantization scheme '{name}', using 0 bits per weight (model size 0)"
            ),
        }
    }
}

/// Diagnostics collected during a single estimation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `diagnostic` at WARN level and record it.
    pub fn raise(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(key = diagnostic.key(), "{}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    /// Number of recorded diagnostics with the given [`Diagnostic::key`].
    pub fn count(&self, key: &str) -> usize {
        self.items.iter().filter(|d| d.key() == key).count()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raise_records_in_order() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());
        diags.raise(Diagnostic::UnknownQuantScheme { name: "Q9".into() });
        diags.raise(Diagnostic::NonStandardBatchSize { batch_size: 1, reference: 512 });
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.count("unknown_quant_scheme"), 1);
        assert_eq!(diags.count("non_standard_batch_size"), 1);
        let keys: Vec<_> = diags.iter().map(Diagnostic::key).collect();
        assert_eq!(keys, ["unknown_quant_scheme", "non_standard_batch_size"]);
    }

    #[test]
    fn serializes_with_kind_tag() {
        let d = Diagnostic::NonStandardBatchSize { batch_size: 256, reference: 512 };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["kind"], "non_standard_batch_size");
        assert_eq!(json["batch_size"], 256);
    }

    #[test]
    fn display_messages() {
        let d = Diagnostic::UnknownQuantScheme { name: "IQ1_S".into() };
        insta::assert_snapshot!(d.to_string(), @"unknown quantization scheme 'IQ1_S', using 0 bits per weight (model size 0)");
    }
}
