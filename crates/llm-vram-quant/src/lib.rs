//! GGUF quantization scheme table.
//!
//! Maps the llama.cpp quantization scheme names (`Q4_K_M`, `Q8_0`, ...) to the
//! average number of bits stored per model weight. The table is fixed at
//! compile time and shared by the whole process.
//!
//! # Example
//!
//! ```
//! use llm_vram_quant::{QuantScheme, bits_per_weight, scheme_names};
//!
//! assert_eq!(bits_per_weight("Q4_K_S"), Some(4.58));
//! assert_eq!(bits_per_weight("Q4_K_XL"), None);
//! assert_eq!(scheme_names().first(), Some(&"Q2_K"));
//! assert_eq!("Q8_0".parse::<QuantScheme>().unwrap().bits_per_weight(), 8.5);
//! ```

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Scheme enum
// ---------------------------------------------------------------------------

/// A GGUF quantization scheme known to the estimator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum QuantScheme {
    Q2_K,
    Q3_K_S,
    Q3_K_M,
    Q3_K_L,
    Q4_0,
    Q4_K_S,
    Q4_K_M,
    Q5_0,
    Q5_K_S,
    Q5_K_M,
    Q6_K,
    Q8_0,
}

impl QuantScheme {
    /// Every scheme, in table order.
    pub const ALL: [QuantScheme; 12] = [
        Self::Q2_K,
        Self::Q3_K_S,
        Self::Q3_K_M,
        Self::Q3_K_L,
        Self::Q4_0,
        Self::Q4_K_S,
        Self::Q4_K_M,
        Self::Q5_0,
        Self::Q5_K_S,
        Self::Q5_K_M,
        Self::Q6_K,
        Self::Q8_0,
    ];

    /// Canonical scheme name as it appears in GGUF file names.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Q2_K => "Q2_K",
            Self::Q3_K_S => "Q3_K_S",
            Self::Q3_K_M => "Q3_K_M",
            Self::Q3_K_L => "Q3_K_L",
            Self::Q4_0 => "Q4_0",
            Self::Q4_K_S => "Q4_K_S",
            Self::Q4_K_M => "Q4_K_M",
            Self::Q5_0 => "Q5_0",
            Self::Q5_K_S => "Q5_K_S",
            Self::Q5_K_M => "Q5_K_M",
            Self::Q6_K => "Q6_K",
            Self::Q8_0 => "Q8_0",
        }
    }

    /// Average bits stored per weight, block scales included.
    pub const fn bits_per_weight(self) -> f64 {
        match self {
            Self::Q2_K => 3.35,
            Self::Q3_K_S => 3.5,
            Self::Q3_K_M => 3.91,
            Self::Q3_K_L => 4.27,
            Self::Q4_0 => 4.55,
            Self::Q4_K_S => 4.58,
            Self::Q4_K_M => 4.85,
            Self::Q5_0 => 5.54,
            Self::Q5_K_S => 5.54,
            Self::Q5_K_M => 5.69,
            Self::Q6_K => 6.59,
            Self::Q8_0 => 8.5,
        }
    }

    /// Look up a scheme by its canonical name. Matching is case-sensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|scheme| scheme.name() == name)
    }
}

impl std::fmt::Display for QuantScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for QuantScheme {
    type Err = UnknownSchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownSchemeError(s.to_string()))
    }
}

/// Returned by [`QuantScheme::from_str`](std::str::FromStr) for a name that is not in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSchemeError(pub String);

impl std::fmt::Display for UnknownSchemeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown quantization scheme '{}' (known: {})", self.0, scheme_names().join(", "))
    }
}

impl std::error::Error for UnknownSchemeError {}

// ---------------------------------------------------------------------------
// Name-based API
// ---------------------------------------------------------------------------

const SCHEME_NAMES: [&str; 12] = {
    let mut names = [""; 12];
    let mut i = 0;
    while i < QuantScheme::ALL.len() {
        names[i] = QuantScheme::ALL[i].name();
        i += 1;
    }
    names
};

/// Bits per weight for a scheme name, or `None` when the name is unknown.
#[inline]
pub fn bits_per_weight(name: &str) -> Option<f64> {
    QuantScheme::from_name(name).map(QuantScheme::bits_per_weight)
}

/// All scheme names in table order. Every call returns the same slice.
#[inline]
pub fn scheme_names() -> &'static [&'static str] {
    &SCHEME_NAMES
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
