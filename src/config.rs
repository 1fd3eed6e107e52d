//! Converter configuration.
//!
//! [`ConvertConfig`] holds every tunable parameter for a full dataset
//! conversion.  All fields have defaults matching the MEG-MASC conversion
//! settings.

/// Configuration for a full BIDS → CND dataset conversion.
///
/// All fields are `pub` so you can construct one with struct-update syntax:
///
/// ```
/// use bids2cnd::ConvertConfig;
///
/// let cfg = ConvertConfig {
///     stim_features: vec!["word".into()],   // words only, no phonemes
///     ..ConvertConfig::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Stimulus feature names, one output column each.
    ///
    /// An annotation populates column `i` when its decoded `kind` tag is a
    /// substring of `stim_features[i]` (so a `"word"` annotation matches the
    /// `"word"` feature, and a truncated `"phon"` tag still matches
    /// `"phoneme"`).
    ///
    /// Default: `["word", "phoneme"]` — the MEG-MASC event categories.
    pub stim_features: Vec<String>,

    /// Override for the recording datatype (`eeg`, `meg`, `ieeg`, …).
    ///
    /// When `None` the first datatype directory discovered in the dataset is
    /// used, falling back to `eeg` if none is found.
    ///
    /// Default: `None`.
    pub data_type: Option<String>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            stim_features: vec!["word".into(), "phoneme".into()],
            data_type: None,
        }
    }
}
