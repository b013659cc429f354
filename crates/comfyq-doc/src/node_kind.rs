//! The fixed set of node types the engine recognizes

/// Latent video node whose `length` input sets the frame count
pub const LENGTH_SOURCE_TYPE: &str = "EmptyHunyuanLatentVideo";

const LENGTH_SOURCE_TYPES: &[&str] = &[LENGTH_SOURCE_TYPE];

/// Output nodes carrying a `filename_prefix`
pub const SAVE_OUTPUT_TYPES: &[&str] = &["SaveVideo", "SaveImage"];

/// Sampler nodes carrying `inputs.seed`
pub const SAMPLER_TYPES: &[&str] = &[
    "KSampler",
    "KSamplerAdvanced",
    "KSampler (Efficient)",
    "KSamplerSDXL",
    "KSamplerTiled",
    "SamplerCustom",
];

/// Role a recognized node plays in a transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    /// Source of the video length
    LengthSource,
    /// Writes output files under a prefix
    SaveOutput,
    /// Consumes a seed
    Sampler,
}

impl NodeRole {
    /// Classify a declared node type
    #[must_use]
    pub fn of(class_type: &str) -> Option<Self> {
        if class_type == LENGTH_SOURCE_TYPE {
            Some(Self::LengthSource)
        } else if SAVE_OUTPUT_TYPES.contains(&class_type) {
            Some(Self::SaveOutput)
        } else if SAMPLER_TYPES.contains(&class_type) {
            Some(Self::Sampler)
        } else {
            None
        }
    }

    /// Declared types that have this role
    #[must_use]
    pub fn type_names(self) -> &'static [&'static str] {
        match self {
            Self::LengthSource => LENGTH_SOURCE_TYPES,
            Self::SaveOutput => SAVE_OUTPUT_TYPES,
            Self::Sampler => SAMPLER_TYPES,
        }
    }
}
