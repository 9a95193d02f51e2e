mod loader;

pub use loader::{
    BaselineConfig, Config, ExtractorConfig, RemediationConfig, SignatureConfig,
    ANNOTATION_SECTION, CLASSES_SECTION,
};
