pub mod classifier;
pub mod pattern;

pub use classifier::{AuthClassifier, Classification, ClassifierSettings};
pub use pattern::{AuthPattern, CredentialLocation};
