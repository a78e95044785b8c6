use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MlError {
    #[error("shape mismatch in {op}: {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Vec<usize>,
        rhs: Vec<usize>,
    },
    #[error("loss must hold a single element, got shape {0:?}")]
    NonScalarLoss(Vec<usize>),
    #[error("no gradient recorded for parameter tensor {0}")]
    MissingGradient(usize),
    #[error("unknown activation `{0}`")]
    UnknownActivation(String),
    #[error("unknown optimizer `{0}`")]
    UnknownOptimizer(String),
}
