use thiserror::Error;

/// Input problems detected before the working set is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("commit {commit} references unknown parent {parent}")]
    MissingParent { commit: String, parent: String },
    #[error("head {head} points at unknown commit {target}")]
    DanglingHead { head: String, target: String },
    #[error("hash {0} appears more than once in the input")]
    DuplicateHash(String),
    #[error("no commit without parents; cannot place a root")]
    MissingRoot,
    #[error("more than one root commit: {first} and {second}")]
    MultipleRoots { first: String, second: String },
}
