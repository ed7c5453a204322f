use thiserror::Error;

/// An error raised while tokenizing or kekulizing a SMILES fragment.
///
/// These are the only two ways the encode half of the codec can fail;
/// the decode half (`selfies::decode`) never errors, by design — see
/// `selfies::decode`'s module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SmilesError {
    #[error("malformed SMILES at character {0}")]
    MalformedSmiles(usize),
    #[error("no valid Kekulé structure for the aromatic system at atom {0}")]
    Unkekulizable(usize),
}
