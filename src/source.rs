use thiserror::Error;

use crate::tree::{AvlTree, Comparator, OutOfMemory};

/// The record source yielded malformed input mid-stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed record in source: {reason}")]
pub struct SourceFormatError {
    reason: String,
}

impl SourceFormatError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// An error reported while bulk loading a tree from a record source.
///
/// Either way the tree keeps every record inserted before the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error(transparent)]
    OutOfMemory(#[from] OutOfMemory),
    #[error(transparent)]
    SourceFormat(#[from] SourceFormatError),
}

/// A finite, non-restartable sequence of records to load a tree from.
///
/// Running out of records cleanly is not an error; a parsing failure in the
/// underlying input is. Any `Iterator<Item = Result<T, SourceFormatError>>`
/// is a record source.
pub trait RecordSource {
    type Record;

    /// Returns the next record, or `Ok(None)` once the source is exhausted.
    fn next_record(&mut self) -> Result<Option<Self::Record>, SourceFormatError>;
}

impl<T, I> RecordSource for I
where
    I: Iterator<Item = Result<T, SourceFormatError>>,
{
    type Record = T;

    fn next_record(&mut self) -> Result<Option<T>, SourceFormatError> {
        self.next().transpose()
    }
}

impl<T, C: Comparator<T>> AvlTree<T, C> {
    /// Inserts every record the source yields, in order, until the source is
    /// exhausted.
    ///
    /// On a source format error or a failed node allocation the load stops
    /// and the tree retains everything inserted up to that point.
    pub fn build_from<S>(&mut self, source: &mut S) -> Result<(), BuildError>
    where
        S: RecordSource<Record = T>,
    {
        while let Some(record) = source.next_record()? {
            self.insert(record)?;
        }
        Ok(())
    }
}
