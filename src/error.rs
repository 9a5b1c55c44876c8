use std::io;
use std::result;

use thiserror::Error;

use crate::arena::NodeId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("out of memory: tree arena can't grow to {requested} nodes")]
    OutOfMemory{ requested: usize },
    #[error("unexpected {found:?} at offset {offset}, expected {expected}")]
    UnexpectedToken{ offset: usize, expected: &'static str, found: char },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof{ expected: &'static str },
    #[error("invalid value at offset {offset}")]
    InvalidValue{ offset: usize },
    #[error("trailing input at offset {offset}")]
    TrailingInput{ offset: usize },
    #[error("the root node can't have siblings")]
    SiblingOfRoot,
    #[error("the root node can't be grafted")]
    GraftRoot,
    #[error("a node can't become its own descendant")]
    Cycle,
    #[error("{0:?} is not a live node of this tree")]
    InvalidNode(NodeId),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl Error{
    /// Whether this error comes from malformed serialized input.
    pub fn is_parse_error(&self) -> bool{
        match self{
            Error::UnexpectedToken{..}
            | Error::UnexpectedEof{..}
            | Error::InvalidValue{..}
            | Error::TrailingInput{..} => true,
            _ => false,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
