//! Reconciling uploads with the client-declared `fileOrder`.

use std::collections::{HashMap, HashSet};

use sonic_core::AppError;

use super::spool::UploadedFile;
use crate::validator::ValidatedFileSet;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderingError {
    #[error("fileOrder lists {actual} names but {expected} files were uploaded")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("fileOrder names {0:?}, which was not uploaded")]
    UnknownName(String),

    #[error("uploaded file {0:?} is missing from fileOrder")]
    Omitted(String),
}

impl From<OrderingError> for AppError {
    fn from(err: OrderingError) -> Self {
        AppError::FileOrder(err.to_string())
    }
}

/// Uploaded files rearranged so that position `i` holds the file named `fileOrder[i]`.
#[derive(Debug)]
pub struct OrderedFileSet<'a> {
    files: Vec<&'a UploadedFile>,
}

impl<'a> OrderedFileSet<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a UploadedFile> + '_ {
        self.files.iter().copied()
    }

    pub fn names(&self) -> Vec<&'a str> {
        self.files.iter().map(|f| f.name()).collect()
    }

    pub fn first(&self) -> Option<&'a UploadedFile> {
        self.files.first().copied()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Bind each `order` entry to an uploaded file by name.
///
/// The lengths must match, every name must exist, and every uploaded name must appear.
/// When several uploads share a name, the first one in upload order is used for every
/// entry naming it.
pub fn order_files<'a>(
    files: &'a ValidatedFileSet,
    order: &[String],
) -> Result<OrderedFileSet<'a>, OrderingError> {
    if order.len() != files.len() {
        return Err(OrderingError::LengthMismatch {
            expected: files.len(),
            actual: order.len(),
        });
    }

    let mut by_name: HashMap<&str, &UploadedFile> = HashMap::with_capacity(files.len());
    for file in files.files() {
        by_name.entry(file.name()).or_insert(file);
    }

    let ordered = order
        .iter()
        .map(|name| {
            by_name
                .get(name.as_str())
                .copied()
                .ok_or_else(|| OrderingError::UnknownName(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let requested: HashSet<&str> = order.iter().map(String::as_str).collect();
    if let Some(missing) = files
        .files()
        .iter()
        .find(|file| !requested.contains(file.name()))
    {
        return Err(OrderingError::Omitted(missing.name().to_string()));
    }

    Ok(OrderedFileSet { files: ordered })
}
