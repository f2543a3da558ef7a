use crate::{
    enums::ReadMode,
    metadata::{IdentityField, SeriesIdentity},
    slice::{SliceError, SliceKey, SliceRecord},
};

use dicom::object::DefaultDicomObject;
use log::{debug, info, warn};
use rayon::prelude::*;
use std::{
    collections::{BTreeMap, btree_map},
    path::{Path, PathBuf},
};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("No DICOM slice could be read")]
    EmptySeries,

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Series contains multiple {field}s: {source_name} has {found:?}, expected {expected:?}")]
    SeriesIdentityMismatch {
        source_name: String,
        field: IdentityField,
        expected: String,
        found: String,
    },
}

/// Slices of one series keyed by their ordering key.
///
/// Inserting at an existing key replaces the earlier slice. Replacements are
/// counted, see [`SeriesCollection::collisions`].
#[derive(Debug, Clone)]
pub struct SeriesCollection {
    identity: SeriesIdentity,
    slices: BTreeMap<SliceKey, SliceRecord>,
    collisions: usize,
}

impl SeriesCollection {
    pub fn new(identity: SeriesIdentity) -> Self {
        Self {
            identity,
            slices: BTreeMap::new(),
            collisions: 0,
        }
    }

    /// Stores `slice` under its ordering key, returning the slice it
    /// replaced, if any.
    ///
    /// # Errors
    ///
    /// Returns error if `slice` belongs to another patient, study or series
    pub fn insert(&mut self, slice: SliceRecord) -> Result<Option<SliceRecord>, LoadError> {
        if let Some((field, expected, found)) = self.identity.first_difference(&slice.identity) {
            return Err(LoadError::SeriesIdentityMismatch {
                source_name: slice.source_name(),
                field,
                expected: expected.to_string(),
                found: found.to_string(),
            });
        }

        let key = slice.ordering_key();
        let replaced = self.slices.insert(key, slice);
        if let Some(previous) = &replaced {
            self.collisions += 1;
            warn!(
                "Slice key {} collides with {}, keeping the later slice",
                key,
                previous.source_name()
            );
        }
        Ok(replaced)
    }

    pub fn identity(&self) -> &SeriesIdentity {
        &self.identity
    }

    pub fn len(&self) -> usize {
        self.slices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Number of insertions that replaced an existing slice.
    ///
    /// A non-zero value means several files share one position, which
    /// usually points at degenerate geometry.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn get(&self, key: SliceKey) -> Option<&SliceRecord> {
        self.slices.get(&key)
    }

    /// Ordering keys in ascending order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = SliceKey> + ExactSizeIterator + '_ {
        self.slices.keys().copied()
    }

    /// Slices in ascending key order.
    pub fn iter(&self) -> btree_map::Iter<'_, SliceKey, SliceRecord> {
        self.slices.iter()
    }
}

impl IntoIterator for SeriesCollection {
    type Item = (SliceKey, SliceRecord);
    type IntoIter = btree_map::IntoIter<SliceKey, SliceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.slices.into_iter()
    }
}

impl<'a> IntoIterator for &'a SeriesCollection {
    type Item = (&'a SliceKey, &'a SliceRecord);
    type IntoIter = btree_map::Iter<'a, SliceKey, SliceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.slices.iter()
    }
}

pub struct SeriesLoader;

impl SeriesLoader {
    /// Load a series from already parsed slices, in discovery order
    ///
    /// Failed reads are logged and skipped. The first slice fixes the series
    /// identity; any later slice with a different identity aborts the load.
    ///
    /// # Errors
    ///
    /// Returns error if slices from different series are mixed or no slice
    /// could be read at all
    pub fn load_from_slices(
        slices: impl IntoIterator<Item = Result<SliceRecord, SliceError>>,
    ) -> Result<SeriesCollection, LoadError> {
        let mut series: Option<SeriesCollection> = None;

        for slice in slices {
            let slice = match slice {
                Ok(slice) => slice,
                Err(e) => {
                    warn!("{e}, skipping");
                    continue;
                }
            };

            let collection =
                series.get_or_insert_with(|| SeriesCollection::new(slice.identity.clone()));

            debug!(
                "{} -> key {}",
                slice.source_name(),
                slice.ordering_key()
            );
            collection.insert(slice)?;
        }

        let series = series.ok_or(LoadError::EmptySeries)?;
        info!(
            "Loaded {} slices of series {} ({} key collisions)",
            series.len(),
            series.identity().series_instance_uid,
            series.collisions()
        );
        Ok(series)
    }

    /// Load a series from DICOM objects
    pub fn load_from_dicom_objects(
        dicom_objects: impl IntoIterator<Item = DefaultDicomObject>,
    ) -> Result<SeriesCollection, LoadError> {
        Self::load_from_slices(dicom_objects.into_iter().map(SliceRecord::from_object).map(Ok))
    }

    /// Load a series from file paths
    ///
    /// Files are parsed in parallel; validation runs in the order of `paths`.
    pub fn load_from_file_paths(
        paths: &[impl AsRef<Path> + Sync],
        read_mode: ReadMode,
    ) -> Result<SeriesCollection, LoadError> {
        let slices: Vec<_> = paths
            .par_iter()
            .map(|path| SliceRecord::open(path, read_mode))
            .collect();

        Self::load_from_slices(slices)
    }

    /// Load a series from every file below `path`
    ///
    /// The directory is walked recursively in file name order. Files that
    /// are not DICOM are skipped like any other unreadable file.
    pub fn load_from_directory(
        path: impl AsRef<Path>,
        read_mode: ReadMode,
    ) -> Result<SeriesCollection, LoadError> {
        let path = path.as_ref();
        if !path.is_dir() {
            return Err(LoadError::NotADirectory(path.to_path_buf()));
        }

        let paths: Vec<PathBuf> = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Cannot access directory entry: {e}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .collect();

        info!("Found {} files in {}", paths.len(), path.display());
        Self::load_from_file_paths(&paths, read_mode)
    }
}
