//! In-memory parcel collection and a JSON-backed source.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::NavError;
use crate::parcel::{Parcel, ParcelId, ParcelRecord};
use crate::traits::ParcelSource;

/// Sole owner of parcel lifetimes; everything else holds `Arc`s.
#[derive(Debug, Default)]
pub struct ParcelStore {
    parcels: Vec<Arc<Parcel>>,
    index: HashMap<ParcelId, usize>,
}

impl ParcelStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk ingestion. Replaces anything loaded before.
    ///
    /// Duplicate ids keep the first record. Degenerate rings are kept and
    /// rejected later, at selection time.
    pub fn load(&mut self, source: &dyn ParcelSource) -> Result<usize, NavError> {
        let records = source.fetch()?;
        if records.is_empty() {
            return Err(NavError::DataUnavailable("parcel source returned no records".to_string()));
        }

        let parcels: Vec<Parcel> = records.into_par_iter().map(Parcel::from_record).collect();

        self.parcels.clear();
        self.index.clear();
        for parcel in parcels {
            if self.index.contains_key(parcel.id()) {
                warn!(parcel = %parcel.id(), "duplicate parcel id, keeping first");
                continue;
            }
            if let Err(err) = parcel.validate() {
                warn!(error = %err, "loaded parcel cannot be navigated to");
            }
            self.index.insert(parcel.id().clone(), self.parcels.len());
            self.parcels.push(Arc::new(parcel));
        }

        info!(parcels = self.parcels.len(), "parcels loaded");
        Ok(self.parcels.len())
    }

    /// Exact-match lookup.
    pub fn find_by_id(&self, id: &ParcelId) -> Option<Arc<Parcel>> {
        self.index.get(id).map(|&slot| Arc::clone(&self.parcels[slot]))
    }

    pub fn all(&self) -> &[Arc<Parcel>] {
        &self.parcels
    }

    pub fn len(&self) -> usize {
        self.parcels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parcels.is_empty()
    }

    /// Parcels whose id starts with `prefix`, sorted by id.
    pub fn search(&self, prefix: &str) -> Vec<Arc<Parcel>> {
        let mut hits: Vec<Arc<Parcel>> = self
            .parcels
            .par_iter()
            .filter(|parcel| parcel.id().as_str().starts_with(prefix))
            .cloned()
            .collect();
        hits.sort_by(|a, b| a.id().cmp(b.id()));
        hits
    }
}

/// JSON array of parcel records, from a string or a file.
#[derive(Debug, Clone)]
pub enum JsonParcelSource {
    Inline(String),
    File(PathBuf),
}

impl JsonParcelSource {
    pub fn inline(json: impl Into<String>) -> Self {
        Self::Inline(json.into())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

impl ParcelSource for JsonParcelSource {
    fn fetch(&self) -> Result<Vec<ParcelRecord>, NavError> {
        let json = match self {
            Self::Inline(json) => json.clone(),
            Self::File(path) => std::fs::read_to_string(path)
                .map_err(|err| NavError::DataUnavailable(format!("{}: {}", path.display(), err)))?,
        };
        serde_json::from_str(&json).map_err(|err| NavError::DataUnavailable(err.to_string()))
    }
}
