//! Durable per-dataset page storage.
//!
//! Each dataset owns a directory of `page-NNNNNN.json` files, one per fetched
//! page. Appending writes one new file, so earlier pages are never re-read or
//! rewritten during a fetch.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;
use trials_model::{DatasetId, RawPage};

use crate::error::{FetchError, Result};

const PAGE_PREFIX: &str = "page-";
const PAGE_SUFFIX: &str = ".json";

/// Root directory holding one page directory per dataset.
#[derive(Debug, Clone)]
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    /// Opens (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| FetchError::io(&root, err))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dataset_dir(&self, dataset: &DatasetId) -> PathBuf {
        self.root.join(dataset.as_str())
    }

    /// Path of the page stored at `index` (zero-based fetch order).
    pub fn page_path(&self, dataset: &DatasetId, index: usize) -> PathBuf {
        self.dataset_dir(dataset)
            .join(format!("{PAGE_PREFIX}{index:06}{PAGE_SUFFIX}"))
    }

    /// Drops every stored page for `dataset`.
    pub fn reset(&self, dataset: &DatasetId) -> Result<()> {
        let dir = self.dataset_dir(dataset);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|err| FetchError::io(&dir, err))?;
        }
        fs::create_dir_all(&dir).map_err(|err| FetchError::io(&dir, err))
    }

    /// Stores one page after the existing ones. The page file appears
    /// atomically through a temporary file plus rename.
    pub fn append_page(&self, page: &RawPage) -> Result<()> {
        let dir = self.dataset_dir(&page.dataset);
        fs::create_dir_all(&dir).map_err(|err| FetchError::io(&dir, err))?;
        let index = self
            .page_files(&page.dataset)?
            .last()
            .map_or(0, |(index, _)| index + 1);
        let path = self.page_path(&page.dataset, index);
        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(page).map_err(|err| FetchError::json(&path, err))?;
        {
            let mut file = fs::File::create(&tmp).map_err(|err| FetchError::io(&tmp, err))?;
            file.write_all(&bytes)
                .and_then(|()| file.sync_all())
                .map_err(|err| FetchError::io(&tmp, err))?;
        }
        fs::rename(&tmp, &path).map_err(|err| FetchError::io(&path, err))?;
        debug!(dataset = %page.dataset, index, records = page.len(), path = %path.display(), "page stored");
        Ok(())
    }

    /// Stored pages in fetch order; empty if nothing was stored yet.
    pub fn load(&self, dataset: &DatasetId) -> Result<Vec<RawPage>> {
        self.page_files(dataset)?
            .into_iter()
            .map(|(_, path)| {
                let bytes = fs::read(&path).map_err(|err| FetchError::io(&path, err))?;
                serde_json::from_slice(&bytes).map_err(|err| FetchError::json(&path, err))
            })
            .collect()
    }

    /// All stored records, flattened in page order.
    pub fn records(&self, dataset: &DatasetId) -> Result<Vec<Value>> {
        Ok(self
            .load(dataset)?
            .into_iter()
            .flat_map(|page| page.records)
            .collect())
    }

    /// Page files of `dataset`, sorted by index. Unrelated files are ignored.
    fn page_files(&self, dataset: &DatasetId) -> Result<Vec<(usize, PathBuf)>> {
        let dir = self.dataset_dir(dataset);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in fs::read_dir(&dir).map_err(|err| FetchError::io(&dir, err))? {
            let entry = entry.map_err(|err| FetchError::io(&dir, err))?;
            let name = entry.file_name();
            let index = name
                .to_str()
                .and_then(|name| name.strip_prefix(PAGE_PREFIX))
                .and_then(|rest| rest.strip_suffix(PAGE_SUFFIX))
                .and_then(|digits| digits.parse::<usize>().ok());
            if let Some(index) = index {
                files.push((index, entry.path()));
            }
        }
        files.sort_by_key(|(index, _)| *index);
        Ok(files)
    }
}
