//! Manifest rendering
//!
//! A [`Manifest`] collects serialized resources in declaration order and
//! renders them as a `---`-separated YAML stream. Rendering is fully
//! deterministic: all maps in the resource types are BTreeMaps and document
//! order is fixed, so identical inputs produce byte-identical output. The
//! whole stream is rendered before any byte is written, so a failed synthesis
//! never leaves a partial manifest behind.

use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::k8s::HasApiResource;
use crate::{Error, Result};

/// Ordered collection of manifest documents
#[derive(Clone, Debug, Default)]
pub struct Manifest {
    documents: Vec<serde_yaml::Value>,
}

impl Manifest {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize a resource and append it as the next document
    pub fn push<T: Serialize + HasApiResource>(&mut self, resource: &T) -> Result<()> {
        let value = serde_yaml::to_value(resource)
            .map_err(|e| Error::serialization_for_kind(T::KIND, e.to_string()))?;
        self.documents.push(value);
        Ok(())
    }

    /// Number of documents collected
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the manifest holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Render the documents as a `---`-separated YAML stream
    pub fn to_yaml(&self) -> Result<String> {
        let mut out = String::new();
        for doc in &self.documents {
            let rendered = serde_yaml::to_string(doc)
                .map_err(|e| Error::serialization(e.to_string()))?;
            out.push_str("---\n");
            out.push_str(&rendered);
        }
        Ok(out)
    }

    /// Render and write the manifest to `path` in one step
    ///
    /// Parent directories are created as needed. The stream is rendered in
    /// full before the file is touched.
    pub fn write(&self, path: &Path) -> Result<()> {
        let rendered = self.to_yaml()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Error::output(path, e))?;
            }
        }
        std::fs::write(path, &rendered).map_err(|e| Error::output(path, e))?;
        info!(path = %path.display(), documents = self.len(), "wrote manifest");
        Ok(())
    }
}
