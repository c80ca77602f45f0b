//! Output documents
//!
//! The catalog is written as two UTF-8 JSON documents. Both are rendered
//! before either file is touched, and each file is replaced atomically via a
//! temporary file in the same directory, so a failed run never leaves a
//! truncated document behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::error::{CatalogError, CatalogResult};
use crate::model::{Catalog, CncOperation, EdgeBanding, Fitting, Material, PricingConfig};

/// Default file name of the pricing tables document
pub const PRICING_TABLES_FILE: &str = "pricing-tables.json";

/// Default file name of the fittings document
pub const FITTINGS_CATALOG_FILE: &str = "fittings-catalog.json";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PricingTablesRef<'a> {
    materials: &'a [Material],
    edge_banding: &'a [EdgeBanding],
    cnc_operations: &'a [CncOperation],
    pricing_config: &'a PricingConfig,
}

#[derive(Serialize)]
struct FittingsRef<'a> {
    fittings: &'a [Fitting],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PricingTables {
    materials: Vec<Material>,
    edge_banding: Vec<EdgeBanding>,
    cnc_operations: Vec<CncOperation>,
    #[serde(default)]
    pricing_config: PricingConfig,
}

#[derive(Deserialize)]
struct FittingsCatalog {
    fittings: Vec<Fitting>,
}

/// Both documents, rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCatalog {
    pub pricing_tables: Vec<u8>,
    pub fittings: Vec<u8>,
}

/// Paths of the written documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenCatalog {
    pub pricing_tables: PathBuf,
    pub fittings: PathBuf,
}

/// Writes and reads the catalog documents in one directory
#[derive(Debug, Clone)]
pub struct CatalogWriter {
    dir: PathBuf,
    pricing_tables_name: String,
    fittings_name: String,
}

impl CatalogWriter {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            dir: dir.into(),
            pricing_tables_name: PRICING_TABLES_FILE.to_string(),
            fittings_name: FITTINGS_CATALOG_FILE.to_string(),
        }
    }

    /// Use a different file name for the pricing tables document
    pub fn with_pricing_tables_name<S: Into<String>>(mut self, name: S) -> Self {
        self.pricing_tables_name = name.into();
        self
    }

    /// Use a different file name for the fittings document
    pub fn with_fittings_name<S: Into<String>>(mut self, name: S) -> Self {
        self.fittings_name = name.into();
        self
    }

    pub fn pricing_tables_path(&self) -> PathBuf {
        self.dir.join(&self.pricing_tables_name)
    }

    pub fn fittings_path(&self) -> PathBuf {
        self.dir.join(&self.fittings_name)
    }

    /// Render both documents as pretty-printed JSON with a trailing newline
    ///
    /// Non-ASCII text is written as-is, not escaped.
    pub fn render(catalog: &Catalog) -> CatalogResult<RenderedCatalog> {
        let pricing_tables = to_document(&PricingTablesRef {
            materials: &catalog.materials,
            edge_banding: &catalog.edge_banding,
            cnc_operations: &catalog.cnc_operations,
            pricing_config: &catalog.pricing_config,
        })?;
        let fittings = to_document(&FittingsRef {
            fittings: &catalog.fittings,
        })?;
        Ok(RenderedCatalog {
            pricing_tables,
            fittings,
        })
    }

    /// Write both documents
    pub fn write(&self, catalog: &Catalog) -> CatalogResult<WrittenCatalog> {
        let rendered = Self::render(catalog)?;
        fs::create_dir_all(&self.dir).map_err(|source| CatalogError::Serialization {
            path: self.dir.clone(),
            source,
        })?;

        let written = WrittenCatalog {
            pricing_tables: self.pricing_tables_path(),
            fittings: self.fittings_path(),
        };
        write_atomic(&written.pricing_tables, &rendered.pricing_tables)?;
        write_atomic(&written.fittings, &rendered.fittings)?;
        tracing::info!(
            pricing_tables = %written.pricing_tables.display(),
            fittings = %written.fittings.display(),
            records = catalog.len(),
            "catalog written"
        );
        Ok(written)
    }

    /// Parse both documents back into a catalog
    pub fn read(&self) -> CatalogResult<Catalog> {
        let tables: PricingTables = serde_json::from_slice(&fs::read(self.pricing_tables_path())?)?;
        let fittings: FittingsCatalog = serde_json::from_slice(&fs::read(self.fittings_path())?)?;
        Ok(Catalog {
            materials: tables.materials,
            edge_banding: tables.edge_banding,
            cnc_operations: tables.cnc_operations,
            fittings: fittings.fittings,
            pricing_config: tables.pricing_config,
        })
    }
}

fn to_document<T: Serialize>(value: &T) -> CatalogResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> CatalogResult<()> {
    let to_error = |source| CatalogError::Serialization {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut file = NamedTempFile::new_in(dir).map_err(to_error)?;
    file.write_all(bytes).map_err(to_error)?;
    file.as_file().sync_all().map_err(to_error)?;
    file.persist(path).map_err(|e| to_error(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::model::CatalogItem;
    use pretty_assertions::assert_eq;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.push(CatalogItem::new(
            Category::EdgeBanding,
            "EB-1".into(),
            "نوار PVC 2 میل".into(),
            "متر طول".into(),
            45_000.0,
        ));
        catalog.push(CatalogItem::new(
            Category::Fittings,
            "FITTING-1".into(),
            "لولا".into(),
            "عدد".into(),
            120_000.0,
        ));
        catalog
    }

    #[test]
    fn test_render_shape() {
        let rendered = CatalogWriter::render(&catalog()).unwrap();
        let tables = String::from_utf8(rendered.pricing_tables).unwrap();
        assert!(tables.starts_with("{\n  \"materials\": [],\n  \"edgeBanding\": [\n"));
        assert!(tables.contains("\"description\": \"نوار PVC 2 میل\""));
        assert!(tables.contains("\"pricePerMeter\": 45000.0"));
        assert!(tables.contains("\"pricingConfig\": {\n    \"laborCostPerHour\": 0.0"));
        assert!(tables.ends_with("}\n"));

        let fittings = String::from_utf8(rendered.fittings).unwrap();
        assert!(fittings.contains("\"qtyPerFitting\": 1"));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CatalogWriter::new(dir.path().join("seed"));
        let catalog = catalog();

        let written = writer.write(&catalog).unwrap();
        assert_eq!(written.pricing_tables, dir.path().join("seed").join(PRICING_TABLES_FILE));
        assert_eq!(writer.read().unwrap(), catalog);
    }

    #[test]
    fn test_custom_names() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CatalogWriter::new(dir.path())
            .with_pricing_tables_name("tables.json")
            .with_fittings_name("fittings.json");
        writer.write(&Catalog::default()).unwrap();
        assert!(dir.path().join("tables.json").is_file());
        assert!(dir.path().join("fittings.json").is_file());
    }

    #[test]
    fn test_read_without_pricing_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(PRICING_TABLES_FILE),
            r#"{"materials": [], "edgeBanding": [], "cncOperations": []}"#,
        )
        .unwrap();
        fs::write(dir.path().join(FITTINGS_CATALOG_FILE), r#"{"fittings": []}"#).unwrap();

        let catalog = CatalogWriter::new(dir.path()).read().unwrap();
        assert_eq!(catalog, Catalog::default());
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let result = CatalogWriter::new(&blocker).write(&catalog());
        assert!(matches!(result, Err(CatalogError::Serialization { .. })));
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
    }
}
