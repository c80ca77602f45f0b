//! End-to-end extraction
//!
//! For each category the pipeline resolves its sheet, scans and maps rows,
//! and normalizes them. A category without a sheet of its own is taken from
//! the aggregate sheet when one exists. The workbook is read once and is
//! not needed after [`Extractor::extract`] returns.

use std::collections::BTreeMap;
use std::path::Path;

use price_sheets_core::{Workbook, Worksheet};
use price_sheets_xlsx::XlsxReader;

use crate::assembler::{CatalogAssembler, CategoryRows};
use crate::category::Category;
use crate::error::{CatalogError, CatalogResult};
use crate::events::{EventSink, ExtractionEvent, Outcome};
use crate::locator::SheetLocator;
use crate::mapper::{ColumnMapper, FieldValues};
use crate::model::{Catalog, PricingOverrides};
use crate::normalizer::{Normalized, NormalizedRow, RecordNormalizer, Rejection};
use crate::pricing::{PricingReader, PricingResolution};
use crate::profile::{row_index, ExtractionProfile, Layout, SectionSpec, TableSpec};
use crate::scanner::{RawRow, SectionRow, TableScanner};
use crate::summary::{CategorySource, CategorySummary, ExtractionSummary};

/// What to do when materials discovery finds nothing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Emit no materials
    #[default]
    Disabled,
    /// Emit the profile's built-in materials and mark the category degraded
    BuiltinMaterials,
}

/// What to do when records share a code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Keep every record and report the collision
    #[default]
    Report,
    /// Fail the run before anything is written
    Deny,
}

/// Options for one extraction run
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub fallback: FallbackPolicy,
    pub duplicates: DuplicatePolicy,
    /// Write documents even when every category is empty
    pub write_empty: bool,
    /// Highest-precedence pricing values
    pub pricing_overrides: PricingOverrides,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            fallback: FallbackPolicy::default(),
            duplicates: DuplicatePolicy::default(),
            write_empty: true,
            pricing_overrides: PricingOverrides::default(),
        }
    }
}

impl ExtractOptions {
    /// Whether `catalog` should be written out
    pub fn should_write(&self, catalog: &Catalog) -> bool {
        self.write_empty || !catalog.is_empty()
    }
}

/// A finished extraction
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub catalog: Catalog,
    pub summary: ExtractionSummary,
}

/// Open a workbook, distinguishing a missing file from an unreadable one
pub fn open_workbook<P: AsRef<Path>>(path: P) -> CatalogResult<Workbook> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CatalogError::MissingWorkbook {
            path: path.to_path_buf(),
        });
    }
    tracing::info!(path = %path.display(), "reading workbook");
    XlsxReader::read_file(path).map_err(|source| CatalogError::UnreadableWorkbook {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs extraction with one profile, reporting to one event sink
pub struct Extractor<'p, S> {
    profile: &'p ExtractionProfile,
    options: ExtractOptions,
    sink: S,
}

impl<'p, S: EventSink> Extractor<'p, S> {
    pub fn new(profile: &'p ExtractionProfile, options: ExtractOptions, sink: S) -> Self {
        Self {
            profile,
            options,
            sink,
        }
    }

    /// The event sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Give back the event sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Read the workbook at `path` and extract from it
    pub fn extract_file<P: AsRef<Path>>(&mut self, path: P) -> CatalogResult<Extraction> {
        let workbook = open_workbook(path)?;
        self.extract(&workbook)
    }

    /// Extract the catalog from an opened workbook
    pub fn extract(&mut self, workbook: &Workbook) -> CatalogResult<Extraction> {
        self.options.pricing_overrides.validate()?;
        let profile = self.profile;
        let locator = SheetLocator::new(workbook);
        let aggregate = profile
            .aggregate
            .as_ref()
            .and_then(|spec| locator.find(&spec.aliases).map(|sheet| (sheet, spec)));
        let mut sections: Option<BTreeMap<Category, Vec<FieldValues>>> = None;

        let mut streams = Vec::with_capacity(Category::ALL.len());
        let mut summaries = Vec::with_capacity(Category::ALL.len());

        for category in Category::ALL {
            let table = profile.table(category);
            let mut summary = CategorySummary::new(category);

            let rows = match locator.resolve(category, &table.aliases) {
                Ok(sheet) => {
                    summary.sheet = Some(sheet.name().to_string());
                    summary.source = CategorySource::OwnSheet;
                    self.emit(
                        ExtractionEvent::new(Outcome::SheetResolved)
                            .category(category)
                            .sheet(sheet.name()),
                    );
                    self.extract_table(category, table, sheet, &mut summary)
                }
                Err(CatalogError::SheetNotFound { aliases, .. }) => match aggregate {
                    Some((sheet, spec)) => {
                        summary.sheet = Some(sheet.name().to_string());
                        summary.source = CategorySource::Aggregate;
                        self.emit(
                            ExtractionEvent::new(Outcome::AggregateUsed)
                                .category(category)
                                .sheet(sheet.name()),
                        );
                        if sections.is_none() {
                            sections = Some(self.scan_sections(sheet, spec));
                        }
                        let fields = sections
                            .as_mut()
                            .and_then(|grouped| grouped.remove(&category))
                            .unwrap_or_default();
                        let normalizer =
                            RecordNormalizer::new(default_unit(category, table), &spec.header_keywords);
                        self.normalize_rows(category, sheet.name(), normalizer, fields, &mut summary)
                    }
                    None => {
                        self.emit(
                            ExtractionEvent::new(Outcome::SheetMissing { aliases })
                                .category(category),
                        );
                        Vec::new()
                    }
                },
                Err(other) => return Err(other),
            };

            streams.push(CategoryRows { category, rows });
            summaries.push(summary);
        }

        let pricing = self.resolve_pricing(&locator);
        let assembled = CatalogAssembler::assemble(streams, pricing.config);

        for collision in &assembled.collisions {
            self.emit(
                ExtractionEvent::new(Outcome::CodeCollision {
                    code: collision.code.clone(),
                    count: collision.count,
                })
                .category(collision.category),
            );
        }
        let catalog = assembled.catalog;
        for summary in &mut summaries {
            summary.emitted = catalog.count(summary.category);
        }
        let summary = ExtractionSummary {
            categories: summaries,
            pricing_sources: pricing.sources.into_iter().collect(),
            collisions: assembled.collisions,
        };

        if self.options.duplicates == DuplicatePolicy::Deny && !summary.collisions.is_empty() {
            return Err(CatalogError::DuplicateCodes {
                summary: Box::new(summary),
            });
        }
        if catalog.is_empty() {
            self.emit(ExtractionEvent::new(Outcome::EmptyCatalog));
        }

        Ok(Extraction { summary, catalog })
    }

    fn emit(&mut self, event: ExtractionEvent) {
        self.sink.record(event);
    }

    fn extract_table(
        &mut self,
        category: Category,
        table: &TableSpec,
        sheet: &Worksheet,
        summary: &mut CategorySummary,
    ) -> Vec<NormalizedRow> {
        let normalizer = RecordNormalizer::new(default_unit(category, table), &table.header_keywords);

        match &table.layout {
            Layout::Static { first_row, columns } => {
                let fields: Vec<FieldValues> =
                    TableScanner::block(sheet, row_index(*first_row), &columns.key_columns())
                        .map(|row| ColumnMapper::map(&row, columns))
                        .collect();
                self.normalize_rows(category, sheet.name(), normalizer, fields, summary)
            }
            Layout::Discovery(spec) => match ColumnMapper::discover(sheet, spec, category) {
                Some(found) => {
                    self.emit(
                        ExtractionEvent::new(Outcome::ColumnDiscovered {
                            column: found.column.to_string(),
                            rows: found.rows.len(),
                        })
                        .category(category)
                        .sheet(sheet.name()),
                    );
                    let layout = found.layout();
                    let fields: Vec<FieldValues> = found
                        .rows
                        .iter()
                        .map(|row| ColumnMapper::map(&RawRow::new(sheet, *row), &layout))
                        .collect();
                    self.normalize_rows(category, sheet.name(), normalizer, fields, summary)
                }
                None => {
                    self.emit(
                        ExtractionEvent::new(Outcome::DiscoveryFailed)
                            .category(category)
                            .sheet(sheet.name()),
                    );
                    self.fallback_rows(category, sheet.name(), normalizer, summary)
                }
            },
        }
    }

    fn fallback_rows(
        &mut self,
        category: Category,
        sheet: &str,
        normalizer: RecordNormalizer<'_>,
        summary: &mut CategorySummary,
    ) -> Vec<NormalizedRow> {
        let profile = self.profile;
        let fallback = &profile.fallback_materials;
        if self.options.fallback != FallbackPolicy::BuiltinMaterials
            || category != Category::Materials
            || fallback.is_empty()
        {
            return Vec::new();
        }

        summary.source = CategorySource::Fallback;
        summary.degraded = true;
        let rows: Vec<NormalizedRow> = fallback
            .iter()
            .map(|material| NormalizedRow {
                row: None,
                code: None,
                name: material.name.clone(),
                unit: normalizer.default_unit().to_string(),
                price: material.unit_price,
                malformed: Vec::new(),
            })
            .collect();
        self.emit(
            ExtractionEvent::new(Outcome::FallbackUsed { count: rows.len() })
                .category(category)
                .sheet(sheet),
        );
        rows
    }

    fn scan_sections(
        &mut self,
        sheet: &Worksheet,
        spec: &SectionSpec,
    ) -> BTreeMap<Category, Vec<FieldValues>> {
        let mut grouped: BTreeMap<Category, Vec<FieldValues>> = BTreeMap::new();
        for item in TableScanner::sections(sheet, spec) {
            match item {
                SectionRow::Marker { row, category } => self.emit(
                    ExtractionEvent::new(Outcome::SectionStarted)
                        .category(category)
                        .sheet(sheet.name())
                        .row(row + 1),
                ),
                SectionRow::Data { category, row } => grouped
                    .entry(category)
                    .or_default()
                    .push(ColumnMapper::map(&row, &spec.columns)),
                SectionRow::Unassigned { row } => self.emit(
                    ExtractionEvent::new(Outcome::Unassigned)
                        .sheet(sheet.name())
                        .row(row.number()),
                ),
            }
        }
        grouped
    }

    fn normalize_rows(
        &mut self,
        category: Category,
        sheet: &str,
        normalizer: RecordNormalizer<'_>,
        fields: Vec<FieldValues>,
        summary: &mut CategorySummary,
    ) -> Vec<NormalizedRow> {
        let mut rows = Vec::with_capacity(fields.len());
        for field in &fields {
            summary.scanned += 1;
            let event = ExtractionEvent::new(Outcome::Accepted)
                .category(category)
                .sheet(sheet)
                .row(field.row);
            match normalizer.normalize(field) {
                Normalized::Record(row) => {
                    for cell in &row.malformed {
                        summary.malformed_cells += 1;
                        self.emit(ExtractionEvent {
                            outcome: Outcome::Malformed(cell.clone()),
                            ..event.clone()
                        });
                    }
                    self.emit(event);
                    rows.push(row);
                }
                Normalized::Rejected { reason, .. } => {
                    match reason {
                        Rejection::MissingKeys => summary.rejected_missing_keys += 1,
                        Rejection::HeaderRow { .. } => summary.rejected_headers += 1,
                    }
                    self.emit(ExtractionEvent {
                        outcome: Outcome::Rejected(reason),
                        ..event
                    });
                }
            }
        }
        rows
    }

    fn resolve_pricing(&mut self, locator: &SheetLocator<'_>) -> PricingResolution {
        let overrides = self.options.pricing_overrides;
        let profile = self.profile;
        let Some(spec) = profile.pricing.as_ref() else {
            return PricingResolution::resolve(None, &[], &overrides);
        };
        let Some(sheet) = locator.find(&spec.aliases) else {
            return PricingResolution::resolve(None, &[], &overrides);
        };

        let cells = PricingReader::read(sheet, spec);
        for cell in &cells {
            let outcome = match cell.value {
                Some((address, value)) => Outcome::PricingValue {
                    knob: cell.knob,
                    cell: address.to_string(),
                    value,
                },
                None => Outcome::PricingValueMissing {
                    knob: cell.knob,
                    cell: cell.label.to_string(),
                },
            };
            self.emit(
                ExtractionEvent::new(outcome)
                    .sheet(sheet.name())
                    .row(cell.label.row + 1),
            );
        }
        PricingResolution::resolve(Some(sheet.name()), &cells, &overrides)
    }
}

/// Profile override when it has text, else the category's own unit
fn default_unit<'t>(category: Category, table: &'t TableSpec) -> &'t str {
    table
        .default_unit
        .as_deref()
        .map(str::trim)
        .filter(|unit| !unit.is_empty())
        .unwrap_or(category.default_unit())
}
