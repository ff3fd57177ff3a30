//! Row importers for branches, assets and spare parts.
//!
//! Each run locates the header row, maps known columns, then upserts row by
//! row. Rows that cannot be applied are reported, never fatal. A dry run
//! goes through the same matching without writing.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::arabic::normalize;
use super::matcher::BranchMatcher;
use crate::domain::{
    Area, Asset, Branch, Brand, NewAsset, NewBranch, NewSparePart, Sector, SparePart,
};
use crate::error::{DeskError, DeskResult};
use crate::storage::DeskRepository;

/// What a workbook contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Branches,
    Assets,
    SpareParts,
}

impl std::fmt::Display for ImportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ImportKind::Branches => "branches",
            ImportKind::Assets => "assets",
            ImportKind::SpareParts => "spare_parts",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for ImportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "branches" => Ok(ImportKind::Branches),
            "assets" => Ok(ImportKind::Assets),
            "spare_parts" | "parts" => Ok(ImportKind::SpareParts),
            _ => Err(format!("Unknown import kind: {}", s)),
        }
    }
}

/// A row that was not applied.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SkippedRow {
    /// 1-based row number in the sheet.
    pub row: usize,
    pub reason: String,
}

/// Outcome of one import run.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportReport {
    pub kind: ImportKind,
    pub dry_run: bool,
    /// Data rows after the header, blank rows excluded.
    pub rows_read: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: Vec<SkippedRow>,
}

impl ImportReport {
    fn new(kind: ImportKind, dry_run: bool) -> Self {
        Self {
            kind,
            dry_run,
            rows_read: 0,
            inserted: 0,
            updated: 0,
            skipped: Vec::new(),
        }
    }

    fn skip(&mut self, row: usize, reason: impl Into<String>) {
        self.skipped.push(SkippedRow {
            row,
            reason: reason.into(),
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    BranchName,
    BranchCode,
    Area,
    Sector,
    Brand,
    Address,
    AssetBranch,
    AssetName,
    Category,
    Serial,
    PartName,
    PartNumber,
    Quantity,
    MinQuantity,
    Cost,
}

/// Header aliases per column, Arabic first.
fn aliases(column: Column) -> &'static [&'static str] {
    match column {
        Column::BranchName => &["اسم الفرع", "الفرع", "branch", "branch name"],
        Column::BranchCode => &["كود الفرع", "رمز الفرع", "code", "branch code"],
        Column::Area => &["المنطقة", "area"],
        Column::Sector => &["القطاع", "sector"],
        Column::Brand => &["العلامة التجارية", "الماركة", "brand"],
        Column::Address => &["العنوان", "address"],
        Column::AssetBranch => &["الفرع", "اسم الفرع", "branch"],
        Column::AssetName => &["اسم الأصل", "الأصل", "اسم المعدة", "asset", "asset name"],
        Column::Category => &["الفئة", "التصنيف", "category"],
        Column::Serial => &["الرقم التسلسلي", "serial", "serial number"],
        Column::PartName => &["اسم القطعة", "القطعة", "part", "part name"],
        Column::PartNumber => &["رقم القطعة", "part number", "part no"],
        Column::Quantity => &["الكمية", "quantity", "qty"],
        Column::MinQuantity => &["الحد الأدنى", "min quantity", "minimum"],
        Column::Cost => &["التكلفة", "سعر الوحدة", "cost", "unit cost"],
    }
}

fn columns_for(kind: ImportKind) -> (&'static [Column], &'static [Column]) {
    use Column::*;
    match kind {
        ImportKind::Branches => (
            &[BranchName, BranchCode, Area, Sector, Brand, Address],
            &[BranchName],
        ),
        ImportKind::Assets => (
            &[AssetBranch, AssetName, Category, Serial],
            &[AssetBranch, AssetName],
        ),
        ImportKind::SpareParts => (
            &[PartName, PartNumber, Quantity, MinQuantity, Cost],
            &[PartName],
        ),
    }
}

/// Column positions resolved from the header row.
struct HeaderMap {
    row_index: usize,
    positions: HashMap<Column, usize>,
}

impl HeaderMap {
    /// First row in which any cell names a known column.
    fn locate(kind: ImportKind, rows: &[Vec<String>]) -> DeskResult<Self> {
        let (known, required) = columns_for(kind);

        for (row_index, row) in rows.iter().enumerate() {
            let mut positions = HashMap::new();
            for (col_index, cell) in row.iter().enumerate() {
                let key = normalize(cell);
                if key.is_empty() {
                    continue;
                }
                for column in known {
                    if positions.contains_key(column) {
                        continue;
                    }
                    if aliases(*column).iter().any(|a| normalize(a) == key) {
                        positions.insert(*column, col_index);
                        break;
                    }
                }
            }

            if positions.is_empty() {
                continue;
            }
            if let Some(missing) = required.iter().find(|c| !positions.contains_key(*c)) {
                return Err(DeskError::Import(format!(
                    "Header row {} is missing the '{}' column",
                    row_index + 1,
                    aliases(*missing)[0]
                )));
            }
            return Ok(Self {
                row_index,
                positions,
            });
        }

        Err(DeskError::Import(format!(
            "No recognizable header row for {} import",
            kind
        )))
    }

    fn get<'a>(&self, row: &'a [String], column: Column) -> Option<&'a str> {
        self.positions
            .get(&column)
            .and_then(|i| row.get(*i))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// Runs imports against the store.
#[derive(Clone)]
pub struct Importer {
    repository: DeskRepository,
}

impl Importer {
    pub fn new(repository: DeskRepository) -> Self {
        Self { repository }
    }

    pub async fn run(
        &self,
        kind: ImportKind,
        rows: &[Vec<String>],
        dry_run: bool,
    ) -> DeskResult<ImportReport> {
        let header = HeaderMap::locate(kind, rows)?;
        let data: Vec<(usize, &Vec<String>)> = rows
            .iter()
            .enumerate()
            .skip(header.row_index + 1)
            .filter(|(_, row)| row.iter().any(|c| !c.trim().is_empty()))
            .map(|(i, row)| (i + 1, row))
            .collect();

        let mut report = ImportReport::new(kind, dry_run);
        report.rows_read = data.len();

        match kind {
            ImportKind::Branches => self.import_branches(&header, &data, &mut report).await?,
            ImportKind::Assets => self.import_assets(&header, &data, &mut report).await?,
            ImportKind::SpareParts => self.import_parts(&header, &data, &mut report).await?,
        }

        tracing::info!(
            kind = %kind,
            dry_run,
            rows_read = report.rows_read,
            inserted = report.inserted,
            updated = report.updated,
            skipped = report.skipped.len(),
            "Import finished"
        );
        Ok(report)
    }

    async fn import_branches(
        &self,
        header: &HeaderMap,
        data: &[(usize, &Vec<String>)],
        report: &mut ImportReport,
    ) -> DeskResult<()> {
        let dry_run = report.dry_run;
        let mut sectors: HashMap<String, Uuid> = self
            .repository
            .list_sectors()
            .await?
            .into_iter()
            .map(|s| (normalize(&s.name), s.id))
            .collect();
        let mut areas: HashMap<String, Uuid> = self
            .repository
            .list_areas(None)
            .await?
            .into_iter()
            .map(|a| (normalize(&a.name), a.id))
            .collect();
        let mut brands: HashMap<String, Uuid> = self
            .repository
            .list_brands()
            .await?
            .into_iter()
            .map(|b| (normalize(&b.name), b.id))
            .collect();
        let existing = self.repository.list_branches(None, None).await?;
        let mut by_id: HashMap<Uuid, Branch> = existing.iter().map(|b| (b.id, b.clone())).collect();
        let mut matcher = BranchMatcher::new(&existing);

        for (row_no, row) in data {
            let Some(name) = header.get(row, Column::BranchName) else {
                report.skip(*row_no, "Missing branch name");
                continue;
            };

            let sector_id = match header.get(row, Column::Sector) {
                Some(sector) => Some(
                    self.ensure(&mut sectors, sector, dry_run, |n| async move {
                        let s = Sector::new(n);
                        self.repository.create_sector(&s).await.map(|_| s.id)
                    })
                    .await?,
                ),
                None => None,
            };
            let area_id = match header.get(row, Column::Area) {
                Some(area) => Some(
                    self.ensure(&mut areas, area, dry_run, |n| async move {
                        let a = Area::new(n, sector_id);
                        self.repository.create_area(&a).await.map(|_| a.id)
                    })
                    .await?,
                ),
                None => None,
            };
            let brand_id = match header.get(row, Column::Brand) {
                Some(brand) => Some(
                    self.ensure(&mut brands, brand, dry_run, |n| async move {
                        let b = Brand::new(n);
                        self.repository.create_brand(&b).await.map(|_| b.id)
                    })
                    .await?,
                ),
                None => None,
            };
            let code = header.get(row, Column::BranchCode).map(str::to_string);
            let address = header.get(row, Column::Address).map(str::to_string);

            match matcher.find_exact(name).and_then(|id| by_id.get_mut(&id)) {
                Some(branch) => {
                    if code.is_some() {
                        branch.code = code;
                    }
                    if area_id.is_some() {
                        branch.area_id = area_id;
                    }
                    if brand_id.is_some() {
                        branch.brand_id = brand_id;
                    }
                    if address.is_some() {
                        branch.address = address;
                    }
                    branch.updated_at = Utc::now();
                    if !dry_run {
                        self.repository.save_branch(branch).await?;
                    }
                    report.updated += 1;
                }
                None => {
                    let branch = Branch::new(NewBranch {
                        name: name.to_string(),
                        code,
                        area_id,
                        brand_id,
                        address,
                    });
                    if !dry_run {
                        self.repository.create_branch(&branch).await?;
                    }
                    matcher.insert(branch.id, &branch.name);
                    by_id.insert(branch.id, branch);
                    report.inserted += 1;
                }
            }
        }
        Ok(())
    }

    async fn import_assets(
        &self,
        header: &HeaderMap,
        data: &[(usize, &Vec<String>)],
        report: &mut ImportReport,
    ) -> DeskResult<()> {
        let matcher = BranchMatcher::new(&self.repository.list_branches(None, None).await?);
        let mut assets: HashMap<(Uuid, String), Asset> = self
            .repository
            .list_assets(None)
            .await?
            .into_iter()
            .map(|a| ((a.branch_id, normalize(&a.name)), a))
            .collect();

        for (row_no, row) in data {
            let Some(branch_name) = header.get(row, Column::AssetBranch) else {
                report.skip(*row_no, "Missing branch");
                continue;
            };
            let Some(name) = header.get(row, Column::AssetName) else {
                report.skip(*row_no, "Missing asset name");
                continue;
            };
            let Some(branch_id) = matcher.find(branch_name) else {
                report.skip(*row_no, format!("No branch matches '{}'", branch_name));
                continue;
            };
            let category = header.get(row, Column::Category).map(str::to_string);
            let serial = header.get(row, Column::Serial).map(str::to_string);

            let key = (branch_id, normalize(name));
            match assets.get_mut(&key) {
                Some(asset) => {
                    if category.is_some() {
                        asset.category = category;
                    }
                    if serial.is_some() {
                        asset.serial_number = serial;
                    }
                    asset.updated_at = Utc::now();
                    if !report.dry_run {
                        self.repository.save_asset(asset).await?;
                    }
                    report.updated += 1;
                }
                None => {
                    let asset = Asset::new(NewAsset {
                        branch_id,
                        name: name.to_string(),
                        category,
                        serial_number: serial,
                        status: None,
                    });
                    if !report.dry_run {
                        self.repository.create_asset(&asset).await?;
                    }
                    assets.insert(key, asset);
                    report.inserted += 1;
                }
            }
        }
        Ok(())
    }

    async fn import_parts(
        &self,
        header: &HeaderMap,
        data: &[(usize, &Vec<String>)],
        report: &mut ImportReport,
    ) -> DeskResult<()> {
        let mut parts: Vec<SparePart> = self.repository.list_spare_parts(false).await?;

        for (row_no, row) in data {
            let Some(name) = header.get(row, Column::PartName) else {
                report.skip(*row_no, "Missing part name");
                continue;
            };
            let part_number = header.get(row, Column::PartNumber).map(str::to_string);

            let quantity = match parse_count(header.get(row, Column::Quantity)) {
                Ok(q) => q,
                Err(reason) => {
                    report.skip(*row_no, format!("Quantity {}", reason));
                    continue;
                }
            };
            let min_quantity = match parse_count(header.get(row, Column::MinQuantity)) {
                Ok(q) => q,
                Err(reason) => {
                    report.skip(*row_no, format!("Minimum quantity {}", reason));
                    continue;
                }
            };
            let unit_cost = match header.get(row, Column::Cost).map(parse_number).transpose() {
                Ok(c) => c,
                Err(reason) => {
                    report.skip(*row_no, format!("Cost {}", reason));
                    continue;
                }
            };

            let key = normalize(name);
            let by_number = part_number.as_deref().and_then(|wanted| {
                let wanted = normalize(wanted);
                parts.iter().position(|p| {
                    p.part_number.as_deref().is_some_and(|have| normalize(have) == wanted)
                })
            });
            // Rows with a number may still claim a part stored without one.
            let index = by_number.or_else(|| {
                parts.iter().position(|p| {
                    (part_number.is_none() || p.part_number.is_none())
                        && normalize(&p.name) == key
                })
            });

            match index.map(|i| &mut parts[i]) {
                Some(part) => {
                    part.name = name.to_string();
                    if part.part_number.is_none() {
                        part.part_number = part_number;
                    }
                    if let Some(min) = min_quantity {
                        part.min_quantity = min;
                    }
                    if let Some(cost) = unit_cost {
                        part.unit_cost = cost;
                    }
                    part.updated_at = Utc::now();
                    if !report.dry_run {
                        self.repository.save_spare_part(part).await?;
                        if let Some(q) = quantity {
                            let delta = q - part.quantity;
                            if delta != 0 {
                                *part = self.repository.adjust_stock(part.id, delta).await?;
                            }
                        }
                    } else if let Some(q) = quantity {
                        part.quantity = q;
                    }
                    report.updated += 1;
                }
                None => {
                    let part = SparePart::new(NewSparePart {
                        name: name.to_string(),
                        part_number,
                        quantity: quantity.unwrap_or(0),
                        min_quantity: min_quantity.unwrap_or(0),
                        unit_cost: unit_cost.unwrap_or(0.0),
                    });
                    if !report.dry_run {
                        self.repository.create_spare_part(&part).await?;
                    }
                    parts.push(part);
                    report.inserted += 1;
                }
            }
        }
        Ok(())
    }

    /// Id for `name` in `cache`, creating the entity when missing.
    async fn ensure<F, Fut>(
        &self,
        cache: &mut HashMap<String, Uuid>,
        name: &str,
        dry_run: bool,
        create: F,
    ) -> DeskResult<Uuid>
    where
        F: FnOnce(String) -> Fut,
        Fut: std::future::Future<Output = DeskResult<Uuid>>,
    {
        let key = normalize(name);
        if let Some(id) = cache.get(&key) {
            return Ok(*id);
        }
        let id = if dry_run {
            Uuid::new_v4()
        } else {
            create(name.to_string()).await?
        };
        cache.insert(key, id);
        Ok(id)
    }
}

fn parse_number(raw: &str) -> Result<f64, String> {
    let cleaned = normalize(raw).replace('٫', ".").replace(['٬', ','], "");
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| format!("'{}' is not a valid non-negative number", raw))
}

/// Largest stock count a sheet may set.
const MAX_COUNT: i64 = 1_000_000_000;

fn parse_count(raw: Option<&str>) -> Result<Option<i64>, String> {
    match raw {
        None => Ok(None),
        Some(raw) => {
            let value = parse_number(raw)?;
            if value.fract() != 0.0 {
                return Err(format!("'{}' is not a whole number", raw));
            }
            if value > MAX_COUNT as f64 {
                return Err(format!("'{}' exceeds the limit of {}", raw, MAX_COUNT));
            }
            Ok(Some(value as i64))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(data: &[&[&str]]) -> Vec<Vec<String>> {
        data.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("spare-parts".parse::<ImportKind>().unwrap(), ImportKind::SpareParts);
        assert_eq!("Branches".parse::<ImportKind>().unwrap(), ImportKind::Branches);
        assert!("tickets".parse::<ImportKind>().is_err());
    }

    #[test]
    fn test_header_found_below_title_rows() {
        let sheet = rows(&[
            &["قائمة الفروع", ""],
            &["", ""],
            &["اسم الفرع", "المنطقه"],
        ]);
        let header = HeaderMap::locate(ImportKind::Branches, &sheet).unwrap();
        assert_eq!(header.row_index, 2);
        assert_eq!(header.positions[&Column::Area], 1);
    }

    #[test]
    fn test_missing_required_column() {
        let sheet = rows(&[&["الفئة", "الرقم التسلسلي"]]);
        assert!(matches!(
            HeaderMap::locate(ImportKind::Assets, &sheet),
            Err(DeskError::Import(_))
        ));
    }

    #[test]
    fn test_number_parsing() {
        assert_eq!(parse_count(Some("١٢")).unwrap(), Some(12));
        assert_eq!(parse_count(None).unwrap(), None);
        assert!(parse_count(Some("2.5")).is_err());
        assert!(parse_count(Some("-1")).is_err());
        assert!(parse_count(Some("1e30")).is_err());
        assert!(parse_count(Some("1000000001")).is_err());
        assert_eq!(parse_count(Some("1000000000")).unwrap(), Some(MAX_COUNT));
        assert_eq!(parse_number("١٢٫٥").unwrap(), 12.5);
    }

    #[tokio::test]
    async fn test_branch_import_creates_and_updates() {
        let repo = DeskRepository::in_memory().await.unwrap();
        let importer = Importer::new(repo.clone());

        let sheet = rows(&[
            &["اسم الفرع", "كود الفرع", "المنطقة", "القطاع", "العلامة التجارية"],
            &["فرع العليا", "R-01", "الرياض", "المطاعم", "البيك"],
            &["فرع الملز", "R-02", "الرياض", "المطاعم", "البيك"],
            &["", "", "", "", ""],
            &["", "R-03", "", "", ""],
        ]);
        let report = importer.run(ImportKind::Branches, &sheet, false).await.unwrap();
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].row, 5);
        assert_eq!(repo.list_areas(None).await.unwrap().len(), 1);
        assert_eq!(repo.list_brands().await.unwrap().len(), 1);

        let again = rows(&[
            &["Branch", "Code"],
            &["فَرع العُليا", "R-10"],
        ]);
        let report = importer.run(ImportKind::Branches, &again, false).await.unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(report.inserted, 0);

        let branches = repo.list_branches(None, None).await.unwrap();
        assert_eq!(branches.len(), 2);
        assert!(branches.iter().any(|b| b.code.as_deref() == Some("R-10")));
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let repo = DeskRepository::in_memory().await.unwrap();
        let importer = Importer::new(repo.clone());

        let sheet = rows(&[&["اسم الفرع", "القطاع"], &["فرع الحمراء", "التجزئة"]]);
        let report = importer.run(ImportKind::Branches, &sheet, true).await.unwrap();
        assert!(report.dry_run);
        assert_eq!(report.inserted, 1);
        assert!(repo.list_branches(None, None).await.unwrap().is_empty());
        assert!(repo.list_sectors().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_asset_import_matches_branch_loosely() {
        let repo = DeskRepository::in_memory().await.unwrap();
        let branch = Branch::new(NewBranch {
            name: "فرع الشاطئ".into(),
            ..Default::default()
        });
        repo.create_branch(&branch).await.unwrap();

        let sheet = rows(&[
            &["الفرع", "اسم الأصل", "الفئة"],
            &["الشاطي", "ثلاجة عرض", "تبريد"],
            &["فرع جدة", "فرن", "مطبخ"],
            &["فرع الشاطئ", "ثلاجه عرض", "تبريد"],
        ]);
        let report = Importer::new(repo.clone())
            .run(ImportKind::Assets, &sheet, false)
            .await
            .unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].row, 3);
        assert_eq!(repo.list_assets(Some(branch.id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_part_import_sets_stock() {
        let repo = DeskRepository::in_memory().await.unwrap();
        let importer = Importer::new(repo.clone());

        let first = rows(&[
            &["اسم القطعة", "رقم القطعة", "الكمية", "الحد الأدنى", "التكلفة"],
            &["سير محرك", "BLT-1", "10", "2", "45.5"],
            &["فلتر", "", "abc", "", ""],
        ]);
        let report = importer.run(ImportKind::SpareParts, &first, false).await.unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped.len(), 1);

        let second = rows(&[
            &["part", "part number", "quantity"],
            &["سير محرك كبير", "blt-1", "4"],
        ]);
        let report = importer.run(ImportKind::SpareParts, &second, false).await.unwrap();
        assert_eq!(report.updated, 1);

        let stored = repo.find_spare_part_by_number("BLT-1").await.unwrap().unwrap();
        assert_eq!(stored.quantity, 4);
        assert_eq!(stored.name, "سير محرك كبير");
        assert_eq!(stored.unit_cost, 45.5);
    }

    #[tokio::test]
    async fn test_oversized_quantity_is_skipped() {
        let repo = DeskRepository::in_memory().await.unwrap();
        let importer = Importer::new(repo.clone());

        let sheet = rows(&[&["part", "quantity"], &["bolt", "1e30"]]);
        let report = importer.run(ImportKind::SpareParts, &sheet, false).await.unwrap();

        assert_eq!(report.inserted, 0);
        assert_eq!(report.skipped.len(), 1);
        assert!(report.skipped[0].reason.starts_with("Quantity"));
        assert!(repo.list_spare_parts(false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_part_number_claims_part_matched_by_name() {
        let repo = DeskRepository::in_memory().await.unwrap();
        let importer = Importer::new(repo.clone());

        let first = rows(&[&["اسم القطعة", "الكمية"], &["فلتر هواء", "5"]]);
        importer.run(ImportKind::SpareParts, &first, false).await.unwrap();

        let second = rows(&[
            &["اسم القطعة", "رقم القطعة", "الكمية"],
            &["فلتر هواء", "FLT-1", "7"],
        ]);
        let report = importer.run(ImportKind::SpareParts, &second, false).await.unwrap();
        assert_eq!(report.inserted, 0);
        assert_eq!(report.updated, 1);

        let parts = repo.list_spare_parts(false).await.unwrap();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].part_number.as_deref(), Some("FLT-1"));
        assert_eq!(parts[0].quantity, 7);

        // A different number is a different part, even under the same name.
        let third = rows(&[
            &["اسم القطعة", "رقم القطعة", "الكمية"],
            &["فلتر هواء", "FLT-2", "1"],
        ]);
        let report = importer.run(ImportKind::SpareParts, &third, false).await.unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(repo.list_spare_parts(false).await.unwrap().len(), 2);
    }
}
