//! Uniform-grid spatial hash
//!
//! Space is cut into cubic cells of a fixed size; every body is filed under
//! each cell its AABB touches. Insert/remove cost scales with the number of
//! cells a box spans, and a query only visits the cells under the query
//! region, so neither depends on the total number of bodies.
//!
//! Boxes spanning more than [`MAX_CELLS_PER_ENTRY`] cells are kept on a side
//! list instead of being filed cell by cell, and a query whose region spans
//! more cells than there are bodies scans the entries directly. Either way
//! the exact AABB filter decides the result.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::foundation::math::Vec3;
use crate::physics::{BodyId, CollisionError};
use crate::spatial::{SpatialQuery, AABB};

/// Integer cell coordinate
pub type CellKey = (i32, i32, i32);

/// Largest number of cells a single body is filed under
pub const MAX_CELLS_PER_ENTRY: u64 = 4096;

/// What the hash remembers about one registered body
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    /// Bounds at registration time
    pub bounds: AABB,
    /// Radius used by radius queries
    pub radius: f32,
    cells: Vec<CellKey>,
}

impl SpatialEntry {
    /// Cells this body is currently filed under
    pub fn cells(&self) -> &[CellKey] {
        &self.cells
    }
}

/// Spatial hash broad phase using a uniform grid
pub struct SpatialHash {
    cell_size: f32,
    /// Inverse cell size (cached for performance)
    inv_cell_size: f32,
    cells: HashMap<CellKey, Vec<BodyId>>,
    /// id -> bounds and the cells it occupies, so removal never scans the grid
    entries: HashMap<BodyId, SpatialEntry>,
    /// Bodies too large to file per cell; checked by every query
    oversized: BTreeSet<BodyId>,
}

impl SpatialHash {
    /// Create a new spatial hash with the given cell size
    pub fn new(cell_size: f32) -> Result<Self, CollisionError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(CollisionError::Configuration(format!(
                "spatial hash cell size must be positive and finite, got {cell_size}"
            )));
        }
        Ok(Self {
            cell_size,
            inv_cell_size: 1.0 / cell_size,
            cells: HashMap::new(),
            entries: HashMap::new(),
            oversized: BTreeSet::new(),
        })
    }

    /// Edge length of one cell
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Registration data for a body, if present
    pub fn entry(&self, id: BodyId) -> Option<&SpatialEntry> {
        self.entries.get(&id)
    }

    /// Hash a position to a cell key
    pub fn cell_key(&self, point: Vec3) -> CellKey {
        // `as` saturates, so far-off coordinates land in the outermost cells
        #[allow(clippy::cast_possible_truncation)]
        let key = |v: f32| (v * self.inv_cell_size).floor() as i32;
        (key(point.x), key(point.y), key(point.z))
    }

    /// Number of bodies kept off the grid because of their size
    pub fn oversized_count(&self) -> usize {
        self.oversized.len()
    }

    /// How many cells `bounds` covers, saturating instead of overflowing
    pub fn span_len(&self, bounds: &AABB) -> u64 {
        let (x0, y0, z0) = self.cell_key(bounds.min);
        let (x1, y1, z1) = self.cell_key(bounds.max);
        let axis = |lo: i32, hi: i32| u64::try_from(i64::from(hi) - i64::from(lo) + 1).unwrap_or(0);
        axis(x0, x1).saturating_mul(axis(y0, y1)).saturating_mul(axis(z0, z1))
    }

    /// Every cell key covered by `bounds`, min and max corners inclusive
    fn cells_spanned(&self, bounds: &AABB) -> impl Iterator<Item = CellKey> {
        let (x0, y0, z0) = self.cell_key(bounds.min);
        let (x1, y1, z1) = self.cell_key(bounds.max);
        (x0..=x1).flat_map(move |x| {
            (y0..=y1).flat_map(move |y| (z0..=z1).map(move |z| (x, y, z)))
        })
    }
}

impl SpatialQuery for SpatialHash {
    fn update(&mut self, id: BodyId, bounds: AABB, radius: f32) {
        self.remove(id);

        if self.span_len(&bounds) > MAX_CELLS_PER_ENTRY {
            self.oversized.insert(id);
            self.entries.insert(id, SpatialEntry { bounds, radius, cells: Vec::new() });
            return;
        }

        let cells: Vec<CellKey> = self.cells_spanned(&bounds).collect();
        for key in &cells {
            self.cells.entry(*key).or_default().push(id);
        }
        self.entries.insert(id, SpatialEntry { bounds, radius, cells });
    }

    fn remove(&mut self, id: BodyId) -> bool {
        let Some(entry) = self.entries.remove(&id) else {
            return false;
        };
        self.oversized.remove(&id);

        for key in entry.cells {
            if let Some(bucket) = self.cells.get_mut(&key) {
                if let Some(index) = bucket.iter().position(|&other| other == id) {
                    bucket.swap_remove(index);
                }
                if bucket.is_empty() {
                    self.cells.remove(&key);
                }
            }
        }
        true
    }

    fn query_aabb(&self, bounds: &AABB) -> Vec<BodyId> {
        let overlaps = |id: &BodyId| self.entries.get(id).is_some_and(|e| e.bounds.intersects(bounds));

        // Walking the grid would cost more than looking at every body
        if self.span_len(bounds) > self.entries.len() as u64 {
            let mut found: Vec<BodyId> = self.entries.keys().copied().filter(|id| overlaps(id)).collect();
            // Map order is random per process; keep candidate order stable
            found.sort_unstable();
            return found;
        }

        let mut seen = HashSet::new();
        let mut found: Vec<BodyId> = self.oversized.iter().copied().filter(|id| overlaps(id)).collect();
        seen.extend(found.iter().copied());

        for key in self.cells_spanned(bounds) {
            let Some(bucket) = self.cells.get(&key) else {
                continue;
            };
            for &id in bucket {
                // A body spanning several cells shows up once per cell
                if !seen.insert(id) {
                    continue;
                }
                if overlaps(&id) {
                    found.push(id);
                }
            }
        }
        found
    }

    fn query_radius(&self, center: Vec3, radius: f32) -> Vec<BodyId> {
        let region = AABB::from_center_extents(center, Vec3::repeat(radius));
        self.query_aabb(&region)
            .into_iter()
            .filter(|id| {
                self.entries.get(id).is_some_and(|entry| {
                    (entry.bounds.center() - center).magnitude() <= radius + entry.radius
                })
            })
            .collect()
    }

    fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
        self.oversized.clear();
    }

    fn entity_count(&self) -> usize {
        self.entries.len()
    }
}
