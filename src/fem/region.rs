use super::{FieldState, VolumeMapping};
use crate::base::Config;
use crate::Error;
use gemlab::integ;
use gemlab::mesh::{CellId, Mesh};
use gemlab::shapes::Scratchpad;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_REGION: AtomicU64 = AtomicU64::new(0);

/// Identifies a geometry mapping: (region, basis, quadrature rule)
///
/// Each [Region] instance has its own id, thus two regions with the same name built
/// from different cells never share cached data.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingKey {
    /// Name of the integration region
    pub region: String,

    /// Unique id of the region instance
    pub region_id: u64,

    /// Name of the basis (geometry kind of the elements)
    pub basis: String,

    /// Number of quadrature points per element
    pub n_qp: usize,
}

/// Holds an integration region: its geometry mapping and element connectivity
pub struct Region {
    /// Mapping key
    key: MappingKey,

    /// Geometry mapping (None if the region has no elements)
    mapping: Option<Arc<VolumeMapping>>,

    /// Point (node) indices of each element
    connectivity: Vec<Vec<usize>>,

    /// Evaluates the element loops in parallel
    parallel: bool,
}

impl Region {
    /// Allocates a new instance by evaluating the shape functions of mesh cells
    ///
    /// All cells must have the same kind and be solid (geometry ndim equal to space ndim).
    ///
    /// # Input
    ///
    /// * `name` -- name of the region
    /// * `mesh` -- the mesh
    /// * `cell_ids` -- the cells in this region (may be empty)
    /// * `config` -- the configuration (quadrature order, parallel loops)
    pub fn new(name: &str, mesh: &Mesh, cell_ids: &[CellId], config: &Config) -> Result<Self, Error> {
        if cell_ids.is_empty() {
            return Ok(Region {
                key: MappingKey {
                    region: name.to_string(),
                    region_id: NEXT_REGION.fetch_add(1, Ordering::Relaxed),
                    basis: String::new(),
                    n_qp: 0,
                },
                mapping: None,
                connectivity: Vec::new(),
                parallel: config.parallel,
            });
        }
        let ndim = mesh.ndim;
        let first = mesh.cells.get(cell_ids[0]).ok_or_else(|| {
            Error::MissingMappingData(format!("cell {} is not in the mesh", cell_ids[0]))
        })?;
        let kind = first.kind;
        if kind.ndim() != ndim {
            return Err(Error::ShapeMismatch(format!(
                "cells of kind {:?} cannot define a volume mapping in {}D",
                kind, ndim
            )));
        }
        let n_node = kind.nnode();
        let ips = match config.ngauss {
            Some(n) => integ::points(kind.class(), n)?,
            None => integ::default_points(kind),
        };
        let n_qp = ips.len();
        let mut pad = Scratchpad::new(ndim, kind)?;
        let mut gradients = Vec::with_capacity(cell_ids.len() * n_qp * n_node * ndim);
        let mut dv = Vec::with_capacity(cell_ids.len() * n_qp);
        let mut connectivity = Vec::with_capacity(cell_ids.len());
        for &cell_id in cell_ids {
            let cell = mesh
                .cells
                .get(cell_id)
                .ok_or_else(|| Error::MissingMappingData(format!("cell {} is not in the mesh", cell_id)))?;
            if cell.kind != kind {
                return Err(Error::ShapeMismatch(format!(
                    "all cells in region {} must be {:?}",
                    name, kind
                )));
            }
            if let Some(point) = cell.points.iter().find(|&&p| p >= mesh.points.len()) {
                return Err(Error::MissingMappingData(format!(
                    "point {} of cell {} is not in the mesh",
                    point, cell_id
                )));
            }
            mesh.set_pad(&mut pad, &cell.points);
            for iota in ips {
                let det_jac = pad.calc_gradient(iota)?;
                for m in 0..n_node {
                    for j in 0..ndim {
                        gradients.push(pad.gradient.get(m, j));
                    }
                }
                dv.push(det_jac * iota[3]);
            }
            connectivity.push(cell.points.clone());
        }
        let mapping = VolumeMapping::new(ndim, n_qp, n_node, gradients, dv)?;
        log::debug!(
            "region {}: {} elements of kind {:?} with {} quadrature points",
            name,
            cell_ids.len(),
            kind,
            n_qp
        );
        Ok(Region {
            key: MappingKey {
                region: name.to_string(),
                region_id: NEXT_REGION.fetch_add(1, Ordering::Relaxed),
                basis: format!("{:?}", kind),
                n_qp,
            },
            mapping: Some(Arc::new(mapping)),
            connectivity,
            parallel: config.parallel,
        })
    }

    /// Allocates a new instance from a mapping computed elsewhere
    pub fn from_mapping(
        name: &str,
        basis: &str,
        mapping: VolumeMapping,
        connectivity: Vec<Vec<usize>>,
        parallel: bool,
    ) -> Result<Self, Error> {
        if connectivity.len() != mapping.n_el() {
            return Err(Error::ShapeMismatch(format!(
                "connectivity has {} elements but the mapping has {}",
                connectivity.len(),
                mapping.n_el()
            )));
        }
        if let Some(conn) = connectivity.iter().find(|c| c.len() != mapping.n_node()) {
            return Err(Error::ShapeMismatch(format!(
                "element connectivity {:?} must have {} nodes",
                conn,
                mapping.n_node()
            )));
        }
        Ok(Region {
            key: MappingKey {
                region: name.to_string(),
                region_id: NEXT_REGION.fetch_add(1, Ordering::Relaxed),
                basis: basis.to_string(),
                n_qp: mapping.n_qp(),
            },
            mapping: Some(Arc::new(mapping)),
            connectivity,
            parallel,
        })
    }

    /// Returns the name of the region
    pub fn name(&self) -> &str {
        &self.key.region
    }

    /// Returns the mapping key
    pub fn key(&self) -> &MappingKey {
        &self.key
    }

    /// Returns the element connectivity
    pub fn connectivity(&self) -> &[Vec<usize>] {
        &self.connectivity
    }

    /// Returns whether the element loops run in parallel
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Returns the geometry mapping, the connectivity and the mapping key for a field
    ///
    /// # Errors
    ///
    /// * [Error::MissingMappingData] if the region has no mapping
    /// * [Error::ShapeMismatch] if the field dimension differs from the mapping dimension
    ///   or the field has fewer nodes than referenced by the connectivity
    pub fn get_mapping(&self, field: &FieldState) -> Result<(&Arc<VolumeMapping>, &[Vec<usize>], &MappingKey), Error> {
        let mapping = self.mapping.as_ref().ok_or_else(|| {
            Error::MissingMappingData(format!(
                "no geometry mapping in region {} for field {}",
                self.key.region,
                field.name()
            ))
        })?;
        if field.dim() != mapping.dim() {
            return Err(Error::ShapeMismatch(format!(
                "field {} has {} components but the mapping dimension is {}",
                field.name(),
                field.dim(),
                mapping.dim()
            )));
        }
        let n_node = field.n_node();
        if let Some(node) = self.connectivity.iter().flatten().find(|&&m| m >= n_node) {
            return Err(Error::ShapeMismatch(format!(
                "node {} is out of range for field {} with {} nodes",
                node,
                field.name(),
                n_node
            )));
        }
        Ok((mapping, &self.connectivity, &self.key))
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
