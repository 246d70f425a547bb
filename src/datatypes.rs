use nalgebra::{Dyn, OMatrix, U2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A mesh vertex. `z` is stored with the sign flipped relative to the file.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Node {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// A triangular cell. The id is the raw token from the file, not renumbered.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Element {
    pub id: f64,
    pub vertices: [usize; 3],
}

/// Boundary category selected by an IBTYPE code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryKind {
    Land,
    Inner,
    Inflow,
    Outflow,
    Weir,
    Culvert,
}

impl BoundaryKind {
    pub const ALL: [BoundaryKind; 6] = [
        BoundaryKind::Land,
        BoundaryKind::Inner,
        BoundaryKind::Inflow,
        BoundaryKind::Outflow,
        BoundaryKind::Weir,
        BoundaryKind::Culvert,
    ];

    /// Resolves the category of an IBTYPE code
    ///
    /// # Arguments
    /// * `ibtype` - The type code read from a boundary group header
    ///
    /// # Returns
    /// The matching category, or None if the code is not recognized
    pub fn from_ibtype(ibtype: i32) -> Option<BoundaryKind> {
        match ibtype {
            0 | 10 | 20 => Some(BoundaryKind::Land),
            1 | 11 | 21 => Some(BoundaryKind::Inner),
            2 | 12 | 22 | 102 | 122 => Some(BoundaryKind::Inflow),
            3 | 13 | 23 => Some(BoundaryKind::Outflow),
            4 | 24 => Some(BoundaryKind::Weir),
            5 | 25 => Some(BoundaryKind::Culvert),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            BoundaryKind::Land => "land",
            BoundaryKind::Inner => "inner",
            BoundaryKind::Inflow => "inflow",
            BoundaryKind::Outflow => "outflow",
            BoundaryKind::Weir => "weir",
            BoundaryKind::Culvert => "culvert",
        }
    }
}

/// An open-ocean boundary: an ordered run of node indexes
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OceanBoundary {
    pub indexes: Vec<usize>,
}

/// Land, inner and inflow segments carry nothing but node indexes
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FlowlessBoundary {
    pub ibtype: i32,
    pub indexes: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutflowNode {
    pub index: usize,
    pub barrier_height: f64,
    pub supercritical_flow_coefficient: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OutflowBoundary {
    pub ibtype: i32,
    pub nodes: Vec<OutflowNode>,
}

/// One front/back node pair across a weir barrier
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeirPair {
    pub front_face_index: usize,
    pub back_face_index: usize,
    pub barrier_height: f64,
    pub subcritical_flow_coefficient: f64,
    pub supercritical_flow_coefficient: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WeirBoundary {
    pub ibtype: i32,
    pub pairs: Vec<WeirPair>,
}

/// One front/back node pair connected by a culvert pipe
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CulvertPair {
    pub front_face_index: usize,
    pub back_face_index: usize,
    pub barrier_height: f64,
    pub subcritical_flow_coefficient: f64,
    pub supercritical_flow_coefficient: f64,
    pub friction_factor: f64,
    pub pipe_diameter: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CulvertBoundary {
    pub ibtype: i32,
    pub pairs: Vec<CulvertPair>,
}

/// A fully parsed boundary segment, tagged by category
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoundarySegment {
    Land(FlowlessBoundary),
    Inner(FlowlessBoundary),
    Inflow(FlowlessBoundary),
    Outflow(OutflowBoundary),
    Weir(WeirBoundary),
    Culvert(CulvertBoundary),
}

/// Boundary segments grouped by category, each in file order
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundaryGroups {
    pub ocean: Vec<OceanBoundary>,
    pub land: Vec<FlowlessBoundary>,
    pub inner: Vec<FlowlessBoundary>,
    pub inflow: Vec<FlowlessBoundary>,
    pub outflow: Vec<OutflowBoundary>,
    pub weir: Vec<WeirBoundary>,
    pub culvert: Vec<CulvertBoundary>,
}

impl BoundaryGroups {
    /// Files a finished segment under its category
    pub fn push(&mut self, segment: BoundarySegment) {
        match segment {
            BoundarySegment::Land(s) => self.land.push(s),
            BoundarySegment::Inner(s) => self.inner.push(s),
            BoundarySegment::Inflow(s) => self.inflow.push(s),
            BoundarySegment::Outflow(s) => self.outflow.push(s),
            BoundarySegment::Weir(s) => self.weir.push(s),
            BoundarySegment::Culvert(s) => self.culvert.push(s),
        }
    }

    /// Total number of segments across every category, ocean included
    pub fn len(&self) -> usize {
        self.ocean.len()
            + self.land.len()
            + self.inner.len()
            + self.inflow.len()
            + self.outflow.len()
            + self.weir.len()
            + self.culvert.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of segments filed under a non-ocean category
    pub fn count(&self, kind: BoundaryKind) -> usize {
        match kind {
            BoundaryKind::Land => self.land.len(),
            BoundaryKind::Inner => self.inner.len(),
            BoundaryKind::Inflow => self.inflow.len(),
            BoundaryKind::Outflow => self.outflow.len(),
            BoundaryKind::Weir => self.weir.len(),
            BoundaryKind::Culvert => self.culvert.len(),
        }
    }
}

/// A parsed fort.14 mesh
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mesh {
    pub description: String,
    pub nodes: Vec<Node>,
    pub elements: Vec<Element>,
    pub boundaries: BoundaryGroups,
}

impl Mesh {
    pub fn x(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.x).collect()
    }

    pub fn y(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.y).collect()
    }

    pub fn z(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.z).collect()
    }

    /// Planar coordinates as an NP x 2 matrix, one row per node
    pub fn xy(&self) -> OMatrix<f64, Dyn, U2> {
        OMatrix::<f64, Dyn, U2>::from_fn(self.nodes.len(), |row, col| {
            let node = &self.nodes[row];
            if col == 0 {
                node.x
            } else {
                node.y
            }
        })
    }

    /// Element connectivity as plain vertex triples
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        self.elements.iter().map(|e| e.vertices).collect()
    }

    /// Calculates the signed planar area of an element
    ///
    /// # Arguments
    /// * `element` - The Element to target. Its vertices must index into this mesh
    ///
    /// # Returns
    /// The area of the element, positive when its vertices run counter-clockwise
    ///
    /// # Panics
    /// If a vertex of `element` is not a valid index into this mesh's nodes
    pub fn element_area(&self, element: &Element) -> f64 {
        let v0 = &self.nodes[element.vertices[0]];
        let v1 = &self.nodes[element.vertices[1]];
        let v2 = &self.nodes[element.vertices[2]];

        0.5 * (v0.x * (v1.y - v2.y) + v1.x * (v2.y - v0.y) + v2.x * (v0.y - v1.y))
    }
}
