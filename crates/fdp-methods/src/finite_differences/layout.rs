//! Grid layout: node enumeration and index flattening.

use fdp_core::{ensure, errors::Result, Size};

/// Describes how a (possibly multi-dimensional) grid is flattened into a
/// linear array.
///
/// Axis 0 varies fastest: for extents `[n0, n1]` the node with coordinates
/// `(i, j)` lives at linear offset `i + j * n0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdmLinearOpLayout {
    dim: Vec<Size>,
    spacing: Vec<Size>,
    size: Size,
}

/// A single grid node: its linear offset plus its per-axis coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdmLinearOpNode {
    /// Linear offset into the flattened solution array.
    pub index: Size,
    /// Coordinate along each axis.
    pub coordinates: Vec<Size>,
}

impl FdmLinearOpLayout {
    /// Create a layout from per-axis extents.
    ///
    /// # Errors
    /// Fails if `dim` is empty or any extent is zero.
    pub fn new(dim: Vec<Size>) -> Result<Self> {
        ensure!(!dim.is_empty(), "layout needs at least one axis");
        for (axis, &n) in dim.iter().enumerate() {
            ensure!(n > 0, "axis {axis} has zero extent");
        }
        let mut spacing = Vec::with_capacity(dim.len());
        let mut size = 1;
        for &n in &dim {
            spacing.push(size);
            size *= n;
        }
        Ok(Self { dim, spacing, size })
    }

    /// Total number of grid nodes.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Extent along the given axis.
    pub fn dim(&self, axis: usize) -> Size {
        self.dim[axis]
    }

    /// Per-axis extents.
    pub fn dims(&self) -> &[Size] {
        &self.dim
    }

    /// Number of axes.
    pub fn dimensions(&self) -> usize {
        self.dim.len()
    }

    /// Flatten per-axis coordinates into a linear offset.
    pub fn index(&self, coordinates: &[Size]) -> Size {
        coordinates
            .iter()
            .zip(self.spacing.iter())
            .map(|(&c, &s)| c * s)
            .sum()
    }

    /// Recover per-axis coordinates from a linear offset.
    pub fn coordinates(&self, index: Size) -> Vec<Size> {
        self.dim
            .iter()
            .zip(self.spacing.iter())
            .map(|(&n, &s)| (index / s) % n)
            .collect()
    }

    /// Iterate over all grid nodes in linear order.
    ///
    /// The iterator can be restarted by calling `nodes()` again.
    pub fn nodes(&self) -> FdmNodeIter<'_> {
        FdmNodeIter {
            layout: self,
            next: 0,
        }
    }
}

/// Iterator over the nodes of a layout, produced by
/// [`FdmLinearOpLayout::nodes`].
#[derive(Debug)]
pub struct FdmNodeIter<'a> {
    layout: &'a FdmLinearOpLayout,
    next: Size,
}

impl Iterator for FdmNodeIter<'_> {
    type Item = FdmLinearOpNode;

    fn next(&mut self) -> Option<FdmLinearOpNode> {
        if self.next >= self.layout.size {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(FdmLinearOpNode {
            index,
            coordinates: self.layout.coordinates(index),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.layout.size - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for FdmNodeIter<'_> {}
