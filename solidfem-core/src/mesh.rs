//! Mesh data structure for solid models.
//!
//! Stores nodal coordinates and element connectivity. All elements of a mesh
//! share one arity, which selects the [`ElementType`].

use crate::element::ElementType;
use crate::error::{Error, Result};
use crate::types::Point3;

/// Finite element mesh with uniform element arity.
#[derive(Debug, Clone)]
pub struct Mesh {
    /// Nodal coordinates.
    nodes: Vec<Point3>,
    /// Flat connectivity, `n_elements * element_type.n_nodes()` entries.
    connectivity: Vec<usize>,
    element_type: ElementType,
}

impl Mesh {
    /// Create a mesh from node coordinates and element node tuples.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] if the element arity is unsupported or not
    ///   uniform, or if there are no elements.
    /// - [`Error::Mesh`] if an element references a node that does not exist.
    pub fn new<E: AsRef<[usize]>>(nodes: Vec<Point3>, elements: &[E]) -> Result<Self> {
        let first = elements
            .first()
            .ok_or_else(|| Error::Configuration("mesh has no elements".into()))?;
        let element_type = ElementType::from_arity(first.as_ref().len())?;
        let arity = element_type.n_nodes();

        let mut connectivity = Vec::with_capacity(elements.len() * arity);
        for (elem_idx, element) in elements.iter().enumerate() {
            let element = element.as_ref();
            if element.len() != arity {
                return Err(Error::Configuration(format!(
                    "element {} has {} nodes, mesh uses {:?} with {} nodes; mixing families is unsupported",
                    elem_idx,
                    element.len(),
                    element_type,
                    arity
                )));
            }
            for &node_idx in element {
                if node_idx >= nodes.len() {
                    return Err(Error::Mesh(format!(
                        "Node index {} of element {} out of bounds (mesh has {} nodes)",
                        node_idx,
                        elem_idx,
                        nodes.len()
                    )));
                }
            }
            connectivity.extend_from_slice(element);
        }

        Ok(Self {
            nodes,
            connectivity,
            element_type,
        })
    }

    /// Element family shared by all elements.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Number of nodes in the mesh.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of elements in the mesh.
    pub fn n_elements(&self) -> usize {
        self.connectivity.len() / self.element_type.n_nodes()
    }

    /// Get nodal coordinates.
    pub fn nodes(&self) -> &[Point3] {
        &self.nodes
    }

    /// Get a specific node's coordinates.
    pub fn node(&self, idx: usize) -> Option<&Point3> {
        self.nodes.get(idx)
    }

    /// Node indices of one element.
    pub fn element(&self, idx: usize) -> Option<&[usize]> {
        let n = self.element_type.n_nodes();
        self.connectivity.get(idx * n..(idx + 1) * n)
    }

    /// Iterate over element connectivities.
    pub fn elements(&self) -> std::slice::ChunksExact<'_, usize> {
        self.connectivity.chunks_exact(self.element_type.n_nodes())
    }

    /// Get coordinates for an element's nodes.
    pub fn element_coords(&self, elem_idx: usize) -> Option<Vec<Point3>> {
        let elem = self.element(elem_idx)?;
        Some(elem.iter().map(|&i| self.nodes[i]).collect())
    }

    /// Compute mesh bounding box.
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = self.nodes.first()?;
        let mut min = *first;
        let mut max = *first;

        for node in &self.nodes[1..] {
            min = min.inf(node);
            max = max.sup(node);
        }

        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tet_nodes() -> Vec<Point3> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
        ]
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = Mesh::new(tet_nodes(), &[[0usize, 1, 2, 3]]).unwrap();
        assert_eq!(mesh.n_nodes(), 4);
        assert_eq!(mesh.n_elements(), 1);
        assert_eq!(mesh.element_type(), ElementType::Tet4);
        assert_eq!(mesh.element(0), Some(&[0, 1, 2, 3][..]));
        assert_eq!(mesh.element(1), None);
        assert_eq!(mesh.elements().count(), 1);
    }

    #[test]
    fn test_unsupported_arity() {
        let result = Mesh::new(tet_nodes(), &[[0usize, 1, 2]]);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_mixed_arity_rejected() {
        let elements: Vec<Vec<usize>> = vec![vec![0, 1, 2, 3], vec![0, 1, 2, 3, 0, 1, 2, 3]];
        let result = Mesh::new(tet_nodes(), &elements);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn test_invalid_node_index() {
        let result = Mesh::new(tet_nodes(), &[[0usize, 1, 2, 4]]);
        assert!(matches!(result, Err(Error::Mesh(_))));
    }

    #[test]
    fn test_empty_mesh_rejected() {
        let elements: Vec<[usize; 4]> = vec![];
        assert!(Mesh::new(tet_nodes(), &elements).is_err());
    }

    #[test]
    fn test_element_coords() {
        let mesh = Mesh::new(tet_nodes(), &[[3usize, 2, 1, 0]]).unwrap();
        let coords = mesh.element_coords(0).unwrap();
        assert_eq!(coords[0], Point3::new(0.0, 0.0, 1.0));
        assert_eq!(coords[3], Point3::zeros());
    }

    #[test]
    fn test_bounds() {
        let nodes = vec![
            Point3::new(-1.0, -2.0, -3.0),
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.5),
        ];
        let mesh = Mesh::new(nodes, &[[0usize, 1, 2, 3]]).unwrap();
        let (min, max) = mesh.bounds().unwrap();
        assert_eq!(min, Point3::new(-1.0, -2.0, -3.0));
        assert_eq!(max, Point3::new(1.0, 2.0, 3.0));
    }
}
