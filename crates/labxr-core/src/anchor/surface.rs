//! Tiling of flat areas into interchangeable anchor slots

use labxr_spatial::{NodeId, Point3D, Scene, Transform};

use super::AnchorId;
use crate::error::{LabError, Result};

/// A rectangle in the local XZ plane of its node, split into square tiles
#[derive(Debug, Clone)]
pub struct AnchorSurface {
    name: String,
    node: NodeId,
    group: NodeId,
    min: (f32, f32),
    max: (f32, f32),
    height: f32,
    tile_size: f32,
    point_nodes: Vec<(String, NodeId)>,
    pub(crate) anchors: Vec<AnchorId>,
}

const POINTS_GROUP: &str = "points";

fn zero_pad(index: usize, width: usize) -> String {
    format!("{:0width$}", index, width = width)
}

impl AnchorSurface {
    /// Generate one child node per tile center under a `points` group.
    ///
    /// The rectangle comes from the node's local extent; its height is the
    /// extent's minimum Y.
    pub fn build(scene: &mut Scene, node: NodeId, tile_size: f32) -> Result<Self> {
        let name = scene
            .name(node)
            .ok_or(LabError::UnknownNode(node))?
            .to_string();
        if !(tile_size > 0.0) {
            return Err(LabError::InvalidTileSize(tile_size));
        }
        let extent = scene
            .extent(node)
            .ok_or_else(|| LabError::MissingGeometry(name.clone()))?;
        let (lo, hi) = extent.extents();

        // Copied subtrees carry the tiling of their source
        let stale: Vec<NodeId> = scene
            .children(node)
            .iter()
            .copied()
            .filter(|c| scene.name(*c) == Some(POINTS_GROUP))
            .collect();
        for old in stale {
            scene.remove_subtree(old);
        }

        let group = scene.spawn(node, POINTS_GROUP, Transform::identity());
        let mut surface = Self {
            name,
            node,
            group,
            min: (lo.x, lo.z),
            max: (hi.x, hi.z),
            height: lo.y,
            tile_size,
            point_nodes: Vec::new(),
            anchors: Vec::new(),
        };

        let mut index = 1;
        for x in surface.axis_centers(surface.min.0, surface.max.0) {
            for z in surface.axis_centers(surface.min.1, surface.max.1) {
                let point_name = format!("{}-{}", surface.name, zero_pad(index, 2));
                let local = Transform::from_position(Point3D::new(x, surface.height, z));
                let point = scene.spawn(group, point_name.clone(), local);
                surface.point_nodes.push((point_name, point));
                index += 1;
            }
        }

        tracing::debug!(
            "Anchor surface {} tiled into {} points",
            surface.name,
            surface.point_nodes.len()
        );
        Ok(surface)
    }

    fn axis_centers(&self, min: f32, max: f32) -> Vec<f32> {
        let step = self.tile_size;
        (0..)
            .map(|i| min + step * (i as f32 + 0.5))
            .take_while(|c| *c < max)
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Parent of the generated point nodes
    pub fn group(&self) -> NodeId {
        self.group
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn width(&self) -> f32 {
        self.max.0 - self.min.0
    }

    pub fn depth(&self) -> f32 {
        self.max.1 - self.min.1
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    /// Generated point nodes with their names, in tiling order
    pub fn point_nodes(&self) -> &[(String, NodeId)] {
        &self.point_nodes
    }

    /// Registered anchors of this surface, in tiling order
    pub fn anchors(&self) -> &[AnchorId] {
        &self.anchors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labxr_spatial::Bounds;

    fn surface_node(scene: &mut Scene, name: &str, lo: Point3D, hi: Point3D) -> NodeId {
        scene.spawn_with_extent(scene.root(), name, Transform::identity(), Bounds::aabb(lo, hi))
    }

    #[test]
    fn test_square_splits_into_quadrants() {
        let mut scene = Scene::new();
        let node = surface_node(
            &mut scene,
            "mainArea",
            Point3D::new(0.0, 0.9, 0.0),
            Point3D::new(0.3, 0.9, 0.3),
        );
        let surface = AnchorSurface::build(&mut scene, node, 0.15).unwrap();

        let points = surface.point_nodes();
        assert_eq!(points.len(), 4);
        let expected = [(0.075, 0.075), (0.075, 0.225), (0.225, 0.075), (0.225, 0.225)];
        for ((name, id), (x, z)) in points.iter().zip(expected) {
            assert!(scene.world_position(*id).approx_eq(&Point3D::new(x, 0.9, z)), "{}", name);
        }
        assert_eq!(points[0].0, "mainArea-01");
        assert_eq!(points[3].0, "mainArea-04");
        assert_eq!(scene.parent(points[0].1), Some(surface.group()));
    }

    #[test]
    fn test_rectangle_tiles_x_outer_z_inner() {
        let mut scene = Scene::new();
        let node = surface_node(
            &mut scene,
            "shelf",
            Point3D::new(-0.3, 0.0, 0.0),
            Point3D::new(0.3, 0.0, 0.15),
        );
        let surface = AnchorSurface::build(&mut scene, node, 0.15).unwrap();
        assert_eq!(surface.point_nodes().len(), 4);
        let xs: Vec<f32> = surface
            .point_nodes()
            .iter()
            .map(|(_, id)| scene.local_transform(*id).position.x)
            .collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_missing_extent_is_an_error() {
        let mut scene = Scene::new();
        let node = scene.spawn(scene.root(), "mainArea", Transform::identity());
        assert!(matches!(
            AnchorSurface::build(&mut scene, node, 0.15),
            Err(LabError::MissingGeometry(name)) if name == "mainArea"
        ));
    }

    #[test]
    fn test_non_positive_tile_rejected() {
        let mut scene = Scene::new();
        let node = surface_node(&mut scene, "mainArea", Point3D::ORIGIN, Point3D::new(1.0, 0.0, 1.0));
        assert!(matches!(
            AnchorSurface::build(&mut scene, node, 0.0),
            Err(LabError::InvalidTileSize(_))
        ));
    }

    #[test]
    fn test_rebuild_replaces_previous_tiling() {
        let mut scene = Scene::new();
        let node = surface_node(&mut scene, "mainArea", Point3D::ORIGIN, Point3D::new(0.3, 0.0, 0.3));
        AnchorSurface::build(&mut scene, node, 0.15).unwrap();
        let surface = AnchorSurface::build(&mut scene, node, 0.15).unwrap();

        assert_eq!(scene.children(node), &[surface.group()]);
        assert_eq!(scene.children(surface.group()).len(), 4);
    }

    #[test]
    fn test_many_points_use_two_digit_padding() {
        assert_eq!(zero_pad(3, 2), "03");
        assert_eq!(zero_pad(12, 2), "12");
        assert_eq!(zero_pad(120, 2), "120");
    }
}
