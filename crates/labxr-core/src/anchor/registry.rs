use std::collections::BTreeMap;

use labxr_config::AnchorsConfig;
use labxr_spatial::{NodeId, Scene};

use super::{AnchorId, AnchorKind, AnchorPoint, AnchorSurface};
use crate::object::{ObjectId, ObjectKind};

/// Catalog of every anchor in the workspace.
///
/// Iteration follows registration order, which is also the tie-break order
/// of nearest-anchor searches.
#[derive(Debug)]
pub struct AnchorRegistry {
    anchors: BTreeMap<AnchorId, AnchorPoint>,
    surfaces: Vec<AnchorSurface>,
    next_id: u64,
    config: AnchorsConfig,
}

impl Default for AnchorRegistry {
    fn default() -> Self {
        Self::new(AnchorsConfig::default())
    }
}

impl AnchorRegistry {
    pub fn new(config: AnchorsConfig) -> Self {
        Self {
            anchors: BTreeMap::new(),
            surfaces: Vec::new(),
            next_id: 1,
            config,
        }
    }

    pub fn config(&self) -> &AnchorsConfig {
        &self.config
    }

    /// Snap distance for anchors of `kind`
    pub fn min_distance_for(&self, kind: AnchorKind) -> f32 {
        self.config
            .min_distance_for(kind.name(), kind.rule().min_distance)
    }

    /// Add an anchor to the catalog and return its id
    pub fn register(&mut self, mut point: AnchorPoint) -> AnchorId {
        if self.anchors.values().any(|a| a.name() == point.name()) {
            tracing::warn!("Anchor name {} is already registered", point.name());
        }
        let id = AnchorId(self.next_id);
        self.next_id += 1;
        point.id = id;
        self.anchors.insert(id, point);
        id
    }

    /// Build an anchor for a node following the naming rules
    pub fn register_node(&mut self, scene: &mut Scene, node: NodeId, kind: AnchorKind) -> AnchorId {
        let name = scene.name(node).unwrap_or_default().to_string();
        let point = AnchorPoint::with_kind(name, node, kind, self.min_distance_for(kind))
            .with_marker(self.config.show_markers);
        scene.set_visible(node, self.config.show_markers);
        self.register(point)
    }

    pub fn get(&self, id: AnchorId) -> Option<&AnchorPoint> {
        self.anchors.get(&id)
    }

    pub fn get_mut(&mut self, id: AnchorId) -> Option<&mut AnchorPoint> {
        self.anchors.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnchorPoint> {
        self.anchors.values()
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    pub fn surfaces(&self) -> &[AnchorSurface] {
        &self.surfaces
    }

    pub fn by_name(&self, name: &str) -> Option<&AnchorPoint> {
        self.anchors.values().find(|a| a.name() == name)
    }

    /// Walk a subtree and create anchors for every node following the naming rules.
    ///
    /// Matched nodes are not searched further. Surfaces that cannot be tiled
    /// are logged and skipped.
    pub fn discover(&mut self, scene: &mut Scene, root: NodeId) -> Vec<AnchorId> {
        let matches = scene.find_all_by(root, |n| AnchorKind::classify(&n.name).is_some(), false);
        let mut created = Vec::new();

        for node in matches {
            let name = scene.name(node).unwrap_or_default().to_string();
            let Some(kind) = AnchorKind::classify(&name) else {
                continue;
            };

            if kind.is_area() {
                match AnchorSurface::build(scene, node, self.config.tile_size) {
                    Ok(mut surface) => {
                        scene.set_visible(surface.group(), true);
                        for (_, point) in surface.point_nodes().to_vec() {
                            let id = self.register_node(scene, point, kind);
                            surface.anchors.push(id);
                            created.push(id);
                        }
                        self.surfaces.push(surface);
                    }
                    Err(e) => tracing::error!("Skipping anchor surface {}: {}", name, e),
                }
            } else {
                created.push(self.register_node(scene, node, kind));
            }
        }

        tracing::info!("Discovered {} anchors under {}", created.len(), root);
        created
    }

    /// Enabled, unoccupied anchors accepting `kind`, in registry order
    pub fn find_eligible(&self, kind: ObjectKind) -> impl Iterator<Item = &AnchorPoint> {
        self.anchors.values().filter(move |a| a.accepts(kind))
    }

    /// Anchors whose name starts with `prefix`
    pub fn find_group(&self, prefix: &str) -> Vec<AnchorId> {
        self.anchors
            .values()
            .filter(|a| a.name().starts_with(prefix))
            .map(AnchorPoint::id)
            .collect()
    }

    pub fn enable_group(&mut self, scene: &mut Scene, prefix: &str) -> Vec<AnchorId> {
        let ids = self.find_group(prefix);
        if ids.is_empty() {
            tracing::warn!("No anchor '{}' was found", prefix);
        }
        for id in &ids {
            if let Some(anchor) = self.anchors.get_mut(id) {
                anchor.enable(scene);
            }
        }
        ids
    }

    /// Occupants stay on disabled anchors
    pub fn disable_group(&mut self, scene: &mut Scene, prefix: &str) -> Vec<AnchorId> {
        let ids = self.find_group(prefix);
        if ids.is_empty() {
            tracing::warn!("No anchor '{}' was found", prefix);
        }
        for id in &ids {
            if let Some(anchor) = self.anchors.get_mut(id) {
                anchor.disable(scene);
            }
        }
        ids
    }

    pub fn disable_all(&mut self, scene: &mut Scene) {
        for anchor in self.anchors.values_mut() {
            anchor.disable(scene);
        }
    }

    /// Drop every anchor owned by a node of the subtree, returning the ids and their occupants
    pub fn remove_subtree(&mut self, scene: &Scene, root: NodeId) -> Vec<(AnchorId, Option<ObjectId>)> {
        let nodes = scene.descendants(root);
        let doomed: Vec<AnchorId> = self
            .anchors
            .values()
            .filter(|a| nodes.contains(&a.node()))
            .map(AnchorPoint::id)
            .collect();

        self.surfaces.retain(|s| !nodes.contains(&s.node()));
        doomed
            .into_iter()
            .filter_map(|id| self.anchors.remove(&id).map(|a| (id, a.occupant())))
            .collect()
    }

    /// Forget every anchor and surface; ids keep increasing
    pub fn reset(&mut self) {
        self.anchors.clear();
        self.surfaces.clear();
    }
}
