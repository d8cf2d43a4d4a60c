//! A small wet-lab bench used by the demo and listing commands

use crossterm::event::KeyCode;
use labxr_config::LabConfig;
use labxr_core::Workspace;
use labxr_spatial::{Bounds, NodeId, Point3D, Scene, Transform, Vector3D};

/// One entry of the scripted session
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Key(KeyCode),
    Frames(usize),
}

fn part(scene: &mut Scene, parent: NodeId, name: &str, at: Point3D) -> NodeId {
    scene.spawn(parent, name, Transform::from_position(at))
}

fn hit_surface(scene: &mut Scene, parent: NodeId, half: Vector3D) {
    scene.spawn_with_extent(
        parent,
        "hitSurface",
        Transform::identity(),
        Bounds::aabb_centered(Point3D::ORIGIN, half),
    );
}

/// Tube rack with two slots, a cuvette holder, a bin and a work area
pub fn scene() -> Scene {
    let mut scene = Scene::new();
    let root = scene.root();
    let bench = part(&mut scene, root, "bench", Point3D::ORIGIN);

    part(&mut scene, bench, "tubeAnchor1", Point3D::new(0.2, 1.15, 0.6));
    part(&mut scene, bench, "tubeAnchor2", Point3D::new(0.4, 1.15, 0.6));
    part(&mut scene, bench, "anchorSPH", Point3D::new(0.0, 1.15, 0.9));
    scene.spawn_with_extent(
        bench,
        "mainArea",
        Transform::from_position(Point3D::new(-0.6, 1.0, 0.4)),
        Bounds::aabb(Point3D::ORIGIN, Point3D::new(0.3, 0.0, 0.3)),
    );

    let tube = part(&mut scene, bench, "tube", Point3D::new(0.2, 1.2, 0.6));
    part(&mut scene, tube, "basePoint", Point3D::new(0.0, -0.05, 0.0));
    part(&mut scene, tube, "holdingPoint", Point3D::ORIGIN);
    part(&mut scene, tube, "capPoint", Point3D::new(0.0, 0.05, 0.0));
    hit_surface(&mut scene, tube, Vector3D::new(0.02, 0.06, 0.02));

    let cuvette = part(&mut scene, bench, "cuvette", Point3D::new(0.0, 1.2, 0.9));
    part(&mut scene, cuvette, "basePoint", Point3D::new(0.0, -0.05, 0.0));
    part(&mut scene, cuvette, "capPoint", Point3D::new(0.0, 0.03, 0.0));
    hit_surface(&mut scene, cuvette, Vector3D::new(0.01, 0.04, 0.01));

    let flask = part(&mut scene, bench, "erlenmeyer", Point3D::new(-0.5, 1.08, 0.5));
    part(&mut scene, flask, "basePoint", Point3D::new(0.0, -0.08, 0.0));
    part(&mut scene, flask, "pourPoint", Point3D::new(0.0, 0.08, 0.0));
    hit_surface(&mut scene, flask, Vector3D::new(0.05, 0.08, 0.05));

    let bin = part(&mut scene, bench, "bin", Point3D::new(-0.2, 1.0, 0.8));
    part(&mut scene, bin, "lid", Point3D::new(0.0, 0.3, 0.0));
    part(&mut scene, bin, "dropPoint", Point3D::new(0.0, 0.3, 0.0));
    part(&mut scene, bin, "basePoint", Point3D::ORIGIN);
    hit_surface(&mut scene, bin, Vector3D::new(0.1, 0.3, 0.1));

    scene
}

/// Populated workspace with every object settled on its nearest anchor
pub fn workspace(config: LabConfig) -> Workspace {
    let mut ws = Workspace::with_scene(scene(), config);
    let root = ws.scene.root();
    let (objects, _) = ws.populate(root);
    for id in objects {
        if let Some(anchor) = ws.closest_anchor(id) {
            ws.place_on_anchor(id, anchor);
        }
    }
    ws
}

/// Move the tube to the second rack slot, then open the bin with the other hand
pub fn script() -> Vec<Step> {
    let mut steps = vec![Step::Frames(1), Step::Key(KeyCode::Char('g')), Step::Frames(8)];
    steps.extend([Step::Key(KeyCode::Right); 4]);
    steps.extend([Step::Key(KeyCode::PageUp); 10]);
    steps.extend([
        Step::Frames(2),
        Step::Key(KeyCode::Char('g')),
        Step::Frames(10),
        Step::Key(KeyCode::Tab),
        Step::Frames(1),
        Step::Key(KeyCode::Char(' ')),
        Step::Frames(1),
    ]);
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bench_settles_objects() {
        let ws = workspace(LabConfig::default());
        assert_eq!(ws.objects.len(), 4);
        // 3 point anchors + 4 tiles
        assert_eq!(ws.anchors.len(), 7);

        let slot = ws.anchors.by_name("tubeAnchor1").unwrap();
        let tube = ws.objects.iter().find(|o| o.kind() == labxr_core::ObjectKind::Tube).unwrap();
        assert_eq!(slot.occupant(), Some(tube.id()));

        let flask = ws
            .objects
            .iter()
            .find(|o| o.kind() == labxr_core::ObjectKind::Erlenmeyer)
            .unwrap();
        let tile = ws.anchors.get(flask.anchored().unwrap()).unwrap();
        assert!(tile.name().starts_with("mainArea-"));
    }
}
