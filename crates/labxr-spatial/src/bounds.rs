//! Local-space bounding volumes used as hit surfaces and surface extents

use super::{Point3D, Ray, Vector3D};

/// Bounding volume expressed in the local space of the node that owns it
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bounds {
    /// Axis-aligned box
    AABB { min: Point3D, max: Point3D },
    /// Sphere
    Sphere { center: Point3D, radius: f32 },
    /// Degenerate point; never hit by rays
    Point(Point3D),
}

impl Bounds {
    /// Box spanning two corners, in any order
    pub fn aabb(a: Point3D, b: Point3D) -> Self {
        Self::AABB {
            min: Point3D::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3D::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    pub fn aabb_centered(center: Point3D, half_extents: Vector3D) -> Self {
        Self::aabb(center - half_extents, center + half_extents)
    }

    pub fn sphere(center: Point3D, radius: f32) -> Self {
        Self::Sphere { center, radius }
    }

    pub fn center(&self) -> Point3D {
        match self {
            Bounds::AABB { min, max } => min.lerp(max, 0.5),
            Bounds::Sphere { center, .. } => *center,
            Bounds::Point(p) => *p,
        }
    }

    /// Min/max corners of the box that encloses this volume
    pub fn extents(&self) -> (Point3D, Point3D) {
        match self {
            Bounds::AABB { min, max } => (*min, *max),
            Bounds::Sphere { center, radius } => {
                let r = Vector3D::splat(*radius);
                (*center - r, *center + r)
            }
            Bounds::Point(p) => (*p, *p),
        }
    }

    pub fn contains(&self, point: Point3D) -> bool {
        match self {
            Bounds::AABB { min, max } => {
                (min.x..=max.x).contains(&point.x)
                    && (min.y..=max.y).contains(&point.y)
                    && (min.z..=max.z).contains(&point.z)
            }
            Bounds::Sphere { center, radius } => center.distance_squared(&point) <= radius * radius,
            Bounds::Point(p) => point == *p,
        }
    }

    /// Distance along `ray` to the first intersection, if any.
    ///
    /// A ray starting inside the volume hits it at distance zero.
    pub fn ray_distance(&self, ray: &Ray) -> Option<f32> {
        match self {
            Bounds::AABB { min, max } => slab_intersection(ray, min, max),
            Bounds::Sphere { center, radius } => sphere_intersection(ray, center, *radius),
            Bounds::Point(_) => None,
        }
    }

    pub fn expand(&self, margin: f32) -> Self {
        match self {
            Bounds::AABB { min, max } => Bounds::AABB {
                min: *min - Vector3D::splat(margin),
                max: *max + Vector3D::splat(margin),
            },
            Bounds::Sphere { center, radius } => Bounds::Sphere {
                center: *center,
                radius: radius + margin,
            },
            Bounds::Point(p) => Bounds::Sphere {
                center: *p,
                radius: margin,
            },
        }
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds::Point(Point3D::ORIGIN)
    }
}

fn slab_intersection(ray: &Ray, min: &Point3D, max: &Point3D) -> Option<f32> {
    let origin = [ray.origin.x, ray.origin.y, ray.origin.z];
    let dir = [ray.direction.x, ray.direction.y, ray.direction.z];
    let lo = [min.x, min.y, min.z];
    let hi = [max.x, max.y, max.z];

    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for axis in 0..3 {
        if dir[axis].abs() < f32::EPSILON {
            // Parallel to this slab: must already lie between its planes
            if origin[axis] < lo[axis] || origin[axis] > hi[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir[axis];
        let mut t0 = (lo[axis] - origin[axis]) * inv;
        let mut t1 = (hi[axis] - origin[axis]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_near = t_near.max(t0);
        t_far = t_far.min(t1);
        if t_near > t_far {
            return None;
        }
    }

    if t_far < 0.0 {
        None
    } else {
        Some(t_near.max(0.0))
    }
}

fn sphere_intersection(ray: &Ray, center: &Point3D, radius: f32) -> Option<f32> {
    let to_center = *center - ray.origin;
    let along = to_center.dot(&ray.direction);
    let perp_sq = to_center.magnitude_squared() - along * along;
    let r_sq = radius * radius;
    if perp_sq > r_sq {
        return None;
    }
    let half_chord = (r_sq - perp_sq).sqrt();
    let (t0, t1) = (along - half_chord, along + half_chord);
    if t1 < 0.0 {
        None
    } else {
        Some(t0.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_contains() {
        let b = Bounds::aabb(Point3D::new(1.0, 1.0, 1.0), Point3D::ORIGIN);
        assert!(b.contains(Point3D::new(0.5, 0.5, 0.5)));
        assert!(!b.contains(Point3D::new(-0.1, 0.5, 0.5)));
    }

    #[test]
    fn test_ray_hits_box_front_face() {
        let b = Bounds::aabb_centered(Point3D::new(0.0, 0.0, 5.0), Vector3D::splat(1.0));
        let ray = Ray::new(Point3D::ORIGIN, Vector3D::FORWARD);
        let t = b.ray_distance(&ray).unwrap();
        assert!((t - 4.0).abs() < 0.0001);
    }

    #[test]
    fn test_ray_misses_box_behind() {
        let b = Bounds::aabb_centered(Point3D::new(0.0, 0.0, -5.0), Vector3D::splat(1.0));
        let ray = Ray::new(Point3D::ORIGIN, Vector3D::FORWARD);
        assert!(b.ray_distance(&ray).is_none());
    }

    #[test]
    fn test_ray_parallel_outside_slab() {
        let b = Bounds::aabb_centered(Point3D::new(0.0, 3.0, 5.0), Vector3D::splat(1.0));
        let ray = Ray::new(Point3D::ORIGIN, Vector3D::FORWARD);
        assert!(b.ray_distance(&ray).is_none());
    }

    #[test]
    fn test_ray_sphere() {
        let s = Bounds::sphere(Point3D::new(0.0, 0.0, 10.0), 2.0);
        let ray = Ray::new(Point3D::ORIGIN, Vector3D::FORWARD);
        assert!((s.ray_distance(&ray).unwrap() - 8.0).abs() < 0.0001);

        let inside = Ray::new(Point3D::new(0.0, 0.0, 10.0), Vector3D::FORWARD);
        assert_eq!(s.ray_distance(&inside), Some(0.0));
    }

    #[test]
    fn test_point_is_never_hit() {
        let p = Bounds::Point(Point3D::new(0.0, 0.0, 1.0));
        assert!(p.ray_distance(&Ray::new(Point3D::ORIGIN, Vector3D::FORWARD)).is_none());
    }
}
