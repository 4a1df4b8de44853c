use catalog::HotspotId;
use foundation::math::Vec3;

use crate::hotspot::{HotspotMarker, MarkerPart};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir.scale(t)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerHit {
    /// Index into the marker slice that was picked against.
    pub index: usize,
    pub hotspot: HotspotId,
    pub part: MarkerPart,
    pub distance: f64,
    pub point: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub max_distance: f64,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            // Markers live well inside the panorama sphere.
            max_distance: crate::panorama::PANORAMA_RADIUS,
        }
    }
}

/// Deterministic ray picking for hotspot markers.
///
/// Ordering contract:
/// - The closest hit along the (normalized) ray wins.
/// - If multiple markers are hit at the same distance, the lower slice index wins.
///
/// Notes:
/// - Markers lie in their local XY plane; both faces are pickable.
/// - Marker spin is ignored: ring and disc are rotationally symmetric.
pub fn pick_marker(markers: &[HotspotMarker], ray: Ray, opts: PickOptions) -> Option<MarkerHit> {
    let dir = ray.dir.normalized()?;

    let mut best: Option<(f64, usize, MarkerPart)> = None;
    for (index, marker) in markers.iter().enumerate() {
        let Some((t, part)) = ray_marker_hit(ray.origin, dir, marker, opts.max_distance) else {
            continue;
        };
        best = match best {
            None => Some((t, index, part)),
            Some((bt, bi, bp)) => {
                let ord = t.total_cmp(&bt).then_with(|| index.cmp(&bi));
                if ord.is_lt() {
                    Some((t, index, part))
                } else {
                    Some((bt, bi, bp))
                }
            }
        };
    }

    let (t, index, part) = best?;
    Some(MarkerHit {
        index,
        hotspot: markers[index].hotspot.clone(),
        part,
        distance: t,
        point: Ray::new(ray.origin, dir).at(t),
    })
}

fn ray_marker_hit(
    origin: Vec3,
    dir: Vec3,
    marker: &HotspotMarker,
    max_distance: f64,
) -> Option<(f64, MarkerPart)> {
    // Plane z = marker.z
    if dir.z.abs() < 1e-12 {
        return None;
    }
    let t = (marker.position.z - origin.z) / dir.z;
    if !(0.0..=max_distance).contains(&t) {
        return None;
    }
    let hit = origin + dir.scale(t);
    let dx = hit.x - marker.position.x;
    let dy = hit.y - marker.position.y;
    let part = marker.part_at((dx * dx + dy * dy).sqrt())?;
    Some((t, part))
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::Hotspot;
    use foundation::Frame;

    fn marker(id: &str, pos: [f64; 3]) -> HotspotMarker {
        HotspotMarker::new(&Hotspot {
            id: HotspotId::new(id),
            position: pos,
            title: id.to_string(),
            description: String::new(),
            image_url: None,
        })
    }

    fn toward(p: [f64; 3]) -> Ray {
        Ray::new(Vec3::ZERO, Vec3::from_array(p))
    }

    #[test]
    fn ray_picks_nearest_hit() {
        let markers = vec![marker("far", [0.0, 0.0, -6.0]), marker("near", [0.0, 0.0, -3.0])];
        let hit = pick_marker(&markers, toward([0.0, 0.0, -1.0]), PickOptions::default())
            .expect("hit");
        assert_eq!(hit.hotspot, HotspotId::new("near"));
        assert_eq!(hit.index, 1);
        assert!((hit.distance - 3.0).abs() < 1e-12);
        assert_eq!(hit.part, MarkerPart::Disc);
    }

    #[test]
    fn tie_breaks_by_index() {
        let markers = vec![marker("first", [0.0, 0.0, -2.0]), marker("second", [0.0, 0.0, -2.0])];
        let hit = pick_marker(&markers, toward([0.0, 0.0, -1.0]), PickOptions::default())
            .expect("hit");
        assert_eq!(hit.hotspot, HotspotId::new("first"));
    }

    #[test]
    fn empty_space_and_behind_miss() {
        let markers = vec![marker("a", [0.0, 0.0, -2.0])];
        assert!(pick_marker(&markers, toward([1.0, 0.0, -1.0]), PickOptions::default()).is_none());
        assert!(pick_marker(&markers, toward([0.0, 0.0, 1.0]), PickOptions::default()).is_none());
        assert!(pick_marker(&markers, toward([1.0, 0.0, 0.0]), PickOptions::default()).is_none());
        assert!(pick_marker(&markers, toward([0.0, 0.0, 0.0]), PickOptions::default()).is_none());
    }

    #[test]
    fn ring_is_pickable_off_centre() {
        let markers = vec![marker("a", [0.0, 0.0, -2.0])];
        let hit = pick_marker(&markers, toward([1.0, 0.0, -2.0]), PickOptions::default())
            .expect("ring hit");
        assert_eq!(hit.part, MarkerPart::Ring);
    }

    #[test]
    fn spin_does_not_change_hits() {
        let mut markers = vec![marker("a", [0.5, 0.25, -2.0])];
        let rays: Vec<Ray> = (0..40)
            .map(|i| {
                let a = i as f64 * 0.05;
                toward([0.5 + a.cos() * (i as f64 * 0.035), 0.25 + a.sin() * 0.3, -2.0])
            })
            .collect();
        let before: Vec<_> = rays
            .iter()
            .map(|r| pick_marker(&markers, *r, PickOptions::default()).map(|h| h.part))
            .collect();
        let f = Frame::new(0, 1.0 / 60.0);
        for _ in 0..157 {
            markers[0].tick(&f);
        }
        let after: Vec<_> = rays
            .iter()
            .map(|r| pick_marker(&markers, *r, PickOptions::default()).map(|h| h.part))
            .collect();
        assert_eq!(before, after);
    }
}
