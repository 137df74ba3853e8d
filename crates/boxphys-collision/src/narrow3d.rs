use boxphys_core::{Dim, Dim3, Mat3, Rot3, Scalar, Vec3};
use boxphys_geom::Plane;
use smallvec::SmallVec;

use crate::point::{canonicalize, CollisionPoint, CollisionPoints, Feature, FeaturePair};

/// In-plane corner signs of a box face, same winding as the 2D edge table.
/// Boundary edge k runs from corner k to corner k+1.
const VERTEX_SIGNS: [[Scalar; 2]; 4] = [[1.0, 1.0], [-1.0, 1.0], [-1.0, -1.0], [1.0, -1.0]];

/// Face id: 2*axis for the positive face, 2*axis + 1 for the negative one.
#[inline]
fn face_index(axis: usize, positive: bool) -> u8 {
    (2 * axis + usize::from(!positive)) as u8
}

/// Face adjacent across boundary edge k of a face with in-plane axes (u, v).
/// Along the winding the constant coordinate alternates v+, u-, v-, u+.
#[inline]
fn boundary_face(u: usize, v: usize, k: usize) -> u8 {
    match k {
        0 => face_index(v, true),
        1 => face_index(u, false),
        2 => face_index(v, false),
        _ => face_index(u, true),
    }
}

#[derive(Copy, Clone)]
struct ClippedVertex {
    position: Vec3,
    feature_pair: FeaturePair,
}

/// A quad clipped by four planes has at most eight vertices.
type Polygon = SmallVec<[ClippedVertex; 8]>;

#[inline]
fn abs_mat(m: &Mat3) -> Mat3 {
    Mat3::from_cols(m.x_axis.abs(), m.y_axis.abs(), m.z_axis.abs())
}

#[inline]
fn component(v: Vec3, i: usize) -> Scalar {
    Dim3::axis(v, i)
}

/// The four corners of the face `(axis, positive)` of the incident box, in
/// world space, each tagged with the two faces meeting it along the boundary.
/// Consecutive corners therefore share exactly one feature, which is what the
/// clipper's feature-overwrite rule relies on.
fn face_polygon(
    incident_box: usize,
    axis: usize,
    positive: bool,
    half_size: Vec3,
    position: Vec3,
    rotation: &Rot3,
) -> Polygon {
    let u = (axis + 1) % 3;
    let v = (axis + 2) % 3;
    let sign = if positive { 1.0 } else { -1.0 };

    let mut polygon = Polygon::new();
    for (k, signs) in VERTEX_SIGNS.iter().enumerate() {
        let mut local = [0.0; 3];
        local[axis] = sign * component(half_size, axis);
        local[u] = signs[0] * component(half_size, u);
        local[v] = signs[1] * component(half_size, v);
        let local = Vec3::new(local[0], local[1], local[2]);

        let feature_pair = [boundary_face(u, v, (k + 3) % 4), boundary_face(u, v, k)]
            .map(|index| Feature {
                geometry: incident_box as u8,
                index,
            });

        polygon.push(ClippedVertex {
            position: position + rotation.mat() * local,
            feature_pair,
        });
    }
    polygon
}

/// Sutherland-Hodgman against one half-space. Crossing vertices take the
/// positive vertex's feature pair with its outer slot overwritten by the
/// clipping face, exactly as the 2D edge clipper does.
fn clip_polygon(
    polygon: &Polygon,
    plane: &Plane<Dim3>,
    clip_box: usize,
    clip_face: u8,
) -> Polygon {
    let mut out = Polygon::new();
    let n = polygon.len();
    for i in 0..n {
        let current = polygon[i];
        let next = polygon[(i + 1) % n];
        let d_current = plane.distance(current.position);
        let d_next = plane.distance(next.position);

        if d_current <= 0.0 {
            out.push(current);
        }

        if d_current * d_next < 0.0 {
            let lerp = d_current / (d_current - d_next);
            let position = current.position + (next.position - current.position) * lerp;

            let pi = usize::from(d_current <= 0.0);
            let mut feature_pair = if pi == 1 {
                next.feature_pair
            } else {
                current.feature_pair
            };
            feature_pair[pi] = Feature {
                geometry: clip_box as u8,
                index: clip_face,
            };
            out.push(ClippedVertex {
                position,
                feature_pair,
            });
        }
    }
    out
}

/// 3D box-box contact generation: the 2D pipeline with a third axis and two
/// pairs of side planes. Only the six face axes are tested; the clipping
/// stage absorbs near-edge configurations.
pub(crate) fn box_box_3d(
    positions: [Vec3; 2],
    rotations: [Rot3; 2],
    half_sizes: [Vec3; 2],
    out: &mut CollisionPoints<Dim3>,
) {
    debug_assert!(half_sizes[0].min_element() > 0.0);
    debug_assert!(half_sizes[1].min_element() > 0.0);

    let inv_rots = [rotations[0].inverse_mat(), rotations[1].inverse_mat()];

    // Step 1: minimum penetration over the six face axes.
    let centers_vec = positions[1] - positions[0];
    let mut clip_box = 0usize;
    let mut clip_axis = 0usize;
    {
        let ab_rel = inv_rots[0] * rotations[1].mat();
        // abs(M) projects B into A's frame, abs(M^T) projects A into B's.
        let abs_rels = [abs_mat(&ab_rel), abs_mat(&ab_rel.transpose())];

        let mut min_penetration = Scalar::MAX;
        for bi in 0..2 {
            let other_proj =
                (inv_rots[bi] * centers_vec).abs() - abs_rels[bi] * half_sizes[1 - bi];
            let penetrations = half_sizes[bi] - other_proj;
            for ai in 0..3 {
                let penetration = component(penetrations, ai);
                if penetration < 0.0 {
                    return;
                }
                if penetration < min_penetration {
                    min_penetration = penetration;
                    clip_box = bi;
                    clip_axis = ai;
                }
            }
        }
    }

    let mut min_dir = rotations[clip_box].mat().col(clip_axis);
    if min_dir.dot(centers_vec) < 0.0 {
        min_dir = -min_dir;
    }
    let clip_normal = if clip_box == 0 { min_dir } else { -min_dir };

    // Step 2: incident face, most anti-parallel to the reference normal.
    let incident_box = 1 - clip_box;
    let incident_dir = -(inv_rots[incident_box] * clip_normal);
    let abs_dir = incident_dir.abs();
    let incident_axis = if abs_dir.x > abs_dir.y && abs_dir.x > abs_dir.z {
        0
    } else if abs_dir.y > abs_dir.z {
        1
    } else {
        2
    };
    let positive = component(incident_dir, incident_axis) > 0.0;

    let mut polygon = face_polygon(
        incident_box,
        incident_axis,
        positive,
        half_sizes[incident_box],
        positions[incident_box],
        &rotations[incident_box],
    );

    // Step 3: clip against the two pairs of side planes.
    let u = (clip_axis + 1) % 3;
    let v = (clip_axis + 2) % 3;
    for side_axis in [u, v] {
        let side_normal = rotations[clip_box].mat().col(side_axis);
        let side_half = component(half_sizes[clip_box], side_axis);

        let plane_pos =
            Plane::<Dim3>::from_point_offset(side_normal, positions[clip_box], side_half);
        polygon = clip_polygon(&polygon, &plane_pos, clip_box, face_index(side_axis, true));
        if polygon.is_empty() {
            return;
        }

        let plane_neg =
            Plane::<Dim3>::from_point_offset(-side_normal, positions[clip_box], side_half);
        polygon = clip_polygon(&polygon, &plane_neg, clip_box, face_index(side_axis, false));
        if polygon.is_empty() {
            return;
        }
    }

    // Step 4: keep the vertices behind the reference face.
    let clip_plane = Plane::<Dim3>::from_point_offset(
        clip_normal,
        positions[clip_box],
        component(half_sizes[clip_box], clip_axis),
    );
    let local_normal = inv_rots[clip_box] * clip_normal;

    for vertex in &polygon {
        let penetration = -clip_plane.distance(vertex.position);
        if penetration < 0.0 {
            continue;
        }
        if out.len() == Dim3::MAX_POINTS {
            break;
        }

        let position = vertex.position + clip_normal * penetration;

        let mut local_points = [Vec3::ZERO; 2];
        local_points[clip_box] = inv_rots[clip_box] * (position - positions[clip_box]);
        local_points[incident_box] =
            inv_rots[incident_box] * (vertex.position - positions[incident_box]);

        let mut feature_pair = vertex.feature_pair;
        canonicalize(&mut feature_pair);

        out.push(CollisionPoint {
            position,
            normal: min_dir,
            penetration,
            feature_pair,
            clip_box: clip_box as u8,
            local_points,
            local_normal,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use boxphys_core::Quat;

    fn collide(
        positions: [Vec3; 2],
        rotations: [Rot3; 2],
        half_sizes: [Vec3; 2],
    ) -> CollisionPoints<Dim3> {
        let mut out = CollisionPoints::new();
        box_box_3d(positions, rotations, half_sizes, &mut out);
        out
    }

    #[test]
    fn face_face_overlap_gives_four_corners() {
        let points = collide(
            [Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 1.8, 0.0)],
            [Rot3::default(), Rot3::default()],
            [Vec3::ONE, Vec3::ONE],
        );
        assert_eq!(points.len(), 4);
        for p in &points {
            assert_relative_eq!(p.penetration, 0.2, epsilon = 1e-5);
            assert_relative_eq!(p.normal.y, 1.0, epsilon = 1e-6);
            assert_relative_eq!(p.position.y, 1.0, epsilon = 1e-5);
            assert!(p.feature_pair[0] <= p.feature_pair[1]);
        }
        // Four distinct persistence keys.
        for i in 0..4 {
            for j in (i + 1)..4 {
                assert_ne!(points[i].feature_pair, points[j].feature_pair);
            }
        }
    }

    #[test]
    fn separated_boxes_give_nothing() {
        let points = collide(
            [Vec3::ZERO, Vec3::new(0.0, 2.5, 0.0)],
            [Rot3::default(), Rot3::default()],
            [Vec3::ONE, Vec3::ONE],
        );
        assert!(points.is_empty());
    }

    #[test]
    fn twisted_box_on_floor_clips_to_an_octagon() {
        // A cube twisted 45 degrees about the contact normal against a larger
        // reference face produces the full eight-vertex clip.
        let rot = Rot3::new(Quat::from_rotation_y(core::f32::consts::FRAC_PI_4));
        let points = collide(
            [Vec3::new(0.0, -0.5, 0.0), Vec3::new(0.0, 0.49, 0.0)],
            [Rot3::default(), rot],
            [Vec3::new(0.6, 0.5, 0.6), Vec3::new(0.5, 0.5, 0.5)],
        );
        assert_eq!(points.len(), 8);
        for p in &points {
            assert!(p.penetration >= 0.0);
            assert_relative_eq!(p.normal.y, 1.0, epsilon = 1e-5);
        }
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                assert_ne!(points[i].feature_pair, points[j].feature_pair);
            }
        }
    }

    #[test]
    fn swapping_boxes_flips_the_normal() {
        let positions = [Vec3::new(0.0, 0.0, 0.1), Vec3::new(0.2, 1.7, 0.0)];
        let rotations = [
            Rot3::new(Quat::from_rotation_x(0.1)),
            Rot3::new(Quat::from_rotation_z(-0.15)),
        ];
        let half_sizes = [Vec3::ONE, Vec3::new(0.8, 0.9, 1.0)];

        let forward = collide(positions, rotations, half_sizes);
        let swapped = collide(
            [positions[1], positions[0]],
            [rotations[1], rotations[0]],
            [half_sizes[1], half_sizes[0]],
        );

        assert_eq!(forward.len(), swapped.len());
        assert!(!forward.is_empty());
        let dot = forward[0].normal.dot(swapped[0].normal);
        assert_relative_eq!(dot, -1.0, epsilon = 1e-5);
    }
}
