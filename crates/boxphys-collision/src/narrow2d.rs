use boxphys_core::{Dim, Dim2, Mat2, Rot2, Scalar, Vec2};
use boxphys_geom::Plane;

use crate::point::{canonicalize, CollisionPoint, CollisionPoints, Feature, FeaturePair};

/// Corner signs in winding order. Edge k runs from vertex k to vertex k+1:
///
/// ```text
///        e0
///    v1      v0
///    |        |
/// e1 |        | e3
///    |        |
///    v2      v3
///        e2
/// ```
const VERTEX_SIGNS: [[Scalar; 2]; 4] = [[1.0, 1.0], [-1.0, 1.0], [-1.0, -1.0], [1.0, -1.0]];

#[derive(Copy, Clone)]
struct ClippedPoint {
    position: Vec2,
    feature_pair: FeaturePair,
}

type ClippedEdge = [ClippedPoint; 2];

/// Clips an edge by a half-space; `None` unless two points survive.
fn clip_edge_by_plane(
    source: &ClippedEdge,
    clip_plane: &Plane<Dim2>,
    clip_box: u8,
    clip_edge: u8,
) -> Option<ClippedEdge> {
    let distances = [
        clip_plane.distance(source[0].position),
        clip_plane.distance(source[1].position),
    ];

    let mut target = [source[0]; 2];
    let mut count = 0;
    for pi in 0..2 {
        if distances[pi] <= 0.0 {
            target[count] = source[pi];
            count += 1;
        }
    }

    if count == 1 && distances[0] * distances[1] < 0.0 {
        let lerp = distances[0] / (distances[0] - distances[1]);
        let position = source[0].position + (source[1].position - source[0].position) * lerp;

        // Keep the features of the point in the negative half-space; the
        // positive point's outer feature becomes the clipping edge.
        let pi = usize::from(distances[0] <= 0.0);
        let mut feature_pair = source[pi].feature_pair;
        feature_pair[pi] = Feature {
            geometry: clip_box,
            index: clip_edge,
        };
        target[1] = ClippedPoint {
            position,
            feature_pair,
        };
        count = 2;
    }

    (count == 2).then_some(target)
}

#[inline]
fn abs_mat(m: &Mat2) -> Mat2 {
    Mat2::from_cols(m.x_axis.abs(), m.y_axis.abs())
}

/// Box-box contact generation: SAT over the four face axes, then the incident
/// edge clipped against the reference face's side planes.
pub(crate) fn box_box_2d(
    positions: [Vec2; 2],
    rotations: [Rot2; 2],
    half_sizes: [Vec2; 2],
    out: &mut CollisionPoints<Dim2>,
) {
    debug_assert!(half_sizes[0].min_element() > 0.0);
    debug_assert!(half_sizes[1].min_element() > 0.0);

    let inv_rots = [rotations[0].inverse_mat(), rotations[1].inverse_mat()];

    // Step 1: minimum penetration axis, or a separating axis.
    let centers_vec = positions[1] - positions[0];
    let mut clip_box = 0usize;
    let mut clip_axis = 0usize;
    {
        // B's axes in A's frame
        let ab_rel = inv_rots[0] * rotations[1].mat();
        // Extents of the other box projected into this box's frame:
        // abs(M) for B-in-A, abs(M^T) for A-in-B.
        let abs_rels = [abs_mat(&ab_rel), abs_mat(&ab_rel.transpose())];

        let mut min_penetration = Scalar::MAX;
        for bi in 0..2 {
            let other_proj =
                (inv_rots[bi] * centers_vec).abs() - abs_rels[bi] * half_sizes[1 - bi];
            let penetrations = half_sizes[bi] - other_proj;
            for ai in 0..2 {
                let penetration = Dim2::axis(penetrations, ai);
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

    // Reference normal, oriented from A to B.
    let mut min_dir = rotations[clip_box].mat().col(clip_axis);
    if min_dir.dot(centers_vec) < 0.0 {
        min_dir = -min_dir;
    }
    // Outward normal of the clipping face.
    let clip_normal = if clip_box == 0 { min_dir } else { -min_dir };

    // Step 2: the incident edge, most anti-parallel to the reference normal.
    let incident_box = 1 - clip_box;
    let mut edge = [ClippedPoint {
        position: Vec2::ZERO,
        feature_pair: FeaturePair::default(),
    }; 2];
    {
        let incident_dir = -(inv_rots[incident_box] * clip_normal);
        let incident_edge = if incident_dir.x.abs() > incident_dir.y.abs() {
            if incident_dir.x > 0.0 {
                3
            } else {
                1
            }
        } else if incident_dir.y > 0.0 {
            0
        } else {
            2
        };

        for pi in 0..2 {
            let point_index = (incident_edge + pi) % 4;
            let local = Vec2::new(
                VERTEX_SIGNS[point_index][0] * half_sizes[incident_box].x,
                VERTEX_SIGNS[point_index][1] * half_sizes[incident_box].y,
            );

            let mut feature_pair = FeaturePair::default();
            for fi in 0..2 {
                feature_pair[fi] = Feature {
                    geometry: incident_box as u8,
                    // fi = 0 is the boundary edge before this vertex,
                    // fi = 1 the one after (e3, e0 for v0; e0, e1 for v1; ...)
                    index: ((point_index + 3 - 3 * fi) % 4) as u8,
                };
            }

            edge[pi] = ClippedPoint {
                position: positions[incident_box] + rotations[incident_box].mat() * local,
                feature_pair,
            };
        }
    }

    // Step 3: clip against the two side planes of the reference face.
    let side_axis = 1 - clip_axis;
    let side_normal = rotations[clip_box].mat().col(side_axis);
    let side_half = Dim2::axis(half_sizes[clip_box], side_axis);
    let side_edge1 = (2 - clip_axis) as u8;
    let side_edge2 = (side_edge1 + 2) % 4;

    let plane1 = Plane::<Dim2>::from_point_offset(side_normal, positions[clip_box], side_half);
    let plane2 = Plane::<Dim2>::from_point_offset(-side_normal, positions[clip_box], side_half);

    let edge = match clip_edge_by_plane(&edge, &plane1, clip_box as u8, side_edge1)
        .and_then(|e| clip_edge_by_plane(&e, &plane2, clip_box as u8, side_edge2))
    {
        Some(e) => e,
        None => return,
    };

    // Step 4: keep the points behind the reference face.
    let clip_plane = Plane::<Dim2>::from_point_offset(
        clip_normal,
        positions[clip_box],
        Dim2::axis(half_sizes[clip_box], clip_axis),
    );
    let local_normal = inv_rots[clip_box] * clip_normal;

    for point in &edge {
        let penetration = -clip_plane.distance(point.position);
        if penetration < 0.0 {
            continue;
        }

        let position = point.position + clip_normal * penetration;

        let mut local_points = [Vec2::ZERO; 2];
        local_points[clip_box] = inv_rots[clip_box] * (position - positions[clip_box]);
        local_points[incident_box] =
            inv_rots[incident_box] * (point.position - positions[incident_box]);

        // Canonical order keeps the key stable when the reference flips.
        let mut feature_pair = point.feature_pair;
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
