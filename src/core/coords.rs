//=========================================================================
// Coordinate Mapper
//=========================================================================
//
// Pure conversions between the three coordinate frames:
//
//   device space   raw input pixels, origin top-left, Y down
//        ↓ device_to_view (WorldProperties)
//   view space     world units, origin per ViewOrigin, Y up when flip_y
//        ↓ inverse(composed(node))
//   local space    a node's own frame
//
// Nothing here mutates engine state. Reading composed matrices may fill
// the tree's transform cache, which is not observable.
//
//=========================================================================

//=== External Dependencies ===============================================

use kurbo::{Affine, Point};

//=== Internal Dependencies ===============================================

use crate::core::config::{ViewOrigin, WorldProperties};
use crate::core::error::StageError;
use crate::core::node::{NodeId, NodeTree};

/// Determinants below this are treated as non-invertible.
const SINGULAR_EPSILON: f64 = 1e-12;

//=== Device ↔ View =======================================================

/// Maps raw device pixels into view space.
pub fn device_to_view(props: &WorldProperties, x: f64, y: f64) -> Point {
    let nx = x / f64::from(props.device_width);
    let ny = y / f64::from(props.device_height);

    match props.origin {
        ViewOrigin::Centered => {
            let vx = (nx - 0.5) * props.view_width;
            let vy = (ny - 0.5) * props.view_height;
            Point::new(vx, if props.flip_y { -vy } else { vy })
        }
        ViewOrigin::TopLeft => {
            let vx = nx * props.view_width;
            let vy = ny * props.view_height;
            Point::new(vx, if props.flip_y { props.view_height - vy } else { vy })
        }
    }
}

/// Inverse of [`device_to_view`].
pub fn view_to_device(props: &WorldProperties, point: Point) -> Point {
    let (nx, ny) = match props.origin {
        ViewOrigin::Centered => {
            let vy = if props.flip_y { -point.y } else { point.y };
            (
                point.x / props.view_width + 0.5,
                vy / props.view_height + 0.5,
            )
        }
        ViewOrigin::TopLeft => {
            let vy = if props.flip_y {
                props.view_height - point.y
            } else {
                point.y
            };
            (point.x / props.view_width, vy / props.view_height)
        }
    };

    Point::new(
        nx * f64::from(props.device_width),
        ny * f64::from(props.device_height),
    )
}

//=== View ↔ Node =========================================================

/// Maps a point in `node`'s local frame into view space.
pub fn node_to_view(tree: &NodeTree, node: NodeId, point: Point) -> Result<Point, StageError> {
    let matrix = tree.composed(node).ok_or(StageError::UnknownNode(node))?;
    Ok(matrix * point)
}

/// Maps a view-space point into `node`'s local frame.
pub fn view_to_node(tree: &NodeTree, point: Point, node: NodeId) -> Result<Point, StageError> {
    let matrix = tree.composed(node).ok_or(StageError::UnknownNode(node))?;
    Ok(invert(matrix)? * point)
}

/// Maps raw device pixels into `node`'s local frame.
///
/// This is the hit-testing entry point for pointer events.
pub fn device_to_node(
    tree: &NodeTree,
    props: &WorldProperties,
    x: f64,
    y: f64,
    node: NodeId,
) -> Result<Point, StageError> {
    view_to_node(tree, device_to_view(props, x, y), node)
}

//=== Node ↔ Node =========================================================

/// Re-expresses a point from `src`'s local frame in `dst`'s local frame.
///
/// Both nodes must live in the same tree.
pub fn node_to_node(
    tree: &NodeTree,
    src: NodeId,
    point: Point,
    dst: NodeId,
) -> Result<Point, StageError> {
    let src_root = tree.root_of(src).ok_or(StageError::UnknownNode(src))?;
    let dst_root = tree.root_of(dst).ok_or(StageError::UnknownNode(dst))?;
    if src_root != dst_root {
        return Err(StageError::DisjointTrees);
    }

    let from = tree.composed(src).ok_or(StageError::UnknownNode(src))?;
    let to = tree.composed(dst).ok_or(StageError::UnknownNode(dst))?;
    Ok(invert(to)? * (from * point))
}

fn invert(matrix: Affine) -> Result<Affine, StageError> {
    if matrix.determinant().abs() < SINGULAR_EPSILON {
        return Err(StageError::SingularTransform);
    }
    Ok(matrix.inverse())
}

//=========================================================================
// Unit Tests
//=========================================================================
