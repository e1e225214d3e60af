//! Geometric primitive value types
//!
//! Plain value types with cheap derived operations: corner/center-extent
//! boxes, oriented boxes, planes, triangles, line segments, and view
//! frustums. No algorithmic complexity lives here; these are the
//! foundation the collision math and the bounding-volume tree build on.

pub mod aabox;
pub mod frustum;
pub mod line_segment;
pub mod obbox;
pub mod plane;
pub mod triangle;

pub use aabox::{AABox, MinMaxAABox};
pub use frustum::Frustum;
pub use line_segment::LineSegment;
pub use obbox::OBBox;
pub use plane::{AAPlane, Axis, Plane};
pub use triangle::Triangle;
