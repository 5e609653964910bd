use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RopeError {
    #[error("point mass index {index} is out of range for {len} point masses")]
    PointOutOfRange { index: usize, len: usize },
    #[error("spring anchored twice to point mass {0}")]
    DegenerateSpring(usize),
    #[error("triangle {0:?} repeats a vertex")]
    DegenerateTriangle([usize; 3]),
    #[error("link triangles {start:?} and {end:?} share a vertex")]
    DegenerateLink { start: [usize; 3], end: [usize; 3] },
}
