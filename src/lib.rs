//! Short-range pair traversal over cell lists, with and without periodic
//! boundary conditions.
//!
//! ```rust
//! use cellpair::{CellBox, CellBoxOptions, CellList, CellListOptions, MapPairwiseOptions};
//! use nalgebra::Vector3;
//!
//! let points = vec![
//!     Vector3::new(0.0, 0.0, 0.0),
//!     Vector3::new(0.5, 0.0, 0.0),
//!     Vector3::new(5.0, 5.0, 5.0),
//! ];
//! let cell_box =
//!     CellBox::from_sides(Vector3::new(10.0, 10.0, 10.0), 1.0, CellBoxOptions::default())
//!         .unwrap();
//! let cell_list = CellList::new(&points, cell_box.clone(), CellListOptions::default()).unwrap();
//!
//! let pair_count = cellpair::map_pairwise(
//!     &cell_box,
//!     &cell_list,
//!     0usize,
//!     |_, _, _, _, _, acc| acc + 1,
//!     |a, b| a + b,
//!     MapPairwiseOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(pair_count, 1);
//! ```

pub mod cell_box;
pub mod cell_index;
pub mod cell_list;
pub mod error;
pub mod math;
pub mod parallel;
pub mod positions;
pub mod system_class;
mod traversal;

pub use cell_box::{CellBox, CellBoxOptions};
pub use cell_list::{AuxThreaded, CellList, CellListOptions, CellListPair};
pub use error::CellListError;
pub use math::{CellCoord, Point, Scalar};
pub use parallel::{map_pairwise, map_pairwise_pair, MapPairwiseOptions};
pub use positions::{ColumnMajorMatrix, PositionSource};
pub use system_class::SystemClass;
