mod cache;
mod clara;
mod eager_pam;
mod evaluator;
mod fast_pam;
mod fast_pam1;
mod init;
mod kmedoids;
mod optimizer;
mod pam;

pub use self::cache::*;
pub use self::clara::*;
pub use self::eager_pam::*;
pub use self::evaluator::*;
pub use self::fast_pam::*;
pub use self::fast_pam1::*;
pub use self::init::*;
pub use self::kmedoids::*;
pub use self::optimizer::{Run, Solver, Strategy, DEFAULT_FAST_TOLERANCE, SWAP_TOLERANCE};
pub use self::pam::*;

use self::optimizer::{within_budget, Optimization};
use crate::error::{Error, Result};
use crate::measure::Measurable;
use crate::{Float, PointId, Slot};
