//! Special functions and polynomial helpers used by the solvers.
//!
//! - [`lambert_w0`] - principal branch of the Lambert W function
//! - [`wright_omega`] - Wright omega function for real arguments
//! - [`omega_approx`] - three-band cubic approximation of Wright omega
//! - [`polyval`] / [`AffinePolynomial`] - polynomial evaluation
//!
//! All functions are generic over [`Real`](crate::precision::Real) so they
//! run unchanged in `f32` and `f64`.

mod lambert;
mod omega;
mod poly;

pub use lambert::lambert_w0;
pub use omega::{omega_approx, wright_omega, OmegaBand, OMEGA_APPROX_COEFFS, OMEGA_APPROX_HIGH, OMEGA_APPROX_LOW};
pub use poly::{polyval, AffinePolynomial};
