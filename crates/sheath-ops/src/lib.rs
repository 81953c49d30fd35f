//! Finite-volume flux-divergence operators for Sheath plasma species.
//!
//! All operators take the [`Mesh`](sheath_mesh::Mesh) they run on and
//! return a new field; none mutate their inputs. Inputs must share one
//! layout (mesh, extent, y direction), otherwise the operator fails with
//! [`OpError::IncompatibleFields`] before computing anything.
//!
//! | Operator | Computes |
//! |---|---|
//! | [`div_par_fvv`] | parallel divergence of `f v^2` (momentum self-advection) |
//! | [`div_par`] | parallel divergence of `f v` |
//! | [`div_par_k_grad_par`] | parallel diffusion `div(K grad_par f)` |
//! | [`grad_par`] | parallel gradient |
//! | [`div_n_bxgrad_f_b_xppm`] | ExB advection of `n` by potential `f` |
//! | [`div_perp_lap_fv_index`] | index-space perpendicular diffusion |
//! | [`d4dz4`] | fourth z derivative for hyperdiffusion |
//!
//! Face values are reconstructed by a [`CellEdges`] limiter; [`Mc`] is
//! the default.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod check;
pub mod error;
pub mod parallel;
pub mod perpendicular;
pub mod stencil;

pub use error::OpError;
pub use parallel::{
    div_par, div_par_fvv, div_par_fvv_inspect, div_par_fvv_with, div_par_k_grad_par,
    div_par_with, grad_par, Face, FaceFlux, FlowRegime,
};
pub use perpendicular::{d4dz4, div_n_bxgrad_f_b_xppm, div_perp_lap_fv_index};
pub use stencil::{CellEdges, Fromm, Mc, MinMod, Stencil1D, Upwind};
