//! The registration ABI between the host and transformer artifacts.
//!
//! A transformer artifact is an ordinary Rust `cdylib` that depends on
//! this crate and exports a single well-known symbol,
//! [`REGISTRATION_SYMBOL`], of type [`TransformerRegistration`]. The
//! [`declare_transformers!`](crate::declare_transformers) macro emits the
//! export; plugin authors never spell the symbol name themselves.
//!
//! The registration is plain Rust data, not a C ABI: host and artifact
//! must be built from the same version of this crate with the same
//! compiler, which is the build convention for in-tree transformer
//! artifacts. [`PLUGIN_ABI_VERSION`] is bumped whenever the contract
//! changes shape so a stale artifact fails loudly instead of
//! misbehaving.
//!
//! # Writing a transformer artifact
//!
//! ```ignore
//! use reforge::declare_transformers;
//! use reforge::schema::ParameterSchema;
//! use reforge::transformer::{EffectiveParameters, RecipeTransformer};
//! use reforge::recipe::Recipe;
//!
//! struct MyTransformer;
//!
//! impl RecipeTransformer for MyTransformer {
//!     fn declared_schema(&self) -> ParameterSchema {
//!         ParameterSchema::new()
//!     }
//!     fn transform(
//!         &self,
//!         param_file: &Recipe,
//!         _parameters: &EffectiveParameters,
//!     ) -> anyhow::Result<Recipe> {
//!         Ok(param_file.clone())
//!     }
//! }
//!
//! declare_transformers!(|| Box::new(MyTransformer));
//! ```

use crate::transformer::RecipeTransformer;

/// Version of the host↔artifact contract. Bumped on any change to
/// [`TransformerRegistration`] or the transformer trait surface.
pub const PLUGIN_ABI_VERSION: u32 = 1;

/// Name of the exported registration symbol.
pub const REGISTRATION_SYMBOL: &str = "reforge_transformer_registration";

/// Constructor for one transformer instance.
pub type TransformerConstructor = fn() -> Box<dyn RecipeTransformer>;

/// The data a transformer artifact exports under
/// [`REGISTRATION_SYMBOL`].
///
/// The constructor list is the host's discovery surface: exactly one
/// entry is permitted per artifact. The list form exists so the host can
/// distinguish "artifact registered nothing" from "artifact registered
/// too much" and report each precisely.
pub struct TransformerRegistration {
    /// Contract version the artifact was built against.
    pub abi_version: u32,
    /// The transformers this artifact offers. Must hold exactly one.
    pub constructors: &'static [TransformerConstructor],
}

/// Export a transformer registration from a plugin crate.
///
/// Takes the constructor(s) of the crate's transformers and emits the
/// [`REGISTRATION_SYMBOL`] static. A well-formed artifact registers
/// exactly one transformer; the host rejects anything else at load time.
#[macro_export]
macro_rules! declare_transformers {
    ($($constructor:expr),+ $(,)?) => {
        #[no_mangle]
        #[allow(non_upper_case_globals)]
        pub static reforge_transformer_registration:
            $crate::plugin::TransformerRegistration =
            $crate::plugin::TransformerRegistration {
                abi_version: $crate::plugin::PLUGIN_ABI_VERSION,
                constructors: &[$($constructor),+],
            };
    };
}
