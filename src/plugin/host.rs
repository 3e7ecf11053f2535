//! Loading transformer artifacts.
//!
//! [`TransformerHost`] is the seam the expansion driver talks to;
//! [`DynamicLibraryHost`] is the production implementation, loading each
//! artifact as its own [`libloading::Library`]. Libraries are opened
//! with the platform's local-scope semantics, so symbols internal to one
//! artifact are invisible to every other artifact and to later loads.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use anyhow::Result;
use libloading::Library;
use tracing::debug;

use crate::core::ReforgeError;
use crate::plugin::registration::{TransformerRegistration, PLUGIN_ABI_VERSION, REGISTRATION_SYMBOL};
use crate::recipe::Recipe;
use crate::transformer::BoundTransformer;

/// Loads the transformer for a template from its artifact.
///
/// `load` runs the whole initialization protocol: locate and open the
/// artifact, discover the sole transformer, instantiate it, and bind it
/// to the template recipe (schema validation and comparison). The
/// returned [`BoundTransformer`] owns whatever scope keeps the
/// transformer's code alive.
pub trait TransformerHost {
    /// Load and bind the transformer shipped at `artifact_path` for
    /// `template`.
    fn load(&self, artifact_path: &Path, template: &Recipe) -> Result<BoundTransformer>;
}

/// Production host: one fresh dynamic-library scope per artifact.
///
/// The host itself is stateless; every call to
/// [`load`](TransformerHost::load) opens a new scope owned by the
/// returned transformer, so disjoint templates never share symbols and
/// dropping a bound transformer releases its scope.
#[derive(Debug, Default)]
pub struct DynamicLibraryHost;

impl DynamicLibraryHost {
    /// Create a host.
    pub fn new() -> Self {
        Self
    }
}

impl TransformerHost for DynamicLibraryHost {
    fn load(&self, artifact_path: &Path, template: &Recipe) -> Result<BoundTransformer> {
        if !artifact_path.is_file() {
            return Err(ReforgeError::TransformerArtifactNotFound {
                path: artifact_path.to_path_buf(),
            }
            .into());
        }

        debug!(
            artifact = %artifact_path.display(),
            template = %template.component_name,
            "loading transformer artifact"
        );

        // SAFETY: loading executes the artifact's initializers. Artifacts
        // are part of the deployment being installed and are trusted to
        // the same degree as the engine itself.
        let library = unsafe { Library::new(artifact_path) }.map_err(|e| ReforgeError::PluginLoad {
            path: artifact_path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let constructor = {
            // SAFETY: the registration symbol is emitted by
            // declare_transformers! from this crate version; the ABI
            // version gate below rejects artifacts built against a
            // different contract.
            let registration: &TransformerRegistration = unsafe {
                let symbol = library
                    .get::<*const TransformerRegistration>(REGISTRATION_SYMBOL.as_bytes())
                    .map_err(|_| ReforgeError::NoCandidateTransformer {
                        template: template.component_name.clone(),
                    })?;
                &**symbol
            };

            if registration.abi_version != PLUGIN_ABI_VERSION {
                return Err(ReforgeError::IncompatiblePluginAbi {
                    path: artifact_path.to_path_buf(),
                    expected: PLUGIN_ABI_VERSION,
                    found: registration.abi_version,
                }
                .into());
            }

            match registration.constructors {
                [] => {
                    return Err(ReforgeError::NoCandidateTransformer {
                        template: template.component_name.clone(),
                    }
                    .into());
                }
                [constructor] => *constructor,
                many => {
                    return Err(ReforgeError::MultipleCandidateTransformers {
                        path: artifact_path.to_path_buf(),
                        count: many.len(),
                    }
                    .into());
                }
            }
        };

        let transformer = panic::catch_unwind(AssertUnwindSafe(constructor)).map_err(|payload| {
            ReforgeError::TransformerInstantiation {
                template: template.component_name.clone(),
                reason: panic_message(&payload),
            }
        })?;

        let bound = BoundTransformer::bind(transformer, template)?;
        debug!(template = %template.component_name, "transformer bound");
        Ok(bound.with_scope(Box::new(library)))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "transformer constructor panicked".to_string()
    }
}
