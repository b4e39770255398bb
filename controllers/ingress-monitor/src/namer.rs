//! Monitor name rendering.
//!
//! Monitor names are rendered from a tera template with the variables
//! `namespace` and `ingress_name`. The rendered name is the lookup key for
//! the monitor on the provider side, so it must be stable for an ingress.

use k8s_openapi::api::networking::v1::Ingress;
use tera::{Context, Tera};
use thiserror::Error;

/// Default monitor name template.
pub const DEFAULT_NAME_TEMPLATE: &str = "{{ namespace }}-{{ ingress_name }}";

const TEMPLATE_NAME: &str = "monitor-name";

#[derive(Debug, Error)]
pub enum NamerError {
    #[error("invalid name template {template:?}: {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("ingress has no name")]
    MissingName,

    #[error("failed to render monitor name: {0}")]
    Render(String),
}

/// Renders monitor names from ingress metadata.
#[derive(Debug, Clone)]
pub struct Namer {
    tera: Tera,
}

impl Namer {
    /// Compiles the template. Fails if the template syntax is invalid.
    pub fn new(template: &str) -> Result<Self, NamerError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, template)
            .map_err(|e| NamerError::InvalidTemplate {
                template: template.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { tera })
    }

    /// Renders the monitor name for an ingress. Only metadata is consulted.
    pub fn name(&self, ingress: &Ingress) -> Result<String, NamerError> {
        let name = ingress.metadata.name.as_deref().ok_or(NamerError::MissingName)?;
        let namespace = ingress.metadata.namespace.as_deref().unwrap_or("default");

        let mut context = Context::new();
        context.insert("namespace", namespace);
        context.insert("ingress_name", name);

        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| NamerError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingress::tests::new_ingress;

    #[test]
    fn test_default_template() {
        let namer = Namer::new(DEFAULT_NAME_TEMPLATE).unwrap();
        let ingress = new_ingress("kube-system", "foo", &[], &[], &[]);

        assert_eq!(namer.name(&ingress).unwrap(), "kube-system-foo");
    }

    #[test]
    fn test_custom_template() {
        let namer = Namer::new("prod:{{ ingress_name }}.{{ namespace }}").unwrap();
        let ingress = new_ingress("shop", "frontend", &[], &["shop.example.com"], &[]);

        assert_eq!(namer.name(&ingress).unwrap(), "prod:frontend.shop");
    }

    #[test]
    fn test_missing_namespace_renders_default() {
        let namer = Namer::new(DEFAULT_NAME_TEMPLATE).unwrap();
        let mut ingress = new_ingress("ignored", "foo", &[], &[], &[]);
        ingress.metadata.namespace = None;

        assert_eq!(namer.name(&ingress).unwrap(), "default-foo");
    }

    #[test]
    fn test_missing_name() {
        let namer = Namer::new(DEFAULT_NAME_TEMPLATE).unwrap();
        let mut ingress = new_ingress("default", "foo", &[], &[], &[]);
        ingress.metadata.name = None;

        assert!(matches!(namer.name(&ingress), Err(NamerError::MissingName)));
    }

    #[test]
    fn test_invalid_template() {
        assert!(matches!(
            Namer::new("{{ namespace"),
            Err(NamerError::InvalidTemplate { .. })
        ));
    }
}
