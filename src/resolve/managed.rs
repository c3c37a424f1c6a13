use crate::models::{BuildSystem, DependencyDeclaration};
use crate::normalize::{CanonicalKey, Normalizer};
use crate::resolve::property::ScopeChain;

/// Managed (`dependencyManagement`) versions visible from one Maven build file.
///
/// Layers are consulted in the order they were pushed: the file's own
/// management section first, then inherited ones. Only entries whose version
/// resolved to a literal can answer a lookup.
#[derive(Debug, Default)]
pub struct ManagedVersions {
    layers: Vec<Vec<CanonicalKey>>,
}

impl ManagedVersions {
    /// Normalize `decls` with the scopes of the file that declares them and
    /// append them as the next layer.
    pub fn push_layer(&mut self, decls: &[DependencyDeclaration], scopes: ScopeChain<'_>) {
        let layer: Vec<CanonicalKey> = Normalizer::new(BuildSystem::Maven, scopes)
            .normalize_all(decls)
            .into_keys()
            .filter(|k| k.version().is_some() && !k.is_platform())
            .collect();
        self.layers.push(layer);
    }

    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(Vec::is_empty)
    }

    /// Effective version for `group:artifact[:classifier]`, if any layer manages it.
    ///
    /// Within a layer an entry with the same classifier is preferred; otherwise
    /// the first entry whose classifier presence matches the query is used, so a
    /// classified dependency never picks up an unclassified pin and vice versa.
    pub fn lookup(&self, group: &str, artifact: &str, classifier: Option<&str>) -> Option<&str> {
        for layer in &self.layers {
            let mut candidates = layer
                .iter()
                .filter(|k| k.group() == group && k.artifact() == artifact);

            if let Some(c) = classifier {
                if let Some(hit) = candidates.clone().find(|k| k.classifier() == Some(c)) {
                    return hit.version();
                }
            }

            if let Some(hit) = candidates.find(|k| k.classifier().is_some() == classifier.is_some()) {
                return hit.version();
            }
        }
        None
    }
}
