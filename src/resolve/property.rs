use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::models::PropertyScope;

/// Which placeholder forms count as an indirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceSyntax {
    /// `${key}` only.
    Maven,
    /// `${key}`, `$key`, `project.ext["key"]`, `rootProject.ext["key"]` (optionally
    /// wrapped in `${...}`), and a bare key that names a known property.
    Gradle,
}

/// The property scopes visible from one build file, searched local → parent → root.
#[derive(Debug, Clone, Copy)]
pub struct ScopeChain<'a> {
    pub local: &'a PropertyScope,
    pub parent: Option<&'a PropertyScope>,
    pub root: Option<&'a PropertyScope>,
}

impl<'a> ScopeChain<'a> {
    pub fn new(local: &'a PropertyScope) -> Self {
        Self {
            local,
            parent: None,
            root: None,
        }
    }

    pub fn with_parent(mut self, parent: Option<&'a PropertyScope>) -> Self {
        self.parent = parent;
        self
    }

    pub fn with_root(mut self, root: Option<&'a PropertyScope>) -> Self {
        self.root = root;
        self
    }

    fn knows(&self, key: &str) -> bool {
        self.local.contains(key)
            || self.parent.is_some_and(|p| p.contains(key))
            || self.root.is_some_and(|r| r.contains(key))
    }

    fn lookup(&self, key: &str, reach: Reach) -> Option<(&'a str, bool)> {
        match reach {
            Reach::All => self
                .local
                .get(key)
                .or_else(|| self.parent.and_then(|p| p.get(key)))
                .map(|v| (v, false))
                .or_else(|| self.root.and_then(|r| r.get(key)).map(|v| (v, true))),
            Reach::RootOnly => self.root.and_then(|r| r.get(key)).map(|v| (v, true)),
        }
    }
}

/// Outcome of resolving a raw value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A concrete value (possibly the input itself, when it was not an indirection).
    Literal(String),
    /// The placeholder that could not be followed, verbatim.
    Unresolved(String),
}

impl Resolution {
    pub fn as_str(&self) -> &str {
        match self {
            Resolution::Literal(s) | Resolution::Unresolved(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Reach {
    All,
    RootOnly,
}

#[derive(Debug, PartialEq, Eq)]
enum Indirection<'r> {
    Key(&'r str),
    RootKey(&'r str),
}

static RE_EXT: OnceLock<Regex> = OnceLock::new();
static RE_PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
static RE_TEMPLATE: OnceLock<Regex> = OnceLock::new();

fn re_ext() -> &'static Regex {
    RE_EXT.get_or_init(|| {
        Regex::new(r#"^(?:\$\{)?(project|rootProject)\.(?:ext|extra)\["([^"]+)"\]\}?$"#)
            .expect("extension property pattern is valid")
    })
}

fn re_placeholder() -> &'static Regex {
    RE_PLACEHOLDER.get_or_init(|| {
        Regex::new(r"^\$\{([^}]+)\}$").expect("placeholder pattern is valid")
    })
}

fn re_template() -> &'static Regex {
    RE_TEMPLATE.get_or_init(|| {
        Regex::new(r"^\$([A-Za-z_][A-Za-z0-9_]*)$").expect("template pattern is valid")
    })
}

fn indirection<'r>(
    raw: &'r str,
    syntax: ReferenceSyntax,
    scopes: &ScopeChain<'_>,
    first_hop: bool,
) -> Option<Indirection<'r>> {
    let raw_trimmed = raw.trim();

    if syntax == ReferenceSyntax::Gradle {
        if let Some(caps) = re_ext().captures(raw_trimmed) {
            let key = caps.get(2)?.as_str();
            return match caps.get(1)?.as_str() {
                "rootProject" => Some(Indirection::RootKey(key)),
                _ => Some(Indirection::Key(key)),
            };
        }
    }

    if let Some(caps) = re_placeholder().captures(raw_trimmed) {
        return Some(Indirection::Key(caps.get(1)?.as_str()));
    }

    if syntax == ReferenceSyntax::Gradle {
        if let Some(caps) = re_template().captures(raw_trimmed) {
            return Some(Indirection::Key(caps.get(1)?.as_str()));
        }
        // A bare `val` name is only a reference when it names a known property;
        // otherwise `1.0` and friends stay literal.
        if first_hop && scopes.knows(raw_trimmed) {
            return Some(Indirection::Key(raw_trimmed));
        }
    }

    None
}

/// Resolve `reference` against `scopes`.
///
/// Indirections are followed hop by hop. A hop that lands in the root scope
/// narrows every later hop to the root scope alone, and a key seen twice in
/// the same reach stops resolution, so the number of hops is bounded by the
/// number of distinct keys in the chain. A reference that cannot be followed
/// comes back as [`Resolution::Unresolved`] carrying the placeholder that
/// failed.
pub fn resolve(reference: &str, syntax: ReferenceSyntax, scopes: &ScopeChain<'_>) -> Resolution {
    let mut current = reference;
    let mut reach = Reach::All;
    let mut visited: HashSet<(&str, Reach)> = HashSet::new();
    let mut first_hop = true;

    loop {
        let Some(ind) = indirection(current, syntax, scopes, first_hop) else {
            return Resolution::Literal(current.to_string());
        };
        first_hop = false;

        let key = match ind {
            Indirection::Key(key) => key,
            Indirection::RootKey(key) => {
                reach = Reach::RootOnly;
                key
            }
        };

        if !visited.insert((key, reach)) {
            debug!("property cycle through '{}' while resolving '{}'", key, reference);
            return Resolution::Unresolved(reference.to_string());
        }

        match scopes.lookup(key, reach) {
            Some((value, from_root)) => {
                if from_root {
                    reach = Reach::RootOnly;
                }
                current = value;
            }
            None => {
                debug!("property '{}' not found while resolving '{}'", key, reference);
                return Resolution::Unresolved(current.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(pairs: &[(&str, &str)]) -> PropertyScope {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_literal_is_returned_unchanged() {
        let local = scope(&[("3.12", "oops")]);
        let chain = ScopeChain::new(&local);
        assert_eq!(
            resolve("3.12", ReferenceSyntax::Maven, &chain),
            Resolution::Literal("3.12".into())
        );
        // Maven never treats a bare key as a reference.
        assert!(matches!(resolve("3.12", ReferenceSyntax::Maven, &chain), Resolution::Literal(_)));
    }

    #[test]
    fn test_local_takes_precedence_over_root() {
        let local = scope(&[("v", "1")]);
        let root = scope(&[("v", "2")]);
        let empty = PropertyScope::new();

        let chain = ScopeChain::new(&local).with_root(Some(&root));
        assert_eq!(resolve("${v}", ReferenceSyntax::Maven, &chain).as_str(), "1");

        let chain = ScopeChain::new(&empty).with_root(Some(&root));
        assert_eq!(resolve("${v}", ReferenceSyntax::Maven, &chain).as_str(), "2");
    }

    #[test]
    fn test_parent_sits_between_local_and_root() {
        let local = PropertyScope::new();
        let parent = scope(&[("v", "parent")]);
        let root = scope(&[("v", "root")]);
        let chain = ScopeChain::new(&local)
            .with_parent(Some(&parent))
            .with_root(Some(&root));
        assert_eq!(resolve("${v}", ReferenceSyntax::Maven, &chain).as_str(), "parent");
    }

    #[test]
    fn test_follows_nested_indirection() {
        let local = scope(&[("a", "${b}"), ("b", "${c}"), ("c", "4.1.100")]);
        let chain = ScopeChain::new(&local);
        assert_eq!(
            resolve("${a}", ReferenceSyntax::Maven, &chain),
            Resolution::Literal("4.1.100".into())
        );
    }

    #[test]
    fn test_missing_key_returns_placeholder() {
        let local = scope(&[("a", "${missing}")]);
        let chain = ScopeChain::new(&local);
        assert_eq!(
            resolve("${nope}", ReferenceSyntax::Maven, &chain),
            Resolution::Unresolved("${nope}".into())
        );
        assert_eq!(
            resolve("${a}", ReferenceSyntax::Maven, &chain),
            Resolution::Unresolved("${missing}".into())
        );
    }

    #[test]
    fn test_root_self_reference_terminates() {
        let local = PropertyScope::new();
        let root = scope(&[("v", "${v}")]);
        let chain = ScopeChain::new(&local).with_root(Some(&root));
        assert!(matches!(resolve("${v}", ReferenceSyntax::Maven, &chain), Resolution::Unresolved(_)));
    }

    #[test]
    fn test_local_cycle_terminates() {
        let local = scope(&[("a", "${b}"), ("b", "${a}")]);
        let chain = ScopeChain::new(&local);
        assert_eq!(
            resolve("${a}", ReferenceSyntax::Maven, &chain),
            Resolution::Unresolved("${a}".into())
        );
    }

    #[test]
    fn test_long_chain_resolves() {
        let mut local = PropertyScope::new();
        for i in 0..50 {
            local.insert(format!("k{}", i), format!("${{k{}}}", i + 1));
        }
        local.insert("k50", "9.9");
        let chain = ScopeChain::new(&local);
        assert_eq!(resolve("${k0}", ReferenceSyntax::Maven, &chain).as_str(), "9.9");

        // Close the loop: k50 -> k0.
        local.insert("k50", "${k0}");
        let chain = ScopeChain::new(&local);
        assert!(matches!(resolve("${k0}", ReferenceSyntax::Maven, &chain), Resolution::Unresolved(_)));
    }

    #[test]
    fn test_root_hit_narrows_to_root() {
        let local = scope(&[("a", "1.0")]);
        let root = scope(&[("v", "${a}")]);
        let chain = ScopeChain::new(&local).with_root(Some(&root));
        assert_eq!(
            resolve("${v}", ReferenceSyntax::Maven, &chain),
            Resolution::Unresolved("${a}".into())
        );
    }

    #[test]
    fn test_gradle_extension_forms() {
        let local = scope(&[("kudu.version", "1.17.1"), ("kotlinVersion", "1.9.0")]);
        let root = scope(&[("kudu.version", "1.10.0"), ("jackson.version", "2.15.2")]);
        let chain = ScopeChain::new(&local).with_root(Some(&root));
        let g = ReferenceSyntax::Gradle;

        assert_eq!(resolve(r#"project.ext["kudu.version"]"#, g, &chain).as_str(), "1.17.1");
        assert_eq!(resolve(r#"${project.ext["kudu.version"]}"#, g, &chain).as_str(), "1.17.1");
        assert_eq!(resolve(r#"rootProject.ext["kudu.version"]"#, g, &chain).as_str(), "1.10.0");
        assert_eq!(resolve(r#"project.ext["jackson.version"]"#, g, &chain).as_str(), "2.15.2");
        assert_eq!(resolve("$kotlinVersion", g, &chain).as_str(), "1.9.0");
        assert_eq!(resolve("kotlinVersion", g, &chain).as_str(), "1.9.0");
        assert_eq!(resolve("kotlinVersion", ReferenceSyntax::Maven, &chain).as_str(), "kotlinVersion");
    }
}
