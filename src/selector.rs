//! # Component Selection
//!
//! Pluggable strategies (local repository managers, prefix composers) are
//! registered by name in a [`ComponentRegistry`]. When a session needs one, the
//! registry is turned into [`PrioritizedComponents`]: a ranked, filtered
//! candidate list shaped by the session configuration. Candidates are then
//! tried in rank order until one of them accepts.
//!
//! ## Configuration
//!
//! For a selection namespace `ns` (e.g. `local-repository-manager`):
//!
//! - `selector.<ns>.order`: comma separated names ranked first, in that order.
//! - `selector.<ns>.disabled`: comma separated names that are never tried.
//! - `selector.<ns>.priority.<name>`: overrides the registered priority.
//!
//! Remaining candidates are ranked by descending priority; ties keep the
//! registration order, which is stable within one run of the process.
//!
//! ## Failures
//!
//! A configuration error aborts the selection at once. Any other error is a
//! rejection and is recorded. When all candidates reject, a single tried
//! candidate's error is returned unchanged; otherwise the error lists every
//! tried candidate with its error plus the full ranked list.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};

use crate::config::{keys, SessionConfig};
use crate::error::{Error, Result};

/// Name → factory mapping, populated at startup
pub struct ComponentRegistry<F: ?Sized> {
    entries: Vec<(String, f32, Arc<F>)>,
}

impl<F: ?Sized> ComponentRegistry<F> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a factory; registering a name twice replaces the earlier
    /// factory but keeps its registration slot.
    pub fn register(&mut self, name: &str, priority: f32, component: Arc<F>) -> &mut Self {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _, _)| n == name) {
            entry.1 = priority;
            entry.2 = component;
        } else {
            self.entries.push((name.to_string(), priority, component));
        }
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F: ?Sized> Default for ComponentRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ?Sized> Clone for ComponentRegistry<F> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

/// One ranked selection candidate
pub struct PrioritizedComponent<F: ?Sized> {
    name: String,
    priority: f32,
    enabled: bool,
    component: Arc<F>,
}

impl<F: ?Sized> PrioritizedComponent<F> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> f32 {
        self.priority
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn component(&self) -> &Arc<F> {
        &self.component
    }
}

impl<F: ?Sized> fmt::Debug for PrioritizedComponent<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrioritizedComponent")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// The outcome of a successful selection
#[derive(Debug)]
pub struct Selected<T> {
    pub value: T,
    pub name: String,
    pub priority: f32,
}

/// Ranked candidate list for one selection call
pub struct PrioritizedComponents<F: ?Sized> {
    namespace: String,
    components: Vec<PrioritizedComponent<F>>,
}

impl<F: ?Sized> PrioritizedComponents<F> {
    /// Ranks the registered factories for `namespace` under `config`.
    pub fn rank(
        registry: &ComponentRegistry<F>,
        config: &SessionConfig,
        namespace: &str,
    ) -> Result<Self> {
        let prefix = format!("{}.{}", keys::SELECTOR_PREFIX, namespace);
        let order = config.get_list(&format!("{}.order", prefix));
        let disabled = config.get_list(&format!("{}.disabled", prefix));

        for name in order.iter().chain(disabled.iter()) {
            if !registry.names().any(|n| n == name) {
                warn!("Ignoring unknown {} '{}' in selection overrides", namespace, name);
            }
        }

        let mut components = Vec::with_capacity(registry.len());
        for (name, priority, component) in &registry.entries {
            let priority = config
                .get_f32(&format!("{}.priority.{}", prefix, name))?
                .unwrap_or(*priority);
            components.push(PrioritizedComponent {
                name: name.clone(),
                priority,
                enabled: !disabled.contains(name),
                component: Arc::clone(component),
            });
        }

        // Stable sort: equal ranks keep registration order.
        let position = |name: &str| order.iter().position(|n| n == name);
        components.sort_by(|a, b| match (position(a.name.as_str()), position(b.name.as_str())) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b
                .priority
                .partial_cmp(&a.priority)
                .unwrap_or(Ordering::Equal),
        });

        Ok(Self {
            namespace: namespace.to_string(),
            components,
        })
    }

    /// All candidates in rank order, disabled ones included.
    pub fn all(&self) -> &[PrioritizedComponent<F>] {
        &self.components
    }

    pub fn enabled(&self) -> impl Iterator<Item = &PrioritizedComponent<F>> {
        self.components.iter().filter(|c| c.enabled)
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Renders the ranked list, e.g. `[enhanced (10), simple (0, disabled)]`.
    pub fn describe(&self) -> String {
        let items: Vec<String> = self
            .components
            .iter()
            .map(|c| {
                if c.enabled {
                    format!("{} ({})", c.name, c.priority)
                } else {
                    format!("{} ({}, disabled)", c.name, c.priority)
                }
            })
            .collect();
        format!("[{}]", items.join(", "))
    }

    /// Tries enabled candidates in rank order and returns the first success.
    ///
    /// `context` describes what is being selected for and prefixes the
    /// composite error message.
    pub fn select<T>(
        &self,
        context: &str,
        mut construct: impl FnMut(&F) -> Result<T>,
    ) -> Result<Selected<T>> {
        let mut failures: Vec<(String, Error)> = Vec::new();
        for candidate in self.enabled() {
            match construct(candidate.component.as_ref()) {
                Ok(value) => {
                    debug!(
                        "Selected {} '{}' with priority {} for {}",
                        self.namespace, candidate.name, candidate.priority, context
                    );
                    return Ok(Selected {
                        value,
                        name: candidate.name.clone(),
                        priority: candidate.priority,
                    });
                }
                // Every candidate reads the same configuration, so a broken
                // value is fatal rather than a rejection.
                Err(e @ Error::Config { .. }) => return Err(e),
                Err(e) => {
                    debug!(
                        "{} '{}' rejected {}: {}",
                        self.namespace, candidate.name, context, e
                    );
                    failures.push((candidate.name.clone(), e));
                }
            }
        }

        if failures.len() == 1 {
            if let Some((_, error)) = failures.pop() {
                return Err(error);
            }
        }

        let message = if self.enabled().next().is_none() {
            format!(
                "No {} available for {}; candidates {}",
                self.namespace,
                context,
                self.describe()
            )
        } else {
            format!(
                "Cannot select a {} for {} using the available candidates {}",
                self.namespace,
                context,
                self.describe()
            )
        };
        Err(Error::NoMatchingComponent {
            kind: self.namespace.clone(),
            message,
            failures,
        })
    }
}
