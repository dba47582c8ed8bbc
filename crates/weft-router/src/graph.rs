//! Element declarations and the two-phase configuration driver.
//!
//! A [`Router`] owns an ordered list of named element declarations. Element
//! names are unique per router; declaration order is the total order every
//! later tie-break refers to. Configuration runs in two phases:
//!
//! 1. **Info** — every `ScheduleInfo` declaration parses its directives into
//!    the [`ScheduleMap`]. The map is complete and immutable afterwards.
//! 2. **Default** — every schedulable element resolves its own weight against
//!    the finished map and joins the run queue.
//!
//! The phase split is a sequencing barrier, not a lock: no query ever
//! observes a partially-populated directive table.

use std::collections::HashMap;

use compact_str::CompactString;
use thiserror::Error;
use tracing::debug;
use weft_common::name::{ElementName, NameError, SEPARATOR};
use weft_common::report::Reporter;

use crate::sched::RunQueue;
use crate::schedule::{ScheduleInfo, ScheduleMap, UnresolvedPolicy};

/// Declaration index within a router; doubles as the declaration-order key.
pub type ElementId = usize;

/// Configuration phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigurePhase {
    /// Scheduling-parameter declarations; runs before all ordinary phases.
    Info,
    /// Ordinary element setup.
    Default,
}

/// What a declared element is, as far as this fragment is concerned.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementClass {
    /// A scheduling-parameter declaration with its raw configuration
    /// arguments, each of the form `"TARGET PARAM"`.
    ScheduleInfo { args: Vec<String> },
    /// A stage that must join the run queue during its setup.
    Schedulable,
    /// A stage with no CPU scheduling of its own.
    Passive,
}

impl ElementClass {
    pub fn configure_phase(&self) -> ConfigurePhase {
        match self {
            ElementClass::ScheduleInfo { .. } => ConfigurePhase::Info,
            _ => ConfigurePhase::Default,
        }
    }
}

/// One named element declaration.
#[derive(Debug, Clone)]
pub struct ElementDecl {
    name: ElementName,
    class: ElementClass,
}

impl ElementDecl {
    pub fn name(&self) -> &ElementName {
        &self.name
    }

    pub fn class(&self) -> &ElementClass {
        &self.class
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error(transparent)]
    Name(#[from] NameError),
    #[error("duplicate element name {0:?}")]
    Duplicate(String),
}

/// The element graph's naming layer: ordered declarations with unique
/// hierarchical names and precomputed full names for lookup.
#[derive(Debug, Default)]
pub struct Router {
    elements: Vec<ElementDecl>,
    by_name: HashMap<CompactString, ElementId>,
}

/// Result of running both configuration phases.
pub struct Configured {
    pub schedule: ScheduleMap,
    pub queue: RunQueue,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an element. Names must be unique within the router.
    pub fn add_element(&mut self, name: &str, class: ElementClass) -> Result<ElementId, GraphError> {
        let name = ElementName::parse(name)?;
        if self.by_name.contains_key(name.as_str()) {
            return Err(GraphError::Duplicate(name.to_string()));
        }
        let id = self.elements.len();
        self.by_name.insert(CompactString::from(name.as_str()), id);
        self.elements.push(ElementDecl { name, class });
        Ok(id)
    }

    pub fn element(&self, id: ElementId) -> &ElementDecl {
        &self.elements[id]
    }

    /// Look up an element by fully-qualified name.
    pub fn lookup(&self, fqn: &str) -> Option<ElementId> {
        self.by_name.get(fqn).copied()
    }

    /// Whether `fqn` names a declared element or a compound scope enclosing
    /// one. Directive targets may address either.
    pub fn names_element_or_scope(&self, fqn: &str) -> bool {
        if self.by_name.contains_key(fqn) {
            return true;
        }
        self.elements.iter().any(|decl| {
            let name = decl.name.as_str();
            name.len() > fqn.len()
                && name.starts_with(fqn)
                && name[fqn.len()..].starts_with(SEPARATOR)
        })
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &ElementDecl)> {
        self.elements.iter().enumerate()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Run both configuration phases in declaration order.
    ///
    /// The info phase populates the schedule map from every `ScheduleInfo`
    /// declaration and then checks directive targets against the graph. The
    /// default phase resolves each schedulable element's tickets and joins it
    /// to the run queue. Diagnostics flow through `reporter`; the returned
    /// queue holds every element that registered successfully.
    pub fn configure(&self, policy: UnresolvedPolicy, reporter: &mut dyn Reporter) -> Configured {
        let mut schedule = ScheduleMap::new(policy);
        for decl in &self.elements {
            if let ElementClass::ScheduleInfo { args } = &decl.class {
                schedule.add_instance(ScheduleInfo::from_args(&decl.name, args, reporter));
            }
        }
        schedule.check_targets(self, reporter);
        debug!(
            instances = schedule.instances().len(),
            "info phase complete"
        );

        let mut queue = RunQueue::new();
        for decl in &self.elements {
            if decl.class == ElementClass::Schedulable {
                schedule.join_scheduler(&decl.name, Some(&mut queue), reporter);
            }
        }
        Configured { schedule, queue }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_common::report::CollectReporter;

    fn schedulable(router: &mut Router, name: &str) -> ElementId {
        router.add_element(name, ElementClass::Schedulable).unwrap()
    }

    // ─── Declarations ───────────────────────────────────────────────────

    #[test]
    fn add_and_lookup() {
        let mut router = Router::new();
        let id = schedulable(&mut router, "c/i");
        assert_eq!(router.lookup("c/i"), Some(id));
        assert_eq!(router.lookup("c"), None);
        assert_eq!(router.element(id).name().as_str(), "c/i");
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut router = Router::new();
        schedulable(&mut router, "src");
        let err = router
            .add_element("src", ElementClass::Passive)
            .unwrap_err();
        assert_eq!(err, GraphError::Duplicate("src".into()));
    }

    #[test]
    fn malformed_names_rejected() {
        let mut router = Router::new();
        assert!(matches!(
            router.add_element("c//i", ElementClass::Passive),
            Err(GraphError::Name(_))
        ));
    }

    #[test]
    fn ids_follow_declaration_order() {
        let mut router = Router::new();
        assert_eq!(schedulable(&mut router, "a"), 0);
        assert_eq!(schedulable(&mut router, "b"), 1);
        assert_eq!(schedulable(&mut router, "c"), 2);
    }

    // ─── Scope Lookup ───────────────────────────────────────────────────

    #[test]
    fn compound_scope_counts_as_named() {
        let mut router = Router::new();
        schedulable(&mut router, "c/d/i");
        assert!(router.names_element_or_scope("c/d/i"));
        assert!(router.names_element_or_scope("c/d"));
        assert!(router.names_element_or_scope("c"));
        assert!(!router.names_element_or_scope("cx"), "segment boundary");
        assert!(!router.names_element_or_scope("c/e"));
    }

    // ─── Phases ─────────────────────────────────────────────────────────

    #[test]
    fn schedule_info_configures_in_info_phase() {
        assert_eq!(
            ElementClass::ScheduleInfo { args: vec![] }.configure_phase(),
            ConfigurePhase::Info
        );
        assert_eq!(
            ElementClass::Schedulable.configure_phase(),
            ConfigurePhase::Default
        );
        assert!(ConfigurePhase::Info < ConfigurePhase::Default);
    }

    #[test]
    fn configure_registers_schedulable_elements_only() {
        let mut router = Router::new();
        schedulable(&mut router, "src");
        router.add_element("sink", ElementClass::Passive).unwrap();

        let mut reporter = CollectReporter::new();
        let configured = router.configure(UnresolvedPolicy::Warn, &mut reporter);
        assert!(reporter.is_empty(), "{:?}", reporter);
        assert!(configured.queue.contains("src"));
        assert!(!configured.queue.contains("sink"));
    }

    #[test]
    fn info_phase_precedes_default_regardless_of_declaration_order() {
        // The ScheduleInfo is declared *after* the element it parameterizes;
        // the phase barrier must apply it anyway.
        let mut router = Router::new();
        schedulable(&mut router, "src");
        router
            .add_element(
                "sched",
                ElementClass::ScheduleInfo {
                    args: vec!["src 2".into()],
                },
            )
            .unwrap();

        let mut reporter = CollectReporter::new();
        let configured = router.configure(UnresolvedPolicy::Warn, &mut reporter);
        assert!(reporter.is_empty(), "{:?}", reporter);
        assert_eq!(configured.queue.tickets("src"), Some(2048));
    }
}
