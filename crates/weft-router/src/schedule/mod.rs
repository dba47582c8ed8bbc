//! Scheduling-parameter resolution.
//!
//! `ScheduleInfo(ELEMENT PARAM, ...)` declarations assign relative CPU
//! weights to named elements. Each declaration's own position in the name
//! tree decides its scope: a declaration named `c/sched` parameterizes
//! elements under `c/`, while a top-level declaration is *unscoped* and may
//! address anything — including a whole compound stage, whose weight then
//! scales every element nested inside it.
//!
//! Resolution for an element `c/i` works outward:
//!
//! ```text
//! local weight of c/i   (unscoped declarations override scoped ones)
//!   × own weight of c   (compound scaling factor)
//!   × ... each further ancestor, up to the root
//! ```
//!
//! so `ScheduleInfo(c 4)` at top level and `ScheduleInfo(i 0.5)` inside `c`
//! give `c/i` an effective weight of `4 × 0.5 = 2.0`, while an unscoped
//! `ScheduleInfo(c/i 10.5)` overrides the nested declaration entirely.

pub mod directives;
pub mod tickets;

use tracing::trace;
use weft_common::name::{ElementName, Prefix, parent};
use weft_common::report::Reporter;

use crate::error::ConfigError;
use crate::graph::Router;
use crate::sched::RunQueue;
use crate::schedule::directives::{Directive, parse_directives};
use crate::schedule::tickets::{TICKET_SCALE, to_tickets};

/// Weight applied when no directive matches an element.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// What to do with directives that target nothing in the finished graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedPolicy {
    /// Emit a warning-level diagnostic per dangling directive.
    #[default]
    Warn,
    /// Silently ignore dangling directives.
    Ignore,
}

/// One `ScheduleInfo` configuration instance: its scope prefix and the
/// directive table parsed from its arguments.
///
/// The table is populated once, during the info phase, and never mutated
/// afterwards.
#[derive(Debug, Clone)]
pub struct ScheduleInfo {
    name: ElementName,
    prefix: Prefix,
    directives: Vec<Directive>,
    active: bool,
}

impl ScheduleInfo {
    /// Parse an instance from its configuration arguments.
    ///
    /// Bad pairs are reported and dropped; the instance stays usable as long
    /// as anything parsed. An instance whose non-empty argument list yielded
    /// no usable directive at all is marked inactive.
    pub fn from_args(name: &ElementName, args: &[String], reporter: &mut dyn Reporter) -> Self {
        let prefix = name.prefix();
        let directives = parse_directives(name, &prefix, args, reporter);
        let active = args.is_empty() || !directives.is_empty();
        ScheduleInfo {
            name: name.clone(),
            prefix,
            directives,
            active,
        }
    }

    pub fn name(&self) -> &ElementName {
        &self.name
    }

    /// Scope under which this instance's targets are interpreted.
    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    /// Unscoped instances sit at the top level and may address any element.
    pub fn is_unscoped(&self) -> bool {
        self.prefix.is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    /// Weight this instance assigns to `fqn`, if any. With several matching
    /// directives the latest one wins.
    fn lookup(&self, fqn: &str) -> Option<f64> {
        if !self.active {
            return None;
        }
        self.directives
            .iter()
            .rev()
            .find(|d| d.fqn.as_str() == fqn)
            .map(|d| d.param)
    }
}

/// All `ScheduleInfo` instances governing one router, in declaration order.
///
/// Populated during the info phase; every query afterwards is a pure read.
#[derive(Debug, Default)]
pub struct ScheduleMap {
    instances: Vec<ScheduleInfo>,
    policy: UnresolvedPolicy,
}

impl ScheduleMap {
    pub fn new(policy: UnresolvedPolicy) -> Self {
        ScheduleMap {
            instances: Vec::new(),
            policy,
        }
    }

    pub fn add_instance(&mut self, instance: ScheduleInfo) {
        self.instances.push(instance);
    }

    pub fn instances(&self) -> &[ScheduleInfo] {
        &self.instances
    }

    /// Single-scope lookup: the local weight assigned to `fqn`, without
    /// compound scaling. `None` means no directive matches and the default
    /// weight applies.
    pub fn query(&self, fqn: &str) -> Option<f64> {
        self.query_prefixes(fqn).map(|(weight, _)| weight)
    }

    /// Like [`query`](Self::query), also reporting which scope produced the
    /// match, for callers that need to know how specific it was.
    ///
    /// Precedence: an unscoped declaration overrides any scoped one; among
    /// scoped matches the most specific (longest) prefix wins; remaining
    /// ties go to the latest declaration.
    pub fn query_prefixes(&self, fqn: &str) -> Option<(f64, Prefix)> {
        let mut unscoped: Option<f64> = None;
        let mut scoped: Option<(f64, Prefix)> = None;
        for instance in &self.instances {
            let Some(weight) = instance.lookup(fqn) else {
                continue;
            };
            if instance.is_unscoped() {
                unscoped = Some(weight);
            } else {
                let more_specific = match &scoped {
                    Some((_, prev)) => {
                        instance.prefix().as_str().len() >= prev.as_str().len()
                    }
                    None => true,
                };
                if more_specific {
                    scoped = Some((weight, instance.prefix().clone()));
                }
            }
        }
        match (unscoped, scoped) {
            (Some(weight), _) => Some((weight, Prefix::empty())),
            (None, scoped) => scoped,
        }
    }

    /// Full resolution: local weight times the own weight of every enclosing
    /// compound, walking outward to the root.
    ///
    /// The walk continues from the *matched prefix*: a scoped match consumes
    /// only its relative target, so the enclosing compound's own weight still
    /// scales it, while an unscoped match consumes the whole name and yields
    /// its parameter as final — that is what lets an outer declaration
    /// override a nested one entirely.
    pub fn resolve(&self, fqn: &str) -> f64 {
        let mut weight = DEFAULT_WEIGHT;
        let mut cur = fqn;
        loop {
            match self.query_prefixes(cur) {
                Some((value, prefix)) => {
                    weight *= value;
                    if prefix.is_empty() {
                        break;
                    }
                    debug_assert!(cur.starts_with(prefix.as_str()));
                    cur = &cur[..prefix.as_str().len()];
                }
                None => match parent(cur) {
                    Some(scope) => cur = scope,
                    None => break,
                },
            }
        }
        trace!(fqn, weight, "resolved scheduling weight");
        weight
    }

    /// Resolve an element's weight and convert it to tickets, warning when
    /// the fixed-point clamp changed the requested share.
    pub fn tickets_for(&self, element: &ElementName, reporter: &mut dyn Reporter) -> u32 {
        let weight = self.resolve(element.as_str());
        let tickets = to_tickets(weight);
        if (weight * TICKET_SCALE as f64).round() != tickets as f64 {
            reporter.warning(&format!(
                "{element}: weight {weight} clamped to {tickets} tickets"
            ));
        }
        tickets
    }

    /// Resolve an element's tickets and register it with the run queue.
    ///
    /// A missing queue is fatal for the element (`NoScheduler`); a repeated
    /// registration reports `AlreadyScheduled` and leaves the original entry
    /// untouched. Both are reported, never thrown.
    pub fn join_scheduler(
        &self,
        element: &ElementName,
        queue: Option<&mut RunQueue>,
        reporter: &mut dyn Reporter,
    ) {
        let Some(queue) = queue else {
            reporter.error(&ConfigError::NoScheduler(element.to_string()).to_string());
            return;
        };
        let tickets = self.tickets_for(element, reporter);
        if let Err(err) = queue.join(element, tickets) {
            reporter.error(&err.to_string());
        }
    }

    /// Check every directive target against the finished graph, applying the
    /// unresolved-target policy. A target naming a compound scope counts as
    /// resolved.
    pub fn check_targets(&self, router: &Router, reporter: &mut dyn Reporter) {
        if self.policy == UnresolvedPolicy::Ignore {
            return;
        }
        for instance in &self.instances {
            if !instance.is_active() {
                continue;
            }
            for directive in &instance.directives {
                if !router.names_element_or_scope(&directive.fqn) {
                    reporter.warning(&format!(
                        "{}: {}",
                        instance.name(),
                        ConfigError::UnresolvedTarget(directive.fqn.to_string())
                    ));
                }
            }
        }
    }
}
