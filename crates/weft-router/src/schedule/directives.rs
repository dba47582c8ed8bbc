//! Directive-table parsing.
//!
//! Each configuration argument of a `ScheduleInfo` declaration is one
//! `"TARGET PARAM"` pair: a relative element name and a non-negative real
//! literal. Parsing is non-fatal throughout — a bad pair is reported and
//! skipped, and the remaining pairs still populate the table.

use compact_str::CompactString;
use weft_common::name::{ElementName, Prefix};
use weft_common::report::Reporter;

use crate::error::ConfigError;
use crate::schedule::tickets::{MAX_TICKETS, TICKET_SCALE};

/// Largest accepted parameter literal. Anything above this would clamp at the
/// ticket ceiling anyway, so larger literals are treated as configuration
/// mistakes rather than silently saturated.
pub const MAX_PARAM: f64 = MAX_TICKETS as f64 / TICKET_SCALE as f64;

/// One parsed scheduling directive, owned by exactly one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    /// Relative target as written in the configuration.
    pub target: ElementName,
    /// Fully-qualified target, precomputed under the owning instance's
    /// prefix so resolution never re-joins strings.
    pub fqn: CompactString,
    /// Requested weight.
    pub param: f64,
    /// Position within the owning instance's argument list.
    pub order: usize,
}

/// Parse the argument list of one instance into its directive table.
///
/// `owner` names the declaring instance (for diagnostics); `prefix` is its
/// scope, applied to every target up front.
pub(crate) fn parse_directives(
    owner: &ElementName,
    prefix: &Prefix,
    args: &[String],
    reporter: &mut dyn Reporter,
) -> Vec<Directive> {
    let mut directives = Vec::with_capacity(args.len());
    for (order, arg) in args.iter().enumerate() {
        let mut tokens = arg.split_whitespace();
        let (Some(target), Some(param), None) = (tokens.next(), tokens.next(), tokens.next())
        else {
            reporter.error(&format!(
                "{owner}: expected `ELEMENT PARAM`, got {arg:?}"
            ));
            continue;
        };

        let target = match ElementName::parse(target) {
            Ok(name) => name,
            Err(_) => {
                reporter.error(&format!(
                    "{owner}: {}",
                    ConfigError::MalformedName(target.to_string())
                ));
                continue;
            }
        };

        let param = match parse_param(param) {
            Some(value) => value,
            None => {
                reporter.error(&format!(
                    "{owner}: {}",
                    ConfigError::InvalidParameter(param.to_string())
                ));
                continue;
            }
        };

        directives.push(Directive {
            fqn: prefix.qualify(target.as_str()),
            target,
            param,
            order,
        });
    }
    directives
}

/// A usable parameter is a finite, non-negative literal within range.
fn parse_param(literal: &str) -> Option<f64> {
    let value: f64 = literal.parse().ok()?;
    (value.is_finite() && (0.0..=MAX_PARAM).contains(&value)).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_common::report::CollectReporter;

    fn parse(owner: &str, args: &[&str]) -> (Vec<Directive>, CollectReporter) {
        let owner = ElementName::parse(owner).unwrap();
        let prefix = owner.prefix();
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let mut reporter = CollectReporter::new();
        let directives = parse_directives(&owner, &prefix, &args, &mut reporter);
        (directives, reporter)
    }

    // ─── Well-Formed Pairs ──────────────────────────────────────────────

    #[test]
    fn parses_target_and_param() {
        let (dirs, reporter) = parse("sched", &["i 0.5"]);
        assert!(reporter.is_empty());
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].target.as_str(), "i");
        assert_eq!(dirs[0].fqn, "i");
        assert_eq!(dirs[0].param, 0.5);
        assert_eq!(dirs[0].order, 0);
    }

    #[test]
    fn scoped_owner_qualifies_targets() {
        let (dirs, _) = parse("c/sched", &["i 0.5", "d/j 2"]);
        assert_eq!(dirs[0].fqn, "c/i");
        assert_eq!(dirs[1].fqn, "c/d/j");
    }

    #[test]
    fn extra_whitespace_tolerated() {
        let (dirs, reporter) = parse("sched", &["  i   1.5 "]);
        assert!(reporter.is_empty());
        assert_eq!(dirs[0].param, 1.5);
    }

    // ─── Malformed Pairs ────────────────────────────────────────────────

    #[test]
    fn wrong_token_count_skipped_with_error() {
        let (dirs, reporter) = parse("sched", &["i", "i 1 extra", "j 2"]);
        assert_eq!(reporter.errors.len(), 2);
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].target.as_str(), "j");
        assert_eq!(dirs[0].order, 2, "order reflects argument position");
    }

    #[test]
    fn malformed_target_skipped() {
        let (dirs, reporter) = parse("sched", &["c//i 1", "ok 1"]);
        assert_eq!(dirs.len(), 1);
        assert!(reporter.errors[0].contains("malformed element name"));
    }

    #[test]
    fn bad_literals_skipped() {
        for bad in ["i abc", "i -1", "i inf", "i NaN", "i 1e30", "i 33"] {
            let (dirs, reporter) = parse("sched", &[bad]);
            assert!(dirs.is_empty(), "{bad:?} should not parse");
            assert_eq!(reporter.errors.len(), 1, "{bad:?}");
        }
    }

    #[test]
    fn range_endpoints_accepted() {
        let (dirs, reporter) = parse("sched", &["i 0", "j 32"]);
        assert!(reporter.is_empty());
        assert_eq!(dirs[0].param, 0.0);
        assert_eq!(dirs[1].param, MAX_PARAM);
    }
}
