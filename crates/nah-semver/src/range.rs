//! Range-expression grammar: `=`/`<`/`<=`/`>`/`>=`, space-AND, `||`-OR, `^`, `~`, X-ranges.

use crate::version::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone)]
struct Comparator {
    op: Op,
    version: Version,
}

impl Comparator {
    fn matches(&self, v: &Version) -> bool {
        match self.op {
            Op::Eq => v == &self.version,
            Op::Lt => v < &self.version,
            Op::Le => v <= &self.version,
            Op::Gt => v > &self.version,
            Op::Ge => v >= &self.version,
        }
    }
}

/// One AND-ed group of comparators. An empty set is vacuously satisfied by
/// any version (the desugared `*` / bare wildcard case).
#[derive(Debug, Clone, Default)]
struct Set(Vec<Comparator>);

impl Set {
    fn matches(&self, v: &Version) -> bool {
        self.0.iter().all(|c| c.matches(v))
    }
}

/// A parsed range expression: an OR of AND-sets. A range with zero sets
/// (parsed from an empty or entirely unparsable string) matches nothing.
#[derive(Debug, Clone, Default)]
pub struct Range(Vec<Set>);

impl Range {
    /// Parse a range expression per the grammar in the module docs.
    pub fn parse(s: &str) -> Range {
        let s = s.trim();
        if s.is_empty() {
            return Range(Vec::new());
        }

        let mut sets = Vec::new();
        for raw_set in s.split("||") {
            let raw_set = raw_set.trim();
            if raw_set.is_empty() {
                // an empty set between `||` matches anything
                sets.push(Set::default());
                continue;
            }
            match parse_set(raw_set) {
                Some(set) => sets.push(set),
                // a set with an unparsable token can never be satisfied
                None => sets.push(Set(vec![Comparator {
                    op: Op::Eq,
                    version: Version::new(u64::MAX, u64::MAX, u64::MAX),
                }])),
            }
        }
        Range(sets)
    }

    /// True iff at least one comparator set is fully satisfied.
    pub fn satisfies(&self, v: &Version) -> bool {
        if self.0.is_empty() {
            return false;
        }
        self.0.iter().any(|set| set.matches(v))
    }

    /// The greatest version in `versions` satisfying this range, if any.
    pub fn select_highest<'a>(&self, versions: &'a [Version]) -> Option<&'a Version> {
        versions.iter().filter(|v| self.satisfies(v)).max()
    }
}

/// Convenience: does `v` satisfy the range expression `raw`?
pub fn satisfies(v: &Version, raw: &str) -> bool {
    Range::parse(raw).satisfies(v)
}

fn parse_set(raw: &str) -> Option<Set> {
    let mut comparators = Vec::new();
    for token in raw.split_whitespace() {
        comparators.extend(parse_token(token)?);
    }
    Some(Set(comparators))
}

fn parse_token(tok: &str) -> Option<Vec<Comparator>> {
    if tok == "*" || tok.eq_ignore_ascii_case("x") {
        return Some(Vec::new());
    }
    if let Some(rest) = tok.strip_prefix('^') {
        let v = Version::parse(rest)?;
        return Some(caret_range(&v));
    }
    if let Some(rest) = tok.strip_prefix('~') {
        let v = Version::parse(rest)?;
        return Some(tilde_range(&v));
    }
    if is_xrange(tok) {
        return parse_xrange(tok);
    }
    parse_comparator(tok).map(|c| vec![c])
}

fn caret_range(v: &Version) -> Vec<Comparator> {
    if v.major == 0 && v.minor == 0 {
        // ^0.0.M -> =0.0.M
        return vec![Comparator {
            op: Op::Eq,
            version: v.clone(),
        }];
    }
    let upper = if v.major > 0 {
        v.next_major()
    } else {
        // ^0.N.M (N>0) -> >=0.N.M <0.(N+1).0
        v.next_minor_within_major()
    };
    vec![
        Comparator {
            op: Op::Ge,
            version: v.clone(),
        },
        Comparator {
            op: Op::Lt,
            version: upper,
        },
    ]
}

fn tilde_range(v: &Version) -> Vec<Comparator> {
    vec![
        Comparator {
            op: Op::Ge,
            version: v.clone(),
        },
        Comparator {
            op: Op::Lt,
            version: v.next_minor_within_major(),
        },
    ]
}

fn is_xrange(tok: &str) -> bool {
    let parts: Vec<&str> = tok.split('.').collect();
    if parts.len() > 3 || parts.is_empty() {
        return false;
    }
    if !matches!(parts.len(), 2 | 3) {
        return false;
    }
    let last_is_wild = matches!(parts.last(), Some(&"x") | Some(&"X") | Some(&"*"));
    let prefix_numeric = parts[..parts.len() - 1]
        .iter()
        .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
    last_is_wild && prefix_numeric
}

fn parse_xrange(tok: &str) -> Option<Vec<Comparator>> {
    let parts: Vec<&str> = tok.split('.').collect();
    match parts.len() {
        2 => {
            let major: u64 = parts[0].parse().ok()?;
            let lower = Version::new(major, 0, 0);
            let upper = Version::new(major + 1, 0, 0);
            Some(vec![
                Comparator { op: Op::Ge, version: lower },
                Comparator { op: Op::Lt, version: upper },
            ])
        }
        3 => {
            let major: u64 = parts[0].parse().ok()?;
            let minor: u64 = parts[1].parse().ok()?;
            let lower = Version::new(major, minor, 0);
            let upper = Version::new(major, minor + 1, 0);
            Some(vec![
                Comparator { op: Op::Ge, version: lower },
                Comparator { op: Op::Lt, version: upper },
            ])
        }
        _ => None,
    }
}

fn parse_comparator(tok: &str) -> Option<Comparator> {
    const PREFIXES: &[(&str, Op)] = &[
        (">=", Op::Ge),
        ("<=", Op::Le),
        (">", Op::Gt),
        ("<", Op::Lt),
        ("=", Op::Eq),
    ];
    for (prefix, op) in PREFIXES {
        if let Some(rest) = tok.strip_prefix(prefix) {
            let version = Version::parse(rest)?;
            return Some(Comparator { op: *op, version });
        }
    }
    let version = Version::parse(tok)?;
    Some(Comparator { op: Op::Eq, version })
}
