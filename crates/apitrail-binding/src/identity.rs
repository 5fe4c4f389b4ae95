//! Identity predicates deciding whether two entries are the same API.

use apitrail_core::{ApiEntry, LinkKind};

/// Owner and signature are both identical.
pub fn is_exact(old: &ApiEntry, new: &ApiEntry) -> bool {
    old.same_surface(new)
}

/// Same owner, and either the same signature or the same function name.
///
/// Parameter and return type changes are tolerated. This is a heuristic:
/// overloads or renamed functions that happen to share a name under the
/// same owner are linked too, and an owner whose header changed slightly
/// (`impl<'_> Foo` to `impl Foo`) is never linked.
pub fn is_tolerant(old: &ApiEntry, new: &ApiEntry) -> bool {
    if old.owner_signature != new.owner_signature {
        return false;
    }
    if old.signature == new.signature {
        return true;
    }
    match (old.function_name(), new.function_name()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// The strongest identity relation between two entries.
pub fn identity(old: &ApiEntry, new: &ApiEntry) -> Option<LinkKind> {
    if is_exact(old, new) {
        Some(LinkKind::Exact)
    } else if is_tolerant(old, new) {
        Some(LinkKind::Tolerant)
    } else {
        None
    }
}
