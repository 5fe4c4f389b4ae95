//! Fixed-width text rendering of the reports.

use crate::duration::{DurationReport, DurationSubset};
use crate::evolution::EvolutionReport;
use std::fmt;

const EVOLUTION_COLUMNS: [&str; 16] = [
    "version", "apis", "same", "modified", "removed", "new", "true_rm", "true_new", "u_apis",
    "u_same", "u_mod", "u_rm", "u_new", "late_u", "stab", "ruf",
];

impl fmt::Display for EvolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12}", EVOLUTION_COLUMNS[0])?;
        for column in &EVOLUTION_COLUMNS[1..] {
            write!(f, "{:>9}", column)?;
        }
        writeln!(f)?;

        for row in self.rows() {
            let values = [
                row.api_count,
                row.same,
                row.modified,
                row.removed,
                row.new,
                row.true_removed,
                row.true_new,
                row.unstable.api_count,
                row.unstable.same,
                row.unstable.modified,
                row.unstable.removed,
                row.unstable.new,
                row.late_unstable,
                row.stabilized,
                row.change_ruf,
            ];
            write!(f, "{:<12}", row.version)?;
            for value in values {
                write!(f, "{:>9}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for DurationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<12}", "version")?;
        for subset in DurationSubset::ALL {
            write!(f, "{:>18}{:>10}", subset.name(), "avg")?;
        }
        writeln!(f)?;

        for version in self.versions() {
            write!(f, "{:<12}", version.version)?;
            for subset in DurationSubset::ALL {
                let summary = version.subsets.get(subset).summary();
                write!(f, "{:>18}{:>10.2}", summary.total, summary.average)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
