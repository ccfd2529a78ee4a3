/*
 * Debug Information Module
 *
 * Counters describing how much work neighbor discovery did. They are
 * collected alongside the physics but never read by it.
 *
 * Includes:
 * - Per tick totals for both perception bands
 * - A single-agent probe comparing a full scan with the active strategy
 */

use glam::Vec3;

use crate::spatial_grid::CellCoord;

// Work done by one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    pub tick: u64,
    pub agents: usize,
    pub queries: usize,
    pub candidates_checked: usize,
    pub true_neighbors: usize,
    pub separation_neighbors: usize,
    pub visited_cells: usize,
}

impl TickStats {
    // Distance checks an exhaustive scan would have needed for the same queries
    #[inline]
    pub fn brute_force_checks(&self) -> usize {
        self.queries * self.agents.saturating_sub(1)
    }

    pub fn average_candidates(&self) -> f32 {
        if self.queries == 0 {
            0.0
        } else {
            self.candidates_checked as f32 / self.queries as f32
        }
    }
}

/// What one agent's neighbor query cost, as shown next to the flock:
/// "Full scan: N-1 checks / Grid scan: k checks (c cells)".
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub index: usize,
    pub origin: Vec3,
    pub radius: f32,
    pub full_scan_checks: usize,
    pub candidate_checks: usize,
    pub visited_cells: Vec<CellCoord>,
    pub neighbors: Vec<usize>,
}

impl ProbeReport {
    pub fn summary(&self) -> String {
        format!(
            "Full scan: {} checks, this strategy: {} checks ({} cells), {} neighbors",
            self.full_scan_checks,
            self.candidate_checks,
            self.visited_cells.len(),
            self.neighbors.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brute_force_checks_scale_with_queries() {
        let stats = TickStats {
            agents: 50,
            queries: 100,
            ..TickStats::default()
        };
        assert_eq!(stats.brute_force_checks(), 100 * 49);
    }

    #[test]
    fn summary_lists_both_scans() {
        let report = ProbeReport {
            index: 3,
            origin: Vec3::ZERO,
            radius: 4.0,
            full_scan_checks: 79,
            candidate_checks: 6,
            visited_cells: vec![CellCoord::ZERO; 27],
            neighbors: vec![1, 2],
        };
        assert_eq!(
            report.summary(),
            "Full scan: 79 checks, this strategy: 6 checks (27 cells), 2 neighbors"
        );
    }

    #[test]
    fn average_of_nothing_is_zero() {
        assert_eq!(TickStats::default().average_candidates(), 0.0);
    }
}
