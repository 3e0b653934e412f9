//! Fixed 9-box grid bucketing and lookup.
//!
//! # Responsibility
//! - Map scores to tertile levels with fixed thresholds.
//! - Map (performance level, potential level) to the grid cell.
//!
//! # Invariants
//! - Thresholds are fixed, not population-relative: <=2.5 is level 1,
//!   <=3.5 is level 2, above is level 3, on both axes.
//! - Cells are numbered row-major by descending performance, then
//!   descending potential: cell 1 is high/high, cell 9 is low/low.
//! - Unreachable level combinations fall back to cell 5.

use crate::model::matrix::MatrixCell;

/// Cells counted as top talent.
pub const TOP_TALENT_CELLS: [u8; 3] = [1, 2, 4];
/// Cells counted as low performers. Cell 7 (low performance, high
/// potential) is deliberately not one of them.
pub const LOW_PERFORMER_CELLS: [u8; 2] = [8, 9];

const CELLS: [MatrixCell; 9] = [
    MatrixCell {
        cell_id: 1,
        label: "Estrelas",
        color: "#1B5E20",
    },
    MatrixCell {
        cell_id: 2,
        label: "Alta performance",
        color: "#388E3C",
    },
    MatrixCell {
        cell_id: 3,
        label: "Especialistas",
        color: "#689F38",
    },
    MatrixCell {
        cell_id: 4,
        label: "Crescimento",
        color: "#7CB342",
    },
    MatrixCell {
        cell_id: 5,
        label: "Consistentes",
        color: "#FBC02D",
    },
    MatrixCell {
        cell_id: 6,
        label: "Eficazes",
        color: "#FFA000",
    },
    MatrixCell {
        cell_id: 7,
        label: "Enigmas",
        color: "#F57C00",
    },
    MatrixCell {
        cell_id: 8,
        label: "Questionáveis",
        color: "#E64A19",
    },
    MatrixCell {
        cell_id: 9,
        label: "Insuficientes",
        color: "#C62828",
    },
];

/// Buckets one score into its tertile level (1 low, 2 medium, 3 high).
pub fn tertile_level(score: f64) -> u8 {
    if score <= 2.5 {
        1
    } else if score <= 3.5 {
        2
    } else {
        3
    }
}

/// Looks up the grid cell for (performance level, potential level).
pub fn classify(performance_level: u8, potential_level: u8) -> MatrixCell {
    match (performance_level, potential_level) {
        (3, 3) => CELLS[0],
        (3, 2) => CELLS[1],
        (3, 1) => CELLS[2],
        (2, 3) => CELLS[3],
        (2, 2) => CELLS[4],
        (2, 1) => CELLS[5],
        (1, 3) => CELLS[6],
        (1, 2) => CELLS[7],
        (1, 1) => CELLS[8],
        // Levels outside 1..=3 cannot come from tertile_level; land any
        // such combination in the neutral center.
        _ => CELLS[4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tertile_boundaries_are_inclusive_on_the_low_side() {
        assert_eq!(tertile_level(2.5), 1);
        assert_eq!(tertile_level(2.51), 2);
        assert_eq!(tertile_level(3.5), 2);
        assert_eq!(tertile_level(3.51), 3);
        assert_eq!(tertile_level(1.0), 1);
        assert_eq!(tertile_level(5.0), 3);
    }

    #[test]
    fn grid_corners_and_center() {
        assert_eq!(classify(3, 3).cell_id, 1);
        assert_eq!(classify(3, 1).cell_id, 3);
        assert_eq!(classify(2, 2).label, "Consistentes");
        assert_eq!(classify(1, 3).cell_id, 7);
        assert_eq!(classify(1, 1).cell_id, 9);
    }

    #[test]
    fn every_cell_id_is_reachable_exactly_once() {
        let mut seen = Vec::new();
        for performance in 1..=3 {
            for potential in 1..=3 {
                seen.push(classify(performance, potential).cell_id);
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn out_of_range_levels_fall_back_to_center() {
        assert_eq!(classify(0, 9).cell_id, 5);
    }
}
