use crate::*;

/// A generated round layout: the ordered box set plus the counts the players
/// are expected to reach.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoxLayout {
    pub boxes: Vec<BoxCell>,
    pub targets: TargetCounts,
}

pub trait BoxGenerator {
    fn generate(&mut self, budget: u32) -> BoxLayout;
}

/// Purely random generation: each side draws a count in
/// `[floor(0.6*budget), budget]`, then distinct cells are picked by rejection
/// sampling across the whole grid.
#[derive(Clone, Debug)]
pub struct RandomBoxGenerator {
    rng: rand::rngs::SmallRng,
}

impl RandomBoxGenerator {
    pub fn new(seed: u64) -> Self {
        use rand::SeedableRng;
        Self {
            rng: rand::rngs::SmallRng::seed_from_u64(seed),
        }
    }
}

fn draw_side_count(rng: &mut impl rand::Rng, budget: u32) -> u32 {
    // integer form of floor(random() * (0.4*M + 1)) + floor(0.6*M)
    let base = budget * 3 / 5;
    base + rng.gen_range(0..=budget - base)
}

impl BoxGenerator for RandomBoxGenerator {
    fn generate(&mut self, budget: u32) -> BoxLayout {
        use rand::Rng;

        let left = draw_side_count(&mut self.rng, budget);
        let right = draw_side_count(&mut self.rng, budget);
        let total = (left + right) as usize;
        // guaranteed by RoundSchedule validation
        debug_assert!(total <= GRID_CELLS, "budget {} overfills grid", budget);
        log::debug!("generated counts: left {}, right {}", left, right);

        let mut taken = [false; GRID_CELLS];
        let mut boxes = Vec::with_capacity(total);
        while boxes.len() < total {
            let index = self.rng.gen_range(0..GRID_CELLS);
            if taken[index] {
                continue;
            }
            taken[index] = true;
            let side = if (boxes.len() as u32) < left {
                Side::Left
            } else {
                Side::Right
            };
            boxes.push(BoxCell {
                index: index as CellIndex,
                side,
            });
        }

        BoxLayout {
            boxes,
            targets: TargetCounts { left, right },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn layout_matches_targets_and_stays_unique() {
        let mut generator = RandomBoxGenerator::new(7);

        for &budget in &STANDARD_BOX_BUDGETS {
            let layout = generator.generate(budget);

            assert_eq!(layout.boxes.len() as u32, layout.targets.total());
            let indices: BTreeSet<_> = layout.boxes.iter().map(|cell| cell.index).collect();
            assert_eq!(indices.len(), layout.boxes.len());
            assert!(indices.iter().all(|&index| (index as usize) < GRID_CELLS));
        }
    }

    #[test]
    fn side_counts_stay_within_budget_window() {
        let mut generator = RandomBoxGenerator::new(99);

        for _ in 0..200 {
            let layout = generator.generate(12);
            // round 1 window: [floor(0.6*12), 12] = [7, 12]
            assert!((7..=12).contains(&layout.targets.left));
            assert!((7..=12).contains(&layout.targets.right));
        }
    }

    #[test]
    fn draw_order_assigns_left_prefix() {
        let mut generator = RandomBoxGenerator::new(3);
        let layout = generator.generate(25);

        let left = layout.targets.left as usize;
        assert!(layout.boxes[..left]
            .iter()
            .all(|cell| cell.side == Side::Left));
        assert!(layout.boxes[left..]
            .iter()
            .all(|cell| cell.side == Side::Right));
    }

    #[test]
    fn same_seed_reproduces_the_layout() {
        let layout_a = RandomBoxGenerator::new(42).generate(30);
        let layout_b = RandomBoxGenerator::new(42).generate(30);
        assert_eq!(layout_a, layout_b);
    }
}
