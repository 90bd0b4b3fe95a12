//! Classification plans for a batch.

use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use tds_model::{Classification, Priority, TicketType};

use crate::catalog::Catalog;

/// Relative weights for Priority 1..4.
pub const PRIORITY_WEIGHTS: [(Priority, u32); 4] = [
    (Priority::P1, 10),
    (Priority::P2, 20),
    (Priority::P3, 40),
    (Priority::P4, 30),
];

/// Relative weights for ticket types.
pub const TYPE_WEIGHTS: [(TicketType, u32); 2] =
    [(TicketType::Incident, 60), (TicketType::ServiceRequest, 40)];

/// Weighted classification sampler over a catalog.
pub struct Distributor<'a> {
    catalog: &'a Catalog,
    priorities: WeightedIndex<u32>,
    types: WeightedIndex<u32>,
}

impl<'a> Distributor<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        // Weights are non-empty constants with a positive sum.
        let priorities = WeightedIndex::new(PRIORITY_WEIGHTS.iter().map(|(_, w)| *w))
            .expect("priority weights are valid");
        let types = WeightedIndex::new(TYPE_WEIGHTS.iter().map(|(_, w)| *w))
            .expect("type weights are valid");
        Self {
            catalog,
            priorities,
            types,
        }
    }

    /// Draw one classification: uniform category, weighted priority and type.
    pub fn sample(&self, rng: &mut impl Rng) -> Classification {
        let entries = self.catalog.entries();
        let entry = &entries[rng.gen_range(0..entries.len())];
        Classification {
            ticket_type: TYPE_WEIGHTS[self.types.sample(rng)].0,
            priority: PRIORITY_WEIGHTS[self.priorities.sample(rng)].0,
            category: entry.category.clone(),
            subcategory: entry.subcategory.clone(),
            item: entry.item.clone(),
        }
    }

    /// Plan `count` guided items.
    pub fn plan(&self, count: u32, rng: &mut impl Rng) -> Vec<Classification> {
        (0..count).map(|_| self.sample(rng)).collect()
    }
}

/// Plan `count` custom-prompt items.
pub fn plan_custom(count: u32) -> Vec<Classification> {
    (0..count).map(|_| Classification::custom()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn seeded_plans_repeat() {
        let catalog = Catalog::builtin();
        let distributor = Distributor::new(&catalog);
        let a = distributor.plan(20, &mut StdRng::seed_from_u64(7));
        let b = distributor.plan(20, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert!(a.iter().all(|c| catalog.entries().iter().any(|e| e.category == c.category)));
    }

    #[test]
    fn weights_shape_the_mix() {
        let catalog = Catalog::builtin();
        let distributor = Distributor::new(&catalog);
        let plan = distributor.plan(5_000, &mut StdRng::seed_from_u64(42));

        let p1 = plan.iter().filter(|c| c.priority == Priority::P1).count();
        let p3 = plan.iter().filter(|c| c.priority == Priority::P3).count();
        let incidents = plan
            .iter()
            .filter(|c| c.ticket_type == TicketType::Incident)
            .count();

        // Expected 500 / 2000 / 3000 with generous tolerance.
        assert!((350..650).contains(&p1), "p1 = {p1}");
        assert!((1800..2200).contains(&p3), "p3 = {p3}");
        assert!((2800..3200).contains(&incidents), "incidents = {incidents}");
    }

    #[test]
    fn custom_plan_uses_fixed_classification() {
        let plan = plan_custom(3);
        assert_eq!(plan.len(), 3);
        assert!(plan.iter().all(|c| c.category == "Custom" && c.priority == Priority::P3));
    }
}
